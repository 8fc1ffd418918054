//! Implicit multiplication insertion for natural notation
//!
//! Inserts `*` tokens where multiplication is implied, e.g. `2x` → `2 * x`,
//! so the Pratt parser only ever sees one product syntax. The single
//! exception is an identifier naming a builtin or user-defined function
//! followed by `(`, which stays a call.

use crate::error::Span;
use crate::parser::tokens::{Lexeme, Operator, Token};

/// Check if implicit multiplication should be inserted between two tokens
fn should_insert_mul<F>(current: &Token, next: &Token, is_function: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    match (current, next) {
        // Identifier * (: x(x+1) multiplies unless x names a function
        (Token::Identifier(name), Token::LeftParen) => !is_function(name),

        // Coalesced arms for standard multiplication cases:
        // Number * Identifier: 2x
        // Number * (: 2(x)
        // Number * [: 2[[1,0],[0,1]]
        // Identifier * Identifier: x y
        // Identifier * Number: x 2
        // Identifier * [: x[[1,2]]
        // ) * Identifier/Number/(/[: (a)x, (a)2, (a)(b), (a)[[1,2]]
        // ] * Identifier/Number/(: [[1,2]]x
        (
            Token::Number(_) | Token::Identifier(_) | Token::RightParen | Token::RightBracket,
            Token::Identifier(_),
        )
        | (Token::Number(_) | Token::RightParen, Token::LeftParen | Token::LeftBracket)
        | (
            Token::Identifier(_) | Token::RightParen | Token::RightBracket,
            Token::Number(_),
        )
        | (Token::Identifier(_), Token::LeftBracket)
        | (Token::RightBracket, Token::LeftParen) => true,

        // `][` stays untouched so a missing comma between matrix rows
        // surfaces as a parse error instead of a silent product.
        _ => false,
    }
}

/// Insert implicit multiplication operators between appropriate tokens
///
/// Rules:
/// - Number * Identifier: `2 x` → `2 * x`
/// - Identifier * Identifier: `a x` → `a * x`
/// - ) * Identifier/Number/(: `(a) x` → `(a) * x`
/// - Identifier/Number * (: `x (y)` → `x * (y)` (unless function call)
pub(crate) fn insert_implicit_multiplication<F>(
    lexemes: Vec<Lexeme>,
    is_function: &F,
) -> Vec<Lexeme>
where
    F: Fn(&str) -> bool,
{
    if lexemes.is_empty() {
        return lexemes;
    }

    // Check if any insertion is needed before allocating a new vector
    let needs_insertion = lexemes
        .windows(2)
        .any(|w| should_insert_mul(&w[0].token, &w[1].token, is_function));

    if !needs_insertion {
        return lexemes;
    }

    let mut result = Vec::with_capacity(lexemes.len() + 4);
    let mut it = lexemes.into_iter().peekable();

    while let Some(current) = it.next() {
        let needs_mul = it
            .peek()
            .is_some_and(|next| should_insert_mul(&current.token, &next.token, is_function));

        let gap = current.span.end;
        result.push(current);
        if needs_mul {
            result.push(Lexeme::new(Token::Operator(Operator::Mul), Span::at(gap)));
        }
    }

    result
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    fn no_functions(_: &str) -> bool {
        false
    }

    fn apply(input: &str, is_function: &dyn Fn(&str) -> bool) -> Vec<Token> {
        insert_implicit_multiplication(lex(input).unwrap(), &is_function)
            .into_iter()
            .map(|lx| lx.token)
            .collect()
    }

    #[test]
    fn number_before_symbol_multiplies() {
        let tokens = apply("2x", &no_functions);
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Operator(Operator::Mul)));
    }

    #[test]
    fn adjacent_groups_multiply() {
        let tokens = apply("(x+1)(x-1)", &no_functions);
        let muls = tokens
            .iter()
            .filter(|t| matches!(t, Token::Operator(Operator::Mul)))
            .count();
        assert_eq!(muls, 1);
    }

    #[test]
    fn function_call_is_not_a_product() {
        let is_sin = |name: &str| name == "sin";
        let tokens = apply("sin(x)", &is_sin);
        assert!(!tokens.iter().any(|t| matches!(t, Token::Operator(Operator::Mul))));
    }

    #[test]
    fn unknown_name_before_paren_multiplies() {
        let tokens = apply("x(x+1)", &no_functions);
        assert!(matches!(tokens[1], Token::Operator(Operator::Mul)));
    }

    #[test]
    fn matrix_rows_stay_untouched() {
        let tokens = apply("[[1,2],[3,4]]", &no_functions);
        assert!(!tokens.iter().any(|t| matches!(t, Token::Operator(Operator::Mul))));

        let tokens = apply("2[[1,2]]", &no_functions);
        assert!(matches!(tokens[1], Token::Operator(Operator::Mul)));
    }

    #[test]
    fn spaced_symbols_multiply() {
        let tokens = apply("a x", &no_functions);
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Operator(Operator::Mul)));
    }
}
