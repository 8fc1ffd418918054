//! Parser module - converts equation text to expression trees
mod implicit_mul;
mod lexer;
mod pratt;
mod tokens;

use crate::context::Definitions;
use crate::core::Expr;
use crate::error::ParseError;
use crate::functions::Registry;
use crate::parser::tokens::Token;

/// Parse a formula string into an expression tree.
///
/// Decimal literals scan as exact rationals ("0.5" is 1/2), implicit
/// multiplication is honored ("2x", "(x+1)(x-2)"), and `/` and unary `-`
/// lower onto powers and products, so the returned tree contains only
/// sums, products, powers, calls and leaves.
///
/// `definitions` only matters for call-versus-product decisions: `f(2)`
/// is a call when `f` names a defined function and the product `f * 2`
/// otherwise.
///
/// # Example
/// ```
/// use symsolve::{Definitions, parse};
///
/// let defs = Definitions::new();
/// let expr = parse("x^2 - 2x + 1", &defs).unwrap();
/// assert_eq!(expr.to_string(), "1-2*x+x^2");
/// ```
///
/// # Errors
/// Returns `ParseError` if the input is empty, contains characters
/// outside the grammar, or is structurally malformed.
pub fn parse(input: &str, definitions: &Definitions) -> Result<Expr, ParseError> {
    // Pipeline: validate -> lex -> implicit_mul -> parse

    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let lexemes = lexer::lex(input)?;

    let is_function =
        |name: &str| Registry::is_builtin(name) || definitions.is_function_name(name);
    let lexemes = implicit_mul::insert_implicit_multiplication(lexemes, &is_function);

    pratt::parse_expression(&lexemes)
}

/// Parse equation text of the form `lhs = rhs` into its two sides.
///
/// Exactly one `=` is allowed, and both sides must be non-empty.
///
/// # Errors
/// `ParseError::MissingEquals` when no `=` is present; otherwise any error
/// [`parse`] can produce for either side.
pub fn parse_equation(
    input: &str,
    definitions: &Definitions,
) -> Result<(Expr, Expr), ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let lexemes = lexer::lex(input)?;

    let mut split = None;
    for (i, lexeme) in lexemes.iter().enumerate() {
        if lexeme.token == Token::Equals {
            if split.is_some() {
                return Err(ParseError::invalid_syntax_at(
                    "an equation has exactly one '='",
                    lexeme.span,
                ));
            }
            split = Some(i);
        }
    }
    let Some(split) = split else {
        return Err(ParseError::MissingEquals);
    };

    let is_function =
        |name: &str| Registry::is_builtin(name) || definitions.is_function_name(name);

    let (lhs_lexemes, rest) = lexemes.split_at(split);
    let rhs_lexemes = &rest[1..];

    let lhs_lexemes =
        implicit_mul::insert_implicit_multiplication(lhs_lexemes.to_vec(), &is_function);
    let lhs = pratt::parse_expression(&lhs_lexemes)?;

    let rhs_lexemes =
        implicit_mul::insert_implicit_multiplication(rhs_lexemes.to_vec(), &is_function);
    let rhs = pratt::parse_expression(&rhs_lexemes)?;

    Ok((lhs, rhs))
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
    use crate::core::Expr;

    #[test]
    fn equation_splits_at_equals() {
        let defs = Definitions::new();
        let (lhs, rhs) = parse_equation("x+1=2x", &defs).unwrap();
        assert_eq!(lhs.to_string(), "1+x");
        assert_eq!(rhs.to_string(), "2*x");
    }

    #[test]
    fn missing_equals_is_reported() {
        let defs = Definitions::new();
        assert!(matches!(
            parse_equation("x+1", &defs),
            Err(ParseError::MissingEquals)
        ));
    }

    #[test]
    fn double_equals_is_reported() {
        let defs = Definitions::new();
        assert!(matches!(
            parse_equation("x=1=2", &defs),
            Err(ParseError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn empty_side_is_reported() {
        let defs = Definitions::new();
        assert!(parse_equation("x=", &defs).is_err());
        assert!(parse_equation("=x", &defs).is_err());
    }

    #[test]
    fn user_function_names_parse_as_calls() {
        let mut defs = Definitions::new();
        defs.define_function("f", "t", Expr::pow_static(Expr::symbol("t"), Expr::integer(2)));

        let (lhs, _) = parse_equation("f(x)=4", &defs).unwrap();
        assert_eq!(lhs.to_string(), "f(x)");
    }

    #[test]
    fn same_name_without_definition_multiplies() {
        let defs = Definitions::new();
        let (lhs, _) = parse_equation("f(x)=4", &defs).unwrap();
        assert_eq!(lhs.to_string(), "f*x");
    }

    #[test]
    fn whitespace_only_is_empty() {
        let defs = Definitions::new();
        assert!(matches!(
            parse_equation("   ", &defs),
            Err(ParseError::EmptyInput)
        ));
    }
}
