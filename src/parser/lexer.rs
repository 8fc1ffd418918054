//! Character-level scanner producing spanned tokens.
//!
//! Numeric literals are scanned into exact rationals: "2.5" becomes 5/2
//! with no float round-trip. Scientific notation is not part of the
//! grammar, so "2e3" lexes as the number 2 followed by the identifier
//! "e3" (and the implicit-multiplication pass turns that into a product).

use crate::core::Rational;
use crate::error::{ParseError, Span};
use crate::parser::tokens::{Lexeme, Operator, Token};

/// Turn `input` into a spanned token stream. Spans are character indices.
pub(crate) fn lex(input: &str) -> Result<Vec<Lexeme>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let digit_follows = matches!(chars.get(i + 1), Some(d) if d.is_ascii_digit());
        if c.is_ascii_digit() || (c == '.' && digit_follows) {
            let (token, next) = scan_number(&chars, i)?;
            lexemes.push(Lexeme::new(token, Span::new(i, next)));
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            lexemes.push(Lexeme::new(Token::Identifier(name), Span::new(start, i)));
            continue;
        }

        let token = match c {
            '+' => Token::Operator(Operator::Add),
            '-' => Token::Operator(Operator::Sub),
            '*' => Token::Operator(Operator::Mul),
            '/' => Token::Operator(Operator::Div),
            '^' => Token::Operator(Operator::Pow),
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            ',' => Token::Comma,
            '=' => Token::Equals,
            other => {
                return Err(ParseError::invalid_token_at(other.to_string(), Span::at(i)));
            }
        };
        lexemes.push(Lexeme::new(token, Span::at(i)));
        i += 1;
    }

    Ok(lexemes)
}

/// Scan a numeric literal starting at `start`. Returns the token and the
/// index one past the literal. Literals whose digits overflow an `i128`
/// are rejected rather than silently rounded.
fn scan_number(chars: &[char], start: usize) -> Result<(Token, usize), ParseError> {
    let mut i = start;
    let mut mantissa: i128 = 0;
    let mut denominator: i128 = 1;
    let mut seen_dot = false;
    let mut overflow = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let digit = i128::from(c as u8 - b'0');
            match mantissa.checked_mul(10).and_then(|m| m.checked_add(digit)) {
                Some(m) => mantissa = m,
                None => overflow = true,
            }
            if seen_dot {
                match denominator.checked_mul(10) {
                    Some(d) => denominator = d,
                    None => overflow = true,
                }
            }
            i += 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            i += 1;
        } else {
            break;
        }
    }

    let span = Span::new(start, i);
    if overflow {
        let text: String = chars[start..i].iter().collect();
        return Err(ParseError::invalid_number_at(text, span));
    }
    match Rational::new(mantissa, denominator) {
        Some(r) => Ok((Token::Number(r), i)),
        None => {
            let text: String = chars[start..i].iter().collect();
            Err(ParseError::invalid_number_at(text, span))
        }
    }
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

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).unwrap().into_iter().map(|lx| lx.token).collect()
    }

    #[test]
    fn lexes_integers_and_decimals_exactly() {
        assert_eq!(tokens("42"), vec![Token::Number(Rational::integer(42))]);
        assert_eq!(
            tokens("2.5"),
            vec![Token::Number(Rational::new(5, 2).unwrap())]
        );
        assert_eq!(
            tokens(".5"),
            vec![Token::Number(Rational::new(1, 2).unwrap())]
        );
        assert_eq!(tokens("5."), vec![Token::Number(Rational::integer(5))]);
    }

    #[test]
    fn lexes_identifiers_greedily() {
        assert_eq!(
            tokens("x2"),
            vec![Token::Identifier("x2".to_string())]
        );
        assert_eq!(
            tokens("sin theta"),
            vec![
                Token::Identifier("sin".to_string()),
                Token::Identifier("theta".to_string()),
            ]
        );
    }

    #[test]
    fn lexes_equation_structure() {
        assert_eq!(
            tokens("x+1=0"),
            vec![
                Token::Identifier("x".to_string()),
                Token::Operator(Operator::Add),
                Token::Number(Rational::integer(1)),
                Token::Equals,
                Token::Number(Rational::integer(0)),
            ]
        );
    }

    #[test]
    fn lexes_matrix_brackets() {
        assert_eq!(
            tokens("[[1,2]]"),
            vec![
                Token::LeftBracket,
                Token::LeftBracket,
                Token::Number(Rational::integer(1)),
                Token::Comma,
                Token::Number(Rational::integer(2)),
                Token::RightBracket,
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn spans_point_at_the_source() {
        let lexemes = lex("x + 12").unwrap();
        assert_eq!(lexemes[0].span, Span::new(0, 1));
        assert_eq!(lexemes[1].span, Span::at(2));
        assert_eq!(lexemes[2].span, Span::new(4, 6));
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = lex("x ? 1").unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { .. }));
    }

    #[test]
    fn no_scientific_notation() {
        assert_eq!(
            tokens("2e3"),
            vec![
                Token::Number(Rational::integer(2)),
                Token::Identifier("e3".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_oversized_literals() {
        let big = "9".repeat(40);
        let err = lex(&big).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }
}
