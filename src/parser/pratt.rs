//! Pratt parser: spanned tokens in, expression tree out.

use crate::core::Expr;
use crate::error::ParseError;
use crate::functions::Registry;
use crate::parser::tokens::{Lexeme, Operator, Token};
use std::ops::RangeInclusive;

/// Parse tokens into an expression using Pratt parsing. Trailing tokens
/// after a complete expression are an error.
pub(crate) fn parse_expression(lexemes: &[Lexeme]) -> Result<Expr, ParseError> {
    if lexemes.is_empty() {
        return Err(ParseError::UnexpectedEndOfInput);
    }

    let mut parser = Parser { lexemes, pos: 0 };
    let expr = parser.parse_expr(0)?;

    if let Some(rest) = parser.current() {
        return Err(ParseError::unexpected(
            "end of input",
            rest.token.describe(),
            rest.span,
        ));
    }

    Ok(expr)
}

fn arity_text(arity: &RangeInclusive<usize>) -> String {
    if arity.start() == arity.end() {
        arity.start().to_string()
    } else {
        format!("{} to {}", arity.start(), arity.end())
    }
}

struct Parser<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect_right_paren(&mut self) -> Result<(), ParseError> {
        match self.current() {
            Some(lexeme) if lexeme.token == Token::RightParen => {
                self.advance();
                Ok(())
            }
            Some(lexeme) => Err(ParseError::unexpected(
                ")",
                lexeme.token.describe(),
                lexeme.span,
            )),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        // Parse left side (prefix)
        let mut left = self.parse_prefix()?;

        // Parse operators and right side (infix)
        while let Some(lexeme) = self.current() {
            let precedence = match &lexeme.token {
                Token::Operator(op) => op.precedence(),
                _ => break,
            };

            if precedence < min_precedence {
                break;
            }

            left = self.parse_infix(left, precedence)?;
        }

        Ok(left)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if let Some(lexeme) = self.current()
            && lexeme.token == Token::RightParen
        {
            return Ok(args); // Empty argument list
        }

        loop {
            args.push(self.parse_expr(0)?);

            match self.current() {
                Some(lexeme) if lexeme.token == Token::Comma => {
                    self.advance(); // consume ,
                }
                Some(lexeme) if lexeme.token == Token::RightParen => {
                    break;
                }
                Some(lexeme) => {
                    return Err(ParseError::unexpected(
                        ", or )",
                        lexeme.token.describe(),
                        lexeme.span,
                    ));
                }
                None => return Err(ParseError::UnexpectedEndOfInput),
            }
        }

        Ok(args)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        // Direct access enables borrowing the token while mutating self.pos
        // (via advance) because we borrow from the underlying slice 'a,
        // not from self
        let lexeme = self
            .lexemes
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEndOfInput)?;

        match &lexeme.token {
            Token::Number(r) => {
                self.advance();
                Ok(Expr::from_rational(*r))
            }

            Token::Identifier(name) => {
                let name_span = lexeme.span;
                self.advance();

                // Identifier followed by `(` is a call; the implicit
                // multiplication pass already turned every non-function
                // adjacency into an explicit product.
                if self.current().is_some_and(|lx| lx.token == Token::LeftParen) {
                    self.advance(); // consume (
                    let args = self.parse_arguments()?;
                    self.expect_right_paren()?;

                    if let Some(def) = Registry::get(name) {
                        if !def.validate_arity(args.len()) {
                            return Err(ParseError::WrongArity {
                                name: name.clone(),
                                expected: arity_text(&def.arity),
                                got: args.len(),
                                span: Some(name_span),
                            });
                        }
                        Ok(Expr::func(def.name, args))
                    } else {
                        // User-defined function; resolved at substitution.
                        Ok(Expr::func(name, args))
                    }
                } else {
                    // Reserved marker words round-trip through serialization.
                    Ok(match name.as_str() {
                        "undef" => Expr::undefined(),
                        "nonreal" => Expr::nonreal(),
                        _ => Expr::symbol(name),
                    })
                }
            }

            // Unary minus: precedence between Mul (20) and Pow (30)
            // so -x^2 parses as -(x^2), not (-x)^2
            Token::Operator(Operator::Sub) => {
                self.advance();
                let expr = self.parse_expr(25)?;
                Ok(expr.negate())
            }

            // Unary plus: same precedence, returns the expression
            Token::Operator(Operator::Add) => {
                self.advance();
                self.parse_expr(25)
            }

            Token::LeftParen => {
                self.advance(); // consume (
                let expr = self.parse_expr(0)?;
                self.expect_right_paren()?;
                Ok(expr)
            }

            Token::LeftBracket => self.parse_matrix(),

            other => Err(ParseError::unexpected(
                "an expression",
                other.describe(),
                lexeme.span,
            )),
        }
    }

    /// Parse `[[a,b],[c,d]]`. Rows must be bracketed and equally long.
    fn parse_matrix(&mut self) -> Result<Expr, ParseError> {
        let open = self
            .lexemes
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEndOfInput)?
            .span;
        self.advance(); // consume outer [

        let mut entries = Vec::new();
        let mut cols: Option<usize> = None;
        let mut rows = 0;

        loop {
            match self.current() {
                Some(lexeme) if lexeme.token == Token::LeftBracket => self.advance(),
                Some(lexeme) => {
                    return Err(ParseError::unexpected(
                        "'[' starting a matrix row",
                        lexeme.token.describe(),
                        lexeme.span,
                    ));
                }
                None => return Err(ParseError::UnexpectedEndOfInput),
            }

            let mut row_len = 0;
            loop {
                entries.push(self.parse_expr(0)?);
                row_len += 1;

                match self.current() {
                    Some(lexeme) if lexeme.token == Token::Comma => self.advance(),
                    Some(lexeme) if lexeme.token == Token::RightBracket => {
                        self.advance();
                        break;
                    }
                    Some(lexeme) => {
                        return Err(ParseError::unexpected(
                            ", or ]",
                            lexeme.token.describe(),
                            lexeme.span,
                        ));
                    }
                    None => return Err(ParseError::UnexpectedEndOfInput),
                }
            }

            match cols {
                None => cols = Some(row_len),
                Some(expected) if expected != row_len => {
                    return Err(ParseError::invalid_syntax_at(
                        "matrix rows must have equal length",
                        open,
                    ));
                }
                Some(_) => {}
            }
            rows += 1;

            match self.current() {
                Some(lexeme) if lexeme.token == Token::Comma => self.advance(),
                Some(lexeme) if lexeme.token == Token::RightBracket => {
                    self.advance();
                    break;
                }
                Some(lexeme) => {
                    return Err(ParseError::unexpected(
                        ", or ]",
                        lexeme.token.describe(),
                        lexeme.span,
                    ));
                }
                None => return Err(ParseError::UnexpectedEndOfInput),
            }
        }

        Ok(Expr::matrix(rows, cols.unwrap_or(0), entries))
    }

    fn parse_infix(&mut self, left: Expr, precedence: u8) -> Result<Expr, ParseError> {
        let lexeme = self
            .lexemes
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEndOfInput)?;

        match &lexeme.token {
            Token::Operator(op) => {
                let op = *op;
                self.advance();

                // Right associative for power, left for others
                let next_precedence = if matches!(op, Operator::Pow) {
                    precedence // Right associative
                } else {
                    precedence + 1 // Left associative
                };

                let right = self.parse_expr(next_precedence)?;

                let result = match op {
                    Operator::Add => Expr::add_expr(left, right),
                    Operator::Sub => Expr::sub_expr(left, right),
                    Operator::Mul => Expr::mul_expr(left, right),
                    Operator::Div => Expr::div_expr(left, right),
                    Operator::Pow => Expr::pow_static(left, right),
                };

                Ok(result)
            }

            other => Err(ParseError::unexpected(
                "an operator",
                other.describe(),
                lexeme.span,
            )),
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
    use crate::core::ExprKind;
    use crate::parser::implicit_mul::insert_implicit_multiplication;
    use crate::parser::lexer::lex;

    fn parse(input: &str) -> Result<Expr, ParseError> {
        let is_function = |name: &str| Registry::is_builtin(name);
        let lexemes = insert_implicit_multiplication(lex(input).unwrap(), &is_function);
        parse_expression(&lexemes)
    }

    fn rendered(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn literals_fold_eagerly() {
        assert_eq!(rendered("1+2"), "3");
        assert_eq!(rendered("2^3^2"), "512"); // right-assoc: 2^(3^2)
        assert_eq!(rendered("1/2"), "1/2");
        assert_eq!(rendered("0.5"), "1/2"); // decimals scan as exact rationals
    }

    #[test]
    fn precedence_shapes_the_tree() {
        assert_eq!(rendered("x+2*y"), "x+2*y");
        assert_eq!(rendered("(x+1)*2"), "2*(1+x)");
        assert_eq!(rendered("2x+1"), "1+2*x");
    }

    #[test]
    fn unary_minus_binds_below_pow() {
        assert_eq!(rendered("-x^2"), "-x^2");
        assert_eq!(rendered("(-x)^2"), "(-x)^2");
        assert_eq!(rendered("-x"), "-x");
        assert_eq!(rendered("+x"), "x");
    }

    #[test]
    fn division_becomes_inverse_power() {
        let expr = parse("x/y").unwrap();
        assert!(matches!(*expr, ExprKind::Product(_)));
        assert_eq!(expr.to_string(), "x*y^(-1)");
    }

    #[test]
    fn subtraction_becomes_negated_sum() {
        let expr = parse("x-y").unwrap();
        assert!(matches!(*expr, ExprKind::Sum(_)));
        assert_eq!(expr.to_string(), "x-y");
    }

    #[test]
    fn builtin_calls_parse() {
        let expr = parse("sin(x)^2").unwrap();
        assert_eq!(expr.to_string(), "sin(x)^2");
        assert_eq!(rendered("log(8,2)"), "log(8,2)");
    }

    #[test]
    fn builtin_arity_is_checked() {
        assert!(matches!(
            parse("sin(x,y)"),
            Err(ParseError::WrongArity { got: 2, .. })
        ));
        assert!(matches!(
            parse("sin()"),
            Err(ParseError::WrongArity { got: 0, .. })
        ));
    }

    #[test]
    fn unknown_name_times_group_is_a_product() {
        // No function named f in scope: f(2) is f * 2.
        assert_eq!(rendered("f(2)"), "2*f");
    }

    #[test]
    fn matrices_parse_rectangular() {
        let expr = parse("[[1,2],[3,4]]").unwrap();
        match &*expr {
            ExprKind::Matrix { rows, cols, .. } => {
                assert_eq!((*rows, *cols), (2, 2));
            }
            other => panic!("expected matrix, got {other:?}"),
        }

        assert!(matches!(
            parse("[[1,2],[3]]"),
            Err(ParseError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn marker_words_read_back_as_markers() {
        assert!(matches!(*parse("undef").unwrap(), ExprKind::Undefined));
        assert!(matches!(*parse("nonreal").unwrap(), ExprKind::Nonreal));
        assert_eq!(rendered("undef+1"), "undef");
    }

    #[test]
    fn empty_parentheses_are_an_error() {
        assert!(parse("()").is_err());
    }

    #[test]
    fn trailing_tokens_are_an_error() {
        assert!(matches!(
            parse("x+1)"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn missing_close_paren_is_an_error() {
        assert!(matches!(
            parse("sin(x"),
            Err(ParseError::UnexpectedEndOfInput)
        ));
    }
}
