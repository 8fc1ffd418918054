//! Token model shared by the lexer and the Pratt parser.

use crate::core::Rational;
use crate::error::Span;

/// Binary operators with their Pratt-parsing metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// Binding power. Higher binds tighter.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
        }
    }
}

/// Tokens produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Numeric literal, held exactly: "0.5" lexes as the rational 1/2.
    Number(Rational),
    /// Symbol or function name.
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Equals,
}

impl Token {
    /// Short description for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(r) => format!("number '{r}'"),
            Token::Identifier(name) => format!("identifier '{name}'"),
            Token::Operator(op) => format!("operator '{}'", op.symbol()),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::LeftBracket => "'['".to_string(),
            Token::RightBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Equals => "'='".to_string(),
        }
    }
}

/// A token plus the source range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexeme {
    pub token: Token,
    pub span: Span,
}

impl Lexeme {
    pub(crate) fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }
}
