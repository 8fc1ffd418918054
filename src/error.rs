use std::fmt;

/// Source location span for error reporting.
/// Represents a range of characters in the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start position (0-indexed character offset)
    pub start: usize,
    /// End position (exclusive, 0-indexed character offset)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Create a span for a single position
    pub fn at(pos: usize) -> Self {
        Span {
            start: pos,
            end: pos + 1,
        }
    }

    /// Create an empty/unknown span
    pub fn empty() -> Self {
        Span { start: 0, end: 0 }
    }

    /// Check if this span has valid location info
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Format the span for display (1-indexed for users)
    pub fn display(&self) -> String {
        if !self.is_valid() {
            String::new()
        } else if self.end - self.start == 1 {
            format!(" at position {}", self.start + 1)
        } else {
            format!(" at positions {}-{}", self.start + 1, self.end)
        }
    }
}

/// Errors produced while turning equation text into an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input was empty or all whitespace.
    EmptyInput,
    /// Structurally malformed input.
    InvalidSyntax { msg: String, span: Option<Span> },
    /// A numeric literal that does not scan.
    InvalidNumber { value: String, span: Option<Span> },
    /// A character with no meaning in this grammar.
    InvalidToken { token: String, span: Option<Span> },
    /// The right token class in the wrong place.
    UnexpectedToken {
        expected: String,
        got: String,
        span: Option<Span>,
    },
    /// Input stopped in the middle of a production.
    UnexpectedEndOfInput,
    /// Equation text without an `=` sign.
    MissingEquals,
    /// A builtin called with the wrong number of arguments.
    WrongArity {
        name: String,
        expected: String,
        got: usize,
        span: Option<Span>,
    },
}

impl ParseError {
    /// Create `InvalidSyntax` without location info.
    pub fn invalid_syntax(msg: impl Into<String>) -> Self {
        ParseError::InvalidSyntax {
            msg: msg.into(),
            span: None,
        }
    }

    /// Create `InvalidSyntax` with a span.
    pub fn invalid_syntax_at(msg: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            msg: msg.into(),
            span: Some(span),
        }
    }

    /// Create `InvalidNumber` with a span.
    pub fn invalid_number_at(value: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidNumber {
            value: value.into(),
            span: Some(span),
        }
    }

    /// Create `InvalidToken` with a span.
    pub fn invalid_token_at(token: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidToken {
            token: token.into(),
            span: Some(span),
        }
    }

    /// Create `UnexpectedToken` with a span.
    pub fn unexpected(
        expected: impl Into<String>,
        got: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            got: got.into(),
            span: Some(span),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "Input cannot be empty"),
            ParseError::InvalidSyntax { msg, span } => {
                write!(
                    f,
                    "Invalid syntax: {}{}",
                    msg,
                    span.map_or(String::new(), |s| s.display())
                )
            }
            ParseError::InvalidNumber { value, span } => {
                write!(
                    f,
                    "Invalid number format: '{}'{}",
                    value,
                    span.map_or(String::new(), |s| s.display())
                )
            }
            ParseError::InvalidToken { token, span } => {
                write!(
                    f,
                    "Invalid token: '{}'{}",
                    token,
                    span.map_or(String::new(), |s| s.display())
                )
            }
            ParseError::UnexpectedToken {
                expected,
                got,
                span,
            } => {
                write!(
                    f,
                    "Expected '{}', but got '{}'{}",
                    expected,
                    got,
                    span.map_or(String::new(), |s| s.display())
                )
            }
            ParseError::UnexpectedEndOfInput => write!(f, "Unexpected end of input"),
            ParseError::MissingEquals => {
                write!(f, "An equation needs an '=' between two expressions")
            }
            ParseError::WrongArity {
                name,
                expected,
                got,
                span,
            } => {
                write!(
                    f,
                    "Function '{}' takes {} argument(s), got {}{}",
                    name,
                    expected,
                    got,
                    span.map_or(String::new(), |s| s.display())
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Why a solve pass could not produce exact solutions.
///
/// `RequireApproximateSolution` is a routing outcome, not a failure: the
/// caller is expected to switch to the numeric interval solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// An equation reduced to the undefined marker.
    EquationUndefined,
    /// An equation left the real line while the complex format is real.
    EquationNonreal,
    /// More distinct variables than the solver handles.
    TooManyVariables,
    /// Several equations, but not all of them linear in the unknowns.
    NonLinearSystem,
    /// Single equation out of closed-form reach; use the numeric solver.
    RequireApproximateSolution,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::EquationUndefined => {
                write!(f, "An equation is undefined after substitution")
            }
            SolveError::EquationNonreal => {
                write!(f, "An equation has no real interpretation")
            }
            SolveError::TooManyVariables => {
                write!(f, "The system uses more unknowns than the solver supports")
            }
            SolveError::NonLinearSystem => {
                write!(f, "Several equations can only be solved when all are linear")
            }
            SolveError::RequireApproximateSolution => {
                write!(f, "No closed form available; approximate solving required")
            }
        }
    }
}

impl std::error::Error for SolveError {}

/// Errors surfaced when editing the equation list.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store already holds the maximum number of equations.
    Full,
    /// The equation text does not parse.
    Parse(ParseError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Full => write!(f, "The equation list is full"),
            StoreError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Full => None,
            StoreError::Parse(e) => Some(e),
        }
    }
}

impl From<ParseError> for StoreError {
    fn from(e: ParseError) -> Self {
        StoreError::Parse(e)
    }
}
