use std::fmt::Display;

use crate::parser::QueryParser;

/// Distinguishes the syntax slips that get a friendlier message downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[default]
    Syntax,
    DoubleEquals,
    MultipleTables,
    UnsupportedStatement,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(message: &str, pivot: usize, parser: &QueryParser) -> Self {
        Self::with_kind(ParseErrorKind::Syntax, message, pivot, parser)
    }

    pub fn with_kind(kind: ParseErrorKind, message: &str, pivot: usize, parser: &QueryParser) -> Self {
        Self {
            message: message.to_string(),
            text: parser.text_from_range(pivot, parser.position.max(pivot + 1)),
            start: pivot,
            end: parser.position,
            kind,
        }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParseError: {}\n  at [{}:{}] -> '{}'",
            self.message,
            self.start,
            self.end,
            self.text
        )
    }
}

impl std::error::Error for ParseError {}
