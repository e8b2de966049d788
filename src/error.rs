use thiserror::Error;

use crate::parser::{ParseError, ParseErrorKind};

/// Failure of a single conversion. Every variant displays a message meant
/// for the person who wrote the SQL.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The SQL text could not be parsed.
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        source: ParseError,
    },

    /// A construct with no document-query counterpart.
    #[error("{0}")]
    Unsupported(String),

    /// A statement that parses but is structurally illegal.
    #[error("{0}")]
    Validation(String),

    /// A literal, pattern or name that cannot be interpreted.
    #[error("{0}")]
    InvalidValue(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConversionResult<T> = Result<T, ConversionError>;

impl ConversionError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        ConversionError::Unsupported(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConversionError::Validation(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ConversionError::InvalidValue(message.into())
    }
}

impl From<ParseError> for ConversionError {
    fn from(source: ParseError) -> Self {
        let message = match source.kind {
            ParseErrorKind::DoubleEquals => {
                "Unable to parse complete SQL string. One reason for this is the use of double equals (==).".to_string()
            }
            ParseErrorKind::MultipleTables => "Only one simple table name is supported.".to_string(),
            ParseErrorKind::UnsupportedStatement => "Only SELECT statements are supported.".to_string(),
            ParseErrorKind::Syntax => source.to_string(),
        };
        ConversionError::Parse { message, source }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::{parser::ast::Statement, ConversionError};

    fn parse_failure(sql: &str) -> ConversionError {
        ConversionError::from(Statement::try_from(sql).unwrap_err())
    }

    #[test]
    pub fn test_friendly_parse_messages() {
        assert_eq!(
            parse_failure("SELECT * FROM t WHERE a == 1").to_string(),
            "Unable to parse complete SQL string. One reason for this is the use of double equals (==)."
        );
        assert_eq!(parse_failure("SELECT * FROM a, b").to_string(), "Only one simple table name is supported.");
        assert_eq!(parse_failure("CREATE TABLE t").to_string(), "Only SELECT statements are supported.");
    }

    #[test]
    pub fn test_parse_error_keeps_source() {
        let err = parse_failure("SELECT FROM");

        assert!(err.to_string().starts_with("ParseError: "));
        assert!(err.source().is_some());
    }
}
