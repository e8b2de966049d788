use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::NotNan;
use std::fmt::{self, Display};

use crate::parser::{ast::TextCollector, ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Raw text between single quotes; doubled quotes are left as written.
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Null,
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

impl Literal {
    pub fn parse_string(parser: &mut QueryParser) -> Result<Self, ParseError> {
        parser.next_non_whitespace();
        TextCollector::quoted(parser, '\'').map(Literal::String)
    }

    pub fn parse_number(parser: &mut QueryParser) -> Result<Self, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;
        let mut is_float = false;

        while parser.current().is_ascii_digit() {
            parser.next();
        }
        if parser.current() == '.' && parser.peek(1).is_ascii_digit() {
            is_float = true;
            parser.next();
            while parser.current().is_ascii_digit() {
                parser.next();
            }
        }
        if matches!(parser.current(), 'e' | 'E')
            && (parser.peek(1).is_ascii_digit() || matches!(parser.peek(1), '+' | '-') && parser.peek(2).is_ascii_digit()) {
            is_float = true;
            parser.jump(2);
            while parser.current().is_ascii_digit() {
                parser.next();
            }
        }

        let text = parser.text_from_pivot(pivot);
        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Literal::Int(value));
            }
        }

        match text.parse::<f64>().ok().and_then(|value| NotNan::new(value).ok()) {
            Some(value) => Ok(Literal::Float(value)),
            None => ParseError::new("Invalid number", pivot, parser).err(),
        }
    }

    /// Parses the quoted part of `DATE '...'` or `TIMESTAMP '...'`.
    pub fn parse_typed(parser: &mut QueryParser, timestamp: bool) -> Result<Self, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;
        let text = TextCollector::quoted(parser, '\'')?;
        let text = text.trim();

        if timestamp {
            for format in TIMESTAMP_FORMATS {
                if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
                    return Ok(Literal::Timestamp(value));
                }
            }
            return ParseError::new("Invalid timestamp literal", pivot, parser).err();
        }

        match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(value) => Ok(Literal::Date(value)),
            Err(_) => ParseError::new("Invalid date literal", pivot, parser).err(),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "NULL"),
            Literal::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Literal::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::parser::{ast::Literal, QueryParser};

    #[test]
    pub fn test_literal_integer_and_float() {
        let mut parser = QueryParser::new("42 ");
        match Literal::parse_number(&mut parser) {
            Ok(Literal::Int(value)) => assert_eq!(value, 42),
            _ => panic!(),
        }

        let mut parser = QueryParser::new("3.25)");
        match Literal::parse_number(&mut parser) {
            Ok(Literal::Float(value)) => assert_eq!(value.into_inner(), 3.25),
            _ => panic!(),
        }
        assert_eq!(parser.current(), ')');

        let mut parser = QueryParser::new("1e3");
        match Literal::parse_number(&mut parser) {
            Ok(Literal::Float(value)) => assert_eq!(value.into_inner(), 1000.0),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_literal_integer_overflow_becomes_float() {
        let mut parser = QueryParser::new("99999999999999999999");
        match Literal::parse_number(&mut parser) {
            Ok(Literal::Float(_)) => {}
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_literal_string() {
        let mut parser = QueryParser::new("'O''Brien'");
        match Literal::parse_string(&mut parser) {
            Ok(literal) => {
                assert_eq!(literal, Literal::String("O''Brien".to_string()));
                assert_eq!(literal.to_string(), "'O''Brien'");
            }
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_literal_typed() {
        let mut parser = QueryParser::new(" '2021-03-04'");
        match Literal::parse_typed(&mut parser, false) {
            Ok(Literal::Date(date)) => assert_eq!(Some(date), NaiveDate::from_ymd_opt(2021, 3, 4)),
            _ => panic!(),
        }

        let mut parser = QueryParser::new("'2021-03-04 10:11:12'");
        match Literal::parse_typed(&mut parser, true) {
            Ok(literal @ Literal::Timestamp(_)) => assert_eq!(literal.to_string(), "TIMESTAMP '2021-03-04 10:11:12'"),
            _ => panic!(),
        }

        let mut parser = QueryParser::new("'yesterday'");
        assert_eq!(Literal::parse_typed(&mut parser, false).unwrap_err().message, "Invalid date literal");
    }
}
