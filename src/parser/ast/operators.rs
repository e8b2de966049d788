use std::fmt;

use crate::parser::{ParseError, ParseErrorKind, QueryParser};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparatorOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq
}

impl fmt::Display for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparatorOp::Eq => write!(f, "="),
            ComparatorOp::NotEq => write!(f, "<>"),
            ComparatorOp::Lt => write!(f, "<"),
            ComparatorOp::LtEq => write!(f, "<="),
            ComparatorOp::Gt => write!(f, ">"),
            ComparatorOp::GtEq => write!(f, ">="),
        }
    }
}

impl fmt::Debug for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparatorOp({})", self)
    }
}

impl ComparatorOp {
    /// Consumes a comparison operator at the cursor, if any.
    pub fn parse(parser: &mut QueryParser) -> Result<Option<ComparatorOp>, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        let (op, length) = match (parser.current(), parser.peek(1)) {
            ('=', '=') => {
                parser.jump(2);
                return ParseError::with_kind(ParseErrorKind::DoubleEquals, "Unexpected token '=='", pivot, parser).err();
            }
            ('=', _) => (ComparatorOp::Eq, 1),
            ('<', '>') | ('!', '=') => (ComparatorOp::NotEq, 2),
            ('<', '=') => (ComparatorOp::LtEq, 2),
            ('>', '=') => (ComparatorOp::GtEq, 2),
            ('<', _) => (ComparatorOp::Lt, 1),
            ('>', _) => (ComparatorOp::Gt, 1),
            _ => return Ok(None),
        };

        parser.jump(length);
        Ok(Some(op))
    }

    /// Operator suffix used in `$`-prefixed target operators.
    pub fn operator_name(&self) -> &'static str {
        match self {
            ComparatorOp::Eq => "eq",
            ComparatorOp::NotEq => "ne",
            ComparatorOp::Lt => "lt",
            ComparatorOp::LtEq => "lte",
            ComparatorOp::Gt => "gt",
            ComparatorOp::GtEq => "gte",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(ArithmeticOp::Add),
            '-' => Some(ArithmeticOp::Sub),
            '*' => Some(ArithmeticOp::Mul),
            '/' => Some(ArithmeticOp::Div),
            '%' => Some(ArithmeticOp::Mod),
            _ => None,
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOp::Add => write!(f, "+"),
            ArithmeticOp::Sub => write!(f, "-"),
            ArithmeticOp::Mul => write!(f, "*"),
            ArithmeticOp::Div => write!(f, "/"),
            ArithmeticOp::Mod => write!(f, "%"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::ComparatorOp, ParseErrorKind, QueryParser};

    #[test]
    pub fn test_comparator_parse() {
        let cases = [
            ("= 1", ComparatorOp::Eq),
            ("<> 1", ComparatorOp::NotEq),
            ("!= 1", ComparatorOp::NotEq),
            ("<= 1", ComparatorOp::LtEq),
            (">= 1", ComparatorOp::GtEq),
            ("< 1", ComparatorOp::Lt),
            ("> 1", ComparatorOp::Gt),
        ];

        for (text, expected) in cases {
            let mut parser = QueryParser::new(text);
            match ComparatorOp::parse(&mut parser) {
                Ok(Some(op)) => assert_eq!(op, expected),
                _ => panic!("failed on {}", text),
            }
            assert_eq!(parser.current(), ' ');
        }
    }

    #[test]
    pub fn test_comparator_double_equals() {
        let mut parser = QueryParser::new("== 1");

        match ComparatorOp::parse(&mut parser) {
            Err(err) => {
                assert_eq!(err.kind, ParseErrorKind::DoubleEquals);
                assert_eq!(err.text, "==");
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_comparator_absent() {
        let mut parser = QueryParser::new("LIKE 'a'");

        assert!(ComparatorOp::parse(&mut parser).unwrap().is_none());
        assert_eq!(parser.position, 0);
    }

    #[test]
    pub fn test_operator_names() {
        assert_eq!(ComparatorOp::Eq.operator_name(), "eq");
        assert_eq!(ComparatorOp::NotEq.operator_name(), "ne");
        assert_eq!(ComparatorOp::GtEq.operator_name(), "gte");
        assert_eq!(ComparatorOp::LtEq.to_string(), "<=");
    }
}
