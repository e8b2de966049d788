use crate::parser::{
    ast::{Delete, Insert, SelectStatement, Update},
    ParseError, ParseErrorKind, QueryParser,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// Parses one statement and requires the rest of the text to be empty
    /// apart from trailing semicolons.
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        parser.next_non_whitespace();

        let statement = if parser.check(&comparers.select) || parser.current() == '(' {
            Statement::Select(SelectStatement::parse(parser)?)
        } else if parser.check(&comparers.insert_into) {
            Statement::Insert(Insert::parse(parser)?)
        } else if parser.check(&comparers.update) {
            Statement::Update(Update::parse(parser)?)
        } else if parser.check(&comparers.delete) {
            Statement::Delete(Delete::parse(parser)?)
        } else {
            let pivot = parser.position;
            while !parser.eof() && !parser.current().is_whitespace() {
                parser.next();
            }
            return ParseError::with_kind(ParseErrorKind::UnsupportedStatement, "Unsupported statement", pivot, parser).err();
        };

        parser.expect_end()?;
        Ok(statement)
    }
}

impl TryFrom<&str> for Statement {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parser = QueryParser::new(value);
        Statement::parse(&mut parser)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::Statement, ParseErrorKind};

    #[test]
    pub fn test_dispatch() {
        assert!(matches!(Statement::try_from("SELECT * FROM t;"), Ok(Statement::Select(_))));
        assert!(matches!(Statement::try_from("insert into t (a) values (1)"), Ok(Statement::Insert(_))));
        assert!(matches!(Statement::try_from("UPDATE t SET a = 1"), Ok(Statement::Update(_))));
        assert!(matches!(Statement::try_from("DELETE FROM t"), Ok(Statement::Delete(_))));
    }

    #[test]
    pub fn test_unsupported_statement() {
        let err = Statement::try_from("DROP TABLE t").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedStatement);
        assert_eq!(err.text, "DROP");
    }

    #[test]
    pub fn test_trailing_garbage() {
        assert_eq!(
            Statement::try_from("SELECT a FROM t WHERE a = 1 == 2").unwrap_err().kind,
            ParseErrorKind::DoubleEquals
        );

        assert!(Statement::try_from("SELECT a FROM t garbage here").is_err());
    }
}
