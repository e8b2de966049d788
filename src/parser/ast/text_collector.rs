use crate::parser::{ParseError, QueryComparers, QueryParser, WordComparer};

pub struct TextCollector;

impl TextCollector {
    /// Reads a bare identifier at the cursor; digits may not lead.
    pub fn identifier(parser: &mut QueryParser) -> Option<String> {
        parser.next_non_whitespace();
        let current = parser.current();
        if current.is_ascii_digit() || !WordComparer::is_identifier_char(current) {
            return None;
        }

        let pivot = parser.position;
        while WordComparer::is_identifier_char(parser.current()) {
            parser.next();
        }
        Some(parser.text_from_pivot(pivot))
    }

    /// Reads the text between `quote` characters. A doubled quote stays doubled
    /// in the result, so single-quoted literals keep their SQL escaping.
    pub fn quoted(parser: &mut QueryParser, quote: char) -> Result<String, ParseError> {
        let pivot = parser.position;
        parser.next();
        let start = parser.position;
        loop {
            if parser.eof() {
                return ParseError::new("Unterminated quoted text", pivot, parser).err();
            }
            if parser.current() == quote {
                if parser.peek(1) == quote {
                    parser.jump(2);
                    continue;
                }
                let text = parser.text_from_pivot(start);
                parser.next();
                return Ok(text);
            }
            parser.next();
        }
    }

    /// Reads an identifier or a double/back-quoted name.
    pub fn name(parser: &mut QueryParser) -> Result<String, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;
        match parser.current() {
            '"' | '`' => {
                let quote = parser.current();
                Ok(Self::quoted(parser, quote)?.replace(&format!("{quote}{quote}"), &quote.to_string()))
            }
            _ => match Self::identifier(parser) {
                Some(name) => Ok(name),
                None => ParseError::new("Expected a name", pivot, parser).err(),
            },
        }
    }

    /// Reads a dotted name such as `db.collection`.
    pub fn dotted_name(parser: &mut QueryParser) -> Result<String, ParseError> {
        let mut parts = vec![Self::name(parser)?];
        while parser.current() == '.' {
            parser.next();
            parts.push(Self::name(parser)?);
        }
        Ok(parts.join("."))
    }

    /// Reads an optional `[AS] alias`. Reserved words are never taken as an
    /// implicit alias.
    pub fn alias(parser: &mut QueryParser) -> Result<Option<String>, ParseError> {
        let comparers = parser.comparers;
        if parser.consume(&comparers.alias) {
            return Self::name(parser).map(Some);
        }

        parser.next_non_whitespace();
        if matches!(parser.current(), '"' | '`') {
            return Self::name(parser).map(Some);
        }

        let pivot = parser.position;
        match Self::identifier(parser) {
            Some(word) if !QueryComparers::is_reserved(&word) => Ok(Some(word)),
            _ => {
                parser.position = pivot;
                Ok(None)
            }
        }
    }

    /// Reads an unsigned integer, as used by LIMIT and OFFSET.
    pub fn unsigned(parser: &mut QueryParser) -> Result<i64, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;
        while parser.current().is_ascii_digit() {
            parser.next();
        }

        let text = parser.text_from_pivot(pivot);
        match text.parse::<i64>() {
            Ok(value) => Ok(value),
            Err(_) => ParseError::new("Expected a positive integer", pivot, parser).err(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::TextCollector, QueryParser};

    #[test]
    pub fn test_identifier_stops_at_delimiter() {
        let mut parser = QueryParser::new("  user_name, other");

        assert_eq!(TextCollector::identifier(&mut parser), Some("user_name".to_string()));
        assert_eq!(parser.current(), ',');
    }

    #[test]
    pub fn test_quoted_keeps_doubled_quotes() {
        let mut parser = QueryParser::new("'it''s' rest");

        let result = TextCollector::quoted(&mut parser, '\'');
        assert_eq!(result.unwrap(), "it''s");
        assert_eq!(parser.current(), ' ');
    }

    #[test]
    pub fn test_quoted_unterminated() {
        let mut parser = QueryParser::new("'abc");

        let err = TextCollector::quoted(&mut parser, '\'').unwrap_err();
        assert_eq!(err.start, 0);
        assert_eq!(err.message, "Unterminated quoted text");
    }

    #[test]
    pub fn test_alias_skips_reserved_words() {
        let mut parser = QueryParser::new(" WHERE a = 1");
        assert_eq!(TextCollector::alias(&mut parser).unwrap(), None);
        assert_eq!(parser.position, 1);

        let mut parser = QueryParser::new(" AS total");
        assert_eq!(TextCollector::alias(&mut parser).unwrap(), Some("total".to_string()));

        let mut parser = QueryParser::new(" u WHERE");
        assert_eq!(TextCollector::alias(&mut parser).unwrap(), Some("u".to_string()));
    }

    #[test]
    pub fn test_dotted_name() {
        let mut parser = QueryParser::new("db.users u");

        assert_eq!(TextCollector::dotted_name(&mut parser).unwrap(), "db.users");
    }
}
