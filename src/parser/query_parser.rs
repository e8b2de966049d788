use crate::parser::{ParseError, ParseErrorKind, QueryComparers, WordComparer};

/// Character cursor over a SQL statement.
#[derive(Debug)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub text: String,
    pub comparers: &'static QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            text: query.to_string(),
            comparers: QueryComparers::shared(),
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.text_v.get(self.position + ahead).copied().unwrap_or('\0')
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn next_non_whitespace(&mut self) {
        while self.current().is_whitespace() {
            self.next();
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    /// Skips whitespace and consumes `comparer` when it matches at the cursor.
    pub fn consume(&mut self, comparer: &WordComparer) -> bool {
        self.next_non_whitespace();
        match comparer.matched_len(self) {
            Some(len) => {
                self.jump(len);
                true
            }
            None => false,
        }
    }

    /// Skips whitespace and reports whether `comparer` matches, without consuming it.
    pub fn check(&mut self, comparer: &WordComparer) -> bool {
        self.next_non_whitespace();
        comparer.compare(self)
    }

    pub fn consume_char(&mut self, ch: char) -> bool {
        self.next_non_whitespace();
        if self.current() == ch {
            self.next();
            return true;
        }
        false
    }

    pub fn expect_char(&mut self, ch: char) -> Result<(), ParseError> {
        let pivot = self.position;
        if self.consume_char(ch) {
            return Ok(());
        }
        ParseError::new(&format!("Expected '{}'", ch), pivot, self).err()
    }

    pub fn expect(&mut self, comparer: &WordComparer) -> Result<(), ParseError> {
        let pivot = self.position;
        if self.consume(comparer) {
            return Ok(());
        }
        ParseError::new(&format!("Expected {}", comparer.display()), pivot, self).err()
    }

    /// Accepts trailing semicolons and whitespace, failing on anything else.
    pub fn expect_end(&mut self) -> Result<(), ParseError> {
        while self.consume_char(';') {}
        self.next_non_whitespace();
        if self.eof() {
            return Ok(());
        }

        let pivot = self.position;
        if self.current() == '=' && self.peek(1) == '=' {
            self.jump(2);
            return ParseError::with_kind(ParseErrorKind::DoubleEquals, "Unexpected token '=='", pivot, self).err();
        }
        if self.current() == ',' {
            return ParseError::new("Unexpected token ','", pivot, self).err();
        }
        ParseError::new("Unexpected token", pivot, self).err()
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::QueryParser;

    #[test]
    pub fn test_cursor_moves_and_stops_at_end() {
        let mut parser = QueryParser::new("ab  c");
        assert_eq!(parser.current(), 'a');
        parser.next();
        assert_eq!(parser.current(), 'b');
        parser.next();
        parser.next_non_whitespace();
        assert_eq!(parser.current(), 'c');
        parser.jump(10);
        assert!(parser.eof());
        assert_eq!(parser.current(), '\0');
        assert_eq!(parser.peek(3), '\0');
    }

    #[test]
    pub fn test_consume_keyword() {
        let mut parser = QueryParser::new("  select * from t");
        let comparers = parser.comparers;
        assert!(parser.consume(&comparers.select));
        assert!(!parser.consume(&comparers.from));
        assert!(parser.consume_char('*'));
        assert!(parser.consume(&comparers.from));
        assert_eq!(parser.text_from_range(parser.position, parser.length), " t");
    }

    #[test]
    pub fn test_expect_end_reports_double_equals() {
        let mut parser = QueryParser::new("== 3");
        let err = parser.expect_end().unwrap_err();
        assert_eq!(err.start, 0);
        assert_eq!(err.text, "==");
    }
}
