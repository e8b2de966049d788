use crate::parser::QueryParser;

/// Case-insensitive matcher for a keyword or an operator at the cursor.
///
/// A space inside the word matches any run of whitespace, so `GROUP BY`
/// also matches `group\n  by`.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    full_block_delimiter_postfix: bool,
    eof: bool,
    delimiter: Option<char>,
    optional_postfix: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        Self {
            length: word.chars().count(),
            word: word.to_uppercase().chars().collect(),
            full_block_delimiter_postfix: false,
            eof: false,
            delimiter: None,
            optional_postfix: vec![],
        }
    }

    /// A keyword must be followed by a delimiter or the end of the text.
    pub fn keyword(word: &str) -> Self {
        Self::new(word).with_any_delimiter_postfix().with_eof()
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        ch != '\0' && !Self::is_identifier_char(ch)
    }

    /// Number of characters the word spans at the cursor, if it matches.
    pub fn matched_len(&self, parser: &QueryParser) -> Option<usize> {
        let mut offset = 0;
        let mut index = 0;
        while index < self.word.len() {
            let expected = self.word[index];
            let ch = parser.peek(offset);
            if expected == ' ' {
                if !Self::is_block_delimiter(ch) {
                    return None;
                }
                while Self::is_block_delimiter(parser.peek(offset)) {
                    offset += 1;
                }
            } else {
                if ch == '\0' || expected != ch.to_ascii_uppercase() {
                    return None;
                }
                offset += 1;
            }
            index += 1;
        }

        let next = parser.peek(offset);
        if next == '\0' && parser.position + offset >= parser.length {
            return if self.eof || !self.has_postfix_rule() { Some(offset) } else { None };
        }

        if !self.has_postfix_rule() {
            return Some(offset);
        }

        if let Some(delimiter) = self.delimiter {
            if next == delimiter {
                return Some(offset);
            }
        }

        if self.full_block_delimiter_postfix && Self::is_any_delimiter(next) {
            return Some(offset);
        }

        if self.optional_postfix.contains(&next) {
            return Some(offset);
        }

        None
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        self.matched_len(parser).is_some()
    }

    pub fn display(&self) -> String {
        self.word.iter().collect()
    }

    fn has_postfix_rule(&self) -> bool {
        self.delimiter.is_some() || self.full_block_delimiter_postfix || !self.optional_postfix.is_empty()
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_any_delimiter_postfix(mut self) -> Self { self.full_block_delimiter_postfix = true; self }
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiter = Some(delimiter); self }
    pub fn with_optional_postfix(mut self, value: char) -> Self { self.optional_postfix.push(value); self }
}

#[cfg(test)]
mod tests {
    use crate::parser::{QueryParser, WordComparer};

    #[test]
    pub fn test_keyword_requires_boundary() {
        let comparer = WordComparer::keyword("FROM");

        assert!(comparer.compare(&QueryParser::new("from t")));
        assert!(comparer.compare(&QueryParser::new("FROM")));
        assert!(comparer.compare(&QueryParser::new("From(")));
        assert!(!comparer.compare(&QueryParser::new("fromage")));
    }

    #[test]
    pub fn test_multi_word_keyword_spans_whitespace() {
        let comparer = WordComparer::keyword("GROUP BY");
        let parser = QueryParser::new("group \n  by x");

        assert_eq!(comparer.matched_len(&parser), Some(11));
        assert!(!comparer.compare(&QueryParser::new("groupby x")));
    }

    #[test]
    pub fn test_operator_without_postfix_rule() {
        let comparer = WordComparer::new("<=");

        assert_eq!(comparer.matched_len(&QueryParser::new("<=5")), Some(2));
        assert!(!comparer.compare(&QueryParser::new("<5")));
    }
}
