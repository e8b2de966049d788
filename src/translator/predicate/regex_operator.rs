use regex::Regex;

use crate::{
    document::Document,
    parser::ast::{ComparatorOp, Expr, Function, Literal},
    translator::{normalizer::sanitize, predicate::MongoOperator},
    ConversionError,
};

const REGEX_MATCH: &str = "regexMatch";
const NOT_REGEX_MATCH: &str = "notRegexMatch";

/// `regexMatch(col, 'pattern'[, 'options'])`, optionally compared to `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexOperator {
    pub column: String,
    pub pattern: String,
    pub options: Option<String>,
    pub negated: bool,
}

impl RegexOperator {
    /// Recognizes `regexMatch(..) = <bool>` and a bare `regexMatch(..)` call.
    pub fn identify(expr: &Expr) -> Result<Option<Self>, ConversionError> {
        match expr {
            Expr::Compare { left, op: ComparatorOp::Eq, right } => {
                let Expr::Function(function) = left.as_ref() else {
                    return Ok(None);
                };
                if !Self::is_regex_call(function) {
                    return Ok(None);
                }
                if !is_true(right) {
                    return Err(ConversionError::invalid("False is not allowed for regexMatch function"));
                }
                Self::from_function(function).map(Some)
            }
            Expr::Function(function) => Self::identify_call(function),
            _ => Ok(None),
        }
    }

    pub fn identify_call(function: &Function) -> Result<Option<Self>, ConversionError> {
        match Self::is_regex_call(function) {
            true => Self::from_function(function).map(Some),
            false => Ok(None),
        }
    }

    fn is_regex_call(function: &Function) -> bool {
        (function.is_named(REGEX_MATCH) || function.is_named(NOT_REGEX_MATCH))
            && matches!(function.args.len(), 2 | 3)
            && matches!(function.args[1], Expr::Literal(Literal::String(_)))
    }

    fn from_function(function: &Function) -> Result<Self, ConversionError> {
        let pattern = match &function.args[1] {
            Expr::Literal(Literal::String(pattern)) => sanitize(pattern),
            other => return Err(ConversionError::invalid(format!("Invalid regex pattern: {}", other))),
        };
        Regex::new(&pattern).map_err(|err| ConversionError::invalid(format!("Invalid regex pattern {}: {}", pattern, err)))?;

        let options = match function.args.get(2) {
            Some(Expr::Literal(Literal::String(options))) => Some(options.clone()),
            _ => None,
        };

        Ok(Self {
            column: function.args[0].string_value(),
            pattern,
            options,
            negated: function.is_named(NOT_REGEX_MATCH),
        })
    }
}

impl MongoOperator for RegexOperator {
    fn column(&self) -> Option<&str> {
        Some(&self.column)
    }

    fn to_document(&self) -> Result<Document, ConversionError> {
        let mut regex = Document::with("$regex", self.pattern.as_str());
        if let Some(options) = &self.options {
            if self.negated {
                return Err(ConversionError::unsupported("$not regex not supported with options"));
            }
            regex.insert("$options", options.as_str());
        }

        let condition = match self.negated {
            true => Document::with("$not", regex),
            false => regex,
        };
        Ok(Document::with(self.column.as_str(), condition))
    }
}

fn is_true(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(Literal::Bool(value)) => *value,
        other => other.string_value().trim().eq_ignore_ascii_case("true"),
    }
}

/// Translates a LIKE pattern into an anchored regular expression.
///
/// `%` becomes `.*`, `_` becomes `.` and a bracketed set matches exactly one
/// character. Everything else is matched literally.
pub fn like_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut literal = String::new();
    let mut chars = pattern.chars();

    let flush = |literal: &mut String, out: &mut String| {
        out.push_str(&regex::escape(literal));
        literal.clear();
    };

    while let Some(ch) = chars.next() {
        match ch {
            '%' => {
                flush(&mut literal, &mut out);
                out.push_str(".*");
            }
            '_' => {
                flush(&mut literal, &mut out);
                out.push('.');
            }
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' {
                        closed = true;
                        break;
                    }
                    class.push(next);
                }
                flush(&mut literal, &mut out);
                match closed {
                    true => out.push_str(&format!("[{}]{{1}}", class)),
                    false => out.push_str(&regex::escape(&format!("[{}", class))),
                }
            }
            other => literal.push(other),
        }
    }
    flush(&mut literal, &mut out);
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        parser::{ast::Expr, QueryParser},
        translator::predicate::{like_to_regex, MongoOperator, RegexOperator},
    };

    fn parse(text: &str) -> Expr {
        let mut parser = QueryParser::new(text);
        Expr::parse(&mut parser).unwrap()
    }

    fn document(text: &str) -> serde_json::Value {
        RegexOperator::identify(&parse(text)).unwrap().unwrap().to_document().unwrap().to_json()
    }

    #[test]
    pub fn test_regex_match() {
        assert_eq!(document("regexMatch(name, '^a.*') = true"), json!({ "name": { "$regex": "^a.*" } }));
        assert_eq!(
            document("regexMatch(name, '^a', 'i') = true"),
            json!({ "name": { "$regex": "^a", "$options": "i" } })
        );
        assert_eq!(document("notRegexMatch(name, 'x')"), json!({ "name": { "$not": { "$regex": "x" } } }));
    }

    #[test]
    pub fn test_regex_rejections() {
        assert_eq!(
            RegexOperator::identify(&parse("regexMatch(name, 'a') = false")).unwrap_err().to_string(),
            "False is not allowed for regexMatch function"
        );

        assert!(RegexOperator::identify(&parse("regexMatch(name, '(a') = true")).is_err());

        let negated = RegexOperator::identify(&parse("notRegexMatch(name, 'a', 'i') = true")).unwrap().unwrap();
        assert_eq!(negated.to_document().unwrap_err().to_string(), "$not regex not supported with options");

        assert!(matches!(RegexOperator::identify(&parse("lower(name) = 'a'")), Ok(None)));
        assert!(matches!(RegexOperator::identify(&parse("regexMatch(name, other) = true")), Ok(None)));
    }

    #[test]
    pub fn test_like_to_regex() {
        assert_eq!(like_to_regex("%abc_"), "^.*abc.$");
        assert_eq!(like_to_regex("[a-c]%"), "^[a-c]{1}.*$");
        assert_eq!(like_to_regex("a.b%"), "^a\\.b.*$");
        assert_eq!(like_to_regex("plain"), "^plain$");
    }
}
