use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{
    document::Document,
    parser::ast::{ComparatorOp, Expr, Literal},
    translator::predicate::MongoOperator,
    ConversionError,
};

/// `date(col, 'pattern') <op> 'value'`: the value is parsed with the
/// pattern and compared as a native date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateOperator {
    pub column: String,
    pub date: DateTime<Utc>,
    pub operator: &'static str,
}

impl DateOperator {
    pub fn identify(expr: &Expr) -> Result<Option<Self>, ConversionError> {
        let Expr::Compare { left, op, right } = expr else {
            return Ok(None);
        };
        let Expr::Function(function) = left.as_ref() else {
            return Ok(None);
        };
        if !function.is_named("date") || function.args.len() != 2 {
            return Ok(None);
        }
        let Expr::Literal(Literal::String(format)) = &function.args[1] else {
            return Ok(None);
        };

        let Expr::Literal(Literal::String(value)) = right.as_ref() else {
            return Err(ConversionError::unsupported(format!("Unsupported date comparison: {}", expr)));
        };
        Ok(Some(Self {
            column: function.args[0].string_value(),
            date: parse_with_pattern(format, value)?,
            operator: operator_for(*op)?,
        }))
    }
}

impl MongoOperator for DateOperator {
    fn column(&self) -> Option<&str> {
        Some(&self.column)
    }

    fn to_document(&self) -> Result<Document, ConversionError> {
        Ok(Document::with(self.column.as_str(), Document::with(self.operator, self.date)))
    }
}

fn operator_for(op: ComparatorOp) -> Result<&'static str, ConversionError> {
    match op {
        ComparatorOp::Eq => Ok("$eq"),
        ComparatorOp::Gt => Ok("$gt"),
        ComparatorOp::GtEq => Ok("$gte"),
        ComparatorOp::Lt => Ok("$lt"),
        ComparatorOp::LtEq => Ok("$lte"),
        ComparatorOp::NotEq => Err(ConversionError::unsupported(format!("Unsupported comparison operator: {}", op))),
    }
}

/// Parses `value` with a `yyyy-MM-dd HH:mm:ss` style pattern. An offset in
/// the pattern yields an instant, otherwise the value is read as UTC date-time
/// and finally as a UTC date at midnight.
pub fn parse_with_pattern(pattern: &str, value: &str) -> Result<DateTime<Utc>, ConversionError> {
    let failure = || ConversionError::invalid(format!("Unable to parse date: {} with format: {}", value, pattern));
    let format = chrono_format(pattern).ok_or_else(failure)?;

    if let Ok(instant) = DateTime::parse_from_str(value, &format) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, &format) {
        return Ok(date_time.and_utc());
    }
    NaiveDate::parse_from_str(value, &format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date_time| date_time.and_utc())
        .ok_or_else(failure)
}

/// Rewrites pattern letters into `strftime` specifiers. Returns `None` for
/// letters without a counterpart.
fn chrono_format(pattern: &str) -> Option<String> {
    let mut format = String::new();
    let chars: Vec<char> = pattern.chars().collect();
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];

        if ch == '\'' {
            index += 1;
            while index < chars.len() {
                if chars[index] == '\'' {
                    if chars.get(index + 1) == Some(&'\'') {
                        format.push('\'');
                        index += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut format, chars[index]);
                index += 1;
            }
            index += 1;
            continue;
        }

        if !ch.is_ascii_alphabetic() {
            push_literal(&mut format, ch);
            index += 1;
            continue;
        }

        let run = chars[index..].iter().take_while(|next| **next == ch).count();
        let specifier = match (ch, run) {
            ('y' | 'u', 2) => "%y",
            ('y' | 'u', _) => "%Y",
            ('M', 1..=2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', _) => "%d",
            ('D', _) => "%j",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', 3) => "%3f",
            ('S', 6) => "%6f",
            ('S', 9) => "%9f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('X' | 'x' | 'Z', _) => "%z",
            _ => return None,
        };
        format.push_str(specifier);
        index += run;
    }

    Some(format)
}

fn push_literal(format: &mut String, ch: char) {
    match ch {
        '%' => format.push_str("%%"),
        other => format.push(other),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use crate::{
        parser::{ast::Expr, QueryParser},
        translator::predicate::{date_operator::parse_with_pattern, DateOperator, MongoOperator},
    };

    fn parse(text: &str) -> Expr {
        let mut parser = QueryParser::new(text);
        Expr::parse(&mut parser).unwrap()
    }

    #[test]
    pub fn test_parse_granularities() {
        assert_eq!(
            parse_with_pattern("yyyy-MM-dd", "2020-01-02").unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_with_pattern("yyyy-MM-dd HH:mm:ss", "2020-01-02 03:04:05").unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
        );
        assert_eq!(
            parse_with_pattern("yyyy-MM-dd'T'HH:mm:ssZ", "2020-01-02T03:04:05+0200").unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 1, 4, 5).unwrap()
        );
        assert_eq!(
            parse_with_pattern("dd/MM/yyyy", "05/11/2021").unwrap(),
            Utc.with_ymd_and_hms(2021, 11, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    pub fn test_parse_failure() {
        assert_eq!(
            parse_with_pattern("yyyy-MM-dd", "yesterday").unwrap_err().to_string(),
            "Unable to parse date: yesterday with format: yyyy-MM-dd"
        );
        assert!(parse_with_pattern("yyyy-QQ", "2020-01").is_err());
    }

    #[test]
    pub fn test_date_operator_document() {
        let operator = DateOperator::identify(&parse("date(created, 'yyyy-MM-dd') >= '2020-01-02'")).unwrap().unwrap();
        assert_eq!(
            operator.to_document().unwrap().to_json(),
            json!({ "created": { "$gte": { "$date": "2020-01-02T00:00:00.000Z" } } })
        );

        let err = DateOperator::identify(&parse("date(created, 'yyyy-MM-dd') <> '2020-01-02'")).unwrap_err();
        assert!(err.to_string().contains("Unsupported comparison operator"));

        assert!(matches!(DateOperator::identify(&parse("created >= '2020-01-02'")), Ok(None)));
    }

    #[test]
    pub fn test_date_compared_to_column() {
        let err = DateOperator::identify(&parse("date(created, 'yyyy-MM-dd') > updated")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported date comparison: date(created, 'yyyy-MM-dd') > updated");
    }
}
