use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{
    analyzer::AliasHolder,
    config::FieldType,
    document::Value,
    parser::ast::{Expr, Literal},
    ConversionError,
};

const NAIVE_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Turns literal and column nodes into output values, coercing them to the
/// declared type of the field they are compared with.
#[derive(Debug, Clone, Copy)]
pub struct ValueNormalizer<'a> {
    default_type: FieldType,
    field_types: &'a HashMap<String, FieldType>,
}

impl<'a> ValueNormalizer<'a> {
    pub fn new(default_type: FieldType, field_types: &'a HashMap<String, FieldType>) -> Self {
        Self { default_type, field_types }
    }

    /// Declared type of the counterpart field; `Unknown` without one.
    pub fn field_type_of(&self, counterpart: Option<&Expr>) -> FieldType {
        match counterpart {
            Some(expr) => self.field_types.get(&expr.string_value()).copied().unwrap_or(self.default_type),
            None => FieldType::Unknown,
        }
    }

    pub fn normalize(&self, expr: &Expr, counterpart: Option<&Expr>, aliases: Option<&AliasHolder>) -> Result<Value, ConversionError> {
        self.normalize_signed(expr, counterpart, aliases, false)
    }

    fn normalize_signed(
        &self,
        expr: &Expr,
        counterpart: Option<&Expr>,
        aliases: Option<&AliasHolder>,
        negative: bool,
    ) -> Result<Value, ConversionError> {
        let field_type = self.field_type_of(counterpart);

        match expr {
            Expr::Signed { negative: inner, expr } => self.normalize_signed(expr, counterpart, aliases, negative != *inner),
            Expr::Literal(literal) => Self::normalize_literal(literal, field_type, negative),
            Expr::Column(column) if column.quoted => Self::normalize_text(&column.name, field_type),
            Expr::Column(column) => match Self::normalize_text(&column.full_name(), field_type)? {
                Value::String(name) => {
                    let resolved = aliases
                        .and_then(|holder| holder.alias_from_field(&name))
                        .map(str::to_string)
                        .unwrap_or(name);
                    Ok(Value::String(resolved))
                }
                coerced => Ok(coerced),
            },
            other => Err(ConversionError::unsupported(format!("Unsupported expression: {}", other))),
        }
    }

    fn normalize_literal(literal: &Literal, field_type: FieldType, negative: bool) -> Result<Value, ConversionError> {
        match literal {
            Literal::String(text) => Self::normalize_text(text, field_type),
            Literal::Int(value) => {
                let value = match negative {
                    true => value
                        .checked_neg()
                        .ok_or_else(|| ConversionError::invalid(format!("Invalid number format: -{}", value)))?,
                    false => *value,
                };
                Self::normalize_number(Value::Int(value), field_type)
            }
            Literal::Float(value) => {
                let value = if negative { -value.into_inner() } else { value.into_inner() };
                Self::normalize_number(Value::Double(value), field_type)
            }
            Literal::Bool(value) => match field_type {
                FieldType::String => Ok(Value::String(value.to_string())),
                _ => Ok(Value::Bool(*value)),
            },
            Literal::Null => Ok(Value::Null),
            Literal::Date(date) => Ok(Value::Date(midnight(*date))),
            Literal::Timestamp(timestamp) => Ok(Value::Date(timestamp.and_utc())),
        }
    }

    fn normalize_number(value: Value, field_type: FieldType) -> Result<Value, ConversionError> {
        let text = match &value {
            Value::Int(number) => number.to_string(),
            Value::Double(number) => format!("{:?}", number),
            _ => return Ok(value),
        };

        match field_type {
            FieldType::String => Ok(Value::String(text)),
            FieldType::Date => Err(ConversionError::invalid(format!("Cannot convert value to date: {}", text))),
            FieldType::Boolean => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
            FieldType::Number | FieldType::Unknown => Ok(value),
        }
    }

    /// Coerces raw string text. Doubled single quotes are collapsed first.
    pub fn normalize_text(text: &str, field_type: FieldType) -> Result<Value, ConversionError> {
        let text = sanitize(text);

        match field_type {
            FieldType::String => Ok(Value::String(text)),
            FieldType::Boolean => Ok(Value::Bool(text.trim().eq_ignore_ascii_case("true"))),
            FieldType::Number => parse_number(&text),
            FieldType::Date => parse_date(&text).map(Value::Date),
            FieldType::Unknown => Ok(sniff_boolean(&text).map(Value::Bool).unwrap_or(Value::String(text))),
        }
    }
}

/// Collapses the SQL `''` escape.
pub fn sanitize(text: &str) -> String {
    text.replace("''", "'")
}

fn sniff_boolean(text: &str) -> Option<bool> {
    match text {
        _ if text.eq_ignore_ascii_case("true") => Some(true),
        _ if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_number(text: &str) -> Result<Value, ConversionError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(Value::Int(value));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Value::Double(value)),
        _ => Err(ConversionError::invalid(format!("Invalid number format: {}", text))),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// ISO-8601 first, then the date-only layouts.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    let trimmed = text.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(value.with_timezone(&Utc));
    }
    if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, NAIVE_DATE_TIME_FORMAT) {
        return Ok(value.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(midnight)
        .ok_or_else(|| ConversionError::invalid(format!("Invalid date format: {}", text)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use ordered_float::NotNan;

    use crate::{
        analyzer::AliasHolder,
        config::FieldType,
        document::Value,
        parser::ast::{ArithmeticOp, Column, Expr, Literal},
        translator::ValueNormalizer,
    };

    fn types() -> HashMap<String, FieldType> {
        HashMap::from([
            ("age".to_string(), FieldType::Number),
            ("name".to_string(), FieldType::String),
            ("born".to_string(), FieldType::Date),
            ("active".to_string(), FieldType::Boolean),
        ])
    }

    #[test]
    pub fn test_string_coercion() {
        let types = types();
        let normalizer = ValueNormalizer::new(FieldType::Unknown, &types);

        let age = Expr::column("age");
        assert_eq!(normalizer.normalize(&Expr::string("42"), Some(&age), None).unwrap(), Value::Int(42));
        assert_eq!(normalizer.normalize(&Expr::string("4.5"), Some(&age), None).unwrap(), Value::Double(4.5));

        assert_eq!(
            normalizer.normalize(&Expr::string("abc"), Some(&age), None).unwrap_err().to_string(),
            "Invalid number format: abc"
        );

        let born = Expr::column("born");
        assert_eq!(
            normalizer.normalize(&Expr::string("2020-01-02"), Some(&born), None).unwrap(),
            Value::Date(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(
            normalizer.normalize(&Expr::string("20200102"), Some(&born), None).unwrap(),
            Value::Date(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(
            normalizer.normalize(&Expr::string("2020-01-02T03:04:05Z"), Some(&born), None).unwrap(),
            Value::Date(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
        );
        assert!(normalizer.normalize(&Expr::string("soon"), Some(&born), None).is_err());

        let active = Expr::column("active");
        assert_eq!(normalizer.normalize(&Expr::string("TRUE"), Some(&active), None).unwrap(), Value::Bool(true));
    }

    #[test]
    pub fn test_unknown_type_sniffs_booleans() {
        let types = HashMap::new();
        let normalizer = ValueNormalizer::new(FieldType::Unknown, &types);

        assert_eq!(normalizer.normalize(&Expr::string("False"), None, None).unwrap(), Value::Bool(false));
        assert_eq!(normalizer.normalize(&Expr::string("O''Brien"), None, None).unwrap(), Value::from("O'Brien"));
        assert_eq!(normalizer.normalize(&Expr::string("42"), None, None).unwrap(), Value::from("42"));
    }

    #[test]
    pub fn test_number_coercion_and_sign() {
        let types = types();
        let normalizer = ValueNormalizer::new(FieldType::Unknown, &types);
        let name = Expr::column("name");
        let born = Expr::column("born");
        let negative = Expr::Signed { negative: true, expr: Box::new(Expr::int(7)) };

        assert_eq!(normalizer.normalize(&negative, None, None).unwrap(), Value::Int(-7));
        assert_eq!(normalizer.normalize(&Expr::int(7), Some(&name), None).unwrap(), Value::from("7"));

        let float = Expr::Literal(Literal::Float(NotNan::new(2.5).unwrap()));
        assert_eq!(normalizer.normalize(&float, Some(&name), None).unwrap(), Value::from("2.5"));

        assert_eq!(
            normalizer.normalize(&Expr::int(7), Some(&born), None).unwrap_err().to_string(),
            "Cannot convert value to date: 7"
        );
    }

    #[test]
    pub fn test_default_type_applies_to_unmapped_fields() {
        let types = HashMap::new();
        let normalizer = ValueNormalizer::new(FieldType::String, &types);
        let city = Expr::column("city");

        assert_eq!(normalizer.normalize(&Expr::Literal(Literal::Bool(true)), Some(&city), None).unwrap(), Value::from("true"));
        assert_eq!(normalizer.normalize(&Expr::string("true"), None, None).unwrap(), Value::Bool(true));
    }

    #[test]
    pub fn test_columns_and_aliases() {
        let types = types();
        let normalizer = ValueNormalizer::new(FieldType::Unknown, &types);
        let mut aliases = AliasHolder::new();
        aliases.insert("name", "n");

        let column = Expr::Column(Column::new("name"));
        assert_eq!(normalizer.normalize(&column, None, Some(&aliases)).unwrap(), Value::from("n"));
        assert_eq!(normalizer.normalize(&column, None, None).unwrap(), Value::from("name"));

        let age = Expr::column("age");
        assert_eq!(
            normalizer.normalize(&Expr::column("x"), Some(&age), None).unwrap_err().to_string(),
            "Invalid number format: x"
        );
        assert_eq!(normalizer.normalize(&Expr::column("true"), None, None).unwrap(), Value::Bool(true));
        assert_eq!(normalizer.normalize(&column, Some(&Expr::column("name")), Some(&aliases)).unwrap(), Value::from("n"));

        let quoted = Expr::Column(Column::quoted("12"));
        assert_eq!(normalizer.normalize(&quoted, Some(&Expr::column("age")), None).unwrap(), Value::Int(12));

        let arithmetic = Expr::Arithmetic { left: Box::new(Expr::int(1)), op: ArithmeticOp::Add, right: Box::new(Expr::int(2)) };
        assert_eq!(
            normalizer.normalize(&arithmetic, None, None).unwrap_err().to_string(),
            "Unsupported expression: 1 + 2"
        );
    }
}
