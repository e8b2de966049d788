use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ConversionError;

/// Coercion target for literals compared against a field.
///
/// - `String`: numbers are stringified.
/// - `Number`: strings are parsed as integer, then double, then float.
/// - `Boolean`: values are read as `true`/`false`.
/// - `Date`: strings are parsed as ISO-8601, `yyyy-MM-dd` or `yyyyMMdd`.
/// - `Unknown`: strings that read as booleans become booleans, the rest pass through.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    #[default]
    Unknown,
}

impl FromStr for FieldType {
    type Err = ConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "STRING" => Ok(FieldType::String),
            "NUMBER" => Ok(FieldType::Number),
            "BOOLEAN" => Ok(FieldType::Boolean),
            "DATE" => Ok(FieldType::Date),
            "UNKNOWN" => Ok(FieldType::Unknown),
            _ => Err(ConversionError::InvalidValue(format!("Invalid field type: {}", value))),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "STRING",
            FieldType::Number => "NUMBER",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
            FieldType::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}
