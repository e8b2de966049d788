use std::fmt;

use crate::ConversionError;

/// A 12-byte document identifier kept in its 24-character hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn parse(value: &str) -> Result<Self, ConversionError> {
        let value = value.trim();
        if value.len() != 24 || !value.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ConversionError::invalid(format!("Invalid ObjectId: {}", value)));
        }
        Ok(ObjectId(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::ObjectId;

    #[test]
    pub fn test_object_id_parse() {
        assert_eq!(ObjectId::parse("5F1D7A0B9C8E4B2A1D3C4E5F").unwrap().as_str(), "5f1d7a0b9c8e4b2a1d3c4e5f");

        assert_eq!(ObjectId::parse("not-an-id").unwrap_err().to_string(), "Invalid ObjectId: not-an-id");
        assert!(ObjectId::parse("5f1d7a0b9c8e4b2a1d3c4e5").is_err());
    }
}
