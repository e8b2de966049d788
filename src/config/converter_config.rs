use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{config::FieldType, document::{Document, Value}};

/// Per-conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// Type used for fields missing from `field_types`.
    pub default_field_type: FieldType,
    pub field_types: HashMap<String, FieldType>,
    pub aggregation_allow_disk_use: Option<bool>,
    pub aggregation_batch_size: Option<u32>,
    /// Emits the original and converted query through `tracing`.
    pub log_query_enabled: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            default_field_type: FieldType::Unknown,
            field_types: HashMap::new(),
            aggregation_allow_disk_use: None,
            aggregation_batch_size: None,
            log_query_enabled: true,
        }
    }
}

impl ConverterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_field_type(mut self, field_type: FieldType) -> Self {
        self.default_field_type = field_type;
        self
    }

    pub fn with_field_type(mut self, field: &str, field_type: FieldType) -> Self {
        self.field_types.insert(field.to_string(), field_type);
        self
    }

    pub fn with_field_types(mut self, field_types: HashMap<String, FieldType>) -> Self {
        self.field_types = field_types;
        self
    }

    pub fn with_allow_disk_use(mut self, allow: bool) -> Self {
        self.aggregation_allow_disk_use = Some(allow);
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.aggregation_batch_size = Some(size);
        self
    }

    pub fn with_log_query(mut self, enabled: bool) -> Self {
        self.log_query_enabled = enabled;
        self
    }

    /// Resolves the declared type of `field`, falling back to the default.
    pub fn field_type(&self, field: &str) -> FieldType {
        self.field_types.get(field).copied().unwrap_or(self.default_field_type)
    }

    /// Options passed as the second argument of `aggregate`.
    pub fn aggregation_options(&self) -> Document {
        let mut options = Document::new();
        if let Some(allow) = self.aggregation_allow_disk_use {
            options.insert("allowDiskUse", Value::Bool(allow));
        }
        if let Some(size) = self.aggregation_batch_size {
            options.insert("cursor", Document::with("batchSize", Value::Int(size as i64)));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::{ConverterConfig, FieldType};

    #[test]
    pub fn test_default_config() {
        let config = ConverterConfig::default();

        assert_eq!(config.default_field_type, FieldType::Unknown);
        assert!(config.field_types.is_empty());
        assert!(config.log_query_enabled);
        assert!(config.aggregation_options().is_empty());
    }

    #[test]
    pub fn test_field_type_lookup() {
        let config = ConverterConfig::new()
            .with_default_field_type(FieldType::String)
            .with_field_type("age", FieldType::Number);

        assert_eq!(config.field_type("age"), FieldType::Number);
        assert_eq!(config.field_type("name"), FieldType::String);
    }

    #[test]
    pub fn test_aggregation_options() {
        let config = ConverterConfig::new().with_allow_disk_use(true).with_batch_size(50);

        assert_eq!(config.aggregation_options().to_json(), json!({"allowDiskUse": true, "cursor": {"batchSize": 50}}));
    }

    #[test]
    pub fn test_config_from_json() {
        let config: ConverterConfig = serde_json::from_value(json!({
            "defaultFieldType": "NUMBER",
            "fieldTypes": {"created": "DATE"},
            "aggregationBatchSize": 10,
            "logQueryEnabled": false
        }))
        .unwrap();

        assert_eq!(config.default_field_type, FieldType::Number);
        assert_eq!(config.field_type("created"), FieldType::Date);
        assert_eq!(config.aggregation_batch_size, Some(10));
        assert_eq!(config.aggregation_allow_disk_use, None);
        assert!(!config.log_query_enabled);
    }
}
