use std::collections::HashMap;

use crate::ConversionError;

/// Two-way map between select-item expressions and their aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasHolder {
    alias_from_field: HashMap<String, String>,
    field_from_alias: HashMap<String, String>,
}

impl AliasHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, alias: &str) {
        self.alias_from_field.insert(field.to_string(), alias.to_string());
        self.field_from_alias.insert(alias.to_string(), field.to_string());
    }

    pub fn alias_from_field(&self, field: &str) -> Option<&str> {
        self.alias_from_field.get(field).map(String::as_str)
    }

    /// Alias of a function call. The function name matches case-insensitively,
    /// the arguments exactly.
    pub fn alias_from_call(&self, call: &str) -> Option<&str> {
        self.alias_from_field(call).or_else(|| {
            let wanted = call_key(call);
            self.alias_from_field
                .iter()
                .find(|(field, _)| call_key(field) == wanted)
                .map(|(_, alias)| alias.as_str())
        })
    }

    pub fn contains_alias_for_field(&self, field: &str) -> bool {
        self.alias_from_field.contains_key(field)
    }

    /// Resolves an alias back to its expression; anything else is returned as is.
    pub fn field_from_alias_or_field(&self, field_or_alias: &str) -> Result<String, ConversionError> {
        if self.is_ambiguous(field_or_alias) {
            return Err(ConversionError::invalid(format!("Ambiguous field: {}", field_or_alias)));
        }

        Ok(self
            .field_from_alias
            .get(field_or_alias)
            .cloned()
            .unwrap_or_else(|| field_or_alias.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.alias_from_field.is_empty()
    }

    /// A name is ambiguous when it is both a field with an alias and an alias
    /// of some other field, and the two disagree.
    fn is_ambiguous(&self, field_or_alias: &str) -> bool {
        match (self.alias_from_field.get(field_or_alias), self.field_from_alias.get(field_or_alias)) {
            (Some(alias), Some(field)) => alias != field,
            _ => false,
        }
    }
}

fn call_key(call: &str) -> String {
    match call.split_once('(') {
        Some((name, args)) => format!("{}({}", name.trim().to_ascii_lowercase(), args),
        None => call.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::AliasHolder;

    #[test]
    pub fn test_alias_lookup() {
        let mut holder = AliasHolder::new();
        assert!(holder.is_empty());

        holder.insert("count(*)", "total");

        assert!(!holder.is_empty());
        assert_eq!(holder.alias_from_field("count(*)"), Some("total"));
        assert!(holder.contains_alias_for_field("count(*)"));
        assert_eq!(holder.field_from_alias_or_field("total").unwrap(), "count(*)");
        assert_eq!(holder.field_from_alias_or_field("name").unwrap(), "name");
    }

    #[test]
    pub fn test_call_alias_ignores_function_case() {
        let mut holder = AliasHolder::new();
        holder.insert("COUNT(*)", "n");
        holder.insert("sum(Total)", "revenue");

        assert_eq!(holder.alias_from_call("count(*)"), Some("n"));
        assert_eq!(holder.alias_from_call("SUM(Total)"), Some("revenue"));
        assert_eq!(holder.alias_from_call("sum(total)"), None);
        assert_eq!(holder.alias_from_field("count(*)"), None);
    }

    #[test]
    pub fn test_ambiguous_alias() {
        let mut holder = AliasHolder::new();
        holder.insert("a", "b");
        holder.insert("b", "c");

        assert_eq!(holder.field_from_alias_or_field("b").unwrap_err().to_string(), "Ambiguous field: b");

        let mut swapped = AliasHolder::new();
        swapped.insert("a", "a");
        assert_eq!(swapped.field_from_alias_or_field("a").unwrap(), "a");
    }
}
