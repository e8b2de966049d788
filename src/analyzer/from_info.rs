use std::collections::HashMap;

use crate::{analyzer::CommandInfo, parser::ast::JoinType, ConversionError};

/// Anything that can name the collection a source reads from.
pub trait Holder {
    fn base_table_name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub table: String,
}

impl TableInfo {
    pub fn new(table: &str) -> Self {
        Self { table: table.to_string() }
    }
}

impl Holder for TableInfo {
    fn base_table_name(&self) -> &str {
        &self.table
    }
}

/// A resolved FROM or JOIN source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceHolder {
    Table(TableInfo),
    SubQuery(Box<CommandInfo>),
}

impl Holder for SourceHolder {
    fn base_table_name(&self) -> &str {
        match self {
            SourceHolder::Table(table) => table.base_table_name(),
            SourceHolder::SubQuery(info) => info.base_table_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct FromSource {
    /// Explicit alias, or the table name when none was written.
    pub alias: String,
    pub holder: SourceHolder,
    pub join_type: Option<JoinType>,
}

/// Sources of a statement. Index 0 is always the base source; the rest
/// come from joins, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FromInfo {
    sources: Vec<FromSource>,
    aliases: HashMap<String, SourceId>,
}

impl FromInfo {
    pub fn new(alias: Option<&str>, holder: SourceHolder) -> Self {
        let alias = alias.map(str::to_string).unwrap_or_else(|| holder.base_table_name().to_string());
        let mut aliases = HashMap::new();
        aliases.insert(alias.clone(), SourceId(0));

        Self { sources: vec![FromSource { alias, holder, join_type: None }], aliases }
    }

    /// Only INNER and LEFT joins have a lookup counterpart.
    pub fn check_join_type(join_type: JoinType) -> Result<(), ConversionError> {
        match join_type {
            JoinType::Inner | JoinType::Left => Ok(()),
            other => Err(ConversionError::unsupported(format!(
                "Unsupported join type: {}. Only INNER and LEFT JOINs are supported",
                other
            ))),
        }
    }

    pub fn add_join(&mut self, join_type: JoinType, alias: Option<&str>, holder: SourceHolder) -> Result<SourceId, ConversionError> {
        Self::check_join_type(join_type)?;

        let id = SourceId(self.sources.len());
        let alias = alias.map(str::to_string).unwrap_or_else(|| holder.base_table_name().to_string());
        self.aliases.insert(alias.clone(), id);
        self.sources.push(FromSource { alias, holder, join_type: Some(join_type) });
        Ok(id)
    }

    pub fn base(&self) -> &FromSource {
        &self.sources[0]
    }

    pub fn base_alias(&self) -> &str {
        &self.base().alias
    }

    pub fn base_table_name(&self) -> &str {
        self.base().holder.base_table_name()
    }

    /// The nested statement when the base source is a subquery.
    pub fn base_sub_query(&self) -> Option<&CommandInfo> {
        match &self.base().holder {
            SourceHolder::SubQuery(info) => Some(info),
            SourceHolder::Table(_) => None,
        }
    }

    pub fn source(&self, id: SourceId) -> Option<&FromSource> {
        self.sources.get(id.0)
    }

    pub fn source_by_alias(&self, alias: &str) -> Option<&FromSource> {
        self.aliases.get(alias).and_then(|id| self.source(*id))
    }

    pub fn joined(&self) -> impl Iterator<Item = &FromSource> {
        self.sources.iter().skip(1)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analyzer::{FromInfo, Holder, SourceHolder, SourceId, TableInfo},
        parser::ast::JoinType,
    };

    #[test]
    pub fn test_base_alias_defaults_to_table() {
        let from = FromInfo::new(None, SourceHolder::Table(TableInfo::new("users")));

        assert_eq!(from.base_alias(), "users");
        assert_eq!(from.base_table_name(), "users");
        assert!(from.base_sub_query().is_none());
    }

    #[test]
    pub fn test_joins_are_indexed() {
        let mut from = FromInfo::new(Some("u"), SourceHolder::Table(TableInfo::new("users")));

        let id = from.add_join(JoinType::Left, Some("o"), SourceHolder::Table(TableInfo::new("orders")));
        assert_eq!(id.unwrap(), SourceId(1));
        assert_eq!(from.len(), 2);
        assert_eq!(from.source_by_alias("o").map(|source| source.holder.base_table_name()), Some("orders"));
        assert_eq!(from.source_by_alias("u").map(|source| source.join_type), Some(None));
        assert_eq!(from.joined().count(), 1);
    }

    #[test]
    pub fn test_unsupported_join_type() {
        let mut from = FromInfo::new(None, SourceHolder::Table(TableInfo::new("users")));

        let err = from.add_join(JoinType::Full, None, SourceHolder::Table(TableInfo::new("orders"))).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported join type: FULL JOIN. Only INNER and LEFT JOINs are supported");
    }
}
