use std::fmt;

/// A column reference. `a.b.c` keeps `a` as the qualifier and `b.c` as the
/// name, so an unknown qualifier still renders the full dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
    /// Double or back-quoted token; compiled as a value, not a field.
    pub quoted: bool,
}

impl Column {
    pub fn new(name: &str) -> Self {
        Self { table: None, name: name.to_string(), quoted: false }
    }

    pub fn qualified(table: &str, name: &str) -> Self {
        Self { table: Some(table.to_string()), name: name.to_string(), quoted: false }
    }

    pub fn quoted(name: &str) -> Self {
        Self { table: None, name: name.to_string(), quoted: true }
    }

    pub fn full_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.clone(),
        }
    }

    pub fn belongs_to(&self, alias: &str) -> bool {
        self.table.as_deref() == Some(alias)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            return write!(f, "\"{}\"", self.name);
        }
        write!(f, "{}", self.full_name())
    }
}
