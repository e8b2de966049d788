use crate::{analyzer::CommandType, document::Document};

#[derive(Debug, Clone, PartialEq)]
pub struct FilterParts {
    pub query: Document,
    pub sort: Document,
    /// -1 when absent.
    pub limit: i64,
    /// -1 when absent.
    pub offset: i64,
}

impl Default for FilterParts {
    fn default() -> Self {
        Self { query: Document::new(), sort: Document::new(), limit: -1, offset: -1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionParts {
    /// Plain projection, or the `$group` body when the query is grouped.
    pub projection: Document,
    /// Final `$project` that renames grouped output back to select names.
    pub alias_projection: Document,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationParts {
    pub group_by: Vec<String>,
    pub having: Document,
    pub join_pipeline: Vec<Document>,
    /// Stages of a FROM subquery, run before everything else.
    pub prev_steps: Vec<Document>,
    pub multistage: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateParts {
    pub set: Document,
    pub unset: Vec<String>,
    pub documents: Vec<Document>,
}

/// Output accumulated by the stages of one translation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHolder {
    pub collection: String,
    pub command_type: CommandType,
    pub filter: FilterParts,
    pub projection: ProjectionParts,
    pub aggregation: AggregationParts,
    pub update: UpdateParts,
    pub distinct: bool,
    pub count_all: bool,
}

impl QueryHolder {
    pub fn new(collection: &str, command_type: CommandType) -> Self {
        Self {
            collection: collection.to_string(),
            command_type,
            filter: FilterParts::default(),
            projection: ProjectionParts::default(),
            aggregation: AggregationParts::default(),
            update: UpdateParts::default(),
            distinct: false,
            count_all: false,
        }
    }

    /// `$set`/`$unset` update document; empty groups are left out.
    pub fn update_document(&self) -> Document {
        let mut document = Document::new();
        if !self.update.set.is_empty() {
            document.insert("$set", self.update.set.clone());
        }
        if !self.update.unset.is_empty() {
            let unset: Document = self.update.unset.iter().map(|field| (field.clone(), "".into())).collect();
            document.insert("$unset", unset);
        }
        document
    }
}
