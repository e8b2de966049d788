use std::fmt;

use crate::{document::Document, ConversionError};

/// A translated statement, ready to be rendered as shell text.
#[derive(Debug, Clone, PartialEq)]
pub enum MongoCommand {
    Find {
        collection: String,
        filter: Document,
        projection: Document,
        sort: Document,
        skip: i64,
        limit: i64,
    },
    Count {
        collection: String,
        filter: Document,
    },
    Distinct {
        collection: String,
        field: String,
        filter: Document,
    },
    Aggregate {
        collection: String,
        pipeline: Vec<Document>,
        options: Document,
    },
    Remove {
        collection: String,
        filter: Document,
    },
    UpdateMany {
        collection: String,
        filter: Document,
        update: Document,
    },
    InsertMany {
        collection: String,
        documents: Vec<Document>,
    },
}

impl MongoCommand {
    pub fn collection(&self) -> &str {
        match self {
            MongoCommand::Find { collection, .. }
            | MongoCommand::Count { collection, .. }
            | MongoCommand::Distinct { collection, .. }
            | MongoCommand::Aggregate { collection, .. }
            | MongoCommand::Remove { collection, .. }
            | MongoCommand::UpdateMany { collection, .. }
            | MongoCommand::InsertMany { collection, .. } => collection,
        }
    }

    /// Shell name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            MongoCommand::Find { .. } => "find",
            MongoCommand::Count { .. } => "count",
            MongoCommand::Distinct { .. } => "distinct",
            MongoCommand::Aggregate { .. } => "aggregate",
            MongoCommand::Remove { .. } => "remove",
            MongoCommand::UpdateMany { .. } => "updateMany",
            MongoCommand::InsertMany { .. } => "insertMany",
        }
    }

    pub fn render(&self) -> Result<String, ConversionError> {
        let args = match self {
            MongoCommand::Find { filter, projection, sort, skip, limit, .. } => {
                let mut text = serde_json::to_string(filter)?;
                if !projection.is_empty() {
                    text.push_str(", ");
                    text.push_str(&serde_json::to_string(projection)?);
                }
                text.push(')');
                if !sort.is_empty() {
                    text.push_str(&format!(".sort({})", serde_json::to_string(sort)?));
                }
                if *skip > 0 {
                    text.push_str(&format!(".skip({})", skip));
                }
                if *limit > 0 {
                    text.push_str(&format!(".limit({})", limit));
                }
                return Ok(format!("db.{}.find({}", self.collection(), text));
            }
            MongoCommand::Count { filter, .. } | MongoCommand::Remove { filter, .. } => serde_json::to_string(filter)?,
            MongoCommand::Distinct { field, filter, .. } => {
                format!("{}, {}", serde_json::to_string(field)?, serde_json::to_string(filter)?)
            }
            MongoCommand::Aggregate { pipeline, options, .. } => {
                let stages = serde_json::to_string(pipeline)?;
                match options.is_empty() {
                    true => stages,
                    false => format!("{}, {}", stages, serde_json::to_string(options)?),
                }
            }
            MongoCommand::UpdateMany { filter, update, .. } => {
                format!("{}, {}", serde_json::to_string(filter)?, serde_json::to_string(update)?)
            }
            MongoCommand::InsertMany { documents, .. } => serde_json::to_string(documents)?,
        };

        Ok(format!("db.{}.{}({})", self.collection(), self.name(), args))
    }
}

impl fmt::Display for MongoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render().map_err(|_| fmt::Error)?;
        write!(f, "{}", text)
    }
}
