use tracing::trace;

use crate::{
    analyzer::{CommandInfo, CommandType},
    document::{Document, MongoCommand, Value},
    translator::QueryHolder,
};

/// Ordered aggregation stages for a SELECT.
pub fn pipeline(info: &CommandInfo, holder: &QueryHolder) -> Vec<Document> {
    let mut stages = holder.aggregation.prev_steps.clone();

    if !holder.filter.query.is_empty() {
        stages.push(Document::with("$match", holder.filter.query.clone()));
    }

    stages.extend(holder.aggregation.join_pipeline.iter().cloned());

    if info.is_grouped() {
        let mut group = holder.projection.projection.clone();
        if !group.contains_key("_id") {
            group.shift_insert(0, "_id", Value::Null);
        }
        stages.push(Document::with("$group", group));
    }

    if !holder.aggregation.having.is_empty() {
        stages.push(Document::with("$match", holder.aggregation.having.clone()));
    }
    if !holder.filter.sort.is_empty() {
        stages.push(Document::with("$sort", holder.filter.sort.clone()));
    }
    if holder.filter.offset > 0 {
        stages.push(Document::with("$skip", holder.filter.offset));
    }
    if holder.filter.limit > 0 {
        stages.push(Document::with("$limit", holder.filter.limit));
    }
    if !holder.projection.alias_projection.is_empty() {
        stages.push(Document::with("$project", holder.projection.alias_projection.clone()));
    }
    if !info.is_grouped() && !holder.projection.projection.is_empty() {
        stages.push(Document::with("$project", holder.projection.projection.clone()));
    }

    stages
}

/// Picks the command shape for the accumulated output.
pub fn assemble(info: &CommandInfo, holder: QueryHolder, options: Document) -> MongoCommand {
    let QueryHolder { collection, command_type, filter, .. } = &holder;
    let collection = collection.clone();

    match command_type {
        CommandType::Delete => MongoCommand::Remove { collection, filter: filter.query.clone() },
        CommandType::Update => MongoCommand::UpdateMany {
            collection,
            filter: filter.query.clone(),
            update: holder.update_document(),
        },
        CommandType::Insert => MongoCommand::InsertMany { collection, documents: holder.update.documents.clone() },
        CommandType::Select if holder.distinct => {
            let field = holder.projection.projection.keys().next().cloned().unwrap_or_default();
            MongoCommand::Distinct { collection, field, filter: filter.query.clone() }
        }
        CommandType::Select if holder.count_all && !info.is_aggregate() => {
            MongoCommand::Count { collection, filter: filter.query.clone() }
        }
        CommandType::Select if info.is_aggregate() || holder.aggregation.multistage => {
            let pipeline = pipeline(info, &holder);
            trace!(stages = pipeline.len(), "assembled pipeline");
            MongoCommand::Aggregate { collection, pipeline, options }
        }
        CommandType::Select => MongoCommand::Find {
            collection,
            filter: filter.query.clone(),
            projection: holder.projection.projection.clone(),
            sort: filter.sort.clone(),
            skip: filter.offset,
            limit: filter.limit,
        },
    }
}
