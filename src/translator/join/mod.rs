pub mod on_clause;
pub use on_clause::*;

pub mod where_match;
pub use where_match::*;

use tracing::trace;

use crate::{
    analyzer::{CommandInfo, Holder, SourceHolder},
    document::{Document, Value},
    parser::ast::{Expr, JoinType},
    translator::{PredicateCompiler, ValueNormalizer},
    ConversionError,
};

/// Lowers the joins of `info` into `$lookup`/`$unwind` pairs, followed by a
/// `$match` for the WHERE conjuncts that could not run earlier.
pub fn compile_joins(info: &CommandInfo, matched: &WhereMatch) -> Result<Vec<Document>, ConversionError> {
    let normalizer = ValueNormalizer::new(info.default_field_type, &info.field_types);
    let base_alias = info.base_alias();
    let mut stages = vec![];

    for (join, source) in info.joins.iter().zip(info.from.joined()) {
        let SourceHolder::Table(table) = &source.holder else {
            return Err(ConversionError::unsupported("Currently only table-based JOIN is supported"));
        };

        let mut conditions: Vec<Expr> = join.on.iter().cloned().collect();
        conditions.extend(matched.folded_for(&source.alias).iter().cloned());

        let mut lookup = Document::with("from", table.base_table_name());
        let mut pipeline: Vec<Value> = vec![];
        let bindings = match Expr::conjunction(conditions) {
            Some(condition) => {
                let bound = bind_columns(&condition, &source.alias, base_alias);
                let compiled = PredicateCompiler::new(normalizer, true).compile(&bound.condition)?;
                pipeline.push(Document::with("$match", compiled).into());
                bound.bindings
            }
            None => Document::new(),
        };
        lookup.insert("let", bindings);
        lookup.insert("pipeline", pipeline);
        lookup.insert("as", source.alias.as_str());

        trace!(alias = %source.alias, join_type = %join.join_type, "compiled lookup");

        let mut unwind = Document::with("path", format!("${}", source.alias));
        unwind.insert("preserveNullAndEmptyArrays", join.join_type == JoinType::Left);

        stages.push(Document::with("$lookup", lookup));
        stages.push(Document::with("$unwind", unwind));
    }

    if let Some(trailing) = Expr::conjunction(matched.trailing.clone()) {
        let compiled = PredicateCompiler::new(normalizer, false).compile(&trailing)?;
        stages.push(Document::with("$match", compiled));
    }

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        analyzer::{CommandInfo, CommandInfoBuilder},
        config::ConverterConfig,
        parser::ast::Statement,
        translator::join::{compile_joins, WhereMatch},
    };

    fn info(sql: &str) -> CommandInfo {
        let statement = Statement::try_from(sql).unwrap();
        CommandInfoBuilder::new(&ConverterConfig::default()).build(&statement).unwrap()
    }

    fn stages(sql: &str) -> Vec<serde_json::Value> {
        let info = info(sql);
        let matched = WhereMatch::partition(info.where_clause.as_ref(), &info.from);
        compile_joins(&info, &matched).unwrap().iter().map(|stage| stage.to_json()).collect()
    }

    #[test]
    pub fn test_left_join_lookup() {
        let stages = stages("SELECT u.name, o.total FROM users u LEFT JOIN orders o ON u._id = o.user_id");

        assert_eq!(
            stages,
            vec![
                json!({ "$lookup": {
                    "from": "orders",
                    "let": { "u__id": "$_id" },
                    "pipeline": [{ "$match": { "$expr": { "$eq": ["$$u__id", "$user_id"] } } }],
                    "as": "o"
                } }),
                json!({ "$unwind": { "path": "$o", "preserveNullAndEmptyArrays": true } }),
            ]
        );
    }

    #[test]
    pub fn test_inner_join_folds_where() {
        let stages = stages(
            "SELECT u.name FROM users u INNER JOIN orders o ON u._id = o.user_id WHERE o.total > 10 AND u.age > 3",
        );

        assert_eq!(stages.len(), 2);
        assert_eq!(
            stages[0]["$lookup"]["pipeline"],
            json!([{ "$match": { "$and": [
                { "$expr": { "$eq": ["$$u__id", "$user_id"] } },
                { "$expr": { "$gt": ["$total", 10] } }
            ] } }])
        );
        assert_eq!(stages[1], json!({ "$unwind": { "path": "$o", "preserveNullAndEmptyArrays": false } }));
    }

    #[test]
    pub fn test_disjunction_runs_after_unwind() {
        let stages = stages("SELECT u.name FROM users u JOIN orders o ON u._id = o.user_id WHERE o.total > 10 OR u.age > 3");

        assert_eq!(stages.len(), 3);
        assert_eq!(
            stages[2],
            json!({ "$match": { "$or": [{ "o.total": { "$gt": 10 } }, { "age": { "$gt": 3 } }] } })
        );
        assert_eq!(
            stages[0]["$lookup"]["pipeline"],
            json!([{ "$match": { "$expr": { "$eq": ["$$u__id", "$user_id"] } } }])
        );
    }

    #[test]
    pub fn test_join_without_on() {
        let stages = stages("SELECT name FROM users JOIN orders");

        assert_eq!(stages[0], json!({ "$lookup": { "from": "orders", "let": {}, "pipeline": [], "as": "orders" } }));
    }

    #[test]
    pub fn test_subquery_join_rejected() {
        let info = info("SELECT a FROM users u JOIN (SELECT b FROM orders) o ON u.id = o.id");
        assert_eq!(
            compile_joins(&info, &WhereMatch::default()).unwrap_err().to_string(),
            "Currently only table-based JOIN is supported"
        );
    }
}
