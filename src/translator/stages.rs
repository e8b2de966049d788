use tracing::{debug, trace};

use crate::{
    analyzer::{CommandInfo, Holder},
    document::{Document, Value},
    parser::ast::{Expr, Literal},
    translator::{
        aggregation::{accumulator, alias_projection, group_key, group_projection},
        assembler,
        function_names::is_aggregate_expression,
        join::{compile_joins, WhereMatch},
        PredicateCompiler, QueryHolder, ValueNormalizer,
    },
    ConversionError,
};

/// One step of a translation. Stages run in a fixed order, each reading the
/// command and extending what the previous ones accumulated.
pub trait QueryStage {
    fn name(&self) -> &'static str;
    fn process(&self, info: &CommandInfo, holder: QueryHolder) -> Result<QueryHolder, ConversionError>;
}

pub fn default_stages() -> Vec<Box<dyn QueryStage>> {
    vec![
        Box::new(FromSubQueryStage),
        Box::new(DistinctStage),
        Box::new(GroupByStage),
        Box::new(TotalGroupStage),
        Box::new(ProjectionStage),
        Box::new(CountAllStage),
        Box::new(JoinStage),
        Box::new(OrderByStage),
        Box::new(WhereStage),
        Box::new(HavingStage),
        Box::new(PaginationStage),
        Box::new(UpdateStage),
        Box::new(InsertStage),
    ]
}

/// Runs every stage over a fresh holder for `info`.
pub fn run_stages(info: &CommandInfo) -> Result<QueryHolder, ConversionError> {
    let mut holder = QueryHolder::new(info.base_table_name(), info.command_type);

    for stage in default_stages() {
        trace!(stage = stage.name(), "processing stage");
        holder = stage.process(info, holder)?;
    }

    debug!(collection = %holder.collection, command = %info.command_type, "stages processed");
    Ok(holder)
}

fn normalizer(info: &CommandInfo) -> ValueNormalizer<'_> {
    ValueNormalizer::new(info.default_field_type, &info.field_types)
}

pub struct FromSubQueryStage;

impl QueryStage for FromSubQueryStage {
    fn name(&self) -> &'static str {
        "from_sub_query"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        if let Some(sub_query) = info.from.base_sub_query() {
            let nested = run_stages(sub_query)?;
            holder.aggregation.prev_steps = assembler::pipeline(sub_query, &nested);
            holder.aggregation.multistage = true;
        }
        Ok(holder)
    }
}

pub struct DistinctStage;

impl QueryStage for DistinctStage {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        if info.distinct {
            if let Some(item) = info.select_items.first() {
                holder.projection.projection = Document::with(item.expr.string_value(), 1);
            }
            holder.distinct = true;
        }
        Ok(holder)
    }
}

pub struct GroupByStage;

impl QueryStage for GroupByStage {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        if info.group_by_fields.is_empty() {
            return Ok(holder);
        }

        holder.aggregation.group_by = info.group_by_fields.clone();
        holder.projection.projection = group_projection(&info.select_items, &info.group_by_fields)?;
        holder.projection.alias_projection = alias_projection(&info.select_items, &info.group_by_fields)?;
        holder.aggregation.multistage = true;
        Ok(holder)
    }
}

pub struct TotalGroupStage;

impl QueryStage for TotalGroupStage {
    fn name(&self) -> &'static str {
        "total_group"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        if info.group_by_fields.is_empty() && info.total_group {
            holder.projection.projection = group_projection(&info.select_items, &[])?;
            holder.projection.alias_projection = alias_projection(&info.select_items, &[])?;
        }
        Ok(holder)
    }
}

pub struct ProjectionStage;

impl QueryStage for ProjectionStage {
    fn name(&self) -> &'static str {
        "projection"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        let selects_everything = info.select_items.iter().any(|item| item.is_wildcard());
        if info.distinct || info.is_grouped() || selects_everything || info.select_items.is_empty() {
            return Ok(holder);
        }

        let compiler = PredicateCompiler::new(normalizer(info), false);
        let mut projection = Document::with("_id", 0);

        for item in &info.select_items {
            let key = item.alias.clone().unwrap_or_else(|| item.expr.string_value());
            match &item.expr {
                Expr::Column(column) => match &item.alias {
                    Some(_) => projection.insert(key, format!("${}", column.full_name())),
                    None => projection.insert(key, 1),
                },
                Expr::Function(function) => projection.insert(key, compiler.compile_function(function)?),
                other => return Err(ConversionError::unsupported(format!("Unsupported project expression: {}", other))),
            }
        }

        holder.projection.projection = projection;
        Ok(holder)
    }
}

pub struct CountAllStage;

impl QueryStage for CountAllStage {
    fn name(&self) -> &'static str {
        "count_all"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        holder.count_all = info.count_all;
        Ok(holder)
    }
}

pub struct JoinStage;

impl QueryStage for JoinStage {
    fn name(&self) -> &'static str {
        "join"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        if info.joins.is_empty() {
            return Ok(holder);
        }

        let matched = WhereMatch::partition(info.where_clause.as_ref(), &info.from);
        trace!(disjunction = matched.disjunction, folded = matched.folded.len(), "partitioned where clause");

        holder.aggregation.join_pipeline = compile_joins(info, &matched)?;
        holder.aggregation.multistage = true;
        Ok(holder)
    }
}

pub struct OrderByStage;

impl QueryStage for OrderByStage {
    fn name(&self) -> &'static str {
        "order_by"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        let mut sort = Document::new();

        for item in &info.order_by {
            let key = match &item.expr {
                Expr::Function(function) => {
                    let text = function.to_string();
                    match info.alias_holder.alias_from_call(&text) {
                        Some(alias) if alias != text => alias.to_string(),
                        _ => accumulator(function, None)?.0,
                    }
                }
                other => {
                    let written = other.string_value();
                    let field = info.alias_holder.field_from_alias_or_field(&written)?;
                    match (is_aggregate_expression(&field), info.group_by_fields.len()) {
                        // the group stage stores aggregates under their alias
                        (true, _) => written,
                        (false, 0) => field,
                        (false, 1) => "_id".to_string(),
                        (false, _) => format!("_id.{}", group_key(&field)),
                    }
                }
            };
            sort.insert(key, if item.asc { 1 } else { -1 });
        }

        holder.filter.sort = sort;
        Ok(holder)
    }
}

pub struct WhereStage;

impl QueryStage for WhereStage {
    fn name(&self) -> &'static str {
        "where"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        let Some(where_clause) = &info.where_clause else {
            return Ok(holder);
        };

        let pre_join = match info.joins.is_empty() {
            true => Some(where_clause.clone()),
            false => Expr::conjunction(WhereMatch::partition(Some(where_clause), &info.from).base),
        };

        if let Some(condition) = pre_join {
            holder.filter.query = PredicateCompiler::new(normalizer(info), info.is_aggregate()).compile(&condition)?;
        }
        Ok(holder)
    }
}

pub struct HavingStage;

impl QueryStage for HavingStage {
    fn name(&self) -> &'static str {
        "having"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        if let Some(having) = &info.having {
            holder.aggregation.having = PredicateCompiler::for_having(normalizer(info), &info.alias_holder).compile(having)?;
        }
        Ok(holder)
    }
}

pub struct PaginationStage;

impl QueryStage for PaginationStage {
    fn name(&self) -> &'static str {
        "pagination"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        holder.filter.limit = info.limit;
        holder.filter.offset = info.offset;
        Ok(holder)
    }
}

fn literal_value(info: &CommandInfo, field: &str, value: &Expr, context: &str) -> Result<Value, ConversionError> {
    match value {
        Expr::Literal(_) | Expr::Signed { .. } => normalizer(info).normalize(value, Some(&Expr::column(field)), None),
        other => Err(ConversionError::unsupported(format!("Unsupported {} expression: {}", context, other))),
    }
}

pub struct UpdateStage;

impl QueryStage for UpdateStage {
    fn name(&self) -> &'static str {
        "update"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        for (column, value) in &info.update_sets {
            let field = column.full_name();
            match value {
                Expr::Literal(Literal::Null) => holder.update.unset.push(field),
                _ => {
                    let value = literal_value(info, &field, value, "update")?;
                    holder.update.set.insert(field, value);
                }
            }
        }
        Ok(holder)
    }
}

pub struct InsertStage;

impl QueryStage for InsertStage {
    fn name(&self) -> &'static str {
        "insert"
    }

    fn process(&self, info: &CommandInfo, mut holder: QueryHolder) -> Result<QueryHolder, ConversionError> {
        for row in &info.insert_rows {
            let mut document = Document::new();
            for (field, value) in info.insert_columns.iter().zip(row) {
                document.insert(field.as_str(), literal_value(info, field, value, "insert")?);
            }
            holder.update.documents.push(document);
        }
        Ok(holder)
    }
}
