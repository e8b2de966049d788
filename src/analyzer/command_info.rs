use std::{collections::HashMap, fmt};

use tracing::trace;

use crate::{
    analyzer::{
        strip_alias, strip_order_by_item, strip_select_item, AliasHolder, FromInfo, Holder, SourceHolder, TableInfo,
    },
    config::{ConverterConfig, FieldType},
    parser::ast::{Column, Delete, Expr, FromItem, Insert, Join, OrderByItem, Select, SelectItem, SelectStatement, Statement, Update},
    translator::function_names::is_aggregate_expression,
    ConversionError,
};

/// Deepest chain of FROM subqueries the builder resolves.
pub const MAX_SUBQUERY_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandType::Select => write!(f, "SELECT"),
            CommandType::Insert => write!(f, "INSERT"),
            CommandType::Update => write!(f, "UPDATE"),
            CommandType::Delete => write!(f, "DELETE"),
        }
    }
}

/// Normalized description of one statement. Every expression has already
/// lost its base-alias qualifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInfo {
    pub command_type: CommandType,
    pub distinct: bool,
    pub count_all: bool,
    /// An aggregate select item without GROUP BY.
    pub total_group: bool,
    pub from: FromInfo,
    pub where_clause: Option<Expr>,
    pub having: Option<Expr>,
    pub alias_holder: AliasHolder,
    pub select_items: Vec<SelectItem>,
    pub joins: Vec<Join>,
    pub group_by_fields: Vec<String>,
    pub order_by: Vec<OrderByItem>,
    pub update_sets: Vec<(Column, Expr)>,
    pub insert_columns: Vec<String>,
    pub insert_rows: Vec<Vec<Expr>>,
    /// -1 when absent.
    pub limit: i64,
    /// -1 when absent.
    pub offset: i64,
    pub default_field_type: FieldType,
    pub field_types: HashMap<String, FieldType>,
}

impl Holder for CommandInfo {
    fn base_table_name(&self) -> &str {
        self.from.base_table_name()
    }
}

impl CommandInfo {
    pub fn base_alias(&self) -> &str {
        self.from.base_alias()
    }

    pub fn is_select_all(&self) -> bool {
        self.select_items.len() == 1 && matches!(self.select_items[0].expr, Expr::Wildcard)
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by_fields.is_empty() || self.total_group
    }

    /// Whether the statement needs a multi-stage pipeline.
    pub fn is_aggregate(&self) -> bool {
        !self.alias_holder.is_empty()
            || !self.group_by_fields.is_empty()
            || !self.joins.is_empty()
            || self.from.base_sub_query().is_some()
            || (self.total_group && !self.count_all)
    }

    pub fn field_type(&self, field: &str) -> FieldType {
        self.field_types.get(field).copied().unwrap_or(self.default_field_type)
    }

    fn empty(command_type: CommandType, from: FromInfo, builder: &CommandInfoBuilder) -> Self {
        Self {
            command_type,
            distinct: false,
            count_all: false,
            total_group: false,
            from,
            where_clause: None,
            having: None,
            alias_holder: AliasHolder::new(),
            select_items: vec![],
            joins: vec![],
            group_by_fields: vec![],
            order_by: vec![],
            update_sets: vec![],
            insert_columns: vec![],
            insert_rows: vec![],
            limit: -1,
            offset: -1,
            default_field_type: builder.default_field_type,
            field_types: builder.field_types.clone(),
        }
    }
}

/// Builds [`CommandInfo`] values. FROM subqueries are resolved with a child
/// builder one level deeper.
#[derive(Debug, Clone)]
pub struct CommandInfoBuilder {
    default_field_type: FieldType,
    field_types: HashMap<String, FieldType>,
    depth: usize,
}

impl CommandInfoBuilder {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            default_field_type: config.default_field_type,
            field_types: config.field_types.clone(),
            depth: 0,
        }
    }

    fn nested(&self) -> Result<Self, ConversionError> {
        if self.depth >= MAX_SUBQUERY_DEPTH {
            return Err(ConversionError::unsupported(format!(
                "Subqueries nested deeper than {} levels are not supported",
                MAX_SUBQUERY_DEPTH
            )));
        }
        Ok(Self { depth: self.depth + 1, ..self.clone() })
    }

    pub fn build(&self, statement: &Statement) -> Result<CommandInfo, ConversionError> {
        match statement {
            Statement::Select(select) => self.build_select(select),
            Statement::Insert(insert) => self.build_insert(insert),
            Statement::Update(update) => self.build_update(update),
            Statement::Delete(delete) => self.build_delete(delete),
        }
    }

    pub fn build_select(&self, statement: &SelectStatement) -> Result<CommandInfo, ConversionError> {
        match statement {
            SelectStatement::Plain(select) => self.build_plain(select),
            SelectStatement::Parenthesized(inner) => self.build_select(inner),
            SelectStatement::SetOperation { branches, .. } => match branches.first() {
                Some(SelectStatement::Plain(select)) => self.build_plain(select),
                _ => Err(ConversionError::unsupported("Unsupported set operation structure")),
            },
        }
    }

    fn resolve(&self, item: &FromItem) -> Result<(Option<String>, SourceHolder), ConversionError> {
        match item {
            FromItem::Table { name, alias } => Ok((alias.clone(), SourceHolder::Table(TableInfo::new(name)))),
            FromItem::SubQuery { query, alias } => {
                trace!(depth = self.depth + 1, "resolving FROM subquery");
                let info = self.nested()?.build_select(query)?;
                Ok((alias.clone(), SourceHolder::SubQuery(Box::new(info))))
            }
        }
    }

    fn resolve_from(&self, base: &FromItem, joins: &[Join]) -> Result<FromInfo, ConversionError> {
        let (alias, holder) = self.resolve(base)?;
        let mut from = FromInfo::new(alias.as_deref(), holder);

        for join in joins {
            FromInfo::check_join_type(join.join_type)?;
            let (alias, holder) = self.resolve(&join.right)?;
            from.add_join(join.join_type, alias.as_deref(), holder)?;
        }
        Ok(from)
    }

    fn build_plain(&self, select: &Select) -> Result<CommandInfo, ConversionError> {
        let from = self.resolve_from(&select.from, &select.joins)?;
        let base_alias = from.base_alias().to_string();
        let mut info = CommandInfo::empty(CommandType::Select, from, self);

        info.select_items = select.items.iter().map(|item| strip_select_item(item, &base_alias)).collect();
        info.alias_holder = alias_holder(&info.select_items);
        info.distinct = select.distinct;
        info.count_all = is_count_all(&info.select_items);
        info.total_group = select.group_by.is_empty()
            && info.select_items.iter().any(|item| is_aggregate_expression(&item.expr.to_string()));

        info.where_clause = select.where_clause.clone().map(|expr| strip_alias(expr, &base_alias));
        info.having = select.having.clone().map(|expr| strip_alias(expr, &base_alias));
        info.joins = select
            .joins
            .iter()
            .map(|join| Join { on: join.on.clone().map(|on| strip_alias(on, &base_alias)), ..join.clone() })
            .collect();
        info.group_by_fields = select
            .group_by
            .iter()
            .map(|expr| strip_alias(expr.clone(), &base_alias).string_value())
            .collect();
        info.order_by = select.order_by.iter().map(|item| strip_order_by_item(item, &base_alias)).collect();
        info.limit = checked_bound(select.limit)?;
        info.offset = checked_bound(select.offset)?;

        Ok(info)
    }

    fn build_insert(&self, insert: &Insert) -> Result<CommandInfo, ConversionError> {
        if insert.table.trim().is_empty() {
            return Err(ConversionError::validation("An insert must specify a table."));
        }
        if insert.columns.is_empty() {
            return Err(ConversionError::validation("An insert must list its columns."));
        }
        if let Some(row) = insert.rows.iter().find(|row| row.len() != insert.columns.len()) {
            return Err(ConversionError::validation(format!(
                "Expected {} values per row but found {}.",
                insert.columns.len(),
                row.len()
            )));
        }

        let from = FromInfo::new(None, SourceHolder::Table(TableInfo::new(&insert.table)));
        let mut info = CommandInfo::empty(CommandType::Insert, from, self);
        info.insert_columns = insert.columns.clone();
        info.insert_rows = insert.rows.clone();
        Ok(info)
    }

    fn build_update(&self, update: &Update) -> Result<CommandInfo, ConversionError> {
        let FromItem::Table { name, alias } = &update.table else {
            return Err(ConversionError::validation("An update must specify a table."));
        };
        if name.trim().is_empty() {
            return Err(ConversionError::validation("An update must specify a table."));
        }

        let from = FromInfo::new(alias.as_deref(), SourceHolder::Table(TableInfo::new(name)));
        let base_alias = from.base_alias().to_string();
        let mut info = CommandInfo::empty(CommandType::Update, from, self);
        info.where_clause = update.where_clause.clone().map(|expr| strip_alias(expr, &base_alias));
        info.update_sets = update
            .assignments
            .iter()
            .map(|(column, value)| {
                let mut column = column.clone();
                if column.belongs_to(&base_alias) {
                    column.table = None;
                }
                (column, value.clone())
            })
            .collect();
        info.limit = checked_bound(update.limit)?;
        Ok(info)
    }

    fn build_delete(&self, delete: &Delete) -> Result<CommandInfo, ConversionError> {
        let target = delete.from.table_name();
        let single_target = match delete.tables.as_slice() {
            [] => true,
            [table] => target == Some(table.as_str()) || delete.from.alias() == Some(table.as_str()),
            _ => false,
        };
        if !single_target {
            return Err(ConversionError::validation("Only one table can be deleted at a time."));
        }

        let (alias, holder) = self.resolve(&delete.from)?;
        let from = FromInfo::new(alias.as_deref(), holder);
        let base_alias = from.base_alias().to_string();
        let mut info = CommandInfo::empty(CommandType::Delete, from, self);
        info.where_clause = delete.where_clause.clone().map(|expr| strip_alias(expr, &base_alias));
        info.limit = checked_bound(delete.limit)?;
        Ok(info)
    }
}

fn alias_holder(items: &[SelectItem]) -> AliasHolder {
    let mut holder = AliasHolder::new();
    for item in items {
        if item.is_wildcard() {
            continue;
        }
        if let Some(alias) = &item.alias {
            holder.insert(&item.expr.to_string(), alias);
        }
    }
    holder
}

fn is_count_all(items: &[SelectItem]) -> bool {
    match items {
        [item] => match &item.expr {
            Expr::Function(function) => function.to_string().eq_ignore_ascii_case("count(*)"),
            _ => false,
        },
        _ => false,
    }
}

fn checked_bound(value: Option<i64>) -> Result<i64, ConversionError> {
    match value {
        None => Ok(-1),
        Some(value) if value > i32::MAX as i64 => Err(ConversionError::validation(format!("{}: value is too large", value))),
        Some(value) => Ok(value),
    }
}
