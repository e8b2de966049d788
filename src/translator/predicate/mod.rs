pub mod regex_operator;
pub use regex_operator::*;

pub mod date_operator;
pub use date_operator::DateOperator;

pub mod object_id_operator;
pub use object_id_operator::*;

use crate::{
    analyzer::AliasHolder,
    document::{Document, Value},
    parser::ast::{Column, ComparatorOp, Expr, Function, Literal},
    translator::{
        function_names::{aggregation_field_name, is_aggregate_expression, translate_function_name},
        normalizer::sanitize,
        ValueNormalizer,
    },
    ConversionError,
};

/// A special-cased comparison that renders straight to a filter document.
pub trait MongoOperator {
    fn column(&self) -> Option<&str>;
    fn to_document(&self) -> Result<Document, ConversionError>;
}

/// Compiles boolean expressions into filter documents.
///
/// In aggregation mode field comparisons are emitted as `$expr` so they keep
/// working after `$group`/`$lookup` stages.
/// The having flavour also resolves aggregate calls to the field the group
/// stage stored them under.
#[derive(Debug, Clone, Copy)]
pub struct PredicateCompiler<'a> {
    normalizer: ValueNormalizer<'a>,
    aggregation_mode: bool,
    aliases: Option<&'a AliasHolder>,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(normalizer: ValueNormalizer<'a>, aggregation_mode: bool) -> Self {
        Self { normalizer, aggregation_mode, aliases: None }
    }

    pub fn for_having(normalizer: ValueNormalizer<'a>, aliases: &'a AliasHolder) -> Self {
        Self { normalizer, aggregation_mode: true, aliases: Some(aliases) }
    }

    pub fn is_aggregation_mode(&self) -> bool {
        self.aggregation_mode
    }

    pub fn compile(&self, expr: &Expr) -> Result<Document, ConversionError> {
        match self.node(expr, None)? {
            Value::Document(document) => Ok(document),
            _ => Ok(Document::with(expr.string_value(), true)),
        }
    }

    fn node(&self, expr: &Expr, counterpart: Option<&Expr>) -> Result<Value, ConversionError> {
        match expr {
            Expr::Compare { left, op, right } => self.comparison(expr, left, *op, right).map(Value::from),
            Expr::Like { expr: target, pattern, negated } => self.like(target, pattern, *negated).map(Value::from),
            Expr::IsNull { expr: target, negated } => self.is_null(target, *negated).map(Value::from),
            Expr::InList { expr: target, list, negated } => self.in_list(expr, target, list, *negated).map(Value::from),
            Expr::Between { expr: target, low, high, negated } => {
                let leg = |op: ComparatorOp, bound: &Expr| {
                    let comparison = Expr::compare((**target).clone(), op, bound.clone());
                    if *negated { Expr::not(comparison) } else { comparison }
                };
                self.node(&Expr::and(leg(ComparatorOp::GtEq, low), leg(ComparatorOp::LtEq, high)), counterpart)
            }
            Expr::And(..) => self.logical(expr, "$and").map(Value::from),
            Expr::Or(..) => self.logical(expr, "$or").map(Value::from),
            Expr::Not(inner) => self.negation(inner).map(Value::from),
            Expr::Function(function) => self.standalone_function(function),
            Expr::Column(column) if !column.quoted && counterpart.is_none() => {
                Ok(Document::with(self.field_name(column), true).into())
            }
            Expr::SubQuery(_) => Err(ConversionError::unsupported("Subqueries are not supported in predicates")),
            other => self.normalizer.normalize(other, counterpart, self.aliases),
        }
    }

    fn comparison(&self, expr: &Expr, left: &Expr, op: ComparatorOp, right: &Expr) -> Result<Document, ConversionError> {
        if let Some(operator) = RegexOperator::identify(expr)? {
            return operator.to_document();
        }
        if let Some(operator) = DateOperator::identify(expr)? {
            return operator.to_document();
        }
        if let Some(operator) = ObjectIdOperator::identify(expr)? {
            return operator.to_document();
        }

        let operator = format!("${}", op.operator_name());

        match (left, right) {
            (Expr::Function(_), _) | (_, Expr::Function(_)) => {
                let pair = vec![self.operand(left, Some(right))?, self.operand(right, Some(left))?];
                Ok(self.wrap_expr(Document::with(operator, pair)))
            }
            (Expr::Column(l), Expr::Column(r)) if !l.quoted && !r.quoted => match self.aggregation_mode {
                true => {
                    let pair = vec![self.operand(left, Some(right))?, self.operand(right, Some(left))?];
                    Ok(self.wrap_expr(Document::with(operator, pair)))
                }
                false => Ok(keyed(self.field_name(l), op, Value::String(self.field_name(r)))),
            },
            (Expr::Column(column), value) if !column.quoted && is_value(value) => {
                let value = self.normalizer.normalize(value, Some(left), self.aliases)?;
                match self.aggregation_mode {
                    true => {
                        let pair = vec![self.operand(left, Some(right))?, value];
                        Ok(self.wrap_expr(Document::with(operator, pair)))
                    }
                    false => Ok(keyed(self.field_name(column), op, value)),
                }
            }
            _ => {
                let left_value = self.node(left, Some(right))?;
                let right_value = self.operand(right, Some(left))?;
                match (self.aggregation_mode, left_value) {
                    (false, Value::String(name)) => Ok(keyed(name, op, right_value)),
                    (_, left_value) => Ok(self.wrap_expr(Document::with(operator, vec![left_value, right_value]))),
                }
            }
        }
    }

    fn like(&self, target: &Expr, pattern: &Expr, negated: bool) -> Result<Document, ConversionError> {
        let unsupported = || ConversionError::unsupported(format!("Unsupported LIKE expression: {} LIKE {}", target, pattern));

        let Expr::Column(column) = target else {
            return Err(unsupported());
        };
        if column.quoted {
            return Err(unsupported());
        }
        let text = match pattern {
            Expr::Literal(Literal::String(text)) => sanitize(text),
            Expr::Column(_) => pattern.string_value(),
            _ => return Err(unsupported()),
        };

        let condition = Document::with("$regex", like_to_regex(&text));
        let condition = match negated {
            true => Document::with("$not", condition),
            false => condition,
        };
        Ok(Document::with(self.field_name(column), condition))
    }

    fn is_null(&self, target: &Expr, negated: bool) -> Result<Document, ConversionError> {
        match target {
            Expr::Function(function) => match self.compile_function(function)? {
                Value::Document(mut document) => {
                    document.insert("$exists", negated);
                    Ok(document)
                }
                _ => Ok(Document::with(target.string_value(), Document::with("$exists", negated))),
            },
            Expr::Column(column) if !column.quoted => {
                Ok(Document::with(self.field_name(column), Document::with("$exists", negated)))
            }
            other => Err(ConversionError::unsupported(format!("Unsupported IS NULL expression: {}", other))),
        }
    }

    fn in_list(&self, expr: &Expr, target: &Expr, list: &[Expr], negated: bool) -> Result<Document, ConversionError> {
        if let Some(operator) = ObjectIdOperator::identify(expr)? {
            return operator.to_document();
        }

        let values = list
            .iter()
            .map(|item| match item {
                Expr::SubQuery(_) => Err(ConversionError::unsupported("Subqueries are not supported in IN lists")),
                _ => self.node(item, Some(target)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let operator = if negated { "$nin" } else { "$in" };

        match target {
            Expr::Function(function) => {
                let marker = if negated { "$fnin" } else { "$fin" };
                let mut body = Document::with("function", self.compile_function(function)?);
                body.insert("list", values);
                Ok(Document::with(marker, body))
            }
            _ if self.aggregation_mode => {
                let pair = vec![self.operand(target, None)?, Value::Array(values)];
                Ok(self.wrap_expr(Document::with(operator, pair)))
            }
            Expr::Column(column) if !column.quoted => Ok(Document::with(self.field_name(column), Document::with(operator, values))),
            other => Ok(Document::with(other.string_value(), Document::with(operator, values))),
        }
    }

    fn logical(&self, expr: &Expr, operator: &str) -> Result<Document, ConversionError> {
        let items = match flatten(expr) {
            Some(items) => items,
            None => match expr {
                Expr::And(left, right) | Expr::Or(left, right) => vec![left.as_ref(), right.as_ref()],
                other => vec![other],
            },
        };

        let compiled = items
            .into_iter()
            .map(|item| self.compile(item).map(Value::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Document::with(operator, compiled))
    }

    /// Only bare columns and comparisons whose first entry holds an operator
    /// document have a negated form; anything else compiles to an empty filter.
    fn negation(&self, inner: &Expr) -> Result<Document, ConversionError> {
        match inner {
            Expr::Column(column) if !column.quoted => Ok(Document::with(self.field_name(column), Document::with("$ne", true))),
            Expr::Compare { .. } => match self.compile(inner)?.first() {
                Some((key, Value::Document(document))) => {
                    Ok(Document::with(key.as_str(), Document::with("$not", document.clone())))
                }
                _ => Ok(Document::new()),
            },
            _ => Ok(Document::new()),
        }
    }

    fn standalone_function(&self, function: &Function) -> Result<Value, ConversionError> {
        if let Some(operator) = RegexOperator::identify_call(function)? {
            return operator.to_document().map(Value::from);
        }
        if let Some(id) = ObjectIdOperator::standalone(function)? {
            return Ok(id);
        }
        self.compile_function(function)
    }

    /// `{"$name": params}` for a call, or a `$field` reference when an
    /// aggregate is read back in a having clause.
    pub fn compile_function(&self, function: &Function) -> Result<Value, ConversionError> {
        if let Some(aliases) = self.aliases {
            let text = function.to_string();
            if is_aggregate_expression(&text) {
                let (_, name) = aggregation_field_name(function, aliases.alias_from_call(&text))?;
                return Ok(Value::String(format!("${}", name)));
            }
        }
        if let Some(id) = ObjectIdOperator::standalone(function)? {
            return Ok(id);
        }

        let mut params = function
            .args
            .iter()
            .filter(|arg| !matches!(arg, Expr::Wildcard))
            .map(|arg| self.parameter(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let params = match params.len() {
            1 => params.remove(0),
            _ => Value::Array(params),
        };
        Ok(Document::with(format!("${}", translate_function_name(&function.name)), params).into())
    }

    fn parameter(&self, arg: &Expr) -> Result<Value, ConversionError> {
        match arg {
            Expr::Column(column) if !column.quoted => Ok(Value::String(field_reference(&self.field_name(column)))),
            Expr::Function(function) => self.compile_function(function),
            other => self.normalizer.normalize(other, None, self.aliases),
        }
    }

    /// One side of an array-form comparison.
    fn operand(&self, expr: &Expr, counterpart: Option<&Expr>) -> Result<Value, ConversionError> {
        match expr {
            Expr::Function(function) => self.compile_function(function),
            Expr::Column(column) if !column.quoted => Ok(Value::String(field_reference(&self.field_name(column)))),
            other => self.node(other, counterpart),
        }
    }

    fn field_name(&self, column: &Column) -> String {
        let name = column.full_name();
        self.aliases
            .and_then(|aliases| aliases.alias_from_field(&name))
            .map(str::to_string)
            .unwrap_or(name)
    }

    fn wrap_expr(&self, document: Document) -> Document {
        match self.aggregation_mode {
            true => Document::with("$expr", document),
            false => document,
        }
    }
}

/// `$`-prefixed path of a field; `$$` variables pass through.
pub fn field_reference(name: &str) -> String {
    match name.starts_with('$') {
        true => name.to_string(),
        false => format!("${}", name),
    }
}

fn keyed(field: String, op: ComparatorOp, value: Value) -> Document {
    match op {
        ComparatorOp::Eq => Document::with(field, value),
        other => Document::with(field, Document::with(format!("${}", other.operator_name()), value)),
    }
}

fn is_value(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_) | Expr::Signed { .. } => true,
        Expr::Column(column) => column.quoted,
        _ => false,
    }
}

/// Collects a left-leaning run of one logical operator into a flat list.
///
/// Walks down the left spine while the right operand is not itself logical.
/// The walk must end on a node whose two children are both non-logical,
/// otherwise the shape is not a plain run and `None` is returned.
fn flatten(expr: &Expr) -> Option<Vec<&Expr>> {
    let same_operator = |candidate: &Expr| std::mem::discriminant(candidate) == std::mem::discriminant(expr);
    let mut collected = vec![];
    let mut current = expr;

    loop {
        let (left, right) = match current {
            Expr::And(left, right) | Expr::Or(left, right) => (left.as_ref(), right.as_ref()),
            _ => return None,
        };

        if same_operator(left) && !right.is_logical() {
            collected.push(right);
            current = left;
        } else if !left.is_logical() && !right.is_logical() {
            collected.push(right);
            collected.push(left);
            break;
        } else {
            return None;
        }
    }

    collected.reverse();
    Some(collected)
}
