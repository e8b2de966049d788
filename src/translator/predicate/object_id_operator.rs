use crate::{
    document::{Document, ObjectId, Value},
    parser::ast::{ComparatorOp, Expr, Function},
    translator::{function_names::translate_function_name, normalizer::sanitize, predicate::MongoOperator},
    ConversionError,
};

/// Comparisons against document identifiers, written with a
/// `toObjectId`/`objectid`/`OID` call on either side.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectIdOperator {
    Compare { column: String, op: ComparatorOp, id: String, text: String },
    InList { column: String, ids: Vec<String>, negated: bool },
}

pub fn is_object_id_function(function: &Function) -> bool {
    translate_function_name(function.name.trim()).eq_ignore_ascii_case("toObjectId") || function.is_named("objectid")
}

impl ObjectIdOperator {
    pub fn identify(expr: &Expr) -> Result<Option<Self>, ConversionError> {
        match expr {
            Expr::Compare { left, op, right } => Ok(Self::identify_compare(expr, left, *op, right)),
            Expr::InList { expr: left, list, negated } => Self::identify_in(left, list, *negated),
            _ => Ok(None),
        }
    }

    fn identify_compare(expr: &Expr, left: &Expr, op: ComparatorOp, right: &Expr) -> Option<Self> {
        let (column, id) = match (left, right) {
            (Expr::Function(function), _) if is_object_id_function(function) => {
                (function.args.first()?.string_value(), right.string_value())
            }
            (_, Expr::Function(function)) if is_object_id_function(function) => {
                (left.string_value(), function.args.first()?.string_value())
            }
            _ => return None,
        };
        Some(ObjectIdOperator::Compare { column, op, id: sanitize(&id), text: expr.to_string() })
    }

    fn identify_in(left: &Expr, list: &[Expr], negated: bool) -> Result<Option<Self>, ConversionError> {
        let Expr::Function(function) = left else {
            return Ok(None);
        };
        if !is_object_id_function(function) || function.args.len() != 1 {
            return Ok(None);
        }

        let ids = list
            .iter()
            .map(|item| match item {
                Expr::Literal(_) | Expr::Column(_) => Ok(sanitize(&item.string_value())),
                other => Err(ConversionError::invalid(format!("Invalid ObjectId: {}", other))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ObjectIdOperator::InList { column: function.args[0].string_value(), ids, negated }))
    }

    /// A bare `toObjectId('…')` outside any comparison.
    pub fn standalone(function: &Function) -> Result<Option<Value>, ConversionError> {
        if !is_object_id_function(function) {
            return Ok(None);
        }
        match function.args.first() {
            Some(arg) => ObjectId::parse(&sanitize(&arg.string_value())).map(|id| Some(Value::ObjectId(id))),
            None => Err(ConversionError::invalid(format!("Invalid ObjectId: {}", function))),
        }
    }
}

impl MongoOperator for ObjectIdOperator {
    fn column(&self) -> Option<&str> {
        match self {
            ObjectIdOperator::Compare { column, .. } | ObjectIdOperator::InList { column, .. } => Some(column),
        }
    }

    fn to_document(&self) -> Result<Document, ConversionError> {
        match self {
            ObjectIdOperator::Compare { column, op, id, text } => {
                let operator = match op {
                    ComparatorOp::Eq => "$eq",
                    ComparatorOp::NotEq => "$ne",
                    _ => return Err(ConversionError::unsupported(format!("Unsupported comparison expression: {}", text))),
                };
                Ok(Document::with(column.as_str(), Document::with(operator, ObjectId::parse(id)?)))
            }
            ObjectIdOperator::InList { column, ids, negated } => {
                let ids = ids
                    .iter()
                    .map(|id| ObjectId::parse(id).map(Value::ObjectId))
                    .collect::<Result<Vec<_>, _>>()?;
                let operator = if *negated { "$nin" } else { "$in" };
                Ok(Document::with(column.as_str(), Document::with(operator, ids)))
            }
        }
    }
}
