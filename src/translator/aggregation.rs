use crate::{
    document::{Document, Value},
    parser::ast::{Expr, Function, SelectItem},
    translator::function_names::aggregation_field_name,
    ConversionError,
};

/// The `$group` accumulator of an aggregate call, keyed by its output name.
pub fn accumulator(function: &Function, alias: Option<&str>) -> Result<(String, Document), ConversionError> {
    let (field, name) = aggregation_field_name(function, alias)?;
    let operation = function.name.trim().to_ascii_lowercase();

    let body = match operation.as_str() {
        "count" => Document::with("$sum", 1),
        "sum" | "min" | "max" | "avg" => match field {
            Some(field) => Document::with(format!("${}", operation), format!("${}", field)),
            None => return Err(ConversionError::unsupported(format!("{} function requires a field", function.name))),
        },
        _ => return Err(ConversionError::unsupported(format!("Unknown function: {}", function.name))),
    };
    Ok((name, body))
}

/// Body of the `$group` stage: the grouping key followed by one accumulator
/// per aggregate select item. Without grouping fields `_id` is left out.
pub fn group_projection(items: &[SelectItem], group_by: &[String]) -> Result<Document, ConversionError> {
    let mut projection = Document::new();

    match group_by {
        [] => {}
        [field] => projection.insert("_id", format!("${}", field)),
        fields => {
            let key: Document = fields
                .iter()
                .map(|field| (group_key(field), Value::String(format!("${}", field))))
                .collect();
            projection.insert("_id", key);
        }
    }

    for item in items {
        if let Expr::Function(function) = &item.expr {
            let (name, body) = accumulator(function, item.alias.as_deref())?;
            projection.insert(name, body);
        }
    }
    Ok(projection)
}

/// Final `$project` that maps grouped output back to the select names and
/// drops `_id`.
pub fn alias_projection(items: &[SelectItem], group_by: &[String]) -> Result<Document, ConversionError> {
    let mut projection = Document::new();

    for item in items {
        match &item.expr {
            Expr::Function(function) => {
                let (_, name) = aggregation_field_name(function, item.alias.as_deref())?;
                projection.insert(name, 1);
            }
            Expr::Column(column) => {
                let name = column.full_name();
                let source = match group_by.iter().any(|field| *field == name) {
                    true if group_by.len() == 1 => "$_id".to_string(),
                    true => format!("$_id.{}", group_key(&name)),
                    false => format!("${}", name),
                };
                projection.insert(item.alias.clone().unwrap_or(name), source);
            }
            other => return Err(ConversionError::unsupported(format!("Unsupported group expression: {}", other))),
        }
    }

    projection.insert("_id", 0);
    Ok(projection)
}

/// Key of a grouping field inside a composite `_id`.
pub fn group_key(field: &str) -> String {
    field.replace('.', "_")
}
