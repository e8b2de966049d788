use crate::{parser::ast::{Expr, Function}, ConversionError};

const AGGREGATE_FUNCTIONS: [&str; 5] = ["sum", "avg", "min", "max", "count"];

/// Vendor names rewritten to their pipeline operator, matched case-insensitively.
const NAME_TRANSLATIONS: [(&str, &str); 2] = [("OID", "toObjectId"), ("TIMESTAMP", "toDate")];

pub fn is_aggregate_function(name: &str) -> bool {
    let name = name.trim();
    AGGREGATE_FUNCTIONS.iter().any(|known| known.eq_ignore_ascii_case(name))
}

/// Whether the rendered expression text is a call to one of the aggregates.
pub fn is_aggregate_expression(text: &str) -> bool {
    let lower = text.trim().to_ascii_lowercase();
    AGGREGATE_FUNCTIONS.iter().any(|name| {
        lower
            .strip_prefix(name)
            .is_some_and(|rest| rest.trim_start().starts_with('('))
    })
}

pub fn translate_function_name(name: &str) -> String {
    NAME_TRANSLATIONS
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(name.trim()))
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// The single field an aggregate reads. `None` for `f(*)` and `f()`.
pub fn aggregated_field(function: &Function) -> Result<Option<String>, ConversionError> {
    match function.args.as_slice() {
        [] | [Expr::Wildcard] => Ok(None),
        [arg] => Ok(Some(arg.string_value())),
        _ => Err(ConversionError::unsupported(format!("{} function can only have one parameter", function.name))),
    }
}

/// Output name of an aggregate: the alias, else `count` for counts and
/// wildcards, else `<fn>_<field>` with dots turned into underscores.
pub fn aggregation_field_name(function: &Function, alias: Option<&str>) -> Result<(Option<String>, String), ConversionError> {
    let field = aggregated_field(function)?;
    let name = function.name.trim().to_ascii_lowercase();

    let generated = match &field {
        Some(field) if name != "count" => format!("{}_{}", name, field.replace('.', "_")),
        _ => name,
    };
    Ok((field, alias.map(str::to_string).unwrap_or(generated)))
}

#[cfg(test)]
mod tests {
    use crate::{
        parser::ast::{Expr, Function},
        translator::function_names::{aggregation_field_name, is_aggregate_expression, is_aggregate_function, translate_function_name},
    };

    #[test]
    pub fn test_aggregate_detection() {
        assert!(is_aggregate_function("SUM"));
        assert!(!is_aggregate_function("lower"));

        assert!(is_aggregate_expression("count(*)"));
        assert!(is_aggregate_expression("AVG (price)"));
        assert!(!is_aggregate_expression("counter"));
        assert!(!is_aggregate_expression("maxlen(name)"));
    }

    #[test]
    pub fn test_translate_function_name() {
        assert_eq!(translate_function_name("oid"), "toObjectId");
        assert_eq!(translate_function_name("Timestamp"), "toDate");
        assert_eq!(translate_function_name("concat"), "concat");
    }

    #[test]
    pub fn test_aggregation_field_name() {
        let count = Function::new("COUNT", vec![Expr::Wildcard]);
        let sum = Function::new("SUM", vec![Expr::column("order.total")]);
        let max = Function::new("max", vec![Expr::column("a"), Expr::column("b")]);

        assert_eq!(aggregation_field_name(&count, None).unwrap(), (None, "count".to_string()));
        assert_eq!(
            aggregation_field_name(&sum, None).unwrap(),
            (Some("order.total".to_string()), "sum_order_total".to_string())
        );
        assert_eq!(aggregation_field_name(&sum, Some("total")).map(|(_, name)| name).unwrap(), "total".to_string());

        assert_eq!(
            aggregation_field_name(&max, None).unwrap_err().to_string(),
            "max function can only have one parameter"
        );
    }
}
