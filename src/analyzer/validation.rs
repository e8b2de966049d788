use crate::{analyzer::{CommandInfo, CommandType}, parser::ast::Expr, ConversionError};

/// Structural checks run before any stage is built.
pub fn validate(info: &CommandInfo) -> Result<(), ConversionError> {
    if info.command_type != CommandType::Select {
        return Ok(());
    }

    if info.distinct && (info.select_items.len() > 1 || info.is_select_all()) {
        return Err(ConversionError::validation("Cannot run DISTINCT on more than one column."));
    }

    let exempt = !info.group_by_fields.is_empty() || info.is_select_all() || info.count_all || info.total_group;
    if !exempt && info.select_items.iter().any(|item| !is_projectable(&item.expr)) {
        return Err(ConversionError::validation(
            "Illegal expressions found in SELECT clause. Only column names are supported.",
        ));
    }

    Ok(())
}

fn is_projectable(expr: &Expr) -> bool {
    matches!(expr, Expr::Column(_) | Expr::Function(_) | Expr::Wildcard | Expr::QualifiedWildcard(_))
}

#[cfg(test)]
mod tests {
    use crate::{
        analyzer::{validate, CommandInfoBuilder},
        config::ConverterConfig,
        parser::ast::Statement,
        ConversionError,
    };

    fn check(sql: &str) -> Result<(), ConversionError> {
        let statement = Statement::try_from(sql)?;
        let info = CommandInfoBuilder::new(&ConverterConfig::default()).build(&statement)?;
        validate(&info)
    }

    #[test]
    pub fn test_distinct_columns() {
        assert!(check("SELECT DISTINCT city FROM users").is_ok());

        for sql in ["SELECT DISTINCT city, name FROM users", "SELECT DISTINCT * FROM users"] {
            assert_eq!(check(sql).unwrap_err().to_string(), "Cannot run DISTINCT on more than one column.");
        }
    }

    #[test]
    pub fn test_illegal_select_expressions() {
        assert_eq!(
            check("SELECT age + 1 FROM users").unwrap_err().to_string(),
            "Illegal expressions found in SELECT clause. Only column names are supported."
        );

        assert!(check("SELECT 1, count(*) FROM users").is_ok());
        assert!(check("SELECT name, lower(city) FROM users").is_ok());
        assert!(check("SELECT age + 1 FROM users GROUP BY age").is_ok());
    }
}
