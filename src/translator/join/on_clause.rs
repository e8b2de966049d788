use crate::{
    document::Document,
    parser::ast::{Column, Expr},
};

/// A lookup condition with every outer column replaced by a `$$` variable.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCondition {
    pub condition: Expr,
    /// The lookup's `let` document: variable name to outer field path.
    pub bindings: Document,
}

/// Rewrites `condition` for the sub-pipeline of the lookup on `join_alias`.
///
/// Columns of the joined collection lose their qualifier. Any other column
/// becomes a variable named after its alias-qualified path, lower-cased with
/// dots turned into underscores (`u._id` binds as `u__id`).
pub fn bind_columns(condition: &Expr, join_alias: &str, base_alias: &str) -> BoundCondition {
    let mut bindings = Document::new();
    let mut condition = condition.clone();

    condition.visit_columns_mut(&mut |column| {
        if column.quoted {
            return;
        }
        if column.belongs_to(join_alias) {
            column.table = None;
            return;
        }

        let qualified = match &column.table {
            Some(_) => column.full_name(),
            None => format!("{}.{}", base_alias, column.name),
        };
        let variable = binding_name(&qualified);
        bindings.insert(variable.as_str(), format!("${}", column.full_name()));
        *column = Column::new(&format!("$${}", variable));
    });

    BoundCondition { condition, bindings }
}

pub fn binding_name(qualified: &str) -> String {
    qualified.to_lowercase().replace('.', "_")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        parser::{ast::Expr, QueryParser},
        translator::join::{bind_columns, binding_name},
    };

    fn parse(text: &str) -> Expr {
        let mut parser = QueryParser::new(text);
        Expr::parse(&mut parser).unwrap()
    }

    #[test]
    pub fn test_binding_name() {
        assert_eq!(binding_name("u._id"), "u__id");
        assert_eq!(binding_name("Users.Address.City"), "users_address_city");
    }

    #[test]
    pub fn test_bind_columns() {
        let bound = bind_columns(&parse("_id = o.user_id AND o.total > u2.limit"), "o", "u");

        assert_eq!(bound.condition.to_string(), "$$u__id = user_id AND total > $$u2_limit");
        assert_eq!(bound.bindings.to_json(), json!({ "u__id": "$_id", "u2_limit": "$u2.limit" }));
    }

    #[test]
    pub fn test_bind_without_outer_columns() {
        let bound = bind_columns(&parse("o.total > 10"), "o", "u");

        assert_eq!(bound.condition.to_string(), "total > 10");
        assert!(bound.bindings.is_empty());
    }
}
