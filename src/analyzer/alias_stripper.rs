use crate::parser::ast::{Expr, OrderByItem, SelectItem};

/// Drops the `base_alias.` qualifier from every column of the tree. Columns
/// qualified by any other alias keep it, so they still address the joined
/// sub-document.
pub fn strip_alias(mut expr: Expr, base_alias: &str) -> Expr {
    strip_alias_in_place(&mut expr, base_alias);
    expr
}

pub fn strip_alias_in_place(expr: &mut Expr, base_alias: &str) {
    expr.visit_columns_mut(&mut |column| {
        if column.belongs_to(base_alias) {
            column.table = None;
        }
    });
}

pub fn strip_select_item(item: &SelectItem, base_alias: &str) -> SelectItem {
    match item.expr {
        Expr::Wildcard | Expr::QualifiedWildcard(_) => item.clone(),
        _ => SelectItem { expr: strip_alias(item.expr.clone(), base_alias), alias: item.alias.clone() },
    }
}

pub fn strip_order_by_item(item: &OrderByItem, base_alias: &str) -> OrderByItem {
    OrderByItem { expr: strip_alias(item.expr.clone(), base_alias), asc: item.asc }
}
