use std::collections::HashMap;

use crate::{
    analyzer::FromInfo,
    parser::ast::{Expr, JoinType},
};

/// Which source a WHERE conjunct reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Base,
    Join(String),
    Mixed,
}

/// A WHERE clause split around the lookup stages of a joined query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereMatch {
    /// Runs as `$match` before the first lookup.
    pub base: Vec<Expr>,
    /// Folded into the sub-pipeline of the inner join with that alias.
    pub folded: HashMap<String, Vec<Expr>>,
    /// Runs as one `$match` after the last unwind.
    pub trailing: Vec<Expr>,
    pub disjunction: bool,
}

impl WhereMatch {
    pub fn partition(where_clause: Option<&Expr>, from: &FromInfo) -> Self {
        let Some(where_clause) = where_clause else {
            return Self::default();
        };

        if where_clause.contains_disjunction() {
            return Self { trailing: vec![where_clause.clone()], disjunction: true, ..Self::default() };
        }

        let mut matched = Self::default();
        for conjunct in where_clause.conjuncts() {
            match owner(conjunct, from) {
                Owner::Base => matched.base.push(conjunct.clone()),
                Owner::Join(alias) if is_inner(from, &alias) => {
                    matched.folded.entry(alias).or_default().push(conjunct.clone());
                }
                Owner::Join(_) | Owner::Mixed => matched.trailing.push(conjunct.clone()),
            }
        }
        matched
    }

    pub fn folded_for(&self, alias: &str) -> &[Expr] {
        self.folded.get(alias).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Columns qualified by a joined alias belong to that join; every other
/// column belongs to the base source.
pub fn owner(expr: &Expr, from: &FromInfo) -> Owner {
    let mut owner: Option<Owner> = None;

    expr.visit_columns(&mut |column| {
        let current = match column.table.as_deref() {
            Some(alias) if from.joined().any(|source| source.alias == alias) => Owner::Join(alias.to_string()),
            _ => Owner::Base,
        };
        owner = match owner.take() {
            None => Some(current),
            Some(previous) if previous == current => Some(previous),
            Some(_) => Some(Owner::Mixed),
        };
    });

    owner.unwrap_or(Owner::Base)
}

fn is_inner(from: &FromInfo, alias: &str) -> bool {
    from.source_by_alias(alias).and_then(|source| source.join_type) == Some(JoinType::Inner)
}
