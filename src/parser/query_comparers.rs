use once_cell::sync::Lazy;

use crate::parser::WordComparer;

static COMPARERS: Lazy<QueryComparers> = Lazy::new(QueryComparers::new);

/// Words that terminate an expression or can never be an implicit alias.
const RESERVED: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "LIMIT", "OFFSET", "JOIN", "INNER",
    "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "ON", "UNION", "INTERSECT", "EXCEPT", "AND", "OR",
    "NOT", "AS", "SET", "VALUES", "ASC", "DESC", "LIKE", "IN", "IS", "BETWEEN", "NULL", "INTO",
];

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub insert_into: WordComparer,
    pub update: WordComparer,
    pub delete: WordComparer,
    pub distinct: WordComparer,
    pub all: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub join: WordComparer,
    pub inner_join: WordComparer,
    pub left_join: WordComparer,
    pub left_outer_join: WordComparer,
    pub right_join: WordComparer,
    pub right_outer_join: WordComparer,
    pub full_join: WordComparer,
    pub full_outer_join: WordComparer,
    pub cross_join: WordComparer,
    pub on: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub having: WordComparer,
    pub order_by: WordComparer,
    pub asc: WordComparer,
    pub desc: WordComparer,
    pub limit: WordComparer,
    pub offset: WordComparer,
    pub union: WordComparer,
    pub intersect: WordComparer,
    pub except: WordComparer,
    pub set: WordComparer,
    pub values: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub not: WordComparer,
    pub like: WordComparer,
    pub not_like: WordComparer,
    pub is_null: WordComparer,
    pub is_not_null: WordComparer,
    pub r#in: WordComparer,
    pub not_in: WordComparer,
    pub between: WordComparer,
    pub not_between: WordComparer,
    pub b_true: WordComparer,
    pub b_false: WordComparer,
    pub null: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::keyword("SELECT"),
            insert_into: WordComparer::keyword("INSERT INTO"),
            update: WordComparer::keyword("UPDATE"),
            delete: WordComparer::keyword("DELETE"),
            distinct: WordComparer::keyword("DISTINCT"),
            all: WordComparer::keyword("ALL"),
            alias: WordComparer::keyword("AS"),
            from: WordComparer::keyword("FROM"),
            join: WordComparer::keyword("JOIN"),
            inner_join: WordComparer::keyword("INNER JOIN"),
            left_join: WordComparer::keyword("LEFT JOIN"),
            left_outer_join: WordComparer::keyword("LEFT OUTER JOIN"),
            right_join: WordComparer::keyword("RIGHT JOIN"),
            right_outer_join: WordComparer::keyword("RIGHT OUTER JOIN"),
            full_join: WordComparer::keyword("FULL JOIN"),
            full_outer_join: WordComparer::keyword("FULL OUTER JOIN"),
            cross_join: WordComparer::keyword("CROSS JOIN"),
            on: WordComparer::keyword("ON"),
            r#where: WordComparer::keyword("WHERE"),
            group_by: WordComparer::keyword("GROUP BY"),
            having: WordComparer::keyword("HAVING"),
            order_by: WordComparer::keyword("ORDER BY"),
            asc: WordComparer::keyword("ASC"),
            desc: WordComparer::keyword("DESC"),
            limit: WordComparer::keyword("LIMIT"),
            offset: WordComparer::keyword("OFFSET"),
            union: WordComparer::keyword("UNION"),
            intersect: WordComparer::keyword("INTERSECT"),
            except: WordComparer::keyword("EXCEPT"),
            set: WordComparer::keyword("SET"),
            values: WordComparer::keyword("VALUES"),
            and: WordComparer::keyword("AND"),
            or: WordComparer::keyword("OR"),
            not: WordComparer::keyword("NOT"),
            like: WordComparer::keyword("LIKE"),
            not_like: WordComparer::keyword("NOT LIKE"),
            is_null: WordComparer::keyword("IS NULL"),
            is_not_null: WordComparer::keyword("IS NOT NULL"),
            r#in: WordComparer::keyword("IN"),
            not_in: WordComparer::keyword("NOT IN"),
            between: WordComparer::keyword("BETWEEN"),
            not_between: WordComparer::keyword("NOT BETWEEN"),
            b_true: WordComparer::keyword("TRUE"),
            b_false: WordComparer::keyword("FALSE"),
            null: WordComparer::keyword("NULL"),
        }
    }

    pub fn shared() -> &'static QueryComparers {
        &COMPARERS
    }

    pub fn is_reserved(word: &str) -> bool {
        RESERVED.iter().any(|reserved| reserved.eq_ignore_ascii_case(word))
    }
}
