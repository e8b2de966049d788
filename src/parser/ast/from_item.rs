use std::fmt;

use crate::parser::{ast::{Expr, SelectStatement, TextCollector}, ParseError, QueryParser};

/// A FROM or JOIN source.
#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    Table { name: String, alias: Option<String> },
    SubQuery { query: Box<SelectStatement>, alias: Option<String> },
}

impl FromItem {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        if parser.consume_char('(') {
            let query = SelectStatement::parse(parser)?;
            parser.expect_char(')')?;
            let alias = TextCollector::alias(parser)?;
            return Ok(FromItem::SubQuery { query: Box::new(query), alias });
        }

        Self::parse_table(parser)
    }

    pub fn parse_table(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let name = TextCollector::dotted_name(parser)?;
        let alias = TextCollector::alias(parser)?;
        Ok(FromItem::Table { name, alias })
    }

    pub fn table(name: &str) -> Self {
        FromItem::Table { name: name.to_string(), alias: None }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            FromItem::Table { alias, .. } | FromItem::SubQuery { alias, .. } => alias.as_deref(),
        }
    }

    pub fn table_name(&self) -> Option<&str> {
        match self {
            FromItem::Table { name, .. } => Some(name),
            FromItem::SubQuery { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
            JoinType::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub right: FromItem,
    pub on: Option<Expr>,
}

impl Join {
    fn check_type(parser: &mut QueryParser) -> Option<JoinType> {
        let comparers = parser.comparers;
        let candidates = [
            (&comparers.inner_join, JoinType::Inner),
            (&comparers.left_outer_join, JoinType::Left),
            (&comparers.left_join, JoinType::Left),
            (&comparers.right_outer_join, JoinType::Right),
            (&comparers.right_join, JoinType::Right),
            (&comparers.full_outer_join, JoinType::Full),
            (&comparers.full_join, JoinType::Full),
            (&comparers.cross_join, JoinType::Cross),
            (&comparers.join, JoinType::Inner),
        ];

        candidates.into_iter().find_map(|(comparer, join_type)| parser.consume(comparer).then_some(join_type))
    }

    /// Parses the next join clause, if the cursor is at one.
    pub fn parse_optional(parser: &mut QueryParser) -> Result<Option<Self>, ParseError> {
        let comparers = parser.comparers;
        let join_type = match Self::check_type(parser) {
            Some(join_type) => join_type,
            None => return Ok(None),
        };

        let right = FromItem::parse(parser)?;
        let on = match parser.consume(&comparers.on) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };

        Ok(Some(Join { join_type, right, on }))
    }
}
