use crate::parser::{
    ast::{Expr, FromItem, Join, TextCollector},
    ParseError, ParseErrorKind, QueryParser,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: &str) -> Self {
        Self { expr, alias: Some(alias.to_string()) }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let expr = Expr::parse(parser)?;
        let alias = match expr {
            Expr::Wildcard | Expr::QualifiedWildcard(_) => None,
            _ => TextCollector::alias(parser)?,
        };
        Ok(SelectItem { expr, alias })
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.expr, Expr::Wildcard | Expr::QualifiedWildcard(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub asc: bool,
}

impl OrderByItem {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        let expr = Expr::parse(parser)?;
        let asc = match parser.consume(&comparers.desc) {
            true => false,
            false => {
                parser.consume(&comparers.asc);
                true
            }
        };
        Ok(OrderByItem { expr, asc })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: FromItem,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Select {
    pub fn new(items: Vec<SelectItem>, from: FromItem) -> Self {
        Self {
            distinct: false,
            items,
            from,
            joins: vec![],
            where_clause: None,
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        parser.expect(&comparers.select)?;
        let distinct = parser.consume(&comparers.distinct);
        if !distinct {
            parser.consume(&comparers.all);
        }

        let mut items = vec![];
        loop {
            items.push(SelectItem::parse(parser)?);
            if !parser.consume_char(',') {
                break;
            }
        }

        parser.expect(&comparers.from)?;
        let from = FromItem::parse(parser)?;

        parser.next_non_whitespace();
        if parser.current() == ',' {
            let pivot = parser.position;
            parser.next();
            return ParseError::with_kind(ParseErrorKind::MultipleTables, "Multiple tables in FROM", pivot, parser).err();
        }

        let mut select = Select::new(items, from);
        select.distinct = distinct;

        while let Some(join) = Join::parse_optional(parser)? {
            select.joins.push(join);
        }

        if parser.consume(&comparers.r#where) {
            select.where_clause = Some(Expr::parse(parser)?);
        }

        if parser.consume(&comparers.group_by) {
            loop {
                select.group_by.push(Expr::parse(parser)?);
                if !parser.consume_char(',') {
                    break;
                }
            }
        }

        if parser.consume(&comparers.having) {
            select.having = Some(Expr::parse(parser)?);
        }

        if parser.consume(&comparers.order_by) {
            select.order_by = parse_order_by(parser)?;
        }

        let (limit, offset) = parse_limit_offset(parser)?;
        select.limit = limit;
        select.offset = offset;

        Ok(select)
    }
}

pub(crate) fn parse_order_by(parser: &mut QueryParser) -> Result<Vec<OrderByItem>, ParseError> {
    let mut items = vec![];
    loop {
        items.push(OrderByItem::parse(parser)?);
        if !parser.consume_char(',') {
            break;
        }
    }
    Ok(items)
}

/// `LIMIT n [OFFSET m]`, `LIMIT m, n` or a lone `OFFSET m`.
pub(crate) fn parse_limit_offset(parser: &mut QueryParser) -> Result<(Option<i64>, Option<i64>), ParseError> {
    let comparers = parser.comparers;
    let mut limit = None;
    let mut offset = None;

    if parser.consume(&comparers.limit) {
        let first = TextCollector::unsigned(parser)?;
        if parser.consume_char(',') {
            offset = Some(first);
            limit = Some(TextCollector::unsigned(parser)?);
        } else {
            limit = Some(first);
        }
    }

    if offset.is_none() && parser.consume(&comparers.offset) {
        offset = Some(TextCollector::unsigned(parser)?);
    }

    Ok((limit, offset))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// A query expression: a plain SELECT, a parenthesized one, or a chain of
/// set operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectStatement {
    Plain(Select),
    Parenthesized(Box<SelectStatement>),
    SetOperation { branches: Vec<SelectStatement>, operators: Vec<SetOperator> },
}

impl SelectStatement {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let first = Self::parse_branch(parser)?;

        let mut branches = vec![first];
        let mut operators = vec![];
        while let Some(operator) = Self::parse_operator(parser) {
            operators.push(operator);
            branches.push(Self::parse_branch(parser)?);
        }

        if operators.is_empty() {
            return Ok(branches.remove(0));
        }
        Ok(SelectStatement::SetOperation { branches, operators })
    }

    fn parse_branch(parser: &mut QueryParser) -> Result<Self, ParseError> {
        if parser.consume_char('(') {
            let inner = Self::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(SelectStatement::Parenthesized(Box::new(inner)));
        }
        Select::parse(parser).map(SelectStatement::Plain)
    }

    fn parse_operator(parser: &mut QueryParser) -> Option<SetOperator> {
        let comparers = parser.comparers;
        if parser.consume(&comparers.union) {
            return Some(match parser.consume(&comparers.all) {
                true => SetOperator::UnionAll,
                false => SetOperator::Union,
            });
        }
        if parser.consume(&comparers.intersect) {
            return Some(SetOperator::Intersect);
        }
        if parser.consume(&comparers.except) {
            return Some(SetOperator::Except);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{
        ast::{Expr, FromItem, JoinType, Select, SelectStatement},
        ParseErrorKind, QueryParser,
    };

    fn parse_select(text: &str) -> Select {
        let mut parser = QueryParser::new(text);
        Select::parse(&mut parser).unwrap()
    }

    #[test]
    pub fn test_select_all_clauses() {
        let select = parse_select(
            "SELECT DISTINCT u.name AS n, count(*) total FROM users u \
             LEFT JOIN orders o ON u.id = o.user_id \
             WHERE u.age > 18 GROUP BY u.name HAVING count(*) > 2 \
             ORDER BY total DESC, n LIMIT 10 OFFSET 5",
        );

        assert!(select.distinct);
        assert_eq!(select.items.len(), 2);
        assert_eq!(select.items[0].alias.as_deref(), Some("n"));
        assert_eq!(select.items[1].alias.as_deref(), Some("total"));
        assert_eq!(select.from, FromItem::Table { name: "users".to_string(), alias: Some("u".to_string()) });
        assert_eq!(select.joins.len(), 1);
        assert_eq!(select.joins[0].join_type, JoinType::Left);
        assert!(select.where_clause.is_some());
        assert_eq!(select.group_by, vec![Expr::Column(crate::parser::ast::Column::qualified("u", "name"))]);
        assert!(select.having.is_some());
        assert_eq!(select.order_by.len(), 2);
        assert!(!select.order_by[0].asc);
        assert!(select.order_by[1].asc);
        assert_eq!(select.limit, Some(10));
        assert_eq!(select.offset, Some(5));
    }

    #[test]
    pub fn test_limit_with_comma() {
        let select = parse_select("SELECT * FROM t LIMIT 20, 10");

        assert_eq!(select.items.len(), 1);
        assert!(select.items[0].is_wildcard());
        assert_eq!(select.limit, Some(10));
        assert_eq!(select.offset, Some(20));
    }

    #[test]
    pub fn test_multiple_tables_rejected() {
        let mut parser = QueryParser::new("SELECT * FROM a, b");

        assert_eq!(Select::parse(&mut parser).unwrap_err().kind, ParseErrorKind::MultipleTables);
    }

    #[test]
    pub fn test_set_operation() {
        let mut parser = QueryParser::new("SELECT a FROM t UNION ALL SELECT a FROM u");

        match SelectStatement::parse(&mut parser) {
            Ok(SelectStatement::SetOperation { branches, operators }) => {
                assert_eq!(branches.len(), 2);
                assert_eq!(operators.len(), 1);
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_parenthesized_branch() {
        let mut parser = QueryParser::new("(SELECT a FROM t) UNION SELECT a FROM u");

        match SelectStatement::parse(&mut parser) {
            Ok(SelectStatement::SetOperation { branches, .. }) => {
                assert!(matches!(branches[0], SelectStatement::Parenthesized(_)));
            }
            _ => panic!(),
        }
    }
}
