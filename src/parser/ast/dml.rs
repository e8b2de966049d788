use crate::parser::{
    ast::{parse_limit_offset, Column, ComparatorOp, Expr, FromItem, TextCollector},
    ParseError, QueryParser,
};

/// `INSERT INTO t [(cols)] VALUES (...)[, (...)]`
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Expr>>,
}

impl Insert {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        parser.expect(&comparers.insert_into)?;
        let table = TextCollector::dotted_name(parser)?;

        let mut columns = vec![];
        if parser.consume_char('(') {
            loop {
                columns.push(TextCollector::name(parser)?);
                if !parser.consume_char(',') {
                    break;
                }
            }
            parser.expect_char(')')?;
        }

        parser.expect(&comparers.values)?;
        let mut rows = vec![];
        loop {
            parser.expect_char('(')?;
            let mut row = vec![];
            if !parser.consume_char(')') {
                loop {
                    row.push(Expr::parse(parser)?);
                    if !parser.consume_char(',') {
                        break;
                    }
                }
                parser.expect_char(')')?;
            }
            rows.push(row);

            if !parser.consume_char(',') {
                break;
            }
        }

        Ok(Insert { table, columns, rows })
    }
}

/// `UPDATE t [alias] SET c = v[, ...] [WHERE ...] [LIMIT n]`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: FromItem,
    pub assignments: Vec<(Column, Expr)>,
    pub where_clause: Option<Expr>,
    pub limit: Option<i64>,
}

impl Update {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        parser.expect(&comparers.update)?;
        let table = FromItem::parse_table(parser)?;
        parser.expect(&comparers.set)?;

        let mut assignments = vec![];
        loop {
            let pivot = parser.position;
            let assignment = match Expr::parse(parser)? {
                Expr::Compare { left, op: ComparatorOp::Eq, right } => match *left {
                    Expr::Column(column) if !column.quoted => (column, *right),
                    _ => return ParseError::new("Expected a column assignment", pivot, parser).err(),
                },
                _ => return ParseError::new("Expected a column assignment", pivot, parser).err(),
            };
            assignments.push(assignment);
            if !parser.consume_char(',') {
                break;
            }
        }

        let where_clause = match parser.consume(&comparers.r#where) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };
        let (limit, _) = parse_limit_offset(parser)?;

        Ok(Update { table, assignments, where_clause, limit })
    }
}

/// `DELETE [t1[, t2]] FROM t [alias] [WHERE ...] [LIMIT n]`
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Explicit target list written between DELETE and FROM.
    pub tables: Vec<String>,
    pub from: FromItem,
    pub where_clause: Option<Expr>,
    pub limit: Option<i64>,
}

impl Delete {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        parser.expect(&comparers.delete)?;

        let mut tables = vec![];
        if !parser.check(&comparers.from) {
            loop {
                tables.push(TextCollector::dotted_name(parser)?);
                if !parser.consume_char(',') {
                    break;
                }
            }
        }

        parser.expect(&comparers.from)?;
        let from = FromItem::parse_table(parser)?;

        let where_clause = match parser.consume(&comparers.r#where) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };
        let (limit, _) = parse_limit_offset(parser)?;

        Ok(Delete { tables, from, where_clause, limit })
    }
}
