use std::fmt;

use crate::parser::ast::{ArithmeticOp, Column, ComparatorOp, Function, Literal, SelectStatement};

/// Scalar and boolean expressions of a statement.
///
/// `And`/`Or` are binary: `a AND b AND c` parses as `And(And(a, b), c)`.
/// Parentheses only affect the tree shape and leave no node behind.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    Literal(Literal),
    Function(Function),
    /// `*`
    Wildcard,
    /// `alias.*`
    QualifiedWildcard(String),
    /// Unary `-expr` / `+expr`.
    Signed { negative: bool, expr: Box<Expr> },
    Arithmetic { left: Box<Expr>, op: ArithmeticOp, right: Box<Expr> },
    Compare { left: Box<Expr>, op: ComparatorOp, right: Box<Expr> },
    Like { expr: Box<Expr>, pattern: Box<Expr>, negated: bool },
    IsNull { expr: Box<Expr>, negated: bool },
    InList { expr: Box<Expr>, list: Vec<Expr>, negated: bool },
    Between { expr: Box<Expr>, low: Box<Expr>, high: Box<Expr>, negated: bool },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    SubQuery(Box<SelectStatement>),
}

impl Expr {
    pub fn column(name: &str) -> Self {
        Expr::Column(Column::new(name))
    }

    pub fn string(value: &str) -> Self {
        Expr::Literal(Literal::String(value.to_string()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn compare(left: Expr, op: ComparatorOp, right: Expr) -> Self {
        Expr::Compare { left: Box::new(left), op, right: Box::new(right) }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Expr::And(..) | Expr::Or(..))
    }

    /// Text of a value-like node: string literals lose their quotes, columns
    /// render their dotted name, anything else renders as SQL.
    pub fn string_value(&self) -> String {
        match self {
            Expr::Literal(Literal::String(value)) => value.clone(),
            Expr::Column(column) if column.quoted => column.name.clone(),
            Expr::Column(column) => column.full_name(),
            other => other.to_string(),
        }
    }

    /// Leaves of the top-level AND chain, left to right.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::And(left, right) => {
                let mut items = left.conjuncts();
                items.extend(right.conjuncts());
                items
            }
            other => vec![other],
        }
    }

    /// Folds expressions back into a left-leaning AND chain.
    pub fn conjunction(items: Vec<Expr>) -> Option<Expr> {
        items.into_iter().reduce(Expr::and)
    }

    /// Visits every column reference outside nested subqueries.
    pub fn visit_columns<'a>(&'a self, visitor: &mut impl FnMut(&'a Column)) {
        match self {
            Expr::Column(column) => visitor(column),
            Expr::Literal(_) | Expr::Wildcard | Expr::QualifiedWildcard(_) | Expr::SubQuery(_) => {}
            Expr::Function(function) => function.args.iter().for_each(|arg| arg.visit_columns(visitor)),
            Expr::Signed { expr, .. } | Expr::IsNull { expr, .. } | Expr::Not(expr) => expr.visit_columns(visitor),
            Expr::Arithmetic { left, right, .. } | Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
                left.visit_columns(visitor);
                right.visit_columns(visitor);
            }
            Expr::Like { expr, pattern, .. } => {
                expr.visit_columns(visitor);
                pattern.visit_columns(visitor);
            }
            Expr::InList { expr, list, .. } => {
                expr.visit_columns(visitor);
                list.iter().for_each(|item| item.visit_columns(visitor));
            }
            Expr::Between { expr, low, high, .. } => {
                expr.visit_columns(visitor);
                low.visit_columns(visitor);
                high.visit_columns(visitor);
            }
        }
    }

    pub fn visit_columns_mut(&mut self, visitor: &mut impl FnMut(&mut Column)) {
        match self {
            Expr::Column(column) => visitor(column),
            Expr::Literal(_) | Expr::Wildcard | Expr::QualifiedWildcard(_) | Expr::SubQuery(_) => {}
            Expr::Function(function) => function.args.iter_mut().for_each(|arg| arg.visit_columns_mut(visitor)),
            Expr::Signed { expr, .. } | Expr::IsNull { expr, .. } | Expr::Not(expr) => expr.visit_columns_mut(visitor),
            Expr::Arithmetic { left, right, .. } | Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
                left.visit_columns_mut(visitor);
                right.visit_columns_mut(visitor);
            }
            Expr::Like { expr, pattern, .. } => {
                expr.visit_columns_mut(visitor);
                pattern.visit_columns_mut(visitor);
            }
            Expr::InList { expr, list, .. } => {
                expr.visit_columns_mut(visitor);
                list.iter_mut().for_each(|item| item.visit_columns_mut(visitor));
            }
            Expr::Between { expr, low, high, .. } => {
                expr.visit_columns_mut(visitor);
                low.visit_columns_mut(visitor);
                high.visit_columns_mut(visitor);
            }
        }
    }

    /// Whether any OR node appears anywhere in the tree.
    pub fn contains_disjunction(&self) -> bool {
        match self {
            Expr::Or(..) => true,
            Expr::And(left, right) => left.contains_disjunction() || right.contains_disjunction(),
            Expr::Not(expr) => expr.contains_disjunction(),
            _ => false,
        }
    }
}

fn negation(negated: bool) -> &'static str {
    if negated { "NOT " } else { "" }
}

struct Grouped<'a>(&'a Expr, bool);

impl fmt::Display for Grouped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            true => write!(f, "({})", self.0),
            false => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(column) => write!(f, "{}", column),
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::Function(function) => write!(f, "{}", function),
            Expr::Wildcard => write!(f, "*"),
            Expr::QualifiedWildcard(table) => write!(f, "{}.*", table),
            Expr::Signed { negative, expr } => write!(f, "{}{}", if *negative { "-" } else { "+" }, expr),
            Expr::Arithmetic { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Like { expr, pattern, negated } => write!(f, "{} {}LIKE {}", expr, negation(*negated), pattern),
            Expr::IsNull { expr, negated } => write!(f, "{} IS {}NULL", expr, negation(*negated)),
            Expr::InList { expr, list, negated } => {
                let items: Vec<String> = list.iter().map(|item| item.to_string()).collect();
                write!(f, "{} {}IN ({})", expr, negation(*negated), items.join(", "))
            }
            Expr::Between { expr, low, high, negated } => {
                write!(f, "{} {}BETWEEN {} AND {}", expr, negation(*negated), low, high)
            }
            Expr::And(left, right) => write!(
                f,
                "{} AND {}",
                Grouped(left, matches!(**left, Expr::Or(..))),
                Grouped(right, right.is_logical())
            ),
            Expr::Or(left, right) => write!(f, "{} OR {}", left, Grouped(right, matches!(**right, Expr::Or(..)))),
            Expr::Not(expr) => write!(f, "NOT {}", Grouped(expr, expr.is_logical())),
            Expr::SubQuery(_) => write!(f, "(SELECT ...)"),
        }
    }
}
