use std::fmt;

use crate::parser::{ast::Expr, ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
}

impl Function {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self { name: name.to_string(), args, distinct: false }
    }

    /// Parses `( [DISTINCT] arg, ... )` after the function name.
    pub fn parse_args(name: String, parser: &mut QueryParser) -> Result<Self, ParseError> {
        let comparers = parser.comparers;
        parser.expect_char('(')?;

        let mut function = Function { name, args: vec![], distinct: false };
        if parser.consume_char(')') {
            return Ok(function);
        }

        function.distinct = parser.consume(&comparers.distinct);
        loop {
            function.args.push(Expr::parse(parser)?);
            if !parser.consume_char(',') {
                break;
            }
        }
        parser.expect_char(')')?;

        Ok(function)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|arg| arg.to_string()).collect();
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        write!(f, "{}({}{})", self.name, distinct, args.join(", "))
    }
}
