use crate::parser::{
    ast::{ArithmeticOp, Column, ComparatorOp, Expr, Function, Literal, SelectStatement, TextCollector},
    ParseError, QueryComparers, QueryParser,
};

impl Expr {
    /// Parses a full expression. Precedence, lowest first:
    /// OR, AND, NOT, predicates (comparison, LIKE, IS NULL, IN, BETWEEN),
    /// `+ -`, `* / %`, unary sign, primaries.
    pub fn parse(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        Self::parse_or(parser)
    }

    fn parse_or(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let comparers = parser.comparers;
        let mut left = Self::parse_and(parser)?;
        while parser.consume(&comparers.or) {
            let right = Self::parse_and(parser)?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let comparers = parser.comparers;
        let mut left = Self::parse_not(parser)?;
        while parser.consume(&comparers.and) {
            let right = Self::parse_not(parser)?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let comparers = parser.comparers;
        if parser.consume(&comparers.not) {
            return Ok(Expr::not(Self::parse_not(parser)?));
        }
        Self::parse_predicate(parser)
    }

    fn parse_predicate(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let comparers = parser.comparers;
        let left = Self::parse_additive(parser)?;

        if let Some(op) = ComparatorOp::parse(parser)? {
            let right = Self::parse_additive(parser)?;
            return Ok(Expr::compare(left, op, right));
        }

        if parser.consume(&comparers.not_like) {
            let pattern = Self::parse_additive(parser)?;
            return Ok(Expr::Like { expr: Box::new(left), pattern: Box::new(pattern), negated: true });
        }

        if parser.consume(&comparers.like) {
            let pattern = Self::parse_additive(parser)?;
            return Ok(Expr::Like { expr: Box::new(left), pattern: Box::new(pattern), negated: false });
        }

        if parser.consume(&comparers.is_not_null) {
            return Ok(Expr::IsNull { expr: Box::new(left), negated: true });
        }

        if parser.consume(&comparers.is_null) {
            return Ok(Expr::IsNull { expr: Box::new(left), negated: false });
        }

        if parser.consume(&comparers.not_in) {
            let list = Self::parse_in_list(parser)?;
            return Ok(Expr::InList { expr: Box::new(left), list, negated: true });
        }

        if parser.consume(&comparers.r#in) {
            let list = Self::parse_in_list(parser)?;
            return Ok(Expr::InList { expr: Box::new(left), list, negated: false });
        }

        let negated = parser.consume(&comparers.not_between);
        if negated || parser.consume(&comparers.between) {
            let low = Self::parse_additive(parser)?;
            parser.expect(&comparers.and)?;
            let high = Self::parse_additive(parser)?;
            return Ok(Expr::Between { expr: Box::new(left), low: Box::new(low), high: Box::new(high), negated });
        }

        Ok(left)
    }

    fn parse_in_list(parser: &mut QueryParser) -> Result<Vec<Expr>, ParseError> {
        let comparers = parser.comparers;
        parser.expect_char('(')?;

        if parser.check(&comparers.select) {
            let query = SelectStatement::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(vec![Expr::SubQuery(Box::new(query))]);
        }

        let mut list = vec![];
        if parser.consume_char(')') {
            return Ok(list);
        }
        loop {
            list.push(Self::parse(parser)?);
            if !parser.consume_char(',') {
                break;
            }
        }
        parser.expect_char(')')?;
        Ok(list)
    }

    fn parse_additive(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let mut left = Self::parse_multiplicative(parser)?;
        loop {
            parser.next_non_whitespace();
            let op = match ArithmeticOp::from_char(parser.current()) {
                Some(op @ (ArithmeticOp::Add | ArithmeticOp::Sub)) => op,
                _ => return Ok(left),
            };
            parser.next();
            let right = Self::parse_multiplicative(parser)?;
            left = Expr::Arithmetic { left: Box::new(left), op, right: Box::new(right) };
        }
    }

    fn parse_multiplicative(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let mut left = Self::parse_unary(parser)?;
        loop {
            parser.next_non_whitespace();
            let op = match ArithmeticOp::from_char(parser.current()) {
                Some(op @ (ArithmeticOp::Mul | ArithmeticOp::Div | ArithmeticOp::Mod)) => op,
                _ => return Ok(left),
            };
            parser.next();
            let right = Self::parse_unary(parser)?;
            left = Expr::Arithmetic { left: Box::new(left), op, right: Box::new(right) };
        }
    }

    fn parse_unary(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        parser.next_non_whitespace();
        let negative = match parser.current() {
            '-' => true,
            '+' => false,
            _ => return Self::parse_primary(parser),
        };
        parser.next();
        let expr = Self::parse_unary(parser)?;
        Ok(Expr::Signed { negative, expr: Box::new(expr) })
    }

    fn parse_primary(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let comparers = parser.comparers;
        parser.next_non_whitespace();
        let pivot = parser.position;

        match parser.current() {
            '\0' => return ParseError::new("Unexpected end of query", pivot, parser).err(),
            '(' => {
                parser.next();
                if parser.check(&comparers.select) {
                    let query = SelectStatement::parse(parser)?;
                    parser.expect_char(')')?;
                    return Ok(Expr::SubQuery(Box::new(query)));
                }
                let expr = Self::parse(parser)?;
                parser.expect_char(')')?;
                return Ok(expr);
            }
            '\'' => return Literal::parse_string(parser).map(Expr::Literal),
            '"' | '`' => return TextCollector::name(parser).map(|name| Expr::Column(Column::quoted(&name))),
            '*' => {
                parser.next();
                return Ok(Expr::Wildcard);
            }
            ch if ch.is_ascii_digit() || ch == '.' && parser.peek(1).is_ascii_digit() => {
                return Literal::parse_number(parser).map(Expr::Literal);
            }
            _ => {}
        }

        let word = match TextCollector::identifier(parser) {
            Some(word) => word,
            None => return ParseError::new("Invalid expression", pivot, parser).err(),
        };

        if word.eq_ignore_ascii_case("TRUE") {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if word.eq_ignore_ascii_case("FALSE") {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if word.eq_ignore_ascii_case("NULL") {
            return Ok(Expr::Literal(Literal::Null));
        }
        if QueryComparers::is_reserved(&word) {
            return ParseError::new(&format!("Unexpected keyword {}", word.to_uppercase()), pivot, parser).err();
        }

        let typed = word.eq_ignore_ascii_case("DATE") || word.eq_ignore_ascii_case("TIMESTAMP");
        parser.next_non_whitespace();
        if typed && parser.current() == '\'' {
            return Literal::parse_typed(parser, word.eq_ignore_ascii_case("TIMESTAMP")).map(Expr::Literal);
        }

        if parser.current() == '(' {
            return Function::parse_args(word, parser).map(Expr::Function);
        }

        if parser.current() != '.' {
            return Ok(Expr::Column(Column::new(&word)));
        }

        let mut parts = vec![];
        while parser.current() == '.' {
            parser.next();
            if parser.current() == '*' {
                parser.next();
                return match parts.is_empty() {
                    true => Ok(Expr::QualifiedWildcard(word)),
                    false => ParseError::new("Invalid wildcard", pivot, parser).err(),
                };
            }
            parts.push(TextCollector::name(parser)?);
        }

        Ok(Expr::Column(Column::qualified(&word, &parts.join("."))))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{ArithmeticOp, Column, ComparatorOp, Expr, Function, Literal}, ParseErrorKind, QueryParser};

    fn parse(text: &str) -> Expr {
        let mut parser = QueryParser::new(text);
        Expr::parse(&mut parser).unwrap()
    }

    #[test]
    pub fn test_precedence_and_binds_tighter_than_or() {
        let expr = parse("a = 1 OR b = 2 AND c = 3");

        match expr {
            Expr::Or(left, right) => {
                assert_eq!(left.to_string(), "a = 1");
                assert!(matches!(*right, Expr::And(..)));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_and_chain_is_left_leaning() {
        let expr = parse("a = 1 AND b = 2 AND c = 3");

        match expr {
            Expr::And(left, right) => {
                assert!(matches!(*left, Expr::And(..)));
                assert_eq!(right.to_string(), "c = 3");
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_parentheses_change_shape() {
        let expr = parse("(a = 1 OR b = 2) AND c = 3");

        match expr {
            Expr::And(left, _) => assert!(matches!(*left, Expr::Or(..))),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_predicates() {
        assert!(matches!(parse("name NOT LIKE 'a%'"), Expr::Like { negated: true, .. }));
        assert!(matches!(parse("name like 'a%'"), Expr::Like { negated: false, .. }));
        assert!(matches!(parse("name IS NOT NULL"), Expr::IsNull { negated: true, .. }));
        assert!(matches!(parse("name is null"), Expr::IsNull { negated: false, .. }));
        assert!(matches!(parse("x NOT BETWEEN 1 AND 10"), Expr::Between { negated: true, .. }));

        match parse("status IN ('a', 'b')") {
            Expr::InList { list, negated, .. } => {
                assert!(!negated);
                assert_eq!(list, vec![Expr::string("a"), Expr::string("b")]);
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_between_consumes_its_and() {
        let expr = parse("x BETWEEN 1 AND 10 AND y = 2");

        match expr {
            Expr::And(left, right) => {
                assert!(matches!(*left, Expr::Between { .. }));
                assert_eq!(right.to_string(), "y = 2");
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_not_prefix() {
        assert_eq!(parse("NOT active"), Expr::not(Expr::column("active")));
        assert!(matches!(parse("NOT a = 1"), Expr::Not(inner) if matches!(*inner, Expr::Compare { .. })));
    }

    #[test]
    pub fn test_primaries() {
        assert_eq!(parse("u.name"), Expr::Column(Column::qualified("u", "name")));
        assert_eq!(parse("u.address.city"), Expr::Column(Column::qualified("u", "address.city")));
        assert_eq!(parse("\"John\""), Expr::Column(Column::quoted("John")));
        assert_eq!(parse("o.*"), Expr::QualifiedWildcard("o".to_string()));
        assert_eq!(parse("true"), Expr::Literal(Literal::Bool(true)));
        assert_eq!(parse("NULL"), Expr::Literal(Literal::Null));
        assert_eq!(parse("-5"), Expr::Signed { negative: true, expr: Box::new(Expr::int(5)) });
        assert!(matches!(parse("DATE '2020-01-02'"), Expr::Literal(Literal::Date(_))));
        assert!(matches!(parse("TIMESTAMP('2020-01-02')"), Expr::Function(_)));
        assert!(matches!(parse("date(created, 'yyyy-MM-dd')"), Expr::Function(_)));
    }

    #[test]
    pub fn test_function_call() {
        let expr = parse("regexMatch(name, '^a.*', 'i') = true");

        match expr {
            Expr::Compare { left, op, right } => {
                assert_eq!(op, ComparatorOp::Eq);
                assert_eq!(*right, Expr::Literal(Literal::Bool(true)));
                match *left {
                    Expr::Function(Function { name, args, .. }) => {
                        assert_eq!(name, "regexMatch");
                        assert_eq!(args.len(), 3);
                    }
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_arithmetic() {
        match parse("a + b * 2") {
            Expr::Arithmetic { op, right, .. } => {
                assert_eq!(op, ArithmeticOp::Add);
                assert!(matches!(*right, Expr::Arithmetic { op: ArithmeticOp::Mul, .. }));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_in_subquery() {
        match parse("id IN (SELECT user_id FROM orders)") {
            Expr::InList { list, .. } => assert!(matches!(list[0], Expr::SubQuery(_))),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_errors() {
        let mut parser = QueryParser::new("a == 1");
        assert_eq!(Expr::parse(&mut parser).unwrap_err().kind, ParseErrorKind::DoubleEquals);

        let mut parser = QueryParser::new("a = ");
        assert_eq!(Expr::parse(&mut parser).unwrap_err().message, "Unexpected end of query");

        let mut parser = QueryParser::new("a = WHERE");
        let err = Expr::parse(&mut parser).unwrap_err();
        assert_eq!(err.message, "Unexpected keyword WHERE");
        assert_eq!(err.start, 4);
    }
}
