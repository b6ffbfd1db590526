//! Recursive-descent parser. Never aborts on the first error: it
//! accumulates error strings and resynchronizes at the next clause-start
//! keyword, per `spec.md` §4.D.
//!
//! Expression precedence, loosest to tightest, follows a small
//! binding-power ladder in the spirit of the teacher's Pratt parser:
//! `OR < XOR < AND < NOT (prefix) < comparisons < primary`.

use crate::ast::*;
use crate::error::Error;
use crate::lexer::{Lexer, Token, TokenKind};
use cygraph_api::Value;

type PResult<T> = Result<T, Error>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<String>,
}

impl Parser {
    /// Parses `input` into a `Statement`, returning whatever errors were
    /// accumulated along the way. A non-empty error list does not mean the
    /// statement is empty: every clause that parsed cleanly is still
    /// present in the result (the parse-recovery invariant in `spec.md`
    /// §8).
    pub fn parse(input: &str) -> (Statement, Vec<String>) {
        let tokens = Lexer::new(input).tokenize();
        let mut parser = Parser {
            tokens,
            pos: 0,
            errors: Vec::new(),
        };
        let statement = parser.parse_statement();
        (statement, parser.errors)
    }

    fn parse_statement(&mut self) -> Statement {
        let mut stmt = Statement::empty();
        while !self.at_eof() {
            if self.match_tok(&TokenKind::Match) {
                if let Some(v) = self.finish_clause(Self::parse_match_body) {
                    if stmt.r#match.is_some() {
                        self.errors.push("duplicate MATCH clause".to_string());
                    }
                    stmt.r#match = Some(v);
                }
            } else if self.match_tok(&TokenKind::Where) {
                if let Some(v) = self.finish_clause(Self::parse_where_body) {
                    stmt.r#where = Some(v);
                }
            } else if self.match_tok(&TokenKind::Create) {
                if let Some(v) = self.finish_clause(Self::parse_create_body) {
                    stmt.create = Some(v);
                }
            } else if self.match_tok(&TokenKind::Set) {
                if let Some(v) = self.finish_clause(Self::parse_set_body) {
                    stmt.set = Some(v);
                }
            } else if self.check(&TokenKind::Detach) || self.check(&TokenKind::Delete) {
                if let Some(v) = self.finish_clause(Self::parse_delete_body) {
                    stmt.delete = Some(v);
                }
            } else if self.match_tok(&TokenKind::Return) {
                if let Some(v) = self.finish_clause(Self::parse_return_body) {
                    stmt.r#return = Some(v);
                }
            } else {
                let tok = self.peek().clone();
                self.errors.push(format!(
                    "unexpected token {} at line {}, column {}",
                    describe(&tok),
                    tok.line,
                    tok.col
                ));
                self.synchronize();
            }
        }
        stmt
    }

    /// Runs `body`, returning its value on success or pushing the error and
    /// resynchronizing (then returning `None`) on failure. Merging the
    /// result into `stmt` is left to the caller, which already holds `self`
    /// and `stmt` sequentially rather than needing a closure to capture both.
    fn finish_clause<T>(&mut self, body: fn(&mut Self) -> PResult<T>) -> Option<T> {
        match body(self) {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(e.to_string());
                self.synchronize();
                None
            }
        }
    }

    // ---- clause bodies -------------------------------------------------

    fn parse_match_body(&mut self) -> PResult<MatchClause> {
        let mut patterns = vec![self.parse_path_pattern()?];
        while self.match_tok(&TokenKind::Comma) {
            patterns.push(self.parse_path_pattern()?);
        }
        Ok(MatchClause { patterns })
    }

    fn parse_where_body(&mut self) -> PResult<WhereClause> {
        let condition = self.parse_expression()?;
        Ok(WhereClause { condition })
    }

    fn parse_create_body(&mut self) -> PResult<CreateClause> {
        let mut items = Vec::new();
        self.parse_create_pattern_into(&mut items)?;
        while self.match_tok(&TokenKind::Comma) {
            self.parse_create_pattern_into(&mut items)?;
        }
        Ok(CreateClause { items })
    }

    fn parse_create_pattern_into(&mut self, items: &mut Vec<CreateItem>) -> PResult<()> {
        let first = self.parse_node_pattern()?;
        if self.check(&TokenKind::Minus) || self.check(&TokenKind::BackwardArrow) {
            let rel = self.parse_rel_pattern()?;
            let second = self.parse_node_pattern()?;
            let from = self.create_endpoint_var(&first, items);
            let to = self.create_endpoint_var(&second, items);
            items.push(CreateItem::Rel { from, rel, to });
        } else {
            if first.variable.is_none() {
                self.errors.push(
                    "CREATE node pattern must bind a variable".to_string(),
                );
            }
            items.push(CreateItem::Node(first));
        }
        Ok(())
    }

    /// Resolves one endpoint of a `CREATE (a)-[...]->(b)` triple to the
    /// variable name the relationship item will reference, additionally
    /// emitting a `CreateItem::Node` if the endpoint carries labels or
    /// properties of its own (i.e. it is a declaration, not a bare
    /// reference to an already-bound variable).
    fn create_endpoint_var(&mut self, node: &NodePattern, items: &mut Vec<CreateItem>) -> String {
        let var = match &node.variable {
            Some(v) => v.clone(),
            None => {
                self.errors
                    .push("CREATE relationship endpoints must be named".to_string());
                String::new()
            }
        };
        if !node.labels.is_empty() || !node.properties.is_empty() {
            items.push(CreateItem::Node(node.clone()));
        }
        var
    }

    fn parse_set_body(&mut self) -> PResult<SetClause> {
        let mut settings = vec![self.parse_set_item()?];
        while self.match_tok(&TokenKind::Comma) {
            settings.push(self.parse_set_item()?);
        }
        Ok(SetClause { settings })
    }

    fn parse_set_item(&mut self) -> PResult<SetItem> {
        let target = self.expect_identifier_like()?;
        self.expect(&TokenKind::Dot, "expected '.' after SET target")?;
        let property = self.expect_identifier_like()?;
        self.expect(&TokenKind::Equals, "expected '=' in SET item")?;
        let value = self.parse_expression()?;
        Ok(SetItem {
            target,
            property,
            value,
        })
    }

    fn parse_delete_body(&mut self) -> PResult<DeleteClause> {
        let detach = self.match_tok(&TokenKind::Detach);
        self.expect(
            &TokenKind::Delete,
            "DETACH is only valid immediately before DELETE",
        )?;
        let mut vars = vec![self.expect_identifier_like()?];
        while self.match_tok(&TokenKind::Comma) {
            vars.push(self.expect_identifier_like()?);
        }
        Ok(DeleteClause { detach, vars })
    }

    fn parse_return_body(&mut self) -> PResult<ReturnClause> {
        let mut items = vec![self.parse_return_item()?];
        while self.match_tok(&TokenKind::Comma) {
            items.push(self.parse_return_item()?);
        }
        Ok(ReturnClause { items })
    }

    fn parse_return_item(&mut self) -> PResult<ReturnItem> {
        let name = self.expect_identifier_like()?;
        let expr = if self.match_tok(&TokenKind::Dot) {
            let prop = self.expect_identifier_like()?;
            ReturnExpr::Property {
                object: name,
                name: prop,
            }
        } else {
            ReturnExpr::Variable(name)
        };
        Ok(ReturnItem { expr, alias: None })
    }

    // ---- patterns --------------------------------------------------------

    fn parse_path_pattern(&mut self) -> PResult<PathPattern> {
        let start = self.parse_node_pattern()?;
        let mut segments = Vec::new();
        while self.check(&TokenKind::Minus) || self.check(&TokenKind::BackwardArrow) {
            let rel = self.parse_rel_pattern()?;
            let node = self.parse_node_pattern()?;
            segments.push(PathSegment { rel, node });
        }
        Ok(PathPattern { start, segments })
    }

    fn parse_node_pattern(&mut self) -> PResult<NodePattern> {
        self.expect(&TokenKind::OpenParen, "expected '(' to start a node pattern")?;
        let mut variable = None;
        if matches!(self.peek().kind, TokenKind::Identifier(_))
            || self.is_identifier_like_keyword()
        {
            variable = Some(self.expect_identifier_like()?);
        }
        let mut labels = Vec::new();
        while self.match_tok(&TokenKind::Colon) {
            labels.push(self.expect_identifier_like()?);
        }
        let mut properties = Vec::new();
        if self.match_tok(&TokenKind::OpenBrace) {
            properties = self.parse_prop_map()?;
            self.expect(&TokenKind::CloseBrace, "expected '}' to close property map")?;
        }
        self.expect(&TokenKind::CloseParen, "expected ')' to close node pattern")?;
        if labels.len() > 1 {
            self.errors.push(format!(
                "multi-label node pattern is not supported (found {} labels)",
                labels.len()
            ));
        }
        Ok(NodePattern {
            variable,
            labels,
            properties,
        })
    }

    fn parse_rel_pattern(&mut self) -> PResult<RelationshipPattern> {
        let left_arrow = if self.match_tok(&TokenKind::BackwardArrow) {
            true
        } else {
            self.expect(&TokenKind::Minus, "expected '-' or '<-' to start a relationship")?;
            false
        };

        let mut variable = None;
        let mut rel_type = None;
        let mut properties = Vec::new();
        let mut min_hops = 1u32;
        let mut max_hops = Some(1u32);

        if self.match_tok(&TokenKind::OpenBracket) {
            if matches!(self.peek().kind, TokenKind::Identifier(_)) || self.is_identifier_like_keyword() {
                variable = Some(self.expect_identifier_like()?);
            }
            if self.match_tok(&TokenKind::Colon) {
                rel_type = Some(self.expect_identifier_like()?);
            }
            if self.match_tok(&TokenKind::Asterisk) {
                let (min, max) = self.parse_variable_length()?;
                min_hops = min;
                max_hops = max;
            }
            if self.match_tok(&TokenKind::OpenBrace) {
                properties = self.parse_prop_map()?;
                self.expect(&TokenKind::CloseBrace, "expected '}' to close property map")?;
            }
            self.expect(&TokenKind::CloseBracket, "expected ']' to close relationship")?;
        }

        let right_arrow = if self.match_tok(&TokenKind::ForwardArrow) {
            true
        } else {
            self.expect(&TokenKind::Minus, "expected '-' or '->' to end a relationship")?;
            false
        };

        let direction = match (left_arrow, right_arrow) {
            (false, false) => RelDirection::Both,
            (true, false) => RelDirection::In,
            (false, true) => RelDirection::Out,
            (true, true) => {
                self.errors
                    .push("mixed relationship arrows '<-...->' are not allowed".to_string());
                RelDirection::Both
            }
        };

        Ok(RelationshipPattern {
            variable,
            rel_type,
            properties,
            direction,
            min_hops,
            max_hops,
        })
    }

    /// Parses the body of `*[min][..[max]]` after the `*` has already been
    /// consumed. See `SPEC_FULL.md` §5 for the bare-`*` convention.
    fn parse_variable_length(&mut self) -> PResult<(u32, Option<u32>)> {
        let first = self.take_number();
        let has_dots = if self.match_tok(&TokenKind::Dot) {
            self.expect(&TokenKind::Dot, "expected '..' in variable-length range")?;
            true
        } else {
            false
        };
        let second = if has_dots { self.take_number() } else { None };

        Ok(match (first, has_dots, second) {
            (None, false, _) => (1, None),
            (Some(n), false, _) => (n, Some(n)),
            (Some(n), true, None) => (n, None),
            (None, true, Some(m)) => (0, Some(m)),
            (Some(n), true, Some(m)) => (n, Some(m)),
            (None, true, None) => (0, None),
        })
    }

    fn take_number(&mut self) -> Option<u32> {
        if let TokenKind::Number(n) = self.peek().kind {
            self.advance();
            Some(n as u32)
        } else {
            None
        }
    }

    fn parse_prop_map(&mut self) -> PResult<Vec<(String, Value)>> {
        let mut props = Vec::new();
        if self.check(&TokenKind::CloseBrace) {
            return Ok(props);
        }
        loop {
            let key = self.expect_identifier_like()?;
            self.expect(&TokenKind::Colon, "expected ':' in property map")?;
            let value = self.parse_literal()?;
            props.push((key, value));
            if !self.match_tok(&TokenKind::Comma) {
                break;
            }
        }
        Ok(props)
    }

    fn parse_literal(&mut self) -> PResult<Value> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::String(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Value::Number(n))
            }
            TokenKind::Boolean(b) => {
                self.advance();
                Ok(Value::Bool(b))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Value::Null)
            }
            TokenKind::Minus => {
                self.advance();
                if let TokenKind::Number(n) = self.peek().kind {
                    self.advance();
                    Ok(Value::Number(-n))
                } else {
                    Err(self.unexpected("a number", &tok))
                }
            }
            _ => Err(self.unexpected("a literal", &tok)),
        }
    }

    // ---- expressions -------------------------------------------------

    fn parse_expression(&mut self) -> PResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expression> {
        let mut operands = vec![self.parse_xor()?];
        while self.match_tok(&TokenKind::Or) {
            operands.push(self.parse_xor()?);
        }
        Ok(fold_logical(LogicalOp::Or, operands))
    }

    fn parse_xor(&mut self) -> PResult<Expression> {
        let mut operands = vec![self.parse_and()?];
        while self.match_tok(&TokenKind::Xor) {
            operands.push(self.parse_and()?);
        }
        Ok(fold_logical(LogicalOp::Xor, operands))
    }

    fn parse_and(&mut self) -> PResult<Expression> {
        let mut operands = vec![self.parse_not()?];
        while self.match_tok(&TokenKind::And) {
            operands.push(self.parse_not()?);
        }
        Ok(fold_logical(LogicalOp::And, operands))
    }

    fn parse_not(&mut self) -> PResult<Expression> {
        if self.check(&TokenKind::Not) && self.check_next(&TokenKind::Exists) {
            self.advance();
            self.advance();
            let pattern = self.parse_exists_pattern()?;
            return Ok(Expression::Exists {
                positive: false,
                pattern,
            });
        }
        if self.match_tok(&TokenKind::Not) {
            let operand = self.parse_not()?;
            return Ok(Expression::Logical {
                op: LogicalOp::Not,
                operands: vec![operand],
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult<Expression> {
        let left = self.parse_primary()?;

        if self.match_tok(&TokenKind::Is) {
            let negated = self.match_tok(&TokenKind::Not);
            self.expect(&TokenKind::Null, "expected NULL after IS [NOT]")?;
            let op = if negated {
                ComparisonOp::IsNotNull
            } else {
                ComparisonOp::IsNull
            };
            return Ok(Expression::Comparison {
                left: Box::new(left),
                op,
                right: Box::new(Expression::Literal(Value::Null)),
            });
        }

        let op = if self.match_tok(&TokenKind::Equals) {
            Some(ComparisonOp::Eq)
        } else if self.match_tok(&TokenKind::NotEquals) {
            Some(ComparisonOp::Ne)
        } else if self.match_tok(&TokenKind::Lt) {
            Some(ComparisonOp::Lt)
        } else if self.match_tok(&TokenKind::Le) {
            Some(ComparisonOp::Le)
        } else if self.match_tok(&TokenKind::Gt) {
            Some(ComparisonOp::Gt)
        } else if self.match_tok(&TokenKind::Ge) {
            Some(ComparisonOp::Ge)
        } else if self.match_tok(&TokenKind::In) {
            Some(ComparisonOp::In)
        } else if self.match_tok(&TokenKind::Contains) {
            Some(ComparisonOp::Contains)
        } else if self.check(&TokenKind::Starts) {
            self.advance();
            self.expect(&TokenKind::With, "expected WITH after STARTS")?;
            Some(ComparisonOp::StartsWith)
        } else if self.check(&TokenKind::Ends) {
            self.advance();
            self.expect(&TokenKind::With, "expected WITH after ENDS")?;
            Some(ComparisonOp::EndsWith)
        } else {
            None
        };

        match op {
            Some(op) => {
                let right = self.parse_primary()?;
                Ok(Expression::Comparison {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                })
            }
            None => Ok(left),
        }
    }

    fn parse_primary(&mut self) -> PResult<Expression> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::String(s) => {
                self.advance();
                Ok(Expression::Literal(Value::String(s)))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expression::Literal(Value::Number(n)))
            }
            TokenKind::Boolean(b) => {
                self.advance();
                Ok(Expression::Literal(Value::Bool(b)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Literal(Value::Null))
            }
            TokenKind::Minus => {
                self.advance();
                if let TokenKind::Number(n) = self.peek().kind {
                    self.advance();
                    Ok(Expression::Literal(Value::Number(-n)))
                } else {
                    Err(self.unexpected("a number", &tok))
                }
            }
            TokenKind::Exists => {
                self.advance();
                let pattern = self.parse_exists_pattern()?;
                Ok(Expression::Exists {
                    positive: true,
                    pattern,
                })
            }
            TokenKind::OpenParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::CloseParen, "expected ')'")?;
                Ok(expr)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.match_tok(&TokenKind::Dot) {
                    let prop = self.expect_identifier_like()?;
                    Ok(Expression::Property {
                        object: name,
                        name: prop,
                    })
                } else {
                    Ok(Expression::Variable(name))
                }
            }
            _ => Err(self.unexpected("an expression", &tok)),
        }
    }

    fn parse_exists_pattern(&mut self) -> PResult<PathPattern> {
        self.expect(&TokenKind::OpenParen, "expected '(' after EXISTS")?;
        let pattern = self.parse_path_pattern()?;
        self.expect(&TokenKind::CloseParen, "expected ')' to close EXISTS")?;
        Ok(pattern)
    }

    // ---- token-stream plumbing -----------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn check_next(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek_at(1).kind) == std::mem::discriminant(kind)
    }

    fn match_tok(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, msg: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(self.unexpected(msg, &tok))
        }
    }

    /// Any keyword token can stand in for an identifier when the grammar
    /// contextually requires one (a variable, label, relationship type or
    /// property key) — the lexer always emits the keyword token, and this
    /// is where the demotion to "just an identifier" happens, per
    /// `spec.md` §4.B.
    fn expect_identifier_like(&mut self) -> PResult<String> {
        let tok = self.peek().clone();
        if matches!(tok.kind, TokenKind::Identifier(_)) || self.is_identifier_like_keyword() {
            self.advance();
            Ok(tok.text)
        } else {
            Err(self.unexpected("an identifier", &tok))
        }
    }

    fn is_identifier_like_keyword(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Match
                | TokenKind::Where
                | TokenKind::Create
                | TokenKind::Set
                | TokenKind::Delete
                | TokenKind::Detach
                | TokenKind::Return
                | TokenKind::Exists
                | TokenKind::Not
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Xor
                | TokenKind::Is
                | TokenKind::Null
                | TokenKind::In
                | TokenKind::Contains
                | TokenKind::Starts
                | TokenKind::Ends
                | TokenKind::With
                | TokenKind::Boolean(_)
        )
    }

    fn unexpected(&self, expected: &str, tok: &Token) -> Error {
        Error::Syntax(format!(
            "expected {expected}, found {} at line {}, column {}",
            describe(tok),
            tok.line,
            tok.col
        ))
    }

    /// Skips tokens until the next clause-start keyword or EOF, per
    /// `spec.md` §4.D. Always consumes at least one token so a malformed
    /// clause can't stall the parser in place.
    fn synchronize(&mut self) {
        if !self.at_clause_boundary() {
            self.advance();
        }
        while !self.at_clause_boundary() {
            self.advance();
        }
    }

    fn at_clause_boundary(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Match
                | TokenKind::Where
                | TokenKind::Create
                | TokenKind::Set
                | TokenKind::Delete
                | TokenKind::Detach
                | TokenKind::Return
                | TokenKind::Eof
        )
    }
}

fn describe(tok: &Token) -> String {
    if matches!(tok.kind, TokenKind::Eof) {
        "<eof>".to_string()
    } else {
        format!("'{}'", tok.text)
    }
}

fn fold_logical(op: LogicalOp, mut operands: Vec<Expression>) -> Expression {
    if operands.len() == 1 {
        operands.pop().unwrap()
    } else {
        Expression::Logical { op, operands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_match_where_return() {
        let (stmt, errors) = Parser::parse("MATCH (p:Person) WHERE p.age > 30 RETURN p");
        assert!(errors.is_empty(), "{errors:?}");
        let m = stmt.r#match.unwrap();
        assert_eq!(m.patterns.len(), 1);
        assert_eq!(m.patterns[0].start.labels, vec!["Person".to_string()]);
        assert!(matches!(
            stmt.r#where.unwrap().condition,
            Expression::Comparison {
                op: ComparisonOp::Gt,
                ..
            }
        ));
        assert_eq!(stmt.r#return.unwrap().items.len(), 1);
    }

    #[test]
    fn comma_separated_match_patterns_form_a_cartesian_product_list() {
        let (stmt, errors) = Parser::parse("MATCH (a:Person), (b:City) RETURN a, b");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(stmt.r#match.unwrap().patterns.len(), 2);
    }

    #[test]
    fn variable_length_relationship_parses_bounded_range() {
        let (stmt, errors) = Parser::parse("MATCH (a)-[:KNOWS*1..3]->(b) RETURN a, b");
        assert!(errors.is_empty(), "{errors:?}");
        let rel = &stmt.r#match.unwrap().patterns[0].segments[0].rel;
        assert_eq!(rel.min_hops, 1);
        assert_eq!(rel.max_hops, Some(3));
        assert!(rel.is_variable_length());
    }

    #[test]
    fn bare_star_means_one_or_more_hops_unbounded_above() {
        let (stmt, errors) = Parser::parse("MATCH (a)-[:KNOWS*]->(b) RETURN a");
        assert!(errors.is_empty(), "{errors:?}");
        let rel = &stmt.r#match.unwrap().patterns[0].segments[0].rel;
        assert_eq!(rel.min_hops, 1);
        assert_eq!(rel.max_hops, None);
    }

    #[test]
    fn default_relationship_is_a_single_hop() {
        let (stmt, _) = Parser::parse("MATCH (a)-[:KNOWS]->(b) RETURN a");
        let rel = &stmt.r#match.unwrap().patterns[0].segments[0].rel;
        assert!(!rel.is_variable_length());
        assert_eq!((rel.min_hops, rel.max_hops), (1, Some(1)));
    }

    #[test]
    fn create_triple_splits_into_node_and_relationship_items() {
        let (stmt, errors) = Parser::parse("CREATE (p)-[:VISITED]->(c)");
        assert!(errors.is_empty(), "{errors:?}");
        let items = stmt.create.unwrap().items;
        assert_eq!(items.len(), 1);
        assert!(matches!(
            &items[0],
            CreateItem::Rel { from, to, .. } if from == "p" && to == "c"
        ));
    }

    #[test]
    fn create_triple_with_labeled_endpoints_emits_node_items_too() {
        let (stmt, errors) = Parser::parse("CREATE (p:Person)-[:VISITED]->(c:City)");
        assert!(errors.is_empty(), "{errors:?}");
        let items = stmt.create.unwrap().items;
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], CreateItem::Node(n) if n.label() == Some("Person")));
        assert!(matches!(&items[1], CreateItem::Node(n) if n.label() == Some("City")));
        assert!(matches!(&items[2], CreateItem::Rel { .. }));
    }

    #[test]
    fn detach_delete_sets_the_detach_flag() {
        let (stmt, errors) = Parser::parse("MATCH (a) DETACH DELETE a");
        assert!(errors.is_empty(), "{errors:?}");
        let delete = stmt.delete.unwrap();
        assert!(delete.detach);
        assert_eq!(delete.vars, vec!["a".to_string()]);
    }

    #[test]
    fn plain_delete_without_detach_is_rejected_if_node_has_edges_at_runtime_but_parses_fine() {
        let (stmt, errors) = Parser::parse("MATCH (a) DELETE a");
        assert!(errors.is_empty(), "{errors:?}");
        assert!(!stmt.delete.unwrap().detach);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let (stmt, errors) = Parser::parse("MATCH (a) WHERE a.x = 1 OR a.y = 2 AND a.z = 3 RETURN a");
        assert!(errors.is_empty(), "{errors:?}");
        match stmt.r#where.unwrap().condition {
            Expression::Logical { op: LogicalOp::Or, operands } => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    operands[1],
                    Expression::Logical { op: LogicalOp::And, .. }
                ));
            }
            other => panic!("expected top-level OR, got {other:?}"),
        }
    }

    #[test]
    fn not_exists_is_recognized_as_a_single_construct() {
        let (stmt, errors) = Parser::parse("MATCH (a), (b) WHERE NOT EXISTS((a)-[:BLOCKS]->(b)) RETURN a");
        assert!(errors.is_empty(), "{errors:?}");
        assert!(matches!(
            stmt.r#where.unwrap().condition,
            Expression::Exists { positive: false, .. }
        ));
    }

    #[test]
    fn multi_label_node_pattern_is_a_recorded_error_not_a_panic() {
        let (stmt, errors) = Parser::parse("MATCH (a:Person:Employee) RETURN a");
        assert!(!errors.is_empty());
        assert_eq!(stmt.r#match.unwrap().patterns[0].start.labels.len(), 2);
    }

    #[test]
    fn a_malformed_clause_does_not_prevent_a_later_clause_from_parsing() {
        let (stmt, errors) = Parser::parse("MATCH (a WHERE a.x = 1 RETURN a");
        assert!(!errors.is_empty());
        // Recovery resynchronizes at WHERE/RETURN, so both still show up.
        assert!(stmt.r#where.is_some());
        assert!(stmt.r#return.is_some());
    }

    #[test]
    fn duplicate_match_clause_is_recorded_as_an_error() {
        let (_, errors) = Parser::parse("MATCH (a) MATCH (b) RETURN a");
        assert!(errors.iter().any(|e| e.contains("duplicate MATCH")));
    }

    #[test]
    fn keywords_are_usable_as_property_keys_and_variable_names() {
        let (stmt, errors) = Parser::parse("MATCH (match) RETURN match");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(stmt.r#match.unwrap().patterns[0].start.variable, Some("match".to_string()));
    }
}
