use std::ops::Range;
use std::rc::Rc;

use crate::error::{LoxideError, SyntaxError};
use crate::expr::{BinaryOp, Expr, ExprNode, LogicalOp, NameNode, UnaryOp};
use crate::node::{ExprIdGen, Node};
use crate::stmt::{ClassDeclaration, FunctionDeclaration, Stmt, StmtNode};
use crate::token::{Span, Token, TokenType};
use TokenType::*;

const MAX_ARGS: usize = 255;

type ParseResult<T> = Result<T, LoxideError>;

/// Recursive descent with one token of lookahead.
///
/// program     → declaration* EOF
/// declaration → classDecl | funDecl | varDecl | statement
/// classDecl   → "class" IDENT ( "<" IDENT )? "{" function* "}"
/// funDecl     → "fun" function
/// function    → IDENT "(" parameters? ")" block
/// varDecl     → "var" IDENT ( "=" expression )? ";"
/// statement   → exprStmt | forStmt | ifStmt | printStmt
///             | returnStmt | whileStmt | block
/// expression  → assignment
/// assignment  → ( call "." )? IDENT "=" assignment | logic_or
/// logic_or    → logic_and ( "or" logic_and )*
/// logic_and   → equality ( "and" equality )*
/// equality    → comparison ( ("!=" | "==") comparison )*
/// comparison  → term ( (">" | ">=" | "<" | "<=") term )*
/// term        → factor ( ("-" | "+") factor )*
/// factor      → unary ( ("/" | "*") unary )*
/// unary       → ( "!" | "-" ) unary | call
/// call        → primary ( "(" arguments? ")" | "." IDENT )*
/// primary     → "true" | "false" | "nil" | NUMBER | STRING
///             | "(" expression ")" | IDENT | "this" | "super" "." IDENT
pub struct Parser<'a, 'i> {
    source: &'a str,
    tokens: Vec<Token>,
    current: usize,
    ids: &'i mut ExprIdGen,
    errors: Vec<LoxideError>,
}

impl<'a, 'i> Parser<'a, 'i> {
    pub fn new(source: &'a str, tokens: Vec<Token>, ids: &'i mut ExprIdGen) -> Self {
        Self {
            source,
            tokens,
            current: 0,
            ids,
            errors: Vec::new(),
        }
    }

    /// Parses every declaration, recovering at declaration boundaries so a
    /// single run can report more than one syntax error.
    pub fn parse_all(mut self) -> (Vec<StmtNode>, Vec<LoxideError>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        (statements, self.errors)
    }
}

impl Parser<'_, '_> {
    fn declaration(&mut self) -> Option<StmtNode> {
        let result = if self.matches([Class]) {
            self.class_declaration()
        } else if self.matches([Fun]) {
            self.fun_declaration()
        } else if self.matches([Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(statement) => Some(statement),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        let name = self.identifier("Expect class name.")?;

        let superclass = if self.matches([Less]) {
            let superclass = self.identifier("Expect superclass name.")?;
            let span = superclass.span;
            Some(Expr::variable(superclass.item).at(span, self.ids.next_id()))
        } else {
            None
        };

        self.consume(LeftBrace, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }
        self.consume(RightBrace, "Expect '}' after class body.")?;

        let span = start.union(self.previous().span);
        Ok(Stmt::Class(ClassDeclaration {
            name,
            superclass,
            methods,
        })
        .at(span))
    }

    fn fun_declaration(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        let declaration = self.function("function")?;
        let span = start.union(self.previous().span);
        Ok(Stmt::Function(declaration).at(span))
    }

    fn function(&mut self, kind: &str) -> ParseResult<FunctionDeclaration> {
        let name = self.identifier(&format!("Expect {kind} name."))?;
        self.consume(LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = Vec::new();
        if !self.check(RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.errors
                        .push(SyntaxError::too_many_parameters(self.peek().span));
                }
                params.push(self.identifier("Expect parameter name.")?);
                if !self.matches([Comma]) {
                    break;
                }
            }
        }
        self.consume(RightParen, "Expect ')' after parameters.")?;

        self.consume(LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block_statements()?;

        Ok(FunctionDeclaration {
            name,
            params: params.into(),
            body: body.into(),
        })
    }

    fn var_declaration(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        let name = self.identifier("Expect variable name.")?;
        let initializer = if self.matches([Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(Semicolon, "Expect ';' after variable declaration.")?;

        let span = start.union(self.previous().span);
        Ok(Stmt::var(name, initializer).at(span))
    }

    fn statement(&mut self) -> ParseResult<StmtNode> {
        if self.matches([For]) {
            self.for_statement()
        } else if self.matches([If]) {
            self.if_statement()
        } else if self.matches([Print]) {
            self.print_statement()
        } else if self.matches([Return]) {
            self.return_statement()
        } else if self.matches([While]) {
            self.while_statement()
        } else if self.matches([LeftBrace]) {
            let start = self.previous().span;
            let statements = self.block_statements()?;
            let span = start.union(self.previous().span);
            Ok(Stmt::block(statements).at(span))
        } else {
            self.expression_statement()
        }
    }

    fn block_statements(&mut self) -> ParseResult<Vec<StmtNode>> {
        let mut statements = Vec::new();
        while !self.check(RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }
        self.consume(RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    // `for` desugars into a while loop wrapped in blocks:
    // { init; while (cond) { body; incr; } }
    fn for_statement(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        self.consume(LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches([Semicolon]) {
            None
        } else if self.matches([Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;
        let span = start.union(self.previous().span);

        if let Some(increment) = increment {
            let increment_span = increment.span;
            body = Stmt::block(vec![body, Stmt::expression(increment).at(increment_span)]).at(span);
        }
        let condition = match condition {
            Some(condition) => condition,
            None => Expr::tru().at(span, self.ids.next_id()),
        };
        body = Stmt::while_(condition, body).at(span);
        if let Some(initializer) = initializer {
            body = Stmt::block(vec![initializer, body]).at(span);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        self.consume(LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(RightParen, "Expect ')' after condition.")?;

        let then_branch = self.statement()?;
        let else_branch = if self.matches([Else]) {
            Some(self.statement()?)
        } else {
            None
        };

        let span = start.union(self.previous().span);
        Ok(Stmt::if_(condition, then_branch, else_branch).at(span))
    }

    fn print_statement(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        let expr = self.expression()?;
        self.consume(Semicolon, "Expect ';' after value.")?;
        let span = start.union(self.previous().span);
        Ok(Stmt::print(expr).at(span))
    }

    fn return_statement(&mut self) -> ParseResult<StmtNode> {
        let keyword = self.previous().span;
        let value = if self.check(Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(Semicolon, "Expect ';' after return value.")?;
        let span = keyword.union(self.previous().span);
        Ok(Stmt::return_(keyword, value).at(span))
    }

    fn while_statement(&mut self) -> ParseResult<StmtNode> {
        let start = self.previous().span;
        self.consume(LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;

        let span = start.union(self.previous().span);
        Ok(Stmt::while_(condition, body).at(span))
    }

    fn expression_statement(&mut self) -> ParseResult<StmtNode> {
        let expr = self.expression()?;
        self.consume(Semicolon, "Expect ';' after expression.")?;
        let span = expr.span.union(self.previous().span);
        Ok(Stmt::expression(expr).at(span))
    }

    fn expression(&mut self) -> ParseResult<ExprNode> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<ExprNode> {
        let target = self.logic_or()?;

        if self.matches([Equal]) {
            let equals = self.previous();
            let value = self.assignment()?;

            let ExprNode { item, span, id } = target;
            let union = span.union(value.span);
            return Ok(match *item {
                Expr::Variable { name } => {
                    let name = Node::new(name, span);
                    self.expr(Expr::assign(name, value), union)
                }
                Expr::Get { object, name } => self.expr(Expr::set(object, name, value), union),
                item => {
                    // reported without synchronizing; parsing carries on
                    // with the left-hand side
                    self.errors
                        .push(SyntaxError::invalid_assignment_target(equals.span));
                    ExprNode::new(item, span, id)
                }
            });
        }

        Ok(target)
    }

    fn logic_or(&mut self) -> ParseResult<ExprNode> {
        let mut lhs = self.logic_and()?;

        while self.matches([Or]) {
            let rhs = self.logic_and()?;
            let span = lhs.span.union(rhs.span);
            lhs = self.expr(Expr::logical(lhs, LogicalOp::Or, rhs), span);
        }

        Ok(lhs)
    }

    fn logic_and(&mut self) -> ParseResult<ExprNode> {
        let mut lhs = self.equality()?;

        while self.matches([And]) {
            let rhs = self.equality()?;
            let span = lhs.span.union(rhs.span);
            lhs = self.expr(Expr::logical(lhs, LogicalOp::And, rhs), span);
        }

        Ok(lhs)
    }

    fn equality(&mut self) -> ParseResult<ExprNode> {
        let mut lhs = self.comparison()?;

        while self.matches([BangEqual, EqualEqual]) {
            let op = match self.previous().tpe {
                BangEqual => BinaryOp::NotEquals,
                EqualEqual => BinaryOp::Equals,
                _ => unreachable!(),
            };
            let rhs = self.comparison()?;
            let span = lhs.span.union(rhs.span);
            lhs = self.expr(Expr::binary(lhs, op, rhs), span);
        }

        Ok(lhs)
    }

    fn comparison(&mut self) -> ParseResult<ExprNode> {
        let mut lhs = self.term()?;

        while self.matches([Greater, GreaterEqual, Less, LessEqual]) {
            let op = match self.previous().tpe {
                Greater => BinaryOp::GreaterThan,
                GreaterEqual => BinaryOp::GreaterThanOrEqual,
                Less => BinaryOp::LessThan,
                LessEqual => BinaryOp::LessThanOrEqual,
                _ => unreachable!(),
            };
            let rhs = self.term()?;
            let span = lhs.span.union(rhs.span);
            lhs = self.expr(Expr::binary(lhs, op, rhs), span);
        }

        Ok(lhs)
    }

    fn term(&mut self) -> ParseResult<ExprNode> {
        let mut lhs = self.factor()?;

        while self.matches([Minus, Plus]) {
            let op = match self.previous().tpe {
                Minus => BinaryOp::Sub,
                Plus => BinaryOp::Add,
                _ => unreachable!(),
            };
            let rhs = self.factor()?;
            let span = lhs.span.union(rhs.span);
            lhs = self.expr(Expr::binary(lhs, op, rhs), span);
        }

        Ok(lhs)
    }

    fn factor(&mut self) -> ParseResult<ExprNode> {
        let mut lhs = self.unary()?;

        while self.matches([Slash, Star]) {
            let op = match self.previous().tpe {
                Slash => BinaryOp::Div,
                Star => BinaryOp::Mul,
                _ => unreachable!(),
            };
            let rhs = self.unary()?;
            let span = lhs.span.union(rhs.span);
            lhs = self.expr(Expr::binary(lhs, op, rhs), span);
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> ParseResult<ExprNode> {
        if self.matches([Bang, Minus]) {
            let op_token = self.previous();
            let op = match op_token.tpe {
                Bang => UnaryOp::Not,
                Minus => UnaryOp::Neg,
                _ => unreachable!(),
            };
            let rhs = self.unary()?;
            let span = op_token.span.union(rhs.span);
            Ok(self.expr(Expr::unary(op, rhs), span))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> ParseResult<ExprNode> {
        let mut expr = self.primary()?;

        loop {
            if self.matches([LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches([Dot]) {
                let name = self.identifier("Expect property name after '.'.")?;
                let span = expr.span.union(name.span);
                expr = self.expr(Expr::get(expr, name), span);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: ExprNode) -> ParseResult<ExprNode> {
        let mut args = Vec::new();
        if !self.check(RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    self.errors
                        .push(SyntaxError::too_many_arguments(self.peek().span));
                }
                args.push(self.expression()?);
                if !self.matches([Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(RightParen, "Expect ')' after arguments.")?;

        let span = callee.span.union(paren.span);
        Ok(self.expr(Expr::call(callee, args), span))
    }

    fn primary(&mut self) -> ParseResult<ExprNode> {
        if self.matches([False]) {
            let span = self.previous().span;
            return Ok(self.expr(Expr::fals(), span));
        }
        if self.matches([True]) {
            let span = self.previous().span;
            return Ok(self.expr(Expr::tru(), span));
        }
        if self.matches([Nil]) {
            let span = self.previous().span;
            return Ok(self.expr(Expr::nil(), span));
        }

        if self.matches([Number]) {
            let token = self.previous();
            // the scanner has already validated the digits
            let value = self.lexeme(token.span).parse::<f64>().unwrap();
            return Ok(self.expr(Expr::number(value), token.span));
        }

        if self.matches([String]) {
            let token = self.previous();
            let Span { offset, len } = token.span;
            let value: Rc<str> = Rc::from(&self.source[offset + 1..offset + len - 1]);
            return Ok(self.expr(Expr::string(value), token.span));
        }

        if self.matches([LeftParen]) {
            let start = self.previous().span;
            let inner = self.expression()?;
            let end = self.consume(RightParen, "Expect ')' after expression.")?.span;
            return Ok(self.expr(Expr::group(inner), start.union(end)));
        }

        if self.matches([This]) {
            let span = self.previous().span;
            return Ok(self.expr(Expr::this(), span));
        }

        if self.matches([Super]) {
            let keyword = self.previous().span;
            self.consume(Dot, "Expect '.' after 'super'.")?;
            let method = self.identifier("Expect superclass method name.")?;
            // the node spans only the keyword so diagnostics point at `super`
            return Ok(self.expr(Expr::super_(method), keyword));
        }

        if self.matches([Identifier]) {
            let token = self.previous();
            let name: Rc<str> = Rc::from(self.lexeme(token.span));
            return Ok(self.expr(Expr::variable(name), token.span));
        }

        Err(SyntaxError::expected_expression(self.peek().span))
    }
}

impl Parser<'_, '_> {
    fn expr(&mut self, item: Expr, span: impl Into<Span>) -> ExprNode {
        ExprNode::new(item, span, self.ids.next_id())
    }

    fn identifier(&mut self, msg: &str) -> ParseResult<NameNode> {
        let token = self.consume(Identifier, msg)?;
        Ok(Node::new(Rc::from(self.lexeme(token.span)), token.span))
    }

    fn lexeme(&self, span: Span) -> &str {
        &self.source[Range::<usize>::from(span)]
    }

    fn matches(&mut self, token_types: impl IntoIterator<Item = TokenType>) -> bool {
        for token_type in token_types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&mut self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().tpe == token_type
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().tpe == TokenType::Eof
    }

    fn peek(&self) -> Token {
        self.tokens[self.current]
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1]
    }

    fn consume(&mut self, token_type: TokenType, msg: &str) -> ParseResult<Token> {
        if self.check(token_type) {
            return Ok(self.advance());
        }
        Err(SyntaxError::expected(msg, self.peek().span))
    }

    /// Discards tokens until just past a `;` or right before a token that
    /// can begin a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().tpe == Semicolon {
                return;
            }

            match self.peek().tpe {
                Class | For | Fun | If | Print | Return | Var | While => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;
    use crate::scanner::Source;

    fn parse(source: &str) -> (Vec<StmtNode>, Vec<LoxideError>) {
        let (tokens, scan_errors) = Source::new(source).scan_all();
        assert!(scan_errors.is_empty(), "scan errors: {scan_errors:?}");
        let mut ids = ExprIdGen::default();
        Parser::new(source, tokens, &mut ids).parse_all()
    }

    fn parse_ok(source: &str) -> Vec<StmtNode> {
        let (statements, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        statements
    }

    #[test]
    fn test_binary_precedence() {
        let statements = parse_ok("1 + 2 * 3;");
        let Stmt::Expression(expr) = &*statements[0].item else {
            panic!("expected expression statement");
        };
        let Expr::Binary { lhs, op, rhs } = &*expr.item else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            &*lhs.item,
            Expr::Literal {
                lit: Literal::Number(n)
            } if *n == 1.0
        ));
        assert!(matches!(&*rhs.item, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_unique_expression_ids() {
        let statements = parse_ok("1 + 2 * 3;");
        let Stmt::Expression(add) = &*statements[0].item else {
            panic!("expected expression statement");
        };
        let Expr::Binary { lhs, rhs, .. } = &*add.item else {
            panic!("expected binary expression");
        };
        let Expr::Binary {
            lhs: mul_lhs,
            rhs: mul_rhs,
            ..
        } = &*rhs.item
        else {
            panic!("expected nested binary expression");
        };
        let mut ids = vec![add.id, lhs.id, rhs.id, mul_lhs.id, mul_rhs.id];
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_string_literal_trims_quotes() {
        let statements = parse_ok(r#"print "hi";"#);
        let Stmt::Print(expr) = &*statements[0].item else {
            panic!("expected print statement");
        };
        assert!(matches!(
            &*expr.item,
            Expr::Literal {
                lit: Literal::String(s)
            } if &**s == "hi"
        ));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let statements = parse_ok("a = b = 2;");
        let Stmt::Expression(expr) = &*statements[0].item else {
            panic!("expected expression statement");
        };
        let Expr::Assign { name, value } = &*expr.item else {
            panic!("expected assignment");
        };
        assert_eq!(&*name.item, "a");
        assert!(matches!(&*value.item, Expr::Assign { .. }));
    }

    #[test]
    fn test_assignment_to_property_becomes_set() {
        let statements = parse_ok("a.b = 2;");
        let Stmt::Expression(expr) = &*statements[0].item else {
            panic!("expected expression statement");
        };
        assert!(matches!(&*expr.item, Expr::Set { .. }));
    }

    #[test]
    fn test_invalid_assignment_target_does_not_synchronize() {
        let (statements, errors) = parse("1 = 2; print 3;");
        // both statements survive; one diagnostic
        assert_eq!(statements.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].render("1 = 2; print 3;"),
            "[line 1] Error at '=': Invalid assignment target."
        );
    }

    #[test]
    fn test_synchronize_reports_multiple_errors() {
        let source = "var ;\nvar x = 1;\nfun ;\nprint x;";
        let (statements, errors) = parse(source);
        assert_eq!(errors.len(), 2);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            errors[0].render(source),
            "[line 1] Error at ';': Expect variable name."
        );
        assert_eq!(
            errors[1].render(source),
            "[line 3] Error at ';': Expect function name."
        );
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        let source = "print 1";
        let (_, errors) = parse(source);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].render(source),
            "[line 1] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn test_for_desugars_to_while() {
        let statements = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        let Stmt::Block(outer) = &*statements[0].item else {
            panic!("expected desugared block");
        };
        assert!(matches!(&*outer[0].item, Stmt::Var(..)));
        let Stmt::While(_, body) = &*outer[1].item else {
            panic!("expected while loop");
        };
        let Stmt::Block(inner) = &*body.item else {
            panic!("expected body block with increment");
        };
        assert!(matches!(&*inner[1].item, Stmt::Expression(_)));
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let statements = parse_ok("for (;;) print 1;");
        let Stmt::While(condition, _) = &*statements[0].item else {
            panic!("expected bare while loop");
        };
        assert!(matches!(
            &*condition.item,
            Expr::Literal { lit: Literal::True }
        ));
    }

    #[test]
    fn test_parameter_cap() {
        let at_cap = (0..255).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
        let (_, errors) = parse(&format!("fun f({at_cap}) {{}}"));
        assert!(errors.is_empty());

        let over_cap = (0..256).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
        let (_, errors) = parse(&format!("fun f({over_cap}) {{}}"));
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            LoxideError::SyntaxError(SyntaxError::TooManyParameters { .. })
        ));
    }

    #[test]
    fn test_class_with_superclass_and_methods() {
        let statements = parse_ok("class B < A { init(n) {} greet() {} }");
        let Stmt::Class(class) = &*statements[0].item else {
            panic!("expected class declaration");
        };
        assert_eq!(&*class.name.item, "B");
        let superclass = class.superclass.as_ref().expect("superclass");
        assert!(matches!(&*superclass.item, Expr::Variable { .. }));
        assert_eq!(class.methods.len(), 2);
    }

    #[test]
    fn test_super_and_this_parse() {
        let statements = parse_ok("class B < A { m() { super.m(); return this; } }");
        assert_eq!(statements.len(), 1);
    }
}
