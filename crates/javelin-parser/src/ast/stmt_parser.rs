//! Statement parsing.
//!
//! Local variable declarations are told apart from expression statements
//! with [`Parser::scan_type`]: a type followed by an identifier starts a
//! declaration.

use bumpalo::collections::Vec as BVec;
use javelin_core::{ParseErrorKind, Span};

use super::expr::Expr;
use super::parser::{ParseResult, Parser};
use super::stmt::*;
use crate::lexer::TokenKind;

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a `{ ... }` block.
    pub fn parse_block(&mut self) -> ParseResult<&'ast Block<'ast>> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut stmts = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            stmts.push(self.parse_block_statement()?);
        }
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(self.alloc(Block {
            stmts: stmts.into_bump_slice(),
            span: open.span.merge(close.span),
        }))
    }

    /// A statement or a local variable declaration.
    pub fn parse_block_statement(&mut self) -> ParseResult<Stmt<'ast>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum | TokenKind::Abstract => {
                Err(self.unsupported(token.span, "local classes"))
            }
            TokenKind::Final => {
                if matches!(self.peek_nth_kind(1), TokenKind::Class) {
                    return Err(self.unsupported(token.span, "local classes"));
                }
                self.advance();
                let decl = self.parse_local_var_decl(true, token.span)?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::LocalVar(self.with_end(decl)))
            }
            _ if self.is_local_var_decl() => {
                let decl = self.parse_local_var_decl(false, token.span)?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::LocalVar(self.with_end(decl)))
            }
            _ => self.parse_statement(),
        }
    }

    /// Whether the upcoming tokens are `Type name`.
    fn is_local_var_decl(&mut self) -> bool {
        match self.scan_type(0) {
            Some(end) => self.peek_nth_kind(end) == TokenKind::Identifier,
            None => false,
        }
    }

    /// Stretch a declaration's span over its terminating `;`.
    fn with_end(&self, decl: &'ast LocalVarDecl<'ast>) -> &'ast LocalVarDecl<'ast> {
        self.alloc(LocalVarDecl {
            span: decl.span.merge(self.previous_span()),
            ..*decl
        })
    }

    /// `Type a = 1, b[] = {}` without the terminating `;`.
    fn parse_local_var_decl(
        &mut self,
        is_final: bool,
        start: Span,
    ) -> ParseResult<&'ast LocalVarDecl<'ast>> {
        let ty = self.parse_type()?;
        let declarators = self.parse_declarators(None)?;
        Ok(self.alloc(LocalVarDecl {
            is_final,
            ty,
            declarators,
            span: start.merge(self.previous_span()),
        }))
    }

    /// One or more comma-separated declarators. `first` is a name the
    /// caller has already consumed.
    pub(super) fn parse_declarators(
        &mut self,
        first: Option<super::Ident<'ast>>,
    ) -> ParseResult<&'ast [VarDeclarator<'ast>]> {
        let mut declarators = BVec::new_in(self.arena);
        let mut pending = first;
        loop {
            let name = match pending.take() {
                Some(name) => name,
                None => self.expect_ident()?,
            };
            let extra_dims = self.parse_dims();
            let init = if self.eat(TokenKind::Equal).is_some() {
                Some(self.parse_var_init()?)
            } else {
                None
            };
            let id = self.fresh_id();
            declarators.push(VarDeclarator {
                id,
                name,
                extra_dims,
                init,
                span: name.span.merge(self.previous_span()),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(declarators.into_bump_slice())
    }

    /// Parse a statement that is not a local variable declaration.
    pub fn parse_statement(&mut self) -> ParseResult<Stmt<'ast>> {
        self.nested(Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> ParseResult<Stmt<'ast>> {
        let token = self.peek();

        match token.kind {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(token.span))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Synchronized => Err(self.unsupported(token.span, "synchronized statements")),
            TokenKind::Assert => Err(self.unsupported(token.span, "assert statements")),
            TokenKind::Identifier if self.peek_nth_kind(1) == TokenKind::Colon => {
                self.parse_labeled()
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt<'ast>> {
        let expr = self.parse_statement_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Expr(self.alloc(ExprStmt {
            expr,
            span: expr.span().merge(self.previous_span()),
        })))
    }

    /// An expression that is allowed to stand alone as a statement.
    fn parse_statement_expression(&mut self) -> ParseResult<Expr<'ast>> {
        let token = self.peek();
        let expr = self.parse_expression()?;
        if !expr.is_statement_expression() {
            return Err(self.error_at(token, ParseErrorKind::NotAStatement, "Not a statement"));
        }
        Ok(expr)
    }

    fn parse_condition(&mut self) -> ParseResult<Expr<'ast>> {
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_condition()?;
        let then_stmt = self.parse_statement()?;
        let else_stmt = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Stmt::If(self.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: start.merge(self.previous_span()),
        })))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::While)?.span;
        let condition = self.parse_condition()?;
        let body = self.parse_statement()?;
        Ok(Stmt::While(self.alloc(WhileStmt {
            condition,
            body,
            span: start.merge(self.previous_span()),
        })))
    }

    fn parse_do_while(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::Do)?.span;
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::DoWhile(self.alloc(DoWhileStmt {
            body,
            condition,
            span: start.merge(self.previous_span()),
        })))
    }

    /// Basic `for` and enhanced `for`.
    fn parse_for(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::For)?.span;
        self.expect(TokenKind::LeftParen)?;

        let mut init = BVec::new_in(self.arena);
        let header = self.peek();
        let is_final = self.eat(TokenKind::Final).is_some();
        if is_final || self.is_local_var_decl() {
            let decl = self.parse_local_var_decl(is_final, header.span)?;
            if self.check(TokenKind::Colon) {
                return self.parse_for_each(start, decl);
            }
            init.push(Stmt::LocalVar(decl));
        } else if !self.check(TokenKind::Semicolon) {
            loop {
                let expr = self.parse_statement_expression()?;
                init.push(Stmt::Expr(self.alloc(ExprStmt {
                    expr,
                    span: expr.span(),
                })));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::Semicolon)?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let mut update = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                update.push(self.parse_statement_expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_statement()?;
        Ok(Stmt::For(self.alloc(ForStmt {
            init: init.into_bump_slice(),
            condition,
            update: update.into_bump_slice(),
            body,
            span: start.merge(self.previous_span()),
        })))
    }

    /// The rest of `for (T x : iterable) body` after the variable.
    fn parse_for_each(
        &mut self,
        start: Span,
        decl: &'ast LocalVarDecl<'ast>,
    ) -> ParseResult<Stmt<'ast>> {
        let colon = self.peek();
        let var = match decl.declarators {
            [var] if var.init.is_none() => *var,
            _ => return Err(self.expected(colon, "\";\"")),
        };
        self.expect(TokenKind::Colon)?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_statement()?;
        Ok(Stmt::ForEach(self.alloc(ForEachStmt {
            is_final: decl.is_final,
            ty: decl.ty,
            var,
            iterable,
            body,
            span: start.merge(self.previous_span()),
        })))
    }

    fn parse_switch(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::Switch)?.span;
        let selector = self.parse_condition()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut groups = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            groups.push(self.parse_switch_group()?);
        }
        self.expect(TokenKind::RightBrace)?;

        Ok(Stmt::Switch(self.alloc(SwitchStmt {
            selector,
            groups: groups.into_bump_slice(),
            span: start.merge(self.previous_span()),
        })))
    }

    fn parse_switch_group(&mut self) -> ParseResult<SwitchGroup<'ast>> {
        let start = self.peek().span;
        let mut labels = BVec::new_in(self.arena);
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Case => {
                    self.advance();
                    let value = self.parse_expression()?;
                    self.expect(TokenKind::Colon)?;
                    labels.push(CaseLabel::Case(value));
                }
                TokenKind::Default => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    labels.push(CaseLabel::Default(token.span));
                }
                _ if labels.is_empty() => {
                    return Err(self.expected(token, "\"case\" or \"default\""));
                }
                _ => break,
            }
        }

        let mut stmts = BVec::new_in(self.arena);
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RightBrace
        ) {
            stmts.push(self.parse_block_statement()?);
        }

        Ok(SwitchGroup {
            labels: labels.into_bump_slice(),
            stmts: stmts.into_bump_slice(),
            span: start.merge(self.previous_span()),
        })
    }

    /// `break [label];` and `continue [label];`
    fn parse_jump(&mut self) -> ParseResult<Stmt<'ast>> {
        let keyword = self.advance();
        let label = if self.check(TokenKind::Identifier) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        let jump = self.alloc(JumpStmt {
            label,
            span: keyword.span.merge(self.previous_span()),
        });
        Ok(match keyword.kind {
            TokenKind::Break => Stmt::Break(jump),
            _ => Stmt::Continue(jump),
        })
    }

    fn parse_labeled(&mut self) -> ParseResult<Stmt<'ast>> {
        let label = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_statement()?;
        Ok(Stmt::Labeled(self.alloc(LabeledStmt {
            label,
            body,
            span: label.span.merge(self.previous_span()),
        })))
    }

    fn parse_return(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return(self.alloc(ReturnStmt {
            value,
            span: start.merge(self.previous_span()),
        })))
    }

    fn parse_throw(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::Throw)?.span;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Throw(self.alloc(ThrowStmt {
            expr,
            span: start.merge(self.previous_span()),
        })))
    }

    /// `try { } catch (A | B e) { } finally { }`
    fn parse_try(&mut self) -> ParseResult<Stmt<'ast>> {
        let start = self.expect(TokenKind::Try)?.span;
        if self.check(TokenKind::LeftParen) {
            let span = self.peek().span;
            return Err(self.unsupported(span, "try-with-resources statements"));
        }
        let body = self.parse_block()?;

        let mut catches = BVec::new_in(self.arena);
        while let Some(catch) = self.eat(TokenKind::Catch) {
            self.expect(TokenKind::LeftParen)?;
            self.eat(TokenKind::Final);
            let mut types = BVec::new_in(self.arena);
            types.push(self.parse_type()?);
            while self.eat(TokenKind::Pipe).is_some() {
                types.push(self.parse_type()?);
            }
            let name = self.expect_ident()?;
            self.expect(TokenKind::RightParen)?;
            let block = self.parse_block()?;
            let id = self.fresh_id();
            catches.push(CatchClause {
                id,
                types: types.into_bump_slice(),
                name,
                body: block,
                span: catch.span.merge(block.span),
            });
        }

        let finally = if self.eat(TokenKind::Finally).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };

        if catches.is_empty() && finally.is_none() {
            let token = self.peek();
            return Err(self.expected(token, "\"catch\" or \"finally\""));
        }

        Ok(Stmt::Try(self.alloc(TryStmt {
            body,
            catches: catches.into_bump_slice(),
            finally,
            span: start.merge(self.previous_span()),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Expr, TypeBase};
    use bumpalo::Bump;
    use javelin_core::JavelinError;

    fn statement<'ast>(source: &str, arena: &'ast Bump) -> Stmt<'ast> {
        let stmts = Parser::new(source, arena).block_statements().unwrap();
        assert_eq!(stmts.len(), 1, "expected one statement in {source}");
        stmts[0]
    }

    #[test]
    fn local_variable_with_several_declarators() {
        let arena = Bump::new();
        match statement("final int a = 1, b[] = {2}, c;", &arena) {
            Stmt::LocalVar(decl) => {
                assert!(decl.is_final);
                assert_eq!(decl.declarators.len(), 3);
                assert_eq!(decl.declarators[1].extra_dims, 1);
                assert!(decl.declarators[2].init.is_none());
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn generic_local_is_a_declaration() {
        let arena = Bump::new();
        match statement("java.util.List<String> names = null;", &arena) {
            Stmt::LocalVar(decl) => {
                assert!(matches!(decl.ty.base, TypeBase::Named(parts) if parts.len() == 3));
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn comparison_is_not_a_declaration() {
        let arena = Bump::new();
        let err = Parser::new("a < b;", &arena).block_statements().unwrap_err();
        match err {
            JavelinError::Parse(e) => assert_eq!(e.kind, ParseErrorKind::NotAStatement),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn basic_for_loop() {
        let arena = Bump::new();
        match statement("for (int i = 0, j = 10; i < j; i++, j--) sum += i;", &arena) {
            Stmt::For(f) => {
                assert_eq!(f.init.len(), 1);
                assert!(matches!(f.condition, Some(Expr::Binary(b)) if b.op == BinaryOp::Less));
                assert_eq!(f.update.len(), 2);
                assert!(matches!(f.body, Stmt::Expr(_)));
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn empty_for_header() {
        let arena = Bump::new();
        match statement("for (;;) break;", &arena) {
            Stmt::For(f) => {
                assert!(f.init.is_empty() && f.condition.is_none() && f.update.is_empty());
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn enhanced_for_loop() {
        let arena = Bump::new();
        match statement("for (final String s : args) total += s.length();", &arena) {
            Stmt::ForEach(f) => {
                assert!(f.is_final);
                assert_eq!(f.var.name.name, "s");
            }
            other => panic!("expected for-each, got {other:?}"),
        }
    }

    #[test]
    fn switch_groups_share_labels() {
        let arena = Bump::new();
        let source = "switch (x) { case 1: case 2: y = 1; break; default: y = 0; }";
        match statement(source, &arena) {
            Stmt::Switch(s) => {
                assert_eq!(s.groups.len(), 2);
                assert_eq!(s.groups[0].labels.len(), 2);
                assert_eq!(s.groups[0].stmts.len(), 2);
                assert!(matches!(s.groups[1].labels[0], CaseLabel::Default(_)));
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn try_with_multi_catch_and_finally() {
        let arena = Bump::new();
        let source = "try { f(); } catch (IllegalStateException | IllegalArgumentException e) { } finally { g(); }";
        match statement(source, &arena) {
            Stmt::Try(t) => {
                assert_eq!(t.catches.len(), 1);
                assert_eq!(t.catches[0].types.len(), 2);
                assert!(t.finally.is_some());
            }
            other => panic!("expected try, got {other:?}"),
        }
    }

    #[test]
    fn try_requires_catch_or_finally() {
        let arena = Bump::new();
        assert!(Parser::new("try { }", &arena).block_statements().is_err());
    }

    #[test]
    fn labeled_break() {
        let arena = Bump::new();
        match statement("outer: while (true) { break outer; }", &arena) {
            Stmt::Labeled(l) => {
                assert_eq!(l.label.name, "outer");
                assert!(matches!(l.body, Stmt::While(_)));
            }
            other => panic!("expected labeled statement, got {other:?}"),
        }
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let arena = Bump::new();
        match statement("if (a) if (b) x(); else y();", &arena) {
            Stmt::If(outer) => {
                assert!(outer.else_stmt.is_none());
                assert!(matches!(outer.then_stmt, Stmt::If(inner) if inner.else_stmt.is_some()));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_statements() {
        let arena = Bump::new();
        for source in ["assert x;", "synchronized (this) { }", "class Local { }"] {
            match Parser::new(source, &arena).block_statements().unwrap_err() {
                JavelinError::Parse(e) => assert_eq!(e.kind, ParseErrorKind::Unsupported, "{source}"),
                other => panic!("expected parse error, got {other:?}"),
            }
        }
    }
}
