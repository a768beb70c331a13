//! Declaration parsing: compilation units, imports, types and members.

use bumpalo::collections::Vec as BVec;
use javelin_core::{ParseError, ParseErrorKind, Span};

use super::decl::*;
use super::parser::{ParseResult, Parser};
use super::stmt::Block;
use super::types::TypeExpr;
use crate::lexer::TokenKind;

fn modifier_of(kind: TokenKind) -> Option<Modifiers> {
    Some(match kind {
        TokenKind::Public => Modifiers::PUBLIC,
        TokenKind::Protected => Modifiers::PROTECTED,
        TokenKind::Private => Modifiers::PRIVATE,
        TokenKind::Static => Modifiers::STATIC,
        TokenKind::Final => Modifiers::FINAL,
        TokenKind::Abstract => Modifiers::ABSTRACT,
        TokenKind::Native => Modifiers::NATIVE,
        TokenKind::Synchronized => Modifiers::SYNCHRONIZED,
        TokenKind::Transient => Modifiers::TRANSIENT,
        TokenKind::Volatile => Modifiers::VOLATILE,
        TokenKind::Strictfp => Modifiers::STRICTFP,
        _ => return None,
    })
}

impl<'src, 'ast> Parser<'src, 'ast> {
    pub(super) fn parse_compilation_unit(&mut self) -> ParseResult<CompilationUnit<'ast>> {
        let start = self.peek().span;

        let package = if self.eat(TokenKind::Package).is_some() {
            let name = self.parse_qualified_name()?;
            self.expect(TokenKind::Semicolon)?;
            Some(name)
        } else {
            None
        };

        let imports = self.imports()?;

        let mut types = BVec::new_in(self.arena);
        while !self.check(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon).is_some() {
                continue;
            }
            types.push(self.parse_type_decl()?);
        }

        Ok(CompilationUnit {
            package,
            imports,
            types: types.into_bump_slice(),
            span: start.merge(self.previous_span()),
        })
    }

    /// `import [static] a.b.C;` or `import [static] a.b.*;`
    pub(super) fn parse_import(&mut self) -> ParseResult<ImportDecl<'ast>> {
        let start = self.expect(TokenKind::Import)?.span;
        let is_static = self.eat(TokenKind::Static).is_some();

        let mut path = BVec::new_in(self.arena);
        path.push(self.expect_ident()?);
        let mut on_demand = false;
        while self.eat(TokenKind::Dot).is_some() {
            if self.eat(TokenKind::Star).is_some() {
                on_demand = true;
                break;
            }
            path.push(self.expect_ident()?);
        }
        self.expect(TokenKind::Semicolon)?;

        Ok(ImportDecl {
            path: path.into_bump_slice(),
            is_static,
            on_demand,
            span: start.merge(self.previous_span()),
        })
    }

    /// Zero or more modifiers; repeating one is an error.
    fn parse_modifiers(&mut self) -> ParseResult<Modifiers> {
        let mut modifiers = Modifiers::empty();
        loop {
            let token = self.peek();
            if token.kind == TokenKind::At {
                return Err(self.unsupported(token.span, "annotations"));
            }
            let Some(modifier) = modifier_of(token.kind) else {
                return Ok(modifiers);
            };
            if modifiers.contains(modifier) {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidModifier,
                    token.span,
                    format!("Duplicate modifier \"{}\"", token.lexeme),
                )
                .into());
            }
            self.advance();
            modifiers |= modifier;
        }
    }

    fn parse_type_decl(&mut self) -> ParseResult<TypeDecl<'ast>> {
        let start = self.peek().span;
        let modifiers = self.parse_modifiers()?;

        let token = self.peek();
        let kind = match token.kind {
            TokenKind::Class => TypeKind::Class,
            TokenKind::Interface => TypeKind::Interface,
            TokenKind::Enum => return Err(self.unsupported(token.span, "enum declarations")),
            _ => return Err(self.expected(token, "\"class\" or \"interface\"")),
        };
        self.advance();

        let name = self.expect_ident()?;
        if self.check(TokenKind::Less) {
            let span = self.peek().span;
            return Err(self.unsupported(span, "generic type declarations"));
        }

        let mut extends = None;
        let mut interfaces = BVec::new_in(self.arena);
        match kind {
            TypeKind::Class => {
                if self.eat(TokenKind::Extends).is_some() {
                    extends = Some(self.parse_type()?);
                }
                if self.eat(TokenKind::Implements).is_some() {
                    self.parse_type_list(&mut interfaces)?;
                }
            }
            TypeKind::Interface => {
                if self.eat(TokenKind::Extends).is_some() {
                    self.parse_type_list(&mut interfaces)?;
                }
            }
        }

        self.expect(TokenKind::LeftBrace)?;
        let mut members = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            if let Some(member) = self.parse_member(name.name)? {
                members.push(member);
            }
        }
        self.expect(TokenKind::RightBrace)?;

        Ok(TypeDecl {
            modifiers,
            kind,
            name,
            extends,
            interfaces: interfaces.into_bump_slice(),
            members: members.into_bump_slice(),
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_type_list(
        &mut self,
        out: &mut BVec<'ast, TypeExpr<'ast>>,
    ) -> ParseResult<()> {
        loop {
            out.push(self.parse_type()?);
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(());
            }
        }
    }

    /// One class body member. A stray `;` yields `None`.
    pub(super) fn parse_member(&mut self, class_name: &str) -> ParseResult<Option<Member<'ast>>> {
        let start = self.peek();

        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(None);
        }
        if start.kind == TokenKind::LeftBrace
            || (start.kind == TokenKind::Static && self.peek_nth_kind(1) == TokenKind::LeftBrace)
        {
            let is_static = self.eat(TokenKind::Static).is_some();
            let body = self.parse_block()?;
            return Ok(Some(Member::Initializer(self.alloc(InitializerDecl {
                is_static,
                body,
                span: start.span.merge(body.span),
            }))));
        }

        let modifiers = self.parse_modifiers()?;
        let token = self.peek();
        match token.kind {
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum => {
                return Err(self.unsupported(token.span, "nested types"));
            }
            TokenKind::Less => return Err(self.unsupported(token.span, "generic methods")),
            TokenKind::Identifier
                if token.lexeme == class_name && self.peek_nth_kind(1) == TokenKind::LeftParen =>
            {
                return self
                    .parse_constructor(modifiers, start.span)
                    .map(|c| Some(Member::Constructor(c)));
            }
            _ => {}
        }

        let ty = self.parse_return_type()?;
        let name = self.expect_ident()?;

        if self.check(TokenKind::LeftParen) {
            let params = self.parse_params()?;
            let return_ty = ty.with_extra_dims(self.parse_dims());
            let throws = self.parse_throws()?;
            let body = if self.eat(TokenKind::Semicolon).is_some() {
                None
            } else {
                Some(self.parse_block()?)
            };
            return Ok(Some(Member::Method(self.alloc(MethodDecl {
                modifiers,
                return_ty,
                name,
                params,
                throws,
                body,
                span: start.span.merge(self.previous_span()),
            }))));
        }

        if ty.is_void() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                ty.span,
                "Fields cannot have type \"void\"",
            )
            .into());
        }
        let declarators = self.parse_declarators(Some(name))?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Some(Member::Field(self.alloc(FieldDecl {
            modifiers,
            ty,
            declarators,
            span: start.span.merge(self.previous_span()),
        }))))
    }

    /// `(final int a, String[] b)`
    fn parse_params(&mut self) -> ParseResult<&'ast [Param<'ast>]> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                let start = self.peek().span;
                let is_final = self.eat(TokenKind::Final).is_some();
                let ty = self.parse_type()?;
                if self.check(TokenKind::Ellipsis) {
                    let span = self.peek().span;
                    return Err(self.unsupported(span, "variable arity parameters"));
                }
                let name = self.expect_ident()?;
                let ty = ty.with_extra_dims(self.parse_dims());
                let id = self.fresh_id();
                params.push(Param {
                    id,
                    is_final,
                    ty,
                    name,
                    span: start.merge(self.previous_span()),
                });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(params.into_bump_slice())
    }

    fn parse_throws(&mut self) -> ParseResult<&'ast [TypeExpr<'ast>]> {
        let mut throws = BVec::new_in(self.arena);
        if self.eat(TokenKind::Throws).is_some() {
            self.parse_type_list(&mut throws)?;
        }
        Ok(throws.into_bump_slice())
    }

    fn parse_constructor(
        &mut self,
        modifiers: Modifiers,
        start: Span,
    ) -> ParseResult<&'ast ConstructorDecl<'ast>> {
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let throws = self.parse_throws()?;

        let open = self.expect(TokenKind::LeftBrace)?;
        let explicit_call = self.parse_explicit_ctor_call()?;
        let mut stmts = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            stmts.push(self.parse_block_statement()?);
        }
        let close = self.expect(TokenKind::RightBrace)?;
        let body = self.alloc(Block {
            stmts: stmts.into_bump_slice(),
            span: open.span.merge(close.span),
        });

        Ok(self.alloc(ConstructorDecl {
            modifiers,
            name,
            params,
            throws,
            explicit_call,
            body,
            span: start.merge(close.span),
        }))
    }

    /// `this(...);` or `super(...);` as the first constructor statement.
    fn parse_explicit_ctor_call(&mut self) -> ParseResult<Option<&'ast ExplicitCtorCall<'ast>>> {
        let token = self.peek();
        let kind = match token.kind {
            TokenKind::This => CtorCallKind::This,
            TokenKind::Super => CtorCallKind::Super,
            _ => return Ok(None),
        };
        if self.peek_nth_kind(1) != TokenKind::LeftParen {
            return Ok(None);
        }
        self.advance();
        let args = self.parse_arguments()?;
        self.expect(TokenKind::Semicolon)?;
        let span = token.span.merge(self.previous_span());
        Ok(Some(self.node(|id| ExplicitCtorCall {
            id,
            kind,
            args,
            span,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Stmt, TypeBase};
    use bumpalo::Bump;
    use javelin_core::{JavelinError, PrimitiveType};

    #[test]
    fn package_and_imports() {
        let arena = Bump::new();
        let source = "package a.b; import java.util.*; import static java.lang.Math.max; class C {}";
        let unit = Parser::new(source, &arena).compilation_unit().unwrap();
        assert_eq!(unit.package.map(|p| p.len()), Some(2));
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[0].on_demand && !unit.imports[0].is_static);
        assert!(unit.imports[1].is_static && !unit.imports[1].on_demand);
        assert_eq!(unit.imports[1].path.len(), 4);
    }

    #[test]
    fn class_with_all_member_kinds() {
        let arena = Bump::new();
        let source = r#"
            public class Point extends Base implements Comparable, java.io.Serializable {
                private static final int ORIGIN = 0;
                int x, y;
                static { }
                { x = 1; }
                public Point(int x) throws Exception { this(x, 0); }
                Point(int x, int y) { super(); this.x = x; }
                abstract int size();
                int[] coords()[] { return null; }
            }
        "#;
        let unit = Parser::new(source, &arena).compilation_unit().unwrap();
        let class = &unit.types[0];
        assert_eq!(class.kind, TypeKind::Class);
        assert!(class.modifiers.contains(Modifiers::PUBLIC));
        assert_eq!(class.interfaces.len(), 2);
        assert_eq!(class.members.len(), 8);

        match class.members[4] {
            Member::Constructor(ctor) => {
                assert_eq!(ctor.throws.len(), 1);
                assert_eq!(ctor.explicit_call.map(|c| c.kind), Some(CtorCallKind::This));
                assert!(ctor.body.stmts.is_empty());
            }
            other => panic!("expected constructor, got {other:?}"),
        }
        match class.members[5] {
            Member::Constructor(ctor) => {
                assert_eq!(ctor.explicit_call.map(|c| c.kind), Some(CtorCallKind::Super));
                assert!(matches!(ctor.body.stmts[0], Stmt::Expr(_)));
            }
            other => panic!("expected constructor, got {other:?}"),
        }
        match class.members[6] {
            Member::Method(m) => assert!(m.body.is_none()),
            other => panic!("expected method, got {other:?}"),
        }
        match class.members[7] {
            Member::Method(m) => {
                assert_eq!(m.return_ty.dims, 2);
                assert_eq!(m.return_ty.base, TypeBase::Primitive(PrimitiveType::Int));
            }
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn interface_extends_list() {
        let arena = Bump::new();
        let unit = Parser::new("interface I extends A, B { int f(); }", &arena)
            .compilation_unit()
            .unwrap();
        assert_eq!(unit.types[0].kind, TypeKind::Interface);
        assert_eq!(unit.types[0].interfaces.len(), 2);
        assert!(unit.types[0].extends.is_none());
    }

    #[test]
    fn class_body_entry_point() {
        let arena = Bump::new();
        let members = Parser::new("int f() { return 1; } ; static int g;", &arena)
            .class_body("SC")
            .unwrap();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn duplicate_modifier_is_rejected() {
        let arena = Bump::new();
        let err = Parser::new("public public class C {}", &arena)
            .compilation_unit()
            .unwrap_err();
        match err {
            JavelinError::Parse(e) => assert_eq!(e.kind, ParseErrorKind::InvalidModifier),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_declarations() {
        let arena = Bump::new();
        for source in [
            "enum E { A }",
            "class C { class D {} }",
            "class C { void f(int... xs) {} }",
            "@Deprecated class C {}",
            "class C<T> {}",
        ] {
            match Parser::new(source, &arena).compilation_unit().unwrap_err() {
                JavelinError::Parse(e) => assert_eq!(e.kind, ParseErrorKind::Unsupported, "{source}"),
                other => panic!("expected parse error for {source}, got {other:?}"),
            }
        }
    }
}
