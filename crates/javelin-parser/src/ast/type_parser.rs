//! Type expression parsing and type lookahead.
//!
//! Grammar:
//! ```text
//! Type      ::= (PRIMITIVE | Name TypeArgs?) ('[' ']')*
//! Name      ::= IDENT ('.' IDENT TypeArgs?)*
//! TypeArgs  ::= '<' TypeArg (',' TypeArg)* '>'
//! TypeArg   ::= Type | '?' (('extends' | 'super') Type)?
//! ```
//!
//! Type arguments are checked for well-formedness and dropped.

use bumpalo::collections::Vec as BVec;
use javelin_core::{ParseErrorKind, PrimitiveType};

use super::parser::{ParseResult, Parser};
use super::types::{TypeBase, TypeExpr};
use super::Ident;
use crate::lexer::TokenKind;

/// The primitive type a keyword names.
pub(super) fn primitive_of(kind: TokenKind) -> Option<PrimitiveType> {
    Some(match kind {
        TokenKind::Boolean => PrimitiveType::Boolean,
        TokenKind::Byte => PrimitiveType::Byte,
        TokenKind::Short => PrimitiveType::Short,
        TokenKind::Char => PrimitiveType::Char,
        TokenKind::Int => PrimitiveType::Int,
        TokenKind::Long => PrimitiveType::Long,
        TokenKind::Float => PrimitiveType::Float,
        TokenKind::Double => PrimitiveType::Double,
        _ => return None,
    })
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a non-void type.
    pub fn parse_type(&mut self) -> ParseResult<TypeExpr<'ast>> {
        let base = self.parse_type_base()?;
        let dims = self.parse_dims();
        Ok(TypeExpr {
            dims,
            span: base.span.merge(self.previous_span()),
            ..base
        })
    }

    /// Parse a method return type, which may be `void`.
    pub(super) fn parse_return_type(&mut self) -> ParseResult<TypeExpr<'ast>> {
        if let Some(token) = self.eat(TokenKind::Void) {
            return Ok(TypeExpr {
                base: TypeBase::Void,
                dims: 0,
                span: token.span,
            });
        }
        self.parse_type()
    }

    /// Parse a type without trailing dimensions.
    pub(super) fn parse_type_base(&mut self) -> ParseResult<TypeExpr<'ast>> {
        let token = self.peek();
        if let Some(primitive) = primitive_of(token.kind) {
            self.advance();
            return Ok(TypeExpr {
                base: TypeBase::Primitive(primitive),
                dims: 0,
                span: token.span,
            });
        }
        if token.kind != TokenKind::Identifier {
            return Err(self.error_at(
                token,
                ParseErrorKind::ExpectedType,
                format!("Type expected instead of \"{}\"", token.lexeme),
            ));
        }

        let mut parts = BVec::new_in(self.arena);
        loop {
            let part = self.expect_ident()?;
            parts.push(part);
            if self.check(TokenKind::Less) {
                self.skip_type_args()?;
            }
            if self.check(TokenKind::Dot) && self.peek_nth_kind(1) == TokenKind::Identifier {
                self.advance();
            } else {
                break;
            }
        }
        Ok(TypeExpr {
            base: TypeBase::Named(parts.into_bump_slice()),
            dims: 0,
            span: token.span.merge(self.previous_span()),
        })
    }

    /// Consume `[]` pairs, returning how many.
    pub(super) fn parse_dims(&mut self) -> u8 {
        let mut dims = 0u8;
        while self.check(TokenKind::LeftBracket) && self.peek_nth_kind(1) == TokenKind::RightBracket {
            self.advance();
            self.advance();
            dims = dims.saturating_add(1);
        }
        dims
    }

    /// `<A, ? extends B<C>>`
    fn skip_type_args(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Less)?;
        loop {
            if self.eat(TokenKind::Question).is_some() {
                if self.eat(TokenKind::Extends).is_some() || self.eat(TokenKind::Super).is_some() {
                    self.nested(Self::parse_type)?;
                }
            } else {
                self.nested(Self::parse_type)?;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_closing_angle()
    }

    pub(super) fn expect_ident(&mut self) -> ParseResult<Ident<'ast>> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier {
            self.advance();
            return Ok(Ident::new(token.lexeme, token.span));
        }
        Err(self.error_at(
            token,
            ParseErrorKind::ExpectedIdentifier,
            format!("Identifier expected instead of \"{}\"", token.lexeme),
        ))
    }

    /// `a.b.c`, as used by package and import declarations.
    pub(super) fn parse_qualified_name(&mut self) -> ParseResult<&'ast [Ident<'ast>]> {
        let mut parts = BVec::new_in(self.arena);
        parts.push(self.expect_ident()?);
        while self.check(TokenKind::Dot) && self.peek_nth_kind(1) == TokenKind::Identifier {
            self.advance();
            parts.push(self.expect_ident()?);
        }
        Ok(parts.into_bump_slice())
    }

    // =========================================
    // Lookahead
    // =========================================

    /// If a type starts `offset` tokens ahead, the offset just past it.
    ///
    /// Pure lookahead: nothing is consumed.
    pub(super) fn scan_type(&mut self, offset: usize) -> Option<usize> {
        let mut i = offset;
        let first = self.peek_nth_kind(i);
        if first.is_primitive_type() {
            i += 1;
        } else if first == TokenKind::Identifier {
            i += 1;
            loop {
                match self.peek_nth_kind(i) {
                    TokenKind::Less => i = self.scan_type_args(i)?,
                    TokenKind::Dot if self.peek_nth_kind(i + 1) == TokenKind::Identifier => i += 2,
                    _ => break,
                }
            }
        } else {
            return None;
        }
        while self.peek_nth_kind(i) == TokenKind::LeftBracket
            && self.peek_nth_kind(i + 1) == TokenKind::RightBracket
        {
            i += 2;
        }
        Some(i)
    }

    /// Skip a balanced type argument list starting at `offset`.
    fn scan_type_args(&mut self, offset: usize) -> Option<usize> {
        let mut depth: i32 = 0;
        let mut i = offset;
        loop {
            match self.peek_nth_kind(i) {
                TokenKind::Less => depth += 1,
                TokenKind::Greater => depth -= 1,
                TokenKind::GreaterGreater => depth -= 2,
                TokenKind::GreaterGreaterGreater => depth -= 3,
                TokenKind::Identifier
                | TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Question
                | TokenKind::Extends
                | TokenKind::Super
                | TokenKind::LeftBracket
                | TokenKind::RightBracket => {}
                kind if kind.is_primitive_type() => {}
                _ => return None,
            }
            i += 1;
            if depth <= 0 {
                return (depth == 0).then_some(i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn qualified_array_type() {
        let arena = Bump::new();
        let ty = Parser::new("java.lang.String[][]", &arena).parse_type().unwrap();
        assert_eq!(ty.name().as_deref(), Some("java.lang.String"));
        assert_eq!(ty.dims, 2);
    }

    #[test]
    fn primitive_type() {
        let arena = Bump::new();
        let ty = Parser::new("long", &arena).parse_type().unwrap();
        assert_eq!(ty.base, TypeBase::Primitive(PrimitiveType::Long));
    }

    #[test]
    fn nested_type_arguments_are_dropped() {
        let arena = Bump::new();
        let mut parser = Parser::new("Map<String, List<? extends Number>> x", &arena);
        let ty = parser.parse_type().unwrap();
        assert_eq!(ty.name().as_deref(), Some("Map"));
        assert_eq!(parser.peek().lexeme, "x");
    }

    #[test]
    fn type_lookahead() {
        let arena = Bump::new();
        let mut parser = Parser::new("List<List<int[]>>[] x", &arena);
        assert_eq!(parser.scan_type(0), Some(10));
        let mut parser = Parser::new("a.b c", &arena);
        assert_eq!(parser.scan_type(0), Some(3));
        let mut parser = Parser::new("a < b + 1", &arena);
        assert_eq!(parser.scan_type(0), None);
    }

    #[test]
    fn void_is_not_a_type() {
        let arena = Bump::new();
        assert!(Parser::new("void", &arena).parse_type().is_err());
        let ty = Parser::new("void", &arena).parse_return_type().unwrap();
        assert!(ty.is_void());
    }
}
