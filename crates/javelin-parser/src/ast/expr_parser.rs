//! Expression parsing using Pratt parsing (precedence climbing).
//!
//! Binding powers come from [`ops`](super::ops). Unary operators, casts and
//! the postfix chain (member access, calls, indexing, `++`/`--`) are handled
//! by [`Parser::parse_unary`] before the infix loop runs.

use bumpalo::collections::Vec as BVec;
use javelin_core::{JavelinError, ParseError, ParseErrorKind, Span};

use super::expr::*;
use super::ops::{ASSIGNMENT_BP, AssignOp, BinaryOp, CONDITIONAL_BP, INSTANCEOF_BP, PostfixOp, UnaryOp};
use super::parser::{ParseResult, Parser};
use super::types::TypeBase;
use super::Ident;
use crate::lexer::literal;
use crate::lexer::{Token, TokenKind};

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a full expression, including assignments.
    pub fn parse_expression(&mut self) -> ParseResult<Expr<'ast>> {
        self.parse_expr(0)
    }

    /// Parse an expression whose operators all bind at least as tightly
    /// as `min_bp`.
    pub(super) fn parse_expr(&mut self, min_bp: u8) -> ParseResult<Expr<'ast>> {
        self.nested(|parser| parser.parse_operators(min_bp))
    }

    /// The infix loop. Every operator folded onto `lhs` counts as a level.
    fn parse_operators(&mut self, min_bp: u8) -> ParseResult<Expr<'ast>> {
        let mut lhs = self.parse_unary()?;

        loop {
            let token = self.peek();

            if token.kind == TokenKind::Question {
                if CONDITIONAL_BP < min_bp {
                    break;
                }
                self.deeper()?;
                self.advance();
                let then_expr = self.parse_expr(0)?;
                self.expect(TokenKind::Colon)?;
                let else_expr = self.parse_expr(CONDITIONAL_BP)?;
                let span = lhs.span().merge(else_expr.span());
                lhs = Expr::Conditional(self.node(|id| ConditionalExpr {
                    id,
                    condition: lhs,
                    then_expr,
                    else_expr,
                    span,
                }));
                continue;
            }

            if let Some(op) = AssignOp::from_token(token.kind) {
                if ASSIGNMENT_BP < min_bp {
                    break;
                }
                self.deeper()?;
                self.advance();
                let value = self.parse_expr(ASSIGNMENT_BP)?;
                let span = lhs.span().merge(value.span());
                lhs = Expr::Assign(self.node(|id| AssignExpr {
                    id,
                    op,
                    target: lhs,
                    value,
                    span,
                }));
                continue;
            }

            if token.kind == TokenKind::InstanceOf {
                if INSTANCEOF_BP < min_bp {
                    break;
                }
                self.deeper()?;
                self.advance();
                let ty = self.parse_type()?;
                let span = lhs.span().merge(ty.span);
                lhs = Expr::InstanceOf(self.node(|id| InstanceOfExpr {
                    id,
                    expr: lhs,
                    ty,
                    span,
                }));
                continue;
            }

            if let Some(op) = BinaryOp::from_token(token.kind) {
                let (l_bp, r_bp) = op.binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.deeper()?;
                self.advance();
                let right = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(right.span());
                lhs = Expr::Binary(self.node(|id| BinaryExpr {
                    id,
                    op,
                    left: lhs,
                    right,
                    span,
                }));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Prefix operators and casts, then a primary with its postfix chain.
    fn parse_unary(&mut self) -> ParseResult<Expr<'ast>> {
        let token = self.peek();

        if let Some(op) = UnaryOp::from_token(token.kind) {
            self.advance();
            if op == UnaryOp::Neg
                && let Some(literal) = self.try_negated_min_literal(token.span)?
            {
                return Ok(literal);
            }
            let operand = self.nested(Self::parse_unary)?;
            let span = token.span.merge(operand.span());
            return Ok(Expr::Unary(self.node(|id| UnaryExpr {
                id,
                op,
                operand,
                span,
            })));
        }

        if token.kind == TokenKind::LeftParen && self.is_cast() {
            self.advance();
            let ty = self.parse_type()?;
            self.expect(TokenKind::RightParen)?;
            let expr = self.nested(Self::parse_unary)?;
            let span = token.span.merge(expr.span());
            return Ok(Expr::Cast(self.node(|id| CastExpr {
                id,
                ty,
                expr,
                span,
            })));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// `-2147483648` and `-9223372036854775808L` are only legal directly
    /// under unary minus.
    fn try_negated_min_literal(&mut self, minus: Span) -> ParseResult<Option<Expr<'ast>>> {
        let token = self.peek();
        let value = match token.kind {
            TokenKind::IntLiteral if token.lexeme.replace('_', "") == "2147483648" => {
                Literal::Int(i32::MIN)
            }
            TokenKind::LongLiteral
                if token.lexeme.replace('_', "").trim_end_matches(['l', 'L'])
                    == "9223372036854775808" =>
            {
                Literal::Long(i64::MIN)
            }
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(Expr::Literal(self.node(|id| LiteralExpr {
            id,
            value,
            span: minus.merge(token.span),
        }))))
    }

    /// Decide whether the `(` at the current position opens a cast.
    fn is_cast(&mut self) -> bool {
        let first = self.peek_nth_kind(1);
        if first.is_primitive_type() {
            let mut i = 2;
            while self.peek_nth_kind(i) == TokenKind::LeftBracket
                && self.peek_nth_kind(i + 1) == TokenKind::RightBracket
            {
                i += 2;
            }
            return self.peek_nth_kind(i) == TokenKind::RightParen;
        }
        if first != TokenKind::Identifier {
            return false;
        }
        let Some(end) = self.scan_type(1) else {
            return false;
        };
        if self.peek_nth_kind(end) != TokenKind::RightParen {
            return false;
        }
        let next = self.peek_nth_kind(end + 1);
        next.is_literal()
            || matches!(
                next,
                TokenKind::Identifier
                    | TokenKind::LeftParen
                    | TokenKind::Bang
                    | TokenKind::Tilde
                    | TokenKind::This
                    | TokenKind::Super
                    | TokenKind::New
            )
    }

    // =========================================
    // Primaries
    // =========================================

    fn parse_primary(&mut self) -> ParseResult<Expr<'ast>> {
        let token = self.peek();

        match token.kind {
            kind if kind.is_literal() => {
                self.advance();
                let value = self.literal_value(token)?;
                Ok(Expr::Literal(self.node(|id| LiteralExpr {
                    id,
                    value,
                    span: token.span,
                })))
            }

            TokenKind::Identifier => {
                if self.peek_nth_kind(1) == TokenKind::Arrow {
                    return Err(self.unsupported(token.span, "lambda expressions"));
                }
                self.parse_name_or_call()
            }

            TokenKind::This => {
                self.advance();
                Ok(Expr::This(self.node(|id| ThisExpr {
                    id,
                    span: token.span,
                })))
            }

            TokenKind::Super => {
                self.advance();
                self.expect(TokenKind::Dot)?;
                self.parse_selector(Receiver::Super(token.span), token.span)
            }

            TokenKind::New => self.parse_creation(),

            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                let close = self.expect(TokenKind::RightParen)?;
                if self.check(TokenKind::Arrow) {
                    return Err(self.unsupported(token.span, "lambda expressions"));
                }
                Ok(Expr::Paren(self.node(|id| ParenExpr {
                    id,
                    expr,
                    span: token.span.merge(close.span),
                })))
            }

            kind if kind.is_primitive_type() || kind == TokenKind::Void => {
                let mut i = 1;
                while self.peek_nth_kind(i) == TokenKind::LeftBracket {
                    i += 1;
                }
                if self.peek_nth_kind(i) == TokenKind::RightBracket
                    || self.peek_nth_kind(i) == TokenKind::Dot
                {
                    return Err(self.unsupported(token.span, "class literals"));
                }
                Err(self.expected_expression(token))
            }

            TokenKind::At => Err(self.unsupported(token.span, "annotations")),

            _ => Err(self.expected_expression(token)),
        }
    }

    pub(super) fn expected_expression(&mut self, token: Token<'ast>) -> JavelinError {
        self.error_at(
            token,
            ParseErrorKind::ExpectedExpression,
            format!("Unexpected token \"{}\"", token.lexeme),
        )
    }

    /// `a.b.c` or `a.b.c(args)`.
    fn parse_name_or_call(&mut self) -> ParseResult<Expr<'ast>> {
        let mut parts = BVec::new_in(self.arena);
        let first = self.advance();
        parts.push(Ident::new(first.lexeme, first.span));

        while self.check(TokenKind::Dot) {
            match self.peek_nth_kind(1) {
                TokenKind::Identifier => {
                    self.advance();
                    let part = self.advance();
                    parts.push(Ident::new(part.lexeme, part.span));
                }
                TokenKind::Class => {
                    let span = self.peek_nth(1).span;
                    return Err(self.unsupported(span, "class literals"));
                }
                TokenKind::This => {
                    let span = self.peek_nth(1).span;
                    return Err(self.unsupported(span, "qualified this expressions"));
                }
                _ => break,
            }
        }

        if self.check(TokenKind::LeftParen) {
            let name = parts[parts.len() - 1];
            let prefix = &parts[..parts.len() - 1];
            let target = if prefix.is_empty() {
                None
            } else {
                let span = prefix[0].span.merge(prefix[prefix.len() - 1].span);
                let parts = self.alloc_slice(prefix);
                Some(Receiver::Expr(Expr::Name(self.node(|id| NameExpr {
                    id,
                    parts,
                    span,
                }))))
            };
            let args = self.parse_arguments()?;
            let span = first.span.merge(self.previous_span());
            return Ok(Expr::MethodCall(self.node(|id| MethodCallExpr {
                id,
                target,
                name,
                args,
                span,
            })));
        }

        let parts = parts.into_bump_slice();
        let span = first.span.merge(parts[parts.len() - 1].span);
        Ok(Expr::Name(self.node(|id| NameExpr {
            id,
            parts,
            span,
        })))
    }

    /// After `target.`: a field access or method call.
    fn parse_selector(&mut self, target: Receiver<'ast>, start: Span) -> ParseResult<Expr<'ast>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                let name = Ident::new(token.lexeme, token.span);
                if self.check(TokenKind::LeftParen) {
                    let args = self.parse_arguments()?;
                    let span = start.merge(self.previous_span());
                    Ok(Expr::MethodCall(self.node(|id| MethodCallExpr {
                        id,
                        target: Some(target),
                        name,
                        args,
                        span,
                    })))
                } else {
                    Ok(Expr::FieldAccess(self.node(|id| FieldAccessExpr {
                        id,
                        target,
                        name,
                        span: start.merge(token.span),
                    })))
                }
            }
            TokenKind::New => Err(self.unsupported(token.span, "inner class instance creations")),
            TokenKind::Class => Err(self.unsupported(token.span, "class literals")),
            TokenKind::Less => Err(self.unsupported(token.span, "explicit type arguments")),
            _ => Err(self.expected(token, "Identifier")),
        }
    }

    /// Each selector, index or postfix operator counts as a level. The
    /// enclosing [`parse_expr`](Self::parse_expr) restores the depth.
    fn parse_postfix(&mut self, mut expr: Expr<'ast>) -> ParseResult<Expr<'ast>> {
        loop {
            let token = self.peek();
            if matches!(token.kind, TokenKind::Dot | TokenKind::LeftBracket)
                || PostfixOp::from_token(token.kind).is_some()
            {
                self.deeper()?;
            }
            match token.kind {
                TokenKind::Dot => {
                    self.advance();
                    expr = self.parse_selector(Receiver::Expr(expr), expr.span())?;
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let close = self.expect(TokenKind::RightBracket)?;
                    expr = Expr::Index(self.node(|id| IndexExpr {
                        id,
                        array: expr,
                        index,
                        span: expr.span().merge(close.span),
                    }));
                }
                kind if PostfixOp::from_token(kind).is_some() => {
                    self.advance();
                    let op = if kind == TokenKind::PlusPlus { PostfixOp::Inc } else { PostfixOp::Dec };
                    expr = Expr::Postfix(self.node(|id| PostfixExpr {
                        id,
                        op,
                        operand: expr,
                        span: expr.span().merge(token.span),
                    }));
                }
                TokenKind::ColonColon => {
                    return Err(self.unsupported(token.span, "method references"));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `(a, b, c)`
    pub(super) fn parse_arguments(&mut self) -> ParseResult<&'ast [Expr<'ast>]> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args.into_bump_slice())
    }

    // =========================================
    // Instance and array creation
    // =========================================

    fn parse_creation(&mut self) -> ParseResult<Expr<'ast>> {
        let new_token = self.expect(TokenKind::New)?;
        let element = self.parse_type_base()?;
        let token = self.peek();

        match token.kind {
            TokenKind::LeftParen => {
                if !matches!(element.base, TypeBase::Named(_)) {
                    return Err(self.expected(token, "\"[\""));
                }
                let args = self.parse_arguments()?;
                if self.check(TokenKind::LeftBrace) {
                    let span = self.peek().span;
                    return Err(self.unsupported(span, "anonymous classes"));
                }
                let span = new_token.span.merge(self.previous_span());
                Ok(Expr::New(self.node(|id| NewExpr {
                    id,
                    ty: element,
                    args,
                    span,
                })))
            }
            TokenKind::LeftBracket if self.peek_nth_kind(1) == TokenKind::RightBracket => {
                let dims = self.parse_dims();
                let init = self.parse_array_init()?;
                Ok(Expr::NewArray(self.node(|id| NewArrayExpr {
                    id,
                    element,
                    dim_exprs: &[],
                    extra_dims: dims,
                    init: Some(init),
                    span: new_token.span.merge(init.span),
                })))
            }
            TokenKind::LeftBracket => {
                let mut dim_exprs = BVec::new_in(self.arena);
                while self.check(TokenKind::LeftBracket)
                    && self.peek_nth_kind(1) != TokenKind::RightBracket
                {
                    self.advance();
                    dim_exprs.push(self.parse_expression()?);
                    self.expect(TokenKind::RightBracket)?;
                }
                let extra_dims = self.parse_dims();
                let span = new_token.span.merge(self.previous_span());
                Ok(Expr::NewArray(self.node(|id| NewArrayExpr {
                    id,
                    element,
                    dim_exprs: dim_exprs.into_bump_slice(),
                    extra_dims,
                    init: None,
                    span,
                })))
            }
            _ => Err(self.expected(token, "\"(\" or \"[\"")),
        }
    }

    /// `{ a, { b, c }, }`
    pub(super) fn parse_array_init(&mut self) -> ParseResult<&'ast ArrayInitExpr<'ast>> {
        self.nested(Self::parse_array_elements)
    }

    fn parse_array_elements(&mut self) -> ParseResult<&'ast ArrayInitExpr<'ast>> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut elements = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            elements.push(self.parse_var_init()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(self.node(|id| ArrayInitExpr {
            id,
            elements: elements.into_bump_slice(),
            span: open.span.merge(close.span),
        }))
    }

    /// A variable initializer: an expression or an array initializer.
    pub(super) fn parse_var_init(&mut self) -> ParseResult<Expr<'ast>> {
        if self.check(TokenKind::LeftBrace) {
            Ok(Expr::ArrayInit(self.parse_array_init()?))
        } else {
            self.parse_expression()
        }
    }

    // =========================================
    // Literals
    // =========================================

    fn literal_value(&mut self, token: Token<'ast>) -> ParseResult<Literal<'ast>> {
        let invalid = |detail: String| -> JavelinError {
            ParseError::new(ParseErrorKind::InvalidLiteral, token.span, detail).into()
        };

        Ok(match token.kind {
            TokenKind::IntLiteral => {
                let value = literal::parse_integer(token.lexeme).map_err(invalid)?;
                let limit = if value.decimal { i32::MAX as u64 } else { u32::MAX as u64 };
                if value.magnitude > limit {
                    return Err(invalid("integer number too large".to_string()));
                }
                Literal::Int(value.magnitude as u32 as i32)
            }
            TokenKind::LongLiteral => {
                let value = literal::parse_integer(token.lexeme).map_err(invalid)?;
                if value.decimal && value.magnitude > i64::MAX as u64 {
                    return Err(invalid("integer number too large".to_string()));
                }
                Literal::Long(value.magnitude as i64)
            }
            TokenKind::FloatLiteral => {
                let text = literal::floating_text(token.lexeme);
                let value: f32 = text
                    .parse()
                    .map_err(|_| invalid(format!("malformed float literal {}", token.lexeme)))?;
                if value.is_infinite() {
                    return Err(invalid("floating-point number too large".to_string()));
                }
                Literal::Float(value)
            }
            TokenKind::DoubleLiteral => {
                let text = literal::floating_text(token.lexeme);
                let value: f64 = text
                    .parse()
                    .map_err(|_| invalid(format!("malformed double literal {}", token.lexeme)))?;
                if value.is_infinite() {
                    return Err(invalid("floating-point number too large".to_string()));
                }
                Literal::Double(value)
            }
            TokenKind::CharLiteral => {
                let body = &token.lexeme[1..token.lexeme.len() - 1];
                let units = literal::decode_utf16(body).map_err(|e| invalid(e.detail))?;
                match units.as_slice() {
                    [unit] => Literal::Char(*unit),
                    _ => return Err(invalid("invalid character literal".to_string())),
                }
            }
            TokenKind::StringLiteral => {
                let body = &token.lexeme[1..token.lexeme.len() - 1];
                let text = literal::decode_string(body).map_err(|e| invalid(e.detail))?;
                Literal::String(self.arena.alloc_str(&text))
            }
            TokenKind::True => Literal::Boolean(true),
            TokenKind::False => Literal::Boolean(false),
            TokenKind::Null => Literal::Null,
            _ => return Err(self.expected_expression(token)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    fn parse<'ast>(source: &str, arena: &'ast Bump) -> Expr<'ast> {
        Parser::new(source, arena).expression().unwrap()
    }

    #[test]
    fn multiplication_binds_tighter() {
        let arena = Bump::new();
        match parse("1 + 2 * 3", &arena) {
            Expr::Binary(add) => {
                assert_eq!(add.op, BinaryOp::Add);
                assert!(matches!(add.right, Expr::Binary(mul) if mul.op == BinaryOp::Mul));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        let arena = Bump::new();
        match parse("a - b - c", &arena) {
            Expr::Binary(outer) => {
                assert!(matches!(outer.left, Expr::Binary(_)));
                assert!(matches!(outer.right, Expr::Name(_)));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn assignment_and_conditional_are_right_associative() {
        let arena = Bump::new();
        match parse("a = b = c ? d : e ? f : g", &arena) {
            Expr::Assign(outer) => match outer.value {
                Expr::Assign(inner) => match inner.value {
                    Expr::Conditional(cond) => {
                        assert!(matches!(cond.else_expr, Expr::Conditional(_)));
                    }
                    other => panic!("expected conditional, got {other:?}"),
                },
                other => panic!("expected assignment, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn dotted_names_stay_ambiguous() {
        let arena = Bump::new();
        match parse("a.b.c.d()", &arena) {
            Expr::MethodCall(call) => {
                assert_eq!(call.name.name, "d");
                match call.target {
                    Some(Receiver::Expr(Expr::Name(name))) => assert_eq!(name.dotted(), "a.b.c"),
                    other => panic!("expected ambiguous target, got {other:?}"),
                }
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn member_access_after_call() {
        let arena = Bump::new();
        match parse("s.trim().length()", &arena) {
            Expr::MethodCall(call) => {
                assert_eq!(call.name.name, "length");
                assert!(matches!(call.target, Some(Receiver::Expr(Expr::MethodCall(_)))));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn casts_are_told_apart_from_parentheses() {
        let arena = Bump::new();
        assert!(matches!(parse("(int) x", &arena), Expr::Cast(_)));
        assert!(matches!(parse("(String) o", &arena), Expr::Cast(_)));
        assert!(matches!(parse("(int[]) o", &arena), Expr::Cast(_)));
        assert!(matches!(parse("(a) - b", &arena), Expr::Binary(_)));
        assert!(matches!(parse("(int) -x", &arena), Expr::Cast(_)));
    }

    #[test]
    fn generic_cast_splits_shift_token() {
        let arena = Bump::new();
        match parse("(java.util.List<java.util.List<String>>) o", &arena) {
            Expr::Cast(cast) => assert_eq!(cast.ty.name().as_deref(), Some("java.util.List")),
            other => panic!("expected cast, got {other:?}"),
        }
    }

    #[test]
    fn instanceof_binds_like_relational() {
        let arena = Bump::new();
        match parse("o instanceof String == flag", &arena) {
            Expr::Binary(eq) => assert!(matches!(eq.left, Expr::InstanceOf(_))),
            other => panic!("expected equality, got {other:?}"),
        }
    }

    #[test]
    fn array_creation_forms() {
        let arena = Bump::new();
        match parse("new int[3][]", &arena) {
            Expr::NewArray(arr) => {
                assert_eq!(arr.dim_exprs.len(), 1);
                assert_eq!(arr.extra_dims, 1);
            }
            other => panic!("expected array creation, got {other:?}"),
        }
        match parse("new String[] { \"a\", \"b\", }", &arena) {
            Expr::NewArray(arr) => assert_eq!(arr.init.map(|i| i.elements.len()), Some(2)),
            other => panic!("expected array creation, got {other:?}"),
        }
    }

    #[test]
    fn integer_literal_limits() {
        let arena = Bump::new();
        assert!(matches!(
            parse("-2147483648", &arena),
            Expr::Literal(LiteralExpr { value: Literal::Int(i32::MIN), .. })
        ));
        assert!(matches!(
            parse("0xFFFFFFFF", &arena),
            Expr::Literal(LiteralExpr { value: Literal::Int(-1), .. })
        ));
        let err = Parser::new("2147483648", &arena).expression().unwrap_err();
        assert!(err.to_string().contains("integer number too large"));
    }

    #[test]
    fn literal_values_are_decoded() {
        let arena = Bump::new();
        assert!(matches!(
            parse("'\\n'", &arena),
            Expr::Literal(LiteralExpr { value: Literal::Char(10), .. })
        ));
        assert!(matches!(
            parse("\"a\\tb\"", &arena),
            Expr::Literal(LiteralExpr { value: Literal::String(s), .. }) if *s == "a\tb"
        ));
        assert!(matches!(
            parse("1.5f", &arena),
            Expr::Literal(LiteralExpr { value: Literal::Float(v), .. }) if *v == 1.5
        ));
    }

    #[test]
    fn unsupported_constructs_are_reported() {
        let arena = Bump::new();
        for source in ["x -> x", "String.class", "new Runnable() {}", "int.class"] {
            let err = Parser::new(source, &arena).expression().unwrap_err();
            match err {
                JavelinError::Parse(e) => {
                    assert_eq!(e.kind, ParseErrorKind::Unsupported, "{source}")
                }
                other => panic!("expected parse error for {source}, got {other:?}"),
            }
        }
    }

    #[test]
    fn super_member_access() {
        let arena = Bump::new();
        match parse("super.toString()", &arena) {
            Expr::MethodCall(call) => assert!(matches!(call.target, Some(Receiver::Super(_)))),
            other => panic!("expected call, got {other:?}"),
        }
    }
}
