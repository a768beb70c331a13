//! Parser core: token buffer, lookahead and the public entry points.
//!
//! The grammar productions live in `expr_parser`, `stmt_parser`,
//! `decl_parser` and `type_parser`, each extending [`Parser`] with
//! another `impl` block.

use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;
use javelin_core::{JavelinError, LexError, ParseError, ParseErrorKind, Span};

use super::decl::{CompilationUnit, ImportDecl, Member};
use super::expr::Expr;
use super::stmt::Stmt;
use super::NodeId;
use crate::lexer::{Lexer, Token, TokenKind};

/// Result type of every production.
pub type ParseResult<T> = Result<T, JavelinError>;

/// Deepest syntax tree the parser builds, counted in nested statements,
/// operands and folded operators. The resolver, flow analysis and
/// generator all walk the tree recursively, so this also bounds their
/// stack use.
pub const MAX_NESTING: u32 = 64;

/// Recursive-descent parser.
///
/// Tokens are pulled from the [`Lexer`] on demand and buffered so that
/// lookahead is unlimited. A lexical error is stored and replaced by a
/// [`TokenKind::Error`] token; the stored error is reported as soon as a
/// production tries to consume that token.
pub struct Parser<'src, 'ast> {
    lexer: Lexer<'src, 'ast>,
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
    lex_error: Option<LexError>,
    pub(super) arena: &'ast Bump,
    next_id: u32,
    depth: u32,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            lexer: Lexer::new(source, arena),
            buffer: Vec::with_capacity(64),
            position: 0,
            lex_error: None,
            arena,
            next_id: 0,
            depth: 0,
        }
    }

    // =========================================
    // Entry points
    // =========================================

    /// Parse a whole compilation unit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compilation_unit(&mut self) -> ParseResult<CompilationUnit<'ast>> {
        log::trace!("parsing compilation unit");
        let unit = self.parse_compilation_unit()?;
        self.expect_end()?;
        Ok(unit)
    }

    /// Parse a single expression that must span the whole input.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn expression(&mut self) -> ParseResult<Expr<'ast>> {
        log::trace!("parsing expression");
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse block statements up to the end of input.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn block_statements(&mut self) -> ParseResult<&'ast [Stmt<'ast>]> {
        log::trace!("parsing block statements");
        let mut stmts = BVec::new_in(self.arena);
        while !self.check(TokenKind::Eof) {
            stmts.push(self.parse_block_statement()?);
        }
        Ok(stmts.into_bump_slice())
    }

    /// Parse class body members up to the end of input.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn class_body(&mut self, class_name: &str) -> ParseResult<&'ast [Member<'ast>]> {
        log::trace!("parsing class body of {class_name}");
        let mut members = BVec::new_in(self.arena);
        while !self.check(TokenKind::Eof) {
            if let Some(member) = self.parse_member(class_name)? {
                members.push(member);
            }
        }
        Ok(members.into_bump_slice())
    }

    /// Parse any leading `import` declarations.
    pub fn imports(&mut self) -> ParseResult<&'ast [ImportDecl<'ast>]> {
        let mut imports = BVec::new_in(self.arena);
        while self.check(TokenKind::Import) {
            imports.push(self.parse_import()?);
        }
        Ok(imports.into_bump_slice())
    }

    /// Fail with `Unexpected token` unless all input has been consumed.
    pub fn expect_end(&mut self) -> ParseResult<()> {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected(token)),
        }
    }

    /// Allocate a fresh node id, for nodes synthesized outside the parser.
    pub fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of node ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    // =========================================
    // Token access
    // =========================================

    /// Make sure the buffer holds the token `n` places ahead.
    fn fill(&mut self, n: usize) {
        while self.buffer.len() <= self.position + n {
            let token = match self.lexer.next() {
                Some(Ok(token)) => token,
                Some(Err(error)) => {
                    let token = Token::new(TokenKind::Error, "", error.span());
                    self.lex_error = Some(error);
                    token
                }
                // The stream ended on Eof or Error; repeat it.
                None => match self.buffer.last() {
                    Some(last) => *last,
                    None => Token::new(TokenKind::Eof, "", Span::point(1, 1)),
                },
            };
            self.buffer.push(token);
        }
    }

    /// The current token.
    pub fn peek(&mut self) -> Token<'ast> {
        self.peek_nth(0)
    }

    pub fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    /// The token `n` places ahead of the current one.
    pub fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        self.fill(n);
        self.buffer[self.position + n]
    }

    pub(super) fn peek_nth_kind(&mut self, n: usize) -> TokenKind {
        self.peek_nth(n).kind
    }

    /// Consume and return the current token. `Eof` and `Error` are never
    /// consumed.
    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if !matches!(token.kind, TokenKind::Eof | TokenKind::Error) {
            self.position += 1;
        }
        token
    }

    /// Span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|i| self.buffer.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    pub(super) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token<'ast>> {
        let token = self.peek();
        if token.kind == kind {
            return Ok(self.advance());
        }
        Err(self.expected(token, &format!("\"{}\"", kind.as_str())))
    }

    /// Consume `>` when closing a type argument list, splitting `>>`,
    /// `>>>`, `>=`, `>>=` and `>>>=` if needed.
    pub(super) fn expect_closing_angle(&mut self) -> ParseResult<()> {
        let token = self.peek();
        if token.kind == TokenKind::Greater {
            self.advance();
            return Ok(());
        }
        match token.split_leading_gt() {
            Some((_, rest)) => {
                self.buffer[self.position] = rest;
                Ok(())
            }
            None => Err(self.expected(token, "\">\"")),
        }
    }

    // =========================================
    // Errors
    // =========================================

    /// Error for a token that cannot appear here.
    pub(super) fn unexpected(&mut self, token: Token<'ast>) -> JavelinError {
        match token.kind {
            TokenKind::Error => self.lex_error(token),
            TokenKind::Eof => ParseError::unexpected_eof(token.span).into(),
            _ => ParseError::unexpected_token(token.span, token.lexeme).into(),
        }
    }

    /// Error for a token found where `what` was required.
    pub(super) fn expected(&mut self, token: Token<'ast>, what: &str) -> JavelinError {
        match token.kind {
            TokenKind::Error => self.lex_error(token),
            TokenKind::Eof => ParseError::unexpected_eof(token.span).into(),
            _ => ParseError::expected_token(token.span, what, token.lexeme).into(),
        }
    }

    /// Error of a specific kind; lexical and end-of-input errors take
    /// precedence.
    pub(super) fn error_at(
        &mut self,
        token: Token<'ast>,
        kind: ParseErrorKind,
        message: impl Into<String>,
    ) -> JavelinError {
        match token.kind {
            TokenKind::Error | TokenKind::Eof => self.unexpected(token),
            _ => ParseError::new(kind, token.span, message).into(),
        }
    }

    /// Run `production` one level deeper, restoring the depth afterwards
    /// along with any levels `production` added through [`deeper`](Self::deeper).
    pub(super) fn nested<T>(&mut self, production: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let base = self.depth;
        let result = self.deeper().and_then(|()| production(self));
        self.depth = base;
        result
    }

    /// Count one more level for a node folded over its operand.
    pub(super) fn deeper(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            let span = self.peek().span;
            return Err(ParseError::new(
                ParseErrorKind::TooDeeplyNested,
                span,
                format!("Nesting deeper than {MAX_NESTING} levels"),
            )
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn unsupported(&self, span: Span, what: &str) -> JavelinError {
        ParseError::unsupported(span, what).into()
    }

    fn lex_error(&mut self, token: Token<'ast>) -> JavelinError {
        match self.lex_error.clone() {
            Some(error) => error.into(),
            None => ParseError::unexpected_token(token.span, token.lexeme).into(),
        }
    }

    // =========================================
    // Arena helpers
    // =========================================

    /// Allocate a node that carries a fresh [`NodeId`].
    pub(super) fn node<T>(&mut self, build: impl FnOnce(NodeId) -> T) -> &'ast T {
        let id = self.fresh_id();
        self.arena.alloc(build(id))
    }

    pub(super) fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    pub(super) fn alloc_slice<T: Copy>(&self, values: &[T]) -> &'ast [T] {
        self.arena.alloc_slice_copy(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_input_is_rejected() {
        let arena = Bump::new();
        let err = Parser::new("1 + 2 x", &arena).expression().unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.to_string(), "at 1:7: Unexpected token \"x\"");
    }

    #[test]
    fn lexical_errors_surface_when_reached() {
        let arena = Bump::new();
        let err = Parser::new("1 + #", &arena).expression().unwrap_err();
        assert!(err.is_lex());
        assert_eq!(err.span(), Span::new(1, 5, 1));
    }

    #[test]
    fn missing_operand_reports_end_of_input() {
        let arena = Bump::new();
        let err = Parser::new("1 +", &arena).expression().unwrap_err();
        match err {
            JavelinError::Parse(e) => assert_eq!(e.kind, ParseErrorKind::UnexpectedEof),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn lookahead_does_not_consume() {
        let arena = Bump::new();
        let mut parser = Parser::new("a . b", &arena);
        assert_eq!(parser.peek_nth(2).lexeme, "b");
        assert_eq!(parser.peek().lexeme, "a");
        assert_eq!(parser.peek_nth(10).kind, TokenKind::Eof);
    }

    #[test]
    fn closing_angle_splits_shift_tokens() {
        let arena = Bump::new();
        let mut parser = Parser::new(">>>", &arena);
        parser.expect_closing_angle().unwrap();
        assert_eq!(parser.peek_kind(), TokenKind::GreaterGreater);
        parser.expect_closing_angle().unwrap();
        parser.expect_closing_angle().unwrap();
        assert_eq!(parser.peek_kind(), TokenKind::Eof);
    }

    fn nesting_error(err: JavelinError) -> Span {
        match err {
            JavelinError::Parse(e) => {
                assert_eq!(e.kind, ParseErrorKind::TooDeeplyNested);
                e.span
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let arena = Bump::new();
        let parens = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        let span = nesting_error(Parser::new(&parens, &arena).expression().unwrap_err());
        assert_eq!(span.line, 1);

        let sum = format!("1{}", " + 1".repeat(1000));
        nesting_error(Parser::new(&sum, &arena).expression().unwrap_err());

        let negated = format!("{}x", "- ".repeat(1000));
        nesting_error(Parser::new(&negated, &arena).expression().unwrap_err());

        let calls = format!("a{}", ".b()".repeat(1000));
        nesting_error(Parser::new(&calls, &arena).expression().unwrap_err());

        let blocks = format!("{}{}", "{".repeat(1000), "}".repeat(1000));
        nesting_error(Parser::new(&blocks, &arena).block_statements().unwrap_err());
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let arena = Bump::new();
        let sum = format!("1{}", " + 1".repeat(40));
        Parser::new(&sum, &arena).expression().unwrap();
        let parens = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        Parser::new(&parens, &arena).expression().unwrap();
    }

    #[test]
    fn siblings_do_not_add_depth() {
        let arena = Bump::new();
        let stmts = "x = x + 1;\n".repeat(MAX_NESTING as usize * 4);
        let parsed = Parser::new(&stmts, &arena).block_statements().unwrap();
        assert_eq!(parsed.len(), MAX_NESTING as usize * 4);

        let args = vec!["f(a + b)"; MAX_NESTING as usize * 2].join(", ");
        Parser::new(&format!("g({args})"), &arena).expression().unwrap();
    }

    #[test]
    fn node_ids_are_unique() {
        let arena = Bump::new();
        let mut parser = Parser::new("a + b * c", &arena);
        let expr = parser.expression().unwrap();
        assert_eq!(parser.node_count(), 5);
        assert_eq!(expr.id(), NodeId(4));
    }
}
