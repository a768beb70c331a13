//! Main lexer implementation.
//!
//! The [`Lexer`] converts source text into a lazy stream of [`Token`]s,
//! dispatching on the first character of each token. Lexemes are copied
//! into the arena so the source string can be freed once parsing is done.

use bumpalo::Bump;
use javelin_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::literal;
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for source text.
///
/// Implements [`Iterator`], yielding tokens up to and including a single
/// [`TokenKind::Eof`]. The first error ends the stream. [`rewind`](Self::rewind)
/// restarts scanning from the beginning; two scans of the same input yield
/// identical tokens.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    finished: bool,
}

type LexResult<T> = Result<T, LexError>;

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            finished: false,
        }
    }

    /// Restart scanning from the start of the source.
    pub fn rewind(&mut self) {
        self.cursor = Cursor::new(self.cursor.source());
        self.finished = false;
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> LexResult<Token<'ast>> {
        self.skip_trivia()?;

        let start = Start {
            line: self.cursor.line(),
            col: self.cursor.column(),
            offset: self.cursor.offset(),
        };

        let Some(first) = self.cursor.peek() else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(start.line, start.col),
            ));
        };

        match first {
            '"' => self.scan_string(start),
            '\'' => self.scan_char(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            c if is_ident_start(c) => Ok(self.scan_identifier(start)),
            _ => self.scan_operator(start),
        }
    }

    /// Skip whitespace, comments and a leading byte order mark.
    fn skip_trivia(&mut self) -> LexResult<()> {
        if self.cursor.offset() == 0 {
            self.cursor.eat('\u{FEFF}');
        }
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            if self.cursor.check_str("//") {
                self.cursor.eat_while(|c| c != '\n');
            } else if self.cursor.check_str("/*") {
                let span = Span::new(self.cursor.line(), self.cursor.column(), 2);
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    if self.cursor.check_str("*/") {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    if self.cursor.advance().is_none() {
                        return Err(LexError::UnterminatedComment { span });
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let text = self.cursor.slice_from(start.offset);
        let span = Span::new(start.line, start.col, text.len() as u32);
        Token::new(kind, self.arena.alloc_str(text), span)
    }

    fn span_from(&self, start: Start) -> Span {
        Span::new(start.line, start.col, self.cursor.offset() - start.offset)
    }

    // =========================================
    // Scanning: Identifiers
    // =========================================

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let text = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Scanning: Strings and characters
    // =========================================

    /// Consume a quoted literal up to the closing quote, returning its body.
    fn scan_quoted(&mut self, quote: char, start: Start) -> LexResult<&'src str> {
        self.cursor.advance();
        let body_start = self.cursor.offset();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    let span = self.span_from(start);
                    return Err(if quote == '"' {
                        LexError::UnterminatedString { span }
                    } else {
                        LexError::UnterminatedChar { span }
                    });
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.check(|c| c != '\n' && c != '\r') {
                        self.cursor.advance();
                    }
                }
                Some(c) if c == quote => {
                    let body = self.cursor.slice_from(body_start);
                    self.cursor.advance();
                    return Ok(body);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn escape_error(&self, start: Start, err: literal::EscapeError) -> LexError {
        LexError::InvalidEscape {
            span: Span::new(start.line, start.col + 1 + err.offset as u32, 2),
            detail: err.detail,
        }
    }

    fn scan_string(&mut self, start: Start) -> LexResult<Token<'ast>> {
        let body = self.scan_quoted('"', start)?;
        literal::decode_string(body).map_err(|err| self.escape_error(start, err))?;
        Ok(self.make_token(TokenKind::StringLiteral, start))
    }

    fn scan_char(&mut self, start: Start) -> LexResult<Token<'ast>> {
        let body = self.scan_quoted('\'', start)?;
        let units = literal::decode_utf16(body).map_err(|err| self.escape_error(start, err))?;
        if units.len() != 1 {
            return Err(LexError::InvalidCharLiteral {
                span: self.span_from(start),
            });
        }
        Ok(self.make_token(TokenKind::CharLiteral, start))
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(&mut self, start: Start) -> LexResult<Token<'ast>> {
        let radix_prefix = self.cursor.peek() == Some('0')
            && matches!(self.cursor.peek_nth(1), Some('x' | 'X' | 'b' | 'B'));

        let kind = if radix_prefix {
            self.cursor.advance();
            self.cursor.advance();
            let digits = self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
            if digits.is_empty() {
                return Err(self.invalid_number(start, "missing digits after radix prefix"));
            }
            self.integer_suffix()
        } else {
            self.scan_decimal(start)?
        };

        if self.cursor.check(is_ident_continue) {
            self.cursor.eat_while(is_ident_continue);
            return Err(self.invalid_number(start, "unexpected character in number"));
        }

        let token = self.make_token(kind, start);
        if matches!(kind, TokenKind::IntLiteral | TokenKind::LongLiteral) {
            literal::parse_integer(token.lexeme).map_err(|detail| self.invalid_number(start, detail))?;
        }
        Ok(token)
    }

    fn scan_decimal(&mut self, start: Start) -> LexResult<TokenKind> {
        let mut floating = false;
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        // `1.` and `1.5` are floating literals; `1..` and `1.foo` are not.
        let fraction_follows = match self.cursor.peek_nth(1) {
            Some('.') => false,
            Some('e' | 'E' | 'f' | 'F' | 'd' | 'D') => true,
            Some(c) => !is_ident_start(c),
            None => true,
        };
        if self.cursor.peek() == Some('.') && fraction_follows {
            floating = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }

        if self.cursor.check(|c| c == 'e' || c == 'E') {
            floating = true;
            self.cursor.advance();
            if !self.cursor.eat('+') {
                self.cursor.eat('-');
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_').is_empty() {
                return Err(self.invalid_number(start, "malformed exponent"));
            }
        }

        Ok(match self.cursor.peek() {
            Some('f' | 'F') => {
                self.cursor.advance();
                TokenKind::FloatLiteral
            }
            Some('d' | 'D') => {
                self.cursor.advance();
                TokenKind::DoubleLiteral
            }
            _ if floating => TokenKind::DoubleLiteral,
            _ => self.integer_suffix(),
        })
    }

    fn integer_suffix(&mut self) -> TokenKind {
        if self.cursor.eat('l') || self.cursor.eat('L') {
            TokenKind::LongLiteral
        } else {
            TokenKind::IntLiteral
        }
    }

    fn invalid_number(&self, start: Start, detail: impl Into<String>) -> LexError {
        LexError::InvalidNumber {
            span: self.span_from(start),
            detail: detail.into(),
        }
    }

    // =========================================
    // Scanning: Operators and punctuation
    // =========================================

    fn scan_operator(&mut self, start: Start) -> LexResult<Token<'ast>> {
        use TokenKind::*;

        let Some(ch) = self.cursor.advance() else {
            return Ok(self.make_token(Eof, start));
        };

        let kind = match ch {
            '(' => LeftParen,
            ')' => RightParen,
            '{' => LeftBrace,
            '}' => RightBrace,
            '[' => LeftBracket,
            ']' => RightBracket,
            ';' => Semicolon,
            ',' => Comma,
            '@' => At,
            '?' => Question,
            '~' => Tilde,
            '.' => {
                if self.cursor.check_str("..") {
                    self.cursor.advance();
                    self.cursor.advance();
                    Ellipsis
                } else {
                    Dot
                }
            }
            ':' => self.pick(':', ColonColon, Colon),
            '=' => self.pick('=', EqualEqual, Equal),
            '!' => self.pick('=', BangEqual, Bang),
            '*' => self.pick('=', StarEqual, Star),
            '/' => self.pick('=', SlashEqual, Slash),
            '%' => self.pick('=', PercentEqual, Percent),
            '^' => self.pick('=', CaretEqual, Caret),
            '+' => {
                if self.cursor.eat('+') {
                    PlusPlus
                } else {
                    self.pick('=', PlusEqual, Plus)
                }
            }
            '-' => {
                if self.cursor.eat('-') {
                    MinusMinus
                } else if self.cursor.eat('>') {
                    Arrow
                } else {
                    self.pick('=', MinusEqual, Minus)
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    AmpAmp
                } else {
                    self.pick('=', AmpEqual, Amp)
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    PipePipe
                } else {
                    self.pick('=', PipeEqual, Pipe)
                }
            }
            '<' => {
                if self.cursor.eat('<') {
                    self.pick('=', LessLessEqual, LessLess)
                } else {
                    self.pick('=', LessEqual, Less)
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    if self.cursor.eat('>') {
                        self.pick('=', GreaterGreaterGreaterEqual, GreaterGreaterGreater)
                    } else {
                        self.pick('=', GreaterGreaterEqual, GreaterGreater)
                    }
                } else {
                    self.pick('=', GreaterEqual, Greater)
                }
            }
            other => {
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    span: self.span_from(start),
                });
            }
        };

        Ok(self.make_token(kind, start))
    }

    /// Consume `next` and return `matched`, or return `otherwise`.
    fn pick(&mut self, next: char, matched: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.cursor.eat(next) { matched } else { otherwise }
    }
}

impl<'ast> Iterator for Lexer<'_, 'ast> {
    type Item = Result<Token<'ast>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.scan_token();
        if !matches!(&result, Ok(token) if token.kind != TokenKind::Eof) {
            self.finished = true;
        }
        Some(result)
    }
}

#[derive(Clone, Copy)]
struct Start {
    line: u32,
    col: u32,
    offset: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        Lexer::new(source, &arena)
            .map(|t| t.unwrap().kind)
            .collect()
    }

    fn lex_error(source: &str) -> LexError {
        let arena = Bump::new();
        Lexer::new(source, &arena)
            .find_map(Result::err)
            .expect("expected a lexical error")
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("public static int $x_1 instanceof"),
            vec![Public, Static, Int, Identifier, InstanceOf, Eof]
        );
    }

    #[test]
    fn maximal_munch_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds(">>>= >>= >> > ++ += + -> -- && &= ::"),
            vec![
                GreaterGreaterGreaterEqual,
                GreaterGreaterEqual,
                GreaterGreater,
                Greater,
                PlusPlus,
                PlusEqual,
                Plus,
                Arrow,
                MinusMinus,
                AmpAmp,
                AmpEqual,
                ColonColon,
                Eof
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("42 42L 0x2A 0b1010 017 1.5 1.5f .5 1e10 2d 3F 1_000"),
            vec![
                IntLiteral,
                LongLiteral,
                IntLiteral,
                IntLiteral,
                IntLiteral,
                DoubleLiteral,
                FloatLiteral,
                DoubleLiteral,
                DoubleLiteral,
                DoubleLiteral,
                FloatLiteral,
                IntLiteral,
                Eof
            ]
        );
    }

    #[test]
    fn member_access_on_integer_is_not_a_float() {
        use TokenKind::*;
        assert_eq!(kinds("a[1].b"), vec![Identifier, LeftBracket, IntLiteral, RightBracket, Dot, Identifier, Eof]);
        assert_eq!(kinds("1.0.x"), vec![DoubleLiteral, Dot, Identifier, Eof]);
    }

    #[test]
    fn comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(
            kinds("a // line\n /* block\n */ b"),
            vec![Identifier, Identifier, Eof]
        );
    }

    #[test]
    fn token_positions() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new("x\n  = \"s\";", &arena)
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[1].span, Span::new(2, 3, 1));
        assert_eq!(tokens[2].lexeme, "\"s\"");
        assert_eq!(tokens[2].span, Span::new(2, 5, 3));
    }

    #[test]
    fn char_and_string_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"'a' '\n' 'A' "x\ty""#),
            vec![CharLiteral, CharLiteral, CharLiteral, StringLiteral, Eof]
        );
    }

    #[test]
    fn lexical_errors() {
        assert!(matches!(lex_error("\"abc"), LexError::UnterminatedString { .. }));
        assert!(matches!(lex_error("'ab'"), LexError::InvalidCharLiteral { .. }));
        assert!(matches!(lex_error("''"), LexError::InvalidCharLiteral { .. }));
        assert!(matches!(lex_error("/* open"), LexError::UnterminatedComment { .. }));
        assert!(matches!(lex_error("x # y"), LexError::UnexpectedChar { ch: '#', .. }));
        assert!(matches!(lex_error("123abc"), LexError::InvalidNumber { .. }));
        assert!(matches!(lex_error("09"), LexError::InvalidNumber { .. }));
        assert!(matches!(lex_error("1e"), LexError::InvalidNumber { .. }));

        let err = lex_error(r#"  "a\qb""#);
        assert!(matches!(err, LexError::InvalidEscape { .. }));
        assert_eq!(err.span(), Span::new(1, 5, 2));
    }

    #[test]
    fn stream_ends_after_error() {
        let arena = Bump::new();
        let results: Vec<_> = Lexer::new("a # b", &arena).collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }

    #[test]
    fn rewind_is_deterministic() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("int x = 0x10 + y;", &arena);
        let first: Vec<_> = lexer.by_ref().collect();
        lexer.rewind();
        let second: Vec<_> = lexer.collect();
        assert_eq!(first, second);
    }
}
