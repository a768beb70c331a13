//! Token types and definitions for the lexer.

use std::fmt;

use javelin_core::Span;

/// A token from the source code.
///
/// The `'ast` lifetime refers to the arena where the lexeme is allocated, so
/// the source string can be dropped once scanning is done.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    /// The type of token.
    pub kind: TokenKind,
    /// The raw source text of this token.
    pub lexeme: &'ast str,
    /// Location in source.
    pub span: Span,
}

impl<'ast> Token<'ast> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// Split a token starting with `>` into a single `>` and the remainder.
    ///
    /// Used by the parser to close type argument lists written as `>>`,
    /// `>>>`, `>=`, `>>=` or `>>>=`.
    pub fn split_leading_gt(&self) -> Option<(Token<'ast>, Token<'ast>)> {
        let rest_kind = match self.kind {
            TokenKind::GreaterGreater => TokenKind::Greater,
            TokenKind::GreaterGreaterGreater => TokenKind::GreaterGreater,
            TokenKind::GreaterEqual => TokenKind::Equal,
            TokenKind::GreaterGreaterEqual => TokenKind::GreaterEqual,
            TokenKind::GreaterGreaterGreaterEqual => TokenKind::GreaterGreaterEqual,
            _ => return None,
        };
        let Span { line, col, len } = self.span;
        let first = Token::new(TokenKind::Greater, &self.lexeme[..1], Span::new(line, col, 1));
        let rest = Token::new(rest_kind, &self.lexeme[1..], Span::new(line, col + 1, len - 1));
        Some((first, rest))
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            _ => f.write_str(self.lexeme),
        }
    }
}

/// All token types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`, `0x2A`, `052`, `0b101010`
    IntLiteral,
    /// `42L`
    LongLiteral,
    /// `1.5f`
    FloatLiteral,
    /// `1.5`, `1e10`, `2d`
    DoubleLiteral,
    /// `'a'`, `'\n'`
    CharLiteral,
    /// `"text"`
    StringLiteral,

    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Abstract,
    Assert,
    Boolean,
    Break,
    Byte,
    Case,
    Catch,
    Char,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extends,
    Final,
    Finally,
    Float,
    For,
    Goto,
    If,
    Implements,
    Import,
    InstanceOf,
    Int,
    Interface,
    Long,
    Native,
    New,
    Package,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Static,
    Strictfp,
    Super,
    Switch,
    Synchronized,
    This,
    Throw,
    Throws,
    Transient,
    Try,
    Void,
    Volatile,
    While,
    True,
    False,
    Null,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    Ellipsis,
    At,
    Question,
    Colon,
    Arrow,
    ColonColon,

    // =========================================
    // Operators
    // =========================================
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Tilde,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Pipe,
    Caret,
    Percent,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    PercentEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,

    // =========================================
    // Special
    // =========================================
    /// End of input.
    Eof,
    /// Stands in for a token the lexer rejected.
    Error,
}

impl TokenKind {
    /// Whether this token is a literal value.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::FloatLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Whether this token is one of the eight primitive type keywords.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Short
                | TokenKind::Char
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
        )
    }

    /// Whether this token is a declaration modifier.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::Native
                | TokenKind::Synchronized
                | TokenKind::Transient
                | TokenKind::Volatile
                | TokenKind::Strictfp
        )
    }

    /// Fixed spelling of keyword and punctuation tokens, used in
    /// "expected" messages.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral | LongLiteral => "integer literal",
            FloatLiteral | DoubleLiteral => "floating-point literal",
            CharLiteral => "character literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Abstract => "abstract",
            Assert => "assert",
            Boolean => "boolean",
            Break => "break",
            Byte => "byte",
            Case => "case",
            Catch => "catch",
            Char => "char",
            Class => "class",
            Const => "const",
            Continue => "continue",
            Default => "default",
            Do => "do",
            Double => "double",
            Else => "else",
            Enum => "enum",
            Extends => "extends",
            Final => "final",
            Finally => "finally",
            Float => "float",
            For => "for",
            Goto => "goto",
            If => "if",
            Implements => "implements",
            Import => "import",
            InstanceOf => "instanceof",
            Int => "int",
            Interface => "interface",
            Long => "long",
            Native => "native",
            New => "new",
            Package => "package",
            Private => "private",
            Protected => "protected",
            Public => "public",
            Return => "return",
            Short => "short",
            Static => "static",
            Strictfp => "strictfp",
            Super => "super",
            Switch => "switch",
            Synchronized => "synchronized",
            This => "this",
            Throw => "throw",
            Throws => "throws",
            Transient => "transient",
            Try => "try",
            Void => "void",
            Volatile => "volatile",
            While => "while",
            True => "true",
            False => "false",
            Null => "null",
            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",
            LeftBracket => "[",
            RightBracket => "]",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Ellipsis => "...",
            At => "@",
            Question => "?",
            Colon => ":",
            Arrow => "->",
            ColonColon => "::",
            Equal => "=",
            EqualEqual => "==",
            Bang => "!",
            BangEqual => "!=",
            Tilde => "~",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            AmpAmp => "&&",
            PipePipe => "||",
            PlusPlus => "++",
            MinusMinus => "--",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Percent => "%",
            LessLess => "<<",
            GreaterGreater => ">>",
            GreaterGreaterGreater => ">>>",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            AmpEqual => "&=",
            PipeEqual => "|=",
            CaretEqual => "^=",
            PercentEqual => "%=",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            GreaterGreaterGreaterEqual => ">>>=",
            Eof => "end of input",
            Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up a keyword by its spelling.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "abstract" => Abstract,
        "assert" => Assert,
        "boolean" => Boolean,
        "break" => Break,
        "byte" => Byte,
        "case" => Case,
        "catch" => Catch,
        "char" => Char,
        "class" => Class,
        "const" => Const,
        "continue" => Continue,
        "default" => Default,
        "do" => Do,
        "double" => Double,
        "else" => Else,
        "enum" => Enum,
        "extends" => Extends,
        "final" => Final,
        "finally" => Finally,
        "float" => Float,
        "for" => For,
        "goto" => Goto,
        "if" => If,
        "implements" => Implements,
        "import" => Import,
        "instanceof" => InstanceOf,
        "int" => Int,
        "interface" => Interface,
        "long" => Long,
        "native" => Native,
        "new" => New,
        "package" => Package,
        "private" => Private,
        "protected" => Protected,
        "public" => Public,
        "return" => Return,
        "short" => Short,
        "static" => Static,
        "strictfp" => Strictfp,
        "super" => Super,
        "switch" => Switch,
        "synchronized" => Synchronized,
        "this" => This,
        "throw" => Throw,
        "throws" => Throws,
        "transient" => Transient,
        "try" => Try,
        "void" => Void,
        "volatile" => Volatile,
        "while" => While,
        "true" => True,
        "false" => False,
        "null" => Null,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(lookup_keyword("instanceof"), Some(TokenKind::InstanceOf));
        assert_eq!(lookup_keyword("null"), Some(TokenKind::Null));
        assert_eq!(lookup_keyword("String"), None);
        assert_eq!(lookup_keyword("var"), None);
    }

    #[test]
    fn split_shift_tokens() {
        let token = Token::new(TokenKind::GreaterGreaterGreater, ">>>", Span::new(1, 10, 3));
        let (first, rest) = token.split_leading_gt().unwrap();
        assert_eq!(first.kind, TokenKind::Greater);
        assert_eq!(first.span, Span::new(1, 10, 1));
        assert_eq!(rest.kind, TokenKind::GreaterGreater);
        assert_eq!(rest.lexeme, ">>");
        assert_eq!(rest.span, Span::new(1, 11, 2));

        let plain = Token::new(TokenKind::Greater, ">", Span::new(1, 1, 1));
        assert!(plain.split_leading_gt().is_none());
    }

    #[test]
    fn classification() {
        assert!(TokenKind::Double.is_primitive_type());
        assert!(!TokenKind::Void.is_primitive_type());
        assert!(TokenKind::Null.is_literal());
        assert!(TokenKind::Transient.is_modifier());
    }
}
