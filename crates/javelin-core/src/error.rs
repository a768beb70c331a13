//! Unified error types for the compiler.
//!
//! Every phase has its own error type, and all of them carry the [`Span`]
//! of the offending source text.
//!
//! ## Error Hierarchy
//!
//! ```text
//! JavelinError (top-level wrapper)
//! ├── LexError          - malformed tokens
//! ├── ParseError        - grammar violations (with ParseErrorKind)
//! └── CompilationError  - name resolution, typing, flow analysis,
//!                         code size limits and internal invariants
//! ```
//!
//! [`JavelinError::kind`] maps every error onto the coarse [`ErrorKind`]
//! taxonomy that hosts usually branch on. The pipeline is fail-fast: a
//! compilation reports exactly one error.

use std::fmt;

use thiserror::Error;

use crate::Span;

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed token.
    Lexical,
    /// A grammar violation.
    Syntax,
    /// An identifier that names nothing, or more than one thing.
    NameResolution,
    /// Incompatible types or a failed overload resolution.
    Type,
    /// Unreachable code, missing return, use before assignment or an
    /// undeclared checked exception.
    FlowAnalysis,
    /// Generated code exceeds a class file limit.
    CodeSize,
    /// A bug in the compiler rather than in its input.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::NameResolution => "name resolution error",
            ErrorKind::Type => "type error",
            ErrorKind::FlowAnalysis => "flow analysis error",
            ErrorKind::CodeSize => "code size error",
            ErrorKind::Internal => "internal compiler error",
        })
    }
}

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated character literal at {span}")]
    UnterminatedChar { span: Span },

    /// Character literals must hold exactly one UTF-16 code unit.
    #[error("invalid character literal at {span}")]
    InvalidCharLiteral { span: Span },

    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("invalid escape sequence at {span}: {detail}")]
    InvalidEscape { span: Span, detail: String },

    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedChar { span }
            | LexError::InvalidCharLiteral { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// A token that cannot start or continue the current production.
    UnexpectedToken,
    /// Input ended in the middle of a production.
    UnexpectedEof,
    ExpectedExpression,
    ExpectedType,
    ExpectedStatement,
    ExpectedIdentifier,
    ExpectedDeclaration,
    /// A modifier that is repeated or not allowed here.
    InvalidModifier,
    /// A numeric literal out of range for its type.
    InvalidLiteral,
    /// An expression used as a statement that cannot be one.
    NotAStatement,
    /// Valid source-language syntax outside the supported subset.
    Unsupported,
    /// Expressions or statements nested past the parser's limit.
    TooDeeplyNested,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::InvalidModifier => "invalid modifier",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::NotAStatement => "not a statement",
            ParseErrorKind::Unsupported => "unsupported construct",
            ParseErrorKind::TooDeeplyNested => "nesting too deep",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// `Unexpected token "<token>"`.
    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("Unexpected token \"{token}\""),
        )
    }

    /// Create an "expected X, found Y" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("{expected} expected instead of \"{found}\""),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            "Unexpected end of input",
        )
    }

    pub fn unsupported(span: Span, what: &str) -> Self {
        Self::new(
            ParseErrorKind::Unsupported,
            span,
            format!("{what} are not supported"),
        )
    }

    /// Format the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!(
            "Error at {}:{}: {}\n  {}\n",
            self.span.line, self.span.col, self.kind, self.message
        );

        if let Some(line_text) = source.lines().nth((self.span.line as usize).saturating_sub(1)) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", self.span.line, line_text));
            let indent = " ".repeat((self.span.col as usize).saturating_sub(1));
            let pointer = "^".to_string() + &"~".repeat((self.span.len as usize).saturating_sub(1));
            output.push_str(&format!("  | {indent}{pointer}\n"));
        }

        output
    }
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that occur during resolution, flow analysis and code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// An identifier that names no variable, field or type in scope.
    #[error("at {span}: cannot find symbol '{name}'")]
    NameNotFound { name: String, span: Span },

    /// A type name that could not be resolved.
    #[error("at {span}: unknown type '{name}'")]
    TypeNotFound { name: String, span: Span },

    /// A simple name that denotes more than one declaration.
    #[error("at {span}: reference to '{name}' is ambiguous: {candidates}")]
    AmbiguousName {
        name: String,
        candidates: String,
        span: Span,
    },

    #[error("at {span}: duplicate definition of '{name}'")]
    DuplicateDefinition { name: String, span: Span },

    /// A value that is not assignable to the required type.
    #[error("at {span}: incompatible types: {from} cannot be converted to {to}")]
    IncompatibleTypes { from: String, to: String, span: Span },

    /// Operand types that an operator or construct does not accept.
    #[error("at {span}: {message}")]
    InvalidOperation { message: String, span: Span },

    #[error("at {span}: no applicable method '{name}({args})'")]
    NoApplicableMethod {
        name: String,
        args: String,
        span: Span,
    },

    #[error("at {span}: ambiguous invocation of '{name}': {candidates}")]
    AmbiguousInvocation {
        name: String,
        candidates: String,
        span: Span,
    },

    #[error("at {span}: expression is not assignable")]
    NotAnLvalue { span: Span },

    #[error("at {span}: cannot assign a value to final variable '{name}'")]
    FinalAssignment { name: String, span: Span },

    #[error("at {span}: constant expression required")]
    NotConstant { span: Span },

    #[error("at {span}: duplicate case label {label}")]
    DuplicateCaseLabel { label: String, span: Span },

    /// `break` or `continue` without a matching target.
    #[error("at {span}: {message}")]
    InvalidJump { message: String, span: Span },

    #[error("at {span}: unreachable statement")]
    UnreachableCode { span: Span },

    #[error("at {span}: method '{method}' can complete without returning a value")]
    MissingReturn { method: String, span: Span },

    #[error("at {span}: variable '{name}' might not have been assigned")]
    UseBeforeAssignment { name: String, span: Span },

    #[error("at {span}: unreported exception {exception}; must be caught or declared to be thrown")]
    UndeclaredException { exception: String, span: Span },

    /// Generated code exceeds a limit of the class file format.
    #[error("at {span}: {what} exceeds the class file limit of {limit}")]
    CodeTooLarge { what: String, limit: u32, span: Span },

    /// A broken compiler invariant. Never caused by user input alone.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CompilationError {
    /// Create an internal invariant violation, logging it at error level.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("internal compiler error: {message}");
        CompilationError::Internal { message }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompilationError::NameNotFound { .. }
            | CompilationError::TypeNotFound { .. }
            | CompilationError::AmbiguousName { .. }
            | CompilationError::DuplicateDefinition { .. } => ErrorKind::NameResolution,
            CompilationError::IncompatibleTypes { .. }
            | CompilationError::InvalidOperation { .. }
            | CompilationError::NoApplicableMethod { .. }
            | CompilationError::AmbiguousInvocation { .. }
            | CompilationError::NotAnLvalue { .. }
            | CompilationError::FinalAssignment { .. }
            | CompilationError::NotConstant { .. }
            | CompilationError::DuplicateCaseLabel { .. } => ErrorKind::Type,
            CompilationError::InvalidJump { .. }
            | CompilationError::UnreachableCode { .. }
            | CompilationError::MissingReturn { .. }
            | CompilationError::UseBeforeAssignment { .. }
            | CompilationError::UndeclaredException { .. } => ErrorKind::FlowAnalysis,
            CompilationError::CodeTooLarge { .. } => ErrorKind::CodeSize,
            CompilationError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::NameNotFound { span, .. }
            | CompilationError::TypeNotFound { span, .. }
            | CompilationError::AmbiguousName { span, .. }
            | CompilationError::DuplicateDefinition { span, .. }
            | CompilationError::IncompatibleTypes { span, .. }
            | CompilationError::InvalidOperation { span, .. }
            | CompilationError::NoApplicableMethod { span, .. }
            | CompilationError::AmbiguousInvocation { span, .. }
            | CompilationError::NotAnLvalue { span }
            | CompilationError::FinalAssignment { span, .. }
            | CompilationError::NotConstant { span }
            | CompilationError::DuplicateCaseLabel { span, .. }
            | CompilationError::InvalidJump { span, .. }
            | CompilationError::UnreachableCode { span }
            | CompilationError::MissingReturn { span, .. }
            | CompilationError::UseBeforeAssignment { span, .. }
            | CompilationError::UndeclaredException { span, .. }
            | CompilationError::CodeTooLarge { span, .. } => *span,
            CompilationError::Internal { .. } => Span::default(),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for all compiler phases.
///
/// Each variant uses `#[from]` so phase errors convert with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JavelinError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl JavelinError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JavelinError::Lex(_) => ErrorKind::Lexical,
            JavelinError::Parse(_) => ErrorKind::Syntax,
            JavelinError::Compilation(err) => err.kind(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            JavelinError::Lex(err) => err.span(),
            JavelinError::Parse(err) => err.span,
            JavelinError::Compilation(err) => err.span(),
        }
    }

    /// Check if this is a lexer error.
    pub fn is_lex(&self) -> bool {
        matches!(self, JavelinError::Lex(_))
    }

    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, JavelinError::Parse(_))
    }

    /// Check if this is a compilation error.
    pub fn is_compilation(&self) -> bool {
        matches!(self, JavelinError::Compilation(_))
    }
}

/// An error together with the logical name of the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}: {error}")]
pub struct Diagnostic {
    pub source_name: String,
    #[source]
    pub error: JavelinError,
}

impl Diagnostic {
    pub fn new(source_name: impl Into<String>, error: impl Into<JavelinError>) -> Self {
        Self {
            source_name: source_name.into(),
            error: error.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn span(&self) -> Span {
        self.error.span()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::UnexpectedChar {
            ch: '#',
            span: Span::new(1, 5, 1),
        };
        assert_eq!(format!("{err}"), "unexpected character '#' at 1:5");
        assert_eq!(err.span(), Span::new(1, 5, 1));
    }

    #[test]
    fn unexpected_token_message() {
        let err = ParseError::unexpected_token(Span::new(1, 7, 1), "x");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.to_string(), "at 1:7: Unexpected token \"x\"");
    }

    #[test]
    fn display_with_source_points_at_token() {
        let err = ParseError::unexpected_token(Span::new(1, 7, 1), "x");
        let rendered = err.display_with_source("1 + 2 x");
        assert!(rendered.contains("  1 | 1 + 2 x"));
        assert!(rendered.contains("  |       ^"));
    }

    #[test]
    fn compilation_error_kinds() {
        let span = Span::new(2, 3, 1);
        assert_eq!(
            CompilationError::UseBeforeAssignment {
                name: "x".into(),
                span
            }
            .kind(),
            ErrorKind::FlowAnalysis
        );
        assert_eq!(
            CompilationError::AmbiguousInvocation {
                name: "f".into(),
                candidates: String::new(),
                span
            }
            .kind(),
            ErrorKind::Type
        );
        assert_eq!(
            CompilationError::NameNotFound {
                name: "y".into(),
                span
            }
            .span(),
            span
        );
        assert_eq!(
            CompilationError::internal("broken").kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn unified_error_conversion() {
        fn fails() -> Result<(), JavelinError> {
            Err(LexError::UnterminatedString {
                span: Span::new(4, 1, 3),
            })?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.is_lex());
        assert_eq!(err.kind(), ErrorKind::Lexical);
        assert_eq!(err.span(), Span::new(4, 1, 3));
    }

    #[test]
    fn diagnostic_prefixes_source_name() {
        let diag = Diagnostic::new(
            "Script.java",
            ParseError::unexpected_token(Span::new(1, 1, 1), ";"),
        );
        assert_eq!(diag.to_string(), "Script.java: at 1:1: Unexpected token \";\"");
        assert_eq!(diag.kind(), ErrorKind::Syntax);
    }
}
