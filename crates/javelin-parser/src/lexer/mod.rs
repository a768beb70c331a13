//! Lexer for the source language.
//!
//! Converts source text into a lazy, restartable stream of located tokens.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin_parser::lexer::{Lexer, TokenKind};
//!
//! let arena = Bump::new();
//! let kinds: Vec<_> = Lexer::new("x >>>= 2;", &arena)
//!     .map(|token| token.unwrap().kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Identifier,
//!         TokenKind::GreaterGreaterGreaterEqual,
//!         TokenKind::IntLiteral,
//!         TokenKind::Semicolon,
//!         TokenKind::Eof,
//!     ]
//! );
//! ```

mod cursor;
#[allow(clippy::module_inception)]
mod lexer;
pub mod literal;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind, lookup_keyword};
