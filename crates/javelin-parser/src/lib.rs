//! Javelin parser crate.
//!
//! Turns Java source text into an arena-allocated syntax tree:
//! - Lexical analysis (tokenization)
//! - Syntax tree definitions with a stable [`ast::NodeId`] per node
//! - Recursive-descent parser with entry points for whole compilation
//!   units, class bodies, block statements and single expressions
//! - Visitor for read-only traversal
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin_parser::Parser;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     public class Counter {
//!         private int count;
//!
//!         public int next() {
//!             return ++count;
//!         }
//!     }
//! "#;
//!
//! match Parser::new(source, &arena).compilation_unit() {
//!     Ok(unit) => println!("parsed {} type(s)", unit.types.len()),
//!     Err(error) => eprintln!("{error}"),
//! }
//! ```

pub mod lexer;

pub mod ast;

pub use ast::{MAX_NESTING, ParseResult, Parser, Visitor};
pub use lexer::{Lexer, Token, TokenKind};
