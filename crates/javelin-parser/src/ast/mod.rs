//! Abstract syntax tree and parser for the supported Java subset.
//!
//! This module provides:
//! - AST node definitions for compilation units, class bodies, statements
//!   and expressions
//! - [`Parser`], a recursive-descent parser with Pratt expression parsing
//! - [`Visitor`] for read-only traversal
//!
//! All nodes are allocated in a [`bumpalo::Bump`] arena and are `Copy`.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin_parser::ast::{Member, Parser};
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
//! let unit = Parser::new(source, &arena).compilation_unit().unwrap();
//! assert_eq!(unit.types.len(), 1);
//! assert!(matches!(unit.types[0].members[1], Member::Method(_)));
//! ```

use std::fmt;

use javelin_core::Span;

pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod types;
pub mod visitor;

mod decl_parser;
mod expr_parser;
mod parser;
mod stmt_parser;
mod type_parser;

pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use parser::{MAX_NESTING, ParseResult, Parser};
pub use stmt::*;
pub use types::*;
pub use visitor::Visitor;

/// Identity of a node that later passes attach facts to.
///
/// Ids are dense and unique within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An identifier with its location.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    #[inline]
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

impl fmt::Debug for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.name, self.span)
    }
}

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Join identifiers with dots.
pub fn dotted(parts: &[Ident<'_>]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(part.name);
    }
    out
}
