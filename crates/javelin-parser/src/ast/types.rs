//! Type expressions as written in source.
//!
//! Type arguments (`List<String>`) are parsed but not kept: the compiler
//! works on erased types.

use javelin_core::{PrimitiveType, Span};

use super::Ident;

/// A type as written in source, e.g. `int`, `java.lang.String[]`, `void`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub base: TypeBase<'ast>,
    /// Number of trailing `[]` pairs.
    pub dims: u8,
    pub span: Span,
}

/// The element part of a [`TypeExpr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeBase<'ast> {
    Void,
    Primitive(PrimitiveType),
    /// A simple or qualified class name.
    Named(&'ast [Ident<'ast>]),
}

impl<'ast> TypeExpr<'ast> {
    pub fn is_void(&self) -> bool {
        matches!(self.base, TypeBase::Void) && self.dims == 0
    }

    /// The same type with `extra` more array dimensions.
    pub fn with_extra_dims(self, extra: u8) -> Self {
        Self {
            dims: self.dims + extra,
            ..self
        }
    }

    /// Dotted spelling of a named base, e.g. `java.util.List`.
    pub fn name(&self) -> Option<String> {
        match self.base {
            TypeBase::Named(parts) => Some(super::dotted(parts)),
            _ => None,
        }
    }
}
