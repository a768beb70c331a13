//! Core types shared by every stage of the javelin compiler.
//!
//! - [`Span`]: source locations attached to tokens, nodes and diagnostics
//! - [`JavaType`], [`PrimitiveType`], [`MethodDescriptor`]: resolved types
//! - [`ConstValue`]: compile-time constants
//! - [`ClassShape`] and [`TypeLookup`]: what the compiler knows about
//!   classes outside the unit being compiled
//! - [`JavelinError`] and friends: the error taxonomy

mod builtins;
pub mod constant;
pub mod error;
pub mod lookup;
pub mod shape;
pub mod span;
pub mod types;

pub use constant::ConstValue;
pub use error::{
    CompilationError, Diagnostic, ErrorKind, JavelinError, LexError, ParseError, ParseErrorKind,
};
pub use lookup::{ClassPath, TypeLookup};
pub use shape::{AccessFlags, ClassShape, ClassShapeBuilder, FieldShape, MethodShape};
pub use span::Span;
pub use types::{DescriptorError, JavaType, MethodDescriptor, PrimitiveType};
