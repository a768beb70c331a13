//! Javelin: an embeddable compiler from a Java subset to JVM class files.
//!
//! The pipeline runs entirely in-process:
//!
//! - [`javelin_parser`]: scanner, AST and recursive-descent parser
//! - [`javelin_compiler`]: resolver, flow analysis and bytecode generation
//! - this crate: [`Compiler`] and the wrapping compilers for expressions,
//!   scripts and class bodies, plus [`guess_parameter_names`]
//!
//! # Example
//!
//! ```
//! use javelin::prelude::*;
//!
//! let compiler = Compiler::with_builtins().with_options(CompilerOptions::new().class_name("demo.Area"));
//! let signature = MethodSignature::new()
//!     .param("r", JavaType::DOUBLE)
//!     .returns(JavaType::DOUBLE);
//! let unit = compiler.compile_expression("Math.PI * r * r", &signature).unwrap();
//! let class = unit.class("demo.Area").unwrap();
//! assert_eq!(&class.bytes[..4], &[0xca, 0xfe, 0xba, 0xbe]);
//! ```

mod compiler;
mod guess;
mod options;
mod synth;

pub use compiler::{ClassBodyCompiler, CompileResult, Compiler, ExpressionCompiler, ScriptCompiler};
pub use guess::guess_parameter_names;
pub use options::{CompilerOptions, MethodSignature};

pub use javelin_compiler::{ClassFileBytes, CompiledUnit, ImportSpec};
pub use javelin_core::{
    AccessFlags, ClassPath, ClassShape, ClassShapeBuilder, CompilationError, ConstValue, Diagnostic, ErrorKind,
    JavaType, JavelinError, PrimitiveType, Span, TypeLookup,
};

pub mod prelude {
    pub use crate::compiler::{ClassBodyCompiler, CompileResult, Compiler, ExpressionCompiler, ScriptCompiler};
    pub use crate::guess::guess_parameter_names;
    pub use crate::options::{CompilerOptions, MethodSignature};
    pub use javelin_compiler::{ClassFileBytes, CompiledUnit};
    pub use javelin_core::{ClassPath, ClassShapeBuilder, Diagnostic, JavaType, TypeLookup};
}
