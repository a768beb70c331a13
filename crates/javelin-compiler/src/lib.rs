//! Javelin Compiler
//!
//! Semantic analysis and class file generation for parsed Java units.
//!
//! ## Architecture
//!
//! - **Resolve**: declare class shapes, bind names, pick overloads, fold
//!   constants and record everything in a [`ResolvedFacts`] side table,
//!   then run flow analysis (reachability, definite assignment, checked
//!   exceptions) over every body
//! - **Emit**: lower each body to JVM instructions and serialize one class
//!   file per declared type
//!
//! ## Modules
//!
//! - [`bytecode`]: opcodes, constant pool, code buffers, class writer
//! - [`const_eval`]: constant folding
//! - [`context`]: class table over the unit and the external lookup
//! - [`conversion`]: conversion contexts
//! - [`emit`]: bytecode generation
//! - [`overload`]: most specific method selection
//! - [`resolve`]: name binding and type checking
//! - [`scope`]: block-structured local scopes

pub mod bytecode;
pub mod const_eval;
pub mod context;
pub mod conversion;
pub mod emit;
mod flow;
pub mod overload;
pub mod resolve;
pub mod scope;

pub use context::ClassTable;
pub use conversion::Conversion;
pub use emit::{ClassFileBytes, GenerateOptions, generate_unit};
pub use overload::{OverloadMatch, resolve_overload};
pub use resolve::facts::{Binding, ExprFact, ResolvedFacts};
pub use resolve::imports::ImportSpec;
pub use resolve::{ResolvedClass, ResolvedUnit, resolve_unit};
pub use scope::LocalScope;

pub use javelin_core::CompilationError;

use javelin_core::TypeLookup;
use javelin_parser::ast::CompilationUnit;

/// The class files produced from one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledUnit {
    /// One class file per declared type, in declaration order.
    pub classes: Vec<ClassFileBytes>,
}

impl CompiledUnit {
    /// The class file of the type with the given dotted binary name.
    pub fn class(&self, binary_name: &str) -> Option<&ClassFileBytes> {
        self.classes.iter().find(|c| c.binary_name == binary_name)
    }
}

/// Resolve and generate a parsed compilation unit.
///
/// `default_imports` behave as if written at the top of the unit. Stops at
/// the first error.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(
    unit: &CompilationUnit<'_>,
    lookup: &dyn TypeLookup,
    default_imports: &[ImportSpec],
    options: &GenerateOptions,
) -> Result<CompiledUnit, CompilationError> {
    let resolved = resolve_unit(unit, lookup, default_imports)?;
    log::debug!(
        "resolved {} class(es), {} expression facts",
        resolved.classes.len(),
        resolved.facts.expr_count()
    );
    let classes = generate_unit(unit, &resolved, options)?;
    log::debug!("generated {} class file(s)", classes.len());
    Ok(CompiledUnit { classes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use javelin_core::ClassPath;
    use javelin_parser::Parser;

    #[test]
    fn compiles_a_unit() {
        let arena = Bump::new();
        let source = r#"
            package demo;
            public class Greeter {
                public static String greet(String name) {
                    return "Hello, " + name + "!";
                }
            }
        "#;
        let unit = Parser::new(source, &arena).compilation_unit().unwrap();
        let compiled = compile(&unit, &ClassPath::with_builtins(), &[], &GenerateOptions::default()).unwrap();
        assert_eq!(compiled.classes.len(), 1);
        let class = compiled.class("demo.Greeter").unwrap();
        assert_eq!(&class.bytes[..4], &[0xca, 0xfe, 0xba, 0xbe]);
        assert!(compiled.class("Greeter").is_none());
    }

    #[test]
    fn first_error_stops_compilation() {
        let arena = Bump::new();
        let unit = Parser::new("class A { int f() { return x; } }", &arena)
            .compilation_unit()
            .unwrap();
        let err = compile(&unit, &ClassPath::with_builtins(), &[], &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, CompilationError::NameNotFound { ref name, .. } if name == "x"));
    }

    #[test]
    fn default_imports_apply() {
        let arena = Bump::new();
        let unit = Parser::new("class A { static void f() { println(\"hi\"); } }", &arena)
            .compilation_unit()
            .unwrap();
        let mut class_path = ClassPath::with_builtins();
        class_path.insert(
            javelin_core::ClassShapeBuilder::class("util.Out")
                .static_method("println", "(Ljava/lang/String;)V")
                .build()
                .unwrap(),
        );
        let imports = [ImportSpec::parse("static util.Out.*")];
        assert!(compile(&unit, &class_path, &[], &GenerateOptions::default()).is_err());
        assert!(compile(&unit, &class_path, &imports, &GenerateOptions::default()).is_ok());
    }
}
