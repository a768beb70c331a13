//! Parameter name guessing for expressions.

use bumpalo::Bump;
use javelin_core::JavelinError;
use javelin_parser::Parser;
use javelin_parser::ast::{NameExpr, Visitor};
use rustc_hash::FxHashSet;

struct ParameterNames {
    names: FxHashSet<String>,
}

impl<'ast> Visitor<'ast> for ParameterNames {
    fn visit_ambiguous_name(&mut self, name: &'ast NameExpr<'ast>) {
        // `System.out` or `java.lang.Math.PI` name a type somewhere.
        if name.parts.iter().any(|part| part.name.starts_with(char::is_uppercase)) {
            return;
        }
        if let Some(first) = name.parts.first() {
            self.names.insert(first.name.to_string());
        }
    }
}

/// Guess which names in an expression are parameters.
///
/// Every ambiguous name whose components all start with a lowercase
/// letter contributes its first component. Leading `import` declarations
/// are skipped and the expression must span the rest of the input. The
/// result is a heuristic: field names of the enclosing class look the same.
///
/// ```
/// use javelin::guess_parameter_names;
///
/// let names = guess_parameter_names("a.b + Foo.c").unwrap();
/// assert_eq!(names.len(), 1);
/// assert!(names.contains("a"));
/// ```
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn guess_parameter_names(source: &str) -> Result<FxHashSet<String>, JavelinError> {
    let arena = Bump::new();
    let mut parser = Parser::new(source, &arena);
    parser.imports()?;
    let expr = parser.expression()?;
    let mut collector = ParameterNames {
        names: FxHashSet::default(),
    };
    collector.visit_expr(expr);
    log::trace!("guessed parameters {:?}", collector.names);
    Ok(collector.names)
}
