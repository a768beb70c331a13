//! Configuration for the facade compilers.

use javelin_core::JavaType;

/// How the facade wraps expressions, scripts and class bodies into a class.
///
/// Built with chained setters:
///
/// ```
/// use javelin::CompilerOptions;
///
/// let options = CompilerOptions::new()
///     .class_name("demo.Calc")
///     .method_name("run")
///     .default_import("java.io.*")
///     .debug_info(true);
/// assert_eq!(options.simple_class_name(), "Calc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Dotted binary name of the generated class.
    pub class_name: String,
    /// Name of the generated method of expression and script compilers.
    pub method_name: String,
    /// Whether the generated method is `static`.
    pub is_static: bool,
    /// Dotted binary name of the superclass; `java.lang.Object` when unset.
    pub superclass: Option<String>,
    /// Dotted binary names of implemented interfaces.
    pub interfaces: Vec<String>,
    /// Imports as written after `import`, e.g. `java.io.*` or
    /// `static java.lang.Math.max`.
    pub default_imports: Vec<String>,
    /// Logical source name used in diagnostics and the `SourceFile`
    /// attribute.
    pub source_name: String,
    /// Emit line numbers and the source file name.
    pub debug_info: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            class_name: "SC".to_string(),
            method_name: "eval".to_string(),
            is_static: true,
            superclass: None,
            interfaces: Vec::new(),
            default_imports: Vec::new(),
            source_name: "<script>".to_string(),
            debug_info: false,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self
    }

    pub fn method_name(mut self, name: impl Into<String>) -> Self {
        self.method_name = name.into();
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn default_import(mut self, import: impl Into<String>) -> Self {
        self.default_imports.push(import.into());
        self
    }

    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn debug_info(mut self, enabled: bool) -> Self {
        self.debug_info = enabled;
        self
    }

    /// Package part of the class name; empty for the default package.
    pub fn package(&self) -> &str {
        self.class_name.rsplit_once('.').map_or("", |(package, _)| package)
    }

    pub fn simple_class_name(&self) -> &str {
        self.class_name.rsplit_once('.').map_or(self.class_name.as_str(), |(_, name)| name)
    }
}

/// Parameters, return type and thrown exceptions of a generated method.
///
/// ```
/// use javelin::{JavaType, MethodSignature};
///
/// let signature = MethodSignature::new()
///     .param("a", JavaType::INT)
///     .param("b", JavaType::INT)
///     .returns(JavaType::INT);
/// assert_eq!(signature.param_names().collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSignature {
    pub params: Vec<(String, JavaType)>,
    /// `None` uses the compiler's default: `Object` for expressions,
    /// `void` for scripts.
    pub return_type: Option<JavaType>,
    /// Dotted binary names of declared checked exceptions.
    pub throws: Vec<String>,
}

impl MethodSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, ty: JavaType) -> Self {
        self.params.push((name.into(), ty));
        self
    }

    pub fn returns(mut self, ty: JavaType) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn throws(mut self, exception: impl Into<String>) -> Self {
        self.throws.push(exception.into());
        self
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(name, _)| name.as_str())
    }
}
