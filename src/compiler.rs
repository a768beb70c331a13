//! The [`Compiler`] entry point and the wrapping compilers built on it.

use std::sync::Arc;

use bumpalo::Bump;
use javelin_compiler::{CompiledUnit, GenerateOptions, ImportSpec};
use javelin_core::{ClassPath, Diagnostic, JavaType, JavelinError, Span, TypeLookup};
use javelin_parser::Parser;
use javelin_parser::ast::{CompilationUnit, ExprStmt, ReturnStmt, Stmt};

use crate::options::{CompilerOptions, MethodSignature};
use crate::synth;

/// Result type of the facade: errors carry the logical source name.
pub type CompileResult<T> = Result<T, Diagnostic>;

/// Compiles Java source against a [`TypeLookup`].
///
/// Cloning is cheap; clones share the lookup. Independent compilations may
/// run on separate threads.
///
/// ```
/// use javelin::Compiler;
///
/// let compiler = Compiler::with_builtins();
/// let unit = compiler
///     .compile_unit("public class Hello { public static int answer() { return 42; } }", "Hello.java")
///     .unwrap();
/// assert_eq!(unit.classes[0].binary_name, "Hello");
/// ```
#[derive(Clone)]
pub struct Compiler {
    lookup: Arc<dyn TypeLookup>,
    options: CompilerOptions,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler").field("options", &self.options).finish_non_exhaustive()
    }
}

impl Compiler {
    pub fn new(lookup: impl TypeLookup + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
            options: CompilerOptions::default(),
        }
    }

    /// A compiler over [`ClassPath::with_builtins`].
    pub fn with_builtins() -> Self {
        Self::new(ClassPath::with_builtins())
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn lookup(&self) -> &dyn TypeLookup {
        self.lookup.as_ref()
    }

    /// Compile a whole compilation unit. `source_name` names the source in
    /// diagnostics and the `SourceFile` attribute.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_unit(&self, source: &str, source_name: &str) -> CompileResult<CompiledUnit> {
        log::debug!("compiling unit {source_name}");
        let arena = Bump::new();
        let unit = Parser::new(source, &arena)
            .compilation_unit()
            .map_err(|err| Diagnostic::new(source_name, err))?;
        self.finish(&unit, source_name)
    }

    /// Compile an expression into a method returning its value.
    pub fn compile_expression(&self, source: &str, signature: &MethodSignature) -> CompileResult<CompiledUnit> {
        ExpressionCompiler::new(self.clone()).compile(source, signature)
    }

    /// Compile block statements into a method body.
    pub fn compile_script(&self, source: &str, signature: &MethodSignature) -> CompileResult<CompiledUnit> {
        ScriptCompiler::new(self.clone()).compile(source, signature)
    }

    /// Compile class body members into a class.
    pub fn compile_class_body(&self, source: &str) -> CompileResult<CompiledUnit> {
        ClassBodyCompiler::new(self.clone()).compile(source)
    }

    fn default_imports(&self) -> Vec<ImportSpec> {
        self.options
            .default_imports
            .iter()
            .map(|import| ImportSpec::parse(import))
            .collect()
    }

    fn finish(&self, unit: &CompilationUnit<'_>, source_name: &str) -> CompileResult<CompiledUnit> {
        let generate = GenerateOptions {
            debug_info: self.options.debug_info,
            source_file: Some(file_name(source_name).to_string()),
        };
        javelin_compiler::compile(unit, self.lookup(), &self.default_imports(), &generate)
            .map_err(|err| Diagnostic::new(source_name, err))
    }

    /// Parse `source` with `wrapper` and compile the unit it builds.
    fn compile_wrapped<P: WrapSource>(&self, source: &str, wrapper: &P) -> CompileResult<CompiledUnit> {
        let source_name = &self.options.source_name;
        let arena = Bump::new();
        let mut parser = Parser::new(source, &arena);
        let unit = wrapper
            .parse(&mut parser, &self.options)
            .map_err(|err| Diagnostic::new(source_name, err))?;
        self.finish(&unit, source_name)
    }
}

/// Parses user code that is not a compilation unit and wraps it into one.
trait WrapSource {
    fn parse<'ast>(
        &self,
        parser: &mut Parser<'_, 'ast>,
        options: &CompilerOptions,
    ) -> Result<CompilationUnit<'ast>, JavelinError>;
}

/// The last path component of a source name.
fn file_name(source_name: &str) -> &str {
    source_name.rsplit(['/', '\\']).next().unwrap_or(source_name)
}

/// Compiles an expression into `eval(params)` of a generated class.
///
/// The method returns the value of the expression converted to the return
/// type, `Object` by default with boxing of primitives. A `void` return
/// type makes the expression a statement.
///
/// ```
/// use javelin::{Compiler, ExpressionCompiler, JavaType, MethodSignature};
///
/// let compiler = ExpressionCompiler::new(Compiler::with_builtins());
/// let signature = MethodSignature::new()
///     .param("a", JavaType::INT)
///     .param("b", JavaType::INT)
///     .returns(JavaType::INT);
/// let unit = compiler.compile("a * b + 1", &signature).unwrap();
/// assert_eq!(unit.classes[0].binary_name, "SC");
/// ```
#[derive(Debug, Clone)]
pub struct ExpressionCompiler {
    compiler: Compiler,
}

impl ExpressionCompiler {
    pub fn new(compiler: Compiler) -> Self {
        Self { compiler }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, source: &str, signature: &MethodSignature) -> CompileResult<CompiledUnit> {
        self.compiler.compile_wrapped(source, &ExpressionBody(signature))
    }
}

struct ExpressionBody<'s>(&'s MethodSignature);

impl WrapSource for ExpressionBody<'_> {
    fn parse<'ast>(
        &self,
        parser: &mut Parser<'_, 'ast>,
        options: &CompilerOptions,
    ) -> Result<CompilationUnit<'ast>, JavelinError> {
        let signature = self.0;
        let return_type = signature.return_type.clone().unwrap_or_else(JavaType::object);
        let imports = parser.imports()?;
        let expr = parser.expression()?;
        let span = expr.span();
        let arena = parser.arena();
        let stmt = if return_type.is_void() {
            Stmt::Expr(arena.alloc(ExprStmt { expr, span }))
        } else {
            Stmt::Return(arena.alloc(ReturnStmt { value: Some(expr), span }))
        };
        let stmts = arena.alloc_slice_copy(&[stmt]);
        let method = synth::method(parser, options, signature, &return_type, stmts, span)?;
        let members = arena.alloc_slice_copy(&[method]);
        Ok(synth::unit(parser, options, imports, members, Span::point(1, 1)))
    }
}

/// Compiles block statements into the body of `eval(params)`.
///
/// The return type defaults to `void`; with a value type every path must
/// end in `return`.
#[derive(Debug, Clone)]
pub struct ScriptCompiler {
    compiler: Compiler,
}

impl ScriptCompiler {
    pub fn new(compiler: Compiler) -> Self {
        Self { compiler }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, source: &str, signature: &MethodSignature) -> CompileResult<CompiledUnit> {
        self.compiler.compile_wrapped(source, &ScriptBody(signature))
    }
}

struct ScriptBody<'s>(&'s MethodSignature);

impl WrapSource for ScriptBody<'_> {
    fn parse<'ast>(
        &self,
        parser: &mut Parser<'_, 'ast>,
        options: &CompilerOptions,
    ) -> Result<CompilationUnit<'ast>, JavelinError> {
        let signature = self.0;
        let return_type = signature.return_type.clone().unwrap_or(JavaType::Void);
        let imports = parser.imports()?;
        let stmts = parser.block_statements()?;
        let span = stmts.first().map_or(Span::point(1, 1), |s| s.span());
        let method = synth::method(parser, options, signature, &return_type, stmts, span)?;
        let members = parser.arena().alloc_slice_copy(&[method]);
        Ok(synth::unit(parser, options, imports, members, Span::point(1, 1)))
    }
}

/// Compiles the members of one class body into the class named by the
/// options.
#[derive(Debug, Clone)]
pub struct ClassBodyCompiler {
    compiler: Compiler,
}

impl ClassBodyCompiler {
    pub fn new(compiler: Compiler) -> Self {
        Self { compiler }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, source: &str) -> CompileResult<CompiledUnit> {
        self.compiler.compile_wrapped(source, &ClassBody)
    }
}

struct ClassBody;

impl WrapSource for ClassBody {
    fn parse<'ast>(
        &self,
        parser: &mut Parser<'_, 'ast>,
        options: &CompilerOptions,
    ) -> Result<CompilationUnit<'ast>, JavelinError> {
        let imports = parser.imports()?;
        let members = parser.class_body(options.simple_class_name())?;
        Ok(synth::unit(parser, options, imports, members, Span::point(1, 1)))
    }
}
