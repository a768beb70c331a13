use bumpalo::Bump;
use javelin_core::{AccessFlags, ClassPath, ClassShapeBuilder, CompilationError, ConstValue, ErrorKind};
use javelin_parser::Parser;
use javelin_parser::ast::{Member, Stmt};

use super::facts::Binding;
use super::imports::ImportSpec;
use super::{ResolvedUnit, resolve_unit};

fn resolve_with(source: &str, class_path: &ClassPath, imports: &[ImportSpec]) -> Result<ResolvedUnit, CompilationError> {
    let arena = Bump::new();
    let unit = Parser::new(source, &arena).compilation_unit().unwrap();
    resolve_unit(&unit, class_path, imports)
}

fn resolve(source: &str) -> Result<ResolvedUnit, CompilationError> {
    resolve_with(source, &ClassPath::with_builtins(), &[])
}

fn error(source: &str) -> CompilationError {
    resolve(source).unwrap_err()
}

/// Wrap statements into a static method of a class.
fn in_method(ret: &str, params: &str, body: &str) -> String {
    format!("class A {{ static {ret} f({params}) {{ {body} }} }}")
}

#[test]
fn resolves_a_small_class() {
    let source = r#"
        public class Point {
            private int x, y;
            public Point(int x, int y) { this.x = x; this.y = y; }
            public int dot(Point other) { return x * other.x + y * other.y; }
            public String toString() { return "(" + x + ", " + y + ")"; }
        }
    "#;
    let resolved = resolve(source).unwrap();
    assert_eq!(resolved.classes.len(), 1);
    assert_eq!(resolved.classes[0].name, "Point");
    assert!(resolved.facts.expr_count() > 0);
}

#[test]
fn most_specific_overload_wins() {
    let arena = Bump::new();
    let source = r#"
        class A {
            static void f(int a, int b) { }
            static void f(long a, long b) { }
            static void g() { f(1, 2); }
        }
    "#;
    let unit = Parser::new(source, &arena).compilation_unit().unwrap();
    let resolved = resolve_unit(&unit, &ClassPath::with_builtins(), &[]).unwrap();
    let Member::Method(g) = unit.types[0].members[2] else {
        panic!("expected a method")
    };
    let Stmt::Expr(call) = g.body.unwrap().stmts[0] else {
        panic!("expected an expression statement")
    };
    let fact = resolved.facts.expr(call.expr.id()).unwrap();
    let Binding::Method(method) = &fact.binding else {
        panic!("call bound to {:?}", fact.binding)
    };
    assert_eq!(method.descriptor.to_string(), "(II)V");
}

#[test]
fn ambiguous_invocation() {
    let source = r#"
        class A {
            static void f(int a, long b) { }
            static void f(long a, int b) { }
            static void g() { f(1, 1); }
        }
    "#;
    assert!(matches!(error(source), CompilationError::AmbiguousInvocation { .. }));
}

#[test]
fn constant_fields_are_folded_into_the_shape() {
    let resolved = resolve("class A { static final int K = 2 * 3 + 1; static final String S = \"k\" + K; }").unwrap();
    let shape = &resolved.classes[0].shape;
    assert_eq!(shape.field("K").unwrap().constant, Some(ConstValue::Int(7)));
    assert_eq!(
        shape.field("S").unwrap().constant,
        Some(ConstValue::String("k7".to_string()))
    );
}

#[test]
fn case_labels_are_constant_expressions() {
    let source = in_method("void", "int x", "switch (x) { case 7: break; case 2 * 3 + 1: break; }");
    assert!(matches!(error(&source), CompilationError::DuplicateCaseLabel { .. }));

    let source = in_method("void", "int x, int y", "switch (x) { case y: break; }");
    assert!(matches!(error(&source), CompilationError::NotConstant { .. }));

    let source = in_method("void", "char c", "switch (c) { case 'a': case 98: break; default: }");
    assert!(resolve(&source).is_ok());
}

#[test]
fn use_before_definite_assignment() {
    let source = in_method("int", "boolean c", "int x; if (c) x = 1; return x;");
    assert!(matches!(error(&source), CompilationError::UseBeforeAssignment { .. }));

    let source = in_method("int", "boolean c", "int x; if (c) x = 1; else x = 2; return x;");
    assert!(resolve(&source).is_ok());
}

#[test]
fn unreachable_statement() {
    let source = in_method("void", "", "return; f();");
    assert!(matches!(error(&source), CompilationError::UnreachableCode { .. }));

    let source = in_method("void", "", "while (true) { } f();");
    assert!(matches!(error(&source), CompilationError::UnreachableCode { .. }));

    // A constant-false condition still makes the branch reachable.
    let source = in_method("void", "", "if (false) { f(); }");
    assert!(resolve(&source).is_ok());
}

#[test]
fn missing_return() {
    let source = in_method("int", "boolean c", "if (c) return 1;");
    let err = error(&source);
    assert!(matches!(err, CompilationError::MissingReturn { .. }));
    assert_eq!(err.kind(), ErrorKind::FlowAnalysis);

    let source = in_method("int", "", "while (true) { }");
    assert!(resolve(&source).is_ok());
}

#[test]
fn checked_exceptions_must_be_declared() {
    let source = in_method("void", "", "throw new Exception();");
    assert!(matches!(error(&source), CompilationError::UndeclaredException { .. }));

    let source = "class A { static void f() throws Exception { throw new Exception(); } }";
    assert!(resolve(source).is_ok());

    let source = in_method("void", "", "try { throw new Exception(); } catch (Exception e) { }");
    assert!(resolve(&source).is_ok());

    let source = in_method("void", "", "throw new RuntimeException();");
    assert!(resolve(&source).is_ok());
}

#[test]
fn final_variables_cannot_be_reassigned() {
    let source = "class A { static final int K = 1; static void f() { K = 2; } }";
    assert!(matches!(error(source), CompilationError::FinalAssignment { .. }));

    let source = in_method("void", "", "final int x = 1; x = 2;");
    assert!(matches!(error(&source), CompilationError::FinalAssignment { .. }));

    let source = "class A { final int k; A() { k = 1; } }";
    assert!(resolve(source).is_ok());
}

#[test]
fn static_imports_can_be_ambiguous() {
    let mut class_path = ClassPath::with_builtins();
    for name in ["demo.Limits", "other.Limits"] {
        class_path.insert(
            ClassShapeBuilder::class(name)
                .field("MAX", "I", AccessFlags::PUBLIC | AccessFlags::STATIC)
                .build()
                .unwrap(),
        );
    }
    let imports = [
        ImportSpec::parse("static demo.Limits.*"),
        ImportSpec::parse("static other.Limits.*"),
    ];
    let source = in_method("int", "", "return MAX;");
    let err = resolve_with(&source, &class_path, &imports).unwrap_err();
    assert!(matches!(err, CompilationError::AmbiguousName { .. }));

    let source = in_method("int", "", "return demo.Limits.MAX;");
    assert!(resolve_with(&source, &class_path, &imports).is_ok());
}

#[test]
fn unknown_names_and_types() {
    let source = in_method("int", "", "return y;");
    assert!(matches!(error(&source), CompilationError::NameNotFound { .. }));

    let source = in_method("void", "", "Nope n = null;");
    assert!(matches!(error(&source), CompilationError::TypeNotFound { .. }));
}

#[test]
fn incompatible_assignment() {
    let source = in_method("void", "", "int x = \"s\";");
    assert!(matches!(error(&source), CompilationError::IncompatibleTypes { .. }));

    // Narrowing of an int constant that fits.
    let source = in_method("void", "", "byte b = 10; char c = 65; short s = b;");
    assert!(resolve(&source).is_ok());

    let source = in_method("void", "", "byte b = 300;");
    assert!(matches!(error(&source), CompilationError::IncompatibleTypes { .. }));
}

#[test]
fn jumps_need_a_target() {
    let source = in_method("void", "", "break;");
    assert!(matches!(error(&source), CompilationError::InvalidJump { .. }));

    let source = in_method("void", "", "a: { continue a; }");
    assert!(matches!(error(&source), CompilationError::InvalidJump { .. }));

    let source = in_method("void", "", "outer: for (;;) { for (;;) { break outer; } }");
    assert!(resolve(&source).is_ok());
}

#[test]
fn duplicate_classes_and_locals() {
    assert!(matches!(
        error("class A { } class A { }"),
        CompilationError::DuplicateDefinition { .. }
    ));
    let source = in_method("void", "", "int x = 1; { int x = 2; }");
    assert!(matches!(error(&source), CompilationError::DuplicateDefinition { .. }));
}

#[test]
fn assignment_needs_a_variable() {
    let source = in_method("void", "int x", "x + 1 = 2;");
    assert!(matches!(error(&source), CompilationError::NotAnLvalue { .. }));

    let source = in_method("void", "int[] xs", "xs.length = 2;");
    assert!(matches!(error(&source), CompilationError::NotAnLvalue { .. }));
}
