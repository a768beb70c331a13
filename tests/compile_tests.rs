//! End-to-end compilation through the public facade.

mod common;

use common::{ClassFile, check_unit, has_ref};
use javelin::prelude::*;
use javelin::{ErrorKind, JavelinError};

const COUNTER: &str = include_str!("../test_scripts/Counter.java");
const ACCOUNTS: &str = include_str!("../test_scripts/Accounts.java");
const TEXT: &str = include_str!("../test_scripts/Text.java");

fn compile_file(source: &str, name: &str) -> Vec<ClassFile> {
    let unit = Compiler::with_builtins()
        .compile_unit(source, name)
        .unwrap_or_else(|e| panic!("{e}"));
    check_unit(&unit)
}

// =========================================
// Compilation units
// =========================================

#[test]
fn counter_compiles() {
    let classes = compile_file(COUNTER, "Counter.java");
    assert_eq!(classes.len(), 1);
    let counter = &classes[0];
    assert_eq!(counter.this_class, "demo/Counter");
    assert_eq!(counter.super_class.as_deref(), Some("java/lang/Object"));
    assert_eq!(counter.interfaces, ["java/lang/Runnable"]);
    assert_eq!((counter.major, counter.minor), (49, 0));

    let names: Vec<&str> = counter.methods.iter().map(|m| m.name.as_str()).collect();
    for name in ["<init>", "run", "bucket", "describe", "sum", "grid", "createdCount", "total", "<clinit>"] {
        assert!(names.contains(&name), "missing {name} in {names:?}");
    }
    assert_eq!(counter.methods.iter().filter(|m| m.name == "<init>").count(), 2);
    assert_eq!(counter.method("grid").descriptor, "(II)[[I");
    assert!(counter.field("LIMIT").attribute("ConstantValue").is_some());
    assert!(counter.field("count").attribute("ConstantValue").is_none());
}

#[test]
fn switches_pick_their_instruction() {
    let classes = compile_file(COUNTER, "Counter.java");
    let counter = &classes[0];
    let dense = common::instructions(&counter.method("bucket").code().unwrap().code);
    assert!(dense.iter().any(|i| i.opcode == javelin_compiler::bytecode::Opcode::Tableswitch));
    let sparse = common::instructions(&counter.method("describe").code().unwrap().code);
    assert!(sparse.iter().any(|i| i.opcode == javelin_compiler::bytecode::Opcode::Lookupswitch));
}

#[test]
fn multidimensional_arrays() {
    let classes = compile_file(COUNTER, "Counter.java");
    let code = classes[0].method("grid").code().unwrap().code;
    assert!(code.contains(&0xc5), "grid should use multianewarray");
}

#[test]
fn accounts_compile() {
    let classes = compile_file(ACCOUNTS, "Accounts.java");
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].this_class, "demo/InsufficientFunds");
    assert_eq!(classes[0].super_class.as_deref(), Some("java/lang/Exception"));
    assert_eq!(classes[1].this_class, "demo/Accounts");

    let accounts = &classes[1];
    assert!(accounts.method("withdraw").attribute("Exceptions").is_some());
    assert!(accounts.method("save").attribute("Exceptions").is_some());
    assert!(accounts.method("parse").attribute("Exceptions").is_none());

    let try_withdraw = accounts.method("tryWithdraw").code().unwrap();
    // One typed handler and catch-all handlers for the finally block.
    assert!(try_withdraw.handlers.iter().any(|h| h.3 != 0));
    assert!(try_withdraw.handlers.iter().any(|h| h.3 == 0));

    let parse = accounts.method("parse").code().unwrap();
    assert_eq!(parse.handlers.len(), 2);
    assert!(has_ref(accounts, "java/lang/Integer", "parseInt", "(Ljava/lang/String;)I"));
}

#[test]
fn text_compiles() {
    let classes = compile_file(TEXT, "Text.java");
    let text = &classes[0];
    assert!(has_ref(text, "java/lang/Character", "toLowerCase", "(C)C"));
    assert!(has_ref(text, "java/lang/String", "toCharArray", "()[C"));
    assert!(has_ref(
        text,
        "java/lang/StringBuilder",
        "append",
        "(Ljava/lang/String;)Ljava/lang/StringBuilder;"
    ));
    assert!(has_ref(text, "java/lang/StringBuilder", "append", "(D)Ljava/lang/StringBuilder;"));
    assert!(has_ref(text, "java/lang/StringBuilder", "append", "(C)Ljava/lang/StringBuilder;"));
    assert!(has_ref(text, "java/lang/StringBuilder", "append", "(Z)Ljava/lang/StringBuilder;"));
}

#[test]
fn debug_info_is_optional() {
    let compiler = Compiler::with_builtins();
    let plain = check_unit(&compiler.compile_unit(TEXT, "Text.java").unwrap());
    assert!(plain[0].attribute("SourceFile").is_none());
    assert!(plain[0].method("vowels").code().is_some());

    let compiler = compiler.with_options(CompilerOptions::new().debug_info(true));
    let debug = check_unit(&compiler.compile_unit(TEXT, "src/demo/Text.java").unwrap());
    let source_file = debug[0].attribute("SourceFile").unwrap();
    let index = u16::from_be_bytes([source_file[0], source_file[1]]);
    assert_eq!(debug[0].utf8(index), "Text.java");
}

// =========================================
// Wrapping compilers
// =========================================

#[test]
fn expression_defaults_to_object() {
    let compiler = Compiler::with_builtins();
    let signature = MethodSignature::new().param("a", JavaType::INT).param("b", JavaType::INT);
    let unit = compiler.compile_expression("a * b", &signature).unwrap();
    let classes = check_unit(&unit);
    let class = &classes[0];
    assert_eq!(class.this_class, "SC");
    let eval = class.method("eval");
    assert_eq!(eval.descriptor, "(II)Ljava/lang/Object;");
    assert_eq!(eval.access & 0x0008, 0x0008, "eval should be static");
    assert!(has_ref(class, "java/lang/Integer", "valueOf", "(I)Ljava/lang/Integer;"));
}

#[test]
fn expression_with_void_return_is_a_statement() {
    let compiler = Compiler::with_builtins();
    let signature = MethodSignature::new().param("s", JavaType::string()).returns(JavaType::Void);
    let unit = compiler.compile_expression("System.out.println(s)", &signature).unwrap();
    let classes = check_unit(&unit);
    let eval = classes[0].method("eval");
    assert_eq!(eval.descriptor, "(Ljava/lang/String;)V");
    assert_eq!(eval.code().unwrap().code.last(), Some(&0xb1));
}

#[test]
fn expression_class_options() {
    let options = CompilerOptions::new()
        .class_name("gen.Calc")
        .method_name("apply")
        .is_static(false)
        .implements("java.lang.Runnable");
    let compiler = Compiler::with_builtins().with_options(options);
    let signature = MethodSignature::new().param("x", JavaType::LONG).returns(JavaType::LONG);
    let unit = compiler.compile_expression("x << 2", &signature).unwrap();
    assert!(unit.class("gen.Calc").is_some());

    let classes = check_unit(&unit);
    let apply = classes[0].method("apply");
    assert_eq!(apply.descriptor, "(J)J");
    assert_eq!(apply.access & 0x0008, 0);
    // `this` plus a long parameter.
    assert_eq!(apply.code().unwrap().max_locals, 3);
    assert!(classes[0].methods.iter().any(|m| m.name == "<init>"));
    assert_eq!(classes[0].interfaces, ["java/lang/Runnable"]);
}

#[test]
fn script_with_default_imports() {
    let options = CompilerOptions::new().default_import("static java.lang.Math.*");
    let compiler = Compiler::with_builtins().with_options(options);
    let signature = MethodSignature::new()
        .param("values", JavaType::DOUBLE.with_dims(1))
        .returns(JavaType::DOUBLE);
    let source = "
        double best = values.length == 0 ? 0.0 : values[0];
        for (double v : values) {
            best = max(best, abs(v));
        }
        return best;
    ";
    let unit = compiler.compile_script(source, &signature).unwrap();
    let classes = check_unit(&unit);
    assert_eq!(classes[0].method("eval").descriptor, "([D)D");
    assert!(has_ref(&classes[0], "java/lang/Math", "max", "(DD)D"));
    assert!(has_ref(&classes[0], "java/lang/Math", "abs", "(D)D"));
}

#[test]
fn script_declares_thrown_exceptions() {
    let compiler = Compiler::with_builtins();
    let source = "import java.io.IOException; if (n < 0) throw new IOException(\"negative\");";
    let bare = MethodSignature::new().param("n", JavaType::INT);
    let err = compiler.compile_script(source, &bare).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FlowAnalysis);

    let declared = bare.throws("java.io.IOException");
    let unit = compiler.compile_script(source, &declared).unwrap();
    let classes = check_unit(&unit);
    assert!(classes[0].method("eval").attribute("Exceptions").is_some());
}

#[test]
fn script_must_return_on_every_path() {
    let compiler = Compiler::with_builtins();
    let signature = MethodSignature::new().param("n", JavaType::INT).returns(JavaType::INT);
    let err = compiler.compile_script("if (n > 0) return 1;", &signature).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FlowAnalysis);
    assert!(compiler.compile_script("if (n > 0) return 1; return 0;", &signature).is_ok());
}

#[test]
fn class_body_members() {
    let options = CompilerOptions::new().class_name("demo.Shapes").superclass("java.lang.Number");
    let compiler = Compiler::with_builtins().with_options(options);
    let source = "
        private double radius = 2.0;
        public int intValue() { return (int) radius; }
        public long longValue() { return (long) radius; }
        public float floatValue() { return (float) radius; }
        public double doubleValue() { return radius; }
        public static double area(double r) { return Math.PI * r * r; }
    ";
    let unit = compiler.compile_class_body(source).unwrap();
    let classes = check_unit(&unit);
    let shapes = &classes[0];
    assert_eq!(shapes.this_class, "demo/Shapes");
    assert_eq!(shapes.super_class.as_deref(), Some("java/lang/Number"));
    assert!(has_ref(shapes, "java/lang/Number", "<init>", "()V"));
    assert_eq!(shapes.method("area").descriptor, "(D)D");
}

#[test]
fn custom_class_path() {
    let mut class_path = ClassPath::with_builtins();
    class_path.insert(
        ClassShapeBuilder::class("host.Env")
            .static_method("lookup", "(Ljava/lang/String;)I")
            .build()
            .unwrap(),
    );
    let compiler = Compiler::new(class_path).with_options(CompilerOptions::new().default_import("host.*"));
    let signature = MethodSignature::new().returns(JavaType::INT);
    let unit = compiler.compile_expression("Env.lookup(\"depth\") + 1", &signature).unwrap();
    let classes = check_unit(&unit);
    assert!(has_ref(&classes[0], "host/Env", "lookup", "(Ljava/lang/String;)I"));

    let err = Compiler::with_builtins()
        .compile_expression("Env.lookup(\"depth\")", &signature)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NameResolution);
}

// =========================================
// Diagnostics
// =========================================

#[test]
fn diagnostics_name_the_source() {
    let compiler = Compiler::with_builtins().with_options(CompilerOptions::new().source_name("calc.expr"));
    let err = compiler
        .compile_expression("unknown + 1", &MethodSignature::new())
        .unwrap_err();
    assert_eq!(err.source_name, "calc.expr");
    assert_eq!(err.span().line, 1);
    assert!(err.to_string().starts_with("calc.expr: "), "{err}");
}

#[test]
fn lexical_errors_are_reported() {
    let err = Compiler::with_builtins()
        .compile_unit("class A { String s = \"open; }", "A.java")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert!(matches!(err.error, JavelinError::Lex(_)));
}

#[test]
fn deep_nesting_is_an_error_not_a_crash() {
    let compiler = Compiler::with_builtins();
    let signature = MethodSignature::new().param("a", JavaType::INT).returns(JavaType::INT);

    let sum = format!("a{}", " + a".repeat(1000));
    let err = compiler.compile_expression(&sum, &signature).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    let parens = format!("{}a{}", "(".repeat(1000), ")".repeat(1000));
    let err = compiler.compile_expression(&parens, &signature).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(guess_parameter_names(&parens).is_err());

    let sum = format!("a{}", " + a".repeat(30));
    check_unit(&compiler.compile_expression(&sum, &signature).unwrap());
    let parens = format!("{}a{}", "(".repeat(30), ")".repeat(30));
    check_unit(&compiler.compile_expression(&parens, &signature).unwrap());
}

#[test]
fn unsupported_constructs_are_rejected() {
    let compiler = Compiler::with_builtins();
    for source in [
        "class A { class B {} }",
        "enum Color { RED }",
        "class A { Object f() { return String.class; } }",
    ] {
        let err = compiler.compile_unit(source, "A.java").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{source}");
    }
}

#[test]
fn overloads_prefer_the_closest_match() {
    let source = "
        class Pick {
            static String f(int a, int b) { return \"int\"; }
            static String f(long a, long b) { return \"long\"; }
            static String g() { return f(1, 2); }
            static String h() { return f(1L, 2); }
        }
    ";
    let classes = compile_file(source, "Pick.java");
    assert!(has_ref(&classes[0], "Pick", "f", "(II)Ljava/lang/String;"));
    assert!(has_ref(&classes[0], "Pick", "f", "(JJ)Ljava/lang/String;"));
}

#[test]
fn compilers_are_shareable_across_threads() {
    let compiler = Compiler::with_builtins();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiler = compiler.clone();
            std::thread::spawn(move || {
                let signature = MethodSignature::new().param("x", JavaType::INT).returns(JavaType::INT);
                compiler.compile_expression(&format!("x + {i}"), &signature).is_ok()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn guessed_parameters_feed_a_signature() {
    let source = "import static java.lang.Math.max; max(width, height) * scale + Integer.MAX_VALUE % 2";
    let mut names: Vec<String> = guess_parameter_names(source).unwrap().into_iter().collect();
    names.sort();
    assert_eq!(names, ["height", "scale", "width"]);

    let signature = names
        .iter()
        .fold(MethodSignature::new(), |signature, name| signature.param(name.as_str(), JavaType::INT))
        .returns(JavaType::INT);
    let unit = Compiler::with_builtins().compile_expression(source, &signature).unwrap();
    let classes = check_unit(&unit);
    assert_eq!(classes[0].method("eval").descriptor, "(III)I");
}
