//! Structural properties of the produced class files.

mod common;

use common::{ClassFile, PoolEntry, check_unit, instructions, member_refs};
use javelin::prelude::*;
use javelin::ErrorKind;
use javelin_compiler::bytecode::Opcode;

const COUNTER: &str = include_str!("../test_scripts/Counter.java");
const ACCOUNTS: &str = include_str!("../test_scripts/Accounts.java");
const TEXT: &str = include_str!("../test_scripts/Text.java");

fn compile(source: &str) -> Vec<ClassFile> {
    let unit = Compiler::with_builtins()
        .compile_unit(source, "Test.java")
        .unwrap_or_else(|e| panic!("{e}"));
    check_unit(&unit)
}

#[test]
fn output_is_deterministic() {
    let compiler = Compiler::with_builtins().with_options(CompilerOptions::new().debug_info(true));
    for source in [COUNTER, ACCOUNTS, TEXT] {
        let first = compiler.compile_unit(source, "Test.java").unwrap();
        let second = compiler.compile_unit(source, "Test.java").unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn every_method_is_well_formed() {
    for source in [COUNTER, ACCOUNTS, TEXT] {
        for class in compile(source) {
            for method in &class.methods {
                let code = method.code().expect("every method has a body");
                assert!(code.max_stack > 0 || code.code == [0xb1], "{}.{}", class.this_class, method.name);
                let params = descriptor_words(&method.descriptor) + u16::from(method.access & 0x0008 == 0);
                assert!(code.max_locals >= params, "{}.{}", class.this_class, method.name);
            }
        }
    }
}

/// Words taken by the parameters of a method descriptor.
fn descriptor_words(descriptor: &str) -> u16 {
    let params = &descriptor[1..descriptor.find(')').unwrap()];
    let mut words = 0;
    let mut chars = params.chars();
    while let Some(c) = chars.next() {
        match c {
            'J' | 'D' => words += 2,
            '[' => {
                let mut next = chars.next();
                while next == Some('[') {
                    next = chars.next();
                }
                if next == Some('L') {
                    chars.by_ref().find(|&c| c == ';');
                }
                words += 1;
            }
            'L' => {
                chars.by_ref().find(|&c| c == ';');
                words += 1;
            }
            _ => words += 1,
        }
    }
    words
}

#[test]
fn identical_literals_share_pool_entries() {
    let source = r#"
        class Pool {
            static void f() {
                System.out.println("hello");
                System.out.println("hello");
                System.out.println("hello" + 1);
                String a = "hello";
            }
            static long g() { return 123456789012L + 123456789012L * 0 + h(123456789012L); }
            static long h(long x) { return x; }
        }
    "#;
    let classes = compile(source);
    let pool = &classes[0];

    let hello = pool
        .pool
        .iter()
        .position(|e| *e == PoolEntry::Utf8("hello".to_string()))
        .unwrap() as u16;
    assert_eq!(pool.count(&PoolEntry::String(hello)), 1);
    assert_eq!(pool.count(&PoolEntry::Utf8("hello".to_string())), 1);
    // "hello" + 1 folds to a constant.
    assert_eq!(pool.count(&PoolEntry::Utf8("hello1".to_string())), 1);
    assert_eq!(pool.count(&PoolEntry::Long(123456789012)), 1);

    let refs = member_refs(pool);
    let println = refs
        .iter()
        .filter(|(o, n, d)| o == "java/io/PrintStream" && n == "println" && d == "(Ljava/lang/String;)V")
        .count();
    assert_eq!(println, 1);
    let out = refs.iter().filter(|(o, n, _)| o == "java/lang/System" && n == "out").count();
    assert_eq!(out, 1);
}

#[test]
fn long_and_double_constants_take_two_slots() {
    let source = "class Wide { static double f() { return 2.5 + g(7000000000L); } static double g(long x) { return x; } }";
    let classes = compile(source);
    let pool = &classes[0].pool;
    let long = pool.iter().position(|e| *e == PoolEntry::Long(7_000_000_000)).unwrap();
    assert_eq!(pool[long + 1], PoolEntry::Unusable);
    let double = pool.iter().position(|e| *e == PoolEntry::Double(2.5f64.to_bits())).unwrap();
    assert_eq!(pool[double + 1], PoolEntry::Unusable);
}

#[test]
fn short_circuit_jumps_land_on_instructions() {
    let source = "
        class Logic {
            static boolean f(int a, int b, boolean c) {
                return (a > b && c) || (!c && a != 0) ? a < b : b >= 0;
            }
            static int g(long x, float y, double z) {
                if (x > 1L && y <= 2.0f || z == 3.0) {
                    return 1;
                }
                return 0;
            }
        }
    ";
    let classes = compile(source);
    let g = classes[0].method("g").code().unwrap();
    let ops: Vec<Opcode> = instructions(&g.code).iter().map(|i| i.opcode).collect();
    assert!(ops.contains(&Opcode::Lcmp));
    assert!(ops.contains(&Opcode::Fcmpg) || ops.contains(&Opcode::Fcmpl));
    assert!(ops.contains(&Opcode::Dcmpl) || ops.contains(&Opcode::Dcmpg));
}

#[test]
fn finally_runs_on_every_exit() {
    let source = "
        class Exits {
            static int count;
            static int f(int n) {
                for (int i = 0; i < n; i++) {
                    try {
                        if (i == 2) continue;
                        if (i == 5) break;
                        if (i == 7) return i;
                    } finally {
                        count++;
                    }
                }
                return -1;
            }
        }
    ";
    let classes = compile(source);
    let exits = &classes[0];
    let f = exits.method("f").code().unwrap();
    let putstatic = instructions(&f.code)
        .iter()
        .filter(|i| i.opcode == Opcode::Putstatic)
        .count();
    // continue, break, return, normal completion and the catch-all path.
    assert_eq!(putstatic, 5);
    assert!(f.handlers.iter().all(|h| h.3 == 0));
    assert!(f.handlers.len() >= 1);
}

#[test]
fn folded_constants_are_case_labels() {
    let source = "
        class Cases {
            static final int SEVEN = 2 * 3 + 1;
            static int f(int x) {
                switch (x) {
                    case SEVEN: return 1;
                    case 'A': return 2;
                    case 1 << 10: return 3;
                    default: return 0;
                }
            }
        }
    ";
    let classes = compile(source);
    let code = classes[0].method("f").code().unwrap();
    let switch = instructions(&code.code)
        .into_iter()
        .find(|i| i.opcode == Opcode::Lookupswitch)
        .expect("sparse keys use lookupswitch");
    // default plus three keys.
    assert_eq!(switch.targets.len(), 4);

    let err = Compiler::with_builtins()
        .compile_unit(
            "class D { static void f(int x) { switch (x) { case 7: break; case 2 * 3 + 1: break; } } }",
            "D.java",
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn flow_errors() {
    let compiler = Compiler::with_builtins();
    let unassigned = "class F { static int f(boolean c) { int x; if (c) x = 1; return x; } }";
    let err = compiler.compile_unit(unassigned, "F.java").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FlowAnalysis);
    assert_eq!(err.span().line, 1);

    let unreachable = "class F {\n  static int f() {\n    return 1;\n    int x = 2;\n  }\n}";
    let err = compiler.compile_unit(unreachable, "F.java").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FlowAnalysis);
    assert_eq!(err.span().line, 4);
}

#[test]
fn constructors_chain_and_initialize() {
    let source = "
        class Point {
            int x = 1;
            int y;
            { y = 2; }
            Point() { this(0); }
            Point(int z) { super(); y += z; }
        }
    ";
    let classes = compile(source);
    let point = &classes[0];
    let ctors: Vec<_> = point.methods.iter().filter(|m| m.name == "<init>").collect();
    assert_eq!(ctors.len(), 2);
    let delegating = ctors.iter().find(|m| m.descriptor == "()V").unwrap().code().unwrap();
    let initializing = ctors.iter().find(|m| m.descriptor == "(I)V").unwrap().code().unwrap();
    let putfield = |code: &[u8]| instructions(code).iter().filter(|i| i.opcode == Opcode::Putfield).count();
    assert_eq!(putfield(&delegating.code), 0);
    // x = 1, y = 2 and y += z.
    assert_eq!(putfield(&initializing.code), 3);
}
