use bumpalo::Bump;
use javelin_core::ClassPath;
use javelin_parser::Parser;

use super::{ClassFileBytes, GenerateOptions, generate_unit};
use crate::resolve::resolve_unit;

fn compile_with(source: &str, options: &GenerateOptions) -> Vec<ClassFileBytes> {
    let arena = Bump::new();
    let unit = Parser::new(source, &arena).compilation_unit().unwrap();
    let class_path = ClassPath::with_builtins();
    let resolved = resolve_unit(&unit, &class_path, &[]).unwrap();
    generate_unit(&unit, &resolved, options).unwrap()
}

fn compile(source: &str) -> Vec<ClassFileBytes> {
    compile_with(source, &GenerateOptions::default())
}

// =========================================
// A minimal class file reader
// =========================================

#[derive(Debug)]
struct MethodCode {
    name: String,
    max_stack: u16,
    max_locals: u16,
    code: Vec<u8>,
    /// `(start, end, handler, catch_type)`
    handlers: Vec<(u16, u16, u16, u16)>,
}

struct Reader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    fn u8(&mut self) -> u8 {
        self.pos += 1;
        self.bytes[self.pos - 1]
    }

    fn u16(&mut self) -> u16 {
        u16::from_be_bytes([self.u8(), self.u8()])
    }

    fn u32(&mut self) -> u32 {
        u32::from_be_bytes([self.u8(), self.u8(), self.u8(), self.u8()])
    }

    fn take(&mut self, len: usize) -> &'b [u8] {
        self.pos += len;
        &self.bytes[self.pos - len..self.pos]
    }

    fn skip_attributes(&mut self) {
        for _ in 0..self.u16() {
            self.u16();
            let len = self.u32() as usize;
            self.take(len);
        }
    }
}

/// The code of every method with a body, in declaration order.
fn methods(bytes: &[u8]) -> Vec<MethodCode> {
    let mut r = Reader { bytes, pos: 8 };
    let count = r.u16();
    let mut utf8 = vec![String::new(); count as usize];
    let mut i = 1;
    while i < count {
        match r.u8() {
            1 => {
                let len = r.u16() as usize;
                utf8[i as usize] = String::from_utf8_lossy(r.take(len)).into_owned();
            }
            3 | 4 => {
                r.take(4);
            }
            5 | 6 => {
                r.take(8);
                i += 1;
            }
            7 | 8 => {
                r.take(2);
            }
            9..=12 => {
                r.take(4);
            }
            tag => panic!("unexpected constant tag {tag}"),
        }
        i += 1;
    }
    r.take(6);
    let interfaces = r.u16() as usize;
    r.take(interfaces * 2);
    for _ in 0..r.u16() {
        r.take(6);
        r.skip_attributes();
    }

    let mut out = Vec::new();
    for _ in 0..r.u16() {
        r.u16();
        let name = utf8[r.u16() as usize].clone();
        r.u16();
        for _ in 0..r.u16() {
            let attribute = utf8[r.u16() as usize].clone();
            let len = r.u32() as usize;
            if attribute != "Code" {
                r.take(len);
                continue;
            }
            let max_stack = r.u16();
            let max_locals = r.u16();
            let code_len = r.u32() as usize;
            let code = r.take(code_len).to_vec();
            let handlers = (0..r.u16()).map(|_| (r.u16(), r.u16(), r.u16(), r.u16())).collect();
            r.skip_attributes();
            out.push(MethodCode {
                name: name.clone(),
                max_stack,
                max_locals,
                code,
                handlers,
            });
        }
    }
    out
}

fn method<'m>(methods: &'m [MethodCode], name: &str) -> &'m MethodCode {
    methods.iter().find(|m| m.name == name).unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// =========================================
// Tests
// =========================================

#[test]
fn header_and_binary_name() {
    let classes = compile("package p; public class A { }");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].binary_name, "p.A");
    let bytes = &classes[0].bytes;
    assert_eq!(&bytes[..4], &[0xca, 0xfe, 0xba, 0xbe]);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 49]);
}

#[test]
fn default_constructor_calls_super() {
    let classes = compile("class A { }");
    let methods = methods(&classes[0].bytes);
    let init = method(&methods, "<init>");
    // aload_0, invokespecial Object.<init>, return
    assert_eq!(init.code.len(), 5);
    assert_eq!(init.code[0], 0x2a);
    assert_eq!(init.code[1], 0xb7);
    assert_eq!(init.code[4], 0xb1);
    assert_eq!(init.max_locals, 1);
}

#[test]
fn int_arithmetic() {
    let classes = compile("class A { static int add(int a, int b) { return a + b; } }");
    let methods = methods(&classes[0].bytes);
    let add = method(&methods, "add");
    assert_eq!(add.code, vec![0x1a, 0x1b, 0x60, 0xac]);
    assert_eq!(add.max_stack, 2);
    assert_eq!(add.max_locals, 2);
}

#[test]
fn long_locals_take_two_slots() {
    let classes = compile("class A { static long twice(long a) { long b = a * 2; return b; } }");
    let methods = methods(&classes[0].bytes);
    let twice = method(&methods, "twice");
    assert_eq!(twice.max_locals, 4);
    assert_eq!(twice.max_stack, 4);
    assert_eq!(*twice.code.last().unwrap(), 0xad);
}

#[test]
fn infinite_loop_has_no_return() {
    let classes = compile("class A { static void spin() { while (true) { } } }");
    let methods = methods(&classes[0].bytes);
    assert_eq!(method(&methods, "spin").code, vec![0xa7, 0x00, 0x00]);
}

#[test]
fn dense_switch_uses_tableswitch() {
    let source = r#"
        class A {
            static int f(int x) {
                switch (x) {
                    case 1: return 10;
                    case 2: return 20;
                    case 3: return 30;
                    case 4: return 40;
                    default: return 0;
                }
            }
        }
    "#;
    let classes = compile(source);
    let methods = methods(&classes[0].bytes);
    let f = method(&methods, "f");
    assert_eq!(f.code[0], 0x1a);
    assert_eq!(f.code[1], 0xaa);
}

#[test]
fn sparse_switch_uses_lookupswitch() {
    let source = r#"
        class A {
            static int f(int x) {
                switch (x) {
                    case 1: return 10;
                    case 1000: return 20;
                    case 100000: return 30;
                }
                return 0;
            }
        }
    "#;
    let classes = compile(source);
    let methods = methods(&classes[0].bytes);
    let f = method(&methods, "f");
    assert_eq!(f.code[1], 0xab);
}

#[test]
fn catch_clause_gets_a_typed_handler() {
    let source = r#"
        class A {
            static void g() { }
            static int f() {
                try {
                    g();
                } catch (RuntimeException e) {
                    return 1;
                }
                return 0;
            }
        }
    "#;
    let classes = compile(source);
    let methods = methods(&classes[0].bytes);
    let f = method(&methods, "f");
    assert_eq!(f.handlers.len(), 1);
    let (start, end, handler, catch_type) = f.handlers[0];
    assert_eq!(start, 0);
    assert!(end > start);
    assert!(handler >= end);
    assert_ne!(catch_type, 0);
}

#[test]
fn finally_runs_on_return_and_on_throw() {
    let source = r#"
        class A {
            static int g() { return 1; }
            static void h() { }
            static int f() {
                try {
                    return g();
                } finally {
                    h();
                }
            }
        }
    "#;
    let classes = compile(source);
    let methods = methods(&classes[0].bytes);
    let f = method(&methods, "f");
    assert_eq!(f.handlers.len(), 1);
    assert_eq!(f.handlers[0].3, 0);
    assert_eq!(*f.code.last().unwrap(), 0xbf);
    // invokestatic g, then h inlined before ireturn and again in the handler
    assert_eq!(f.code.iter().filter(|&&b| b == 0xb8).count(), 3);
    assert!(f.code.contains(&0xac));
}

#[test]
fn foreach_walks_the_array() {
    let source = r#"
        class A {
            static int sum(int[] xs) {
                int s = 0;
                for (int x : xs) s += x;
                return s;
            }
        }
    "#;
    let classes = compile(source);
    let methods = methods(&classes[0].bytes);
    let sum = method(&methods, "sum");
    assert!(sum.code.contains(&0xbe));
    assert!(sum.code.contains(&0x2e));
    assert!(sum.max_locals >= 5);
}

#[test]
fn string_concatenation_uses_builder() {
    let classes = compile(r#"class A { static String f(int n) { return "n=" + n; } }"#);
    assert!(contains(&classes[0].bytes, b"java/lang/StringBuilder"));
    assert!(contains(&classes[0].bytes, b"(I)Ljava/lang/StringBuilder;"));
}

#[test]
fn constant_field_needs_no_initializer() {
    let classes = compile("class A { static final int K = 3; static int k = K + 1; }");
    let bytes = &classes[0].bytes;
    assert!(contains(bytes, b"ConstantValue"));
    let methods = methods(bytes);
    let clinit = method(&methods, "<clinit>");
    // iconst_4, putstatic k, return
    assert_eq!(clinit.code[0], 0x07);
    assert_eq!(clinit.code[1], 0xb3);
    assert_eq!(clinit.code.len(), 5);
}

#[test]
fn field_initializers_run_in_constructors() {
    let source = r#"
        class A {
            int x = 5;
            A() { }
            A(int y) { this(); }
        }
    "#;
    let classes = compile(source);
    let methods = methods(&classes[0].bytes);
    let inits: Vec<_> = methods.iter().filter(|m| m.name == "<init>").collect();
    assert_eq!(inits.len(), 2);
    // super(), then x = 5
    assert!(inits[0].code.contains(&0xb5));
    // this() does not repeat the initializer
    assert!(!inits[1].code.contains(&0xb5));
}

#[test]
fn debug_info_adds_line_numbers_and_source_file() {
    let options = GenerateOptions {
        debug_info: true,
        source_file: Some("A.java".to_string()),
    };
    let classes = compile_with("class A {\n  static void f() {\n  }\n}\n", &options);
    let bytes = &classes[0].bytes;
    assert!(contains(bytes, b"LineNumberTable"));
    assert!(contains(bytes, b"SourceFile"));
    assert!(contains(bytes, b"A.java"));

    let plain = compile("class A {\n  static void f() {\n  }\n}\n");
    assert!(!contains(&plain[0].bytes, b"LineNumberTable"));
}

#[test]
fn every_class_of_the_unit_is_generated() {
    let classes = compile("class A { } interface B { } class C extends A implements B { }");
    let names: Vec<_> = classes.iter().map(|c| c.binary_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}
