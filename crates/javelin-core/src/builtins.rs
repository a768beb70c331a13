//! Shapes of the platform classes every compilation can see.

use ordered_float::OrderedFloat;

use crate::constant::ConstValue;
use crate::shape::{AccessFlags, ClassShapeBuilder};
use crate::types::PrimitiveType;

const PUBLIC: AccessFlags = AccessFlags::PUBLIC;
const PUBLIC_FINAL_CLASS: AccessFlags = AccessFlags::PUBLIC
    .union(AccessFlags::FINAL)
    .union(AccessFlags::SUPER);
const PUBLIC_STATIC_FINAL: AccessFlags = AccessFlags::PUBLIC
    .union(AccessFlags::STATIC)
    .union(AccessFlags::FINAL);

/// Every built-in class, as unbuilt shapes.
pub(crate) fn shapes() -> Vec<ClassShapeBuilder> {
    let mut shapes = vec![
        object(),
        ClassShapeBuilder::class("java.lang.Class")
            .access(PUBLIC_FINAL_CLASS)
            .method("getName", "()Ljava/lang/String;", PUBLIC)
            .method("getSimpleName", "()Ljava/lang/String;", PUBLIC),
        ClassShapeBuilder::interface("java.io.Serializable"),
        ClassShapeBuilder::interface("java.lang.Cloneable"),
        ClassShapeBuilder::interface("java.lang.Runnable").method("run", "()V", PUBLIC),
        ClassShapeBuilder::interface("java.lang.Comparable").method(
            "compareTo",
            "(Ljava/lang/Object;)I",
            PUBLIC,
        ),
        ClassShapeBuilder::interface("java.lang.CharSequence")
            .method("length", "()I", PUBLIC)
            .method("charAt", "(I)C", PUBLIC)
            .method("toString", "()Ljava/lang/String;", PUBLIC),
        string(),
        string_builder(),
        number(),
        boolean_box(),
        character_box(),
        math(),
        system(),
        print_stream(),
    ];

    for prim in [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ] {
        shapes.push(numeric_box(prim));
    }

    shapes.extend(throwables());
    shapes
}

fn object() -> ClassShapeBuilder {
    ClassShapeBuilder::class("java.lang.Object")
        .no_superclass()
        .constructor("()V", PUBLIC)
        .method("equals", "(Ljava/lang/Object;)Z", PUBLIC)
        .method("hashCode", "()I", PUBLIC)
        .method("toString", "()Ljava/lang/String;", PUBLIC)
        .method("getClass", "()Ljava/lang/Class;", PUBLIC | AccessFlags::FINAL)
        .method("notify", "()V", PUBLIC | AccessFlags::FINAL)
        .method("notifyAll", "()V", PUBLIC | AccessFlags::FINAL)
        .method_throws(
            "wait",
            "()V",
            PUBLIC | AccessFlags::FINAL,
            &["java.lang.InterruptedException"],
        )
        .method_throws(
            "wait",
            "(J)V",
            PUBLIC | AccessFlags::FINAL,
            &["java.lang.InterruptedException"],
        )
}

fn string() -> ClassShapeBuilder {
    let mut builder = ClassShapeBuilder::class("java.lang.String")
        .access(PUBLIC_FINAL_CLASS)
        .implements("java.io.Serializable")
        .implements("java.lang.Comparable")
        .implements("java.lang.CharSequence")
        .constructor("()V", PUBLIC)
        .constructor("(Ljava/lang/String;)V", PUBLIC)
        .constructor("([C)V", PUBLIC)
        .method("length", "()I", PUBLIC)
        .method("isEmpty", "()Z", PUBLIC)
        .method("charAt", "(I)C", PUBLIC)
        .method("substring", "(I)Ljava/lang/String;", PUBLIC)
        .method("substring", "(II)Ljava/lang/String;", PUBLIC)
        .method("indexOf", "(I)I", PUBLIC)
        .method("indexOf", "(Ljava/lang/String;)I", PUBLIC)
        .method("lastIndexOf", "(I)I", PUBLIC)
        .method("lastIndexOf", "(Ljava/lang/String;)I", PUBLIC)
        .method("equals", "(Ljava/lang/Object;)Z", PUBLIC)
        .method("equalsIgnoreCase", "(Ljava/lang/String;)Z", PUBLIC)
        .method("hashCode", "()I", PUBLIC)
        .method("compareTo", "(Ljava/lang/String;)I", PUBLIC)
        .method("compareTo", "(Ljava/lang/Object;)I", PUBLIC)
        .method("startsWith", "(Ljava/lang/String;)Z", PUBLIC)
        .method("endsWith", "(Ljava/lang/String;)Z", PUBLIC)
        .method("contains", "(Ljava/lang/CharSequence;)Z", PUBLIC)
        .method("concat", "(Ljava/lang/String;)Ljava/lang/String;", PUBLIC)
        .method("replace", "(CC)Ljava/lang/String;", PUBLIC)
        .method("trim", "()Ljava/lang/String;", PUBLIC)
        .method("toUpperCase", "()Ljava/lang/String;", PUBLIC)
        .method("toLowerCase", "()Ljava/lang/String;", PUBLIC)
        .method("toCharArray", "()[C", PUBLIC)
        .method("split", "(Ljava/lang/String;)[Ljava/lang/String;", PUBLIC)
        .method("intern", "()Ljava/lang/String;", PUBLIC)
        .method("toString", "()Ljava/lang/String;", PUBLIC)
        .static_method(
            "format",
            "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
        )
        .static_method("valueOf", "(Ljava/lang/Object;)Ljava/lang/String;")
        .static_method("valueOf", "([C)Ljava/lang/String;");
    for prim in PrimitiveType::ALL {
        if matches!(prim, PrimitiveType::Byte | PrimitiveType::Short) {
            continue;
        }
        builder = builder.static_method(
            "valueOf",
            &format!("({})Ljava/lang/String;", prim.descriptor()),
        );
    }
    builder
}

fn string_builder() -> ClassShapeBuilder {
    const SB: &str = "Ljava/lang/StringBuilder;";
    let mut builder = ClassShapeBuilder::class("java.lang.StringBuilder")
        .access(PUBLIC_FINAL_CLASS)
        .implements("java.io.Serializable")
        .implements("java.lang.CharSequence")
        .constructor("()V", PUBLIC)
        .constructor("(I)V", PUBLIC)
        .constructor("(Ljava/lang/String;)V", PUBLIC)
        .method("length", "()I", PUBLIC)
        .method("charAt", "(I)C", PUBLIC)
        .method("setLength", "(I)V", PUBLIC)
        .method("toString", "()Ljava/lang/String;", PUBLIC)
        .method("reverse", &format!("(){SB}"), PUBLIC)
        .method("insert", &format!("(ILjava/lang/String;){SB}"), PUBLIC);
    for arg in [
        "Ljava/lang/String;",
        "Ljava/lang/Object;",
        "Ljava/lang/CharSequence;",
        "[C",
        "Z",
        "C",
        "I",
        "J",
        "F",
        "D",
    ] {
        builder = builder.method("append", &format!("({arg}){SB}"), PUBLIC);
    }
    builder
}

fn number() -> ClassShapeBuilder {
    let mut builder = ClassShapeBuilder::class("java.lang.Number")
        .access(PUBLIC | AccessFlags::ABSTRACT | AccessFlags::SUPER)
        .implements("java.io.Serializable")
        .constructor("()V", PUBLIC);
    for prim in [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ] {
        let access = if matches!(prim, PrimitiveType::Byte | PrimitiveType::Short) {
            PUBLIC
        } else {
            PUBLIC | AccessFlags::ABSTRACT
        };
        builder = builder.method(prim.unbox_method(), &format!("(){}", prim.descriptor()), access);
    }
    builder
}

fn numeric_box(prim: PrimitiveType) -> ClassShapeBuilder {
    let name = prim.box_class();
    let desc = prim.descriptor();
    let self_desc = format!("L{};", name.replace('.', "/"));
    let simple = &name["java.lang.".len()..];
    let parse = match prim {
        PrimitiveType::Int => "parseInt".to_string(),
        other => format!("parse{}{}", &simple[..1], &other.name()[1..]),
    };

    let mut builder = ClassShapeBuilder::class(name)
        .access(PUBLIC_FINAL_CLASS)
        .extends("java.lang.Number")
        .implements("java.lang.Comparable")
        .constructor(&format!("({desc})V"), PUBLIC)
        .static_method("valueOf", &format!("({desc}){self_desc}"))
        .static_method("valueOf", &format!("(Ljava/lang/String;){self_desc}"))
        .static_method(&parse, &format!("(Ljava/lang/String;){desc}"))
        .static_method("toString", &format!("({desc})Ljava/lang/String;"))
        .method("compareTo", &format!("({self_desc})I"), PUBLIC)
        .method("compareTo", "(Ljava/lang/Object;)I", PUBLIC)
        .method("equals", "(Ljava/lang/Object;)Z", PUBLIC)
        .method("hashCode", "()I", PUBLIC)
        .method("toString", "()Ljava/lang/String;", PUBLIC);
    for target in [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ] {
        builder = builder.method(
            target.unbox_method(),
            &format!("(){}", target.descriptor()),
            PUBLIC,
        );
    }

    let (min, max) = match prim {
        PrimitiveType::Byte => (ConstValue::Byte(i8::MIN), ConstValue::Byte(i8::MAX)),
        PrimitiveType::Short => (ConstValue::Short(i16::MIN), ConstValue::Short(i16::MAX)),
        PrimitiveType::Int => (ConstValue::Int(i32::MIN), ConstValue::Int(i32::MAX)),
        PrimitiveType::Long => (ConstValue::Long(i64::MIN), ConstValue::Long(i64::MAX)),
        PrimitiveType::Float => (
            ConstValue::Float(OrderedFloat(f32::from_bits(1))),
            ConstValue::Float(OrderedFloat(f32::MAX)),
        ),
        _ => (
            ConstValue::Double(OrderedFloat(f64::from_bits(1))),
            ConstValue::Double(OrderedFloat(f64::MAX)),
        ),
    };
    builder.constant("MIN_VALUE", min).constant("MAX_VALUE", max)
}

fn boolean_box() -> ClassShapeBuilder {
    ClassShapeBuilder::class("java.lang.Boolean")
        .access(PUBLIC_FINAL_CLASS)
        .implements("java.io.Serializable")
        .implements("java.lang.Comparable")
        .field("TRUE", "Ljava/lang/Boolean;", PUBLIC_STATIC_FINAL)
        .field("FALSE", "Ljava/lang/Boolean;", PUBLIC_STATIC_FINAL)
        .constructor("(Z)V", PUBLIC)
        .static_method("valueOf", "(Z)Ljava/lang/Boolean;")
        .static_method("parseBoolean", "(Ljava/lang/String;)Z")
        .static_method("toString", "(Z)Ljava/lang/String;")
        .method("booleanValue", "()Z", PUBLIC)
        .method("equals", "(Ljava/lang/Object;)Z", PUBLIC)
        .method("hashCode", "()I", PUBLIC)
        .method("toString", "()Ljava/lang/String;", PUBLIC)
}

fn character_box() -> ClassShapeBuilder {
    ClassShapeBuilder::class("java.lang.Character")
        .access(PUBLIC_FINAL_CLASS)
        .implements("java.io.Serializable")
        .implements("java.lang.Comparable")
        .constant("MIN_VALUE", ConstValue::Char(u16::MIN))
        .constant("MAX_VALUE", ConstValue::Char(u16::MAX))
        .constructor("(C)V", PUBLIC)
        .static_method("valueOf", "(C)Ljava/lang/Character;")
        .static_method("isDigit", "(C)Z")
        .static_method("isLetter", "(C)Z")
        .static_method("isLetterOrDigit", "(C)Z")
        .static_method("isWhitespace", "(C)Z")
        .static_method("isUpperCase", "(C)Z")
        .static_method("isLowerCase", "(C)Z")
        .static_method("toUpperCase", "(C)C")
        .static_method("toLowerCase", "(C)C")
        .static_method("toString", "(C)Ljava/lang/String;")
        .method("charValue", "()C", PUBLIC)
        .method("equals", "(Ljava/lang/Object;)Z", PUBLIC)
        .method("hashCode", "()I", PUBLIC)
        .method("toString", "()Ljava/lang/String;", PUBLIC)
}

fn math() -> ClassShapeBuilder {
    let mut builder = ClassShapeBuilder::class("java.lang.Math")
        .access(PUBLIC_FINAL_CLASS)
        .constant("PI", ConstValue::Double(OrderedFloat(std::f64::consts::PI)))
        .constant("E", ConstValue::Double(OrderedFloat(std::f64::consts::E)));
    for desc in ["I", "J", "F", "D"] {
        builder = builder
            .static_method("abs", &format!("({desc}){desc}"))
            .static_method("max", &format!("({desc}{desc}){desc}"))
            .static_method("min", &format!("({desc}{desc}){desc}"));
    }
    for unary in [
        "sqrt", "cbrt", "floor", "ceil", "rint", "sin", "cos", "tan", "exp", "log", "log10",
    ] {
        builder = builder.static_method(unary, "(D)D");
    }
    builder
        .static_method("pow", "(DD)D")
        .static_method("atan2", "(DD)D")
        .static_method("hypot", "(DD)D")
        .static_method("round", "(D)J")
        .static_method("round", "(F)I")
        .static_method("random", "()D")
}

fn system() -> ClassShapeBuilder {
    ClassShapeBuilder::class("java.lang.System")
        .access(PUBLIC_FINAL_CLASS)
        .field("out", "Ljava/io/PrintStream;", PUBLIC_STATIC_FINAL)
        .field("err", "Ljava/io/PrintStream;", PUBLIC_STATIC_FINAL)
        .static_method("currentTimeMillis", "()J")
        .static_method("nanoTime", "()J")
        .static_method(
            "arraycopy",
            "(Ljava/lang/Object;ILjava/lang/Object;II)V",
        )
        .static_method("exit", "(I)V")
        .static_method("identityHashCode", "(Ljava/lang/Object;)I")
        .static_method("getProperty", "(Ljava/lang/String;)Ljava/lang/String;")
        .static_method("lineSeparator", "()Ljava/lang/String;")
}

fn print_stream() -> ClassShapeBuilder {
    let mut builder = ClassShapeBuilder::class("java.io.PrintStream")
        .method("println", "()V", PUBLIC)
        .method("flush", "()V", PUBLIC);
    for arg in [
        "Z",
        "C",
        "I",
        "J",
        "F",
        "D",
        "[C",
        "Ljava/lang/String;",
        "Ljava/lang/Object;",
    ] {
        builder = builder
            .method("print", &format!("({arg})V"), PUBLIC)
            .method("println", &format!("({arg})V"), PUBLIC);
    }
    builder
}

fn throwable_like(name: &str, superclass: &str) -> ClassShapeBuilder {
    ClassShapeBuilder::class(name)
        .extends(superclass)
        .constructor("()V", PUBLIC)
        .constructor("(Ljava/lang/String;)V", PUBLIC)
        .constructor("(Ljava/lang/String;Ljava/lang/Throwable;)V", PUBLIC)
        .constructor("(Ljava/lang/Throwable;)V", PUBLIC)
}

fn throwables() -> Vec<ClassShapeBuilder> {
    let mut shapes = vec![
        throwable_like("java.lang.Throwable", "java.lang.Object")
            .implements("java.io.Serializable")
            .method("getMessage", "()Ljava/lang/String;", PUBLIC)
            .method("getCause", "()Ljava/lang/Throwable;", PUBLIC)
            .method("printStackTrace", "()V", PUBLIC)
            .method("toString", "()Ljava/lang/String;", PUBLIC),
        throwable_like("java.lang.Exception", "java.lang.Throwable"),
        throwable_like("java.lang.Error", "java.lang.Throwable"),
        throwable_like("java.lang.RuntimeException", "java.lang.Exception"),
        throwable_like("java.io.IOException", "java.lang.Exception"),
        throwable_like("java.lang.AssertionError", "java.lang.Error"),
    ];
    for (name, superclass) in [
        ("java.lang.InterruptedException", "java.lang.Exception"),
        ("java.lang.CloneNotSupportedException", "java.lang.Exception"),
        ("java.lang.ArithmeticException", "java.lang.RuntimeException"),
        ("java.lang.ClassCastException", "java.lang.RuntimeException"),
        ("java.lang.IllegalArgumentException", "java.lang.RuntimeException"),
        ("java.lang.IllegalStateException", "java.lang.RuntimeException"),
        ("java.lang.NullPointerException", "java.lang.RuntimeException"),
        ("java.lang.UnsupportedOperationException", "java.lang.RuntimeException"),
        ("java.lang.IndexOutOfBoundsException", "java.lang.RuntimeException"),
        (
            "java.lang.ArrayIndexOutOfBoundsException",
            "java.lang.IndexOutOfBoundsException",
        ),
        (
            "java.lang.NumberFormatException",
            "java.lang.IllegalArgumentException",
        ),
    ] {
        shapes.push(
            ClassShapeBuilder::class(name)
                .extends(superclass)
                .constructor("()V", PUBLIC)
                .constructor("(Ljava/lang/String;)V", PUBLIC),
        );
    }
    shapes
}
