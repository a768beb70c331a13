//! Static types of the source language and their JVM descriptors.
//!
//! [`JavaType`] is the resolved form of every type the compiler reasons
//! about. Class types are identified by their binary name in dotted form
//! (`java.lang.String`); [`JavaType::descriptor`] and
//! [`JavaType::internal_name`] produce the slash-separated forms used inside
//! class files.

use std::fmt;

use thiserror::Error;

/// A descriptor string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed descriptor '{0}'")]
pub struct DescriptorError(pub String);

/// The eight primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    /// All primitive types, in declaration order.
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Keyword spelling of the type.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Look up a primitive type by keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Single-character field descriptor.
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Char => 'C',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    fn from_descriptor(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.descriptor() == ch)
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    /// `byte`, `short`, `char`, `int` and `long`.
    #[inline]
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    /// Number of local variable slots (and operand stack words) a value occupies.
    #[inline]
    pub fn slot_size(self) -> u16 {
        match self {
            PrimitiveType::Long | PrimitiveType::Double => 2,
            _ => 1,
        }
    }

    /// Unary numeric promotion: `byte`, `short` and `char` become `int`.
    pub fn promoted(self) -> Self {
        match self {
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => PrimitiveType::Int,
            other => other,
        }
    }

    /// Binary numeric promotion of two numeric operands.
    pub fn binary_promoted(self, other: Self) -> Self {
        use PrimitiveType::*;
        match (self, other) {
            (Double, _) | (_, Double) => Double,
            (Float, _) | (_, Float) => Float,
            (Long, _) | (_, Long) => Long,
            _ => Int,
        }
    }

    /// Binary name of the wrapper class.
    pub fn box_class(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    /// The primitive type wrapped by a box class, if `class` is one.
    pub fn from_box_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.box_class() == class)
    }

    /// Name of the wrapper method that yields the primitive value (`intValue`).
    pub fn unbox_method(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "booleanValue",
            PrimitiveType::Byte => "byteValue",
            PrimitiveType::Short => "shortValue",
            PrimitiveType::Char => "charValue",
            PrimitiveType::Int => "intValue",
            PrimitiveType::Long => "longValue",
            PrimitiveType::Float => "floatValue",
            PrimitiveType::Double => "doubleValue",
        }
    }

    /// Whether a widening primitive conversion exists from `self` to `target`.
    ///
    /// Identity is not a widening conversion.
    pub fn widens_to(self, target: Self) -> bool {
        use PrimitiveType::*;
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => target == Double,
            Double | Boolean => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JavaType {
    /// The return "type" of methods without a value.
    Void,
    /// The type of the `null` literal.
    Null,
    Primitive(PrimitiveType),
    /// A class or interface, by dotted binary name.
    Class(String),
    Array(Box<JavaType>),
}

impl JavaType {
    pub const BOOLEAN: JavaType = JavaType::Primitive(PrimitiveType::Boolean);
    pub const INT: JavaType = JavaType::Primitive(PrimitiveType::Int);
    pub const LONG: JavaType = JavaType::Primitive(PrimitiveType::Long);
    pub const FLOAT: JavaType = JavaType::Primitive(PrimitiveType::Float);
    pub const DOUBLE: JavaType = JavaType::Primitive(PrimitiveType::Double);
    pub const CHAR: JavaType = JavaType::Primitive(PrimitiveType::Char);

    pub fn class(name: impl Into<String>) -> Self {
        JavaType::Class(name.into())
    }

    pub fn object() -> Self {
        JavaType::class("java.lang.Object")
    }

    pub fn string() -> Self {
        JavaType::class("java.lang.String")
    }

    pub fn array_of(self) -> Self {
        JavaType::Array(Box::new(self))
    }

    /// Wrap `self` in `dims` array dimensions.
    pub fn with_dims(self, dims: usize) -> Self {
        (0..dims).fold(self, |ty, _| ty.array_of())
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, JavaType::Void)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }

    /// Class, array and null types.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, JavaType::Class(_) | JavaType::Array(_) | JavaType::Null)
    }

    #[inline]
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            JavaType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.as_primitive() == Some(PrimitiveType::Boolean)
    }

    /// Primitive numeric type (not a box).
    pub fn is_numeric(&self) -> bool {
        self.as_primitive().is_some_and(PrimitiveType::is_numeric)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JavaType::Class(name) if name == "java.lang.String")
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            JavaType::Class(name) => Some(name),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&JavaType> {
        match self {
            JavaType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The primitive type this box class wraps.
    pub fn unboxed(&self) -> Option<PrimitiveType> {
        self.class_name().and_then(PrimitiveType::from_box_class)
    }

    /// The primitive type of `self`, looking through box classes.
    pub fn primitive_or_unboxed(&self) -> Option<PrimitiveType> {
        self.as_primitive().or_else(|| self.unboxed())
    }

    /// Local variable slots needed to hold a value of this type.
    pub fn slot_size(&self) -> u16 {
        match self {
            JavaType::Void => 0,
            JavaType::Primitive(p) => p.slot_size(),
            _ => 1,
        }
    }

    /// Field descriptor, e.g. `I`, `Ljava/lang/String;`, `[[D`.
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            JavaType::Void => out.push('V'),
            // Only reachable for untyped null constants; erase to Object.
            JavaType::Null => out.push_str("Ljava/lang/Object;"),
            JavaType::Primitive(p) => out.push(p.descriptor()),
            JavaType::Class(name) => {
                out.push('L');
                out.extend(name.chars().map(|c| if c == '.' { '/' } else { c }));
                out.push(';');
            }
            JavaType::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }

    /// The name used by `CONSTANT_Class` entries: `java/lang/String` for
    /// classes and the full descriptor for arrays.
    pub fn internal_name(&self) -> String {
        match self {
            JavaType::Class(name) => name.replace('.', "/"),
            other => other.descriptor(),
        }
    }

    /// Parse a single field descriptor.
    pub fn from_descriptor(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut chars = descriptor.chars().peekable();
        let ty = parse_field_type(&mut chars, descriptor)?;
        if chars.next().is_some() {
            return Err(DescriptorError(descriptor.to_string()));
        }
        Ok(ty)
    }
}

impl From<PrimitiveType> for JavaType {
    fn from(p: PrimitiveType) -> Self {
        JavaType::Primitive(p)
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Void => f.write_str("void"),
            JavaType::Null => f.write_str("null"),
            JavaType::Primitive(p) => write!(f, "{p}"),
            JavaType::Class(name) => f.write_str(name),
            JavaType::Array(element) => write!(f, "{element}[]"),
        }
    }
}

fn parse_field_type(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    whole: &str,
) -> Result<JavaType, DescriptorError> {
    let err = || DescriptorError(whole.to_string());
    match chars.next().ok_or_else(err)? {
        'V' => Ok(JavaType::Void),
        '[' => Ok(parse_field_type(chars, whole)?.array_of()),
        'L' => {
            let mut name = String::new();
            loop {
                match chars.next().ok_or_else(err)? {
                    ';' => break,
                    '/' => name.push('.'),
                    c => name.push(c),
                }
            }
            if name.is_empty() {
                return Err(err());
            }
            Ok(JavaType::Class(name))
        }
        c => PrimitiveType::from_descriptor(c).map(JavaType::Primitive).ok_or_else(err),
    }
}

/// Parameter and return types of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<JavaType>,
    pub ret: JavaType,
}

impl MethodDescriptor {
    pub fn new(params: Vec<JavaType>, ret: JavaType) -> Self {
        Self { params, ret }
    }

    /// Parse a method descriptor such as `(ILjava/lang/String;)V`.
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let err = || DescriptorError(descriptor.to_string());
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(err());
        }
        let mut params = Vec::new();
        while chars.peek().is_some_and(|c| *c != ')') {
            let param = parse_field_type(&mut chars, descriptor)?;
            if param.is_void() {
                return Err(err());
            }
            params.push(param);
        }
        if chars.next() != Some(')') {
            return Err(err());
        }
        let ret = parse_field_type(&mut chars, descriptor)?;
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(Self { params, ret })
    }

    /// Words occupied by the arguments on the operand stack.
    pub fn arg_slots(&self) -> u16 {
        self.params.iter().map(JavaType::slot_size).sum()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            f.write_str(&param.descriptor())?;
        }
        write!(f, "){}", self.ret.descriptor())
    }
}
