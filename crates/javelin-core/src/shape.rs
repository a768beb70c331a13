//! Public shapes of classes: supertypes and member signatures.
//!
//! A [`ClassShape`] is everything the resolver needs to know about a type
//! that it cannot see the source of. Shapes for types declared in the unit
//! being compiled are built from their declarations; shapes for everything
//! else come from a [`TypeLookup`](crate::TypeLookup).

use bitflags::bitflags;

use crate::constant::ConstValue;
use crate::types::{DescriptorError, JavaType, MethodDescriptor};

bitflags! {
    /// JVM access flags, shared by classes, fields and methods.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        /// `ACC_SUPER` on classes.
        const SUPER = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
    }
}

impl AccessFlags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    #[inline]
    pub fn is_private(self) -> bool {
        self.contains(AccessFlags::PRIVATE)
    }

    #[inline]
    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    #[inline]
    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    #[inline]
    pub fn is_interface(self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }
}

/// A field signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: String,
    pub ty: JavaType,
    pub access: AccessFlags,
    /// Value of a `static final` field with a constant initializer.
    pub constant: Option<ConstValue>,
}

/// A method or constructor signature. Constructors are named `<init>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodShape {
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub access: AccessFlags,
    /// Binary names of the declared thrown exception types.
    pub throws: Vec<String>,
}

impl MethodShape {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn params(&self) -> &[JavaType] {
        &self.descriptor.params
    }

    pub fn ret(&self) -> &JavaType {
        &self.descriptor.ret
    }
}

/// The public shape of a class or interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassShape {
    /// Dotted binary name.
    pub name: String,
    pub access: AccessFlags,
    /// `None` only for `java.lang.Object` (and interfaces, whose superclass
    /// is implicitly `java.lang.Object`).
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldShape>,
    pub methods: Vec<MethodShape>,
}

impl ClassShape {
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodShape> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodShape> {
        self.methods_named("<init>")
    }

    /// Package part of the binary name (empty for the default package).
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }
}

/// Builds a [`ClassShape`] from descriptor strings.
///
/// ```
/// use javelin_core::{AccessFlags, ClassShapeBuilder};
///
/// let shape = ClassShapeBuilder::class("demo.Counter")
///     .field("count", "I", AccessFlags::PUBLIC)
///     .method("next", "()I", AccessFlags::PUBLIC)
///     .constructor("()V", AccessFlags::PUBLIC)
///     .build()
///     .unwrap();
/// assert_eq!(shape.superclass.as_deref(), Some("java.lang.Object"));
/// ```
#[derive(Debug, Clone)]
pub struct ClassShapeBuilder {
    name: String,
    access: AccessFlags,
    superclass: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<(String, String, AccessFlags, Option<ConstValue>)>,
    methods: Vec<(String, String, AccessFlags, Vec<String>)>,
}

impl ClassShapeBuilder {
    /// A public class extending `java.lang.Object`.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            superclass: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// A public interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            access: AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
            ..Self::class(name)
        }
    }

    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn no_superclass(mut self) -> Self {
        self.superclass = None;
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        self.fields
            .push((name.to_string(), descriptor.to_string(), access, None));
        self
    }

    pub fn constant(mut self, name: &str, value: ConstValue) -> Self {
        let descriptor = value.java_type().descriptor();
        self.fields.push((
            name.to_string(),
            descriptor,
            AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
            Some(value),
        ));
        self
    }

    pub fn method(self, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        self.method_throws(name, descriptor, access, &[])
    }

    pub fn method_throws(
        mut self,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
        throws: &[&str],
    ) -> Self {
        let access = if self.access.is_interface() && !access.is_static() {
            access | AccessFlags::ABSTRACT
        } else {
            access
        };
        self.methods.push((
            name.to_string(),
            descriptor.to_string(),
            access,
            throws.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    pub fn static_method(self, name: &str, descriptor: &str) -> Self {
        self.method(name, descriptor, AccessFlags::PUBLIC | AccessFlags::STATIC)
    }

    pub fn constructor(self, descriptor: &str, access: AccessFlags) -> Self {
        self.method("<init>", descriptor, access)
    }

    /// Parse every descriptor and produce the shape.
    pub fn build(self) -> Result<ClassShape, DescriptorError> {
        let fields = self
            .fields
            .into_iter()
            .map(|(name, descriptor, access, constant)| {
                Ok(FieldShape {
                    name,
                    ty: JavaType::from_descriptor(&descriptor)?,
                    access,
                    constant,
                })
            })
            .collect::<Result<Vec<_>, DescriptorError>>()?;
        let methods = self
            .methods
            .into_iter()
            .map(|(name, descriptor, access, throws)| {
                Ok(MethodShape {
                    name,
                    descriptor: MethodDescriptor::parse(&descriptor)?,
                    access,
                    throws,
                })
            })
            .collect::<Result<Vec<_>, DescriptorError>>()?;
        Ok(ClassShape {
            name: self.name,
            access: self.access,
            superclass: self.superclass,
            interfaces: self.interfaces,
            fields,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_parses_members() {
        let shape = ClassShapeBuilder::class("demo.Point")
            .field("x", "I", AccessFlags::PUBLIC)
            .method_throws(
                "read",
                "(Ljava/lang/String;)D",
                AccessFlags::PUBLIC,
                &["java.io.IOException"],
            )
            .constructor("(II)V", AccessFlags::PUBLIC)
            .build()
            .unwrap();

        assert_eq!(shape.field("x").map(|f| &f.ty), Some(&JavaType::INT));
        let read = shape.methods_named("read").next().unwrap();
        assert_eq!(read.ret(), &JavaType::DOUBLE);
        assert_eq!(read.throws, vec!["java.io.IOException".to_string()]);
        assert_eq!(shape.constructors().count(), 1);
        assert_eq!(shape.package(), "demo");
    }

    #[test]
    fn interface_methods_are_abstract() {
        let shape = ClassShapeBuilder::interface("demo.Shape")
            .method("area", "()D", AccessFlags::PUBLIC)
            .build()
            .unwrap();
        assert!(shape.is_interface());
        assert!(shape.methods[0].access.is_abstract());
    }

    #[test]
    fn builder_reports_bad_descriptor() {
        let result = ClassShapeBuilder::class("demo.Bad")
            .method("oops", "(I", AccessFlags::PUBLIC)
            .build();
        assert_eq!(result, Err(DescriptorError("(I".to_string())));
    }
}
