//! Class file serialization.
//!
//! [`ClassWriter`] assembles one class file: header, constant pool,
//! fields, methods and their attributes. Files are written as version
//! 49.0, which needs no `StackMapTable`.

use javelin_core::{AccessFlags, CompilationError};

use super::code::Code;
use super::constant_pool::ConstantPool;

type ClassResult<T> = Result<T, CompilationError>;

pub const MAGIC: u32 = 0xCAFE_BABE;
pub const MAJOR_VERSION: u16 = 49;
pub const MINOR_VERSION: u16 = 0;

#[derive(Debug, Clone)]
struct Attribute {
    name: u16,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct MemberInfo {
    access: AccessFlags,
    name: u16,
    descriptor: u16,
    attributes: Vec<Attribute>,
}

/// Builder for one class file.
#[derive(Debug)]
pub struct ClassWriter {
    pool: ConstantPool,
    access: AccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberInfo>,
    methods: Vec<MemberInfo>,
    attributes: Vec<Attribute>,
}

impl ClassWriter {
    /// Start a class with internal names for itself and its superclass.
    pub fn new(access: AccessFlags, name: &str, superclass: Option<&str>) -> ClassResult<Self> {
        let mut pool = ConstantPool::new();
        let this_class = pool.class(name)?;
        let super_class = match superclass {
            Some(superclass) => pool.class(superclass)?,
            None => 0,
        };
        Ok(Self {
            pool,
            access,
            this_class,
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        })
    }

    pub fn pool(&mut self) -> &mut ConstantPool {
        &mut self.pool
    }

    pub fn add_interface(&mut self, name: &str) -> ClassResult<()> {
        let index = self.pool.class(name)?;
        self.interfaces.push(index);
        Ok(())
    }

    /// Add a field; `constant_value` is the pool index of its
    /// `ConstantValue` attribute.
    pub fn add_field(
        &mut self,
        access: AccessFlags,
        name: &str,
        descriptor: &str,
        constant_value: Option<u16>,
    ) -> ClassResult<()> {
        let mut attributes = Vec::new();
        if let Some(value) = constant_value {
            attributes.push(Attribute {
                name: self.pool.utf8("ConstantValue")?,
                data: value.to_be_bytes().to_vec(),
            });
        }
        let member = MemberInfo {
            access,
            name: self.pool.utf8(name)?,
            descriptor: self.pool.utf8(descriptor)?,
            attributes,
        };
        self.fields.push(member);
        Ok(())
    }

    /// Add a method. Abstract methods have no `code`. `exceptions` are
    /// internal names for the `Exceptions` attribute.
    pub fn add_method(
        &mut self,
        access: AccessFlags,
        name: &str,
        descriptor: &str,
        code: Option<Code>,
        exceptions: &[String],
        line_numbers: bool,
    ) -> ClassResult<()> {
        let mut attributes = Vec::new();
        if let Some(code) = code {
            attributes.push(self.code_attribute(code, line_numbers)?);
        }
        if !exceptions.is_empty() {
            let mut data = Vec::with_capacity(2 + 2 * exceptions.len());
            data.extend_from_slice(&(exceptions.len() as u16).to_be_bytes());
            for exception in exceptions {
                data.extend_from_slice(&self.pool.class(exception)?.to_be_bytes());
            }
            attributes.push(Attribute {
                name: self.pool.utf8("Exceptions")?,
                data,
            });
        }
        let member = MemberInfo {
            access,
            name: self.pool.utf8(name)?,
            descriptor: self.pool.utf8(descriptor)?,
            attributes,
        };
        self.methods.push(member);
        Ok(())
    }

    fn code_attribute(&mut self, code: Code, line_numbers: bool) -> ClassResult<Attribute> {
        let mut data = Vec::with_capacity(code.bytes.len() + 32);
        data.extend_from_slice(&code.max_stack.to_be_bytes());
        data.extend_from_slice(&code.max_locals.to_be_bytes());
        data.extend_from_slice(&(code.bytes.len() as u32).to_be_bytes());
        data.extend_from_slice(&code.bytes);
        data.extend_from_slice(&(code.exception_table.len() as u16).to_be_bytes());
        for entry in &code.exception_table {
            for value in [
                entry.start_pc,
                entry.end_pc,
                entry.handler_pc,
                entry.catch_type,
            ] {
                data.extend_from_slice(&value.to_be_bytes());
            }
        }

        let mut nested = Vec::new();
        if line_numbers && !code.line_numbers.is_empty() {
            let mut table = Vec::with_capacity(2 + 4 * code.line_numbers.len());
            table.extend_from_slice(&(code.line_numbers.len() as u16).to_be_bytes());
            for (pc, line) in &code.line_numbers {
                table.extend_from_slice(&pc.to_be_bytes());
                table.extend_from_slice(&line.to_be_bytes());
            }
            nested.push(Attribute {
                name: self.pool.utf8("LineNumberTable")?,
                data: table,
            });
        }
        write_attributes(&nested, &mut data);

        Ok(Attribute {
            name: self.pool.utf8("Code")?,
            data,
        })
    }

    pub fn set_source_file(&mut self, file_name: &str) -> ClassResult<()> {
        let name = self.pool.utf8("SourceFile")?;
        let value = self.pool.utf8(file_name)?;
        self.attributes.push(Attribute {
            name,
            data: value.to_be_bytes().to_vec(),
        });
        Ok(())
    }

    /// Serialize the class file.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1024);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&MINOR_VERSION.to_be_bytes());
        out.extend_from_slice(&MAJOR_VERSION.to_be_bytes());
        self.pool.write_to(&mut out);
        out.extend_from_slice(&self.access.bits().to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(&member.access.bits().to_be_bytes());
                out.extend_from_slice(&member.name.to_be_bytes());
                out.extend_from_slice(&member.descriptor.to_be_bytes());
                write_attributes(&member.attributes, &mut out);
            }
        }
        write_attributes(&self.attributes, &mut out);
        out
    }
}

fn write_attributes(attributes: &[Attribute], out: &mut Vec<u8>) {
    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for attribute in attributes {
        out.extend_from_slice(&attribute.name.to_be_bytes());
        out.extend_from_slice(&(attribute.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&attribute.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{CodeBuffer, Opcode};

    #[test]
    fn minimal_class_layout() {
        let writer = ClassWriter::new(
            AccessFlags::PUBLIC | AccessFlags::SUPER,
            "Empty",
            Some("java/lang/Object"),
        )
        .unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &[0xca, 0xfe, 0xba, 0xbe]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 49]);
        // Utf8 Empty, Class, Utf8 java/lang/Object, Class
        assert_eq!(&bytes[8..10], &[0, 5]);
    }

    #[test]
    fn absent_superclass_is_zero() {
        let bytes = ClassWriter::new(AccessFlags::PUBLIC, "I", None)
            .unwrap()
            .into_bytes();
        // access, this, super, then four empty counts
        let tail = &bytes[bytes.len() - 14..];
        assert_eq!(&tail[..2], &[0x00, 0x01]);
        assert_eq!(&tail[4..6], &[0, 0]);
    }

    #[test]
    fn method_with_code() {
        let mut writer = ClassWriter::new(AccessFlags::PUBLIC, "C", Some("java/lang/Object")).unwrap();
        let mut code = CodeBuffer::new(0);
        code.mark_line(1);
        code.emit(Opcode::Return).unwrap();
        writer
            .add_method(
                AccessFlags::PUBLIC | AccessFlags::STATIC,
                "run",
                "()V",
                Some(code.finish().unwrap()),
                &["java/io/IOException".to_string()],
                true,
            )
            .unwrap();
        writer.set_source_file("C.java").unwrap();
        let bytes = writer.into_bytes();
        let find = |needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
        assert!(find(b"Code"));
        assert!(find(b"LineNumberTable"));
        assert!(find(b"Exceptions"));
        assert!(find(b"C.java"));
    }
}
