//! JVM class file model: opcodes, constant pool, code buffers and the
//! class file writer.

mod class_file;
mod code;
mod constant_pool;
mod opcode;

pub use class_file::ClassWriter;
pub use code::{Code, CodeBuffer, ExceptionEntry, Label, ValueKind};
pub use constant_pool::{Constant, ConstantPool, modified_utf8};
pub use opcode::{Opcode, newarray_code};
