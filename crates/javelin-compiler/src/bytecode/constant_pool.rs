//! Class file constant pool with deduplication.
//!
//! Entries are interned by structural key, so asking twice for the same
//! string, class or member reference yields the same index. Indices start
//! at 1; `long` and `double` entries occupy two indices.

use javelin_core::{CompilationError, Span};
use rustc_hash::FxHashMap;

/// A constant pool entry. Indices refer to other entries of the same pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name: u16 },
    String { utf8: u16 },
    FieldRef { class: u16, name_and_type: u16 },
    MethodRef { class: u16, name_and_type: u16 },
    InterfaceMethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
}

impl Constant {
    fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => 1,
            Constant::Integer(_) => 3,
            Constant::Float(_) => 4,
            Constant::Long(_) => 5,
            Constant::Double(_) => 6,
            Constant::Class { .. } => 7,
            Constant::String { .. } => 8,
            Constant::FieldRef { .. } => 9,
            Constant::MethodRef { .. } => 10,
            Constant::InterfaceMethodRef { .. } => 11,
            Constant::NameAndType { .. } => 12,
        }
    }

    /// Number of pool indices the entry occupies.
    fn width(&self) -> u16 {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

/// Hashable form of [`Constant`]; floats are keyed by bit pattern so that
/// `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Ref(u8, u16, u16),
}

const MAX_ENTRIES: u32 = u16::MAX as u32;

/// The constant pool of one class file.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    /// Entries with their assigned index, in insertion order.
    entries: Vec<(u16, Constant)>,
    index: FxHashMap<ConstantKey, u16>,
    /// Next free index.
    next: u32,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            next: 1,
            ..Self::default()
        }
    }

    fn add(&mut self, key: ConstantKey, constant: Constant) -> Result<u16, CompilationError> {
        if let Some(&idx) = self.index.get(&key) {
            return Ok(idx);
        }
        let width = constant.width() as u32;
        if self.next + width > MAX_ENTRIES {
            return Err(CompilationError::CodeTooLarge {
                what: "constant pool".to_string(),
                limit: MAX_ENTRIES,
                span: Span::default(),
            });
        }
        let idx = self.next as u16;
        self.next += width;
        self.entries.push((idx, constant));
        self.index.insert(key, idx);
        Ok(idx)
    }

    pub fn utf8(&mut self, value: &str) -> Result<u16, CompilationError> {
        if modified_utf8_len(value) > u16::MAX as usize {
            return Err(CompilationError::CodeTooLarge {
                what: "string constant".to_string(),
                limit: u16::MAX as u32,
                span: Span::default(),
            });
        }
        self.add(
            ConstantKey::Utf8(value.to_string()),
            Constant::Utf8(value.to_string()),
        )
    }

    pub fn integer(&mut self, value: i32) -> Result<u16, CompilationError> {
        self.add(ConstantKey::Integer(value), Constant::Integer(value))
    }

    pub fn float(&mut self, value: f32) -> Result<u16, CompilationError> {
        self.add(ConstantKey::Float(value.to_bits()), Constant::Float(value))
    }

    pub fn long(&mut self, value: i64) -> Result<u16, CompilationError> {
        self.add(ConstantKey::Long(value), Constant::Long(value))
    }

    pub fn double(&mut self, value: f64) -> Result<u16, CompilationError> {
        self.add(ConstantKey::Double(value.to_bits()), Constant::Double(value))
    }

    /// `CONSTANT_Class` for an internal name (`java/lang/String`, `[I`).
    pub fn class(&mut self, internal_name: &str) -> Result<u16, CompilationError> {
        let name = self.utf8(internal_name)?;
        self.add(ConstantKey::Ref(7, name, 0), Constant::Class { name })
    }

    pub fn string(&mut self, value: &str) -> Result<u16, CompilationError> {
        let utf8 = self.utf8(value)?;
        self.add(ConstantKey::Ref(8, utf8, 0), Constant::String { utf8 })
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16, CompilationError> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.add(
            ConstantKey::Ref(12, name, descriptor),
            Constant::NameAndType { name, descriptor },
        )
    }

    pub fn field_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, CompilationError> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(
            ConstantKey::Ref(9, class, name_and_type),
            Constant::FieldRef {
                class,
                name_and_type,
            },
        )
    }

    /// A method reference; `interface` selects `CONSTANT_InterfaceMethodref`.
    pub fn method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
        interface: bool,
    ) -> Result<u16, CompilationError> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        let (tag, constant) = if interface {
            (
                11,
                Constant::InterfaceMethodRef {
                    class,
                    name_and_type,
                },
            )
        } else {
            (
                10,
                Constant::MethodRef {
                    class,
                    name_and_type,
                },
            )
        };
        self.add(ConstantKey::Ref(tag, class, name_and_type), constant)
    }

    /// Entry at `index`, if one starts there.
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries
            .binary_search_by_key(&index, |(idx, _)| *idx)
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    /// Number of entries (not indices).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize `constant_pool_count` followed by every entry.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.next as u16).to_be_bytes());
        for (_, constant) in &self.entries {
            out.push(constant.tag());
            match constant {
                Constant::Utf8(value) => {
                    let bytes = modified_utf8(value);
                    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                    out.extend_from_slice(&bytes);
                }
                Constant::Integer(v) => out.extend_from_slice(&v.to_be_bytes()),
                Constant::Float(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
                Constant::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
                Constant::Double(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
                Constant::Class { name } => out.extend_from_slice(&name.to_be_bytes()),
                Constant::String { utf8 } => out.extend_from_slice(&utf8.to_be_bytes()),
                Constant::FieldRef {
                    class,
                    name_and_type,
                }
                | Constant::MethodRef {
                    class,
                    name_and_type,
                }
                | Constant::InterfaceMethodRef {
                    class,
                    name_and_type,
                } => {
                    out.extend_from_slice(&class.to_be_bytes());
                    out.extend_from_slice(&name_and_type.to_be_bytes());
                }
                Constant::NameAndType { name, descriptor } => {
                    out.extend_from_slice(&name.to_be_bytes());
                    out.extend_from_slice(&descriptor.to_be_bytes());
                }
            }
        }
    }
}

/// Encode as the JVM's modified UTF-8: NUL takes two bytes and characters
/// outside the BMP are written as surrogate pairs.
pub fn modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

fn modified_utf8_len(value: &str) -> usize {
    value
        .encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007f => 1,
            0x0000 | 0x0080..=0x07ff => 2,
            _ => 3,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_interned() {
        let mut pool = ConstantPool::new();
        let a = pool.string("hello").unwrap();
        let b = pool.string("hello").unwrap();
        assert_eq!(a, b);
        // Utf8 + String
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(a), Some(&Constant::String { utf8: 1 }));
    }

    #[test]
    fn method_refs_share_their_parts() {
        let mut pool = ConstantPool::new();
        let first = pool
            .method_ref("java/lang/Math", "abs", "(I)I", false)
            .unwrap();
        let again = pool
            .method_ref("java/lang/Math", "abs", "(I)I", false)
            .unwrap();
        let other = pool
            .method_ref("java/lang/Math", "abs", "(J)J", false)
            .unwrap();
        assert_eq!(first, again);
        assert_ne!(first, other);
        let class = pool.class("java/lang/Math").unwrap();
        assert!(class < first);
    }

    #[test]
    fn wide_entries_take_two_indices() {
        let mut pool = ConstantPool::new();
        assert_eq!(pool.long(5).unwrap(), 1);
        assert_eq!(pool.integer(5).unwrap(), 3);
        assert_eq!(pool.double(1.5).unwrap(), 4);
        assert_eq!(pool.float(1.5).unwrap(), 6);
        let mut bytes = Vec::new();
        pool.write_to(&mut bytes);
        assert_eq!(&bytes[..2], &7u16.to_be_bytes());
    }

    #[test]
    fn signed_zeros_are_distinct() {
        let mut pool = ConstantPool::new();
        assert_ne!(pool.double(0.0).unwrap(), pool.double(-0.0).unwrap());
        assert_eq!(pool.float(f32::NAN).unwrap(), pool.float(f32::NAN).unwrap());
    }

    #[test]
    fn modified_utf8_encoding() {
        assert_eq!(modified_utf8("a"), vec![b'a']);
        assert_eq!(modified_utf8("\0"), vec![0xc0, 0x80]);
        assert_eq!(modified_utf8("é"), vec![0xc3, 0xa9]);
        // U+1F600 becomes a surrogate pair, three bytes each.
        assert_eq!(modified_utf8("\u{1F600}").len(), 6);
        assert_eq!(modified_utf8_len("\u{1F600}a"), 7);
    }
}
