//! Shared helpers for the integration tests: a small class file reader and
//! an instruction walker.

#![allow(dead_code)]

use javelin_compiler::bytecode::Opcode;

#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
}

#[derive(Debug)]
pub struct Member {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<(String, Vec<u8>)>,
}

impl Member {
    pub fn attribute(&self, name: &str) -> Option<&[u8]> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn code(&self) -> Option<CodeAttribute> {
        self.attribute("Code").map(CodeAttribute::parse)
    }
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    /// `(start, end, handler, catch_type)`
    pub handlers: Vec<(u16, u16, u16, u16)>,
}

impl CodeAttribute {
    fn parse(bytes: &[u8]) -> Self {
        let mut r = Reader { bytes, pos: 0 };
        let max_stack = r.u16();
        let max_locals = r.u16();
        let len = r.u32() as usize;
        let code = r.take(len).to_vec();
        let handlers = (0..r.u16()).map(|_| (r.u16(), r.u16(), r.u16(), r.u16())).collect();
        Self {
            max_stack,
            max_locals,
            code,
            handlers,
        }
    }
}

#[derive(Debug)]
pub struct ClassFile {
    pub minor: u16,
    pub major: u16,
    pub pool: Vec<PoolEntry>,
    pub access: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    pub attributes: Vec<(String, Vec<u8>)>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Self {
        let mut r = Reader { bytes, pos: 0 };
        assert_eq!(r.u32(), 0xcafe_babe, "bad magic");
        let minor = r.u16();
        let major = r.u16();

        let count = r.u16() as usize;
        let mut pool = vec![PoolEntry::Unusable];
        while pool.len() < count {
            let entry = match r.u8() {
                1 => {
                    let len = r.u16() as usize;
                    PoolEntry::Utf8(String::from_utf8_lossy(r.take(len)).into_owned())
                }
                3 => PoolEntry::Integer(r.u32() as i32),
                4 => PoolEntry::Float(r.u32()),
                5 => PoolEntry::Long(r.u64() as i64),
                6 => PoolEntry::Double(r.u64()),
                7 => PoolEntry::Class(r.u16()),
                8 => PoolEntry::String(r.u16()),
                9 => PoolEntry::FieldRef(r.u16(), r.u16()),
                10 => PoolEntry::MethodRef(r.u16(), r.u16()),
                11 => PoolEntry::InterfaceMethodRef(r.u16(), r.u16()),
                12 => PoolEntry::NameAndType(r.u16(), r.u16()),
                tag => panic!("unexpected constant tag {tag}"),
            };
            let wide = matches!(entry, PoolEntry::Long(_) | PoolEntry::Double(_));
            pool.push(entry);
            if wide {
                pool.push(PoolEntry::Unusable);
            }
        }

        let mut class = ClassFile {
            minor,
            major,
            pool,
            access: 0,
            this_class: String::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        class.access = r.u16();
        let this_class = r.u16();
        class.this_class = class.class_name(this_class);
        let super_class = r.u16();
        class.super_class = (super_class != 0).then(|| class.class_name(super_class));
        for _ in 0..r.u16() {
            let index = r.u16();
            class.interfaces.push(class.class_name(index));
        }
        for _ in 0..r.u16() {
            let member = class.member(&mut r);
            class.fields.push(member);
        }
        for _ in 0..r.u16() {
            let member = class.member(&mut r);
            class.methods.push(member);
        }
        class.attributes = class.attributes(&mut r);
        assert_eq!(r.pos, bytes.len(), "trailing bytes after the class file");
        class
    }

    pub fn utf8(&self, index: u16) -> &str {
        match &self.pool[index as usize] {
            PoolEntry::Utf8(s) => s,
            other => panic!("entry {index} is not Utf8: {other:?}"),
        }
    }

    pub fn class_name(&self, index: u16) -> String {
        match self.pool[index as usize] {
            PoolEntry::Class(name) => self.utf8(name).to_string(),
            ref other => panic!("entry {index} is not a class: {other:?}"),
        }
    }

    /// `(owner, name, descriptor)` of a field or method reference.
    pub fn member_ref(&self, index: u16) -> (String, String, String) {
        let (class, nat) = match self.pool[index as usize] {
            PoolEntry::FieldRef(c, n) | PoolEntry::MethodRef(c, n) | PoolEntry::InterfaceMethodRef(c, n) => (c, n),
            ref other => panic!("entry {index} is not a member reference: {other:?}"),
        };
        let PoolEntry::NameAndType(name, descriptor) = self.pool[nat as usize] else {
            panic!("entry {nat} is not a NameAndType");
        };
        (
            self.class_name(class),
            self.utf8(name).to_string(),
            self.utf8(descriptor).to_string(),
        )
    }

    pub fn method(&self, name: &str) -> &Member {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("no method {name} in {}", self.this_class))
    }

    pub fn field(&self, name: &str) -> &Member {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no field {name} in {}", self.this_class))
    }

    pub fn attribute(&self, name: &str) -> Option<&[u8]> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Number of pool entries equal to `entry`.
    pub fn count(&self, entry: &PoolEntry) -> usize {
        self.pool.iter().filter(|e| *e == entry).count()
    }

    fn member(&self, r: &mut Reader<'_>) -> Member {
        let access = r.u16();
        let name = self.utf8(r.u16()).to_string();
        let descriptor = self.utf8(r.u16()).to_string();
        let attributes = self.attributes(r);
        Member {
            access,
            name,
            descriptor,
            attributes,
        }
    }

    fn attributes(&self, r: &mut Reader<'_>) -> Vec<(String, Vec<u8>)> {
        (0..r.u16())
            .map(|_| {
                let name = self.utf8(r.u16()).to_string();
                let len = r.u32() as usize;
                (name, r.take(len).to_vec())
            })
            .collect()
    }
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

    fn u64(&mut self) -> u64 {
        (u64::from(self.u32()) << 32) | u64::from(self.u32())
    }

    fn take(&mut self, len: usize) -> &'b [u8] {
        self.pos += len;
        &self.bytes[self.pos - len..self.pos]
    }
}

// =========================================
// Instruction walking
// =========================================

fn i32_at(code: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([code[at], code[at + 1], code[at + 2], code[at + 3]])
}

/// One decoded instruction: its offset, opcode and jump targets.
#[derive(Debug)]
pub struct Instruction {
    pub offset: usize,
    pub opcode: Opcode,
    pub targets: Vec<usize>,
}

/// Decode `code` into instructions. Panics on unknown opcodes or when an
/// instruction runs past the end of the code.
pub fn instructions(code: &[u8]) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = Opcode::try_from(code[pc]).unwrap_or_else(|_| panic!("unknown opcode {:#04x} at {pc}", code[pc]));
        let mut targets = Vec::new();
        let len = match opcode {
            Opcode::Tableswitch | Opcode::Lookupswitch => {
                let base = pc + 1 + (3 - pc % 4);
                let default = i32_at(code, base);
                targets.push((pc as i32 + default) as usize);
                if opcode == Opcode::Tableswitch {
                    let low = i32_at(code, base + 4);
                    let high = i32_at(code, base + 8);
                    let count = (high - low + 1) as usize;
                    for i in 0..count {
                        targets.push((pc as i32 + i32_at(code, base + 12 + 4 * i)) as usize);
                    }
                    base + 12 + 4 * count - pc
                } else {
                    let pairs = i32_at(code, base + 4) as usize;
                    for i in 0..pairs {
                        targets.push((pc as i32 + i32_at(code, base + 12 + 8 * i)) as usize);
                    }
                    base + 8 + 8 * pairs - pc
                }
            }
            Opcode::Wide => {
                if matches!(Opcode::try_from(code[pc + 1]), Ok(Opcode::Iinc)) {
                    6
                } else {
                    4
                }
            }
            _ => {
                let operands = opcode.operand_len().unwrap_or(0);
                if opcode.is_branch() {
                    let offset = i16::from_be_bytes([code[pc + 1], code[pc + 2]]);
                    targets.push((pc as i32 + i32::from(offset)) as usize);
                }
                1 + operands
            }
        };
        assert!(pc + len <= code.len(), "{opcode:?} at {pc} runs past the end of the code");
        out.push(Instruction {
            offset: pc,
            opcode,
            targets,
        });
        pc += len;
    }
    out
}

/// Check that every jump target and handler bound is an instruction
/// boundary and that the code does not fall off its end.
pub fn assert_well_formed(code: &CodeAttribute) {
    let instructions = instructions(&code.code);
    let starts: Vec<usize> = instructions.iter().map(|i| i.offset).collect();
    for instruction in &instructions {
        for target in &instruction.targets {
            assert!(
                starts.contains(target),
                "{:?} at {} jumps into the middle of an instruction ({target})",
                instruction.opcode,
                instruction.offset
            );
        }
    }
    for &(start, end, handler, _) in &code.handlers {
        assert!(start < end, "empty handler range {start}..{end}");
        assert!(starts.contains(&(start as usize)));
        assert!(starts.contains(&(handler as usize)));
        assert!(end as usize == code.code.len() || starts.contains(&(end as usize)));
    }
    let last = instructions.last().expect("empty code");
    assert!(last.opcode.ends_block(), "code ends with {:?}", last.opcode);
}

/// Parse every class file of a unit and check the code of every method.
pub fn check_unit(unit: &javelin::CompiledUnit) -> Vec<ClassFile> {
    unit.classes
        .iter()
        .map(|class| {
            let parsed = ClassFile::parse(&class.bytes);
            assert_eq!(parsed.this_class, class.binary_name.replace('.', "/"));
            for method in &parsed.methods {
                if let Some(code) = method.code() {
                    assert_well_formed(&code);
                }
            }
            parsed
        })
        .collect()
}

/// Every field and method reference in the pool as `(owner, name, descriptor)`.
pub fn member_refs(class: &ClassFile) -> Vec<(String, String, String)> {
    (0..class.pool.len() as u16)
        .filter(|&i| {
            matches!(
                class.pool[i as usize],
                PoolEntry::FieldRef(..) | PoolEntry::MethodRef(..) | PoolEntry::InterfaceMethodRef(..)
            )
        })
        .map(|i| class.member_ref(i))
        .collect()
}

pub fn has_ref(class: &ClassFile, owner: &str, name: &str, descriptor: &str) -> bool {
    member_refs(class)
        .iter()
        .any(|(o, n, d)| o == owner && n == name && d == descriptor)
}
