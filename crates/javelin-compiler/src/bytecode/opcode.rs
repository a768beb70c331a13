//! JVM instruction opcodes.
//!
//! Each opcode is a single byte followed by its operands. Stack effects are
//! measured in words: `long` and `double` values count twice, which is the
//! unit of the `max_stack` field of a `Code` attribute.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A JVM opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    // =========================================================================
    // Constants
    // =========================================================================
    Nop = 0x00,
    AconstNull = 0x01,
    IconstM1 = 0x02,
    Iconst0 = 0x03,
    Iconst1 = 0x04,
    Iconst2 = 0x05,
    Iconst3 = 0x06,
    Iconst4 = 0x07,
    Iconst5 = 0x08,
    Lconst0 = 0x09,
    Lconst1 = 0x0a,
    Fconst0 = 0x0b,
    Fconst1 = 0x0c,
    Fconst2 = 0x0d,
    Dconst0 = 0x0e,
    Dconst1 = 0x0f,
    /// Operand: i8
    Bipush = 0x10,
    /// Operand: i16
    Sipush = 0x11,
    /// Operand: u8 pool index
    Ldc = 0x12,
    /// Operand: u16 pool index
    LdcW = 0x13,
    /// Operand: u16 pool index of a long or double
    Ldc2W = 0x14,

    // =========================================================================
    // Loads
    // =========================================================================
    Iload = 0x15,
    Lload = 0x16,
    Fload = 0x17,
    Dload = 0x18,
    Aload = 0x19,
    Iload0 = 0x1a,
    Iload1 = 0x1b,
    Iload2 = 0x1c,
    Iload3 = 0x1d,
    Lload0 = 0x1e,
    Lload1 = 0x1f,
    Lload2 = 0x20,
    Lload3 = 0x21,
    Fload0 = 0x22,
    Fload1 = 0x23,
    Fload2 = 0x24,
    Fload3 = 0x25,
    Dload0 = 0x26,
    Dload1 = 0x27,
    Dload2 = 0x28,
    Dload3 = 0x29,
    Aload0 = 0x2a,
    Aload1 = 0x2b,
    Aload2 = 0x2c,
    Aload3 = 0x2d,
    Iaload = 0x2e,
    Laload = 0x2f,
    Faload = 0x30,
    Daload = 0x31,
    Aaload = 0x32,
    Baload = 0x33,
    Caload = 0x34,
    Saload = 0x35,

    // =========================================================================
    // Stores
    // =========================================================================
    Istore = 0x36,
    Lstore = 0x37,
    Fstore = 0x38,
    Dstore = 0x39,
    Astore = 0x3a,
    Istore0 = 0x3b,
    Istore1 = 0x3c,
    Istore2 = 0x3d,
    Istore3 = 0x3e,
    Lstore0 = 0x3f,
    Lstore1 = 0x40,
    Lstore2 = 0x41,
    Lstore3 = 0x42,
    Fstore0 = 0x43,
    Fstore1 = 0x44,
    Fstore2 = 0x45,
    Fstore3 = 0x46,
    Dstore0 = 0x47,
    Dstore1 = 0x48,
    Dstore2 = 0x49,
    Dstore3 = 0x4a,
    Astore0 = 0x4b,
    Astore1 = 0x4c,
    Astore2 = 0x4d,
    Astore3 = 0x4e,
    Iastore = 0x4f,
    Lastore = 0x50,
    Fastore = 0x51,
    Dastore = 0x52,
    Aastore = 0x53,
    Bastore = 0x54,
    Castore = 0x55,
    Sastore = 0x56,

    // =========================================================================
    // Stack
    // =========================================================================
    Pop = 0x57,
    Pop2 = 0x58,
    Dup = 0x59,
    DupX1 = 0x5a,
    DupX2 = 0x5b,
    Dup2 = 0x5c,
    Dup2X1 = 0x5d,
    Dup2X2 = 0x5e,
    Swap = 0x5f,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    Iadd = 0x60,
    Ladd = 0x61,
    Fadd = 0x62,
    Dadd = 0x63,
    Isub = 0x64,
    Lsub = 0x65,
    Fsub = 0x66,
    Dsub = 0x67,
    Imul = 0x68,
    Lmul = 0x69,
    Fmul = 0x6a,
    Dmul = 0x6b,
    Idiv = 0x6c,
    Ldiv = 0x6d,
    Fdiv = 0x6e,
    Ddiv = 0x6f,
    Irem = 0x70,
    Lrem = 0x71,
    Frem = 0x72,
    Drem = 0x73,
    Ineg = 0x74,
    Lneg = 0x75,
    Fneg = 0x76,
    Dneg = 0x77,
    Ishl = 0x78,
    Lshl = 0x79,
    Ishr = 0x7a,
    Lshr = 0x7b,
    Iushr = 0x7c,
    Lushr = 0x7d,
    Iand = 0x7e,
    Land = 0x7f,
    Ior = 0x80,
    Lor = 0x81,
    Ixor = 0x82,
    Lxor = 0x83,
    /// Operands: u8 slot, i8 delta
    Iinc = 0x84,

    // =========================================================================
    // Conversions
    // =========================================================================
    I2l = 0x85,
    I2f = 0x86,
    I2d = 0x87,
    L2i = 0x88,
    L2f = 0x89,
    L2d = 0x8a,
    F2i = 0x8b,
    F2l = 0x8c,
    F2d = 0x8d,
    D2i = 0x8e,
    D2l = 0x8f,
    D2f = 0x90,
    I2b = 0x91,
    I2c = 0x92,
    I2s = 0x93,

    // =========================================================================
    // Comparisons and branches
    // =========================================================================
    Lcmp = 0x94,
    Fcmpl = 0x95,
    Fcmpg = 0x96,
    Dcmpl = 0x97,
    Dcmpg = 0x98,
    Ifeq = 0x99,
    Ifne = 0x9a,
    Iflt = 0x9b,
    Ifge = 0x9c,
    Ifgt = 0x9d,
    Ifle = 0x9e,
    IfIcmpeq = 0x9f,
    IfIcmpne = 0xa0,
    IfIcmplt = 0xa1,
    IfIcmpge = 0xa2,
    IfIcmpgt = 0xa3,
    IfIcmple = 0xa4,
    IfAcmpeq = 0xa5,
    IfAcmpne = 0xa6,
    Goto = 0xa7,
    Jsr = 0xa8,
    Ret = 0xa9,
    Tableswitch = 0xaa,
    Lookupswitch = 0xab,

    // =========================================================================
    // Returns
    // =========================================================================
    Ireturn = 0xac,
    Lreturn = 0xad,
    Freturn = 0xae,
    Dreturn = 0xaf,
    Areturn = 0xb0,
    Return = 0xb1,

    // =========================================================================
    // Fields and invocations
    // =========================================================================
    Getstatic = 0xb2,
    Putstatic = 0xb3,
    Getfield = 0xb4,
    Putfield = 0xb5,
    Invokevirtual = 0xb6,
    Invokespecial = 0xb7,
    Invokestatic = 0xb8,
    /// Operands: u16 pool index, u8 count, u8 zero
    Invokeinterface = 0xb9,
    Invokedynamic = 0xba,

    // =========================================================================
    // Objects and arrays
    // =========================================================================
    New = 0xbb,
    /// Operand: u8 array type code
    Newarray = 0xbc,
    Anewarray = 0xbd,
    Arraylength = 0xbe,
    Athrow = 0xbf,
    Checkcast = 0xc0,
    Instanceof = 0xc1,
    Monitorenter = 0xc2,
    Monitorexit = 0xc3,
    Wide = 0xc4,
    /// Operands: u16 pool index, u8 dimensions
    Multianewarray = 0xc5,
    Ifnull = 0xc6,
    Ifnonnull = 0xc7,
    GotoW = 0xc8,
    JsrW = 0xc9,
}

impl Opcode {
    /// Bytes of operands following the opcode, or `None` for the
    /// variable-length `tableswitch`, `lookupswitch` and `wide`.
    pub fn operand_len(self) -> Option<usize> {
        use Opcode::*;
        Some(match self {
            Bipush | Ldc | Iload | Lload | Fload | Dload | Aload | Istore | Lstore | Fstore
            | Dstore | Astore | Ret | Newarray => 1,
            Sipush | LdcW | Ldc2W | Iinc | Getstatic | Putstatic | Getfield | Putfield
            | Invokevirtual | Invokespecial | Invokestatic | New | Anewarray | Checkcast
            | Instanceof | Jsr => 2,
            Ifeq | Ifne | Iflt | Ifge | Ifgt | Ifle | IfIcmpeq | IfIcmpne | IfIcmplt
            | IfIcmpge | IfIcmpgt | IfIcmple | IfAcmpeq | IfAcmpne | Goto | Ifnull
            | Ifnonnull => 2,
            Multianewarray => 3,
            Invokeinterface | Invokedynamic | GotoW | JsrW => 4,
            Tableswitch | Lookupswitch | Wide => return None,
            _ => 0,
        })
    }

    /// Whether the operand is a 16-bit branch offset.
    pub fn is_branch(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Ifeq | Ifne
                | Iflt
                | Ifge
                | Ifgt
                | Ifle
                | IfIcmpeq
                | IfIcmpne
                | IfIcmplt
                | IfIcmpge
                | IfIcmpgt
                | IfIcmple
                | IfAcmpeq
                | IfAcmpne
                | Goto
                | Ifnull
                | Ifnonnull
        )
    }

    /// Whether control never falls through to the next instruction.
    pub fn ends_block(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Goto | GotoW
                | Tableswitch
                | Lookupswitch
                | Ireturn
                | Lreturn
                | Freturn
                | Dreturn
                | Areturn
                | Return
                | Athrow
        )
    }

    /// The branch that jumps when `self` would not.
    pub fn negated(self) -> Option<Opcode> {
        use Opcode::*;
        Some(match self {
            Ifeq => Ifne,
            Ifne => Ifeq,
            Iflt => Ifge,
            Ifge => Iflt,
            Ifgt => Ifle,
            Ifle => Ifgt,
            IfIcmpeq => IfIcmpne,
            IfIcmpne => IfIcmpeq,
            IfIcmplt => IfIcmpge,
            IfIcmpge => IfIcmplt,
            IfIcmpgt => IfIcmple,
            IfIcmple => IfIcmpgt,
            IfAcmpeq => IfAcmpne,
            IfAcmpne => IfAcmpeq,
            Ifnull => Ifnonnull,
            Ifnonnull => Ifnull,
            _ => return None,
        })
    }

    /// Net change in operand stack words, for opcodes whose effect does
    /// not depend on a descriptor.
    pub fn stack_effect(self) -> Option<i32> {
        use Opcode::*;
        Some(match self {
            Nop | Iinc | Swap | Goto | GotoW | Return | Ineg | Lneg | Fneg | Dneg | I2f
            | L2d | F2i | D2l | I2b | I2c | I2s | Newarray | Anewarray | Arraylength
            | Checkcast | Instanceof | Laload | Daload | Wide => 0,
            AconstNull | IconstM1 | Iconst0 | Iconst1 | Iconst2 | Iconst3 | Iconst4
            | Iconst5 | Fconst0 | Fconst1 | Fconst2 | Bipush | Sipush | Ldc | LdcW | Iload
            | Fload | Aload | Iload0 | Iload1 | Iload2 | Iload3 | Fload0 | Fload1 | Fload2
            | Fload3 | Aload0 | Aload1 | Aload2 | Aload3 | Dup | DupX1 | DupX2 | I2l | I2d
            | F2l | F2d | New | Jsr | JsrW => 1,
            Lconst0 | Lconst1 | Dconst0 | Dconst1 | Ldc2W | Lload | Dload | Lload0 | Lload1
            | Lload2 | Lload3 | Dload0 | Dload1 | Dload2 | Dload3 | Dup2 | Dup2X1 | Dup2X2 => 2,
            Iaload | Faload | Aaload | Baload | Caload | Saload | Istore | Fstore | Astore
            | Istore0 | Istore1 | Istore2 | Istore3 | Fstore0 | Fstore1 | Fstore2 | Fstore3
            | Astore0 | Astore1 | Astore2 | Astore3 | Pop | Iadd | Fadd | Isub | Fsub
            | Imul | Fmul | Idiv | Fdiv | Irem | Frem | Ishl | Lshl | Ishr | Lshr | Iushr
            | Lushr | Iand | Ior | Ixor | L2i | L2f | D2i | D2f | Fcmpl | Fcmpg | Ifeq
            | Ifne | Iflt | Ifge | Ifgt | Ifle | Tableswitch | Lookupswitch | Ireturn
            | Freturn | Areturn | Athrow | Monitorenter | Monitorexit | Ifnull | Ifnonnull => {
                -1
            }
            Lstore | Dstore | Lstore0 | Lstore1 | Lstore2 | Lstore3 | Dstore0 | Dstore1
            | Dstore2 | Dstore3 | Pop2 | Ladd | Dadd | Lsub | Dsub | Lmul | Dmul | Ldiv
            | Ddiv | Lrem | Drem | Land | Lor | Lxor | IfIcmpeq | IfIcmpne | IfIcmplt
            | IfIcmpge | IfIcmpgt | IfIcmple | IfAcmpeq | IfAcmpne | Lreturn | Dreturn => -2,
            Iastore | Fastore | Aastore | Bastore | Castore | Sastore | Lcmp | Dcmpl
            | Dcmpg => -3,
            Lastore | Dastore => -4,
            Ret => 0,
            Getstatic | Putstatic | Getfield | Putfield | Invokevirtual | Invokespecial
            | Invokestatic | Invokeinterface | Invokedynamic | Multianewarray => return None,
        })
    }
}

/// `newarray` type codes.
pub fn newarray_code(element: javelin_core::PrimitiveType) -> u8 {
    use javelin_core::PrimitiveType::*;
    match element {
        Boolean => 4,
        Char => 5,
        Float => 6,
        Double => 7,
        Byte => 8,
        Short => 9,
        Int => 10,
        Long => 11,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip() {
        assert_eq!(u8::from(Opcode::Invokestatic), 0xb8);
        assert_eq!(Opcode::try_from(0xa7u8), Ok(Opcode::Goto));
        assert!(Opcode::try_from(0xcau8).is_err());
    }

    #[test]
    fn every_byte_has_consistent_metadata() {
        for byte in 0u8..=0xc9 {
            let op = Opcode::try_from(byte).unwrap();
            if op.is_branch() {
                assert_eq!(op.operand_len(), Some(2), "{op:?}");
            }
        }
    }

    #[test]
    fn negation_is_an_involution() {
        for byte in 0x99u8..=0xa6 {
            let op = Opcode::try_from(byte).unwrap();
            assert_eq!(op.negated().and_then(Opcode::negated), Some(op));
        }
        assert_eq!(Opcode::Goto.negated(), None);
    }

    #[test]
    fn wide_values_count_twice() {
        assert_eq!(Opcode::Lload0.stack_effect(), Some(2));
        assert_eq!(Opcode::Lcmp.stack_effect(), Some(-3));
        assert_eq!(Opcode::Dastore.stack_effect(), Some(-4));
        assert_eq!(Opcode::Invokevirtual.stack_effect(), None);
    }
}
