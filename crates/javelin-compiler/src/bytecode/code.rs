//! Per-method instruction buffer.
//!
//! A [`CodeBuffer`] grows the instruction stream of one method and keeps
//! the bookkeeping the `Code` attribute needs:
//!
//! - branch targets are [`Label`]s, indices into a label table; every
//!   branch records a pending patch that [`CodeBuffer::finish`] resolves
//!   once all offsets are known
//! - the operand stack depth is tracked per instruction; the depth at each
//!   label is recorded by the first branch to it and checked by every
//!   later one
//! - `max_locals` grows with every local variable access
//! - exception handlers and line numbers are collected as emitted

use javelin_core::{CompilationError, JavaType, PrimitiveType, Span};

use super::Opcode;

type CodeResult<T> = Result<T, CompilationError>;

/// A branch target inside one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(u32);

#[derive(Debug, Default)]
struct LabelInfo {
    offset: Option<u32>,
    /// Operand stack depth on arrival.
    stack: Option<u16>,
}

#[derive(Debug)]
struct Patch {
    label: Label,
    /// Offset of the instruction the branch is relative to.
    origin: u32,
    /// Offset of the operand to overwrite.
    at: u32,
    /// Four-byte operand (`tableswitch`, `lookupswitch`).
    wide: bool,
}

#[derive(Debug)]
struct PendingHandler {
    start: Label,
    end: Label,
    handler: Label,
    catch_type: u16,
}

/// One row of the exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Pool index of the caught class, or 0 for any throwable.
    pub catch_type: u16,
}

/// A finished method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub bytes: Vec<u8>,
    pub exception_table: Vec<ExceptionEntry>,
    /// `(start_pc, line)` pairs.
    pub line_numbers: Vec<(u16, u16)>,
}

/// The JVM's computational kinds of values, which select the typed
/// variant of load, store, return and arithmetic instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl ValueKind {
    pub fn of(ty: &JavaType) -> Self {
        match ty.as_primitive() {
            Some(PrimitiveType::Long) => ValueKind::Long,
            Some(PrimitiveType::Float) => ValueKind::Float,
            Some(PrimitiveType::Double) => ValueKind::Double,
            Some(_) => ValueKind::Int,
            None => ValueKind::Reference,
        }
    }

    pub fn words(self) -> u16 {
        match self {
            ValueKind::Long | ValueKind::Double => 2,
            _ => 1,
        }
    }

    fn index(self) -> u8 {
        match self {
            ValueKind::Int => 0,
            ValueKind::Long => 1,
            ValueKind::Float => 2,
            ValueKind::Double => 3,
            ValueKind::Reference => 4,
        }
    }

    pub fn return_op(self) -> Opcode {
        match self {
            ValueKind::Int => Opcode::Ireturn,
            ValueKind::Long => Opcode::Lreturn,
            ValueKind::Float => Opcode::Freturn,
            ValueKind::Double => Opcode::Dreturn,
            ValueKind::Reference => Opcode::Areturn,
        }
    }

    pub fn pop_op(self) -> Opcode {
        if self.words() == 2 { Opcode::Pop2 } else { Opcode::Pop }
    }

    pub fn dup_op(self) -> Opcode {
        if self.words() == 2 { Opcode::Dup2 } else { Opcode::Dup }
    }

    /// `dup_x1`/`dup_x2` family: duplicate the top value below `below`
    /// words.
    pub fn dup_below_op(self, below: u16) -> Opcode {
        match (self.words(), below) {
            (1, 0) => Opcode::Dup,
            (1, 1) => Opcode::DupX1,
            (1, _) => Opcode::DupX2,
            (_, 0) => Opcode::Dup2,
            (_, 1) => Opcode::Dup2X1,
            _ => Opcode::Dup2X2,
        }
    }
}

const BRANCH_LIMIT: i64 = i16::MAX as i64;
const CODE_LIMIT: usize = u16::MAX as usize;

/// Growing instruction stream of one method.
#[derive(Debug)]
pub struct CodeBuffer {
    bytes: Vec<u8>,
    labels: Vec<LabelInfo>,
    patches: Vec<Patch>,
    handlers: Vec<PendingHandler>,
    lines: Vec<(u32, u32)>,
    /// Current stack depth; `None` after an unconditional transfer until a
    /// label that is the target of some branch is placed.
    stack: Option<u16>,
    max_stack: u16,
    max_locals: u16,
}

impl CodeBuffer {
    /// A buffer whose first `param_slots` locals hold `this` and the
    /// parameters.
    pub fn new(param_slots: u16) -> Self {
        Self {
            bytes: Vec::with_capacity(64),
            labels: Vec::new(),
            patches: Vec::new(),
            handlers: Vec::new(),
            lines: Vec::new(),
            stack: Some(0),
            max_stack: 0,
            max_locals: param_slots,
        }
    }

    /// Offset the next instruction will get.
    pub fn offset(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Whether control can reach the current position.
    pub fn is_reachable(&self) -> bool {
        self.stack.is_some()
    }

    pub fn stack_depth(&self) -> Option<u16> {
        self.stack
    }

    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    // =========================================
    // Labels
    // =========================================

    pub fn new_label(&mut self) -> Label {
        self.labels.push(LabelInfo::default());
        Label(self.labels.len() as u32 - 1)
    }

    /// Bind `label` to the current offset.
    pub fn place(&mut self, label: Label) -> CodeResult<()> {
        let offset = self.offset();
        let info = &mut self.labels[label.0 as usize];
        if info.offset.is_some() {
            return Err(CompilationError::internal(format!(
                "label {} placed twice",
                label.0
            )));
        }
        info.offset = Some(offset);
        match (self.stack, info.stack) {
            (Some(here), Some(recorded)) if here != recorded => {
                return Err(CompilationError::internal(format!(
                    "stack depth {here} at offset {offset} disagrees with {recorded} recorded by a branch"
                )));
            }
            (None, recorded) => self.stack = recorded,
            (Some(here), None) => info.stack = Some(here),
            _ => {}
        }
        Ok(())
    }

    /// Bind an exception handler entry point; the thrown value is the
    /// only operand on arrival.
    pub fn place_handler(&mut self, label: Label) -> CodeResult<()> {
        if self.stack.is_some() {
            return Err(CompilationError::internal(
                "control falls through into an exception handler",
            ));
        }
        self.labels[label.0 as usize].stack = Some(1);
        self.place(label)?;
        self.max_stack = self.max_stack.max(1);
        Ok(())
    }

    fn record_arrival(&mut self, label: Label, depth: u16) -> CodeResult<()> {
        let info = &mut self.labels[label.0 as usize];
        match info.stack {
            Some(recorded) if recorded != depth => Err(CompilationError::internal(format!(
                "branch to label {} with stack depth {depth}, expected {recorded}",
                label.0
            ))),
            _ => {
                info.stack = Some(depth);
                Ok(())
            }
        }
    }

    // =========================================
    // Stack bookkeeping
    // =========================================

    fn adjust(&mut self, delta: i32) -> CodeResult<()> {
        let Some(depth) = self.stack else {
            return Err(CompilationError::internal(format!(
                "instruction emitted in unreachable code at offset {}",
                self.offset()
            )));
        };
        let depth = depth as i32 + delta;
        if depth < 0 {
            return Err(CompilationError::internal(format!(
                "operand stack underflow at offset {}",
                self.offset()
            )));
        }
        let depth = depth as u16;
        self.stack = Some(depth);
        self.max_stack = self.max_stack.max(depth);
        Ok(())
    }

    fn after(&mut self, op: Opcode) {
        if op.ends_block() {
            self.stack = None;
        }
    }

    fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    // =========================================
    // Instructions
    // =========================================

    /// Emit an instruction without operands.
    pub fn emit(&mut self, op: Opcode) -> CodeResult<()> {
        let delta = op
            .stack_effect()
            .ok_or_else(|| CompilationError::internal(format!("{op:?} needs an explicit stack effect")))?;
        self.adjust(delta)?;
        self.bytes.push(op.into());
        self.after(op);
        Ok(())
    }

    pub fn emit_u8(&mut self, op: Opcode, operand: u8) -> CodeResult<()> {
        self.emit(op)?;
        self.bytes.push(operand);
        Ok(())
    }

    pub fn emit_u16(&mut self, op: Opcode, operand: u16) -> CodeResult<()> {
        self.emit(op)?;
        self.write_u16(operand);
        Ok(())
    }

    /// Push an `int` without touching the constant pool, if it fits an
    /// immediate form.
    pub fn push_small_int(&mut self, value: i32) -> CodeResult<bool> {
        match value {
            -1..=5 => {
                let op = Opcode::try_from((Opcode::Iconst0 as i32 + value) as u8)
                    .map_err(|_| CompilationError::internal("iconst out of range"))?;
                self.emit(op)?;
            }
            v if i8::try_from(v).is_ok() => self.emit_u8(Opcode::Bipush, v as i8 as u8)?,
            v if i16::try_from(v).is_ok() => self.emit_u16(Opcode::Sipush, v as i16 as u16)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Load a pool constant; `wide_value` selects `ldc2_w` for `long` and
    /// `double`.
    pub fn ldc(&mut self, index: u16, wide_value: bool) -> CodeResult<()> {
        if wide_value {
            self.emit_u16(Opcode::Ldc2W, index)
        } else if let Ok(narrow) = u8::try_from(index) {
            self.emit_u8(Opcode::Ldc, narrow)
        } else {
            self.emit_u16(Opcode::LdcW, index)
        }
    }

    fn touch_local(&mut self, slot: u16, kind: ValueKind) {
        let end = slot.saturating_add(kind.words());
        self.max_locals = self.max_locals.max(end);
    }

    /// Reserve locals up to `slots` without accessing them.
    pub fn reserve_locals(&mut self, slots: u16) {
        self.max_locals = self.max_locals.max(slots);
    }

    fn local_op(&mut self, short_base: Opcode, long_form: Opcode, slot: u16) -> CodeResult<()> {
        if slot < 4 {
            let op = Opcode::try_from(u8::from(short_base) + slot as u8)
                .map_err(|_| CompilationError::internal("bad short local opcode"))?;
            self.emit(op)
        } else if let Ok(narrow) = u8::try_from(slot) {
            self.emit_u8(long_form, narrow)
        } else {
            let delta = long_form
                .stack_effect()
                .ok_or_else(|| CompilationError::internal("local access without stack effect"))?;
            self.adjust(delta)?;
            self.bytes.push(Opcode::Wide.into());
            self.bytes.push(long_form.into());
            self.write_u16(slot);
            Ok(())
        }
    }

    pub fn load(&mut self, kind: ValueKind, slot: u16) -> CodeResult<()> {
        const SHORT: [Opcode; 5] = [
            Opcode::Iload0,
            Opcode::Lload0,
            Opcode::Fload0,
            Opcode::Dload0,
            Opcode::Aload0,
        ];
        const LONG: [Opcode; 5] = [
            Opcode::Iload,
            Opcode::Lload,
            Opcode::Fload,
            Opcode::Dload,
            Opcode::Aload,
        ];
        self.touch_local(slot, kind);
        let i = kind.index() as usize;
        self.local_op(SHORT[i], LONG[i], slot)
    }

    pub fn store(&mut self, kind: ValueKind, slot: u16) -> CodeResult<()> {
        const SHORT: [Opcode; 5] = [
            Opcode::Istore0,
            Opcode::Lstore0,
            Opcode::Fstore0,
            Opcode::Dstore0,
            Opcode::Astore0,
        ];
        const LONG: [Opcode; 5] = [
            Opcode::Istore,
            Opcode::Lstore,
            Opcode::Fstore,
            Opcode::Dstore,
            Opcode::Astore,
        ];
        self.touch_local(slot, kind);
        let i = kind.index() as usize;
        self.local_op(SHORT[i], LONG[i], slot)
    }

    /// Add a constant to an `int` local in place.
    pub fn iinc(&mut self, slot: u16, delta: i16) -> CodeResult<()> {
        self.touch_local(slot, ValueKind::Int);
        self.adjust(0)?;
        match (u8::try_from(slot), i8::try_from(delta)) {
            (Ok(slot), Ok(delta)) => {
                self.bytes.push(Opcode::Iinc.into());
                self.bytes.push(slot);
                self.bytes.push(delta as u8);
            }
            _ => {
                self.bytes.push(Opcode::Wide.into());
                self.bytes.push(Opcode::Iinc.into());
                self.write_u16(slot);
                self.write_u16(delta as u16);
            }
        }
        Ok(())
    }

    /// `get`/`put` `field`/`static` of a field occupying `words`.
    pub fn field(&mut self, op: Opcode, index: u16, words: u16) -> CodeResult<()> {
        let words = words as i32;
        let delta = match op {
            Opcode::Getstatic => words,
            Opcode::Putstatic => -words,
            Opcode::Getfield => words - 1,
            Opcode::Putfield => -words - 1,
            other => {
                return Err(CompilationError::internal(format!(
                    "{other:?} is not a field instruction"
                )));
            }
        };
        self.adjust(delta)?;
        self.bytes.push(op.into());
        self.write_u16(index);
        Ok(())
    }

    /// An invocation popping `arg_words` (plus the receiver, unless
    /// static) and pushing `ret_words`.
    pub fn invoke(&mut self, op: Opcode, index: u16, arg_words: u16, ret_words: u16) -> CodeResult<()> {
        let receiver = match op {
            Opcode::Invokestatic => 0,
            Opcode::Invokevirtual | Opcode::Invokespecial | Opcode::Invokeinterface => 1,
            other => {
                return Err(CompilationError::internal(format!(
                    "{other:?} is not an invocation"
                )));
            }
        };
        self.adjust(ret_words as i32 - arg_words as i32 - receiver)?;
        self.bytes.push(op.into());
        self.write_u16(index);
        if op == Opcode::Invokeinterface {
            self.bytes.push((arg_words + 1) as u8);
            self.bytes.push(0);
        }
        Ok(())
    }

    pub fn multianewarray(&mut self, index: u16, dims: u8) -> CodeResult<()> {
        self.adjust(1 - dims as i32)?;
        self.bytes.push(Opcode::Multianewarray.into());
        self.write_u16(index);
        self.bytes.push(dims);
        Ok(())
    }

    // =========================================
    // Branches
    // =========================================

    /// Emit a two-byte-offset branch to `label`.
    pub fn branch(&mut self, op: Opcode, label: Label) -> CodeResult<()> {
        if !op.is_branch() {
            return Err(CompilationError::internal(format!("{op:?} is not a branch")));
        }
        let origin = self.offset();
        let delta = op.stack_effect().unwrap_or(0);
        self.adjust(delta)?;
        let depth = self.stack.unwrap_or(0);
        self.record_arrival(label, depth)?;
        self.bytes.push(op.into());
        self.patches.push(Patch {
            label,
            origin,
            at: self.offset(),
            wide: false,
        });
        self.write_u16(0);
        self.after(op);
        Ok(())
    }

    pub fn goto(&mut self, label: Label) -> CodeResult<()> {
        self.branch(Opcode::Goto, label)
    }

    fn switch_header(&mut self, op: Opcode) -> CodeResult<u32> {
        let origin = self.offset();
        self.adjust(-1)?;
        self.bytes.push(op.into());
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
        Ok(origin)
    }

    fn switch_target(&mut self, origin: u32, label: Label) -> CodeResult<()> {
        let depth = self.stack.unwrap_or(0);
        self.record_arrival(label, depth)?;
        self.patches.push(Patch {
            label,
            origin,
            at: self.offset(),
            wide: true,
        });
        self.write_i32(0);
        Ok(())
    }

    /// `tableswitch` over the dense key range starting at `low`.
    pub fn tableswitch(&mut self, default: Label, low: i32, targets: &[Label]) -> CodeResult<()> {
        let origin = self.switch_header(Opcode::Tableswitch)?;
        self.switch_target(origin, default)?;
        let high = low
            .checked_add(targets.len() as i32 - 1)
            .ok_or_else(|| CompilationError::internal("tableswitch key range overflows"))?;
        self.write_i32(low);
        self.write_i32(high);
        for &target in targets {
            self.switch_target(origin, target)?;
        }
        self.stack = None;
        Ok(())
    }

    /// `lookupswitch`; `pairs` must be sorted by key.
    pub fn lookupswitch(&mut self, default: Label, pairs: &[(i32, Label)]) -> CodeResult<()> {
        let origin = self.switch_header(Opcode::Lookupswitch)?;
        self.switch_target(origin, default)?;
        self.write_i32(pairs.len() as i32);
        for &(key, target) in pairs {
            self.write_i32(key);
            self.switch_target(origin, target)?;
        }
        self.stack = None;
        Ok(())
    }

    // =========================================
    // Tables
    // =========================================

    /// Protect `[start, end)` with a handler at `handler`.
    pub fn add_handler(&mut self, start: Label, end: Label, handler: Label, catch_type: u16) {
        self.handlers.push(PendingHandler {
            start,
            end,
            handler,
            catch_type,
        });
    }

    /// Attribute the following instructions to source `line`.
    pub fn mark_line(&mut self, line: u32) {
        let pc = self.offset();
        match self.lines.last_mut() {
            Some((_, last)) if *last == line => {}
            Some((last_pc, last)) if *last_pc == pc => *last = line,
            _ => self.lines.push((pc, line)),
        }
    }

    fn label_offset(&self, label: Label) -> CodeResult<u32> {
        self.labels[label.0 as usize]
            .offset
            .ok_or_else(|| CompilationError::internal(format!("label {} was never placed", label.0)))
    }

    /// Resolve every branch and produce the method body.
    pub fn finish(mut self) -> CodeResult<Code> {
        if self.stack.is_some() {
            return Err(CompilationError::internal(
                "control falls off the end of the method",
            ));
        }
        if self.bytes.len() > CODE_LIMIT {
            return Err(CompilationError::CodeTooLarge {
                what: "method code".to_string(),
                limit: CODE_LIMIT as u32,
                span: Span::default(),
            });
        }

        let patches = std::mem::take(&mut self.patches);
        for patch in patches {
            let target = self.label_offset(patch.label)?;
            let delta = target as i64 - patch.origin as i64;
            let at = patch.at as usize;
            if patch.wide {
                self.bytes[at..at + 4].copy_from_slice(&(delta as i32).to_be_bytes());
            } else {
                if !(-BRANCH_LIMIT - 1..=BRANCH_LIMIT).contains(&delta) {
                    return Err(CompilationError::CodeTooLarge {
                        what: "branch offset".to_string(),
                        limit: BRANCH_LIMIT as u32,
                        span: Span::default(),
                    });
                }
                self.bytes[at..at + 2].copy_from_slice(&(delta as i16).to_be_bytes());
            }
        }

        let mut exception_table = Vec::with_capacity(self.handlers.len());
        for handler in &self.handlers {
            let start = self.label_offset(handler.start)?;
            let end = self.label_offset(handler.end)?;
            if start >= end {
                continue;
            }
            exception_table.push(ExceptionEntry {
                start_pc: start as u16,
                end_pc: end as u16,
                handler_pc: self.label_offset(handler.handler)? as u16,
                catch_type: handler.catch_type,
            });
        }

        let line_numbers = self
            .lines
            .iter()
            .filter(|(pc, _)| (*pc as usize) < self.bytes.len())
            .map(|&(pc, line)| (pc as u16, u16::try_from(line).unwrap_or(u16::MAX)))
            .collect();

        Ok(Code {
            max_stack: self.max_stack,
            max_locals: self.max_locals,
            bytes: self.bytes,
            exception_table,
            line_numbers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_branch_is_patched() {
        let mut code = CodeBuffer::new(1);
        let end = code.new_label();
        code.load(ValueKind::Int, 0).unwrap();
        code.branch(Opcode::Ifeq, end).unwrap();
        code.emit(Opcode::Iconst1).unwrap();
        code.emit(Opcode::Pop).unwrap();
        code.place(end).unwrap();
        code.emit(Opcode::Return).unwrap();
        let code = code.finish().unwrap();
        // iload_0; ifeq +5; iconst_1; pop; return
        assert_eq!(code.bytes, vec![0x1a, 0x99, 0x00, 0x05, 0x04, 0x57, 0xb1]);
        assert_eq!(code.max_stack, 1);
        assert_eq!(code.max_locals, 1);
    }

    #[test]
    fn backward_branch_is_negative() {
        let mut code = CodeBuffer::new(0);
        let top = code.new_label();
        code.place(top).unwrap();
        code.emit(Opcode::Nop).unwrap();
        code.goto(top).unwrap();
        let code = code.finish().unwrap();
        assert_eq!(code.bytes, vec![0x00, 0xa7, 0xff, 0xff]);
    }

    #[test]
    fn stack_underflow_is_internal() {
        let mut code = CodeBuffer::new(0);
        let err = code.emit(Opcode::Pop).unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
    }

    #[test]
    fn unplaced_label_is_internal() {
        let mut code = CodeBuffer::new(0);
        let nowhere = code.new_label();
        code.goto(nowhere).unwrap();
        assert!(matches!(code.finish(), Err(CompilationError::Internal { .. })));
    }

    #[test]
    fn falling_off_the_end_is_internal() {
        let mut code = CodeBuffer::new(0);
        code.emit(Opcode::Nop).unwrap();
        assert!(code.finish().is_err());
    }

    #[test]
    fn label_depth_mismatch_is_internal() {
        let mut code = CodeBuffer::new(0);
        let join = code.new_label();
        code.emit(Opcode::Iconst0).unwrap();
        code.emit(Opcode::Iconst0).unwrap();
        code.branch(Opcode::Ifeq, join).unwrap();
        code.emit(Opcode::Pop).unwrap();
        assert!(code.place(join).is_err());
    }

    #[test]
    fn unreachable_code_resumes_at_branch_target() {
        let mut code = CodeBuffer::new(0);
        let target = code.new_label();
        code.emit(Opcode::Iconst0).unwrap();
        code.goto(target).unwrap();
        assert!(!code.is_reachable());
        code.place(target).unwrap();
        assert_eq!(code.stack_depth(), Some(1));
        code.emit(Opcode::Ireturn).unwrap();
        assert!(code.finish().is_ok());
    }

    #[test]
    fn long_branch_is_a_code_size_error() {
        let mut code = CodeBuffer::new(0);
        let end = code.new_label();
        code.emit(Opcode::Iconst0).unwrap();
        code.branch(Opcode::Ifeq, end).unwrap();
        for _ in 0..40_000 {
            code.emit(Opcode::Nop).unwrap();
        }
        code.place(end).unwrap();
        code.emit(Opcode::Return).unwrap();
        let err = code.finish().unwrap_err();
        assert!(matches!(err, CompilationError::CodeTooLarge { .. }));
    }

    #[test]
    fn tableswitch_is_aligned() {
        let mut code = CodeBuffer::new(1);
        let default = code.new_label();
        let a = code.new_label();
        code.load(ValueKind::Int, 0).unwrap();
        code.tableswitch(default, 1, &[a, a]).unwrap();
        code.place(a).unwrap();
        code.place(default).unwrap();
        code.emit(Opcode::Return).unwrap();
        let code = code.finish().unwrap();
        // iload_0 at 0, tableswitch at 1, padding to 4, then 5 ints
        assert_eq!(code.bytes[1], 0xaa);
        assert_eq!(code.bytes.len(), 4 + 5 * 4 + 1);
        // default offset, relative to the tableswitch opcode
        assert_eq!(&code.bytes[4..8], &23i32.to_be_bytes());
    }

    #[test]
    fn wide_locals() {
        let mut code = CodeBuffer::new(0);
        code.emit(Opcode::Lconst0).unwrap();
        code.store(ValueKind::Long, 300).unwrap();
        code.iinc(2, 1000).unwrap();
        code.emit(Opcode::Return).unwrap();
        let code = code.finish().unwrap();
        assert_eq!(&code.bytes[1..5], &[0xc4, 0x37, 0x01, 0x2c]);
        assert_eq!(&code.bytes[5..11], &[0xc4, 0x84, 0x00, 0x02, 0x03, 0xe8]);
        assert_eq!(code.max_locals, 302);
    }

    #[test]
    fn handlers_and_lines() {
        let mut code = CodeBuffer::new(0);
        let (start, end, handler, done) = (
            code.new_label(),
            code.new_label(),
            code.new_label(),
            code.new_label(),
        );
        code.mark_line(3);
        code.place(start).unwrap();
        code.emit(Opcode::Nop).unwrap();
        code.place(end).unwrap();
        code.goto(done).unwrap();
        code.mark_line(4);
        code.place_handler(handler).unwrap();
        code.emit(Opcode::Athrow).unwrap();
        code.place(done).unwrap();
        code.emit(Opcode::Return).unwrap();
        code.add_handler(start, end, handler, 0);
        let code = code.finish().unwrap();
        assert_eq!(
            code.exception_table,
            vec![ExceptionEntry {
                start_pc: 0,
                end_pc: 1,
                handler_pc: 4,
                catch_type: 0
            }]
        );
        assert_eq!(code.line_numbers, vec![(0, 3), (4, 4)]);
    }
}
