//! Bytecode generation for a resolved compilation unit.
//!
//! [`generate_unit`] walks each class declaration together with the facts
//! the resolver recorded and writes one class file per class:
//!
//! - fields, with `ConstantValue` for `static final` constants
//! - every method and constructor, plus the default constructor
//! - field initializers and instance initializer blocks inlined into each
//!   constructor that calls `super(...)`
//! - `<clinit>` when static state needs code to initialize
//!
//! Method bodies are lowered by a [`MethodGenerator`], split across
//! `expr.rs` (values and conditions) and `stmt.rs` (control flow).

mod expr;
mod jumps;
mod stmt;

use javelin_core::{AccessFlags, CompilationError, ConstValue, FieldShape, JavaType, MethodShape, PrimitiveType, Span};
use javelin_parser::ast::{Block, CompilationUnit, ConstructorDecl, Expr, Member, TypeDecl};

use crate::bytecode::{ClassWriter, Code, CodeBuffer, ConstantPool, Label, Opcode, ValueKind, newarray_code};
use crate::conversion::{Conversion, converted_type};
use crate::resolve::facts::{Binding, BodyKey, InvokeKind, LocalInfo, MethodRef, ResolvedFacts};
use crate::resolve::{ResolvedClass, ResolvedUnit};
use jumps::JumpStack;

type EmitResult<T> = Result<T, CompilationError>;

/// What the generator writes besides code.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Emit `LineNumberTable` and `SourceFile` attributes.
    pub debug_info: bool,
    /// Value of the `SourceFile` attribute.
    pub source_file: Option<String>,
}

/// One generated class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFileBytes {
    /// Dotted binary name.
    pub binary_name: String,
    pub bytes: Vec<u8>,
}

/// Generate a class file for every class of a resolved unit.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn generate_unit(
    unit: &CompilationUnit<'_>,
    resolved: &ResolvedUnit,
    options: &GenerateOptions,
) -> EmitResult<Vec<ClassFileBytes>> {
    let mut out = Vec::with_capacity(resolved.classes.len());
    for (index, class) in resolved.classes.iter().enumerate() {
        let decl = unit
            .types
            .get(class.decl)
            .ok_or_else(|| CompilationError::internal(format!("no declaration for {}", class.name)))?;
        let generator = ClassGenerator {
            facts: &resolved.facts,
            class,
            decl,
            index: index as u32,
            options,
        };
        let bytes = generator.generate()?;
        log::debug!("generated {} ({} bytes)", class.name, bytes.len());
        out.push(ClassFileBytes {
            binary_name: class.name.clone(),
            bytes,
        });
    }
    Ok(out)
}

fn internal_names(classes: &[String]) -> Vec<String> {
    classes.iter().map(|c| c.replace('.', "/")).collect()
}

/// Whether a field gets a `ConstantValue` attribute instead of code in
/// `<clinit>`.
fn is_constant_field(field: &FieldShape) -> bool {
    field.access.is_static() && field.access.is_final() && field.constant.is_some()
}

fn constant_index(pool: &mut ConstantPool, value: &ConstValue) -> EmitResult<u16> {
    match value {
        ConstValue::Boolean(b) => pool.integer(i32::from(*b)),
        ConstValue::Long(v) => pool.long(*v),
        ConstValue::Float(v) => pool.float(v.0),
        ConstValue::Double(v) => pool.double(v.0),
        ConstValue::String(s) => pool.string(s),
        other => {
            let value = other
                .as_i32()
                .ok_or_else(|| CompilationError::internal(format!("constant {other} has no pool form")))?;
            pool.integer(value)
        }
    }
}

// =========================================
// Classes
// =========================================

struct ClassGenerator<'a, 'ast> {
    facts: &'a ResolvedFacts,
    class: &'a ResolvedClass,
    decl: &'a TypeDecl<'ast>,
    index: u32,
    options: &'a GenerateOptions,
}

impl<'a, 'ast> ClassGenerator<'a, 'ast> {
    fn generate(&self) -> EmitResult<Vec<u8>> {
        let shape = &self.class.shape;
        let debug = self.options.debug_info;
        let superclass = shape.superclass.as_ref().map(|s| s.replace('.', "/"));
        let mut writer = ClassWriter::new(
            shape.access,
            &self.class.name.replace('.', "/"),
            superclass.as_deref(),
        )?;
        for interface in &shape.interfaces {
            writer.add_interface(&interface.replace('.', "/"))?;
        }

        for field in &shape.fields {
            let constant = match &field.constant {
                Some(value) if is_constant_field(field) => Some(constant_index(writer.pool(), value)?),
                _ => None,
            };
            writer.add_field(field.access, &field.name, &field.ty.descriptor(), constant)?;
        }

        for (member_index, member) in self.decl.members.iter().enumerate() {
            let Some(method_index) = self.class.member_methods.get(member_index).copied().flatten() else {
                continue;
            };
            let method = self.method_shape(method_index)?;
            let key = BodyKey::Member {
                class: self.index,
                member: member_index as u32,
            };
            let code = match member {
                Member::Method(decl) => match decl.body {
                    Some(body) => Some(self.method_code(writer.pool(), key, method, body)?),
                    None => None,
                },
                Member::Constructor(ctor) => Some(self.ctor_code(writer.pool(), key, method, Some(ctor))?),
                _ => None,
            };
            writer.add_method(
                method.access,
                &method.name,
                &method.descriptor.to_string(),
                code,
                &internal_names(&method.throws),
                debug,
            )?;
        }

        if let Some(method_index) = self.class.default_ctor {
            let method = self.method_shape(method_index)?;
            let key = BodyKey::Member {
                class: self.index,
                member: self.decl.members.len() as u32,
            };
            let code = self.ctor_code(writer.pool(), key, method, None)?;
            writer.add_method(method.access, &method.name, &method.descriptor.to_string(), Some(code), &[], debug)?;
        }

        if self.needs_static_init() {
            let code = self.static_init_code(writer.pool())?;
            writer.add_method(AccessFlags::STATIC, "<clinit>", "()V", Some(code), &[], debug)?;
        }

        if debug && let Some(file) = &self.options.source_file {
            writer.set_source_file(file)?;
        }
        Ok(writer.into_bytes())
    }

    fn method_shape(&self, index: usize) -> EmitResult<&'a MethodShape> {
        self.class
            .shape
            .methods
            .get(index)
            .ok_or_else(|| CompilationError::internal(format!("{} has no method {index}", self.class.name)))
    }

    fn field_shape(&self, name: &str) -> EmitResult<&'a FieldShape> {
        self.class
            .shape
            .field(name)
            .ok_or_else(|| CompilationError::internal(format!("{} has no field {name}", self.class.name)))
    }

    fn method_code(
        &self,
        pool: &mut ConstantPool,
        key: BodyKey,
        method: &MethodShape,
        body: &'ast Block<'ast>,
    ) -> EmitResult<Code> {
        let is_static = method.access.is_static();
        let params = method.descriptor.arg_slots() + u16::from(!is_static);
        let frame = self.facts.frame(key).max(params);
        let mut generator = MethodGenerator::new(pool, self.facts, params, frame, method.ret().clone());
        generator.block(body)?;
        generator.finish(&method.name, body.span)
    }

    /// A constructor: the `this(...)` or `super(...)` call, then (after
    /// `super`) the instance initializers, then the body.
    fn ctor_code(
        &self,
        pool: &mut ConstantPool,
        key: BodyKey,
        method: &MethodShape,
        ctor: Option<&'ast ConstructorDecl<'ast>>,
    ) -> EmitResult<Code> {
        let params = method.descriptor.arg_slots();
        let init_frame = self.facts.frame(BodyKey::InstanceInit { class: self.index });
        let frame = self
            .facts
            .frame(key)
            .max(init_frame + params)
            .max(params + 1);
        let mut generator = MethodGenerator::new(pool, self.facts, params + 1, frame, JavaType::Void);
        let span = ctor.map_or(self.decl.name.span, |c| c.span);
        generator.mark_line(span);
        generator.load(ValueKind::Reference, 0)?;

        let delegates = match ctor.and_then(|c| c.explicit_call) {
            Some(call) => {
                let fact = self.facts.expr(call.id)?;
                let Binding::Method(target) = &fact.binding else {
                    return Err(CompilationError::internal("constructor call without a constructor"));
                };
                for arg in call.args {
                    generator.expr(*arg)?;
                }
                generator.invoke(target)?;
                call.kind == javelin_parser::ast::CtorCallKind::This
            }
            None => {
                let target = self
                    .facts
                    .implicit_super(key)
                    .ok_or_else(|| CompilationError::internal("no superclass constructor recorded"))?;
                generator.invoke(target)?;
                false
            }
        };

        if !delegates {
            generator.slot_base = params;
            self.initializers(&mut generator, false)?;
            generator.slot_base = 0;
        }
        if let Some(ctor) = ctor {
            generator.block(ctor.body)?;
        }
        generator.finish("<init>", span)
    }

    fn needs_static_init(&self) -> bool {
        let in_interface = self.class.shape.is_interface();
        self.decl.members.iter().any(|member| match member {
            Member::Field(field) if in_interface || field.modifiers.contains(javelin_parser::ast::Modifiers::STATIC) => {
                field.declarators.iter().any(|d| {
                    d.init.is_some()
                        && self
                            .class
                            .shape
                            .field(d.name.name)
                            .is_some_and(|f| !is_constant_field(f))
                })
            }
            Member::Initializer(init) => init.is_static,
            _ => false,
        })
    }

    fn static_init_code(&self, pool: &mut ConstantPool) -> EmitResult<Code> {
        let frame = self.facts.frame(BodyKey::StaticInit { class: self.index });
        let mut generator = MethodGenerator::new(pool, self.facts, 0, frame, JavaType::Void);
        self.initializers(&mut generator, true)?;
        generator.finish("<clinit>", self.decl.name.span)
    }

    /// Field initializers and initializer blocks of one kind, in
    /// declaration order.
    fn initializers(&self, generator: &mut MethodGenerator<'_, 'ast>, is_static: bool) -> EmitResult<()> {
        let in_interface = self.class.shape.is_interface();
        for member in self.decl.members {
            match member {
                Member::Field(field) => {
                    let field_static = in_interface || field.modifiers.contains(javelin_parser::ast::Modifiers::STATIC);
                    if field_static != is_static {
                        continue;
                    }
                    for declarator in field.declarators {
                        let Some(init) = declarator.init else { continue };
                        let shape = self.field_shape(declarator.name.name)?;
                        if is_constant_field(shape) {
                            continue;
                        }
                        generator.field_initializer(&self.class.name, shape, init)?;
                    }
                }
                Member::Initializer(init) if init.is_static == is_static => generator.block(init.body)?,
                _ => {}
            }
        }
        Ok(())
    }
}

// =========================================
// Methods
// =========================================

/// Lowers one method body into a [`CodeBuffer`].
///
/// Every emitting helper is a no-op while the current position is
/// unreachable, so dead branches of constant conditions produce no code.
/// Labels are still created and placed.
pub(crate) struct MethodGenerator<'a, 'ast> {
    pool: &'a mut ConstantPool,
    facts: &'a ResolvedFacts,
    code: CodeBuffer,
    jumps: JumpStack<'ast>,
    return_type: JavaType,
    /// Added to the slots of locals resolved in another frame: instance
    /// initializer locals live after the parameters of the constructor
    /// they are inlined into.
    slot_base: u16,
    /// First slot free for compiler temporaries.
    next_temp: u16,
}

impl<'a, 'ast> MethodGenerator<'a, 'ast> {
    fn new(
        pool: &'a mut ConstantPool,
        facts: &'a ResolvedFacts,
        param_slots: u16,
        frame: u16,
        return_type: JavaType,
    ) -> Self {
        let next_temp = frame.max(param_slots);
        let mut code = CodeBuffer::new(param_slots);
        code.reserve_locals(next_temp);
        Self {
            pool,
            facts,
            code,
            jumps: JumpStack::new(),
            return_type,
            slot_base: 0,
            next_temp,
        }
    }

    /// Add the implicit `return` of a `void` body and produce its code.
    fn finish(mut self, name: &str, span: Span) -> EmitResult<Code> {
        if self.live() {
            if !self.return_type.is_void() {
                return Err(CompilationError::internal(format!("{name} falls off its end")));
            }
            self.mark_line(span);
            self.op(Opcode::Return)?;
        }
        let code = self.code.finish().map_err(|err| match err {
            CompilationError::CodeTooLarge { what, limit, .. } => CompilationError::CodeTooLarge { what, limit, span },
            other => other,
        })?;
        log::trace!(
            "{name}: {} bytes, max_stack {}, max_locals {}",
            code.bytes.len(),
            code.max_stack,
            code.max_locals
        );
        Ok(code)
    }

    fn field_initializer(&mut self, owner: &str, field: &FieldShape, init: Expr<'ast>) -> EmitResult<()> {
        self.mark_line(init.span());
        let is_static = field.access.is_static();
        if !is_static {
            self.load(ValueKind::Reference, 0)?;
        }
        self.expr(init)?;
        let op = if is_static { Opcode::Putstatic } else { Opcode::Putfield };
        self.field_op(op, owner, &field.name, &field.ty)
    }

    // =========================================
    // Instructions
    // =========================================

    #[inline]
    fn live(&self) -> bool {
        self.code.is_reachable()
    }

    fn mark_line(&mut self, span: Span) {
        if span.line > 0 {
            self.code.mark_line(span.line);
        }
    }

    fn op(&mut self, op: Opcode) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        self.code.emit(op)
    }

    fn new_label(&mut self) -> Label {
        self.code.new_label()
    }

    fn place(&mut self, label: Label) -> EmitResult<()> {
        self.code.place(label)
    }

    fn branch(&mut self, op: Opcode, label: Label) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        self.code.branch(op, label)
    }

    fn goto(&mut self, label: Label) -> EmitResult<()> {
        self.branch(Opcode::Goto, label)
    }

    fn load(&mut self, kind: ValueKind, slot: u16) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        self.code.load(kind, slot)
    }

    fn store(&mut self, kind: ValueKind, slot: u16) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        self.code.store(kind, slot)
    }

    fn iinc(&mut self, slot: u16, delta: i16) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        self.code.iinc(slot, delta)
    }

    /// An instruction taking a class constant: `new`, `anewarray`,
    /// `checkcast`, `instanceof`.
    fn class_op(&mut self, op: Opcode, ty: &JavaType) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        let index = self.pool.class(&ty.internal_name())?;
        self.code.emit_u16(op, index)
    }

    fn field_op(&mut self, op: Opcode, owner: &str, name: &str, ty: &JavaType) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        let index = self.pool.field_ref(&owner.replace('.', "/"), name, &ty.descriptor())?;
        self.code.field(op, index, ty.slot_size())
    }

    fn invoke(&mut self, method: &MethodRef) -> EmitResult<()> {
        let op = match method.kind {
            InvokeKind::Static => Opcode::Invokestatic,
            InvokeKind::Virtual => Opcode::Invokevirtual,
            InvokeKind::Interface => Opcode::Invokeinterface,
            InvokeKind::Special => Opcode::Invokespecial,
        };
        self.invoke_raw(
            op,
            &method.owner.internal_name(),
            &method.name,
            &method.descriptor.to_string(),
            method.descriptor.arg_slots(),
            method.descriptor.ret.slot_size(),
        )
    }

    fn invoke_raw(
        &mut self,
        op: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
        arg_words: u16,
        ret_words: u16,
    ) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        let index = self
            .pool
            .method_ref(owner, name, descriptor, op == Opcode::Invokeinterface)?;
        self.code.invoke(op, index, arg_words, ret_words)
    }

    fn pop_value(&mut self, ty: &JavaType) -> EmitResult<()> {
        if ty.is_void() {
            return Ok(());
        }
        self.op(ValueKind::of(ty).pop_op())
    }

    // =========================================
    // Locals
    // =========================================

    fn slot(&self, local: &LocalInfo) -> u16 {
        local.slot + self.slot_base
    }

    /// Reserve `words` slots for a temporary. Release by resetting
    /// `next_temp`.
    fn alloc_temp(&mut self, words: u16) -> u16 {
        let slot = self.next_temp;
        self.next_temp += words;
        slot
    }

    // =========================================
    // Constants
    // =========================================

    fn push_int(&mut self, value: i32) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        if !self.code.push_small_int(value)? {
            let index = self.pool.integer(value)?;
            self.code.ldc(index, false)?;
        }
        Ok(())
    }

    fn push_constant(&mut self, value: &ConstValue) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        match value {
            ConstValue::Boolean(b) => self.push_int(i32::from(*b)),
            ConstValue::Long(0) => self.op(Opcode::Lconst0),
            ConstValue::Long(1) => self.op(Opcode::Lconst1),
            ConstValue::Long(v) => {
                let index = self.pool.long(*v)?;
                self.code.ldc(index, true)
            }
            ConstValue::Float(v) => match v.0 {
                f if f.to_bits() == 0.0f32.to_bits() => self.op(Opcode::Fconst0),
                1.0 => self.op(Opcode::Fconst1),
                2.0 => self.op(Opcode::Fconst2),
                f => {
                    let index = self.pool.float(f)?;
                    self.code.ldc(index, false)
                }
            },
            ConstValue::Double(v) => match v.0 {
                d if d.to_bits() == 0.0f64.to_bits() => self.op(Opcode::Dconst0),
                1.0 => self.op(Opcode::Dconst1),
                d => {
                    let index = self.pool.double(d)?;
                    self.code.ldc(index, true)
                }
            },
            ConstValue::String(s) => {
                let index = self.pool.string(s)?;
                self.code.ldc(index, false)
            }
            other => {
                let value = other
                    .as_i32()
                    .ok_or_else(|| CompilationError::internal(format!("cannot push {other}")))?;
                self.push_int(value)
            }
        }
    }

    /// Push a constant already converted for its context where the
    /// conversion is a primitive one.
    fn converted_constant(&mut self, value: &ConstValue, ty: &JavaType, conversion: &Conversion) -> EmitResult<()> {
        let folded = match conversion {
            Conversion::WideningPrimitive(p) | Conversion::NarrowingPrimitive(p) => value.convert_to(*p),
            Conversion::NarrowingBoxing(p) => {
                let narrowed = value
                    .convert_to(*p)
                    .ok_or_else(|| CompilationError::internal(format!("cannot narrow {value}")))?;
                self.push_constant(&narrowed)?;
                return self.box_value(*p);
            }
            _ => None,
        };
        match folded {
            Some(folded) => self.push_constant(&folded),
            None => {
                self.push_constant(value)?;
                self.convert(conversion, ty)
            }
        }
    }

    // =========================================
    // Conversions
    // =========================================

    /// Emit `conversion` for a value of static type `from`.
    fn convert(&mut self, conversion: &Conversion, from: &JavaType) -> EmitResult<()> {
        match conversion {
            Conversion::Identity | Conversion::WideningReference => Ok(()),
            Conversion::WideningPrimitive(to) | Conversion::NarrowingPrimitive(to) => {
                let from = from
                    .as_primitive()
                    .ok_or_else(|| CompilationError::internal(format!("primitive conversion from {from}")))?;
                self.primitive(from, *to)
            }
            Conversion::NarrowingReference(to) => self.class_op(Opcode::Checkcast, to),
            Conversion::Boxing(p) => self.box_value(*p),
            Conversion::Unboxing(p) => self.unbox(*p),
            Conversion::UnboxingWidening { unboxed, target } => {
                self.unbox(*unboxed)?;
                self.primitive(*unboxed, *target)
            }
            Conversion::NarrowingBoxing(p) => {
                self.primitive(PrimitiveType::Int, *p)?;
                self.box_value(*p)
            }
            Conversion::CheckedUnboxing(p) => {
                self.class_op(Opcode::Checkcast, &JavaType::class(p.box_class()))?;
                self.unbox(*p)
            }
        }
    }

    /// Apply a list of conversions, returning the resulting type.
    fn convert_all(&mut self, conversions: &[Conversion], from: &JavaType) -> EmitResult<JavaType> {
        let mut ty = from.clone();
        for conversion in conversions {
            self.convert(conversion, &ty)?;
            ty = converted_type(&ty, conversion);
        }
        Ok(ty)
    }

    fn primitive(&mut self, from: PrimitiveType, to: PrimitiveType) -> EmitResult<()> {
        use PrimitiveType::*;
        if from == to {
            return Ok(());
        }
        let int_kind = |p: PrimitiveType| !matches!(p, Long | Float | Double);
        let (first, narrow) = match (from, to) {
            (f, t) if int_kind(f) && int_kind(t) => (None, Some(t)),
            (f, Long) if int_kind(f) => (Some(Opcode::I2l), None),
            (f, Float) if int_kind(f) => (Some(Opcode::I2f), None),
            (f, Double) if int_kind(f) => (Some(Opcode::I2d), None),
            (Long, Float) => (Some(Opcode::L2f), None),
            (Long, Double) => (Some(Opcode::L2d), None),
            (Long, t) => (Some(Opcode::L2i), Some(t)),
            (Float, Long) => (Some(Opcode::F2l), None),
            (Float, Double) => (Some(Opcode::F2d), None),
            (Float, t) => (Some(Opcode::F2i), Some(t)),
            (Double, Long) => (Some(Opcode::D2l), None),
            (Double, Float) => (Some(Opcode::D2f), None),
            (Double, t) => (Some(Opcode::D2i), Some(t)),
            _ => return Err(CompilationError::internal(format!("no conversion from {from:?} to {to:?}"))),
        };
        if let Some(op) = first {
            self.op(op)?;
        }
        // Narrow within the int kind when the source range does not fit.
        let narrow_op = match (narrow, from) {
            (Some(Byte), Byte) => None,
            (Some(Byte), _) => Some(Opcode::I2b),
            (Some(Short), Byte | Short) => None,
            (Some(Short), _) => Some(Opcode::I2s),
            (Some(Char), Char) => None,
            (Some(Char), _) => Some(Opcode::I2c),
            _ => None,
        };
        match narrow_op {
            Some(op) => self.op(op),
            None => Ok(()),
        }
    }

    fn box_value(&mut self, p: PrimitiveType) -> EmitResult<()> {
        let owner = p.box_class().replace('.', "/");
        let descriptor = format!("({})L{owner};", p.descriptor());
        self.invoke_raw(Opcode::Invokestatic, &owner, "valueOf", &descriptor, p.slot_size(), 1)
    }

    fn unbox(&mut self, p: PrimitiveType) -> EmitResult<()> {
        let owner = p.box_class().replace('.', "/");
        let descriptor = format!("(){}", p.descriptor());
        self.invoke_raw(Opcode::Invokevirtual, &owner, p.unbox_method(), &descriptor, 0, p.slot_size())
    }

    // =========================================
    // Arrays
    // =========================================

    fn new_array_of(&mut self, element: &JavaType) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        match element {
            JavaType::Primitive(p) => self.code.emit_u8(Opcode::Newarray, newarray_code(*p)),
            other => self.class_op(Opcode::Anewarray, other),
        }
    }

    fn array_load(&mut self, element: &JavaType) -> EmitResult<()> {
        use PrimitiveType::*;
        self.op(match element.as_primitive() {
            Some(Boolean | Byte) => Opcode::Baload,
            Some(Char) => Opcode::Caload,
            Some(Short) => Opcode::Saload,
            Some(Int) => Opcode::Iaload,
            Some(Long) => Opcode::Laload,
            Some(Float) => Opcode::Faload,
            Some(Double) => Opcode::Daload,
            None => Opcode::Aaload,
        })
    }

    fn array_store(&mut self, element: &JavaType) -> EmitResult<()> {
        use PrimitiveType::*;
        self.op(match element.as_primitive() {
            Some(Boolean | Byte) => Opcode::Bastore,
            Some(Char) => Opcode::Castore,
            Some(Short) => Opcode::Sastore,
            Some(Int) => Opcode::Iastore,
            Some(Long) => Opcode::Lastore,
            Some(Float) => Opcode::Fastore,
            Some(Double) => Opcode::Dastore,
            None => Opcode::Aastore,
        })
    }
}

#[cfg(test)]
mod tests;
