//! Expression lowering.
//!
//! Values are produced by [`MethodGenerator::expr`], which pushes the raw
//! value and then applies the conversion the resolver recorded for the
//! node. Conditions go through [`MethodGenerator::branch_on`] so `&&`,
//! `||`, `!` and comparisons become branches instead of materialized
//! booleans.

use javelin_core::{CompilationError, ConstValue, JavaType, PrimitiveType};
use javelin_parser::ast::{
    ArrayInitExpr, AssignExpr, BinaryExpr, BinaryOp, Expr, NewArrayExpr, PostfixOp, Receiver, UnaryOp,
};

use super::{EmitResult, MethodGenerator};
use crate::bytecode::{Label, Opcode, ValueKind};
use crate::conversion::converted_type;
use crate::resolve::facts::{Binding, ExprFact, FieldRef, InvokeKind, NameStep};

const STRING_BUILDER: &str = "java/lang/StringBuilder";

/// Where an assignment stores. The receiver words are already on the
/// stack when a place is returned.
enum Place<'f> {
    Local { slot: u16, ty: &'f JavaType },
    Static(&'f FieldRef),
    Instance(&'f FieldRef),
    /// Array reference and index are on the stack.
    Array(JavaType),
}

impl Place<'_> {
    fn ty(&self) -> &JavaType {
        match self {
            Place::Local { ty, .. } => ty,
            Place::Static(field) | Place::Instance(field) => &field.ty,
            Place::Array(element) => element,
        }
    }

    fn receiver_words(&self) -> u16 {
        match self {
            Place::Local { .. } | Place::Static(_) => 0,
            Place::Instance(_) => 1,
            Place::Array(_) => 2,
        }
    }
}

fn arith_op(op: BinaryOp, kind: ValueKind) -> Option<Opcode> {
    use BinaryOp::*;
    use ValueKind::*;
    Some(match (op, kind) {
        (Add, Int) => Opcode::Iadd,
        (Add, Long) => Opcode::Ladd,
        (Add, Float) => Opcode::Fadd,
        (Add, Double) => Opcode::Dadd,
        (Sub, Int) => Opcode::Isub,
        (Sub, Long) => Opcode::Lsub,
        (Sub, Float) => Opcode::Fsub,
        (Sub, Double) => Opcode::Dsub,
        (Mul, Int) => Opcode::Imul,
        (Mul, Long) => Opcode::Lmul,
        (Mul, Float) => Opcode::Fmul,
        (Mul, Double) => Opcode::Dmul,
        (Div, Int) => Opcode::Idiv,
        (Div, Long) => Opcode::Ldiv,
        (Div, Float) => Opcode::Fdiv,
        (Div, Double) => Opcode::Ddiv,
        (Rem, Int) => Opcode::Irem,
        (Rem, Long) => Opcode::Lrem,
        (Rem, Float) => Opcode::Frem,
        (Rem, Double) => Opcode::Drem,
        (ShiftLeft, Int) => Opcode::Ishl,
        (ShiftLeft, Long) => Opcode::Lshl,
        (ShiftRight, Int) => Opcode::Ishr,
        (ShiftRight, Long) => Opcode::Lshr,
        (ShiftRightUnsigned, Int) => Opcode::Iushr,
        (ShiftRightUnsigned, Long) => Opcode::Lushr,
        (BitAnd, Int) => Opcode::Iand,
        (BitAnd, Long) => Opcode::Land,
        (BitOr, Int) => Opcode::Ior,
        (BitOr, Long) => Opcode::Lor,
        (BitXor, Int) => Opcode::Ixor,
        (BitXor, Long) => Opcode::Lxor,
        _ => return None,
    })
}

/// The `if<cond>` against zero that jumps when `op` holds.
fn zero_branch(op: BinaryOp) -> Option<Opcode> {
    Some(match op {
        BinaryOp::Equal => Opcode::Ifeq,
        BinaryOp::NotEqual => Opcode::Ifne,
        BinaryOp::Less => Opcode::Iflt,
        BinaryOp::LessEqual => Opcode::Ifle,
        BinaryOp::Greater => Opcode::Ifgt,
        BinaryOp::GreaterEqual => Opcode::Ifge,
        _ => return None,
    })
}

fn int_branch(zero: Opcode) -> Opcode {
    match zero {
        Opcode::Ifeq => Opcode::IfIcmpeq,
        Opcode::Ifne => Opcode::IfIcmpne,
        Opcode::Iflt => Opcode::IfIcmplt,
        Opcode::Ifle => Opcode::IfIcmple,
        Opcode::Ifgt => Opcode::IfIcmpgt,
        _ => Opcode::IfIcmpge,
    }
}

fn operator_type(fact: &ExprFact) -> EmitResult<&JavaType> {
    match &fact.binding {
        Binding::Operator { operand, .. } => Ok(operand),
        other => Err(CompilationError::internal(format!("operator without operand type: {other:?}"))),
    }
}

impl<'a, 'ast> MethodGenerator<'a, 'ast> {
    // =========================================
    // Values
    // =========================================

    /// Push the value of `expr` converted for its context.
    pub(super) fn expr(&mut self, expr: Expr<'ast>) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        let facts = self.facts;
        let fact = facts.expr(expr.id())?;
        if let Some(value) = &fact.constant {
            return self.converted_constant(value, &fact.ty, &fact.conversion);
        }
        self.raw(expr, fact)?;
        self.convert(&fact.conversion, &fact.ty)
    }

    /// Evaluate a statement expression for its side effects.
    pub(super) fn discard(&mut self, expr: Expr<'ast>) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        let facts = self.facts;
        let fact = facts.expr(expr.id())?;
        match expr {
            Expr::Assign(assign) => self.assign(assign, fact, false),
            Expr::Unary(unary) if matches!(unary.op, UnaryOp::PreInc | UnaryOp::PreDec) => {
                self.increment(unary.operand, unary.op == UnaryOp::PreInc, true, fact, false)
            }
            Expr::Postfix(postfix) => self.increment(postfix.operand, postfix.op == PostfixOp::Inc, false, fact, false),
            _ => {
                self.expr(expr)?;
                self.pop_value(&converted_type(&fact.ty, &fact.conversion))
            }
        }
    }

    /// The value of `expr` before its context conversion.
    fn raw(&mut self, expr: Expr<'ast>, fact: &'a ExprFact) -> EmitResult<()> {
        match expr {
            Expr::Literal(_) => self.op(Opcode::AconstNull),
            Expr::Name(name) => match &fact.binding {
                Binding::Path(steps) => self.path(steps).map(|_| ()),
                other => Err(CompilationError::internal(format!("{} bound to {other:?}", name.dotted()))),
            },
            Expr::This(_) => self.load(ValueKind::Reference, 0),
            Expr::FieldAccess(access) => match &fact.binding {
                Binding::ArrayLength => {
                    self.member_receiver(access.target, false)?;
                    self.op(Opcode::Arraylength)
                }
                Binding::Field(field) => {
                    self.member_receiver(access.target, field.is_static)?;
                    self.get_field(field)
                }
                other => Err(CompilationError::internal(format!("field access bound to {other:?}"))),
            },
            Expr::MethodCall(call) => {
                let Binding::Method(method) = &fact.binding else {
                    return Err(CompilationError::internal(format!("call of {} has no method", call.name)));
                };
                let is_static = method.kind == InvokeKind::Static;
                match call.target {
                    None if !is_static => self.load(ValueKind::Reference, 0)?,
                    None => {}
                    Some(target) => self.member_receiver(target, is_static)?,
                }
                for arg in call.args {
                    self.expr(*arg)?;
                }
                self.invoke(method)?;
                if matches!(method.owner, JavaType::Array(_)) {
                    // clone() on an array is declared to return Object.
                    self.class_op(Opcode::Checkcast, &fact.ty)?;
                }
                Ok(())
            }
            Expr::New(new) => {
                let Binding::Method(ctor) = &fact.binding else {
                    return Err(CompilationError::internal("instance creation without a constructor"));
                };
                self.class_op(Opcode::New, &fact.ty)?;
                self.op(Opcode::Dup)?;
                for arg in new.args {
                    self.expr(*arg)?;
                }
                self.invoke(ctor)
            }
            Expr::NewArray(new) => self.new_array(new, &fact.ty),
            Expr::ArrayInit(init) => self.array_init(init, &fact.ty),
            Expr::Index(index) => {
                self.expr(index.array)?;
                self.expr(index.index)?;
                self.array_load(&fact.ty)
            }
            Expr::Assign(assign) => self.assign(assign, fact, true),
            Expr::Unary(unary) => match unary.op {
                UnaryOp::PreInc | UnaryOp::PreDec => {
                    self.increment(unary.operand, unary.op == UnaryOp::PreInc, true, fact, true)
                }
                UnaryOp::Not => self.boolean_value(expr),
                UnaryOp::Plus => self.expr(unary.operand),
                UnaryOp::Neg => {
                    self.expr(unary.operand)?;
                    self.op(match ValueKind::of(&fact.ty) {
                        ValueKind::Long => Opcode::Lneg,
                        ValueKind::Float => Opcode::Fneg,
                        ValueKind::Double => Opcode::Dneg,
                        _ => Opcode::Ineg,
                    })
                }
                UnaryOp::BitNot => {
                    self.expr(unary.operand)?;
                    if fact.ty == JavaType::LONG {
                        self.push_constant(&ConstValue::Long(-1))?;
                        self.op(Opcode::Lxor)
                    } else {
                        self.push_int(-1)?;
                        self.op(Opcode::Ixor)
                    }
                }
            },
            Expr::Postfix(postfix) => self.increment(postfix.operand, postfix.op == PostfixOp::Inc, false, fact, true),
            Expr::Binary(binary) => {
                if binary.op.is_short_circuit() || binary.op.is_comparison() {
                    return self.boolean_value(expr);
                }
                if binary.op == BinaryOp::Add && fact.ty.is_string() {
                    return self.concat(binary);
                }
                let operand = operator_type(fact)?;
                self.expr(binary.left)?;
                self.expr(binary.right)?;
                self.shift_count(binary.op, binary.right)?;
                let op = arith_op(binary.op, ValueKind::of(operand)).ok_or_else(|| {
                    CompilationError::internal(format!("no instruction for {} on {operand}", binary.op.as_str()))
                })?;
                self.op(op)
            }
            Expr::Conditional(cond) => {
                let (else_label, end) = (self.new_label(), self.new_label());
                self.branch_on(cond.condition, false, else_label)?;
                self.expr(cond.then_expr)?;
                self.goto(end)?;
                self.place(else_label)?;
                self.expr(cond.else_expr)?;
                self.place(end)
            }
            Expr::Cast(cast) => self.expr(cast.expr),
            Expr::InstanceOf(test) => {
                let Binding::Type(target) = &fact.binding else {
                    return Err(CompilationError::internal("instanceof without a type"));
                };
                self.expr(test.expr)?;
                self.class_op(Opcode::Instanceof, target)
            }
            Expr::Paren(paren) => self.expr(paren.expr),
        }
    }

    /// A `long` shift count is truncated to `int`.
    fn shift_count(&mut self, op: BinaryOp, right: Expr<'ast>) -> EmitResult<()> {
        if !op.is_shift() {
            return Ok(());
        }
        let fact = self.facts.expr(right.id())?;
        if converted_type(&fact.ty, &fact.conversion) == JavaType::LONG {
            self.op(Opcode::L2i)?;
        }
        Ok(())
    }

    /// Load a dotted name, returning the type of its value.
    fn path(&mut self, steps: &'a [NameStep]) -> EmitResult<JavaType> {
        let facts = self.facts;
        let mut current: Option<JavaType> = None;
        for step in steps {
            let ty = match step {
                NameStep::Local(id) => {
                    let local = facts.local(*id)?;
                    self.load(ValueKind::of(&local.ty), self.slot(local))?;
                    local.ty.clone()
                }
                NameStep::Field(field) => {
                    if field.is_static {
                        if let Some(prefix) = &current {
                            self.pop_value(prefix)?;
                        }
                    } else if current.is_none() {
                        self.load(ValueKind::Reference, 0)?;
                    }
                    self.get_field(field)?;
                    field.ty.clone()
                }
                NameStep::ArrayLength => {
                    self.op(Opcode::Arraylength)?;
                    JavaType::INT
                }
            };
            current = Some(ty);
        }
        current.ok_or_else(|| CompilationError::internal("empty name path"))
    }

    fn names_type(&self, expr: Expr<'ast>) -> bool {
        matches!(expr, Expr::Name(_))
            && self
                .facts
                .get(expr.id())
                .is_some_and(|f| matches!(f.binding, Binding::Type(_)))
    }

    /// Evaluate the qualifier of a member access, leaving it on the stack
    /// for instance members only.
    fn member_receiver(&mut self, target: Receiver<'ast>, is_static: bool) -> EmitResult<()> {
        match target {
            Receiver::Super(_) if is_static => Ok(()),
            Receiver::Super(_) => self.load(ValueKind::Reference, 0),
            Receiver::Expr(expr) if self.names_type(expr) => Ok(()),
            Receiver::Expr(expr) => {
                self.expr(expr)?;
                if is_static {
                    self.op(Opcode::Pop)?;
                }
                Ok(())
            }
        }
    }

    fn get_field(&mut self, field: &FieldRef) -> EmitResult<()> {
        let op = if field.is_static { Opcode::Getstatic } else { Opcode::Getfield };
        self.field_op(op, &field.owner, &field.name, &field.ty)
    }

    fn put_field(&mut self, field: &FieldRef) -> EmitResult<()> {
        let op = if field.is_static { Opcode::Putstatic } else { Opcode::Putfield };
        self.field_op(op, &field.owner, &field.name, &field.ty)
    }

    // =========================================
    // Arrays
    // =========================================

    fn new_array(&mut self, new: &'ast NewArrayExpr<'ast>, ty: &JavaType) -> EmitResult<()> {
        if let Some(init) = new.init {
            return self.array_init(init, ty);
        }
        for dim in new.dim_exprs {
            self.expr(*dim)?;
        }
        if new.dim_exprs.len() == 1 {
            let element = ty
                .element_type()
                .ok_or_else(|| CompilationError::internal(format!("{ty} is not an array")))?;
            return self.new_array_of(element);
        }
        if self.live() {
            let index = self.pool.class(&ty.internal_name())?;
            self.code.multianewarray(index, new.dim_exprs.len() as u8)?;
        }
        Ok(())
    }

    fn array_init(&mut self, init: &'ast ArrayInitExpr<'ast>, ty: &JavaType) -> EmitResult<()> {
        let element = ty
            .element_type()
            .cloned()
            .ok_or_else(|| CompilationError::internal(format!("array initializer of type {ty}")))?;
        self.push_int(init.elements.len() as i32)?;
        self.new_array_of(&element)?;
        for (index, value) in init.elements.iter().enumerate() {
            self.op(Opcode::Dup)?;
            self.push_int(index as i32)?;
            self.expr(*value)?;
            self.array_store(&element)?;
        }
        Ok(())
    }

    // =========================================
    // Assignment
    // =========================================

    /// Push the receiver of an assignment target.
    fn lvalue(&mut self, target: Expr<'ast>) -> EmitResult<Place<'a>> {
        let facts = self.facts;
        let inner = target.unparenthesized();
        let fact = facts.expr(inner.id())?;
        match (inner, &fact.binding) {
            (Expr::Name(_), Binding::Path(steps)) => {
                let Some((last, prefix)) = steps.split_last() else {
                    return Err(CompilationError::internal("empty name path"));
                };
                match last {
                    NameStep::Local(id) => {
                        let local = facts.local(*id)?;
                        Ok(Place::Local {
                            slot: self.slot(local),
                            ty: &local.ty,
                        })
                    }
                    NameStep::Field(field) if field.is_static => {
                        if !prefix.is_empty() {
                            let ty = self.path(prefix)?;
                            self.pop_value(&ty)?;
                        }
                        Ok(Place::Static(field))
                    }
                    NameStep::Field(field) => {
                        if prefix.is_empty() {
                            self.load(ValueKind::Reference, 0)?;
                        } else {
                            self.path(prefix)?;
                        }
                        Ok(Place::Instance(field))
                    }
                    NameStep::ArrayLength => Err(CompilationError::internal("assignment to array length")),
                }
            }
            (Expr::FieldAccess(access), Binding::Field(field)) => {
                self.member_receiver(access.target, field.is_static)?;
                Ok(if field.is_static {
                    Place::Static(field)
                } else {
                    Place::Instance(field)
                })
            }
            (Expr::Index(index), _) => {
                self.expr(index.array)?;
                self.expr(index.index)?;
                Ok(Place::Array(fact.ty.clone()))
            }
            _ => Err(CompilationError::internal("assignment to a value that is not a variable")),
        }
    }

    /// Load the current value of a place, duplicating its receiver first
    /// when `keep_receiver` is set.
    fn place_load(&mut self, place: &Place<'a>, keep_receiver: bool) -> EmitResult<()> {
        if keep_receiver {
            match place.receiver_words() {
                1 => self.op(Opcode::Dup)?,
                2 => self.op(Opcode::Dup2)?,
                _ => {}
            }
        }
        match place {
            Place::Local { slot, ty } => self.load(ValueKind::of(ty), *slot),
            Place::Static(field) | Place::Instance(field) => self.get_field(field),
            Place::Array(element) => self.array_load(element),
        }
    }

    fn place_store(&mut self, place: &Place<'a>) -> EmitResult<()> {
        match place {
            Place::Local { slot, ty } => self.store(ValueKind::of(ty), *slot),
            Place::Static(field) | Place::Instance(field) => self.put_field(field),
            Place::Array(element) => self.array_store(element),
        }
    }

    /// Copy the value on top of the stack below the receiver of `place`.
    fn keep_value(&mut self, place: &Place<'a>) -> EmitResult<()> {
        let kind = ValueKind::of(place.ty());
        self.op(kind.dup_below_op(place.receiver_words()))
    }

    fn assign(&mut self, assign: &'ast AssignExpr<'ast>, fact: &'a ExprFact, want_value: bool) -> EmitResult<()> {
        let facts = self.facts;
        let place = self.lvalue(assign.target)?;
        let Some(op) = assign.op.binary_op() else {
            self.expr(assign.value)?;
            if want_value {
                self.keep_value(&place)?;
            }
            return self.place_store(&place);
        };

        let Binding::Operator { operand, result } = &fact.binding else {
            return Err(CompilationError::internal("compound assignment without operator"));
        };
        self.place_load(&place, true)?;
        if operand.is_string() {
            // String.valueOf keeps a null target printing as "null".
            self.invoke_raw(
                Opcode::Invokestatic,
                "java/lang/String",
                "valueOf",
                "(Ljava/lang/Object;)Ljava/lang/String;",
                1,
                1,
            )?;
            self.class_op(Opcode::New, &JavaType::class("java.lang.StringBuilder"))?;
            self.op(Opcode::DupX1)?;
            self.op(Opcode::Swap)?;
            self.invoke_raw(Opcode::Invokespecial, STRING_BUILDER, "<init>", "(Ljava/lang/String;)V", 1, 0)?;
            self.append(assign.value)?;
            self.invoke_raw(Opcode::Invokevirtual, STRING_BUILDER, "toString", "()Ljava/lang/String;", 0, 1)?;
        } else {
            let target = facts.expr(assign.target.id())?;
            self.convert(&target.conversion, place.ty())?;
            self.expr(assign.value)?;
            self.shift_count(op, assign.value)?;
            let instruction = arith_op(op, ValueKind::of(operand)).ok_or_else(|| {
                CompilationError::internal(format!("no instruction for {}= on {operand}", op.as_str()))
            })?;
            self.op(instruction)?;
            self.convert_all(result, operand)?;
        }
        if want_value {
            self.keep_value(&place)?;
        }
        self.place_store(&place)
    }

    /// `++` and `--`, prefix or postfix.
    fn increment(
        &mut self,
        operand: Expr<'ast>,
        is_increment: bool,
        prefix: bool,
        fact: &'a ExprFact,
        want_value: bool,
    ) -> EmitResult<()> {
        let facts = self.facts;
        let Binding::Operator { operand: promoted, result } = &fact.binding else {
            return Err(CompilationError::internal("increment without operator"));
        };

        if let Binding::Path(steps) = &facts.expr(operand.unparenthesized().id())?.binding
            && let [NameStep::Local(id)] = steps.as_slice()
        {
            let local = facts.local(*id)?;
            if local.ty == JavaType::INT {
                let slot = self.slot(local);
                if want_value && !prefix {
                    self.load(ValueKind::Int, slot)?;
                }
                self.iinc(slot, if is_increment { 1 } else { -1 })?;
                if want_value && prefix {
                    self.load(ValueKind::Int, slot)?;
                }
                return Ok(());
            }
        }

        let place = self.lvalue(operand)?;
        self.place_load(&place, true)?;
        if want_value && !prefix {
            self.keep_value(&place)?;
        }
        let target = facts.expr(operand.id())?;
        self.convert(&target.conversion, place.ty())?;
        match promoted.as_primitive() {
            Some(PrimitiveType::Long) => self.op(Opcode::Lconst1)?,
            Some(PrimitiveType::Float) => self.op(Opcode::Fconst1)?,
            Some(PrimitiveType::Double) => self.op(Opcode::Dconst1)?,
            _ => self.op(Opcode::Iconst1)?,
        }
        let op = if is_increment { BinaryOp::Add } else { BinaryOp::Sub };
        let instruction = arith_op(op, ValueKind::of(promoted))
            .ok_or_else(|| CompilationError::internal(format!("cannot increment {promoted}")))?;
        self.op(instruction)?;
        self.convert_all(result, promoted)?;
        if want_value && prefix {
            self.keep_value(&place)?;
        }
        self.place_store(&place)
    }

    // =========================================
    // String concatenation
    // =========================================

    /// Lower a chain of `+` on strings to one `StringBuilder`.
    fn concat(&mut self, binary: &'ast BinaryExpr<'ast>) -> EmitResult<()> {
        let facts = self.facts;
        let mut parts = vec![binary.right];
        let mut left = binary.left;
        while let Expr::Binary(inner) = left {
            let fact = facts.expr(inner.id)?;
            let nested = inner.op == BinaryOp::Add
                && fact.ty.is_string()
                && fact.constant.is_none()
                && fact.conversion.is_identity();
            if !nested {
                break;
            }
            parts.push(inner.right);
            left = inner.left;
        }
        parts.push(left);

        self.class_op(Opcode::New, &JavaType::class("java.lang.StringBuilder"))?;
        self.op(Opcode::Dup)?;
        self.invoke_raw(Opcode::Invokespecial, STRING_BUILDER, "<init>", "()V", 0, 0)?;
        for part in parts.into_iter().rev() {
            self.append(part)?;
        }
        self.invoke_raw(Opcode::Invokevirtual, STRING_BUILDER, "toString", "()Ljava/lang/String;", 0, 1)
    }

    fn append(&mut self, part: Expr<'ast>) -> EmitResult<()> {
        let fact = self.facts.expr(part.id())?;
        let ty = converted_type(&fact.ty, &fact.conversion);
        self.expr(part)?;
        let arg = match &ty {
            JavaType::Primitive(PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int) => "I".to_string(),
            JavaType::Primitive(p) => p.descriptor().to_string(),
            t if t.is_string() => "Ljava/lang/String;".to_string(),
            _ => "Ljava/lang/Object;".to_string(),
        };
        self.invoke_raw(
            Opcode::Invokevirtual,
            STRING_BUILDER,
            "append",
            &format!("({arg})Ljava/lang/StringBuilder;"),
            ty.slot_size(),
            1,
        )
    }

    // =========================================
    // Conditions
    // =========================================

    /// Jump to `target` when `cond` evaluates to `jump_if`; fall through
    /// otherwise.
    pub(super) fn branch_on(&mut self, cond: Expr<'ast>, jump_if: bool, target: Label) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        let facts = self.facts;
        let fact = facts.expr(cond.id())?;
        if let Some(value) = fact.constant.as_ref().and_then(ConstValue::as_bool) {
            if value == jump_if {
                self.goto(target)?;
            }
            return Ok(());
        }
        if fact.conversion.is_identity() && self.branch_structure(cond, fact, jump_if, target)? {
            return Ok(());
        }
        self.expr(cond)?;
        self.branch(if jump_if { Opcode::Ifne } else { Opcode::Ifeq }, target)
    }

    /// Branch on the raw value of boolean operators. Returns `false` for
    /// any other expression.
    fn branch_structure(
        &mut self,
        cond: Expr<'ast>,
        fact: &'a ExprFact,
        jump_if: bool,
        target: Label,
    ) -> EmitResult<bool> {
        match cond {
            Expr::Paren(paren) => self.branch_on(paren.expr, jump_if, target)?,
            Expr::Unary(unary) if unary.op == UnaryOp::Not => self.branch_on(unary.operand, !jump_if, target)?,
            Expr::Binary(binary) if binary.op.is_short_circuit() => {
                let is_and = binary.op == BinaryOp::LogicalAnd;
                if is_and == jump_if {
                    // Both operands decide: the left one can only skip.
                    let skip = self.new_label();
                    self.branch_on(binary.left, !jump_if, skip)?;
                    self.branch_on(binary.right, jump_if, target)?;
                    self.place(skip)?;
                } else {
                    self.branch_on(binary.left, jump_if, target)?;
                    self.branch_on(binary.right, jump_if, target)?;
                }
            }
            Expr::Binary(binary) if binary.op.is_comparison() => self.compare(binary, fact, jump_if, target)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn compare(
        &mut self,
        binary: &'ast BinaryExpr<'ast>,
        fact: &'a ExprFact,
        jump_if: bool,
        target: Label,
    ) -> EmitResult<()> {
        let facts = self.facts;
        let operand = operator_type(fact)?;
        let mut zero = zero_branch(binary.op)
            .ok_or_else(|| CompilationError::internal(format!("{} is not a comparison", binary.op.as_str())))?;
        if !jump_if {
            zero = zero
                .negated()
                .ok_or_else(|| CompilationError::internal("comparison without negation"))?;
        }

        match ValueKind::of(operand) {
            ValueKind::Int => {
                let right = facts.expr(binary.right.id())?;
                let right_is_zero = right.constant.as_ref().and_then(ConstValue::as_i32) == Some(0);
                self.expr(binary.left)?;
                if right_is_zero {
                    return self.branch(zero, target);
                }
                self.expr(binary.right)?;
                self.branch(int_branch(zero), target)
            }
            ValueKind::Reference => {
                let left_null = facts.expr(binary.left.id())?.ty == JavaType::Null;
                let right_null = facts.expr(binary.right.id())?.ty == JavaType::Null;
                let op = match (left_null || right_null, zero) {
                    (true, Opcode::Ifeq) => Opcode::Ifnull,
                    (true, _) => Opcode::Ifnonnull,
                    (false, Opcode::Ifeq) => Opcode::IfAcmpeq,
                    (false, _) => Opcode::IfAcmpne,
                };
                match (left_null, right_null) {
                    (_, true) => self.expr(binary.left)?,
                    (true, false) => self.expr(binary.right)?,
                    (false, false) => {
                        self.expr(binary.left)?;
                        self.expr(binary.right)?;
                    }
                }
                self.branch(op, target)
            }
            kind => {
                self.expr(binary.left)?;
                self.expr(binary.right)?;
                // NaN must make every relation except != false.
                let greater_bias = matches!(binary.op, BinaryOp::Less | BinaryOp::LessEqual);
                self.op(match (kind, greater_bias) {
                    (ValueKind::Long, _) => Opcode::Lcmp,
                    (ValueKind::Float, true) => Opcode::Fcmpg,
                    (ValueKind::Float, false) => Opcode::Fcmpl,
                    (_, true) => Opcode::Dcmpg,
                    (_, false) => Opcode::Dcmpl,
                })?;
                self.branch(zero, target)
            }
        }
    }

    /// Materialize a boolean operator as `0` or `1`.
    fn boolean_value(&mut self, expr: Expr<'ast>) -> EmitResult<()> {
        let facts = self.facts;
        let fact = facts.expr(expr.id())?;
        let (when_false, end) = (self.new_label(), self.new_label());
        if !self.branch_structure(expr, fact, false, when_false)? {
            return Err(CompilationError::internal("boolean value of a non-boolean operator"));
        }
        self.op(Opcode::Iconst1)?;
        self.goto(end)?;
        self.place(when_false)?;
        self.op(Opcode::Iconst0)?;
        self.place(end)
    }
}
