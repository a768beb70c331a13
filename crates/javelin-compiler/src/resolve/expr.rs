//! Expression typing.
//!
//! [`Resolver::infer`] types an expression and records facts for its
//! children; the caller records the expression itself once it knows which
//! conversion the context applies. The entry points [`Resolver::value`],
//! [`Resolver::value_as`] and [`Resolver::condition`] do both.

use javelin_core::{CompilationError, ConstValue, JavaType, PrimitiveType, Span};
use javelin_parser::ast::{
    ArrayInitExpr, AssignExpr, BinaryExpr, BinaryOp, CastExpr, ConditionalExpr, Expr,
    FieldAccessExpr, InstanceOfExpr, Literal, MethodCallExpr, NewArrayExpr, NewExpr, NodeId,
    Receiver, UnaryOp,
};

use super::facts::{Binding, ExprFact, InvokeKind, MethodRef, NameStep};
use super::names::{NameMeaning, before_super, field_ref, not_dereferenceable, static_context};
use super::{BodyKind, Resolver};
use crate::const_eval;
use crate::context::{MethodMatch, OBJECT, simple_name};
use crate::conversion::{Conversion, assignment, casting, loose_invocation};
use crate::overload::resolve_overload;

/// What a qualified member access is qualified by.
enum Target {
    Type(String),
    Value(ExprFact),
    Super(String),
}

/// Where the methods of an invocation were searched.
enum Site {
    Unqualified,
    Imported,
    Type(String),
    Super(String),
    Value(JavaType),
}

impl Resolver<'_> {
    // =========================================
    // Entry points
    // =========================================

    pub(crate) fn record(&mut self, id: NodeId, fact: ExprFact) -> Result<ExprFact, CompilationError> {
        self.facts.record(id, fact.clone())?;
        Ok(fact)
    }

    /// Resolve a value used as is.
    pub(crate) fn value(&mut self, expr: Expr<'_>) -> Result<ExprFact, CompilationError> {
        let fact = self.infer(expr)?;
        require_value(&fact, expr.span())?;
        self.record(expr.id(), fact)
    }

    /// Resolve a value assigned to a variable of type `target`.
    pub(crate) fn value_as(&mut self, expr: Expr<'_>, target: &JavaType) -> Result<ExprFact, CompilationError> {
        if let Expr::ArrayInit(init) = expr {
            return self.array_init(init, target);
        }
        let fact = self.infer(expr)?;
        require_value(&fact, expr.span())?;
        let conversion = assignment(&self.table, &fact.ty, target, fact.constant.as_ref())
            .ok_or_else(|| incompatible(&fact.ty, target, expr.span()))?;
        self.record_converted(expr.id(), fact, conversion)
    }

    pub(crate) fn condition(&mut self, expr: Expr<'_>) -> Result<ExprFact, CompilationError> {
        self.value_as(expr, &JavaType::BOOLEAN)
    }

    /// Resolve an expression statement; `void` is allowed.
    pub(crate) fn statement_expression(&mut self, expr: Expr<'_>) -> Result<(), CompilationError> {
        if !expr.is_statement_expression() {
            return Err(CompilationError::InvalidOperation {
                message: "not a statement".to_string(),
                span: expr.span(),
            });
        }
        let fact = self.infer(expr)?;
        self.record(expr.id(), fact).map(|_| ())
    }

    pub(crate) fn record_converted(
        &mut self,
        id: NodeId,
        mut fact: ExprFact,
        conversion: Conversion,
    ) -> Result<ExprFact, CompilationError> {
        fact.conversion = conversion;
        self.record(id, fact)
    }

    /// A value promoted to `int`: array dimensions and indexes.
    fn int_value(&mut self, expr: Expr<'_>) -> Result<ExprFact, CompilationError> {
        let fact = self.infer(expr)?;
        require_value(&fact, expr.span())?;
        let promoted = fact
            .ty
            .primitive_or_unboxed()
            .filter(|p| p.is_integral() && p.promoted() == PrimitiveType::Int);
        let conversion = promoted
            .and_then(|_| loose_invocation(&self.table, &fact.ty, &JavaType::INT))
            .ok_or_else(|| incompatible(&fact.ty, &JavaType::INT, expr.span()))?;
        self.record_converted(expr.id(), fact, conversion)
    }

    // =========================================
    // Dispatch
    // =========================================

    pub(crate) fn infer(&mut self, expr: Expr<'_>) -> Result<ExprFact, CompilationError> {
        match expr {
            Expr::Literal(lit) => Ok(match lit.value {
                Literal::Int(v) => ExprFact::constant(ConstValue::Int(v)),
                Literal::Long(v) => ExprFact::constant(ConstValue::Long(v)),
                Literal::Float(v) => ExprFact::constant(ConstValue::Float(v.into())),
                Literal::Double(v) => ExprFact::constant(ConstValue::Double(v.into())),
                Literal::Char(v) => ExprFact::constant(ConstValue::Char(v)),
                Literal::String(s) => ExprFact::constant(ConstValue::String(s.to_string())),
                Literal::Boolean(b) => ExprFact::constant(ConstValue::Boolean(b)),
                Literal::Null => ExprFact::new(JavaType::Null),
            }),
            Expr::Name(name) => match self.resolve_name(name)? {
                NameMeaning::Value { steps, ty, constant } => Ok(ExprFact {
                    ty,
                    constant,
                    binding: Binding::Path(steps),
                    conversion: Conversion::Identity,
                }),
                NameMeaning::Type(_) | NameMeaning::Package(_) => Err(CompilationError::NameNotFound {
                    name: name.dotted(),
                    span: name.span,
                }),
            },
            Expr::This(this) => {
                self.require_instance("this", this.span)?;
                Ok(ExprFact::new(JavaType::Class(self.body.class.clone())))
            }
            Expr::FieldAccess(access) => self.field_access(access),
            Expr::MethodCall(call) => self.method_call(call),
            Expr::New(new) => self.new_instance(new),
            Expr::NewArray(new) => self.new_array(new),
            Expr::ArrayInit(init) => Err(CompilationError::InvalidOperation {
                message: "array initializer is not allowed here".to_string(),
                span: init.span,
            }),
            Expr::Index(index) => {
                let array = self.value(index.array)?;
                let element = array
                    .ty
                    .element_type()
                    .cloned()
                    .ok_or_else(|| CompilationError::InvalidOperation {
                        message: format!("array required, but {} found", array.ty),
                        span: index.array.span(),
                    })?;
                self.int_value(index.index)?;
                Ok(ExprFact::new(element))
            }
            Expr::Assign(assign) => self.assign(assign),
            Expr::Unary(unary) => match unary.op {
                UnaryOp::PreInc | UnaryOp::PreDec => self.increment(unary.operand, unary.op.as_str()),
                UnaryOp::Not => {
                    let operand = self.condition(unary.operand)?;
                    Ok(ExprFact {
                        constant: operand
                            .constant
                            .as_ref()
                            .and_then(|c| const_eval::unary(UnaryOp::Not, c, &JavaType::BOOLEAN)),
                        ..ExprFact::new(JavaType::BOOLEAN)
                    })
                }
                op => self.numeric_unary(op, unary.operand),
            },
            Expr::Postfix(postfix) => self.increment(postfix.operand, "++/--"),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Conditional(cond) => self.conditional(cond),
            Expr::Cast(cast) => self.cast(cast),
            Expr::InstanceOf(test) => self.instance_of(test),
            Expr::Paren(paren) => {
                let inner = self.value(paren.expr)?;
                Ok(ExprFact {
                    constant: inner.constant,
                    ..ExprFact::new(inner.ty)
                })
            }
        }
    }

    pub(crate) fn require_instance(&self, what: &str, span: Span) -> Result<(), CompilationError> {
        if self.body.is_static {
            return Err(static_context(what, span));
        }
        if self.body.in_ctor_call {
            return Err(before_super(what, span));
        }
        Ok(())
    }

    // =========================================
    // Members
    // =========================================

    fn target(&mut self, receiver: Receiver<'_>) -> Result<Target, CompilationError> {
        match receiver {
            Receiver::Super(span) => {
                self.require_instance("super", span)?;
                let superclass = self
                    .table
                    .shape(&self.body.class)
                    .and_then(|s| s.superclass.clone())
                    .unwrap_or_else(|| OBJECT.to_string());
                Ok(Target::Super(superclass))
            }
            Receiver::Expr(Expr::Name(name)) => match self.resolve_name(name)? {
                NameMeaning::Type(class) => {
                    let ty = JavaType::Class(class.clone());
                    self.record(name.id, ExprFact::new(ty.clone()).with_binding(Binding::Type(ty)))?;
                    Ok(Target::Type(class))
                }
                NameMeaning::Package(package) => Err(CompilationError::NameNotFound {
                    name: package,
                    span: name.span,
                }),
                NameMeaning::Value { steps, ty, constant } => {
                    let fact = ExprFact {
                        ty,
                        constant,
                        binding: Binding::Path(steps),
                        conversion: Conversion::Identity,
                    };
                    Ok(Target::Value(self.record(name.id, fact)?))
                }
            },
            Receiver::Expr(expr) => Ok(Target::Value(self.value(expr)?)),
        }
    }

    fn field_access(&mut self, access: &FieldAccessExpr<'_>) -> Result<ExprFact, CompilationError> {
        let name = &access.name;
        match self.target(access.target)? {
            Target::Type(class) => {
                let found = self.lookup_field(&class, name)?;
                if !found.field.access.is_static() {
                    return Err(static_context(name.name, name.span));
                }
                let constant = found.field.constant.clone();
                let field = field_ref(found);
                Ok(ExprFact {
                    ty: field.ty.clone(),
                    constant,
                    binding: Binding::Field(field),
                    conversion: Conversion::Identity,
                })
            }
            Target::Super(class) => {
                let field = field_ref(self.lookup_field(&class, name)?);
                Ok(ExprFact::new(field.ty.clone()).with_binding(Binding::Field(field)))
            }
            Target::Value(fact) => match &fact.ty {
                JavaType::Array(_) if name.name == "length" => {
                    Ok(ExprFact::new(JavaType::INT).with_binding(Binding::ArrayLength))
                }
                JavaType::Class(class) => {
                    let field = field_ref(self.lookup_field(class, name)?);
                    Ok(ExprFact::new(field.ty.clone()).with_binding(Binding::Field(field)))
                }
                JavaType::Array(_) => Err(CompilationError::NameNotFound {
                    name: name.name.to_string(),
                    span: name.span,
                }),
                other => Err(not_dereferenceable(other, access.span)),
            },
        }
    }

    fn method_call(&mut self, call: &MethodCallExpr<'_>) -> Result<ExprFact, CompilationError> {
        let name = call.name.name;
        let span = call.span;
        let (candidates, site) = match call.target {
            None => {
                let own = self.table.find_methods(&self.body.class, name);
                if own.is_empty() {
                    (self.imports.static_methods(&self.table, name), Site::Imported)
                } else {
                    (own, Site::Unqualified)
                }
            }
            Some(receiver) => match self.target(receiver)? {
                Target::Type(class) => (self.table.find_methods(&class, name), Site::Type(class)),
                Target::Super(class) => (self.table.find_methods(&class, name), Site::Super(class)),
                Target::Value(fact) => match &fact.ty {
                    JavaType::Class(class) => (self.table.find_methods(class, name), Site::Value(fact.ty.clone())),
                    JavaType::Array(_) if name == "clone" && call.args.is_empty() => {
                        return self.array_clone(fact.ty);
                    }
                    JavaType::Array(_) => (self.table.find_methods(OBJECT, name), Site::Value(fact.ty.clone())),
                    other => return Err(not_dereferenceable(other, span)),
                },
            },
        };

        let from = self.body.class.clone();
        let candidates: Vec<MethodMatch> = candidates
            .into_iter()
            .filter(|m| self.table.is_accessible(&m.owner, m.method.access, &from))
            .collect();
        if candidates.is_empty() {
            return Err(CompilationError::NameNotFound {
                name: name.to_string(),
                span: call.name.span,
            });
        }

        let args = self.arguments(call.args)?;
        let types: Vec<JavaType> = args.iter().map(|a| a.ty.clone()).collect();
        let chosen = resolve_overload(&self.table, name, &candidates, &types, span)?;
        self.record_arguments(call.args, args, &chosen.conversions)?;

        let method = chosen.method;
        let is_static = method.method.access.is_static();
        let (owner, kind) = match site {
            Site::Unqualified => {
                if !is_static {
                    self.require_instance(name, call.name.span)?;
                }
                let kind = if is_static {
                    InvokeKind::Static
                } else if method.method.access.is_private() {
                    InvokeKind::Special
                } else {
                    InvokeKind::Virtual
                };
                (JavaType::Class(from), kind)
            }
            Site::Imported => (JavaType::Class(method.owner.clone()), InvokeKind::Static),
            Site::Type(class) => {
                if !is_static {
                    return Err(static_context(name, call.name.span));
                }
                (JavaType::Class(class), InvokeKind::Static)
            }
            Site::Super(class) => {
                if method.method.access.is_abstract() {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("abstract method '{name}' cannot be accessed directly"),
                        span,
                    });
                }
                let kind = if is_static { InvokeKind::Static } else { InvokeKind::Special };
                (JavaType::Class(class), kind)
            }
            Site::Value(ty) => {
                let class = ty.class_name().map(str::to_string);
                match class {
                    _ if is_static => (
                        JavaType::Class(class.unwrap_or_else(|| method.owner.clone())),
                        InvokeKind::Static,
                    ),
                    None => (JavaType::object(), InvokeKind::Virtual),
                    Some(class) if self.table.is_interface(&class) => {
                        if method.owner == OBJECT {
                            (JavaType::object(), InvokeKind::Virtual)
                        } else {
                            (JavaType::Class(class), InvokeKind::Interface)
                        }
                    }
                    Some(class) if method.method.access.is_private() => {
                        (JavaType::Class(class), InvokeKind::Special)
                    }
                    Some(class) => (JavaType::Class(class), InvokeKind::Virtual),
                }
            }
        };

        let ret = method.method.ret().clone();
        let method_ref = MethodRef {
            owner,
            name: name.to_string(),
            descriptor: method.method.descriptor,
            kind,
            throws: method.method.throws,
        };
        Ok(ExprFact::new(ret).with_binding(Binding::Method(method_ref)))
    }

    /// `clone()` on an array returns the array type and throws nothing.
    fn array_clone(&mut self, array: JavaType) -> Result<ExprFact, CompilationError> {
        let method_ref = MethodRef {
            owner: array.clone(),
            name: "clone".to_string(),
            descriptor: javelin_core::MethodDescriptor::new(Vec::new(), JavaType::object()),
            kind: InvokeKind::Virtual,
            throws: Vec::new(),
        };
        Ok(ExprFact::new(array).with_binding(Binding::Method(method_ref)))
    }

    fn arguments(&mut self, args: &[Expr<'_>]) -> Result<Vec<ExprFact>, CompilationError> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            let fact = self.infer(*arg)?;
            require_value(&fact, arg.span())?;
            out.push(fact);
        }
        Ok(out)
    }

    fn record_arguments(
        &mut self,
        args: &[Expr<'_>],
        facts: Vec<ExprFact>,
        conversions: &[Conversion],
    ) -> Result<(), CompilationError> {
        for ((arg, fact), conversion) in args.iter().zip(facts).zip(conversions) {
            self.record_converted(arg.id(), fact, conversion.clone())?;
        }
        Ok(())
    }

    /// Resolve the constructor of `class` invoked with `args`.
    pub(crate) fn constructor_call(
        &mut self,
        class: &str,
        args: &[Expr<'_>],
        span: Span,
    ) -> Result<MethodRef, CompilationError> {
        let from = self.body.class.clone();
        let candidates: Vec<MethodMatch> = self
            .table
            .constructors(class)
            .into_iter()
            .filter(|c| self.table.is_accessible(class, c.access, &from))
            .map(|method| MethodMatch {
                owner: class.to_string(),
                owner_is_interface: false,
                method,
            })
            .collect();
        let facts = self.arguments(args)?;
        let types: Vec<JavaType> = facts.iter().map(|a| a.ty.clone()).collect();
        let chosen = resolve_overload(&self.table, simple_name(class), &candidates, &types, span)?;
        self.record_arguments(args, facts, &chosen.conversions)?;
        Ok(MethodRef {
            owner: JavaType::class(class),
            name: "<init>".to_string(),
            descriptor: chosen.method.method.descriptor,
            kind: InvokeKind::Special,
            throws: chosen.method.method.throws,
        })
    }

    fn new_instance(&mut self, new: &NewExpr<'_>) -> Result<ExprFact, CompilationError> {
        let class = self.class_type_name(&new.ty)?;
        let shape = self.table.shape(&class).ok_or_else(|| CompilationError::TypeNotFound {
            name: class.clone(),
            span: new.ty.span,
        })?;
        if shape.is_interface() || shape.access.is_abstract() {
            return Err(CompilationError::InvalidOperation {
                message: format!("{class} is abstract; cannot be instantiated"),
                span: new.span,
            });
        }
        let ctor = self.constructor_call(&class, new.args, new.span)?;
        Ok(ExprFact::new(JavaType::Class(class)).with_binding(Binding::Method(ctor)))
    }

    fn new_array(&mut self, new: &NewArrayExpr<'_>) -> Result<ExprFact, CompilationError> {
        let element = self.resolve_type(&new.element)?;
        if element.is_void() {
            return Err(CompilationError::InvalidOperation {
                message: "'void' type not allowed here".to_string(),
                span: new.element.span,
            });
        }
        let dims = new.dim_exprs.len() + new.extra_dims as usize;
        let ty = element.with_dims(dims);
        if array_dims(&ty) > 255 {
            return Err(CompilationError::CodeTooLarge {
                what: "number of array dimensions".to_string(),
                limit: 255,
                span: new.span,
            });
        }
        for dim in new.dim_exprs {
            self.int_value(*dim)?;
        }
        if let Some(init) = new.init {
            self.array_init(init, &ty)?;
        }
        Ok(ExprFact::new(ty))
    }

    /// Resolve `{...}` as a value of array type `ty`, recording it.
    pub(crate) fn array_init(&mut self, init: &ArrayInitExpr<'_>, ty: &JavaType) -> Result<ExprFact, CompilationError> {
        let Some(element) = ty.element_type().cloned() else {
            return Err(CompilationError::IncompatibleTypes {
                from: "array initializer".to_string(),
                to: ty.to_string(),
                span: init.span,
            });
        };
        for value in init.elements {
            self.value_as(*value, &element)?;
        }
        self.record(init.id, ExprFact::new(ty.clone()))
    }

    // =========================================
    // Assignment
    // =========================================

    /// Resolve an assignment target without recording it.
    fn lvalue(&mut self, target: Expr<'_>) -> Result<ExprFact, CompilationError> {
        let inner = target.unparenthesized();
        if !matches!(inner, Expr::Name(_) | Expr::FieldAccess(_) | Expr::Index(_)) {
            return Err(CompilationError::NotAnLvalue { span: target.span() });
        }
        let fact = self.infer(target)?;
        let binding = if matches!(target, Expr::Paren(_)) {
            self.facts.expr(inner.id())?.binding.clone()
        } else {
            fact.binding.clone()
        };

        let (field, simple) = match &binding {
            Binding::ArrayLength => return Err(CompilationError::NotAnLvalue { span: target.span() }),
            Binding::Path(steps) => match steps.last() {
                Some(NameStep::ArrayLength) => {
                    return Err(CompilationError::NotAnLvalue { span: target.span() });
                }
                Some(NameStep::Field(field)) => (Some(field.clone()), steps.len() == 1),
                _ => (None, false),
            },
            Binding::Field(field) => {
                let via_this = matches!(
                    inner,
                    Expr::FieldAccess(access) if matches!(access.target, Receiver::Expr(Expr::This(_)))
                );
                (Some(field.clone()), via_this)
            }
            _ => (None, false),
        };
        if let Some(field) = field
            && field.is_final
        {
            let in_initializer = matches!(self.body.kind, BodyKind::Constructor | BodyKind::Initializer)
                && field.is_static == self.body.is_static;
            let allowed = simple
                && in_initializer
                && field.owner == self.body.class
                && self.is_blank_final(&field.owner, &field.name);
            if !allowed {
                return Err(CompilationError::FinalAssignment {
                    name: field.name,
                    span: target.span(),
                });
            }
        }
        Ok(fact)
    }

    fn assign(&mut self, assign: &AssignExpr<'_>) -> Result<ExprFact, CompilationError> {
        let target = self.lvalue(assign.target)?;
        let ty = target.ty.clone();
        let Some(op) = assign.op.binary_op() else {
            self.record(assign.target.id(), target)?;
            self.value_as(assign.value, &ty)?;
            return Ok(ExprFact::new(ty));
        };

        if op == BinaryOp::Add && ty.is_string() {
            self.record(assign.target.id(), target)?;
            self.value(assign.value)?;
            return Ok(ExprFact::new(ty).with_binding(Binding::Operator {
                operand: JavaType::string(),
                result: Vec::new(),
            }));
        }

        let value = self.infer(assign.value)?;
        require_value(&value, assign.value.span())?;
        let (lp, rp) = match (ty.primitive_or_unboxed(), value.ty.primitive_or_unboxed()) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(bad_operands(op.as_str(), &ty, &value.ty, assign.span)),
        };
        let (operand, right) =
            operand_types(op, lp, rp).ok_or_else(|| bad_operands(op.as_str(), &ty, &value.ty, assign.span))?;
        let target_conversion = self.convert_operand(&ty, &operand, assign.target.span())?;
        let value_conversion = self.convert_operand(&value.ty, &right, assign.value.span())?;
        let result = result_conversions(&operand, lp, &ty, false, assign.span)?;

        self.record_converted(assign.target.id(), target, target_conversion)?;
        self.record_converted(assign.value.id(), value, value_conversion)?;
        Ok(ExprFact::new(ty).with_binding(Binding::Operator { operand, result }))
    }

    /// `++` and `--` in either position.
    fn increment(&mut self, operand: Expr<'_>, op: &str) -> Result<ExprFact, CompilationError> {
        let target = self.lvalue(operand)?;
        let ty = target.ty.clone();
        let p = ty
            .primitive_or_unboxed()
            .filter(|p| p.is_numeric())
            .ok_or_else(|| bad_operand(op, &ty, operand.span()))?;
        let promoted = JavaType::Primitive(p.promoted());
        let conversion = self.convert_operand(&ty, &promoted, operand.span())?;
        let result = result_conversions(&promoted, p, &ty, true, operand.span())?;
        self.record_converted(operand.id(), target, conversion)?;
        Ok(ExprFact::new(ty).with_binding(Binding::Operator {
            operand: promoted,
            result,
        }))
    }

    pub(crate) fn convert_operand(&self, from: &JavaType, to: &JavaType, span: Span) -> Result<Conversion, CompilationError> {
        loose_invocation(&self.table, from, to).ok_or_else(|| incompatible(from, to, span))
    }

    // =========================================
    // Operators
    // =========================================

    fn numeric_unary(&mut self, op: UnaryOp, operand: Expr<'_>) -> Result<ExprFact, CompilationError> {
        let fact = self.infer(operand)?;
        require_value(&fact, operand.span())?;
        let p = fact
            .ty
            .primitive_or_unboxed()
            .filter(|p| if op == UnaryOp::BitNot { p.is_integral() } else { p.is_numeric() })
            .ok_or_else(|| bad_operand(op.as_str(), &fact.ty, operand.span()))?;
        let promoted = JavaType::Primitive(p.promoted());
        let conversion = self.convert_operand(&fact.ty, &promoted, operand.span())?;
        let constant = fact
            .constant
            .as_ref()
            .and_then(|c| const_eval::unary(op, c, &promoted));
        self.record_converted(operand.id(), fact, conversion)?;
        Ok(ExprFact {
            ty: promoted.clone(),
            constant,
            binding: Binding::Operator {
                operand: promoted,
                result: Vec::new(),
            },
            conversion: Conversion::Identity,
        })
    }

    fn binary(&mut self, binary: &BinaryExpr<'_>) -> Result<ExprFact, CompilationError> {
        let op = binary.op;
        if op.is_short_circuit() {
            let left = self.condition(binary.left)?;
            let right = self.condition(binary.right)?;
            let constant = fold(op, &left, &right, &JavaType::BOOLEAN);
            return Ok(operator_fact(JavaType::BOOLEAN, JavaType::BOOLEAN, constant));
        }

        let left = self.infer(binary.left)?;
        require_value(&left, binary.left.span())?;
        let right = self.infer(binary.right)?;
        require_value(&right, binary.right.span())?;

        if op == BinaryOp::Add && (left.ty.is_string() || right.ty.is_string()) {
            let string = JavaType::string();
            let constant = fold(op, &left, &right, &string);
            self.record(binary.left.id(), left)?;
            self.record(binary.right.id(), right)?;
            return Ok(operator_fact(string.clone(), string, constant));
        }

        let (operand, right_target) = if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) {
            self.equality_operand(&left.ty, &right.ty)
                .ok_or_else(|| bad_operands(op.as_str(), &left.ty, &right.ty, binary.span))?
        } else {
            match (left.ty.primitive_or_unboxed(), right.ty.primitive_or_unboxed()) {
                (Some(l), Some(r)) => operand_types(op, l, r),
                _ => None,
            }
            .ok_or_else(|| bad_operands(op.as_str(), &left.ty, &right.ty, binary.span))?
        };

        let (left_conversion, right_conversion) = if operand.is_reference() {
            (Conversion::Identity, Conversion::Identity)
        } else {
            (
                self.convert_operand(&left.ty, &operand, binary.left.span())?,
                self.convert_operand(&right.ty, &right_target, binary.right.span())?,
            )
        };
        let constant = fold(op, &left, &right, &operand);
        self.record_converted(binary.left.id(), left, left_conversion)?;
        self.record_converted(binary.right.id(), right, right_conversion)?;

        let ty = if op.is_comparison() {
            JavaType::BOOLEAN
        } else {
            operand.clone()
        };
        Ok(operator_fact(ty, operand, constant))
    }

    /// Operand type of `==` and `!=`: numeric or boolean when at least one
    /// side is primitive, otherwise a reference comparison.
    fn equality_operand(&self, left: &JavaType, right: &JavaType) -> Option<(JavaType, JavaType)> {
        if left.is_primitive() || right.is_primitive() {
            let (l, r) = (left.primitive_or_unboxed()?, right.primitive_or_unboxed()?);
            let operand = match (l, r) {
                (PrimitiveType::Boolean, PrimitiveType::Boolean) => PrimitiveType::Boolean,
                (l, r) if l.is_numeric() && r.is_numeric() => l.binary_promoted(r),
                _ => return None,
            };
            let operand = JavaType::Primitive(operand);
            return Some((operand.clone(), operand));
        }
        if left.is_reference() && right.is_reference() && self.table.is_reference_castable(left, right) {
            let operand = if left.is_string() && right.is_string() {
                JavaType::string()
            } else {
                JavaType::object()
            };
            return Some((operand.clone(), operand));
        }
        None
    }

    fn conditional(&mut self, cond: &ConditionalExpr<'_>) -> Result<ExprFact, CompilationError> {
        let condition = self.condition(cond.condition)?;
        let then_fact = self.infer(cond.then_expr)?;
        require_value(&then_fact, cond.then_expr.span())?;
        let else_fact = self.infer(cond.else_expr)?;
        require_value(&else_fact, cond.else_expr.span())?;

        let ty = self.conditional_type(&then_fact, &else_fact);
        let then_conversion = assignment(&self.table, &then_fact.ty, &ty, then_fact.constant.as_ref())
            .ok_or_else(|| incompatible(&then_fact.ty, &ty, cond.then_expr.span()))?;
        let else_conversion = assignment(&self.table, &else_fact.ty, &ty, else_fact.constant.as_ref())
            .ok_or_else(|| incompatible(&else_fact.ty, &ty, cond.else_expr.span()))?;

        let constant = match (&condition.constant, &then_fact.constant, &else_fact.constant) {
            (Some(c), Some(t), Some(e)) => {
                let chosen = if c.as_bool() == Some(true) { t } else { e };
                const_eval::cast(chosen, &ty)
            }
            _ => None,
        };
        self.record_converted(cond.then_expr.id(), then_fact, then_conversion)?;
        self.record_converted(cond.else_expr.id(), else_fact, else_conversion)?;
        Ok(ExprFact {
            constant,
            ..ExprFact::new(ty)
        })
    }

    fn conditional_type(&self, then_fact: &ExprFact, else_fact: &ExprFact) -> JavaType {
        let (a, b) = (&then_fact.ty, &else_fact.ty);
        if a == b {
            return a.clone();
        }
        match (a, b) {
            (JavaType::Null, JavaType::Primitive(p)) | (JavaType::Primitive(p), JavaType::Null) => {
                return JavaType::class(p.box_class());
            }
            (JavaType::Null, other) | (other, JavaType::Null) => return other.clone(),
            _ => {}
        }
        if let (Some(x), Some(y)) = (a.primitive_or_unboxed(), b.primitive_or_unboxed()) {
            use PrimitiveType::*;
            match (x, y) {
                (x, y) if x == y => return JavaType::Primitive(x),
                (Boolean, _) | (_, Boolean) => {}
                (Byte, Short) | (Short, Byte) => return JavaType::Primitive(Short),
                _ => {
                    for (small, other) in [(then_fact, else_fact), (else_fact, then_fact)] {
                        if let JavaType::Primitive(p @ (Byte | Short | Char)) = small.ty
                            && other.ty == JavaType::INT
                            && matches!(
                                assignment(&self.table, &other.ty, &small.ty, other.constant.as_ref()),
                                Some(Conversion::NarrowingPrimitive(_))
                            )
                        {
                            return JavaType::Primitive(p);
                        }
                    }
                    return JavaType::Primitive(x.binary_promoted(y));
                }
            }
        }
        let boxed = |t: &JavaType| match t {
            JavaType::Primitive(p) => JavaType::class(p.box_class()),
            other => other.clone(),
        };
        self.common_supertype(&boxed(a), &boxed(b))
    }

    fn cast(&mut self, cast: &CastExpr<'_>) -> Result<ExprFact, CompilationError> {
        let target = self.resolve_type(&cast.ty)?;
        if target.is_void() {
            return Err(bad_operand("cast", &target, cast.ty.span));
        }
        let fact = self.infer(cast.expr)?;
        require_value(&fact, cast.expr.span())?;
        let conversion =
            casting(&self.table, &fact.ty, &target).ok_or_else(|| incompatible(&fact.ty, &target, cast.span))?;
        let constant = fact
            .constant
            .as_ref()
            .and_then(|c| const_eval::cast(c, &target));
        self.record_converted(cast.expr.id(), fact, conversion)?;
        Ok(ExprFact {
            ty: target.clone(),
            constant,
            binding: Binding::Type(target),
            conversion: Conversion::Identity,
        })
    }

    fn instance_of(&mut self, test: &InstanceOfExpr<'_>) -> Result<ExprFact, CompilationError> {
        let fact = self.value(test.expr)?;
        let target = self.resolve_type(&test.ty)?;
        if !fact.ty.is_reference() || !matches!(target, JavaType::Class(_) | JavaType::Array(_)) {
            return Err(bad_operands("instanceof", &fact.ty, &target, test.span));
        }
        if !self.table.is_reference_castable(&fact.ty, &target) {
            return Err(incompatible(&fact.ty, &target, test.span));
        }
        Ok(ExprFact::new(JavaType::BOOLEAN).with_binding(Binding::Type(target)))
    }
}

// =========================================
// Operator typing
// =========================================

/// Operand type of a binary operator and the type its right operand is
/// converted to (they differ for shifts).
pub(crate) fn operand_types(
    op: BinaryOp,
    left: PrimitiveType,
    right: PrimitiveType,
) -> Option<(JavaType, JavaType)> {
    use BinaryOp::*;
    let both = |p: PrimitiveType| Some((JavaType::Primitive(p), JavaType::Primitive(p)));
    match op {
        LogicalAnd | LogicalOr => {
            (left == PrimitiveType::Boolean && right == PrimitiveType::Boolean).then_some(())?;
            both(PrimitiveType::Boolean)
        }
        BitAnd | BitOr | BitXor | Equal | NotEqual => match (left, right) {
            (PrimitiveType::Boolean, PrimitiveType::Boolean) => both(PrimitiveType::Boolean),
            (l, r) if matches!(op, Equal | NotEqual) && l.is_numeric() && r.is_numeric() => {
                both(l.binary_promoted(r))
            }
            (l, r) if l.is_integral() && r.is_integral() => both(l.binary_promoted(r)),
            _ => None,
        },
        ShiftLeft | ShiftRight | ShiftRightUnsigned => (left.is_integral() && right.is_integral())
            .then(|| (JavaType::Primitive(left.promoted()), JavaType::Primitive(right.promoted()))),
        Add | Sub | Mul | Div | Rem | Less | LessEqual | Greater | GreaterEqual => {
            (left.is_numeric() && right.is_numeric()).then_some(())?;
            both(left.binary_promoted(right))
        }
    }
}

/// Conversions from the operand type back to a variable of type `ty`
/// (whose primitive or unboxed type is `p`). `allow_narrow_boxing` permits
/// narrowing followed by boxing, as `++` and `--` do.
fn result_conversions(
    operand: &JavaType,
    p: PrimitiveType,
    ty: &JavaType,
    allow_narrow_boxing: bool,
    span: Span,
) -> Result<Vec<Conversion>, CompilationError> {
    let mut out = Vec::new();
    let narrowed = operand.as_primitive() != Some(p);
    if narrowed {
        out.push(Conversion::NarrowingPrimitive(p));
    }
    if ty.is_reference() {
        if narrowed && !allow_narrow_boxing {
            return Err(incompatible(operand, ty, span));
        }
        out.push(Conversion::Boxing(p));
    }
    Ok(out)
}

fn fold(op: BinaryOp, left: &ExprFact, right: &ExprFact, operand: &JavaType) -> Option<ConstValue> {
    const_eval::binary(op, left.constant.as_ref()?, right.constant.as_ref()?, operand)
}

fn operator_fact(ty: JavaType, operand: JavaType, constant: Option<ConstValue>) -> ExprFact {
    ExprFact {
        ty,
        constant,
        binding: Binding::Operator {
            operand,
            result: Vec::new(),
        },
        conversion: Conversion::Identity,
    }
}

fn array_dims(ty: &JavaType) -> usize {
    let mut dims = 0;
    let mut current = ty;
    while let Some(element) = current.element_type() {
        dims += 1;
        current = element;
    }
    dims
}

pub(crate) fn require_value(fact: &ExprFact, span: Span) -> Result<(), CompilationError> {
    if fact.ty.is_void() {
        return Err(CompilationError::InvalidOperation {
            message: "'void' type not allowed here".to_string(),
            span,
        });
    }
    Ok(())
}

pub(crate) fn incompatible(from: &JavaType, to: &JavaType, span: Span) -> CompilationError {
    CompilationError::IncompatibleTypes {
        from: from.to_string(),
        to: to.to_string(),
        span,
    }
}

fn bad_operand(op: &str, ty: &JavaType, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!("bad operand type {ty} for unary operator '{op}'"),
        span,
    }
}

fn bad_operands(op: &str, left: &JavaType, right: &JavaType, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!("bad operand types for binary operator '{op}': {left}, {right}"),
        span,
    }
}
