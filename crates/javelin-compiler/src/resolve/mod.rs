//! Semantic resolution of a parsed compilation unit.
//!
//! The resolver binds names, types every expression, picks overloads,
//! folds constants and runs flow analysis on each body. It never touches
//! the AST: everything it learns goes into [`ResolvedFacts`].
//!
//! ## Phases
//!
//! 1. Declare the unit's class names so they can refer to each other
//! 2. Build the shape of every class (supertypes, fields, methods,
//!    default constructor) and check the class hierarchy
//! 3. Resolve field initializers and initializer blocks in declaration
//!    order, folding the values of constant fields
//! 4. Resolve method and constructor bodies, each followed by flow
//!    analysis

mod expr;
pub mod facts;
pub mod imports;
mod names;
mod stmt;

use std::sync::Arc;

use javelin_core::{
    AccessFlags, ClassShape, CompilationError, FieldShape, JavaType, MethodDescriptor, MethodShape,
    Span, TypeLookup,
};
use javelin_parser::ast::{
    CompilationUnit, ConstructorDecl, CtorCallKind, Member, MethodDecl, Modifiers, Param, TypeDecl,
    TypeKind, dotted,
};
use rustc_hash::FxHashSet;

use crate::context::{ClassTable, OBJECT, THROWABLE};
use crate::flow::{self, FlowBody, FlowItem};
use crate::scope::LocalScope;

use facts::{BodyKey, InvokeKind, LocalInfo, MethodRef, ResolvedFacts};
use imports::{ImportScope, ImportSpec, qualify};

/// A class of the unit after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    /// Dotted binary name.
    pub name: String,
    pub shape: Arc<ClassShape>,
    /// Index of the declaration in the unit.
    pub decl: usize,
    /// For each member, the index of its method in `shape.methods`.
    pub member_methods: Vec<Option<usize>>,
    /// Index of the synthesized default constructor in `shape.methods`.
    pub default_ctor: Option<usize>,
}

/// Output of [`resolve_unit`].
#[derive(Debug)]
pub struct ResolvedUnit {
    pub facts: ResolvedFacts,
    pub classes: Vec<ResolvedClass>,
}

/// What kind of code the resolver is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyKind {
    Method,
    Constructor,
    Initializer,
}

#[derive(Debug, Clone)]
pub(crate) struct BodyContext {
    pub class: String,
    pub is_static: bool,
    pub kind: BodyKind,
    pub return_type: JavaType,
    /// Inside the arguments of an explicit `this(...)` or `super(...)`.
    pub in_ctor_call: bool,
}

impl BodyContext {
    fn new(class: &str, is_static: bool, kind: BodyKind, return_type: JavaType) -> Self {
        Self {
            class: class.to_string(),
            is_static,
            kind,
            return_type,
            in_ctor_call: false,
        }
    }
}

/// Resolve every class of `unit`. `default_imports` behave as if written
/// at the top of the unit.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_unit(
    unit: &CompilationUnit<'_>,
    lookup: &dyn TypeLookup,
    default_imports: &[ImportSpec],
) -> Result<ResolvedUnit, CompilationError> {
    let package = unit.package.map(dotted).unwrap_or_default();
    let mut table = ClassTable::new(lookup);

    let mut names = Vec::with_capacity(unit.types.len());
    for decl in unit.types {
        let name = qualify(&package, decl.name.name);
        if !table.declare(&name) {
            return Err(CompilationError::DuplicateDefinition {
                name,
                span: decl.name.span,
            });
        }
        names.push(name);
    }

    let imports = ImportScope::new(&table, &package, default_imports, unit.imports)?;
    let mut resolver = Resolver::new(table, imports);

    let mut classes = Vec::with_capacity(unit.types.len());
    for (index, (decl, name)) in unit.types.iter().zip(&names).enumerate() {
        classes.push(resolver.declare_shape(index, decl, name)?);
    }
    for class in &classes {
        resolver.check_hierarchy(class, &unit.types[class.decl])?;
    }
    for (index, class) in classes.iter().enumerate() {
        resolver.resolve_initializers(index as u32, class, &unit.types[class.decl])?;
    }
    for (index, class) in classes.iter().enumerate() {
        resolver.resolve_bodies(index as u32, class, &unit.types[class.decl])?;
    }

    for class in &mut classes {
        if let Some(shape) = resolver.table.shape(&class.name) {
            class.shape = shape;
        }
    }
    log::debug!(
        "resolved {} class(es), {} expression facts, {} locals",
        classes.len(),
        resolver.facts.expr_count(),
        resolver.facts.local_count()
    );
    Ok(ResolvedUnit {
        facts: resolver.facts,
        classes,
    })
}

pub(crate) struct Resolver<'l> {
    pub(crate) table: ClassTable<'l>,
    pub(crate) imports: ImportScope,
    pub(crate) facts: ResolvedFacts,
    pub(crate) scope: LocalScope,
    pub(crate) body: BodyContext,
    /// `(class, field)` of final fields declared without an initializer.
    blank_finals: FxHashSet<(String, String)>,
}

impl<'l> Resolver<'l> {
    fn new(table: ClassTable<'l>, imports: ImportScope) -> Self {
        Self {
            table,
            imports,
            facts: ResolvedFacts::new(),
            scope: LocalScope::new(0),
            body: BodyContext::new("", true, BodyKind::Initializer, JavaType::Void),
            blank_finals: FxHashSet::default(),
        }
    }

    pub(crate) fn is_blank_final(&self, class: &str, field: &str) -> bool {
        self.blank_finals
            .contains(&(class.to_string(), field.to_string()))
    }

    // =========================================
    // Shapes
    // =========================================

    fn declare_shape(
        &mut self,
        index: usize,
        decl: &TypeDecl<'_>,
        name: &str,
    ) -> Result<ResolvedClass, CompilationError> {
        let is_interface = decl.kind == TypeKind::Interface;
        let mut access = class_access(decl)?;
        access |= if is_interface {
            AccessFlags::INTERFACE | AccessFlags::ABSTRACT
        } else {
            AccessFlags::SUPER
        };

        let superclass = match (&decl.extends, is_interface) {
            (Some(ty), false) => Some(self.class_type_name(ty)?),
            _ => Some(OBJECT.to_string()),
        };
        let mut interfaces = Vec::with_capacity(decl.interfaces.len());
        for ty in decl.interfaces {
            let interface = self.class_type_name(ty)?;
            if interfaces.contains(&interface) {
                return Err(CompilationError::DuplicateDefinition {
                    name: interface,
                    span: ty.span,
                });
            }
            interfaces.push(interface);
        }

        let mut fields: Vec<FieldShape> = Vec::new();
        let mut methods: Vec<MethodShape> = Vec::new();
        let mut member_methods = Vec::with_capacity(decl.members.len());
        let mut has_ctor = false;

        for member in decl.members {
            let mut method_index = None;
            match member {
                Member::Field(field) => {
                    let access = field_access(field.modifiers, is_interface, field.span)?;
                    let base = self.resolve_type(&field.ty)?;
                    for declarator in field.declarators {
                        let ty = base.clone().with_dims(declarator.extra_dims as usize);
                        if ty.is_void() {
                            return Err(void_variable(declarator.span));
                        }
                        if fields.iter().any(|f| f.name == declarator.name.name) {
                            return Err(CompilationError::DuplicateDefinition {
                                name: declarator.name.name.to_string(),
                                span: declarator.name.span,
                            });
                        }
                        if declarator.init.is_none() {
                            if is_interface {
                                return Err(CompilationError::InvalidOperation {
                                    message: format!(
                                        "interface field '{}' must be initialized",
                                        declarator.name
                                    ),
                                    span: declarator.span,
                                });
                            }
                            if access.is_final() {
                                self.blank_finals
                                    .insert((name.to_string(), declarator.name.name.to_string()));
                            }
                        }
                        fields.push(FieldShape {
                            name: declarator.name.name.to_string(),
                            ty,
                            access,
                            constant: None,
                        });
                    }
                }
                Member::Method(method) => {
                    let shape = self.method_shape(method, decl, is_interface)?;
                    push_method(&mut methods, shape, method.name.span)?;
                    method_index = Some(methods.len() - 1);
                }
                Member::Constructor(ctor) => {
                    if is_interface {
                        return Err(CompilationError::InvalidOperation {
                            message: "interfaces cannot declare constructors".to_string(),
                            span: ctor.span,
                        });
                    }
                    let shape = self.ctor_shape(ctor)?;
                    push_method(&mut methods, shape, ctor.name.span)?;
                    method_index = Some(methods.len() - 1);
                    has_ctor = true;
                }
                Member::Initializer(init) => {
                    if is_interface {
                        return Err(CompilationError::InvalidOperation {
                            message: "interfaces cannot declare initializers".to_string(),
                            span: init.span,
                        });
                    }
                }
            }
            member_methods.push(method_index);
        }

        let default_ctor = if is_interface || has_ctor {
            None
        } else {
            // The default constructor has the access of its class.
            let access = access & AccessFlags::PUBLIC;
            methods.push(MethodShape {
                name: "<init>".to_string(),
                descriptor: MethodDescriptor::new(Vec::new(), JavaType::Void),
                access,
                throws: Vec::new(),
            });
            Some(methods.len() - 1)
        };

        let shape = ClassShape {
            name: name.to_string(),
            access,
            superclass,
            interfaces,
            fields,
            methods,
        };
        log::trace!(
            "declared {name}: {} field(s), {} method(s)",
            shape.fields.len(),
            shape.methods.len()
        );
        self.table.insert(shape.clone());
        Ok(ResolvedClass {
            name: name.to_string(),
            shape: Arc::new(shape),
            decl: index,
            member_methods,
            default_ctor,
        })
    }

    fn method_shape(
        &mut self,
        method: &MethodDecl<'_>,
        class: &TypeDecl<'_>,
        is_interface: bool,
    ) -> Result<MethodShape, CompilationError> {
        let span = method.name.span;
        let modifiers = method.modifiers;
        if modifiers.contains(Modifiers::SYNCHRONIZED) {
            return Err(unsupported("synchronized methods", span));
        }
        let mut access = access_modifier(modifiers, span)?;
        if is_interface {
            if modifiers.intersects(Modifiers::STATIC | Modifiers::FINAL | Modifiers::NATIVE)
                || access.is_private()
                || access.contains(AccessFlags::PROTECTED)
            {
                return Err(CompilationError::InvalidOperation {
                    message: format!("illegal modifier for interface method '{}'", method.name),
                    span,
                });
            }
            if method.body.is_some() {
                return Err(CompilationError::InvalidOperation {
                    message: "interface methods cannot have a body".to_string(),
                    span,
                });
            }
            access = AccessFlags::PUBLIC | AccessFlags::ABSTRACT;
        } else {
            for (modifier, flag) in [
                (Modifiers::STATIC, AccessFlags::STATIC),
                (Modifiers::FINAL, AccessFlags::FINAL),
                (Modifiers::ABSTRACT, AccessFlags::ABSTRACT),
                (Modifiers::NATIVE, AccessFlags::NATIVE),
                (Modifiers::STRICTFP, AccessFlags::STRICT),
            ] {
                if modifiers.contains(modifier) {
                    access |= flag;
                }
            }
            if access.is_abstract() {
                if !class.modifiers.contains(Modifiers::ABSTRACT) {
                    return Err(CompilationError::InvalidOperation {
                        message: format!(
                            "abstract method '{}' in non-abstract class {}",
                            method.name, class.name
                        ),
                        span,
                    });
                }
                if access.intersects(AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::NATIVE) {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("illegal combination of modifiers on '{}'", method.name),
                        span,
                    });
                }
            }
            let needs_body = !access.intersects(AccessFlags::ABSTRACT | AccessFlags::NATIVE);
            match (needs_body, method.body.is_some()) {
                (true, false) => {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("missing body for method '{}'", method.name),
                        span,
                    });
                }
                (false, true) => {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("{} methods cannot have a body", if access.is_abstract() { "abstract" } else { "native" }),
                        span,
                    });
                }
                _ => {}
            }
        }

        let params = self.param_types(method.params)?;
        let ret = self.resolve_type(&method.return_ty)?;
        let throws = self.throws_clause(method.throws)?;
        Ok(MethodShape {
            name: method.name.name.to_string(),
            descriptor: MethodDescriptor::new(params, ret),
            access,
            throws,
        })
    }

    fn ctor_shape(&mut self, ctor: &ConstructorDecl<'_>) -> Result<MethodShape, CompilationError> {
        let span = ctor.name.span;
        let extra = ctor.modifiers - (Modifiers::PUBLIC | Modifiers::PROTECTED | Modifiers::PRIVATE);
        if !extra.is_empty() {
            return Err(CompilationError::InvalidOperation {
                message: "constructors only take access modifiers".to_string(),
                span,
            });
        }
        let access = access_modifier(ctor.modifiers, span)?;
        let params = self.param_types(ctor.params)?;
        let throws = self.throws_clause(ctor.throws)?;
        Ok(MethodShape {
            name: "<init>".to_string(),
            descriptor: MethodDescriptor::new(params, JavaType::Void),
            access,
            throws,
        })
    }

    fn param_types(&mut self, params: &[Param<'_>]) -> Result<Vec<JavaType>, CompilationError> {
        let mut out = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name.name == param.name.name) {
                return Err(CompilationError::DuplicateDefinition {
                    name: param.name.name.to_string(),
                    span: param.name.span,
                });
            }
            let ty = self.resolve_type(&param.ty)?;
            if ty.is_void() {
                return Err(void_variable(param.span));
            }
            out.push(ty);
        }
        Ok(out)
    }

    fn throws_clause(
        &mut self,
        throws: &[javelin_parser::ast::TypeExpr<'_>],
    ) -> Result<Vec<String>, CompilationError> {
        let mut out = Vec::with_capacity(throws.len());
        for ty in throws {
            let class = self.class_type_name(ty)?;
            if !self.table.is_subclass(&class, THROWABLE) {
                return Err(CompilationError::IncompatibleTypes {
                    from: class,
                    to: THROWABLE.to_string(),
                    span: ty.span,
                });
            }
            out.push(class);
        }
        Ok(out)
    }

    fn check_hierarchy(&self, class: &ResolvedClass, decl: &TypeDecl<'_>) -> Result<(), CompilationError> {
        let shape = &class.shape;
        if let Some(ty) = &decl.extends
            && !shape.is_interface()
        {
            let superclass = shape.superclass.as_deref().unwrap_or(OBJECT);
            let Some(super_shape) = self.table.shape(superclass) else {
                return Err(CompilationError::TypeNotFound {
                    name: superclass.to_string(),
                    span: ty.span,
                });
            };
            if super_shape.is_interface() {
                return Err(CompilationError::InvalidOperation {
                    message: format!("no interface expected here: {superclass}"),
                    span: ty.span,
                });
            }
            if super_shape.access.is_final() {
                return Err(CompilationError::InvalidOperation {
                    message: format!("cannot inherit from final {superclass}"),
                    span: ty.span,
                });
            }
        }
        for (interface, ty) in shape.interfaces.iter().zip(decl.interfaces) {
            if !self.table.is_interface(interface) {
                return Err(CompilationError::InvalidOperation {
                    message: format!("interface expected here: {interface}"),
                    span: ty.span,
                });
            }
        }
        let direct = shape
            .superclass
            .iter()
            .filter(|s| s.as_str() != OBJECT)
            .chain(&shape.interfaces);
        for parent in direct {
            if self.table.is_subclass(parent, &class.name) {
                return Err(CompilationError::InvalidOperation {
                    message: format!("cyclic inheritance involving {}", class.name),
                    span: decl.name.span,
                });
            }
        }
        Ok(())
    }

    // =========================================
    // Bodies
    // =========================================

    fn enter_body(&mut self, context: BodyContext) {
        self.scope = LocalScope::new(if context.is_static { 0 } else { 1 });
        self.body = context;
    }

    fn declare_params(&mut self, params: &[Param<'_>], types: &[JavaType]) -> Result<Vec<facts::LocalId>, CompilationError> {
        let mut ids = Vec::with_capacity(params.len());
        for (param, ty) in params.iter().zip(types) {
            let id = self.facts.next_local();
            let slot = self.scope.declare(param.name.name, id, ty.slot_size(), param.name.span)?;
            self.facts.add_local(LocalInfo {
                name: param.name.name.to_string(),
                ty: ty.clone(),
                slot,
                is_final: param.is_final,
                constant: None,
                span: param.span,
            });
            self.facts.declare(param.id, id)?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Field initializers and initializer blocks, static ones first.
    fn resolve_initializers(
        &mut self,
        class_index: u32,
        class: &ResolvedClass,
        decl: &TypeDecl<'_>,
    ) -> Result<(), CompilationError> {
        let ctor_throws: Vec<Vec<String>> = class
            .shape
            .constructors()
            .map(|ctor| ctor.throws.clone())
            .collect();

        for is_static in [true, false] {
            let in_interface = class.shape.is_interface();
            if !is_static && in_interface {
                continue;
            }
            self.enter_body(BodyContext::new(
                &class.name,
                is_static,
                BodyKind::Initializer,
                JavaType::Void,
            ));
            let mut items: Vec<FlowItem<'_>> = Vec::new();
            for member in decl.members {
                match member {
                    Member::Field(field) => {
                        let field_static = in_interface || field.modifiers.contains(Modifiers::STATIC);
                        if field_static != is_static {
                            continue;
                        }
                        for declarator in field.declarators {
                            if let Some(init) = declarator.init {
                                self.field_initializer(&class.name, declarator.name.name, init)?;
                                items.push(FlowItem::Expr(init));
                            }
                        }
                    }
                    Member::Initializer(init) if init.is_static == is_static => {
                        self.block(init.body)?;
                        items.push(FlowItem::Initializer(init.body, init.span));
                    }
                    _ => {}
                }
            }
            let key = if is_static {
                BodyKey::StaticInit { class: class_index }
            } else {
                BodyKey::InstanceInit { class: class_index }
            };
            self.facts.record_frame(key, self.scope.frame_size())?;

            let allowed = if is_static { vec![Vec::new()] } else { ctor_throws.clone() };
            flow::check_body(
                &self.table,
                &self.facts,
                FlowBody {
                    name: if is_static { "<clinit>" } else { "<init>" }.to_string(),
                    params: Vec::new(),
                    allowed,
                    returns_value: false,
                    items,
                    span: decl.name.span,
                },
            )?;
        }
        Ok(())
    }

    fn field_initializer(
        &mut self,
        class: &str,
        field: &str,
        init: javelin_parser::ast::Expr<'_>,
    ) -> Result<(), CompilationError> {
        let Some(shape) = self.table.shape(class) else {
            return Err(CompilationError::internal(format!("no shape for {class}")));
        };
        let Some(field_shape) = shape.field(field) else {
            return Err(CompilationError::internal(format!("no field {class}.{field}")));
        };
        let ty = field_shape.ty.clone();
        let is_final = field_shape.access.is_final();
        let fact = self.value_as(init, &ty)?;
        if is_final
            && (ty.is_primitive() || ty.is_string())
            && let Some(value) = fact.constant.as_ref().and_then(|c| crate::const_eval::cast(c, &ty))
        {
            log::trace!("constant field {class}.{field} = {value}");
            self.table.set_field_constant(class, field, value);
        }
        Ok(())
    }

    fn resolve_bodies(
        &mut self,
        class_index: u32,
        class: &ResolvedClass,
        decl: &TypeDecl<'_>,
    ) -> Result<(), CompilationError> {
        for (member_index, member) in decl.members.iter().enumerate() {
            let key = BodyKey::Member {
                class: class_index,
                member: member_index as u32,
            };
            let shape_index = class.member_methods[member_index];
            let shape = shape_index.and_then(|i| class.shape.methods.get(i));
            match (member, shape) {
                (Member::Method(method), Some(shape)) => {
                    if let Some(body) = method.body {
                        self.method_body(key, &class.name, method, shape, body)?;
                    }
                }
                (Member::Constructor(ctor), Some(shape)) => {
                    self.ctor_body(key, class, ctor, shape)?;
                }
                (Member::Method(_) | Member::Constructor(_), None) => {
                    return Err(CompilationError::internal(format!(
                        "member {member_index} of {} has no method shape",
                        class.name
                    )));
                }
                _ => {}
            }
        }

        if class.default_ctor.is_some() {
            let key = BodyKey::Member {
                class: class_index,
                member: decl.members.len() as u32,
            };
            self.enter_body(BodyContext::new(&class.name, false, BodyKind::Constructor, JavaType::Void));
            let ctor = self.implicit_super(&class.name, decl.name.span)?;
            self.facts.record_implicit_super(key, ctor)?;
            self.facts.record_frame(key, self.scope.frame_size())?;
        }
        Ok(())
    }

    fn method_body<'ast>(
        &mut self,
        key: BodyKey,
        class: &str,
        method: &MethodDecl<'ast>,
        shape: &MethodShape,
        body: &'ast javelin_parser::ast::Block<'ast>,
    ) -> Result<(), CompilationError> {
        log::trace!("resolving {class}.{}{}", shape.name, shape.descriptor);
        self.enter_body(BodyContext::new(
            class,
            shape.access.is_static(),
            BodyKind::Method,
            shape.ret().clone(),
        ));
        let params = self.declare_params(method.params, shape.params())?;
        self.block(body)?;
        self.facts.record_frame(key, self.scope.frame_size())?;

        flow::check_body(
            &self.table,
            &self.facts,
            FlowBody {
                name: method.name.name.to_string(),
                params,
                allowed: vec![shape.throws.clone()],
                returns_value: !shape.ret().is_void(),
                items: vec![FlowItem::Block(body)],
                span: body.span,
            },
        )
    }

    fn ctor_body<'ast>(
        &mut self,
        key: BodyKey,
        class: &ResolvedClass,
        ctor: &ConstructorDecl<'ast>,
        shape: &MethodShape,
    ) -> Result<(), CompilationError> {
        log::trace!("resolving {}.<init>{}", class.name, shape.descriptor);
        self.enter_body(BodyContext::new(&class.name, false, BodyKind::Constructor, JavaType::Void));
        let params = self.declare_params(ctor.params, shape.params())?;

        let mut items = Vec::new();
        match ctor.explicit_call {
            Some(call) => {
                self.body.in_ctor_call = true;
                let target = match call.kind {
                    CtorCallKind::This => class.name.clone(),
                    CtorCallKind::Super => class.shape.superclass.clone().unwrap_or_else(|| OBJECT.to_string()),
                };
                let resolved = self.constructor_call(&target, call.args, call.span);
                self.body.in_ctor_call = false;
                let ctor_ref = resolved?;
                if call.kind == CtorCallKind::This && ctor_ref.descriptor == shape.descriptor {
                    return Err(CompilationError::InvalidOperation {
                        message: "recursive constructor invocation".to_string(),
                        span: call.span,
                    });
                }
                items.extend(call.args.iter().map(|arg| FlowItem::Expr(*arg)));
                items.push(FlowItem::Throws(ctor_ref.throws.clone(), call.span));
                self.facts.record(
                    call.id,
                    facts::ExprFact::new(JavaType::Void).with_binding(facts::Binding::Method(ctor_ref)),
                )?;
            }
            None => {
                let ctor_ref = self.implicit_super(&class.name, ctor.name.span)?;
                items.push(FlowItem::Throws(ctor_ref.throws.clone(), ctor.name.span));
                self.facts.record_implicit_super(key, ctor_ref)?;
            }
        }
        self.block(ctor.body)?;
        self.facts.record_frame(key, self.scope.frame_size())?;
        items.push(FlowItem::Block(ctor.body));

        flow::check_body(
            &self.table,
            &self.facts,
            FlowBody {
                name: class.shape.name.clone(),
                params,
                allowed: vec![shape.throws.clone()],
                returns_value: false,
                items,
                span: ctor.body.span,
            },
        )
    }

    /// The superclass constructor invoked by a constructor without an
    /// explicit `this(...)` or `super(...)` call.
    fn implicit_super(&mut self, class: &str, span: Span) -> Result<MethodRef, CompilationError> {
        let superclass = self
            .table
            .shape(class)
            .and_then(|s| s.superclass.clone())
            .unwrap_or_else(|| OBJECT.to_string());
        let ctor = self
            .table
            .constructors(&superclass)
            .into_iter()
            .find(|c| c.params().is_empty() && self.table.is_accessible(&superclass, c.access, class));
        match ctor {
            Some(ctor) => Ok(MethodRef {
                owner: JavaType::class(superclass),
                name: ctor.name,
                descriptor: ctor.descriptor,
                kind: InvokeKind::Special,
                throws: ctor.throws,
            }),
            None => Err(CompilationError::NoApplicableMethod {
                name: superclass,
                args: String::new(),
                span,
            }),
        }
    }
}

// =========================================
// Modifiers
// =========================================

fn access_modifier(modifiers: Modifiers, span: Span) -> Result<AccessFlags, CompilationError> {
    let mut access = AccessFlags::empty();
    let mut count = 0;
    for (modifier, flag) in [
        (Modifiers::PUBLIC, AccessFlags::PUBLIC),
        (Modifiers::PROTECTED, AccessFlags::PROTECTED),
        (Modifiers::PRIVATE, AccessFlags::PRIVATE),
    ] {
        if modifiers.contains(modifier) {
            access |= flag;
            count += 1;
        }
    }
    if count > 1 {
        return Err(CompilationError::InvalidOperation {
            message: "illegal combination of access modifiers".to_string(),
            span,
        });
    }
    Ok(access)
}

fn class_access(decl: &TypeDecl<'_>) -> Result<AccessFlags, CompilationError> {
    let span = decl.name.span;
    let illegal = Modifiers::PRIVATE
        | Modifiers::PROTECTED
        | Modifiers::STATIC
        | Modifiers::NATIVE
        | Modifiers::SYNCHRONIZED
        | Modifiers::TRANSIENT
        | Modifiers::VOLATILE;
    if decl.modifiers.intersects(illegal) {
        return Err(CompilationError::InvalidOperation {
            message: format!("illegal modifier for class {}", decl.name),
            span,
        });
    }
    let mut access = access_modifier(decl.modifiers, span)?;
    if decl.modifiers.contains(Modifiers::FINAL) {
        if decl.kind == TypeKind::Interface || decl.modifiers.contains(Modifiers::ABSTRACT) {
            return Err(CompilationError::InvalidOperation {
                message: format!("illegal combination of modifiers on {}", decl.name),
                span,
            });
        }
        access |= AccessFlags::FINAL;
    }
    if decl.modifiers.contains(Modifiers::ABSTRACT) {
        access |= AccessFlags::ABSTRACT;
    }
    if decl.modifiers.contains(Modifiers::STRICTFP) {
        access |= AccessFlags::STRICT;
    }
    Ok(access)
}

fn field_access(modifiers: Modifiers, is_interface: bool, span: Span) -> Result<AccessFlags, CompilationError> {
    let illegal = Modifiers::ABSTRACT | Modifiers::NATIVE | Modifiers::SYNCHRONIZED | Modifiers::STRICTFP;
    if modifiers.intersects(illegal) {
        return Err(CompilationError::InvalidOperation {
            message: "illegal modifier for a field".to_string(),
            span,
        });
    }
    let mut access = access_modifier(modifiers, span)?;
    if is_interface {
        if access.intersects(AccessFlags::PRIVATE | AccessFlags::PROTECTED) {
            return Err(CompilationError::InvalidOperation {
                message: "interface fields are public".to_string(),
                span,
            });
        }
        return Ok(AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL);
    }
    for (modifier, flag) in [
        (Modifiers::STATIC, AccessFlags::STATIC),
        (Modifiers::FINAL, AccessFlags::FINAL),
        (Modifiers::TRANSIENT, AccessFlags::TRANSIENT),
        (Modifiers::VOLATILE, AccessFlags::VOLATILE),
    ] {
        if modifiers.contains(modifier) {
            access |= flag;
        }
    }
    if access.contains(AccessFlags::FINAL | AccessFlags::VOLATILE) {
        return Err(CompilationError::InvalidOperation {
            message: "a field cannot be both final and volatile".to_string(),
            span,
        });
    }
    Ok(access)
}

fn push_method(methods: &mut Vec<MethodShape>, shape: MethodShape, span: Span) -> Result<(), CompilationError> {
    if methods
        .iter()
        .any(|m| m.name == shape.name && m.params() == shape.params())
    {
        let name = if shape.is_constructor() {
            "constructor".to_string()
        } else {
            shape.name.clone()
        };
        return Err(CompilationError::DuplicateDefinition {
            name: format!("{name}{}", shape.descriptor),
            span,
        });
    }
    methods.push(shape);
    Ok(())
}

fn void_variable(span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: "'void' type not allowed here".to_string(),
        span,
    }
}

pub(crate) fn unsupported(what: &str, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!("{what} are not supported"),
        span,
    }
}

#[cfg(test)]
mod tests;
