//! Type names and ambiguous dotted names.
//!
//! A dotted name such as `a.b.c` can start with a local, a field, a
//! statically imported field, a type or a package. The first part is
//! classified in that order; the remaining parts select fields (or an
//! array's `length`) of whatever the prefix denotes.

use javelin_core::{CompilationError, ConstValue, JavaType, Span};
use javelin_parser::ast::{Ident, NameExpr, TypeBase, TypeExpr, dotted};

use super::Resolver;
use super::facts::{FieldRef, NameStep};
use crate::context::{FieldMatch, OBJECT};

/// What a dotted name denotes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NameMeaning {
    Value {
        steps: Vec<NameStep>,
        ty: JavaType,
        constant: Option<ConstValue>,
    },
    Type(String),
    Package(String),
}

impl Resolver<'_> {
    // =========================================
    // Types
    // =========================================

    pub(crate) fn resolve_type(&self, ty: &TypeExpr<'_>) -> Result<JavaType, CompilationError> {
        let base = match ty.base {
            TypeBase::Void => {
                if ty.dims > 0 {
                    return Err(CompilationError::InvalidOperation {
                        message: "'void' type not allowed here".to_string(),
                        span: ty.span,
                    });
                }
                return Ok(JavaType::Void);
            }
            TypeBase::Primitive(p) => JavaType::Primitive(p),
            TypeBase::Named(parts) => JavaType::Class(self.resolve_class_name(parts, ty.span)?),
        };
        Ok(base.with_dims(ty.dims as usize))
    }

    /// A type that must name a class or interface, e.g. in `extends`.
    pub(crate) fn class_type_name(&self, ty: &TypeExpr<'_>) -> Result<String, CompilationError> {
        match (ty.base, ty.dims) {
            (TypeBase::Named(parts), 0) => self.resolve_class_name(parts, ty.span),
            _ => Err(CompilationError::InvalidOperation {
                message: "class or interface type expected".to_string(),
                span: ty.span,
            }),
        }
    }

    pub(crate) fn resolve_class_name(&self, parts: &[Ident<'_>], span: Span) -> Result<String, CompilationError> {
        if let [simple] = parts {
            return self
                .imports
                .resolve_simple(&self.table, simple.name, span)?
                .ok_or_else(|| CompilationError::TypeNotFound {
                    name: simple.name.to_string(),
                    span,
                });
        }
        let name = dotted(parts);
        if self.table.exists(&name) {
            Ok(name)
        } else {
            Err(CompilationError::TypeNotFound { name, span })
        }
    }

    /// Nearest common supertype of two reference types.
    pub(crate) fn common_supertype(&self, a: &JavaType, b: &JavaType) -> JavaType {
        if self.table.is_reference_assignable(a, b) {
            return b.clone();
        }
        if self.table.is_reference_assignable(b, a) {
            return a.clone();
        }
        if let (JavaType::Class(x), JavaType::Class(y)) = (a, b) {
            for candidate in self.table.superclasses(x) {
                if self.table.is_subclass(y, &candidate) {
                    return JavaType::Class(candidate);
                }
            }
        }
        JavaType::object()
    }

    // =========================================
    // Ambiguous names
    // =========================================

    /// Classify a dotted name.
    pub(crate) fn resolve_name(&self, name: &NameExpr<'_>) -> Result<NameMeaning, CompilationError> {
        let parts = name.parts;
        let Some(first) = parts.first() else {
            return Err(CompilationError::internal("empty name"));
        };

        let (mut meaning, mut consumed) = match self.simple_value(first)? {
            Some(value) => (value, 1),
            None => self.type_or_package(parts)?,
        };

        while consumed < parts.len() {
            let part = &parts[consumed];
            meaning = match meaning {
                NameMeaning::Package(package) => {
                    return Err(CompilationError::NameNotFound {
                        name: format!("{package}.{}", part.name),
                        span: part.span,
                    });
                }
                NameMeaning::Type(class) => {
                    let found = self.lookup_field(&class, part)?;
                    if !found.field.access.is_static() {
                        return Err(static_context(part.name, part.span));
                    }
                    let constant = found.field.constant.clone();
                    let field = field_ref(found);
                    NameMeaning::Value {
                        ty: field.ty.clone(),
                        steps: vec![NameStep::Field(field)],
                        constant,
                    }
                }
                NameMeaning::Value { mut steps, ty, .. } => {
                    let (step, next) = self.member_of(&ty, part)?;
                    steps.push(step);
                    NameMeaning::Value {
                        steps,
                        ty: next,
                        constant: None,
                    }
                }
            };
            consumed += 1;
        }
        Ok(meaning)
    }

    /// A simple name as a local, a field of the current class or a
    /// statically imported field.
    fn simple_value(&self, ident: &Ident<'_>) -> Result<Option<NameMeaning>, CompilationError> {
        if let Some(id) = self.scope.lookup(ident.name) {
            let local = self.facts.local(id)?;
            return Ok(Some(NameMeaning::Value {
                ty: local.ty.clone(),
                constant: local.constant.clone(),
                steps: vec![NameStep::Local(id)],
            }));
        }

        if let Some(found) = self.table.find_field(&self.body.class, ident.name) {
            self.check_field_access(&found, ident)?;
            if !found.field.access.is_static() {
                if self.body.is_static {
                    return Err(static_context(ident.name, ident.span));
                }
                if self.body.in_ctor_call {
                    return Err(before_super(ident.name, ident.span));
                }
            }
            let constant = found.field.constant.clone();
            let field = field_ref(found);
            return Ok(Some(NameMeaning::Value {
                ty: field.ty.clone(),
                steps: vec![NameStep::Field(field)],
                constant,
            }));
        }

        let owners = self.imports.static_field_owners(&self.table, ident.name);
        match owners.as_slice() {
            [] => Ok(None),
            [owner] => {
                let found = self.lookup_field(owner, ident)?;
                let constant = found.field.constant.clone();
                let field = field_ref(found);
                Ok(Some(NameMeaning::Value {
                    ty: field.ty.clone(),
                    steps: vec![NameStep::Field(field)],
                    constant,
                }))
            }
            _ => Err(CompilationError::AmbiguousName {
                name: ident.name.to_string(),
                candidates: owners.join(", "),
                span: ident.span,
            }),
        }
    }

    /// The longest prefix that is a type, as a type; otherwise the
    /// package named by the first part.
    fn type_or_package(&self, parts: &[Ident<'_>]) -> Result<(NameMeaning, usize), CompilationError> {
        let first = &parts[0];
        if let Some(class) = self.imports.resolve_simple(&self.table, first.name, first.span)? {
            return Ok((NameMeaning::Type(class), 1));
        }
        let mut package = first.name.to_string();
        for (i, part) in parts.iter().enumerate().skip(1) {
            let candidate = format!("{package}.{}", part.name);
            if self.table.exists(&candidate) {
                return Ok((NameMeaning::Type(candidate), i + 1));
            }
            package = candidate;
        }
        if self.table.package_exists(first.name) {
            return Ok((NameMeaning::Package(dotted(parts)), parts.len()));
        }
        Err(CompilationError::NameNotFound {
            name: first.name.to_string(),
            span: first.span,
        })
    }

    /// A field or `length` of a value of type `ty`.
    fn member_of(&self, ty: &JavaType, part: &Ident<'_>) -> Result<(NameStep, JavaType), CompilationError> {
        match ty {
            JavaType::Array(_) if part.name == "length" => Ok((NameStep::ArrayLength, JavaType::INT)),
            JavaType::Array(_) => {
                let found = self.lookup_field(OBJECT, part)?;
                let field = field_ref(found);
                Ok((NameStep::Field(field.clone()), field.ty))
            }
            JavaType::Class(class) => {
                let found = self.lookup_field(class, part)?;
                let field = field_ref(found);
                Ok((NameStep::Field(field.clone()), field.ty))
            }
            other => Err(not_dereferenceable(other, part.span)),
        }
    }

    /// Find an accessible field of `class`.
    pub(crate) fn lookup_field(&self, class: &str, ident: &Ident<'_>) -> Result<FieldMatch, CompilationError> {
        let found = self
            .table
            .find_field(class, ident.name)
            .ok_or_else(|| CompilationError::NameNotFound {
                name: ident.name.to_string(),
                span: ident.span,
            })?;
        self.check_field_access(&found, ident)?;
        Ok(found)
    }

    fn check_field_access(&self, found: &FieldMatch, ident: &Ident<'_>) -> Result<(), CompilationError> {
        if self
            .table
            .is_accessible(&found.owner, found.field.access, &self.body.class)
        {
            Ok(())
        } else {
            Err(CompilationError::InvalidOperation {
                message: format!("'{}' is not accessible in {}", ident.name, found.owner),
                span: ident.span,
            })
        }
    }
}

pub(crate) fn field_ref(found: FieldMatch) -> FieldRef {
    FieldRef {
        owner: found.owner,
        name: found.field.name,
        ty: found.field.ty,
        is_static: found.field.access.is_static(),
        is_final: found.field.access.is_final(),
        constant: found.field.constant,
    }
}

pub(crate) fn static_context(name: &str, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!("non-static member '{name}' cannot be referenced from a static context"),
        span,
    }
}

pub(crate) fn before_super(name: &str, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!("cannot reference '{name}' before the superclass constructor has been called"),
        span,
    }
}

pub(crate) fn not_dereferenceable(ty: &JavaType, span: Span) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!("{ty} cannot be dereferenced"),
        span,
    }
}
