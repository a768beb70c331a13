//! Statement resolution: local declarations, scopes and the typing rules
//! of each statement form. Reachability, definite assignment and label
//! checks run afterwards in [`crate::flow`].

use javelin_core::{CompilationError, JavaType, PrimitiveType, Span};
use javelin_parser::ast::{
    Block, CaseLabel, ForEachStmt, Ident, LocalVarDecl, NodeId, ReturnStmt, Stmt, SwitchStmt, TryStmt,
};
use rustc_hash::FxHashSet;

use super::expr::{incompatible, require_value};
use super::facts::{ForEachFact, LocalId, LocalInfo};
use super::{BodyKind, Resolver, void_variable};
use crate::const_eval;
use crate::context::THROWABLE;
use crate::conversion::{assignment, loose_invocation};

impl Resolver<'_> {
    /// Resolve a block in a scope of its own.
    pub(crate) fn block(&mut self, block: &Block<'_>) -> Result<(), CompilationError> {
        self.scoped(|r| {
            for stmt in block.stmts {
                r.statement(*stmt)?;
            }
            Ok(())
        })
    }

    fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompilationError>,
    ) -> Result<T, CompilationError> {
        self.scope.push_scope();
        let result = f(self);
        self.scope.pop_scope();
        result
    }

    /// The body of an `if`, loop or label.
    fn nested(&mut self, stmt: Stmt<'_>) -> Result<(), CompilationError> {
        self.scoped(|r| r.statement(stmt))
    }

    fn statement(&mut self, stmt: Stmt<'_>) -> Result<(), CompilationError> {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::LocalVar(decl) => self.local_var(decl),
            Stmt::Expr(stmt) => self.statement_expression(stmt.expr),
            Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
            Stmt::If(stmt) => {
                self.condition(stmt.condition)?;
                self.nested(stmt.then_stmt)?;
                if let Some(else_stmt) = stmt.else_stmt {
                    self.nested(else_stmt)?;
                }
                Ok(())
            }
            Stmt::While(stmt) => {
                self.condition(stmt.condition)?;
                self.nested(stmt.body)
            }
            Stmt::DoWhile(stmt) => {
                self.nested(stmt.body)?;
                self.condition(stmt.condition).map(|_| ())
            }
            Stmt::For(stmt) => self.scoped(|r| {
                for init in stmt.init {
                    r.statement(*init)?;
                }
                if let Some(condition) = stmt.condition {
                    r.condition(condition)?;
                }
                for update in stmt.update {
                    r.statement_expression(*update)?;
                }
                r.nested(stmt.body)
            }),
            Stmt::ForEach(stmt) => self.for_each(stmt),
            Stmt::Switch(stmt) => self.switch(stmt),
            Stmt::Labeled(stmt) => self.nested(stmt.body),
            Stmt::Return(stmt) => self.return_stmt(stmt),
            Stmt::Throw(stmt) => {
                let fact = self.infer(stmt.expr)?;
                require_value(&fact, stmt.expr.span())?;
                let throwable = JavaType::class(THROWABLE);
                if !fact.ty.is_reference() || !self.table.is_reference_assignable(&fact.ty, &throwable) {
                    return Err(incompatible(&fact.ty, &throwable, stmt.expr.span()));
                }
                self.record(stmt.expr.id(), fact).map(|_| ())
            }
            Stmt::Try(stmt) => self.try_stmt(stmt),
        }
    }

    /// Declare a named local in the current scope.
    fn declare_local(
        &mut self,
        name: &Ident<'_>,
        node: NodeId,
        ty: JavaType,
        is_final: bool,
        span: Span,
    ) -> Result<LocalId, CompilationError> {
        if ty.is_void() {
            return Err(void_variable(span));
        }
        let id = self.facts.next_local();
        let slot = self.scope.declare(name.name, id, ty.slot_size(), name.span)?;
        self.facts.add_local(LocalInfo {
            name: name.name.to_string(),
            ty,
            slot,
            is_final,
            constant: None,
            span,
        });
        self.facts.declare(node, id)?;
        Ok(id)
    }

    /// A compiler-generated local without a name.
    fn hidden_local(&mut self, name: &str, ty: JavaType, span: Span) -> Result<LocalId, CompilationError> {
        let slot = self.scope.allocate(ty.slot_size(), span)?;
        Ok(self.facts.add_local(LocalInfo {
            name: name.to_string(),
            ty,
            slot,
            is_final: false,
            constant: None,
            span,
        }))
    }

    fn local_var(&mut self, decl: &LocalVarDecl<'_>) -> Result<(), CompilationError> {
        let base = self.resolve_type(&decl.ty)?;
        for declarator in decl.declarators {
            let ty = base.clone().with_dims(declarator.extra_dims as usize);
            // The variable is in scope in its own initializer.
            let id = self.declare_local(&declarator.name, declarator.id, ty.clone(), decl.is_final, declarator.span)?;
            if let Some(init) = declarator.init {
                let fact = self.value_as(init, &ty)?;
                if decl.is_final
                    && (ty.is_primitive() || ty.is_string())
                    && let Some(value) = fact.constant.as_ref().and_then(|c| const_eval::cast(c, &ty))
                {
                    self.facts.set_local_constant(id, value);
                }
            }
        }
        Ok(())
    }

    fn return_stmt(&mut self, stmt: &ReturnStmt<'_>) -> Result<(), CompilationError> {
        let invalid = |message: &str| CompilationError::InvalidOperation {
            message: message.to_string(),
            span: stmt.span,
        };
        if self.body.kind == BodyKind::Initializer {
            return Err(invalid("return outside method"));
        }
        let return_type = self.body.return_type.clone();
        match stmt.value {
            Some(_) if return_type.is_void() => Err(invalid("unexpected return value")),
            Some(value) => self.value_as(value, &return_type).map(|_| ()),
            None if !return_type.is_void() => Err(invalid("missing return value")),
            None => Ok(()),
        }
    }

    fn switch(&mut self, stmt: &SwitchStmt<'_>) -> Result<(), CompilationError> {
        let selector = self.infer(stmt.selector)?;
        require_value(&selector, stmt.selector.span())?;
        let key_type = selector
            .ty
            .primitive_or_unboxed()
            .filter(|p| {
                matches!(
                    p,
                    PrimitiveType::Char | PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int
                )
            })
            .ok_or_else(|| CompilationError::InvalidOperation {
                message: format!("{} cannot be used as a switch selector", selector.ty),
                span: stmt.selector.span(),
            })?;
        let conversion = loose_invocation(&self.table, &selector.ty, &JavaType::INT)
            .ok_or_else(|| incompatible(&selector.ty, &JavaType::INT, stmt.selector.span()))?;
        self.record_converted(stmt.selector.id(), selector, conversion)?;

        let label_type = JavaType::Primitive(key_type);
        let mut keys: FxHashSet<i32> = FxHashSet::default();
        let mut has_default = false;
        // One scope for the whole switch block.
        self.scoped(|r| {
            for group in stmt.groups {
                for label in group.labels {
                    match label {
                        CaseLabel::Case(expr) => {
                            let span = expr.span();
                            let fact = r.infer(*expr)?;
                            require_value(&fact, span)?;
                            let Some(constant) = fact.constant.clone() else {
                                return Err(CompilationError::NotConstant { span });
                            };
                            let conversion = assignment(&r.table, &fact.ty, &label_type, Some(&constant))
                                .ok_or_else(|| incompatible(&fact.ty, &label_type, span))?;
                            let key = const_eval::cast(&constant, &label_type)
                                .and_then(|v| v.as_i32())
                                .ok_or(CompilationError::NotConstant { span })?;
                            r.record_converted(expr.id(), fact, conversion)?;
                            if !keys.insert(key) {
                                return Err(CompilationError::DuplicateCaseLabel {
                                    label: constant.to_string(),
                                    span,
                                });
                            }
                        }
                        CaseLabel::Default(span) => {
                            if has_default {
                                return Err(CompilationError::DuplicateCaseLabel {
                                    label: "default".to_string(),
                                    span: *span,
                                });
                            }
                            has_default = true;
                        }
                    }
                }
                for stmt in group.stmts {
                    r.statement(*stmt)?;
                }
            }
            Ok(())
        })
    }

    fn for_each(&mut self, stmt: &ForEachStmt<'_>) -> Result<(), CompilationError> {
        let iterable = self.value(stmt.iterable)?;
        let Some(element) = iterable.ty.element_type().cloned() else {
            return Err(CompilationError::InvalidOperation {
                message: format!("for-each not applicable to expression type {}", iterable.ty),
                span: stmt.iterable.span(),
            });
        };
        self.scoped(|r| {
            let array = r.hidden_local("for$array", iterable.ty.clone(), stmt.span)?;
            let index = r.hidden_local("for$index", JavaType::INT, stmt.span)?;
            let ty = r.resolve_type(&stmt.ty)?.with_dims(stmt.var.extra_dims as usize);
            let conversion = assignment(&r.table, &element, &ty, None)
                .ok_or_else(|| incompatible(&element, &ty, stmt.var.span))?;
            r.declare_local(&stmt.var.name, stmt.var.id, ty, stmt.is_final, stmt.var.span)?;
            r.facts.record_foreach(
                stmt.var.id,
                ForEachFact {
                    array,
                    index,
                    element,
                    conversion,
                },
            )?;
            r.nested(stmt.body)
        })
    }

    fn try_stmt(&mut self, stmt: &TryStmt<'_>) -> Result<(), CompilationError> {
        self.block(stmt.body)?;
        for catch in stmt.catches {
            let mut types: Vec<String> = Vec::with_capacity(catch.types.len());
            for ty in catch.types {
                let class = self.class_type_name(ty)?;
                if !self.table.is_subclass(&class, THROWABLE) {
                    return Err(incompatible(&JavaType::class(class), &JavaType::class(THROWABLE), ty.span));
                }
                if types
                    .iter()
                    .any(|other| self.table.is_subclass(&class, other) || self.table.is_subclass(other, &class))
                {
                    return Err(CompilationError::InvalidOperation {
                        message: "alternatives in a multi-catch statement cannot be related by subclassing"
                            .to_string(),
                        span: ty.span,
                    });
                }
                types.push(class);
            }
            let Some((first, rest)) = types.split_first() else {
                return Err(CompilationError::internal("catch clause without a type"));
            };
            let param_type = rest.iter().fold(JavaType::class(first.as_str()), |acc, t| {
                self.common_supertype(&acc, &JavaType::class(t.as_str()))
            });
            let multi = !rest.is_empty();
            self.scoped(|r| {
                r.declare_local(&catch.name, catch.id, param_type, multi, catch.span)?;
                r.block(catch.body)
            })?;
            self.facts.record_catch(catch.id, types)?;
        }
        if let Some(finally) = stmt.finally {
            self.block(finally)?;
        }
        Ok(())
    }
}
