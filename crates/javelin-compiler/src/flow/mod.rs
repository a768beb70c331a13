//! Flow analysis of resolved bodies.
//!
//! Runs after a body is resolved and reads only [`ResolvedFacts`]. One
//! forward pass over the body checks:
//! - Reachability: unreachable statements, missing returns, initializers
//!   that cannot complete normally
//! - Definite assignment of locals, and assignments to `final` locals
//! - `break` and `continue` targets
//! - Checked exceptions: every exception that can escape the body is
//!   declared, and every `catch` of a checked exception can be reached

mod bits;

use javelin_core::{CompilationError, Span};
use javelin_parser::ast::{
    BinaryOp, Block, CaseLabel, Expr, Ident, JumpStmt, LabeledStmt, NodeId, Receiver, Stmt, TryStmt, UnaryOp,
};

use crate::context::{ClassTable, THROWABLE};
use crate::resolve::facts::{Binding, LocalId, NameStep, ResolvedFacts};

use bits::Bits;

/// A body to check.
pub(crate) struct FlowBody<'ast> {
    /// Method name for diagnostics.
    pub name: String,
    /// Definitely assigned on entry.
    pub params: Vec<LocalId>,
    /// Exception lists the body's checked exceptions must satisfy. An
    /// instance initializer must satisfy the `throws` clause of every
    /// constructor.
    pub allowed: Vec<Vec<String>>,
    pub returns_value: bool,
    pub items: Vec<FlowItem<'ast>>,
    pub span: Span,
}

/// Code run in sequence by a body.
pub(crate) enum FlowItem<'ast> {
    Expr(Expr<'ast>),
    Block(&'ast Block<'ast>),
    /// An initializer block, which must be able to complete normally.
    Initializer(&'ast Block<'ast>, Span),
    /// A call whose exceptions are known without an expression, such as
    /// an implicit `super()`.
    Throws(Vec<String>, Span),
}

/// Run flow analysis over one body.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn check_body(
    table: &ClassTable<'_>,
    facts: &ResolvedFacts,
    body: FlowBody<'_>,
) -> Result<(), CompilationError> {
    let width = facts.local_count();
    let mut flow = Flow {
        table,
        facts,
        width,
        state: State {
            reachable: true,
            da: Bits::empty(width),
        },
        targets: Vec::new(),
        catchers: Vec::new(),
        allowed: &body.allowed,
    };
    for param in &body.params {
        flow.state.da.set(param.index());
    }

    for item in &body.items {
        match item {
            FlowItem::Expr(expr) => flow.expr(*expr)?,
            FlowItem::Block(block) => flow.stmt(Stmt::Block(block))?,
            FlowItem::Initializer(block, span) => {
                flow.stmt(Stmt::Block(block))?;
                if !flow.state.reachable {
                    return Err(CompilationError::InvalidOperation {
                        message: "initializer must be able to complete normally".to_string(),
                        span: *span,
                    });
                }
            }
            FlowItem::Throws(classes, span) => {
                for class in classes {
                    flow.throw(class, *span)?;
                }
            }
        }
    }

    if body.returns_value && flow.state.reachable {
        return Err(CompilationError::MissingReturn {
            method: body.name,
            span: body.span,
        });
    }
    log::trace!("flow analysis of '{}' passed", body.name);
    Ok(())
}

// =========================================
// State
// =========================================

#[derive(Debug, Clone)]
struct State {
    reachable: bool,
    /// Definitely assigned locals. All set when unreachable.
    da: Bits,
}

impl State {
    fn dead(width: usize) -> Self {
        Self {
            reachable: false,
            da: Bits::full(width),
        }
    }

    /// Join of two paths.
    fn merge(mut self, other: &State) -> State {
        self.reachable |= other.reachable;
        self.da.intersect_with(&other.da);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TargetKind {
    Loop,
    Switch,
    Labeled,
    /// A `try` with a `finally` block that jumps pass through.
    Finally { completes: bool, assigned: Bits },
}

#[derive(Debug)]
struct Target {
    kind: TargetKind,
    labels: Vec<String>,
    /// Join of the states at every `break` that exits here.
    breaks: Option<State>,
    /// Join of the states at every `continue` of this loop.
    continues: Option<State>,
}

impl Target {
    fn new(kind: TargetKind, labels: Vec<String>) -> Self {
        Self {
            kind,
            labels,
            breaks: None,
            continues: None,
        }
    }
}

#[derive(Debug)]
struct CatchEntry {
    class: String,
    span: Span,
    used: bool,
}

/// The handlers of one `try`, innermost last on the stack.
#[derive(Debug)]
enum Catcher {
    Clauses(Vec<CatchEntry>),
    /// A `finally` that cannot complete normally discards every
    /// exception.
    Discard,
}

struct Flow<'a, 'l> {
    table: &'a ClassTable<'l>,
    facts: &'a ResolvedFacts,
    width: usize,
    state: State,
    targets: Vec<Target>,
    catchers: Vec<Catcher>,
    allowed: &'a [Vec<String>],
}

fn join(slot: &mut Option<State>, state: &State) {
    *slot = Some(match slot.take() {
        Some(previous) => previous.merge(state),
        None => state.clone(),
    });
}

impl Flow<'_, '_> {
    fn dead(&self) -> State {
        State::dead(self.width)
    }

    fn constant_bool(&self, expr: Expr<'_>) -> Option<bool> {
        self.facts
            .get(expr.id())
            .and_then(|f| f.constant.as_ref())
            .and_then(|c| c.as_bool())
    }

    /// The local a name expression reads or writes, if any.
    fn local_of(&self, expr: Expr<'_>) -> Option<LocalId> {
        let Expr::Name(name) = expr.unparenthesized() else {
            return None;
        };
        match &self.facts.get(name.id)?.binding {
            Binding::Path(steps) => match steps.as_slice() {
                [NameStep::Local(id)] => Some(*id),
                _ => None,
            },
            _ => None,
        }
    }

    fn use_local(&self, id: LocalId, span: Span) -> Result<(), CompilationError> {
        if self.state.da.get(id.index()) {
            return Ok(());
        }
        Err(CompilationError::UseBeforeAssignment {
            name: self.facts.local(id)?.name.clone(),
            span,
        })
    }

    fn assign_local(&mut self, id: LocalId, span: Span) -> Result<(), CompilationError> {
        let local = self.facts.local(id)?;
        // A final local may only be assigned while definitely unassigned,
        // approximated here as not definitely assigned.
        if local.is_final && self.state.da.get(id.index()) && self.state.reachable {
            return Err(CompilationError::FinalAssignment {
                name: local.name.clone(),
                span,
            });
        }
        self.state.da.set(id.index());
        Ok(())
    }

    // =========================================
    // Exceptions
    // =========================================

    fn throw(&mut self, class: &str, span: Span) -> Result<(), CompilationError> {
        for catcher in self.catchers.iter_mut().rev() {
            let entries = match catcher {
                Catcher::Discard => return Ok(()),
                Catcher::Clauses(entries) => entries,
            };
            let mut caught = false;
            for entry in entries.iter_mut() {
                if self.table.is_subclass(class, &entry.class) {
                    entry.used = true;
                    caught = true;
                } else if self.table.is_subclass(&entry.class, class) {
                    // A handler for a subclass may catch it at run time.
                    entry.used = true;
                }
            }
            if caught {
                return Ok(());
            }
        }
        if !self.table.is_checked_exception(class) {
            return Ok(());
        }
        let declared = self
            .allowed
            .iter()
            .all(|list| list.iter().any(|allowed| self.table.is_subclass(class, allowed)));
        if declared {
            Ok(())
        } else {
            Err(CompilationError::UndeclaredException {
                exception: class.to_string(),
                span,
            })
        }
    }

    fn throws_of(&mut self, id: NodeId, span: Span) -> Result<(), CompilationError> {
        let throws = match self.facts.get(id).map(|f| &f.binding) {
            Some(Binding::Method(method)) => method.throws.clone(),
            _ => return Ok(()),
        };
        for class in &throws {
            self.throw(class, span)?;
        }
        Ok(())
    }

    // =========================================
    // Expressions
    // =========================================

    fn expr(&mut self, expr: Expr<'_>) -> Result<(), CompilationError> {
        match expr {
            Expr::Literal(_) | Expr::This(_) => Ok(()),
            Expr::Name(name) => match self.local_of(expr) {
                Some(id) => self.use_local(id, name.span),
                None => Ok(()),
            },
            Expr::FieldAccess(access) => match access.target {
                Receiver::Expr(target) => self.expr(target),
                Receiver::Super(_) => Ok(()),
            },
            Expr::MethodCall(call) => {
                if let Some(Receiver::Expr(target)) = call.target {
                    self.expr(target)?;
                }
                for arg in call.args {
                    self.expr(*arg)?;
                }
                self.throws_of(call.id, call.span)
            }
            Expr::New(new) => {
                for arg in new.args {
                    self.expr(*arg)?;
                }
                self.throws_of(new.id, new.span)
            }
            Expr::NewArray(new) => {
                for dim in new.dim_exprs {
                    self.expr(*dim)?;
                }
                if let Some(init) = new.init {
                    self.expr(Expr::ArrayInit(init))?;
                }
                Ok(())
            }
            Expr::ArrayInit(init) => {
                for element in init.elements {
                    self.expr(*element)?;
                }
                Ok(())
            }
            Expr::Index(index) => {
                self.expr(index.array)?;
                self.expr(index.index)
            }
            Expr::Assign(assign) => {
                let compound = assign.op.binary_op().is_some();
                match self.local_of(assign.target) {
                    Some(id) => {
                        if compound {
                            self.use_local(id, assign.target.span())?;
                        }
                        self.expr(assign.value)?;
                        self.assign_local(id, assign.target.span())
                    }
                    None => {
                        self.lvalue_parts(assign.target)?;
                        self.expr(assign.value)
                    }
                }
            }
            Expr::Unary(unary) => match unary.op {
                UnaryOp::PreInc | UnaryOp::PreDec => self.increment(unary.operand),
                UnaryOp::Not => self.boolean_value(expr),
                _ => self.expr(unary.operand),
            },
            Expr::Postfix(postfix) => self.increment(postfix.operand),
            Expr::Binary(binary) => {
                if binary.op.is_short_circuit() {
                    return self.boolean_value(expr);
                }
                self.expr(binary.left)?;
                self.expr(binary.right)
            }
            Expr::Conditional(cond) => {
                let (when_true, when_false) = self.cond(cond.condition)?;
                self.state = when_true;
                self.expr(cond.then_expr)?;
                let after_then = std::mem::replace(&mut self.state, when_false);
                self.expr(cond.else_expr)?;
                self.state = after_then.merge(&self.state);
                Ok(())
            }
            Expr::Cast(cast) => self.expr(cast.expr),
            Expr::InstanceOf(test) => self.expr(test.expr),
            Expr::Paren(paren) => self.expr(paren.expr),
        }
    }

    /// Evaluate the subexpressions of a non-local assignment target.
    fn lvalue_parts(&mut self, target: Expr<'_>) -> Result<(), CompilationError> {
        match target.unparenthesized() {
            Expr::FieldAccess(access) => match access.target {
                Receiver::Expr(inner) => self.expr(inner),
                Receiver::Super(_) => Ok(()),
            },
            Expr::Index(index) => {
                self.expr(index.array)?;
                self.expr(index.index)
            }
            // A name whose last step is a field of a local.
            Expr::Name(name) => {
                if let Some(Binding::Path(steps)) = self.facts.get(name.id).map(|f| &f.binding)
                    && let Some(NameStep::Local(id)) = steps.first()
                    && steps.len() > 1
                {
                    return self.use_local(*id, name.span);
                }
                Ok(())
            }
            other => self.expr(other),
        }
    }

    fn increment(&mut self, operand: Expr<'_>) -> Result<(), CompilationError> {
        match self.local_of(operand) {
            Some(id) => {
                self.use_local(id, operand.span())?;
                self.assign_local(id, operand.span())
            }
            None => self.lvalue_parts(operand),
        }
    }

    /// A boolean expression used as a value: assigned after it when
    /// assigned both when true and when false.
    fn boolean_value(&mut self, expr: Expr<'_>) -> Result<(), CompilationError> {
        let (when_true, when_false) = self.cond(expr)?;
        self.state = when_true.merge(&when_false);
        Ok(())
    }

    /// States after a boolean expression when it is true and when false.
    fn cond(&mut self, expr: Expr<'_>) -> Result<(State, State), CompilationError> {
        if let Some(value) = self.constant_bool(expr) {
            let vacuous = State {
                reachable: self.state.reachable,
                da: Bits::full(self.width),
            };
            let state = self.state.clone();
            return Ok(if value { (state, vacuous) } else { (vacuous, state) });
        }
        match expr {
            Expr::Paren(paren) => self.cond(paren.expr),
            Expr::Unary(unary) if unary.op == UnaryOp::Not => {
                let (when_true, when_false) = self.cond(unary.operand)?;
                Ok((when_false, when_true))
            }
            Expr::Binary(binary) if binary.op == BinaryOp::LogicalAnd => {
                let (left_true, left_false) = self.cond(binary.left)?;
                self.state = left_true;
                let (right_true, right_false) = self.cond(binary.right)?;
                Ok((right_true, left_false.merge(&right_false)))
            }
            Expr::Binary(binary) if binary.op == BinaryOp::LogicalOr => {
                let (left_true, left_false) = self.cond(binary.left)?;
                self.state = left_false;
                let (right_true, right_false) = self.cond(binary.right)?;
                Ok((left_true.merge(&right_true), right_false))
            }
            Expr::Conditional(cond) => {
                let (cond_true, cond_false) = self.cond(cond.condition)?;
                self.state = cond_true;
                let (then_true, then_false) = self.cond(cond.then_expr)?;
                self.state = cond_false;
                let (else_true, else_false) = self.cond(cond.else_expr)?;
                Ok((then_true.merge(&else_true), then_false.merge(&else_false)))
            }
            _ => {
                self.expr(expr)?;
                Ok((self.state.clone(), self.state.clone()))
            }
        }
    }

    // =========================================
    // Statements
    // =========================================

    fn block(&mut self, block: &Block<'_>) -> Result<(), CompilationError> {
        for stmt in block.stmts {
            self.stmt(*stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: Stmt<'_>) -> Result<(), CompilationError> {
        if !self.state.reachable {
            return Err(CompilationError::UnreachableCode { span: stmt.span() });
        }
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::LocalVar(decl) => {
                for declarator in decl.declarators {
                    let id = self.facts.decl(declarator.id)?;
                    match declarator.init {
                        Some(init) => {
                            self.expr(init)?;
                            self.state.da.set(id.index());
                        }
                        None => self.state.da.clear(id.index()),
                    }
                }
                Ok(())
            }
            Stmt::Expr(stmt) => self.expr(stmt.expr),
            Stmt::Empty(_) => Ok(()),
            Stmt::If(stmt) => {
                let (when_true, when_false) = self.cond(stmt.condition)?;
                self.state = when_true;
                self.stmt(stmt.then_stmt)?;
                let after_then = std::mem::replace(&mut self.state, when_false);
                if let Some(else_stmt) = stmt.else_stmt {
                    self.stmt(else_stmt)?;
                }
                self.state = after_then.merge(&self.state);
                Ok(())
            }
            Stmt::While(_) | Stmt::DoWhile(_) | Stmt::For(_) | Stmt::ForEach(_) => self.loop_stmt(stmt, Vec::new()),
            Stmt::Switch(switch) => {
                self.expr(switch.selector)?;
                let entry = self.state.clone();
                self.targets.push(Target::new(TargetKind::Switch, Vec::new()));
                let mut has_default = false;
                for (i, group) in switch.groups.iter().enumerate() {
                    has_default |= group.labels.iter().any(|l| matches!(l, CaseLabel::Default(_)));
                    self.state = if i == 0 {
                        entry.clone()
                    } else {
                        entry.clone().merge(&self.state)
                    };
                    for stmt in group.stmts {
                        self.stmt(*stmt)?;
                    }
                }
                let target = self.pop_target()?;
                let mut exit = if switch.groups.is_empty() {
                    entry.clone()
                } else {
                    self.state.clone()
                };
                if !has_default {
                    exit = exit.merge(&entry);
                }
                if let Some(breaks) = &target.breaks {
                    exit = exit.merge(breaks);
                }
                self.state = exit;
                Ok(())
            }
            Stmt::Break(jump) => self.jump(jump, false),
            Stmt::Continue(jump) => self.jump(jump, true),
            Stmt::Labeled(labeled) => self.labeled(labeled),
            Stmt::Return(ret) => {
                if let Some(value) = ret.value {
                    self.expr(value)?;
                }
                self.state = self.dead();
                Ok(())
            }
            Stmt::Throw(throw) => {
                self.expr(throw.expr)?;
                let thrown = self
                    .facts
                    .expr(throw.expr.id())?
                    .ty
                    .class_name()
                    .map(str::to_string);
                if let Some(class) = thrown {
                    self.throw(&class, throw.span)?;
                }
                self.state = self.dead();
                Ok(())
            }
            Stmt::Try(try_stmt) => self.try_stmt(try_stmt),
        }
    }

    fn pop_target(&mut self) -> Result<Target, CompilationError> {
        self.targets
            .pop()
            .ok_or_else(|| CompilationError::internal("jump target stack underflow"))
    }

    fn labeled(&mut self, labeled: &LabeledStmt<'_>) -> Result<(), CompilationError> {
        let mut labels: Vec<String> = Vec::new();
        let mut body = Stmt::Labeled(labeled);
        while let Stmt::Labeled(inner) = body {
            let name = inner.label.name;
            if labels.iter().any(|l| l == name) || self.targets.iter().any(|t| t.labels.iter().any(|l| l == name)) {
                return Err(CompilationError::InvalidJump {
                    message: format!("label '{name}' already in use"),
                    span: inner.label.span,
                });
            }
            labels.push(name.to_string());
            body = inner.body;
        }
        if matches!(body, Stmt::While(_) | Stmt::DoWhile(_) | Stmt::For(_) | Stmt::ForEach(_)) {
            return self.loop_stmt(body, labels);
        }
        self.targets.push(Target::new(TargetKind::Labeled, labels));
        self.stmt(body)?;
        let target = self.pop_target()?;
        if let Some(breaks) = &target.breaks {
            self.state = self.state.clone().merge(breaks);
        }
        Ok(())
    }

    fn loop_stmt(&mut self, stmt: Stmt<'_>, labels: Vec<String>) -> Result<(), CompilationError> {
        self.targets.push(Target::new(TargetKind::Loop, labels));
        // State when the condition is false, or None when it is constant
        // true and the loop only exits through `break`.
        let exit: Option<State> = match stmt {
            Stmt::While(w) => {
                let (when_true, when_false) = self.cond(w.condition)?;
                let constant = self.constant_bool(w.condition);
                self.state = when_true;
                if constant == Some(false) {
                    self.state.reachable = false;
                }
                self.stmt(w.body)?;
                (constant != Some(true)).then_some(when_false)
            }
            Stmt::DoWhile(d) => {
                self.stmt(d.body)?;
                if let Some(continues) = self.targets.last().and_then(|t| t.continues.clone()) {
                    self.state = self.state.clone().merge(&continues);
                }
                let (_, when_false) = self.cond(d.condition)?;
                let completes = self.state.reachable;
                let constant = self.constant_bool(d.condition);
                (constant != Some(true) && completes).then_some(when_false)
            }
            Stmt::For(f) => {
                for init in f.init {
                    self.stmt(*init)?;
                }
                let (when_true, when_false, constant) = match f.condition {
                    Some(condition) => {
                        let (t, e) = self.cond(condition)?;
                        (t, e, self.constant_bool(condition))
                    }
                    None => (self.state.clone(), self.dead(), Some(true)),
                };
                self.state = when_true;
                if constant == Some(false) {
                    self.state.reachable = false;
                }
                self.stmt(f.body)?;
                if let Some(continues) = self.targets.last().and_then(|t| t.continues.clone()) {
                    self.state = self.state.clone().merge(&continues);
                }
                for update in f.update {
                    self.expr(*update)?;
                }
                (constant != Some(true)).then_some(when_false)
            }
            Stmt::ForEach(f) => {
                self.expr(f.iterable)?;
                let entry = self.state.clone();
                let var = self.facts.decl(f.var.id)?;
                self.state.da.set(var.index());
                self.stmt(f.body)?;
                Some(entry)
            }
            _ => return Err(CompilationError::internal("not a loop statement")),
        };
        let target = self.pop_target()?;
        let mut after = exit.unwrap_or_else(|| self.dead());
        if let Some(breaks) = &target.breaks {
            after = after.merge(breaks);
        }
        self.state = after;
        Ok(())
    }

    fn jump(&mut self, jump: &JumpStmt<'_>, is_continue: bool) -> Result<(), CompilationError> {
        let mut reaches = true;
        let mut assigned = Bits::empty(self.width);
        let mut found = None;
        for (i, target) in self.targets.iter().enumerate().rev() {
            if let TargetKind::Finally { completes, assigned: by_finally } = &target.kind {
                reaches &= *completes;
                assigned.union_with(by_finally);
                continue;
            }
            let matches = match &jump.label {
                Some(label) => target.labels.iter().any(|l| l == label.name),
                None if is_continue => target.kind == TargetKind::Loop,
                None => matches!(target.kind, TargetKind::Loop | TargetKind::Switch),
            };
            if matches {
                if is_continue && target.kind != TargetKind::Loop {
                    return Err(invalid_jump(jump.label.as_ref(), "not a loop label", jump.span));
                }
                found = Some(i);
                break;
            }
        }
        let Some(index) = found else {
            let message = match (&jump.label, is_continue) {
                (Some(_), _) => "undefined label",
                (None, false) => "break outside switch or loop",
                (None, true) => "continue outside of loop",
            };
            return Err(invalid_jump(jump.label.as_ref(), message, jump.span));
        };
        if reaches {
            let mut state = self.state.clone();
            state.da.union_with(&assigned);
            let target = &mut self.targets[index];
            join(if is_continue { &mut target.continues } else { &mut target.breaks }, &state);
        }
        self.state = self.dead();
        Ok(())
    }

    fn try_stmt(&mut self, stmt: &TryStmt<'_>) -> Result<(), CompilationError> {
        let entry = self.state.clone();

        // The finally block starts from the state before the try, so it is
        // analysed first; jumps leaving the try need its outcome.
        let finally = match stmt.finally {
            Some(block) => {
                self.stmt(Stmt::Block(block))?;
                Some(std::mem::replace(&mut self.state, entry.clone()))
            }
            None => None,
        };
        let finally_completes = finally.as_ref().is_none_or(|s| s.reachable);
        if !finally_completes {
            self.catchers.push(Catcher::Discard);
        }
        if let Some(state) = &finally {
            self.targets.push(Target::new(
                TargetKind::Finally {
                    completes: state.reachable,
                    assigned: state.da.clone(),
                },
                Vec::new(),
            ));
        }

        let mut entries = Vec::new();
        for catch in stmt.catches {
            for (class, ty) in self.facts.catch_types(catch.id)?.iter().zip(catch.types) {
                if let Some(earlier) = entries
                    .iter()
                    .find(|e: &&CatchEntry| self.table.is_subclass(class, &e.class))
                {
                    return Err(CompilationError::InvalidOperation {
                        message: format!("exception {class} has already been caught by {}", earlier.class),
                        span: ty.span,
                    });
                }
                entries.push(CatchEntry {
                    class: class.clone(),
                    span: ty.span,
                    used: false,
                });
            }
        }
        self.catchers.push(Catcher::Clauses(entries));
        self.stmt(Stmt::Block(stmt.body))?;
        let mut out = self.state.clone();
        if let Some(Catcher::Clauses(entries)) = self.catchers.pop() {
            for entry in entries {
                let broad = entry.class == THROWABLE || entry.class == "java.lang.Exception";
                if !entry.used && !broad && self.table.is_checked_exception(&entry.class) {
                    return Err(CompilationError::UnreachableCode { span: entry.span });
                }
            }
        }

        for catch in stmt.catches {
            self.state = entry.clone();
            let param = self.facts.decl(catch.id)?;
            self.state.da.set(param.index());
            self.stmt(Stmt::Block(catch.body))?;
            out = out.merge(&self.state);
        }

        if finally.is_some() {
            self.pop_target()?;
        }
        if !finally_completes {
            self.catchers.pop();
        }
        self.state = match finally {
            Some(state) if !state.reachable => self.dead(),
            Some(state) => {
                out.da.union_with(&state.da);
                out
            }
            None => out,
        };
        Ok(())
    }
}

fn invalid_jump(label: Option<&Ident<'_>>, message: &str, span: Span) -> CompilationError {
    let message = match label {
        Some(label) => format!("{message}: {}", label.name),
        None => message.to_string(),
    };
    CompilationError::InvalidJump { message, span }
}
