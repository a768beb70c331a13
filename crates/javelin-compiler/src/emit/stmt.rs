//! Statement lowering: control flow, jumps through `finally` and exception
//! tables.
//!
//! Statements that cannot be reached produce no code. A `finally` block is
//! copied to every normal and abrupt exit of its `try` statement; the
//! protected ranges of the enclosing `try` statements are cut around each
//! copy so the copy runs under the handlers of the outer statements only.

use javelin_core::CompilationError;
use javelin_parser::ast::{
    Block, CaseLabel, ForEachStmt, ForStmt, IfStmt, LabeledStmt, LocalVarDecl, ReturnStmt, Stmt, SwitchStmt,
    TryStmt,
};

use super::jumps::{JumpScope, Region, TargetKind};
use super::{EmitResult, MethodGenerator};
use crate::bytecode::{Label, Opcode, ValueKind};
use crate::const_eval;
use crate::conversion::converted_type;

impl<'a, 'ast> MethodGenerator<'a, 'ast> {
    pub(super) fn block(&mut self, block: &'ast Block<'ast>) -> EmitResult<()> {
        for stmt in block.stmts {
            self.stmt(*stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: Stmt<'ast>) -> EmitResult<()> {
        if !self.live() {
            return Ok(());
        }
        self.mark_line(stmt.span());
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::LocalVar(decl) => self.local_var(decl),
            Stmt::Expr(stmt) => self.discard(stmt.expr),
            Stmt::Empty(_) => Ok(()),
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(_) | Stmt::DoWhile(_) | Stmt::For(_) | Stmt::ForEach(_) | Stmt::Switch(_) => {
                self.breakable(stmt, Vec::new())
            }
            Stmt::Labeled(stmt) => self.labeled(stmt),
            Stmt::Break(jump) => {
                let (depth, label) = self.jumps.break_target(jump.label.as_ref().map(|l| l.name))?;
                self.jump_to(depth, label)
            }
            Stmt::Continue(jump) => {
                let (depth, label) = self.jumps.continue_target(jump.label.as_ref().map(|l| l.name))?;
                self.jump_to(depth, label)
            }
            Stmt::Return(stmt) => self.return_stmt(stmt),
            Stmt::Throw(stmt) => {
                self.expr(stmt.expr)?;
                self.op(Opcode::Athrow)
            }
            Stmt::Try(stmt) => self.try_stmt(stmt),
        }
    }

    fn local_var(&mut self, decl: &'ast LocalVarDecl<'ast>) -> EmitResult<()> {
        let facts = self.facts;
        for declarator in decl.declarators {
            let Some(init) = declarator.init else { continue };
            let local = facts.local(facts.decl(declarator.id)?)?;
            self.expr(init)?;
            self.store(ValueKind::of(&local.ty), self.slot(local))?;
        }
        Ok(())
    }

    fn if_stmt(&mut self, stmt: &'ast IfStmt<'ast>) -> EmitResult<()> {
        let else_label = self.new_label();
        self.branch_on(stmt.condition, false, else_label)?;
        self.stmt(stmt.then_stmt)?;
        match stmt.else_stmt {
            Some(else_stmt) => {
                let end = self.new_label();
                self.goto(end)?;
                self.place(else_label)?;
                self.stmt(else_stmt)?;
                self.place(end)
            }
            None => self.place(else_label),
        }
    }

    // =========================================
    // Loops and switch
    // =========================================

    /// A loop or switch, with the labels of the labeled statements that
    /// directly enclose it.
    fn breakable(&mut self, stmt: Stmt<'ast>, labels: Vec<String>) -> EmitResult<()> {
        let exit = self.new_label();
        match stmt {
            Stmt::While(s) => {
                let top = self.new_label();
                self.place(top)?;
                self.branch_on(s.condition, false, exit)?;
                self.loop_body(s.body, labels, exit, top)?;
                self.goto(top)?;
            }
            Stmt::DoWhile(s) => {
                let (top, next) = (self.new_label(), self.new_label());
                self.place(top)?;
                self.loop_body(s.body, labels, exit, next)?;
                self.place(next)?;
                self.branch_on(s.condition, true, top)?;
            }
            Stmt::For(s) => self.for_stmt(s, labels, exit)?,
            Stmt::ForEach(s) => self.for_each(s, labels, exit)?,
            Stmt::Switch(s) => self.switch(s, labels, exit)?,
            _ => return Err(CompilationError::internal("statement is not breakable")),
        }
        self.place(exit)
    }

    fn loop_body(&mut self, body: Stmt<'ast>, labels: Vec<String>, exit: Label, next: Label) -> EmitResult<()> {
        self.jumps.push(JumpScope::Target {
            kind: TargetKind::Loop,
            labels,
            break_label: exit,
            continue_label: Some(next),
        });
        let result = self.stmt(body);
        self.jumps.pop();
        result
    }

    fn for_stmt(&mut self, stmt: &'ast ForStmt<'ast>, labels: Vec<String>, exit: Label) -> EmitResult<()> {
        for init in stmt.init {
            self.stmt(*init)?;
        }
        let (top, next) = (self.new_label(), self.new_label());
        self.place(top)?;
        if let Some(condition) = stmt.condition {
            self.branch_on(condition, false, exit)?;
        }
        self.loop_body(stmt.body, labels, exit, next)?;
        self.place(next)?;
        for update in stmt.update {
            self.discard(*update)?;
        }
        self.goto(top)
    }

    /// `for (T x : array)` over the array and index locals the resolver
    /// reserved.
    fn for_each(&mut self, stmt: &'ast ForEachStmt<'ast>, labels: Vec<String>, exit: Label) -> EmitResult<()> {
        let facts = self.facts;
        let fact = facts.foreach(stmt.var.id)?;
        let array = self.slot(facts.local(fact.array)?);
        let index = self.slot(facts.local(fact.index)?);
        let var = facts.local(facts.decl(stmt.var.id)?)?;

        self.expr(stmt.iterable)?;
        self.store(ValueKind::Reference, array)?;
        self.push_int(0)?;
        self.store(ValueKind::Int, index)?;

        let (top, next) = (self.new_label(), self.new_label());
        self.place(top)?;
        self.load(ValueKind::Int, index)?;
        self.load(ValueKind::Reference, array)?;
        self.op(Opcode::Arraylength)?;
        self.branch(Opcode::IfIcmpge, exit)?;
        self.load(ValueKind::Reference, array)?;
        self.load(ValueKind::Int, index)?;
        self.array_load(&fact.element)?;
        self.convert(&fact.conversion, &fact.element)?;
        self.store(ValueKind::of(&var.ty), self.slot(var))?;

        self.loop_body(stmt.body, labels, exit, next)?;
        self.place(next)?;
        self.iinc(index, 1)?;
        self.goto(top)
    }

    fn switch(&mut self, stmt: &'ast SwitchStmt<'ast>, labels: Vec<String>, exit: Label) -> EmitResult<()> {
        let facts = self.facts;
        self.expr(stmt.selector)?;

        let mut keys: Vec<(i32, Label)> = Vec::new();
        let mut default = None;
        let mut targets = Vec::with_capacity(stmt.groups.len());
        for group in stmt.groups {
            let target = self.new_label();
            targets.push(target);
            for label in group.labels {
                match label {
                    CaseLabel::Case(expr) => {
                        let fact = facts.expr(expr.id())?;
                        let key_type = converted_type(&fact.ty, &fact.conversion);
                        let key = fact
                            .constant
                            .as_ref()
                            .and_then(|c| const_eval::cast(c, &key_type))
                            .and_then(|c| c.as_i32())
                            .ok_or_else(|| CompilationError::internal("case label without a constant"))?;
                        keys.push((key, target));
                    }
                    CaseLabel::Default(_) => default = Some(target),
                }
            }
        }
        keys.sort_unstable_by_key(|(key, _)| *key);
        let default = default.unwrap_or(exit);

        if self.live() {
            match (keys.first(), keys.last()) {
                (Some(&(low, _)), Some(&(high, _))) if use_table(low, high, keys.len()) => {
                    let mut table = vec![default; (high as i64 - low as i64 + 1) as usize];
                    for &(key, target) in &keys {
                        table[(key as i64 - low as i64) as usize] = target;
                    }
                    self.code.tableswitch(default, low, &table)?;
                }
                _ => self.code.lookupswitch(default, &keys)?,
            }
        }

        self.jumps.push(JumpScope::Target {
            kind: TargetKind::Switch,
            labels,
            break_label: exit,
            continue_label: None,
        });
        let result = stmt.groups.iter().zip(targets).try_for_each(|(group, target)| {
            self.place(target)?;
            group.stmts.iter().try_for_each(|s| self.stmt(*s))
        });
        self.jumps.pop();
        result
    }

    fn labeled(&mut self, stmt: &'ast LabeledStmt<'ast>) -> EmitResult<()> {
        let mut labels = vec![stmt.label.name.to_string()];
        let mut body = stmt.body;
        while let Stmt::Labeled(inner) = body {
            labels.push(inner.label.name.to_string());
            body = inner.body;
        }
        match body {
            Stmt::While(_) | Stmt::DoWhile(_) | Stmt::For(_) | Stmt::ForEach(_) | Stmt::Switch(_) => {
                self.mark_line(body.span());
                self.breakable(body, labels)
            }
            _ => {
                let exit = self.new_label();
                self.jumps.push(JumpScope::Target {
                    kind: TargetKind::Labeled,
                    labels,
                    break_label: exit,
                    continue_label: None,
                });
                let result = self.stmt(body);
                self.jumps.pop();
                result?;
                self.place(exit)
            }
        }
    }

    // =========================================
    // Jumps
    // =========================================

    /// `break` or `continue` to `label` at jump stack `depth`.
    fn jump_to(&mut self, depth: usize, label: Label) -> EmitResult<()> {
        self.unwind(depth)?;
        self.goto(label)?;
        self.reopen_regions(depth)
    }

    fn return_stmt(&mut self, stmt: &'ast ReturnStmt<'ast>) -> EmitResult<()> {
        match stmt.value {
            Some(value) => {
                self.expr(value)?;
                let kind = ValueKind::of(&self.return_type);
                if self.jumps.in_finally_scope() {
                    let mark = self.next_temp;
                    let slot = self.alloc_temp(kind.words());
                    self.store(kind, slot)?;
                    self.unwind(0)?;
                    self.load(kind, slot)?;
                    self.next_temp = mark;
                }
                self.op(kind.return_op())?;
            }
            None => {
                self.unwind(0)?;
                self.op(Opcode::Return)?;
            }
        }
        self.reopen_regions(0)
    }

    /// Run the `finally` blocks between the current point and `depth`,
    /// innermost first.
    fn unwind(&mut self, depth: usize) -> EmitResult<()> {
        for finally_depth in self.jumps.finally_depths(depth) {
            if !self.live() {
                break;
            }
            self.inline_finally(finally_depth)?;
        }
        Ok(())
    }

    /// Copy the `finally` block at `depth`. Jumps inside the copy only see
    /// the scopes outside its `try` statement.
    fn inline_finally(&mut self, depth: usize) -> EmitResult<()> {
        let block = self
            .jumps
            .finally_block(depth)
            .ok_or_else(|| CompilationError::internal("no finally block at jump depth"))?;
        self.close_regions(depth)?;
        let saved = self.jumps.split_off(depth);
        let result = self.block(block);
        self.jumps.restore(saved);
        result
    }

    fn region_label(&mut self) -> EmitResult<(Label, u32)> {
        let label = self.new_label();
        self.place(label)?;
        Ok((label, self.code.offset()))
    }

    fn close_regions(&mut self, depth: usize) -> EmitResult<()> {
        let (end, offset) = self.region_label()?;
        for region in self.jumps.open_regions(depth) {
            region.close(end, offset);
        }
        Ok(())
    }

    fn reopen_regions(&mut self, depth: usize) -> EmitResult<()> {
        let (start, offset) = self.region_label()?;
        for region in self.jumps.closed_regions(depth) {
            region.reopen(start, offset);
        }
        Ok(())
    }

    fn push_region(&mut self) -> EmitResult<()> {
        let (start, offset) = self.region_label()?;
        self.jumps.push(JumpScope::Protected(Region::new(start, offset)));
        Ok(())
    }

    /// Close and pop the innermost protected region.
    fn pop_region(&mut self) -> EmitResult<Vec<(Label, Label)>> {
        let (end, offset) = self.region_label()?;
        match self.jumps.pop() {
            Some(JumpScope::Protected(mut region)) => {
                region.close(end, offset);
                Ok(region.into_ranges())
            }
            _ => Err(CompilationError::internal("unbalanced jump scopes")),
        }
    }

    // =========================================
    // try / catch / finally
    // =========================================

    fn try_stmt(&mut self, stmt: &'ast TryStmt<'ast>) -> EmitResult<()> {
        let facts = self.facts;
        let done = self.new_label();
        let depth = self.jumps.depth();
        if let Some(finally) = stmt.finally {
            self.jumps.push(JumpScope::Finally(finally));
            self.push_region()?;
        }
        if !stmt.catches.is_empty() {
            self.push_region()?;
        }

        self.block(stmt.body)?;
        let caught = if stmt.catches.is_empty() {
            Vec::new()
        } else {
            self.pop_region()?
        };
        self.complete_try(depth, stmt.finally.is_some(), done)?;

        // An empty protected range means the body cannot throw.
        if !caught.is_empty() {
            for catch in stmt.catches {
                let handler = self.new_label();
                for class in facts.catch_types(catch.id)? {
                    let index = self.pool.class(&class.replace('.', "/"))?;
                    for &(start, end) in &caught {
                        self.code.add_handler(start, end, handler, index);
                    }
                }
                self.code.place_handler(handler)?;
                self.reopen_regions(depth)?;
                let local = facts.local(facts.decl(catch.id)?)?;
                self.store(ValueKind::Reference, self.slot(local))?;
                self.block(catch.body)?;
                self.complete_try(depth, stmt.finally.is_some(), done)?;
            }
        }

        if let Some(finally) = stmt.finally {
            let ranges = self.pop_region()?;
            self.jumps.pop();
            if !ranges.is_empty() {
                let handler = self.new_label();
                for &(start, end) in &ranges {
                    self.code.add_handler(start, end, handler, 0);
                }
                self.code.place_handler(handler)?;
                let mark = self.next_temp;
                let slot = self.alloc_temp(1);
                self.store(ValueKind::Reference, slot)?;
                self.block(finally)?;
                self.load(ValueKind::Reference, slot)?;
                self.op(Opcode::Athrow)?;
                self.next_temp = mark;
            }
        }
        self.place(done)
    }

    /// Normal completion of a `try` block or catch clause: leave the
    /// protected ranges, run the `finally` block and continue after the
    /// statement.
    fn complete_try(&mut self, depth: usize, has_finally: bool, done: Label) -> EmitResult<()> {
        self.close_regions(depth)?;
        if !self.live() {
            return Ok(());
        }
        if has_finally {
            self.inline_finally(depth)?;
        }
        self.goto(done)
    }
}

/// Whether a `tableswitch` over `[low, high]` is no larger than a
/// `lookupswitch` with `count` keys, counting one table entry per word
/// and weighting the search cost.
fn use_table(low: i32, high: i32, count: usize) -> bool {
    let range = high as i64 - low as i64 + 1;
    let count = count as i64;
    let table_cost = 4 + range + 3 * 3;
    let lookup_cost = 3 + 2 * count + 3 * count;
    table_cost <= lookup_cost
}

#[cfg(test)]
mod tests {
    use super::use_table;

    #[test]
    fn dense_keys_use_a_table() {
        assert!(use_table(0, 3, 4));
        assert!(use_table(-2, 5, 8));
    }

    #[test]
    fn sparse_keys_use_a_lookup() {
        assert!(!use_table(0, 1000, 3));
        assert!(!use_table(i32::MIN, i32::MAX, 2));
    }
}
