//! Jump management for control flow.
//!
//! The [`JumpStack`] mirrors the statements enclosing the current point of
//! a body: breakable statements, `finally` blocks a jump must run on its
//! way out, and the protected ranges of `try` statements. A jump searches
//! the stack for its target; every `finally` between the top and the
//! target is inlined before the `goto`.

use javelin_core::CompilationError;
use javelin_parser::ast::Block;

use crate::bytecode::Label;

/// What a breakable statement is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetKind {
    Loop,
    Switch,
    /// A labeled statement that is neither a loop nor a switch.
    Labeled,
}

/// A protected range of one `try` statement.
///
/// The range is closed while a `finally` is inlined so the inlined copy is
/// not covered by the handlers of the `try` it belongs to.
#[derive(Debug)]
pub(crate) struct Region {
    /// Start of the open range, with its offset; `None` while closed.
    open: Option<(Label, u32)>,
    /// Closed, non-empty ranges.
    ranges: Vec<(Label, Label)>,
}

impl Region {
    pub fn new(start: Label, offset: u32) -> Self {
        Self {
            open: Some((start, offset)),
            ranges: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Close the open range at `end`, placed at `offset`. Empty ranges are
    /// dropped.
    pub fn close(&mut self, end: Label, offset: u32) {
        if let Some((start, start_offset)) = self.open.take()
            && offset > start_offset
        {
            self.ranges.push((start, end));
        }
    }

    pub fn reopen(&mut self, start: Label, offset: u32) {
        if self.open.is_none() {
            self.open = Some((start, offset));
        }
    }

    /// The closed ranges; the region must be closed first.
    pub fn into_ranges(self) -> Vec<(Label, Label)> {
        self.ranges
    }
}

/// One entry of the jump stack.
#[derive(Debug)]
pub(crate) enum JumpScope<'ast> {
    Target {
        kind: TargetKind,
        labels: Vec<String>,
        break_label: Label,
        continue_label: Option<Label>,
    },
    Finally(&'ast Block<'ast>),
    Protected(Region),
}

/// Stack of the jump scopes enclosing the current point (innermost last).
#[derive(Debug, Default)]
pub(crate) struct JumpStack<'ast> {
    scopes: Vec<JumpScope<'ast>>,
}

fn invalid(message: &str) -> CompilationError {
    CompilationError::internal(format!("{message} survived flow analysis"))
}

impl<'ast> JumpStack<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self, scope: JumpScope<'ast>) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<JumpScope<'ast>> {
        self.scopes.pop()
    }

    /// Remove and return every scope from `depth` up.
    pub fn split_off(&mut self, depth: usize) -> Vec<JumpScope<'ast>> {
        self.scopes.split_off(depth)
    }

    pub fn restore(&mut self, scopes: Vec<JumpScope<'ast>>) {
        self.scopes.extend(scopes);
    }

    /// Depth of the target of a `break` and its label.
    pub fn break_target(&self, label: Option<&str>) -> Result<(usize, Label), CompilationError> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| match scope {
                JumpScope::Target {
                    kind,
                    labels,
                    break_label,
                    ..
                } => {
                    let matches = match label {
                        Some(label) => labels.iter().any(|l| l == label),
                        None => *kind != TargetKind::Labeled,
                    };
                    matches.then_some((depth, *break_label))
                }
                _ => None,
            })
            .ok_or_else(|| invalid("break without target"))
    }

    /// Depth of the loop a `continue` resumes and its label.
    pub fn continue_target(&self, label: Option<&str>) -> Result<(usize, Label), CompilationError> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| match scope {
                JumpScope::Target {
                    kind: TargetKind::Loop,
                    labels,
                    continue_label: Some(continue_label),
                    ..
                } if label.is_none_or(|label| labels.iter().any(|l| l == label)) => {
                    Some((depth, *continue_label))
                }
                _ => None,
            })
            .ok_or_else(|| invalid("continue without loop"))
    }

    /// Depths of the `finally` blocks above `depth`, innermost first.
    pub fn finally_depths(&self, depth: usize) -> Vec<usize> {
        (depth..self.scopes.len())
            .rev()
            .filter(|&d| matches!(self.scopes[d], JumpScope::Finally(_)))
            .collect()
    }

    pub fn finally_block(&self, depth: usize) -> Option<&'ast Block<'ast>> {
        match self.scopes.get(depth) {
            Some(JumpScope::Finally(block)) => Some(*block),
            _ => None,
        }
    }

    /// Regions from `depth` up that are open.
    pub fn open_regions(&mut self, depth: usize) -> impl Iterator<Item = &mut Region> {
        let len = self.scopes.len();
        self.scopes[depth.min(len)..]
            .iter_mut()
            .filter_map(|scope| match scope {
                JumpScope::Protected(region) if region.is_open() => Some(region),
                _ => None,
            })
    }

    /// Regions from `depth` up that are closed.
    pub fn closed_regions(&mut self, depth: usize) -> impl Iterator<Item = &mut Region> {
        let len = self.scopes.len();
        self.scopes[depth.min(len)..]
            .iter_mut()
            .filter_map(|scope| match scope {
                JumpScope::Protected(region) if !region.is_open() => Some(region),
                _ => None,
            })
    }

    /// Whether any `finally` encloses the current point.
    pub fn in_finally_scope(&self) -> bool {
        self.scopes.iter().any(|s| matches!(s, JumpScope::Finally(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::CodeBuffer;

    fn target(kind: TargetKind, labels: &[&str], break_label: Label, continue_label: Option<Label>) -> JumpScope<'static> {
        JumpScope::Target {
            kind,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            break_label,
            continue_label,
        }
    }

    #[test]
    fn new_stack_is_empty() {
        let stack = JumpStack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.break_target(None).is_err());
        assert!(stack.continue_target(None).is_err());
    }

    #[test]
    fn nested_loops() {
        let mut code = CodeBuffer::new(0);
        let (outer_break, outer_continue) = (code.new_label(), code.new_label());
        let (inner_break, inner_continue) = (code.new_label(), code.new_label());
        let mut stack = JumpStack::new();
        stack.push(target(TargetKind::Loop, &["outer"], outer_break, Some(outer_continue)));
        stack.push(target(TargetKind::Loop, &[], inner_break, Some(inner_continue)));

        assert_eq!(stack.break_target(None).unwrap(), (1, inner_break));
        assert_eq!(stack.continue_target(None).unwrap(), (1, inner_continue));
        assert_eq!(stack.break_target(Some("outer")).unwrap(), (0, outer_break));
        assert_eq!(stack.continue_target(Some("outer")).unwrap(), (0, outer_continue));

        stack.pop();
        assert_eq!(stack.break_target(None).unwrap(), (0, outer_break));
    }

    #[test]
    fn unlabeled_break_skips_labeled_blocks() {
        let mut code = CodeBuffer::new(0);
        let (switch_break, block_break) = (code.new_label(), code.new_label());
        let mut stack = JumpStack::new();
        stack.push(target(TargetKind::Switch, &[], switch_break, None));
        stack.push(target(TargetKind::Labeled, &["b"], block_break, None));

        assert_eq!(stack.break_target(None).unwrap(), (0, switch_break));
        assert_eq!(stack.break_target(Some("b")).unwrap(), (1, block_break));
        assert!(stack.continue_target(None).is_err());
    }

    #[test]
    fn finally_blocks_between_jump_and_target() {
        let block = Block {
            stmts: &[],
            span: Default::default(),
        };
        let mut code = CodeBuffer::new(0);
        let exit = code.new_label();
        let mut stack = JumpStack::new();
        stack.push(target(TargetKind::Loop, &[], exit, Some(exit)));
        stack.push(JumpScope::Finally(&block));
        stack.push(JumpScope::Protected(Region::new(code.new_label(), 0)));
        stack.push(JumpScope::Finally(&block));

        assert_eq!(stack.finally_depths(1), vec![3, 1]);
        assert_eq!(stack.finally_depths(2), vec![3]);
        assert!(stack.finally_block(1).is_some());
        assert!(stack.finally_block(2).is_none());
        assert!(stack.in_finally_scope());
        assert_eq!(stack.open_regions(0).count(), 1);
    }

    #[test]
    fn regions_from_a_depth() {
        let mut code = CodeBuffer::new(0);
        let (a, b, c) = (code.new_label(), code.new_label(), code.new_label());
        let mut stack = JumpStack::new();
        stack.push(JumpScope::Protected(Region::new(a, 0)));
        stack.push(JumpScope::Protected(Region::new(b, 2)));

        for region in stack.open_regions(1) {
            region.close(c, 6);
        }
        assert_eq!(stack.open_regions(0).count(), 1);
        assert_eq!(stack.closed_regions(0).count(), 1);
        assert_eq!(stack.closed_regions(1).count(), 1);
        assert_eq!(stack.open_regions(5).count(), 0);
        assert_eq!(stack.closed_regions(5).count(), 0);
    }

    #[test]
    fn empty_ranges_are_dropped() {
        let mut code = CodeBuffer::new(0);
        let (a, b, c, d) = (code.new_label(), code.new_label(), code.new_label(), code.new_label());
        let mut region = Region::new(a, 0);
        region.close(b, 0);
        assert!(!region.is_open());
        region.reopen(c, 4);
        region.close(d, 9);
        assert_eq!(region.into_ranges(), vec![(c, d)]);
    }
}
