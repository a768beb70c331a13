//! Local scope management for body resolution.
//!
//! [`LocalScope`] maps the names of locals visible at the current point of
//! a body to their [`LocalId`]s and hands out local variable slots:
//! - Nested block scopes (blocks, `for` headers, catch clauses)
//! - Slot reuse once a block's locals go out of scope
//! - Frame size tracking for `max_locals`
//!
//! Java forbids a local from redeclaring any local that is still in
//! scope, so there is no shadowing to restore.

use javelin_core::{CompilationError, Span};
use rustc_hash::FxHashMap;

use crate::resolve::facts::LocalId;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ScopedLocal {
    id: LocalId,
    /// Scope depth where declared
    depth: u32,
}

// ============================================================================
// LocalScope
// ============================================================================

/// Locals of the body being resolved.
#[derive(Debug)]
pub struct LocalScope {
    variables: FxHashMap<String, ScopedLocal>,

    /// Current scope depth (0 = body scope)
    depth: u32,

    /// `next_slot` at each enclosing `push_scope`
    saved_slots: Vec<u16>,

    next_slot: u16,

    /// Highest slot count reached
    max_slot: u16,
}

impl LocalScope {
    /// Create a scope whose first free slot is `first_slot`: 0 for static
    /// bodies, 1 for instance bodies where slot 0 holds `this`.
    pub fn new(first_slot: u16) -> Self {
        Self {
            variables: FxHashMap::default(),
            depth: 0,
            saved_slots: Vec::new(),
            next_slot: first_slot,
            max_slot: first_slot,
        }
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    pub fn push_scope(&mut self) {
        self.depth += 1;
        self.saved_slots.push(self.next_slot);
    }

    /// Exit the current scope. Its locals become invisible and their slots
    /// free for reuse.
    pub fn pop_scope(&mut self) {
        let depth = self.depth;
        self.variables.retain(|_, var| var.depth < depth);
        if let Some(slot) = self.saved_slots.pop() {
            self.next_slot = slot;
        }
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    // ==========================================================================
    // Declaration and Lookup
    // ==========================================================================

    /// Declare a local occupying `slots` slots (2 for `long` and `double`).
    ///
    /// Returns its first slot, or an error if a local of the same name is
    /// still visible.
    pub fn declare(
        &mut self,
        name: &str,
        id: LocalId,
        slots: u16,
        span: Span,
    ) -> Result<u16, CompilationError> {
        if self.variables.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }
        let slot = self.allocate(slots, span)?;
        self.variables.insert(
            name.to_string(),
            ScopedLocal {
                id,
                depth: self.depth,
            },
        );
        Ok(slot)
    }

    /// Reserve slots for a local that has no name.
    pub fn allocate(&mut self, slots: u16, span: Span) -> Result<u16, CompilationError> {
        let slot = self.next_slot;
        self.next_slot = slot
            .checked_add(slots)
            .ok_or_else(|| CompilationError::CodeTooLarge {
                what: "number of local variable slots".to_string(),
                limit: u16::MAX as u32,
                span,
            })?;
        self.max_slot = self.max_slot.max(self.next_slot);
        Ok(slot)
    }

    pub fn lookup(&self, name: &str) -> Option<LocalId> {
        self.variables.get(name).map(|var| var.id)
    }

    /// Slots needed by every local declared so far.
    pub fn frame_size(&self) -> u16 {
        self.max_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_lookup() {
        let mut scope = LocalScope::new(1);
        let slot = scope.declare("x", LocalId(0), 1, Span::default()).unwrap();
        assert_eq!(slot, 1);
        assert_eq!(scope.lookup("x"), Some(LocalId(0)));
        assert_eq!(scope.lookup("y"), None);
    }

    #[test]
    fn wide_locals_take_two_slots() {
        let mut scope = LocalScope::new(0);
        assert_eq!(scope.declare("l", LocalId(0), 2, Span::default()).unwrap(), 0);
        assert_eq!(scope.declare("i", LocalId(1), 1, Span::default()).unwrap(), 2);
        assert_eq!(scope.frame_size(), 3);
    }

    #[test]
    fn redeclaring_a_visible_local_fails() {
        let mut scope = LocalScope::new(0);
        scope.declare("x", LocalId(0), 1, Span::default()).unwrap();
        scope.push_scope();
        let err = scope.declare("x", LocalId(1), 1, Span::default()).unwrap_err();
        assert!(matches!(err, CompilationError::DuplicateDefinition { .. }));
    }

    #[test]
    fn popped_scopes_release_names_and_slots() {
        let mut scope = LocalScope::new(0);
        scope.push_scope();
        scope.declare("a", LocalId(0), 2, Span::default()).unwrap();
        assert_eq!(scope.depth(), 1);
        scope.pop_scope();
        assert_eq!(scope.depth(), 0);
        assert_eq!(scope.lookup("a"), None);

        let slot = scope.declare("a", LocalId(1), 1, Span::default()).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(scope.frame_size(), 2);
    }
}
