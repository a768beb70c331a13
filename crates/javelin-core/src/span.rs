//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, AST nodes and diagnostics occur
//! in source code.

use std::cmp::Ordering;
use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Spans are ordered by their starting line and column, which lets callers
/// compare "how far" two tokens are into the input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into one that starts at the earlier span and covers both.
    ///
    /// Spans on different lines keep the first position and approximate the
    /// length by summing.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (first, second) = if self <= other { (self, other) } else { (other, self) };
        if first.line == second.line {
            let end = (second.col + second.len).max(first.col + first.len);
            Span::new(first.line, first.col, end - first.col)
        } else {
            Span::new(first.line, first.col, first.len + second.len)
        }
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.col, self.len).cmp(&(other.line, other.col, other.len))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
