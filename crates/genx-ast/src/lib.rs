//! # Genx AST
//!
//! Shared data model for the genx pipeline: source spans and the
//! structural description of an import statement.

// =============================================================================
// Core Types
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slice `source` by this span, clamped to the source bounds.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        let end = self.end.min(source.len());
        let start = self.start.min(end);
        &source[start..end]
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod module;

pub use module::*;
