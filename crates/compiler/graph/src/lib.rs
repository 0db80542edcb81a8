//! # Basalt Flow-Graph Analyses
//!
//! This crate hosts the flow-graph analyses used by the Basalt compiler
//! backend. The central piece is the dominator analysis: given an entry
//! vertex and a way to enumerate successors, it computes DFS numbering,
//! immediate dominators and the dominator tree for the reachable part of
//! an arbitrary directed control-flow graph.
//!
//! ## Design Principles
//!
//! 1. **Index space**: all internal tables are dense vectors keyed by the
//!    DFS preorder index of a vertex. Downstream passes keep working in
//!    index space; mapping back to vertex identity is a lookup away.
//! 2. **Graph agnosticism**: the engine never owns the graph. It is
//!    parameterized by a vertex type and a [`Successors`] capability, so
//!    it works for basic blocks, byte offsets, or test fixtures alike.
//! 3. **Immutability after construction**: once computed, the engine only
//!    hands out read views. A constructed [`Dominators`] can be shared
//!    freely across threads.

pub mod dominators;

pub use dominators::{Dominators, Successors};

index_vec::define_index_type! {
    /// Preorder number assigned to a vertex by the depth-first walk from
    /// the entry. Index 0 is always the entry vertex, and indices are
    /// dense in `[0, n)` for the `n` reachable vertices.
    pub struct DfsIndex = usize;
}

/// Represents an error in a flow-graph query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DominatorError {
    /// The queried vertex was never reached by the DFS from the entry
    #[error("vertex was never reached from the entry")]
    VertexNotFound,

    /// An internal table violated an engine invariant. This indicates a
    /// bug in the engine itself, not in the caller.
    #[error("dominator engine invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for flow-graph queries
pub type GraphResult<T> = Result<T, DominatorError>;
