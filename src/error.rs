//! Error type shared by every fallible graph operation.

use thiserror::Error;

use crate::graph::Direction;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, GraphError>;

/// Faults reported by the chunked graph store.
///
/// Range and not-found faults are caller errors. [`GraphError::MirrorMissing`]
/// and [`GraphError::InvariantViolation`] mean the storage itself is corrupt;
/// use [`GraphError::is_invariant_violation`] to tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A vertex index outside `[0, vertex_count)`.
    #[error("vertex {vertex} out of range for vertex count {vertex_count}")]
    VertexOutOfRange {
        /// Offending index.
        vertex: usize,
        /// Number of vertices at the time of the call.
        vertex_count: usize,
    },
    /// A sibling position outside `[0, count)` for a vertex's adjacency run.
    #[error("position {position} out of range for vertex {vertex} with {count} siblings")]
    SiblingOutOfRange {
        /// Vertex whose run was indexed.
        vertex: usize,
        /// Offending position.
        position: usize,
        /// Run length.
        count: usize,
    },
    /// The arrow named by the caller does not exist.
    #[error("no arrow {from} -> {to}")]
    ArrowNotFound {
        /// Source vertex.
        from: usize,
        /// Target vertex.
        to: usize,
    },
    /// One direction holds an arrow the other direction does not.
    #[error("{direction:?} run of vertex {vertex} lacks mirror entry for {neighbor}")]
    MirrorMissing {
        /// Direction whose run is missing the entry.
        direction: Direction,
        /// Vertex owning the run.
        vertex: usize,
        /// Neighbor that should have been present.
        neighbor: usize,
    },
    /// Storage corruption other than a missing mirror entry.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// A fixed limit of the storage layout would be exceeded.
    #[error("{what} limit {limit} exceeded (requested {requested})")]
    CapacityExceeded {
        /// Which limit.
        what: &'static str,
        /// The limit itself.
        limit: usize,
        /// The size the call would have produced.
        requested: usize,
    },
    /// A payload does not fit the chunk storage word.
    #[error("payload {value} does not fit storage word (max {max})")]
    PayloadTooWide {
        /// Offending payload.
        value: u32,
        /// Largest representable payload.
        max: u32,
    },
    /// Rejected [`GraphConfig`](crate::GraphConfig).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    /// Returns `true` when the error signals internal corruption rather than misuse.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            GraphError::MirrorMissing { .. } | GraphError::InvariantViolation(_)
        )
    }

    /// Returns `true` for index faults.
    pub fn is_range_fault(&self) -> bool {
        matches!(
            self,
            GraphError::VertexOutOfRange { .. }
                | GraphError::SiblingOutOfRange { .. }
                | GraphError::CapacityExceeded { .. }
                | GraphError::PayloadTooWide { .. }
        )
    }
}
