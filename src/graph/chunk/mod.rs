//! Chunk storage: the unit that owns the adjacency runs of a power-of-two
//! range of vertex indices.
//!
//! Vertical split:
//! - `word`: storage word widths (`u32`, `u16`)
//! - `layout`: pure gap-buffer offset arithmetic
//! - `gap_chunk`: compressed-row chunk with one relocatable gap
//! - `fixed_chunk`: fixed-maximum-arity chunk
//! - `iter`: zero-copy run iteration
//! - `tests`: module tests

use serde::Serialize;

use crate::config::GraphConfig;
use crate::error::Result;

mod fixed_chunk;
mod gap_chunk;
mod iter;
pub mod layout;
mod word;
#[cfg(test)]
mod tests;

pub use fixed_chunk::{FixedChunk, DEFAULT_FIXED_ARITY};
pub use gap_chunk::GapChunk;
pub use iter::NeighborIter;
pub use word::ChunkWord;

/// Outcome of a binary search over a sorted run: `Ok(position)` when the
/// neighbor is present, `Err(insertion_point)` otherwise.
pub type SearchResult = core::result::Result<usize, usize>;

/// The contents of one vertex slot, moved between slots when vertex indices
/// are shifted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexSlot<W> {
    /// Vertex payload.
    pub data: W,
    /// Sorted neighbor indices.
    pub siblings: Vec<W>,
    /// Arrow payloads parallel to `siblings`.
    pub arrows: Vec<W>,
}

impl<W: ChunkWord> VertexSlot<W> {
    /// A slot with no arrows.
    pub fn vacant(data: W) -> Self {
        Self {
            data,
            siblings: Vec::new(),
            arrows: Vec::new(),
        }
    }

    /// Returns `true` when the slot carries neither data nor arrows.
    pub fn is_empty(&self) -> bool {
        self.data.is_zero() && self.siblings.is_empty()
    }
}

/// Occupancy figures of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    /// First global vertex index covered.
    pub base: usize,
    /// Stored siblings.
    pub used: usize,
    /// Backing-array capacity in slots.
    pub capacity: usize,
    /// Unused slots.
    pub free: usize,
    /// Heap bytes held by the chunk's arrays.
    pub heap_bytes: usize,
}

/// Storage for the runs of the vertices `base..base + len`.
///
/// All vertex arguments are *global* indices inside the chunk's range; the
/// owning store guarantees that, so implementations only `debug_assert!` it.
/// Neighbor and payload arguments are validated and reported as errors.
pub trait Chunk {
    /// Storage word of the chunk arrays.
    type Word: ChunkWord;

    /// Creates an empty chunk covering `base..base + config.chunk_size`.
    fn with_base(base: usize, config: &GraphConfig) -> Self
    where
        Self: Sized;

    /// First global vertex index covered.
    fn base(&self) -> usize;

    /// Number of vertex slots.
    fn len(&self) -> usize;

    /// Returns `true` when `vertex` falls in this chunk's range.
    #[inline]
    fn contains(&self, vertex: usize) -> bool {
        vertex >= self.base() && vertex - self.base() < self.len()
    }

    /// Total stored siblings.
    fn used(&self) -> usize;

    /// Run length of `vertex`.
    fn sibling_count(&self, vertex: usize) -> usize;

    /// Zero-copy view of the run of `vertex`.
    fn neighbors(&self, vertex: usize) -> NeighborIter<'_, Self::Word>;

    /// `k`-th neighbor of `vertex`.
    ///
    /// # Errors
    /// [`GraphError::SiblingOutOfRange`](crate::GraphError::SiblingOutOfRange) if `k >= sibling_count(vertex)`.
    fn sibling_at(&self, vertex: usize, k: usize) -> Result<usize>;

    /// Payload of the `k`-th arrow of `vertex`.
    ///
    /// # Errors
    /// [`GraphError::SiblingOutOfRange`](crate::GraphError::SiblingOutOfRange) if `k >= sibling_count(vertex)`.
    fn arrow_at(&self, vertex: usize, k: usize) -> Result<u32>;

    /// Binary search for `neighbor` in the run of `vertex`.
    fn index_of(&self, vertex: usize, neighbor: usize) -> SearchResult;

    /// Checks that inserting `neighbor` with `data` into the run of `vertex` would succeed.
    ///
    /// # Errors
    /// Capacity or payload faults, without touching the chunk.
    fn check_insert(&self, vertex: usize, neighbor: usize, data: u32) -> Result<()>;

    /// Adds `neighbor` to the run of `vertex`.
    ///
    /// Returns `false` if it was already present, after overwriting its
    /// payload when `update_if_present` is set.
    ///
    /// # Errors
    /// Whatever [`check_insert`](Self::check_insert) reports.
    fn try_add_arrow(&mut self, vertex: usize, neighbor: usize, data: u32, update_if_present: bool) -> Result<bool>;

    /// Overwrites the payload of the `k`-th arrow of `vertex`.
    ///
    /// # Errors
    /// Range fault on `k`, or a payload that does not fit.
    fn set_arrow_at(&mut self, vertex: usize, k: usize, data: u32) -> Result<()>;

    /// Removes `neighbor` from the run of `vertex`; `false` if it was absent.
    fn try_remove_arrow(&mut self, vertex: usize, neighbor: usize) -> bool;

    /// Removes the `k`-th arrow of `vertex` and returns the removed neighbor.
    ///
    /// # Errors
    /// [`GraphError::SiblingOutOfRange`](crate::GraphError::SiblingOutOfRange) if `k >= sibling_count(vertex)`.
    fn remove_arrow_at(&mut self, vertex: usize, k: usize) -> Result<usize>;

    /// Drops the whole run of `vertex` in one shift and returns its former length.
    fn remove_all_arrows(&mut self, vertex: usize) -> usize;

    /// Vertex payload.
    fn vertex_data(&self, vertex: usize) -> u32;

    /// Sets the vertex payload.
    ///
    /// # Errors
    /// [`GraphError::PayloadTooWide`](crate::GraphError::PayloadTooWide) for payloads above the storage word.
    fn set_vertex_data(&mut self, vertex: usize, data: u32) -> Result<()>;

    /// Largest payload the storage word can hold.
    fn max_payload() -> u32
    where
        Self: Sized;

    /// Largest number of vertices a store of these chunks can index.
    fn max_vertices() -> usize
    where
        Self: Sized;

    /// Rewrites every stored neighbor index through `map`.
    ///
    /// `map` must be strictly monotone over the stored values so runs stay
    /// sorted, and must not produce an index above [`max_vertices`](Self::max_vertices).
    fn renumber<F: FnMut(usize) -> usize>(&mut self, map: F)
    where
        Self: Sized;

    /// Whether the chunk can take one slot of `incoming` siblings in exchange
    /// for one of `outgoing`.
    fn accepts_exchange(&self, outgoing: usize, incoming: usize) -> bool;

    /// Removes the slot of `vertex`, shifting every later slot one index
    /// down; the last slot becomes vacant.
    fn take_vertex(&mut self, vertex: usize) -> VertexSlot<Self::Word>;

    /// Inserts `slot` at `vertex`, shifting every later slot one index up,
    /// and returns the slot evicted from the end of the chunk.
    ///
    /// The caller checks [`accepts_exchange`](Self::accepts_exchange) first.
    fn put_vertex(&mut self, vertex: usize, slot: VertexSlot<Self::Word>) -> VertexSlot<Self::Word>;

    /// Occupancy figures.
    fn stats(&self) -> ChunkStats;

    /// Verifies the chunk's internal bookkeeping.
    ///
    /// # Errors
    /// [`GraphError::InvariantViolation`](crate::GraphError::InvariantViolation) describing the first defect found.
    fn check_layout(&self) -> Result<()>;
}
