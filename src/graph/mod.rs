//! Index-addressed bidirectional graph storage.
//!
//! Organized bottom-up:
//! - `chunk`: gap-buffered adjacency storage for one range of vertex indices
//! - `store`: the chunked store keeping forward and backward chunks in lock-step
//! - `traversal`: lazy breadth-/depth-first enumerators over the chunk arrays
//! - `index`: the index-only read/write contract algorithms build on

pub mod chunk;
pub mod index;
pub mod store;
pub mod traversal;

pub use chunk::{Chunk, ChunkStats, ChunkWord, FixedChunk, GapChunk, NeighborIter, SearchResult};
pub use index::{IndexGraph, IndexGraphMut};
pub use store::{ChunkedGraph, CompactChunkedGraph, FixedArityGraph, GraphStats};
pub use traversal::{DenseVisited, Order, Traversal, VisitedSet, WithData};

/// Which adjacency a query or traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Source to target ("next").
    Forward,
    /// Target to source ("prev").
    Backward,
}

impl Direction {
    /// The other direction.
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}
