//! # `chunkgraph` - Chunked Bidirectional Graph Store
//!
//! A mutable directed graph addressed purely by dense integer vertex indices,
//! with one integer payload per vertex and one per arrow, and fast adjacency
//! queries in both directions.
//!
//! ## Key Features
//!
//! - **Compressed-row chunks**: vertex ranges of a power-of-two size share one
//!   flat siblings array and one flat payload array
//! - **Gap buffers**: a single relocatable gap per chunk keeps insertion
//!   amortized local to the run being edited
//! - **Mirrored adjacency**: every arrow is stored forward and backward, kept
//!   in lock-step by every mutation
//! - **Lazy traversals**: breadth- and depth-first `Iterator`s that read the
//!   chunk arrays without copying
//!
//! ## Architecture
//!
//! Organized bottom-up:
//! 1. **Chunks** (`GapChunk<W>`, `FixedChunk<W>`) own the runs of one vertex
//!    range, generic over the storage word `W` (`u32` or `u16`).
//! 2. **The store** (`ChunkedGraph<C>`) owns a forward and a backward array
//!    of chunks indexed by `vertex >> chunk_shift`, created on first touch.
//! 3. **Traversals** (`Traversal`, `WithData`) walk either array through a
//!    pluggable [`VisitedSet`].
//! 4. **Index traits** (`IndexGraph`, `IndexGraphMut`) are the minimal
//!    contract algorithms layered on top depend on.
//!
//! ## Usage
//!
//! ```
//! use chunkgraph::{ChunkedGraph, Direction};
//!
//! let mut graph: ChunkedGraph = ChunkedGraph::new();
//! graph.add_vertices(5)?;
//! for (v, u) in [(0, 1), (0, 3), (1, 2), (1, 4), (4, 3)] {
//!     graph.add_arrow(v, u, 0)?;
//! }
//! assert_eq!(graph.bfs(0)?.collect::<Vec<_>>(), vec![0, 1, 3, 2, 4]);
//!
//! let i = graph.find_index_of_next(0, 3)?.unwrap();
//! graph.remove_next(0, i)?;
//! assert_eq!(graph.arrow_count(), 4);
//! assert_eq!(graph.degree(Direction::Backward, 3)?, 1);
//! # Ok::<(), chunkgraph::GraphError>(())
//! ```
//!
//! Mutation takes `&mut self` and traversal borrows `&self`, so a store can
//! never change underneath a live traversal.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod config;
mod error;
pub mod graph;

pub use config::{GraphConfig, DEFAULT_CHUNK_SIZE, DEFAULT_INITIAL_SIBLING_CAPACITY, MAX_CHUNK_SIZE};
pub use error::{GraphError, Result};
pub use graph::{
    Chunk,
    ChunkStats,
    ChunkWord,
    ChunkedGraph,
    CompactChunkedGraph,
    DenseVisited,
    Direction,
    FixedArityGraph,
    FixedChunk,
    GapChunk,
    GraphStats,
    IndexGraph,
    IndexGraphMut,
    NeighborIter,
    Order,
    SearchResult,
    Traversal,
    VisitedSet,
    WithData,
};

// Compile-time assertions for memory layout claims
const _: () = {
    use core::mem;

    // An absent chunk costs no more than a present one: `Option` uses the
    // `Vec` niche.
    assert!(mem::size_of::<Option<GapChunk<u32>>>() == mem::size_of::<GapChunk<u32>>());
    assert!(mem::size_of::<Option<FixedChunk<u16>>>() == mem::size_of::<FixedChunk<u16>>());

    assert!(mem::size_of::<Direction>() == 1);
};
