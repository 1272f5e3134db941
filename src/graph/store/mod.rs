//! The chunked store: forward and backward chunk arrays kept in lock-step.
//!
//! Vertical split:
//! - `mod`: layout, chunk lookup and read queries
//! - `mutation`: vertex and arrow mutation
//! - `renumber`: vertex insertion/removal at arbitrary indices
//! - `stats`: occupancy figures and invariant checking
//! - `tests`: module tests
//!
//! Vertex `v` lives in chunk `v >> chunk_shift` of both arrays. Chunks are
//! created on the first mutation touching their range; reads of an absent
//! chunk see vacant slots.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `next`, `prev`, counts | \(O(1)\) | Direct chunk lookup |
//! | `find_index_of_next` | \(O(\log d)\) | Binary search over the run |
//! | `add_arrow`, `remove_next` | \(O(L + d)\) | Two gapped mutations, `L` = chunk size |
//! | `remove_all_next` | \(O(d \cdot L)\) | Mirrors removed one by one, run cleared in bulk |
//! | `insert_vertex`, `remove_vertex` | \(O(n + m)\) | Renumbers every chunk |
//! | `clear` | \(O(\text{chunks})\) | Drops the chunk arrays |

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

use super::chunk::{Chunk, FixedChunk, GapChunk, NeighborIter, SearchResult};
use super::index::{IndexGraph, IndexGraphMut};
use super::Direction;

mod mutation;
mod renumber;
mod stats;

pub use stats::GraphStats;

/// A mutable directed graph over dense vertex indices with mirrored
/// forward/backward adjacency.
///
/// `C` selects the chunk representation; the default stores 32-bit words in
/// gap-buffered chunks.
///
/// ```
/// use chunkgraph::ChunkedGraph;
///
/// let mut graph: ChunkedGraph = ChunkedGraph::new();
/// let a = graph.add_vertex()?;
/// let b = graph.add_vertex()?;
/// assert!(graph.add_arrow(a, b, 7)?);
/// assert_eq!(graph.next(a, 0)?, b);
/// assert_eq!(graph.prev_arrow(b, 0)?, 7);
/// # Ok::<(), chunkgraph::GraphError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedGraph<C = GapChunk<u32>> {
    config: GraphConfig,
    chunk_shift: u32,
    forward: Vec<Option<C>>,
    backward: Vec<Option<C>>,
    vertex_count: usize,
    arrow_count: usize,
}

/// 16-bit store for graphs below 65535 vertices and payloads.
pub type CompactChunkedGraph = ChunkedGraph<GapChunk<u16>>;

/// Store whose vertices each hold at most `max_arity` arrows per direction.
pub type FixedArityGraph = ChunkedGraph<FixedChunk<u32>>;

impl<C: Chunk> Default for ChunkedGraph<C> {
    fn default() -> Self {
        Self::from_valid_config(GraphConfig::default())
    }
}

impl<C: Chunk> ChunkedGraph<C> {
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store.
    ///
    /// # Errors
    /// [`GraphError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(config: GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: GraphConfig) -> Self {
        let chunk_shift = config.chunk_shift();
        let slots = config.reserve_vertices.div_ceil(config.chunk_size);
        Self {
            config,
            chunk_shift,
            forward: Vec::with_capacity(slots),
            backward: Vec::with_capacity(slots),
            vertex_count: 0,
            arrow_count: 0,
        }
    }

    /// The configuration the store was built with.
    #[inline]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Vertex slots per chunk.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Number of vertices.
    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of arrows.
    #[inline(always)]
    pub fn arrow_count(&self) -> usize {
        self.arrow_count
    }

    /// Returns `true` when the store holds no vertex.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    #[inline(always)]
    fn chunk_index(&self, v: usize) -> usize {
        v >> self.chunk_shift
    }

    #[inline]
    fn lane(&self, direction: Direction) -> &[Option<C>] {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    /// `(lane of direction, mirror lane)`.
    #[inline]
    fn lanes_mut(&mut self, direction: Direction) -> (&mut Vec<Option<C>>, &mut Vec<Option<C>>) {
        match direction {
            Direction::Forward => (&mut self.forward, &mut self.backward),
            Direction::Backward => (&mut self.backward, &mut self.forward),
        }
    }

    #[inline]
    fn chunk(&self, direction: Direction, v: usize) -> Option<&C> {
        self.lane(direction).get(self.chunk_index(v)).and_then(Option::as_ref)
    }

    /// Resizes both lanes to cover `vertex_count` vertices.
    fn fit_lanes(&mut self) {
        let slots = self.vertex_count.div_ceil(self.config.chunk_size);
        for lane in [&mut self.forward, &mut self.backward] {
            if lane.len() < slots {
                lane.resize_with(slots, || None);
            } else {
                lane.truncate(slots);
            }
        }
    }

    #[inline]
    pub(crate) fn check_vertex(&self, v: usize) -> Result<()> {
        if v < self.vertex_count {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex: v,
                vertex_count: self.vertex_count,
            })
        }
    }

    /// Run length of `v` without bounds checks against `vertex_count`.
    #[inline]
    fn count_in(&self, direction: Direction, v: usize) -> usize {
        self.chunk(direction, v).map_or(0, |c| c.sibling_count(v))
    }

    #[inline]
    pub(crate) fn neighbors_unchecked(&self, direction: Direction, v: usize) -> NeighborIter<'_, C::Word> {
        self.chunk(direction, v).map_or_else(NeighborIter::empty, |c| c.neighbors(v))
    }

    #[inline]
    pub(crate) fn vertex_data_unchecked(&self, v: usize) -> u32 {
        self.chunk(Direction::Forward, v).map_or(0, |c| c.vertex_data(v))
    }

    /// Run length of `v` in `direction`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    pub fn degree(&self, direction: Direction, v: usize) -> Result<usize> {
        self.check_vertex(v)?;
        Ok(self.count_in(direction, v))
    }

    /// `i`-th neighbor of `v` in `direction`.
    ///
    /// # Errors
    /// Range fault on `v` or `i`.
    pub fn neighbor(&self, direction: Direction, v: usize, i: usize) -> Result<usize> {
        self.check_vertex(v)?;
        match self.chunk(direction, v) {
            Some(c) => c.sibling_at(v, i),
            None => Err(GraphError::SiblingOutOfRange {
                vertex: v,
                position: i,
                count: 0,
            }),
        }
    }

    /// Payload of the `i`-th arrow of `v` in `direction`.
    ///
    /// # Errors
    /// Range fault on `v` or `i`.
    pub fn neighbor_arrow(&self, direction: Direction, v: usize, i: usize) -> Result<u32> {
        self.check_vertex(v)?;
        match self.chunk(direction, v) {
            Some(c) => c.arrow_at(v, i),
            None => Err(GraphError::SiblingOutOfRange {
                vertex: v,
                position: i,
                count: 0,
            }),
        }
    }

    /// Zero-copy `(neighbor, payload)` iterator over the run of `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    pub fn neighbors(&self, direction: Direction, v: usize) -> Result<NeighborIter<'_, C::Word>> {
        self.check_vertex(v)?;
        Ok(self.neighbors_unchecked(direction, v))
    }

    /// Binary search for `u` in the run of `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    pub fn find_index(&self, direction: Direction, v: usize, u: usize) -> Result<SearchResult> {
        self.check_vertex(v)?;
        Ok(self.chunk(direction, v).map_or(Err(0), |c| c.index_of(v, u)))
    }

    /// Out-degree of `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    #[inline]
    pub fn next_count(&self, v: usize) -> Result<usize> {
        self.degree(Direction::Forward, v)
    }

    /// `i`-th successor of `v`.
    ///
    /// # Errors
    /// Range fault on `v` or `i`.
    #[inline]
    pub fn next(&self, v: usize, i: usize) -> Result<usize> {
        self.neighbor(Direction::Forward, v, i)
    }

    /// Payload of the `i`-th outgoing arrow of `v`.
    ///
    /// # Errors
    /// Range fault on `v` or `i`.
    #[inline]
    pub fn next_arrow(&self, v: usize, i: usize) -> Result<u32> {
        self.neighbor_arrow(Direction::Forward, v, i)
    }

    /// In-degree of `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    #[inline]
    pub fn prev_count(&self, v: usize) -> Result<usize> {
        self.degree(Direction::Backward, v)
    }

    /// `i`-th predecessor of `v`.
    ///
    /// # Errors
    /// Range fault on `v` or `i`.
    #[inline]
    pub fn prev(&self, v: usize, i: usize) -> Result<usize> {
        self.neighbor(Direction::Backward, v, i)
    }

    /// Payload of the `i`-th incoming arrow of `v`.
    ///
    /// # Errors
    /// Range fault on `v` or `i`.
    #[inline]
    pub fn prev_arrow(&self, v: usize, i: usize) -> Result<u32> {
        self.neighbor_arrow(Direction::Backward, v, i)
    }

    /// Position of `u` among the successors of `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    #[inline]
    pub fn find_index_of_next(&self, v: usize, u: usize) -> Result<SearchResult> {
        self.find_index(Direction::Forward, v, u)
    }

    /// Position of `u` among the predecessors of `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    #[inline]
    pub fn find_index_of_prev(&self, v: usize, u: usize) -> Result<SearchResult> {
        self.find_index(Direction::Backward, v, u)
    }

    /// Successors of `v` with arrow payloads.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    #[inline]
    pub fn next_iter(&self, v: usize) -> Result<NeighborIter<'_, C::Word>> {
        self.neighbors(Direction::Forward, v)
    }

    /// Predecessors of `v` with arrow payloads.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    #[inline]
    pub fn prev_iter(&self, v: usize) -> Result<NeighborIter<'_, C::Word>> {
        self.neighbors(Direction::Backward, v)
    }

    /// Payload of vertex `v`.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid `v`.
    pub fn vertex_data(&self, v: usize) -> Result<u32> {
        self.check_vertex(v)?;
        Ok(self.vertex_data_unchecked(v))
    }

    /// Payload of `v -> u`, `None` if there is no such arrow.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid endpoint.
    pub fn arrow_data(&self, v: usize, u: usize) -> Result<Option<u32>> {
        self.check_vertex(u)?;
        match self.find_index_of_next(v, u)? {
            Ok(i) => self.next_arrow(v, i).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Whether `v -> u` exists.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] for an invalid endpoint.
    pub fn contains_arrow(&self, v: usize, u: usize) -> Result<bool> {
        Ok(self.arrow_data(v, u)?.is_some())
    }

    /// Every arrow as `(source, target, payload)`, by source then target.
    pub fn arrows(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        (0..self.vertex_count).flat_map(move |v| {
            self.neighbors_unchecked(Direction::Forward, v)
                .map(move |(u, data)| (v, u, data))
        })
    }
}

impl<C: Chunk> IndexGraph for ChunkedGraph<C> {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn arrow_count(&self) -> usize {
        self.arrow_count
    }

    fn next_count(&self, v: usize) -> Result<usize> {
        ChunkedGraph::next_count(self, v)
    }

    fn next(&self, v: usize, i: usize) -> Result<usize> {
        ChunkedGraph::next(self, v, i)
    }

    fn next_arrow(&self, v: usize, i: usize) -> Result<u32> {
        ChunkedGraph::next_arrow(self, v, i)
    }

    fn prev_count(&self, v: usize) -> Result<usize> {
        ChunkedGraph::prev_count(self, v)
    }

    fn prev(&self, v: usize, i: usize) -> Result<usize> {
        ChunkedGraph::prev(self, v, i)
    }

    fn prev_arrow(&self, v: usize, i: usize) -> Result<u32> {
        ChunkedGraph::prev_arrow(self, v, i)
    }

    fn find_index_of_next(&self, v: usize, u: usize) -> Result<SearchResult> {
        ChunkedGraph::find_index_of_next(self, v, u)
    }

    fn vertex_data(&self, v: usize) -> Result<u32> {
        ChunkedGraph::vertex_data(self, v)
    }
}

impl<C: Chunk> IndexGraphMut for ChunkedGraph<C> {
    fn add_vertex(&mut self) -> Result<usize> {
        ChunkedGraph::add_vertex(self)
    }

    fn add_arrow(&mut self, v: usize, u: usize, data: u32) -> Result<bool> {
        ChunkedGraph::add_arrow(self, v, u, data)
    }

    fn remove_next(&mut self, v: usize, i: usize) -> Result<usize> {
        ChunkedGraph::remove_next(self, v, i)
    }

    fn remove_vertex(&mut self, v: usize) -> Result<u32> {
        ChunkedGraph::remove_vertex(self, v)
    }
}
