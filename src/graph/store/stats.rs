//! Occupancy figures and full-store invariant checking.

use serde::Serialize;

use super::ChunkedGraph;
use crate::error::{GraphError, Result};
use crate::graph::chunk::{Chunk, ChunkStats};
use crate::graph::Direction;

/// Store-wide occupancy figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GraphStats {
    /// Vertex slots per chunk.
    pub chunk_size: usize,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of arrows.
    pub arrow_count: usize,
    /// Chunk slots per direction.
    pub chunk_slots: usize,
    /// Materialized forward chunks.
    pub forward_chunks: usize,
    /// Materialized backward chunks.
    pub backward_chunks: usize,
    /// Sibling capacity summed over both directions.
    pub sibling_capacity: usize,
    /// Unused sibling slots summed over both directions.
    pub free_slots: usize,
    /// Approximate heap bytes held by chunk arrays.
    pub heap_bytes: usize,
}

impl GraphStats {
    /// Fraction of sibling capacity in use; `0.0` for an empty store.
    pub fn occupancy(&self) -> f64 {
        if self.sibling_capacity == 0 {
            0.0
        } else {
            (self.sibling_capacity - self.free_slots) as f64 / self.sibling_capacity as f64
        }
    }
}

impl<C: Chunk> ChunkedGraph<C> {
    /// Occupancy figures over every materialized chunk.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            chunk_size: self.config.chunk_size,
            vertex_count: self.vertex_count,
            arrow_count: self.arrow_count,
            chunk_slots: self.forward.len(),
            forward_chunks: self.forward.iter().flatten().count(),
            backward_chunks: self.backward.iter().flatten().count(),
            ..GraphStats::default()
        };
        for chunk in self.forward.iter().chain(&self.backward).flatten() {
            let chunk = chunk.stats();
            stats.sibling_capacity += chunk.capacity;
            stats.free_slots += chunk.free;
            stats.heap_bytes += chunk.heap_bytes;
        }
        stats
    }

    /// Per-chunk figures of one direction, in index order.
    pub fn chunk_stats(&self, direction: Direction) -> Vec<ChunkStats> {
        self.lane(direction).iter().flatten().map(Chunk::stats).collect()
    }

    /// Walks the whole store and verifies its bookkeeping: chunk layouts,
    /// sorted runs, mirror agreement, payload agreement and the arrow count.
    ///
    /// # Errors
    /// [`GraphError::MirrorMissing`] for a one-sided arrow;
    /// [`GraphError::InvariantViolation`] for any other defect.
    pub fn check_invariants(&self) -> Result<()> {
        for direction in [Direction::Forward, Direction::Backward] {
            for (index, chunk) in self.lane(direction).iter().enumerate() {
                let Some(chunk) = chunk else { continue };
                chunk.check_layout()?;
                if chunk.base() != index << self.chunk_shift {
                    return Err(GraphError::InvariantViolation(format!(
                        "{direction:?} chunk {index} has base {}",
                        chunk.base()
                    )));
                }
            }
        }

        for v in 0..self.vertex_count {
            let forward = self.chunk(Direction::Forward, v).map_or(0, |c| c.vertex_data(v));
            let backward = self.chunk(Direction::Backward, v).map_or(0, |c| c.vertex_data(v));
            if forward != backward {
                return Err(GraphError::InvariantViolation(format!(
                    "vertex {v} payload {forward} forward, {backward} backward"
                )));
            }
        }

        for direction in [Direction::Forward, Direction::Backward] {
            let mirror = direction.reverse();
            let mut total = 0;
            for v in 0..self.vertex_count {
                for (u, data) in self.neighbors_unchecked(direction, v) {
                    total += 1;
                    if u >= self.vertex_count {
                        return Err(GraphError::InvariantViolation(format!(
                            "{direction:?} run of {v} names vertex {u} of {}",
                            self.vertex_count
                        )));
                    }
                    match self.find_index(mirror, u, v)? {
                        Ok(j) => {
                            let mirrored = self.neighbor_arrow(mirror, u, j)?;
                            if mirrored != data {
                                return Err(GraphError::InvariantViolation(format!(
                                    "arrow between {v} and {u} carries {data} and {mirrored}"
                                )));
                            }
                        }
                        Err(_) => return Err(self.mirror_missing(mirror, u, v)),
                    }
                }
            }
            if total != self.arrow_count {
                return Err(GraphError::InvariantViolation(format!(
                    "{direction:?} runs hold {total} arrows, counter says {}",
                    self.arrow_count
                )));
            }
        }
        Ok(())
    }
}
