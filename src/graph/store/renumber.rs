//! Vertex insertion and removal at arbitrary indices.
//!
//! Both renumber every stored endpoint in every chunk of both directions,
//! then shift vertex slots one index across the affected chunks. A slot
//! evicted from the end of one chunk is carried into the front of the next.

use num_traits::Zero;
use tracing::debug;

use super::mutation::chunk_or_create;
use super::ChunkedGraph;
use crate::error::{GraphError, Result};
use crate::graph::chunk::{Chunk, ChunkWord, VertexSlot};
use crate::graph::Direction;

const DIRECTIONS: [Direction; 2] = [Direction::Forward, Direction::Backward];

impl<C: Chunk> ChunkedGraph<C> {
    /// Inserts a vertex carrying `data` at index `at`.
    ///
    /// Every vertex index `>= at` moves up by one, and so does every arrow
    /// endpoint referring to it.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] if `at > vertex_count`; capacity and
    /// payload faults. Nothing changes on error.
    pub fn insert_vertex(&mut self, at: usize, data: u32) -> Result<()> {
        if at > self.vertex_count {
            return Err(GraphError::VertexOutOfRange {
                vertex: at,
                vertex_count: self.vertex_count,
            });
        }
        if at == self.vertex_count {
            return self.add_vertex_with_data(data).map(|_| ());
        }
        self.check_vertex_room()?;
        let carry = <C::Word as ChunkWord>::from_payload(data).ok_or(GraphError::PayloadTooWide {
            value: data,
            max: C::max_payload(),
        })?;

        let first = self.chunk_index(at);
        let last = self.chunk_index(self.vertex_count);
        for direction in DIRECTIONS {
            self.check_shift_up(direction, first, last)?;
        }

        debug!(at, vertices = self.vertex_count, "inserting vertex");
        self.renumber_all(|x| if x >= at { x + 1 } else { x });
        self.vertex_count += 1;
        self.fit_lanes();
        for direction in DIRECTIONS {
            self.shift_up(direction, at, first, last, VertexSlot::vacant(carry));
        }
        Ok(())
    }

    /// Removes vertex `v` with all its arrows and returns its payload.
    ///
    /// Every vertex index above `v` moves down by one, and so does every
    /// arrow endpoint referring to it.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`]; capacity faults from slot shifting;
    /// [`GraphError::MirrorMissing`] on a corrupted mirror.
    pub fn remove_vertex(&mut self, v: usize) -> Result<u32> {
        self.check_vertex(v)?;
        let first = self.chunk_index(v);
        let last = self.chunk_index(self.vertex_count - 1);
        for direction in DIRECTIONS {
            self.check_shift_down(direction, v, first, last)?;
        }
        let data = self.vertex_data_unchecked(v);
        for direction in DIRECTIONS {
            let targets: Vec<usize> = self.neighbors_unchecked(direction, v).targets().collect();
            self.check_mirrors(direction, v, &targets)?;
        }

        let removed = self.remove_all(Direction::Forward, v)? + self.remove_all(Direction::Backward, v)?;
        debug!(vertex = v, arrows = removed, vertices = self.vertex_count, "removing vertex");
        self.renumber_all(|x| if x > v { x - 1 } else { x });
        for direction in DIRECTIONS {
            self.shift_down(direction, v, first, last);
        }
        self.vertex_count -= 1;
        self.fit_lanes();
        Ok(data)
    }

    fn renumber_all<F: Fn(usize) -> usize>(&mut self, map: F) {
        for lane in [&mut self.forward, &mut self.backward] {
            for chunk in lane.iter_mut().flatten() {
                chunk.renumber(&map);
            }
        }
    }

    fn exchange_fault(&self, chunk: &C, outgoing: usize, incoming: usize) -> GraphError {
        GraphError::CapacityExceeded {
            what: "chunk siblings",
            limit: <C::Word as ChunkWord>::LIMIT,
            requested: (chunk.used() + incoming).saturating_sub(outgoing),
        }
    }

    /// Every chunk in `first..=last` gives up its last slot and takes the
    /// last slot of its predecessor.
    fn check_shift_up(&self, direction: Direction, first: usize, last: usize) -> Result<()> {
        let shift = self.chunk_shift;
        for index in first..=last {
            let Some(chunk) = self.lane(direction).get(index).and_then(Option::as_ref) else {
                continue;
            };
            let outgoing = self.count_in(direction, ((index + 1) << shift) - 1);
            let incoming = if index == first {
                0
            } else {
                self.count_in(direction, (index << shift) - 1)
            };
            if !chunk.accepts_exchange(outgoing, incoming) {
                return Err(self.exchange_fault(chunk, outgoing, incoming));
            }
        }
        Ok(())
    }

    /// Chunk `first` gives up the slot of `v`, every later chunk its first
    /// slot, and each takes the first slot of its successor.
    fn check_shift_down(&self, direction: Direction, v: usize, first: usize, last: usize) -> Result<()> {
        let shift = self.chunk_shift;
        for index in first..=last {
            let Some(chunk) = self.lane(direction).get(index).and_then(Option::as_ref) else {
                continue;
            };
            let outgoing = self.count_in(direction, if index == first { v } else { index << shift });
            let incoming = if index == last {
                0
            } else {
                self.count_in(direction, (index + 1) << shift)
            };
            if !chunk.accepts_exchange(outgoing, incoming) {
                return Err(self.exchange_fault(chunk, outgoing, incoming));
            }
        }
        Ok(())
    }

    fn shift_up(&mut self, direction: Direction, at: usize, first: usize, last: usize, slot: VertexSlot<C::Word>) {
        let shift = self.chunk_shift;
        let config = self.config;
        let (lane, _) = self.lanes_mut(direction);
        let mut carry = slot;
        for index in first..=last {
            if lane[index].is_none() && carry.is_empty() {
                continue;
            }
            let vertex = if index == first { at } else { index << shift };
            carry = chunk_or_create(lane, index, shift, &config).put_vertex(vertex, carry);
        }
        debug_assert!(carry.is_empty(), "slot evicted past the last vertex");
    }

    fn shift_down(&mut self, direction: Direction, v: usize, first: usize, last: usize) {
        let shift = self.chunk_shift;
        let config = self.config;
        let (lane, _) = self.lanes_mut(direction);
        if let Some(chunk) = lane[first].as_mut() {
            let taken = chunk.take_vertex(v);
            debug_assert!(taken.siblings.is_empty(), "removed vertex kept arrows");
        }
        for index in first + 1..=last {
            let slot = match lane[index].as_mut() {
                Some(chunk) => chunk.take_vertex(index << shift),
                None => VertexSlot::vacant(<C::Word as Zero>::zero()),
            };
            if lane[index - 1].is_none() && slot.is_empty() {
                continue;
            }
            let evicted = chunk_or_create(lane, index - 1, shift, &config).put_vertex((index << shift) - 1, slot);
            debug_assert!(evicted.is_empty(), "overwrote an occupied slot");
        }
    }
}
