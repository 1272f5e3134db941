//! Fixed-maximum-arity chunk.
//!
//! Every vertex slot owns `arity` sibling positions up front, so no run ever
//! moves another. Exceeding the arity is a capacity fault instead of a grow.

use core::mem::size_of;
use core::ops::Range;

use tracing::trace;

use super::iter::NeighborIter;
use super::word::ChunkWord;
use super::{Chunk, ChunkStats, SearchResult, VertexSlot};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

/// Arity used when the configuration does not set `max_arity`.
pub const DEFAULT_FIXED_ARITY: usize = 8;

/// Chunk with `arity` preallocated sibling slots per vertex.
#[derive(Debug, Clone)]
pub struct FixedChunk<W> {
    base: usize,
    arity: usize,
    data: Vec<W>,
    counts: Vec<W>,
    siblings: Vec<W>,
    arrows: Vec<W>,
}

impl<W: ChunkWord> FixedChunk<W> {
    #[inline(always)]
    fn local(&self, vertex: usize) -> usize {
        debug_assert!(self.contains(vertex), "vertex {vertex} outside chunk at {}", self.base);
        vertex - self.base
    }

    /// Per-vertex sibling capacity.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline(always)]
    fn run(&self, local: usize) -> Range<usize> {
        let start = local * self.arity;
        start..start + self.counts[local].widen()
    }

    fn check_payload(data: u32) -> Result<W> {
        W::from_payload(data).ok_or(GraphError::PayloadTooWide {
            value: data,
            max: Self::max_payload(),
        })
    }

    fn check_position(&self, vertex: usize, k: usize) -> Result<usize> {
        let count = self.sibling_count(vertex);
        if k < count {
            Ok(self.run(self.local(vertex)).start + k)
        } else {
            Err(GraphError::SiblingOutOfRange {
                vertex,
                position: k,
                count,
            })
        }
    }

    fn read_slot(&self, local: usize) -> VertexSlot<W> {
        let run = self.run(local);
        VertexSlot {
            data: self.data[local],
            siblings: self.siblings[run.clone()].to_vec(),
            arrows: self.arrows[run].to_vec(),
        }
    }

    fn write_slot(&mut self, local: usize, slot: &VertexSlot<W>) {
        let start = local * self.arity;
        let len = slot.siblings.len();
        debug_assert!(len <= self.arity);
        self.siblings[start..start + len].copy_from_slice(&slot.siblings);
        self.arrows[start..start + len].copy_from_slice(&slot.arrows);
        self.counts[local] = W::narrow(len).unwrap_or_else(W::zero);
        self.data[local] = slot.data;
    }
}

impl<W: ChunkWord> Chunk for FixedChunk<W> {
    type Word = W;

    fn with_base(base: usize, config: &GraphConfig) -> Self {
        let len = config.chunk_size.max(1);
        let arity = config.max_arity.unwrap_or(DEFAULT_FIXED_ARITY).min(W::LIMIT);
        trace!(base, len, arity, "created fixed-arity chunk");
        Self {
            base,
            arity,
            data: vec![W::zero(); len],
            counts: vec![W::zero(); len],
            siblings: vec![W::zero(); len * arity],
            arrows: vec![W::zero(); len * arity],
        }
    }

    #[inline]
    fn base(&self) -> usize {
        self.base
    }

    #[inline]
    fn len(&self) -> usize {
        self.counts.len()
    }

    fn used(&self) -> usize {
        self.counts.iter().map(|c| c.widen()).sum()
    }

    #[inline]
    fn sibling_count(&self, vertex: usize) -> usize {
        self.counts[self.local(vertex)].widen()
    }

    #[inline]
    fn neighbors(&self, vertex: usize) -> NeighborIter<'_, W> {
        let run = self.run(self.local(vertex));
        NeighborIter::new(&self.siblings[run.clone()], &self.arrows[run])
    }

    fn sibling_at(&self, vertex: usize, k: usize) -> Result<usize> {
        let pos = self.check_position(vertex, k)?;
        Ok(self.siblings[pos].widen())
    }

    fn arrow_at(&self, vertex: usize, k: usize) -> Result<u32> {
        let pos = self.check_position(vertex, k)?;
        Ok(self.arrows[pos].payload())
    }

    fn index_of(&self, vertex: usize, neighbor: usize) -> SearchResult {
        let run = self.run(self.local(vertex));
        let siblings = &self.siblings[run];
        match W::narrow(neighbor) {
            Some(target) => siblings.binary_search(&target),
            None => Err(siblings.len()),
        }
    }

    fn check_insert(&self, vertex: usize, neighbor: usize, data: u32) -> Result<()> {
        if neighbor >= Self::max_vertices() {
            return Err(GraphError::CapacityExceeded {
                what: "vertex index",
                limit: Self::max_vertices(),
                requested: neighbor + 1,
            });
        }
        Self::check_payload(data)?;
        let count = self.sibling_count(vertex);
        if count >= self.arity {
            return Err(GraphError::CapacityExceeded {
                what: "arity",
                limit: self.arity,
                requested: count + 1,
            });
        }
        Ok(())
    }

    fn try_add_arrow(&mut self, vertex: usize, neighbor: usize, data: u32, update_if_present: bool) -> Result<bool> {
        match self.index_of(vertex, neighbor) {
            Ok(k) => {
                if update_if_present {
                    self.set_arrow_at(vertex, k, data)?;
                }
                Ok(false)
            }
            Err(k) => {
                self.check_insert(vertex, neighbor, data)?;
                let arrow = Self::check_payload(data)?;
                let local = self.local(vertex);
                let run = self.run(local);
                let pos = run.start + k;
                self.siblings.copy_within(pos..run.end, pos + 1);
                self.arrows.copy_within(pos..run.end, pos + 1);
                self.siblings[pos] = W::narrow(neighbor).unwrap_or_else(W::max_value);
                self.arrows[pos] = arrow;
                self.counts[local] = self.counts[local] + W::one();
                Ok(true)
            }
        }
    }

    fn set_arrow_at(&mut self, vertex: usize, k: usize, data: u32) -> Result<()> {
        let pos = self.check_position(vertex, k)?;
        self.arrows[pos] = Self::check_payload(data)?;
        Ok(())
    }

    fn try_remove_arrow(&mut self, vertex: usize, neighbor: usize) -> bool {
        match self.index_of(vertex, neighbor) {
            Ok(k) => self.remove_arrow_at(vertex, k).is_ok(),
            Err(_) => false,
        }
    }

    fn remove_arrow_at(&mut self, vertex: usize, k: usize) -> Result<usize> {
        let pos = self.check_position(vertex, k)?;
        let local = self.local(vertex);
        let end = self.run(local).end;
        let removed = self.siblings[pos].widen();
        self.siblings.copy_within(pos + 1..end, pos);
        self.arrows.copy_within(pos + 1..end, pos);
        self.counts[local] = self.counts[local] - W::one();
        Ok(removed)
    }

    fn remove_all_arrows(&mut self, vertex: usize) -> usize {
        let local = self.local(vertex);
        let count = self.counts[local].widen();
        self.counts[local] = W::zero();
        count
    }

    #[inline]
    fn vertex_data(&self, vertex: usize) -> u32 {
        self.data[self.local(vertex)].payload()
    }

    fn set_vertex_data(&mut self, vertex: usize, data: u32) -> Result<()> {
        let word = Self::check_payload(data)?;
        let local = self.local(vertex);
        self.data[local] = word;
        Ok(())
    }

    #[inline]
    fn max_payload() -> u32 {
        W::max_value().payload()
    }

    #[inline]
    fn max_vertices() -> usize {
        W::LIMIT
    }

    fn renumber<F: FnMut(usize) -> usize>(&mut self, mut map: F) {
        for local in 0..self.len() {
            let run = self.run(local);
            for sibling in &mut self.siblings[run] {
                *sibling = W::narrow(map(sibling.widen())).unwrap_or_else(W::max_value);
            }
        }
    }

    fn accepts_exchange(&self, _outgoing: usize, incoming: usize) -> bool {
        incoming <= self.arity
    }

    fn take_vertex(&mut self, vertex: usize) -> VertexSlot<W> {
        let local = self.local(vertex);
        let slot = self.read_slot(local);
        let last = self.len() - 1;
        for j in local..last {
            let next = self.read_slot(j + 1);
            self.write_slot(j, &next);
        }
        self.write_slot(last, &VertexSlot::vacant(W::zero()));
        slot
    }

    fn put_vertex(&mut self, vertex: usize, slot: VertexSlot<W>) -> VertexSlot<W> {
        let local = self.local(vertex);
        let last = self.len() - 1;
        let evicted = self.read_slot(last);
        for j in (local..last).rev() {
            let prev = self.read_slot(j);
            self.write_slot(j + 1, &prev);
        }
        self.write_slot(local, &slot);
        evicted
    }

    fn stats(&self) -> ChunkStats {
        let used = self.used();
        let capacity = self.siblings.len();
        let words = self.data.len() + self.counts.len() + self.siblings.len() + self.arrows.len();
        ChunkStats {
            base: self.base,
            used,
            capacity,
            free: capacity - used,
            heap_bytes: words * size_of::<W>(),
        }
    }

    fn check_layout(&self) -> Result<()> {
        for local in 0..self.len() {
            let count = self.counts[local].widen();
            if count > self.arity {
                return Err(GraphError::InvariantViolation(format!(
                    "vertex {} holds {count} siblings above arity {}",
                    self.base + local,
                    self.arity
                )));
            }
            let run = self.run(local);
            if self.siblings[run].windows(2).any(|w| w[0] >= w[1]) {
                return Err(GraphError::InvariantViolation(format!(
                    "run of vertex {} not strictly increasing",
                    self.base + local
                )));
            }
        }
        Ok(())
    }
}
