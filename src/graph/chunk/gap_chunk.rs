//! Compressed-row chunk with a single relocatable gap.
//!
//! Memory layout for a chunk of `L` vertex slots:
//! - `data`: `L` vertex payloads
//! - `sizes`: `L` cumulative run lengths
//! - `siblings` / `arrows`: parallel backing arrays holding every run in
//!   local-index order, plus one gap of `free` slots right after the run of
//!   `gap_index`
//!
//! A mutation of vertex `v` first moves the gap next to `v` (sliding only the
//! runs between the old and new gap position), then shifts the tail of `v`'s
//! own run by one slot into or out of the gap. The only full-width pass is the
//! `sizes` update, bounded by the chunk size.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `sibling_count`, `sibling_at` | \(O(1)\) | Cumulative sizes + gap offset |
//! | `index_of` | \(O(\log d)\) | Runs are sorted |
//! | `try_add_arrow`, `try_remove_arrow` | \(O(d + g + L)\) | `g`: distance to the gap |
//! | `remove_all_arrows` | \(O(g + L)\) | One bulk shift |
//! | grow | \(O(C)\) | Doubling, amortized over insertions |

use core::mem::size_of;

use tracing::trace;

use super::iter::NeighborIter;
use super::layout::{self, GapLayout};
use super::word::ChunkWord;
use super::{Chunk, ChunkStats, SearchResult, VertexSlot};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

/// Narrows a value the caller has already range-checked.
#[inline(always)]
fn to_word<W: ChunkWord>(value: usize) -> W {
    debug_assert!(value <= W::LIMIT, "value {value} exceeds storage word");
    W::narrow(value).unwrap_or_else(W::max_value)
}

/// Gap-buffered compressed-row chunk over storage word `W`.
#[derive(Debug, Clone)]
pub struct GapChunk<W> {
    base: usize,
    data: Vec<W>,
    sizes: Vec<W>,
    siblings: Vec<W>,
    arrows: Vec<W>,
    layout: GapLayout,
    initial_capacity: usize,
    max_arity: Option<usize>,
}

impl<W: ChunkWord> GapChunk<W> {
    #[inline(always)]
    fn local(&self, vertex: usize) -> usize {
        debug_assert!(self.contains(vertex), "vertex {vertex} outside chunk at {}", self.base);
        vertex - self.base
    }

    #[inline(always)]
    fn last(&self) -> usize {
        self.sizes.len() - 1
    }

    /// Backing-array capacity in slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.siblings.len()
    }

    /// Size of the gap.
    #[inline]
    pub fn free(&self) -> usize {
        self.layout.free
    }

    /// Global index of the vertex the gap follows.
    #[inline]
    pub fn gap_vertex(&self) -> usize {
        self.base + self.layout.gap_index
    }

    #[inline]
    fn run_slices(&self, local: usize) -> (&[W], &[W]) {
        let run = self.layout.physical_run(&self.sizes, local);
        (&self.siblings[run.clone()], &self.arrows[run])
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
            Ok(k)
        } else {
            Err(GraphError::SiblingOutOfRange {
                vertex,
                position: k,
                count,
            })
        }
    }

    /// Places the gap right after the run of `local`.
    fn move_gap(&mut self, local: usize) {
        if let Some(shift) = self.layout.relocation(&self.sizes, local) {
            self.siblings.copy_within(shift.src.clone(), shift.dst);
            self.arrows.copy_within(shift.src, shift.dst);
        }
        self.layout.gap_index = local;
    }

    /// Doubles the backing arrays, keeping the gap at the same logical position.
    fn grow(&mut self) {
        let capacity = self.capacity();
        let new_capacity = (capacity * 2).max(self.initial_capacity).max(1);
        let plan = self.layout.grow_plan(&self.sizes, capacity, new_capacity);

        let regrow = |old: &[W]| {
            let mut grown = vec![W::zero(); new_capacity];
            grown[plan.prefix.clone()].copy_from_slice(&old[plan.prefix.clone()]);
            let dst = plan.suffix.start + plan.delta;
            grown[dst..].copy_from_slice(&old[plan.suffix.clone()]);
            grown
        };
        self.siblings = regrow(&self.siblings);
        self.arrows = regrow(&self.arrows);
        self.layout.free += plan.delta;

        trace!(
            base = self.base,
            capacity,
            new_capacity,
            gap_vertex = self.gap_vertex(),
            "grew chunk"
        );
    }

    fn reserve_free(&mut self, needed: usize) {
        while self.layout.free < needed {
            self.grow();
        }
    }

    /// Gapped insertion of `(sibling, arrow)` at position `k` of the run of `local`.
    fn insert_at(&mut self, local: usize, k: usize, sibling: W, arrow: W) {
        if self.layout.free == 0 {
            self.grow();
        }
        self.move_gap(local);

        let run = layout::run_range(&self.sizes, local);
        let pos = run.start + k;
        debug_assert!(pos <= run.end);
        self.siblings.copy_within(pos..run.end, pos + 1);
        self.arrows.copy_within(pos..run.end, pos + 1);
        self.siblings[pos] = sibling;
        self.arrows[pos] = arrow;

        self.layout.free -= 1;
        for size in &mut self.sizes[local..] {
            *size = *size + W::one();
        }
    }

    /// Gapped removal of position `k` of the run of `local`.
    fn remove_at(&mut self, local: usize, k: usize) -> W {
        self.move_gap(local);

        let run = layout::run_range(&self.sizes, local);
        let pos = run.start + k;
        debug_assert!(pos < run.end);
        let removed = self.siblings[pos];
        self.siblings.copy_within(pos + 1..run.end, pos);
        self.arrows.copy_within(pos + 1..run.end, pos);

        self.layout.free += 1;
        for size in &mut self.sizes[local..] {
            *size = *size - W::one();
        }
        removed
    }
}

impl<W: ChunkWord> Chunk for GapChunk<W> {
    type Word = W;

    fn with_base(base: usize, config: &GraphConfig) -> Self {
        let len = config.chunk_size.max(1);
        trace!(base, len, "created gap chunk");
        Self {
            base,
            data: vec![W::zero(); len],
            sizes: vec![W::zero(); len],
            siblings: Vec::new(),
            arrows: Vec::new(),
            layout: GapLayout::default(),
            initial_capacity: config.initial_sibling_capacity,
            max_arity: config.max_arity,
        }
    }

    #[inline]
    fn base(&self) -> usize {
        self.base
    }

    #[inline]
    fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    fn used(&self) -> usize {
        layout::used(&self.sizes)
    }

    #[inline]
    fn sibling_count(&self, vertex: usize) -> usize {
        layout::run_range(&self.sizes, self.local(vertex)).len()
    }

    #[inline]
    fn neighbors(&self, vertex: usize) -> NeighborIter<'_, W> {
        let (siblings, arrows) = self.run_slices(self.local(vertex));
        NeighborIter::new(siblings, arrows)
    }

    #[inline]
    fn sibling_at(&self, vertex: usize, k: usize) -> Result<usize> {
        let k = self.check_position(vertex, k)?;
        let (siblings, _) = self.run_slices(self.local(vertex));
        Ok(siblings[k].widen())
    }

    #[inline]
    fn arrow_at(&self, vertex: usize, k: usize) -> Result<u32> {
        let k = self.check_position(vertex, k)?;
        let (_, arrows) = self.run_slices(self.local(vertex));
        Ok(arrows[k].payload())
    }

    fn index_of(&self, vertex: usize, neighbor: usize) -> SearchResult {
        let (siblings, _) = self.run_slices(self.local(vertex));
        match W::narrow(neighbor) {
            Some(target) => siblings.binary_search(&target),
            // Larger than anything storable: it would go last.
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
        if let Some(limit) = self.max_arity {
            if count >= limit {
                return Err(GraphError::CapacityExceeded {
                    what: "arity",
                    limit,
                    requested: count + 1,
                });
            }
        }
        let used = self.used();
        if used >= W::LIMIT {
            return Err(GraphError::CapacityExceeded {
                what: "chunk siblings",
                limit: W::LIMIT,
                requested: used + 1,
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
                let local = self.local(vertex);
                let arrow = Self::check_payload(data)?;
                self.insert_at(local, k, to_word(neighbor), arrow);
                Ok(true)
            }
        }
    }

    fn set_arrow_at(&mut self, vertex: usize, k: usize, data: u32) -> Result<()> {
        let k = self.check_position(vertex, k)?;
        let word = Self::check_payload(data)?;
        let local = self.local(vertex);
        let run = self.layout.physical_run(&self.sizes, local);
        self.arrows[run.start + k] = word;
        Ok(())
    }

    fn try_remove_arrow(&mut self, vertex: usize, neighbor: usize) -> bool {
        match self.index_of(vertex, neighbor) {
            Ok(k) => {
                let local = self.local(vertex);
                self.remove_at(local, k);
                true
            }
            Err(_) => false,
        }
    }

    fn remove_arrow_at(&mut self, vertex: usize, k: usize) -> Result<usize> {
        let k = self.check_position(vertex, k)?;
        let local = self.local(vertex);
        Ok(self.remove_at(local, k).widen())
    }

    fn remove_all_arrows(&mut self, vertex: usize) -> usize {
        let local = self.local(vertex);
        let count = layout::run_range(&self.sizes, local).len();
        if count == 0 {
            return 0;
        }
        // With the gap right after the run, dropping the run just widens the gap.
        self.move_gap(local);
        self.layout.free += count;
        for size in &mut self.sizes[local..] {
            *size = to_word(size.widen() - count);
        }
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
        let gap = self.layout.gap(&self.sizes);
        let (head, rest) = self.siblings.split_at_mut(gap.start);
        let tail = &mut rest[gap.len()..];
        for sibling in head.iter_mut().chain(tail.iter_mut()) {
            *sibling = to_word(map(sibling.widen()));
        }
    }

    fn accepts_exchange(&self, outgoing: usize, incoming: usize) -> bool {
        self.used() - outgoing + incoming <= W::LIMIT
    }

    fn take_vertex(&mut self, vertex: usize) -> VertexSlot<W> {
        let local = self.local(vertex);
        let last = self.last();
        // Parking the gap behind the last run makes the logical layout physical.
        self.move_gap(last);

        let run = layout::run_range(&self.sizes, local);
        let used = self.used();
        let slot = VertexSlot {
            data: self.data[local],
            siblings: self.siblings[run.clone()].to_vec(),
            arrows: self.arrows[run.clone()].to_vec(),
        };

        let len = run.len();
        self.siblings.copy_within(run.end..used, run.start);
        self.arrows.copy_within(run.end..used, run.start);
        self.layout.free += len;

        for j in local..last {
            self.sizes[j] = to_word(self.sizes[j + 1].widen() - len);
        }
        self.sizes[last] = to_word(used - len);

        self.data.copy_within(local + 1.., local);
        self.data[last] = W::zero();
        slot
    }

    fn put_vertex(&mut self, vertex: usize, slot: VertexSlot<W>) -> VertexSlot<W> {
        debug_assert_eq!(slot.siblings.len(), slot.arrows.len());
        let local = self.local(vertex);
        let last = self.last();
        self.move_gap(last);

        // Evict the last slot: its run sits right before the gap.
        let last_run = layout::run_range(&self.sizes, last);
        let evicted = VertexSlot {
            data: self.data[last],
            siblings: self.siblings[last_run.clone()].to_vec(),
            arrows: self.arrows[last_run.clone()].to_vec(),
        };
        self.layout.free += last_run.len();
        self.sizes[last] = to_word(last_run.start);
        let used = last_run.start;

        let incoming = slot.siblings.len();
        self.reserve_free(incoming);

        let start = layout::run_start(&self.sizes, local);
        self.siblings.copy_within(start..used, start + incoming);
        self.arrows.copy_within(start..used, start + incoming);
        self.siblings[start..start + incoming].copy_from_slice(&slot.siblings);
        self.arrows[start..start + incoming].copy_from_slice(&slot.arrows);
        self.layout.free -= incoming;

        for j in (local + 1..=last).rev() {
            self.sizes[j] = to_word(self.sizes[j - 1].widen() + incoming);
        }
        self.sizes[local] = to_word(start + incoming);

        self.data.copy_within(local..last, local + 1);
        self.data[local] = slot.data;
        evicted
    }

    fn stats(&self) -> ChunkStats {
        let words = self.data.len() + self.sizes.len() + self.siblings.len() + self.arrows.len();
        ChunkStats {
            base: self.base,
            used: self.used(),
            capacity: self.capacity(),
            free: self.layout.free,
            heap_bytes: words * size_of::<W>(),
        }
    }

    fn check_layout(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> {
            Err(GraphError::InvariantViolation(format!("chunk at {}: {msg}", self.base)))
        };

        if self.siblings.len() != self.arrows.len() {
            return fail(format!(
                "siblings/arrows length mismatch {} != {}",
                self.siblings.len(),
                self.arrows.len()
            ));
        }
        if self.layout.gap_index >= self.len() {
            return fail(format!("gap index {} outside chunk", self.layout.gap_index));
        }
        if self.sizes.windows(2).any(|w| w[0] > w[1]) {
            return fail("cumulative sizes decrease".into());
        }
        if self.used() + self.layout.free != self.capacity() {
            return fail(format!(
                "used {} + free {} != capacity {}",
                self.used(),
                self.layout.free,
                self.capacity()
            ));
        }
        for local in 0..self.len() {
            let (siblings, _) = self.run_slices(local);
            if siblings.windows(2).any(|w| w[0] >= w[1]) {
                return fail(format!("run of vertex {} not strictly increasing", self.base + local));
            }
        }
        Ok(())
    }
}
