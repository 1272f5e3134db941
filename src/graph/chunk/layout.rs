//! Gap-buffer offset arithmetic.
//!
//! A chunk concatenates the adjacency runs of its vertices in local-index
//! order. `sizes[i]` is the cumulative run length through local vertex `i`,
//! so run `i` occupies the *logical* range `sizes[i - 1]..sizes[i]`.
//! Physically, one gap of `free` unused slots sits right after the run of
//! `gap_index`; every run after it is displaced by `free`.
//!
//! Everything here is a pure function of the cumulative sizes and the
//! [`GapLayout`], so it can be exercised without a chunk.

use core::ops::Range;

use super::word::ChunkWord;

/// Where a vertex sits relative to the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapSide {
    /// The vertex precedes the gap-owning vertex.
    Before,
    /// The vertex owns the gap.
    At,
    /// The vertex follows the gap-owning vertex.
    After,
}

/// A `copy_within` that relocates the gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    /// Physical source range.
    pub src: Range<usize>,
    /// Physical destination start.
    pub dst: usize,
}

/// Copy plan for enlarging the backing arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowPlan {
    /// Copied to the same offsets.
    pub prefix: Range<usize>,
    /// Copied to `suffix.start + delta`.
    pub suffix: Range<usize>,
    /// Capacity increase.
    pub delta: usize,
}

/// Gap position and size of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapLayout {
    /// Local vertex the gap follows.
    pub gap_index: usize,
    /// Number of unused slots.
    pub free: usize,
}

/// Logical start of the run of `local`.
#[inline(always)]
pub fn run_start<W: ChunkWord>(sizes: &[W], local: usize) -> usize {
    if local == 0 {
        0
    } else {
        sizes[local - 1].widen()
    }
}

/// Logical range of the run of `local`.
#[inline(always)]
pub fn run_range<W: ChunkWord>(sizes: &[W], local: usize) -> Range<usize> {
    run_start(sizes, local)..sizes[local].widen()
}

/// Total number of stored siblings.
#[inline]
pub fn used<W: ChunkWord>(sizes: &[W]) -> usize {
    sizes.last().map_or(0, |s| s.widen())
}

impl GapLayout {
    /// Step 1 of every mutation: classify `local` against the gap owner.
    #[inline]
    pub fn side(&self, local: usize) -> GapSide {
        match local.cmp(&self.gap_index) {
            core::cmp::Ordering::Less => GapSide::Before,
            core::cmp::Ordering::Equal => GapSide::At,
            core::cmp::Ordering::Greater => GapSide::After,
        }
    }

    /// Translates a logical offset inside the run of `local` to a physical one.
    #[inline(always)]
    pub fn physical(&self, local: usize, logical: usize) -> usize {
        if local > self.gap_index {
            logical + self.free
        } else {
            logical
        }
    }

    /// Physical range of the run of `local`.
    #[inline]
    pub fn physical_run<W: ChunkWord>(&self, sizes: &[W], local: usize) -> Range<usize> {
        let run = run_range(sizes, local);
        self.physical(local, run.start)..self.physical(local, run.end)
    }

    /// Physical range of the gap.
    #[inline]
    pub fn gap<W: ChunkWord>(&self, sizes: &[W]) -> Range<usize> {
        let start = sizes[self.gap_index].widen();
        start..start + self.free
    }

    /// The block move that places the gap directly after the run of `target`.
    ///
    /// Returns `None` when no element has to move. Vertices strictly between
    /// `target` and the old gap owner change side, which is exactly what the
    /// returned move accomplishes.
    pub fn relocation<W: ChunkWord>(&self, sizes: &[W], target: usize) -> Option<Shift> {
        if self.free == 0 {
            return None;
        }
        let shift = match self.side(target) {
            GapSide::At => return None,
            GapSide::Before => {
                let start = sizes[target].widen();
                let end = sizes[self.gap_index].widen();
                Shift {
                    src: start..end,
                    dst: start + self.free,
                }
            }
            GapSide::After => {
                let start = sizes[self.gap_index].widen();
                let end = sizes[target].widen();
                Shift {
                    src: start + self.free..end + self.free,
                    dst: start,
                }
            }
        };
        (!shift.src.is_empty()).then_some(shift)
    }

    /// Plan for growing a backing array of `capacity` slots to `new_capacity`.
    pub fn grow_plan<W: ChunkWord>(&self, sizes: &[W], capacity: usize, new_capacity: usize) -> GrowPlan {
        debug_assert!(new_capacity >= capacity);
        let gap = self.gap(sizes);
        GrowPlan {
            prefix: 0..gap.start,
            suffix: gap.end..capacity,
            delta: new_capacity - capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Runs: v0 = [a, b], v1 = [], v2 = [c], v3 = [d, e, f].
    const SIZES: [u32; 4] = [2, 2, 3, 6];

    #[test]
    fn test_run_ranges_follow_cumulative_sizes() {
        assert_eq!(run_range(&SIZES, 0), 0..2);
        assert_eq!(run_range(&SIZES, 1), 2..2);
        assert_eq!(run_range(&SIZES, 2), 2..3);
        assert_eq!(run_range(&SIZES, 3), 3..6);
        assert_eq!(used(&SIZES), 6);
        assert_eq!(used::<u32>(&[]), 0);
    }

    #[test]
    fn test_runs_after_gap_are_displaced() {
        let layout = GapLayout { gap_index: 1, free: 4 };
        assert_eq!(layout.physical_run(&SIZES, 0), 0..2);
        assert_eq!(layout.physical_run(&SIZES, 1), 2..2);
        assert_eq!(layout.gap(&SIZES), 2..6);
        assert_eq!(layout.physical_run(&SIZES, 2), 6..7);
        assert_eq!(layout.physical_run(&SIZES, 3), 7..10);
    }

    #[test]
    fn test_relocation_before_gap_moves_block_up() {
        let layout = GapLayout { gap_index: 2, free: 3 };
        // Block between end of v0 (2) and end of v2 (3) moves up by 3.
        assert_eq!(
            layout.relocation(&SIZES, 0),
            Some(Shift { src: 2..3, dst: 5 })
        );
        assert_eq!(layout.side(0), GapSide::Before);
    }

    #[test]
    fn test_relocation_after_gap_moves_block_down() {
        let layout = GapLayout { gap_index: 0, free: 3 };
        // Runs of v1..=v3 sit at 5..9 physically and slide down to 2.
        assert_eq!(
            layout.relocation(&SIZES, 3),
            Some(Shift { src: 5..9, dst: 2 })
        );
        assert_eq!(layout.side(3), GapSide::After);
    }

    #[test]
    fn test_relocation_is_noop_for_owner_empty_block_or_no_gap() {
        let layout = GapLayout { gap_index: 2, free: 3 };
        assert_eq!(layout.relocation(&SIZES, 2), None);
        // v1 ends where v2 starts; only v2's single element separates them.
        assert!(layout.relocation(&SIZES, 1).is_some());
        let layout = GapLayout { gap_index: 1, free: 3 };
        assert_eq!(layout.relocation(&SIZES, 0), None);
        let layout = GapLayout { gap_index: 0, free: 0 };
        assert_eq!(layout.relocation(&SIZES, 3), None);
    }

    #[test]
    fn test_grow_plan_splits_at_gap() {
        let layout = GapLayout { gap_index: 2, free: 1 };
        let plan = layout.grow_plan(&SIZES, 7, 14);
        assert_eq!(plan.prefix, 0..3);
        assert_eq!(plan.suffix, 4..7);
        assert_eq!(plan.delta, 7);
    }
}
