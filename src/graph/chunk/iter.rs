//! Iterator over one adjacency run.

use core::iter::FusedIterator;

use super::word::ChunkWord;

/// Yields `(neighbor, arrow_payload)` pairs of a run, straight from the
/// chunk arrays.
#[derive(Debug, Clone)]
pub struct NeighborIter<'a, W> {
    siblings: &'a [W],
    arrows: &'a [W],
    index: usize,
    end: usize,
}

impl<'a, W: ChunkWord> NeighborIter<'a, W> {
    /// Wraps two parallel slices of equal length.
    #[inline]
    pub fn new(siblings: &'a [W], arrows: &'a [W]) -> Self {
        debug_assert_eq!(siblings.len(), arrows.len());
        Self {
            siblings,
            arrows,
            index: 0,
            end: siblings.len(),
        }
    }

    /// An iterator that yields nothing, for vertices of unpopulated chunks.
    #[inline]
    pub fn empty() -> Self {
        Self::new(&[], &[])
    }

    /// The neighbor indices still to be yielded, as stored.
    #[inline]
    pub fn siblings(&self) -> &'a [W] {
        &self.siblings[self.index..self.end]
    }

    /// Only the neighbor indices.
    #[inline]
    pub fn targets(self) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator + 'a {
        self.siblings().iter().map(|s| s.widen())
    }
}

impl<W: ChunkWord> Iterator for NeighborIter<'_, W> {
    type Item = (usize, u32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            None
        } else {
            let item = (self.siblings[self.index].widen(), self.arrows[self.index].payload());
            self.index += 1;
            Some(item)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.index;
        (n, Some(n))
    }
}

impl<W: ChunkWord> DoubleEndedIterator for NeighborIter<'_, W> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            None
        } else {
            self.end -= 1;
            Some((self.siblings[self.end].widen(), self.arrows[self.end].payload()))
        }
    }
}

impl<W: ChunkWord> ExactSizeIterator for NeighborIter<'_, W> {}

impl<W: ChunkWord> FusedIterator for NeighborIter<'_, W> {}
