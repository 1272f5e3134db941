//! Visited sets for graph traversals.
//!
//! This provides three implementations:
//! - `DenseVisited`: word-packed bitset, the default for traversals
//! - `HashSet<usize>`: for a handful of vertices in a large graph
//! - `RoaringBitmap`: compressed bitmap for sparse but large visits
//!
//! Traversals only ever call [`VisitedSet::insert`], so deduplication lives
//! in one place whatever the storage choice.

use std::collections::HashSet;
use std::hash::BuildHasher;

use roaring::RoaringBitmap;

/// A set of vertex indices a traversal has already reached.
pub trait VisitedSet {
    /// Marks `vertex` visited. Returns `true` iff it was not visited before.
    fn insert(&mut self, vertex: usize) -> bool;

    /// Whether `vertex` has been marked.
    fn contains(&self, vertex: usize) -> bool;
}

impl<V: VisitedSet + ?Sized> VisitedSet for &mut V {
    #[inline(always)]
    fn insert(&mut self, vertex: usize) -> bool {
        (**self).insert(vertex)
    }

    #[inline(always)]
    fn contains(&self, vertex: usize) -> bool {
        (**self).contains(vertex)
    }
}

const WORD_BITS: usize = u64::BITS as usize;

/// A dense, word-packed visited set.
///
/// Sized up front to the vertex count; grows on demand if a larger index is
/// inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenseVisited {
    words: Vec<u64>,
    marked: usize,
}

impl DenseVisited {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set with room for indices `0..bits` without reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
            marked: 0,
        }
    }

    /// Number of marked vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.marked
    }

    /// Returns `true` if no vertex is marked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.marked == 0
    }

    /// Unmarks every vertex, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.marked = 0;
    }

    /// Marked vertices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            core::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(w * WORD_BITS + bit)
            })
        })
    }
}

impl VisitedSet for DenseVisited {
    #[inline]
    fn insert(&mut self, vertex: usize) -> bool {
        let (word, bit) = (vertex / WORD_BITS, vertex % WORD_BITS);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        self.marked += usize::from(fresh);
        fresh
    }

    #[inline]
    fn contains(&self, vertex: usize) -> bool {
        self.words
            .get(vertex / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (vertex % WORD_BITS)) != 0)
    }
}

impl<S: BuildHasher> VisitedSet for HashSet<usize, S> {
    #[inline]
    fn insert(&mut self, vertex: usize) -> bool {
        HashSet::insert(self, vertex)
    }

    #[inline]
    fn contains(&self, vertex: usize) -> bool {
        HashSet::contains(self, &vertex)
    }
}

/// Vertex indices are stored as `u32`; larger indices cannot be recorded and
/// read as already visited.
impl VisitedSet for RoaringBitmap {
    #[inline]
    fn insert(&mut self, vertex: usize) -> bool {
        u32::try_from(vertex).is_ok_and(|v| RoaringBitmap::insert(self, v))
    }

    #[inline]
    fn contains(&self, vertex: usize) -> bool {
        u32::try_from(vertex).map_or(true, |v| RoaringBitmap::contains(self, v))
    }
}
