//! Storage words for chunk arrays.
//!
//! A chunk stores neighbor indices, cumulative run sizes and payloads in one
//! unsigned word type. `u32` is the general-purpose width; `u16` halves the
//! footprint for graphs below 65535 vertices.

use core::fmt::Debug;

use num_traits::{NumCast, PrimInt, Unsigned};

/// Unsigned integer usable as a chunk storage word.
pub trait ChunkWord: PrimInt + Unsigned + Default + Debug + Send + Sync + 'static {
    /// Largest value a word can hold, as `usize`.
    const LIMIT: usize;

    /// Widens to `usize`.
    fn widen(self) -> usize;

    /// Narrows from `usize`, `None` if it does not fit.
    #[inline]
    fn narrow(value: usize) -> Option<Self> {
        <Self as NumCast>::from(value)
    }

    /// Narrows a 32-bit payload, `None` if it does not fit.
    #[inline]
    fn from_payload(value: u32) -> Option<Self> {
        <Self as NumCast>::from(value)
    }

    /// Widens to a 32-bit payload.
    fn payload(self) -> u32;
}

impl ChunkWord for u32 {
    const LIMIT: usize = u32::MAX as usize;

    #[inline(always)]
    fn widen(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn payload(self) -> u32 {
        self
    }
}

impl ChunkWord for u16 {
    const LIMIT: usize = u16::MAX as usize;

    #[inline(always)]
    fn widen(self) -> usize {
        <usize as From<u16>>::from(self)
    }

    #[inline(always)]
    fn payload(self) -> u32 {
        <u32 as From<u16>>::from(self)
    }
}
