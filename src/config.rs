//! Construction-time tuning for [`ChunkedGraph`](crate::ChunkedGraph).

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Default number of vertex slots per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Largest supported chunk size.
pub const MAX_CHUNK_SIZE: usize = 1 << 16;

/// Default backing-array capacity allocated by a chunk on its first insertion.
pub const DEFAULT_INITIAL_SIBLING_CAPACITY: usize = 16;

/// Layout parameters of a chunked graph store.
///
/// ```
/// use chunkgraph::GraphConfig;
///
/// let config = GraphConfig::default().with_chunk_size(64).with_max_arity(Some(8));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.chunk_shift(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Vertex slots per chunk. Must be a power of two.
    pub chunk_size: usize,
    /// Sibling slots a chunk allocates the first time it stores an arrow.
    pub initial_sibling_capacity: usize,
    /// Upper bound on the run length of any single vertex, per direction.
    ///
    /// `None` lets runs grow until the storage word is exhausted.
    pub max_arity: Option<usize>,
    /// Vertex count to pre-size the chunk arrays for.
    pub reserve_vertices: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            initial_sibling_capacity: DEFAULT_INITIAL_SIBLING_CAPACITY,
            max_arity: None,
            reserve_vertices: 0,
        }
    }
}

impl GraphConfig {
    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the first-insertion sibling capacity.
    pub fn with_initial_sibling_capacity(mut self, capacity: usize) -> Self {
        self.initial_sibling_capacity = capacity;
        self
    }

    /// Enables or disables the fixed-maximum-arity mode.
    pub fn with_max_arity(mut self, max_arity: Option<usize>) -> Self {
        self.max_arity = max_arity;
        self
    }

    /// Sets the number of vertices to reserve chunk slots for.
    pub fn with_reserve_vertices(mut self, vertices: usize) -> Self {
        self.reserve_vertices = vertices;
        self
    }

    /// `log2(chunk_size)`.
    ///
    /// Only meaningful once [`validate`](Self::validate) has succeeded.
    #[inline]
    pub fn chunk_shift(&self) -> u32 {
        self.chunk_size.trailing_zeros()
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// [`GraphError::InvalidConfig`] if the chunk size is zero, not a power of
    /// two or above [`MAX_CHUNK_SIZE`], or if `max_arity` is `Some(0)`.
    pub fn validate(&self) -> Result<()> {
        if !self.chunk_size.is_power_of_two() {
            return Err(GraphError::InvalidConfig(format!(
                "chunk_size {} is not a power of two",
                self.chunk_size
            )));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(GraphError::InvalidConfig(format!(
                "chunk_size {} exceeds {MAX_CHUNK_SIZE}",
                self.chunk_size
            )));
        }
        if self.max_arity == Some(0) {
            return Err(GraphError::InvalidConfig("max_arity must be positive".into()));
        }
        Ok(())
    }
}
