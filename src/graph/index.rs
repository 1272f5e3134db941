//! The index-only graph contract.
//!
//! Algorithms layered on top of the store (reachability, components,
//! spanning trees) depend on these traits alone, never on chunk layout.

use super::chunk::SearchResult;
use crate::error::Result;

/// Read access to an index-addressed directed graph.
pub trait IndexGraph {
    /// Number of vertices; valid indices are `0..vertex_count()`.
    fn vertex_count(&self) -> usize;

    /// Number of arrows.
    fn arrow_count(&self) -> usize;

    /// Out-degree of `v`.
    fn next_count(&self, v: usize) -> Result<usize>;

    /// `i`-th successor of `v`, in increasing index order.
    fn next(&self, v: usize, i: usize) -> Result<usize>;

    /// Payload of the `i`-th outgoing arrow of `v`.
    fn next_arrow(&self, v: usize, i: usize) -> Result<u32>;

    /// In-degree of `v`.
    fn prev_count(&self, v: usize) -> Result<usize>;

    /// `i`-th predecessor of `v`, in increasing index order.
    fn prev(&self, v: usize, i: usize) -> Result<usize>;

    /// Payload of the `i`-th incoming arrow of `v`.
    fn prev_arrow(&self, v: usize, i: usize) -> Result<u32>;

    /// Position of `u` among the successors of `v`, or where it would be inserted.
    fn find_index_of_next(&self, v: usize, u: usize) -> Result<SearchResult>;

    /// Payload of vertex `v`.
    fn vertex_data(&self, v: usize) -> Result<u32>;
}

/// Write access to an index-addressed directed graph.
pub trait IndexGraphMut: IndexGraph {
    /// Appends a vertex and returns its index.
    fn add_vertex(&mut self) -> Result<usize>;

    /// Adds `v -> u` unless present; `true` if it was created.
    fn add_arrow(&mut self, v: usize, u: usize, data: u32) -> Result<bool>;

    /// Removes the `i`-th outgoing arrow of `v` and returns its target.
    fn remove_next(&mut self, v: usize, i: usize) -> Result<usize>;

    /// Removes `v` with all its arrows; higher indices shift down by one.
    fn remove_vertex(&mut self, v: usize) -> Result<u32>;
}
