//! Lazy breadth-/depth-first enumerators over the chunk arrays.
//!
//! A traversal borrows the store immutably, so the store cannot be mutated
//! while one is alive. Runs are read straight out of the chunks; nothing is
//! copied besides the queue of pending vertices.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use super::chunk::Chunk;
use super::store::ChunkedGraph;
use super::Direction;
use crate::error::Result;

mod visited;
#[cfg(test)]
mod tests;

pub use visited::{DenseVisited, VisitedSet};

/// Dequeue discipline of a [`Traversal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// FIFO: neighbors are enqueued at the back.
    BreadthFirst,
    /// LIFO: neighbors are enqueued at the front, lowest index first out.
    DepthFirst,
}

/// Pull-based traversal from one start vertex.
///
/// Each call to `next` dequeues one vertex, enqueues its unvisited neighbors
/// and yields the vertex. A vertex is marked visited when it is enqueued, so
/// it is yielded at most once and the traversal ends after at most
/// `vertex_count` items.
#[derive(Debug)]
pub struct Traversal<'g, C, V = DenseVisited> {
    graph: &'g ChunkedGraph<C>,
    direction: Direction,
    order: Order,
    queue: VecDeque<usize>,
    visited: V,
}

impl<'g, C: Chunk, V: VisitedSet> Traversal<'g, C, V> {
    fn new(graph: &'g ChunkedGraph<C>, start: usize, direction: Direction, order: Order, mut visited: V) -> Self {
        let mut queue = VecDeque::new();
        if visited.insert(start) {
            queue.push_back(start);
        }
        Self {
            graph,
            direction,
            order,
            queue,
            visited,
        }
    }

    /// Direction followed.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Dequeue discipline.
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    /// The visited set, including vertices enqueued but not yet yielded.
    #[inline]
    pub fn visited(&self) -> &V {
        &self.visited
    }

    /// Consumes the traversal and returns its visited set.
    pub fn into_visited(self) -> V {
        self.visited
    }

    /// Yields `(vertex, vertex_data)` instead of bare vertices.
    pub fn with_data(self) -> WithData<'g, C, V> {
        WithData { inner: self }
    }
}

impl<C: Chunk, V: VisitedSet> Iterator for Traversal<'_, C, V> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let v = self.queue.pop_front()?;
        let targets = self.graph.neighbors_unchecked(self.direction, v).targets();
        match self.order {
            Order::BreadthFirst => {
                for u in targets {
                    if self.visited.insert(u) {
                        self.queue.push_back(u);
                    }
                }
            }
            Order::DepthFirst => {
                for u in targets.rev() {
                    if self.visited.insert(u) {
                        self.queue.push_front(u);
                    }
                }
            }
        }
        Some(v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.graph.vertex_count()))
    }
}

impl<C: Chunk, V: VisitedSet> FusedIterator for Traversal<'_, C, V> {}

/// A [`Traversal`] yielding each vertex with its payload.
#[derive(Debug)]
pub struct WithData<'g, C, V = DenseVisited> {
    inner: Traversal<'g, C, V>,
}

impl<C: Chunk, V: VisitedSet> WithData<'_, C, V> {
    /// Consumes the adapter and returns the visited set.
    pub fn into_visited(self) -> V {
        self.inner.visited
    }
}

impl<C: Chunk, V: VisitedSet> Iterator for WithData<'_, C, V> {
    type Item = (usize, u32);

    #[inline]
    fn next(&mut self) -> Option<(usize, u32)> {
        let v = self.inner.next()?;
        Some((v, self.inner.graph.vertex_data_unchecked(v)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<C: Chunk, V: VisitedSet> FusedIterator for WithData<'_, C, V> {}

impl<C: Chunk> ChunkedGraph<C> {
    /// Traversal from `start` using a caller-supplied visited set.
    ///
    /// Vertices already in `visited` are never yielded; if `start` is one of
    /// them the traversal is empty.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`](crate::GraphError::VertexOutOfRange) for an invalid `start`.
    pub fn traverse_with<V: VisitedSet>(
        &self,
        start: usize,
        direction: Direction,
        order: Order,
        visited: V,
    ) -> Result<Traversal<'_, C, V>> {
        self.check_vertex(start)?;
        Ok(Traversal::new(self, start, direction, order, visited))
    }

    /// Traversal from `start` with a dense visited set sized to the store.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`](crate::GraphError::VertexOutOfRange) for an invalid `start`.
    pub fn traverse(&self, start: usize, direction: Direction, order: Order) -> Result<Traversal<'_, C>> {
        self.traverse_with(start, direction, order, DenseVisited::with_capacity(self.vertex_count()))
    }

    /// Breadth-first over successors.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`](crate::GraphError::VertexOutOfRange) for an invalid `start`.
    pub fn bfs(&self, start: usize) -> Result<Traversal<'_, C>> {
        self.traverse(start, Direction::Forward, Order::BreadthFirst)
    }

    /// Depth-first over successors.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`](crate::GraphError::VertexOutOfRange) for an invalid `start`.
    pub fn dfs(&self, start: usize) -> Result<Traversal<'_, C>> {
        self.traverse(start, Direction::Forward, Order::DepthFirst)
    }

    /// Breadth-first over predecessors.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`](crate::GraphError::VertexOutOfRange) for an invalid `start`.
    pub fn bfs_prev(&self, start: usize) -> Result<Traversal<'_, C>> {
        self.traverse(start, Direction::Backward, Order::BreadthFirst)
    }

    /// Depth-first over predecessors.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`](crate::GraphError::VertexOutOfRange) for an invalid `start`.
    pub fn dfs_prev(&self, start: usize) -> Result<Traversal<'_, C>> {
        self.traverse(start, Direction::Backward, Order::DepthFirst)
    }
}
