//! Vertex and arrow mutation.
//!
//! Every arrow mutation touches one forward and one backward chunk. Both
//! mirrored lookups and every capacity or payload check run before the
//! first write, so a failed call leaves the store unchanged.

use tracing::{debug, error};

use super::ChunkedGraph;
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::graph::chunk::Chunk;
use crate::graph::Direction;

/// Chunk `index` of `lane`, created on first touch.
#[inline]
pub(super) fn chunk_or_create<'a, C: Chunk>(
    lane: &'a mut [Option<C>],
    index: usize,
    shift: u32,
    config: &GraphConfig,
) -> &'a mut C {
    lane[index].get_or_insert_with(|| C::with_base(index << shift, config))
}

/// Chunk `index` of `lane`, which a successful lookup has shown to exist.
#[inline]
fn chunk_present<C>(lane: &mut [Option<C>], index: usize) -> Result<&mut C> {
    lane.get_mut(index)
        .and_then(Option::as_mut)
        .ok_or_else(|| GraphError::InvariantViolation(format!("chunk {index} missing after lookup")))
}

impl<C: Chunk> ChunkedGraph<C> {
    /// Builds the error for a run entry whose mirror is absent, logging it.
    pub(super) fn mirror_missing(&self, direction: Direction, vertex: usize, neighbor: usize) -> GraphError {
        error!(?direction, vertex, neighbor, "mirror entry missing");
        GraphError::MirrorMissing {
            direction,
            vertex,
            neighbor,
        }
    }

    fn check_payload(data: u32) -> Result<()> {
        if data > C::max_payload() {
            Err(GraphError::PayloadTooWide {
                value: data,
                max: C::max_payload(),
            })
        } else {
            Ok(())
        }
    }

    /// Appends a vertex with zero payload and returns its index.
    ///
    /// # Errors
    /// [`GraphError::CapacityExceeded`] once the storage word runs out of indices.
    pub fn add_vertex(&mut self) -> Result<usize> {
        self.add_vertex_with_data(0)
    }

    /// Appends a vertex carrying `data` and returns its index.
    ///
    /// # Errors
    /// [`GraphError::CapacityExceeded`] once the storage word runs out of
    /// indices, [`GraphError::PayloadTooWide`] if `data` does not fit.
    pub fn add_vertex_with_data(&mut self, data: u32) -> Result<usize> {
        let v = self.vertex_count;
        self.check_vertex_room()?;
        Self::check_payload(data)?;
        self.vertex_count += 1;
        self.fit_lanes();
        if data != 0 {
            self.set_vertex_data(v, data)?;
        }
        Ok(v)
    }

    /// Appends `count` vertices and returns the index range they occupy.
    ///
    /// # Errors
    /// [`GraphError::CapacityExceeded`] if the indices would not fit; no
    /// vertex is added in that case.
    pub fn add_vertices(&mut self, count: usize) -> Result<core::ops::Range<usize>> {
        let start = self.vertex_count;
        let end = start.saturating_add(count);
        if end > C::max_vertices() {
            return Err(GraphError::CapacityExceeded {
                what: "vertex count",
                limit: C::max_vertices(),
                requested: end,
            });
        }
        self.vertex_count = end;
        self.fit_lanes();
        Ok(start..end)
    }

    pub(super) fn check_vertex_room(&self) -> Result<()> {
        if self.vertex_count >= C::max_vertices() {
            Err(GraphError::CapacityExceeded {
                what: "vertex count",
                limit: C::max_vertices(),
                requested: self.vertex_count + 1,
            })
        } else {
            Ok(())
        }
    }

    /// Sets the payload of `v` in both mirrored copies.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`] or [`GraphError::PayloadTooWide`].
    pub fn set_vertex_data(&mut self, v: usize, data: u32) -> Result<()> {
        self.check_vertex(v)?;
        Self::check_payload(data)?;
        let index = self.chunk_index(v);
        let shift = self.chunk_shift;
        let config = self.config;
        if data == 0 && self.forward[index].is_none() && self.backward[index].is_none() {
            return Ok(());
        }
        chunk_or_create(&mut self.forward, index, shift, &config).set_vertex_data(v, data)?;
        chunk_or_create(&mut self.backward, index, shift, &config).set_vertex_data(v, data)
    }

    /// Adds `v -> u` carrying `data`.
    ///
    /// Returns `false` and leaves the existing payload alone if the arrow is
    /// already present.
    ///
    /// # Errors
    /// Range, capacity or payload faults; [`GraphError::MirrorMissing`] if
    /// only one direction records the arrow.
    pub fn add_arrow(&mut self, v: usize, u: usize, data: u32) -> Result<bool> {
        self.insert_arrow(v, u, data, false)
    }

    /// Adds `v -> u` carrying `data`, overwriting the payload of an existing
    /// arrow. Returns `true` only when a new arrow was created.
    ///
    /// # Errors
    /// As [`add_arrow`](Self::add_arrow).
    pub fn add_or_update_arrow(&mut self, v: usize, u: usize, data: u32) -> Result<bool> {
        self.insert_arrow(v, u, data, true)
    }

    fn insert_arrow(&mut self, v: usize, u: usize, data: u32, update: bool) -> Result<bool> {
        self.check_vertex(u)?;
        let forward = self.find_index(Direction::Forward, v, u)?;
        let backward = self.find_index(Direction::Backward, u, v)?;
        let shift = self.chunk_shift;
        let (fi, bi) = (v >> shift, u >> shift);

        match (forward, backward) {
            (Ok(i), Ok(j)) => {
                if update {
                    Self::check_payload(data)?;
                    chunk_present(&mut self.forward, fi)?.set_arrow_at(v, i, data)?;
                    chunk_present(&mut self.backward, bi)?.set_arrow_at(u, j, data)?;
                }
                Ok(false)
            }
            (Err(_), Err(_)) => {
                let config = self.config;
                let out = chunk_or_create(&mut self.forward, fi, shift, &config);
                out.check_insert(v, u, data)?;
                let inc = chunk_or_create(&mut self.backward, bi, shift, &config);
                inc.check_insert(u, v, data)?;
                out.try_add_arrow(v, u, data, false)?;
                inc.try_add_arrow(u, v, data, false)?;
                self.arrow_count += 1;
                Ok(true)
            }
            (Ok(_), Err(_)) => Err(self.mirror_missing(Direction::Backward, u, v)),
            (Err(_), Ok(_)) => Err(self.mirror_missing(Direction::Forward, v, u)),
        }
    }

    /// Overwrites the payload of `v -> u` in both directions.
    ///
    /// # Errors
    /// [`GraphError::ArrowNotFound`] if the arrow is absent, range and payload
    /// faults otherwise.
    pub fn set_arrow_data(&mut self, v: usize, u: usize, data: u32) -> Result<()> {
        self.check_vertex(u)?;
        match self.find_index_of_next(v, u)? {
            Ok(_) => self.insert_arrow(v, u, data, true).map(|_| ()),
            Err(_) => Err(GraphError::ArrowNotFound { from: v, to: u }),
        }
    }

    /// Removes the `i`-th outgoing arrow of `v` and returns its target.
    ///
    /// # Errors
    /// Range faults; [`GraphError::MirrorMissing`] if the backward entry is absent.
    pub fn remove_next(&mut self, v: usize, i: usize) -> Result<usize> {
        self.remove_nth(Direction::Forward, v, i)
    }

    /// Removes the `i`-th incoming arrow of `v` and returns its source.
    ///
    /// # Errors
    /// Range faults; [`GraphError::MirrorMissing`] if the forward entry is absent.
    pub fn remove_prev(&mut self, v: usize, i: usize) -> Result<usize> {
        self.remove_nth(Direction::Backward, v, i)
    }

    /// Removes `v -> u` and returns its payload.
    ///
    /// # Errors
    /// [`GraphError::ArrowNotFound`] if the arrow is absent.
    pub fn remove_arrow(&mut self, v: usize, u: usize) -> Result<u32> {
        self.check_vertex(u)?;
        match self.find_index_of_next(v, u)? {
            Ok(i) => {
                let data = self.next_arrow(v, i)?;
                self.remove_nth(Direction::Forward, v, i)?;
                Ok(data)
            }
            Err(_) => Err(GraphError::ArrowNotFound { from: v, to: u }),
        }
    }

    fn remove_nth(&mut self, direction: Direction, v: usize, i: usize) -> Result<usize> {
        let u = self.neighbor(direction, v, i)?;
        let mirror = direction.reverse();
        let j = match self.find_index(mirror, u, v)? {
            Ok(j) => j,
            Err(_) => return Err(self.mirror_missing(mirror, u, v)),
        };
        let shift = self.chunk_shift;
        let (lane, mirror_lane) = self.lanes_mut(direction);
        chunk_present(lane, v >> shift)?.remove_arrow_at(v, i)?;
        chunk_present(mirror_lane, u >> shift)?.remove_arrow_at(u, j)?;
        self.arrow_count -= 1;
        Ok(u)
    }

    /// Removes every outgoing arrow of `v` and returns how many there were.
    ///
    /// # Errors
    /// [`GraphError::VertexOutOfRange`]; [`GraphError::MirrorMissing`] if any
    /// backward entry is absent, in which case nothing is removed.
    pub fn remove_all_next(&mut self, v: usize) -> Result<usize> {
        self.remove_all(Direction::Forward, v)
    }

    /// Removes every incoming arrow of `v` and returns how many there were.
    ///
    /// # Errors
    /// As [`remove_all_next`](Self::remove_all_next).
    pub fn remove_all_prev(&mut self, v: usize) -> Result<usize> {
        self.remove_all(Direction::Backward, v)
    }

    /// Every `v -> u` entry of `targets` in `direction` has its mirror.
    pub(super) fn check_mirrors(&self, direction: Direction, v: usize, targets: &[usize]) -> Result<()> {
        let mirror = direction.reverse();
        for &u in targets {
            if self.find_index(mirror, u, v)?.is_err() {
                return Err(self.mirror_missing(mirror, u, v));
            }
        }
        Ok(())
    }

    pub(super) fn remove_all(&mut self, direction: Direction, v: usize) -> Result<usize> {
        self.check_vertex(v)?;
        let targets: Vec<usize> = self.neighbors_unchecked(direction, v).targets().collect();
        if targets.is_empty() {
            return Ok(0);
        }
        self.check_mirrors(direction, v, &targets)?;

        let shift = self.chunk_shift;
        let (lane, mirror_lane) = self.lanes_mut(direction);
        for &u in targets.iter().rev() {
            chunk_present(mirror_lane, u >> shift)?.try_remove_arrow(u, v);
        }
        chunk_present(lane, v >> shift)?.remove_all_arrows(v);
        self.arrow_count -= targets.len();
        Ok(targets.len())
    }

    /// Adds every `(source, target, payload)` triple, skipping arrows that
    /// already exist. Returns the number of arrows created.
    ///
    /// # Errors
    /// Stops at the first failing triple; earlier triples stay applied.
    pub fn extend_arrows<I>(&mut self, arrows: I) -> Result<usize>
    where
        I: IntoIterator<Item = (usize, usize, u32)>,
    {
        let mut created = 0;
        for (v, u, data) in arrows {
            if self.add_arrow(v, u, data)? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Builds a store of `vertex_count` zero-payload vertices and `arrows`.
    ///
    /// # Errors
    /// As [`extend_arrows`](Self::extend_arrows), plus capacity faults on the vertex count.
    pub fn from_arrows<I>(vertex_count: usize, arrows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, u32)>,
    {
        Self::from_arrows_with_config(GraphConfig::default(), vertex_count, arrows)
    }

    /// [`from_arrows`](Self::from_arrows) with an explicit configuration.
    ///
    /// # Errors
    /// [`GraphError::InvalidConfig`], then as [`from_arrows`](Self::from_arrows).
    pub fn from_arrows_with_config<I>(config: GraphConfig, vertex_count: usize, arrows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, u32)>,
    {
        let mut graph = Self::with_config(config)?;
        graph.add_vertices(vertex_count)?;
        graph.extend_arrows(arrows)?;
        Ok(graph)
    }

    /// Drops every vertex, arrow and chunk. The configuration is kept.
    pub fn clear(&mut self) {
        let populated = self.forward.iter().chain(&self.backward).filter(|c| c.is_some()).count();
        debug!(
            vertices = self.vertex_count,
            arrows = self.arrow_count,
            populated,
            "clearing graph"
        );
        self.forward.clear();
        self.backward.clear();
        self.vertex_count = 0;
        self.arrow_count = 0;
    }
}
