// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::core::{Cell, Grid};

/// Marching state of a single cell during one sweep.
///
/// States only move forward: `Unvisited -> Active -> Frozen`, or
/// `Unvisited -> Capped` once a sweep is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarchState {
    /// Not yet reached by the frontier.
    #[default]
    Unvisited,
    /// On the frontier with a provisional value.
    Active,
    /// Final for this sweep; its value never changes again.
    Frozen,
    /// Excluded from marching altogether (never seeded, written or read).
    Held,
    /// Out of reach of an earlier sweep and set to the band sentinel. Never
    /// marched and never read as a neighbor, but still boundary-finished.
    Capped,
}

/// Per-cell marching states over the same lattice as the distance field.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusGrid {
    grid: Grid<MarchState>,
}

impl StatusGrid {
    /// Create a status grid matching `like`, with every cell `Unvisited`.
    pub fn for_grid<T: Sync>(like: &Grid<T>) -> Self {
        StatusGrid {
            grid: like.par_map(|_, _| MarchState::Unvisited),
        }
    }

    /// Classify every cell of `phi` in parallel.
    ///
    /// `classify` receives the flat index and the current field value.
    pub fn from_partition<F>(phi: &Grid<f64>, classify: F) -> Self
    where
        F: Fn(usize, f64) -> MarchState + Sync + Send,
    {
        StatusGrid {
            grid: phi.par_map(|idx, &v| classify(idx, v)),
        }
    }

    /// The underlying grid of states.
    pub fn grid(&self) -> &Grid<MarchState> {
        &self.grid
    }

    /// State of a cell.
    #[inline]
    pub fn state(&self, cell: Cell) -> MarchState {
        self.grid.get(cell)
    }

    /// State at a flat index.
    #[inline]
    pub fn state_at(&self, index: usize) -> MarchState {
        self.grid.at(index)
    }

    /// Set the state of a cell.
    #[inline]
    pub fn mark(&mut self, cell: Cell, state: MarchState) {
        self.grid.set(cell, state);
    }

    /// Set the state at a flat index.
    #[inline]
    pub fn mark_at(&mut self, index: usize, state: MarchState) {
        self.grid.set_at(index, state);
    }

    /// Whether the cell is frozen.
    #[inline]
    pub fn is_frozen(&self, cell: Cell) -> bool {
        self.state(cell) == MarchState::Frozen
    }

    /// Number of cells currently in `state`.
    pub fn count(&self, state: MarchState) -> usize {
        self.grid.as_slice().iter().filter(|&&s| s == state).count()
    }
}
