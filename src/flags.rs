// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::core::{Cell, Grid};
use crate::error::Result;

/// Cell contains fluid.
pub const FLUID: i32 = 1;
/// Cell is a solid obstacle.
pub const OBSTACLE: i32 = 2;
/// Cell is empty (air).
pub const EMPTY: i32 = 4;
/// Cell is an inflow source.
pub const INFLOW: i32 = 8;
/// Cell is an outflow sink.
pub const OUTFLOW: i32 = 16;

/// Read-only per-cell classification queries used for seeding and transport.
pub trait CellFlags {
    /// Raw flag bits at a flat index.
    fn bits(&self, index: usize) -> i32;

    /// Whether any bit of `mask` is set at `index`.
    fn matches(&self, index: usize, mask: i32) -> bool {
        self.bits(index) & mask != 0
    }

    /// Whether the cell holds fluid.
    fn is_fluid(&self, index: usize) -> bool {
        self.matches(index, FLUID)
    }

    /// Whether the cell is an obstacle.
    fn is_obstacle(&self, index: usize) -> bool {
        self.matches(index, OBSTACLE)
    }

    /// Whether the cell is empty.
    fn is_empty(&self, index: usize) -> bool {
        self.matches(index, EMPTY)
    }

    /// Whether the cell is an inflow cell.
    fn is_inflow(&self, index: usize) -> bool {
        self.matches(index, INFLOW)
    }

    /// Whether the cell is an outflow cell.
    fn is_outflow(&self, index: usize) -> bool {
        self.matches(index, OUTFLOW)
    }
}

/// A classification grid storing flag bits per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagGrid {
    grid: Grid<i32>,
}

impl FlagGrid {
    /// Create a flag grid with every cell marked `EMPTY`.
    ///
    /// # Errors
    /// Returns an error if the shape is invalid.
    pub fn new(size: [usize; 3], is_3d: bool) -> Result<Self> {
        Ok(FlagGrid {
            grid: Grid::new(size, is_3d, EMPTY)?,
        })
    }

    /// Wrap an existing grid of flag bits.
    pub fn from_grid(grid: Grid<i32>) -> Self {
        FlagGrid { grid }
    }

    /// The underlying grid of flag bits.
    pub fn grid(&self) -> &Grid<i32> {
        &self.grid
    }

    /// Overwrite the flag bits of one cell.
    pub fn set(&mut self, cell: Cell, bits: i32) {
        self.grid.set(cell, bits);
    }

    /// Flag bits of one cell.
    pub fn get(&self, cell: Cell) -> i32 {
        self.grid.get(cell)
    }

    /// Set every cell on the outer layer of the domain to `bits`.
    pub fn fill_border(&mut self, bits: i32) {
        for idx in 0..self.grid.num_cells() {
            let cell = self.grid.cell(idx);
            if !self.grid.is_interior(cell, 1) {
                self.grid.set_at(idx, bits);
            }
        }
    }
}

impl CellFlags for FlagGrid {
    #[inline]
    fn bits(&self, index: usize) -> i32 {
        self.grid.at(index)
    }
}
