// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use rayon::prelude::*;

use crate::error::{EikonalError, Result};

/// Integer cell coordinates `(x, y, z)`. 2D grids always use `z = 0`.
pub type Cell = [usize; 3];

/// Auxiliary per-cell vector value (MAC velocity components).
pub type Vec3 = [f64; 3];

/// March direction of a single Fast Marching sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// March into the negative (inside) region; distances decrease.
    Inward,
    /// March into the positive (outside) region; distances increase.
    Outward,
}

impl Direction {
    /// `-1` for inward marching, `+1` for outward marching.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Inward => -1.0,
            Direction::Outward => 1.0,
        }
    }
}

/// A dense structured grid of cell values.
///
/// Values are stored x-fastest, so the flat index of `(x, y, z)` is
/// `x + nx * (y + ny * z)`. All grids taking part in one reinitialization
/// must share the same extent and therefore the same indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    size: [usize; 3],
    strides: [usize; 3],
    is_3d: bool,
    values: Vec<T>,
}

fn validate_size(size: [usize; 3], is_3d: bool) -> Result<()> {
    for (axis, &n) in size.iter().enumerate() {
        if n == 0 {
            return Err(EikonalError::InvalidGridShape { axis, size: n });
        }
    }
    if !is_3d && size[2] != 1 {
        return Err(EikonalError::InvalidGridShape {
            axis: 2,
            size: size[2],
        });
    }
    Ok(())
}

impl<T: Clone> Grid<T> {
    /// Create a grid of `size = [nx, ny, nz]` cells filled with `fill`.
    ///
    /// # Errors
    /// Returns an error if any axis is empty or a 2D grid has `nz != 1`.
    pub fn new(size: [usize; 3], is_3d: bool, fill: T) -> Result<Self> {
        validate_size(size, is_3d)?;
        let num_cells = size.iter().product();
        Ok(Self::with_values(size, is_3d, vec![fill; num_cells]))
    }

    /// Fill every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }
}

impl<T> Grid<T> {
    /// Create a grid from values in flat-index order.
    ///
    /// # Errors
    /// Returns an error if the shape is invalid or the number of values does
    /// not match the number of cells.
    pub fn from_vec(size: [usize; 3], is_3d: bool, values: Vec<T>) -> Result<Self> {
        validate_size(size, is_3d)?;
        let num_cells: usize = size.iter().product();
        if values.len() != num_cells {
            return Err(EikonalError::ShapeMismatch {
                expected: size.to_vec(),
                got: vec![values.len()],
            });
        }
        Ok(Self::with_values(size, is_3d, values))
    }

    fn with_values(size: [usize; 3], is_3d: bool, values: Vec<T>) -> Self {
        let strides = [1, size[0], size[0] * size[1]];
        Grid {
            size,
            strides,
            is_3d,
            values,
        }
    }

    /// Number of cells along each axis.
    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Whether the z axis takes part in marching and boundary handling.
    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    /// Number of active axes (2 or 3).
    pub fn dims(&self) -> usize {
        if self.is_3d {
            3
        } else {
            2
        }
    }

    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        self.values.len()
    }

    /// Flat index of a cell.
    #[inline]
    pub fn index(&self, cell: Cell) -> usize {
        cell[0] * self.strides[0] + cell[1] * self.strides[1] + cell[2] * self.strides[2]
    }

    /// Cell coordinates of a flat index.
    #[inline]
    pub fn cell(&self, index: usize) -> Cell {
        let z = index / self.strides[2];
        let rem = index % self.strides[2];
        [rem % self.size[0], rem / self.size[0], z]
    }

    /// Whether `cell` keeps `margin` cells of distance to every face.
    ///
    /// Degenerate axes (a single cell thick) and the z axis of a 2D grid
    /// impose no constraint.
    pub fn is_interior(&self, cell: Cell, margin: usize) -> bool {
        (0..self.dims()).all(|axis| {
            let n = self.size[axis];
            n == 1 || (cell[axis] >= margin && cell[axis] + margin < n)
        })
    }

    /// The axis neighbor of `cell` on the `+` or `-` side, if it lies inside
    /// the grid.
    #[inline]
    pub fn neighbor(&self, cell: Cell, axis: usize, positive: bool) -> Option<Cell> {
        let mut n = cell;
        if positive {
            if cell[axis] + 1 >= self.size[axis] {
                return None;
            }
            n[axis] += 1;
        } else {
            if cell[axis] == 0 {
                return None;
            }
            n[axis] -= 1;
        }
        Some(n)
    }

    /// All in-bounds axis neighbors of `cell`, ordered `-x, +x, -y, +y, -z, +z`.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        (0..self.dims()).flat_map(move |axis| {
            [false, true]
                .into_iter()
                .filter_map(move |positive| self.neighbor(cell, axis, positive))
        })
    }

    /// Whether `other` has exactly the same extent and dimensionality.
    pub fn same_extent<U>(&self, other: &Grid<U>) -> bool {
        self.size == other.size && self.is_3d == other.is_3d
    }

    /// Reject `other` unless it shares this grid's extent.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` naming both extents.
    pub fn check_extent<U>(&self, other: &Grid<U>) -> Result<()> {
        if self.same_extent(other) {
            Ok(())
        } else {
            Err(EikonalError::ShapeMismatch {
                expected: self.size.to_vec(),
                got: other.size.to_vec(),
            })
        }
    }

    /// All values in flat-index order.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Mutable access to all values in flat-index order.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Consume the grid and return its values in flat-index order.
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    /// Build a grid of the same extent from `f(flat_index, value)`,
    /// evaluated in parallel.
    pub fn par_map<U, F>(&self, f: F) -> Grid<U>
    where
        T: Sync,
        U: Send,
        F: Fn(usize, &T) -> U + Sync + Send,
    {
        let values = self
            .values
            .par_iter()
            .enumerate()
            .map(|(idx, v)| f(idx, v))
            .collect();
        Grid::with_values(self.size, self.is_3d, values)
    }
}

impl<T: Copy> Grid<T> {
    /// Value at a cell.
    #[inline]
    pub fn get(&self, cell: Cell) -> T {
        self.values[self.index(cell)]
    }

    /// Overwrite the value at a cell.
    #[inline]
    pub fn set(&mut self, cell: Cell, value: T) {
        let idx = self.index(cell);
        self.values[idx] = value;
    }

    /// Value at a flat index.
    #[inline]
    pub fn at(&self, index: usize) -> T {
        self.values[index]
    }

    /// Overwrite the value at a flat index.
    #[inline]
    pub fn set_at(&mut self, index: usize, value: T) {
        self.values[index] = value;
    }
}
