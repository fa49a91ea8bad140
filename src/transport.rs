// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::core::{Cell, Grid, Vec3};
use crate::flags::CellFlags;

/// Carries an auxiliary MAC vector field into newly frozen cells.
///
/// Component `a` of a cell lives on the face shared with its `-a` neighbor,
/// so it is only written while that neighbor is still classified empty.
/// Components next to fluid keep the value the simulation assigned.
pub struct Transport<'a, F: CellFlags> {
    flags: &'a F,
    field: &'a mut Grid<Vec3>,
}

impl<'a, F: CellFlags> Transport<'a, F> {
    /// Attach a vector field and the classification grid gating it.
    pub fn new(flags: &'a F, field: &'a mut Grid<Vec3>) -> Self {
        Transport { flags, field }
    }

    /// Weighted combination of the six axis neighbors of `cell`.
    fn interpolate(&self, cell: Cell, weights: &[f64; 6]) -> Vec3 {
        let mut value = [0.0; 3];
        for axis in 0..self.field.dims() {
            for (slot, positive) in [(2 * axis, true), (2 * axis + 1, false)] {
                let w = weights[slot];
                if w == 0.0 {
                    continue;
                }
                if let Some(n) = self.field.neighbor(cell, axis, positive) {
                    let nv = self.field.get(n);
                    for (acc, c) in value.iter_mut().zip(nv) {
                        *acc += w * c;
                    }
                }
            }
        }
        value
    }

    /// Write interpolated components into `cell`. Returns how many
    /// components were assigned.
    pub fn transport(&mut self, cell: Cell, weights: &[f64; 6]) -> usize {
        let value = self.interpolate(cell, weights);
        let mut current = self.field.get(cell);
        let mut written = 0;
        for axis in 0..self.field.dims() {
            let Some(n) = self.field.neighbor(cell, axis, false) else {
                continue;
            };
            if self.flags.is_empty(self.field.index(n)) {
                current[axis] = value[axis];
                written += 1;
            }
        }
        self.field.set(cell, current);
        written
    }
}
