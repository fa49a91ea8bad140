// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::core::Grid;
use crate::status::{MarchState, StatusGrid};

/// Copy the last interior layer onto the outer boundary (zero gradient).
///
/// Axes are processed in order x, y, z (z only for 3D grids); axes thinner
/// than three cells have no interior layer and are skipped. Cells marked
/// `Held` in `held` keep their value. Returns the number of cells written.
pub fn apply_neumann_boundary<T: Copy>(grid: &mut Grid<T>, held: Option<&StatusGrid>) -> usize {
    let size = grid.size();
    let mut written = 0;
    for axis in 0..grid.dims() {
        let n = size[axis];
        if n < 3 {
            continue;
        }
        for idx in 0..grid.num_cells() {
            let cell = grid.cell(idx);
            let mut src = cell;
            if cell[axis] == 0 {
                src[axis] = 1;
            } else if cell[axis] == n - 1 {
                src[axis] = n - 2;
            } else {
                continue;
            }
            if held.is_some_and(|s| s.state_at(idx) == MarchState::Held) {
                continue;
            }
            let value = grid.get(src);
            grid.set_at(idx, value);
            written += 1;
        }
    }
    written
}
