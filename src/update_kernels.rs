// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::core::{Cell, Direction, Grid};
use crate::error::{EikonalError, Result};
use crate::status::StatusGrid;

/// Distance estimate for a single cell plus its transport weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// New signed distance value for the cell.
    pub distance: f64,
    /// Interpolation weights ordered `+x, -x, +y, -y, +z, -z`; they are
    /// non-negative, sum to one, and are non-zero only for frozen neighbors.
    pub weights: [f64; 6],
}

/// Unit step away from a single resolved neighbor value.
#[inline]
pub fn solve_1d(v: f64, sign: f64) -> f64 {
    v + sign
}

/// Solve `(u-p)^2 + (u-q)^2 = 1` for two resolved neighbor values.
///
/// The radicand is clamped at zero, which degrades gracefully to the mean of
/// `p` and `q` when the neighbors differ by more than `sqrt(2)`.
#[inline]
pub fn solve_2d(p: f64, q: f64, sign: f64) -> f64 {
    let diff = q - p;
    let radicand = (2.0 - diff * diff).max(0.0);
    0.5 * (p + q + sign * radicand.sqrt())
}

/// Solve `(u-a)^2 + (u-b)^2 + (u-c)^2 = 1` for three resolved neighbor values.
///
/// The radicand is clamped at zero.
#[inline]
pub fn solve_3d(a: f64, b: f64, c: f64, sign: f64) -> f64 {
    let radicand = (3.0 - 2.0 * (a * a + b * b - b * c + c * c - a * (b + c))).max(0.0);
    (a + b + c + sign * radicand.sqrt()) / 3.0
}

fn frozen_value(
    phi: &Grid<f64>,
    status: &StatusGrid,
    cell: Cell,
    axis: usize,
    positive: bool,
) -> Option<f64> {
    phi.neighbor(cell, axis, positive)
        .filter(|&n| status.is_frozen(n))
        .map(|n| phi.get(n))
}

/// Compute a new distance estimate for `cell` from its frozen neighbors.
///
/// Per axis the `+` neighbor is taken if frozen, otherwise the `-` neighbor,
/// otherwise the axis stays unresolved. The z axis of a 2D grid is always
/// unresolved.
///
/// # Errors
/// Returns `UnresolvedCell` if no axis has a frozen neighbor.
pub fn calculate_distance(
    phi: &Grid<f64>,
    status: &StatusGrid,
    cell: Cell,
    dir: Direction,
) -> Result<Solution> {
    let mut weights = [0.0; 6];
    let mut axis_value: [Option<f64>; 3] = [None; 3];
    let mut values = [0.0; 3];
    let mut resolved = 0;

    for axis in 0..phi.dims() {
        let hit = if let Some(v) = frozen_value(phi, status, cell, axis, true) {
            weights[2 * axis] = 1.0;
            Some(v)
        } else if let Some(v) = frozen_value(phi, status, cell, axis, false) {
            weights[2 * axis + 1] = 1.0;
            Some(v)
        } else {
            None
        };
        if let Some(v) = hit {
            values[resolved] = v;
            resolved += 1;
        }
        axis_value[axis] = hit;
    }

    let sign = dir.sign();
    let distance = match resolved {
        3 => solve_3d(values[0], values[1], values[2], sign),
        2 => solve_2d(values[0], values[1], sign),
        1 => solve_1d(values[0], sign),
        _ => return Err(EikonalError::UnresolvedCell { cell }),
    };

    if resolved > 1 {
        let indicator = weights;
        for (axis, value) in axis_value.iter().enumerate() {
            if let Some(v) = value {
                let scale = (distance - v).abs();
                weights[2 * axis] *= scale;
                weights[2 * axis + 1] *= scale;
            }
        }
        let norm: f64 = weights.iter().sum();
        if norm > 0.0 {
            weights.iter_mut().for_each(|w| *w /= norm);
        } else {
            // distance coincides with every neighbor value
            weights = indicator.map(|w| w / resolved as f64);
        }
    }

    Ok(Solution { distance, weights })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::MarchState;

    #[test]
    fn solve_2d_known_case() {
        let u = solve_2d(0.0, 0.0, 1.0);
        assert!((u - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        let u = solve_2d(0.0, 0.0, -1.0);
        assert!((u + std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn solve_2d_clamps_negative_radicand() {
        // (q - p)^2 = 25 > 2, radicand clamps to zero
        let u = solve_2d(0.0, 5.0, 1.0);
        assert!((u - 2.5).abs() < 1e-12);
        assert!(!u.is_nan());
    }

    #[test]
    fn solve_3d_known_case() {
        let u = solve_3d(0.0, 0.0, 0.0, 1.0);
        assert!((u - 1.0 / 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn solve_3d_reproduces_plane() {
        // phi = x + 0.5 sampled around x = 0: neighbors in y and z sit at 0.5 too
        let u = solve_3d(-0.5, 0.5, 0.5, 1.0);
        assert!((u - 0.5).abs() < 1e-12);
    }

    #[test]
    fn solve_3d_clamps_negative_radicand() {
        let u = solve_3d(0.0, 10.0, -10.0, 1.0);
        assert!(!u.is_nan());
        assert!((u - 0.0).abs() < 1e-12);
    }

    #[test]
    fn solve_1d_steps_by_sign() {
        assert_eq!(solve_1d(0.25, 1.0), 1.25);
        assert_eq!(solve_1d(0.25, -1.0), -0.75);
    }

    fn grid_3d() -> (Grid<f64>, StatusGrid) {
        let phi = Grid::new([3, 3, 3], true, 0.0).unwrap();
        let status = StatusGrid::for_grid(&phi);
        (phi, status)
    }

    #[test]
    fn single_frozen_neighbor_is_1d_update() {
        let (mut phi, mut status) = grid_3d();
        phi.set([1, 1, 0], 0.3);
        status.mark([1, 1, 0], MarchState::Frozen);
        let sol = calculate_distance(&phi, &status, [1, 1, 1], Direction::Outward).unwrap();
        assert!((sol.distance - 1.3).abs() < 1e-12);
        assert_eq!(sol.weights, [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn plus_neighbor_preferred_over_minus() {
        let (mut phi, mut status) = grid_3d();
        phi.set([2, 1, 1], -0.2);
        phi.set([0, 1, 1], -0.9);
        status.mark([2, 1, 1], MarchState::Frozen);
        status.mark([0, 1, 1], MarchState::Frozen);
        let sol = calculate_distance(&phi, &status, [1, 1, 1], Direction::Inward).unwrap();
        assert!((sol.distance + 1.2).abs() < 1e-12);
        assert_eq!(sol.weights[0], 1.0);
        assert_eq!(sol.weights[1], 0.0);
    }

    #[test]
    fn two_axes_share_weight_evenly_when_symmetric() {
        let (mut phi, mut status) = grid_3d();
        status.mark([2, 1, 1], MarchState::Frozen);
        status.mark([1, 0, 1], MarchState::Frozen);
        phi.set([2, 1, 1], 0.0);
        phi.set([1, 0, 1], 0.0);
        let sol = calculate_distance(&phi, &status, [1, 1, 1], Direction::Outward).unwrap();
        assert!((sol.distance - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((sol.weights[0] - 0.5).abs() < 1e-12);
        assert!((sol.weights[3] - 0.5).abs() < 1e-12);
        let sum: f64 = sol.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weights_are_convex_for_three_axes() {
        let (mut phi, mut status) = grid_3d();
        for (cell, v) in [([0, 1, 1], 0.1), ([1, 2, 1], 0.4), ([1, 1, 2], 0.7)] {
            phi.set(cell, v);
            status.mark(cell, MarchState::Frozen);
        }
        let sol = calculate_distance(&phi, &status, [1, 1, 1], Direction::Outward).unwrap();
        let sum: f64 = sol.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(sol.weights.iter().all(|&w| w >= 0.0));
        assert!(sol.distance > 0.7);
    }

    #[test]
    fn two_d_grid_never_reads_z() {
        let mut phi = Grid::new([3, 3, 1], false, 0.0).unwrap();
        let mut status = StatusGrid::for_grid(&phi);
        phi.set([1, 2, 0], 0.5);
        status.mark([1, 2, 0], MarchState::Frozen);
        let sol = calculate_distance(&phi, &status, [1, 1, 0], Direction::Outward).unwrap();
        assert!((sol.distance - 1.5).abs() < 1e-12);
        assert_eq!(sol.weights[4], 0.0);
        assert_eq!(sol.weights[5], 0.0);
    }

    #[test]
    fn active_and_held_neighbors_do_not_resolve() {
        let (phi, mut status) = grid_3d();
        status.mark([0, 1, 1], MarchState::Active);
        status.mark([2, 1, 1], MarchState::Held);
        let result = calculate_distance(&phi, &status, [1, 1, 1], Direction::Outward);
        assert!(matches!(
            result,
            Err(EikonalError::UnresolvedCell { cell: [1, 1, 1] })
        ));
    }
}
