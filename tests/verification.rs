// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use eikonal_fmm::core::{Grid, Vec3};
use eikonal_fmm::flags::{FlagGrid, FLUID, OBSTACLE};
use eikonal_fmm::reinit::{reinitialize, Reinitializer};

fn field_2d(nx: usize, ny: usize, f: impl Fn(f64, f64) -> f64) -> Grid<f64> {
    let mut grid = Grid::new([nx, ny, 1], false, 0.0).unwrap();
    for idx in 0..grid.num_cells() {
        let [x, y, _] = grid.cell(idx);
        grid.set_at(idx, f(x as f64, y as f64));
    }
    grid
}

fn field_3d(size: [usize; 3], f: impl Fn(f64, f64, f64) -> f64) -> Grid<f64> {
    let mut grid = Grid::new(size, true, 0.0).unwrap();
    for idx in 0..grid.num_cells() {
        let [x, y, z] = grid.cell(idx);
        grid.set_at(idx, f(x as f64, y as f64, z as f64));
    }
    grid
}

fn empty_flags<T>(like: &Grid<T>) -> FlagGrid {
    FlagGrid::new(like.size(), like.is_3d()).unwrap()
}

fn run(phi: &mut Grid<f64>, band_width: f64) {
    let flags = empty_flags(phi);
    Reinitializer::new(band_width)
        .unwrap()
        .run(phi, &flags, None)
        .unwrap();
}

/// Test 1: Plane (3D)
/// phi = x - 4.5 is already a signed distance field; every cell inside the
/// band must come back unchanged.
#[test]
fn plane_3d_is_idempotent_inside_band() {
    let band_width = 3.0;
    let mut phi = field_3d([10, 6, 6], |x, _, _| x - 4.5);
    let before = phi.clone();
    run(&mut phi, band_width);

    for idx in 0..phi.num_cells() {
        let expected = before.at(idx);
        if expected.abs() <= band_width {
            assert!(
                (phi.at(idx) - expected).abs() < 1e-9,
                "cell {:?}: {} vs {}",
                phi.cell(idx),
                phi.at(idx),
                expected
            );
        }
    }
}

/// Test 2: Strip (1D on a 2D grid)
/// A single sign change at index 4; distances grow monotonically away from
/// it and saturate at the sentinel.
#[test]
fn strip_distances_grow_away_from_interface() {
    let mut phi = field_2d(12, 1, |x, _| if x < 4.0 { -1.0 } else { 1.0 });
    run(&mut phi, 3.0);

    let values: Vec<f64> = phi.as_slice().to_vec();
    let expected = [-2.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0, 4.0, 4.0];
    for (x, (&v, &e)) in values.iter().zip(&expected).enumerate() {
        assert!((v - e).abs() < 1e-12, "x={}: {} vs {}", x, v, e);
    }
    for x in 5..12 {
        assert!(values[x].abs() >= values[x - 1].abs());
    }
    for x in (0..3).rev() {
        assert!(values[x].abs() >= values[x + 1].abs());
    }
}

/// Test 3: Sign and sentinel (2D circle)
/// Cells well beyond the band carry exactly +-(band_width + 1); cells away
/// from the interface keep their sign.
#[test]
fn circle_2d_sign_and_sentinel() {
    let band_width = 2.0;
    let sentinel = band_width + 1.0;
    let input = field_2d(24, 24, |x, y| ((x - 11.5).powi(2) + (y - 11.5).powi(2)).sqrt() - 5.0);
    let mut phi = input.clone();
    run(&mut phi, band_width);

    let mut far = 0;
    for idx in 0..phi.num_cells() {
        if !phi.is_interior(phi.cell(idx), 1) {
            continue;
        }
        let (before, after) = (input.at(idx), phi.at(idx));
        assert!(after.is_finite());
        if before.abs() >= 0.5 {
            assert_eq!(before.signum(), after.signum(), "cell {:?}", phi.cell(idx));
        }
        if before.abs() > band_width + 2.0 {
            assert_eq!(after, sentinel.copysign(before), "cell {:?}", phi.cell(idx));
            far += 1;
        }
        assert!(after.abs() <= sentinel);
    }
    assert!(far > 0);
}

/// Test 4: Boundary finisher
/// Every face cell equals its interior neighbor after reinitialization.
#[test]
fn boundary_matches_interior_neighbor() {
    let (nx, ny) = (16, 13);
    let mut phi = field_2d(nx, ny, |x, y| ((x - 7.0).powi(2) + (y - 6.0).powi(2)).sqrt() - 4.0);
    run(&mut phi, 2.5);

    for x in 0..nx {
        assert_eq!(phi.get([x, 0, 0]), phi.get([x, 1, 0]));
        assert_eq!(phi.get([x, ny - 1, 0]), phi.get([x, ny - 2, 0]));
    }
    for y in 1..ny - 1 {
        assert_eq!(phi.get([0, y, 0]), phi.get([1, y, 0]));
        assert_eq!(phi.get([nx - 1, y, 0]), phi.get([nx - 2, y, 0]));
    }
}

/// Test 5: Square block (2D)
/// A 3x3 positive block inside a negative field; distances inside the block
/// follow the exact two-axis solves and the result is symmetric.
#[test]
fn square_block_is_symmetric() {
    let n = 9;
    let mut phi = field_2d(n, n, |x, y| {
        if (3.0..=5.0).contains(&x) && (3.0..=5.0).contains(&y) {
            1.0
        } else {
            -1.0
        }
    });
    run(&mut phi, 2.0);

    let corner = 0.5 * SQRT_2;
    let edge = 0.5 * (corner + (2.0 - corner * corner).sqrt());
    let center = edge + FRAC_1_SQRT_2;
    for cell in [[3, 3, 0], [5, 3, 0], [3, 5, 0], [5, 5, 0]] {
        assert!((phi.get(cell) - corner).abs() < 1e-12, "{:?}", cell);
    }
    for cell in [[4, 3, 0], [3, 4, 0], [5, 4, 0], [4, 5, 0]] {
        assert!((phi.get(cell) - edge).abs() < 1e-12, "{:?}", cell);
    }
    assert!((phi.get([4, 4, 0]) - center).abs() < 1e-12);

    for x in 0..n {
        for y in 0..n {
            let v = phi.get([x, y, 0]);
            assert!((v - phi.get([n - 1 - x, y, 0])).abs() < 1e-9);
            assert!((v - phi.get([y, x, 0])).abs() < 1e-9);
        }
    }
    // the ring touching the block sits on the interface
    assert_eq!(phi.get([2, 4, 0]), 0.0);
    assert!(phi.get([1, 1, 0]) < -2.0);
}

/// Test 6: Obstacles
/// With obstacles ignored their values survive untouched, and cells away
/// from them still reproduce the plane.
#[test]
fn ignored_obstacles_are_untouched() {
    let input = field_2d(10, 10, |x, _| x - 4.5);
    let mut flags = empty_flags(&input);
    let mut phi = input.clone();
    let obstacles = [[6, 4, 0], [7, 4, 0], [6, 5, 0], [7, 5, 0], [2, 2, 0]];
    for cell in obstacles {
        flags.set(cell, OBSTACLE);
        phi.set(cell, if cell[0] == 2 { 7.0 } else { 42.0 });
    }
    let marked = phi.clone();

    let report = Reinitializer::new(3.0)
        .unwrap()
        .with_ignore_obstacles(true)
        .run(&mut phi, &flags, None)
        .unwrap();
    assert!(report.outward.frozen > 0);
    for cell in obstacles {
        assert_eq!(phi.get(cell), marked.get(cell), "{:?}", cell);
    }
    for y in [1, 8] {
        for x in 2..8 {
            assert!((phi.get([x, y, 0]) - input.get([x, y, 0])).abs() < 1e-9);
        }
    }
    assert!(phi.as_slice().iter().all(|v| v.is_finite()));

    // without the option the obstacle values are overwritten
    let mut phi = marked.clone();
    reinitialize(&mut phi, &flags, 3.0, None, false, false, OBSTACLE).unwrap();
    assert_ne!(phi.get([2, 2, 0]), 7.0);
}

fn transport_setup(y_component: impl Fn(usize) -> f64) -> (Grid<f64>, FlagGrid, Grid<Vec3>) {
    let phi = field_2d(10, 10, |x, _| x - 4.5);
    let mut flags = empty_flags(&phi);
    let mut vel = Grid::new([10, 10, 1], false, [-100.0, -100.0, 0.0]).unwrap();
    for y in 0..10 {
        for x in 0..5 {
            flags.set([x, y, 0], FLUID);
            vel.set([x, y, 0], [1.0, y_component(y), 0.0]);
        }
        // the face shared with the fluid already carries a velocity
        vel.set([5, y, 0], [1.0, -100.0, 0.0]);
    }
    (phi, flags, vel)
}

/// Test 7: Vector transport
/// A uniform fluid velocity is carried unchanged into every band cell.
#[test]
fn uniform_velocity_is_transported() {
    let (mut phi, flags, mut vel) = transport_setup(|_| 2.0);
    let report = Reinitializer::new(3.0)
        .unwrap()
        .run(&mut phi, &flags, Some(&mut vel))
        .unwrap();
    assert!(report.outward.transported > 0);
    assert_eq!(report.inward.transported, 0);

    for x in 5..9 {
        for y in 1..9 {
            let v = vel.get([x, y, 0]);
            assert!((v[0] - 1.0).abs() < 1e-12, "({}, {}): {:?}", x, y, v);
            assert!((v[1] - 2.0).abs() < 1e-12, "({}, {}): {:?}", x, y, v);
            assert_eq!(v[2], 0.0);
        }
    }
    assert_eq!(vel.get([2, 4, 0]), [1.0, 2.0, 0.0]);
}

/// Test 8: Vector transport follows characteristics
/// Along a plane the distance gradient is x, so each band cell copies the
/// velocity of the fluid cell in its own row.
#[test]
fn transport_follows_distance_gradient() {
    let (mut phi, flags, mut vel) = transport_setup(|y| y as f64);
    Reinitializer::new(3.0)
        .unwrap()
        .run(&mut phi, &flags, Some(&mut vel))
        .unwrap();
    for x in 5..9 {
        for y in 1..9 {
            let v = vel.get([x, y, 0]);
            assert!((v[1] - y as f64).abs() < 1e-12, "({}, {}): {:?}", x, y, v);
            assert!((0.0..=9.0).contains(&v[1]));
        }
    }
}

/// Test 9: Circle accuracy (2D)
/// Close to the interface the result stays within half a cell of the exact
/// distance.
#[test]
fn circle_2d_accuracy_near_interface() {
    let input = field_2d(32, 32, |x, y| ((x - 15.5).powi(2) + (y - 15.5).powi(2)).sqrt() - 8.0);
    let mut phi = input.clone();
    run(&mut phi, 4.0);

    let mut max_err = 0.0_f64;
    for idx in 0..phi.num_cells() {
        if phi.is_interior(phi.cell(idx), 1) && input.at(idx).abs() <= 3.0 {
            max_err = max_err.max((phi.at(idx) - input.at(idx)).abs());
        }
    }
    assert!(max_err < 0.5, "max error = {}", max_err);
}

/// Test 10: Sphere accuracy (3D)
#[test]
fn sphere_3d_accuracy_near_interface() {
    let input = field_3d([20, 20, 20], |x, y, z| {
        ((x - 9.5).powi(2) + (y - 9.5).powi(2) + (z - 9.5).powi(2)).sqrt() - 5.0
    });
    let mut phi = input.clone();
    run(&mut phi, 3.0);

    let mut max_err = 0.0_f64;
    for idx in 0..phi.num_cells() {
        if !phi.is_interior(phi.cell(idx), 1) {
            continue;
        }
        let (before, after) = (input.at(idx), phi.at(idx));
        assert!(after.is_finite());
        if before.abs() >= 0.5 {
            assert_eq!(before.signum(), after.signum());
        }
        if before.abs() <= 2.0 {
            max_err = max_err.max((after - before).abs());
        }
    }
    assert!(max_err < 0.75, "max error = {}", max_err);
}

/// Test 11: Free function and builder agree
#[test]
fn free_function_matches_builder() {
    let input = field_2d(20, 15, |x, y| ((x - 9.0).powi(2) + (y - 7.0).powi(2)).sqrt() - 4.5);
    let flags = empty_flags(&input);

    let mut a = input.clone();
    let report_a = reinitialize(&mut a, &flags, 3.0, None, false, true, OBSTACLE).unwrap();

    let mut b = input.clone();
    let report_b = Reinitializer::new(3.0)
        .unwrap()
        .with_preserve_interface(true)
        .run(&mut b, &flags, None)
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(report_a, report_b);
    assert!(report_a.preserved_interface > 0);
}

/// Test 12: Interface touching the domain wall
/// Liquid along the x = 0 wall with a bulge at rows 3..=5. The inside wall
/// cells are never marched, so they must not feed the outward sweep; every
/// interior cell keeps its sign in both seeding modes.
#[test]
fn interface_touching_wall_keeps_signs() {
    let band_width = 3.0;
    let input = field_2d(8, 8, |x, y| {
        if (3.0..=5.0).contains(&y) {
            x - 1.5
        } else {
            x - 0.5
        }
    });
    let flags = empty_flags(&input);

    for preserve in [false, true] {
        let mut phi = input.clone();
        let report = Reinitializer::new(band_width)
            .unwrap()
            .with_preserve_interface(preserve)
            .run(&mut phi, &flags, None)
            .unwrap();
        assert!(report.unreached_inside > 0);

        for idx in 0..phi.num_cells() {
            let cell = phi.cell(idx);
            if !phi.is_interior(cell, 1) {
                continue;
            }
            let (before, after) = (input.at(idx), phi.at(idx));
            assert!(after.is_finite());
            assert!(after.abs() <= band_width + 1.0, "{:?}: {}", cell, after);
            if before > 0.0 {
                assert!(after > 0.0, "preserve={} {:?}: {} -> {}", preserve, cell, before, after);
            } else {
                assert!(after < 0.0, "preserve={} {:?}: {} -> {}", preserve, cell, before, after);
            }
        }
        // the wall column copies its interior neighbor
        for y in 1..7 {
            assert_eq!(phi.get([0, y, 0]), phi.get([1, y, 0]));
        }
    }
}
