// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Layer-by-layer extrapolation. Much cheaper than a Fast Marching sweep but
//! does not produce true distances: each new layer is just the mean of the
//! layer before it.

use tracing::debug;

use crate::boundary::apply_neumann_boundary;
use crate::core::{Grid, Vec3};
use crate::error::Result;
use crate::flags::{CellFlags, FlagGrid};
use crate::reinit::validate_band_width;

/// Tag unknown interior cells touching layer `d` with `d + 1`, for `d` in
/// `first..=last`. `assign` receives the flat index of each newly tagged cell
/// and the flat indices of its layer-`d` neighbors.
fn grow_layers<F>(tags: &mut Grid<u32>, first: u32, last: u32, mut assign: F) -> usize
where
    F: FnMut(usize, &[usize]),
{
    let mut grown = 0;
    let mut known = Vec::with_capacity(6);
    for d in first..=last {
        let mut next = Vec::new();
        for idx in 0..tags.num_cells() {
            if tags.at(idx) != 0 {
                continue;
            }
            let cell = tags.cell(idx);
            if !tags.is_interior(cell, 1) {
                continue;
            }
            known.clear();
            known.extend(
                tags.neighbors(cell)
                    .map(|n| tags.index(n))
                    .filter(|&n| tags.at(n) == d),
            );
            if !known.is_empty() {
                assign(idx, &known);
                next.push(idx);
            }
        }
        if next.is_empty() {
            break;
        }
        grown += next.len();
        for idx in next {
            tags.set_at(idx, d + 1);
        }
    }
    grown
}

/// Extrapolate a level set away from one side of the interface.
///
/// With `inside == false` the negative region is kept and values grow by one
/// per layer into the positive region; `inside == true` mirrors this. The
/// first layer past the interface keeps its value, `distance - 1` further
/// layers are filled, and every other interior cell on that side is set to
/// `±(distance + 1)`. Boundary cells are left alone. Returns the number of
/// cells written.
pub fn extrapolate_levelset_simple(phi: &mut Grid<f64>, distance: u32, inside: bool) -> usize {
    let dir = if inside { -1.0 } else { 1.0 };
    let mut tags =
        phi.par_map(|idx, &v| u32::from(v * dir < 0.0 && phi.is_interior(phi.cell(idx), 1)));

    // the layer touching the interface keeps its value
    grow_layers(&mut tags, 1, 1, |_, _| {});

    let mut written = grow_layers(&mut tags, 2, distance, |idx, known| {
        let sum: f64 = known.iter().map(|&n| phi.at(n)).sum();
        phi.set_at(idx, sum / known.len() as f64 + dir);
    });

    let cap = dir * (f64::from(distance) + 1.0);
    for idx in 0..phi.num_cells() {
        if tags.at(idx) == 0 && phi.is_interior(phi.cell(idx), 1) {
            phi.set_at(idx, cap);
            written += 1;
        }
    }
    debug!(distance, inside, written, "level set extrapolated");
    written
}

/// Extrapolate a MAC vector field from fluid cells into the rest of the grid.
///
/// Per component `a`, a face is known if its cell or the cell's `-a` neighbor
/// is fluid. Up to `distance` layers of unknown faces are filled with the
/// mean of the known faces next to them. Returns the number of components
/// written.
pub fn extrapolate_vec_simple<F>(flags: &F, vel: &mut Grid<Vec3>, distance: u32) -> usize
where
    F: CellFlags + Sync,
{
    let mut written = 0;
    for axis in 0..vel.dims() {
        let mut tags = vel.par_map(|idx, _| {
            let below = vel.neighbor(vel.cell(idx), axis, false);
            let known = flags.is_fluid(idx) || below.is_some_and(|n| flags.is_fluid(vel.index(n)));
            u32::from(known)
        });
        written += grow_layers(&mut tags, 1, distance, |idx, known| {
            let sum: f64 = known.iter().map(|&n| vel.at(n)[axis]).sum();
            let mut v = vel.at(idx);
            v[axis] = sum / known.len() as f64;
            vel.set_at(idx, v);
        });
    }
    debug!(distance, written, "vector field extrapolated");
    written
}

/// Cheap stand-in for [`crate::reinit::Reinitializer::run`]: extrapolate
/// `phi` on both sides of the interface, extrapolate `vel` from the fluid
/// cells if given, then copy the last interior layer onto the boundary.
///
/// The band width is rounded up to whole layers. Returns the number of cells
/// and components written.
///
/// # Errors
/// Returns `InvalidBandWidth` or `ShapeMismatch` before touching any grid.
pub fn extrapolate_simple(
    phi: &mut Grid<f64>,
    flags: &FlagGrid,
    band_width: f64,
    vel: Option<&mut Grid<Vec3>>,
) -> Result<usize> {
    validate_band_width(band_width)?;
    phi.check_extent(flags.grid())?;
    if let Some(v) = vel.as_deref() {
        phi.check_extent(v)?;
    }

    let distance = band_width.ceil() as u32;
    let mut written = extrapolate_levelset_simple(phi, distance, false);
    written += extrapolate_levelset_simple(phi, distance, true);
    apply_neumann_boundary(phi, None);
    if let Some(v) = vel {
        written += extrapolate_vec_simple(flags, v, distance);
        apply_neumann_boundary(v, None);
    }
    Ok(written)
}
