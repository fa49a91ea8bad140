// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use tracing::{info, warn};

use crate::boundary::apply_neumann_boundary;
use crate::core::{Direction, Grid, Vec3};
use crate::error::{EikonalError, Result};
use crate::flags::{CellFlags, FlagGrid, OBSTACLE};
use crate::frontier::{FastMarch, SweepStats};
use crate::status::{MarchState, StatusGrid};

/// Lowest already-marched inside value used to seed the outward sweep.
const OUTWARD_SEED_FLOOR: f64 = -2.0;

/// Summary of one reinitialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReinitReport {
    /// Counters of the inward sweep.
    pub inward: SweepStats,
    /// Counters of the outward sweep.
    pub outward: SweepStats,
    /// Inside cells stamped with `-(band_width + 1)`.
    pub unreached_inside: usize,
    /// Outside cells stamped with `+(band_width + 1)`.
    pub unreached_outside: usize,
    /// Outside interface cells kept at their input value.
    pub preserved_interface: usize,
}

/// Reinitializes a level set into a signed distance field within a narrow
/// band, using two Fast Marching sweeps (inward, then outward).
#[derive(Debug, Clone, PartialEq)]
pub struct Reinitializer {
    band_width: f64,
    ignore_obstacles: bool,
    preserve_interface: bool,
    obstacle_mask: i32,
}

pub(crate) fn validate_band_width(band_width: f64) -> Result<()> {
    if !band_width.is_finite() || band_width <= 0.0 {
        return Err(EikonalError::InvalidBandWidth(band_width));
    }
    Ok(())
}

impl Reinitializer {
    /// Create a reinitializer computing distances up to `band_width` cells
    /// from the interface.
    ///
    /// # Errors
    /// Returns an error if `band_width` is not positive and finite.
    pub fn new(band_width: f64) -> Result<Self> {
        validate_band_width(band_width)?;
        Ok(Reinitializer {
            band_width,
            ignore_obstacles: false,
            preserve_interface: false,
            obstacle_mask: OBSTACLE,
        })
    }

    /// Hold cells matching the obstacle mask out of the march entirely
    /// (builder method). Held cells keep their input value.
    pub fn with_ignore_obstacles(mut self, ignore_obstacles: bool) -> Self {
        self.ignore_obstacles = ignore_obstacles;
        self
    }

    /// Keep the input values of outside cells at the interface instead of
    /// re-solving them from the inside (builder method).
    pub fn with_preserve_interface(mut self, preserve_interface: bool) -> Self {
        self.preserve_interface = preserve_interface;
        self
    }

    /// Flag bits treated as obstacles (builder method). Default is `OBSTACLE`.
    pub fn with_obstacle_mask(mut self, obstacle_mask: i32) -> Self {
        self.obstacle_mask = obstacle_mask;
        self
    }

    /// Narrow band width in cells.
    pub fn band_width(&self) -> f64 {
        self.band_width
    }

    /// Value written into cells the sweep never reached, before the sign.
    pub fn sentinel(&self) -> f64 {
        self.band_width + 1.0
    }

    fn is_held(&self, flags: &FlagGrid, idx: usize) -> bool {
        self.ignore_obstacles && flags.matches(idx, self.obstacle_mask)
    }

    /// Reinitialize `phi` in place, transporting `vel` into newly
    /// determined outside cells if given.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` before touching any grid if extents differ,
    /// and `UnresolvedCell` if a sweep breaks its invariant; in that case
    /// `phi` and `vel` are undefined.
    pub fn run(
        &self,
        phi: &mut Grid<f64>,
        flags: &FlagGrid,
        mut vel: Option<&mut Grid<Vec3>>,
    ) -> Result<ReinitReport> {
        phi.check_extent(flags.grid())?;
        if let Some(v) = vel.as_deref() {
            phi.check_extent(v)?;
        }

        let mut report = ReinitReport::default();
        let inside = phi.par_map(|_, &v| v < 0.0);

        // inward: march the negative region from the positive side
        let mut status = StatusGrid::from_partition(phi, |idx, v| {
            if self.is_held(flags, idx) {
                MarchState::Held
            } else if v < 0.0 {
                MarchState::Unvisited
            } else {
                MarchState::Frozen
            }
        });
        report.inward = run_single_direction_sweep(
            flags,
            &mut status,
            phi,
            self.band_width,
            Direction::Inward,
            None,
        )?;
        if report.inward.seeded == 0 {
            warn!("no interface found; inside cells are left at the sentinel value");
        }
        report.unreached_inside = stamp_unreached(phi, &mut status, -self.sentinel());

        // outward: the marched inside region is trusted from here on, the
        // capped inside cells are not
        let inward_status = status;
        let mut status = StatusGrid::from_partition(phi, |idx, _| {
            match inward_status.state_at(idx) {
                MarchState::Held => MarchState::Held,
                MarchState::Capped => MarchState::Capped,
                _ if inside.at(idx) => MarchState::Frozen,
                _ => MarchState::Unvisited,
            }
        });
        if self.preserve_interface {
            report.preserved_interface = freeze_outer_interface(phi, &mut status);
        }
        {
            let mut fm = FastMarch::new(phi, &mut status, Direction::Outward, self.band_width);
            if let Some(v) = vel.as_deref_mut() {
                fm = fm.with_transport(flags, v);
            }
            if self.preserve_interface {
                fm.seed_from_interface(|_| true)?;
            } else {
                fm.seed_from_interface(|v| v >= OUTWARD_SEED_FLOOR)?;
            }
            report.outward = fm.perform_marching()?;
        }
        report.unreached_outside = stamp_unreached(phi, &mut status, self.sentinel());

        apply_neumann_boundary(phi, Some(&status));
        if let Some(v) = vel {
            apply_neumann_boundary(v, Some(&status));
        }

        info!(
            band_width = self.band_width,
            inward_frozen = report.inward.frozen,
            outward_frozen = report.outward.frozen,
            unreached = report.unreached_inside + report.unreached_outside,
            transported = report.outward.transported,
            "level set reinitialized"
        );
        Ok(report)
    }
}

/// Mark every interior outside cell touching the frozen inside region as
/// frozen, keeping its current value. Returns the number of cells marked.
fn freeze_outer_interface(phi: &Grid<f64>, status: &mut StatusGrid) -> usize {
    let interface: Vec<usize> = (0..phi.num_cells())
        .filter(|&idx| {
            let cell = phi.cell(idx);
            status.state_at(idx) == MarchState::Unvisited
                && phi.is_interior(cell, 1)
                && phi.neighbors(cell).any(|n| status.is_frozen(n))
        })
        .collect();
    for &idx in &interface {
        status.mark_at(idx, MarchState::Frozen);
    }
    interface.len()
}

/// Overwrite every cell still `Unvisited` with `sentinel` and mark it
/// `Capped`.
fn stamp_unreached(phi: &mut Grid<f64>, status: &mut StatusGrid, sentinel: f64) -> usize {
    let mut stamped = 0;
    for (idx, v) in phi.as_slice_mut().iter_mut().enumerate() {
        if status.state_at(idx) == MarchState::Unvisited {
            *v = sentinel;
            status.mark_at(idx, MarchState::Capped);
            stamped += 1;
        }
    }
    stamped
}

/// Run one Fast Marching sweep on a caller-prepared status grid.
///
/// Frozen cells next to unvisited cells seed the frontier; marching stops
/// expanding once cells lie more than `band_width` from the interface.
/// Unreached cells keep their value and stay `Unvisited`.
///
/// # Errors
/// Returns an error on an invalid band width, mismatched extents, or a
/// broken marching invariant.
pub fn run_single_direction_sweep(
    flags: &FlagGrid,
    status: &mut StatusGrid,
    phi: &mut Grid<f64>,
    band_width: f64,
    dir: Direction,
    vel: Option<&mut Grid<Vec3>>,
) -> Result<SweepStats> {
    validate_band_width(band_width)?;
    phi.check_extent(flags.grid())?;
    phi.check_extent(status.grid())?;
    if let Some(v) = vel.as_deref() {
        phi.check_extent(v)?;
    }

    let mut fm = FastMarch::new(phi, status, dir, band_width);
    if let Some(v) = vel {
        fm = fm.with_transport(flags, v);
    }
    fm.seed_from_interface(|_| true)?;
    fm.perform_marching()
}

/// Reinitialize `phi` with a Fast Marching narrow band of `band_width`
/// cells. Shorthand for configuring a [`Reinitializer`].
///
/// # Errors
/// See [`Reinitializer::run`].
pub fn reinitialize(
    phi: &mut Grid<f64>,
    flags: &FlagGrid,
    band_width: f64,
    vel: Option<&mut Grid<Vec3>>,
    ignore_obstacles: bool,
    preserve_interface: bool,
    obstacle_mask: i32,
) -> Result<ReinitReport> {
    Reinitializer::new(band_width)?
        .with_ignore_obstacles(ignore_obstacles)
        .with_preserve_interface(preserve_interface)
        .with_obstacle_mask(obstacle_mask)
        .run(phi, flags, vel)
}
