// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::core::{Cell, Direction, Grid, Vec3};
use crate::error::Result;
use crate::flags::CellFlags;
use crate::status::{MarchState, StatusGrid};
use crate::transport::Transport;
use crate::update_kernels::calculate_distance;

/// Marching time of a field value: distance from the interface along the
/// march direction. Both directions pop the smallest time first.
#[inline]
fn to_marching_time(phi: f64, dir: Direction) -> f64 {
    phi * dir.sign()
}

/// Inverse of [`to_marching_time`].
#[inline]
fn from_marching_time(time: f64, dir: Direction) -> f64 {
    time * dir.sign()
}

/// A candidate cell on the frontier.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    cell: Cell,
    time: f64,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest entry: smallest time first, then the
        // highest z, y, x so equal times still pop in a fixed order.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| self.cell[2].cmp(&other.cell[2]))
            .then_with(|| self.cell[1].cmp(&other.cell[1]))
            .then_with(|| self.cell[0].cmp(&other.cell[0]))
    }
}

/// Counters collected over one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Cells inserted while seeding the frontier.
    pub seeded: usize,
    /// Cells finalized by the sweep.
    pub frozen: usize,
    /// Heap pushes, including improvements of active cells.
    pub pushes: usize,
    /// Superseded heap entries discarded on pop.
    pub stale_pops: usize,
    /// Vector components written by transport.
    pub transported: usize,
}

/// Single-direction Fast Marching sweep over a narrow band.
///
/// Cells move `Unvisited -> Active -> Frozen`. Improving an active cell
/// pushes a fresh heap entry; the superseded entry stays in the heap and is
/// dropped when popped because its cell is already frozen.
pub struct FastMarch<'a, F: CellFlags> {
    phi: &'a mut Grid<f64>,
    status: &'a mut StatusGrid,
    dir: Direction,
    max_time: f64,
    transport: Option<Transport<'a, F>>,
    heap: BinaryHeap<FrontierEntry>,
    stats: SweepStats,
}

impl<'a, F: CellFlags> FastMarch<'a, F> {
    /// Create a sweep marching in `dir`. Cells are no longer expanded once
    /// their distance from the interface exceeds `max_time`.
    pub fn new(
        phi: &'a mut Grid<f64>,
        status: &'a mut StatusGrid,
        dir: Direction,
        max_time: f64,
    ) -> Self {
        FastMarch {
            phi,
            status,
            dir,
            max_time,
            transport: None,
            heap: BinaryHeap::new(),
            stats: SweepStats::default(),
        }
    }

    /// Transport `field` into every cell this sweep freezes (builder method).
    pub fn with_transport(mut self, flags: &'a F, field: &'a mut Grid<Vec3>) -> Self {
        self.transport = Some(Transport::new(flags, field));
        self
    }

    /// The distance field being marched.
    pub fn phi(&self) -> &Grid<f64> {
        &*self.phi
    }

    /// The status grid being marched.
    pub fn status(&self) -> &StatusGrid {
        &*self.status
    }

    /// Number of entries currently on the heap, stale ones included.
    pub fn frontier_len(&self) -> usize {
        self.heap.len()
    }

    /// Insert `cell` into the frontier, or improve its value, using `src` as
    /// the neighbor that triggered the update.
    ///
    /// # Errors
    /// Returns `UnresolvedCell` if `cell` has no frozen neighbor.
    pub fn add_to_list(&mut self, cell: Cell, src: Cell) -> Result<()> {
        if !self.phi.is_interior(cell, 1) {
            return Ok(());
        }
        let idx = self.phi.index(cell);
        let state = self.status.state_at(idx);
        if !matches!(state, MarchState::Unvisited | MarchState::Active) {
            return Ok(());
        }
        if to_marching_time(self.phi.get(src), self.dir) > self.max_time {
            return Ok(());
        }

        let solution = calculate_distance(self.phi, self.status, cell, self.dir)?;
        let time = to_marching_time(solution.distance, self.dir);

        if state == MarchState::Active {
            if time >= to_marching_time(self.phi.at(idx), self.dir) {
                return Ok(());
            }
        } else {
            self.status.mark_at(idx, MarchState::Active);
        }
        self.phi.set_at(idx, from_marching_time(time, self.dir));
        self.heap.push(FrontierEntry { cell, time });
        self.stats.pushes += 1;
        Ok(())
    }

    /// Seed the frontier from every frozen cell accepted by `accept` that
    /// touches an unvisited cell. Returns the number of insertions tried.
    ///
    /// # Errors
    /// Propagates `UnresolvedCell` from [`FastMarch::add_to_list`].
    pub fn seed_from_interface<P>(&mut self, accept: P) -> Result<usize>
    where
        P: Fn(f64) -> bool,
    {
        let mut pairs = Vec::new();
        for idx in 0..self.phi.num_cells() {
            if self.status.state_at(idx) != MarchState::Frozen || !accept(self.phi.at(idx)) {
                continue;
            }
            let src = self.phi.cell(idx);
            for n in self.phi.neighbors(src) {
                if self.status.state(n) == MarchState::Unvisited {
                    pairs.push((n, src));
                }
            }
        }
        for &(cell, src) in &pairs {
            self.add_to_list(cell, src)?;
        }
        self.stats.seeded += pairs.len();
        Ok(pairs.len())
    }

    /// Pop and freeze frontier cells until the heap is empty.
    ///
    /// # Errors
    /// Propagates `UnresolvedCell`; the field is undefined afterwards.
    pub fn perform_marching(&mut self) -> Result<SweepStats> {
        while let Some(entry) = self.heap.pop() {
            let cell = entry.cell;
            let idx = self.phi.index(cell);
            if self.status.state_at(idx) == MarchState::Frozen {
                self.stats.stale_pops += 1;
                continue;
            }
            self.status.mark_at(idx, MarchState::Frozen);
            self.stats.frozen += 1;

            if self.transport.is_some() {
                let solution = calculate_distance(self.phi, self.status, cell, self.dir)?;
                if let Some(transport) = self.transport.as_mut() {
                    self.stats.transported += transport.transport(cell, &solution.weights);
                }
            }

            for axis in 0..self.phi.dims() {
                for positive in [false, true] {
                    if let Some(n) = self.phi.neighbor(cell, axis, positive) {
                        self.add_to_list(n, cell)?;
                    }
                }
            }
        }

        debug!(
            direction = ?self.dir,
            seeded = self.stats.seeded,
            frozen = self.stats.frozen,
            pushes = self.stats.pushes,
            stale_pops = self.stats.stale_pops,
            "fast marching sweep finished"
        );
        Ok(self.stats)
    }
}
