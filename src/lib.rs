// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Level set reinitialization with the Fast Marching Method.
//!
//! Given a field whose zero level set marks an interface, this library
//! rewrites it into an approximate signed distance field (|∇φ| = 1) within a
//! narrow band around the interface, on 2D and 3D structured grids. Cells
//! outside the band are capped at `±(band_width + 1)`. An optional MAC vector
//! field is carried outward along with the distances.

#![warn(missing_docs)]

/// Boundary finisher copying the last interior layer outward.
pub mod boundary;
/// Core grid data structures.
pub mod core;
/// Error types for the library.
pub mod error;
/// Cheap layer-by-layer extrapolation of level sets and vector fields.
pub mod extrapolate;
/// Per-cell classification flags.
pub mod flags;
/// Single-direction Fast Marching sweep.
pub mod frontier;
/// File I/O for level sets, flags, and vector fields.
pub mod io;
/// Two-sweep narrow band reinitialization.
pub mod reinit;
/// Per-cell marching state.
pub mod status;
/// Vector field transport into frozen cells.
pub mod transport;
/// Local eikonal solves for 2D and 3D grids.
pub mod update_kernels;

pub use crate::core::{Direction, Grid, Vec3};
pub use crate::error::{EikonalError, Result};
pub use crate::flags::{CellFlags, FlagGrid};
pub use crate::reinit::{reinitialize, ReinitReport, Reinitializer};
