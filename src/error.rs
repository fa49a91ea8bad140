// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur during grid setup, I/O, or reinitialization.
#[derive(Debug)]
pub enum EikonalError {
    /// Grid shape is invalid (zero-sized axis or a 2D grid with depth).
    InvalidGridShape {
        /// The axis index.
        axis: usize,
        /// The size provided.
        size: usize,
    },
    /// Narrow band width is not positive and finite.
    InvalidBandWidth(f64),
    /// Grid extents do not agree.
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape encountered.
        got: Vec<usize>,
    },
    /// A cell on the frontier had no frozen neighbor on any axis.
    UnresolvedCell {
        /// The cell coordinates (x, y, z).
        cell: [usize; 3],
    },
    /// Unsupported data type in file.
    UnsupportedDtype(String),
    /// Unsupported file format (unrecognized extension).
    UnsupportedFileFormat(String),
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for EikonalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EikonalError::InvalidGridShape { axis, size } => {
                write!(f, "invalid grid shape: axis {} has size {}", axis, size)
            }
            EikonalError::InvalidBandWidth(w) => {
                write!(
                    f,
                    "invalid band width: {} (must be positive and finite)",
                    w
                )
            }
            EikonalError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            EikonalError::UnresolvedCell { cell } => {
                write!(
                    f,
                    "fast marching invariant violated: cell {:?} has no frozen neighbor",
                    cell
                )
            }
            EikonalError::UnsupportedDtype(dtype) => {
                write!(f, "unsupported dtype: {}", dtype)
            }
            EikonalError::UnsupportedFileFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            EikonalError::IoError(e) => write!(f, "I/O error: {}", e),
            EikonalError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EikonalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EikonalError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EikonalError {
    fn from(e: std::io::Error) -> Self {
        EikonalError::IoError(e)
    }
}

/// Convenience type alias for Results with EikonalError.
pub type Result<T> = std::result::Result<T, EikonalError>;
