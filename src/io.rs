// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};

use crate::core::{Grid, Vec3};
use crate::error::{EikonalError, Result};
use crate::flags::FlagGrid;

/// Array shape of a grid: `[ny, nx]` in 2D, `[nz, ny, nx]` in 3D.
fn array_shape<T>(grid: &Grid<T>) -> Vec<usize> {
    let [nx, ny, nz] = grid.size();
    if grid.is_3d() {
        vec![nz, ny, nx]
    } else {
        vec![ny, nx]
    }
}

/// Grid extent of a 2D or 3D array shape.
fn grid_size(shape: &[usize]) -> Result<([usize; 3], bool)> {
    match *shape {
        [ny, nx] => Ok(([nx, ny, 1], false)),
        [nz, ny, nx] => Ok(([nx, ny, nz], true)),
        _ => Err(EikonalError::Other(format!(
            "expected a 2D or 3D array, got shape {:?}",
            shape
        ))),
    }
}

/// Row-major data of `arr`, whatever order the file stored it in.
fn standard_data<T: Clone>(arr: ArrayD<T>) -> Vec<T> {
    // Fortran-order .npy files would otherwise give column-major data.
    arr.as_standard_layout().to_owned().into_raw_vec()
}

fn read_f64(path: &Path) -> Result<ArrayD<f64>> {
    // Try f64 first
    match ndarray_npy::read_npy(path) {
        Ok(a) => Ok(a),
        Err(_) => {
            // Try f32 and promote
            let arr32: ArrayD<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| EikonalError::UnsupportedDtype(format!("{}", e)))?;
            Ok(arr32.mapv(f64::from))
        }
    }
}

fn write_array(arr: &ArrayD<f64>, path: &Path) -> Result<()> {
    ndarray_npy::write_npy(path, arr)
        .map_err(|e| EikonalError::Other(format!("npy write error: {}", e)))
}

/// Load a level set from a .npy file.
///
/// A 2D array is read as `[ny, nx]`, a 3D array as `[nz, ny, nx]`. f32 data
/// is promoted to f64.
pub fn load_npy_field(path: &Path) -> Result<Grid<f64>> {
    let arr = read_f64(path)?;
    let (size, is_3d) = grid_size(arr.shape())?;
    Grid::from_vec(size, is_3d, standard_data(arr))
}

/// Load a classification grid of i32 flag bits from a .npy file.
pub fn load_npy_flags(path: &Path) -> Result<FlagGrid> {
    let arr: ArrayD<i32> = ndarray_npy::read_npy(path)
        .map_err(|e| EikonalError::UnsupportedDtype(format!("{}", e)))?;
    let (size, is_3d) = grid_size(arr.shape())?;
    Ok(FlagGrid::from_grid(Grid::from_vec(size, is_3d, standard_data(arr))?))
}

/// Load a vector field stored with a trailing axis of length 3, e.g.
/// `[ny, nx, 3]`.
pub fn load_npy_vector_field(path: &Path) -> Result<Grid<Vec3>> {
    let arr = read_f64(path)?;
    let shape = arr.shape().to_vec();
    let Some((&3, spatial)) = shape.split_last() else {
        return Err(EikonalError::Other(format!(
            "expected a trailing vector axis of length 3, got shape {:?}",
            shape
        )));
    };
    let (size, is_3d) = grid_size(spatial)?;
    let values = standard_data(arr)
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    Grid::from_vec(size, is_3d, values)
}

/// Save a scalar field to a .npy file.
pub fn save_npy_field(grid: &Grid<f64>, path: &Path) -> Result<()> {
    let arr = ArrayD::from_shape_vec(IxDyn(&array_shape(grid)), grid.as_slice().to_vec())
        .map_err(|e| EikonalError::Other(format!("shape error: {}", e)))?;
    write_array(&arr, path)
}

/// Save a vector field to a .npy file with a trailing axis of length 3.
pub fn save_npy_vector_field(grid: &Grid<Vec3>, path: &Path) -> Result<()> {
    let mut shape = array_shape(grid);
    shape.push(3);
    let data: Vec<f64> = grid.as_slice().iter().flatten().copied().collect();
    let arr = ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| EikonalError::Other(format!("shape error: {}", e)))?;
    write_array(&arr, path)
}

/// Infer file format from extension.
pub fn infer_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => Ok(FileFormat::Npy),
        Some(ext) => Err(EikonalError::UnsupportedFileFormat(ext.to_string())),
        None => Err(EikonalError::UnsupportedFileFormat(
            "(no extension)".to_string(),
        )),
    }
}

/// Supported file formats for grid I/O.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    /// NumPy .npy format.
    Npy,
}

/// Load a level set, inferring format from extension.
pub fn load_field(path: &Path) -> Result<Grid<f64>> {
    match infer_format(path)? {
        FileFormat::Npy => load_npy_field(path),
    }
}

/// Save a level set, inferring format from extension.
pub fn save_field(grid: &Grid<f64>, path: &Path) -> Result<()> {
    match infer_format(path)? {
        FileFormat::Npy => save_npy_field(grid, path),
    }
}
