//! Python bindings, built with the `python` feature.

use std::path::Path;

use numpy::ndarray::{Array1, Array2};
use numpy::{PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::dataset::{Dataset, ScalarArray};
use crate::error::ElevationError;
use crate::format::FileFamily;
use crate::naming;
use crate::pipeline::ElevationPipeline;

impl From<ElevationError> for PyErr {
    fn from(err: ElevationError) -> Self {
        match err {
            ElevationError::FileNotFound { .. } => PyFileNotFoundError::new_err(err.to_string()),
            ElevationError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Elevates planar points by a scalar field and triangulates them.
///
/// # Arguments
/// * `x`, `y` - Planar coordinates of the points.
/// * `values` - Scalar value of every point, used as its elevation.
///
/// # Returns
/// A tuple `(points, triangles, values)`: the `N x 3` vertex coordinates, the
/// `M x 3` vertex indices of every triangle, and the scalar value of every
/// vertex.
///
/// # Errors
/// Returns a `PyValueError` if the input arrays have mismatched lengths or
/// the points cannot be triangulated.
#[pyfunction]
#[allow(clippy::type_complexity)]
pub fn elevate<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<'py, f64>,
    y: PyReadonlyArray1<'py, f64>,
    values: PyReadonlyArray1<'py, f64>,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<i64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let x = x.as_array();
    let y = y.as_array();
    let values = values.as_array();
    if x.len() != y.len() || x.len() != values.len() {
        return Err(PyValueError::new_err(
            "x, y and values must all have the same length",
        ));
    }

    let points: Vec<[f64; 3]> = x.iter().zip(y.iter()).map(|(&x, &y)| [x, y, 0.0]).collect();
    let dataset = Dataset::from_points(points)
        .with_array(ScalarArray::new("values", values.to_owned()))?;
    let pipeline: ElevationPipeline = ElevationPipeline::default();
    let mesh = py.allow_threads(|| pipeline.create_elevated_map(dataset, "values"))?;

    #[allow(clippy::cast_possible_wrap)]
    let triangles: Vec<[i64; 3]> = mesh
        .triangles()
        .iter()
        .map(|t| [t[0] as i64, t[1] as i64, t[2] as i64])
        .collect();
    let scalars: Array1<f64> = mesh.scalars().values().to_owned();

    Ok((
        PyArray2::from_owned_array(py, mesh.points().to_owned()),
        PyArray2::from_owned_array(py, Array2::from(triangles)),
        PyArray1::from_owned_array(py, scalars),
    ))
}

/// Converts one grid file into an elevation map file.
///
/// The input format is chosen from the extension of `input`.
///
/// # Returns
/// The number of vertices and triangles written.
#[pyfunction]
pub fn convert_file(
    py: Python<'_>,
    input: &str,
    output: &str,
    array_name: &str,
) -> PyResult<(usize, usize)> {
    let extension = Path::new(input)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let family = FileFamily::classify(extension)?;
    let pipeline: ElevationPipeline = ElevationPipeline::default();
    let summary = py.allow_threads(|| {
        pipeline.convert(Path::new(input), family, Path::new(output), array_name)
    })?;
    Ok((summary.points, summary.triangles))
}

/// Input filename for `index`.
#[pyfunction]
pub fn input_name(base: &str, index: u32, extension: &str) -> String {
    naming::input_name(base, index, extension)
}

/// Output filename derived from an input filename.
#[pyfunction]
pub fn output_name(input_name: &str) -> PyResult<String> {
    Ok(naming::output_name(input_name)?)
}

#[pymodule]
#[pyo3(name = "_elevation_map")]
mod elevation_map {
    #[pymodule_export]
    use super::{convert_file, elevate, input_name, output_name};
}
