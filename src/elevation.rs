//! Lifting a 2D grid into a 3D point cloud.

use ndarray::{Array2, ArrayView2};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::dataset::Dataset;
use crate::error::{ElevationError, ElevationResult};

/// Points whose z coordinate has been replaced by a scalar attribute.
///
/// Point `i` of the cloud always corresponds to point `i` of the source data set.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevatedPointCloud {
    points: Array2<f64>,
}

impl ElevatedPointCloud {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Whether the cloud is empty.
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Coordinates as an `N x 3` view.
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    /// Take ownership of the coordinates.
    pub fn into_points(self) -> Array2<f64> {
        self.points
    }
}

/// Projects every point of `dataset` to `(x, y, value)` where `value` is read
/// from the scalar array named `array_name`.
///
/// Points are processed in parallel; every coordinate is read through the
/// copying accessor [`Dataset::point`], so no reference into the data set's
/// storage escapes into the workers.
///
/// # Arguments
/// * `dataset` - The loaded grid.
/// * `array_name` - Name of the scalar array providing the elevation.
///
/// # Returns
/// A cloud with exactly `dataset.n_points()` points in the original order.
///
/// # Errors
///
/// - [`ElevationError::MissingAttribute`] if the array does not exist.
/// - [`ElevationError::EmptyAttribute`] if the array has no values.
/// - [`ElevationError::EmptyDataset`] if the data set has no points.
///
/// Attached arrays always hold one value per point, so a data set without
/// points reports `EmptyAttribute` first. `EmptyDataset` is only returned
/// when the array check passes on a point-less data set, which
/// [`Dataset::add_array`] rules out.
pub fn project(dataset: &Dataset, array_name: &str) -> ElevationResult<ElevatedPointCloud> {
    let field = dataset
        .array(array_name)
        .ok_or_else(|| ElevationError::MissingAttribute {
            name: array_name.to_string(),
        })?;
    if field.is_empty() {
        return Err(ElevationError::EmptyAttribute {
            name: array_name.to_string(),
        });
    }

    let n_points = dataset.n_points();
    if n_points < 1 {
        return Err(ElevationError::EmptyDataset);
    }

    let elevation = field.values();
    let lifted: Vec<[f64; 3]> = (0..n_points)
        .into_par_iter()
        .map(|i| {
            let [x, y, _] = dataset.point(i);
            [x, y, elevation[i]]
        })
        .collect();

    Ok(ElevatedPointCloud {
        points: Array2::from(lifted),
    })
}
