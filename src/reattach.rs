//! Binding the source scalar field back onto a triangulated surface.

use ndarray::{ArrayView2, Axis};

use crate::dataset::ScalarArray;
use crate::error::{ElevationError, ElevationResult};
use crate::triangulate::TriangulatedSurface;

/// A triangulated surface carrying the scalar field it was elevated by.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputMesh {
    surface: TriangulatedSurface,
    scalars: ScalarArray,
}

impl OutputMesh {
    /// Number of vertices.
    pub fn n_vertices(&self) -> usize {
        self.surface.n_vertices()
    }

    /// Vertex coordinates as an `N x 3` view.
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.surface.points()
    }

    /// Coordinates of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_vertices()`.
    pub fn point(&self, index: usize) -> [f64; 3] {
        self.surface.point(index)
    }

    /// Triangle connectivity.
    pub fn triangles(&self) -> &[[usize; 3]] {
        self.surface.triangles()
    }

    /// The per-vertex scalar field.
    pub fn scalars(&self) -> &ScalarArray {
        &self.scalars
    }

    /// Per-vertex array named `name`, if present.
    pub fn array(&self, name: &str) -> Option<&ScalarArray> {
        (self.scalars.name() == name).then_some(&self.scalars)
    }
}

/// Attaches `array` to `surface` as per-vertex point data.
///
/// When the surface carries no vertex index map its vertices are assumed to
/// be in input order, and the array is moved in as is. Otherwise each output
/// vertex `k` receives `array[source_indices[k]]`. Values are copied, never
/// recomputed.
///
/// # Errors
///
/// Returns [`ElevationError::AttributeSizeMismatch`] when the array (or the
/// index map) does not line up with the surface vertices.
pub fn reattach(surface: TriangulatedSurface, array: ScalarArray) -> ElevationResult<OutputMesh> {
    let vertices = surface.n_vertices();
    let mismatch = |values: usize| ElevationError::AttributeSizeMismatch {
        name: array.name().to_string(),
        values,
        vertices,
    };

    let scalars = match surface.source_indices() {
        None => {
            if array.len() != vertices {
                return Err(mismatch(array.len()));
            }
            array
        }
        Some(map) => {
            if map.len() != vertices {
                return Err(mismatch(map.len()));
            }
            if map.iter().any(|&i| i >= array.len()) {
                return Err(mismatch(array.len()));
            }
            let gathered = array.values().select(Axis(0), map);
            array.map_values(gathered)
        }
    };

    Ok(OutputMesh { surface, scalars })
}
