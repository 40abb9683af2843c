//! Connecting an elevated point cloud into a triangle surface.

use delaunator::Point;
use itertools::Itertools;
use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::elevation::ElevatedPointCloud;
use crate::error::{ElevationError, ElevationResult};

/// A triangle mesh over the points of an elevated cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulatedSurface {
    points: Array2<f64>,
    triangles: Vec<[usize; 3]>,
    source_indices: Option<Vec<usize>>,
}

impl TriangulatedSurface {
    /// Create a surface whose vertices are the cloud points in their original order.
    #[must_use]
    pub fn new(points: Array2<f64>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            points,
            triangles,
            source_indices: None,
        }
    }

    /// Record that output vertex `k` came from input point `source_indices[k]`.
    ///
    /// Triangulators that reorder or drop vertices must supply this map so the
    /// scalar attribute can be reattached correctly.
    #[must_use]
    pub fn with_source_indices(mut self, source_indices: Vec<usize>) -> Self {
        self.source_indices = Some(source_indices);
        self
    }

    /// Number of vertices.
    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.points.nrows()
    }

    /// Vertex coordinates as an `N x 3` view.
    #[must_use]
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    /// Coordinates of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_vertices()`.
    #[must_use]
    pub fn point(&self, index: usize) -> [f64; 3] {
        let row = self.points.row(index);
        [row[0], row[1], row[2]]
    }

    /// Triangle connectivity.
    #[must_use]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Vertex index map, when the triangulator did not preserve input order.
    #[must_use]
    pub fn source_indices(&self) -> Option<&[usize]> {
        self.source_indices.as_deref()
    }
}

/// Builds triangle connectivity over an elevated point cloud.
pub trait SurfaceTriangulator: Send + Sync {
    /// Triangulate the cloud.
    ///
    /// # Errors
    ///
    /// Returns an error if no surface can be built from the points.
    fn triangulate(&self, cloud: ElevatedPointCloud) -> ElevationResult<TriangulatedSurface>;
}

/// Delaunay triangulation of the cloud's projection onto the xy-plane.
///
/// The lifted z coordinate plays no part in connectivity. Vertices are kept
/// in input order and none are added or removed; coincident points stay in
/// the vertex list but are not referenced by any triangle. Every triangle is
/// wound counter-clockwise when seen from +z.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delaunay2d;

impl SurfaceTriangulator for Delaunay2d {
    fn triangulate(&self, cloud: ElevatedPointCloud) -> ElevationResult<TriangulatedSurface> {
        let planar: Vec<Point> = cloud
            .points()
            .outer_iter()
            .map(|p| Point { x: p[0], y: p[1] })
            .collect();

        let triangulation = delaunator::triangulate(&planar);
        if triangulation.triangles.is_empty() {
            return Err(ElevationError::DegenerateTriangulation {
                points: planar.len(),
            });
        }

        let triangles: Vec<[usize; 3]> = triangulation
            .triangles
            .iter()
            .copied()
            .tuples()
            .map(|(a, b, c)| {
                if signed_area(&planar[a], &planar[b], &planar[c]) < 0.0 {
                    [a, c, b]
                } else {
                    [a, b, c]
                }
            })
            .collect();

        debug!(
            points = planar.len(),
            triangles = triangles.len(),
            hull = triangulation.hull.len(),
            "delaunay triangulation built"
        );

        Ok(TriangulatedSurface::new(cloud.into_points(), triangles))
    }
}

/// Twice the signed area of triangle `abc`; positive when counter-clockwise.
#[inline]
fn signed_area(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
