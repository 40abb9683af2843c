//! Single-file conversion: load, project, triangulate, reattach, write.

use std::path::Path;

use tracing::debug;

use crate::dataset::Dataset;
use crate::elevation::project;
use crate::error::{ElevationError, ElevationResult};
use crate::format::FileFamily;
use crate::reattach::{reattach, OutputMesh};
use crate::triangulate::{Delaunay2d, SurfaceTriangulator};
use crate::vtk::{VtkReader, VtpWriter};

/// Reads a grid file into a [`Dataset`].
pub trait GridLoader: Send + Sync {
    /// Load the file at `path`, parsed as `family`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    fn load(&self, path: &Path, family: FileFamily) -> ElevationResult<Dataset>;
}

/// Persists an [`OutputMesh`].
pub trait MeshWriter: Send + Sync {
    /// Write `mesh` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, mesh: &OutputMesh, path: &Path) -> ElevationResult<()>;
}

/// Sizes of a converted mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionSummary {
    /// Number of output vertices.
    pub points: usize,
    /// Number of output triangles.
    pub triangles: usize,
}

/// The per-file conversion chain, generic over its collaborators.
#[derive(Debug, Clone, Default)]
pub struct ElevationPipeline<L = VtkReader, T = Delaunay2d, W = VtpWriter> {
    loader: L,
    triangulator: T,
    writer: W,
}

impl<L, T, W> ElevationPipeline<L, T, W>
where
    L: GridLoader,
    T: SurfaceTriangulator,
    W: MeshWriter,
{
    /// Assemble a pipeline from its three collaborators.
    pub const fn new(loader: L, triangulator: T, writer: W) -> Self {
        Self {
            loader,
            triangulator,
            writer,
        }
    }

    /// The grid loader.
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// The triangulator.
    pub const fn triangulator(&self) -> &T {
        &self.triangulator
    }

    /// The mesh writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Builds the elevation map of `dataset` using the scalar array `array_name`.
    ///
    /// # Arguments
    /// * `dataset` - The loaded grid. Consumed: its points are lifted and the
    ///   named array moves into the output mesh.
    /// * `array_name` - Name of the scalar array providing the elevation.
    ///
    /// # Returns
    /// The triangulated surface carrying the scalar array per vertex.
    ///
    /// # Errors
    ///
    /// Propagates projection, triangulation and reattachment errors.
    pub fn create_elevated_map(
        &self,
        dataset: Dataset,
        array_name: &str,
    ) -> ElevationResult<OutputMesh> {
        let cloud = project(&dataset, array_name)?;
        debug!(points = cloud.len(), array = array_name, "point cloud elevated");

        let field = dataset
            .into_array(array_name)
            .ok_or_else(|| ElevationError::MissingAttribute {
                name: array_name.to_string(),
            })?;
        let surface = self.triangulator.triangulate(cloud)?;
        reattach(surface, field)
    }

    /// Converts one grid file into an elevation map file.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by loading, mesh building or writing.
    pub fn convert(
        &self,
        input: &Path,
        family: FileFamily,
        output: &Path,
        array_name: &str,
    ) -> ElevationResult<ConversionSummary> {
        let dataset = self.loader.load(input, family)?;
        debug!(
            path = %input.display(),
            points = dataset.n_points(),
            "grid loaded"
        );
        let mesh = self.create_elevated_map(dataset, array_name)?;
        self.writer.write(&mesh, output)?;
        Ok(ConversionSummary {
            points: mesh.n_vertices(),
            triangles: mesh.triangles().len(),
        })
    }
}
