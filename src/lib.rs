//! Converts numbered sequences of 2D scalar-field grids into elevation maps.
//!
//! Every input grid is lifted into a 3D point cloud whose z coordinate is a
//! chosen scalar array, triangulated over its xy-projection and written out as
//! a VTK PolyData surface that still carries the scalar array per vertex.
//!
//! ```no_run
//! use elevation_map::{run, BatchConfig, ElevationPipeline};
//!
//! let config = BatchConfig::new("Grid-", 1, 20, "vtk", "Height");
//! let pipeline: ElevationPipeline = ElevationPipeline::default();
//! let report = run(&config, &pipeline, |_| {})?;
//! assert!(report.is_success());
//! # Ok::<(), elevation_map::ElevationError>(())
//! ```

pub mod batch;
pub mod dataset;
pub mod elevation;
pub mod error;
pub mod format;
pub mod naming;
pub mod pipeline;
pub mod reattach;
pub mod triangulate;
pub mod vtk;

#[cfg(feature = "python")]
mod python;

pub use batch::{run, BatchConfig, BatchReport, FailurePolicy, FileFailure, FileOutcome};
pub use dataset::{Dataset, ScalarArray, ScalarType};
pub use elevation::{project, ElevatedPointCloud};
pub use error::{ElevationError, ElevationResult, ErrorCategory};
pub use format::FileFamily;
pub use naming::{input_name, output_name};
pub use pipeline::{ConversionSummary, ElevationPipeline, GridLoader, MeshWriter};
pub use reattach::{reattach, OutputMesh};
pub use triangulate::{Delaunay2d, SurfaceTriangulator, TriangulatedSurface};
pub use vtk::{VtkReader, VtpWriter};
