//! VTK grid readers and the PolyData writer.
//!
//! # Supported inputs
//!
//! - **Legacy** `.vtk` in ASCII or BINARY encoding: `STRUCTURED_POINTS`,
//!   `STRUCTURED_GRID`, `RECTILINEAR_GRID`, `POLYDATA` and
//!   `UNSTRUCTURED_GRID` data sets. `SCALARS` and `FIELD` point arrays are
//!   kept; every other attribute is read past.
//! - **XML** `.vti`, `.vtr`, `.vts`, `.vtp`, `.vtu` with `ascii` or inline
//!   base64 `binary` data arrays. Appended and compressed arrays are rejected.
//!
//! Cell topology is never kept: elevation maps are rebuilt from the points.
//! Multi-component point arrays contribute their first component.
//!
//! # Output
//!
//! [`write_vtp`] writes an XML PolyData file with ASCII arrays. Identical
//! meshes always produce identical bytes.

mod legacy;
mod writer;
mod xml;

pub use legacy::{parse_legacy, read_legacy};
pub use writer::{vtp_document, write_vtp};
pub use xml::{parse_xml, read_xml};

use std::path::Path;

use itertools::iproduct;

use crate::dataset::Dataset;
use crate::error::{ElevationError, ElevationResult};
use crate::format::FileFamily;
use crate::pipeline::{GridLoader, MeshWriter};
use crate::reattach::OutputMesh;

/// Reads legacy and XML VTK grids, picking the reader from the file family.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtkReader;

impl GridLoader for VtkReader {
    fn load(&self, path: &Path, family: FileFamily) -> ElevationResult<Dataset> {
        match family {
            FileFamily::Legacy => read_legacy(path),
            FileFamily::Tagged => read_xml(path),
        }
    }
}

/// Writes output meshes as XML PolyData.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtpWriter;

impl MeshWriter for VtpWriter {
    fn write(&self, mesh: &OutputMesh, path: &Path) -> ElevationResult<()> {
        write_vtp(mesh, path)
    }
}

/// Read a whole file, reporting a missing file as [`ElevationError::FileNotFound`].
fn read_bytes(path: &Path) -> ElevationResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ElevationError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ElevationError::Io(e)
        }
    })
}

/// Points of a rectilinear lattice, x varying fastest.
fn rectilinear_points(xs: &[f64], ys: &[f64], zs: &[f64]) -> Vec<[f64; 3]> {
    iproduct!(zs, ys, xs)
        .map(|(&z, &y, &x)| [x, y, z])
        .collect()
}

/// Points of a regular image lattice covering the inclusive index `extent`
/// (`[x0, x1, y0, y1, z0, z1]`).
fn image_points(extent: [i64; 6], origin: [f64; 3], spacing: [f64; 3]) -> Vec<[f64; 3]> {
    #[allow(clippy::cast_precision_loss)]
    let axis = |lo: i64, hi: i64, o: f64, s: f64| -> Vec<f64> {
        (lo..=hi).map(|i| o + i as f64 * s).collect()
    };
    rectilinear_points(
        &axis(extent[0], extent[1], origin[0], spacing[0]),
        &axis(extent[2], extent[3], origin[1], spacing[1]),
        &axis(extent[4], extent[5], origin[2], spacing[2]),
    )
}

/// Keep the first of every `components` values.
fn first_components(values: &[f64], components: usize) -> Vec<f64> {
    values.iter().step_by(components.max(1)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectilinear_order_is_x_fastest() {
        let points = rectilinear_points(&[0.0, 1.0], &[10.0, 20.0], &[5.0]);
        assert_eq!(
            points,
            vec![
                [0.0, 10.0, 5.0],
                [1.0, 10.0, 5.0],
                [0.0, 20.0, 5.0],
                [1.0, 20.0, 5.0],
            ]
        );
    }

    #[test]
    fn image_points_honour_extent_offset() {
        let points = image_points([2, 3, 0, 0, 0, 0], [1.0, 1.0, 0.0], [0.5, 1.0, 1.0]);
        assert_eq!(points, vec![[2.0, 1.0, 0.0], [2.5, 1.0, 0.0]]);
    }

    #[test]
    fn first_components_strides() {
        assert_eq!(first_components(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3), vec![1.0, 4.0]);
        assert_eq!(first_components(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = VtkReader.load(Path::new("does/not/exist-1.vtk"), FileFamily::Legacy);
        assert!(matches!(err, Err(ElevationError::FileNotFound { .. })));
    }
}
