//! XML PolyData (`.vtp`) writer.

use std::io;
use std::path::Path;

use itertools::Itertools;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::dataset::ScalarType;
use crate::error::{ElevationError, ElevationResult};
use crate::reattach::OutputMesh;

/// Write `mesh` to `path` as an ASCII XML PolyData file, replacing any
/// existing file.
///
/// # Errors
///
/// Returns [`ElevationError::Io`] if the file cannot be written.
pub fn write_vtp<P: AsRef<Path>>(mesh: &OutputMesh, path: P) -> ElevationResult<()> {
    let document = vtp_document(mesh)?;
    std::fs::write(path.as_ref(), document)?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.n_vertices(),
        triangles = mesh.triangles().len(),
        "polydata written"
    );
    Ok(())
}

/// Serialize `mesh` to the bytes of an XML PolyData document.
///
/// The scalar field is written as point data with its original name and
/// type, and marked as the active scalars.
///
/// # Errors
///
/// Returns [`ElevationError::Io`] if serialization fails.
pub fn vtp_document(mesh: &OutputMesh) -> ElevationResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let n_points = mesh.n_vertices().to_string();
    let n_polys = mesh.triangles().len().to_string();

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let mut root = BytesStart::new("VTKFile");
    root.push_attribute(("type", "PolyData"));
    root.push_attribute(("version", "0.1"));
    root.push_attribute(("byte_order", "LittleEndian"));
    emit(&mut writer, Event::Start(root))?;
    emit(&mut writer, Event::Start(BytesStart::new("PolyData")))?;

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("NumberOfPoints", n_points.as_str()));
    piece.push_attribute(("NumberOfVerts", "0"));
    piece.push_attribute(("NumberOfLines", "0"));
    piece.push_attribute(("NumberOfStrips", "0"));
    piece.push_attribute(("NumberOfPolys", n_polys.as_str()));
    emit(&mut writer, Event::Start(piece))?;

    let scalars = mesh.scalars();
    let mut point_data = BytesStart::new("PointData");
    point_data.push_attribute(("Scalars", scalars.name()));
    emit(&mut writer, Event::Start(point_data))?;
    let values = format_values(scalars.values().iter().copied(), scalars.scalar_type());
    data_array(&mut writer, scalars.scalar_type(), Some(scalars.name()), 1, &values)?;
    emit(&mut writer, Event::End(BytesEnd::new("PointData")))?;

    emit(&mut writer, Event::Empty(BytesStart::new("CellData")))?;

    emit(&mut writer, Event::Start(BytesStart::new("Points")))?;
    let coordinates = format_values(mesh.points().iter().copied(), ScalarType::Float64);
    data_array(&mut writer, ScalarType::Float64, Some("Points"), 3, &coordinates)?;
    emit(&mut writer, Event::End(BytesEnd::new("Points")))?;

    emit(&mut writer, Event::Start(BytesStart::new("Polys")))?;
    let connectivity = mesh.triangles().iter().flatten().join(" ");
    data_array(&mut writer, ScalarType::Int64, Some("connectivity"), 1, &connectivity)?;
    let offsets = (1..=mesh.triangles().len()).map(|i| i * 3).join(" ");
    data_array(&mut writer, ScalarType::Int64, Some("offsets"), 1, &offsets)?;
    emit(&mut writer, Event::End(BytesEnd::new("Polys")))?;

    emit(&mut writer, Event::End(BytesEnd::new("Piece")))?;
    emit(&mut writer, Event::End(BytesEnd::new("PolyData")))?;
    emit(&mut writer, Event::End(BytesEnd::new("VTKFile")))?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok(document)
}

fn data_array(
    writer: &mut Writer<Vec<u8>>,
    scalar_type: ScalarType,
    name: Option<&str>,
    components: usize,
    values: &str,
) -> ElevationResult<()> {
    let mut start = BytesStart::new("DataArray");
    start.push_attribute(("type", scalar_type.xml_name()));
    if let Some(name) = name {
        start.push_attribute(("Name", name));
    }
    if components > 1 {
        start.push_attribute(("NumberOfComponents", components.to_string().as_str()));
    }
    start.push_attribute(("format", "ascii"));

    if values.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(values)))?;
    emit(writer, Event::End(BytesEnd::new("DataArray")))
}

/// Space-separated values; integral types are written without a fraction.
#[allow(clippy::cast_possible_truncation)]
fn format_values(values: impl Iterator<Item = f64>, scalar_type: ScalarType) -> String {
    if scalar_type.is_integral() {
        values.map(|v| (v as i128).to_string()).join(" ")
    } else {
        values.map(|v| v.to_string()).join(" ")
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ElevationResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ElevationError::Io(io::Error::other(e)))
}
