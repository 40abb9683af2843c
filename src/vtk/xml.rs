//! XML (`.vti`, `.vtr`, `.vts`, `.vtp`, `.vtu`) reader.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::{first_components, image_points, read_bytes, rectilinear_points};
use crate::dataset::{Dataset, ScalarArray, ScalarType};
use crate::error::{ElevationError, ElevationResult};

/// Load an XML VTK file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a supported XML
/// data set.
pub fn read_xml<P: AsRef<Path>>(path: P) -> ElevationResult<Dataset> {
    let bytes = read_bytes(path.as_ref())?;
    let content = String::from_utf8(bytes).map_err(|_| {
        ElevationError::invalid_content("XML file is not UTF-8 (raw appended data is not supported)")
    })?;
    parse_xml(&content)
}

/// Data set types the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridKind {
    ImageData,
    RectilinearGrid,
    StructuredGrid,
    PolyData,
    UnstructuredGrid,
}

impl GridKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ImageData" => Some(Self::ImageData),
            "RectilinearGrid" => Some(Self::RectilinearGrid),
            "StructuredGrid" => Some(Self::StructuredGrid),
            "PolyData" => Some(Self::PolyData),
            "UnstructuredGrid" => Some(Self::UnstructuredGrid),
            _ => None,
        }
    }
}

/// Element whose `DataArray` children are currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Points,
    Coordinates,
    PointData,
    Other,
}

#[derive(Debug)]
struct FileHeader {
    kind: GridKind,
    big_endian: bool,
    header_type: ScalarType,
    compressed: bool,
}

#[derive(Debug, Default)]
struct Piece {
    n_points: Option<usize>,
    extent: Option<[i64; 6]>,
    points: Option<Vec<f64>>,
    coordinates: Vec<Vec<f64>>,
    arrays: Vec<ScalarArray>,
}

#[derive(Debug)]
struct PendingArray {
    name: Option<String>,
    scalar_type: ScalarType,
    components: usize,
    format: String,
    text: String,
}

#[derive(Debug, Default)]
struct ImageGeometry {
    whole_extent: Option<[i64; 6]>,
    origin: [f64; 3],
    spacing: [f64; 3],
}

/// Parse the contents of an XML VTK file.
///
/// # Errors
///
/// Returns [`ElevationError::InvalidContent`] for malformed or unsupported
/// content, or [`ElevationError::ArrayLengthMismatch`] if a point array does
/// not match the number of points.
pub fn parse_xml(content: &str) -> ElevationResult<Dataset> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut header: Option<FileHeader> = None;
    let mut image = ImageGeometry {
        spacing: [1.0; 3],
        ..ImageGeometry::default()
    };
    let mut pieces: Vec<Piece> = Vec::new();
    let mut section = Section::None;
    let mut pending: Option<PendingArray> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if let Some(array) = start_element(e, &mut header, &mut image, &mut pieces, &mut section)? {
                    pending = Some(array);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(array) = start_element(e, &mut header, &mut image, &mut pieces, &mut section)? {
                    finish_array(array, section, header.as_ref(), &mut pieces)?;
                } else if matches!(e.local_name().as_ref(), b"PointData" | b"Points" | b"Coordinates") {
                    section = Section::None;
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(array) = pending.as_mut() {
                    let text = std::str::from_utf8(t).map_err(|e| {
                        ElevationError::invalid_content(format!("invalid UTF-8 in data array: {e}"))
                    })?;
                    array.text.push_str(text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"DataArray" => {
                    if let Some(array) = pending.take() {
                        finish_array(array, section, header.as_ref(), &mut pieces)?;
                    }
                }
                b"PointData" | b"CellData" | b"Points" | b"Coordinates" | b"Cells" | b"Polys"
                | b"Verts" | b"Lines" | b"Strips" | b"FieldData" => section = Section::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ElevationError::invalid_content(format!("XML parse error: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    let header = header.ok_or_else(|| ElevationError::invalid_content("missing VTKFile element"))?;
    if pieces.is_empty() {
        return Err(ElevationError::invalid_content("no Piece element found"));
    }
    let dataset = merge_pieces(pieces, header.kind, &image)?;
    debug!(
        kind = ?header.kind,
        points = dataset.n_points(),
        arrays = dataset.arrays().len(),
        "XML data set parsed"
    );
    Ok(dataset)
}

/// Handle an opening tag. Returns a pending array for `DataArray` elements
/// whose contents are needed.
fn start_element(
    element: &BytesStart<'_>,
    header: &mut Option<FileHeader>,
    image: &mut ImageGeometry,
    pieces: &mut Vec<Piece>,
    section: &mut Section,
) -> ElevationResult<Option<PendingArray>> {
    match element.local_name().as_ref() {
        b"VTKFile" => *header = Some(parse_file_header(element)?),
        b"ImageData" => {
            if let Some(extent) = attribute(element, b"WholeExtent")? {
                image.whole_extent = Some(parse_numbers(&extent, "WholeExtent")?);
            }
            if let Some(origin) = attribute(element, b"Origin")? {
                image.origin = parse_numbers(&origin, "Origin")?;
            }
            if let Some(spacing) = attribute(element, b"Spacing")? {
                image.spacing = parse_numbers(&spacing, "Spacing")?;
            }
        }
        b"Piece" => {
            let mut piece = Piece::default();
            if let Some(n) = attribute(element, b"NumberOfPoints")? {
                piece.n_points = Some(n.trim().parse().map_err(|_| {
                    ElevationError::invalid_content(format!("invalid NumberOfPoints: {n}"))
                })?);
            }
            if let Some(extent) = attribute(element, b"Extent")? {
                piece.extent = Some(parse_numbers(&extent, "Extent")?);
            }
            pieces.push(piece);
        }
        b"Points" => *section = Section::Points,
        b"Coordinates" => *section = Section::Coordinates,
        b"PointData" => *section = Section::PointData,
        b"CellData" | b"Cells" | b"Polys" | b"Verts" | b"Lines" | b"Strips" | b"FieldData" => {
            *section = Section::Other;
        }
        b"DataArray" if matches!(*section, Section::Points | Section::Coordinates | Section::PointData) => {
            return parse_array_header(element).map(Some);
        }
        _ => {}
    }
    Ok(None)
}

fn parse_file_header(element: &BytesStart<'_>) -> ElevationResult<FileHeader> {
    let kind_name = attribute(element, b"type")?
        .ok_or_else(|| ElevationError::invalid_content("VTKFile has no type attribute"))?;
    let kind = GridKind::from_name(&kind_name).ok_or_else(|| {
        ElevationError::invalid_content(format!("unsupported XML data set type {kind_name}"))
    })?;
    let big_endian = attribute(element, b"byte_order")?.as_deref() == Some("BigEndian");
    let header_type = match attribute(element, b"header_type")?.as_deref() {
        None | Some("UInt32") => ScalarType::UInt32,
        Some("UInt64") => ScalarType::UInt64,
        Some(other) => {
            return Err(ElevationError::invalid_content(format!(
                "unsupported header_type {other}"
            )))
        }
    };
    let compressed = attribute(element, b"compressor")?.is_some_and(|c| !c.is_empty());
    Ok(FileHeader {
        kind,
        big_endian,
        header_type,
        compressed,
    })
}

fn parse_array_header(element: &BytesStart<'_>) -> ElevationResult<PendingArray> {
    let type_name = attribute(element, b"type")?
        .ok_or_else(|| ElevationError::invalid_content("DataArray has no type attribute"))?;
    let scalar_type = ScalarType::from_xml_name(&type_name).ok_or_else(|| {
        ElevationError::invalid_content(format!("unsupported DataArray type {type_name}"))
    })?;
    let components = match attribute(element, b"NumberOfComponents")? {
        Some(n) => n.trim().parse().map_err(|_| {
            ElevationError::invalid_content(format!("invalid NumberOfComponents: {n}"))
        })?,
        None => 1,
    };
    Ok(PendingArray {
        name: attribute(element, b"Name")?,
        scalar_type,
        components,
        format: attribute(element, b"format")?.unwrap_or_else(|| "ascii".to_string()),
        text: String::new(),
    })
}

/// Decode a completed `DataArray` and store it in the current piece.
fn finish_array(
    array: PendingArray,
    section: Section,
    header: Option<&FileHeader>,
    pieces: &mut [Piece],
) -> ElevationResult<()> {
    let header =
        header.ok_or_else(|| ElevationError::invalid_content("DataArray outside VTKFile"))?;
    let piece = pieces
        .last_mut()
        .ok_or_else(|| ElevationError::invalid_content("DataArray outside Piece"))?;
    let values = decode_values(&array, header)?;

    match section {
        Section::Points => {
            if array.components != 3 {
                return Err(ElevationError::invalid_content(format!(
                    "points must have 3 components, got {}",
                    array.components
                )));
            }
            piece.points = Some(values);
        }
        Section::Coordinates => piece.coordinates.push(values),
        Section::PointData => {
            let name = array
                .name
                .ok_or_else(|| ElevationError::invalid_content("point DataArray has no Name"))?;
            piece.arrays.push(
                ScalarArray::new(name, first_components(&values, array.components))
                    .with_type(array.scalar_type),
            );
        }
        Section::None | Section::Other => {}
    }
    Ok(())
}

fn decode_values(array: &PendingArray, header: &FileHeader) -> ElevationResult<Vec<f64>> {
    match array.format.as_str() {
        "ascii" => array
            .text
            .split_ascii_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    ElevationError::invalid_content(format!("invalid value {token}"))
                })
            })
            .collect(),
        "binary" => {
            if header.compressed {
                return Err(ElevationError::invalid_content(
                    "compressed data arrays are not supported",
                ));
            }
            let bytes = decode_base64(&array.text, header.header_type.size())?;
            let header_size = header.header_type.size();
            let declared = bytes
                .get(..header_size)
                .ok_or_else(|| ElevationError::invalid_content("binary data array has no header"))?;
            let declared = header
                .header_type
                .decode(declared, header.big_endian)?
                .first()
                .copied()
                .unwrap_or_default();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let declared = declared as usize;
            let data = header_size
                .checked_add(declared)
                .and_then(|end| bytes.get(header_size..end))
                .ok_or_else(|| ElevationError::invalid_content("binary data array is truncated"))?;
            array.scalar_type.decode(data, header.big_endian)
        }
        other => Err(ElevationError::invalid_content(format!(
            "data array format {other} is not supported"
        ))),
    }
}

/// Inline binary arrays are base64 encoded either as one stream, or as the
/// header and the data encoded separately.
fn decode_base64(text: &str, header_size: usize) -> ElevationResult<Vec<u8>> {
    let compact: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if let Ok(bytes) = STANDARD.decode(&compact) {
        return Ok(bytes);
    }
    let split = header_size.div_ceil(3) * 4;
    let (head, body) = compact.split_at(split.min(compact.len()));
    let mut bytes = STANDARD
        .decode(head)
        .map_err(|e| ElevationError::invalid_content(format!("invalid base64 header: {e}")))?;
    bytes.extend(
        STANDARD
            .decode(body)
            .map_err(|e| ElevationError::invalid_content(format!("invalid base64 data: {e}")))?,
    );
    Ok(bytes)
}

fn merge_pieces(pieces: Vec<Piece>, kind: GridKind, image: &ImageGeometry) -> ElevationResult<Dataset> {
    let mut points: Vec<[f64; 3]> = Vec::new();
    let mut columns: Vec<(ScalarArray, Vec<f64>)> = Vec::new();

    for (index, mut piece) in pieces.into_iter().enumerate() {
        let piece_points = piece_points(&mut piece, kind, image)?;
        if let Some(n) = piece.n_points {
            if n != piece_points.len() {
                return Err(ElevationError::invalid_content(format!(
                    "piece declares {n} points but holds {}",
                    piece_points.len()
                )));
            }
        }
        for array in &piece.arrays {
            if array.len() != piece_points.len() {
                return Err(ElevationError::ArrayLengthMismatch {
                    name: array.name().to_string(),
                    len: array.len(),
                    points: piece_points.len(),
                });
            }
        }

        if index == 0 {
            columns = piece
                .arrays
                .into_iter()
                .map(|a| {
                    let values = a.values().to_vec();
                    (a, values)
                })
                .collect();
        } else {
            columns.retain_mut(|(head, values)| {
                match piece.arrays.iter().find(|a| a.name() == head.name()) {
                    Some(a) => {
                        values.extend(a.values().iter());
                        true
                    }
                    None => false,
                }
            });
        }
        points.extend(piece_points);
    }

    let mut dataset = Dataset::from_points(points);
    for (head, values) in columns {
        dataset.add_array(head.map_values(values.into()))?;
    }
    Ok(dataset)
}

fn piece_points(piece: &mut Piece, kind: GridKind, image: &ImageGeometry) -> ElevationResult<Vec<[f64; 3]>> {
    match kind {
        GridKind::ImageData => {
            let extent = piece
                .extent
                .or(image.whole_extent)
                .ok_or_else(|| ElevationError::invalid_content("ImageData piece has no Extent"))?;
            let count = extent_size(extent)?;
            if let Some(array) = piece.arrays.iter().find(|a| a.len() != count) {
                return Err(ElevationError::ArrayLengthMismatch {
                    name: array.name().to_string(),
                    len: array.len(),
                    points: count,
                });
            }
            Ok(image_points(extent, image.origin, image.spacing))
        }
        GridKind::RectilinearGrid => match piece.coordinates.as_slice() {
            [xs, ys, zs] => Ok(rectilinear_points(xs, ys, zs)),
            _ => Err(ElevationError::invalid_content(
                "RectilinearGrid piece needs three coordinate arrays",
            )),
        },
        GridKind::StructuredGrid | GridKind::PolyData | GridKind::UnstructuredGrid => {
            let flat = piece
                .points
                .take()
                .ok_or_else(|| ElevationError::invalid_content("piece has no Points"))?;
            Ok(flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect())
        }
    }
}

/// Number of lattice points in an inclusive index extent.
fn extent_size(extent: [i64; 6]) -> ElevationResult<usize> {
    let too_large = || ElevationError::invalid_content(format!("Extent {extent:?} is too large"));
    let mut total = 1_usize;
    for axis in extent.chunks_exact(2) {
        let span = axis[1]
            .checked_sub(axis[0])
            .and_then(|d| d.checked_add(1))
            .ok_or_else(too_large)?
            .max(0);
        let span = usize::try_from(span).map_err(|_| too_large())?;
        total = total.checked_mul(span).ok_or_else(too_large)?;
    }
    Ok(total)
}

/// Value of attribute `key`, if present.
fn attribute(element: &BytesStart<'_>, key: &[u8]) -> ElevationResult<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            let value = std::str::from_utf8(&attr.value).map_err(|e| {
                ElevationError::invalid_content(format!("invalid UTF-8 in attribute: {e}"))
            })?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

fn parse_numbers<T: std::str::FromStr + Copy + Default, const N: usize>(
    text: &str,
    what: &str,
) -> ElevationResult<[T; N]> {
    let mut out = [T::default(); N];
    let mut tokens = text.split_ascii_whitespace();
    for slot in &mut out {
        *slot = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| ElevationError::invalid_content(format!("invalid {what}: {text}")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = r#"<?xml version="1.0"?>
<VTKFile type="ImageData" version="0.1" byte_order="LittleEndian">
  <ImageData WholeExtent="0 2 0 1 0 0" Origin="0 0 0" Spacing="1 0.5 1">
    <Piece Extent="0 2 0 1 0 0">
      <PointData Scalars="Height">
        <DataArray type="Float32" Name="Height" format="ascii">
          0 1 2
          3 4 5
        </DataArray>
        <DataArray type="Float64" Name="Velocity" NumberOfComponents="2" format="ascii">
          1 9 2 9 3 9 4 9 5 9 6 9
        </DataArray>
      </PointData>
      <CellData>
        <DataArray type="Int32" Name="cells" format="appended" offset="0"/>
      </CellData>
    </Piece>
  </ImageData>
</VTKFile>
"#;

    #[test]
    fn image_data_lattice_and_arrays() {
        let Ok(dataset) = parse_xml(IMAGE) else {
            panic!("parse failed");
        };
        assert_eq!(dataset.n_points(), 6);
        assert_eq!(dataset.point(4), [1.0, 0.5, 0.0]);
        let height = dataset.array("Height");
        assert_eq!(height.map(ScalarArray::scalar_type), Some(ScalarType::Float32));
        assert_eq!(
            height.map(|a| a.values().to_vec()),
            Some(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
        );
        assert_eq!(
            dataset.array("Velocity").map(|a| a.values().to_vec()),
            Some(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        );
        assert!(dataset.array("cells").is_none());
    }

    #[test]
    fn unstructured_grid_with_binary_arrays() {
        let mut points = Vec::new();
        let coords = [0.0_f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        points.extend_from_slice(&(coords.len() as u32 * 4).to_le_bytes());
        for c in coords {
            points.extend_from_slice(&c.to_le_bytes());
        }
        // Header and data encoded as separate base64 streams.
        let heights = [5_i16, -6, 7];
        let height_bytes: Vec<u8> = heights.iter().flat_map(|h| h.to_le_bytes()).collect();
        let height_text = format!(
            "{}{}",
            STANDARD.encode((height_bytes.len() as u32).to_le_bytes()),
            STANDARD.encode(&height_bytes)
        );

        let content = format!(
            r#"<VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian" header_type="UInt32">
  <UnstructuredGrid>
    <Piece NumberOfPoints="3" NumberOfCells="1">
      <PointData>
        <DataArray type="Int16" Name="Height" format="binary">{height_text}</DataArray>
      </PointData>
      <Points>
        <DataArray type="Float32" NumberOfComponents="3" format="binary">
          {}
        </DataArray>
      </Points>
      <Cells>
        <DataArray type="Int32" Name="connectivity" format="ascii">0 1 2</DataArray>
      </Cells>
    </Piece>
  </UnstructuredGrid>
</VTKFile>"#,
            STANDARD.encode(&points)
        );

        let Ok(dataset) = parse_xml(&content) else {
            panic!("parse failed");
        };
        assert_eq!(dataset.n_points(), 3);
        assert_eq!(dataset.point(1), [1.0, 0.0, 0.0]);
        assert_eq!(
            dataset.array("Height").map(|a| a.values().to_vec()),
            Some(vec![5.0, -6.0, 7.0])
        );
        assert_eq!(
            dataset.array("Height").map(ScalarArray::scalar_type),
            Some(ScalarType::Int16)
        );
    }

    #[test]
    fn pieces_are_concatenated() {
        let content = r#"<VTKFile type="PolyData" version="0.1">
  <PolyData>
    <Piece NumberOfPoints="2">
      <PointData>
        <DataArray type="Float64" Name="h" format="ascii">1 2</DataArray>
        <DataArray type="Float64" Name="only_first" format="ascii">0 0</DataArray>
      </PointData>
      <Points><DataArray type="Float64" NumberOfComponents="3" format="ascii">0 0 0 1 0 0</DataArray></Points>
    </Piece>
    <Piece NumberOfPoints="1">
      <PointData>
        <DataArray type="Float64" Name="h" format="ascii">3</DataArray>
      </PointData>
      <Points><DataArray type="Float64" NumberOfComponents="3" format="ascii">0 1 0</DataArray></Points>
    </Piece>
  </PolyData>
</VTKFile>"#;
        let Ok(dataset) = parse_xml(content) else {
            panic!("parse failed");
        };
        assert_eq!(dataset.n_points(), 3);
        assert_eq!(dataset.point(2), [0.0, 1.0, 0.0]);
        assert_eq!(
            dataset.array("h").map(|a| a.values().to_vec()),
            Some(vec![1.0, 2.0, 3.0])
        );
        assert!(dataset.array("only_first").is_none());
    }

    #[test]
    fn rectilinear_grid_coordinates() {
        let content = r#"<VTKFile type="RectilinearGrid" version="0.1">
  <RectilinearGrid WholeExtent="0 1 0 1 0 0">
    <Piece Extent="0 1 0 1 0 0">
      <PointData>
        <DataArray type="UInt8" Name="h" format="ascii">1 2 3 4</DataArray>
      </PointData>
      <Coordinates>
        <DataArray type="Float64" format="ascii">0 10</DataArray>
        <DataArray type="Float64" format="ascii">0 20</DataArray>
        <DataArray type="Float64" format="ascii">0</DataArray>
      </Coordinates>
    </Piece>
  </RectilinearGrid>
</VTKFile>"#;
        let Ok(dataset) = parse_xml(content) else {
            panic!("parse failed");
        };
        assert_eq!(dataset.point(3), [10.0, 20.0, 0.0]);
    }

    #[test]
    fn unsupported_content_is_rejected() {
        let multiblock = r#"<VTKFile type="vtkMultiBlockDataSet" version="1.0"></VTKFile>"#;
        assert!(matches!(
            parse_xml(multiblock),
            Err(ElevationError::InvalidContent { .. })
        ));

        let appended = r#"<VTKFile type="PolyData" version="0.1">
  <PolyData><Piece NumberOfPoints="1">
    <Points><DataArray type="Float32" NumberOfComponents="3" format="appended" offset="0"/></Points>
  </Piece></PolyData>
</VTKFile>"#;
        assert!(parse_xml(appended).is_err());

        let short = r#"<VTKFile type="PolyData" version="0.1">
  <PolyData><Piece NumberOfPoints="2">
    <PointData><DataArray type="Float64" Name="h" format="ascii">1</DataArray></PointData>
    <Points><DataArray type="Float64" NumberOfComponents="3" format="ascii">0 0 0 1 0 0</DataArray></Points>
  </Piece></PolyData>
</VTKFile>"#;
        assert!(matches!(
            parse_xml(short),
            Err(ElevationError::ArrayLengthMismatch { len: 1, points: 2, .. })
        ));
    }

    #[test]
    fn non_ascii_binary_payload_is_invalid_content() {
        let content = r#"<VTKFile type="PolyData" version="0.1" header_type="UInt64">
  <PolyData><Piece NumberOfPoints="1">
    <Points><DataArray type="Float32" NumberOfComponents="3" format="binary">AAAAAAAAAAAéAAAA</DataArray></Points>
  </Piece></PolyData>
</VTKFile>"#;
        assert!(matches!(
            parse_xml(content),
            Err(ElevationError::InvalidContent { .. })
        ));
    }

    #[test]
    fn declared_length_past_the_payload_is_truncation() {
        // A UInt64 header announcing u64::MAX bytes of data.
        let text = STANDARD.encode(u64::MAX.to_le_bytes());
        let content = format!(
            r#"<VTKFile type="PolyData" version="0.1" byte_order="LittleEndian" header_type="UInt64">
  <PolyData><Piece NumberOfPoints="1">
    <Points><DataArray type="Float32" NumberOfComponents="3" format="binary">{text}</DataArray></Points>
  </Piece></PolyData>
</VTKFile>"#
        );
        assert!(matches!(
            parse_xml(&content),
            Err(ElevationError::InvalidContent { .. })
        ));
    }

    #[test]
    fn image_extent_is_checked_against_its_arrays() {
        let content = r#"<VTKFile type="ImageData" version="0.1">
  <ImageData WholeExtent="0 99999 0 99999 0 99999" Origin="0 0 0" Spacing="1 1 1">
    <Piece Extent="0 99999 0 99999 0 99999">
      <PointData><DataArray type="Float64" Name="h" format="ascii">1 2 3 4</DataArray></PointData>
    </Piece>
  </ImageData>
</VTKFile>"#;
        assert!(matches!(
            parse_xml(content),
            Err(ElevationError::ArrayLengthMismatch { len: 4, .. })
        ));

        let overflowing = content.replace("0 99999 0 99999 0 99999", "-9223372036854775808 0 0 1 0 1");
        assert!(matches!(
            parse_xml(&overflowing),
            Err(ElevationError::InvalidContent { .. })
        ));
    }

    #[test]
    fn extent_sizes() {
        assert_eq!(extent_size([0, 2, 0, 1, 0, 0]).ok(), Some(6));
        assert_eq!(extent_size([3, 2, 0, 1, 0, 0]).ok(), Some(0));
        assert!(extent_size([0, i64::MAX, 0, 0, 0, 0]).is_err());
    }
}
