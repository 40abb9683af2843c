//! Legacy `.vtk` reader.
//!
//! The legacy format is line oriented: keyword lines followed by blocks of
//! values. In BINARY files the value blocks are raw big-endian data that
//! start right after the keyword line's newline.

use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use super::{first_components, image_points, read_bytes, rectilinear_points};
use crate::dataset::{Dataset, ScalarArray, ScalarType};
use crate::error::{ElevationError, ElevationResult};

/// Load a legacy VTK file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a supported legacy
/// data set.
pub fn read_legacy<P: AsRef<Path>>(path: P) -> ElevationResult<Dataset> {
    let bytes = read_bytes(path.as_ref())?;
    parse_legacy(&bytes)
}

/// Parse the contents of a legacy VTK file.
///
/// # Errors
///
/// Returns [`ElevationError::InvalidContent`] for malformed or unsupported
/// content, or [`ElevationError::ArrayLengthMismatch`] if a point array does
/// not match the number of points.
pub fn parse_legacy(bytes: &[u8]) -> ElevationResult<Dataset> {
    let mut cursor = Cursor::new(bytes);

    let header = cursor
        .raw_line()?
        .ok_or_else(|| ElevationError::invalid_content("empty legacy file"))?;
    if !header.starts_with("# vtk DataFile") {
        return Err(ElevationError::invalid_content(
            "missing '# vtk DataFile' header",
        ));
    }
    // Title line.
    cursor.raw_line()?;

    let encoding = match cursor.next_line()? {
        Some(line) if line.eq_ignore_ascii_case("ASCII") => Encoding::Ascii,
        Some(line) if line.eq_ignore_ascii_case("BINARY") => Encoding::Binary,
        other => {
            return Err(ElevationError::invalid_content(format!(
                "expected ASCII or BINARY, found {other:?}"
            )))
        }
    };

    LegacyReader {
        cursor,
        encoding,
        geometry: Geometry::default(),
        section: Section::Geometry,
        point_data_size: None,
        arrays: Vec::new(),
    }
    .read()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    Binary,
}

/// Which part of the file keyword lines currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Geometry,
    PointData(usize),
    CellData(usize),
}

#[derive(Debug, Default)]
struct Geometry {
    kind: Option<String>,
    dimensions: Option<[usize; 3]>,
    origin: Option<[f64; 3]>,
    spacing: Option<[f64; 3]>,
    points: Option<Vec<f64>>,
    coordinates: [Option<Vec<f64>>; 3],
}

struct LegacyReader<'a> {
    cursor: Cursor<'a>,
    encoding: Encoding,
    geometry: Geometry,
    section: Section,
    point_data_size: Option<usize>,
    arrays: Vec<ScalarArray>,
}

impl LegacyReader<'_> {
    fn read(mut self) -> ElevationResult<Dataset> {
        while let Some(line) = self.cursor.next_line()? {
            let mut words = line.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };
            let keyword = keyword.to_ascii_uppercase();
            let rest: Vec<&str> = words.collect();
            self.keyword(&keyword, &rest)?;
        }

        let points = self.build_points()?;
        let mut dataset = Dataset::from_points(points);
        if let Some(size) = self.point_data_size {
            if size != dataset.n_points() {
                return Err(ElevationError::invalid_content(format!(
                    "POINT_DATA declares {size} values for {} points",
                    dataset.n_points()
                )));
            }
        }
        for array in self.arrays {
            dataset.add_array(array)?;
        }
        debug!(
            points = dataset.n_points(),
            arrays = dataset.arrays().len(),
            "legacy data set parsed"
        );
        Ok(dataset)
    }

    fn keyword(&mut self, keyword: &str, rest: &[&str]) -> ElevationResult<()> {
        match keyword {
            "DATASET" => {
                self.geometry.kind = Some(word(rest, 0, "DATASET type")?.to_ascii_uppercase());
            }
            "DIMENSIONS" => self.geometry.dimensions = Some(triple(rest, "DIMENSIONS")?),
            "ORIGIN" => self.geometry.origin = Some(triple(rest, "ORIGIN")?),
            "SPACING" | "ASPECT_RATIO" => self.geometry.spacing = Some(triple(rest, keyword)?),
            "POINTS" => {
                let n: usize = parse(rest, 0, "POINTS count")?;
                let ty = data_type(rest, 1)?;
                self.geometry.points = Some(self.values(product(&[n, 3], "POINTS")?, ty)?);
            }
            "X_COORDINATES" | "Y_COORDINATES" | "Z_COORDINATES" => {
                let n: usize = parse(rest, 0, keyword)?;
                let ty = data_type(rest, 1)?;
                let axis = match keyword.as_bytes()[0] {
                    b'X' => 0,
                    b'Y' => 1,
                    _ => 2,
                };
                self.geometry.coordinates[axis] = Some(self.values(n, ty)?);
            }
            "CELLS" | "VERTICES" | "LINES" | "POLYGONS" | "TRIANGLE_STRIPS" => {
                self.skip_cells(rest, keyword)?;
            }
            "CELL_TYPES" => {
                let n: usize = parse(rest, 0, "CELL_TYPES count")?;
                self.skip_values(n, ScalarType::Int32)?;
            }
            "POINT_DATA" => {
                let n: usize = parse(rest, 0, "POINT_DATA count")?;
                self.point_data_size = Some(n);
                self.section = Section::PointData(n);
            }
            "CELL_DATA" => {
                let n: usize = parse(rest, 0, "CELL_DATA count")?;
                self.section = Section::CellData(n);
            }
            "FIELD" => self.field(rest)?,
            "METADATA" => self.cursor.skip_block()?,
            _ => match self.section {
                Section::PointData(n) => self.attribute(keyword, rest, n, true)?,
                Section::CellData(n) => self.attribute(keyword, rest, n, false)?,
                Section::Geometry => {
                    return Err(ElevationError::invalid_content(format!(
                        "unexpected keyword {keyword}"
                    )))
                }
            },
        }
        Ok(())
    }

    /// Read one data set attribute. Only `SCALARS` are kept, and only for
    /// point data.
    fn attribute(
        &mut self,
        keyword: &str,
        rest: &[&str],
        n: usize,
        is_point_data: bool,
    ) -> ElevationResult<()> {
        match keyword {
            "SCALARS" => {
                let name = word(rest, 0, "SCALARS name")?;
                let ty = data_type(rest, 1)?;
                let components = match rest.get(2) {
                    Some(_) => parse(rest, 2, "SCALARS components")?,
                    None => 1,
                };
                if self.cursor.keyword_follows("LOOKUP_TABLE") {
                    self.cursor.next_line()?;
                } else if self.encoding == Encoding::Binary {
                    return Err(ElevationError::invalid_content(format!(
                        "SCALARS {name} is missing its LOOKUP_TABLE line"
                    )));
                }
                let values = self.values(product(&[n, components], "SCALARS")?, ty)?;
                if is_point_data {
                    self.arrays.push(
                        ScalarArray::new(name, first_components(&values, components)).with_type(ty),
                    );
                }
            }
            "COLOR_SCALARS" => {
                let width: usize = parse(rest, 1, "COLOR_SCALARS components")?;
                let ty = self.color_type();
                self.skip_values(product(&[n, width], "COLOR_SCALARS")?, ty)?;
            }
            "LOOKUP_TABLE" => {
                let size: usize = parse(rest, 1, "LOOKUP_TABLE size")?;
                let ty = self.color_type();
                self.skip_values(product(&[size, 4], "LOOKUP_TABLE")?, ty)?;
            }
            "VECTORS" | "NORMALS" => {
                let ty = data_type(rest, 1)?;
                self.skip_values(product(&[n, 3], keyword)?, ty)?;
            }
            "TEXTURE_COORDINATES" => {
                let dim: usize = parse(rest, 1, "TEXTURE_COORDINATES dimension")?;
                let ty = data_type(rest, 2)?;
                self.skip_values(product(&[n, dim], "TEXTURE_COORDINATES")?, ty)?;
            }
            "TENSORS" => {
                let ty = data_type(rest, 1)?;
                self.skip_values(product(&[n, 9], "TENSORS")?, ty)?;
            }
            "TENSORS6" => {
                let ty = data_type(rest, 1)?;
                self.skip_values(product(&[n, 6], "TENSORS6")?, ty)?;
            }
            "GLOBAL_IDS" | "PEDIGREE_IDS" => {
                let ty = data_type(rest, 1)?;
                self.skip_values(n, ty)?;
            }
            other => {
                return Err(ElevationError::invalid_content(format!(
                    "unsupported attribute {other}"
                )))
            }
        }
        Ok(())
    }

    /// `FIELD name count` followed by `count` arrays of the form
    /// `name components tuples type`. Arrays are kept only inside point data.
    fn field(&mut self, rest: &[&str]) -> ElevationResult<()> {
        let count: usize = parse(rest, 1, "FIELD array count")?;
        let keep = matches!(self.section, Section::PointData(_));
        for _ in 0..count {
            let line = self
                .cursor
                .next_line()?
                .ok_or_else(|| ElevationError::invalid_content("truncated FIELD block"))?;
            let header: Vec<&str> = line.split_whitespace().collect();
            let name = word(&header, 0, "field array name")?;
            let components: usize = parse(&header, 1, "field array components")?;
            let tuples: usize = parse(&header, 2, "field array tuples")?;
            let ty = data_type(&header, 3)?;
            let count = product(&[components, tuples], name)?;
            if keep {
                let values = self.values(count, ty)?;
                self.arrays.push(
                    ScalarArray::new(name, first_components(&values, components)).with_type(ty),
                );
            } else {
                self.skip_values(count, ty)?;
            }
            if self.cursor.keyword_follows("METADATA") {
                self.cursor.next_line()?;
                self.cursor.skip_block()?;
            }
        }
        Ok(())
    }

    /// Cell blocks come in two layouts: the classic `CELLS n size` with
    /// `size` packed integers, and the 5.1 layout with separate `OFFSETS` and
    /// `CONNECTIVITY` arrays.
    fn skip_cells(&mut self, rest: &[&str], keyword: &str) -> ElevationResult<()> {
        let first: usize = parse(rest, 0, keyword)?;
        let second: usize = parse(rest, 1, keyword)?;
        if self.cursor.keyword_follows("OFFSETS") {
            for (label, count) in [("OFFSETS", first), ("CONNECTIVITY", second)] {
                let line = self.cursor.next_line()?.unwrap_or_default();
                let header: Vec<&str> = line.split_whitespace().collect();
                if header.first().map(|w| w.to_ascii_uppercase()).as_deref() != Some(label) {
                    return Err(ElevationError::invalid_content(format!(
                        "expected {label} in {keyword} block"
                    )));
                }
                let ty = data_type(&header, 1)?;
                self.skip_values(count, ty)?;
            }
            Ok(())
        } else {
            self.skip_values(second, ScalarType::Int32)
        }
    }

    fn color_type(&self) -> ScalarType {
        match self.encoding {
            Encoding::Ascii => ScalarType::Float32,
            Encoding::Binary => ScalarType::UInt8,
        }
    }

    fn values(&mut self, count: usize, ty: ScalarType) -> ElevationResult<Vec<f64>> {
        match self.encoding {
            Encoding::Ascii => self.cursor.ascii_values(count),
            Encoding::Binary => {
                let bytes = self.cursor.take(product(&[count, ty.size()], "binary")?)?;
                ty.decode(bytes, true)
            }
        }
    }

    fn skip_values(&mut self, count: usize, ty: ScalarType) -> ElevationResult<()> {
        match self.encoding {
            Encoding::Ascii => {
                for _ in 0..count {
                    self.cursor
                        .token()
                        .ok_or_else(|| ElevationError::invalid_content("unexpected end of values"))?;
                }
            }
            Encoding::Binary => {
                self.cursor.take(product(&[count, ty.size()], "binary")?)?;
            }
        }
        Ok(())
    }

    /// Lattice geometry is generated rather than read, so its size is checked
    /// against `POINT_DATA` before any point is built.
    fn check_lattice(&self, sizes: [usize; 3]) -> ElevationResult<()> {
        let total = product(&sizes, "lattice point")?;
        match self.point_data_size {
            Some(size) if size != total => Err(ElevationError::invalid_content(format!(
                "POINT_DATA declares {size} values for {total} points"
            ))),
            _ => Ok(()),
        }
    }

    fn build_points(&mut self) -> ElevationResult<Vec<[f64; 3]>> {
        let kind = self
            .geometry
            .kind
            .take()
            .ok_or_else(|| ElevationError::invalid_content("missing DATASET line"))?;
        match kind.as_str() {
            "STRUCTURED_POINTS" => {
                let dims = self
                    .geometry
                    .dimensions
                    .ok_or_else(|| ElevationError::invalid_content("missing DIMENSIONS"))?;
                self.check_lattice(dims)?;
                let extent = dims_to_extent(dims)?;
                Ok(image_points(
                    extent,
                    self.geometry.origin.unwrap_or([0.0; 3]),
                    self.geometry.spacing.unwrap_or([1.0; 3]),
                ))
            }
            "RECTILINEAR_GRID" => {
                let [xs, ys, zs] = std::mem::take(&mut self.geometry.coordinates);
                match (xs, ys, zs) {
                    (Some(xs), Some(ys), Some(zs)) => {
                        self.check_lattice([xs.len(), ys.len(), zs.len()])?;
                        Ok(rectilinear_points(&xs, &ys, &zs))
                    }
                    _ => Err(ElevationError::invalid_content(
                        "RECTILINEAR_GRID requires X, Y and Z coordinates",
                    )),
                }
            }
            "STRUCTURED_GRID" | "POLYDATA" | "UNSTRUCTURED_GRID" => {
                let flat = self
                    .geometry
                    .points
                    .take()
                    .ok_or_else(|| ElevationError::invalid_content("missing POINTS"))?;
                Ok(flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect())
            }
            other => Err(ElevationError::invalid_content(format!(
                "unsupported DATASET type {other}"
            ))),
        }
    }
}

/// Product of declared counts, rejecting values that overflow `usize`.
fn product(factors: &[usize], what: &str) -> ElevationResult<usize> {
    factors
        .iter()
        .try_fold(1_usize, |acc, &f| acc.checked_mul(f))
        .ok_or_else(|| ElevationError::invalid_content(format!("{what} count is too large")))
}

fn dims_to_extent(dims: [usize; 3]) -> ElevationResult<[i64; 6]> {
    let mut extent = [0_i64; 6];
    for (axis, &n) in dims.iter().enumerate() {
        let n = i64::try_from(n)
            .map_err(|_| ElevationError::invalid_content("DIMENSIONS out of range"))?;
        extent[2 * axis + 1] = n - 1;
    }
    Ok(extent)
}

fn word<'w>(words: &[&'w str], index: usize, what: &str) -> ElevationResult<&'w str> {
    words
        .get(index)
        .copied()
        .ok_or_else(|| ElevationError::invalid_content(format!("missing {what}")))
}

fn parse<T: FromStr>(words: &[&str], index: usize, what: &str) -> ElevationResult<T> {
    let raw = word(words, index, what)?;
    raw.parse()
        .map_err(|_| ElevationError::invalid_content(format!("invalid {what}: {raw}")))
}

fn triple<T: FromStr + Copy + Default>(words: &[&str], what: &str) -> ElevationResult<[T; 3]> {
    let mut out = [T::default(); 3];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = parse(words, i, what)?;
    }
    Ok(out)
}

fn data_type(words: &[&str], index: usize) -> ElevationResult<ScalarType> {
    let raw = word(words, index, "data type")?;
    ScalarType::from_legacy_name(raw)
        .ok_or_else(|| ElevationError::invalid_content(format!("unsupported data type {raw}")))
}

/// Byte cursor over a legacy file.
#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Next line without its terminator, or `None` at end of input.
    fn raw_line(&mut self) -> ElevationResult<Option<&'a str>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        let line = std::str::from_utf8(&rest[..end])
            .map_err(|e| ElevationError::invalid_content(format!("invalid UTF-8 in keyword line: {e}")))?;
        Ok(Some(line.trim_end_matches('\r')))
    }

    /// Next non-blank line, trimmed.
    fn next_line(&mut self) -> ElevationResult<Option<&'a str>> {
        while let Some(line) = self.raw_line()? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Whether the next non-whitespace bytes spell `keyword`.
    fn keyword_follows(&self, keyword: &str) -> bool {
        self.data[self.pos..]
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .is_some_and(|start| {
                self.data[self.pos + start..]
                    .get(..keyword.len())
                    .is_some_and(|w| w.eq_ignore_ascii_case(keyword.as_bytes()))
            })
    }

    /// Skip lines up to and including the next blank line.
    fn skip_block(&mut self) -> ElevationResult<()> {
        while let Some(line) = self.raw_line()? {
            if line.trim().is_empty() {
                break;
            }
        }
        Ok(())
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let start = rest.iter().position(|b| !b.is_ascii_whitespace())?;
        let len = rest[start..]
            .iter()
            .position(u8::is_ascii_whitespace)
            .unwrap_or(rest.len() - start);
        self.pos += start + len;
        Some(&rest[start..start + len])
    }

    fn ascii_values(&mut self, count: usize) -> ElevationResult<Vec<f64>> {
        // Every value takes at least one byte of input.
        let mut values = Vec::with_capacity(count.min(self.data.len() - self.pos));
        for _ in 0..count {
            let token = self
                .token()
                .ok_or_else(|| ElevationError::invalid_content("unexpected end of values"))?;
            let value = std::str::from_utf8(token)
                .ok()
                .and_then(|t| t.parse::<f64>().ok())
                .ok_or_else(|| {
                    ElevationError::invalid_content(format!(
                        "invalid value {}",
                        String::from_utf8_lossy(token)
                    ))
                })?;
            values.push(value);
        }
        Ok(values)
    }

    fn take(&mut self, len: usize) -> ElevationResult<&'a [u8]> {
        let bytes = self
            .pos
            .checked_add(len)
            .and_then(|end| self.data.get(self.pos..end))
            .ok_or_else(|| ElevationError::invalid_content("unexpected end of binary data"))?;
        self.pos += len;
        Ok(bytes)
    }
}
