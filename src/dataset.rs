//! In-memory representation of a loaded 2D grid.
//!
//! A [`Dataset`] is a flat sequence of points with any number of named
//! per-point [`ScalarArray`]s attached. Grid topology is not kept: only the
//! point positions and their ordering matter for elevation lifting.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{ElevationError, ElevationResult};

/// Numeric type a scalar array was stored as on disk.
///
/// Values are always held as `f64` in memory; the type is kept so that the
/// writer can emit the array with its original VTK type.
///
/// `Int64` and `UInt64` values are exact only up to `2^53` in magnitude.
/// Larger values are rounded to the nearest representable `f64` when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Single precision float.
    Float32,
    /// Double precision float.
    Float64,
}

impl ScalarType {
    /// Parse a type name as used by the `type` attribute of XML data arrays.
    pub fn from_xml_name(name: &str) -> Option<Self> {
        match name {
            "Int8" | "Char" => Some(Self::Int8),
            "UInt8" | "UnsignedChar" => Some(Self::UInt8),
            "Int16" => Some(Self::Int16),
            "UInt16" => Some(Self::UInt16),
            "Int32" => Some(Self::Int32),
            "UInt32" => Some(Self::UInt32),
            "Int64" | "IdType" => Some(Self::Int64),
            "UInt64" => Some(Self::UInt64),
            "Float32" => Some(Self::Float32),
            "Float64" => Some(Self::Float64),
            _ => None,
        }
    }

    /// Parse a data type keyword of the legacy format.
    pub fn from_legacy_name(name: &str) -> Option<Self> {
        match name {
            "char" => Some(Self::Int8),
            "unsigned_char" => Some(Self::UInt8),
            "short" => Some(Self::Int16),
            "unsigned_short" => Some(Self::UInt16),
            "int" => Some(Self::Int32),
            "unsigned_int" => Some(Self::UInt32),
            "long" | "vtktypeint64" | "vtkIdType" => Some(Self::Int64),
            "unsigned_long" | "vtktypeuint64" => Some(Self::UInt64),
            "float" => Some(Self::Float32),
            "double" => Some(Self::Float64),
            _ => None,
        }
    }

    /// Name used for the `type` attribute of XML data arrays.
    pub const fn xml_name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }

    /// Size of one value in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Whether values of this type are integers.
    pub fn is_integral(self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64)
    }

    /// Decode a packed buffer of values of this type.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::InvalidContent`] if the buffer length is not
    /// a multiple of the value size.
    pub fn decode(self, bytes: &[u8], big_endian: bool) -> ElevationResult<Vec<f64>> {
        let size = self.size();
        if bytes.len() % size != 0 {
            return Err(ElevationError::invalid_content(format!(
                "{} bytes do not hold a whole number of {} values",
                bytes.len(),
                self.xml_name()
            )));
        }
        Ok(bytes
            .chunks_exact(size)
            .map(|chunk| self.decode_one(chunk, big_endian))
            .collect())
    }

    #[allow(clippy::cast_precision_loss)]
    fn decode_one(self, chunk: &[u8], big_endian: bool) -> f64 {
        macro_rules! decode {
            ($ty:ty, $n:expr) => {{
                let mut raw = [0_u8; $n];
                raw.copy_from_slice(chunk);
                if big_endian {
                    <$ty>::from_be_bytes(raw)
                } else {
                    <$ty>::from_le_bytes(raw)
                }
            }};
        }
        match self {
            Self::Int8 => f64::from(decode!(i8, 1)),
            Self::UInt8 => f64::from(decode!(u8, 1)),
            Self::Int16 => f64::from(decode!(i16, 2)),
            Self::UInt16 => f64::from(decode!(u16, 2)),
            Self::Int32 => f64::from(decode!(i32, 4)),
            Self::UInt32 => f64::from(decode!(u32, 4)),
            Self::Int64 => decode!(i64, 8) as f64,
            Self::UInt64 => decode!(u64, 8) as f64,
            Self::Float32 => f64::from(decode!(f32, 4)),
            Self::Float64 => decode!(f64, 8),
        }
    }
}

/// A named per-point scalar attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarArray {
    name: String,
    scalar_type: ScalarType,
    values: Array1<f64>,
}

impl ScalarArray {
    /// Create a `Float64` array.
    pub fn new(name: impl Into<String>, values: impl Into<Array1<f64>>) -> Self {
        Self {
            name: name.into(),
            scalar_type: ScalarType::Float64,
            values: values.into(),
        }
    }

    /// Set the on-disk type of the array.
    pub fn with_type(mut self, scalar_type: ScalarType) -> Self {
        self.scalar_type = scalar_type;
        self
    }

    /// Array name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// On-disk type of the array.
    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    /// Values in point order.
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, if in range.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Replace the values, keeping name and type.
    pub(crate) fn map_values(self, values: Array1<f64>) -> Self {
        Self { values, ..self }
    }
}

/// A loaded 2D grid: points plus named per-point scalar arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    points: Array2<f64>,
    arrays: Vec<ScalarArray>,
}

impl Dataset {
    /// Create a data set from an `N x 3` coordinate array.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::InvalidContent`] if `points` does not have
    /// three columns.
    pub fn new(points: Array2<f64>) -> ElevationResult<Self> {
        if points.ncols() != 3 {
            return Err(ElevationError::invalid_content(format!(
                "points must have 3 components, got {}",
                points.ncols()
            )));
        }
        Ok(Self {
            points,
            arrays: Vec::new(),
        })
    }

    /// Create a data set from a list of coordinates.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        Self {
            points: Array2::from(points),
            arrays: Vec::new(),
        }
    }

    /// Attach a scalar array, consuming and returning the data set.
    ///
    /// # Errors
    ///
    /// See [`Dataset::add_array`].
    pub fn with_array(mut self, array: ScalarArray) -> ElevationResult<Self> {
        self.add_array(array)?;
        Ok(self)
    }

    /// Attach a scalar array. An existing array with the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::ArrayLengthMismatch`] if the array does not
    /// hold exactly one value per point.
    pub fn add_array(&mut self, array: ScalarArray) -> ElevationResult<()> {
        if array.len() != self.n_points() {
            return Err(ElevationError::ArrayLengthMismatch {
                name: array.name.clone(),
                len: array.len(),
                points: self.n_points(),
            });
        }
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
        Ok(())
    }

    /// Number of points.
    pub fn n_points(&self) -> usize {
        self.points.nrows()
    }

    /// Coordinates of point `index`, copied out of the data set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_points()`.
    pub fn point(&self, index: usize) -> [f64; 3] {
        let row = self.points.row(index);
        [row[0], row[1], row[2]]
    }

    /// All coordinates as an `N x 3` view.
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    /// Array named `name`, if present.
    pub fn array(&self, name: &str) -> Option<&ScalarArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// All attached arrays in attachment order.
    pub fn arrays(&self) -> &[ScalarArray] {
        &self.arrays
    }

    /// Consume the data set, keeping only the array named `name`.
    pub fn into_array(self, name: &str) -> Option<ScalarArray> {
        self.arrays.into_iter().find(|a| a.name == name)
    }
}
