//! Error types for elevation map conversion.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for elevation map operations.
pub type ElevationResult<T> = Result<T, ElevationError>;

/// Errors that can occur while converting a grid into an elevation map.
#[derive(Debug, Error)]
pub enum ElevationError {
    /// The input base filename is empty.
    #[error("input base filename is empty")]
    EmptyBaseName,

    /// The scalar array name is empty.
    #[error("array name is empty")]
    EmptyArrayName,

    /// The file index range is inverted.
    #[error("file start index {start} should be less than or equal to file end index {end}")]
    InvertedRange {
        /// First index of the batch.
        start: u32,
        /// Last index of the batch.
        end: u32,
    },

    /// The worker pool could not be built.
    #[error("failed to build worker pool: {message}")]
    WorkerPool {
        /// Message reported by the pool builder.
        message: String,
    },

    /// Unrecognized file extension.
    #[error("file type: {extension} is not supported")]
    UnsupportedFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Invalid file content (parse error).
    #[error("invalid grid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// A point array does not hold one value per point.
    #[error("array {name} holds {len} values but the data set has {points} points")]
    ArrayLengthMismatch {
        /// Name of the offending array.
        name: String,
        /// Number of values in the array.
        len: usize,
        /// Number of points in the data set.
        points: usize,
    },

    /// The data set has no points.
    #[error("no point found in input data set")]
    EmptyDataset,

    /// The requested scalar array is not present.
    #[error("scalar field {name} is not present in the data set")]
    MissingAttribute {
        /// Requested array name.
        name: String,
    },

    /// The requested scalar array has no values.
    #[error("scalar field {name} has no tuples")]
    EmptyAttribute {
        /// Requested array name.
        name: String,
    },

    /// The scalar array does not line up with the triangulated vertices.
    #[error("scalar field {name} has {values} values but the surface has {vertices} vertices")]
    AttributeSizeMismatch {
        /// Name of the reattached array.
        name: String,
        /// Number of values available for reattachment.
        values: usize,
        /// Number of vertices in the triangulated surface.
        vertices: usize,
    },

    /// Triangulation produced no triangles (fewer than three points, or all collinear).
    #[error("triangulation of {points} points produced no triangles")]
    DegenerateTriangulation {
        /// Number of points handed to the triangulator.
        points: usize,
    },

    /// No extension separator in a filename.
    #[error("no dot can be found in the input file name: {name}")]
    MalformedFilename {
        /// The offending filename.
        name: String,
    },

    /// Converting a file panicked.
    #[error("conversion aborted: {message}")]
    ConversionPanicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`ElevationError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid arguments or batch settings.
    Configuration,
    /// Unrecognized file extension.
    Format,
    /// Unreadable or unusable input data.
    InputData,
    /// Attribute and mesh disagree after triangulation.
    Consistency,
    /// A filename could not be derived.
    Filename,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Format => "format",
            Self::InputData => "input data",
            Self::Consistency => "consistency",
            Self::Filename => "filename",
        };
        f.write_str(label)
    }
}

impl ElevationError {
    /// Create an `InvalidContent` error with the given message.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Which part of the error taxonomy this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyBaseName
            | Self::EmptyArrayName
            | Self::InvertedRange { .. }
            | Self::WorkerPool { .. } => ErrorCategory::Configuration,
            Self::UnsupportedFormat { .. } => ErrorCategory::Format,
            Self::FileNotFound { .. }
            | Self::InvalidContent { .. }
            | Self::ArrayLengthMismatch { .. }
            | Self::EmptyDataset
            | Self::MissingAttribute { .. }
            | Self::EmptyAttribute { .. }
            | Self::ConversionPanicked { .. }
            | Self::Io(_) => ErrorCategory::InputData,
            Self::AttributeSizeMismatch { .. } | Self::DegenerateTriangulation { .. } => {
                ErrorCategory::Consistency
            }
            Self::MalformedFilename { .. } => ErrorCategory::Filename,
        }
    }
}
