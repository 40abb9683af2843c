//! Input file family detection.

use crate::error::{ElevationError, ElevationResult};

/// Extensions read by the legacy reader.
pub const LEGACY_EXTENSIONS: &[&str] = &["vtk"];

/// Extensions read by the XML reader.
pub const TAGGED_EXTENSIONS: &[&str] = &["vti", "vtp", "vtu", "vtr", "vts"];

/// Family of grid file formats an extension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFamily {
    /// Monolithic legacy `.vtk` files.
    Legacy,
    /// XML-tagged `.vt?` files.
    Tagged,
}

impl FileFamily {
    /// Classify a file extension (without the leading dot).
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::UnsupportedFormat`] for any extension outside
    /// [`LEGACY_EXTENSIONS`] and [`TAGGED_EXTENSIONS`].
    pub fn classify(extension: &str) -> ElevationResult<Self> {
        if LEGACY_EXTENSIONS.contains(&extension) {
            Ok(Self::Legacy)
        } else if TAGGED_EXTENSIONS.contains(&extension) {
            Ok(Self::Tagged)
        } else {
            Err(ElevationError::UnsupportedFormat {
                extension: extension.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_extension() {
        assert_eq!(FileFamily::classify("vtk").ok(), Some(FileFamily::Legacy));
    }

    #[test]
    fn tagged_extensions() {
        for ext in TAGGED_EXTENSIONS {
            assert_eq!(FileFamily::classify(ext).ok(), Some(FileFamily::Tagged));
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = FileFamily::classify("obj");
        assert!(matches!(
            err,
            Err(ElevationError::UnsupportedFormat { ref extension }) if extension == "obj"
        ));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(FileFamily::classify("VTK").is_err());
        assert!(FileFamily::classify(".vtp").is_err());
        assert!(FileFamily::classify("").is_err());
    }
}
