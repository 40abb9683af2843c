//! Input and output filename templating.

use crate::error::{ElevationError, ElevationResult};

/// Prefix prepended to every output filename.
pub const OUTPUT_PREFIX: &str = "ElevatedMap-";

/// Extension of every output file, regardless of the input family.
pub const OUTPUT_EXTENSION: &str = "vtp";

/// Builds the input filename `base + index + "." + extension`.
///
/// The index is written in plain decimal, without zero padding.
#[must_use]
pub fn input_name(base: &str, index: u32, extension: &str) -> String {
    format!("{base}{index}.{extension}")
}

/// Derives the output filename from an input filename.
///
/// The extension after the last `.` is stripped and the remaining stem is
/// wrapped as `ElevatedMap-<stem>.vtp`.
///
/// # Errors
///
/// Returns [`ElevationError::MalformedFilename`] if `input_name` contains no `.`.
pub fn output_name(input_name: &str) -> ElevationResult<String> {
    let dot = input_name
        .rfind('.')
        .ok_or_else(|| ElevationError::MalformedFilename {
            name: input_name.to_string(),
        })?;
    let stem = &input_name[..dot];
    Ok(format!("{OUTPUT_PREFIX}{stem}.{OUTPUT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_name_has_no_padding() {
        assert_eq!(input_name("Grid-", 5, "vtk"), "Grid-5.vtk");
        assert_eq!(input_name("MyFile-", 120, "vti"), "MyFile-120.vti");
        assert_eq!(input_name("", 0, "vts"), "0.vts");
    }

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_name("Grid-5.vtk").ok().as_deref(), Some("ElevatedMap-Grid-5.vtp"));
        assert_eq!(output_name("Grid-5.vtp").ok().as_deref(), Some("ElevatedMap-Grid-5.vtp"));
    }

    #[test]
    fn output_name_strips_only_last_extension() {
        assert_eq!(
            output_name("run.2.field-7.vtu").ok().as_deref(),
            Some("ElevatedMap-run.2.field-7.vtp")
        );
    }

    #[test]
    fn output_name_requires_a_dot() {
        assert!(matches!(
            output_name("Grid-5"),
            Err(ElevationError::MalformedFilename { ref name }) if name == "Grid-5"
        ));
    }
}
