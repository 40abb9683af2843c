//! Synthetic grid fixtures shared by the integration tests.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::Path;

use itertools::Itertools;
use noise::{NoiseFn, ScalePoint, SuperSimplex};
use rand::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Smooth pseudo-random heights on an `nx x ny` lattice, x varying fastest.
pub fn terrain(seed: u32, nx: usize, ny: usize) -> Vec<f64> {
    let source = ScalePoint::new(SuperSimplex::new(seed)).set_scale(0.2);
    (0..ny)
        .flat_map(|j| (0..nx).map(move |i| (i, j)))
        .map(|(i, j)| 100.0 * source.get([i as f64, j as f64]))
        .collect()
}

/// `n` planar points scattered uniformly over `[0, 10)^2`.
pub fn scattered(seed: u64, n: usize) -> Vec<[f64; 2]> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.random_range(0.0..10.0), rng.random_range(0.0..10.0)])
        .collect()
}

/// Lattice point coordinates matching [`terrain`] with unit spacing.
pub fn lattice(nx: usize, ny: usize) -> Vec<[f64; 2]> {
    (0..ny)
        .flat_map(|j| (0..nx).map(move |i| [i as f64, j as f64]))
        .collect()
}

/// Writes a legacy ASCII `STRUCTURED_POINTS` file with unit spacing.
pub fn write_structured_points(path: &Path, nx: usize, ny: usize, name: &str, values: &[f64]) {
    let mut text = String::from("# vtk DataFile Version 3.0\nsynthetic terrain\nASCII\n");
    let _ = writeln!(text, "DATASET STRUCTURED_POINTS");
    let _ = writeln!(text, "DIMENSIONS {nx} {ny} 1");
    let _ = writeln!(text, "ORIGIN 0 0 0");
    let _ = writeln!(text, "SPACING 1 1 1");
    let _ = writeln!(text, "POINT_DATA {}", values.len());
    let _ = writeln!(text, "SCALARS {name} double 1");
    let _ = writeln!(text, "LOOKUP_TABLE default");
    let _ = writeln!(text, "{}", values.iter().join(" "));
    write(path, &text);
}

/// Writes a legacy ASCII `POLYDATA` file holding only points.
pub fn write_point_polydata(path: &Path, points: &[[f64; 2]], name: &str, values: &[f64]) {
    let mut text = String::from("# vtk DataFile Version 4.2\nscattered samples\nASCII\n");
    let _ = writeln!(text, "DATASET POLYDATA");
    let _ = writeln!(text, "POINTS {} double", points.len());
    for [x, y] in points {
        let _ = writeln!(text, "{x} {y} 0");
    }
    let _ = writeln!(text, "POINT_DATA {}", values.len());
    let _ = writeln!(text, "SCALARS {name} double");
    let _ = writeln!(text, "LOOKUP_TABLE default");
    let _ = writeln!(text, "{}", values.iter().join(" "));
    write(path, &text);
}

/// Writes an XML `ImageData` file with unit spacing.
pub fn write_image_data(path: &Path, nx: usize, ny: usize, name: &str, values: &[f64]) {
    let extent = format!("0 {} 0 {} 0 0", nx - 1, ny - 1);
    let text = format!(
        r#"<?xml version="1.0"?>
<VTKFile type="ImageData" version="0.1" byte_order="LittleEndian">
  <ImageData WholeExtent="{extent}" Origin="0 0 0" Spacing="1 1 1">
    <Piece Extent="{extent}">
      <PointData Scalars="{name}">
        <DataArray type="Float64" Name="{name}" format="ascii">{}</DataArray>
      </PointData>
      <CellData/>
    </Piece>
  </ImageData>
</VTKFile>
"#,
        values.iter().join(" ")
    );
    write(path, &text);
}

fn write(path: &Path, text: &str) {
    if let Err(e) = std::fs::write(path, text) {
        panic!("cannot write fixture {}: {e}", path.display());
    }
}

/// Reads a file, panicking with the path on failure.
pub fn read(path: &Path) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => panic!("cannot read {}: {e}", path.display()),
    }
}
