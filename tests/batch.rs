mod common;

use std::path::Path;
use std::thread;

use elevation_map::{
    run, BatchConfig, ElevationError, ElevationPipeline, ErrorCategory, FailurePolicy, FileOutcome,
};

const NX: usize = 8;
const NY: usize = 7;

fn pipeline() -> ElevationPipeline {
    ElevationPipeline::default()
}

/// Writes `Grid-{i}.vtk` for every listed index.
fn write_series(dir: &Path, indices: impl IntoIterator<Item = u32>) {
    for i in indices {
        let heights = common::terrain(i, NX, NY);
        common::write_structured_points(&dir.join(format!("Grid-{i}.vtk")), NX, NY, "Height", &heights);
    }
}

fn output_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|e| e.file_name().into_string().ok())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn concurrent_batch_matches_sequential() {
    let (Ok(input), Ok(sequential), Ok(concurrent)) =
        (tempfile::tempdir(), tempfile::tempdir(), tempfile::tempdir())
    else {
        panic!("no temp dir");
    };
    write_series(input.path(), 1..=20);

    let base = BatchConfig::new("Grid-", 1, 20, "vtk", "Height").with_input_dir(input.path());
    let one = base.clone().with_jobs(1).with_output_dir(sequential.path());
    let many = base.with_jobs(4).with_output_dir(concurrent.path());

    let (Ok(a), Ok(b)) = (run(&one, &pipeline(), |_| {}), run(&many, &pipeline(), |_| {})) else {
        panic!("batch failed");
    };
    assert!(a.is_success());
    assert!(b.is_success());
    assert_eq!(a.converted(), b.converted());

    let names = output_files(sequential.path());
    assert_eq!(names.len(), 20);
    assert_eq!(names, output_files(concurrent.path()));
    for name in &names {
        assert!(name.starts_with("ElevatedMap-Grid-") && name.ends_with(".vtp"));
        assert_eq!(
            common::read(&sequential.path().join(name)),
            common::read(&concurrent.path().join(name)),
            "{name} differs"
        );
    }
}

#[test]
fn inverted_range_fails_before_io() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("no temp dir");
    };
    write_series(dir.path(), 1..=3);
    let config = BatchConfig::new("Grid-", 3, 1, "vtk", "Height")
        .with_input_dir(dir.path())
        .with_output_dir(dir.path());

    let mut calls = 0;
    let err = run(&config, &pipeline(), |_| calls += 1).err();
    assert!(matches!(err, Some(ElevationError::InvertedRange { start: 3, end: 1 })));
    assert_eq!(err.map(|e| e.category()), Some(ErrorCategory::Configuration));
    assert_eq!(calls, 0);
    assert!(output_files(dir.path()).iter().all(|n| !n.starts_with("ElevatedMap-")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let config = BatchConfig::new("Grid-", 1, 2, "obj", "Height");
    let err = run(&config, &pipeline(), |_| {}).err();
    assert!(matches!(err, Some(ElevationError::UnsupportedFormat { ref extension }) if extension == "obj"));
    assert_eq!(err.map(|e| e.category()), Some(ErrorCategory::Format));
}

#[test]
fn missing_file_does_not_stop_the_batch() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("no temp dir");
    };
    write_series(dir.path(), [1, 2, 4, 5]);
    let config = BatchConfig::new("Grid-", 1, 5, "vtk", "Height")
        .with_input_dir(dir.path())
        .with_output_dir(dir.path())
        .with_jobs(2);

    let mut notices = Vec::new();
    let Ok(report) = run(&config, &pipeline(), |outcome| {
        if let FileOutcome::Converted { input, output, .. } = outcome {
            notices.push(format!("{} converted to {}.", input.display(), output.display()));
        }
    }) else {
        panic!("batch failed");
    };

    assert_eq!(report.converted(), &[1, 2, 4, 5]);
    assert_eq!(report.failures().len(), 1);
    let failure = &report.failures()[0];
    assert_eq!(failure.index, 3);
    assert!(failure.input.ends_with("Grid-3.vtk"));
    assert!(matches!(failure.error, ElevationError::FileNotFound { .. }));

    assert_eq!(notices.len(), 4);
    assert!(notices.iter().all(|n| n.contains("converted to") && n.ends_with(".vtp.")));
    for i in [1, 2, 4, 5] {
        assert!(dir.path().join(format!("ElevatedMap-Grid-{i}.vtp")).exists());
    }
    assert!(!dir.path().join("ElevatedMap-Grid-3.vtp").exists());
}

#[test]
fn fail_fast_skips_remaining_files() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("no temp dir");
    };
    write_series(dir.path(), [1, 2, 4, 5, 6]);
    let config = BatchConfig::new("Grid-", 1, 6, "vtk", "Height")
        .with_input_dir(dir.path())
        .with_output_dir(dir.path())
        .with_jobs(1)
        .with_policy(FailurePolicy::FailFast);

    let Ok(report) = run(&config, &pipeline(), |_| {}) else {
        panic!("batch failed");
    };
    assert_eq!(report.converted(), &[1, 2]);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.skipped(), &[4, 5, 6]);
    assert!(!report.is_success());
    assert!(!dir.path().join("ElevatedMap-Grid-4.vtp").exists());
}

#[test]
fn sink_runs_on_the_calling_thread() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("no temp dir");
    };
    write_series(dir.path(), 1..=6);
    let config = BatchConfig::new("Grid-", 1, 6, "vtk", "Height")
        .with_input_dir(dir.path())
        .with_output_dir(dir.path())
        .with_jobs(3);

    let caller = thread::current().id();
    let mut threads = Vec::new();
    let report = run(&config, &pipeline(), |_| threads.push(thread::current().id()));
    assert!(report.is_ok_and(|r| r.is_success()));
    assert_eq!(threads.len(), 6);
    assert!(threads.iter().all(|&t| t == caller));
}

#[test]
fn corrupt_file_among_good_ones_is_a_failure() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("no temp dir");
    };
    write_series(dir.path(), [1, 3]);
    let corrupt = "# vtk DataFile Version 3.0\ncorrupt\nASCII\nDATASET POLYDATA\nPOINTS 6148914691236517206 float\n0 0 0\n";
    if let Err(e) = std::fs::write(dir.path().join("Grid-2.vtk"), corrupt) {
        panic!("cannot write fixture: {e}");
    }
    let config = BatchConfig::new("Grid-", 1, 3, "vtk", "Height")
        .with_input_dir(dir.path())
        .with_output_dir(dir.path())
        .with_jobs(3);

    let Ok(report) = run(&config, &pipeline(), |_| {}) else {
        panic!("batch failed");
    };
    assert_eq!(report.converted(), &[1, 3]);
    assert_eq!(report.failures().len(), 1);
    let failure = &report.failures()[0];
    assert_eq!(failure.index, 2);
    assert!(matches!(failure.error, ElevationError::InvalidContent { .. }));
    assert_eq!(failure.error.category(), ErrorCategory::InputData);
    assert!(dir.path().join("ElevatedMap-Grid-1.vtp").exists());
    assert!(!dir.path().join("ElevatedMap-Grid-2.vtp").exists());
    assert!(dir.path().join("ElevatedMap-Grid-3.vtp").exists());
}
