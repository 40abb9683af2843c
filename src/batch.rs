//! Batch conversion of an index range of grid files on a worker pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{error, info, warn};

use crate::error::{ElevationError, ElevationResult};
use crate::format::FileFamily;
use crate::naming::{input_name, output_name};
use crate::pipeline::{ConversionSummary, ElevationPipeline, GridLoader, MeshWriter};
use crate::triangulate::SurfaceTriangulator;

/// What to do once a file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Report the failure and keep converting the remaining files.
    #[default]
    Continue,
    /// Stop starting new files. Files already in progress still finish.
    FailFast,
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    base_name: String,
    start: u32,
    end: u32,
    extension: String,
    array_name: String,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    jobs: usize,
    policy: FailurePolicy,
}

impl BatchConfig {
    /// Batch over `{base_name}{index}.{extension}` for every index in
    /// `start..=end`, elevating by the array `array_name`.
    pub fn new(
        base_name: impl Into<String>,
        start: u32,
        end: u32,
        extension: impl Into<String>,
        array_name: impl Into<String>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            start,
            end,
            extension: extension.into(),
            array_name: array_name.into(),
            input_dir: None,
            output_dir: None,
            jobs: 0,
            policy: FailurePolicy::Continue,
        }
    }

    /// Read input files from `dir` instead of the working directory.
    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    /// Write output files to `dir` instead of the working directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Number of worker threads. `0` uses one per logical CPU.
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Behaviour after a failed file.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of file indices covered, or zero for an inverted range.
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    /// Whether the range covers no index.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the settings and classifies the input extension.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty base or array name or an
    /// inverted range, and [`ElevationError::UnsupportedFormat`] for an
    /// unknown extension.
    pub fn validate(&self) -> ElevationResult<FileFamily> {
        if self.base_name.is_empty() {
            return Err(ElevationError::EmptyBaseName);
        }
        if self.array_name.is_empty() {
            return Err(ElevationError::EmptyArrayName);
        }
        if self.start > self.end {
            return Err(ElevationError::InvertedRange {
                start: self.start,
                end: self.end,
            });
        }
        FileFamily::classify(&self.extension)
    }

    fn input_path(&self, name: &str) -> PathBuf {
        join(self.input_dir.as_deref(), name)
    }

    fn output_path(&self, name: &str) -> PathBuf {
        join(self.output_dir.as_deref(), name)
    }
}

fn join(dir: Option<&Path>, name: &str) -> PathBuf {
    dir.map_or_else(|| PathBuf::from(name), |d| d.join(name))
}

/// Result of one file of the batch.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was converted and written.
    Converted {
        /// File index.
        index: u32,
        /// Input path.
        input: PathBuf,
        /// Output path.
        output: PathBuf,
        /// Sizes of the written mesh.
        summary: ConversionSummary,
    },
    /// The file could not be converted.
    Failed {
        /// File index.
        index: u32,
        /// Input path.
        input: PathBuf,
        /// Why the conversion failed.
        error: ElevationError,
    },
    /// The file was never started because an earlier file failed.
    Skipped {
        /// File index.
        index: u32,
    },
}

impl FileOutcome {
    /// Index of the file this outcome belongs to.
    #[must_use]
    pub const fn index(&self) -> u32 {
        match self {
            Self::Converted { index, .. } | Self::Failed { index, .. } | Self::Skipped { index } => {
                *index
            }
        }
    }
}

/// A failed file.
#[derive(Debug)]
pub struct FileFailure {
    /// File index.
    pub index: u32,
    /// Input path.
    pub input: PathBuf,
    /// Why the conversion failed.
    pub error: ElevationError,
}

/// Summary of a batch run. Indices are kept in ascending order.
#[derive(Debug, Default)]
pub struct BatchReport {
    converted: Vec<u32>,
    failures: Vec<FileFailure>,
    skipped: Vec<u32>,
}

impl BatchReport {
    /// Indices converted successfully.
    #[must_use]
    pub fn converted(&self) -> &[u32] {
        &self.converted
    }

    /// Files that failed.
    #[must_use]
    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// Indices never started.
    #[must_use]
    pub fn skipped(&self) -> &[u32] {
        &self.skipped
    }

    /// Whether every file was converted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// Number of files accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len() + self.skipped.len()
    }

    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Converted { index, .. } => self.converted.push(index),
            FileOutcome::Failed {
                index,
                input,
                error,
            } => self.failures.push(FileFailure {
                index,
                input,
                error,
            }),
            FileOutcome::Skipped { index } => self.skipped.push(index),
        }
    }

    fn finish(&mut self) {
        self.converted.sort_unstable();
        self.skipped.sort_unstable();
        self.failures.sort_by_key(|f| f.index);
    }
}

/// Converts every file of the batch.
///
/// Files are processed on a dedicated pool of `config` jobs, one file per
/// task, in no particular order. Every outcome is handed to `sink` on the
/// calling thread as soon as it is known, so the sink never runs
/// concurrently with itself.
///
/// # Arguments
/// * `config` - The batch settings.
/// * `pipeline` - The per-file conversion chain.
/// * `sink` - Called once per file index.
///
/// # Returns
/// The report of all files. Per-file failures are recorded there and do not
/// make this function fail.
///
/// # Errors
///
/// Returns a configuration or format error from [`BatchConfig::validate`]
/// before any file is touched, or [`ElevationError::WorkerPool`] if the pool
/// cannot be created.
pub fn run<L, T, W, F>(
    config: &BatchConfig,
    pipeline: &ElevationPipeline<L, T, W>,
    mut sink: F,
) -> ElevationResult<BatchReport>
where
    L: GridLoader,
    T: SurfaceTriangulator,
    W: MeshWriter,
    F: FnMut(&FileOutcome),
{
    let family = config.validate()?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| ElevationError::WorkerPool {
            message: e.to_string(),
        })?;
    info!(
        files = config.len(),
        jobs = pool.current_num_threads(),
        extension = %config.extension,
        array = %config.array_name,
        "batch started"
    );

    let stop = AtomicBool::new(false);
    let (tx, rx) = crossbeam_channel::unbounded::<FileOutcome>();
    let mut report = BatchReport::default();

    std::thread::scope(|scope| {
        let pool = &pool;
        let stop = &stop;
        let indices: Vec<u32> = (config.start..=config.end).collect();
        scope.spawn(move || {
            pool.install(|| {
                indices
                    .into_par_iter()
                    .with_max_len(1)
                    .for_each_with(tx, |tx, index| {
                        process(config, family, pipeline, stop, index, tx);
                    });
            });
        });

        for outcome in &rx {
            log_outcome(&outcome);
            sink(&outcome);
            report.record(outcome);
        }
    });

    report.finish();
    info!(
        converted = report.converted.len(),
        failed = report.failures.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}

fn process<L, T, W>(
    config: &BatchConfig,
    family: FileFamily,
    pipeline: &ElevationPipeline<L, T, W>,
    stop: &AtomicBool,
    index: u32,
    tx: &Sender<FileOutcome>,
) where
    L: GridLoader,
    T: SurfaceTriangulator,
    W: MeshWriter,
{
    let outcome = if stop.load(Ordering::Acquire) {
        FileOutcome::Skipped { index }
    } else {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            convert_index(config, family, pipeline, index)
        }))
        .unwrap_or_else(|payload| FileOutcome::Failed {
            index,
            input: config.input_path(&input_name(&config.base_name, index, &config.extension)),
            error: ElevationError::ConversionPanicked {
                message: panic_message(payload.as_ref()),
            },
        });
        if matches!(outcome, FileOutcome::Failed { .. }) && config.policy == FailurePolicy::FailFast {
            stop.store(true, Ordering::Release);
        }
        outcome
    };
    // The receiver outlives every worker.
    tx.send(outcome).ok();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn convert_index<L, T, W>(
    config: &BatchConfig,
    family: FileFamily,
    pipeline: &ElevationPipeline<L, T, W>,
    index: u32,
) -> FileOutcome
where
    L: GridLoader,
    T: SurfaceTriangulator,
    W: MeshWriter,
{
    let name = input_name(&config.base_name, index, &config.extension);
    let input = config.input_path(&name);
    let result = output_name(&name).and_then(|out| {
        let output = config.output_path(&out);
        pipeline
            .convert(&input, family, &output, &config.array_name)
            .map(|summary| (output, summary))
    });
    match result {
        Ok((output, summary)) => FileOutcome::Converted {
            index,
            input,
            output,
            summary,
        },
        Err(error) => FileOutcome::Failed {
            index,
            input,
            error,
        },
    }
}

fn log_outcome(outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Converted {
            index,
            input,
            output,
            summary,
        } => info!(
            index,
            input = %input.display(),
            output = %output.display(),
            points = summary.points,
            triangles = summary.triangles,
            "file converted"
        ),
        FileOutcome::Failed {
            index,
            input,
            error,
        } => error!(
            index,
            input = %input.display(),
            category = %error.category(),
            "conversion failed: {error}"
        ),
        FileOutcome::Skipped { index } => warn!(index, "file skipped after earlier failure"),
    }
}
