//! Elevation Map - converts a numbered series of grid files into elevated
//! PolyData surfaces.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use elevation_map::{run, BatchConfig, ElevationPipeline, FailurePolicy, FileOutcome};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "elevation-map", version)]
#[command(about = "Lift 2D scalar-field grids into triangulated elevation maps")]
struct Cli {
    /// Filename prefix shared by every input file
    #[arg(value_name = "InputBaseFilename")]
    base_name: String,

    /// First file index
    #[arg(value_name = "FileStartIndex")]
    start: u32,

    /// Last file index (inclusive)
    #[arg(value_name = "FileEndIndex")]
    end: u32,

    /// Input extension without the dot (vtk, vti, vtp, vtu, vtr, vts)
    #[arg(value_name = "FileExtension")]
    extension: String,

    /// Point array used as elevation
    #[arg(value_name = "ArrayName")]
    array_name: String,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short, long, env = "ELEVATION_MAP_JOBS", default_value = "0")]
    jobs: usize,

    /// Directory holding the input files
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving the output files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Stop starting new files after the first failure
    #[arg(long)]
    fail_fast: bool,
}

impl Cli {
    fn config(&self) -> BatchConfig {
        let mut config = BatchConfig::new(
            self.base_name.clone(),
            self.start,
            self.end,
            self.extension.clone(),
            self.array_name.clone(),
        )
        .with_jobs(self.jobs);
        if let Some(dir) = &self.input_dir {
            config = config.with_input_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if self.fail_fast {
            config = config.with_policy(FailurePolicy::FailFast);
        }
        config
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elevation_map=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match convert(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the batch. Returns whether every file was converted.
fn convert(cli: &Cli) -> anyhow::Result<bool> {
    let pipeline: ElevationPipeline = ElevationPipeline::default();
    let report = run(&cli.config(), &pipeline, |outcome| {
        if let FileOutcome::Converted { input, output, .. } = outcome {
            println!("{} converted to {}.", input.display(), output.display());
        }
    })
    .context("batch could not start")?;
    Ok(report.is_success())
}
