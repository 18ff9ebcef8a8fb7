use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use gcpeak::batch::{DEFAULT_SUFFIX, DEFAULT_TARGET};
use gcpeak::pipeline::AnalysisConfig;
use gcpeak::trace::TimestampZone;

mod analyze;
mod batch;
mod config;
mod inspect;

use config::Config;

/// gcpeak - Gas Chromatogram Peak Quantitation
#[derive(Parser)]
#[command(name = "gcpeak")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every command that runs the pipeline.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Calibration table (CSV with Chem ID, slope, intercept, start, end)
    #[arg(short = 'c', long, value_name = "CSV")]
    calibration: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip tophat baseline correction
    #[arg(long)]
    no_baseline: bool,

    /// Minimum apex prominence in signal units
    #[arg(short = 'p', long)]
    min_prominence: Option<f64>,

    /// Interpret header timestamps as local time instead of UTC
    #[arg(long)]
    local_time: bool,
}

impl AnalysisArgs {
    /// Merge defaults, the config file and command-line flags, in that order.
    fn resolve(&self) -> Result<(AnalysisConfig, Option<PathBuf>)> {
        let file = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let mut analysis = AnalysisConfig::default();
        file.analysis.apply(&mut analysis);
        if self.no_baseline {
            analysis.baseline_correction = false;
        }
        if let Some(p) = self.min_prominence {
            analysis.min_prominence = p;
        }
        if self.local_time {
            analysis.reader.timestamp_zone = TimestampZone::Local;
        }

        let calibration = self.calibration.clone().or(file.analysis.calibration);
        Ok((analysis, calibration))
    }

    /// Like [`resolve`](Self::resolve) but a calibration table is mandatory.
    fn resolve_with_calibration(&self) -> Result<(AnalysisConfig, PathBuf)> {
        let (analysis, calibration) = self.resolve()?;
        let calibration = calibration
            .context("No calibration table given (use --calibration or set it in --config)")?;
        Ok((analysis, calibration))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Quantify the chemicals in a single trace file
    Analyze {
        /// Input trace file (ASCII export)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        args: AnalysisArgs,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show header, signal statistics and detected peaks of a trace file
    Inspect {
        /// Input trace file (ASCII export)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        args: AnalysisArgs,
    },

    /// Quantify every matching trace file under one or more directories
    Batch {
        /// Directories to search recursively
        #[arg(value_name = "DIR", required = true)]
        dirs: Vec<PathBuf>,

        #[command(flatten)]
        args: AnalysisArgs,

        /// Write the concentration table here instead of stdout
        #[arg(short = 'o', long, value_name = "CSV")]
        output: Option<PathBuf>,

        /// File-name fragment identifying detector traces
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,

        /// Trace file extension
        #[arg(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,

        /// Print per-chemical mean and standard deviation
        #[arg(long)]
        summary: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze { input, args, json } => analyze::run(input, &args, json),
        Commands::Inspect { file, args } => inspect::run(file, &args),
        Commands::Batch {
            dirs,
            args,
            output,
            target,
            suffix,
            summary,
        } => batch::run(dirs, &args, output, &target, &suffix, summary),
    }
}
