//! # gcpeak
//!
//! Command-line front end for quantifying gas chromatograph traces.
//!
//! ## Usage
//!
//! ```bash
//! # Quantify one trace
//! gcpeak analyze run_FID01.asc --calibration calibration.csv
//!
//! # Inspect a trace without calibrating it
//! gcpeak inspect run_FID01.asc
//!
//! # Quantify every FID trace under an experiment directory
//! gcpeak batch data/expt_01 -c calibration.csv -o concentrations.csv --summary
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
