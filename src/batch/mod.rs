//! # Batch Processing
//!
//! Collects trace files under one or more directories, analyses each file
//! independently, and tabulates the resulting concentrations.
//!
//! A file that fails to parse is recorded with its error and the rest of the
//! batch carries on. With the `parallel` feature enabled, files are analysed
//! on the rayon thread pool; the calibration table is only ever read.

mod error;

#[cfg(test)]
mod tests;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::calibration::CalibrationTable;
use crate::concentration::{ConcentrationRecord, TIMESTAMP_KEY};
use crate::pipeline::{analyze_file, Analysis, AnalysisConfig};
use crate::trace::TraceError;

pub use error::BatchError;

/// Default file-name fragment identifying detector traces
pub const DEFAULT_TARGET: &str = "FID";

/// Default trace file extension
pub const DEFAULT_SUFFIX: &str = ".asc";

/// Recursively collect files under `roots` whose name contains `target` and
/// ends with `suffix`, both compared case-insensitively.
///
/// The result is sorted so batch output is stable across platforms.
pub fn find_trace_files<P: AsRef<Path>>(
    roots: &[P],
    target: &str,
    suffix: &str,
) -> Result<Vec<PathBuf>, BatchError> {
    let target = target.to_lowercase();
    let suffix = suffix.to_lowercase();
    let mut files = Vec::new();
    for root in roots {
        collect_matching(root.as_ref(), &target, &suffix, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_matching(
    dir: &Path,
    target: &str,
    suffix: &str,
    files: &mut Vec<PathBuf>,
) -> Result<(), BatchError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_matching(&path, target, suffix, files)?;
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = name.to_lowercase();
        if name.ends_with(suffix) && name.contains(target) {
            files.push(path);
        }
    }
    Ok(())
}

/// Injection number encoded as trailing digits before the extension,
/// e.g. `7` for `run_FID07.asc`.
pub fn run_number<P: AsRef<Path>>(path: P) -> Option<u64> {
    let name = path.as_ref().file_name()?.to_str()?;
    let parts: Vec<&str> = name.split('.').collect();
    let part = if parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        parts[0]
    };
    let digits = part.len() - part.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    part[part.len() - digits..].parse().ok()
}

/// Outcome for one file of a batch
#[derive(Debug)]
pub struct BatchEntry {
    /// Trace file
    pub path: PathBuf,
    /// Injection number parsed from the file name
    pub run: Option<u64>,
    /// Analysis, or the error that stopped it
    pub result: Result<Analysis, TraceError>,
}

impl BatchEntry {
    /// Concentration record if the file was analysed
    pub fn record(&self) -> Option<&ConcentrationRecord> {
        self.result.as_ref().ok().map(|analysis| &analysis.record)
    }
}

/// Analyse every file in `paths`, preserving input order.
pub fn analyze_batch(
    paths: &[PathBuf],
    table: &CalibrationTable,
    config: &AnalysisConfig,
) -> Vec<BatchEntry> {
    let analyze = |path: &PathBuf| {
        let result = analyze_file(path, table, config);
        if let Err(e) = &result {
            warn!("Skipping {}: {}", path.display(), e);
        }
        BatchEntry {
            path: path.clone(),
            run: run_number(path),
            result,
        }
    };

    #[cfg(feature = "parallel")]
    let entries: Vec<BatchEntry> = paths.par_iter().map(analyze).collect();

    #[cfg(not(feature = "parallel"))]
    let entries: Vec<BatchEntry> = paths.iter().map(analyze).collect();

    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    info!(
        "Analysed {} traces ({} failed)",
        entries.len() - failed,
        failed
    );
    entries
}

/// Write one CSV row per successfully analysed entry:
/// `file, run, timestamp, <chem ids in calibration order>`.
///
/// Returns the number of rows written.
pub fn write_concentration_table<W: Write>(
    writer: W,
    table: &CalibrationTable,
    entries: &[BatchEntry],
) -> Result<usize, BatchError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["file".to_string(), "run".to_string(), TIMESTAMP_KEY.to_string()];
    header.extend(table.chem_ids().map(str::to_string));
    csv_writer.write_record(&header)?;

    let mut rows = 0;
    for entry in entries {
        let Some(record) = entry.record() else {
            continue;
        };
        let mut row = vec![
            entry.path.display().to_string(),
            entry.run.map(|r| r.to_string()).unwrap_or_default(),
            record.timestamp().timestamp().to_string(),
        ];
        row.extend(
            table
                .chem_ids()
                .map(|id| record.get(id).unwrap_or(0.0).to_string()),
        );
        csv_writer.write_record(&row)?;
        rows += 1;
    }
    csv_writer.flush()?;
    Ok(rows)
}

/// Mean and spread of one chemical over repeated injections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemSummary {
    /// Chemical identifier
    pub chem_id: String,
    /// Mean concentration (ppm)
    pub mean: f64,
    /// Population standard deviation (ppm)
    pub std_dev: f64,
    /// Number of records averaged
    pub samples: usize,
}

/// Per-chemical mean and population standard deviation across `records`.
///
/// Chemicals with no records report zero mean and spread.
pub fn summarize<'a, I>(records: I, table: &CalibrationTable) -> Vec<ChemSummary>
where
    I: IntoIterator<Item = &'a ConcentrationRecord>,
{
    let records: Vec<&ConcentrationRecord> = records.into_iter().collect();
    table
        .chem_ids()
        .map(|chem_id| {
            let values: Vec<f64> = records.iter().filter_map(|r| r.get(chem_id)).collect();
            let samples = values.len();
            let (mean, std_dev) = if samples == 0 {
                (0.0, 0.0)
            } else {
                let n = samples as f64;
                let mean = values.iter().sum::<f64>() / n;
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                (mean, variance.sqrt())
            };
            ChemSummary {
                chem_id: chem_id.to_string(),
                mean,
                std_dev,
                samples,
            }
        })
        .collect()
}
