use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use gcpeak::batch::{analyze_batch, find_trace_files, summarize, write_concentration_table};
use gcpeak::calibration::CalibrationTable;
use gcpeak::diagnostics::format_report;

use super::AnalysisArgs;

/// Quantify every matching trace under `dirs`
pub fn run(
    dirs: Vec<PathBuf>,
    args: &AnalysisArgs,
    output: Option<PathBuf>,
    target: &str,
    suffix: &str,
    summary: bool,
) -> Result<()> {
    let (config, calibration) = args.resolve_with_calibration()?;
    let table = CalibrationTable::from_csv_path(&calibration)
        .with_context(|| format!("Failed to load calibration table {}", calibration.display()))?;

    let files = find_trace_files(&dirs, target, suffix).context("Failed to search for traces")?;
    if files.is_empty() {
        anyhow::bail!("No files matching *{}*{} found", target, suffix);
    }
    info!("Found {} trace files", files.len());

    let entries = analyze_batch(&files, &table, &config);

    for entry in &entries {
        match &entry.result {
            Ok(analysis) if !analysis.is_clean() => eprint!(
                "{}",
                format_report(&entry.path.display().to_string(), &analysis.diagnostics)
            ),
            Ok(_) => {}
            Err(e) => eprintln!("Failed: {}: {}", entry.path.display(), e),
        }
    }

    let rows = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_concentration_table(BufWriter::new(file), &table, &entries)?
        }
        None => write_concentration_table(std::io::stdout().lock(), &table, &entries)?,
    };
    info!("Wrote {} rows", rows);

    if summary {
        let records = entries.iter().filter_map(|e| e.record());
        eprintln!();
        eprintln!("{:<12} {:>12} {:>12} {:>6}", "Chem ID", "Mean ppm", "Std ppm", "n");
        for chem in summarize(records, &table) {
            eprintln!(
                "{:<12} {:>12.3} {:>12.3} {:>6}",
                chem.chem_id, chem.mean, chem.std_dev, chem.samples
            );
        }
    }

    let failed = entries.len() - rows;
    if failed > 0 {
        eprintln!("{} of {} traces could not be analysed", failed, entries.len());
    }
    Ok(())
}
