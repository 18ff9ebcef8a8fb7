use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use gcpeak::calibration::CalibrationTable;
use gcpeak::diagnostics::format_report;
use gcpeak::pipeline::{analyze_file, Analysis};

use super::AnalysisArgs;

/// Quantify a single trace file
pub fn run(input: PathBuf, args: &AnalysisArgs, json: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let (config, calibration) = args.resolve_with_calibration()?;

    info!("Calibration: {}", calibration.display());
    let table = CalibrationTable::from_csv_path(&calibration)
        .with_context(|| format!("Failed to load calibration table {}", calibration.display()))?;

    let analysis = analyze_file(&input, &table, &config)
        .with_context(|| format!("Failed to analyse {}", input.display()))?;

    if json {
        let text = serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?;
        println!("{}", text);
    } else {
        print_analysis(&input, &analysis);
    }

    if !analysis.is_clean() {
        eprint!(
            "{}",
            format_report(&input.display().to_string(), &analysis.diagnostics)
        );
    }
    Ok(())
}

fn print_analysis(input: &Path, analysis: &Analysis) {
    println!("Trace: {}", input.display());
    println!("Acquired: {}", analysis.record.timestamp().to_rfc3339());
    println!();

    println!("Peaks:");
    if analysis.peaks.is_empty() {
        println!("  (none)");
    }
    for detected in &analysis.peaks {
        println!(
            "  {:>8.3} min  [{:>6}, {:>6}]  {:>10} counts  {}",
            detected.apex_time,
            detected.peak.left_index,
            detected.peak.right_index,
            detected.counts,
            detected.chem_id.as_deref().unwrap_or("-")
        );
    }
    println!();

    println!("Concentrations:");
    for (chem_id, ppm) in analysis.record.iter() {
        println!("  {:<12} {:>12.3} ppm", chem_id, ppm);
    }
}
