use anyhow::{Context, Result};
use std::path::PathBuf;

use gcpeak::baseline::correct_baseline;
use gcpeak::peaks::{find_apexes, integrate_peak, search_bounds};
use gcpeak::trace::TraceReader;

use super::AnalysisArgs;

/// Display header fields, signal statistics and uncalibrated peaks of a trace
pub fn run(file: PathBuf, args: &AnalysisArgs) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }
    let (config, _) = args.resolve()?;

    let trace = TraceReader::with_config(config.reader.clone())
        .read_path(&file)
        .with_context(|| format!("Failed to read trace {}", file.display()))?;

    println!("Trace Information");
    println!("=================");
    println!("File: {}", file.display());
    println!();

    println!("Header:");
    println!("  Acquired: {}", trace.timestamp.to_rfc3339());
    println!("  Sample rate: {} Hz", trace.sample_rate);
    println!("  Samples: {}", trace.len());
    println!("  Duration: {:.3} min", trace.duration_minutes());
    println!();

    if trace.is_empty() {
        return Ok(());
    }

    let (min, max) = trace
        .signal
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let mean = trace.signal.iter().sum::<f64>() / trace.len() as f64;
    println!("Signal (V):");
    println!("  Min: {:.4}", min);
    println!("  Max: {:.4}", max);
    println!("  Mean: {:.4}", mean);
    println!();

    let signal = if config.baseline_correction {
        correct_baseline(&trace.signal, &config.baseline)
    } else {
        trace.signal.clone()
    };
    let apexes = find_apexes(&signal, config.min_prominence);

    println!(
        "Peaks (prominence >= {}, baseline {}):",
        config.min_prominence,
        if config.baseline_correction {
            "corrected"
        } else {
            "raw"
        }
    );
    for apex in apexes {
        let search = search_bounds(&signal, apex, &config.bounds);
        let counts = integrate_peak(&trace.time, &signal, &search.peak);
        println!(
            "  {:>8.3} min  height {:>9.4}  [{:>6}, {:>6}]  {:>10} counts  ({:?}/{:?})",
            trace.time[apex],
            signal[apex],
            search.peak.left_index,
            search.peak.right_index,
            counts,
            search.left_stop,
            search.right_stop
        );
    }

    Ok(())
}
