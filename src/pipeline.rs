//! # Analysis Pipeline
//!
//! Runs one trace through every stage:
//!
//! ```text
//! RawTrace -> baseline correction -> apexes -> bounds -> counts -> ConcentrationRecord
//! ```
//!
//! Every stage takes its inputs by reference and returns new values, so a
//! [`CalibrationTable`] and an [`AnalysisConfig`] can be shared by any number
//! of concurrent analyses.

use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::baseline::{correct_baseline, BaselineConfig};
use crate::calibration::CalibrationTable;
use crate::concentration::{map_concentrations, ConcentrationRecord, PeakCount};
use crate::diagnostics::Diagnostic;
use crate::peaks::{find_apexes, integrate_peak, search_bounds, BoundSearchConfig, Peak};
use crate::trace::{RawTrace, ReaderConfig, TraceError, TraceReader};

/// Prominence threshold for baseline-corrected signals
pub const DEFAULT_MIN_PROMINENCE: f64 = 4.0;

/// Settings for every pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the tophat baseline corrector before peak detection
    pub baseline_correction: bool,

    /// Baseline corrector settings
    pub baseline: BaselineConfig,

    /// Minimum topographic prominence of an apex, in signal units
    pub min_prominence: f64,

    /// Integration-bound search settings
    pub bounds: BoundSearchConfig,

    /// Trace file parsing settings
    pub reader: ReaderConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            baseline_correction: true,
            baseline: BaselineConfig::default(),
            min_prominence: DEFAULT_MIN_PROMINENCE,
            bounds: BoundSearchConfig::default(),
            reader: ReaderConfig::default(),
        }
    }
}

/// One integrated peak and the chemical it was assigned to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedPeak {
    /// Apex and integration bounds
    pub peak: Peak,
    /// Retention time of the apex in minutes
    pub apex_time: f64,
    /// Integrated counts
    pub counts: i64,
    /// Matching calibration entry, if any
    pub chem_id: Option<String>,
}

/// Result of analysing one trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Concentration of every calibrated chemical
    pub record: ConcentrationRecord,
    /// Peaks in apex order
    pub peaks: Vec<DetectedPeak>,
    /// Non-fatal conditions raised along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// True if no diagnostics were raised
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Analyse an already parsed trace.
pub fn analyze_trace(
    trace: &RawTrace,
    table: &CalibrationTable,
    config: &AnalysisConfig,
) -> Analysis {
    let len = trace.time.len().min(trace.signal.len());
    if trace.time.len() != trace.signal.len() {
        warn!(
            "Trace has {} time points but {} samples; using the first {}",
            trace.time.len(),
            trace.signal.len(),
            len
        );
    }
    let time = &trace.time[..len];

    let corrected;
    let signal: &[f64] = if config.baseline_correction {
        corrected = correct_baseline(&trace.signal[..len], &config.baseline);
        &corrected
    } else {
        &trace.signal[..len]
    };

    let mut diagnostics = Vec::new();
    let apexes = find_apexes(signal, config.min_prominence);
    debug!(
        "{} apexes above prominence {}",
        apexes.len(),
        config.min_prominence
    );
    if apexes.is_empty() {
        Diagnostic::NoPeaksDetected.emit(&mut diagnostics);
    }

    let mut peaks = Vec::with_capacity(apexes.len());
    let mut counts = Vec::with_capacity(apexes.len());
    for apex in apexes {
        let search = search_bounds(signal, apex, &config.bounds);
        for side in search.edge_sides() {
            Diagnostic::DegenerateSearch {
                apex_index: apex,
                side,
            }
            .emit(&mut diagnostics);
        }

        let area = integrate_peak(time, signal, &search.peak);
        let apex_time = time[apex];
        debug!(
            "Apex {} at {:.3} min: bounds [{}, {}], {} counts",
            apex, apex_time, search.peak.left_index, search.peak.right_index, area
        );
        counts.push(PeakCount {
            apex_time,
            counts: area,
        });
        peaks.push(DetectedPeak {
            peak: search.peak,
            apex_time,
            counts: area,
            chem_id: None,
        });
    }

    let mapping = map_concentrations(&counts, table, trace.timestamp);
    for (peak, chem_id) in peaks.iter_mut().zip(mapping.assignments) {
        peak.chem_id = chem_id;
    }
    diagnostics.extend(mapping.diagnostics);

    Analysis {
        record: mapping.record,
        peaks,
        diagnostics,
    }
}

/// Read the trace at `path` and analyse it.
pub fn analyze_file<P: AsRef<Path>>(
    path: P,
    table: &CalibrationTable,
    config: &AnalysisConfig,
) -> Result<Analysis, TraceError> {
    let path = path.as_ref();
    let trace = TraceReader::with_config(config.reader.clone()).read_path(path)?;
    let analysis = analyze_trace(&trace, table, config);
    info!(
        "{}: {} samples, {} peaks, {} warnings",
        path.display(),
        trace.len(),
        analysis.peaks.len(),
        analysis.diagnostics.len()
    );
    Ok(analysis)
}
