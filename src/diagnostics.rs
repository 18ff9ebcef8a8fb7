//! # Analysis Diagnostics
//!
//! Non-fatal conditions raised while analysing a trace. They are logged as
//! they occur and returned alongside the result, so a batch of traces is
//! never aborted by one odd chromatogram.

use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;
use log::warn;
use serde::Serialize;

use crate::peaks::SearchSide;

/// A non-fatal condition found during analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Bound search ran into the end of the signal before settling
    DegenerateSearch {
        /// Apex whose search was cut short
        apex_index: usize,
        /// Side that hit the array edge
        side: SearchSide,
    },

    /// No apex reached the prominence threshold
    NoPeaksDetected,

    /// More than one peak fell outside every calibration window
    UnmatchedPeaks {
        /// Number of unmatched peaks
        count: usize,
        /// Apex times (minutes) of the unmatched peaks
        apex_times: Vec<f64>,
    },

    /// Every calibrated chemical came out at zero
    ZeroConcentration,
}

impl Diagnostic {
    /// Short machine-friendly name
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::DegenerateSearch { .. } => "degenerate_search",
            Diagnostic::NoPeaksDetected => "no_peaks_detected",
            Diagnostic::UnmatchedPeaks { .. } => "unmatched_peaks",
            Diagnostic::ZeroConcentration => "zero_concentration",
        }
    }

    /// Record this diagnostic in the log
    pub(crate) fn emit(self, sink: &mut Vec<Diagnostic>) {
        warn!("{}", self);
        sink.push(self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateSearch { apex_index, side } => {
                let side = match side {
                    SearchSide::Left => "left",
                    SearchSide::Right => "right",
                };
                write!(
                    f,
                    "Bound search for apex {} reached the {} edge of the trace",
                    apex_index, side
                )
            }
            Diagnostic::NoPeaksDetected => write!(f, "No peaks detected"),
            Diagnostic::UnmatchedPeaks { count, apex_times } => {
                let times: Vec<String> = apex_times.iter().map(|t| format!("{:.3}", t)).collect();
                write!(
                    f,
                    "{} unknown peaks detected at [{}] min",
                    count,
                    times.join(", ")
                )
            }
            Diagnostic::ZeroConcentration => write!(f, "Zero molecules detected"),
        }
    }
}

/// Format diagnostics for one trace as a short report
pub fn format_report(source: &str, diagnostics: &[Diagnostic]) -> String {
    #[cfg(feature = "colorized_output")]
    {
        use console::Emoji;

        static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
        static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");

        if diagnostics.is_empty() {
            return format!("{} {}\n", style(OK).green(), source);
        }
        let mut output = format!("{} {}\n", style(WARN).yellow(), style(source).bold());
        for diagnostic in diagnostics {
            output.push_str(&format!("    {}\n", style(diagnostic).yellow()));
        }
        output
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        if diagnostics.is_empty() {
            return format!("[OK] {}\n", source);
        }
        let mut output = format!("[WARN] {}\n", source);
        for diagnostic in diagnostics {
            output.push_str(&format!("    {}\n", diagnostic));
        }
        output
    }
}
