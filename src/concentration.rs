//! # Concentration Mapping
//!
//! Assigns each integrated peak to a chemical by retention window and converts
//! its counts to ppm. The result is a flat [`ConcentrationRecord`] keyed by
//! chemical identifier, plus the trace timestamp under [`TIMESTAMP_KEY`].
//!
//! Matching rules:
//! - A peak matches an entry when `start < apex_time < end`; with overlapping
//!   windows the first entry in table order wins.
//! - When two peaks map to the same chemical the later peak's value replaces
//!   the earlier one. Values are not summed.
//! - Chemicals without a matching peak stay at 0 ppm.

use chrono::{DateTime, Utc};
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::calibration::CalibrationTable;
use crate::diagnostics::Diagnostic;

/// Reserved record key holding the trace timestamp
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Unmatched peaks tolerated before warning (the backflush peak)
const EXPECTED_UNMATCHED_PEAKS: usize = 1;

/// Apex time and integrated counts of one peak
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PeakCount {
    /// Retention time of the apex in minutes
    pub apex_time: f64,
    /// Integrated counts
    pub counts: i64,
}

/// Concentrations (ppm) of every calibrated chemical for one trace
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationRecord {
    timestamp: DateTime<Utc>,
    values: Vec<(String, f64)>,
}

impl ConcentrationRecord {
    /// Record with every chemical in `table` at 0 ppm
    pub fn zeroed(table: &CalibrationTable, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: table.chem_ids().map(|id| (id.to_string(), 0.0)).collect(),
        }
    }

    /// Trace acquisition time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Concentration of `chem_id` in ppm
    pub fn get(&self, chem_id: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(id, _)| id == chem_id)
            .map(|(_, value)| *value)
    }

    /// `(chem_id, ppm)` pairs in calibration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(id, value)| (id.as_str(), *value))
    }

    /// Number of chemicals
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the record holds no chemicals
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if every concentration is exactly zero
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|(_, value)| *value == 0.0)
    }

    fn set(&mut self, chem_id: &str, value: f64) {
        if let Some(slot) = self.values.iter_mut().find(|(id, _)| id == chem_id) {
            slot.1 = value;
        }
    }
}

impl Serialize for ConcentrationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(TIMESTAMP_KEY, &self.timestamp.timestamp())?;
        for (id, value) in &self.values {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

/// Outcome of mapping one trace's peaks onto a calibration table
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationMapping {
    /// Concentrations per chemical
    pub record: ConcentrationRecord,
    /// Chemical assigned to each input peak, `None` if unmatched
    pub assignments: Vec<Option<String>>,
    /// Number of peaks outside every calibration window
    pub unmatched_peaks: usize,
    /// Warnings raised while mapping
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert per-peak counts into a concentration record.
pub fn map_concentrations(
    peaks: &[PeakCount],
    table: &CalibrationTable,
    timestamp: DateTime<Utc>,
) -> ConcentrationMapping {
    let mut record = ConcentrationRecord::zeroed(table, timestamp);
    let mut assignments = Vec::with_capacity(peaks.len());
    let mut unmatched_times = Vec::new();

    for peak in peaks {
        match table.find_window(peak.apex_time) {
            Some(entry) => {
                let ppm = entry.to_ppm(peak.counts as f64);
                debug!(
                    "Peak at {:.3} min -> {} ({} counts, {:.3} ppm)",
                    peak.apex_time, entry.chem_id, peak.counts, ppm
                );
                record.set(&entry.chem_id, ppm);
                assignments.push(Some(entry.chem_id.clone()));
            }
            None => {
                debug!("Peak at {:.3} min matches no calibration window", peak.apex_time);
                unmatched_times.push(peak.apex_time);
                assignments.push(None);
            }
        }
    }

    let mut diagnostics = Vec::new();
    let unmatched_peaks = unmatched_times.len();
    if unmatched_peaks > EXPECTED_UNMATCHED_PEAKS {
        Diagnostic::UnmatchedPeaks {
            count: unmatched_peaks,
            apex_times: unmatched_times,
        }
        .emit(&mut diagnostics);
    }
    if record.is_all_zero() {
        Diagnostic::ZeroConcentration.emit(&mut diagnostics);
    }

    ConcentrationMapping {
        record,
        assignments,
        unmatched_peaks,
        diagnostics,
    }
}
