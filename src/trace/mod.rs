//! # Trace Reader
//!
//! Parses the fixed-layout ASCII export written by the gas chromatograph's
//! acquisition software into a [`RawTrace`].
//!
//! ## File Layout
//!
//! ```text
//! line  1-18   free-form header (ignored)
//! line  19     <label>=MM-DD-YYYY         acquisition date
//! line  20     <label>=HH:MM:SS           acquisition time
//! line  21     <label>=<digit>...         sampling rate, first digit only
//! line  22     <label>=<integer>          declared sample count
//! line  23-25  ignored
//! line  26..   <mV integer>,...           one record per sample
//! ```
//!
//! Blank lines and lines containing `IPOINT` in the data section are skipped.
//! Samples are converted from millivolts to volts; the time axis is rebuilt
//! from the sampling rate in minutes.

mod error;
mod reader;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::TraceError;
pub use reader::{ReaderConfig, TimestampZone, TraceHeader, TraceReader};

/// A single chromatograph run: acquisition time plus evenly sampled signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrace {
    /// Acquisition start
    pub timestamp: DateTime<Utc>,

    /// Samples per second
    pub sample_rate: f64,

    /// Retention time of each sample in minutes, starting at 0
    pub time: Vec<f64>,

    /// Detector signal in volts
    pub signal: Vec<f64>,
}

impl RawTrace {
    /// Build a trace from a signal sampled at `sample_rate` Hz.
    ///
    /// The time axis is `i / (rate * 60)` minutes for sample `i`.
    pub fn from_signal(timestamp: DateTime<Utc>, sample_rate: f64, signal: Vec<f64>) -> Self {
        let time = time_axis(sample_rate, signal.len());
        Self {
            timestamp,
            sample_rate,
            time,
            signal,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.signal.len()
    }

    /// True if the trace holds no samples
    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }

    /// Acquisition start as Unix seconds
    pub fn epoch_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Run length in minutes (time of the last sample)
    pub fn duration_minutes(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }
}

/// Linearly spaced retention times from 0 to `(len - 1) / (rate * 60)` minutes.
pub(crate) fn time_axis(sample_rate: f64, len: usize) -> Vec<f64> {
    let samples_per_minute = sample_rate * 60.0;
    (0..len).map(|i| i as f64 / samples_per_minute).collect()
}
