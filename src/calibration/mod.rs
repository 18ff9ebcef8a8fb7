//! # Calibration Tables
//!
//! Each chemical is identified by the retention window its peak falls in and
//! converted from integrated counts to ppm with a linear calibration.
//!
//! Tables are ordered: when retention windows overlap, the first matching row
//! wins. A table is immutable once built and can be shared freely between
//! threads analysing different traces.
//!
//! ## File Format
//!
//! ```text
//! Chem ID,slope,intercept,start,end
//! CH4,0.2391,-12.4,0.8,1.0
//! C2H2,0.4741,-77.473,1.0,1.5
//! ```
//!
//! Header names are matched case-insensitively; extra columns are ignored.

mod error;


use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::concentration::TIMESTAMP_KEY;

pub use error::CalibrationError;

/// Column headers expected in calibration files
pub mod columns {
    /// Chemical identifier
    pub const CHEM_ID: &str = "chem id";
    /// Calibration slope (ppm per count)
    pub const SLOPE: &str = "slope";
    /// Calibration intercept (ppm)
    pub const INTERCEPT: &str = "intercept";
    /// Retention window start (minutes)
    pub const START: &str = "start";
    /// Retention window end (minutes)
    pub const END: &str = "end";
}

/// Calibration for a single chemical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    /// Chemical identifier, unique within a table
    pub chem_id: String,
    /// ppm per integrated count
    pub slope: f64,
    /// ppm at zero counts
    pub intercept: f64,
    /// Retention window start in minutes (exclusive)
    pub window_start: f64,
    /// Retention window end in minutes (exclusive)
    pub window_end: f64,
}

impl CalibrationEntry {
    /// Create a calibration entry
    pub fn new(
        chem_id: impl Into<String>,
        slope: f64,
        intercept: f64,
        window_start: f64,
        window_end: f64,
    ) -> Self {
        Self {
            chem_id: chem_id.into(),
            slope,
            intercept,
            window_start,
            window_end,
        }
    }

    /// True if `time` (minutes) lies strictly inside the retention window
    pub fn matches(&self, time: f64) -> bool {
        self.window_start < time && time < self.window_end
    }

    /// Convert integrated counts to ppm
    pub fn to_ppm(&self, counts: f64) -> f64 {
        self.slope * counts + self.intercept
    }
}

/// Ordered, validated set of calibration entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalibrationTable {
    entries: Vec<CalibrationEntry>,
}

impl CalibrationTable {
    /// Build a table, rejecting duplicate ids and empty windows
    pub fn new(entries: Vec<CalibrationEntry>) -> Result<Self, CalibrationError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.chem_id.trim().is_empty() || entry.chem_id == TIMESTAMP_KEY {
                return Err(CalibrationError::InvalidChemId(entry.chem_id.clone()));
            }
            if !seen.insert(entry.chem_id.as_str()) {
                return Err(CalibrationError::DuplicateChemId(entry.chem_id.clone()));
            }
            if entry.window_start.partial_cmp(&entry.window_end) != Some(Ordering::Less) {
                return Err(CalibrationError::InvalidWindow {
                    chem_id: entry.chem_id.clone(),
                    start: entry.window_start,
                    end: entry.window_end,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Load a comma-separated calibration file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        debug!("Loading calibration table {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a comma-separated calibration table from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CalibrationError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let position = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(CalibrationError::MissingColumn(name))
        };
        let chem_col = position(columns::CHEM_ID)?;
        let slope_col = position(columns::SLOPE)?;
        let intercept_col = position(columns::INTERCEPT)?;
        let start_col = position(columns::START)?;
        let end_col = position(columns::END)?;

        let mut entries = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let chem_id = record.get(chem_col).unwrap_or_default().to_string();
            if chem_id.is_empty() && record.iter().all(str::is_empty) {
                continue;
            }
            let number = |col: usize, column: &'static str| {
                let value = record.get(col).unwrap_or_default();
                value
                    .parse::<f64>()
                    .map_err(|_| CalibrationError::InvalidValue {
                        chem_id: chem_id.clone(),
                        column,
                        value: value.to_string(),
                    })
            };
            entries.push(CalibrationEntry {
                slope: number(slope_col, columns::SLOPE)?,
                intercept: number(intercept_col, columns::INTERCEPT)?,
                window_start: number(start_col, columns::START)?,
                window_end: number(end_col, columns::END)?,
                chem_id,
            });
        }

        debug!("Loaded {} calibration entries", entries.len());
        Self::new(entries)
    }

    /// First entry, in table order, whose window contains `time`
    pub fn find_window(&self, time: f64) -> Option<&CalibrationEntry> {
        self.entries.iter().find(|entry| entry.matches(time))
    }

    /// Entry for `chem_id`
    pub fn get(&self, chem_id: &str) -> Option<&CalibrationEntry> {
        self.entries.iter().find(|entry| entry.chem_id == chem_id)
    }

    /// Chemical identifiers in table order
    pub fn chem_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.chem_id.as_str())
    }

    /// Entries in table order
    pub fn entries(&self) -> &[CalibrationEntry] {
        &self.entries
    }

    /// Number of chemicals
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
