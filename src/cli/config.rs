//! TOML configuration file support.
//!
//! Analysis settings can be kept in a file instead of repeated on the
//! command line:
//!
//! ```toml
//! # gcpeak.toml
//! [analysis]
//! calibration = "calibration.csv"
//! baseline_correction = true
//! min_prominence = 4.0
//! structuring_fraction = 0.1
//! window = 10
//! tolerance_percent = 0.5
//! timestamp_zone = "local"
//! length_tolerance = 0
//! ```
//!
//! Flags given on the command line take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use gcpeak::pipeline::AnalysisConfig;
use gcpeak::trace::TimestampZone;

/// Root configuration structure for gcpeak.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisSection,
}

/// The `[analysis]` section. Unset keys keep the built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisSection {
    /// Calibration table used when `--calibration` is not given.
    pub calibration: Option<PathBuf>,

    /// Run tophat baseline correction before peak detection.
    pub baseline_correction: Option<bool>,

    /// Minimum apex prominence in signal units.
    pub min_prominence: Option<f64>,

    /// Structuring element length as a fraction of the trace.
    pub structuring_fraction: Option<f64>,

    /// Bound search averaging window in samples.
    pub window: Option<usize>,

    /// Bound search tolerance in percent.
    pub tolerance_percent: Option<f64>,

    /// Zone of the trace header timestamps.
    pub timestamp_zone: Option<TimestampZone>,

    /// Accepted difference between declared and actual sample counts.
    pub length_tolerance: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl AnalysisSection {
    /// Overlay the keys present in this section onto `config`.
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(v) = self.baseline_correction {
            config.baseline_correction = v;
        }
        if let Some(v) = self.min_prominence {
            config.min_prominence = v;
        }
        if let Some(v) = self.structuring_fraction {
            config.baseline.structuring_fraction = v;
        }
        if let Some(v) = self.window {
            config.bounds.window = v;
        }
        if let Some(v) = self.tolerance_percent {
            config.bounds.tolerance_percent = v;
        }
        if let Some(v) = self.timestamp_zone {
            config.reader.timestamp_zone = v;
        }
        if let Some(v) = self.length_tolerance {
            config.reader.length_tolerance = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [analysis]
            calibration = "cal/2021-10.csv"
            baseline_correction = false
            min_prominence = 1.0
            structuring_fraction = 0.2
            window = 8
            tolerance_percent = 1.0
            timestamp_zone = "local"
            length_tolerance = 3
        "#;

        let config = Config::from_str(toml).unwrap();
        let section = &config.analysis;
        assert_eq!(section.calibration, Some(PathBuf::from("cal/2021-10.csv")));
        assert_eq!(section.baseline_correction, Some(false));
        assert_eq!(section.min_prominence, Some(1.0));
        assert_eq!(section.window, Some(8));
        assert_eq!(section.timestamp_zone, Some(TimestampZone::Local));
        assert_eq!(section.length_tolerance, Some(3));
    }

    #[test]
    fn test_apply_overrides_only_present_keys() {
        let toml = r#"
            [analysis]
            min_prominence = 1.0
            tolerance_percent = 2.0
        "#;

        let mut analysis = AnalysisConfig::default();
        Config::from_str(toml).unwrap().analysis.apply(&mut analysis);

        assert_eq!(analysis.min_prominence, 1.0);
        assert_eq!(analysis.bounds.tolerance_percent, 2.0);
        assert_eq!(analysis.bounds.window, 10);
        assert!(analysis.baseline_correction);
        assert_eq!(analysis.reader.timestamp_zone, TimestampZone::Utc);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.analysis.min_prominence, None);
        assert_eq!(config.analysis.calibration, None);
    }

    #[test]
    fn test_invalid_zone_rejected() {
        let toml = r#"
            [analysis]
            timestamp_zone = "mars"
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
