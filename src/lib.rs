//! # gcpeak - Gas Chromatogram Quantitation
//!
//! `gcpeak` turns the raw ASCII traces exported by a gas chromatograph into
//! chemical concentrations.
//!
//! ## Pipeline
//!
//! - **Trace Reader**: parses the fixed-layout export into a timestamped,
//!   evenly sampled signal ([`trace`]).
//!
//! - **Baseline Corrector**: removes detector drift with a white tophat
//!   filter ([`baseline`]).
//!
//! - **Peak Locator / Bound Search / Integrator**: finds prominent apexes,
//!   walks outward to adaptive integration bounds and takes the trapezoidal
//!   area in counts ([`peaks`]).
//!
//! - **Concentration Mapper**: assigns peaks to chemicals by retention window
//!   and applies a linear calibration ([`calibration`], [`concentration`]).
//!
//! Each stage is a pure function over immutable inputs; [`pipeline`] chains
//! them and [`batch`] runs many traces against one shared calibration table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gcpeak::prelude::*;
//!
//! let table = CalibrationTable::from_csv_path("calibration.csv")?;
//! let analysis = analyze_file("run_FID01.asc", &table, &AnalysisConfig::default())?;
//!
//! for (chem_id, ppm) in analysis.record.iter() {
//!     println!("{chem_id}: {ppm:.2} ppm");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `colorized_output` (default): colored diagnostic reports via `console`
//! - `parallel`: analyse batches on the rayon thread pool

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod baseline;
pub mod batch;
pub mod calibration;
pub mod concentration;
pub mod diagnostics;
pub mod peaks;
pub mod pipeline;
pub mod trace;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::baseline::{correct_baseline, tophat, BaselineConfig};
    pub use crate::batch::{
        analyze_batch, find_trace_files, run_number, summarize, write_concentration_table,
        BatchEntry, BatchError, ChemSummary,
    };
    pub use crate::calibration::{CalibrationEntry, CalibrationError, CalibrationTable};
    pub use crate::concentration::{
        map_concentrations, ConcentrationMapping, ConcentrationRecord, PeakCount, TIMESTAMP_KEY,
    };
    pub use crate::diagnostics::{format_report, Diagnostic};
    pub use crate::peaks::{
        find_apexes, integrate_peak, search_bounds, BoundSearch, BoundSearchConfig, Peak,
        SearchSide, StopReason,
    };
    pub use crate::pipeline::{analyze_file, analyze_trace, Analysis, AnalysisConfig, DetectedPeak};
    pub use crate::trace::{RawTrace, ReaderConfig, TimestampZone, TraceError, TraceReader};
}
