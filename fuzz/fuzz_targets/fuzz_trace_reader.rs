#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use gcpeak::calibration::{CalibrationEntry, CalibrationTable};
use gcpeak::pipeline::{analyze_trace, AnalysisConfig};
use gcpeak::trace::{ReaderConfig, TraceReader};

fuzz_target!(|data: &[u8]| {
    // Parsing must either succeed or return an error, never panic
    let reader = TraceReader::with_config(ReaderConfig {
        length_tolerance: usize::MAX,
        ..Default::default()
    });
    let Ok(trace) = reader.read_from(Cursor::new(data)) else {
        return;
    };

    // Anything that parses must also analyse cleanly
    if let Ok(table) = CalibrationTable::new(vec![CalibrationEntry::new("X", 1.0, 0.0, 0.0, 1.0)]) {
        let _ = analyze_trace(&trace, &table, &AnalysisConfig::default());
    }
});
