use super::*;
use crate::calibration::CalibrationEntry;
use crate::concentration::{map_concentrations, PeakCount};
use crate::trace::tests::render_trace;
use chrono::{TimeZone, Utc};
use std::fs;

fn c2h2_table() -> CalibrationTable {
    CalibrationTable::new(vec![CalibrationEntry::new(
        "C2H2", 0.4741, -77.473, 1.5, 1.8,
    )])
    .unwrap()
}

/// 1000 samples at 5 Hz with a 50 V Gaussian at sample 500 (1.667 min)
fn gaussian_trace(time: &str) -> String {
    let samples: Vec<i64> = (0..1000)
        .map(|i| {
            let x = (i as f64 - 500.0) / 10.0;
            (50_000.0 * (-0.5 * x * x).exp()).round() as i64
        })
        .collect();
    render_trace("10-07-2021", time, "5", "1000", &samples)
}

#[test]
fn test_find_trace_files_recursive_and_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("expt").join("day2");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join("run_FID01.asc"), "").unwrap();
    fs::write(nested.join("run_fid02.ASC"), "").unwrap();
    fs::write(dir.path().join("run_TCD01.asc"), "").unwrap();
    fs::write(nested.join("notes_FID.txt"), "").unwrap();

    let files = find_trace_files(&[dir.path()], DEFAULT_TARGET, DEFAULT_SUFFIX).unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.contains(&dir.path().join("run_FID01.asc")));
    assert!(files.contains(&nested.join("run_fid02.ASC")));
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
}

#[test]
fn test_find_trace_files_missing_root() {
    let result = find_trace_files(&["/nonexistent/gc-data"], DEFAULT_TARGET, DEFAULT_SUFFIX);
    assert!(matches!(result, Err(BatchError::IoError(_))));
}

#[test]
fn test_run_number() {
    assert_eq!(run_number("run_FID07.asc"), Some(7));
    assert_eq!(run_number("/data/expt/run_FID120.ASC"), Some(120));
    assert_eq!(run_number("run_FID.asc"), None);
    assert_eq!(run_number("gc.run12.FID.asc"), None);
    assert_eq!(run_number("injection42"), Some(42));
}

#[test]
fn test_analyze_batch_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("run_FID01.asc");
    let second = dir.path().join("run_FID02.asc");
    let broken = dir.path().join("run_FID03.asc");
    fs::write(&first, gaussian_trace("09:00:00")).unwrap();
    fs::write(&second, gaussian_trace("09:30:00")).unwrap();
    fs::write(&broken, "not a trace\n").unwrap();

    let paths = vec![first, broken, second];
    let entries = analyze_batch(&paths, &c2h2_table(), &AnalysisConfig::default());

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].run, Some(1));
    assert_eq!(entries[1].run, Some(3));
    assert!(matches!(
        entries[1].result,
        Err(TraceError::TruncatedHeader { .. })
    ));

    for entry in [&entries[0], &entries[2]] {
        let analysis = entry.result.as_ref().unwrap();
        assert_eq!(analysis.peaks.len(), 1);
        assert!((analysis.peaks[0].counts - 251).abs() <= 2);
        assert!(entry.record().unwrap().get("C2H2").unwrap() > 0.0);
    }
    assert!(entries[2].record().unwrap().timestamp() > entries[0].record().unwrap().timestamp());
}

#[test]
fn test_write_concentration_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run_FID05.asc");
    fs::write(&path, gaussian_trace("09:00:00")).unwrap();
    let missing = dir.path().join("run_FID06.asc");

    let table = c2h2_table();
    let entries = analyze_batch(&[path.clone(), missing], &table, &AnalysisConfig::default());

    let mut output = Vec::new();
    let rows = write_concentration_table(&mut output, &table, &entries).unwrap();
    assert_eq!(rows, 1);

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "file,run,timestamp,C2H2");

    let expected_timestamp = Utc.with_ymd_and_hms(2021, 10, 7, 9, 0, 0).unwrap().timestamp();
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[0], path.display().to_string());
    assert_eq!(fields[1], "5");
    assert_eq!(fields[2], expected_timestamp.to_string());
    assert!(fields[3].parse::<f64>().unwrap() > 0.0);
}

#[test]
fn test_summarize_population_std() {
    let table = CalibrationTable::new(vec![
        CalibrationEntry::new("A", 1.0, 0.0, 1.0, 2.0),
        CalibrationEntry::new("B", 1.0, 0.0, 3.0, 4.0),
    ])
    .unwrap();
    let timestamp = Utc.with_ymd_and_hms(2021, 10, 7, 9, 0, 0).unwrap();
    let records: Vec<ConcentrationRecord> = [100, 200]
        .iter()
        .map(|&counts| {
            let peaks = [PeakCount {
                apex_time: 1.5,
                counts,
            }];
            map_concentrations(&peaks, &table, timestamp).record
        })
        .collect();

    let summary = summarize(&records, &table);

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].chem_id, "A");
    assert_eq!(summary[0].mean, 150.0);
    assert_eq!(summary[0].std_dev, 50.0);
    assert_eq!(summary[0].samples, 2);
    assert_eq!(summary[1].mean, 0.0);
    assert_eq!(summary[1].std_dev, 0.0);
}

#[test]
fn test_summarize_empty() {
    let records: Vec<ConcentrationRecord> = Vec::new();
    let summary = summarize(&records, &c2h2_table());
    assert_eq!(summary[0].samples, 0);
    assert_eq!(summary[0].mean, 0.0);
}
