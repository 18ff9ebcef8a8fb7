use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use chrono::{TimeZone, Utc};
use gcpeak::baseline::tophat;
use gcpeak::calibration::{CalibrationEntry, CalibrationTable};
use gcpeak::pipeline::{analyze_trace, AnalysisConfig};
use gcpeak::trace::RawTrace;

/// Chromatogram with a drifting baseline and evenly spaced Gaussian peaks
fn synthetic_signal(len: usize, num_peaks: usize) -> Vec<f64> {
    let spacing = len as f64 / (num_peaks + 1) as f64;
    (0..len)
        .map(|i| {
            let x = i as f64;
            let mut v = 0.5 + x / len as f64;
            for p in 1..=num_peaks {
                let z = (x - p as f64 * spacing) / 8.0;
                v += 20.0 * (-0.5 * z * z).exp();
            }
            v
        })
        .collect()
}

fn calibration() -> CalibrationTable {
    let entries = (0..8)
        .map(|i| {
            let start = i as f64 * 0.5;
            CalibrationEntry::new(format!("C{}", i + 1), 0.5, -10.0, start, start + 0.5)
        })
        .collect();
    CalibrationTable::new(entries).unwrap()
}

/// Benchmark the tophat baseline corrector alone
fn bench_tophat(c: &mut Criterion) {
    let mut group = c.benchmark_group("tophat");

    for len in [1_000, 10_000, 100_000] {
        let signal = synthetic_signal(len, 8);
        let length = len / 10;
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::from_parameter(len), &signal, |b, signal| {
            b.iter(|| black_box(tophat(black_box(signal), length)));
        });
    }

    group.finish();
}

/// Benchmark a full trace analysis
fn bench_analyze_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_trace");
    let table = calibration();
    let timestamp = Utc.with_ymd_and_hms(2021, 10, 7, 9, 0, 0).unwrap();

    for len in [3_000, 30_000] {
        let trace = RawTrace::from_signal(timestamp, 5.0, synthetic_signal(len, 8));
        group.throughput(Throughput::Elements(len as u64));

        for baseline_correction in [false, true] {
            let config = AnalysisConfig {
                baseline_correction,
                ..Default::default()
            };
            let label = if baseline_correction { "corrected" } else { "raw" };
            group.bench_with_input(
                BenchmarkId::new(label, len),
                &trace,
                |b, trace| {
                    b.iter(|| black_box(analyze_trace(trace, &table, &config)));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_tophat, bench_analyze_trace);
criterion_main!(benches);
