//! Changepoint detection and correlation throughput
//!
//! A full-size associativity table (19 strides x 30 probe counts) is tiny,
//! so the interesting numbers are per-row detection cost and how it scales
//! with curve length for working-set sweeps.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench changepoint
//! ```

use cachescope::inference::{
    analyze_jumps_for_assoc, detect_jump_table, AnalysisConfig, ChangepointDetector,
};
use cachescope::result_table::ResultTable;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Latency curve with a few plateaus and mild deterministic jitter
fn synthetic_curve(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let plateau = match i * 4 / len.max(1) {
                0 => 1.0,
                1 => 3.0,
                2 => 9.0,
                _ => 30.0,
            };
            let jitter = ((i * 7919) % 13) as f32 * 0.002;
            plateau * (1.0 + jitter)
        })
        .collect()
}

fn assoc_table(strides: usize, ways: usize) -> ResultTable<usize, f32> {
    let mut table = ResultTable::new();
    for row in 0..strides {
        let stride = 16 << row;
        let step = (ways / 2).max(1) >> (row % 3);
        let values = (0..ways)
            .map(|i| if i < step.max(1) { 1.2 } else { 6.5 })
            .collect();
        table.append(stride, values);
    }
    table
}

fn bench_jump_indices(c: &mut Criterion) {
    let detector = ChangepointDetector::default();
    let mut group = c.benchmark_group("jump_indices");

    for len in [32, 256, 2048] {
        let curve = synthetic_curve(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &curve, |b, curve| {
            b.iter(|| detector.jump_indices(black_box(curve)));
        });
    }

    group.finish();
}

fn bench_assoc_pipeline(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let detector = ChangepointDetector::from_config(&config);
    let table = assoc_table(19, 30);

    c.bench_function("assoc_pipeline_19x30", |b| {
        b.iter(|| {
            let jumps = detect_jump_table(black_box(&table), &detector);
            analyze_jumps_for_assoc(&jumps, &config)
        });
    });
}

criterion_group!(benches, bench_jump_indices, bench_assoc_pipeline);
criterion_main!(benches);
