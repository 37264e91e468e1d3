//! Benchmarks for indicator evaluation and census validation

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sensus_core::{
    IndicatorCode, MedicalStandards, Thresholds, evaluate, evaluate_raw, evaluate_with,
    validation::{check_tanggal, validate_sensus},
    types::SensusCreate,
};
use std::hint::black_box;

/// Benchmark single evaluations across every band of every indicator
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let samples = [
        (IndicatorCode::Bor, [20.0, 45.0, 55.0, 65.0, 77.5, 87.0, 92.0, 97.0]),
        (IndicatorCode::Los, [2.0, 3.5, 4.5, 5.5, 7.5, 10.0, 12.0, 16.0]),
        (IndicatorCode::Bto, [10.0, 20.0, 27.0, 35.0, 45.0, 55.0, 65.0, 75.0]),
        (IndicatorCode::Toi, [0.05, 0.15, 0.3, 0.7, 2.0, 3.5, 5.0, 7.0]),
    ];

    for (code, values) in &samples {
        group.bench_with_input(BenchmarkId::new("code", code), values, |b, values| {
            b.iter(|| {
                for value in values {
                    black_box(evaluate(*code, black_box(*value)));
                }
            });
        });
    }

    group.bench_function("raw_unknown_code", |b| {
        b.iter(|| evaluate_raw(black_box("NDR"), black_box(2.0)));
    });

    group.finish();
}

/// Benchmark a month of dashboard cards against a remote-adjusted table
fn bench_dashboard_month(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard_month");
    let table = Thresholds::default().with_remote_optimal(&MedicalStandards::default());

    let days: Vec<[f64; 4]> = (0..30)
        .map(|d| {
            let d = f64::from(d);
            [55.0 + d * 1.5, 5.0 + d * 0.2, 35.0 + d * 0.5, 0.5 + d * 0.1]
        })
        .collect();

    group.throughput(Throughput::Elements((days.len() * 4) as u64));
    group.bench_function("evaluate_with", |b| {
        b.iter(|| {
            for values in &days {
                for (code, value) in IndicatorCode::ALL.iter().zip(values) {
                    black_box(evaluate_with(&table, *code, *value));
                }
            }
        });
    });

    group.finish();
}

/// Benchmark census validation as performed on every form submit
fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("census_validation");
    let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default();
    let payload = SensusCreate {
        tanggal: today,
        jml_pasien_awal: 30,
        jml_masuk: 5,
        jml_keluar: 3,
        tempat_tidur_tersedia: 40,
        hari_rawat: Some(210),
    };

    group.bench_function("validate_sensus", |b| {
        b.iter(|| validate_sensus(black_box(&payload), today));
    });
    group.bench_function("check_tanggal", |b| {
        b.iter(|| check_tanggal(black_box("2025-03-01"), today));
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_dashboard_month, bench_validation);
criterion_main!(benches);
