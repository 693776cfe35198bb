//! Criterion benchmarks for the conversion hot paths.
//!
//! Benchmarks:
//! 1. Line counting over a raw export
//! 2. Full quote conversion (read, map, staged write)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use quantconvert_core::data::{count_lines, try_convert_quotes};

// ── Helpers ──────────────────────────────────────────────────────────

fn write_raw_export(dir: &Path, rows: usize) -> PathBuf {
    let mut body = String::with_capacity(rows * 48);
    for i in 0..rows {
        let minute = i % 60;
        let hour = (i / 60) % 24;
        let day = (i / 1440) % 28 + 1;
        let close = 1.2 + (i as f64 * 0.01).sin() * 0.01;
        let _ = writeln!(
            body,
            "{day:02}.03.2021,{hour:02}:{minute:02},{:.5},{:.5},{:.5},{close:.5},{}",
            close - 0.0002,
            close + 0.0005,
            close - 0.0005,
            i % 1000
        );
    }
    let path = dir.join(format!("BENCH-M1-{rows}-No Session.csv"));
    std::fs::write(&path, body).unwrap();
    path
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_count_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_lines");
    let dir = tempfile::tempdir().unwrap();

    for rows in [10_000usize, 100_000] {
        let src = write_raw_export(dir.path(), rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &src, |b, src| {
            b.iter(|| count_lines(black_box(src)).unwrap())
        });
    }
    group.finish();
}

fn bench_convert_quotes(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_quotes");
    group.sample_size(20);
    let dir = tempfile::tempdir().unwrap();

    for rows in [10_000usize, 100_000] {
        let src = write_raw_export(dir.path(), rows);
        let dst = dir.path().join(format!("BENCH-M1-{rows}.csv"));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| try_convert_quotes(black_box(&src), black_box(&dst)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_count_lines, bench_convert_quotes);
criterion_main!(benches);
