//! Recorder benchmark: durable emit (write + flush + fsync) and a full sampling tick.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sysstats_recorder::collectors::SystemSource;
use sysstats_recorder::sampling::sample_tick;
use sysstats_recorder::storage::Recorder;
use tempfile::tempdir;

fn bench_emit(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let recorder = Recorder::create(dir.path().join("bench.csv")).unwrap();
    recorder.write_header().unwrap();

    c.bench_function("recorder_emit", |b| {
        b.iter(|| black_box(recorder.emit("Current CPU utilization: [0]", "12.50", "%")).unwrap())
    });
}

fn bench_tick(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let recorder = Recorder::create(dir.path().join("bench.csv")).unwrap();
    let source = SystemSource::new();

    c.bench_function("sampling_tick", |b| {
        b.iter(|| black_box(sample_tick(&source, &recorder)))
    });
}

criterion_group!(benches, bench_emit, bench_tick);
criterion_main!(benches);
