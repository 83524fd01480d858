//! Criterion benchmarks for multilog

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use multilog::prelude::*;
use std::io;

// ============================================================================
// Gate Benchmarks
// ============================================================================

fn bench_rejected_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("rejected");
    group.throughput(Throughput::Elements(1));

    let sink = MultiSink::empty();
    sink.add_log("sink", DeviceTarget::writer(io::sink()), LogLevel::Error, None)
        .unwrap();

    group.bench_function("eager_below_threshold", |b| {
        b.iter(|| sink.debug(black_box("never written")).unwrap());
    });

    group.bench_function("lazy_below_threshold", |b| {
        b.iter(|| {
            sink.log_lazy(LogLevel::Debug, || format!("value {}", black_box(42)))
                .unwrap()
        });
    });

    group.finish();
}

// ============================================================================
// Fan-out Benchmarks
// ============================================================================

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");
    group.throughput(Throughput::Elements(1));

    for destinations in [1usize, 4, 16] {
        let sink = MultiSink::empty();
        for i in 0..destinations {
            sink.add_log(
                format!("dest{}", i),
                DeviceTarget::writer(io::sink()),
                LogLevel::Debug,
                None,
            )
            .unwrap();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(destinations),
            &sink,
            |b, sink| {
                b.iter(|| sink.info(black_box("fan out message")).unwrap());
            },
        );
    }

    group.finish();
}

// ============================================================================
// Renderer Benchmarks
// ============================================================================

fn bench_renderers(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderers");
    group.throughput(Throughput::Elements(1));

    let text = MultiSink::builder()
        .progname("bench")
        .default_device(DeviceTarget::writer(io::sink()))
        .build()
        .unwrap();
    text.set_level(None, LogLevel::Debug).unwrap();

    group.bench_function("text", |b| {
        b.iter(|| text.info(black_box("rendered as text")).unwrap());
    });

    let json = MultiSink::builder()
        .progname("bench")
        .renderer(JsonRenderer::new())
        .default_device(DeviceTarget::writer(io::sink()))
        .build()
        .unwrap();
    json.set_level(None, LogLevel::Debug).unwrap();

    group.bench_function("json", |b| {
        b.iter(|| json.info(black_box("rendered as json")).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_rejected_messages, bench_fan_out, bench_renderers);
criterion_main!(benches);
