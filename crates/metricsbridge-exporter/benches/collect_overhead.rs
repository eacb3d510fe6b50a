//! Benchmark scrape cost
//!
//! Measures `collect()` and full text rendering over registries shaped like
//! a node with many tables, and the cost of an instrument add/remove cycle.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use metricsbridge_config::Config;
use metricsbridge_exporter::{CacheCollector, FnGauge, GaugeValue, MetricRegistry};
use std::hint::black_box;
use std::sync::Arc;

const PREFIX: &str = "org.apache.cassandra.metrics.Table";

/// Registry with two latency histograms, a counter and a bucket gauge per table
fn populate(registry: &MetricRegistry, tables: usize) {
    for t in 0..tables {
        for metric in ["ReadLatency", "WriteLatency"] {
            let histogram = registry
                .histogram(&format!("{}.{}.ks.t{}", PREFIX, metric, t))
                .unwrap();
            for v in 0..100 {
                histogram.update(v);
            }
        }
        registry
            .counter(&format!("{}.PendingFlushes.ks.t{}", PREFIX, t))
            .unwrap()
            .inc_by(t as i64);
        registry
            .register_gauge(
                &format!("{}.EstimatedPartitionSizeHistogram.ks.t{}", PREFIX, t),
                Arc::new(FnGauge::new(|| GaugeValue::Buckets(vec![3, 5, 8, 13, 21, 0]))),
            )
            .unwrap();
    }
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    for tables in [10, 100, 500] {
        let registry = MetricRegistry::new();
        let collector = CacheCollector::from_config(&Config::default()).unwrap();
        collector.attach(&registry);
        populate(&registry, tables);

        group.bench_with_input(BenchmarkId::new("families", tables), &tables, |b, _| {
            b.iter(|| black_box(collector.collect().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("render", tables), &tables, |b, _| {
            b.iter(|| black_box(collector.render().unwrap()));
        });
    }

    group.finish();
}

fn bench_add_remove(c: &mut Criterion) {
    let registry = MetricRegistry::new();
    let collector = CacheCollector::from_config(&Config::default()).unwrap();
    collector.attach(&registry);
    populate(&registry, 100);

    c.bench_function("add_remove_timer", |b| {
        b.iter(|| {
            registry
                .timer("org.apache.cassandra.metrics.Table.CasCommit.ks.extra")
                .unwrap();
            black_box(registry.remove("org.apache.cassandra.metrics.Table.CasCommit.ks.extra"));
        });
    });
}

criterion_group!(benches, bench_collect, bench_add_remove);
criterion_main!(benches);
