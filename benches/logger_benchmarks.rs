//! Criterion benchmarks for rust_logger_registry

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_logger_registry::prelude::*;
use rust_logger_registry::ResolutionEngine;
use std::sync::Arc;

fn properties() -> Properties {
    Properties::from_pairs([
        ("rootLogger", "INFO"),
        ("rootLogger.handlers", "null"),
        ("rootLogger.processor", "IntrospectionProcessor"),
        ("logger.null.handlerLoader", "NullHandler"),
        ("logger.shop", "DEBUG"),
        ("logger.shop::cart::Cart", "ERROR"),
        ("logger.shop::cart::Cart.handlers", "null"),
    ])
}

// ============================================================================
// Lookup Benchmarks
// ============================================================================

fn bench_logger_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_lookup");
    group.throughput(Throughput::Elements(1));

    let manager = LogManager::from_properties(properties());
    manager.get_logger(Some("shop::cart::Cart"));

    group.bench_function("cached_class", |b| {
        b.iter(|| black_box(manager.get_logger(black_box(Some("shop::cart::Cart")))));
    });

    group.bench_function("default_fallback", |b| {
        b.iter(|| black_box(manager.get_logger(black_box(Some("billing::Invoice")))));
    });

    group.bench_function("first_lookup", |b| {
        b.iter(|| {
            let manager = LogManager::from_properties(properties());
            black_box(manager.get_logger(Some("shop::Order")))
        });
    });

    group.finish();
}

// ============================================================================
// Resolution Benchmarks
// ============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    let engine = ResolutionEngine::new(Arc::new(properties()));

    group.bench_function("class_configured", |b| {
        b.iter(|| black_box(engine.resolve(black_box(Some("shop::cart::Cart")))));
    });

    group.bench_function("namespace_configured", |b| {
        b.iter(|| black_box(engine.resolve(black_box(Some("shop::Order")))));
    });

    group.bench_function("unconfigured", |b| {
        b.iter(|| black_box(engine.resolve(black_box(Some("billing::Invoice")))));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let manager = LogManager::from_properties(properties());
    let logger = manager.get_logger(Some("shop::Order"));

    group.bench_function("delivered", |b| {
        b.iter(|| logger.info(black_box("Delivered message")));
    });

    group.bench_function("filtered", |b| {
        b.iter(|| logger.trace(black_box("Filtered message")));
    });

    group.bench_function("with_call_site", |b| {
        b.iter(|| rust_logger_registry::info!(logger, "Order {}", black_box(42)));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let manager = Arc::new(LogManager::from_properties(properties()));

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let manager = Arc::clone(&manager);
                    std::thread::spawn(move || {
                        let logger = manager.get_logger(Some("shop::Order"));
                        logger.info(black_box("Concurrent message"));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");

    let record = LogRecord::new("shop::Order", LogLevel::Info, "Order placed")
        .with_context(LogContext::new().with_field("order_id", 42).with_field("total", 19.99));

    let line = LineFormatter::default();
    let json = JsonFormatter::default();
    let logfmt = LogfmtFormatter::new();

    group.bench_function("line", |b| b.iter(|| black_box(line.format(black_box(&record)))));
    group.bench_function("json", |b| b.iter(|| black_box(json.format(black_box(&record)))));
    group.bench_function("logfmt", |b| b.iter(|| black_box(logfmt.format(black_box(&record)))));

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_logger_lookup,
    bench_resolution,
    bench_logging,
    bench_concurrent_logging,
    bench_formatters
);

criterion_main!(benches);
