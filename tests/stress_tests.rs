//! Stress tests for concurrent logger lookup and delivery
//!
//! These tests verify:
//! - Concurrent lookups of one class all receive the same cached logger
//! - Configuration is loaded exactly once under contention
//! - Concurrent writers sharing a handler never lose or interleave records

use rust_logger_registry::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 16;

fn shared_manager(pairs: &[(&str, &str)]) -> Arc<LogManager> {
    Arc::new(LogManager::from_properties(Properties::from_pairs(
        pairs.iter().copied(),
    )))
}

/// Test that racing first lookups converge on one logger instance
#[test]
fn test_concurrent_get_logger_identity() {
    let manager = shared_manager(&[
        ("logger.null.handlerLoader", "NullHandler"),
        ("logger.shop", "DEBUG"),
    ]);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.get_logger(Some("shop::Cart"))
            })
        })
        .collect();

    let loggers: Vec<Arc<Logger>> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let first = &loggers[0];
    assert!(loggers.iter().all(|l| Arc::ptr_eq(first, l)));
    assert!(Arc::ptr_eq(first, &manager.get_logger(Some("shop::Cart"))));
    assert_eq!(manager.cached_logger_count(), 1);
}

/// Test that many classes resolved concurrently each get exactly one logger
#[test]
fn test_concurrent_lookups_across_classes() {
    let manager = shared_manager(&[
        ("logger.null.handlerLoader", "NullHandler"),
        ("logger.shop", "INFO"),
    ]);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..50 {
                    let class = format!("shop::Item{}", (i + t) % 10);
                    let logger = manager.get_logger(Some(&class));
                    assert_eq!(logger.name(), class);
                    // unconfigured namespaces always map to the default logger
                    let other = manager.get_logger(Some("billing::Invoice"));
                    assert_eq!(other.name(), "defaultLogger");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(manager.cached_logger_count(), 10);
    let distinct: HashSet<usize> = (0..10)
        .map(|i| Arc::as_ptr(&manager.get_logger(Some(&format!("shop::Item{}", i)))) as usize)
        .collect();
    assert_eq!(distinct.len(), 10);
}

/// Test that the default logger is built once under contention
#[test]
fn test_concurrent_default_logger() {
    let manager = shared_manager(&[("logger.null.handlerLoader", "NullHandler")]);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.default_logger()
            })
        })
        .collect();

    let loggers: Vec<Arc<Logger>> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();
    assert!(loggers.iter().all(|l| Arc::ptr_eq(&loggers[0], l)));
}

/// Test that concurrent writers through one shared file handler keep every record intact
#[test]
fn test_concurrent_writes_to_shared_handler() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("shared.log");
    let path = log_file.to_str().expect("utf-8 path");

    let manager = shared_manager(&[
        ("rootLogger", "DEBUG"),
        ("logger.file.handlerLoader", "FileHandler"),
        ("logger.file.constructor.path", path),
        ("logger.file.formatter", "LineFormatter"),
        ("logger.file.formatter.constructor.format", "%message%\\n"),
    ]);

    const PER_THREAD: usize = 200;
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let logger = manager.default_logger();
                for i in 0..PER_THREAD {
                    logger.info(format!("thread-{}-entry-{}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
    manager.flush().expect("Failed to flush");

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: HashSet<&str> = content.lines().collect();
    assert_eq!(content.lines().count(), THREADS * PER_THREAD);
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    assert!(lines.iter().all(|l| l.starts_with("thread-")));

    let handler = manager.default_logger().handler("file").cloned().expect("handler");
    assert_eq!(handler.metrics().handled_count(), (THREADS * PER_THREAD) as u64);
    assert_eq!(handler.metrics().failed_count(), 0);
}
