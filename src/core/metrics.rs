//! Delivery metrics for handlers
//!
//! Failed deliveries are counted rather than retried, so these counters are
//! the only place a sink failure remains visible to the application.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept per configured handler
///
/// # Example
///
/// ```
/// use rust_logger_registry::HandlerMetrics;
///
/// let metrics = HandlerMetrics::new();
/// metrics.record_handled();
/// metrics.record_failed();
///
/// assert_eq!(metrics.handled_count(), 1);
/// assert_eq!(metrics.failed_count(), 1);
/// ```
#[derive(Debug)]
pub struct HandlerMetrics {
    /// Records delivered successfully
    handled: AtomicU64,

    /// Records whose delivery returned an error or panicked
    failed: AtomicU64,

    /// Records below the handler level
    skipped: AtomicU64,
}

impl HandlerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            handled: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn handled_count(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn skipped_count(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Record a delivered record, returning the previous count
    #[inline]
    pub fn record_handled(&self) -> u64 {
        self.handled.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed delivery, returning the previous count
    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_skipped(&self) -> u64 {
        self.skipped.fetch_add(1, Ordering::Relaxed)
    }

    /// Get failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been delivered yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.handled_count() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }
}

impl Default for HandlerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HandlerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            handled: AtomicU64::new(self.handled_count()),
            failed: AtomicU64::new(self.failed_count()),
            skipped: AtomicU64::new(self.skipped_count()),
        }
    }
}
