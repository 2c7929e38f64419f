//! Handler trait for log delivery sinks and the configured wrapper around it

use super::{
    error::Result, formatter::Formatter, log_level::LogLevel, metrics::HandlerMetrics,
    processor::{ContextProcessor, Processor}, record::LogRecord,
};
use parking_lot::Mutex;

/// A delivery sink.
///
/// `formatter` is the formatter configured for the handler, if any; sinks fall
/// back to their own default representation when it is `None`.
pub trait Handler: Send {
    fn level(&self) -> LogLevel;

    /// Whether records handled here continue on to the next handler
    fn bubble(&self) -> bool {
        true
    }

    fn write(&mut self, record: &LogRecord, formatter: Option<&dyn Formatter>) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A handler built from configuration, with its formatter and processor chain.
///
/// Instances are shared through `Arc` by every logger assembled in the same
/// resolution pass; the sink itself sits behind a mutex so writes from
/// concurrent callers are serialized.
pub struct ConfiguredHandler {
    name: String,
    type_name: String,
    level: LogLevel,
    bubble: bool,
    sink: Mutex<Box<dyn Handler>>,
    formatter: Option<Box<dyn Formatter>>,
    processors: Vec<ContextProcessor>,
    metrics: HandlerMetrics,
}

impl ConfiguredHandler {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, sink: Box<dyn Handler>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            level: sink.level(),
            bubble: sink.bubble(),
            sink: Mutex::new(sink),
            formatter: None,
            processors: Vec::new(),
            metrics: HandlerMetrics::new(),
        }
    }

    /// Configured section name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered type the sink was built from
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn bubble(&self) -> bool {
        self.bubble
    }

    pub fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }

    pub fn processors(&self) -> &[ContextProcessor] {
        &self.processors
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        &self.metrics
    }

    pub fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = Some(formatter);
    }

    /// Processors run in the order they were pushed.
    pub fn push_processor(&mut self, processor: ContextProcessor) {
        self.processors.push(processor);
    }

    #[inline]
    pub fn is_handling(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Deliver a record.
    ///
    /// Returns `true` when the record must not bubble to the following
    /// handlers. Delivery errors and panics, in the sink or in any of the
    /// handler's processors, are counted and reported on stderr, never
    /// propagated to the logging call.
    pub fn handle(&self, record: &LogRecord) -> bool {
        if !self.is_handling(record.level) {
            self.metrics.record_skipped();
            return false;
        }

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut processed;
            let record = if self.processors.is_empty() {
                record
            } else {
                processed = record.clone();
                for processor in &self.processors {
                    processor.process(&mut processed);
                }
                &processed
            };
            self.sink.lock().write(record, self.formatter.as_deref())
        }));

        match outcome {
            Ok(Ok(())) => {
                self.metrics.record_handled();
            }
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Handler '{}' failed: {}", self.name, e);
                self.metrics.record_failed();
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Handler '{}' panicked: {}. \
                     Other handlers continue to function.",
                    self.name,
                    panic_message(panic_info.as_ref())
                );
                self.metrics.record_failed();
            }
        }

        !self.bubble
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.lock().flush()
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl std::fmt::Debug for ConfiguredHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredHandler")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}
