//! Main logger implementation

use super::{
    error::Result,
    handler::{panic_message, ConfiguredHandler},
    log_context::LogContext,
    log_level::LogLevel,
    processor::Processor,
    record::{CallSite, LogRecord},
};
use std::sync::Arc;

/// A named channel delivering records to a fixed set of handlers.
///
/// Loggers are immutable once built: the handler and processor lists are
/// fixed at construction. Handlers fire synchronously on the calling thread,
/// in the order they were resolved, until one of them stops bubbling.
pub struct Logger {
    name: String,
    handlers: Vec<Arc<ConfiguredHandler>>,
    processors: Vec<Arc<dyn Processor>>,
}

impl Logger {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        handlers: Vec<Arc<ConfiguredHandler>>,
        processors: Vec<Arc<dyn Processor>>,
    ) -> Self {
        Self {
            name: name.into(),
            handlers,
            processors,
        }
    }

    /// Logger without handlers; every record is discarded
    #[must_use]
    pub fn detached(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &[Arc<ConfiguredHandler>] {
        &self.handlers
    }

    pub fn handler(&self, name: &str) -> Option<&Arc<ConfiguredHandler>> {
        self.handlers.iter().find(|h| h.name() == name)
    }

    /// Whether any handler accepts records of this level
    pub fn is_handling(&self, level: LogLevel) -> bool {
        self.handlers.iter().any(|h| h.is_handling(level))
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(level, message.into(), LogContext::new(), None);
    }

    /// Log with a caller-supplied source location (used by the logging macros)
    pub fn log_at(&self, level: LogLevel, message: impl Into<String>, call_site: CallSite) {
        self.emit(level, message.into(), LogContext::new(), Some(call_site));
    }

    /// Log with structured context fields
    pub fn log_with_context(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        self.emit(level, message.into(), context, None);
    }

    pub fn log_with_context_at(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
        call_site: CallSite,
    ) {
        self.emit(level, message.into(), context, Some(call_site));
    }

    fn emit(&self, level: LogLevel, message: String, context: LogContext, call_site: Option<CallSite>) {
        if !self.is_handling(level) {
            return;
        }

        let mut record = LogRecord::new(self.name.as_str(), level, message).with_context(context);
        record.call_site = call_site;
        for processor in &self.processors {
            // A failing enricher must not cost the record or reach the caller
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                processor.process(&mut record)
            }));
            if let Err(panic_info) = outcome {
                eprintln!(
                    "[LOGGER CRITICAL] Processor on '{}' panicked: {}",
                    self.name,
                    panic_message(panic_info.as_ref())
                );
            }
        }

        for handler in &self.handlers {
            if handler.handle(&record) {
                break;
            }
        }
    }

    /// Flush every handler, returning the first error encountered
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for handler in &self.handlers {
            if let Err(e) = handler.flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("handlers", &self.handlers)
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Only the last owner of a shared handler flushes it
        for handler in &self.handlers {
            if Arc::strong_count(handler) == 1 {
                if let Err(e) = handler.flush() {
                    eprintln!("[LOGGER ERROR] Failed to flush '{}' during shutdown: {}", handler.name(), e);
                }
            }
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_logger_registry::prelude::*;
/// use std::sync::Arc;
///
/// let console = ConfiguredHandler::new("console", "ConsoleHandler", Box::new(ConsoleHandler::new()));
/// let logger = Logger::builder("app")
///     .handler(Arc::new(console))
///     .build();
/// assert_eq!(logger.handlers().len(), 1);
/// ```
pub struct LoggerBuilder {
    name: String,
    handlers: Vec<Arc<ConfiguredHandler>>,
    processors: Vec<Arc<dyn Processor>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            processors: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler(mut self, handler: Arc<ConfiguredHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn handlers<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = Arc<ConfiguredHandler>>,
    {
        self.handlers.extend(handlers);
        self
    }

    /// Add a logger-wide processor, run before any handler processor
    #[must_use = "builder methods return a new value"]
    pub fn processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger::new(self.name, self.handlers, self.processors)
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }
}
