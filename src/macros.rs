//! Logging macros for ergonomic log message formatting.
//!
//! These macros format like `format!` and record the call site
//! (`file!()`, `line!()`, `module_path!()`) on the emitted record, where
//! configured processors pick it up.
//!
//! # Examples
//!
//! ```
//! use rust_logger_registry::prelude::*;
//! use rust_logger_registry::info;
//!
//! let logger = Logger::detached("app");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Capture the current source location as a [`CallSite`](crate::CallSite).
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), module_path!())
    };
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_logger_registry::prelude::*;
/// # let logger = Logger::detached("app");
/// use rust_logger_registry::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($level, format!($($arg)+), $crate::call_site!())
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_registry::prelude::*;
/// # let logger = Logger::detached("app");
/// use rust_logger_registry::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_registry::prelude::*;
/// # let logger = Logger::detached("app");
/// use rust_logger_registry::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_registry::prelude::*;
/// # let logger = Logger::detached("app");
/// use rust_logger_registry::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{
        ConfiguredHandler, Formatter, Handler, LogLevel, LogRecord, Logger, Result,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Sites(Arc<Mutex<Vec<LogRecord>>>);

    impl Handler for Sites {
        fn level(&self) -> LogLevel {
            LogLevel::Trace
        }

        fn write(&mut self, record: &LogRecord, _formatter: Option<&dyn Formatter>) -> Result<()> {
            self.0.lock().push(record.clone());
            Ok(())
        }
    }

    fn capturing_logger() -> (Logger, Arc<Mutex<Vec<LogRecord>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let handler = ConfiguredHandler::new("sites", "Sites", Box::new(Sites(Arc::clone(&records))));
        (Logger::builder("macros").handler(Arc::new(handler)).build(), records)
    }

    #[test]
    fn test_macros_set_levels() {
        let (logger, records) = capturing_logger();
        trace!(logger, "t");
        debug!(logger, "d");
        info!(logger, "i {}", 1);
        warning!(logger, "w");
        error!(logger, "e");
        critical!(logger, "c {}", "x");
        log!(logger, LogLevel::Info, "plain");

        let levels: Vec<LogLevel> = records.lock().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Trace,
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warning,
                LogLevel::Error,
                LogLevel::Critical,
                LogLevel::Info,
            ]
        );
        assert_eq!(records.lock()[2].message, "i 1");
    }

    #[test]
    fn test_call_site_is_captured() {
        let (logger, records) = capturing_logger();
        let line = line!() + 1;
        info!(logger, "here");

        let records = records.lock();
        let site = records[0].call_site.as_ref().expect("call site");
        assert!(site.file.ends_with("macros.rs"));
        assert_eq!(site.line, line);
        assert_eq!(site.module_path, module_path!());
    }
}
