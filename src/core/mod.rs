//! Core logger types and traits

pub mod error;
pub mod formatter;
pub mod handler;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod processor;
pub mod record;

pub use error::{LoggerError, Result};
pub use formatter::{Formatter, JsonFormatter, LineFormatter, LogfmtFormatter};
pub use handler::{ConfiguredHandler, Handler};
pub use log_context::LogContext;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::HandlerMetrics;
pub use processor::{
    ContextProcessor, IntrospectionProcessor, ProcessIdProcessor, Processor, ThreadProcessor,
    UidProcessor,
};
pub use record::{CallSite, CallSiteContext, LogRecord};
