//! # Rust Logger Registry
//!
//! Configuration-driven loggers: a properties file decides, per class or
//! namespace, which handlers receive records and from which level on.
//!
//! ## Features
//!
//! - **Declarative handlers**: handlers, formatters and processors are built
//!   from `logger.<name>.*` sections through a registry of typed blueprints
//! - **Per-class resolution**: class settings override namespace settings,
//!   which override the root settings
//! - **Shared loggers**: one cached logger per configured class, built once
//!   even under concurrent lookups
//! - **Injection**: components implementing [`Loggable`] receive their logger
//!   from a [`LoadHook`]
//!
//! ## Configuration
//!
//! ```text
//! rootLogger = INFO
//! rootLogger.name = shop
//! rootLogger.handlers = console, file
//!
//! logger.console.handlerLoader = ConsoleHandler
//! logger.file.handlerLoader = FileHandler
//! logger.file.constructor.path = logs/%module%-%datetime%.log
//! logger.file.formatter = JsonFormatter
//!
//! logger.shop::payment = DEBUG
//! logger.shop::payment::Gateway.handlers = file
//! ```
//!
//! ## Usage
//!
//! ```
//! use rust_logger_registry::prelude::*;
//! use rust_logger_registry::info;
//!
//! let manager = LogManager::from_properties(Properties::from_pairs([
//!     ("rootLogger.handlers", "null"),
//!     ("logger.null.handlerLoader", "NullHandler"),
//! ]));
//!
//! let logger = manager.get_logger(Some("shop::cart::Cart"));
//! info!(logger, "{} items in cart", 3);
//! ```

pub mod config;
pub mod core;
pub mod handlers;
pub mod inject;
pub mod macros;
pub mod manager;

pub mod prelude {
    pub use crate::config::{
        Arguments, Blueprint, LogConfigurer, ParamSpec, Properties, TypeRegistry, Value,
    };
    pub use crate::core::{
        CallSite, ConfiguredHandler, Formatter, Handler, JsonFormatter, LineFormatter, LogContext,
        LogLevel, LogRecord, LogfmtFormatter, Logger, LoggerBuilder, LoggerError, Processor,
        Result,
    };
    pub use crate::handlers::{ConsoleHandler, ConsoleStream, FileHandler, NullHandler};
    pub use crate::inject::{LoadHook, Loggable};
    pub use crate::manager::{LogManager, LogManagerBuilder};
}

pub use config::{
    namespace_of, Arguments, Blueprint, Clock, HandlerSet, LogConfigurer, ObjectFactory,
    ParamSpec, ParameterResolver, Properties, ResolutionEngine, ResolvedTarget, TypeRegistry,
    Value,
};
pub use core::{
    CallSite, CallSiteContext, ConfiguredHandler, ContextProcessor, Formatter, Handler,
    HandlerMetrics, IntrospectionProcessor, JsonFormatter, LineFormatter, LogContext, LogLevel,
    LogRecord, LogfmtFormatter, Logger, LoggerBuilder, LoggerError, ProcessIdProcessor, Processor,
    Result, ThreadProcessor, UidProcessor,
};
pub use handlers::{ConsoleHandler, ConsoleStream, FileHandler, NullHandler};
#[cfg(feature = "slack")]
pub use handlers::{DeliveryStatus, SlackPayload, SlackWebhookHandler};
pub use inject::{LoadHook, Loggable};
pub use manager::{LogManager, LogManagerBuilder};
