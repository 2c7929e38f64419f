//! Logger lookup and caching
//!
//! A [`LogManager`] owns one configuration, loaded on first use, and hands
//! out one shared [`Logger`] per class that has a level configured for it or
//! for its namespace. Every other class shares the default logger.
//!
//! ```
//! use rust_logger_registry::{LogManager, Properties};
//!
//! let manager = LogManager::from_properties(Properties::from_pairs([
//!     ("rootLogger.handlers", "null"),
//!     ("logger.null.handlerLoader", "NullHandler"),
//!     ("logger.shop", "ERROR"),
//! ]));
//!
//! let cart = manager.get_logger(Some("shop::Cart"));
//! assert_eq!(cart.name(), "shop::Cart");
//!
//! let other = manager.get_logger(Some("billing::Invoice"));
//! assert_eq!(other.name(), "defaultLogger");
//! ```

use crate::config::{LogConfigurer, Properties, ResolvedTarget, TypeRegistry};
use crate::config::resolver::Clock;
use crate::core::{ConfiguredHandler, LogLevel, Logger, Result};
use crate::handlers::{ConsoleHandler, ConsoleStream};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Configuration file read when no other source is given
pub const DEFAULT_CONFIG_PATH: &str = "resources/logger.properties";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "LOGGER_PROPERTIES";
/// Environment variable enabling bootstrap diagnostics on stderr, e.g. `TRACE`
pub const BOOTSTRAP_LEVEL_ENV: &str = "LOGGER_BOOTSTRAP_LEVEL";

pub const DEFAULT_LOGGER_NAME: &str = "defaultLogger";
pub const BOOTSTRAP_LOGGER_NAME: &str = "bootstrap";

static GLOBAL: OnceLock<LogManager> = OnceLock::new();

enum ConfigSource {
    Properties(Properties),
    Path(PathBuf),
    Default,
}

impl ConfigSource {
    /// Load the configuration; unreadable files yield an empty configuration.
    fn load(&self) -> Properties {
        let path = match self {
            ConfigSource::Properties(properties) => return properties.clone(),
            ConfigSource::Path(path) => path.clone(),
            ConfigSource::Default => std::env::var_os(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        match Properties::load(&path) {
            Ok(properties) => properties,
            Err(e) => {
                eprintln!("[LOGGER ERROR] {}; continuing without configured handlers", e);
                Properties::new()
            }
        }
    }
}

/// Resolves, builds and caches loggers
pub struct LogManager {
    source: ConfigSource,
    registry: Arc<TypeRegistry>,
    clock: Option<Clock>,
    configurer: OnceLock<LogConfigurer>,
    default_logger: OnceLock<Arc<Logger>>,
    loggers: DashMap<String, Arc<Logger>>,
    bootstrap: Arc<Logger>,
}

impl LogManager {
    /// Manager reading the default configuration file on first use
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LogManagerBuilder {
        LogManagerBuilder::new()
    }

    pub fn from_properties(properties: Properties) -> Self {
        Self::builder().properties(properties).build()
    }

    /// Manager for the configuration at `path`, read immediately
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let properties = Properties::load(path.into())?;
        Ok(Self::from_properties(properties))
    }

    /// Process-wide manager, created with [`LogManager::new`] unless one was installed
    pub fn global() -> &'static LogManager {
        GLOBAL.get_or_init(LogManager::new)
    }

    /// Install the process-wide manager.
    ///
    /// Fails, handing the manager back, once a global manager exists.
    pub fn install_global(manager: LogManager) -> std::result::Result<(), LogManager> {
        GLOBAL.set(manager)
    }

    /// The configuration, loaded on first access
    pub fn configurer(&self) -> &LogConfigurer {
        self.configurer.get_or_init(|| {
            let properties = self.source.load();
            self.bootstrap.debug(format!(
                "Loaded logger configuration with {} entries",
                properties.len()
            ));
            let configurer = LogConfigurer::new(
                Arc::new(properties),
                Arc::clone(&self.registry),
                Arc::clone(&self.bootstrap),
            );
            match &self.clock {
                Some(clock) => configurer.with_clock(Arc::clone(clock)),
                None => configurer,
            }
        })
    }

    /// Logger for `class`; `None` returns the default logger
    pub fn get_logger(&self, class: Option<&str>) -> Arc<Logger> {
        self.bootstrap
            .trace(format!("get logger for class: {}", class.unwrap_or("<none>")));

        let Some(class) = class else {
            return self.default_logger();
        };
        if let Some(logger) = self.cached(class) {
            return logger;
        }

        let target = self.configurer().resolve(Some(class));
        self.logger_for_target(class, target)
    }

    /// Logger for `class`, resolving levels against an explicit namespace
    pub fn get_logger_in(&self, class: &str, namespace: &str) -> Arc<Logger> {
        self.bootstrap
            .trace(format!("get logger for class: {} in namespace: {}", class, namespace));

        if let Some(logger) = self.cached(class) {
            return logger;
        }

        let target = self.configurer().engine().resolve_in(Some(class), Some(namespace));
        self.logger_for_target(class, target)
    }

    /// Logger for the type `T`, identified by its type path.
    ///
    /// The path is whatever `std::any::type_name` reports, so it carries the
    /// defining crate's name and any generic arguments.
    pub fn logger_for<T: ?Sized>(&self) -> Arc<Logger> {
        self.get_logger(Some(std::any::type_name::<T>()))
    }

    /// Logger built from the root handlers, shared by every class without a level
    pub fn default_logger(&self) -> Arc<Logger> {
        Arc::clone(self.default_logger.get_or_init(|| {
            let handlers = self.configurer().make_handlers(None, None);
            Arc::new(Logger::new(DEFAULT_LOGGER_NAME, handlers.into_vec(), Vec::new()))
        }))
    }

    /// Logger receiving this manager's own diagnostics
    pub fn bootstrap_logger(&self) -> &Arc<Logger> {
        &self.bootstrap
    }

    /// Number of class loggers built so far (the default logger excluded)
    pub fn cached_logger_count(&self) -> usize {
        self.loggers.len()
    }

    /// Flush every handler reachable from the cached and default loggers
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        let default = self.default_logger.get().cloned();
        let cached = self.loggers.iter().map(|entry| Arc::clone(entry.value()));
        for logger in default.into_iter().chain(cached) {
            if let Err(e) = logger.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn cached(&self, class: &str) -> Option<Arc<Logger>> {
        self.loggers.get(class).map(|entry| Arc::clone(entry.value()))
    }

    fn logger_for_target(&self, class: &str, target: ResolvedTarget) -> Arc<Logger> {
        let Some(level) = target.level else {
            return self.default_logger();
        };

        // Built without holding a map lock; a racing builder's logger is dropped
        let handlers = self.configurer().make_handlers_for(&target, Some(level));
        let logger = Arc::new(Logger::new(class, handlers.into_vec(), Vec::new()));

        let stored = self.loggers.entry(class.to_string()).or_insert(logger);
        Arc::clone(stored.value())
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogManager")
            .field("loaded", &self.configurer.get().is_some())
            .field("cached_loggers", &self.loggers.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`LogManager`]
///
/// # Example
/// ```
/// use rust_logger_registry::{LogLevel, LogManager, Properties, TypeRegistry};
///
/// let manager = LogManager::builder()
///     .properties(Properties::from_pairs([("rootLogger", "WARNING")]))
///     .registry(TypeRegistry::new())
///     .bootstrap_level(LogLevel::Warning)
///     .build();
/// assert_eq!(manager.configurer().root_level(), LogLevel::Warning);
/// ```
pub struct LogManagerBuilder {
    source: ConfigSource,
    registry: Option<TypeRegistry>,
    clock: Option<Clock>,
    bootstrap_level: Option<LogLevel>,
}

impl LogManagerBuilder {
    pub fn new() -> Self {
        Self {
            source: ConfigSource::Default,
            registry: None,
            clock: None,
            bootstrap_level: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn properties(mut self, properties: Properties) -> Self {
        self.source = ConfigSource::Properties(properties);
        self
    }

    /// Read the configuration from `path` on first use
    #[must_use = "builder methods return a new value"]
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = ConfigSource::Path(path.into());
        self
    }

    /// Types available to configuration; defaults to [`TypeRegistry::new`]
    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Clock used for `%datetime%` in configured values
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Print bootstrap diagnostics at or above `level` to stderr
    #[must_use = "builder methods return a new value"]
    pub fn bootstrap_level(mut self, level: LogLevel) -> Self {
        self.bootstrap_level = Some(level);
        self
    }

    pub fn build(self) -> LogManager {
        let bootstrap_level = self.bootstrap_level.or_else(|| {
            std::env::var(BOOTSTRAP_LEVEL_ENV)
                .ok()
                .and_then(|value| value.parse::<LogLevel>().ok())
        });

        LogManager {
            source: self.source,
            registry: Arc::new(self.registry.unwrap_or_default()),
            clock: self.clock,
            configurer: OnceLock::new(),
            default_logger: OnceLock::new(),
            loggers: DashMap::new(),
            bootstrap: Arc::new(bootstrap_logger(bootstrap_level)),
        }
    }
}

impl Default for LogManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn bootstrap_logger(level: Option<LogLevel>) -> Logger {
    let Some(level) = level else {
        return Logger::detached(BOOTSTRAP_LOGGER_NAME);
    };
    let console = ConsoleHandler::new()
        .with_stream(ConsoleStream::Stderr)
        .with_level(level);
    let handler = ConfiguredHandler::new(BOOTSTRAP_LOGGER_NAME, "ConsoleHandler", Box::new(console));
    Logger::builder(BOOTSTRAP_LOGGER_NAME)
        .handler(Arc::new(handler))
        .build()
}
