//! Turns raw configuration strings into constructor argument values

use super::factory::Value;
use super::properties::Properties;
use crate::core::formatter::try_format_datetime;
use crate::core::LogLevel;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Source of the current local time used for `%datetime%`
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d";

/// Resolves a configured value.
///
/// A value spelling a level name (`DEBUG`, `ERROR`, ...) becomes
/// [`Value::Level`]. Anything else is a string in which `%module%` is
/// replaced by `rootLogger.name` and `%datetime%` by the current date
/// formatted with `logger.<section>.file.datetimeFormat`.
#[derive(Clone)]
pub struct ParameterResolver {
    properties: Arc<Properties>,
    clock: Clock,
}

impl ParameterResolver {
    pub fn new(properties: Arc<Properties>) -> Self {
        Self {
            properties,
            clock: Arc::new(Local::now),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn resolve(&self, section: &str, raw: &str) -> Value {
        if let Some(level) = LogLevel::from_name(raw) {
            return Value::Level(level);
        }

        let mut resolved = raw.to_string();

        if resolved.contains("%module%") {
            let module = self.properties.get("rootLogger.name").unwrap_or("");
            resolved = resolved.replace("%module%", module);
        }

        if resolved.contains("%datetime%") {
            resolved = resolved.replace("%datetime%", &self.current_date(section));
        }

        Value::Str(resolved)
    }

    fn current_date(&self, section: &str) -> String {
        let key = format!("logger.{}.file.datetimeFormat", section);
        let pattern = self.properties.get(&key).unwrap_or(DEFAULT_DATETIME_FORMAT);
        let now = (self.clock)();

        try_format_datetime(&now, pattern).unwrap_or_else(|| {
            eprintln!(
                "[LOGGER ERROR] Invalid datetime pattern '{}' at '{}', using '{}'",
                pattern, key, DEFAULT_DATETIME_FORMAT
            );
            now.format(DEFAULT_DATETIME_FORMAT).to_string()
        })
    }
}

impl std::fmt::Debug for ParameterResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterResolver")
            .field("properties", &self.properties.len())
            .finish_non_exhaustive()
    }
}
