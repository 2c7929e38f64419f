//! Handler that accepts records and discards them

use crate::core::{Formatter, Handler, LogLevel, LogRecord, Result};

/// Swallows every record at or above its level and stops propagation, so
/// listing it first silences the handlers that follow for those levels.
#[derive(Debug, Clone)]
pub struct NullHandler {
    level: LogLevel,
}

impl NullHandler {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Default for NullHandler {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Handler for NullHandler {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn bubble(&self) -> bool {
        false
    }

    fn write(&mut self, _record: &LogRecord, _formatter: Option<&dyn Formatter>) -> Result<()> {
        Ok(())
    }
}
