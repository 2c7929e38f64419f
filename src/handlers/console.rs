//! Console handler implementation

use crate::core::{Formatter, Handler, LineFormatter, LogLevel, LogRecord, LoggerError, Result};
use std::io::Write;
use std::str::FromStr;

/// Output stream of a [`ConsoleHandler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

impl FromStr for ConsoleStream {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stdout" => Ok(ConsoleStream::Stdout),
            "stderr" => Ok(ConsoleStream::Stderr),
            other => Err(LoggerError::invalid_parameter(
                "stream",
                format!("expected 'stdout' or 'stderr', got '{}'", other),
            )),
        }
    }
}

pub struct ConsoleHandler {
    stream: ConsoleStream,
    level: LogLevel,
    bubble: bool,
    use_colors: bool,
    default_formatter: LineFormatter,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
            level: LogLevel::Debug,
            bubble: true,
            use_colors: true,
            default_formatter: LineFormatter::default(),
        }
    }

    #[must_use]
    pub fn with_stream(mut self, stream: ConsoleStream) -> Self {
        self.stream = stream;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    #[cfg(feature = "console")]
    fn colorize(&self, level: LogLevel, text: String) -> String {
        use colored::Colorize;
        if self.use_colors {
            text.color(level.color_code()).to_string()
        } else {
            text
        }
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, _level: LogLevel, text: String) -> String {
        text
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ConsoleHandler {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn bubble(&self) -> bool {
        self.bubble
    }

    fn write(&mut self, record: &LogRecord, formatter: Option<&dyn Formatter>) -> Result<()> {
        let output = match formatter {
            Some(formatter) => formatter.format(record),
            None => self.default_formatter.format(record),
        };
        let output = self.colorize(record.level, output);

        match self.stream {
            ConsoleStream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(output.as_bytes())?;
            }
            ConsoleStream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(output.as_bytes())?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }
}
