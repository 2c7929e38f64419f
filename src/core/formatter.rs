//! Formatters turning a [`LogRecord`] into its textual representation
//!
//! Provides the built-in formatters that can be referenced from configuration:
//! - `LineFormatter`: placeholder-driven single line output (default)
//! - `JsonFormatter`: one JSON object per record
//! - `LogfmtFormatter`: key=value pairs compatible with log aggregation tools

use super::log_context::display_value;
use super::record::LogRecord;
use chrono::{DateTime, TimeZone};
use serde_json::{Map, Value};
use std::fmt::{Display, Write};

pub const DEFAULT_LINE_FORMAT: &str = "[%datetime%] %channel%.%level_name%: %message% %context% %extra%\n";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts a record into the text a handler writes.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

/// Format a timestamp with a strftime pattern, returning `None` for invalid patterns.
pub fn try_format_datetime<Tz>(datetime: &DateTime<Tz>, pattern: &str) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    write!(out, "{}", datetime.format(pattern)).ok()?;
    Some(out)
}

/// Whether a strftime pattern is usable by chrono.
pub fn is_valid_datetime_pattern(pattern: &str) -> bool {
    try_format_datetime(&chrono::Utc::now(), pattern).is_some()
}

/// Placeholder-driven line formatter
///
/// Supported placeholders: `%datetime%`, `%channel%`, `%level_name%`, `%level%`,
/// `%message%`, `%context%`, `%extra%` and `%call_site%`.
#[derive(Debug, Clone)]
pub struct LineFormatter {
    format: String,
    date_format: String,
    allow_inline_line_breaks: bool,
    ignore_empty_context_and_extra: bool,
}

impl LineFormatter {
    pub fn new(format: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            date_format: date_format.into(),
            allow_inline_line_breaks: false,
            ignore_empty_context_and_extra: false,
        }
    }

    #[must_use]
    pub fn with_inline_line_breaks(mut self, allow: bool) -> Self {
        self.allow_inline_line_breaks = allow;
        self
    }

    #[must_use]
    pub fn with_ignore_empty_context_and_extra(mut self, ignore: bool) -> Self {
        self.ignore_empty_context_and_extra = ignore;
        self
    }

    pub fn format_pattern(&self) -> &str {
        &self.format
    }

    /// Escape line breaks so a single record cannot forge additional log lines.
    fn sanitize(&self, value: &str) -> String {
        if self.allow_inline_line_breaks {
            value.to_string()
        } else {
            value
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t")
        }
    }

    fn render_map(&self, map: &Map<String, Value>) -> String {
        if map.is_empty() {
            if self.ignore_empty_context_and_extra {
                String::new()
            } else {
                "[]".to_string()
            }
        } else {
            self.sanitize(&Value::Object(map.clone()).to_string())
        }
    }

    fn render_call_site(record: &LogRecord) -> String {
        match &record.call_site {
            Some(site) => format!("{}:{}", site.file, site.line),
            None => String::new(),
        }
    }
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_FORMAT, DEFAULT_DATE_FORMAT)
    }
}

impl LineFormatter {
    /// Rendered value of a placeholder name, `None` when the name is unknown
    fn placeholder(&self, name: &str, record: &LogRecord) -> Option<String> {
        let value = match name {
            "datetime" => try_format_datetime(&record.datetime, &self.date_format)
                .unwrap_or_else(|| record.datetime.to_rfc3339()),
            "channel" => record.channel.clone(),
            "level_name" => record.level_name().to_string(),
            "level" => record.level.code().to_string(),
            "message" => self.sanitize(&record.message),
            "context" => self.render_map(record.context.fields()),
            "extra" => self.render_map(&record.extra),
            "call_site" => Self::render_call_site(record),
            _ => return None,
        };
        Some(value)
    }
}

impl Formatter for LineFormatter {
    fn format(&self, record: &LogRecord) -> String {
        // Single pass over the pattern: substituted values are never rescanned
        let mut output = String::with_capacity(self.format.len() + record.message.len());
        let mut rest = self.format.as_str();
        while let Some(start) = rest.find('%') {
            output.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let expanded = after.find('%').and_then(|end| {
                self.placeholder(&after[..end], record)
                    .map(|value| (value, end))
            });
            match expanded {
                Some((value, end)) => {
                    output.push_str(&value);
                    rest = &after[end + 1..];
                }
                None => {
                    output.push('%');
                    rest = after;
                }
            }
        }
        output.push_str(rest);

        if self.ignore_empty_context_and_extra {
            output = collapse_trailing_spaces(&output);
        }

        output
    }
}

/// Trim spaces left behind by empty placeholders at the end of each line.
fn collapse_trailing_spaces(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        result.push_str(line.trim_end_matches(' '));
        if lines.peek().is_some() {
            result.push('\n');
        }
    }
    result
}

/// JSON formatter for machine processing
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    append_newline: bool,
}

impl JsonFormatter {
    pub fn new(append_newline: bool) -> Self {
        Self { append_newline }
    }

    pub fn to_json_value(record: &LogRecord) -> Value {
        let mut json_obj = Map::new();
        json_obj.insert("message".to_string(), Value::String(record.message.clone()));
        json_obj.insert("context".to_string(), record.context.to_json_value());
        json_obj.insert("level".to_string(), Value::from(record.level.code()));
        json_obj.insert(
            "level_name".to_string(),
            Value::String(record.level_name().to_string()),
        );
        json_obj.insert("channel".to_string(), Value::String(record.channel.clone()));
        json_obj.insert("datetime".to_string(), Value::String(record.datetime.to_rfc3339()));
        json_obj.insert("extra".to_string(), Value::Object(record.extra.clone()));

        // Add location info if present
        if let Some(ref site) = record.call_site {
            json_obj.insert("file".to_string(), Value::String(site.file.clone()));
            json_obj.insert("line".to_string(), Value::from(site.line));
            json_obj.insert(
                "module_path".to_string(),
                Value::String(site.module_path.clone()),
            );
        }
        if let Some(ref ctx) = record.call_site_context {
            json_obj.insert("logContext".to_string(), ctx.to_json_value());
        }

        Value::Object(json_obj)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut output = Self::to_json_value(record).to_string();
        if self.append_newline {
            output.push('\n');
        }
        output
    }
}

/// Logfmt formatter (key=value pairs)
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter;

impl LogfmtFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escape a logfmt key (remove spaces and special chars)
    fn escape_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect()
    }

    /// Escape a logfmt value (quote if contains spaces)
    fn escape_value(value: &str) -> String {
        if value.is_empty() || value.contains(' ') || value.contains('"') || value.contains('=') {
            Self::quote_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_value(value: &str) -> String {
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
        )
    }

    fn push_fields(parts: &mut Vec<String>, fields: &Map<String, Value>) {
        for (key, value) in fields {
            let formatted = match value {
                Value::String(s) => Self::quote_value(s),
                Value::Object(_) | Value::Array(_) => Self::quote_value(&value.to_string()),
                other => display_value(other),
            };
            parts.push(format!("{}={}", Self::escape_key(key), formatted));
        }
    }
}

impl Formatter for LogfmtFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut parts = vec![
            format!("timestamp={}", Self::escape_value(&record.datetime.to_rfc3339())),
            format!("channel={}", Self::escape_value(&record.channel)),
            format!("level={}", record.level_name()),
            format!("message={}", Self::quote_value(&record.message)),
        ];

        if let Some(ref site) = record.call_site {
            parts.push(format!("file={}", Self::escape_value(&site.file)));
            parts.push(format!("line={}", site.line));
        }

        Self::push_fields(&mut parts, record.context.fields());
        Self::push_fields(&mut parts, &record.extra);

        let mut output = parts.join(" ");
        output.push('\n');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallSite, LogContext, LogLevel};
    use chrono::{Local, TimeZone};

    fn record(level: LogLevel, message: &str) -> LogRecord {
        let mut record = LogRecord::new("app", level, message);
        record.datetime = Local
            .with_ymd_and_hms(2024, 1, 1, 8, 30, 0)
            .single()
            .expect("valid datetime");
        record
    }

    #[test]
    fn test_line_format_default() {
        let result = LineFormatter::default().format(&record(LogLevel::Info, "Test message"));
        assert_eq!(result, "[2024-01-01 08:30:00] app.INFO: Test message [] []\n");
    }

    #[test]
    fn test_line_format_with_context() {
        let context = LogContext::new().with_field("user_id", 123);
        let entry = record(LogLevel::Info, "User logged in").with_context(context);
        let result = LineFormatter::default().format(&entry);

        assert!(result.contains("User logged in"));
        assert!(result.contains("{\"user_id\":123}"));
    }

    #[test]
    fn test_line_format_escapes_newlines() {
        let entry = record(LogLevel::Info, "line one\nERROR forged");
        let result = LineFormatter::default().format(&entry);
        assert_eq!(result.lines().count(), 1);
        assert!(result.contains("line one\\nERROR forged"));

        let inline = LineFormatter::default().with_inline_line_breaks(true);
        assert_eq!(inline.format(&entry).lines().count(), 2);
    }

    #[test]
    fn test_line_format_ignore_empty() {
        let formatter = LineFormatter::default().with_ignore_empty_context_and_extra(true);
        let result = formatter.format(&record(LogLevel::Error, "boom"));
        assert_eq!(result, "[2024-01-01 08:30:00] app.ERROR: boom\n");
    }

    #[test]
    fn test_line_format_call_site() {
        let formatter = LineFormatter::new("%call_site% %message%", DEFAULT_DATE_FORMAT);
        let entry = record(LogLevel::Debug, "here")
            .with_call_site(CallSite::new("src/lib.rs", 42, "demo"));
        assert_eq!(formatter.format(&entry), "src/lib.rs:42 here");
    }

    #[test]
    fn test_line_format_keeps_placeholder_text_in_message() {
        let formatter = LineFormatter::new("%message%", DEFAULT_DATE_FORMAT);
        let output = formatter.format(&record(
            LogLevel::Info,
            "discount 10%extra% applied %channel%",
        ));
        assert_eq!(output, "discount 10%extra% applied %channel%");

        let formatter = LineFormatter::new("100% %level_name% %unknown% %message%", "%Y");
        assert_eq!(
            formatter.format(&record(LogLevel::Error, "50% off")),
            "100% ERROR %unknown% 50% off"
        );
    }

    #[test]
    fn test_invalid_date_pattern_falls_back() {
        assert!(!is_valid_datetime_pattern("%Q"));
        assert!(is_valid_datetime_pattern("%Y-%m-%d"));

        let formatter = LineFormatter::new("%datetime%", "%Q");
        let result = formatter.format(&record(LogLevel::Info, "x"));
        assert!(result.starts_with("2024-01-01T08:30:00"));
    }

    #[test]
    fn test_json_format() {
        let result = JsonFormatter::default().format(&record(LogLevel::Error, "Error occurred"));
        assert!(result.ends_with('\n'));

        let parsed: Value = serde_json::from_str(result.trim_end()).unwrap();
        assert_eq!(parsed["level_name"], "ERROR");
        assert_eq!(parsed["level"], 400);
        assert_eq!(parsed["message"], "Error occurred");
        assert_eq!(parsed["channel"], "app");
    }

    #[test]
    fn test_logfmt_format() {
        let context = LogContext::new()
            .with_field("user", "alice")
            .with_field("count", 5);
        let entry = record(LogLevel::Warning, "Warning message").with_context(context);
        let result = LogfmtFormatter::new().format(&entry);

        assert!(result.contains("level=WARNING"));
        assert!(result.contains("message=\"Warning message\""));
        assert!(result.contains("user=\"alice\""));
        assert!(result.contains("count=5"));
    }
}
