//! Log record structure

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source location captured by the code that emits a record.
///
/// Built by the logging macros from `file!()`, `line!()` and `module_path!()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub module_path: String,
}

impl CallSite {
    pub fn new(file: &str, line: u32, module_path: &str) -> Self {
        Self {
            file: file.to_string(),
            line,
            module_path: module_path.to_string(),
        }
    }
}

/// Context injected into a record by a handler's processor chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteContext {
    /// Configured name of the handler whose processor ran
    pub handler: String,
    /// Class the handler was resolved for, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Empty when the caller did not supply a location
    pub file: String,
    pub line: Option<u32>,
}

impl CallSiteContext {
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Name of the logger that produced the record
    pub channel: String,
    pub level: LogLevel,
    pub message: String,
    pub datetime: DateTime<Local>,
    pub context: LogContext,
    /// Free-form data added by processors
    pub extra: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_site: Option<CallSite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_site_context: Option<CallSiteContext>,
}

impl LogRecord {
    pub fn new(channel: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            level,
            message: message.into(),
            datetime: Local::now(),
            context: LogContext::new(),
            extra: Map::new(),
            call_site: None,
            call_site_context: None,
        }
    }

    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    pub fn level_name(&self) -> &'static str {
        self.level.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults() {
        let record = LogRecord::new("app", LogLevel::Warning, "disk almost full");
        assert_eq!(record.channel, "app");
        assert_eq!(record.level_name(), "WARNING");
        assert!(record.extra.is_empty());
        assert!(record.call_site.is_none());
    }

    #[test]
    fn test_call_site_context_json() {
        let ctx = CallSiteContext {
            handler: "console".to_string(),
            class: None,
            file: "src/main.rs".to_string(),
            line: Some(12),
        };
        let json = ctx.to_json_value();
        assert_eq!(json["handler"], "console");
        assert_eq!(json["line"], 12);
        assert!(json.get("class").is_none());
    }
}
