//! Slack incoming-webhook handler
//!
//! Posts each record as a JSON message to a Slack webhook URL. Delivery is
//! synchronous and never retried: the outcome of the last attempt is kept in
//! [`SlackWebhookHandler::last_delivery`] and failures are surfaced as errors
//! to the owning [`ConfiguredHandler`](crate::core::ConfiguredHandler), which
//! counts them without propagating to the logging call.

use crate::core::log_context::display_value;
use crate::core::{Formatter, Handler, LogLevel, LogRecord, LoggerError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Emoji posted with a record of the given level
pub fn level_icon(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => ":pawprints:",
        LogLevel::Debug => ":beetle:",
        LogLevel::Info => ":suspect:",
        LogLevel::Warning => ":goberserk:",
        LogLevel::Error => ":feelsgood:",
        LogLevel::Critical => ":finnadie:",
    }
}

/// Attachment color for a record of the given level
pub fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "#6f6d6d",
        LogLevel::Debug => "#b5dae9",
        LogLevel::Info => "#5f9ea0",
        LogLevel::Warning => "#ff9122",
        LogLevel::Error => "#ff4444",
        LogLevel::Critical => "#b03e3c",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackField {
    pub title: String,
    pub value: Value,
    pub short: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackAttachment {
    pub fallback: String,
    pub color: String,
    pub title: String,
    pub text: String,
    pub fields: Vec<SlackField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackPayload {
    pub channel: String,
    pub username: String,
    pub text: String,
    pub icon_emoji: String,
    pub attachments: Vec<SlackAttachment>,
}

/// Outcome of the most recent delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent { status: u16 },
    Rejected { status: u16, body: String },
    Failed { error: String },
}

impl DeliveryStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryStatus::Sent { .. })
    }
}

pub struct SlackWebhookHandler {
    webhook_url: String,
    channel: String,
    username: String,
    use_attachment: bool,
    icon_emoji: Option<String>,
    level: LogLevel,
    bubble: bool,
    use_short_attachment: bool,
    include_context_and_extra: bool,
    timeout: Duration,
    client: Option<reqwest::blocking::Client>,
    last_delivery: Option<DeliveryStatus>,
}

impl SlackWebhookHandler {
    pub fn new(webhook_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: channel.into(),
            username: "Logger".to_string(),
            use_attachment: true,
            icon_emoji: None,
            level: LogLevel::Critical,
            bubble: true,
            use_short_attachment: false,
            include_context_and_extra: false,
            timeout: DEFAULT_TIMEOUT,
            client: None,
            last_delivery: None,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, use_attachment: bool) -> Self {
        self.use_attachment = use_attachment;
        self
    }

    /// Fixed emoji overriding the per-level icon; surrounding colons are optional
    #[must_use]
    pub fn with_icon_emoji(mut self, icon_emoji: Option<String>) -> Self {
        self.icon_emoji = icon_emoji
            .map(|icon| icon.trim_matches(':').to_string())
            .filter(|icon| !icon.is_empty());
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
    pub fn with_short_attachment(mut self, use_short_attachment: bool) -> Self {
        self.use_short_attachment = use_short_attachment;
        self
    }

    #[must_use]
    pub fn with_context_and_extra(mut self, include: bool) -> Self {
        self.include_context_and_extra = include;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn last_delivery(&self) -> Option<&DeliveryStatus> {
        self.last_delivery.as_ref()
    }

    /// Build the webhook body for a record
    pub fn build_payload(&self, record: &LogRecord, formatter: Option<&dyn Formatter>) -> SlackPayload {
        let message = match formatter {
            Some(formatter) => formatter.format(record),
            None => record.message.clone(),
        };

        let username = match record.extra.get("username") {
            Some(Value::String(name)) => name.clone(),
            _ => self.username.clone(),
        };

        let icon_emoji = match &self.icon_emoji {
            Some(icon) => format!(":{}:", icon),
            None => level_icon(record.level).to_string(),
        };

        let mut payload = SlackPayload {
            channel: self.channel.clone(),
            username,
            text: String::new(),
            icon_emoji,
            attachments: Vec::new(),
        };

        if !self.use_attachment {
            payload.text = message;
            return payload;
        }

        let mut attachment = SlackAttachment {
            fallback: message.clone(),
            color: level_color(record.level).to_string(),
            title: String::new(),
            text: message,
            fields: Vec::new(),
        };

        if self.use_short_attachment {
            attachment.title = record.level_name().to_string();
        } else {
            attachment.title = "Message".to_string();
            attachment.fields.push(SlackField {
                title: "Level".to_string(),
                value: Value::String(record.level_name().to_string()),
                short: true,
            });
        }

        if self.include_context_and_extra {
            self.push_fields(&mut attachment, "Extra", &record.extra);
            self.push_fields(&mut attachment, "Context", record.context.fields());
        }

        payload.attachments.push(attachment);
        payload
    }

    fn push_fields(&self, attachment: &mut SlackAttachment, title: &str, fields: &Map<String, Value>) {
        if fields.is_empty() {
            return;
        }
        if self.use_short_attachment {
            attachment.fields.push(SlackField {
                title: title.to_string(),
                value: Value::String(stringify(fields)),
                short: true,
            });
        } else {
            for (key, value) in fields {
                attachment.fields.push(SlackField {
                    title: key.clone(),
                    value: value.clone(),
                    short: false,
                });
            }
        }
    }

    fn client(&mut self) -> Result<&reqwest::blocking::Client> {
        if self.client.is_none() {
            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| LoggerError::delivery("slack", e.to_string()))?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| LoggerError::delivery("slack", "HTTP client not initialized"))
    }

    fn post(&mut self, payload: &SlackPayload) -> DeliveryStatus {
        let url = self.webhook_url.clone();
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => return DeliveryStatus::Failed { error: e.to_string() },
        };

        match client
            .post(url)
            .header(reqwest::header::CACHE_CONTROL, "max-age=0")
            .json(payload)
            .send()
        {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    DeliveryStatus::Sent { status }
                } else {
                    let body = response.text().unwrap_or_default();
                    DeliveryStatus::Rejected { status, body }
                }
            }
            Err(e) => DeliveryStatus::Failed { error: e.to_string() },
        }
    }
}

/// Flatten key/value pairs into `key: value | key: value`.
fn stringify(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}: {}", k, display_value(v)))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl Handler for SlackWebhookHandler {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn bubble(&self) -> bool {
        self.bubble
    }

    fn write(&mut self, record: &LogRecord, formatter: Option<&dyn Formatter>) -> Result<()> {
        let payload = self.build_payload(record, formatter);
        let status = self.post(&payload);
        self.last_delivery = Some(status.clone());

        match status {
            DeliveryStatus::Sent { .. } => Ok(()),
            DeliveryStatus::Rejected { status, body } => Err(LoggerError::delivery(
                "slack",
                format!("webhook answered {}: {}", status, body),
            )),
            DeliveryStatus::Failed { error } => Err(LoggerError::delivery("slack", error)),
        }
    }
}
