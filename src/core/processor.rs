//! Record processors
//!
//! A processor enriches a [`LogRecord`] before a handler formats and writes it.
//! Processors referenced from configuration are always wrapped in a
//! [`ContextProcessor`], which attaches the handler name, the resolved class and
//! the call site captured by the logging macros.

use super::record::{CallSiteContext, LogRecord};
use rand::Rng;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

pub trait Processor: Send + Sync {
    fn process(&self, record: &mut LogRecord);
}

impl<F> Processor for F
where
    F: Fn(&mut LogRecord) + Send + Sync,
{
    fn process(&self, record: &mut LogRecord) {
        self(record)
    }
}

/// Wraps a configured processor with the context of the handler it belongs to.
#[derive(Clone)]
pub struct ContextProcessor {
    handler: String,
    class: Option<String>,
    inner: Arc<dyn Processor>,
}

impl ContextProcessor {
    pub fn new(handler: impl Into<String>, class: Option<String>, inner: Arc<dyn Processor>) -> Self {
        Self {
            handler: handler.into(),
            class,
            inner,
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    fn call_site_context(&self, record: &LogRecord) -> CallSiteContext {
        let (file, line) = match &record.call_site {
            Some(site) => (site.file.clone(), Some(site.line)),
            None => (String::new(), None),
        };
        CallSiteContext {
            handler: self.handler.clone(),
            class: self.class.clone(),
            file,
            line,
        }
    }
}

impl Processor for ContextProcessor {
    fn process(&self, record: &mut LogRecord) {
        record.call_site_context = Some(self.call_site_context(record));
        self.inner.process(record);
    }
}

impl std::fmt::Debug for ContextProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextProcessor")
            .field("handler", &self.handler)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

/// Copies the injected call-site context into `extra`.
#[derive(Debug, Default)]
pub struct IntrospectionProcessor;

impl Processor for IntrospectionProcessor {
    fn process(&self, record: &mut LogRecord) {
        let Some(ctx) = record.call_site_context.clone() else {
            return;
        };
        record.extra.insert("handler".to_string(), Value::String(ctx.handler));
        if let Some(class) = ctx.class {
            record.extra.insert("class".to_string(), Value::String(class));
        }
        record.extra.insert("file".to_string(), Value::String(ctx.file));
        record.extra.insert(
            "line".to_string(),
            ctx.line.map(Value::from).unwrap_or(Value::Null),
        );
    }
}

/// Adds a random identifier that stays fixed for the processor's lifetime.
#[derive(Debug)]
pub struct UidProcessor {
    uid: String,
}

impl UidProcessor {
    pub fn new(length: usize) -> Self {
        let length = length.clamp(1, 32);
        let mut rng = rand::thread_rng();
        let uid = (0..length)
            .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect();
        Self { uid }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl Default for UidProcessor {
    fn default() -> Self {
        Self::new(7)
    }
}

impl Processor for UidProcessor {
    fn process(&self, record: &mut LogRecord) {
        record.extra.insert("uid".to_string(), Value::String(self.uid.clone()));
    }
}

#[derive(Debug, Default)]
pub struct ProcessIdProcessor;

impl Processor for ProcessIdProcessor {
    fn process(&self, record: &mut LogRecord) {
        record
            .extra
            .insert("process_id".to_string(), Value::from(std::process::id()));
    }
}

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Adds the id and name of the thread that emitted the record.
#[derive(Debug, Default)]
pub struct ThreadProcessor;

impl Processor for ThreadProcessor {
    fn process(&self, record: &mut LogRecord) {
        record
            .extra
            .insert("thread_id".to_string(), Value::String(current_thread_id()));
        if let Some(name) = current_thread_name() {
            record.extra.insert("thread_name".to_string(), Value::String(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallSite, LogLevel};

    #[test]
    fn test_context_processor_injects_call_site() {
        let wrapper = ContextProcessor::new(
            "console",
            Some("shop::cart::Cart".to_string()),
            Arc::new(IntrospectionProcessor),
        );
        let mut record = LogRecord::new("shop::cart::Cart", LogLevel::Info, "added")
            .with_call_site(CallSite::new("src/cart.rs", 88, "shop::cart"));

        wrapper.process(&mut record);

        let ctx = record.call_site_context.as_ref().expect("context injected");
        assert_eq!(ctx.handler, "console");
        assert_eq!(ctx.class.as_deref(), Some("shop::cart::Cart"));
        assert_eq!(ctx.file, "src/cart.rs");
        assert_eq!(ctx.line, Some(88));
        assert_eq!(record.extra["line"], 88);
        assert_eq!(record.extra["class"], "shop::cart::Cart");
    }

    #[test]
    fn test_context_processor_without_call_site() {
        let wrapper = ContextProcessor::new("file", None, Arc::new(IntrospectionProcessor));
        let mut record = LogRecord::new("defaultLogger", LogLevel::Info, "no location");

        wrapper.process(&mut record);

        let ctx = record.call_site_context.as_ref().expect("context injected");
        assert_eq!(ctx.file, "");
        assert_eq!(ctx.line, None);
        assert!(record.extra.get("class").is_none());
        assert_eq!(record.extra["line"], Value::Null);
    }

    #[test]
    fn test_closure_processor() {
        let tagger = |record: &mut LogRecord| {
            record.extra.insert("tag".to_string(), Value::from("billing"));
        };
        let mut record = LogRecord::new("app", LogLevel::Debug, "x");
        tagger.process(&mut record);
        assert_eq!(record.extra["tag"], "billing");
    }

    #[test]
    fn test_uid_processor_is_stable() {
        let processor = UidProcessor::default();
        assert_eq!(processor.uid().len(), 7);
        assert!(processor.uid().chars().all(|c| c.is_ascii_hexdigit()));

        let mut first = LogRecord::new("app", LogLevel::Info, "a");
        let mut second = LogRecord::new("app", LogLevel::Info, "b");
        processor.process(&mut first);
        processor.process(&mut second);
        assert_eq!(first.extra["uid"], second.extra["uid"]);
    }

    #[test]
    fn test_thread_processor() {
        let mut record = LogRecord::new("app", LogLevel::Info, "x");
        ThreadProcessor.process(&mut record);
        assert!(record.extra["thread_id"].is_string());
    }
}
