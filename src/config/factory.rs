//! Builds handlers and formatters from configuration sections
//!
//! Every constructible type is registered in a [`TypeRegistry`] as a
//! [`Blueprint`]: the ordered list of constructor parameters it accepts,
//! each with an optional default, plus a function building the object from
//! the collected [`Arguments`]. For a section such as
//!
//! ```text
//! logger.file.handlerLoader = FileHandler
//! logger.file.constructor.path = logs/app.log
//! logger.file.constructor.level = ERROR
//! ```
//!
//! the [`ObjectFactory`] looks up `FileHandler`, walks its parameters in
//! declaration order, reads `logger.file.constructor.<param>` for each one
//! and falls back to the declared default when nothing is configured.

use super::properties::Properties;
use super::resolver::ParameterResolver;
use crate::core::{
    Formatter, Handler, IntrospectionProcessor, JsonFormatter, LineFormatter, LogLevel,
    LogfmtFormatter, LoggerError, ProcessIdProcessor, Processor, Result, ThreadProcessor,
    UidProcessor,
};
use crate::core::formatter::{DEFAULT_DATE_FORMAT, DEFAULT_LINE_FORMAT};
use crate::handlers::{ConsoleHandler, ConsoleStream, FileHandler, NullHandler};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A constructor argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Level(LogLevel),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{}", s),
            Value::Level(level) => write!(f, "{}", level),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<LogLevel> for Value {
    fn from(level: LogLevel) -> Self {
        Value::Level(level)
    }
}

/// A declared constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str) -> Self {
        Self { name, default: None }
    }

    pub fn optional(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            default: Some(default.into()),
        }
    }
}

/// Collected constructor arguments, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<(&'static str, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    pub fn push(&mut self, name: &'static str, value: Value) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| LoggerError::invalid_parameter(name, "no value supplied"))
    }

    pub fn string(&self, name: &str) -> Result<String> {
        match self.require(name)? {
            Value::Null => Err(LoggerError::invalid_parameter(name, "expected a string, got null")),
            other => Ok(other.to_string()),
        }
    }

    /// String argument where `null` (or absence) means "not set"
    pub fn opt_string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(other) => Ok(Some(other.to_string())),
        }
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" | "" => Ok(false),
                _ => Err(LoggerError::invalid_parameter(
                    name,
                    format!("expected a boolean, got '{}'", s),
                )),
            },
            other => Err(LoggerError::invalid_parameter(
                name,
                format!("expected a boolean, got '{}'", other),
            )),
        }
    }

    pub fn level(&self, name: &str) -> Result<LogLevel> {
        match self.require(name)? {
            Value::Level(level) => Ok(*level),
            Value::Int(code) => u16::try_from(*code)
                .ok()
                .and_then(LogLevel::from_code)
                .ok_or_else(|| {
                    LoggerError::invalid_parameter(name, format!("unknown level code {}", code))
                }),
            Value::Str(s) => s.parse::<LogLevel>().map_err(|_| {
                LoggerError::invalid_parameter(name, format!("unknown level '{}'", s))
            }),
            other => Err(LoggerError::invalid_parameter(
                name,
                format!("expected a level, got '{}'", other),
            )),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.require(name)? {
            Value::Int(i) => Ok(*i),
            Value::Level(level) => Ok(i64::from(level.code())),
            Value::Str(s) => s.trim().parse::<i64>().map_err(|_| {
                LoggerError::invalid_parameter(name, format!("expected an integer, got '{}'", s))
            }),
            other => Err(LoggerError::invalid_parameter(
                name,
                format!("expected an integer, got '{}'", other),
            )),
        }
    }
}

type BuildFn<T> = dyn Fn(&Arguments) -> Result<T> + Send + Sync;

/// Constructor description of a registered type
pub struct Blueprint<T> {
    params: Vec<ParamSpec>,
    build: Arc<BuildFn<T>>,
}

impl<T> Blueprint<T> {
    pub fn new<F>(params: Vec<ParamSpec>, build: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            params,
            build: Arc::new(build),
        }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn build(&self, args: &Arguments) -> Result<T> {
        (self.build)(args)
    }
}

impl<T> Clone for Blueprint<T> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for Blueprint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint").field("params", &self.params).finish_non_exhaustive()
    }
}

/// Blueprints of one kind of object, keyed by type name
pub struct Catalog<T> {
    kind: &'static str,
    entries: HashMap<String, Blueprint<T>>,
}

impl<T> Catalog<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, type_name: &str) -> Option<&Blueprint<T>> {
        self.entries.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    fn insert(&mut self, type_name: impl Into<String>, blueprint: Blueprint<T>) {
        self.entries.insert(type_name.into(), blueprint);
    }
}

type ProcessorFactory = Arc<dyn Fn() -> Arc<dyn Processor> + Send + Sync>;

/// Registered handler, formatter and processor types.
///
/// [`TypeRegistry::new`] comes with the built-in types; applications add
/// their own before handing the registry to the manager builder.
pub struct TypeRegistry {
    handlers: Catalog<Box<dyn Handler>>,
    formatters: Catalog<Box<dyn Formatter>>,
    processors: HashMap<String, ProcessorFactory>,
}

impl TypeRegistry {
    /// Registry with the built-in types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    pub fn empty() -> Self {
        Self {
            handlers: Catalog::new("handler"),
            formatters: Catalog::new("formatter"),
            processors: HashMap::new(),
        }
    }

    pub fn register_handler(&mut self, type_name: impl Into<String>, blueprint: Blueprint<Box<dyn Handler>>) {
        self.handlers.insert(type_name, blueprint);
    }

    pub fn register_formatter(
        &mut self,
        type_name: impl Into<String>,
        blueprint: Blueprint<Box<dyn Formatter>>,
    ) {
        self.formatters.insert(type_name, blueprint);
    }

    /// Register a processor; `create` runs once per handler referencing it.
    pub fn register_processor<F>(&mut self, type_name: impl Into<String>, create: F)
    where
        F: Fn() -> Arc<dyn Processor> + Send + Sync + 'static,
    {
        self.processors.insert(type_name.into(), Arc::new(create));
    }

    pub fn handlers(&self) -> &Catalog<Box<dyn Handler>> {
        &self.handlers
    }

    pub fn formatters(&self) -> &Catalog<Box<dyn Formatter>> {
        &self.formatters
    }

    pub fn create_processor(&self, type_name: &str) -> Option<Arc<dyn Processor>> {
        self.processors.get(type_name).map(|create| create())
    }

    pub fn has_processor(&self, type_name: &str) -> bool {
        self.processors.contains_key(type_name)
    }

    fn register_builtins(&mut self) {
        self.register_handler(
            "ConsoleHandler",
            Blueprint::new(
                vec![
                    ParamSpec::optional("stream", "stdout"),
                    ParamSpec::optional("level", LogLevel::Debug),
                    ParamSpec::optional("bubble", true),
                    ParamSpec::optional("colors", true),
                ],
                |args| {
                    let stream: ConsoleStream = args.string("stream")?.parse()?;
                    Ok(Box::new(
                        ConsoleHandler::new()
                            .with_stream(stream)
                            .with_level(args.level("level")?)
                            .with_bubble(args.bool("bubble")?)
                            .with_colors(args.bool("colors")?),
                    ) as Box<dyn Handler>)
                },
            ),
        );

        self.register_handler(
            "FileHandler",
            Blueprint::new(
                vec![
                    ParamSpec::required("path"),
                    ParamSpec::optional("level", LogLevel::Debug),
                    ParamSpec::optional("bubble", true),
                    ParamSpec::optional("use_locking", false),
                    ParamSpec::optional("buffered", false),
                ],
                |args| {
                    Ok(Box::new(
                        FileHandler::new(args.string("path")?)
                            .with_level(args.level("level")?)
                            .with_bubble(args.bool("bubble")?)
                            .with_locking(args.bool("use_locking")?)
                            .with_buffering(args.bool("buffered")?),
                    ) as Box<dyn Handler>)
                },
            ),
        );

        self.register_handler(
            "NullHandler",
            Blueprint::new(vec![ParamSpec::optional("level", LogLevel::Debug)], |args| {
                Ok(Box::new(NullHandler::new(args.level("level")?)) as Box<dyn Handler>)
            }),
        );

        #[cfg(feature = "slack")]
        self.register_handler(
            "SlackWebhookHandler",
            Blueprint::new(
                vec![
                    ParamSpec::required("webhook_url"),
                    ParamSpec::required("channel"),
                    ParamSpec::optional("username", "Logger"),
                    ParamSpec::optional("use_attachment", true),
                    ParamSpec::optional("icon_emoji", Value::Null),
                    ParamSpec::optional("level", LogLevel::Critical),
                    ParamSpec::optional("bubble", true),
                    ParamSpec::optional("use_short_attachment", false),
                    ParamSpec::optional("include_context_and_extra", false),
                ],
                |args| {
                    use crate::handlers::SlackWebhookHandler;
                    Ok(Box::new(
                        SlackWebhookHandler::new(args.string("webhook_url")?, args.string("channel")?)
                            .with_username(args.string("username")?)
                            .with_attachment(args.bool("use_attachment")?)
                            .with_icon_emoji(args.opt_string("icon_emoji")?)
                            .with_level(args.level("level")?)
                            .with_bubble(args.bool("bubble")?)
                            .with_short_attachment(args.bool("use_short_attachment")?)
                            .with_context_and_extra(args.bool("include_context_and_extra")?),
                    ) as Box<dyn Handler>)
                },
            ),
        );

        self.register_formatter(
            "LineFormatter",
            Blueprint::new(
                vec![
                    ParamSpec::optional("format", DEFAULT_LINE_FORMAT),
                    ParamSpec::optional("date_format", DEFAULT_DATE_FORMAT),
                    ParamSpec::optional("allow_inline_line_breaks", false),
                    ParamSpec::optional("ignore_empty_context_and_extra", false),
                ],
                |args| {
                    let date_format = args.string("date_format")?;
                    if !crate::core::formatter::is_valid_datetime_pattern(&date_format) {
                        return Err(LoggerError::invalid_parameter(
                            "date_format",
                            format!("invalid datetime pattern '{}'", date_format),
                        ));
                    }
                    Ok(Box::new(
                        LineFormatter::new(args.string("format")?, date_format)
                            .with_inline_line_breaks(args.bool("allow_inline_line_breaks")?)
                            .with_ignore_empty_context_and_extra(
                                args.bool("ignore_empty_context_and_extra")?,
                            ),
                    ) as Box<dyn Formatter>)
                },
            ),
        );

        self.register_formatter(
            "JsonFormatter",
            Blueprint::new(vec![ParamSpec::optional("append_newline", true)], |args| {
                Ok(Box::new(JsonFormatter::new(args.bool("append_newline")?)) as Box<dyn Formatter>)
            }),
        );

        self.register_formatter(
            "LogfmtFormatter",
            Blueprint::new(Vec::new(), |_| Ok(Box::new(LogfmtFormatter::new()) as Box<dyn Formatter>)),
        );

        self.register_processor("IntrospectionProcessor", || Arc::new(IntrospectionProcessor));
        self.register_processor("UidProcessor", || Arc::new(UidProcessor::default()));
        self.register_processor("ProcessIdProcessor", || Arc::new(ProcessIdProcessor));
        self.register_processor("ThreadProcessor", || Arc::new(ThreadProcessor));
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.entries.keys().collect();
        let mut formatters: Vec<&String> = self.formatters.entries.keys().collect();
        let mut processors: Vec<&String> = self.processors.keys().collect();
        handlers.sort();
        formatters.sort();
        processors.sort();
        f.debug_struct("TypeRegistry")
            .field("handlers", &handlers)
            .field("formatters", &formatters)
            .field("processors", &processors)
            .finish()
    }
}

/// Per-parameter override: `(param, configured raw value, declared default)`.
///
/// Returning `None` falls back to the declared default.
pub type ParamOverride<'a> = dyn Fn(&str, Option<&str>, Option<&Value>) -> Option<Value> + 'a;

/// An object built from configuration together with its registered type name
#[derive(Debug)]
pub struct Instance<T> {
    pub type_name: String,
    pub object: T,
}

/// Instantiates registered types from configuration sections
pub struct ObjectFactory<'a> {
    properties: &'a Properties,
    resolver: &'a ParameterResolver,
}

impl<'a> ObjectFactory<'a> {
    pub fn new(properties: &'a Properties, resolver: &'a ParameterResolver) -> Self {
        Self { properties, resolver }
    }

    /// Build the object whose type name is stored at `class_key`.
    ///
    /// Returns `Ok(None)` when `class_key` is not configured. Parameters are
    /// read from `<prefix>.constructor.<param>`.
    pub fn instantiate<T>(
        &self,
        catalog: &Catalog<T>,
        section: &str,
        class_key: &str,
        prefix: &str,
        param_override: Option<&ParamOverride<'_>>,
    ) -> Result<Option<Instance<T>>> {
        let Some(type_name) = self.properties.get(class_key).map(str::trim) else {
            return Ok(None);
        };

        let blueprint = catalog
            .get(type_name)
            .ok_or_else(|| LoggerError::unknown_type(catalog.kind(), type_name, section))?;

        let mut args = Arguments::new();
        for param in blueprint.params() {
            let key = format!("{}.constructor.{}", prefix, param.name);
            let configured = self.properties.get(&key);

            let value = match param_override {
                Some(overrides) => overrides(param.name, configured, param.default.as_ref()),
                None => configured.map(|raw| self.resolver.resolve(section, raw)),
            }
            .or_else(|| param.default.clone())
            .ok_or_else(|| LoggerError::missing_parameter(section, type_name, param.name))?;

            args.push(param.name, value);
        }

        let object = blueprint.build(&args)?;
        Ok(Some(Instance {
            type_name: type_name.to_string(),
            object,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(pairs: &[(&str, &str)]) -> (Properties, ParameterResolver) {
        let properties = Properties::from_pairs(pairs.iter().copied());
        let resolver = ParameterResolver::new(Arc::new(properties.clone()));
        (properties, resolver)
    }

    #[test]
    fn test_absent_class_key_is_none() -> Result<()> {
        let (props, resolver) = setup(&[]);
        let registry = TypeRegistry::new();
        let factory = ObjectFactory::new(&props, &resolver);
        let built = factory.instantiate(
            registry.handlers(),
            "console",
            "logger.console.handlerLoader",
            "logger.console",
            None,
        )?;
        assert!(built.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_type() {
        let (props, resolver) = setup(&[("logger.k.handlerLoader", "KafkaHandler")]);
        let registry = TypeRegistry::new();
        let factory = ObjectFactory::new(&props, &resolver);
        let err = factory
            .instantiate(registry.handlers(), "k", "logger.k.handlerLoader", "logger.k", None)
            .err().unwrap();
        assert_eq!(err.to_string(), "Unknown handler type 'KafkaHandler' in section 'k'");
    }

    #[test]
    fn test_missing_required_parameter() {
        let (props, resolver) = setup(&[("logger.file.handlerLoader", "FileHandler")]);
        let registry = TypeRegistry::new();
        let factory = ObjectFactory::new(&props, &resolver);
        let err = factory
            .instantiate(registry.handlers(), "file", "logger.file.handlerLoader", "logger.file", None)
            .err().unwrap();
        assert!(matches!(
            err,
            LoggerError::MissingParameter { ref parameter, .. } if parameter == "path"
        ));
    }

    #[test]
    fn test_defaults_and_configured_values() -> Result<()> {
        let mut registry = TypeRegistry::empty();
        let seen = Arc::new(parking_lot::Mutex::new(Arguments::new()));
        let sink = Arc::clone(&seen);
        registry.register_handler(
            "Sampler",
            Blueprint::new(
                vec![
                    ParamSpec::optional("level", LogLevel::Debug),
                    ParamSpec::optional("bubble", true),
                ],
                move |args| {
                    *sink.lock() = args.clone();
                    Ok(Box::new(NullHandler::new(args.level("level")?)) as Box<dyn Handler>)
                },
            ),
        );

        let (props, resolver) = setup(&[("logger.s.handlerLoader", "Sampler")]);
        let factory = ObjectFactory::new(&props, &resolver);
        let built = factory
            .instantiate(registry.handlers(), "s", "logger.s.handlerLoader", "logger.s", None)?
            .expect("configured");
        assert_eq!(built.type_name, "Sampler");
        assert_eq!(seen.lock().get("level"), Some(&Value::Level(LogLevel::Debug)));
        assert_eq!(seen.lock().get("bubble"), Some(&Value::Bool(true)));

        let (props, resolver) = setup(&[
            ("logger.s.handlerLoader", "Sampler"),
            ("logger.s.constructor.level", "ERROR"),
        ]);
        let factory = ObjectFactory::new(&props, &resolver);
        factory.instantiate(registry.handlers(), "s", "logger.s.handlerLoader", "logger.s", None)?;
        assert_eq!(seen.lock().get("level"), Some(&Value::Level(LogLevel::Error)));
        Ok(())
    }

    #[test]
    fn test_override_none_uses_default() -> Result<()> {
        let (props, resolver) = setup(&[
            ("logger.n.handlerLoader", "NullHandler"),
            ("logger.n.constructor.level", "ERROR"),
        ]);
        let registry = TypeRegistry::new();
        let factory = ObjectFactory::new(&props, &resolver);
        let ignore_all = |_: &str, _: Option<&str>, _: Option<&Value>| -> Option<Value> { None };
        let built = factory
            .instantiate(
                registry.handlers(),
                "n",
                "logger.n.handlerLoader",
                "logger.n",
                Some(&ignore_all),
            )?
            .expect("configured");
        assert_eq!(built.object.level(), LogLevel::Debug);
        Ok(())
    }

    #[test]
    fn test_parameterless_blueprint() -> Result<()> {
        let (props, resolver) = setup(&[("logger.c.formatter", "LogfmtFormatter")]);
        let registry = TypeRegistry::new();
        let factory = ObjectFactory::new(&props, &resolver);
        let built = factory.instantiate(
            registry.formatters(),
            "c",
            "logger.c.formatter",
            "logger.c.formatter",
            None,
        )?;
        assert_eq!(built.map(|i| i.type_name), Some("LogfmtFormatter".to_string()));
        Ok(())
    }

    #[test]
    fn test_argument_getters() {
        let args = Arguments::new()
            .with("flag", "yes")
            .with("off", "0")
            .with("code", 400i64)
            .with("name", "WARN")
            .with("nothing", Value::Null)
            .with("word", "maybe");

        assert!(args.bool("flag").unwrap());
        assert!(!args.bool("off").unwrap());
        assert_eq!(args.level("code").unwrap(), LogLevel::Error);
        assert_eq!(args.level("name").unwrap(), LogLevel::Warning);
        assert_eq!(args.opt_string("nothing").unwrap(), None);
        assert_eq!(args.int("code").unwrap(), 400);
        assert!(matches!(args.bool("word"), Err(LoggerError::InvalidParameter { .. })));
        assert!(matches!(args.string("nothing"), Err(LoggerError::InvalidParameter { .. })));
    }

    #[test]
    fn test_builtin_registrations() {
        let registry = TypeRegistry::new();
        for name in ["ConsoleHandler", "FileHandler", "NullHandler"] {
            assert!(registry.handlers().contains(name), "{}", name);
        }
        for name in ["LineFormatter", "JsonFormatter", "LogfmtFormatter"] {
            assert!(registry.formatters().contains(name), "{}", name);
        }
        assert!(registry.has_processor("IntrospectionProcessor"));
        assert!(registry.create_processor("Nope").is_none());
    }
}
