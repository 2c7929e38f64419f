//! Assembles configured handlers for a class

use super::factory::{ObjectFactory, ParamOverride, TypeRegistry, Value};
use super::properties::Properties;
use super::resolution::{split_list, ResolutionEngine, ResolvedTarget, LOGGER_PREFIX, ROOT_KEY};
use super::resolver::{Clock, ParameterResolver};
use crate::core::{ConfiguredHandler, ContextProcessor, LogLevel, Logger, LoggerError, Result};
use std::sync::Arc;

/// Ordered handlers keyed by section name.
///
/// Inserting a name that is already present replaces the earlier handler in
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct HandlerSet {
    handlers: Vec<Arc<ConfiguredHandler>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handler: Arc<ConfiguredHandler>) {
        match self.handlers.iter_mut().find(|h| h.name() == handler.name()) {
            Some(slot) => *slot = handler,
            None => self.handlers.push(handler),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ConfiguredHandler>> {
        self.handlers.iter().find(|h| h.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConfiguredHandler>> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn into_vec(self) -> Vec<Arc<ConfiguredHandler>> {
        self.handlers
    }
}

impl IntoIterator for HandlerSet {
    type Item = Arc<ConfiguredHandler>;
    type IntoIter = std::vec::IntoIter<Arc<ConfiguredHandler>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}

/// Builds handler sets from a loaded configuration.
///
/// Construction problems never abort the whole set: the affected handler
/// (or only its formatter or processor) is left out and the problem is
/// reported on the bootstrap logger.
pub struct LogConfigurer {
    properties: Arc<Properties>,
    resolver: ParameterResolver,
    engine: ResolutionEngine,
    registry: Arc<TypeRegistry>,
    bootstrap: Arc<Logger>,
}

impl LogConfigurer {
    pub fn new(properties: Arc<Properties>, registry: Arc<TypeRegistry>, bootstrap: Arc<Logger>) -> Self {
        Self {
            resolver: ParameterResolver::new(Arc::clone(&properties)),
            engine: ResolutionEngine::new(Arc::clone(&properties)),
            properties,
            registry,
            bootstrap,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.resolver = self.resolver.with_clock(clock);
        self
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    pub fn resolver(&self) -> &ParameterResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn root_level(&self) -> LogLevel {
        self.engine.root_level()
    }

    pub fn resolve(&self, class: Option<&str>) -> ResolvedTarget {
        self.engine.resolve(class)
    }

    /// Build the handlers for `class` (the root handlers when `None`).
    ///
    /// `level` replaces the `level` constructor argument of every handler;
    /// without it the configured level applies, then the root level.
    pub fn make_handlers(&self, class: Option<&str>, level: Option<LogLevel>) -> HandlerSet {
        let target = self.engine.resolve(class);
        self.make_handlers_for(&target, level)
    }

    pub fn make_handlers_for(&self, target: &ResolvedTarget, level: Option<LogLevel>) -> HandlerSet {
        let mut set = HandlerSet::new();
        for name in &target.handler_names {
            match self.build_handler(name, target.class.as_deref(), level) {
                Ok(handler) => set.insert(Arc::new(handler)),
                Err(e) => self
                    .bootstrap
                    .warning(format!("Skipping handler '{}': {}", name, e)),
            }
        }
        set
    }

    fn build_handler(
        &self,
        name: &str,
        class: Option<&str>,
        level: Option<LogLevel>,
    ) -> Result<ConfiguredHandler> {
        let factory = ObjectFactory::new(&self.properties, &self.resolver);
        let prefix = format!("{}.{}", LOGGER_PREFIX, name);
        let root_level = self.root_level();

        let handler_override = |param: &str, configured: Option<&str>, _: Option<&Value>| {
            let resolved = configured.map(|raw| self.resolver.resolve(name, raw));
            if param == "level" {
                level
                    .map(Value::Level)
                    .or(resolved)
                    .or(Some(Value::Level(root_level)))
            } else {
                resolved
            }
        };

        let loader_key = format!("{}.handlerLoader", prefix);
        let instance = factory
            .instantiate(
                self.registry.handlers(),
                name,
                &loader_key,
                &prefix,
                Some(&handler_override as &ParamOverride<'_>),
            )?
            .ok_or_else(|| {
                LoggerError::config(
                    format!("handler '{}'", name),
                    format!("{} is not set", loader_key),
                )
            })?;

        let mut handler = ConfiguredHandler::new(name, instance.type_name, instance.object);

        // Handler processors run before the root processors
        let processor_keys = [
            format!("{}.processor", prefix),
            format!("{}.processor", ROOT_KEY),
        ];
        for key in &processor_keys {
            let Some(list) = self.properties.get(key) else {
                continue;
            };
            for processor_name in split_list(list) {
                match self.registry.create_processor(&processor_name) {
                    Some(processor) => handler.push_processor(ContextProcessor::new(
                        name,
                        class.map(str::to_string),
                        processor,
                    )),
                    None => self.bootstrap.warning(format!(
                        "Unknown processor '{}' at '{}' for handler '{}'",
                        processor_name, key, name
                    )),
                }
            }
        }

        let formatter_key = format!("{}.formatter", prefix);
        let formatter_override = |_: &str, configured: Option<&str>, _: Option<&Value>| {
            configured.map(|raw| Value::Str(formatter_string(raw)))
        };
        match factory.instantiate(
            self.registry.formatters(),
            name,
            &formatter_key,
            &formatter_key,
            Some(&formatter_override as &ParamOverride<'_>),
        ) {
            Ok(Some(formatter)) => handler.set_formatter(formatter.object),
            Ok(None) => {}
            Err(e) => self.bootstrap.warning(format!(
                "Handler '{}' keeps its default formatting: {}",
                name, e
            )),
        }

        Ok(handler)
    }
}

impl std::fmt::Debug for LogConfigurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogConfigurer")
            .field("properties", &self.properties.len())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Formatter arguments are taken literally, except that a trailing `\n`
/// escape becomes a real line break.
fn formatter_string(raw: &str) -> String {
    match raw.strip_suffix("\\n") {
        Some(body) => format!("{}\n", body),
        None => raw.to_string(),
    }
}
