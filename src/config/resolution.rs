//! Decides which handlers and which level apply to a class

use super::properties::Properties;
use crate::core::LogLevel;
use std::sync::Arc;

/// Key holding the root level and, as a prefix, the root settings
pub const ROOT_KEY: &str = "rootLogger";
/// Prefix of class, namespace and handler sections
pub const LOGGER_PREFIX: &str = "logger";
/// Suffix marking a section as a handler definition
pub const HANDLER_LOADER: &str = "handlerLoader";

/// Namespace of a class path: everything before the last `::`.
///
/// Generic arguments are ignored, so `app::Repo<app::User>` lives in `app`.
/// Reference, pointer and `dyn` markers are skipped, so `&mut dyn app::Api`
/// also lives in `app`. Paths without `::` have no namespace, and neither do
/// tuple, array or slice types.
pub fn namespace_of(class: &str) -> Option<&str> {
    let base = strip_type_markers(class);
    if base.starts_with(['(', '[']) {
        return None;
    }
    let base = match base.find('<') {
        Some(pos) => &base[..pos],
        None => base,
    };
    base.rsplit_once("::")
        .map(|(namespace, _)| namespace)
        .filter(|namespace| !namespace.is_empty())
}

fn strip_type_markers(mut ty: &str) -> &str {
    const MARKERS: [&str; 5] = ["&", "mut ", "dyn ", "*const ", "*mut "];
    while let Some(rest) = MARKERS.iter().find_map(move |marker| ty.strip_prefix(*marker)) {
        ty = rest.trim_start();
    }
    ty
}

/// Outcome of resolving a class against the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub class: Option<String>,
    pub namespace: Option<String>,
    /// Level configured for the class or its namespace; `None` selects the default logger
    pub level: Option<LogLevel>,
    /// Handler section names, in delivery order
    pub handler_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    properties: Arc<Properties>,
}

impl ResolutionEngine {
    pub fn new(properties: Arc<Properties>) -> Self {
        Self { properties }
    }

    /// Resolve a class, deriving its namespace from the path
    pub fn resolve(&self, class: Option<&str>) -> ResolvedTarget {
        let namespace = class.and_then(namespace_of);
        self.resolve_in(class, namespace)
    }

    /// Resolve a class with an explicitly supplied namespace
    pub fn resolve_in(&self, class: Option<&str>, namespace: Option<&str>) -> ResolvedTarget {
        ResolvedTarget {
            class: class.map(str::to_string),
            namespace: namespace.map(str::to_string),
            level: self.level(class, namespace),
            handler_names: self.handler_names(class, namespace),
        }
    }

    /// `logger.<class>.handlers`, then `logger.<namespace>.handlers`, then
    /// `rootLogger.handlers`, then every declared handler section.
    pub fn handler_names(&self, class: Option<&str>, namespace: Option<&str>) -> Vec<String> {
        let scoped = [class, namespace]
            .into_iter()
            .flatten()
            .find_map(|scope| self.properties.get(&format!("{}.{}.handlers", LOGGER_PREFIX, scope)));

        match scoped.or_else(|| self.properties.get(&format!("{}.handlers", ROOT_KEY))) {
            Some(list) => split_list(list),
            None => self.handler_sections(),
        }
    }

    /// `logger.<class>`, then `logger.<namespace>`; unrecognized names count as unset
    pub fn level(&self, class: Option<&str>, namespace: Option<&str>) -> Option<LogLevel> {
        [class, namespace].into_iter().flatten().find_map(|scope| {
            self.properties
                .get(&format!("{}.{}", LOGGER_PREFIX, scope))
                .and_then(LogLevel::from_name)
        })
    }

    /// Level of `rootLogger`, `INFO` when unset or unrecognized
    pub fn root_level(&self) -> LogLevel {
        self.properties
            .get(ROOT_KEY)
            .and_then(LogLevel::from_name)
            .unwrap_or(LogLevel::Info)
    }

    /// Names `N` with a `logger.N.handlerLoader` key, in declaration order
    pub fn handler_sections(&self) -> Vec<String> {
        self.properties
            .sections(LOGGER_PREFIX)
            .into_iter()
            .filter(|name| {
                self.properties
                    .contains_key(&format!("{}.{}.{}", LOGGER_PREFIX, name, HANDLER_LOADER))
            })
            .collect()
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(pairs: &[(&str, &str)]) -> ResolutionEngine {
        ResolutionEngine::new(Arc::new(Properties::from_pairs(pairs.iter().copied())))
    }

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of("shop::cart::Cart"), Some("shop::cart"));
        assert_eq!(namespace_of("shop::Repo<shop::User>"), Some("shop"));
        assert_eq!(namespace_of("Standalone"), None);
        assert_eq!(namespace_of("::Rooted"), None);
    }

    #[test]
    fn test_namespace_of_type_markers() {
        assert_eq!(namespace_of("&shop::Cart"), Some("shop"));
        assert_eq!(namespace_of("&mut shop::cart::Cart"), Some("shop::cart"));
        assert_eq!(namespace_of("dyn shop::Api"), Some("shop"));
        assert_eq!(namespace_of("&dyn shop::Api<shop::Order>"), Some("shop"));
        assert_eq!(namespace_of("*const shop::Cart"), Some("shop"));
        assert_eq!(namespace_of("(a::B, c::D)"), None);
        assert_eq!(namespace_of("[shop::Cart]"), None);
        assert_eq!(namespace_of("&[shop::Cart]"), None);
    }

    #[test]
    fn test_class_handlers_win() {
        let e = engine(&[
            ("rootLogger.handlers", "console"),
            ("logger.shop.handlers", "file"),
            ("logger.shop::Cart.handlers", "slack, file"),
        ]);
        assert_eq!(e.resolve(Some("shop::Cart")).handler_names, vec!["slack", "file"]);
        assert_eq!(e.resolve(Some("shop::Order")).handler_names, vec!["file"]);
        assert_eq!(e.resolve(Some("other::Thing")).handler_names, vec!["console"]);
        assert_eq!(e.resolve(None).handler_names, vec!["console"]);
    }

    #[test]
    fn test_all_sections_when_nothing_listed() {
        let e = engine(&[
            ("logger.console.handlerLoader", "ConsoleHandler"),
            ("logger.shop", "ERROR"),
            ("logger.file.handlerLoader", "FileHandler"),
            ("logger.file.constructor.path", "x.log"),
            ("logger.orphan.constructor.path", "y.log"),
        ]);
        assert_eq!(e.resolve(None).handler_names, vec!["console", "file"]);
    }

    #[test]
    fn test_list_parsing() {
        let e = engine(&[("rootLogger.handlers", " a ,, b ,")]);
        assert_eq!(e.resolve(None).handler_names, vec!["a", "b"]);
    }

    #[test]
    fn test_level_precedence() {
        let e = engine(&[("logger.shop", "WARNING"), ("logger.shop::Cart", "ERROR")]);
        assert_eq!(e.resolve(Some("shop::Cart")).level, Some(LogLevel::Error));
        assert_eq!(e.resolve(Some("shop::Order")).level, Some(LogLevel::Warning));
        assert_eq!(e.resolve(Some("billing::Invoice")).level, None);
        assert_eq!(e.resolve(None).level, None);
    }

    #[test]
    fn test_unrecognized_level_is_unset() {
        let e = engine(&[("logger.shop", "LOUD"), ("rootLogger", "chatty")]);
        assert_eq!(e.resolve(Some("shop::Cart")).level, None);
        assert_eq!(e.root_level(), LogLevel::Info);
    }

    #[test]
    fn test_explicit_namespace() {
        let e = engine(&[("logger.billing", "DEBUG")]);
        let target = e.resolve_in(Some("Invoice"), Some("billing"));
        assert_eq!(target.level, Some(LogLevel::Debug));
        assert_eq!(target.namespace.as_deref(), Some("billing"));
    }

    #[test]
    fn test_root_level() {
        assert_eq!(engine(&[("rootLogger", "ERROR")]).root_level(), LogLevel::Error);
        assert_eq!(engine(&[]).root_level(), LogLevel::Info);
    }
}
