//! Declarative configuration: properties, value resolution, object
//! construction and per-class handler assembly

pub mod configurer;
pub mod factory;
pub mod properties;
pub mod resolution;
pub mod resolver;

pub use configurer::{HandlerSet, LogConfigurer};
pub use factory::{
    Arguments, Blueprint, Catalog, Instance, ObjectFactory, ParamOverride, ParamSpec, TypeRegistry,
    Value,
};
pub use properties::Properties;
pub use resolution::{namespace_of, ResolutionEngine, ResolvedTarget};
pub use resolver::{Clock, ParameterResolver};
