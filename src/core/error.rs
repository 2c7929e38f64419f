//! Error types for the logger registry

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Failed to load configuration from '{path}': {source}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed line in a configuration file
    #[error("Malformed configuration at line {line}: {message}")]
    ConfigParse { line: usize, message: String },

    /// A configured type name has no registered blueprint
    #[error("Unknown {kind} type '{type_name}' in section '{section}'")]
    UnknownType {
        kind: String,
        type_name: String,
        section: String,
    },

    /// A required constructor parameter has neither a configured value nor a default
    #[error("Missing required parameter '{parameter}' for '{type_name}' in section '{section}'")]
    MissingParameter {
        section: String,
        type_name: String,
        parameter: String,
    },

    /// A constructor parameter has a value of the wrong shape
    #[error("Invalid value for parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A referenced configuration section is incomplete
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Handler could not deliver a record
    #[error("Delivery failed for handler '{handler}': {message}")]
    Delivery { handler: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn config_load(path: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::ConfigLoad {
            path: path.into(),
            source,
        }
    }

    pub fn config_parse(line: usize, message: impl Into<String>) -> Self {
        LoggerError::ConfigParse {
            line,
            message: message.into(),
        }
    }

    pub fn unknown_type(
        kind: impl Into<String>,
        type_name: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        LoggerError::UnknownType {
            kind: kind.into(),
            type_name: type_name.into(),
            section: section.into(),
        }
    }

    pub fn missing_parameter(
        section: impl Into<String>,
        type_name: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        LoggerError::MissingParameter {
            section: section.into(),
            type_name: type_name.into(),
            parameter: parameter.into(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an incomplete-section error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn delivery(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Delivery {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error stems from declarative configuration.
    ///
    /// Such errors abort the construction of a single handler, formatter or
    /// processor; sibling objects are still assembled.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LoggerError::UnknownType { .. }
                | LoggerError::MissingParameter { .. }
                | LoggerError::InvalidParameter { .. }
                | LoggerError::InvalidConfiguration { .. }
        )
    }
}
