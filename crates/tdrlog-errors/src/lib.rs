//! Error facility for tdrlog
//!
//! Every failure this system can report falls into one of a small set of
//! kinds, each with a stable code. Masking and context extraction never
//! produce errors; only construction (bad configuration, unopenable
//! sinks) and `flush` do.

use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Canonical error kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration rejected at construction
    InvalidConfig,
    /// Filesystem or stream failure
    Io,
    /// Record could not be encoded
    Serialization,
    /// A sink failed to persist buffered data
    Flush,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ErrorKind::Io => "ERR_IO",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::Flush => "ERR_FLUSH",
        }
    }
}

/// Errors raised by logger construction and flushing
#[derive(Error, Debug)]
pub enum LogError {
    /// A configuration field is missing or out of range
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Configuration text could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Flushing the named sink failed
    #[error("Failed to flush {sink} sink: {source}")]
    Flush {
        sink: String,
        #[source]
        source: Box<LogError>,
    },
}

impl LogError {
    /// Shorthand for an invalid configuration field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LogError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a sink failure as a flush failure of the named sink
    pub fn flush(sink: impl Into<String>, source: LogError) -> Self {
        LogError::Flush {
            sink: sink.into(),
            source: Box::new(source),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogError::InvalidConfig { .. } | LogError::ConfigParse(_) => ErrorKind::InvalidConfig,
            LogError::Io(_) => ErrorKind::Io,
            LogError::Serialization(_) => ErrorKind::Serialization,
            LogError::Flush { .. } => ErrorKind::Flush,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}
