//! Record severity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tdrlog_errors::LogError;

/// Severity of a log record, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl Level {
    /// Capitalised name written under the level key
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Panic => "PANIC",
        }
    }

    /// Fatal and Panic end the process (or the thread) after emission
    pub fn is_terminal(&self) -> bool {
        matches!(self, Level::Fatal | Level::Panic)
    }

    /// Levels whose records carry an `error` field
    pub fn carries_error(&self) -> bool {
        *self >= Level::Error
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "panic" => Ok(Level::Panic),
            other => Err(LogError::invalid_config(
                "log_level",
                format!("unknown level '{other}'"),
            )),
        }
    }
}
