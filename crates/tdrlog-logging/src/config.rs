//! Logger configuration
//!
//! A [`Config`] is validated once, when the logger is built. Validation
//! applies the defaults and resolves the application version, producing a
//! [`ValidatedConfig`] that is never touched again.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tdrlog_errors::{LogError, Result};
use tracing::debug;

use crate::level::Level;
use crate::sink::RotationPolicy;

/// File name of the system log inside its directory
pub const SYSTEM_LOG_FILE: &str = "system.log";
/// File name of the transaction detail log inside its directory
pub const TDR_LOG_FILE: &str = "tdr.log";
/// Version file consulted when none is configured
pub const DEFAULT_VERSION_FILE: &str = "version.txt";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => Err(LogError::invalid_config(
                "env",
                format!("expected 'development' or 'production', got '{other}'"),
            )),
        }
    }
}

/// Logger configuration as supplied by the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application name, attached to every record
    pub app: String,
    /// Application version, unless a version file overrides it
    pub app_ver: String,
    pub env: Environment,
    /// Directory of the system log
    pub file_location: PathBuf,
    /// Directory of the transaction detail log (defaults to `file_location`)
    #[serde(default)]
    pub file_tdr_location: Option<PathBuf>,
    /// Maximum size of a log file in megabytes
    pub file_max_size: u64,
    /// Number of rotated files to keep (0 keeps all)
    pub file_max_backup: usize,
    /// Maximum age of rotated files in days (0 keeps all)
    pub file_max_age: u64,
    /// Echo records to stdout
    #[serde(default)]
    pub stdout: bool,
    /// Minimum severity written (defaults to Info)
    #[serde(default)]
    pub log_level: Option<Level>,
    /// File whose contents replace `app_ver` when it exists
    #[serde(default)]
    pub version_file_path: Option<PathBuf>,
}

impl Config {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` if the text is not valid TOML or is missing
    /// required fields.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LogError::ConfigParse(e.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or `ConfigParse`
    /// if its contents are invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check required values and apply defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(self) -> Result<ValidatedConfig> {
        require_non_empty("app", &self.app)?;
        require_non_empty("app_ver", &self.app_ver)?;
        if self.file_location.as_os_str().is_empty() {
            return Err(LogError::invalid_config("file_location", "must not be empty"));
        }
        if self.file_max_size == 0 {
            return Err(LogError::invalid_config(
                "file_max_size",
                "must be greater than zero",
            ));
        }

        let tdr_location = match self.file_tdr_location {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => self.file_location.clone(),
        };
        let version_file = self
            .version_file_path
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VERSION_FILE));
        let app_ver = read_version_file(&version_file).unwrap_or(self.app_ver);

        Ok(ValidatedConfig {
            app: self.app,
            app_ver,
            env: self.env,
            system_log_path: self.file_location.join(SYSTEM_LOG_FILE),
            tdr_log_path: tdr_location.join(TDR_LOG_FILE),
            rotation: RotationPolicy::from_units(
                self.file_max_size,
                self.file_max_backup,
                self.file_max_age,
            ),
            stdout: self.stdout,
            log_level: self.log_level.unwrap_or_default(),
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LogError::invalid_config(field, "must not be empty"));
    }
    Ok(())
}

fn read_version_file(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let version = content.strip_suffix('\n').unwrap_or(&content);
    let version = version.strip_suffix('\r').unwrap_or(version);
    debug!(path = %path.display(), version, "Application version read from file");
    Some(version.to_string())
}

/// Configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub app: String,
    /// Resolved version: version file contents, or the configured value
    pub app_ver: String,
    pub env: Environment,
    pub system_log_path: PathBuf,
    pub tdr_log_path: PathBuf,
    pub rotation: RotationPolicy,
    pub stdout: bool,
    pub log_level: Level,
}
