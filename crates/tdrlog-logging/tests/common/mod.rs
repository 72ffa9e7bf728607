use std::fs;
use std::path::Path;

use serde_json::Value;
use tdrlog_errors::{LogError, Result};
use tdrlog_logging::field::Field;
use tdrlog_logging::record::LogRecord;
use tdrlog_logging::sink::Sink;
use tdrlog_logging::{Config, Environment};

/// Configuration writing both logs into `dir`
///
/// The version file points at a path that does not exist so the
/// configured version is used.
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> Config {
    Config {
        app: "testapp".to_string(),
        app_ver: "1.0.0".to_string(),
        env: Environment::Development,
        file_location: dir.to_path_buf(),
        file_tdr_location: None,
        file_max_size: 10,
        file_max_backup: 3,
        file_max_age: 7,
        stdout: false,
        log_level: None,
        version_file_path: Some(dir.join("no-version.txt")),
    }
}

/// Parse every line of a JSON-lines log file
#[allow(dead_code)]
pub fn read_json_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// Sink whose every operation fails
#[allow(dead_code)]
pub struct FailingSink;

impl Sink for FailingSink {
    fn write(&self, _record: &LogRecord, _baseline: &[Field]) -> Result<()> {
        Err(std::io::Error::other("disk full").into())
    }

    fn flush(&self) -> Result<()> {
        Err(LogError::Io(std::io::Error::other("disk full")))
    }
}
