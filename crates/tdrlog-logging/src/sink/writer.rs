//! Encoding sink over any `io::Write`
//!
//! Records are encoded one per line. Fields are written one by one rather
//! than collected into a map, so duplicate keys survive in emission order.

use std::io::Write;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tdrlog_core_types::schema::{KEY_LEVEL, KEY_MESSAGE, KEY_TIMESTAMP};
use tdrlog_errors::{LogError, Result};

use super::Sink;
use crate::field::Field;
use crate::level::Level;
use crate::record::LogRecord;

/// Line format of a [`WriterSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One JSON object per line
    Json,
    /// `timestamp<TAB>LEVEL<TAB>message<TAB>{fields}` for interactive reading
    Console,
}

/// Level-filtered sink encoding records onto a writer
pub struct WriterSink<W> {
    writer: Mutex<W>,
    encoding: Encoding,
    min_level: Level,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, encoding: Encoding, min_level: Level) -> Self {
        Self {
            writer: Mutex::new(writer),
            encoding,
            min_level,
        }
    }

    pub fn json(writer: W, min_level: Level) -> Self {
        Self::new(writer, Encoding::Json, min_level)
    }

    pub fn console(writer: W, min_level: Level) -> Self {
        Self::new(writer, Encoding::Console, min_level)
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, W>> {
        self.writer
            .lock()
            .map_err(|e| std::io::Error::other(format!("sink lock poisoned: {e}")).into())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&self, record: &LogRecord, baseline: &[Field]) -> Result<()> {
        if record.level < self.min_level {
            return Ok(());
        }
        let line = encode(self.encoding, &timestamp(), record, baseline)?;
        let mut writer = self.lock()?;
        writer.write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.lock()?.flush()?;
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Encode one record, newline included
pub fn encode(
    encoding: Encoding,
    timestamp: &str,
    record: &LogRecord,
    baseline: &[Field],
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    match encoding {
        Encoding::Json => {
            out.push(b'{');
            write_entry(&mut out, KEY_TIMESTAMP, &timestamp.into())?;
            out.push(b',');
            write_entry(&mut out, KEY_LEVEL, &record.level.as_str().into())?;
            out.push(b',');
            write_entry(&mut out, KEY_MESSAGE, &record.message.as_str().into())?;
            for field in baseline.iter().chain(&record.fields) {
                out.push(b',');
                write_entry(&mut out, &field.key, &field.value)?;
            }
            out.push(b'}');
        }
        Encoding::Console => {
            write!(
                out,
                "{timestamp}\t{}\t{}",
                record.level.as_str(),
                record.message
            )?;
            if !baseline.is_empty() || !record.fields.is_empty() {
                out.push(b'\t');
                write_object(&mut out, baseline.iter().chain(&record.fields))?;
            }
        }
    }
    out.push(b'\n');
    Ok(out)
}

fn write_object<'a>(out: &mut Vec<u8>, fields: impl Iterator<Item = &'a Field>) -> Result<()> {
    out.push(b'{');
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(b',');
        }
        write_entry(out, &field.key, &field.value)?;
    }
    out.push(b'}');
    Ok(())
}

fn write_entry(out: &mut Vec<u8>, key: &str, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer(&mut *out, key).map_err(LogError::from)?;
    out.push(b':');
    serde_json::to_writer(&mut *out, value).map_err(LogError::from)?;
    Ok(())
}
