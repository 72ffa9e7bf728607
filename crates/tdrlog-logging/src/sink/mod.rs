//! Backend sinks
//!
//! A sink receives finished records and persists them. The logger owns two
//! sinks (system and transaction detail); each is usually a [`Tee`] of a
//! rotating JSON file and, optionally, a console echo.
//!
//! Sinks report failures as `Result`s; the logger decides what to do with
//! them (write failures are swallowed, flush failures are returned).

pub mod capture;
pub mod rotate;
pub mod writer;

use std::sync::Arc;

use tdrlog_errors::Result;

use crate::field::Field;
use crate::record::LogRecord;

pub use capture::{CaptureSink, CapturedRecord, TestCapture};
pub use rotate::{RotatingFile, RotationPolicy};
pub use writer::{Encoding, WriterSink};

/// Destination for finished records
pub trait Sink: Send + Sync {
    /// Persist one record; `baseline` fields precede the record's own fields
    fn write(&self, record: &LogRecord, baseline: &[Field]) -> Result<()>;

    /// Force buffered records out to storage
    fn flush(&self) -> Result<()>;
}

/// Fans every record out to several sinks
///
/// Every member is attempted even when an earlier one fails; the first
/// failure is returned.
#[derive(Clone, Default)]
pub struct Tee {
    sinks: Vec<Arc<dyn Sink>>,
}

impl Tee {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for Tee {
    fn write(&self, record: &LogRecord, baseline: &[Field]) -> Result<()> {
        first_error(self.sinks.iter().map(|s| s.write(record, baseline)))
    }

    fn flush(&self) -> Result<()> {
        first_error(self.sinks.iter().map(|s| s.flush()))
    }
}

fn first_error(results: impl Iterator<Item = Result<()>>) -> Result<()> {
    let mut first = None;
    for result in results {
        if let Err(e) = result {
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}
