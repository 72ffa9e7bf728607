//! In-memory capture sink for deterministic logging assertions
//!
//! Tests build a logger over a [`CaptureSink`] and inspect what was
//! emitted through the paired [`TestCapture`] handle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tdrlog_errors::Result;

use super::Sink;
use crate::field::Field;
use crate::level::Level;
use crate::record::LogRecord;

/// A captured record with baseline and record fields in emission order
#[derive(Clone, Debug)]
pub struct CapturedRecord {
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl CapturedRecord {
    /// First field with the given key
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Keys in emission order
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }
}

/// Sink that keeps every record in memory
pub struct CaptureSink {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
    flushes: Arc<AtomicUsize>,
}

impl CaptureSink {
    pub fn new() -> (Self, TestCapture) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let flushes = Arc::new(AtomicUsize::new(0));
        let sink = Self {
            records: records.clone(),
            flushes: flushes.clone(),
        };
        (sink, TestCapture { records, flushes })
    }
}

impl Sink for CaptureSink {
    fn write(&self, record: &LogRecord, baseline: &[Field]) -> Result<()> {
        let captured = CapturedRecord {
            level: record.level,
            message: record.message.clone(),
            fields: baseline.iter().chain(&record.fields).cloned().collect(),
        };
        self.records
            .lock()
            .map(|mut records| records.push(captured))
            .ok();
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handle for accessing captured records in tests
#[derive(Clone)]
pub struct TestCapture {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
    flushes: Arc<AtomicUsize>,
}

impl TestCapture {
    /// Get all captured records
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Most recent record, if any
    pub fn last(&self) -> Option<CapturedRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|r| r.last().cloned())
    }

    /// Assert that a record with the given message exists
    ///
    /// # Panics
    ///
    /// Panics if the record is not found
    pub fn assert_record_exists(&self, message: &str) {
        let records = self.records();
        let found = records.iter().any(|r| r.message == message);
        assert!(
            found,
            "Expected record with message {:?} not found in {} captured records",
            message,
            records.len()
        );
    }

    /// Count records matching a predicate
    pub fn count_records<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedRecord) -> bool,
    {
        self.records().iter().filter(|r| predicate(r)).count()
    }

    /// Number of times the sink was flushed
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Clear all captured records
    pub fn clear(&self) {
        self.records.lock().map(|mut r| r.clear()).ok();
    }
}
