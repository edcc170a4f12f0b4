//! Log sink port: where services submit structured log records.
//!
//! Submission is fire-and-forget: the sink never reports back. The
//! infrastructure layer forwards records to `tracing`; tests use
//! [`MemoryLogSink`] to inspect what was submitted.

use cozmonaut_domain::{LogLevel, LogRecord};
use std::sync::Mutex;

/// Port for submitting log records.
pub trait LogSink: Send + Sync {
    fn submit(&self, record: LogRecord);
}

/// Sink that discards every record.
pub struct NoLogSink;

impl LogSink for NoLogSink {
    fn submit(&self, _record: LogRecord) {}
}

/// Sink that keeps every record in memory.
#[derive(Default)]
pub struct MemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all submitted records, in submission order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Messages of records at the given level, in submission order.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .map(|r| r.message)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl LogSink for MemoryLogSink {
    fn submit(&self, record: LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
