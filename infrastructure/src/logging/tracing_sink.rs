//! Log sink that forwards records to `tracing`.
//!
//! The record's own call site travels in the `location` field, since the
//! event's metadata always points here.

use cozmonaut_application::LogSink;
use cozmonaut_domain::{LogLevel, LogRecord};
use tracing::{debug, error, info, trace, warn};

/// [`LogSink`] that emits each record as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingLogSink {
    fn submit(&self, record: LogRecord) {
        let location = format!("{}:{}", record.location.file(), record.location.line());
        let tag = record.tag;
        let message = record.message;

        match record.level {
            LogLevel::Fatal => error!(tag, %location, fatal = true, "{}", message),
            LogLevel::Error => error!(tag, %location, "{}", message),
            LogLevel::Warn => warn!(tag, %location, "{}", message),
            LogLevel::Info => info!(tag, %location, "{}", message),
            LogLevel::Debug => debug!(tag, %location, "{}", message),
            LogLevel::Trace => trace!(tag, %location, "{}", message),
        }
    }
}
