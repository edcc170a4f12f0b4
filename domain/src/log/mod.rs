//! Log record types
//!
//! A [`LogRecord`] is the unit submitted to a log sink. Records carry the
//! source location of the code that created them, so a record emitted on
//! behalf of a script still points at the host code that forwarded it.

use chrono::{DateTime, Utc};
use std::panic::Location;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single structured log record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    /// Subsystem tag (e.g. `"lua"`, `"console"`).
    pub tag: &'static str,
    pub message: String,
    pub location: &'static Location<'static>,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Create a record located at the caller.
    #[track_caller]
    pub fn new(level: LogLevel, tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            tag,
            message: message.into(),
            location: Location::caller(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}:{}) {}",
            self.level,
            self.tag,
            self.location.file(),
            self.location.line(),
            self.message
        )
    }
}
