//! Captured script output
//!
//! The scripting runtime writes text in arbitrary chunks. [`LineBuffer`]
//! reassembles those chunks into newline-terminated records so that each
//! log record holds exactly one line.

mod line_buffer;

pub use line_buffer::LineBuffer;

use crate::log::LogLevel;

/// One of the two captured output streams of the scripting runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }

    /// Level at which lines of this stream are logged.
    pub fn level(&self) -> LogLevel {
        match self {
            Self::Stdout => LogLevel::Info,
            Self::Stderr => LogLevel::Error,
        }
    }
}

impl std::fmt::Display for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
