//! Rendering of Lua errors raised by host snippets.

use cozmonaut_application::LogSink;
use cozmonaut_domain::{LogLevel, LogRecord, ProcedureError};
use mlua::Error as LuaError;

use super::output_sink::OUTPUT_TAG;

const TRACEBACK_MARKER: &str = "\nstack traceback:";
const NO_TRACEBACK: &str = "<none>";

/// A runtime error, split into the three strings that get logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFault {
    pub kind: String,
    pub value: String,
    pub traceback: String,
}

impl ScriptFault {
    pub fn from_error(err: &LuaError) -> Self {
        match err {
            LuaError::CallbackError { traceback, cause } => {
                let mut fault = Self::from_error(cause);
                if fault.traceback == NO_TRACEBACK {
                    fault.traceback = strip_header(traceback);
                }
                fault
            }
            LuaError::WithContext { context, cause } => {
                let mut fault = Self::from_error(cause);
                fault.value = format!("{}: {}", context, fault.value);
                fault
            }
            LuaError::RuntimeError(message) => Self::split("RuntimeError", message),
            LuaError::SyntaxError { message, .. } => Self::split("SyntaxError", message),
            LuaError::MemoryError(message) => Self::split("MemoryError", message),
            LuaError::ExternalError(inner) => Self::split("ExternalError", &inner.to_string()),
            other => Self::split("Error", &other.to_string()),
        }
    }

    fn split(kind: &str, message: &str) -> Self {
        let (value, traceback) = match message.split_once(TRACEBACK_MARKER) {
            Some((value, rest)) => (value, rest.trim_start_matches('\n').to_string()),
            None => (message, NO_TRACEBACK.to_string()),
        };
        Self {
            kind: kind.to_string(),
            value: value.to_string(),
            traceback,
        }
    }

    /// Submit the error bundle: a banner followed by type, value and traceback.
    #[track_caller]
    pub fn report(&self, sink: &dyn LogSink) {
        let lines = [
            "!!!  !!! !!! !!! !!! !!! !!! !!! !!! !!!  !!!".to_string(),
            "!!! A Lua error has occurred in host code !!!".to_string(),
            "!!!  !!! !!! !!! !!! !!! !!! !!! !!! !!!  !!!".to_string(),
            format!(" -> Type: {}", self.kind),
            format!(" -> Value: {}", self.value),
            format!(" -> Traceback: {}", self.traceback),
        ];
        for line in lines {
            sink.submit(LogRecord::new(LogLevel::Error, OUTPUT_TAG, line));
        }
    }
}

impl From<ScriptFault> for ProcedureError {
    fn from(fault: ScriptFault) -> Self {
        ProcedureError::Script {
            kind: fault.kind,
            value: fault.value,
        }
    }
}

fn strip_header(traceback: &str) -> String {
    traceback
        .trim_start_matches("stack traceback:")
        .trim_start_matches('\n')
        .to_string()
}
