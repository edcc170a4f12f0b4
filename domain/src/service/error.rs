//! Service error types

use crate::operation::Operation;
use thiserror::Error;

/// Errors reported by the service registry.
///
/// Lifecycle misuse, fatal hook failures and failed procedure calls all
/// surface here. Degraded hook failures never do; they are logged and the
/// transition proceeds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Already loaded {0}")]
    AlreadyLoaded(String),

    #[error("Not loaded {0}")]
    NotLoaded(String),

    #[error("Already started {0}")]
    AlreadyStarted(String),

    #[error("Not started {0}")]
    NotStarted(String),

    #[error("Service already registered: {0}")]
    AlreadyRegistered(String),

    #[error("{service} {hook}() failed fatally: {message}")]
    Fatal {
        service: String,
        hook: &'static str,
        message: String,
    },

    #[error("{service} proc #{ordinal} ({procedure}) failed: {source}")]
    Procedure {
        service: String,
        ordinal: u32,
        procedure: &'static str,
        #[source]
        source: ProcedureError,
    },

    #[error("Lifecycle lock poisoned for {0}")]
    Poisoned(String),
}

impl ServiceError {
    /// The procedure error, if this is a failed call.
    pub fn procedure_error(&self) -> Option<&ProcedureError> {
        match self {
            Self::Procedure { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure of a single dispatched procedure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcedureError {
    #[error("An operation was already selected ({0})")]
    OperationAlreadySelected(Operation),

    #[error("No operation is selected")]
    NoOperation,

    #[error("Scripting runtime is not available")]
    RuntimeUnavailable,

    #[error("Script raised {kind}: {value}")]
    Script { kind: String, value: String },

    #[error("{0}")]
    Failed(String),
}

/// Failure reported by a lifecycle hook (`on_load`, `on_start`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The service keeps going in a degraded state; the transition proceeds.
    #[error("{0}")]
    Degraded(String),

    /// The service cannot work at all; the transition is rolled back.
    #[error("{0}")]
    Fatal(String),
}

impl HookError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_error_display() {
        assert_eq!(
            ServiceError::NotStarted("lua".into()).to_string(),
            "Not started lua"
        );
        assert_eq!(
            ServiceError::AlreadyLoaded("console".into()).to_string(),
            "Already loaded console"
        );
    }

    #[test]
    fn test_procedure_error_accessor() {
        let err = ServiceError::Procedure {
            service: "lua".into(),
            ordinal: 1,
            procedure: "auto_enable",
            source: ProcedureError::NoOperation,
        };
        assert_eq!(err.procedure_error(), Some(&ProcedureError::NoOperation));
        assert!(err.to_string().contains("proc #1"));
        assert!(ServiceError::NotLoaded("lua".into()).procedure_error().is_none());
    }

    #[test]
    fn test_hook_error_severity() {
        assert!(HookError::Fatal("boom".into()).is_fatal());
        assert!(!HookError::Degraded("meh".into()).is_fatal());
    }
}
