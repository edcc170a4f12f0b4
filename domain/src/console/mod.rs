//! Console service calls
//!
//! The console service owns the interactive input thread. Other components
//! talk to it only through these calls.

/// A procedure call accepted by the console service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCall {
    /// Read and clear the interrupted flag.
    TakeInterrupted,
    /// Ask the user for input. Reserved; currently answers `None`.
    Solicit { prompt: String },
}

impl ConsoleCall {
    /// Stable ordinal used in log lines.
    pub fn ordinal(&self) -> u32 {
        match self {
            Self::TakeInterrupted => 0,
            Self::Solicit { .. } => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TakeInterrupted => "interrupted",
            Self::Solicit { .. } => "solicit",
        }
    }
}

/// Reply to a [`ConsoleCall`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConsoleReply {
    /// No reply (returned when the service declares no interface).
    #[default]
    None,
    /// Whether an interrupt was observed since the last read.
    Interrupted(bool),
    /// Answer to a solicitation.
    Solicited(Option<String>),
}

impl ConsoleReply {
    /// `true` only for `Interrupted(true)`.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_call_ordinals() {
        assert_eq!(ConsoleCall::TakeInterrupted.ordinal(), 0);
        assert_eq!(
            ConsoleCall::Solicit {
                prompt: "name?".into()
            }
            .ordinal(),
            1
        );
    }

    #[test]
    fn test_reply_is_interrupted() {
        assert!(ConsoleReply::Interrupted(true).is_interrupted());
        assert!(!ConsoleReply::Interrupted(false).is_interrupted());
        assert!(!ConsoleReply::None.is_interrupted());
        assert!(!ConsoleReply::Solicited(None).is_interrupted());
    }
}
