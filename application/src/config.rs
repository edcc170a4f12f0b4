//! Application-level configuration.
//!
//! This module provides configuration types that control how the session
//! use case behaves: which operation to run and how to wait for the user.

use cozmonaut_domain::Operation;
use std::time::Duration;

/// Session behavior configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Operation to execute once the services are up.
    pub operation: Operation,
    /// Enable automatic interaction right after executing `interact`.
    pub auto_enable: bool,
    /// How often to check the console for an interrupt.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            operation: Operation::Interact,
            auto_enable: true,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl SessionConfig {
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_auto_enable(mut self, auto_enable: bool) -> Self {
        self.auto_enable = auto_enable;
        self
    }

    /// Creates the poll interval from milliseconds.
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval = Duration::from_millis(millis);
        self
    }

    /// Whether `AutoEnable` should follow the exec call.
    pub fn should_auto_enable(&self) -> bool {
        self.auto_enable && self.operation == Operation::Interact
    }
}
