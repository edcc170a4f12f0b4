//! Application layer for cozmonaut
//!
//! This crate contains the service driver, the session use case, and the
//! ports that infrastructure adapters implement.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    line_source::{ChannelLineSource, LineEvent, LineSource},
    log_sink::{LogSink, MemoryLogSink, NoLogSink},
    service::{HookResult, Procedure, Service, ServiceInterface},
};
pub use use_cases::run_session::{RunSessionError, RunSessionUseCase, SessionOutcome};
pub use use_cases::service_driver::{Lifecycle, ServiceCell, ServiceRegistry};
