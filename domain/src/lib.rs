//! Domain layer for cozmonaut
//!
//! This crate contains the core types of the runtime host: service
//! lifecycle, operations, log records and output line buffering.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Service
//!
//! A pluggable component with a load/start/stop lifecycle and an optional
//! table of procedures. See [`service`].
//!
//! ## Operation
//!
//! One of a closed set of high-level modes (list, remove, interact) the
//! scripting host runs. Exactly one is active at a time. See [`operation`].

pub mod console;
pub mod log;
pub mod operation;
pub mod output;
pub mod service;

// Re-export commonly used types
pub use console::{ConsoleCall, ConsoleReply};
pub use log::{LogLevel, LogRecord};
pub use operation::{Diversion, HostCall, Operation};
pub use output::{LineBuffer, OutputStream};
pub use service::{
    HookError, LifecycleState, ProcedureError, ServiceDescriptor, ServiceError,
};
