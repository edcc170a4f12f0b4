//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod line_source;
pub mod log_sink;
pub mod service;
