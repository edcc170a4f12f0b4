//! Use cases
//!
//! Application-level operations that orchestrate the services.

pub mod run_session;
pub mod service_driver;
