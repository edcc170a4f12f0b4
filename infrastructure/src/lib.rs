//! Infrastructure layer for cozmonaut
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Lua runtime host, the tracing log sink,
//! and configuration file loading.

pub mod config;
pub mod logging;
pub mod scripting;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileConsoleConfig, FileHostConfig,
    FileLoggingConfig, FileSessionConfig,
};
pub use logging::TracingLogSink;
pub use scripting::{LUA_SERVICE, LuaRuntimeHost, ScriptFault};
