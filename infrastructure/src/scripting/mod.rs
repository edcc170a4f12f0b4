//! Lua runtime host
//!
//! Provides the `LuaRuntimeHost` service, backed by mlua (Lua 5.4).
//!
//! # Modules
//!
//! - `execution_context`: Exclusive, guarded access to the Lua state
//! - `script_catalog`: Fixed exec/stop/control snippets
//! - `output_sink`: Per-thread line capture of stdout/stderr
//! - `fault`: Rendering of raised Lua errors
//! - `sandbox`: C module blocking, stream redirection, script path
//! - `runtime_host`: The service tying everything together

mod execution_context;
mod fault;
mod output_sink;
mod runtime_host;
mod sandbox;
mod script_catalog;

pub use execution_context::{ContextGuard, ExecutionContext};
pub use fault::ScriptFault;
pub use output_sink::{OUTPUT_TAG, TextSink, ThreadLineBuffers};
pub use runtime_host::{LUA_SERVICE, LuaRuntimeHost};
pub use script_catalog::{OperationScript, control_snippet, operation_script};
