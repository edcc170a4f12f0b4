//! Logging infrastructure.
//!
//! Provides [`TracingLogSink`], which implements the
//! [`LogSink`](cozmonaut_application::LogSink) port on top of `tracing`.

mod tracing_sink;

pub use tracing_sink::TracingLogSink;
