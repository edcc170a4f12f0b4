//! Console user interface: line input, the `stop` command, and SIGINT.

mod line_editor;
mod service;
pub mod signal;

pub use line_editor::{ConsolePrompt, ReedlineSource};
pub use service::{CONSOLE_SERVICE, ConsoleAction, ConsoleService, LineSourceFactory};
