//! Presentation layer for cozmonaut
//!
//! This crate contains the CLI definitions and the console service that
//! reads operator commands from the terminal.

pub mod cli;
pub mod console;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use console::{CONSOLE_SERVICE, ConsoleService, ReedlineSource};
