//! Configuration file loading for cozmonaut
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./cozmonaut.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/cozmonaut/config.toml`
//! 4. Environment variables: `COZMONAUT_<SECTION>__<KEY>`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConsoleConfig, FileHostConfig, FileLoggingConfig,
    FileSessionConfig,
};
pub use loader::ConfigLoader;
