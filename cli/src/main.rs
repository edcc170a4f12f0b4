//! CLI entrypoint for Cozmonaut
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cozmonaut_application::RunSessionUseCase;
use cozmonaut_infrastructure::{ConfigLoader, FileConfig, LuaRuntimeHost, TracingLogSink};
use cozmonaut_presentation::{Cli, ConsoleService};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration, then let flags override it
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;

    info!("Starting Cozmonaut");

    // === Dependency Injection ===
    let host = LuaRuntimeHost::new(&config.host.script_dir, Arc::new(TracingLogSink::new()));
    let console = if config.console.enabled {
        ConsoleService::interactive(config.console.prompt.clone())
    } else {
        ConsoleService::signals_only()
    };

    let use_case = RunSessionUseCase::new(host, console)?;
    let outcome = use_case.execute(&config.to_session_config())?;

    info!("Operation {} finished", outcome.operation);
    Ok(())
}

fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(operation) = cli.operation {
        config.session.operation = operation;
    }
    if let Some(dir) = &cli.script_dir {
        config.host.script_dir = dir.clone();
    }
    if cli.no_auto {
        config.session.auto_enable = false;
    }
    if cli.no_console {
        config.console.enabled = false;
    }
}

/// Initialize logging based on verbosity level, optionally teeing into a file.
///
/// The returned guard must live until exit so the file writer drains.
fn init_logging(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}
