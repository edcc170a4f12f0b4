//! CLI command definitions

use clap::Parser;
use cozmonaut_domain::Operation;
use std::path::PathBuf;

/// CLI arguments for cozmonaut
#[derive(Parser, Debug)]
#[command(name = "cozmonaut")]
#[command(author, version, about = "Host the Cozmonaut Lua control scripts")]
#[command(long_about = r#"
Cozmonaut hosts the Lua control scripts of the robot and drives one
operation from start to stop.

Operations:
  list       List known friends
  remove     Remove friends
  interact   Run the interactive session (default)

While the operation runs, type `stop` at the prompt or press Ctrl-C to end it.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. ./cozmonaut.toml                       Project-level config
3. ~/.config/cozmonaut/config.toml        Global config
4. COZMONAUT_<SECTION>__<KEY>             Environment variables

Example:
  cozmonaut
  cozmonaut --operation list --no-console
  cozmonaut --script-dir ./scripts --no-auto -vv
"#)]
pub struct Cli {
    /// Operation to execute
    #[arg(short, long, value_name = "OPERATION")]
    pub operation: Option<Operation>,

    /// Directory holding the `cozmonaut` Lua package
    #[arg(long, value_name = "PATH")]
    pub script_dir: Option<PathBuf>,

    /// Do not enable automatic interaction after starting `interact`
    #[arg(long)]
    pub no_auto: bool,

    /// Do not read commands from the terminal (Ctrl-C still stops)
    #[arg(long)]
    pub no_console: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["cozmonaut"]);
        assert!(cli.operation.is_none());
        assert!(!cli.no_auto);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "cozmonaut",
            "--operation",
            "list",
            "--script-dir",
            "/tmp/lua",
            "--no-auto",
            "--no-console",
            "-vv",
        ]);
        assert_eq!(cli.operation, Some(Operation::FriendsList));
        assert_eq!(cli.script_dir, Some(PathBuf::from("/tmp/lua")));
        assert!(cli.no_auto);
        assert!(cli.no_console);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        assert!(Cli::try_parse_from(["cozmonaut", "--operation", "dance"]).is_err());
    }
}
