//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use cozmonaut_application::SessionConfig;
use cozmonaut_domain::Operation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors found when validating a loaded configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("session.poll_interval_ms cannot be 0")]
    InvalidPollInterval,

    #[error("host.script_dir cannot be empty")]
    EmptyScriptDir,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Runtime host settings
    pub host: FileHostConfig,
    /// Session settings
    pub session: FileSessionConfig,
    /// Console settings
    pub console: FileConsoleConfig,
    /// Log output settings
    pub logging: FileLoggingConfig,
}

/// `[host]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHostConfig {
    /// Directory holding the `cozmonaut` Lua package
    pub script_dir: PathBuf,
}

impl Default for FileHostConfig {
    fn default() -> Self {
        Self {
            script_dir: PathBuf::from("scripts"),
        }
    }
}

/// `[session]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    pub operation: Operation,
    /// Send `AutoEnable` right after executing `interact`
    pub auto_enable: bool,
    /// Interrupt polling period in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            operation: Operation::Interact,
            auto_enable: true,
            poll_interval_ms: 100,
        }
    }
}

/// `[console]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsoleConfig {
    pub enabled: bool,
    pub prompt: String,
}

impl Default for FileConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prompt: "> ".to_string(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Also write logs to this file
    pub file: Option<PathBuf>,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.session.poll_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidPollInterval);
        }

        if self.host.script_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyScriptDir);
        }

        Ok(())
    }

    /// Build the session settings for the run use case.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_operation(self.session.operation)
            .with_auto_enable(self.session.auto_enable)
            .with_poll_interval_ms(self.session.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[host]
script_dir = "/opt/cozmonaut/lua"

[session]
operation = "list"
auto_enable = false
poll_interval_ms = 250

[console]
enabled = false
prompt = "cozmo> "

[logging]
file = "/tmp/cozmonaut.log"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host.script_dir, PathBuf::from("/opt/cozmonaut/lua"));
        assert_eq!(config.session.operation, Operation::FriendsList);
        assert!(!config.session.auto_enable);
        assert_eq!(config.session.poll_interval_ms, 250);
        assert!(!config.console.enabled);
        assert_eq!(config.console.prompt, "cozmo> ");
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/tmp/cozmonaut.log"))
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[session]
operation = "remove"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.operation, Operation::FriendsRemove);
        assert!(config.session.auto_enable);
        assert_eq!(config.host, FileHostConfig::default());
        assert_eq!(config.console.prompt, "> ");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let toml_str = r#"
[session]
operation = "dance"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let mut config = FileConfig::default();
        config.session.poll_interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidPollInterval)
        );
    }

    #[test]
    fn test_validate_empty_script_dir() {
        let mut config = FileConfig::default();
        config.host.script_dir = PathBuf::new();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyScriptDir));
    }

    #[test]
    fn test_to_session_config() {
        let mut config = FileConfig::default();
        config.session.operation = Operation::FriendsList;
        config.session.poll_interval_ms = 40;

        let session = config.to_session_config();
        assert_eq!(session.operation, Operation::FriendsList);
        assert_eq!(session.poll_interval, Duration::from_millis(40));
        assert!(!session.should_auto_enable());
    }
}
