//! Configuration management for clitools.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::command::{DEFAULT_CONTAINER_RUNTIME, DEFAULT_TRANSPORT};
use crate::execution::{DEFAULT_POLL_INTERVAL, DEFAULT_SHELL};
use crate::mysql::MysqlSettings;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External programs.
    pub tools: ToolsSection,
    /// Execution behaviour.
    pub execution: ExecutionSection,
    /// MySQL connection defaults.
    pub mysql: MysqlSettings,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// External program names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// Shell used to run built command lines.
    pub shell: String,
    /// Transport for remote commands.
    pub ssh: String,
    /// Container runtime.
    pub docker: String,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            ssh: DEFAULT_TRANSPORT.to_string(),
            docker: DEFAULT_CONTAINER_RUNTIME.to_string(),
        }
    }
}

/// Execution configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Treat non-zero exit codes as errors.
    pub strict: bool,
    /// Poll interval for interactive children, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            strict: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(shell) = std::env::var("CLITOOLS_SHELL") {
            self.tools.shell = shell;
        }

        if let Ok(ssh) = std::env::var("CLITOOLS_SSH") {
            self.tools.ssh = ssh;
        }

        if let Ok(docker) = std::env::var("CLITOOLS_DOCKER") {
            self.tools.docker = docker;
        }

        if let Ok(host) = std::env::var("CLITOOLS_MYSQL_HOST") {
            self.mysql.host = host;
        }

        if let Ok(user) = std::env::var("CLITOOLS_MYSQL_USER") {
            self.mysql.user = user;
        }

        if let Ok(password) = std::env::var("CLITOOLS_MYSQL_PASSWORD") {
            if !password.is_empty() {
                self.mysql.password = Some(password);
            }
        }

        if let Ok(level) = std::env::var("CLITOOLS_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if args.no_strict {
            self.execution.strict = false;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Reject values no command could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("tools.shell", &self.tools.shell),
            ("tools.ssh", &self.tools.ssh),
            ("tools.docker", &self.tools.docker),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(key, value.clone()));
            }
        }

        if self.execution.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("execution.poll_interval_ms", "0".into()));
        }

        Ok(())
    }

    /// Poll interval for interactive execution.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.execution.poll_interval_ms)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A value that cannot be used.
    Invalid(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(key, value) => write!(f, "invalid value for {}: '{}'", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tools.shell, "sh");
        assert_eq!(config.tools.ssh, "ssh");
        assert_eq!(config.tools.docker, "docker");
        assert!(config.execution.strict);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "tools": {
                "docker": "podman"
            },
            "execution": {
                "strict": false,
                "poll_interval_ms": 250
            },
            "mysql": {
                "host": "db.local",
                "password": "secret"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.tools.docker, "podman");
        assert_eq!(config.tools.ssh, "ssh"); // Default
        assert!(!config.execution.strict);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.mysql.host, "db.local");
        assert_eq!(config.mysql.port, 3306); // Default
        assert_eq!(config.mysql.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_config_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/clitools.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            no_strict: true,
            log_level: Some("debug".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert!(!config.execution.strict);
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.tools.shell = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("tools.shell", _))
        ));

        config.tools.shell = "bash".to_string();
        config.execution.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"shell\""));
        assert!(json.contains("\"poll_interval_ms\""));
    }
}
