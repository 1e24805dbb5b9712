//! Configuration loading and typed config structures for the timeline store.
//!
//! Configuration is read from an optional YAML file (`timeline.yaml` by
//! convention) and then overridden by environment variables, so a deployment
//! can point the store at a different backend without editing the file.
//! Every field has a default; an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid {name}: {message}")]
    Env {
        /// Name of the environment variable.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Where the backend data API lives.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Where the key-value mirror is written.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// Recognized variables:
    /// - `TIMELINE_BACKEND_URL` overrides `backend.base_url`
    /// - `TIMELINE_REQUEST_TIMEOUT_MS` overrides `backend.request_timeout_ms`
    /// - `TIMELINE_STORAGE_PATH` overrides `storage.path`
    /// - `TIMELINE_LOG_LEVEL` overrides `logging.level`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Build a configuration from defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override fields with environment variables when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("TIMELINE_BACKEND_URL") {
            self.backend.base_url = val;
        }
        if let Ok(val) = std::env::var("TIMELINE_REQUEST_TIMEOUT_MS") {
            self.backend.request_timeout_ms = val.parse().map_err(|e| ConfigError::Env {
                name: "TIMELINE_REQUEST_TIMEOUT_MS",
                message: format!("{e}"),
            })?;
        }
        if let Ok(val) = std::env::var("TIMELINE_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("TIMELINE_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }
}

/// Backend data API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    /// Base URL; requests go to `<base_url>/<slug>/<endpoint>`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl BackendConfig {
    /// Request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Key-value mirror settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the mirror. `None` keeps it in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_base_url() -> String {
    String::from("http://localhost:8000/data")
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000/data");
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.storage.path, None);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
backend:
  base_url: "https://timelines.example.org/data/"
  request_timeout_ms: 2500

storage:
  path: "/var/lib/timeline/session.json"

logging:
  level: "debug"
  json: true
"#;
        let config = StoreConfig::parse(yaml).unwrap();

        assert_eq!(config.backend.base_url, "https://timelines.example.org/data/");
        assert_eq!(config.backend.request_timeout_ms, 2500);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/var/lib/timeline/session.json"))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = StoreConfig::parse("backend:\n  request_timeout_ms: 500\n").unwrap();
        assert_eq!(config.backend.request_timeout_ms, 500);
        // Everything else uses defaults
        assert_eq!(config.backend.base_url, "http://localhost:8000/data");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(StoreConfig::parse("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        let config = StoreConfig::parse("backend: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let config = StoreConfig::from_file(Path::new("/nonexistent/timeline.yaml"));
        assert!(matches!(config, Err(ConfigError::Io { .. })));
    }
}
