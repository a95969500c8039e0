//! Configuration loading for the breed catalog.
//!
//! Configuration is loaded from a TOML file (default: `breeds.toml`). Every
//! section is optional; missing values fall back to the defaults below.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `remote.api_key`.
pub const API_KEY_ENV: &str = "BREEDS_API_KEY";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote API configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Search configuration.
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the breeds API (default: https://api.thecatapi.com/v1/).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `x-api-key` header. Requests are sent without it when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file. Resolved against the platform data
    /// directory when unset.
    #[serde(default)]
    pub database: Option<PathBuf>,
}

/// Search configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Debounce window for keyword input in milliseconds (default: 1350).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.thecatapi.com/v1/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    1350
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Replace the API key when `key` is set and non-blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.remote.api_key = Some(key);
        }
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, "https://api.thecatapi.com/v1/");
        assert_eq!(config.remote.api_key, None);
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.search.debounce_ms, 1350);
        assert_eq!(config.storage.database, None);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.debounce_ms, 1350);
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[remote]
base_url = "http://localhost:8080/v1/"
api_key = "secret"

[storage]
database = "/data/breeds.db"

[search]
debounce_ms = 200

[logging]
filter = "breed_client=debug"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.remote.base_url, "http://localhost:8080/v1/");
        assert_eq!(config.remote.api_key.as_deref(), Some("secret"));
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.storage.database, Some(PathBuf::from("/data/breeds.db")));
        assert_eq!(config.search.debounce_ms, 200);
        assert_eq!(config.logging.filter, "breed_client=debug");
    }

    #[test]
    fn api_key_override() {
        let config = Config::default().with_api_key_override(Some("env-key".into()));
        assert_eq!(config.remote.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn blank_api_key_override_is_ignored() {
        let mut config = Config::default();
        config.remote.api_key = Some("file-key".into());

        let config = config
            .with_api_key_override(Some("  ".into()))
            .with_api_key_override(None);
        assert_eq!(config.remote.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breeds.toml");
        std::fs::write(&path, "[search]\ndebounce_ms = 10\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.search.debounce_ms, 10);
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = Config::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.remote.timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breeds.toml");
        std::fs::write(&path, "[search\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
