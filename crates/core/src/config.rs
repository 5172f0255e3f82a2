//! Configuration file handling
//!
//! Settings live in `config.toml` inside the s3search config directory.
//! A missing file is not an error: every field has a default, and command
//! line flags override whatever the file provides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryConfig;

/// Environment variable that relocates the config directory
pub const CONFIG_DIR_ENV: &str = "S3SEARCH_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub s3: S3Settings,
    pub retry: RetryConfig,
    pub output: OutputSettings,
}

/// Connection settings for the storage backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    /// Named profile from the shared AWS config files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub force_path_style: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl S3Settings {
    /// Static credentials, when both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub no_color: bool,
}

/// Locates and loads the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    dir: PathBuf,
}

impl ConfigManager {
    /// Resolve the config directory from the environment or the platform default
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
            && !dir.is_empty()
        {
            return Ok(Self::with_dir(dir));
        }

        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot determine config directory".to_string()))?;
        Ok(Self::with_dir(base.join("s3search")))
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load(&self) -> Result<Config> {
        let path = self.config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryMode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path());
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry.max_attempts, 10);
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
[s3]
profile = "audit"
region = "eu-west-1"
endpoint = "http://localhost:9000"
force_path_style = true

[retry]
mode = "adaptive"
max_attempts = 4

[output]
no_color = true
"#,
        )
        .unwrap();

        let config = ConfigManager::with_dir(dir.path()).load().unwrap();
        assert_eq!(config.s3.profile.as_deref(), Some("audit"));
        assert_eq!(config.s3.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.s3.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.s3.force_path_style);
        assert_eq!(config.retry.mode, RetryMode::Adaptive);
        assert_eq!(config.retry.max_attempts, 4);
        // Unspecified retry fields keep their defaults
        assert_eq!(config.retry.initial_backoff_ms, 100);
        assert!(config.output.no_color);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[retry]\nmax_attempts = \"many\"").unwrap();

        let err = ConfigManager::with_dir(dir.path()).load().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_static_credentials_need_both_keys() {
        let mut s3 = S3Settings {
            access_key: Some("AKIA".to_string()),
            ..Default::default()
        };
        assert!(s3.static_credentials().is_none());

        s3.secret_key = Some("secret".to_string());
        assert_eq!(s3.static_credentials(), Some(("AKIA", "secret")));
    }
}
