//! Retry policy settings for the storage backend
//!
//! The backoff itself is executed by the SDK; this module only carries the
//! knobs so they can come from the config file or the command line.

use serde::{Deserialize, Serialize};

/// Backoff strategy understood by the storage client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    /// Exponential backoff with jitter
    #[default]
    Standard,
    /// Standard backoff plus client-side rate limiting
    Adaptive,
}

impl std::fmt::Display for RetryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryMode::Standard => write!(f, "standard"),
            RetryMode::Adaptive => write!(f, "adaptive"),
        }
    }
}

impl std::str::FromStr for RetryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(RetryMode::Standard),
            "adaptive" => Ok(RetryMode::Adaptive),
            _ => Err(format!("Invalid retry mode: {s}")),
        }
    }
}

/// Bounded retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub mode: RetryMode,
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            mode: RetryMode::Standard,
            max_attempts: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 20_000,
        }
    }
}

/// Retry configuration builder for easy customization
#[derive(Debug, Clone, Default)]
pub struct RetryBuilder {
    config: RetryConfig,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: RetryMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the attempt limit; zero is raised to one
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn initial_backoff_ms(mut self, ms: u64) -> Self {
        self.config.initial_backoff_ms = ms;
        self
    }

    pub fn max_backoff_ms(mut self, ms: u64) -> Self {
        self.config.max_backoff_ms = ms;
        self
    }

    pub fn build(self) -> RetryConfig {
        self.config
    }
}

impl From<RetryConfig> for RetryBuilder {
    fn from(config: RetryConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = RetryConfig::default();
        assert_eq!(config.mode, RetryMode::Standard);
        assert_eq!(config.max_attempts, 10);
    }

    #[test]
    fn test_retry_builder() {
        let config = RetryBuilder::new()
            .mode(RetryMode::Adaptive)
            .max_attempts(5)
            .initial_backoff_ms(200)
            .max_backoff_ms(20000)
            .build();

        assert_eq!(config.mode, RetryMode::Adaptive);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_backoff_ms, 200);
        assert_eq!(config.max_backoff_ms, 20000);
    }

    #[test]
    fn test_zero_attempts_raised() {
        let config = RetryBuilder::new().max_attempts(0).build();
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_retry_mode_parse() {
        assert_eq!("standard".parse::<RetryMode>().unwrap(), RetryMode::Standard);
        assert_eq!("ADAPTIVE".parse::<RetryMode>().unwrap(), RetryMode::Adaptive);
        assert!("legacy".parse::<RetryMode>().is_err());
    }
}
