//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, ErrorKind};

/// Cache behaviour settings, mapped from the `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Absolute expiration applied when a caller does not pass one, in minutes.
    #[serde(default = "default_expiration")]
    #[validate(range(min = 1))]
    pub default_expiration_minutes: u64,
    /// Absolute expiration for repository entries, in minutes.
    #[serde(default = "default_repository_expiration")]
    #[validate(range(min = 1))]
    pub repository_expiration_minutes: u64,
    /// Sliding expiration (reset on every read), in minutes.
    #[serde(default = "default_sliding_expiration")]
    #[validate(range(min = 1))]
    pub sliding_expiration_minutes: u64,
    /// When false the repository decorator bypasses the cache entirely.
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Maximum number of entries held by the in-memory provider.
    #[serde(default = "default_max_capacity")]
    #[validate(range(min = 1))]
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Default absolute expiration.
    pub fn default_expiration(&self) -> Duration {
        minutes(self.default_expiration_minutes)
    }

    /// Absolute expiration for repository entries.
    pub fn repository_expiration(&self) -> Duration {
        minutes(self.repository_expiration_minutes)
    }

    /// Sliding expiration.
    pub fn sliding_expiration(&self) -> Duration {
        minutes(self.sliding_expiration_minutes)
    }

    /// Check every range, reporting failures as a configuration error.
    pub fn ensure_valid(&self) -> Result<(), AppError> {
        self.validate().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid cache configuration: {e}"),
                e,
            )
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_expiration_minutes: default_expiration(),
            repository_expiration_minutes: default_repository_expiration(),
            sliding_expiration_minutes: default_sliding_expiration(),
            is_enabled: default_true(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}

fn default_expiration() -> u64 {
    60
}

fn default_repository_expiration() -> u64 {
    30
}

fn default_sliding_expiration() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_capacity() -> u64 {
    10000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        let config = CacheConfig::default();
        assert_eq!(config.default_expiration(), Duration::from_secs(3600));
        assert_eq!(config.repository_expiration(), Duration::from_secs(1800));
        assert_eq!(config.sliding_expiration(), Duration::from_secs(300));
    }

    #[test]
    fn test_huge_minute_counts_saturate() {
        let config = CacheConfig {
            default_expiration_minutes: u64::MAX,
            ..CacheConfig::default()
        };
        assert_eq!(config.default_expiration(), Duration::from_secs(u64::MAX));
        assert!(config.ensure_valid().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"is_enabled": false}"#).expect("deserialize");
        assert!(!config.is_enabled);
        assert_eq!(config.repository_expiration_minutes, 30);
    }

    #[test]
    fn test_zero_duration_is_a_configuration_error() {
        let config = CacheConfig {
            sliding_expiration_minutes: 0,
            ..CacheConfig::default()
        };
        let err = config.ensure_valid().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(CacheConfig::default().ensure_valid().is_ok());
    }
}
