// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::error;

use crate::error::ConfigError;
use crate::level::LogLevel;

pub const DEFAULT_API_HOST: &str = "https://api.honeycomb.io";
pub const DEFAULT_DATASET: &str = "lager-sink";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

/// Configuration for a [`Sink`](crate::sink::Sink) and its transport.
///
/// Set once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Destination credential sent with every event
    pub write_key: String,
    /// Dataset the events land in
    pub dataset: String,
    /// Records below this level are dropped without building an event
    pub minimum_level: LogLevel,
    /// Base URL of the ingestion API
    pub api_host: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound on requests in flight at once
    pub max_concurrent_requests: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            write_key: String::new(),
            dataset: DEFAULT_DATASET.to_string(),
            minimum_level: LogLevel::DEBUG,
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl SinkConfig {
    #[must_use]
    pub fn new(
        write_key: impl Into<String>,
        dataset: impl Into<String>,
        minimum_level: LogLevel,
    ) -> Self {
        Self {
            write_key: write_key.into(),
            dataset: dataset.into(),
            minimum_level,
            ..Default::default()
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let write_key = env::var("HONEYCOMB_WRITE_KEY").unwrap_or_default();
        let dataset =
            env::var("HONEYCOMB_DATASET").unwrap_or_else(|_| DEFAULT_DATASET.to_string());
        let minimum_level = env::var("LAGER_SINK_MIN_LEVEL")
            .ok()
            .map(|val| {
                LogLevel::from_str(&val).unwrap_or_else(|e| {
                    error!("LAGER_SINK | {}", e);
                    LogLevel::DEBUG
                })
            })
            .unwrap_or(LogLevel::DEBUG);
        let api_host =
            env::var("HONEYCOMB_API_HOST").unwrap_or_else(|_| DEFAULT_API_HOST.to_string());
        let timeout = env::var("LAGER_SINK_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let config = Self {
            write_key,
            dataset,
            minimum_level,
            api_host,
            timeout,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "HONEYCOMB_WRITE_KEY cannot be empty".to_string(),
            ));
        }

        if self.dataset.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "HONEYCOMB_DATASET cannot be empty".to_string(),
            ));
        }

        if !(self.api_host.starts_with("http://") || self.api_host.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "API host '{}' must start with http:// or https://",
                self.api_host
            )));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "Max concurrent requests must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SinkConfig {
        SinkConfig::new("write-key", "dataset", LogLevel::INFO)
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.minimum_level, LogLevel::INFO);
    }

    #[test]
    fn test_default_config_needs_write_key() {
        assert!(SinkConfig::default().validate().is_err());
    }

    #[test]
    fn test_validate_empty_dataset() {
        let config = SinkConfig {
            dataset: "   ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_api_host_scheme() {
        let config = SinkConfig {
            api_host: "api.honeycomb.io".to_string(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.honeycomb.io"));
    }

    #[test]
    fn test_validate_zero_limits() {
        let config = SinkConfig {
            timeout: Duration::ZERO,
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = SinkConfig {
            max_concurrent_requests: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
