//! Configuration management for the academy client.
//!
//! Loads configuration from `ACADEMY_*` environment variables with defaults.

use request_state_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("{key} has invalid value {value:?}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },
    /// The action broadcast needs room for at least one action
    #[error("ACADEMY_BROADCAST_CAPACITY must be greater than zero")]
    ZeroCapacity,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademyConfig {
    /// `tracing` filter directive (`ACADEMY_LOG`)
    pub log_filter: String,
    /// Action broadcast buffer size (`ACADEMY_BROADCAST_CAPACITY`)
    pub broadcast_capacity: usize,
    /// Shutdown grace period in milliseconds (`ACADEMY_SHUTDOWN_TIMEOUT_MS`)
    pub shutdown_timeout_ms: u64,
    /// Simulated API latency in milliseconds (`ACADEMY_API_LATENCY_MS`)
    pub api_latency_ms: u64,
    /// Install the Prometheus recorder (`ACADEMY_METRICS`)
    pub metrics: bool,
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            log_filter: "academy=debug,request_state_runtime=debug".to_string(),
            broadcast_capacity: 16,
            shutdown_timeout_ms: 5_000,
            api_latency_ms: 50,
            metrics: false,
        }
    }
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl AcademyConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            log_filter: lookup("ACADEMY_LOG").unwrap_or(defaults.log_filter),
            broadcast_capacity: parse(
                "ACADEMY_BROADCAST_CAPACITY",
                lookup("ACADEMY_BROADCAST_CAPACITY"),
                defaults.broadcast_capacity,
            )?,
            shutdown_timeout_ms: parse(
                "ACADEMY_SHUTDOWN_TIMEOUT_MS",
                lookup("ACADEMY_SHUTDOWN_TIMEOUT_MS"),
                defaults.shutdown_timeout_ms,
            )?,
            api_latency_ms: parse(
                "ACADEMY_API_LATENCY_MS",
                lookup("ACADEMY_API_LATENCY_MS"),
                defaults.api_latency_ms,
            )?,
            metrics: parse("ACADEMY_METRICS", lookup("ACADEMY_METRICS"), defaults.metrics)?,
        };

        if config.broadcast_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(config)
    }

    /// Store settings derived from this configuration.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.broadcast_capacity)
            .with_shutdown_timeout(self.shutdown_timeout())
    }

    /// Shutdown grace period.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Simulated API latency.
    #[must_use]
    pub const fn api_latency(&self) -> Duration {
        Duration::from_millis(self.api_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AcademyConfig::from_lookup(lookup(&[])), Ok(AcademyConfig::default()));
    }

    #[test]
    fn reads_overrides() -> Result<(), ConfigError> {
        let config = AcademyConfig::from_lookup(lookup(&[
            ("ACADEMY_BROADCAST_CAPACITY", "64"),
            ("ACADEMY_API_LATENCY_MS", " 5 "),
            ("ACADEMY_METRICS", "true"),
        ]))?;

        assert_eq!(config.broadcast_capacity, 64);
        assert_eq!(config.api_latency(), Duration::from_millis(5));
        assert!(config.metrics);
        assert_eq!(config.store_config().broadcast_capacity, 64);
        assert_eq!(
            config.store_config().default_shutdown_timeout,
            Duration::from_secs(5)
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            AcademyConfig::from_lookup(lookup(&[("ACADEMY_SHUTDOWN_TIMEOUT_MS", "soon")])),
            Err(ConfigError::Invalid {
                key: "ACADEMY_SHUTDOWN_TIMEOUT_MS",
                value: "soon".to_string(),
            })
        );
        assert_eq!(
            AcademyConfig::from_lookup(lookup(&[("ACADEMY_BROADCAST_CAPACITY", "0")])),
            Err(ConfigError::ZeroCapacity)
        );
    }
}
