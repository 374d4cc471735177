//! Configuration management for the nasne plugin
//!
//! This module defines the `Config` struct and its sub-structs. It uses the
//! `figment` crate to layer built-in defaults, an optional TOML file,
//! `NASNE_`-prefixed environment variables and the command line, in that
//! order of precedence.

use crate::cli::Cli;
use anyhow::{ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_METRIC_KEY_PREFIX: &str = "nasne";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for messages written to stderr.
    pub log_level: String,
    /// Namespace for every metric key the plugin reports.
    pub metric_key_prefix: String,
    /// Configuration for talking to the device.
    pub device: DeviceConfig,
}

/// Configuration for the device HTTP API.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeviceConfig {
    /// Port serving the `/status/*` endpoints.
    pub status_port: u16,
    /// Port serving the `/recorded/*` endpoints.
    pub recorded_port: u16,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Config {
    /// Loads the configuration, layering the sources named in the module docs.
    ///
    /// # Arguments
    /// * `cli` - Parsed command-line arguments; `cli.config` names the TOML file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = &cli.config {
            ensure!(path.exists(), "configuration file not found at {:?}", path);
            figment = figment.merge(Toml::file(path));
        }

        let config: Config = figment
            // e.g. NASNE_LOG_LEVEL=debug, NASNE_DEVICE__STATUS_PORT=8080
            .merge(Env::prefixed("NASNE_").split("__"))
            .merge(cli.clone())
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would produce unusable metric keys or requests.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.metric_key_prefix.is_empty(),
            "metric_key_prefix must not be empty"
        );
        ensure!(
            !self
                .metric_key_prefix
                .chars()
                .any(|c| c == '.' || c.is_whitespace()),
            "metric_key_prefix {:?} must not contain dots or whitespace",
            self.metric_key_prefix
        );
        ensure!(
            self.device.timeout_seconds > 0,
            "device.timeout_seconds must be greater than zero"
        );
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            metric_key_prefix: DEFAULT_METRIC_KEY_PREFIX.to_string(),
            device: DeviceConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            status_port: 64210,
            recorded_port: 64220,
            timeout_seconds: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_prefix_with_dot() {
        let config = Config {
            metric_key_prefix: "nasne.living".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not contain dots"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.device.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
