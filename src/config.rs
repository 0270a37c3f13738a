use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default TCP port for the HTTP server
pub const DEFAULT_PORT: u16 = 8080;

/// Default AWS region
pub const DEFAULT_REGION: &str = "eu-west-2";

/// Default Name-tag glob (matches every tagged subnet)
pub const DEFAULT_FILTER: &str = "*";

/// Default poll period
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Exporter settings, loaded from YAML and overridden from the command line
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    /// TCP port for `/metrics` and `/healthz`
    pub port: u16,
    pub region: String,
    /// Glob matched against the subnet `Name` tag by the EC2 API
    pub filter: String,
    #[serde(with = "humantime_serde")]
    pub period: Duration,
    pub debug: bool,
}

impl ExporterConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidServer(
                "port must be between 1 and 65535".to_string(),
            ));
        }

        if self.region.trim().is_empty() {
            return Err(ValidationError::InvalidInventory(
                "region cannot be empty".to_string(),
            ));
        }

        if self.filter.is_empty() {
            return Err(ValidationError::InvalidInventory(
                "filter cannot be empty; use \"*\" to match every Name tag".to_string(),
            ));
        }

        if self.period.is_zero() {
            return Err(ValidationError::InvalidPoller(
                "period must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log filter matching the `debug` switch
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            region: DEFAULT_REGION.to_string(),
            filter: DEFAULT_FILTER.to_string(),
            period: DEFAULT_PERIOD,
            debug: false,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),
    #[error("Invalid inventory configuration: {0}")]
    InvalidInventory(String),
    #[error("Invalid poller configuration: {0}")]
    InvalidPoller(String),
}
