use crate::services::key_lifecycle::{
    KeyLifecycleConfig, DEFAULT_ACTIVE_TTL_SECS, DEFAULT_EXPIRED_OFFSET_SECS,
    DEFAULT_SWEEP_INTERVAL_MS,
};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub active_ttl_secs: i64,
    pub expired_offset_secs: i64,
    pub sweep_interval_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidVar { var: String, message: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let active_ttl_secs = parse_var(vars, "ACTIVE_KEY_TTL_SECS", DEFAULT_ACTIVE_TTL_SECS)?;
        let expired_offset_secs =
            parse_var(vars, "EXPIRED_KEY_OFFSET_SECS", DEFAULT_EXPIRED_OFFSET_SECS)?;
        let sweep_interval_ms = parse_var(vars, "SWEEP_INTERVAL_MS", DEFAULT_SWEEP_INTERVAL_MS)?;

        if active_ttl_secs <= 0 {
            return Err(ConfigError::InvalidVar {
                var: "ACTIVE_KEY_TTL_SECS".to_string(),
                message: format!("must be positive, got {}", active_ttl_secs),
            });
        }

        if sweep_interval_ms == 0 {
            return Err(ConfigError::InvalidVar {
                var: "SWEEP_INTERVAL_MS".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        Ok(Config {
            bind_address,
            active_ttl_secs,
            expired_offset_secs,
            sweep_interval_ms,
        })
    }

    /// Lifecycle configuration slice consumed by the key manager.
    #[must_use]
    pub fn key_lifecycle(&self) -> KeyLifecycleConfig {
        KeyLifecycleConfig::default()
            .with_active_ttl_secs(self.active_ttl_secs)
            .with_expired_offset_secs(self.expired_offset_secs)
            .with_sweep_interval(Duration::from_millis(self.sweep_interval_ms))
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            var: name.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
