//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When unset the service runs without a store and serves demo data.
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub log_level: Level,
    pub store_timeout: Duration,
    pub db_max_connections: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = match (lookup("BIND_ADDRESS"), lookup("PORT")) {
            (Some(address), _) => address,
            (None, Some(port)) => format!("0.0.0.0:{}", port),
            (None, None) => "0.0.0.0:8000".to_string(),
        };
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Document Store Settings ---
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_name = lookup("DATABASE_NAME").filter(|name| !name.trim().is_empty());

        let store_timeout_ms = parse_number::<u64, _>(&lookup, "STORE_TIMEOUT_MS", 2000)?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "STORE_TIMEOUT_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let db_max_connections = parse_number::<u32, _>(&lookup, "DB_MAX_CONNECTIONS", 5)?;

        Ok(Self {
            bind_address,
            database_url,
            database_name,
            log_level,
            store_timeout: Duration::from_millis(store_timeout_ms),
            db_max_connections,
        })
    }
}

fn parse_number<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.store_timeout, Duration::from_millis(2000));
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn port_is_used_when_no_bind_address_is_given() {
        let config = config_from(&[("PORT", "9090")]).unwrap();
        assert_eq!(config.bind_address.port(), 9090);

        let config = config_from(&[("PORT", "9090"), ("BIND_ADDRESS", "127.0.0.1:7000")]).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:7000".parse().unwrap());
    }

    #[test]
    fn blank_database_url_means_no_store() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn invalid_values_are_reported_by_variable() {
        let err = config_from(&[("STORE_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "STORE_TIMEOUT_MS"));

        let err = config_from(&[("STORE_TIMEOUT_MS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));

        let err = config_from(&[("RUST_LOG", "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "RUST_LOG"));
    }
}
