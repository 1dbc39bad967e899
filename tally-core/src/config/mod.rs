//! Configuration management for the scoring service
//!
//! Environment-based configuration with support for defaults, TOML files,
//! and validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Key-value store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
}

/// Key-value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store host
    pub host: String,

    /// Store port
    pub port: u16,

    /// Database index selected after connecting
    pub db: u32,

    /// Connect and per-operation socket timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Attempts per logical operation
    pub retries: u32,

    /// Fixed sleep between attempts
    #[serde(with = "humantime_serde")]
    pub retry_backoff: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Log file path (optional, stdout otherwise)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            timeout: Duration::from_secs(1),
            retries: 3,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            log_file: None,
        }
    }
}

impl StoreConfig {
    /// Dial address in `host:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: TALLY_<SECTION>_<KEY>
    /// Example: TALLY_SERVER_BIND_ADDRESS=0.0.0.0:8080
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server config
        if let Ok(addr) = env::var("TALLY_SERVER_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid bind address: {}", e)))?;
        }

        // Store config
        if let Ok(host) = env::var("TALLY_STORE_HOST") {
            config.store.host = host;
        }
        if let Ok(port) = env::var("TALLY_STORE_PORT") {
            config.store.port = port
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid store port: {}", e)))?;
        }
        if let Ok(db) = env::var("TALLY_STORE_DB") {
            config.store.db = db
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid store db: {}", e)))?;
        }
        if let Ok(retries) = env::var("TALLY_STORE_RETRIES") {
            config.store.retries = retries
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid store retries: {}", e)))?;
        }

        // Logging config
        if let Ok(level) = env::var("TALLY_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("TALLY_LOG_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid JSON flag: {}", e)))?;
        }
        if let Ok(log_file) = env::var("TALLY_LOG_FILE") {
            config.logging.log_file = Some(PathBuf::from(log_file));
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate store config
        if self.store.host.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "store host must not be empty".to_string(),
            ));
        }

        if self.store.retries == 0 {
            return Err(ConfigError::ValidationFailed(
                "store retries must be greater than 0".to_string(),
            ));
        }

        if self.store.timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "store timeout must be greater than 0".to_string(),
            ));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }
}
