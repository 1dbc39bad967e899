//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),

    #[error("failed to write config file: {0}")]
    FileWrite(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("config validation failed: {0}")]
    ValidationFailed(String),
}
