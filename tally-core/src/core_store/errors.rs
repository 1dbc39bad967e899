//! Error types for store operations

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur talking to the key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection-level failure (refused, reset, unreachable)
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation exceeded the configured socket timeout
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The peer answered with bytes that are not a valid reply frame
    #[error("store protocol error: {0}")]
    Protocol(String),

    /// The store itself rejected the command
    #[error("store server error: {0}")]
    Server(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
