//! Error types for the logging subsystem

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the logging subsystem
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to initialize the logging system
    #[error("failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// The configured log file could not be opened
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
