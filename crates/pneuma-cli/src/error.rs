//! Error types for the pneuma host

use pneuma_kernel::KernelError;
use thiserror::Error;

/// Host-level errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern id not present in the catalog
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    /// Kernel rejected an operation
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// Trust registry could not be read or written
    #[error("Registry error: {0}")]
    Registry(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

/// Result type for host operations
pub type CliResult<T> = Result<T, CliError>;
