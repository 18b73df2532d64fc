//! Configuration error types.

use thiserror::Error;

/// Service configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Credentials document error.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credentials: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write credentials: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to parse credentials: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("credentials not configured: {0}")]
    Missing(String),
}
