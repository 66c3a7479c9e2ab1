//! Error types for clusterconf.

use crate::facts::FactsError;
use crate::service::ServiceError;
use thiserror::Error;

/// Errors from writing the rendered config and preparing directories
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid file mode: {0}")]
    InvalidMode(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level errors surfaced to the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),

    #[error("Host facts error: {0}")]
    FactsError(#[from] FactsError),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::RenderFailed(err.to_string())
    }
}
