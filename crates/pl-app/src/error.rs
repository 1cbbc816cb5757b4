//! Error types for the pl-app service layer.

use pl_sim::{ConfigError, SimError};
use std::path::PathBuf;

/// Application error type that wraps errors from the simulation crates and
/// file handling, giving frontends one error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for pl-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Config(e) => AppError::Config(e),
            other => AppError::Simulation(other.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}
