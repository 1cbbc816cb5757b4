//! Error types for control system operations.

use pl_core::CoreError;
use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Gain or limit failed numeric validation.
    #[error("Invalid controller parameter: {0}")]
    InvalidParameter(#[from] CoreError),
}
