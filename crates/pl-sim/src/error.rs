//! Error types for simulation operations.

use pl_controls::ControlError;
use pl_core::CoreError;
use thiserror::Error;

/// Configuration rejected before any tick executed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Field(#[from] CoreError),

    #[error(
        "Invalid configuration: total_time / time_step gives {ticks} ticks, above the limit of {limit}"
    )]
    TooManyTicks { ticks: f64, limit: usize },
}

impl ConfigError {
    /// Name of the offending configuration field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::Field(e) => e.field(),
            ConfigError::TooManyTicks { .. } => "total_time",
        }
    }
}

/// Errors encountered while setting up or driving a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Engine state error: {what}")]
    State { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::Config(ConfigError::Field(e))
    }
}

impl From<ControlError> for ConfigError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::InvalidParameter(inner) => ConfigError::Field(inner),
        }
    }
}
