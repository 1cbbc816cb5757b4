use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid value for {what}: {value} (must be {constraint})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        constraint: &'static str,
    },
}

impl CoreError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            CoreError::NonFinite { what, .. } | CoreError::OutOfRange { what, .. } => what,
        }
    }
}
