//! Errors raised while validating input at the calculation boundary

use thiserror::Error;

/// Input rejected before it reaches the calculation layer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be a whole number")]
    Fractional { field: &'static str },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} is out of range")]
    OutOfRange { field: &'static str },

    #[error("Invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

impl InputError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            InputError::Negative { field }
            | InputError::Fractional { field }
            | InputError::NotFinite { field }
            | InputError::OutOfRange { field }
            | InputError::Invalid { field, .. } => field,
        }
    }
}
