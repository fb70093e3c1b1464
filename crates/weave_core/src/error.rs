//! Registration-time configuration errors.

use thiserror::Error;

/// Invalid or missing registration input.
///
/// Raised synchronously by the registration call that received the input,
/// never deferred to the final build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required value was empty.
    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    /// A name does not follow the schema naming rules.
    #[error("`{name}` is not a valid name: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A numeric setting is outside its allowed range.
    #[error("{what} must be at least {min}, got {actual}")]
    OutOfRange {
        what: &'static str,
        min: usize,
        actual: usize,
    },

    /// Any other invalid input.
    #[error("{0}")]
    Invalid(String),
}

impl ConfigurationError {
    /// Creates an error for an empty value.
    pub fn empty(what: &'static str) -> Self {
        Self::Empty { what }
    }

    /// Creates a free-form configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
