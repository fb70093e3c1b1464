//! Filter compilation and request-time errors.

use serde_json::Value;
use thiserror::Error;
use weave_core::ConfigurationError;

/// A filter input definition that cannot be compiled.
///
/// Raised before any predicate exists. [`CompilationError::UnknownField`] and
/// [`CompilationError::UnknownOperationName`] are also raised while binding a
/// request expression that names something outside the compiled accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    #[error("operation code {code} is declared more than once")]
    DuplicateOperation { code: i32 },

    #[error("field `{name}` is declared more than once")]
    DuplicateField { name: String },

    #[error("operation code {code} is unknown to the filter convention")]
    UnknownOperation { code: i32 },

    #[error("operation `{operation}` cannot be used on {position}")]
    InvalidOperation {
        operation: String,
        position: &'static str,
    },

    #[error("`{path}` is not a member of shape `{shape}`")]
    UnknownMember { shape: String, path: String },

    #[error("member `{path}` has no scalar operand kind")]
    UnsupportedMember { path: String },

    #[error("ignored field `{name}` is neither declared nor a member of the shape")]
    UnknownIgnoreTarget { name: String },

    #[error("ignored operation code {code} is neither declared nor synthesized")]
    UnknownIgnoredOperation { code: i32 },

    #[error("filter `{filter}` has no field `{name}`")]
    UnknownField { filter: String, name: String },

    #[error("field `{field}` has no operation `{operation}`")]
    UnknownOperationName { field: String, operation: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A request-time failure. The compiled filter stays usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeFilterError {
    #[error("invalid filter expression: {reason}")]
    InvalidExpression { reason: String },

    #[error("`{field}.{operation}` expects {expected}, got {actual}")]
    OperandMismatch {
        field: String,
        operation: String,
        expected: String,
        actual: Value,
    },

    #[error("filter application was cancelled")]
    Cancelled,
}

impl RuntimeFilterError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            reason: reason.into(),
        }
    }
}

/// Any error raised while binding or applying a filter expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(transparent)]
    Runtime(#[from] RuntimeFilterError),
}

impl FilterError {
    /// Returns true if the request named a field or operation outside the accepted set.
    #[must_use]
    pub fn is_compilation(&self) -> bool {
        matches!(self, Self::Compilation(_))
    }
}

pub type CompilationResult<T> = Result<T, CompilationError>;
pub type FilterResult<T> = Result<T, FilterError>;
