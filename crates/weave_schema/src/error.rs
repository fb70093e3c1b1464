//! Schema build errors.

use thiserror::Error;
use weave_core::{ConfigurationError, DiagnosticBag};

/// Error produced while registering declarations or creating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A registration call received invalid input.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Binding and graph validation violations, all of them.
    #[error("schema build failed with {count} violation(s):\n{0}", count = .0.error_count())]
    Build(DiagnosticBag),

    /// An interceptor produced an invalid mutation.
    #[error("interceptor `{interceptor}` failed on type `{type_name}`: {reason}")]
    Interceptor {
        interceptor: String,
        type_name: String,
        reason: String,
    },

    /// An interceptor factory failed.
    #[error("interceptor `{interceptor}` could not be created: {reason}")]
    InterceptorInstantiation { interceptor: String, reason: String },

    /// A deferred document loader failed.
    #[error("schema document could not be loaded: {reason}")]
    Document { reason: String },
}

impl SchemaError {
    /// Returns the collected violations of a failed build.
    pub fn diagnostics(&self) -> Option<&DiagnosticBag> {
        match self {
            Self::Build(bag) => Some(bag),
            _ => None,
        }
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
