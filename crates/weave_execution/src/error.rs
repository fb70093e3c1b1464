//! Execution errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use weave_core::ConfigurationError;
use weave_schema::resolver::PathSegment;
use weave_schema::RootKind;

/// A violation reported by a validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Name of the reporting rule.
    pub rule: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)?;
        if !self.path.is_empty() {
            let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
            write!(f, " at {}", path.join("."))?;
        }
        Ok(())
    }
}

/// All violations found while validating one operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationFailure {
    pub violations: Vec<RuleViolation>,
}

impl ValidationFailure {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns true if `rule` reported at least one violation.
    pub fn reported_by(&self, rule: &str) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation failed validation with {} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// An error that aborts a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("the schema has no {0} root type")]
    MissingRootType(RootKind),

    #[error("selection depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("execution was cancelled")]
    Cancelled,

    #[error("the context pool is closed")]
    PoolClosed,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
