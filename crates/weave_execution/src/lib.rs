//! Execution support for weave.
//!
//! This crate provides the request-time side of a finalized schema graph:
//! - `pool`: Bounded pools of reusable request contexts
//! - `document`: Operations as selection trees
//! - `validation`: Rule-based operation validation
//! - `executor`: A minimal executor producing query results
//! - `result`: Read-only query results that release their pooled context

pub mod document;
pub mod error;
pub mod executor;
pub mod pool;
pub mod result;
pub mod validation;

pub use document::{Operation, Selection};
pub use error::{ExecutionError, ExecutionResult, RuleViolation, ValidationFailure};
pub use executor::{ExecutionContext, Executor, ExecutorConfig};
pub use pool::{ContextPool, PoolConfig, Poolable, PooledContext};
pub use result::{FieldError, QueryResult};
pub use validation::{
    DocumentValidator, DocumentValidatorBuilder, RuleGroup, ValidationContext, ValidationRule,
};
