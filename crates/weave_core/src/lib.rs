//! Core utilities for weave.
//!
//! This crate provides foundational types used throughout weave:
//! - `name`: Validated schema names
//! - `coordinate`: Schema coordinates used to locate violations
//! - `diagnostics`: Violation reporting
//! - `shape`: External data-shape descriptors and member access
//! - `cancel`: Request-scoped cancellation signals
//! - `error`: Registration-time configuration errors

pub mod cancel;
pub mod coordinate;
pub mod diagnostics;
pub mod error;
pub mod name;
pub mod shape;

pub use cancel::{CancellationSignal, CancellationSource};
pub use coordinate::SchemaCoordinate;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCategory, DiagnosticSeverity};
pub use error::ConfigurationError;
pub use name::Name;
pub use shape::{
    BindingBehavior, DataShape, Member, MemberAccess, MemberDescriptor, MemberKind, ScalarKind,
    ShapeDescriptor,
};
