//! Filter descriptor compiler for weave.
//!
//! A [`FilterInputBuilder`] records the declared fields, operations, ignore
//! set and binding behavior of a filter input. Compiling it produces an
//! immutable [`CompiledFilter`] that binds request expressions to
//! [`Predicate`]s and applies them to any iterable source.
//!
//! ```
//! use serde_json::{json, Value};
//! use weave_core::{CancellationSignal, ScalarKind, ShapeDescriptor};
//! use weave_filter::FilterInputBuilder;
//!
//! let shape = ShapeDescriptor::new("Person")
//!     .scalar("name", ScalarKind::String)
//!     .scalar("age", ScalarKind::Int);
//! let filter = FilterInputBuilder::<Value>::for_shape(shape).compile().unwrap();
//!
//! let people = vec![
//!     json!({"name": "Alice", "age": 30}),
//!     json!({"name": "Bob", "age": 17}),
//! ];
//! let adults = filter
//!     .apply(&people, &json!({"age": {"gte": 18}}), &CancellationSignal::never())
//!     .unwrap();
//! assert_eq!(adults, [&people[0]]);
//! ```

pub mod builder;
pub mod compiled;
mod compiler;
pub mod convention;
pub mod definition;
pub mod error;
mod expression;
pub mod predicate;
pub mod schema;

pub use builder::{FilterDirective, FilterInputBuilder};
pub use compiled::{CompiledField, CompiledFilter, CompiledOperation};
pub use convention::{
    filter_convention, ops, Combinator, ComparisonKind, DefaultFilterConvention, FilterConvention,
    OperationInfo, OperationSemantic,
};
pub use definition::{FilterFieldDefinition, FilterInputDefinition, FilterOperationDefinition};
pub use error::{CompilationError, CompilationResult, FilterError, FilterResult, RuntimeFilterError};
pub use predicate::{Comparison, Predicate, PredicateNode};
pub use schema::FilterTypeSet;
