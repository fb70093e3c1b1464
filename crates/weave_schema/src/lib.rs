//! Schema assembly for weave.
//!
//! Declarations are registered on a [`SchemaBuilder`] in any order and
//! resolved in four phases when [`SchemaBuilder::create`] is called:
//!
//! 1. Collection of types, extensions, directives, documents and root types
//! 2. Binding and inference of fields from bound external shapes
//! 3. Interception by registered [`TypeInterceptor`]s
//! 4. Finalization and validation into an immutable [`SchemaGraph`]

pub mod arena;
mod assembler;
pub mod binding;
pub mod builder;
pub mod context;
pub mod convention;
pub mod definition;
pub mod directive;
pub mod error;
pub mod graph;
pub mod interceptor;
pub mod options;
pub mod printer;
pub mod registry;
pub mod resolver;
pub mod services;
mod validate;
pub mod values;

pub use binding::BindingInfo;
pub use builder::SchemaBuilder;
pub use context::BuildContext;
pub use convention::{
    BindingDefaults, ConventionRegistry, DefaultNamingConvention, DefaultTypeInference,
    NamingConvention, TypeInferenceConvention,
};
pub use definition::{
    ArgumentDefinition, DefinitionError, DirectiveInstance, EnumValueDefinition, FieldDefinition,
    FieldOrigin, TypeDefinition, TypeExtension, TypeKind, TypeRef,
};
pub use directive::{DirectiveLocation, DirectiveType};
pub use error::{SchemaError, SchemaResult};
pub use graph::{NamedType, SchemaGraph};
pub use interceptor::{InterceptorError, TypeInterceptor};
pub use options::SchemaOptions;
pub use registry::{RootKind, SchemaDefinition, SchemaDocument, SchemaType};
pub use resolver::{
    DefaultResolver, FieldMiddleware, FnResolver, PathSegment, Resolver, ResolverArgs,
    ResolverContext, ResolverError, ResolverFuture, ResolverInfo, ResolverMap, ResolverResult,
};
pub use services::ServiceScope;
