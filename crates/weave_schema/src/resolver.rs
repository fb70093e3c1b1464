//! Field resolvers and field middleware.

use crate::convention::to_snake_case;
use crate::services::ServiceScope;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use weave_core::{CancellationSignal, MemberAccess};

/// Arguments passed to a resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolverArgs {
    args: HashMap<String, Value>,
}

impl ResolverArgs {
    /// Creates new resolver args.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates resolver args from a list of (name, value) pairs.
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self {
            args: pairs.into_iter().collect(),
        }
    }

    /// Gets an argument by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Gets an argument as a specific type.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.args
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Gets a required argument, returning an error if not found.
    pub fn require<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, ResolverError> {
        self.args
            .get(name)
            .ok_or_else(|| ResolverError::MissingArgument(name.to_string()))
            .and_then(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| ResolverError::ArgumentParse(name.to_string(), e.to_string()))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Sets an argument.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.args.insert(name.into(), value);
    }
}

/// A segment of a response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Info about the field being resolved.
#[derive(Debug, Clone)]
pub struct ResolverInfo {
    /// The field name being resolved.
    pub field_name: String,

    /// The parent type name.
    pub parent_type: String,

    /// The return type, as written in SDL.
    pub return_type: String,

    /// The external member the field reads from.
    pub source_member: String,

    /// Path to this field.
    pub path: Vec<PathSegment>,
}

impl ResolverInfo {
    /// Creates new resolver info.
    pub fn new(field_name: impl Into<String>, parent_type: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            source_member: field_name.clone(),
            field_name,
            parent_type: parent_type.into(),
            return_type: String::new(),
            path: Vec::new(),
        }
    }

    /// Sets the return type.
    #[must_use]
    pub fn with_return_type(mut self, ty: impl Into<String>) -> Self {
        self.return_type = ty.into();
        self
    }

    /// Sets the external member.
    #[must_use]
    pub fn with_source_member(mut self, member: impl Into<String>) -> Self {
        self.source_member = member.into();
        self
    }

    /// Sets the path.
    #[must_use]
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }
}

/// Request-scoped state handed to resolvers.
#[derive(Debug, Clone, Default)]
pub struct ResolverContext {
    /// Services registered on the schema builder.
    pub services: ServiceScope,
    /// Context data captured when the schema was created.
    pub context_data: Arc<IndexMap<String, Value>>,
    /// Fires when the request is cancelled.
    pub cancellation: CancellationSignal,
}

impl ResolverContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = signal;
        self
    }
}

/// Result type for resolvers.
pub type ResolverResult = Result<Value, ResolverError>;

/// Future type for resolvers.
pub type ResolverFuture<'a> = Pin<Box<dyn Future<Output = ResolverResult> + Send + 'a>>;

/// Error from a resolver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolverError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("failed to parse argument '{0}': {1}")]
    ArgumentParse(String, String),

    #[error("null value for non-nullable field: {0}")]
    NullValue(String),

    #[error("resolution was cancelled")]
    Cancelled,

    #[error("{0}")]
    Custom(String),
}

/// Trait for field resolvers.
pub trait Resolver: Send + Sync {
    /// Resolves a field value.
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: &'a ResolverArgs,
        ctx: &'a ResolverContext,
        info: &'a ResolverInfo,
    ) -> ResolverFuture<'a>;
}

/// A sync resolver function.
pub type SyncResolverFn = Arc<
    dyn Fn(&Value, &ResolverArgs, &ResolverContext, &ResolverInfo) -> ResolverResult + Send + Sync,
>;

/// A wrapper for sync resolver functions.
pub struct FnResolver {
    func: SyncResolverFn,
}

impl FnResolver {
    /// Creates a new function resolver.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &ResolverArgs, &ResolverContext, &ResolverInfo) -> ResolverResult
            + Send
            + Sync
            + 'static,
    {
        Self { func: Arc::new(f) }
    }
}

impl Resolver for FnResolver {
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: &'a ResolverArgs,
        ctx: &'a ResolverContext,
        info: &'a ResolverInfo,
    ) -> ResolverFuture<'a> {
        let result = (self.func)(parent, args, ctx, info);
        Box::pin(async move { result })
    }
}

/// Reads the field's source member from the parent value.
pub struct DefaultResolver;

impl Resolver for DefaultResolver {
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        _args: &'a ResolverArgs,
        _ctx: &'a ResolverContext,
        info: &'a ResolverInfo,
    ) -> ResolverFuture<'a> {
        let result = match parent {
            Value::Object(_) => Ok(parent
                .member_value(&info.source_member)
                .or_else(|| parent.member_value(&to_snake_case(&info.field_name)))
                .unwrap_or(Value::Null)),
            Value::Null => Ok(Value::Null),
            _ => Err(ResolverError::FieldNotFound(info.field_name.clone())),
        };
        Box::pin(async move { result })
    }
}

/// Wraps every field resolver of a schema.
///
/// Middleware registered first runs outermost.
pub trait FieldMiddleware: Send + Sync {
    fn call<'a>(
        &'a self,
        next: &'a dyn Resolver,
        parent: &'a Value,
        args: &'a ResolverArgs,
        ctx: &'a ResolverContext,
        info: &'a ResolverInfo,
    ) -> ResolverFuture<'a>;
}

struct MiddlewareResolver {
    middleware: Arc<dyn FieldMiddleware>,
    next: Arc<dyn Resolver>,
}

impl Resolver for MiddlewareResolver {
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: &'a ResolverArgs,
        ctx: &'a ResolverContext,
        info: &'a ResolverInfo,
    ) -> ResolverFuture<'a> {
        self.middleware
            .call(self.next.as_ref(), parent, args, ctx, info)
    }
}

fn wrap(resolver: Arc<dyn Resolver>, middleware: &[Arc<dyn FieldMiddleware>]) -> Arc<dyn Resolver> {
    middleware.iter().rev().fold(resolver, |next, middleware| {
        Arc::new(MiddlewareResolver {
            middleware: Arc::clone(middleware),
            next,
        })
    })
}

/// Resolvers of a finalized schema, indexed by type and field.
pub struct ResolverMap {
    resolvers: FxHashMap<(String, String), Arc<dyn Resolver>>,
    default_resolver: Arc<dyn Resolver>,
}

impl Default for ResolverMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverMap {
    /// Creates a map that falls back to [`DefaultResolver`].
    pub fn new() -> Self {
        Self {
            resolvers: FxHashMap::default(),
            default_resolver: Arc::new(DefaultResolver),
        }
    }

    pub(crate) fn build(
        registered: Vec<(String, String, Arc<dyn Resolver>)>,
        middleware: &[Arc<dyn FieldMiddleware>],
    ) -> Self {
        let resolvers = registered
            .into_iter()
            .map(|(ty, field, resolver)| ((ty, field), wrap(resolver, middleware)))
            .collect();
        Self {
            resolvers,
            default_resolver: wrap(Arc::new(DefaultResolver), middleware),
        }
    }

    /// Returns the resolver for a field, or the default resolver.
    pub fn get(&self, type_name: &str, field_name: &str) -> Arc<dyn Resolver> {
        self.resolvers
            .get(&(type_name.to_string(), field_name.to_string()))
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_resolver))
    }

    /// Returns true if a resolver was registered for the field.
    pub fn has_resolver(&self, type_name: &str, field_name: &str) -> bool {
        self.resolvers
            .contains_key(&(type_name.to_string(), field_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverMap")
            .field("resolver_count", &self.resolvers.len())
            .finish()
    }
}
