//! A minimal executor over a finalized schema graph.
//!
//! Selections are resolved depth-first in selection order with the graph's
//! resolvers (middleware included). Resolver failures become field errors
//! with a null value; cancellation and depth violations abort the request.

use crate::document::{Operation, Selection};
use crate::error::{ExecutionError, ExecutionResult};
use crate::pool::{ContextPool, PoolConfig, Poolable};
use crate::result::{FieldError, QueryResult};
use crate::validation::DocumentValidator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};
use weave_core::{CancellationSignal, ConfigurationError};
use weave_schema::resolver::PathSegment;
use weave_schema::{
    FieldDefinition, ResolverArgs, ResolverContext, ResolverError, ResolverInfo, SchemaGraph,
    TypeRef,
};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutorConfig {
    /// Maximum selection depth of an operation.
    pub max_depth: usize,
    /// Execution context pool.
    pub pool: PoolConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            pool: PoolConfig::default(),
        }
    }
}

impl ExecutorConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_pool_config(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_depth == 0 {
            return Err(ConfigurationError::OutOfRange {
                what: "max depth",
                min: 1,
                actual: 0,
            });
        }
        self.pool.validate()
    }
}

/// Per-request execution state, pooled between requests.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    errors: Vec<FieldError>,
    resolved_fields: usize,
    deepest: usize,
}

impl ExecutionContext {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Number of resolver invocations so far.
    pub fn resolved_fields(&self) -> usize {
        self.resolved_fields
    }

    pub fn deepest(&self) -> usize {
        self.deepest
    }

    fn error(&mut self, message: impl Into<String>, path: Vec<PathSegment>) {
        self.errors.push(FieldError::new(message).with_path(path));
    }
}

impl Poolable for ExecutionContext {
    fn reset(&mut self) {
        self.errors.clear();
        self.resolved_fields = 0;
        self.deepest = 0;
    }
}

/// Executes operations against one schema graph.
pub struct Executor {
    schema: Arc<SchemaGraph>,
    config: ExecutorConfig,
    pool: ContextPool<ExecutionContext>,
    validator: Option<Arc<DocumentValidator>>,
}

impl Executor {
    pub fn new(schema: Arc<SchemaGraph>) -> Result<Self, ConfigurationError> {
        Self::with_config(schema, ExecutorConfig::default())
    }

    pub fn with_config(
        schema: Arc<SchemaGraph>,
        config: ExecutorConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            schema,
            config,
            pool: ContextPool::new(config.pool, ExecutionContext::default)?,
            validator: None,
        })
    }

    /// Validates every operation before executing it.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<DocumentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn schema(&self) -> &SchemaGraph {
        &self.schema
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn pool(&self) -> &ContextPool<ExecutionContext> {
        &self.pool
    }

    /// Executes `operation`. The returned result holds its execution context
    /// until it is released or dropped; every error path returns it at once.
    pub async fn execute(
        &self,
        operation: &Operation,
        signal: &CancellationSignal,
    ) -> ExecutionResult<QueryResult> {
        if let Some(validator) = &self.validator {
            validator.validate(&self.schema, operation).await?;
        }

        let depth = operation.depth();
        if depth > self.config.max_depth {
            return Err(ExecutionError::DepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }

        let Some(root) = self.schema.root_type(operation.kind) else {
            return Err(ExecutionError::MissingRootType(operation.kind));
        };

        let mut lease = self.pool.acquire().await?;
        let run = Run {
            schema: &self.schema,
            signal,
            resolver_context: self.schema.resolver_context().with_cancellation(signal.clone()),
        };
        let root_value = Value::Object(Map::new());
        let data = run
            .select(&mut lease, root.name(), &root_value, &operation.selections, Vec::new(), 1)
            .await?;

        let errors = std::mem::take(&mut lease.errors);
        info!(
            operation = operation.name.as_deref().unwrap_or("<anonymous>"),
            fields = lease.resolved_fields(),
            errors = errors.len(),
            "operation executed"
        );
        Ok(QueryResult::leased(data, errors, lease))
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

struct Run<'a> {
    schema: &'a SchemaGraph,
    signal: &'a CancellationSignal,
    resolver_context: ResolverContext,
}

impl<'a> Run<'a> {
    fn select<'b>(
        &'b self,
        ctx: &'b mut ExecutionContext,
        type_name: &'b str,
        parent: &'b Value,
        selections: &'b [Selection],
        path: Vec<PathSegment>,
        depth: usize,
    ) -> BoxFuture<'b, ExecutionResult<IndexMap<String, Value>>> {
        Box::pin(async move {
            ctx.deepest = ctx.deepest.max(depth);
            let mut out = IndexMap::with_capacity(selections.len());

            for selection in selections {
                if self.signal.is_cancelled() {
                    debug!(type_name, "execution cancelled");
                    return Err(ExecutionError::Cancelled);
                }

                let key = selection.response_key().to_string();
                let mut field_path = path.clone();
                field_path.push(PathSegment::Field(key.clone()));

                if selection.name == "__typename" {
                    out.insert(key, Value::String(type_name.to_string()));
                    continue;
                }

                let field = self
                    .schema
                    .get_type(type_name)
                    .and_then(|ty| ty.field(&selection.name));
                let Some(field) = field else {
                    ctx.error(
                        format!("`{type_name}` has no field `{}`", selection.name),
                        field_path,
                    );
                    out.insert(key, Value::Null);
                    continue;
                };

                let value = self
                    .resolve(ctx, type_name, field, selection, parent, field_path.clone())
                    .await?;
                let completed = self
                    .complete(ctx, &field.ty, value, &selection.selections, field_path, depth + 1)
                    .await?;
                out.insert(key, completed);
            }
            Ok(out)
        })
    }

    async fn resolve(
        &self,
        ctx: &mut ExecutionContext,
        type_name: &str,
        field: &FieldDefinition,
        selection: &Selection,
        parent: &Value,
        path: Vec<PathSegment>,
    ) -> ExecutionResult<Value> {
        let mut args = ResolverArgs::new();
        for (name, argument) in &field.arguments {
            if let Some(default) = &argument.default_value {
                args.set(name.clone(), default.clone());
            }
        }
        for (name, value) in &selection.arguments {
            args.set(name.clone(), value.clone());
        }

        let info = ResolverInfo::new(field.name.as_str(), type_name)
            .with_return_type(field.ty.to_string())
            .with_source_member(field.source_member())
            .with_path(path.clone());
        let resolver = self.schema.resolver(type_name, &field.name);
        ctx.resolved_fields += 1;

        match resolver.resolve(parent, &args, &self.resolver_context, &info).await {
            Ok(value) => Ok(value),
            Err(ResolverError::Cancelled) => Err(ExecutionError::Cancelled),
            Err(err) => {
                ctx.error(err.to_string(), path);
                Ok(Value::Null)
            }
        }
    }

    fn complete<'b>(
        &'b self,
        ctx: &'b mut ExecutionContext,
        ty: &'b TypeRef,
        value: Value,
        selections: &'b [Selection],
        path: Vec<PathSegment>,
        depth: usize,
    ) -> BoxFuture<'b, ExecutionResult<Value>> {
        Box::pin(async move {
            if value.is_null() {
                if ty.is_non_null() {
                    ctx.error("non-null field resolved to null", path);
                }
                return Ok(Value::Null);
            }

            if let (TypeRef::List(inner), Value::Array(items)) = (ty.nullable(), &value) {
                let mut completed = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut item_path = path.clone();
                    item_path.push(PathSegment::Index(index));
                    let item = self
                        .complete(ctx, inner, item.clone(), selections, item_path, depth)
                        .await?;
                    completed.push(item);
                }
                return Ok(Value::Array(completed));
            }

            if selections.is_empty() {
                return Ok(value);
            }

            let named = ty.named_type();
            let concrete = match self.schema.get_type(named) {
                Some(ty) if ty.kind().is_abstract() => self
                    .schema
                    .resolve_abstract_type(named, &value)
                    .map(|ty| ty.name().to_string()),
                Some(ty) => Some(ty.name().to_string()),
                None => None,
            };
            let Some(concrete) = concrete else {
                ctx.error(format!("cannot determine the object type of `{named}`"), path);
                return Ok(Value::Null);
            };

            let object = self
                .select(ctx, &concrete, &value, selections, path, depth)
                .await?;
            Ok(Value::Object(object.into_iter().collect()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.pool.capacity, 8);
        assert!(config.with_max_depth(0).validate().is_err());
    }

    #[test]
    fn test_context_reset() {
        let mut ctx = ExecutionContext::default();
        ctx.error("boom", Vec::new());
        ctx.resolved_fields = 3;
        ctx.reset();

        assert!(ctx.errors().is_empty());
        assert_eq!(ctx.resolved_fields(), 0);
    }
}
