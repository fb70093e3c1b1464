//! Query results.

use crate::executor::ExecutionContext;
use crate::pool::PooledContext;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::trace;
use weave_schema::resolver::PathSegment;

/// An error attached to one field of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extensions: IndexMap<String, Value>,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The read-only output of one executed operation.
///
/// While the result is alive it holds the execution context it was computed
/// with. [`QueryResult::release`] hands that context back to its pool;
/// dropping the result does the same. Releasing twice is a no-op.
pub struct QueryResult {
    data: Option<IndexMap<String, Value>>,
    errors: Vec<FieldError>,
    extensions: IndexMap<String, Value>,
    lease: Option<PooledContext<ExecutionContext>>,
}

impl QueryResult {
    /// Creates a result that holds no pooled context.
    pub fn new(data: Option<IndexMap<String, Value>>, errors: Vec<FieldError>) -> Self {
        Self {
            data,
            errors,
            extensions: IndexMap::new(),
            lease: None,
        }
    }

    pub(crate) fn leased(
        data: IndexMap<String, Value>,
        errors: Vec<FieldError>,
        lease: PooledContext<ExecutionContext>,
    ) -> Self {
        Self {
            data: Some(data),
            errors,
            extensions: IndexMap::new(),
            lease: Some(lease),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// The computed data, keyed by response key.
    pub fn data(&self) -> Option<&IndexMap<String, Value>> {
        self.data.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.as_ref()?.get(key)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extensions(&self) -> &IndexMap<String, Value> {
        &self.extensions
    }

    /// Returns a response-shaped snapshot: `data`, then `errors` and
    /// `extensions` when present.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let data = match &self.data {
            Some(data) => Value::Object(data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            None => Value::Null,
        };
        map.insert("data".to_string(), data);
        if !self.errors.is_empty() {
            let errors = self
                .errors
                .iter()
                .map(|error| serde_json::to_value(error).unwrap_or(Value::Null))
                .collect();
            map.insert("errors".to_string(), Value::Array(errors));
        }
        if !self.extensions.is_empty() {
            let extensions = self
                .extensions
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            map.insert("extensions".to_string(), Value::Object(extensions));
        }
        map
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Returns the pooled context. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.lease.take() {
            Some(lease) => {
                lease.release();
                trace!("query result released its context");
                true
            }
            None => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.lease.is_none()
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("data", &self.data)
            .field("errors", &self.errors)
            .field("extensions", &self.extensions)
            .field("released", &self.is_released())
            .finish()
    }
}
