//! Request operations as selection trees.
//!
//! Parsing a query language is left to the transport layer; operations
//! arrive already shaped as a tree of field selections.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use weave_schema::RootKind;

/// A field selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<Selection>,
}

impl Selection {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: IndexMap::new(),
            selections: Vec::new(),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn select(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    /// The key this selection occupies in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Depth of the deepest selection below and including this one.
    pub fn depth(&self) -> usize {
        1 + self.selections.iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// One executable operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: RootKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

impl Operation {
    pub fn query() -> Self {
        Self::new(RootKind::Query)
    }

    pub fn mutation() -> Self {
        Self::new(RootKind::Mutation)
    }

    pub fn new(kind: RootKind) -> Self {
        Self {
            kind,
            name: None,
            selections: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn select(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    pub fn depth(&self) -> usize {
        self.selections.iter().map(Selection::depth).max().unwrap_or(0)
    }
}
