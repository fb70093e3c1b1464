//! Compiled filters.

use crate::convention::OperationInfo;
use crate::error::{FilterResult, RuntimeFilterError};
use crate::expression;
use crate::predicate::Predicate;
use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use weave_core::{CancellationSignal, MemberAccess, ScalarKind};
use weave_schema::DirectiveInstance;

/// A field of a compiled filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledField {
    pub(crate) name: String,
    pub(crate) member: String,
    pub(crate) operand: ScalarKind,
    pub(crate) nullable: bool,
    pub(crate) description: Option<String>,
    pub(crate) directives: Vec<DirectiveInstance>,
    pub(crate) operations: IndexMap<String, OperationInfo>,
    pub(crate) input_type: String,
}

impl CompiledField {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted member path read from each element.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn operand(&self) -> ScalarKind {
        self.operand
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn directives(&self) -> &[DirectiveInstance] {
        &self.directives
    }

    pub fn operation(&self, name: &str) -> Option<&OperationInfo> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationInfo> {
        self.operations.values()
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Name of the input type holding this field's operations.
    pub fn input_type(&self) -> &str {
        &self.input_type
    }
}

/// A type-level operation of a compiled filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOperation {
    pub(crate) info: OperationInfo,
    pub(crate) description: Option<String>,
    pub(crate) directives: Vec<DirectiveInstance>,
}

impl CompiledOperation {
    pub fn info(&self) -> &OperationInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn directives(&self) -> &[DirectiveInstance] {
        &self.directives
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct FilterPlan {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) directives: Vec<DirectiveInstance>,
    pub(crate) fields: IndexMap<String, CompiledField>,
    pub(crate) operations: IndexMap<String, CompiledOperation>,
}

/// The immutable product of compiling a filter input definition.
///
/// Cloning is cheap and clones share the plan. Binding and applying request
/// expressions never mutate it, so one compiled filter serves any number of
/// concurrent requests.
pub struct CompiledFilter<T> {
    plan: Arc<FilterPlan>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CompiledFilter<T> {
    pub(crate) fn from_plan(plan: FilterPlan) -> Self {
        Self {
            plan: Arc::new(plan),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.plan.name
    }

    pub fn description(&self) -> Option<&str> {
        self.plan.description.as_deref()
    }

    pub fn directives(&self) -> &[DirectiveInstance] {
        &self.plan.directives
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.plan.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.plan.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.plan.fields.keys().map(String::as_str)
    }

    pub fn operation(&self, name: &str) -> Option<&CompiledOperation> {
        self.plan.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &CompiledOperation> {
        self.plan.operations.values()
    }

    /// Returns true if a request may constrain `name`.
    pub fn accepts(&self, name: &str) -> bool {
        self.plan.fields.contains_key(name) || self.plan.operations.contains_key(name)
    }

    /// Binds a request expression to a predicate.
    ///
    /// Names outside the accepted set fail with a compilation error, operand
    /// mismatches with a runtime error.
    pub fn bind(&self, expression: &Value) -> FilterResult<Predicate<T>> {
        let root = expression::bind(&self.plan, expression)?;
        Ok(Predicate::new(root))
    }

    /// Binds `expression` and keeps the elements of `source` that satisfy it.
    ///
    /// The signal is checked before each element.
    pub fn apply<I>(
        &self,
        source: I,
        expression: &Value,
        signal: &CancellationSignal,
    ) -> FilterResult<Vec<I::Item>>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
        T: MemberAccess,
    {
        let predicate = self.bind(expression)?;
        let matched = predicate.filter(source, signal)?;
        Ok(matched)
    }

    /// Counts the elements that satisfy `expression`.
    pub fn count<'s, I>(
        &self,
        source: I,
        expression: &Value,
        signal: &CancellationSignal,
    ) -> FilterResult<usize>
    where
        I: IntoIterator<Item = &'s T>,
        T: MemberAccess + 's,
    {
        let predicate = self.bind(expression)?;
        let mut count = 0;
        for element in source {
            if signal.is_cancelled() {
                return Err(RuntimeFilterError::Cancelled.into());
            }
            if predicate.matches(element) {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl<T> Clone for CompiledFilter<T> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for CompiledFilter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.plan == other.plan
    }
}

impl<T> fmt::Debug for CompiledFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("name", &self.plan.name)
            .field("fields", &self.plan.fields.keys().collect::<Vec<_>>())
            .field("operations", &self.plan.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}
