//! Request-bound predicates.

use crate::convention::ComparisonKind;
use crate::error::RuntimeFilterError;
use serde_json::Value;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use weave_core::{CancellationSignal, MemberAccess};

/// One member comparison with its bound literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub member: String,
    pub kind: ComparisonKind,
    pub negated: bool,
    pub value: Value,
}

impl Comparison {
    /// Evaluates the comparison against a member value; a missing member is null.
    #[must_use]
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        let actual = actual.unwrap_or(&Value::Null);
        let literal = &self.value;
        let result = match self.kind {
            ComparisonKind::Equals => values_equal(actual, literal),
            ComparisonKind::In => literal
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(actual, item))),
            ComparisonKind::Contains => strings(actual, literal).is_some_and(|(a, b)| a.contains(b)),
            ComparisonKind::StartsWith => {
                strings(actual, literal).is_some_and(|(a, b)| a.starts_with(b))
            }
            ComparisonKind::EndsWith => strings(actual, literal).is_some_and(|(a, b)| a.ends_with(b)),
            ComparisonKind::GreaterThan => compare(actual, literal) == Some(Ordering::Greater),
            ComparisonKind::GreaterThanOrEquals => {
                matches!(compare(actual, literal), Some(Ordering::Greater | Ordering::Equal))
            }
            ComparisonKind::LowerThan => compare(actual, literal) == Some(Ordering::Less),
            ComparisonKind::LowerThanOrEquals => {
                matches!(compare(actual, literal), Some(Ordering::Less | Ordering::Equal))
            }
        };
        result != self.negated
    }
}

/// A node of a bound predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    And(Vec<PredicateNode>),
    Or(Vec<PredicateNode>),
    Not(Box<PredicateNode>),
    Compare(Comparison),
}

impl PredicateNode {
    /// The predicate that accepts everything.
    #[must_use]
    pub fn always() -> Self {
        Self::And(Vec::new())
    }

    pub fn evaluate<E: MemberAccess + ?Sized>(&self, element: &E) -> bool {
        match self {
            Self::And(nodes) => nodes.iter().all(|node| node.evaluate(element)),
            Self::Or(nodes) => nodes.iter().any(|node| node.evaluate(element)),
            Self::Not(node) => !node.evaluate(element),
            Self::Compare(comparison) => {
                comparison.matches(element.member_value(&comparison.member).as_ref())
            }
        }
    }

    /// Number of comparisons in the tree.
    #[must_use]
    pub fn comparison_count(&self) -> usize {
        match self {
            Self::And(nodes) | Self::Or(nodes) => nodes.iter().map(Self::comparison_count).sum(),
            Self::Not(node) => node.comparison_count(),
            Self::Compare(_) => 1,
        }
    }
}

/// A predicate over elements of type `T`, bound to one request's literals.
pub struct Predicate<T> {
    root: PredicateNode,
    _marker: PhantomData<fn(&T) -> bool>,
}

impl<T> Predicate<T> {
    pub(crate) fn new(root: PredicateNode) -> Self {
        Self {
            root,
            _marker: PhantomData,
        }
    }

    pub fn root(&self) -> &PredicateNode {
        &self.root
    }

    pub fn into_root(self) -> PredicateNode {
        self.root
    }
}

impl<T: MemberAccess> Predicate<T> {
    pub fn matches(&self, element: &T) -> bool {
        self.root.evaluate(element)
    }

    /// Keeps the elements of `source` that match, checking `signal` before each.
    pub fn filter<I>(
        &self,
        source: I,
        signal: &CancellationSignal,
    ) -> Result<Vec<I::Item>, RuntimeFilterError>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut matched = Vec::new();
        for element in source {
            if signal.is_cancelled() {
                return Err(RuntimeFilterError::Cancelled);
            }
            if self.matches(element.borrow()) {
                matched.push(element);
            }
        }
        Ok(matched)
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self::new(self.root.clone())
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.root).finish()
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => left == right,
    }
}

fn strings<'v>(actual: &'v Value, literal: &'v Value) -> Option<(&'v str, &'v str)> {
    Some((actual.as_str()?, literal.as_str()?))
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
