//! Binds request filter expressions to a compiled plan.
//!
//! Expressions use the filter input form:
//! `{ "name": { "eq": "Alice" }, "or": [ { ... } ], "not": { ... } }`.
//! Entries of one object are conjoined. A null or empty entry imposes no
//! constraint.

use crate::compiled::{CompiledField, FilterPlan};
use crate::convention::{Combinator, OperationInfo, OperationSemantic};
use crate::error::{CompilationError, FilterResult, RuntimeFilterError};
use crate::predicate::{Comparison, PredicateNode};
use serde_json::{Map, Value};

pub(crate) fn bind(plan: &FilterPlan, expression: &Value) -> FilterResult<PredicateNode> {
    match expression {
        Value::Null => Ok(PredicateNode::always()),
        Value::Object(entries) => bind_object(plan, entries),
        other => Err(RuntimeFilterError::invalid(format!(
            "`{}` expects an object, got {other}",
            plan.name
        ))
        .into()),
    }
}

fn bind_object(plan: &FilterPlan, entries: &Map<String, Value>) -> FilterResult<PredicateNode> {
    let mut parts = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        if let Some(operation) = plan.operations.get(key) {
            if let Some(node) = bind_combinator(plan, &operation.info, value)? {
                parts.push(node);
            }
        } else if let Some(field) = plan.fields.get(key) {
            parts.extend(bind_field(field, value)?);
        } else {
            return Err(CompilationError::UnknownField {
                filter: plan.name.clone(),
                name: key.clone(),
            }
            .into());
        }
    }
    Ok(conjoin(parts))
}

fn bind_combinator(
    plan: &FilterPlan,
    operation: &OperationInfo,
    value: &Value,
) -> FilterResult<Option<PredicateNode>> {
    let OperationSemantic::Composite(combinator) = operation.semantic else {
        return Err(RuntimeFilterError::invalid(format!(
            "`{}` is not a combinator",
            operation.name
        ))
        .into());
    };
    if value.is_null() {
        return Ok(None);
    }

    match combinator {
        Combinator::Not => Ok(Some(PredicateNode::Not(Box::new(bind(plan, value)?)))),
        Combinator::And | Combinator::Or => {
            let Some(items) = value.as_array() else {
                return Err(RuntimeFilterError::invalid(format!(
                    "`{}` expects a list of filters",
                    operation.name
                ))
                .into());
            };
            if items.is_empty() {
                return Ok(None);
            }
            let nodes = items
                .iter()
                .map(|item| bind(plan, item))
                .collect::<FilterResult<Vec<_>>>()?;
            Ok(Some(if combinator == Combinator::And {
                PredicateNode::And(nodes)
            } else {
                PredicateNode::Or(nodes)
            }))
        }
    }
}

fn bind_field(field: &CompiledField, value: &Value) -> FilterResult<Vec<PredicateNode>> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(entries) => entries,
        other => {
            return Err(RuntimeFilterError::invalid(format!(
                "`{}` expects an object of operations, got {other}",
                field.name
            ))
            .into())
        }
    };

    let mut nodes = Vec::with_capacity(entries.len());
    for (name, literal) in entries {
        let Some(operation) = field.operations.get(name) else {
            return Err(CompilationError::UnknownOperationName {
                field: field.name.clone(),
                operation: name.clone(),
            }
            .into());
        };
        let OperationSemantic::Comparison { kind, negated } = operation.semantic else {
            continue;
        };

        let accepted = if kind.takes_list() {
            literal
                .as_array()
                .is_some_and(|items| items.iter().all(|item| field.operand.accepts(item)))
        } else {
            field.operand.accepts(literal) || (literal.is_null() && kind.accepts_null())
        };
        if !accepted {
            let expected = if kind.takes_list() {
                format!("[{}!]", field.operand)
            } else {
                field.operand.to_string()
            };
            return Err(RuntimeFilterError::OperandMismatch {
                field: field.name.clone(),
                operation: name.clone(),
                expected,
                actual: literal.clone(),
            }
            .into());
        }

        nodes.push(PredicateNode::Compare(Comparison {
            member: field.member.clone(),
            kind,
            negated,
            value: literal.clone(),
        }));
    }
    Ok(nodes)
}

fn conjoin(mut parts: Vec<PredicateNode>) -> PredicateNode {
    if parts.len() == 1 {
        if let Some(only) = parts.pop() {
            return only;
        }
    }
    PredicateNode::And(parts)
}
