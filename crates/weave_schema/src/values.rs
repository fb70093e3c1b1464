//! Built-in scalars and value checks against input types.

use crate::arena::TypeArena;
use crate::definition::{TypeDefinition, TypeKind, TypeRef};
use serde_json::Value;
use weave_core::{ConfigurationError, ScalarKind};

pub(crate) const BUILTIN_SCALARS: [ScalarKind; 5] = [
    ScalarKind::String,
    ScalarKind::Int,
    ScalarKind::Float,
    ScalarKind::Boolean,
    ScalarKind::Id,
];

/// Returns true if `name` is one of the built-in scalars.
#[must_use]
pub fn is_builtin_scalar(name: &str) -> bool {
    ScalarKind::from_type_name(name).is_some()
}

pub(crate) fn builtin_scalars() -> Result<Vec<TypeDefinition>, ConfigurationError> {
    BUILTIN_SCALARS
        .iter()
        .map(|kind| TypeDefinition::scalar(kind.type_name()))
        .collect()
}

/// Checks a literal against an input type reference.
///
/// Lists accept a single item in place of a one-element list. Custom scalars
/// accept any value.
pub(crate) fn conforms(value: &Value, ty: &TypeRef, arena: &TypeArena) -> bool {
    match ty {
        TypeRef::NonNull(inner) => !value.is_null() && conforms(value, inner, arena),
        _ if value.is_null() => true,
        TypeRef::List(inner) => match value {
            Value::Array(items) => items.iter().all(|item| conforms(item, inner, arena)),
            single => conforms(single, inner, arena),
        },
        TypeRef::Named(name) => {
            if let Some(kind) = ScalarKind::from_type_name(name) {
                return kind.accepts(value);
            }
            let Some(definition) = arena.by_name(name) else {
                return false;
            };
            match definition.kind {
                TypeKind::Scalar => true,
                TypeKind::Enum => value
                    .as_str()
                    .is_some_and(|v| definition.values.contains_key(v)),
                TypeKind::InputObject => {
                    let Value::Object(object) = value else {
                        return false;
                    };
                    object.keys().all(|k| definition.fields.contains_key(k))
                        && definition.fields.values().all(|field| match object.get(field.name.as_str()) {
                            Some(v) => conforms(v, &field.ty, arena),
                            None => !field.ty.is_non_null() || field.default_value.is_some(),
                        })
                }
                _ => false,
            }
        }
    }
}
