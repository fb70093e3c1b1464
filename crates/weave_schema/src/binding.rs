//! Associations between external data shapes and schema types, and field
//! inference from bound shapes.

use crate::arena::TypeArena;
use crate::convention::ConventionRegistry;
use crate::definition::{FieldDefinition, FieldOrigin, TypeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use weave_core::diagnostics::codes;
use weave_core::{
    BindingBehavior, Diagnostic, DiagnosticBag, MemberKind, Name, SchemaCoordinate,
    ShapeDescriptor,
};

/// Binds one external shape to one or more schema types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingInfo {
    pub shape: ShapeDescriptor,
    pub type_names: Vec<String>,
}

impl BindingInfo {
    pub fn new(shape: ShapeDescriptor, type_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            shape,
            type_names: type_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Resolves bindings collected from the registry.
#[derive(Debug, Default)]
pub struct BindingResolver {
    shapes: IndexMap<String, ShapeDescriptor>,
    shape_types: IndexMap<String, Vec<String>>,
    type_shapes: IndexMap<String, Vec<String>>,
}

impl BindingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding. A later descriptor for the same shape name replaces
    /// the earlier one.
    pub fn add(&mut self, binding: BindingInfo) {
        let shape_name = binding.shape.name.clone();
        self.shapes.insert(shape_name.clone(), binding.shape);
        for type_name in binding.type_names {
            let types = self.shape_types.entry(shape_name.clone()).or_default();
            if !types.contains(&type_name) {
                types.push(type_name.clone());
            }
            let shapes = self.type_shapes.entry(type_name).or_default();
            if !shapes.contains(&shape_name) {
                shapes.push(shape_name.clone());
            }
        }
    }

    /// Returns the shape bound to a type, if exactly one is.
    pub fn shape_of(&self, type_name: &str) -> Option<&ShapeDescriptor> {
        match self.type_shapes.get(type_name).map(Vec::as_slice) {
            Some([shape]) => self.shapes.get(shape),
            _ => None,
        }
    }

    /// Returns the shape name backing a type, for abstract type resolution.
    pub fn shape_name_of(&self, type_name: &str) -> Option<&str> {
        self.shape_of(type_name).map(|s| s.name.as_str())
    }

    /// Checks that every bound type exists and that no type is bound twice.
    pub fn check(&self, arena: &TypeArena, bag: &mut DiagnosticBag) {
        for (type_name, shapes) in &self.type_shapes {
            let coordinate = SchemaCoordinate::ty(type_name.as_str());
            if !arena.contains(type_name) {
                bag.add(
                    Diagnostic::error(codes::UNBOUND_TYPE, "binding targets an undefined type")
                        .with_message(format!(
                            "shape `{}` is bound to `{type_name}`, which is not defined",
                            shapes.join("`, `")
                        ))
                        .at(coordinate.clone()),
                );
            }
            if shapes.len() > 1 {
                bag.add(
                    Diagnostic::error(codes::AMBIGUOUS_BINDING, "ambiguous binding")
                        .with_message(format!(
                            "`{type_name}` is bound to shapes `{}`",
                            shapes.join("`, `")
                        ))
                        .at(coordinate),
                );
            }
        }
    }

    /// Finds the schema type a nested shape maps to in an input or output position.
    fn type_for_shape(&self, shape: &str, input: bool, arena: &TypeArena) -> Result<Option<String>, Vec<String>> {
        let candidates: Vec<&String> = self
            .shape_types
            .get(shape)
            .into_iter()
            .flatten()
            .filter(|name| {
                arena
                    .by_name(name)
                    .is_some_and(|d| if input { d.kind.is_input() } else { d.kind.is_output() })
            })
            .collect();
        match candidates.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some((*single).clone())),
            many => Err(many.iter().map(|s| (*s).clone()).collect()),
        }
    }

    /// Adds inferred fields to every implicitly bound type with a bound shape.
    ///
    /// Declared fields win over inferred ones and ignored members are skipped.
    pub fn infer_fields(
        &self,
        arena: &mut TypeArena,
        conventions: &ConventionRegistry,
        bag: &mut DiagnosticBag,
    ) {
        let naming = conventions.naming();
        let inference = conventions.type_inference();
        let default_behavior = conventions.binding_defaults().behavior;

        let ids: Vec<_> = arena.ids().collect();
        for id in ids {
            let definition = arena.get(id);
            if !definition.kind.has_fields()
                || definition.binding.unwrap_or(default_behavior) == BindingBehavior::Explicit
            {
                continue;
            }
            let Some(shape) = self.shape_of(&definition.name) else {
                continue;
            };
            let input = definition.kind == TypeKind::InputObject;
            let type_name = definition.name.to_string();

            let mut inferred = Vec::new();
            for member in &shape.members {
                if definition.is_ignored(&member.name) {
                    continue;
                }
                let field_name = naming.field_name(&member.name);
                let already_declared = definition.fields.contains_key(&field_name)
                    || definition
                        .fields
                        .values()
                        .any(|f| f.source_member() == member.name);
                if already_declared {
                    continue;
                }
                let coordinate = SchemaCoordinate::member(type_name.as_str(), field_name.as_str());
                let Ok(name) = Name::new(field_name.as_str()) else {
                    bag.add(
                        Diagnostic::error(codes::UNRESOLVED_MEMBER_TYPE, "member cannot be named")
                            .with_message(format!(
                                "member `{}` maps to the invalid field name `{field_name}`",
                                member.name
                            ))
                            .at(coordinate),
                    );
                    continue;
                };

                if let MemberKind::Shape(nested) = innermost(&member.kind) {
                    if let Err(candidates) = self.type_for_shape(nested, input, arena) {
                        bag.add(
                            Diagnostic::error(codes::AMBIGUOUS_BINDING, "ambiguous member type")
                                .with_message(format!(
                                    "member `{}` could map to `{}`",
                                    member.name,
                                    candidates.join("`, `")
                                ))
                                .at(coordinate),
                        );
                        continue;
                    }
                }
                let lookup = |shape_name: &str| {
                    self.type_for_shape(shape_name, input, arena).ok().flatten()
                };
                let Some(ty) = inference.infer(member, &lookup) else {
                    bag.add(
                        Diagnostic::error(codes::UNRESOLVED_MEMBER_TYPE, "unresolved member type")
                            .with_message(format!(
                                "no schema type is bound to the type of member `{}`",
                                member.name
                            ))
                            .at(coordinate),
                    );
                    continue;
                };

                let mut field = FieldDefinition::with_type(name, ty);
                field.origin = FieldOrigin::Inferred;
                field.description.clone_from(&member.description);
                if field.name != member.name.as_str() {
                    field.member = Some(member.name.clone());
                }
                inferred.push(field);
            }

            let definition = arena.get_mut(id);
            for field in inferred {
                // Names were checked against declared fields above; a clash can
                // only come from two members mapping to the same name.
                if let Err(error) = definition.add_field(field) {
                    bag.add(
                        Diagnostic::error(codes::AMBIGUOUS_BINDING, "conflicting inferred fields")
                            .with_message(error.to_string())
                            .at(SchemaCoordinate::ty(type_name.as_str())),
                    );
                }
            }
        }
    }
}

fn innermost(kind: &MemberKind) -> &MemberKind {
    match kind {
        MemberKind::List(item) => innermost(item),
        other => other,
    }
}
