//! Schema input types for compiled filters.

use crate::compiled::{CompiledField, CompiledFilter};
use crate::convention::{Combinator, OperationSemantic};
use indexmap::IndexMap;
use weave_core::{ConfigurationError, Name};
use weave_schema::{FieldDefinition, SchemaBuilder, TypeDefinition, TypeRef};

/// Input object definitions for a set of compiled filters.
///
/// Operation input types shared by several filters (`StringOperationFilterInput`)
/// are emitted once; the first filter that needs one defines it.
#[derive(Debug, Default)]
pub struct FilterTypeSet {
    types: IndexMap<String, TypeDefinition>,
}

impl FilterTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the filter input type of `filter` and its operation input types.
    pub fn add<T>(&mut self, filter: &CompiledFilter<T>) -> Result<&mut Self, ConfigurationError> {
        let mut input = TypeDefinition::input_object(filter.name())?;
        input.description = filter.description().map(str::to_string);
        input.directives = filter.directives().to_vec();

        for field in filter.fields() {
            let mut definition = FieldDefinition::with_type(
                Name::new(field.name())?,
                TypeRef::named(field.input_type()),
            );
            definition.description = field.description().map(str::to_string);
            definition.directives = field.directives().to_vec();
            definition.member = Some(field.member().to_string());
            input = input.with_field(definition)?;

            if !self.types.contains_key(field.input_type()) {
                let operations = operation_type(field)?;
                self.types.insert(field.input_type().to_string(), operations);
            }
        }

        for operation in filter.operations() {
            let own = TypeRef::non_null(TypeRef::named(filter.name()));
            let ty = match operation.info().semantic {
                OperationSemantic::Composite(Combinator::Not) => TypeRef::named(filter.name()),
                _ => TypeRef::list(own),
            };
            let mut definition = FieldDefinition::with_type(Name::new(operation.name())?, ty);
            definition.description = operation.description().map(str::to_string);
            definition.directives = operation.directives().to_vec();
            input = input.with_field(definition)?;
        }

        self.types.insert(filter.name().to_string(), input);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registers every collected type on `builder`.
    pub fn register(self, builder: &mut SchemaBuilder) {
        for definition in self.types.into_values() {
            builder.add_type(definition);
        }
    }

    pub fn into_definitions(self) -> Vec<TypeDefinition> {
        self.types.into_values().collect()
    }
}

fn operation_type(field: &CompiledField) -> Result<TypeDefinition, ConfigurationError> {
    let mut definition = TypeDefinition::input_object(field.input_type())?;
    let operand = field.operand().type_name();
    for operation in field.operations() {
        let ty = match operation.semantic {
            OperationSemantic::Comparison { kind, .. } if kind.takes_list() => {
                TypeRef::list(TypeRef::non_null(TypeRef::named(operand)))
            }
            _ => TypeRef::named(operand),
        };
        definition = definition.with_field(FieldDefinition::with_type(
            Name::new(operation.name.as_str())?,
            ty,
        ))?;
    }
    Ok(definition)
}

impl<T> CompiledFilter<T> {
    /// Returns the input type definitions describing this filter.
    pub fn to_type_definitions(&self) -> Result<Vec<TypeDefinition>, ConfigurationError> {
        let mut set = FilterTypeSet::new();
        set.add(self)?;
        Ok(set.into_definitions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterInputBuilder;
    use serde_json::Value;
    use weave_core::{ScalarKind, ShapeDescriptor};

    #[test]
    fn test_filter_input_types() {
        let shape = ShapeDescriptor::new("Person")
            .scalar("name", ScalarKind::String)
            .scalar("age", ScalarKind::Int);
        let filter = FilterInputBuilder::<Value>::for_shape(shape).compile().unwrap();

        let definitions = filter.to_type_definitions().unwrap();
        let names: Vec<_> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            ["StringOperationFilterInput", "IntOperationFilterInput", "PersonFilterInput"]
        );

        let input = &definitions[2];
        assert_eq!(input.fields["name"].ty.to_string(), "StringOperationFilterInput");
        assert_eq!(input.fields["and"].ty.to_string(), "[PersonFilterInput!]");
        assert_eq!(definitions[1].fields["in"].ty.to_string(), "[Int!]");
        assert_eq!(definitions[1].fields["gt"].ty.to_string(), "Int");
    }

    #[test]
    fn test_shared_operation_types_once() {
        let person = ShapeDescriptor::new("Person").scalar("name", ScalarKind::String);
        let pet = ShapeDescriptor::new("Pet").scalar("nickname", ScalarKind::String);

        let mut set = FilterTypeSet::new();
        set.add(&FilterInputBuilder::<Value>::for_shape(person).compile().unwrap())
            .unwrap()
            .add(&FilterInputBuilder::<Value>::for_shape(pet).compile().unwrap())
            .unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.get("StringOperationFilterInput").is_some());
    }
}
