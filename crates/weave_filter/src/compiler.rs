//! Compiles a filter input definition into an immutable plan.
//!
//! Declared fields come first, in declaration order. Implicit binding then
//! appends a field for every scalar member that was not declared, and the
//! convention's default combinators. The ignore set is applied last, so an
//! ignored name can never come back through inference.

use crate::compiled::{CompiledField, CompiledFilter, CompiledOperation, FilterPlan};
use crate::convention::{FilterConvention, OperationInfo};
use crate::definition::{FilterFieldDefinition, FilterInputDefinition, FilterOperationDefinition};
use crate::error::{CompilationError, CompilationResult};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;
use weave_core::{BindingBehavior, Name, ShapeDescriptor};

pub(crate) struct FilterCompiler<'a> {
    shape: &'a ShapeDescriptor,
    convention: &'a dyn FilterConvention,
}

impl<'a> FilterCompiler<'a> {
    pub(crate) fn new(shape: &'a ShapeDescriptor, convention: &'a dyn FilterConvention) -> Self {
        Self { shape, convention }
    }

    pub(crate) fn compile<T>(
        &self,
        definition: &FilterInputDefinition,
    ) -> CompilationResult<CompiledFilter<T>> {
        let name = match &definition.name {
            Some(name) => name.clone(),
            None => Name::new(self.convention.type_name(&self.shape.name))?.into_string(),
        };

        let mut declared_codes = FxHashSet::default();
        for operation in &definition.operations {
            if !declared_codes.insert(operation.code) {
                return Err(CompilationError::DuplicateOperation {
                    code: operation.code,
                });
            }
        }

        let mut fields = IndexMap::new();
        for field in &definition.fields {
            let compiled = self.compile_field(&name, field)?;
            if fields.contains_key(&compiled.name) {
                return Err(CompilationError::DuplicateField {
                    name: compiled.name,
                });
            }
            fields.insert(compiled.name.clone(), compiled);
        }

        let mut operation_definitions: Vec<FilterOperationDefinition> =
            definition.operations.clone();

        if definition.binding_behavior() == BindingBehavior::Implicit {
            for member in &self.shape.members {
                if member.kind.as_scalar().is_none() {
                    continue;
                }
                let declared = fields.values().any(|field: &CompiledField| {
                    field.member == member.name || field.name == member.name
                });
                if declared {
                    continue;
                }
                let compiled =
                    self.compile_field(&name, &FilterFieldDefinition::new(member.name.clone()))?;
                if fields.contains_key(&compiled.name) {
                    continue;
                }
                fields.insert(compiled.name.clone(), compiled);
            }

            for code in self.convention.default_combinators() {
                if declared_codes.insert(code) {
                    operation_definitions.push(FilterOperationDefinition::new(code));
                }
            }
        }

        let mut operations = IndexMap::new();
        for operation in &operation_definitions {
            let compiled = self.compile_operation(operation)?;
            if fields.contains_key(&compiled.info.name) || operations.contains_key(&compiled.info.name)
            {
                return Err(CompilationError::DuplicateField {
                    name: compiled.info.name,
                });
            }
            operations.insert(compiled.info.name.clone(), compiled);
        }

        self.apply_ignores(definition, &mut fields, &mut operations)?;

        debug!(
            filter = %name,
            fields = fields.len(),
            operations = operations.len(),
            "compiled filter input"
        );

        Ok(CompiledFilter::from_plan(FilterPlan {
            name,
            description: definition.description.clone(),
            directives: definition.directives.clone(),
            fields,
            operations,
        }))
    }

    fn compile_field(
        &self,
        filter: &str,
        field: &FilterFieldDefinition,
    ) -> CompilationResult<CompiledField> {
        let path = field.member.as_str();
        let (head, nested) = match path.split_once('.') {
            Some((head, _)) => (head, true),
            None => (path, false),
        };
        let Some(member) = self.shape.get(head) else {
            return Err(CompilationError::UnknownMember {
                shape: self.shape.name.clone(),
                path: path.to_string(),
            });
        };

        let inferred = if nested { None } else { member.kind.as_scalar() };
        let Some(operand) = field.operand.or(inferred) else {
            return Err(CompilationError::UnsupportedMember {
                path: path.to_string(),
            });
        };

        let name = match &field.name {
            Some(name) => name.clone(),
            None => self.convention.field_name(path),
        };
        let name = Name::new(name)?.into_string();

        let custom = field.operations.is_some();
        let codes = match &field.operations {
            Some(codes) => codes.clone(),
            None => self.convention.default_operations(operand),
        };

        let mut operations = IndexMap::new();
        let mut seen = FxHashSet::default();
        for code in codes {
            if !seen.insert(code) {
                return Err(CompilationError::DuplicateOperation { code });
            }
            let info = self.resolve(code)?;
            if info.is_composite() {
                return Err(CompilationError::InvalidOperation {
                    operation: info.name,
                    position: "a field",
                });
            }
            operations.insert(info.name.clone(), info);
        }

        let input_type = if custom {
            format!("{filter}{}OperationFilterInput", to_pascal_case(&name))
        } else {
            self.convention.operation_type_name(operand)
        };

        Ok(CompiledField {
            name,
            member: path.to_string(),
            operand,
            nullable: member.nullable || nested,
            description: field
                .description
                .clone()
                .or_else(|| member.description.clone()),
            directives: field.directives.clone(),
            operations,
            input_type,
        })
    }

    fn compile_operation(
        &self,
        operation: &FilterOperationDefinition,
    ) -> CompilationResult<CompiledOperation> {
        let mut info = self.resolve(operation.code)?;
        if !info.is_composite() {
            return Err(CompilationError::InvalidOperation {
                operation: info.name,
                position: "the filter type",
            });
        }
        if let Some(name) = &operation.name {
            info.name = Name::new(name.as_str())?.into_string();
        }
        Ok(CompiledOperation {
            info,
            description: operation.description.clone(),
            directives: operation.directives.clone(),
        })
    }

    fn resolve(&self, code: i32) -> CompilationResult<OperationInfo> {
        self.convention
            .operation(code)
            .ok_or(CompilationError::UnknownOperation { code })
    }

    fn apply_ignores(
        &self,
        definition: &FilterInputDefinition,
        fields: &mut IndexMap<String, CompiledField>,
        operations: &mut IndexMap<String, CompiledOperation>,
    ) -> CompilationResult<()> {
        for ignored in &definition.ignored_fields {
            let before = fields.len();
            fields.retain(|name, field| name != ignored && field.member != *ignored);
            let known = before != fields.len()
                || self.shape.get(ignored).is_some()
                || definition.fields.iter().any(|field| {
                    field.member == *ignored || field.name.as_deref() == Some(ignored.as_str())
                });
            if !known {
                return Err(CompilationError::UnknownIgnoreTarget {
                    name: ignored.clone(),
                });
            }
        }

        let mut ignored_codes = FxHashSet::default();
        for &code in &definition.ignored_operations {
            if !ignored_codes.insert(code) {
                continue;
            }
            let mut removed = 0;
            let before = operations.len();
            operations.retain(|_, operation| operation.info.code != code);
            removed += before - operations.len();
            for field in fields.values_mut() {
                let before = field.operations.len();
                field.operations.retain(|_, info| info.code != code);
                if field.operations.len() != before {
                    removed += 1;
                    field.input_type = format!(
                        "{}{}OperationFilterInput",
                        self.filter_name(definition),
                        to_pascal_case(&field.name)
                    );
                }
            }
            if removed == 0 {
                return Err(CompilationError::UnknownIgnoredOperation { code });
            }
        }

        // a field left without operations accepts nothing
        fields.retain(|_, field| !field.operations.is_empty());
        Ok(())
    }

    fn filter_name(&self, definition: &FilterInputDefinition) -> String {
        definition
            .name
            .clone()
            .unwrap_or_else(|| self.convention.type_name(&self.shape.name))
    }
}

fn to_pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::{ops, DefaultFilterConvention};
    use weave_core::{MemberKind, ScalarKind};

    fn person() -> ShapeDescriptor {
        ShapeDescriptor::new("Person")
            .scalar("name", ScalarKind::String)
            .scalar("age", ScalarKind::Int)
            .optional("address", MemberKind::Shape("Address".into()))
    }

    fn compile(definition: &FilterInputDefinition) -> CompilationResult<CompiledFilter<()>> {
        FilterCompiler::new(&person(), &DefaultFilterConvention).compile(definition)
    }

    #[test]
    fn test_implicit_infers_scalar_members() {
        let filter = compile(&FilterInputDefinition::default()).unwrap();

        assert_eq!(filter.name(), "PersonFilterInput");
        assert_eq!(filter.field_names().collect::<Vec<_>>(), ["name", "age"]);
        assert!(filter.operation("and").is_some());
        assert!(filter.operation("or").is_some());
    }

    #[test]
    fn test_explicit_infers_nothing() {
        let definition = FilterInputDefinition {
            binding: Some(BindingBehavior::Explicit),
            fields: vec![FilterFieldDefinition::new("name")],
            ..Default::default()
        };
        let filter = compile(&definition).unwrap();

        assert_eq!(filter.field_names().collect::<Vec<_>>(), ["name"]);
        assert_eq!(filter.operations().count(), 0);
    }

    #[test]
    fn test_declared_field_wins_over_inferred() {
        let mut field = FilterFieldDefinition::new("age");
        field.operations([ops::EQ]);
        let definition = FilterInputDefinition {
            fields: vec![field],
            ..Default::default()
        };
        let filter = compile(&definition).unwrap();

        let age = filter.field("age").unwrap();
        assert_eq!(age.operation_names().collect::<Vec<_>>(), ["eq"]);
        assert_eq!(filter.field_names().collect::<Vec<_>>(), ["age", "name"]);
        assert_eq!(age.input_type(), "PersonFilterInputAgeOperationFilterInput");
    }

    #[test]
    fn test_duplicate_operation_codes() {
        let definition = FilterInputDefinition {
            operations: vec![
                FilterOperationDefinition::new(ops::AND),
                FilterOperationDefinition::new(ops::AND),
            ],
            ..Default::default()
        };
        assert_eq!(
            compile(&definition).unwrap_err(),
            CompilationError::DuplicateOperation { code: ops::AND }
        );

        let mut field = FilterFieldDefinition::new("name");
        field.operations([ops::EQ, ops::EQ]);
        let definition = FilterInputDefinition {
            fields: vec![field],
            ..Default::default()
        };
        assert!(matches!(
            compile(&definition),
            Err(CompilationError::DuplicateOperation { code: ops::EQ })
        ));
    }

    #[test]
    fn test_unknown_ignore_targets() {
        let definition = FilterInputDefinition {
            ignored_fields: vec!["email".into()],
            ..Default::default()
        };
        assert!(matches!(
            compile(&definition),
            Err(CompilationError::UnknownIgnoreTarget { .. })
        ));

        let definition = FilterInputDefinition {
            ignored_operations: vec![ops::NOT],
            ..Default::default()
        };
        assert_eq!(
            compile(&definition).unwrap_err(),
            CompilationError::UnknownIgnoredOperation { code: ops::NOT }
        );
    }

    #[test]
    fn test_ignore_operation_everywhere() {
        let definition = FilterInputDefinition {
            ignored_operations: vec![ops::OR, ops::NEQ],
            ..Default::default()
        };
        let filter = compile(&definition).unwrap();

        assert!(filter.operation("or").is_none());
        assert!(filter.operation("and").is_some());
        assert!(filter.field("name").unwrap().operation("neq").is_none());
        assert!(filter.field("age").unwrap().operation("neq").is_none());
    }

    #[test]
    fn test_member_errors() {
        let definition = FilterInputDefinition {
            fields: vec![FilterFieldDefinition::new("email")],
            ..Default::default()
        };
        assert!(matches!(
            compile(&definition),
            Err(CompilationError::UnknownMember { .. })
        ));

        let definition = FilterInputDefinition {
            fields: vec![FilterFieldDefinition::new("address.city")],
            ..Default::default()
        };
        assert!(matches!(
            compile(&definition),
            Err(CompilationError::UnsupportedMember { .. })
        ));

        let mut city = FilterFieldDefinition::new("address.city");
        city.operand(ScalarKind::String);
        let definition = FilterInputDefinition {
            fields: vec![city],
            ..Default::default()
        };
        let filter = compile(&definition).unwrap();
        assert_eq!(filter.field("addressCity").unwrap().member(), "address.city");
    }

    #[test]
    fn test_operation_positions() {
        let mut field = FilterFieldDefinition::new("name");
        field.operations([ops::AND]);
        let definition = FilterInputDefinition {
            fields: vec![field],
            ..Default::default()
        };
        assert!(matches!(
            compile(&definition),
            Err(CompilationError::InvalidOperation { position: "a field", .. })
        ));

        let definition = FilterInputDefinition {
            operations: vec![FilterOperationDefinition::new(ops::EQ)],
            ..Default::default()
        };
        assert!(matches!(
            compile(&definition),
            Err(CompilationError::InvalidOperation { .. })
        ));

        let definition = FilterInputDefinition {
            operations: vec![FilterOperationDefinition::new(1234)],
            ..Default::default()
        };
        assert_eq!(
            compile(&definition).unwrap_err(),
            CompilationError::UnknownOperation { code: 1234 }
        );
    }
}
