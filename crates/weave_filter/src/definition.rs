//! Declarative filter input definitions.
//!
//! A definition records what was declared and nothing else. Inference, the
//! ignore pass and every consistency check happen in the compiler.

use serde::{Deserialize, Serialize};
use weave_core::{BindingBehavior, ScalarKind};
use weave_schema::DirectiveInstance;

/// A comparable member of the filtered element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFieldDefinition {
    /// Dotted member path on the element (`name`, `address.city`).
    pub member: String,
    /// Field name in the filter input; the convention decides when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operand kind; taken from the shape when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<ScalarKind>,
    /// Accepted operation codes; the convention's defaults when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
}

impl FilterFieldDefinition {
    pub fn new(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            name: None,
            description: None,
            operand: None,
            operations: None,
            directives: Vec::new(),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn operand(&mut self, operand: ScalarKind) -> &mut Self {
        self.operand = Some(operand);
        self
    }

    /// Restricts the field to the given operation codes.
    pub fn operations(&mut self, codes: impl IntoIterator<Item = i32>) -> &mut Self {
        self.operations = Some(codes.into_iter().collect());
        self
    }

    pub fn directive(&mut self, directive: DirectiveInstance) -> &mut Self {
        self.directives.push(directive);
        self
    }
}

/// A type-level operation, identified by its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOperationDefinition {
    pub code: i32,
    /// Overrides the convention's operation name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
}

impl FilterOperationDefinition {
    pub fn new(code: i32) -> Self {
        Self {
            code,
            name: None,
            description: None,
            directives: Vec::new(),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn directive(&mut self, directive: DirectiveInstance) -> &mut Self {
        self.directives.push(directive);
        self
    }
}

/// Everything declared for one filter input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterInputDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Binding behavior; implicit when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingBehavior>,
    #[serde(default)]
    pub fields: Vec<FilterFieldDefinition>,
    #[serde(default)]
    pub operations: Vec<FilterOperationDefinition>,
    /// Ignored field names or member paths.
    #[serde(default)]
    pub ignored_fields: Vec<String>,
    #[serde(default)]
    pub ignored_operations: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
}

impl FilterInputDefinition {
    /// Returns the effective binding behavior.
    #[must_use]
    pub fn binding_behavior(&self) -> BindingBehavior {
        self.binding.unwrap_or_default()
    }

    /// Returns true if `name` is in the ignore set.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_fields.iter().any(|ignored| ignored == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_setters_chain() {
        let mut field = FilterFieldDefinition::new("name");
        field.name("fullName").operand(ScalarKind::String).operations([0, 1]);

        assert_eq!(field.name.as_deref(), Some("fullName"));
        assert_eq!(field.operations, Some(vec![0, 1]));
    }

    #[test]
    fn test_definition_deserializes() {
        let definition: FilterInputDefinition = serde_json::from_value(json!({
            "name": "PersonFilterInput",
            "binding": "EXPLICIT",
            "fields": [{ "member": "name", "operations": [0] }],
            "ignoredFields": ["age"]
        }))
        .unwrap();

        assert_eq!(definition.binding_behavior(), BindingBehavior::Explicit);
        assert_eq!(definition.fields[0].member, "name");
        assert!(definition.is_ignored("age"));
    }
}
