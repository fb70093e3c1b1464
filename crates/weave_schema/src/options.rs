//! Schema options.

use serde::{Deserialize, Serialize};
use weave_core::{BindingBehavior, ConfigurationError, Name};

/// Options that shape how a schema is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaOptions {
    /// Name looked up when no query root was registered.
    pub query_type_name: String,
    /// Name looked up when no mutation root was registered.
    pub mutation_type_name: String,
    /// Name looked up when no subscription root was registered.
    pub subscription_type_name: String,
    /// Binding behavior for types that do not choose one.
    pub default_binding_behavior: BindingBehavior,
    /// Orders fields alphabetically in the finalized graph.
    pub sort_fields_by_name: bool,
    /// Drops types that cannot be reached from a root type.
    pub remove_unreachable_types: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            query_type_name: "Query".to_string(),
            mutation_type_name: "Mutation".to_string(),
            subscription_type_name: "Subscription".to_string(),
            default_binding_behavior: BindingBehavior::Implicit,
            sort_fields_by_name: false,
            remove_unreachable_types: false,
        }
    }
}

impl SchemaOptions {
    /// Checks that the root type names are valid names.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for name in [
            &self.query_type_name,
            &self.mutation_type_name,
            &self.subscription_type_name,
        ] {
            Name::new(name.as_str())?;
        }
        Ok(())
    }

    #[must_use]
    pub fn with_query_type_name(mut self, name: impl Into<String>) -> Self {
        self.query_type_name = name.into();
        self
    }

    #[must_use]
    pub fn with_default_binding_behavior(mut self, behavior: BindingBehavior) -> Self {
        self.default_binding_behavior = behavior;
        self
    }

    #[must_use]
    pub fn with_sort_fields_by_name(mut self, sort: bool) -> Self {
        self.sort_fields_by_name = sort;
        self
    }

    #[must_use]
    pub fn with_remove_unreachable_types(mut self, remove: bool) -> Self {
        self.remove_unreachable_types = remove;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SchemaOptions::default();
        assert_eq!(options.query_type_name, "Query");
        assert_eq!(options.default_binding_behavior, BindingBehavior::Implicit);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_root_name() {
        let options = SchemaOptions::default().with_query_type_name("");
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: SchemaOptions =
            serde_json::from_str(r#"{ "sortFieldsByName": true, "defaultBindingBehavior": "EXPLICIT" }"#)
                .unwrap();
        assert!(options.sort_fields_by_name);
        assert_eq!(options.default_binding_behavior, BindingBehavior::Explicit);
        assert_eq!(options.query_type_name, "Query");
    }
}
