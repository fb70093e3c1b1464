//! Directive types and the built-in directives.

use crate::definition::ArgumentDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use weave_core::{ConfigurationError, Name};

/// Places a directive may be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    // Executable
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    // Type system
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// Returns the SDL spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directive type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveType {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: IndexMap<String, ArgumentDefinition>,
    pub locations: Vec<DirectiveLocation>,
    #[serde(default)]
    pub repeatable: bool,
}

impl DirectiveType {
    /// Creates a directive type with no arguments.
    pub fn new(name: &str, locations: &[DirectiveLocation]) -> Result<Self, ConfigurationError> {
        if locations.is_empty() {
            return Err(ConfigurationError::empty("directive locations"));
        }
        Ok(Self {
            name: Name::new(name)?,
            description: None,
            arguments: IndexMap::new(),
            locations: locations.to_vec(),
            repeatable: false,
        })
    }

    /// Adds an argument.
    pub fn argument(mut self, argument: ArgumentDefinition) -> Result<Self, ConfigurationError> {
        let key = argument.name.to_string();
        if self.arguments.contains_key(&key) {
            return Err(ConfigurationError::invalid(format!(
                "argument `{key}` is declared twice on directive `@{}`",
                self.name
            )));
        }
        self.arguments.insert(key, argument);
        Ok(self)
    }

    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the directive may appear at `location`.
    #[must_use]
    pub fn allows(&self, location: DirectiveLocation) -> bool {
        self.locations.contains(&location)
    }

    /// Returns true for `@skip`, `@include` and `@deprecated`.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        BUILTIN_DIRECTIVES.contains(&self.name.as_str())
    }
}

pub(crate) const BUILTIN_DIRECTIVES: &[&str] = &["skip", "include", "deprecated"];

/// The directives every schema carries.
pub(crate) fn builtin_directives() -> Result<Vec<DirectiveType>, ConfigurationError> {
    use DirectiveLocation::{
        ArgumentDefinition as ArgDef, EnumValue, Field, FieldDefinition, FragmentSpread,
        InlineFragment, InputFieldDefinition,
    };

    let condition = |name: &str, description: &str| -> Result<DirectiveType, ConfigurationError> {
        DirectiveType::new(name, &[Field, FragmentSpread, InlineFragment])?
            .with_description(description)
            .argument(ArgumentDefinition::new("if", "Boolean!")?)
    };

    Ok(vec![
        condition(
            "skip",
            "Directs the executor to skip this field or fragment when the `if` argument is true.",
        )?,
        condition(
            "include",
            "Directs the executor to include this field or fragment only when the `if` argument is true.",
        )?,
        DirectiveType::new(
            "deprecated",
            &[FieldDefinition, ArgDef, InputFieldDefinition, EnumValue],
        )?
        .with_description("Marks an element of a schema as no longer supported.")
        .argument(
            ArgumentDefinition::new("reason", "String")?.with_default(json!("No longer supported")),
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let builtins = builtin_directives().unwrap();
        let names: Vec<_> = builtins.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["skip", "include", "deprecated"]);
        assert!(builtins.iter().all(DirectiveType::is_builtin));
        assert!(builtins[2].allows(DirectiveLocation::FieldDefinition));
        assert!(!builtins[2].arguments["reason"].is_required());
        assert!(builtins[0].arguments["if"].is_required());
    }

    #[test]
    fn test_requires_locations() {
        assert!(DirectiveType::new("auth", &[]).is_err());
    }
}
