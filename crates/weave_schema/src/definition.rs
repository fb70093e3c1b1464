//! Mutable, pre-finalization type definitions.
//!
//! A [`TypeDefinition`] is owned by the assembler during a build and mutated by
//! type interceptors. References to other types are plain names, checked only
//! when the graph is finalized.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use weave_core::{BindingBehavior, ConfigurationError, Name};

/// Type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn non_null(inner: TypeRef) -> Self {
        match inner {
            Self::NonNull(_) => inner,
            other => Self::NonNull(Box::new(other)),
        }
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    /// Parses `String`, `String!`, `[Int!]!` and so on.
    pub fn parse(source: &str) -> Result<Self, ConfigurationError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ConfigurationError::empty("type reference"));
        }
        if let Some(inner) = source.strip_suffix('!') {
            let inner = Self::parse(inner)?;
            if matches!(inner, Self::NonNull(_)) {
                return Err(ConfigurationError::invalid(format!(
                    "`{source}` is not a valid type reference"
                )));
            }
            return Ok(Self::NonNull(Box::new(inner)));
        }
        if let Some(inner) = source.strip_prefix('[') {
            let Some(inner) = inner.strip_suffix(']') else {
                return Err(ConfigurationError::invalid(format!(
                    "`{source}` is missing a closing bracket"
                )));
            };
            return Ok(Self::List(Box::new(Self::parse(inner)?)));
        }
        Ok(Self::Named(Name::new(source)?.into_string()))
    }

    /// Returns the innermost named type.
    #[must_use]
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::NonNull(inner) | Self::List(inner) => inner.named_type(),
        }
    }

    /// Returns true if the outermost wrapper is non-null.
    #[must_use]
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Strips a non-null wrapper, if any.
    #[must_use]
    pub fn nullable(&self) -> &TypeRef {
        match self {
            Self::NonNull(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

/// The kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    Scalar,
}

impl TypeKind {
    /// Returns true if values of this kind may appear in output positions.
    #[must_use]
    pub fn is_output(self) -> bool {
        !matches!(self, Self::InputObject)
    }

    /// Returns true if values of this kind may appear in input positions.
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, Self::InputObject | Self::Enum | Self::Scalar)
    }

    /// Returns true if this kind declares fields.
    #[must_use]
    pub fn has_fields(self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::InputObject)
    }

    /// Returns true for interfaces and unions.
    #[must_use]
    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Interface | Self::Union)
    }

    /// Returns the SDL keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Object => "type",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::InputObject => "input",
            Self::Scalar => "scalar",
        }
    }
}

/// A directive attached to a type, field, argument or enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveInstance {
    pub name: Name,
    #[serde(default)]
    pub arguments: IndexMap<String, Value>,
}

impl DirectiveInstance {
    /// Creates a directive instance without arguments.
    pub fn new(name: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            name: Name::new(name)?,
            arguments: IndexMap::new(),
        })
    }

    /// Adds an argument value.
    pub fn argument(mut self, name: &str, value: Value) -> Result<Self, ConfigurationError> {
        let name = Name::new(name)?;
        self.arguments.insert(name.into_string(), value);
        Ok(self)
    }
}

/// Where a field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldOrigin {
    /// Registered explicitly.
    #[default]
    Declared,
    /// Inferred from a bound external shape.
    Inferred,
}

/// An argument or input field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
}

impl ArgumentDefinition {
    /// Creates an argument from a name and a type reference such as `"ID!"`.
    pub fn new(name: &str, ty: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            name: Name::new(name)?,
            description: None,
            ty: TypeRef::parse(ty)?,
            default_value: None,
            directives: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if a value must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// A field of an object, interface or input object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, ArgumentDefinition>,
    /// Default value when used as an input field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
    /// The external member this field reads from, when it differs from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(default)]
    pub origin: FieldOrigin,
}

impl FieldDefinition {
    /// Creates a field from a name and a type reference such as `"[String!]"`.
    pub fn new(name: &str, ty: &str) -> Result<Self, ConfigurationError> {
        Ok(Self::with_type(Name::new(name)?, TypeRef::parse(ty)?))
    }

    /// Creates a field from already validated parts.
    #[must_use]
    pub fn with_type(name: Name, ty: TypeRef) -> Self {
        Self {
            name,
            description: None,
            ty,
            arguments: IndexMap::new(),
            default_value: None,
            directives: Vec::new(),
            member: None,
            origin: FieldOrigin::Declared,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an argument; a second argument with the same name is rejected.
    pub fn argument(mut self, argument: ArgumentDefinition) -> Result<Self, ConfigurationError> {
        let key = argument.name.to_string();
        if self.arguments.contains_key(&key) {
            return Err(ConfigurationError::invalid(format!(
                "argument `{key}` is declared twice on field `{}`",
                self.name
            )));
        }
        self.arguments.insert(key, argument);
        Ok(self)
    }

    #[must_use]
    pub fn directive(mut self, directive: DirectiveInstance) -> Self {
        self.directives.push(directive);
        self
    }

    /// Marks the field deprecated through the built-in `@deprecated` directive.
    pub fn deprecated(mut self, reason: impl Into<String>) -> Result<Self, ConfigurationError> {
        let directive =
            DirectiveInstance::new("deprecated")?.argument("reason", Value::String(reason.into()))?;
        self.directives.push(directive);
        Ok(self)
    }

    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Returns the member path the default resolver reads.
    #[must_use]
    pub fn source_member(&self) -> &str {
        self.member.as_deref().unwrap_or(&self.name)
    }
}

/// An enum value definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDefinition {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
}

/// An invalid mutation of a type definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("field `{field}` already exists on `{type_name}`")]
    DuplicateField { type_name: String, field: String },

    #[error("enum value `{value}` already exists on `{type_name}`")]
    DuplicateValue { type_name: String, value: String },

    #[error("field `{field}` does not exist on `{type_name}`")]
    UnknownField { type_name: String, field: String },

    #[error("`{type_name}` is a {kind:?} and cannot hold {what}")]
    NotApplicable {
        type_name: String,
        kind: TypeKind,
        what: &'static str,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A mutable named type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: Name,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Union members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, EnumValueDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
    /// `None` defers to the binding defaults convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingBehavior>,
    /// External members never inferred as fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<String>,
}

impl TypeDefinition {
    /// Creates an empty definition of the given kind.
    pub fn new(name: &str, kind: TypeKind) -> Result<Self, ConfigurationError> {
        Ok(Self {
            name: Name::new(name)?,
            kind,
            description: None,
            fields: IndexMap::new(),
            interfaces: Vec::new(),
            members: Vec::new(),
            values: IndexMap::new(),
            directives: Vec::new(),
            binding: None,
            ignored: Vec::new(),
        })
    }

    pub fn object(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, TypeKind::Object)
    }

    pub fn interface(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, TypeKind::Interface)
    }

    pub fn input_object(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, TypeKind::InputObject)
    }

    pub fn union(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, TypeKind::Union)
    }

    pub fn enumeration(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, TypeKind::Enum)
    }

    pub fn scalar(name: &str) -> Result<Self, ConfigurationError> {
        Self::new(name, TypeKind::Scalar)
    }

    // Declaration helpers. These report problems as configuration errors at
    // the call site.

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares a field from a name and a type reference.
    pub fn field(self, name: &str, ty: &str) -> Result<Self, ConfigurationError> {
        self.with_field(FieldDefinition::new(name, ty)?)
    }

    /// Declares a prepared field.
    pub fn with_field(mut self, field: FieldDefinition) -> Result<Self, ConfigurationError> {
        self.add_field(field).map_err(|e| match e {
            DefinitionError::Configuration(c) => c,
            other => ConfigurationError::invalid(other.to_string()),
        })?;
        Ok(self)
    }

    /// Declares an implemented interface.
    pub fn implements(mut self, interface: &str) -> Result<Self, ConfigurationError> {
        let name = Name::new(interface)?;
        if !self.interfaces.iter().any(|i| i == name.as_str()) {
            self.interfaces.push(name.into_string());
        }
        Ok(self)
    }

    /// Declares a union member.
    pub fn member(mut self, object: &str) -> Result<Self, ConfigurationError> {
        let name = Name::new(object)?;
        if !self.members.iter().any(|m| m == name.as_str()) {
            self.members.push(name.into_string());
        }
        Ok(self)
    }

    /// Declares an enum value.
    pub fn value(mut self, value: &str) -> Result<Self, ConfigurationError> {
        self.add_value(EnumValueDefinition {
            name: Name::new(value)?,
            description: None,
            directives: Vec::new(),
        })
        .map_err(|e| ConfigurationError::invalid(e.to_string()))?;
        Ok(self)
    }

    #[must_use]
    pub fn directive(mut self, directive: DirectiveInstance) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn bind_fields(mut self, behavior: BindingBehavior) -> Self {
        self.binding = Some(behavior);
        self
    }

    #[must_use]
    pub fn bind_fields_explicitly(self) -> Self {
        self.bind_fields(BindingBehavior::Explicit)
    }

    #[must_use]
    pub fn bind_fields_implicitly(self) -> Self {
        self.bind_fields(BindingBehavior::Implicit)
    }

    /// Excludes an external member from field inference.
    pub fn ignore(mut self, member: &str) -> Result<Self, ConfigurationError> {
        if member.is_empty() {
            return Err(ConfigurationError::empty("ignored member"));
        }
        self.ignored.push(member.to_string());
        Ok(self)
    }

    // Mutation API used during assembly and by type interceptors.

    /// Adds a field, rejecting duplicates.
    pub fn add_field(&mut self, field: FieldDefinition) -> Result<(), DefinitionError> {
        if !self.kind.has_fields() {
            return Err(self.not_applicable("fields"));
        }
        let key = field.name.to_string();
        if self.fields.contains_key(&key) {
            return Err(DefinitionError::DuplicateField {
                type_name: self.name.to_string(),
                field: key,
            });
        }
        self.fields.insert(key, field);
        Ok(())
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldDefinition> {
        self.fields.shift_remove(name)
    }

    /// Renames a field in place.
    pub fn rename_field(&mut self, from: &str, to: &str) -> Result<(), DefinitionError> {
        let new_name = Name::new(to)?;
        if from == to {
            return Ok(());
        }
        if self.fields.contains_key(to) {
            return Err(DefinitionError::DuplicateField {
                type_name: self.name.to_string(),
                field: to.to_string(),
            });
        }
        let Some(index) = self.fields.get_index_of(from) else {
            return Err(DefinitionError::UnknownField {
                type_name: self.name.to_string(),
                field: from.to_string(),
            });
        };
        let Some((_, mut field)) = self.fields.shift_remove_index(index) else {
            return Err(DefinitionError::UnknownField {
                type_name: self.name.to_string(),
                field: from.to_string(),
            });
        };
        if field.member.is_none() {
            field.member = Some(from.to_string());
        }
        field.name = new_name;
        self.fields.shift_insert(index, to.to_string(), field);
        Ok(())
    }

    /// Returns a field for in-place edits.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDefinition> {
        self.fields.get_mut(name)
    }

    /// Adds an enum value, rejecting duplicates.
    pub fn add_value(&mut self, value: EnumValueDefinition) -> Result<(), DefinitionError> {
        if self.kind != TypeKind::Enum {
            return Err(self.not_applicable("enum values"));
        }
        let key = value.name.to_string();
        if self.values.contains_key(&key) {
            return Err(DefinitionError::DuplicateValue {
                type_name: self.name.to_string(),
                value: key,
            });
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Attaches a directive.
    pub fn add_directive(&mut self, directive: DirectiveInstance) {
        self.directives.push(directive);
    }

    /// Removes every directive with the given name, returning how many were removed.
    pub fn remove_directives(&mut self, name: &str) -> usize {
        let before = self.directives.len();
        self.directives.retain(|d| d.name != name);
        before - self.directives.len()
    }

    /// Returns true if the external member is excluded from inference.
    #[must_use]
    pub fn is_ignored(&self, member: &str) -> bool {
        self.ignored.iter().any(|m| m == member)
    }

    /// Returns the names of every type this definition refers to.
    pub fn referenced_types(&self) -> impl Iterator<Item = &str> {
        self.fields
            .values()
            .flat_map(|f| {
                std::iter::once(f.ty.named_type()).chain(f.arguments.values().map(|a| a.ty.named_type()))
            })
            .chain(self.interfaces.iter().map(String::as_str))
            .chain(self.members.iter().map(String::as_str))
    }

    fn not_applicable(&self, what: &'static str) -> DefinitionError {
        DefinitionError::NotApplicable {
            type_name: self.name.to_string(),
            kind: self.kind,
            what,
        }
    }
}

/// Additional fields, interfaces and directives for an existing type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExtension {
    pub name: Name,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub values: Vec<EnumValueDefinition>,
    #[serde(default)]
    pub directives: Vec<DirectiveInstance>,
}

impl TypeExtension {
    /// Creates an empty extension of the named type.
    pub fn new(name: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            name: Name::new(name)?,
            fields: Vec::new(),
            interfaces: Vec::new(),
            members: Vec::new(),
            values: Vec::new(),
            directives: Vec::new(),
        })
    }

    /// Adds a field from a name and a type reference.
    pub fn field(mut self, name: &str, ty: &str) -> Result<Self, ConfigurationError> {
        self.fields.push(FieldDefinition::new(name, ty)?);
        Ok(self)
    }

    #[must_use]
    pub fn directive(mut self, directive: DirectiveInstance) -> Self {
        self.directives.push(directive);
        self
    }

    /// Merges the extension into its target.
    pub fn apply(self, target: &mut TypeDefinition) -> Result<(), DefinitionError> {
        for field in self.fields {
            target.add_field(field)?;
        }
        for value in self.values {
            target.add_value(value)?;
        }
        for interface in self.interfaces {
            if !target.interfaces.contains(&interface) {
                target.interfaces.push(interface);
            }
        }
        for member in self.members {
            if !target.members.contains(&member) {
                target.members.push(member);
            }
        }
        target.directives.extend(self.directives);
        Ok(())
    }
}
