//! External data-shape descriptors.
//!
//! A data shape describes the accessible members of an external type (a
//! database row, a domain struct, a JSON document). Shapes are supplied ahead
//! of time as plain descriptor lists; nothing is discovered by introspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Whether fields are inferred from a bound shape or declared explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingBehavior {
    /// Infer fields from the bound shape in addition to the declared ones.
    #[default]
    Implicit,
    /// Only declared fields exist.
    Explicit,
}

/// Scalar member kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalarKind {
    Boolean,
    Int,
    Float,
    String,
    Id,
}

impl ScalarKind {
    /// Returns the built-in schema scalar for this kind.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Id => "ID",
        }
    }

    /// Maps a built-in scalar name back to its kind.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Boolean" => Some(Self::Boolean),
            "Int" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "String" => Some(Self::String),
            "ID" => Some(Self::Id),
            _ => None,
        }
    }

    /// Returns true if `value` is a non-null value of this kind.
    ///
    /// `Float` accepts integers and `ID` accepts strings and integers.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Int => value.as_i64().is_some_and(|v| i32::try_from(v).is_ok()),
            Self::Float => value.is_number(),
            Self::String => value.is_string(),
            Self::Id => value.is_string() || value.is_i64() || value.is_u64(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The kind of a shape member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// A scalar value.
    Scalar(ScalarKind),
    /// A nested shape, referenced by shape name.
    Shape(String),
    /// A list of values.
    List(Box<MemberKind>),
}

impl MemberKind {
    /// Returns the scalar kind if this member is a plain scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// An accessible member of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The statically supplied description of an external data shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
}

impl ShapeDescriptor {
    /// Creates a shape without members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a non-null member.
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, kind: MemberKind) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            kind,
            nullable: false,
            description: None,
        });
        self
    }

    /// Adds a non-null scalar member.
    #[must_use]
    pub fn scalar(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.member(name, MemberKind::Scalar(kind))
    }

    /// Adds a nullable member.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, kind: MemberKind) -> Self {
        self.members.push(MemberDescriptor {
            name: name.into(),
            kind,
            nullable: true,
            description: None,
        });
        self
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Returns member names in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }
}

/// Read access to the members of a value by dotted path.
pub trait MemberAccess {
    /// Returns the value at `path` (`"name"` or `"address.city"`), if present.
    fn member_value(&self, path: &str) -> Option<Value>;
}

impl MemberAccess for Value {
    fn member_value(&self, path: &str) -> Option<Value> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }
}

/// A Rust type with a statically known shape.
pub trait DataShape: MemberAccess {
    /// Returns the descriptor of this type's members.
    fn shape() -> ShapeDescriptor;
}

/// A typed member selector, resolved to a member name when a builder is built.
///
/// ```
/// use weave_core::{Member, ScalarKind};
///
/// struct Person;
/// const CITY: Member<Person> = Member::typed("address.city", ScalarKind::String);
/// assert_eq!(CITY.path(), "address.city");
/// ```
pub struct Member<T> {
    path: &'static str,
    operand: Option<ScalarKind>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Member<T> {
    /// Selects a member whose operand kind comes from the shape.
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            operand: None,
            _marker: PhantomData,
        }
    }

    /// Selects a member with an explicit operand kind (needed for nested paths).
    #[must_use]
    pub const fn typed(path: &'static str, operand: ScalarKind) -> Self {
        Self {
            path,
            operand: Some(operand),
            _marker: PhantomData,
        }
    }

    /// Returns the dotted member path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the last path segment, used as the default field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.path.rsplit('.').next().unwrap_or(self.path)
    }

    /// Returns the explicit operand kind, if any.
    #[must_use]
    pub const fn operand(&self) -> Option<ScalarKind> {
        self.operand
    }
}

impl<T> Clone for Member<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Member<T> {}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("path", &self.path)
            .field("operand", &self.operand)
            .finish()
    }
}
