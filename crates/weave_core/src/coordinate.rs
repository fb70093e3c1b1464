//! Schema coordinates.
//!
//! A coordinate locates an element of a schema by name rather than by source
//! offset, e.g. `Person`, `Person.age`, `Query.person(id:)` or `@deprecated(reason:)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location inside a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaCoordinate {
    /// A named type.
    Type { name: String },
    /// A field, input field or enum value of a type.
    Member { type_name: String, member: String },
    /// An argument of a field.
    Argument {
        type_name: String,
        member: String,
        argument: String,
    },
    /// A directive type.
    Directive { name: String },
    /// An argument of a directive type.
    DirectiveArgument { directive: String, argument: String },
}

impl SchemaCoordinate {
    /// Creates a type coordinate.
    pub fn ty(name: impl Into<String>) -> Self {
        Self::Type { name: name.into() }
    }

    /// Creates a member coordinate.
    pub fn member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::Member {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Creates a field argument coordinate.
    pub fn argument(
        type_name: impl Into<String>,
        member: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        Self::Argument {
            type_name: type_name.into(),
            member: member.into(),
            argument: argument.into(),
        }
    }

    /// Creates a directive coordinate.
    pub fn directive(name: impl Into<String>) -> Self {
        Self::Directive { name: name.into() }
    }

    /// Creates a directive argument coordinate.
    pub fn directive_argument(directive: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::DirectiveArgument {
            directive: directive.into(),
            argument: argument.into(),
        }
    }

    /// Returns the type name this coordinate belongs to, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Type { name } => Some(name),
            Self::Member { type_name, .. } | Self::Argument { type_name, .. } => Some(type_name),
            Self::Directive { .. } | Self::DirectiveArgument { .. } => None,
        }
    }
}

impl fmt::Display for SchemaCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { name } => write!(f, "{name}"),
            Self::Member { type_name, member } => write!(f, "{type_name}.{member}"),
            Self::Argument {
                type_name,
                member,
                argument,
            } => write!(f, "{type_name}.{member}({argument}:)"),
            Self::Directive { name } => write!(f, "@{name}"),
            Self::DirectiveArgument {
                directive,
                argument,
            } => write!(f, "@{directive}({argument}:)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SchemaCoordinate::ty("Person").to_string(), "Person");
        assert_eq!(
            SchemaCoordinate::member("Person", "age").to_string(),
            "Person.age"
        );
        assert_eq!(
            SchemaCoordinate::argument("Query", "person", "id").to_string(),
            "Query.person(id:)"
        );
        assert_eq!(
            SchemaCoordinate::directive_argument("deprecated", "reason").to_string(),
            "@deprecated(reason:)"
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(
            SchemaCoordinate::member("Person", "age").type_name(),
            Some("Person")
        );
        assert_eq!(SchemaCoordinate::directive("skip").type_name(), None);
    }
}
