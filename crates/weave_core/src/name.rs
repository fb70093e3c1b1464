//! Validated schema names.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// A name of a type, field, argument or directive.
///
/// Names are non-empty, start with `_` or an ASCII letter and continue
/// with `_`, ASCII letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Validates and wraps a name.
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigurationError> {
        let value = value.into();
        Self::check(&value)?;
        Ok(Self(value))
    }

    /// Returns true if `value` is a valid name.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        Self::check(value).is_ok()
    }

    fn check(value: &str) -> Result<(), ConfigurationError> {
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(ConfigurationError::empty("name"));
        };
        if !(first == '_' || first.is_ascii_alphabetic()) {
            return Err(ConfigurationError::InvalidName {
                name: value.to_string(),
                reason: "must start with a letter or underscore",
            });
        }
        if !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            return Err(ConfigurationError::InvalidName {
                name: value.to_string(),
                reason: "may only contain letters, digits and underscores",
            });
        }
        Ok(())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Name {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
