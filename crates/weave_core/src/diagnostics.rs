//! Diagnostic reporting for weave.
//!
//! Schema assembly collects every violation it finds into a [`DiagnosticBag`]
//! and reports them together instead of stopping at the first one.

use crate::coordinate::SchemaCoordinate;
use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// An error that prevents the schema from being built.
    Error,
    /// A warning that doesn't prevent the build.
    Warning,
}

/// The class of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    /// An external-shape binding without a usable type mapping.
    Binding,
    /// A dangling reference, duplicate name, invalid root or directive mismatch.
    GraphValidation,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Error code.
    pub code: &'static str,
    /// Short title.
    pub title: String,
    /// Detailed message.
    pub message: Option<String>,
    /// Where in the schema the violation was found.
    pub coordinate: Option<SchemaCoordinate>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: &'static str, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            title: title.into(),
            message: None,
            coordinate: None,
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: &'static str, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            ..Self::error(code, title)
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a schema coordinate.
    #[must_use]
    pub fn at(mut self, coordinate: SchemaCoordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    /// Returns the category derived from the code range.
    #[must_use]
    pub fn category(&self) -> DiagnosticCategory {
        if self.code.starts_with("E01") {
            DiagnosticCategory::Binding
        } else {
            DiagnosticCategory::GraphValidation
        }
    }

    /// Returns true if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(f, "{level}[{}]: {}", self.code, self.title)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(coordinate) = &self.coordinate {
            write!(f, " (at {coordinate})")?;
        }
        Ok(())
    }
}

/// A collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic located at a coordinate.
    pub fn error(
        &mut self,
        code: &'static str,
        title: impl Into<String>,
        coordinate: SchemaCoordinate,
        message: impl Into<String>,
    ) {
        self.add(
            Diagnostic::error(code, title)
                .with_message(message)
                .at(coordinate),
        );
    }

    /// Adds a warning diagnostic located at a coordinate.
    pub fn warning(
        &mut self,
        code: &'static str,
        title: impl Into<String>,
        coordinate: SchemaCoordinate,
        message: impl Into<String>,
    ) {
        self.add(
            Diagnostic::warning(code, title)
                .with_message(message)
                .at(coordinate),
        );
    }

    /// Moves every diagnostic of `other` into this bag.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Returns an iterator over diagnostics of one category.
    pub fn in_category(&self, category: DiagnosticCategory) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category() == category)
    }

    /// Returns true if a diagnostic with the given code was recorded.
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Consumes the bag, returning the diagnostics.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for DiagnosticBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticBag {}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Common diagnostic codes.
///
/// `E01xx` are binding violations, everything else is graph validation.
pub mod codes {
    pub const UNBOUND_TYPE: &str = "E0101";
    pub const AMBIGUOUS_BINDING: &str = "E0102";
    pub const UNRESOLVED_MEMBER_TYPE: &str = "E0103";

    pub const UNDEFINED_TYPE: &str = "E0201";
    pub const DUPLICATE_TYPE: &str = "E0202";
    pub const INVALID_ROOT_TYPE: &str = "E0203";
    pub const MISSING_QUERY_ROOT: &str = "E0204";
    pub const EMPTY_FIELDS: &str = "E0205";
    pub const INVALID_UNION_MEMBER: &str = "E0206";
    pub const INVALID_INTERFACE: &str = "E0207";
    pub const MISSING_INTERFACE_FIELD: &str = "E0208";
    pub const UNDEFINED_FIELD: &str = "E0209";
    pub const DUPLICATE_RESOLVER: &str = "E0210";
    pub const UNDEFINED_EXTENSION_TARGET: &str = "E0211";
    pub const DUPLICATE_DIRECTIVE_TYPE: &str = "E0212";
    pub const INVALID_FIELD_TYPE: &str = "E0213";
    pub const DUPLICATE_FIELD: &str = "E0214";

    pub const UNDEFINED_DIRECTIVE: &str = "E0301";
    pub const UNKNOWN_DIRECTIVE_ARGUMENT: &str = "E0302";
    pub const MISSING_DIRECTIVE_ARGUMENT: &str = "E0303";
    pub const DIRECTIVE_ARGUMENT_MISMATCH: &str = "E0304";
    pub const DIRECTIVE_LOCATION: &str = "E0305";
    pub const DIRECTIVE_NOT_REPEATABLE: &str = "E0306";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.error(
            codes::UNDEFINED_TYPE,
            "undefined type",
            SchemaCoordinate::member("Person", "address"),
            "type `Address` is not defined",
        );

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert!(bag.contains_code(codes::UNDEFINED_TYPE));
    }

    #[test]
    fn test_categories() {
        let binding = Diagnostic::error(codes::UNBOUND_TYPE, "unbound");
        let graph = Diagnostic::error(codes::DIRECTIVE_LOCATION, "location");

        assert_eq!(binding.category(), DiagnosticCategory::Binding);
        assert_eq!(graph.category(), DiagnosticCategory::GraphValidation);
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::error(codes::DUPLICATE_TYPE, "duplicate type")
            .with_message("`Person` is defined 2 times")
            .at(SchemaCoordinate::ty("Person"));

        assert_eq!(
            diag.to_string(),
            "error[E0202]: duplicate type: `Person` is defined 2 times (at Person)"
        );
    }
}
