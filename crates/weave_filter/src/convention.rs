//! Operation codes and the filter convention.

use std::fmt;
use std::sync::Arc;
use weave_core::ScalarKind;
use weave_schema::convention::to_camel_case;
use weave_schema::ConventionRegistry;

/// Built-in operation codes. Codes are plain integers; callers may define
/// their own as long as the convention knows them.
pub mod ops {
    pub const EQ: i32 = 0;
    pub const NEQ: i32 = 1;
    pub const CONTAINS: i32 = 2;
    pub const NOT_CONTAINS: i32 = 3;
    pub const IN: i32 = 4;
    pub const NOT_IN: i32 = 5;
    pub const STARTS_WITH: i32 = 6;
    pub const NOT_STARTS_WITH: i32 = 7;
    pub const ENDS_WITH: i32 = 8;
    pub const NOT_ENDS_WITH: i32 = 9;
    pub const AND: i32 = 10;
    pub const OR: i32 = 11;
    pub const GT: i32 = 13;
    pub const NOT_GT: i32 = 14;
    pub const GTE: i32 = 15;
    pub const NOT_GTE: i32 = 16;
    pub const LT: i32 = 17;
    pub const NOT_LT: i32 = 18;
    pub const LTE: i32 = 19;
    pub const NOT_LTE: i32 = 20;
    pub const NOT: i32 = 30;
}

/// How a comparison treats the member value and the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    Equals,
    Contains,
    In,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEquals,
    LowerThan,
    LowerThanOrEquals,
}

impl ComparisonKind {
    /// Returns true if the literal is a list of operand values.
    pub fn takes_list(self) -> bool {
        matches!(self, Self::In)
    }

    /// Returns true if the literal may be null.
    pub fn accepts_null(self) -> bool {
        matches!(self, Self::Equals)
    }
}

/// Composite operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
    Not,
}

/// What an operation code means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationSemantic {
    Comparison { kind: ComparisonKind, negated: bool },
    Composite(Combinator),
}

/// A resolved operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    pub code: i32,
    pub name: String,
    pub semantic: OperationSemantic,
}

impl OperationInfo {
    pub fn new(code: i32, name: impl Into<String>, semantic: OperationSemantic) -> Self {
        Self {
            code,
            name: name.into(),
            semantic,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.semantic, OperationSemantic::Composite(_))
    }
}

impl fmt::Display for OperationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Naming and operation policy for filter inputs.
pub trait FilterConvention: Send + Sync {
    /// Resolves an operation code.
    fn operation(&self, code: i32) -> Option<OperationInfo>;

    /// Operations a field of the given operand kind gets when it declares none.
    fn default_operations(&self, operand: ScalarKind) -> Vec<i32>;

    /// Type-level operations added to implicitly bound inputs.
    fn default_combinators(&self) -> Vec<i32> {
        vec![ops::AND, ops::OR]
    }

    /// Filter field name for a member path, `address.city` becomes `addressCity`.
    fn field_name(&self, member: &str) -> String {
        to_camel_case(&member.replace('.', "_"))
    }

    /// Input type name for a filtered entity.
    fn type_name(&self, entity: &str) -> String {
        format!("{entity}FilterInput")
    }

    /// Input type name for the operations of an operand kind.
    fn operation_type_name(&self, operand: ScalarKind) -> String {
        format!("{}OperationFilterInput", operand.type_name())
    }
}

/// The built-in convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterConvention;

impl FilterConvention for DefaultFilterConvention {
    fn operation(&self, code: i32) -> Option<OperationInfo> {
        use ComparisonKind::{
            Contains, EndsWith, Equals, GreaterThan, GreaterThanOrEquals, In, LowerThan,
            LowerThanOrEquals, StartsWith,
        };

        let compare = |kind, negated| OperationSemantic::Comparison { kind, negated };
        let (name, semantic) = match code {
            ops::EQ => ("eq", compare(Equals, false)),
            ops::NEQ => ("neq", compare(Equals, true)),
            ops::CONTAINS => ("contains", compare(Contains, false)),
            ops::NOT_CONTAINS => ("ncontains", compare(Contains, true)),
            ops::IN => ("in", compare(In, false)),
            ops::NOT_IN => ("nin", compare(In, true)),
            ops::STARTS_WITH => ("startsWith", compare(StartsWith, false)),
            ops::NOT_STARTS_WITH => ("nstartsWith", compare(StartsWith, true)),
            ops::ENDS_WITH => ("endsWith", compare(EndsWith, false)),
            ops::NOT_ENDS_WITH => ("nendsWith", compare(EndsWith, true)),
            ops::GT => ("gt", compare(GreaterThan, false)),
            ops::NOT_GT => ("ngt", compare(GreaterThan, true)),
            ops::GTE => ("gte", compare(GreaterThanOrEquals, false)),
            ops::NOT_GTE => ("ngte", compare(GreaterThanOrEquals, true)),
            ops::LT => ("lt", compare(LowerThan, false)),
            ops::NOT_LT => ("nlt", compare(LowerThan, true)),
            ops::LTE => ("lte", compare(LowerThanOrEquals, false)),
            ops::NOT_LTE => ("nlte", compare(LowerThanOrEquals, true)),
            ops::AND => ("and", OperationSemantic::Composite(Combinator::And)),
            ops::OR => ("or", OperationSemantic::Composite(Combinator::Or)),
            ops::NOT => ("not", OperationSemantic::Composite(Combinator::Not)),
            _ => return None,
        };
        Some(OperationInfo::new(code, name, semantic))
    }

    fn default_operations(&self, operand: ScalarKind) -> Vec<i32> {
        match operand {
            ScalarKind::Boolean => vec![ops::EQ, ops::NEQ],
            ScalarKind::Id => vec![ops::EQ, ops::NEQ, ops::IN, ops::NOT_IN],
            ScalarKind::String => vec![
                ops::EQ,
                ops::NEQ,
                ops::CONTAINS,
                ops::NOT_CONTAINS,
                ops::IN,
                ops::NOT_IN,
                ops::STARTS_WITH,
                ops::NOT_STARTS_WITH,
                ops::ENDS_WITH,
                ops::NOT_ENDS_WITH,
            ],
            ScalarKind::Int | ScalarKind::Float => vec![
                ops::EQ,
                ops::NEQ,
                ops::IN,
                ops::NOT_IN,
                ops::GT,
                ops::NOT_GT,
                ops::GTE,
                ops::NOT_GTE,
                ops::LT,
                ops::NOT_LT,
                ops::LTE,
                ops::NOT_LTE,
            ],
        }
    }
}

/// Returns the filter convention registered on `registry`, or the built-in one.
pub fn filter_convention(registry: &ConventionRegistry) -> Arc<dyn FilterConvention> {
    registry
        .get::<dyn FilterConvention>()
        .unwrap_or_else(|| Arc::new(DefaultFilterConvention))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_operation_names() {
        let convention = DefaultFilterConvention;
        assert_eq!(convention.operation(ops::EQ).unwrap().name, "eq");
        assert_eq!(convention.operation(ops::NOT_IN).unwrap().name, "nin");
        assert!(convention.operation(ops::OR).unwrap().is_composite());
        assert!(convention.operation(999).is_none());
    }

    #[test]
    fn test_default_operations_are_known() {
        let convention = DefaultFilterConvention;
        for kind in [
            ScalarKind::Boolean,
            ScalarKind::Id,
            ScalarKind::String,
            ScalarKind::Int,
            ScalarKind::Float,
        ] {
            for code in convention.default_operations(kind) {
                assert!(convention.operation(code).is_some(), "{code} for {kind}");
            }
        }
    }

    #[test]
    fn test_names() {
        let convention = DefaultFilterConvention;
        assert_eq!(convention.field_name("address.city"), "addressCity");
        assert_eq!(convention.type_name("Person"), "PersonFilterInput");
        assert_eq!(
            convention.operation_type_name(ScalarKind::String),
            "StringOperationFilterInput"
        );
    }

    #[test]
    fn test_registered_convention() {
        struct Prefixed;

        impl FilterConvention for Prefixed {
            fn operation(&self, code: i32) -> Option<OperationInfo> {
                DefaultFilterConvention.operation(code)
            }

            fn default_operations(&self, operand: ScalarKind) -> Vec<i32> {
                DefaultFilterConvention.default_operations(operand)
            }

            fn type_name(&self, entity: &str) -> String {
                format!("Where{entity}")
            }
        }

        let mut registry = ConventionRegistry::new();
        assert_eq!(filter_convention(&registry).type_name("Person"), "PersonFilterInput");

        let convention: Arc<dyn FilterConvention> = Arc::new(Prefixed);
        registry.insert(convention);
        assert_eq!(filter_convention(&registry).type_name("Person"), "WherePerson");
    }
}
