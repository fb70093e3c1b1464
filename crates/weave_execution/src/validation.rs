//! Operation validation with pluggable rules.
//!
//! Rules are grouped into named slots and run slot by slot in a fixed order.
//! Each validation draws a [`ValidationContext`] from a bounded pool and
//! returns it whatever the outcome.

use crate::document::Operation;
use crate::error::{ExecutionError, ExecutionResult, RuleViolation, ValidationFailure};
use crate::pool::{ContextPool, PoolConfig, Poolable};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use weave_core::ConfigurationError;
use weave_schema::resolver::PathSegment;
use weave_schema::SchemaGraph;

/// Rule slots, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleGroup {
    Document,
    Operation,
    Field,
    Argument,
    Fragment,
    Value,
    Directive,
    Variable,
}

impl RuleGroup {
    pub const ALL: [RuleGroup; 8] = [
        Self::Document,
        Self::Operation,
        Self::Field,
        Self::Argument,
        Self::Fragment,
        Self::Value,
        Self::Directive,
        Self::Variable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Operation => "operation",
            Self::Field => "field",
            Self::Argument => "argument",
            Self::Fragment => "fragment",
            Self::Value => "value",
            Self::Directive => "directive",
            Self::Variable => "variable",
        }
    }
}

impl fmt::Display for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one validation run.
#[derive(Debug, Default)]
pub struct ValidationContext {
    rule: String,
    path: Vec<PathSegment>,
    violations: Vec<RuleViolation>,
    max_violations: Option<usize>,
    scratch: IndexMap<String, Value>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a violation at the current path.
    pub fn report(&mut self, message: impl Into<String>) {
        let path = self.path.clone();
        self.report_at(message, path);
    }

    pub fn report_at(&mut self, message: impl Into<String>, path: Vec<PathSegment>) {
        if self.is_full() {
            return;
        }
        self.violations.push(RuleViolation {
            rule: self.rule.clone(),
            message: message.into(),
            path,
        });
    }

    /// Descends into a response path segment.
    pub fn enter(&mut self, segment: PathSegment) {
        self.path.push(segment);
    }

    pub fn leave(&mut self) {
        self.path.pop();
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn violations(&self) -> &[RuleViolation] {
        &self.violations
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Returns true once the violation limit is reached.
    pub fn is_full(&self) -> bool {
        self.max_violations
            .is_some_and(|max| self.violations.len() >= max)
    }

    /// Per-run storage shared by the rules of one validation.
    pub fn scratch(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.scratch
    }

    fn begin_rule(&mut self, rule: &str) {
        rule.clone_into(&mut self.rule);
        self.path.clear();
    }
}

impl Poolable for ValidationContext {
    fn reset(&mut self) {
        self.rule.clear();
        self.path.clear();
        self.violations.clear();
        self.scratch.clear();
    }
}

/// A validation rule.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;

    fn validate(&self, ctx: &mut ValidationContext, schema: &SchemaGraph, operation: &Operation);
}

/// Collects rules and settings for a [`DocumentValidator`].
pub struct DocumentValidatorBuilder {
    schema_name: String,
    rules: IndexMap<RuleGroup, Vec<Arc<dyn ValidationRule>>>,
    pool: PoolConfig,
    max_violations: Option<usize>,
}

impl Default for DocumentValidatorBuilder {
    fn default() -> Self {
        Self::new("_Default")
    }
}

impl DocumentValidatorBuilder {
    /// Starts a validator for the schema registered under `schema_name`.
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            rules: IndexMap::new(),
            pool: PoolConfig::default(),
            max_violations: None,
        }
    }

    #[must_use]
    pub fn add_rule<R: ValidationRule + 'static>(mut self, group: RuleGroup, rule: R) -> Self {
        self.rules.entry(group).or_default().push(Arc::new(rule));
        self
    }

    #[must_use]
    pub fn add_rules<I>(mut self, group: RuleGroup, rules: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ValidationRule>>,
    {
        self.rules.entry(group).or_default().extend(rules);
        self
    }

    #[must_use]
    pub fn with_pool_config(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Stops collecting after `max` violations.
    #[must_use]
    pub fn with_max_violations(mut self, max: usize) -> Self {
        self.max_violations = Some(max);
        self
    }

    pub fn build(self) -> Result<DocumentValidator, ConfigurationError> {
        if self.schema_name.is_empty() {
            return Err(ConfigurationError::empty("schema name"));
        }
        let max_violations = self.max_violations;
        let pool = ContextPool::new(self.pool, move || ValidationContext {
            max_violations,
            ..ValidationContext::default()
        })?;

        let rules = RuleGroup::ALL
            .iter()
            .filter_map(|group| {
                self.rules
                    .get(group)
                    .filter(|rules| !rules.is_empty())
                    .map(|rules| (*group, rules.clone()))
            })
            .collect();

        Ok(DocumentValidator {
            schema_name: self.schema_name,
            rules,
            pool,
        })
    }
}

impl fmt::Debug for DocumentValidatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentValidatorBuilder")
            .field("schema_name", &self.schema_name)
            .field("rules", &self.rules.values().map(Vec::len).sum::<usize>())
            .field("pool", &self.pool)
            .finish()
    }
}

/// Validates operations against a schema.
pub struct DocumentValidator {
    schema_name: String,
    rules: Vec<(RuleGroup, Vec<Arc<dyn ValidationRule>>)>,
    pool: ContextPool<ValidationContext>,
}

impl DocumentValidator {
    pub fn builder() -> DocumentValidatorBuilder {
        DocumentValidatorBuilder::default()
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn pool(&self) -> &ContextPool<ValidationContext> {
        &self.pool
    }

    /// Names of the configured rules in execution order.
    pub fn rule_names(&self) -> impl Iterator<Item = (RuleGroup, &str)> {
        self.rules
            .iter()
            .flat_map(|(group, rules)| rules.iter().map(move |rule| (*group, rule.name())))
    }

    /// Runs every rule. All violations found are reported together.
    pub async fn validate(&self, schema: &SchemaGraph, operation: &Operation) -> ExecutionResult<()> {
        let mut ctx = self.pool.acquire().await?;

        for (group, rules) in &self.rules {
            for rule in rules {
                if ctx.is_full() {
                    break;
                }
                ctx.begin_rule(rule.name());
                rule.validate(&mut ctx, schema, operation);
            }
            debug!(group = %group, violations = ctx.violations().len(), "validation group finished");
        }

        if ctx.has_violations() {
            let violations = ctx.violations().to_vec();
            return Err(ExecutionError::Validation(ValidationFailure { violations }));
        }
        Ok(())
    }
}

impl fmt::Debug for DocumentValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentValidator")
            .field("schema_name", &self.schema_name)
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Selection;
    use weave_schema::{SchemaBuilder, TypeDefinition};

    struct MaxDepth(usize);

    impl ValidationRule for MaxDepth {
        fn name(&self) -> &str {
            "max-depth"
        }

        fn validate(&self, ctx: &mut ValidationContext, _: &SchemaGraph, operation: &Operation) {
            if operation.depth() > self.0 {
                ctx.report(format!("operation is deeper than {}", self.0));
            }
        }
    }

    struct Named;

    impl ValidationRule for Named {
        fn name(&self) -> &str {
            "named-operation"
        }

        fn validate(&self, ctx: &mut ValidationContext, _: &SchemaGraph, operation: &Operation) {
            if operation.name.is_none() {
                ctx.report("operation must be named");
            }
        }
    }

    fn schema() -> SchemaGraph {
        let mut builder = SchemaBuilder::new();
        builder.add_type(TypeDefinition::object("Query").unwrap().field("ok", "Boolean").unwrap());
        builder.create().unwrap()
    }

    #[test]
    fn test_rules_run_in_group_order() {
        let validator = DocumentValidator::builder()
            .add_rule(RuleGroup::Variable, Named)
            .add_rule(RuleGroup::Document, MaxDepth(1))
            .build()
            .unwrap();

        let names: Vec<_> = validator.rule_names().collect();
        assert_eq!(
            names,
            [(RuleGroup::Document, "max-depth"), (RuleGroup::Variable, "named-operation")]
        );
        assert_eq!(validator.pool().capacity(), 8);
    }

    #[tokio::test]
    async fn test_collects_all_violations() {
        let validator = DocumentValidator::builder()
            .add_rule(RuleGroup::Document, MaxDepth(1))
            .add_rule(RuleGroup::Operation, Named)
            .build()
            .unwrap();
        let operation = Operation::query()
            .select(Selection::field("ok").select(Selection::field("nested")));

        let Err(ExecutionError::Validation(failure)) = validator.validate(&schema(), &operation).await
        else {
            panic!("expected a validation failure");
        };
        assert_eq!(failure.len(), 2);
        assert!(failure.reported_by("max-depth"));
        assert!(failure.reported_by("named-operation"));
        assert_eq!(validator.pool().in_use(), 0);
    }

    #[tokio::test]
    async fn test_violation_limit_and_context_reset() {
        let validator = DocumentValidator::builder()
            .add_rule(RuleGroup::Document, MaxDepth(0))
            .add_rule(RuleGroup::Operation, Named)
            .with_max_violations(1)
            .build()
            .unwrap();
        let operation = Operation::query().select(Selection::field("ok"));

        let err = validator.validate(&schema(), &operation).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Validation(ref f) if f.len() == 1));

        let valid = Operation::query().named("Ok");
        assert!(validator.validate(&schema(), &valid).await.is_ok());
        assert_eq!(validator.pool().created(), 1);
    }

    #[test]
    fn test_rejects_empty_schema_name() {
        assert!(DocumentValidatorBuilder::new("").build().is_err());
    }
}
