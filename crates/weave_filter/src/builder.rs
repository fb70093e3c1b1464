//! The filter input builder.

use crate::compiler::FilterCompiler;
use crate::compiled::CompiledFilter;
use crate::convention::{DefaultFilterConvention, FilterConvention};
use crate::definition::{FilterFieldDefinition, FilterInputDefinition, FilterOperationDefinition};
use crate::error::CompilationResult;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use weave_core::{BindingBehavior, ConfigurationError, DataShape, Member, Name, ShapeDescriptor};
use weave_schema::DirectiveInstance;

/// A directive with a default instance, attached by type.
pub trait FilterDirective {
    fn instance() -> Result<DirectiveInstance, ConfigurationError>;
}

/// Builds the filter input of elements of type `T`.
///
/// Every setter records the declaration only. Duplicate operation codes,
/// unknown ignore targets and unknown members are reported by
/// [`FilterInputBuilder::compile`].
///
/// ```
/// use weave_core::{ScalarKind, ShapeDescriptor};
/// use weave_filter::FilterInputBuilder;
/// use serde_json::{json, Value};
///
/// let shape = ShapeDescriptor::new("Person")
///     .scalar("name", ScalarKind::String)
///     .scalar("age", ScalarKind::Int);
///
/// let mut builder = FilterInputBuilder::<Value>::for_shape(shape);
/// builder.ignore("age").unwrap();
/// let filter = builder.compile().unwrap();
///
/// assert!(filter.field("name").is_some());
/// assert!(filter.field("age").is_none());
/// ```
pub struct FilterInputBuilder<T> {
    shape: ShapeDescriptor,
    definition: FilterInputDefinition,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DataShape> FilterInputBuilder<T> {
    /// Creates a builder over the statically known shape of `T`.
    pub fn new() -> Self {
        Self::for_shape(T::shape())
    }
}

impl<T: DataShape> Default for FilterInputBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FilterInputBuilder<T> {
    /// Creates a builder over an explicitly supplied shape.
    pub fn for_shape(shape: ShapeDescriptor) -> Self {
        Self::from_definition(shape, FilterInputDefinition::default())
    }

    /// Continues from an existing definition.
    pub fn from_definition(shape: ShapeDescriptor, definition: FilterInputDefinition) -> Self {
        Self {
            shape,
            definition,
            _marker: PhantomData,
        }
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn definition(&self) -> &FilterInputDefinition {
        &self.definition
    }

    pub fn name(&mut self, name: &str) -> Result<&mut Self, ConfigurationError> {
        self.definition.name = Some(Name::new(name)?.into_string());
        Ok(self)
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.definition.description = Some(description.into());
        self
    }

    pub fn bind_fields(&mut self, behavior: BindingBehavior) -> &mut Self {
        self.definition.binding = Some(behavior);
        self
    }

    pub fn bind_fields_explicitly(&mut self) -> &mut Self {
        self.bind_fields(BindingBehavior::Explicit)
    }

    pub fn bind_fields_implicitly(&mut self) -> &mut Self {
        self.bind_fields(BindingBehavior::Implicit)
    }

    /// Declares a type-level operation and returns it for further configuration.
    pub fn operation(&mut self, code: i32) -> &mut FilterOperationDefinition {
        self.definition
            .operations
            .push(FilterOperationDefinition::new(code));
        let last = self.definition.operations.len() - 1;
        &mut self.definition.operations[last]
    }

    /// Declares a field over a member path.
    pub fn field(&mut self, member: &str) -> Result<&mut FilterFieldDefinition, ConfigurationError> {
        if member.split('.').any(str::is_empty) {
            return Err(ConfigurationError::invalid(format!(
                "`{member}` is not a valid member path"
            )));
        }
        self.definition
            .fields
            .push(FilterFieldDefinition::new(member));
        let last = self.definition.fields.len() - 1;
        Ok(&mut self.definition.fields[last])
    }

    /// Declares a field through a typed member selector.
    pub fn field_of(
        &mut self,
        member: Member<T>,
    ) -> Result<&mut FilterFieldDefinition, ConfigurationError> {
        let field = self.field(member.path())?;
        if let Some(operand) = member.operand() {
            field.operand(operand);
        }
        Ok(field)
    }

    /// Ignores a field by field name or member path.
    pub fn ignore(&mut self, name: &str) -> Result<&mut Self, ConfigurationError> {
        if name.is_empty() {
            return Err(ConfigurationError::empty("ignored field name"));
        }
        self.definition.ignored_fields.push(name.to_string());
        Ok(self)
    }

    /// Ignores a member selected by a typed selector.
    pub fn ignore_member(&mut self, member: Member<T>) -> &mut Self {
        self.definition
            .ignored_fields
            .push(member.path().to_string());
        self
    }

    /// Ignores an operation code on the type and on every field.
    pub fn ignore_operation(&mut self, code: i32) -> &mut Self {
        self.definition.ignored_operations.push(code);
        self
    }

    pub fn directive(&mut self, directive: DirectiveInstance) -> &mut Self {
        self.definition.directives.push(directive);
        self
    }

    /// Attaches a directive by name with arguments.
    pub fn directive_named(
        &mut self,
        name: &str,
        arguments: IndexMap<String, Value>,
    ) -> Result<&mut Self, ConfigurationError> {
        let mut directive = DirectiveInstance::new(name)?;
        for (argument, value) in arguments {
            directive = directive.argument(&argument, value)?;
        }
        Ok(self.directive(directive))
    }

    /// Attaches the default instance of `D`.
    pub fn directive_of<D: FilterDirective>(&mut self) -> Result<&mut Self, ConfigurationError> {
        let directive = D::instance()?;
        Ok(self.directive(directive))
    }

    /// Compiles with the built-in convention.
    pub fn compile(&self) -> CompilationResult<CompiledFilter<T>> {
        self.compile_with(&DefaultFilterConvention)
    }

    pub fn compile_with(
        &self,
        convention: &dyn FilterConvention,
    ) -> CompilationResult<CompiledFilter<T>> {
        FilterCompiler::new(&self.shape, convention).compile(&self.definition)
    }
}

impl<T> fmt::Debug for FilterInputBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterInputBuilder")
            .field("shape", &self.shape.name)
            .field("definition", &self.definition)
            .finish()
    }
}
