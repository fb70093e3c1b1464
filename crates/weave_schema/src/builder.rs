//! The schema builder.
//!
//! Registration calls are recorded verbatim and resolved only by
//! [`SchemaBuilder::create`]. Calls that receive invalid input fail at once
//! with a [`ConfigurationError`].

use crate::assembler::assemble;
use crate::binding::BindingInfo;
use crate::context::BuildContext;
use crate::convention::ConventionRegistration;
use crate::definition::{TypeDefinition, TypeExtension};
use crate::directive::DirectiveType;
use crate::error::SchemaError;
use crate::graph::SchemaGraph;
use crate::interceptor::{InterceptorRegistration, TypeInterceptor};
use crate::options::SchemaOptions;
use crate::registry::{
    ContextDataOp, Declaration, DeclarationRegistry, ResolverRegistration, RootKind,
    RootRegistration, SchemaDefinition, SchemaDocument, SchemaSource, SchemaType,
};
use crate::resolver::{
    FieldMiddleware, FnResolver, Resolver, ResolverArgs, ResolverContext, ResolverInfo,
    ResolverResult,
};
use crate::services::ServiceScope;
use serde_json::Value;
use std::sync::Arc;
use weave_core::{ConfigurationError, Name, ShapeDescriptor};

/// Collects declarations and creates a [`SchemaGraph`].
///
/// # Example
///
/// ```
/// use weave_schema::{SchemaBuilder, TypeDefinition};
///
/// let mut builder = SchemaBuilder::new();
/// builder.add_type(TypeDefinition::object("Query")?.field("hello", "String")?);
/// let schema = builder.create()?;
///
/// assert_eq!(schema.query_type().map(|t| t.name()), Some("Query"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    registry: DeclarationRegistry,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema definition. A later call replaces it.
    pub fn set_schema(&mut self, definition: SchemaDefinition) -> Result<&mut Self, ConfigurationError> {
        for kind in RootKind::ALL {
            if let Some(name) = definition.root(kind) {
                Name::new(name)?;
            }
        }
        self.registry.schema = Some(SchemaSource::Definition(definition));
        Ok(self)
    }

    /// Sets the schema definition from a [`SchemaType`].
    pub fn set_schema_type<S: SchemaType + Default>(&mut self) -> Result<&mut Self, ConfigurationError> {
        let definition = S::default().definition()?;
        self.set_schema(definition)
    }

    /// Sets the schema definition from a configuration function run at create time.
    pub fn configure_schema<F>(&mut self, configure: F) -> &mut Self
    where
        F: Fn(&mut SchemaDefinition) + 'static,
    {
        self.registry.schema = Some(SchemaSource::Configure(Box::new(configure)));
        self
    }

    /// Replaces the options.
    pub fn set_options(&mut self, options: SchemaOptions) -> Result<&mut Self, ConfigurationError> {
        options.validate()?;
        self.registry.options = options;
        Ok(self)
    }

    /// Edits the options in place.
    pub fn modify_options<F>(&mut self, modify: F) -> Result<&mut Self, ConfigurationError>
    where
        F: FnOnce(&mut SchemaOptions),
    {
        let mut options = self.registry.options.clone();
        modify(&mut options);
        self.set_options(options)
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.registry.options
    }

    /// Wraps every field resolver, explicit or default.
    pub fn use_field_middleware<M: FieldMiddleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.registry.middleware.push(Arc::new(middleware));
        self
    }

    /// Registers a document produced by `loader` when the schema is created.
    pub fn add_document<F>(&mut self, loader: F) -> &mut Self
    where
        F: Fn(&ServiceScope) -> Result<SchemaDocument, String> + 'static,
    {
        self.registry
            .declarations
            .push(Declaration::Document(Box::new(loader)));
        self
    }

    pub fn add_type(&mut self, definition: TypeDefinition) -> &mut Self {
        self.registry.declarations.push(Declaration::Type(definition));
        self
    }

    pub fn add_type_extension(&mut self, extension: TypeExtension) -> &mut Self {
        self.registry
            .declarations
            .push(Declaration::Extension(extension));
        self
    }

    pub fn add_directive_type(&mut self, directive: DirectiveType) -> &mut Self {
        self.registry
            .declarations
            .push(Declaration::Directive(directive));
        self
    }

    /// Binds an external shape to one schema type.
    pub fn bind_external_type(
        &mut self,
        shape: ShapeDescriptor,
        type_name: &str,
    ) -> Result<&mut Self, ConfigurationError> {
        self.add_binding(BindingInfo::new(shape, [type_name]))
    }

    /// Registers a root type. A later registration for the same kind replaces it.
    pub fn add_root_type(&mut self, definition: TypeDefinition, kind: RootKind) -> &mut Self {
        self.registry.roots[kind.index()] = Some(RootRegistration::Definition(definition));
        self
    }

    /// Makes a type registered elsewhere the root of `kind`, replacing any earlier root.
    pub fn assign_root_type(&mut self, type_name: &str, kind: RootKind) -> Result<&mut Self, ConfigurationError> {
        let name = Name::new(type_name)?;
        self.registry.roots[kind.index()] = Some(RootRegistration::Name(name.into_string()));
        Ok(self)
    }

    /// Registers a resolver for a field.
    pub fn add_resolver<R: Resolver + 'static>(
        &mut self,
        type_name: &str,
        field_name: &str,
        resolver: R,
    ) -> Result<&mut Self, ConfigurationError> {
        let type_name = Name::new(type_name)?.into_string();
        let field_name = Name::new(field_name)?.into_string();
        self.registry.resolvers.push(ResolverRegistration {
            type_name,
            field_name,
            resolver: Arc::new(resolver),
        });
        Ok(self)
    }

    /// Registers a sync function as a resolver.
    pub fn add_resolver_fn<F>(
        &mut self,
        type_name: &str,
        field_name: &str,
        f: F,
    ) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&Value, &ResolverArgs, &ResolverContext, &ResolverInfo) -> ResolverResult
            + Send
            + Sync
            + 'static,
    {
        self.add_resolver(type_name, field_name, FnResolver::new(f))
    }

    pub fn add_binding(&mut self, binding: BindingInfo) -> Result<&mut Self, ConfigurationError> {
        if binding.shape.name.is_empty() {
            return Err(ConfigurationError::empty("shape name"));
        }
        if binding.type_names.is_empty() {
            return Err(ConfigurationError::empty("bound type names"));
        }
        for name in &binding.type_names {
            Name::new(name.as_str())?;
        }
        self.registry.bindings.push(binding);
        Ok(self)
    }

    /// Sets the function that decides whether a value belongs to an object type.
    pub fn set_type_resolver_fallback<F>(&mut self, fallback: F) -> &mut Self
    where
        F: Fn(&str, &Value) -> bool + Send + Sync + 'static,
    {
        self.registry.type_fallback = Some(Arc::new(fallback));
        self
    }

    /// Adds services; later services replace earlier ones of the same type.
    pub fn add_services(&mut self, services: &ServiceScope) -> &mut Self {
        self.registry.services.merge(services);
        self
    }

    /// Sets a context data entry. A later write to the same key wins.
    pub fn set_context_data(&mut self, key: &str, value: Value) -> Result<&mut Self, ConfigurationError> {
        if key.is_empty() {
            return Err(ConfigurationError::empty("context data key"));
        }
        self.registry
            .context_data
            .push(ContextDataOp::Set(key.to_string(), value));
        Ok(self)
    }

    /// Replaces a context data entry with the result of `update`.
    pub fn update_context_data<F>(&mut self, key: &str, update: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(Option<&Value>) -> Value + 'static,
    {
        if key.is_empty() {
            return Err(ConfigurationError::empty("context data key"));
        }
        self.registry
            .context_data
            .push(ContextDataOp::Update(key.to_string(), Box::new(update)));
        Ok(self)
    }

    /// Registers an interceptor instance.
    pub fn add_type_interceptor<I: TypeInterceptor + 'static>(&mut self, interceptor: I) -> &mut Self {
        self.registry
            .interceptors
            .push(InterceptorRegistration::Instance(Arc::new(interceptor)));
        self
    }

    /// Registers an interceptor type, created once per build.
    pub fn add_type_interceptor_type<I: TypeInterceptor + Default + 'static>(&mut self) -> &mut Self {
        self.registry
            .interceptors
            .push(InterceptorRegistration::of_type::<I>());
        self
    }

    /// Registers a fallible interceptor factory, called once per build.
    pub fn add_type_interceptor_factory<F>(&mut self, name: &str, create: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&ServiceScope) -> Result<Arc<dyn TypeInterceptor>, String> + 'static,
    {
        if name.is_empty() {
            return Err(ConfigurationError::empty("interceptor name"));
        }
        self.registry.interceptors.push(InterceptorRegistration::Factory {
            name: name.to_string(),
            create: Box::new(create),
        });
        Ok(self)
    }

    /// Registers a convention of kind `K`. A later registration for the same kind wins.
    pub fn add_convention<K, F>(&mut self, factory: F) -> &mut Self
    where
        K: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceScope) -> Arc<K> + Send + Sync + 'static,
    {
        self.registry
            .conventions
            .push(ConventionRegistration::new::<K, F>(factory));
        self
    }

    /// Runs `hook` after conventions are set up and before any type is collected.
    pub fn on_before_create<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(&mut BuildContext) + 'static,
    {
        self.registry.before_create.push(Box::new(hook));
        self
    }

    /// Creates the schema, or fails with every violation found.
    pub fn create(self) -> Result<SchemaGraph, SchemaError> {
        assemble(self.registry)
    }
}
