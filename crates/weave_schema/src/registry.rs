//! Raw registrations, recorded in submission order.
//!
//! Nothing here resolves cross-references; the assembler does that when the
//! schema is created.

use crate::binding::BindingInfo;
use crate::context::BuildContext;
use crate::convention::ConventionRegistration;
use crate::definition::{DirectiveInstance, TypeDefinition, TypeExtension};
use crate::directive::DirectiveType;
use crate::interceptor::InterceptorRegistration;
use crate::options::SchemaOptions;
use crate::resolver::{FieldMiddleware, Resolver};
use crate::services::ServiceScope;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use weave_core::ConfigurationError;

/// Root operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    Query,
    Mutation,
    Subscription,
}

impl RootKind {
    pub const ALL: [RootKind; 3] = [Self::Query, Self::Mutation, Self::Subscription];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// The root type name the options fall back to.
    pub fn default_name(self, options: &SchemaOptions) -> &str {
        match self {
            Self::Query => &options.query_type_name,
            Self::Mutation => &options.mutation_type_name,
            Self::Subscription => &options.subscription_type_name,
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The schema definition itself: description, directives and root names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

impl SchemaDefinition {
    pub fn root(&self, kind: RootKind) -> Option<&str> {
        match kind {
            RootKind::Query => self.query.as_deref(),
            RootKind::Mutation => self.mutation.as_deref(),
            RootKind::Subscription => self.subscription.as_deref(),
        }
    }
}

/// A type that describes a schema definition.
pub trait SchemaType {
    fn definition(&self) -> Result<SchemaDefinition, ConfigurationError>;
}

/// Where the schema definition comes from. Only the last one set is used.
pub(crate) enum SchemaSource {
    Definition(SchemaDefinition),
    Configure(Box<dyn Fn(&mut SchemaDefinition)>),
}

impl SchemaSource {
    pub(crate) fn resolve(&self) -> SchemaDefinition {
        match self {
            Self::Definition(definition) => definition.clone(),
            Self::Configure(configure) => {
                let mut definition = SchemaDefinition::default();
                configure(&mut definition);
                definition
            }
        }
    }
}

/// A batch of definitions produced by a deferred loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
    #[serde(default)]
    pub extensions: Vec<TypeExtension>,
    #[serde(default)]
    pub directives: Vec<DirectiveType>,
}

pub(crate) type DocumentLoader = Box<dyn Fn(&ServiceScope) -> Result<SchemaDocument, String>>;

/// One recorded declaration, kept in submission order.
pub(crate) enum Declaration {
    Type(TypeDefinition),
    Extension(TypeExtension),
    Directive(DirectiveType),
    Document(DocumentLoader),
}

pub(crate) enum RootRegistration {
    Definition(TypeDefinition),
    Name(String),
}

pub(crate) enum ContextDataOp {
    Set(String, Value),
    Update(String, Box<dyn Fn(Option<&Value>) -> Value>),
}

pub(crate) struct ResolverRegistration {
    pub(crate) type_name: String,
    pub(crate) field_name: String,
    pub(crate) resolver: Arc<dyn Resolver>,
}

/// Decides whether a value belongs to an object type.
pub type TypeResolverFallback = Arc<dyn Fn(&str, &Value) -> bool + Send + Sync>;

pub(crate) type BeforeCreateHook = Box<dyn FnOnce(&mut BuildContext)>;

/// Everything the builder received, verbatim.
#[derive(Default)]
pub struct DeclarationRegistry {
    pub(crate) declarations: Vec<Declaration>,
    pub(crate) roots: [Option<RootRegistration>; 3],
    pub(crate) schema: Option<SchemaSource>,
    pub(crate) options: SchemaOptions,
    pub(crate) middleware: Vec<Arc<dyn FieldMiddleware>>,
    pub(crate) resolvers: Vec<ResolverRegistration>,
    pub(crate) bindings: Vec<BindingInfo>,
    pub(crate) type_fallback: Option<TypeResolverFallback>,
    pub(crate) services: ServiceScope,
    pub(crate) context_data: Vec<ContextDataOp>,
    pub(crate) interceptors: Vec<InterceptorRegistration>,
    pub(crate) conventions: Vec<ConventionRegistration>,
    pub(crate) before_create: Vec<BeforeCreateHook>,
}

impl DeclarationRegistry {
    /// Applies the context data operations in order.
    pub(crate) fn build_context_data(&self) -> IndexMap<String, Value> {
        let mut data = IndexMap::new();
        for op in &self.context_data {
            match op {
                ContextDataOp::Set(key, value) => {
                    data.insert(key.clone(), value.clone());
                }
                ContextDataOp::Update(key, update) => {
                    let value = update(data.get(key));
                    data.insert(key.clone(), value);
                }
            }
        }
        data
    }

    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }
}

impl fmt::Debug for DeclarationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationRegistry")
            .field("declarations", &self.declarations.len())
            .field("resolvers", &self.resolvers.len())
            .field("bindings", &self.bindings.len())
            .field("interceptors", &self.interceptors)
            .field("conventions", &self.conventions)
            .finish_non_exhaustive()
    }
}
