//! The finalized, immutable schema graph.

use crate::definition::{
    DirectiveInstance, EnumValueDefinition, FieldDefinition, TypeDefinition, TypeKind,
};
use crate::directive::DirectiveType;
use crate::registry::{RootKind, TypeResolverFallback};
use crate::resolver::{Resolver, ResolverContext, ResolverMap};
use crate::services::ServiceScope;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A finalized named type. It has no mutators.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    name: String,
    kind: TypeKind,
    description: Option<String>,
    fields: IndexMap<String, FieldDefinition>,
    interfaces: Vec<String>,
    members: Vec<String>,
    values: IndexMap<String, EnumValueDefinition>,
    directives: Vec<DirectiveInstance>,
}

impl NamedType {
    pub(crate) fn finalize(definition: TypeDefinition, sort_fields: bool) -> Self {
        let mut fields = definition.fields;
        if sort_fields {
            fields.sort_keys();
        }
        Self {
            name: definition.name.into_string(),
            kind: definition.kind,
            description: definition.description,
            fields,
            interfaces: definition.interfaces,
            members: definition.members,
            values: definition.values,
            directives: definition.directives,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Union members.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn values(&self) -> &IndexMap<String, EnumValueDefinition> {
        &self.values
    }

    pub fn directives(&self) -> &[DirectiveInstance] {
        &self.directives
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }

    pub(crate) fn referenced_types(&self) -> impl Iterator<Item = &str> {
        self.fields
            .values()
            .flat_map(|f| {
                std::iter::once(f.ty.named_type())
                    .chain(f.arguments.values().map(|a| a.ty.named_type()))
            })
            .chain(self.interfaces.iter().map(String::as_str))
            .chain(self.members.iter().map(String::as_str))
    }
}

/// The immutable product of a schema build.
///
/// A graph can be shared across threads behind an `Arc` and read without
/// locking.
pub struct SchemaGraph {
    pub(crate) description: Option<String>,
    pub(crate) schema_directives: Vec<DirectiveInstance>,
    pub(crate) types: IndexMap<String, Arc<NamedType>>,
    pub(crate) directive_types: IndexMap<String, DirectiveType>,
    pub(crate) roots: [Option<String>; 3],
    pub(crate) resolvers: ResolverMap,
    pub(crate) type_fallback: Option<TypeResolverFallback>,
    pub(crate) context_data: Arc<IndexMap<String, Value>>,
    pub(crate) services: ServiceScope,
}

impl SchemaGraph {
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn schema_directives(&self) -> &[DirectiveInstance] {
        &self.schema_directives
    }

    /// All types in registration order, built-ins first.
    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values().map(AsRef::as_ref)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name).map(AsRef::as_ref)
    }

    /// Returns a shared handle to a type.
    pub fn type_handle(&self, name: &str) -> Option<Arc<NamedType>> {
        self.types.get(name).cloned()
    }

    pub fn directive_types(&self) -> impl Iterator<Item = &DirectiveType> {
        self.directive_types.values()
    }

    pub fn directive_type(&self, name: &str) -> Option<&DirectiveType> {
        self.directive_types.get(name)
    }

    pub fn root_type(&self, kind: RootKind) -> Option<&NamedType> {
        self.roots[kind.index()]
            .as_deref()
            .and_then(|name| self.get_type(name))
    }

    pub fn query_type(&self) -> Option<&NamedType> {
        self.root_type(RootKind::Query)
    }

    pub fn mutation_type(&self) -> Option<&NamedType> {
        self.root_type(RootKind::Mutation)
    }

    pub fn subscription_type(&self) -> Option<&NamedType> {
        self.root_type(RootKind::Subscription)
    }

    /// Object types an abstract type can resolve to.
    pub fn possible_types(&self, abstract_type: &str) -> Vec<&NamedType> {
        let Some(ty) = self.get_type(abstract_type) else {
            return Vec::new();
        };
        match ty.kind() {
            TypeKind::Union => ty
                .members()
                .iter()
                .filter_map(|m| self.get_type(m))
                .collect(),
            TypeKind::Interface => self
                .types()
                .filter(|t| t.kind() == TypeKind::Object && t.interfaces().iter().any(|i| i == abstract_type))
                .collect(),
            TypeKind::Object => vec![ty],
            _ => Vec::new(),
        }
    }

    /// Picks the object type of a value returned for an abstract type.
    ///
    /// The registered fallback is asked for each possible type in order;
    /// without a fallback the value's `__typename` decides.
    pub fn resolve_abstract_type(&self, abstract_type: &str, value: &Value) -> Option<&NamedType> {
        let candidates = self.possible_types(abstract_type);
        match &self.type_fallback {
            Some(fallback) => candidates.into_iter().find(|t| fallback(t.name(), value)),
            None => {
                let typename = value.get("__typename")?.as_str()?;
                candidates.into_iter().find(|t| t.name() == typename)
            }
        }
    }

    /// Returns the resolver for a field; unregistered fields use the default resolver.
    pub fn resolver(&self, type_name: &str, field_name: &str) -> Arc<dyn Resolver> {
        self.resolvers.get(type_name, field_name)
    }

    pub fn resolvers(&self) -> &ResolverMap {
        &self.resolvers
    }

    pub fn context_data(&self) -> &IndexMap<String, Value> {
        &self.context_data
    }

    pub fn services(&self) -> &ServiceScope {
        &self.services
    }

    /// A resolver context carrying this graph's services and context data.
    pub fn resolver_context(&self) -> ResolverContext {
        ResolverContext {
            services: self.services.clone(),
            context_data: Arc::clone(&self.context_data),
            cancellation: weave_core::CancellationSignal::never(),
        }
    }
}

impl PartialEq for SchemaGraph {
    /// Structural equality; resolvers, services and fallbacks are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && self.schema_directives == other.schema_directives
            && self.types == other.types
            && self.directive_types == other.directive_types
            && self.roots == other.roots
            && self.context_data == other.context_data
    }
}

impl fmt::Debug for SchemaGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaGraph")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("directives", &self.directive_types.keys().collect::<Vec<_>>())
            .field("roots", &self.roots)
            .field("resolvers", &self.resolvers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_graph_is_send_sync() {
        assert_send_sync::<SchemaGraph>();
        assert_send_sync::<NamedType>();
    }
}
