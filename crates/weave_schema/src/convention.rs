//! Replaceable policies consulted during assembly.
//!
//! A convention is registered under a *kind*, usually a trait object type such
//! as `dyn NamingConvention`. Each kind holds exactly one instance; a later
//! registration for the same kind replaces the earlier one.

use crate::definition::TypeRef;
use crate::services::ServiceScope;
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use weave_core::{BindingBehavior, MemberDescriptor, MemberKind};

/// Naming policy for inferred schema elements.
pub trait NamingConvention: Send + Sync {
    /// Field name for an external member, `first_name` becomes `firstName`.
    fn field_name(&self, member: &str) -> String {
        to_camel_case(member)
    }

    /// Type name for an external shape.
    fn type_name(&self, shape: &str) -> String {
        shape.to_string()
    }
}

/// The default naming policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingConvention;

impl NamingConvention for DefaultNamingConvention {}

/// Maps external members to schema type references.
pub trait TypeInferenceConvention: Send + Sync {
    /// Infers the type of a member. `shape_type` maps an external shape name
    /// to the schema type bound to it. Returns `None` when the member cannot
    /// be expressed.
    fn infer(
        &self,
        member: &MemberDescriptor,
        shape_type: &dyn Fn(&str) -> Option<String>,
    ) -> Option<TypeRef> {
        let ty = infer_kind(&member.kind, shape_type)?;
        Some(if member.nullable { ty } else { TypeRef::non_null(ty) })
    }
}

fn infer_kind(kind: &MemberKind, shape_type: &dyn Fn(&str) -> Option<String>) -> Option<TypeRef> {
    match kind {
        MemberKind::Scalar(scalar) => Some(TypeRef::named(scalar.type_name())),
        MemberKind::Shape(shape) => shape_type(shape).map(TypeRef::named),
        MemberKind::List(item) => {
            infer_kind(item, shape_type).map(|inner| TypeRef::list(TypeRef::non_null(inner)))
        }
    }
}

/// The default type inference policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeInference;

impl TypeInferenceConvention for DefaultTypeInference {}

/// Binding behavior applied to types that do not choose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindingDefaults {
    pub behavior: BindingBehavior,
}

/// Converts `snake_case` to `camelCase`.
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for (i, c) in s.chars().enumerate() {
        if c == '_' && i > 0 {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts `camelCase` to `snake_case`.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// One instance per convention kind.
#[derive(Default)]
pub struct ConventionRegistry {
    entries: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ConventionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the default conventions.
    pub fn with_defaults(binding: BindingDefaults) -> Self {
        let mut registry = Self::new();
        registry.insert::<dyn NamingConvention>(Arc::new(DefaultNamingConvention));
        registry.insert::<dyn TypeInferenceConvention>(Arc::new(DefaultTypeInference));
        registry.insert::<BindingDefaults>(Arc::new(binding));
        registry
    }

    /// Sets the instance for kind `K`, replacing any previous one.
    pub fn insert<K: ?Sized + Send + Sync + 'static>(&mut self, convention: Arc<K>) {
        self.entries.insert(TypeId::of::<K>(), Box::new(convention));
    }

    /// Returns the instance for kind `K`.
    pub fn get<K: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<K>> {
        self.entries
            .get(&TypeId::of::<K>())
            .and_then(|entry| entry.downcast_ref::<Arc<K>>())
            .cloned()
    }

    pub fn contains<K: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<K>())
    }

    pub fn naming(&self) -> Arc<dyn NamingConvention> {
        self.get::<dyn NamingConvention>()
            .unwrap_or_else(|| Arc::new(DefaultNamingConvention))
    }

    pub fn type_inference(&self) -> Arc<dyn TypeInferenceConvention> {
        self.get::<dyn TypeInferenceConvention>()
            .unwrap_or_else(|| Arc::new(DefaultTypeInference))
    }

    pub fn binding_defaults(&self) -> BindingDefaults {
        self.get::<BindingDefaults>().map(|b| *b).unwrap_or_default()
    }
}

impl fmt::Debug for ConventionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConventionRegistry")
            .field("kinds", &self.entries.len())
            .finish()
    }
}

type ConventionFactory = Box<dyn Fn(&ServiceScope, &mut ConventionRegistry) + Send + Sync>;

/// A deferred convention registration.
pub struct ConventionRegistration {
    kind: &'static str,
    create: ConventionFactory,
}

impl ConventionRegistration {
    /// Registers a factory for kind `K`.
    pub fn new<K, F>(factory: F) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceScope) -> Arc<K> + Send + Sync + 'static,
    {
        Self {
            kind: std::any::type_name::<K>(),
            create: Box::new(move |services, registry| registry.insert::<K>(factory(services))),
        }
    }

    /// The kind's type name.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub(crate) fn apply(&self, services: &ServiceScope, registry: &mut ConventionRegistry) {
        (self.create)(services, registry);
    }
}

impl fmt::Debug for ConventionRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConventionRegistration")
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{ScalarKind, ShapeDescriptor};

    struct Shouting;

    impl NamingConvention for Shouting {
        fn field_name(&self, member: &str) -> String {
            member.to_uppercase()
        }
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_camel_case("first_name"), "firstName");
        assert_eq!(to_camel_case("age"), "age");
        assert_eq!(to_camel_case("_id"), "_id");
        assert_eq!(to_snake_case("firstName"), "first_name");
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = ConventionRegistry::with_defaults(BindingDefaults::default());
        let services = ServiceScope::new();
        ConventionRegistration::new::<dyn NamingConvention, _>(|_| Arc::new(DefaultNamingConvention))
            .apply(&services, &mut registry);
        ConventionRegistration::new::<dyn NamingConvention, _>(|_| Arc::new(Shouting))
            .apply(&services, &mut registry);

        assert_eq!(registry.naming().field_name("age"), "AGE");
    }

    #[test]
    fn test_default_inference() {
        let shape = ShapeDescriptor::new("Person")
            .scalar("name", ScalarKind::String)
            .optional("friends", MemberKind::List(Box::new(MemberKind::Shape("Person".into()))))
            .optional("pet", MemberKind::Shape("Pet".into()));
        let inference = DefaultTypeInference;
        let lookup = |name: &str| (name == "Person").then(|| "Person".to_string());

        let name = inference.infer(shape.get("name").unwrap(), &lookup).unwrap();
        assert_eq!(name.to_string(), "String!");
        let friends = inference.infer(shape.get("friends").unwrap(), &lookup).unwrap();
        assert_eq!(friends.to_string(), "[Person!]");
        assert!(inference.infer(shape.get("pet").unwrap(), &lookup).is_none());
    }
}
