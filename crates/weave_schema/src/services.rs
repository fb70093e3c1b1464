//! Type-keyed service scope.
//!
//! Interceptor factories, convention factories and document loaders receive a
//! [`ServiceScope`] to pull their collaborators from.

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A cloneable, type-keyed collection of shared services.
///
/// # Example
///
/// ```
/// use weave_schema::ServiceScope;
///
/// struct Clock(u64);
///
/// let mut scope = ServiceScope::new();
/// scope.insert(Clock(42));
///
/// assert_eq!(scope.get::<Clock>().unwrap().0, 42);
/// assert!(scope.get::<String>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct ServiceScope {
    services: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a service, replacing any previous one of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) {
        self.services.insert(TypeId::of::<T>(), Arc::new(service));
    }

    /// Inserts an already shared service.
    pub fn insert_shared<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), service);
    }

    /// Gets a service by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// Returns true if a service of the given type is present.
    pub fn contains<T: 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Copies every service of `other` into this scope; `other` wins on conflicts.
    pub fn merge(&mut self, other: &ServiceScope) {
        for (id, service) in &other.services {
            self.services.insert(*id, Arc::clone(service));
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceScope")
            .field("service_count", &self.services.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_insert_replaces() {
        let mut scope = ServiceScope::new();
        scope.insert(Tenant("a"));
        scope.insert(Tenant("b"));
        assert_eq!(scope.len(), 1);
        assert_eq!(*scope.get::<Tenant>().unwrap(), Tenant("b"));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut first = ServiceScope::new();
        first.insert(Tenant("a"));
        first.insert(7_u32);
        let mut second = ServiceScope::new();
        second.insert(Tenant("b"));

        first.merge(&second);
        assert_eq!(*first.get::<Tenant>().unwrap(), Tenant("b"));
        assert_eq!(*first.get::<u32>().unwrap(), 7);
    }
}
