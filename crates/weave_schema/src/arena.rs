//! Working set of type definitions during assembly.

use crate::definition::TypeDefinition;
use rustc_hash::FxHashMap;

/// Stable handle to a definition in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(usize);

impl DefId {
    /// Creates a DefId from a raw value.
    pub const fn from_raw(value: usize) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

/// Definitions in registration order.
///
/// Two definitions may share a name while the arena is being filled; the
/// first one owns the name and later ones are reported as duplicates.
#[derive(Debug, Default)]
pub struct TypeArena {
    definitions: Vec<TypeDefinition>,
    by_name: FxHashMap<String, Vec<DefId>>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a definition and returns its handle.
    pub fn insert(&mut self, definition: TypeDefinition) -> DefId {
        let id = DefId(self.definitions.len());
        self.by_name
            .entry(definition.name.to_string())
            .or_default()
            .push(id);
        self.definitions.push(definition);
        id
    }

    pub fn get(&self, id: DefId) -> &TypeDefinition {
        &self.definitions[id.0]
    }

    pub fn get_mut(&mut self, id: DefId) -> &mut TypeDefinition {
        &mut self.definitions[id.0]
    }

    /// Returns the definition that owns the name.
    pub fn by_name(&self, name: &str) -> Option<&TypeDefinition> {
        self.id_of(name).map(|id| self.get(id))
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut TypeDefinition> {
        self.id_of(name).map(|id| self.get_mut(id))
    }

    pub fn id_of(&self, name: &str) -> Option<DefId> {
        self.by_name.get(name).and_then(|ids| ids.first().copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Handles in registration order.
    pub fn ids(&self) -> impl Iterator<Item = DefId> {
        (0..self.definitions.len()).map(DefId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DefId, &TypeDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (DefId(i), d))
    }

    /// Definitions that own their name, in registration order.
    pub fn canonical(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.iter()
            .filter(|(id, d)| self.id_of(&d.name) == Some(*id))
            .map(|(_, d)| d)
    }

    /// Names registered more than once, in first-registration order.
    pub fn duplicates(&self) -> Vec<&str> {
        self.canonical()
            .filter(|d| self.by_name.get(d.name.as_str()).is_some_and(|ids| ids.len() > 1))
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Moves a handle to a new name after its definition was renamed.
    pub fn reindex(&mut self, id: DefId, old_name: &str) {
        if let Some(ids) = self.by_name.get_mut(old_name) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_name.remove(old_name);
            }
        }
        let new_name = self.get(id).name.to_string();
        let ids = self.by_name.entry(new_name).or_default();
        ids.push(id);
        ids.sort_unstable();
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_owns_name() {
        let mut arena = TypeArena::new();
        let first = arena.insert(TypeDefinition::object("Person").unwrap());
        arena.insert(TypeDefinition::interface("Person").unwrap());

        assert_eq!(arena.id_of("Person"), Some(first));
        assert_eq!(arena.duplicates(), ["Person"]);
        assert_eq!(arena.canonical().count(), 1);
    }

    #[test]
    fn test_ids_follow_registration_order() {
        let mut arena = TypeArena::new();
        let first = arena.insert(TypeDefinition::object("A").unwrap());
        let second = arena.insert(TypeDefinition::object("B").unwrap());

        assert_eq!(first.as_raw(), 0);
        assert_eq!(second, DefId::from_raw(1));
        assert_eq!(arena.ids().collect::<Vec<_>>(), [first, second]);
    }

    #[test]
    fn test_reindex_after_rename() {
        let mut arena = TypeArena::new();
        let id = arena.insert(TypeDefinition::object("Person").unwrap());
        arena.get_mut(id).name = weave_core::Name::new("Human").unwrap();
        arena.reindex(id, "Person");

        assert!(!arena.contains("Person"));
        assert_eq!(arena.id_of("Human"), Some(id));
    }
}
