//! Name table of the states registered in one machine.

use super::identity::{StateId, StateIdentity};
use std::collections::HashMap;

/// Maps registration names to [`StateIdentity`] values.
///
/// Identities are stored in registration order and addressed by
/// [`StateId`], so enumeration is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    identities: Vec<StateIdentity>,
    by_name: HashMap<String, StateId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next handle for `name`.
    ///
    /// Returns `None` without touching the table if the name is taken.
    pub(crate) fn insert(&mut self, name: String, type_name: &'static str) -> Option<StateId> {
        if self.by_name.contains_key(&name) {
            return None;
        }
        let id = StateId::new(self.identities.len());
        self.by_name.insert(name.clone(), id);
        self.identities.push(StateIdentity::new(id, name, type_name));
        Some(id)
    }

    pub fn lookup(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn identity(&self, id: StateId) -> Option<&StateIdentity> {
        self.identities.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&StateIdentity> {
        self.lookup(name).and_then(|id| self.identity(id))
    }

    /// Name of a handle, or `"<none>"` for handles this table never issued.
    pub fn name_of(&self, id: StateId) -> &str {
        self.identity(id).map_or("<none>", StateIdentity::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateIdentity> {
        self.identities.iter()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_sequential_handles() {
        let mut registry = Registry::new();
        let green = registry.insert("Green".into(), "t::Green").unwrap();
        let yellow = registry.insert("Yellow".into(), "t::Yellow").unwrap();

        assert_eq!(green.index(), 0);
        assert_eq!(yellow.index(), 1);
        assert_eq!(registry.lookup("Yellow"), Some(yellow));
        assert_eq!(registry.name_of(green), "Green");
    }

    #[test]
    fn duplicate_name_leaves_table_unchanged() {
        let mut registry = Registry::new();
        registry.insert("Green".into(), "t::Green").unwrap();

        assert!(registry.insert("Green".into(), "t::Other").is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_name("Green").unwrap().type_name(), "t::Green");
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut registry = Registry::new();
        for name in ["Red", "Green", "Yellow"] {
            registry.insert(name.into(), "t::Light").unwrap();
        }

        let names: Vec<&str> = registry.iter().map(StateIdentity::name).collect();
        assert_eq!(names, vec!["Red", "Green", "Yellow"]);
    }

    #[test]
    fn unknown_handle_has_placeholder_name() {
        let registry = Registry::new();
        assert_eq!(registry.name_of(StateId::new(7)), "<none>");
        assert!(registry.is_empty());
    }
}
