use std::collections::HashMap;

use crate::key::TypeKey;

/// Abstract-to-concrete substitutions. Each abstraction maps to exactly one
/// implementation and lookups never follow more than one hop.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<TypeKey, TypeKey>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, abstract_key: TypeKey, concrete: TypeKey) -> Option<TypeKey> {
        self.bindings.insert(abstract_key, concrete)
    }

    pub fn remove(&mut self, abstract_key: &TypeKey) -> Option<TypeKey> {
        self.bindings.remove(abstract_key)
    }

    pub fn get(&self, abstract_key: &TypeKey) -> Option<TypeKey> {
        self.bindings.get(abstract_key).copied()
    }

    /// Returns the type that should actually be constructed for `key`.
    pub fn target(&self, key: TypeKey) -> TypeKey {
        self.get(&key).unwrap_or(key)
    }
}
