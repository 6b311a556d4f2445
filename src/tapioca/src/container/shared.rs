use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::container::SharedManaged;
use crate::key::TypeKey;

/// Live instances handed out as they are, keyed by the type they are
/// registered under.
pub struct SharedObjects {
    objects: HashMap<TypeKey, Box<dyn SharedManaged>>,
}

impl SharedObjects {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        key: TypeKey,
        object: Box<dyn SharedManaged>,
    ) -> Option<Box<dyn SharedManaged>> {
        self.objects.insert(key, object)
    }

    pub fn remove(&mut self, key: &TypeKey) -> Option<Box<dyn SharedManaged>> {
        self.objects.remove(key)
    }

    /// Returns a new pointer to the instance stored under `key`.
    pub fn get(&self, key: &TypeKey) -> Option<Box<dyn SharedManaged>> {
        self.objects.get(key).map(|object| object.dyn_clone())
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.objects.contains_key(key)
    }
}

impl Debug for SharedObjects {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_set().entries(self.objects.keys()).finish()
    }
}
