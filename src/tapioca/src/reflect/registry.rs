use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::key::TypeKey;
use crate::reflect::TypeDescriptor;

/// Where the container looks up what it knows about concrete types.
#[cfg_attr(test, mockall::automock)]
pub trait TypeRegistry: Send + Sync + 'static {
    /// Registers a descriptor, replacing and returning the previous one for
    /// the same type.
    fn register(&mut self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>>;

    fn describe(&self, key: &TypeKey) -> Option<Arc<TypeDescriptor>>;

    /// Looks a type up by the short name it was registered with.
    fn find(&self, name: &str) -> Option<Arc<TypeDescriptor>>;
}

#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    types: HashMap<TypeKey, Arc<TypeDescriptor>>,
    names: HashMap<&'static str, TypeKey>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TypeRegistry for DescriptorRegistry {
    fn register(&mut self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        let key = descriptor.key();
        let name = descriptor.name();

        let previous = self.types.insert(key, Arc::new(descriptor));
        if let Some(previous) = &previous {
            if self.names.get(previous.name()) == Some(&key) {
                self.names.remove(previous.name());
            }
        }
        if let Some(other) = self.names.insert(name, key).filter(|other| *other != key) {
            warn!(name, previous = %other, key = %key, "type name is taken over by another type");
        }
        previous
    }

    fn describe(&self, key: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.types.get(key).cloned()
    }

    fn find(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.names
            .get(name)
            .and_then(|key| self.types.get(key))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::reflect::Lifetime;

    use super::*;

    struct First;

    struct Second;

    #[test]
    fn descriptor_registry_register_succeeds() {
        let mut registry = DescriptorRegistry::new();
        assert!(registry
            .register(TypeDescriptor::new::<First>("First"))
            .is_none());
        registry.register(TypeDescriptor::new::<Second>("Second"));

        let first = registry.describe(&TypeKey::of::<First>()).unwrap();
        assert_eq!(first.name(), "First");
        let second = registry.find("Second").unwrap();
        assert_eq!(second.key(), TypeKey::of::<Second>());
        assert!(registry.find("Third").is_none());
        assert!(registry.describe(&TypeKey::of::<i32>()).is_none());
    }

    #[test]
    fn descriptor_registry_register_replaces_previous() {
        let mut registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::new::<First>("First"));

        let previous = registry
            .register(TypeDescriptor::new::<First>("First").with_lifetime(Lifetime::Singleton))
            .unwrap();

        assert!(!previous.is_singleton());
        assert!(registry.find("First").unwrap().is_singleton());
    }

    #[test]
    fn descriptor_registry_register_forgets_previous_name() {
        let mut registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::new::<First>("Old"));
        registry.register(TypeDescriptor::new::<First>("New"));

        assert!(registry.find("Old").is_none());
        assert_eq!(registry.find("New").unwrap().key(), TypeKey::of::<First>());
    }

    #[test]
    fn descriptor_registry_name_collision_keeps_both_types() {
        let mut registry = DescriptorRegistry::new();
        registry.register(TypeDescriptor::new::<First>("Shared"));
        registry.register(TypeDescriptor::new::<Second>("Shared"));

        assert_eq!(registry.find("Shared").unwrap().key(), TypeKey::of::<Second>());
        assert!(registry.describe(&TypeKey::of::<First>()).is_some());

        registry.register(TypeDescriptor::new::<First>("First"));
        assert_eq!(registry.find("Shared").unwrap().key(), TypeKey::of::<Second>());
    }
}
