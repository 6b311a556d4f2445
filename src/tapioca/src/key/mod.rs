use std::any::{self, TypeId};
use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

/// The identity of a type known to a container.
///
/// Both concrete types and abstractions have keys. An abstraction is written
/// as a trait object, so `TypeKey::of::<dyn Repository>()` names the
/// `Repository` interface while `TypeKey::of::<SqlRepository>()` names one of
/// its implementations.
///
/// Two keys are equal if and only if they refer to the same [`TypeId`]. The
/// type name is only kept for diagnostics.
///
/// # Examples
///
/// ```rust
/// # use tapioca::key::TypeKey;
/// trait Repository: Send + Sync {}
///
/// let key = TypeKey::of::<dyn Repository>();
/// assert_eq!(key, TypeKey::of::<dyn Repository>());
/// assert_ne!(key, TypeKey::of::<i32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name, e.g. `dyn app::Repository`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Borrow<TypeId> for TypeKey {
    fn borrow(&self) -> &TypeId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    trait Contract: Send + Sync {}

    struct Implementation;

    impl Contract for Implementation {}

    #[test]
    fn type_key_eq_succeeds() {
        assert_eq!(TypeKey::of::<i32>(), TypeKey::of::<i32>());
        assert_eq!(TypeKey::of::<dyn Contract>(), TypeKey::of::<dyn Contract>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<i64>());
        assert_ne!(
            TypeKey::of::<dyn Contract>(),
            TypeKey::of::<Implementation>()
        );
        assert_ne!(
            TypeKey::of::<Implementation>(),
            TypeKey::of::<Arc<Implementation>>()
        );
    }

    #[test]
    fn type_key_lookup_by_type_id_succeeds() {
        let keys = HashSet::from([TypeKey::of::<i32>(), TypeKey::of::<dyn Contract>()]);

        assert!(keys.contains(&TypeId::of::<i32>()));
        assert!(keys.contains(&TypeId::of::<dyn Contract>()));
        assert!(!keys.contains(&TypeId::of::<Implementation>()));
    }

    #[test]
    fn type_key_display_succeeds() {
        let key = TypeKey::of::<dyn Contract>();
        assert!(key.to_string().ends_with("Contract"));
        assert_eq!(key.name(), any::type_name::<dyn Contract>());
    }
}
