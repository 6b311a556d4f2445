mod binding;
mod core;
mod error;
mod handle;
mod resolve;
mod shared;

use std::sync::Arc;

use crate::key::TypeKey;
use crate::util::any::AsAny;

pub use self::core::Container;
pub use error::{ContainerError, Unresolvable};
pub use handle::SharedContainer;

/// A value the container can move around in type-erased form.
pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// A type-erased shared pointer, i.e. an `Arc<T>` where `T` may be a trait
/// object. Shared instances, singletons and injected dependencies are all
/// stored in this form.
pub trait SharedManaged: Managed {
    /// Clones the pointer, not the pointee.
    fn dyn_clone(&self) -> Box<dyn SharedManaged>;

    fn upcast_managed(self: Box<Self>) -> Box<dyn Managed>;

    /// Returns the key of the pointee type, i.e. `T` for an `Arc<T>`.
    fn target(&self) -> TypeKey;
}

impl<T> SharedManaged for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn dyn_clone(&self) -> Box<dyn SharedManaged> {
        Box::new(Arc::clone(self))
    }

    fn upcast_managed(self: Box<Self>) -> Box<dyn Managed> {
        self
    }

    fn target(&self) -> TypeKey {
        TypeKey::of::<T>()
    }
}
