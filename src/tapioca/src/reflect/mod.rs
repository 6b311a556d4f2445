//! Runtime type information consumed by the container.
//!
//! A type takes part in injection by providing a [`TypeDescriptor`], usually
//! through the [`injectable`](crate::injectable) attribute.

mod arguments;
mod descriptor;
mod parameter;
mod registry;

use std::error::Error;

use crate::container::Managed;

pub use arguments::{ArgumentError, Arguments, ResolvedArguments};
pub use descriptor::{Constructor, Interface, Method, MethodKind, TypeDescriptor};
pub use parameter::{Parameter, ParameterKind};
pub use registry::{DescriptorRegistry, TypeRegistry};

#[cfg(test)]
pub use registry::MockTypeRegistry;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Whether the container keeps the first constructed instance of a type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Every resolution constructs a new instance.
    #[default]
    Transient,
    /// The first constructed instance is shared afterwards.
    Singleton,
}

/// A concrete type which can describe itself to the container.
pub trait Injectable: Managed + Sized {
    fn describe() -> TypeDescriptor;
}
