use std::borrow::Cow;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::container::Managed;
use crate::key::TypeKey;

/// How the container fills a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// An `Arc<T>` parameter, resolved from the container by the key of `T`.
    Typed(TypeKey),
    /// Any other parameter, filled from explicit arguments. The key is the
    /// expected type of the argument.
    Untyped(TypeKey),
}

/// Describes one parameter of a constructor or a callable.
pub struct Parameter {
    name: Cow<'static, str>,
    kind: ParameterKind,
    default: Option<Box<dyn Fn() -> Box<dyn Managed> + Send + Sync>>,
}

impl Parameter {
    /// A parameter of type `Arc<T>`.
    pub fn typed<T>(name: impl Into<Cow<'static, str>>) -> Self
    where
        T: Send + Sync + ?Sized + 'static,
    {
        Self::new(name, ParameterKind::Typed(TypeKey::of::<T>()))
    }

    /// A parameter of type `T` filled from explicit arguments.
    pub fn untyped<T>(name: impl Into<Cow<'static, str>>) -> Self
    where
        T: Managed,
    {
        Self::new(name, ParameterKind::Untyped(TypeKey::of::<T>()))
    }

    /// A parameter of type `T` filled from explicit arguments, falling back
    /// to `default()` when none is left.
    pub fn optional<T>(name: impl Into<Cow<'static, str>>, default: fn() -> T) -> Self
    where
        T: Managed,
    {
        Self {
            default: Some(Box::new(move || -> Box<dyn Managed> { Box::new(default()) })),
            ..Self::untyped::<T>(name)
        }
    }

    fn new(name: impl Into<Cow<'static, str>>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Produces a fresh default value, if the parameter has one.
    pub fn default_value(&self) -> Option<Box<dyn Managed>> {
        self.default.as_ref().map(|default| default())
    }
}

impl Debug for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_default", &self.has_default())
            .finish()
    }
}
