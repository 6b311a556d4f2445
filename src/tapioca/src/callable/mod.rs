//! Things [`Container::tap`] can call.
//!
//! [`Container::tap`]: crate::container::Container::tap

mod function;

use std::any;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::Managed;
use crate::key::TypeKey;
use crate::reflect::{ArgumentError, Parameter, ResolvedArguments};

pub use function::Function;
pub(crate) use function::{ErasedFunction, FunctionWrapper};

/// A reference to a function or method whose parameters the container
/// resolves.
pub struct Callable<'a> {
    name: String,
    target: Target<'a>,
}

pub(crate) enum Target<'a> {
    Function(Box<dyn ErasedFunction + 'a>),
    Method {
        receiver: Option<&'a dyn Managed>,
        owner: Owner,
        method: String,
    },
}

pub(crate) enum Owner {
    Key(TypeKey),
    Name(String),
}

impl<'a> Callable<'a> {
    /// A closure or function whose parameters are all [`FunctionParameter`]s.
    pub fn function<F, D>(function: F) -> Self
    where
        F: Function<D> + 'a,
        D: 'static,
    {
        Self {
            name: any::type_name::<F>().to_owned(),
            target: Target::Function(Box::new(FunctionWrapper::new(function))),
        }
    }

    /// A method of `instance`'s registered type. Static methods can be called
    /// this way as well.
    pub fn method<T>(instance: &'a T, method: &str) -> Self
    where
        T: Managed,
    {
        let owner = TypeKey::of::<T>();
        Self {
            name: format!("{owner}::{method}"),
            target: Target::Method {
                receiver: Some(instance),
                owner: Owner::Key(owner),
                method: method.to_owned(),
            },
        }
    }

    /// A method named on the registered type `T` alone.
    pub fn static_method<T>(method: &str) -> Self
    where
        T: ?Sized + 'static,
    {
        let owner = TypeKey::of::<T>();
        Self {
            name: format!("{owner}::{method}"),
            target: Target::Method {
                receiver: None,
                owner: Owner::Key(owner),
                method: method.to_owned(),
            },
        }
    }

    /// A `"Type::method"` reference, where `Type` is the name the type was
    /// registered with.
    pub fn path(reference: &str) -> Self {
        let (owner, method) = reference.rsplit_once("::").unwrap_or((reference, ""));
        Self {
            name: reference.to_owned(),
            target: Target::Method {
                receiver: None,
                owner: Owner::Name(owner.to_owned()),
                method: method.to_owned(),
            },
        }
    }

    pub(crate) fn into_target(self) -> Target<'a> {
        self.target
    }
}

impl Display for Callable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name)
    }
}

/// Marks a parameter of a [`Callable::function`] that is filled from
/// explicit arguments rather than from the container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arg<T>(pub T);

/// A parameter type [`Function`]s may declare.
///
/// `Arc<T>` is resolved from the container by the key of `T`, while
/// [`Arg<T>`] consumes the next explicit argument.
pub trait FunctionParameter: Sized + 'static {
    fn describe(position: usize) -> Parameter;

    /// # Errors
    ///
    /// Returns an error if the next argument is missing or has another type.
    fn extract(arguments: &mut ResolvedArguments) -> Result<Self, ArgumentError>;
}

impl<T> FunctionParameter for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn describe(position: usize) -> Parameter {
        Parameter::typed::<T>(format!("#{position}"))
    }

    fn extract(arguments: &mut ResolvedArguments) -> Result<Self, ArgumentError> {
        arguments.take()
    }
}

impl<T> FunctionParameter for Arg<T>
where
    T: Managed,
{
    fn describe(position: usize) -> Parameter {
        Parameter::untyped::<T>(format!("#{position}"))
    }

    fn extract(arguments: &mut ResolvedArguments) -> Result<Self, ArgumentError> {
        arguments.take().map(Arg)
    }
}
