use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;
use tracing::debug;

use crate::callable::{Callable, Owner, Target};
use crate::container::binding::BindingTable;
use crate::container::error::{
    CallableNotFoundSnafu, InvalidBindingSnafu, ReturnTypeSnafu,
    StaticCallOnInstanceMethodSnafu, TooManyArgumentsSnafu, UnresolvableDependencySnafu,
};
use crate::container::resolve::Mode;
use crate::container::shared::SharedObjects;
use crate::container::{ContainerError, Managed, SharedManaged, Unresolvable};
use crate::key::TypeKey;
use crate::module::{Module, RegistryError};
use crate::reflect::{
    Arguments, DescriptorRegistry, Injectable, MethodKind, TypeDescriptor, TypeRegistry,
};
use crate::util::any::Downcast;

/// An inversion-of-control container.
///
/// A container maps abstractions to implementations, holds shared instances
/// and resolves the parameters of constructors and callables from what it
/// holds:
///
/// ```rust
/// # use std::sync::Arc;
/// # use tapioca::prelude::*;
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// #[injectable(implements(dyn Greeter))]
/// impl English {
///     #[inject]
///     fn new() -> Self {
///         Self
///     }
/// }
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         String::from("hello")
///     }
/// }
///
/// let mut container = Container::default();
/// container.bind::<dyn Greeter, English>().unwrap();
///
/// let greeter = container.new::<dyn Greeter>(args![]).unwrap();
/// assert_eq!(greeter.greet(), "hello");
///
/// let shout = Callable::function(|greeter: Arc<dyn Greeter>, Arg(mark): Arg<char>| {
///     Ok::<_, std::convert::Infallible>(format!("{}{mark}", greeter.greet()))
/// });
/// let message: String = container.tap(shout, args!['!']).unwrap();
/// assert_eq!(message, "hello!");
/// ```
pub struct Container {
    pub(super) registry: Box<dyn TypeRegistry>,
    pub(super) bindings: BindingTable,
    pub(super) shared: SharedObjects,
    /// Singletons stored by the resolution in progress.
    pub(super) staged: Vec<TypeKey>,
}

impl Container {
    pub fn with_registry<R>(registry: R) -> Self
    where
        R: TypeRegistry,
    {
        Self {
            registry: Box::new(registry),
            bindings: BindingTable::new(),
            shared: SharedObjects::new(),
            staged: Vec::new(),
        }
    }

    /// Creates a container configured by `module`.
    ///
    /// # Errors
    ///
    /// Returns an error aggregating every module that failed to configure
    /// the container.
    pub fn init<M>(module: M) -> Result<Self, RegistryError>
    where
        M: Module,
    {
        let mut container = Self::default();
        container.install(&module)?;
        Ok(container)
    }

    /// Applies `module` to this container.
    ///
    /// # Errors
    ///
    /// Returns an error aggregating every module that failed to configure
    /// the container. Changes made before a failure are kept.
    pub fn install<M>(&mut self, module: &M) -> Result<(), RegistryError>
    where
        M: Module + ?Sized,
    {
        let mut errors = Vec::new();
        module.setup(self, &mut errors);
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(RegistryError::Aggregated { errors }),
        }
    }

    pub fn register<T>(&mut self)
    where
        T: Injectable,
    {
        self.register_descriptor(T::describe());
    }

    pub fn register_descriptor(&mut self, descriptor: TypeDescriptor) {
        let key = descriptor.key();
        if self.registry.register(descriptor).is_some() {
            debug!(key = %key, "replace type descriptor");
        } else {
            debug!(key = %key, "register type");
        }
    }

    pub fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.registry.describe(&TypeKey::of::<T>()).is_some()
    }

    /// Binds the abstraction `A` to the implementation `C`. `C` is
    /// registered if it isn't yet; an existing descriptor is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidBinding`] if `C` does not declare
    /// that it implements `A`. Nothing is registered in that case.
    pub fn bind<A, C>(&mut self) -> Result<(), ContainerError>
    where
        A: ?Sized + 'static,
        C: Injectable,
    {
        let abstract_key = TypeKey::of::<A>();
        let concrete = TypeKey::of::<C>();
        if self.registry.describe(&concrete).is_none() {
            let descriptor = C::describe();
            ensure!(
                descriptor.satisfies(&abstract_key),
                InvalidBindingSnafu {
                    abstract_key,
                    concrete,
                }
            );
            self.register_descriptor(descriptor);
        }
        self.bind_keys(abstract_key, concrete)
    }

    /// Binds `abstract_key` to the already registered type `concrete`.
    /// Binding again replaces the previous implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidBinding`] if `concrete` is not
    /// registered or does not satisfy `abstract_key`.
    pub fn bind_keys(
        &mut self,
        abstract_key: TypeKey,
        concrete: TypeKey,
    ) -> Result<(), ContainerError> {
        let satisfied = self
            .registry
            .describe(&concrete)
            .is_some_and(|descriptor| descriptor.satisfies(&abstract_key));
        ensure!(
            satisfied,
            InvalidBindingSnafu {
                abstract_key,
                concrete,
            }
        );

        if let Some(previous) = self.bindings.insert(abstract_key, concrete) {
            debug!(abstract_key = %abstract_key, previous = %previous, concrete = %concrete, "rebind");
        } else {
            debug!(abstract_key = %abstract_key, concrete = %concrete, "bind");
        }
        Ok(())
    }

    pub fn unbind<A>(&mut self)
    where
        A: ?Sized + 'static,
    {
        let abstract_key = TypeKey::of::<A>();
        if self.bindings.remove(&abstract_key).is_some() {
            debug!(abstract_key = %abstract_key, "unbind");
        }
    }

    pub fn is_bound<A>(&self) -> bool
    where
        A: ?Sized + 'static,
    {
        self.bindings.get(&TypeKey::of::<A>()).is_some()
    }

    /// Shares `instance` under its own type, replacing any instance shared
    /// under the same type.
    pub fn share<T>(&mut self, instance: Arc<T>)
    where
        T: Managed,
    {
        self.share_dyn(TypeKey::of::<T>(), Box::new(instance));
    }

    /// Shares `instance` under the abstraction `A`:
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use tapioca::container::Container;
    /// trait Clock: Send + Sync {}
    ///
    /// struct SystemClock;
    ///
    /// impl Clock for SystemClock {}
    ///
    /// let mut container = Container::default();
    /// container.share_as::<dyn Clock>(Arc::new(SystemClock));
    /// assert!(container.get::<dyn Clock>().is_some());
    /// assert!(container.get::<SystemClock>().is_none());
    /// ```
    pub fn share_as<A>(&mut self, instance: Arc<A>)
    where
        A: Send + Sync + ?Sized + 'static,
    {
        self.share_dyn(TypeKey::of::<A>(), Box::new(instance));
    }

    /// Shares a type-erased pointer under `key`. Nothing checks that
    /// `object` actually targets `key`; a mismatched object is never handed
    /// out by [`Container::get`].
    pub fn share_dyn(&mut self, key: TypeKey, object: Box<dyn SharedManaged>) {
        if self.shared.insert(key, object).is_some() {
            debug!(key = %key, "replace shared object");
        } else {
            debug!(key = %key, "share object");
        }
    }

    /// Returns the instance shared under `T`. Nothing is ever constructed.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.shared
            .get(&TypeKey::of::<T>())
            .and_then(|object| object.downcast::<Arc<T>>().ok())
            .map(|object| *object)
    }

    pub fn is_shared<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.shared.contains(&TypeKey::of::<T>())
    }

    /// Forgets the instance shared under `T`. Returns whether there was one.
    pub fn remove<T>(&mut self) -> bool
    where
        T: ?Sized + 'static,
    {
        let key = TypeKey::of::<T>();
        let removed = self.shared.remove(&key).is_some();
        if removed {
            debug!(key = %key, "remove shared object");
        }
        removed
    }

    /// Constructs a `T`, or the implementation `T` is bound to.
    ///
    /// Singletons are constructed once and reused afterwards, in which case
    /// `arguments` are ignored. Otherwise `arguments` fill the constructor
    /// parameters that are not an `Arc`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency can't be resolved, if `arguments`
    /// don't fit the constructor, or if the constructor fails.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T>(&mut self, arguments: Arguments) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        let key = TypeKey::of::<T>();
        match self.dyn_new(key, arguments)?.downcast::<Arc<T>>() {
            Ok(object) => Ok(*object),
            Err(object) => UnresolvableDependencySnafu {
                parameter: None::<String>,
                key,
                reason: Unresolvable::Incompatible {
                    target: object.target(),
                },
            }
            .fail(),
        }
    }

    /// The type-erased form of [`Container::new`].
    ///
    /// # Errors
    ///
    /// See [`Container::new`].
    pub fn dyn_new(
        &mut self,
        key: TypeKey,
        mut arguments: Arguments,
    ) -> Result<Box<dyn SharedManaged>, ContainerError> {
        self.atomically(|this| this.construct(key, &mut arguments, None))
    }

    /// Calls `callable`, resolving its parameters from the container and
    /// `arguments`, and returns its result as an `R`.
    ///
    /// # Errors
    ///
    /// Returns an error if the callable can't be found, if a parameter can't
    /// be resolved, if the callable fails, or if its result is not an `R`.
    pub fn tap<R>(&mut self, callable: Callable<'_>, arguments: Arguments) -> Result<R, ContainerError>
    where
        R: Managed,
    {
        let name = callable.to_string();
        match self.dyn_tap(callable, arguments)?.downcast::<R>() {
            Ok(output) => Ok(*output),
            Err(output) => ReturnTypeSnafu {
                callable: name,
                expected: any::type_name::<R>(),
                found: (*output).type_name(),
            }
            .fail(),
        }
    }

    /// The type-erased form of [`Container::tap`].
    ///
    /// # Errors
    ///
    /// See [`Container::tap`].
    pub fn dyn_tap(
        &mut self,
        callable: Callable<'_>,
        mut arguments: Arguments,
    ) -> Result<Box<dyn Managed>, ContainerError> {
        let name = callable.to_string();
        let supplied = arguments.len();

        match callable.into_target() {
            Target::Function(function) => {
                let parameters = function.parameters();
                let mut resolved = self.atomically(|this| {
                    let resolved =
                        this.resolve_parameters(&parameters, &mut arguments, Mode::Invoke, None)?;
                    ensure_consumed(&arguments, supplied)?;
                    Ok(resolved)
                })?;

                debug!(callable = %name, "call function");
                function.call(&mut resolved).map_err(|source| ContainerError::Invocation {
                    callable: name,
                    source: source.into(),
                })
            }
            Target::Method {
                receiver,
                owner,
                method,
            } => {
                let descriptor = match owner {
                    Owner::Key(key) => self.registry.describe(&key),
                    Owner::Name(type_name) => self.registry.find(&type_name),
                }
                .context(CallableNotFoundSnafu { callable: &name })?;
                let method = descriptor
                    .method(&method)
                    .context(CallableNotFoundSnafu { callable: &name })?;

                ensure!(
                    receiver.is_some() || method.kind() == MethodKind::Static,
                    StaticCallOnInstanceMethodSnafu {
                        owner: descriptor.name(),
                        method: method.name(),
                    }
                );

                let mut resolved = self.atomically(|this| {
                    let resolved = this.resolve_parameters(
                        method.parameters(),
                        &mut arguments,
                        Mode::Invoke,
                        None,
                    )?;
                    ensure_consumed(&arguments, supplied)?;
                    Ok(resolved)
                })?;

                debug!(callable = %name, "call method");
                method
                    .invoke(receiver, &mut resolved)
                    .map_err(|source| ContainerError::Invocation {
                        callable: name,
                        source: source.into(),
                    })
            }
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::with_registry(DescriptorRegistry::new())
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container")
            .field("bindings", &self.bindings)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

fn ensure_consumed(arguments: &Arguments, supplied: usize) -> Result<(), ContainerError> {
    ensure!(
        arguments.is_empty(),
        TooManyArgumentsSnafu {
            consumed: supplied - arguments.len(),
            supplied,
        }
    );
    Ok(())
}
