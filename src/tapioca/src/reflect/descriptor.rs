use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::{Managed, SharedManaged};
use crate::key::TypeKey;
use crate::reflect::{BoxError, Lifetime, Parameter, ResolvedArguments};
use crate::util::any::{Downcast, DowncastRef};

type Build = dyn Fn(&mut ResolvedArguments) -> Result<Box<dyn SharedManaged>, BoxError> + Send + Sync;

type Upcast = dyn Fn(Box<dyn SharedManaged>) -> Option<Box<dyn SharedManaged>> + Send + Sync;

type Invoke = dyn Fn(Option<&dyn Managed>, &mut ResolvedArguments) -> Result<Box<dyn Managed>, BoxError>
    + Send
    + Sync;

/// Everything the container knows about one concrete type: whether it is a
/// singleton, how to construct it, which interfaces it satisfies and which
/// methods can be called through [`Container::tap`].
///
/// Descriptors are usually generated by [`injectable`], but can be built by
/// hand:
///
/// ```rust
/// # use std::sync::Arc;
/// # use tapioca::reflect::{Constructor, Interface, Lifetime, Parameter, TypeDescriptor};
/// trait Clock: Send + Sync {}
///
/// struct SystemClock {
///     offset: i64,
/// }
///
/// impl Clock for SystemClock {}
///
/// let descriptor = TypeDescriptor::new::<SystemClock>("SystemClock")
///     .with_lifetime(Lifetime::Singleton)
///     .with_constructor(Constructor::new(
///         vec![Parameter::optional::<i64>("offset", || 0)],
///         |arguments| Ok(SystemClock { offset: arguments.take()? }),
///     ))
///     .implements(Interface::new::<SystemClock, dyn Clock>(|this| this));
///
/// assert!(descriptor.is_singleton());
/// ```
///
/// [`Container::tap`]: crate::container::Container::tap
/// [`injectable`]: crate::injectable
pub struct TypeDescriptor {
    key: TypeKey,
    name: &'static str,
    lifetime: Lifetime,
    constructor: Option<Constructor>,
    interfaces: Vec<Interface>,
    methods: Vec<Method>,
}

impl TypeDescriptor {
    /// Creates a transient, non-instantiable descriptor for `T`. `name` is
    /// the short name used by `"Type::method"` references.
    pub fn new<T: Managed>(name: &'static str) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            name,
            lifetime: Lifetime::Transient,
            constructor: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn implements(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime == Lifetime::Singleton
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn interface(&self, key: &TypeKey) -> Option<&Interface> {
        self.interfaces.iter().find(|interface| interface.key == *key)
    }

    /// Returns true if an instance of this type can stand in for `key`.
    pub fn satisfies(&self, key: &TypeKey) -> bool {
        self.key == *key || self.interface(key).is_some()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("constructor", &self.constructor)
            .field("interfaces", &self.interfaces)
            .field("methods", &self.methods)
            .finish()
    }
}

/// The injectable constructor of a type.
pub struct Constructor {
    parameters: Vec<Parameter>,
    build: Box<Build>,
}

impl Constructor {
    pub fn new<T, F>(parameters: Vec<Parameter>, build: F) -> Self
    where
        T: Managed,
        F: Fn(&mut ResolvedArguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters,
            build: Box::new(move |arguments: &mut ResolvedArguments| {
                build(arguments).map(|object| -> Box<dyn SharedManaged> { Box::new(Arc::new(object)) })
            }),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Builds an `Arc` of the described type from resolved arguments.
    ///
    /// # Errors
    ///
    /// Returns the constructor's own error.
    pub fn build(&self, arguments: &mut ResolvedArguments) -> Result<Box<dyn SharedManaged>, BoxError> {
        (self.build)(arguments)
    }
}

impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Declares that a concrete type `C` satisfies the abstraction `I`, together
/// with the coercion from `Arc<C>` to `Arc<I>`.
pub struct Interface {
    key: TypeKey,
    upcast: Box<Upcast>,
}

impl Interface {
    pub fn new<C, I>(upcast: fn(Arc<C>) -> Arc<I>) -> Self
    where
        C: Managed,
        I: Send + Sync + ?Sized + 'static,
    {
        Self {
            key: TypeKey::of::<I>(),
            upcast: Box::new(move |object: Box<dyn SharedManaged>| {
                let object = object.downcast::<Arc<C>>().ok()?;
                let upcasted: Box<dyn SharedManaged> = Box::new(upcast(*object));
                Some(upcasted)
            }),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Converts an erased `Arc<C>` into an erased `Arc<I>`. Returns `None`
    /// if `object` is not an `Arc<C>`.
    pub fn upcast(&self, object: Box<dyn SharedManaged>) -> Option<Box<dyn SharedManaged>> {
        (self.upcast)(object)
    }
}

impl Debug for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("Interface").field(&self.key).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Takes `&self` and needs a receiver.
    Instance,
    /// An associated function without receiver.
    Static,
}

/// A method which can be resolved and invoked by name.
pub struct Method {
    name: &'static str,
    kind: MethodKind,
    parameters: Vec<Parameter>,
    invoke: Box<Invoke>,
}

impl Method {
    pub fn instance<T, R, F>(name: &'static str, parameters: Vec<Parameter>, method: F) -> Self
    where
        T: Managed,
        R: Managed,
        F: Fn(&T, &mut ResolvedArguments) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            kind: MethodKind::Instance,
            parameters,
            invoke: Box::new(move |receiver: Option<&dyn Managed>, arguments: &mut ResolvedArguments| {
                let missing = || -> BoxError {
                    format!("method `{name}` needs a receiver of type {}", TypeKey::of::<T>()).into()
                };
                let receiver = receiver.ok_or_else(missing)?;
                let receiver = receiver.downcast_ref::<T>().ok_or_else(missing)?;
                method(receiver, arguments).map(|output| -> Box<dyn Managed> { Box::new(output) })
            }),
        }
    }

    pub fn associated<R, F>(name: &'static str, parameters: Vec<Parameter>, method: F) -> Self
    where
        R: Managed,
        F: Fn(&mut ResolvedArguments) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            kind: MethodKind::Static,
            parameters,
            invoke: Box::new(move |_: Option<&dyn Managed>, arguments: &mut ResolvedArguments| {
                method(arguments).map(|output| -> Box<dyn Managed> { Box::new(output) })
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Calls the method. Static methods ignore `receiver`.
    ///
    /// # Errors
    ///
    /// Returns the method's own error, or an error if an instance method
    /// gets no receiver of the right type.
    pub fn invoke(
        &self,
        receiver: Option<&dyn Managed>,
        arguments: &mut ResolvedArguments,
    ) -> Result<Box<dyn Managed>, BoxError> {
        (self.invoke)(receiver, arguments)
    }
}

impl Debug for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
