use std::mem;

use snafu::prelude::*;
use tracing::{debug, trace};

use crate::container::core::Container;
use crate::container::error::{
    ArgumentTypeSnafu, CyclicDependencySnafu, MissingArgumentSnafu, TooManyArgumentsSnafu,
    UnresolvableDependencySnafu,
};
use crate::container::{ContainerError, Managed, SharedManaged, Unresolvable};
use crate::key::TypeKey;
use crate::reflect::{
    Arguments, Parameter, ParameterKind, ResolvedArguments, TypeDescriptor,
};

/// Keys of the objects currently under construction, innermost first.
#[derive(Clone)]
pub(super) struct ResolutionTrace<'a> {
    key: TypeKey,
    previous: Option<&'a ResolutionTrace<'a>>,
}

impl<'a> ResolutionTrace<'a> {
    pub fn new(key: TypeKey) -> Self {
        Self {
            key,
            previous: None,
        }
    }

    pub fn append<'b>(&'b self, key: TypeKey) -> ResolutionTrace<'b> {
        ResolutionTrace {
            key,
            previous: Some(self),
        }
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        let mut this = Some(self);
        while let Some(current) = this {
            if current.key == key {
                return true;
            }
            this = current.previous;
        }
        false
    }
}

/// Where explicit arguments come from, which decides how a missing one is
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    Construct,
    Invoke,
}

impl Container {
    /// Produces an instance for `key`, following its binding one level.
    ///
    /// The returned pointer targets `key` itself, i.e. it is an `Arc<dyn A>`
    /// when `key` names the abstraction `dyn A`.
    pub(super) fn construct(
        &mut self,
        key: TypeKey,
        arguments: &mut Arguments,
        previous: Option<&ResolutionTrace<'_>>,
    ) -> Result<Box<dyn SharedManaged>, ContainerError> {
        let target = self.bindings.target(key);
        if previous.is_some_and(|previous| previous.contains(target)) {
            return CyclicDependencySnafu { key: target }.fail();
        }

        let descriptor = self
            .registry
            .describe(&target)
            .context(UnresolvableDependencySnafu {
                parameter: None::<String>,
                key: target,
                reason: Unresolvable::Unknown,
            })?;

        if descriptor.is_singleton() {
            if let Some(object) = self.shared.get(&target) {
                trace!(key = %key, target = %target, "reuse singleton");
                return upcast(&descriptor, object, key);
            }
        }

        let constructor = descriptor
            .constructor()
            .context(UnresolvableDependencySnafu {
                parameter: None::<String>,
                key: target,
                reason: Unresolvable::NotInstantiable,
            })?;

        let trace = match previous {
            Some(previous) => previous.append(target),
            None => ResolutionTrace::new(target),
        };

        let supplied = arguments.len();
        let mut resolved = self.resolve_parameters(
            constructor.parameters(),
            arguments,
            Mode::Construct,
            Some(&trace),
        )?;
        ensure!(
            arguments.is_empty(),
            TooManyArgumentsSnafu {
                consumed: supplied - arguments.len(),
                supplied,
            }
        );

        let object = constructor
            .build(&mut resolved)
            .map_err(|source| ContainerError::Construction {
                key: target,
                source: source.into(),
            })?;
        debug!(key = %key, target = %target, "construct object");

        if descriptor.is_singleton() {
            self.shared.insert(target, object.dyn_clone());
            self.staged.push(target);
            debug!(key = %target, "store singleton");
        }

        upcast(&descriptor, object, key)
    }

    /// Runs one top-level resolution. If it fails, the singletons it stored
    /// are discarded again.
    pub(super) fn atomically<T>(
        &mut self,
        resolve: impl FnOnce(&mut Self) -> Result<T, ContainerError>,
    ) -> Result<T, ContainerError> {
        let outer = mem::take(&mut self.staged);
        let result = resolve(self);
        let staged = mem::replace(&mut self.staged, outer);

        if result.is_err() {
            for key in staged {
                self.shared.remove(&key);
                debug!(key = %key, "discard singleton of failed resolution");
            }
        }
        result
    }

    /// Fills `parameters` in order. Typed parameters come from the container,
    /// the others consume `arguments` from the front.
    pub(super) fn resolve_parameters(
        &mut self,
        parameters: &[Parameter],
        arguments: &mut Arguments,
        mode: Mode,
        trace: Option<&ResolutionTrace<'_>>,
    ) -> Result<ResolvedArguments, ContainerError> {
        let mut resolved = ResolvedArguments::new();
        for (position, parameter) in parameters.iter().enumerate() {
            let value = match parameter.kind() {
                ParameterKind::Typed(key) => self
                    .resolve_dependency(parameter, key, trace)?
                    .upcast_managed(),
                ParameterKind::Untyped(key) => {
                    resolve_untyped(parameter, position, key, arguments, mode)?
                }
            };
            resolved.push(value);
        }
        Ok(resolved)
    }

    fn resolve_dependency(
        &mut self,
        parameter: &Parameter,
        key: TypeKey,
        trace: Option<&ResolutionTrace<'_>>,
    ) -> Result<Box<dyn SharedManaged>, ContainerError> {
        if let Some(object) = self.shared.get(&key).filter(|object| object.target() == key) {
            trace!(parameter = parameter.name(), key = %key, "inject shared object");
            return Ok(object);
        }

        // Dependencies never see the caller's explicit arguments.
        match self.construct(key, &mut Arguments::new(), trace) {
            Ok(object) => {
                trace!(parameter = parameter.name(), key = %key, "inject constructed object");
                Ok(object)
            }
            Err(err @ ContainerError::CyclicDependency { .. }) => Err(err),
            Err(ContainerError::UnresolvableDependency {
                parameter: None,
                key,
                reason,
            }) => Err(ContainerError::UnresolvableDependency {
                parameter: Some(parameter.name().to_owned()),
                key,
                reason,
            }),
            Err(err) => Err(ContainerError::UnresolvableDependency {
                parameter: Some(parameter.name().to_owned()),
                key,
                reason: Unresolvable::Dependency {
                    source: Box::new(err),
                },
            }),
        }
    }
}

fn resolve_untyped(
    parameter: &Parameter,
    position: usize,
    key: TypeKey,
    arguments: &mut Arguments,
    mode: Mode,
) -> Result<Box<dyn Managed>, ContainerError> {
    if let Some(value) = arguments.next() {
        ensure!(
            (*value).as_any().type_id() == key.id(),
            ArgumentTypeSnafu {
                parameter: parameter.name(),
                expected: key.name(),
                found: (*value).type_name(),
            }
        );
        return Ok(value);
    }

    if let Some(value) = parameter.default_value() {
        trace!(parameter = parameter.name(), "use default value");
        return Ok(value);
    }

    match mode {
        Mode::Construct => UnresolvableDependencySnafu {
            parameter: Some(parameter.name().to_owned()),
            key,
            reason: Unresolvable::NoValue,
        }
        .fail(),
        Mode::Invoke => MissingArgumentSnafu {
            parameter: parameter.name(),
            position,
        }
        .fail(),
    }
}

/// Converts an object of the type described by `descriptor` into a pointer
/// targeting `key`.
fn upcast(
    descriptor: &TypeDescriptor,
    object: Box<dyn SharedManaged>,
    key: TypeKey,
) -> Result<Box<dyn SharedManaged>, ContainerError> {
    let target = object.target();
    if target == key {
        return Ok(object);
    }

    descriptor
        .interface(&key)
        .and_then(|interface| interface.upcast(object))
        .context(UnresolvableDependencySnafu {
            parameter: None::<String>,
            key,
            reason: Unresolvable::Incompatible { target },
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct First;

    struct Second;

    #[test]
    fn resolution_trace_contains_succeeds() {
        let root = ResolutionTrace::new(TypeKey::of::<First>());
        let child = root.append(TypeKey::of::<Second>());

        assert!(child.contains(TypeKey::of::<First>()));
        assert!(child.contains(TypeKey::of::<Second>()));
        assert!(!root.contains(TypeKey::of::<Second>()));
        assert!(!child.contains(TypeKey::of::<i32>()));
    }
}
