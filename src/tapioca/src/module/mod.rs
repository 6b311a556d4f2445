//! Startup wiring of a [`Container`].

use std::any;
use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;
use tracing::warn;

use crate::container::Container;
use crate::reflect::BoxError;

/// A unit of configuration: registrations, bindings and shared instances
/// applied to a container at startup.
///
/// ```rust
/// # use std::sync::Arc;
/// # use tapioca::prelude::*;
/// # use tapioca::reflect::BoxError;
/// struct Settings {
///     verbose: bool,
/// }
///
/// struct SettingsModule;
///
/// impl Module for SettingsModule {
///     fn configure(&self, container: &mut Container) -> Result<(), BoxError> {
///         container.share(Arc::new(Settings { verbose: true }));
///         Ok(())
///     }
/// }
///
/// let container = Container::init(SettingsModule).unwrap();
/// assert!(container.get::<Settings>().unwrap().verbose);
/// ```
pub trait Module: 'static {
    fn configure(&self, container: &mut Container) -> Result<(), BoxError>;

    fn name(&self) -> &'static str {
        any::type_name::<Self>()
    }

    /// Configures `container`, recording a failure in `errors` instead of
    /// stopping.
    fn setup(&self, container: &mut Container, errors: &mut Vec<RegistryError>) {
        if let Err(err) = self.configure(container) {
            warn!(module = self.name(), error = %err, "module fails to configure the container");
            errors.push(RegistryError::ModuleInner {
                module: self.name(),
                source: err,
            });
        }
    }
}

impl<F> Module for F
where
    F: Fn(&mut Container) -> Result<(), BoxError> + 'static,
{
    fn configure(&self, container: &mut Container) -> Result<(), BoxError> {
        self(container)
    }
}

/// Several modules applied in order.
#[derive(Default)]
pub struct Configuration {
    modules: Vec<Box<dyn Module>>,
}

impl Configuration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn compose(mut self, mut other: Configuration) -> Self {
        self.modules.append(&mut other.modules);
        self
    }
}

impl Module for Configuration {
    fn configure(&self, container: &mut Container) -> Result<(), BoxError> {
        let mut errors = Vec::new();
        self.setup(container, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Box::new(RegistryError::Aggregated { errors }))
        }
    }

    fn setup(&self, container: &mut Container, errors: &mut Vec<RegistryError>) {
        self.modules
            .iter()
            .for_each(|module| module.setup(container, errors));
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: BoxError,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
