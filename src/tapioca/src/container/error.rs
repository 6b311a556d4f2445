use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::key::TypeKey;

#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ContainerError {
    #[snafu(display("could not bind {abstract_key} to {concrete}, which does not implement it"))]
    #[non_exhaustive]
    InvalidBinding {
        abstract_key: TypeKey,
        concrete: TypeKey,
    },
    #[snafu(display(
        "could not resolve {}{key}: {reason}",
        ParameterDisplayer::new(parameter.as_deref())
    ))]
    #[non_exhaustive]
    UnresolvableDependency {
        parameter: Option<String>,
        key: TypeKey,
        reason: Unresolvable,
    },
    #[snafu(display("no explicit argument left for parameter `{parameter}` at position {position}"))]
    #[non_exhaustive]
    MissingArgument { parameter: String, position: usize },
    #[snafu(display("{supplied} explicit arguments supplied but only {consumed} could be used"))]
    #[non_exhaustive]
    TooManyArguments { consumed: usize, supplied: usize },
    #[snafu(display("could not call instance method {owner}::{method} without a receiver"))]
    #[non_exhaustive]
    StaticCallOnInstanceMethod { owner: &'static str, method: String },
    #[snafu(display("parameter `{parameter}` expects a {expected} but got a {found}"))]
    #[non_exhaustive]
    ArgumentType {
        parameter: String,
        expected: &'static str,
        found: &'static str,
    },
    #[snafu(display("could not construct {key} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { key: TypeKey },
    #[snafu(display("could not find callable {callable}"))]
    #[non_exhaustive]
    CallableNotFound { callable: String },
    #[snafu(display("callable {callable} returned a {found} rather than a {expected}"))]
    #[non_exhaustive]
    ReturnType {
        callable: String,
        expected: &'static str,
        found: &'static str,
    },
    #[snafu(display("could not construct the object {key}"))]
    #[non_exhaustive]
    Construction {
        key: TypeKey,
        source: Arc<dyn Error + Send + Sync>,
    },
    #[snafu(display("callable {callable} failed"))]
    #[non_exhaustive]
    Invocation {
        callable: String,
        source: Arc<dyn Error + Send + Sync>,
    },
}

/// Why a typed dependency could not be produced.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Unresolvable {
    /// The type is neither bound nor registered.
    Unknown,
    /// The type is registered but has no injectable constructor.
    NotInstantiable,
    /// The bound implementation does not provide the requested interface.
    Incompatible { target: TypeKey },
    /// A constructor parameter without a type has neither an explicit
    /// argument nor a default.
    NoValue,
    /// One of the type's own dependencies failed.
    Dependency { source: Box<ContainerError> },
}

impl Display for Unresolvable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Unknown => write!(f, "the type is neither bound nor registered"),
            Self::NotInstantiable => write!(f, "the type has no injectable constructor"),
            Self::Incompatible { target } => {
                write!(f, "the bound type {target} does not provide it")
            }
            Self::NoValue => write!(f, "no explicit argument or default value is available"),
            Self::Dependency { source } => write!(f, "{source}"),
        }
    }
}

struct ParameterDisplayer<'a> {
    parameter: Option<&'a str>,
}

impl<'a> ParameterDisplayer<'a> {
    fn new(parameter: Option<&'a str>) -> Self {
        Self { parameter }
    }
}

impl Display for ParameterDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.parameter {
            Some(parameter) => write!(f, "parameter `{parameter}` of type "),
            None => Ok(()),
        }
    }
}
