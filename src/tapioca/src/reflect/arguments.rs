use std::any;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::container::Managed;
use crate::util::any::Downcast;

/// Explicit positional arguments handed to [`Container::new`] or
/// [`Container::tap`].
///
/// Only parameters without an injectable type consume these values, in
/// declaration order. The [`args!`] macro builds them inline.
///
/// [`Container::new`]: crate::container::Container::new
/// [`Container::tap`]: crate::container::Container::tap
/// [`args!`]: crate::args
#[derive(Default)]
pub struct Arguments {
    values: VecDeque<Box<dyn Managed>>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Managed>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Managed>(&mut self, value: T) {
        self.values.push_back(Box::new(value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn next(&mut self) -> Option<Box<dyn Managed>> {
        self.values.pop_front()
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_list()
            .entries(self.values.iter().map(|value| (**value).type_name()))
            .finish()
    }
}

/// Builds [`Arguments`] from a list of expressions.
///
/// ```rust
/// # use tapioca::args;
/// let arguments = args![String::from("status"), 42u32];
/// assert_eq!(arguments.len(), 2);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::reflect::Arguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::reflect::Arguments::new()$(.with($value))+
    };
}

/// The fully resolved argument list of one constructor or callable
/// invocation, in parameter order.
///
/// Typed parameters hold an `Arc<T>`, the rest hold the value itself.
#[derive(Default)]
pub struct ResolvedArguments {
    values: VecDeque<Box<dyn Managed>>,
    position: usize,
}

impl ResolvedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Box<dyn Managed>) {
        self.values.push_back(value);
    }

    /// Takes the next argument.
    ///
    /// # Errors
    ///
    /// Returns an error if all arguments were taken or the next one is not a
    /// `T`.
    pub fn take<T: Managed>(&mut self) -> Result<T, ArgumentError> {
        let position = self.position;
        let value = self.values.pop_front().context(ExhaustedSnafu { position })?;
        self.position += 1;

        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => MismatchSnafu {
                position,
                expected: any::type_name::<T>(),
                found: (*value).type_name(),
            }
            .fail(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ArgumentError {
    #[snafu(display("no argument left at position {position}"))]
    #[non_exhaustive]
    Exhausted { position: usize },
    #[snafu(display("argument at position {position} is a {found} rather than a {expected}"))]
    #[non_exhaustive]
    Mismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}
