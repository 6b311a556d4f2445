#![allow(clippy::new_without_default)]

//! An inversion-of-control container with type-directed parameter injection.
//!
//! Types describe themselves through [`injectable`], abstractions are bound to
//! implementations on a [`Container`](container::Container), and constructors
//! or arbitrary callables get their `Arc<T>` parameters resolved from it.

extern crate self as tapioca;

pub mod callable;
pub mod container;
pub mod key;
pub mod module;
pub mod reflect;
mod util;

pub use tapioca_derive::injectable;

pub mod prelude {
    pub use crate::args;
    pub use crate::callable::{Arg, Callable};
    pub use crate::container::{Container, ContainerError, SharedContainer};
    pub use crate::injectable;
    pub use crate::key::TypeKey;
    pub use crate::module::{Configuration, Module, RegistryError};
    pub use crate::reflect::{Arguments, Injectable, Lifetime};
}
