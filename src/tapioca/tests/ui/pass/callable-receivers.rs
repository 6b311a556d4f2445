use std::sync::Arc;

use tapioca::prelude::*;

pub struct Dependency;

#[injectable]
impl Dependency {
    #[inject]
    pub fn new() -> Self {
        Self
    }
}

pub struct Service;

#[injectable(singleton, name = "service")]
impl Service {
    #[callable]
    pub fn by_reference(&self, _dependency: Arc<Dependency>, value: u32) -> u32 {
        value
    }

    #[callable]
    pub fn associated(#[default(7)] value: u32) -> u32 {
        value
    }

    #[callable]
    pub fn fallible(_dependency: std::sync::Arc<Dependency>) -> Result<(), std::fmt::Error> {
        Ok(())
    }

    #[callable]
    pub fn nothing() {}

    pub fn plain(&mut self) {}
}

fn main() {
    let descriptor = Service::describe();
    assert_eq!(descriptor.name(), "service");
    assert!(descriptor.is_singleton());
    assert!(descriptor.constructor().is_none());
    assert!(descriptor.method("by_reference").is_some());
    assert!(descriptor.method("plain").is_none());
}
