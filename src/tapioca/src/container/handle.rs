use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::container::Container;

/// A cloneable handle which lets several threads use one [`Container`].
/// Every access locks the whole container.
#[derive(Debug, Clone, Default)]
pub struct SharedContainer {
    inner: Arc<Mutex<Container>>,
}

impl SharedContainer {
    pub fn new(container: Container) -> Self {
        Self {
            inner: Arc::new(Mutex::new(container)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Container> {
        self.inner.lock()
    }

    /// Runs `f` with the container locked.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Container) -> R,
    {
        f(&mut self.inner.lock())
    }
}

impl From<Container> for SharedContainer {
    fn from(container: Container) -> Self {
        Self::new(container)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::args;
    use crate::reflect::{Constructor, Injectable, Lifetime, TypeDescriptor};

    use super::*;

    struct Counter {
        value: Mutex<u32>,
    }

    impl Injectable for Counter {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::new::<Self>("Counter")
                .with_lifetime(Lifetime::Singleton)
                .with_constructor(Constructor::new(vec![], |_| {
                    Ok(Counter {
                        value: Mutex::new(0),
                    })
                }))
        }
    }

    #[test]
    fn shared_container_is_usable_across_threads() {
        let mut container = Container::default();
        container.register::<Counter>();
        let shared = SharedContainer::from(container);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let counter = shared.with(|container| container.new::<Counter>(args![]));
                    *counter.unwrap().value.lock() += 1;
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let counter = shared.lock().get::<Counter>().unwrap();
        assert_eq!(*counter.value.lock(), 4);
    }
}
