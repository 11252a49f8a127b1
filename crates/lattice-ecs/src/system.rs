use std::any::type_name;

use crate::store::EntityStore;

/// What a system asks the engine to do after the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Signal {
    /// Keep ticking.
    Continue,
    /// End the run once the current tick completes.
    Stop,
}

impl Signal {
    pub fn is_stop(self) -> bool {
        self == Signal::Stop
    }

    /// `Stop` if either signal is `Stop`.
    pub fn merge(self, other: Signal) -> Signal {
        if self.is_stop() || other.is_stop() {
            Signal::Stop
        } else {
            Signal::Continue
        }
    }
}

/// A per-tick processing step.
///
/// `setup` runs once before the first tick and `teardown` once after the
/// last, including when the run ended because a system returned
/// [`Signal::Stop`].
pub trait System: Send {
    fn setup(&mut self) {}

    /// Process one tick. Entities obtained from `store` must not be held past
    /// this call.
    fn process(&mut self, store: &mut EntityStore) -> Signal;

    fn teardown(&mut self) {}

    /// Label used in logs.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// Blanket implementation so closures can be used as systems.
impl<F: FnMut(&mut EntityStore) -> Signal + Send> System for F {
    fn process(&mut self, store: &mut EntityStore) -> Signal {
        (self)(store)
    }
}

/// An ordered list of systems. Registration order is execution order.
pub struct SystemRegistry {
    systems: Vec<Box<dyn System>>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Add a system to the end of the registry.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Add already boxed systems to the end of the registry, in order.
    pub fn add<I>(&mut self, systems: I)
    where
        I: IntoIterator<Item = Box<dyn System>>,
    {
        self.systems.extend(systems);
    }

    /// Builder-style [`add_system`](Self::add_system).
    pub fn with<S: System + 'static>(mut self, system: S) -> Self {
        self.add_system(system);
        self
    }

    /// Systems in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn System> {
        self.systems.iter().map(|s| s.as_ref())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn System>> {
        self.systems.iter_mut()
    }

    /// Log labels of the systems, in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
