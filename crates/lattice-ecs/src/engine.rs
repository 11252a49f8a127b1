use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::store::EntityStore;
use crate::system::{Signal, SystemRegistry};

/// Lifecycle of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Constructed, `setup` not called yet.
    NotStarted,
    /// Systems are set up; ticks may be driven.
    Ready,
    /// Internal to [`Engine::run`]. `run` holds the engine mutably and restores
    /// the previous state before returning, so callers never observe it.
    Running,
    /// Systems are torn down.
    Stopped,
}

/// Why a call to [`Engine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A system returned [`Signal::Stop`].
    StopSignal,
    /// `max_ticks` from the config was reached.
    TickLimit,
}

/// Outcome of one call to [`Engine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks performed by this call.
    pub ticks: u64,
    pub reason: StopReason,
}

/// Drives the systems of a [`SystemRegistry`] against an [`EntityStore`].
///
/// The usual sequence is `setup`, then `run` (or a caller-paced loop of
/// `tick`), then `teardown`. Systems run one after another in registration
/// order; a tick never overlaps another.
pub struct Engine {
    store: EntityStore,
    systems: SystemRegistry,
    config: EngineConfig,
    state: EngineState,
    ticks: u64,
}

impl Engine {
    pub fn new(store: EntityStore, systems: SystemRegistry) -> Self {
        Self::with_config(store, systems, EngineConfig::default())
    }

    pub fn with_config(store: EntityStore, systems: SystemRegistry, config: EngineConfig) -> Self {
        Self {
            store,
            systems,
            config,
            state: EngineState::NotStarted,
            ticks: 0,
        }
    }

    /// Call `setup` on every system in registration order.
    pub fn setup(&mut self) {
        if self.state != EngineState::NotStarted {
            warn!("Engine setup called in state {:?}", self.state);
        }
        info!(
            "Setting up engine: {} systems, {} entities",
            self.systems.len(),
            self.store.len()
        );
        for system in self.systems.iter_mut() {
            debug!("Setting up system {}", system.name());
            system.setup();
        }
        self.state = EngineState::Ready;
    }

    /// Run exactly one pass over all systems.
    ///
    /// Every system is processed even if an earlier one asked to stop. The
    /// returned signal is [`Signal::Stop`] if any system returned it; acting on
    /// it is up to the caller.
    pub fn tick(&mut self) -> Signal {
        match self.state {
            EngineState::NotStarted => warn!("Engine ticked before setup"),
            EngineState::Stopped => warn!("Engine ticked after teardown"),
            EngineState::Ready | EngineState::Running => {}
        }
        self.tick_systems()
    }

    fn tick_systems(&mut self) -> Signal {
        let mut signal = Signal::Continue;
        for system in self.systems.iter_mut() {
            let requested = system.process(&mut self.store);
            if requested.is_stop() {
                trace!("System {} requested stop at tick {}", system.name(), self.ticks);
            }
            signal = signal.merge(requested);
        }
        self.ticks += 1;
        trace!("Tick {} done", self.ticks);
        signal
    }

    /// Tick until a system signals stop (or `max_ticks` is reached).
    ///
    /// Returning does not tear the engine down; call [`teardown`](Self::teardown)
    /// when done. The engine may be run again.
    pub fn run(&mut self) -> RunSummary {
        let previous = self.state;
        if previous != EngineState::Ready {
            warn!("Engine run called in state {:?}", previous);
        }
        self.state = EngineState::Running;

        let mut ticks = 0;
        let reason = loop {
            if self.config.max_ticks.is_some_and(|limit| ticks >= limit) {
                break StopReason::TickLimit;
            }
            ticks += 1;
            if self.tick_systems().is_stop() {
                break StopReason::StopSignal;
            }
        };

        self.state = previous;
        debug!("Engine run finished after {} ticks ({:?})", ticks, reason);
        RunSummary { ticks, reason }
    }

    /// Call `teardown` on every system in registration order.
    pub fn teardown(&mut self) {
        match self.state {
            EngineState::NotStarted => warn!("Engine teardown called before setup"),
            EngineState::Stopped => warn!("Engine teardown called twice"),
            EngineState::Ready | EngineState::Running => {}
        }
        for system in self.systems.iter_mut() {
            debug!("Tearing down system {}", system.name());
            system.teardown();
        }
        self.state = EngineState::Stopped;
        info!("Engine stopped after {} ticks", self.ticks);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Total ticks performed since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Register more systems. They run after the existing ones; systems added
    /// after `setup` do not get their `setup` hook called.
    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Take the store and registry back out of the engine.
    pub fn into_parts(self) -> (EntityStore, SystemRegistry) {
        (self.store, self.systems)
    }
}
