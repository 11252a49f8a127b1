//! Lattice ECS - Entity Component System
//!
//! Entities carry components keyed by bitmask kinds and cache the union of
//! those kinds, so "every entity with X and Y" is a linear scan with a single
//! integer compare per entity. Systems run in registration order, one tick at
//! a time, until one of them signals stop.
//!
//! ```
//! use lattice_core::{IdAllocator, Kind};
//! use lattice_ecs::{Component, Engine, Entity, EntityStore, Signal, SystemRegistry};
//!
//! const COUNTER: Kind = Kind::bit(0);
//!
//! struct Counter(u32);
//!
//! impl Component for Counter {
//!     fn mask(&self) -> Kind {
//!         COUNTER
//!     }
//! }
//!
//! let ids = IdAllocator::new();
//! let mut store = EntityStore::new();
//! store.add([Entity::empty(&ids).with(Counter(0))]);
//!
//! let count_to_three = |store: &mut EntityStore| {
//!     let mut done = false;
//!     store.for_each_matching(COUNTER, |entity| {
//!         let counter = entity.get_as_mut::<Counter>(COUNTER).unwrap();
//!         counter.0 += 1;
//!         done = counter.0 == 3;
//!     });
//!     if done { Signal::Stop } else { Signal::Continue }
//! };
//!
//! let mut engine = Engine::new(store, SystemRegistry::new().with(count_to_three));
//! engine.setup();
//! assert_eq!(engine.run().ticks, 3);
//! engine.teardown();
//! ```

mod component;
mod config;
mod engine;
mod entity;
mod store;
mod system;

pub use component::{AsAny, Component};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineState, RunSummary, StopReason};
pub use entity::{Entity, EntityHeader};
pub use lattice_core::{EntityId, IdAllocator, Kind};
pub use store::EntityStore;
pub use system::{Signal, System, SystemRegistry};
