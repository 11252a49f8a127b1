//! A small particle simulation that exercises the engine end to end.

use glam::Vec2;
use lattice_core::{EntityId, IdAllocator, Kind};
use lattice_ecs::{Component, Engine, Entity, EntityStore, Signal, System, SystemRegistry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::settings::{Settings, SimulationSettings};

pub const POSITION: Kind = Kind::bit(0);
pub const VELOCITY: Kind = Kind::bit(1);
pub const LIFETIME: Kind = Kind::bit(2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

impl Component for Position {
    fn mask(&self) -> Kind {
        POSITION
    }

    fn name(&self) -> Option<&str> {
        Some("position")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

impl Component for Velocity {
    fn mask(&self) -> Kind {
        VELOCITY
    }

    fn name(&self) -> Option<&str> {
        Some("velocity")
    }
}

/// Ticks left before the entity is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime(pub u32);

impl Component for Lifetime {
    fn mask(&self) -> Kind {
        LIFETIME
    }

    fn name(&self) -> Option<&str> {
        Some("lifetime")
    }
}

/// Spawn the initial population described by `settings` into `store`.
pub fn populate(settings: &SimulationSettings, ids: &IdAllocator, store: &mut EntityStore) {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    store.add((0..settings.entities).map(|_| {
        let mut entity = Entity::empty(ids).with(Position(Vec2::new(
            rng.gen_range(-100.0..100.0),
            rng.gen_range(-100.0..100.0),
        )));
        if rng.gen_bool(settings.moving_ratio.clamp(0.0, 1.0)) {
            entity.add(Velocity(Vec2::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )));
        }
        if settings.max_lifetime > 0 {
            entity.add(Lifetime(rng.gen_range(1..=settings.max_lifetime)));
        }
        entity
    }));
}

/// Integrates velocity into position.
#[derive(Default)]
pub struct Movement {
    moved: u64,
}

impl System for Movement {
    fn process(&mut self, store: &mut EntityStore) -> Signal {
        let mut moved = 0;
        store.for_each_matching(POSITION | VELOCITY, |entity| {
            let Some(&Velocity(velocity)) = entity.get_as::<Velocity>(VELOCITY) else {
                return;
            };
            if let Some(Position(position)) = entity.get_as_mut::<Position>(POSITION) {
                *position += velocity;
                moved += 1;
            }
        });
        self.moved += moved;
        Signal::Continue
    }

    fn teardown(&mut self) {
        info!("Movement applied {} position updates", self.moved);
    }

    fn name(&self) -> &str {
        "movement"
    }
}

/// Counts lifetimes down and removes entities whose lifetime ran out.
#[derive(Default)]
pub struct Expiry {
    expired: Vec<EntityId>,
    removed: usize,
}

impl System for Expiry {
    fn process(&mut self, store: &mut EntityStore) -> Signal {
        self.expired.clear();
        store.for_each_matching(LIFETIME, |entity| {
            if let Some(Lifetime(remaining)) = entity.get_as_mut::<Lifetime>(LIFETIME) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    self.expired.push(entity.id());
                }
            }
        });
        for &id in &self.expired {
            store.remove(id);
        }
        if !self.expired.is_empty() {
            debug!("Expired {} entities", self.expired.len());
        }
        self.removed += self.expired.len();
        Signal::Continue
    }

    fn teardown(&mut self) {
        info!("Expiry removed {} entities", self.removed);
    }

    fn name(&self) -> &str {
        "expiry"
    }
}

/// Stops the run after a fixed number of ticks, or once nothing is left alive.
pub struct Clock {
    limit: u64,
    elapsed: u64,
}

impl Clock {
    pub fn new(limit: u64) -> Self {
        Self { limit, elapsed: 0 }
    }
}

impl System for Clock {
    fn setup(&mut self) {
        self.elapsed = 0;
    }

    fn process(&mut self, store: &mut EntityStore) -> Signal {
        self.elapsed += 1;
        if self.elapsed >= self.limit || store.is_empty() {
            Signal::Stop
        } else {
            Signal::Continue
        }
    }

    fn name(&self) -> &str {
        "clock"
    }
}

/// Build an engine with a populated store and the demo systems registered.
pub fn build_engine(settings: &Settings, ids: &IdAllocator) -> Engine {
    let mut store = settings.engine.build_store();
    populate(&settings.simulation, ids, &mut store);
    info!("Spawned {} entities", store.len());

    let systems = SystemRegistry::new()
        .with(Movement::default())
        .with(Expiry::default())
        .with(Clock::new(settings.simulation.ticks));

    Engine::with_config(store, systems, settings.engine.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> Settings {
        Settings {
            simulation: SimulationSettings {
                entities: 200,
                ticks: 50,
                seed: 7,
                moving_ratio: 1.0,
                max_lifetime: 20,
            },
            ..Settings::default()
        }
    }

    #[test]
    fn populate_is_deterministic() {
        let settings = small_settings().simulation;
        let mut a = EntityStore::new();
        let mut b = EntityStore::new();
        populate(&settings, &IdAllocator::new(), &mut a);
        populate(&settings, &IdAllocator::new(), &mut b);

        assert_eq!(a.len(), 200);
        for (x, y) in a.entities().iter().zip(b.entities()) {
            assert_eq!(x.header(), y.header());
            assert_eq!(
                x.get_as::<Position>(POSITION),
                y.get_as::<Position>(POSITION)
            );
        }
        assert_eq!(a.filter_by_mask(POSITION | VELOCITY | LIFETIME).len(), 200);
    }

    #[test]
    fn everything_expires_before_the_clock() {
        let ids = IdAllocator::new();
        let mut engine = build_engine(&small_settings(), &ids);
        engine.setup();
        let summary = engine.run();
        engine.teardown();

        // Lifetimes are at most 20 ticks; the clock would allow 50.
        assert!(summary.ticks <= 20);
        assert!(engine.store().is_empty());
    }

    #[test]
    fn clock_stops_without_lifetimes() {
        let mut settings = small_settings();
        settings.simulation.max_lifetime = 0;
        settings.simulation.ticks = 3;

        let ids = IdAllocator::new();
        let mut engine = build_engine(&settings, &ids);
        engine.setup();
        assert_eq!(engine.run().ticks, 3);
        engine.teardown();
        assert_eq!(engine.store().len(), 200);
    }

    #[test]
    fn movement_integrates_velocity() {
        let ids = IdAllocator::new();
        let mut store = EntityStore::new();
        store.add([
            Entity::empty(&ids)
                .with(Position(Vec2::ZERO))
                .with(Velocity(Vec2::new(1.0, -2.0))),
            Entity::empty(&ids).with(Position(Vec2::ONE)),
        ]);

        let mut movement = Movement::default();
        for _ in 0..3 {
            let _ = movement.process(&mut store);
        }
        assert_eq!(
            store.entities()[0].get_as::<Position>(POSITION),
            Some(&Position(Vec2::new(3.0, -6.0)))
        );
        assert_eq!(
            store.entities()[1].get_as::<Position>(POSITION),
            Some(&Position(Vec2::ONE))
        );
        assert_eq!(movement.moved, 3);
    }
}
