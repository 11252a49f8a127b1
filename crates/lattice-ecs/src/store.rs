use std::collections::HashMap;

use lattice_core::{EntityId, Kind};
use tracing::warn;

use crate::entity::Entity;

/// Owns every live entity.
///
/// Entities are kept in insertion order (removals close the gap without
/// reordering the survivors) and indexed by identifier for O(1) lookup.
/// Queries are linear scans over the cached per-entity masks.
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// A store with room for `capacity` entities before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    // ---- Entity management ----

    /// Add entities to the end of the live sequence.
    pub fn add<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = Entity>,
    {
        let entities = entities.into_iter();
        let additional = entities.size_hint().0;
        self.entities.reserve(additional);
        self.index.reserve(additional);
        for entity in entities {
            self.insert(entity);
        }
    }

    /// Add a single entity. Returns `false` (and drops the entity) if its
    /// identifier is already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let id = entity.id();
        if self.index.contains_key(&id) {
            warn!("Entity {} already in store, dropping duplicate", id);
            return false;
        }
        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        true
    }

    /// Remove an entity, keeping the relative order of the others. O(n).
    /// Removing an unknown identifier is a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let position = self.index.remove(&id)?;
        let entity = self.entities.remove(position);
        for shifted in &self.entities[position..] {
            if let Some(slot) = self.index.get_mut(&shifted.id()) {
                *slot -= 1;
            }
        }
        Some(entity)
    }

    /// Remove every entity.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.index.clear();
    }

    /// Look up an entity by identifier. O(1).
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    /// Mutable lookup by identifier. O(1).
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let i = *self.index.get(&id)?;
        Some(&mut self.entities[i])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// All live entities in store order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// All live entities in store order, with mutable access to their
    /// components.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ---- Queries ----

    /// Every entity holding all bits of `mask`, in store order.
    ///
    /// The result buffer is sized for the worst case up front, so a query
    /// costs exactly one allocation regardless of how many entities match.
    pub fn filter_by_mask(&self, mask: Kind) -> Vec<&Entity> {
        let mut matched = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            if entity.mask().contains(mask) {
                matched.push(entity);
            }
        }
        matched
    }

    /// Mutable counterpart of [`filter_by_mask`](Self::filter_by_mask).
    pub fn filter_by_mask_mut(&mut self, mask: Kind) -> Vec<&mut Entity> {
        let mut matched = Vec::with_capacity(self.entities.len());
        for entity in &mut self.entities {
            if entity.mask().contains(mask) {
                matched.push(entity);
            }
        }
        matched
    }

    /// Visit every entity holding all bits of `mask`, in store order, without
    /// allocating.
    pub fn for_each_matching<F>(&mut self, mask: Kind, mut f: F)
    where
        F: FnMut(&mut Entity),
    {
        for entity in &mut self.entities {
            if entity.mask().contains(mask) {
                f(entity);
            }
        }
    }

    /// Every entity that has a named component for each of `names`.
    ///
    /// Compares strings against every component of every entity; meant for
    /// tooling and debugging, not per-tick queries.
    pub fn filter_by_name(&self, names: &[&str]) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|entity| entity.has_names(names))
            .collect()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<Entity> for EntityStore {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl FromIterator<Entity> for EntityStore {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut store = Self::new();
        store.add(iter);
        store
    }
}
