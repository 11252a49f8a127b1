use std::collections::HashMap;
use std::fmt;

use lattice_core::{EntityId, IdAllocator, Kind};
use serde::{Deserialize, Serialize};

use crate::component::Component;

/// An identifier plus the components attached to it.
///
/// Components are keyed by their own [`Kind`]. The entity caches the union of
/// all held kinds so that signature checks are a single integer compare.
///
/// Only the identifier and the cached mask are serialized; component payloads
/// are opaque to the ECS.
#[derive(Serialize)]
pub struct Entity {
    id: EntityId,
    masked: Kind,
    #[serde(skip)]
    components: HashMap<Kind, Box<dyn Component>>,
    /// Bits contributed by more than one held component.
    #[serde(skip)]
    shared: Kind,
}

impl Entity {
    /// Create an entity with a fresh identifier from `ids`.
    ///
    /// Every initial component is stored under its own kind, even when its
    /// bits are already covered by an earlier one. A repeated kind keeps the
    /// last component given for it.
    pub fn new<I>(ids: &IdAllocator, components: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Component>>,
    {
        let components = components.into_iter();
        let mut map = HashMap::with_capacity(components.size_hint().0);
        let mut masked = Kind::EMPTY;
        let mut shared = Kind::EMPTY;
        for component in components {
            let kind = component.mask();
            if map.insert(kind, component).is_none() {
                shared |= masked & kind;
                masked |= kind;
            }
        }
        let entity = Self {
            id: ids.next(),
            masked,
            components: map,
            shared,
        };
        debug_assert_eq!(entity.masked, entity.keys_union());
        entity
    }

    /// Create an entity with no components.
    pub fn empty(ids: &IdAllocator) -> Self {
        Self::new(ids, std::iter::empty())
    }

    /// Builder-style [`add`](Self::add).
    pub fn with<C: Component>(mut self, component: C) -> Self {
        self.add(component);
        self
    }

    /// The entity's identifier.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Union of the kinds of every held component. O(1).
    pub fn mask(&self) -> Kind {
        self.masked
    }

    /// Whether every bit of `kind` is held.
    pub fn contains(&self, kind: Kind) -> bool {
        self.masked.contains(kind)
    }

    /// Attach a component. Returns `false` if it was skipped because all of
    /// its bits were already held.
    pub fn add<C: Component>(&mut self, component: C) -> bool {
        self.add_boxed(Box::new(component))
    }

    /// Attach an already boxed component. See [`add`](Self::add).
    ///
    /// The component's [`mask`](Component::mask) is read once, here; it is the
    /// key the component is stored and removed under.
    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> bool {
        let kind = component.mask();
        if self.masked.contains(kind) {
            return false;
        }
        self.shared |= self.masked & kind;
        self.masked |= kind;
        self.components.insert(kind, component);
        debug_assert_eq!(self.masked, self.keys_union());
        true
    }

    /// Attach several components, in order.
    pub fn add_all<I>(&mut self, components: I)
    where
        I: IntoIterator<Item = Box<dyn Component>>,
    {
        for component in components {
            self.add_boxed(component);
        }
    }

    /// The component stored under exactly `mask`.
    pub fn get(&self, mask: Kind) -> Option<&(dyn Component + 'static)> {
        self.components.get(&mask).map(Box::as_ref)
    }

    /// Mutable access to the component stored under exactly `mask`.
    pub fn get_mut(&mut self, mask: Kind) -> Option<&mut (dyn Component + 'static)> {
        self.components.get_mut(&mask).map(Box::as_mut)
    }

    /// The component stored under `mask`, downcast to `T`.
    pub fn get_as<T: Component>(&self, mask: Kind) -> Option<&T> {
        self.get(mask)?.downcast_ref::<T>()
    }

    /// Mutable access to the component stored under `mask`, downcast to `T`.
    pub fn get_as_mut<T: Component>(&mut self, mask: Kind) -> Option<&mut T> {
        self.get_mut(mask)?.downcast_mut::<T>()
    }

    /// Detach the component stored under exactly `mask`. Missing keys are a
    /// no-op.
    pub fn remove(&mut self, mask: Kind) -> Option<Box<dyn Component>> {
        let removed = self.components.remove(&mask)?;
        if self.shared.intersects(mask) {
            // Another component still covers some of these bits.
            self.recompute_masks();
        } else {
            self.masked = self.masked.difference(mask);
        }
        debug_assert_eq!(self.masked, self.keys_union());
        Some(removed)
    }

    fn keys_union(&self) -> Kind {
        self.components.keys().fold(Kind::EMPTY, |acc, &kind| acc | kind)
    }

    fn recompute_masks(&mut self) {
        let mut masked = Kind::EMPTY;
        let mut shared = Kind::EMPTY;
        for &kind in self.components.keys() {
            shared |= masked & kind;
            masked |= kind;
        }
        self.masked = masked;
        self.shared = shared;
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over `(key, component)` pairs in unspecified order.
    pub fn components(&self) -> impl Iterator<Item = (Kind, &(dyn Component + 'static))> {
        self.components.iter().map(|(kind, c)| (*kind, c.as_ref()))
    }

    /// Names of the components that expose one.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.values().filter_map(|c| c.name())
    }

    /// Whether every name in `names` belongs to some held component.
    pub fn has_names(&self, names: &[&str]) -> bool {
        names
            .iter()
            .all(|name| self.components.values().any(|c| c.name() == Some(*name)))
    }

    /// The serializable identity of this entity.
    pub fn header(&self) -> EntityHeader {
        EntityHeader {
            id: self.id,
            masked: self.masked,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("masked", &self.masked)
            .field("components", &self.components.len())
            .finish()
    }
}

/// The persisted fields of an [`Entity`]: its identifier and component mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHeader {
    pub id: EntityId,
    pub masked: Kind,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A component whose mask and name are chosen at runtime.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Mock {
        pub name: &'static str,
        pub mask: Kind,
    }

    impl Component for Mock {
        fn mask(&self) -> Kind {
            self.mask
        }

        fn name(&self) -> Option<&str> {
            Some(self.name)
        }
    }

    pub(crate) fn mock(name: &'static str, mask: u64) -> Box<dyn Component> {
        Box::new(Mock {
            name,
            mask: Kind(mask),
        })
    }

    fn union_of_keys(entity: &Entity) -> Kind {
        entity
            .components()
            .fold(Kind::EMPTY, |acc, (kind, _)| acc | kind)
    }

    #[test]
    fn new_entity_computes_mask() {
        let ids = IdAllocator::new();
        let entity = Entity::new(&ids, vec![mock("position", 1)]);
        assert_eq!(entity.mask(), Kind(1));
        assert_eq!(entity.id().raw(), 0);
    }

    #[test]
    fn add_second_component() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1)]);
        assert!(entity.add_boxed(mock("velocity", 2)));
        assert_eq!(entity.mask(), Kind(3));
    }

    #[test]
    fn add_existing_kind_is_skipped() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1), mock("velocity", 2)]);
        assert!(!entity.add_boxed(mock("other-velocity", 2)));
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.mask(), Kind(3));
        assert_eq!(entity.get_as::<Mock>(Kind(2)).unwrap().name, "velocity");
    }

    #[test]
    fn composite_skipped_only_when_fully_covered() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1)]);
        // 0b11 overlaps but is not covered by 0b01.
        assert!(entity.add_boxed(mock("pair", 3)));
        assert_eq!(entity.len(), 2);
        // 0b10 is now fully covered by the composite.
        assert!(!entity.add_boxed(mock("velocity", 2)));
        assert_eq!(entity.mask(), Kind(3));
    }

    #[test]
    fn get_hit_and_miss() {
        let ids = IdAllocator::new();
        let entity = Entity::new(&ids, vec![mock("position", 1)]);
        assert_eq!(entity.get(Kind(1)).and_then(|c| c.name()), Some("position"));
        assert!(entity.get(Kind(2)).is_none());
        // Lookup is by exact key, not by bit.
        assert!(entity.get(Kind(3)).is_none());
    }

    #[test]
    fn get_as_mut_mutates_in_place() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1)]);
        entity.get_as_mut::<Mock>(Kind(1)).unwrap().name = "moved";
        assert_eq!(entity.get_as::<Mock>(Kind(1)).unwrap().name, "moved");
    }

    #[test]
    fn remove_clears_bits() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(
            &ids,
            vec![mock("position", 1), mock("size", 2), mock("velocity", 4)],
        );
        let removed = entity.remove(Kind(4)).unwrap();
        assert_eq!(removed.name(), Some("velocity"));
        assert_eq!(entity.mask(), Kind(3));
        assert_eq!(entity.len(), 2);
    }

    #[test]
    fn remove_twice_is_noop() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1), mock("size", 2)]);
        assert!(entity.remove(Kind(2)).is_some());
        assert!(entity.remove(Kind(2)).is_none());
        assert_eq!(entity.mask(), Kind(1));
        assert_eq!(entity.len(), 1);
    }

    #[test]
    fn add_then_remove_restores_mask() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1), mock("size", 4)]);
        let before = entity.mask();
        entity.add_boxed(mock("velocity", 2));
        entity.remove(Kind(2));
        assert_eq!(entity.mask(), before);
    }

    #[test]
    fn removing_overlapping_composite_keeps_invariant() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("position", 1), mock("pair", 3)]);
        assert_eq!(entity.mask(), Kind(3));
        entity.remove(Kind(3));
        assert_eq!(entity.mask(), Kind(1));
        assert_eq!(entity.mask(), union_of_keys(&entity));

        entity.add_boxed(mock("pair", 3));
        entity.remove(Kind(1));
        assert_eq!(entity.mask(), Kind(3));
        assert_eq!(entity.mask(), union_of_keys(&entity));
    }

    #[test]
    fn mask_matches_keys_after_mixed_operations() {
        let ids = IdAllocator::new();
        let mut entity = Entity::empty(&ids);
        let script: &[(bool, u64)] = &[
            (true, 1),
            (true, 2),
            (true, 6),
            (false, 2),
            (true, 8),
            (false, 1),
            (true, 1),
            (false, 6),
            (false, 6),
            (true, 2),
        ];
        for &(add, bits) in script {
            if add {
                entity.add_boxed(mock("c", bits));
            } else {
                entity.remove(Kind(bits));
            }
            assert_eq!(entity.mask(), union_of_keys(&entity), "after {add} {bits}");
        }
    }

    #[test]
    fn duplicate_initial_components_last_wins() {
        let ids = IdAllocator::new();
        let entity = Entity::new(&ids, vec![mock("first", 1), mock("second", 1)]);
        assert_eq!(entity.len(), 1);
        assert_eq!(entity.mask(), Kind(1));
        assert_eq!(entity.get_as::<Mock>(Kind(1)).unwrap().name, "second");
    }

    #[test]
    fn initial_composite_keeps_its_sub_bit() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("pair", 3), mock("position", 1)]);
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.mask(), Kind(3));
        assert_eq!(entity.get(Kind(1)).and_then(|c| c.name()), Some("position"));
        assert_eq!(entity.get(Kind(3)).and_then(|c| c.name()), Some("pair"));

        // Bit 0 is held by both keys, so dropping one must not clear it.
        entity.remove(Kind(3));
        assert_eq!(entity.mask(), Kind(1));
        assert_eq!(entity.mask(), union_of_keys(&entity));
    }

    #[test]
    fn add_after_new_still_skips_covered_kinds() {
        let ids = IdAllocator::new();
        let mut entity = Entity::new(&ids, vec![mock("pair", 3)]);
        assert!(!entity.add_boxed(mock("position", 1)));
        assert_eq!(entity.len(), 1);
    }

    #[test]
    fn names_and_has_names() {
        let ids = IdAllocator::new();
        let entity = Entity::new(&ids, vec![mock("position", 1), mock("size", 2)]);
        let mut names: Vec<_> = entity.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["position", "size"]);
        assert!(entity.has_names(&["size", "position"]));
        assert!(!entity.has_names(&["size", "velocity"]));
        assert!(entity.has_names(&[]));
    }

    #[test]
    fn builder_style() {
        let ids = IdAllocator::starting_at(7);
        let entity = Entity::empty(&ids)
            .with(Mock {
                name: "position",
                mask: Kind(1),
            })
            .with(Mock {
                name: "size",
                mask: Kind(2),
            });
        assert_eq!(entity.id().raw(), 7);
        assert_eq!(entity.mask(), Kind(3));
    }

    #[test]
    fn serializes_id_and_mask_only() {
        let ids = IdAllocator::starting_at(12);
        let entity = Entity::new(&ids, vec![mock("position", 1), mock("size", 4)]);
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"id":12,"masked":5}"#);

        let header: EntityHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(header, entity.header());
    }
}
