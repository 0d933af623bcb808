//! Entity storage.
//!
//! Entities are composed of optional components. Only components that are
//! `Some` are active for an entity. This gives flexible composition without
//! a full ECS framework.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::{AttackEffect, CharacterStats, Locomotion, Transform, Unit};

/// Unique identifier for entities.
pub type EntityId = u64;

/// An entity with optional components.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// World position.
    pub transform: Option<Transform>,
    /// Board unit data.
    pub unit: Option<Unit>,
    /// Own stats instance (enemy units only; players use their roster entry).
    pub stats: Option<CharacterStats>,
    /// Active glide.
    pub locomotion: Option<Locomotion>,
    /// Attack effect marker.
    pub effect: Option<AttackEffect>,
}

impl Entity {
    /// Create a new entity with no components.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: attach a transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Builder: attach a unit.
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Builder: attach stats.
    #[must_use]
    pub fn with_stats(mut self, stats: CharacterStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Builder: attach a glide.
    #[must_use]
    pub fn with_locomotion(mut self, locomotion: Locomotion) -> Self {
        self.locomotion = Some(locomotion);
        self
    }

    /// Builder: attach an attack effect.
    #[must_use]
    pub fn with_effect(mut self, effect: AttackEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Storage for all battle entities.
///
/// Uses a `HashMap` for O(1) lookup by ID, with deterministic iteration via
/// sorted keys when running systems. IDs are never reused, so ascending ID
/// order is creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStorage {
    entities: HashMap<EntityId, Entity>,
    next_id: EntityId,
}

impl Default for EntityStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity and return its ID.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get sorted entity IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted IDs of entities matching a predicate.
    pub fn ids_where(&self, mut predicate: impl FnMut(&Entity) -> bool) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, e)| predicate(e))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of entities matching a predicate.
    pub fn count_where(&self, mut predicate: impl FnMut(&Entity) -> bool) -> usize {
        self.entities.values().filter(|e| predicate(e)).count()
    }

    /// Unit component of an entity.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.get(id).and_then(|e| e.unit.as_ref())
    }

    /// Mutable unit component of an entity.
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.get_mut(id).and_then(|e| e.unit.as_mut())
    }
}

/// Entities waiting to be destroyed at the end of the frame.
#[derive(Debug, Clone, Default)]
pub struct DestroyQueue {
    pending: Vec<EntityId>,
}

impl DestroyQueue {
    /// Queue an entity. Duplicates are fine.
    pub fn push(&mut self, id: EntityId) {
        self.pending.push(id);
    }

    /// Nothing queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take the queued IDs, sorted and deduplicated.
    pub fn drain_sorted(&mut self) -> Vec<EntityId> {
        let mut ids = std::mem::take(&mut self.pending);
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Destroy every queued entity. Returns the number removed.
    pub fn flush(&mut self, storage: &mut EntityStorage) -> usize {
        self.drain_sorted()
            .into_iter()
            .filter(|id| storage.remove(*id).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardCoord;
    use crate::components::{CardRef, Facing, Owner};
    use crate::roster::RosterId;

    fn unit(side_player: bool) -> Unit {
        let owner = if side_player {
            Owner::Player(RosterId(0))
        } else {
            Owner::Enemy { template: 0 }
        };
        Unit::new(owner, CardRef::Player(0), BoardCoord::new(0, 0), Facing::Up)
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut storage = EntityStorage::new();
        let a = storage.insert(Entity::new());
        let b = storage.insert(Entity::new());
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        storage.remove(a);
        let c = storage.insert(Entity::new());
        assert_eq!(c, 3);
        assert_eq!(storage.sorted_ids(), vec![2, 3]);
    }

    #[test]
    fn test_ids_where_is_sorted() {
        let mut storage = EntityStorage::new();
        for i in 0..10 {
            storage.insert(Entity::new().with_unit(unit(i % 2 == 0)));
        }
        let players = storage.ids_where(|e| e.unit.as_ref().is_some_and(Unit::player_controlled));
        assert_eq!(players, vec![1, 3, 5, 7, 9]);
        assert_eq!(storage.count_where(|e| e.unit.is_some()), 10);
    }

    #[test]
    fn test_destroy_queue_sorts_and_dedups() {
        let mut queue = DestroyQueue::default();
        queue.push(5);
        queue.push(2);
        queue.push(5);
        queue.push(3);
        assert_eq!(queue.drain_sorted(), vec![2, 3, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_destroy_queue_flush_ignores_missing() {
        let mut storage = EntityStorage::new();
        let a = storage.insert(Entity::new());
        let mut queue = DestroyQueue::default();
        queue.push(a);
        queue.push(a);
        queue.push(99);
        assert_eq!(queue.flush(&mut storage), 1);
        assert!(storage.is_empty());
    }
}
