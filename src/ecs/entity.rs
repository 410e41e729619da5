//! Entity management

use std::collections::BTreeSet;

use super::set::ComponentSet;
use super::signature::{ComponentTypes, Signature};

/// Entity ID type - simple numeric ID
pub type EntityId = u32;

/// Owns entity identity and the per-entity component signatures.
///
/// Ids live in a block `[0, capacity)` that grows by `delta` (up to
/// `max_entities`) whenever no free id is left. Freed ids go back to a pool
/// kept in descending order, so the smallest free id is always handed out
/// next.
pub struct EntityRegistry {
    max_entities: u32,
    delta: u32,
    capacity: u32,
    free: Vec<EntityId>,
    alive: Vec<bool>,
    signatures: Vec<Signature>,
    count: u32,
}

impl EntityRegistry {
    pub fn new(max_entities: u32, delta: u32) -> Self {
        Self {
            max_entities,
            delta: delta.max(1),
            capacity: 0,
            free: Vec::new(),
            alive: Vec::new(),
            signatures: Vec::new(),
            count: 0,
        }
    }

    /// Allocates the smallest free id, or returns `None` at `max_entities`.
    pub fn new_entity(&mut self) -> Option<EntityId> {
        if self.count >= self.max_entities {
            tracing::warn!(max_entities = self.max_entities, "entity capacity exhausted");
            return None;
        }
        if self.free.is_empty() {
            self.grow();
        }
        let id = self.free.pop()?;
        let slot = id as usize;
        self.signatures[slot].reset();
        self.alive[slot] = true;
        self.count += 1;
        tracing::trace!(entity = id, "entity created");
        Some(id)
    }

    /// Frees `id`. Component data stored elsewhere is left untouched.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if !self.valid(id) {
            return false;
        }
        let slot = id as usize;
        self.alive[slot] = false;
        self.signatures[slot].reset();
        self.count -= 1;
        self.release(id);
        tracing::trace!(entity = id, "entity removed");
        true
    }

    pub fn valid(&self, id: EntityId) -> bool {
        self.alive.get(id as usize).copied().unwrap_or(false)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// The id the next [`EntityRegistry::new_entity`] call would return.
    pub fn next_free(&self) -> Option<EntityId> {
        if self.count >= self.max_entities {
            return None;
        }
        match self.free.last() {
            Some(&id) => Some(id),
            None if self.capacity < self.max_entities => Some(self.capacity),
            None => None,
        }
    }

    /// Free ids in the order they will be handed out.
    pub fn free_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.free.iter().rev().copied()
    }

    pub fn signature(&self, id: EntityId) -> Option<&Signature> {
        if !self.valid(id) {
            return None;
        }
        self.signatures.get(id as usize)
    }

    /// Live ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(slot, _)| slot as EntityId)
    }

    /// Live entities whose signature matches the types in `S`.
    ///
    /// With `exact`, an entity matches only if its signature equals the query;
    /// otherwise it matches if its signature contains the query. A type in
    /// `S` that has never been given a signature bit matches nothing.
    pub fn retrieve<S: ComponentSet>(
        &self,
        types: &ComponentTypes,
        exact: bool,
    ) -> BTreeSet<EntityId> {
        match Signature::of::<S>(types) {
            Some(query) => self.matching(&query, exact),
            None => BTreeSet::new(),
        }
    }

    pub fn matching(&self, query: &Signature, exact: bool) -> BTreeSet<EntityId> {
        self.iter()
            .filter(|id| {
                let signature = &self.signatures[*id as usize];
                if exact {
                    signature == query
                } else {
                    signature.contains(query)
                }
            })
            .collect()
    }

    /// Sets the signature bits of `S` on `id`. Storage is not touched.
    ///
    /// Returns `false` if `id` is not live or a type could not get a bit.
    pub fn add_components<S: ComponentSet>(
        &mut self,
        types: &mut ComponentTypes,
        id: EntityId,
    ) -> bool {
        if !self.valid(id) {
            return false;
        }
        self.signatures[id as usize].set::<S>(types)
    }

    /// Clears the signature bits of `S` on `id`. Storage is not touched.
    pub fn remove_components<S: ComponentSet>(
        &mut self,
        types: &ComponentTypes,
        id: EntityId,
    ) -> bool {
        if !self.valid(id) {
            return false;
        }
        self.signatures[id as usize].unset::<S>(types);
        true
    }

    fn grow(&mut self) {
        let next = self.capacity.saturating_add(self.delta).min(self.max_entities);
        if next == self.capacity {
            return;
        }
        tracing::debug!(from = self.capacity, to = next, "growing entity block");
        // Descending so the smallest new id sits on top of the pool.
        self.free.extend((self.capacity..next).rev());
        self.alive.resize(next as usize, false);
        self.signatures.resize(next as usize, Signature::empty());
        self.capacity = next;
    }

    fn release(&mut self, id: EntityId) {
        let position = self.free.partition_point(|free| *free > id);
        self.free.insert(position, id);
    }
}
