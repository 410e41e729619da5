//! Component storage: one dense array per component type, indexed through a
//! sparse entity-id map.

use std::any::Any;
use std::collections::HashMap;

use super::EntityId;

/// Trait for components
pub trait Component: Clone + Send + Sync + 'static {}

/// Type-erased component storage
pub trait ComponentStorage: Send + Sync {
    fn remove(&mut self, entity_id: EntityId) -> bool;
    fn has(&self, entity_id: EntityId) -> bool;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for a specific component type.
///
/// `dense[i]` belongs to `owners[i]`, and `sparse[owners[i]] == i` for every
/// slot. Removal swaps the last slot into the hole, so dense order is not
/// stable across removals.
pub struct ComponentStore<T: Component> {
    dense: Vec<T>,
    owners: Vec<EntityId>,
    sparse: HashMap<EntityId, usize>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            owners: Vec::new(),
            sparse: HashMap::new(),
        }
    }

    /// Copy of the value stored for `entity_id`.
    pub fn at(&self, entity_id: EntityId) -> Option<T> {
        self.get(entity_id).cloned()
    }

    pub fn get(&self, entity_id: EntityId) -> Option<&T> {
        let index = *self.sparse.get(&entity_id)?;
        self.dense.get(index)
    }

    pub fn get_mut(&mut self, entity_id: EntityId) -> Option<&mut T> {
        let index = *self.sparse.get(&entity_id)?;
        self.dense.get_mut(index)
    }

    /// Inserts or overwrites the value for `entity_id`.
    pub fn emplace(&mut self, entity_id: EntityId, value: T) {
        if let Some(&index) = self.sparse.get(&entity_id) {
            self.dense[index] = value;
            return;
        }
        self.sparse.insert(entity_id, self.dense.len());
        self.dense.push(value);
        self.owners.push(entity_id);
    }

    /// Removes the value for `entity_id`, returning it if present.
    pub fn erase(&mut self, entity_id: EntityId) -> Option<T> {
        let index = self.sparse.remove(&entity_id)?;
        let value = self.dense.swap_remove(index);
        self.owners.swap_remove(index);
        if let Some(&moved) = self.owners.get(index) {
            self.sparse.insert(moved, index);
        }
        Some(value)
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.sparse.contains_key(&entity_id)
    }

    /// Owner ids in dense order.
    pub fn ids(&self) -> &[EntityId] {
        &self.owners
    }

    /// Values in dense order.
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for ComponentStore<T> {
    fn remove(&mut self, entity_id: EntityId) -> bool {
        self.erase(entity_id).is_some()
    }

    fn has(&self, entity_id: EntityId) -> bool {
        self.contains(entity_id)
    }

    fn clear(&mut self) {
        self.dense.clear();
        self.owners.clear();
        self.sparse.clear();
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
