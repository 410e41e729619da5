//! Type-erased directory of component stores.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{Component, ComponentStorage, ComponentStore};
use super::set::{ComponentBundle, ComponentSet};
use super::EntityId;

/// Holds one [`ComponentStore`] per registered component type.
///
/// Calls naming an unregistered type are skipped (mutators) or answer
/// `None` (readers); [`ComponentRegistry::registered`] tells them apart.
#[derive(Default)]
pub struct ComponentRegistry {
    stores: HashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_components<S: ComponentSet>(&mut self) {
        S::register_into(self);
    }

    pub fn unregister_components<S: ComponentSet>(&mut self) {
        S::unregister_from(self);
    }

    pub fn update_data<B: ComponentBundle>(&mut self, entity_id: EntityId, values: B) {
        values.update_into(self, entity_id);
    }

    pub fn remove_data<S: ComponentSet>(&mut self, entity_id: EntityId) {
        S::remove_from(self, entity_id);
    }

    /// Creates an empty store for `T` unless one exists.
    pub fn register<T: Component>(&mut self) {
        self.stores.entry(TypeId::of::<T>()).or_insert_with(|| {
            tracing::debug!(component = std::any::type_name::<T>(), "registered store");
            Box::new(ComponentStore::<T>::new())
        });
    }

    /// Drops the store for `T` along with its data.
    pub fn unregister<T: Component>(&mut self) -> bool {
        self.stores.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn registered<T: Component>(&self) -> bool {
        self.stores.contains_key(&TypeId::of::<T>())
    }

    /// Stores `value` for `entity_id` if `T` is registered.
    pub fn update<T: Component>(&mut self, entity_id: EntityId, value: T) -> bool {
        match self.store_mut::<T>() {
            Some(store) => {
                store.emplace(entity_id, value);
                true
            }
            None => false,
        }
    }

    pub fn remove<T: Component>(&mut self, entity_id: EntityId) -> Option<T> {
        self.store_mut::<T>()?.erase(entity_id)
    }

    /// Copy of the `T` stored for `entity_id`.
    pub fn retrieve<T: Component>(&self, entity_id: EntityId) -> Option<T> {
        self.store::<T>()?.at(entity_id)
    }

    pub fn get<T: Component>(&self, entity_id: EntityId) -> Option<&T> {
        self.store::<T>()?.get(entity_id)
    }

    pub fn get_mut<T: Component>(&mut self, entity_id: EntityId) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(entity_id)
    }

    pub fn has<T: Component>(&self, entity_id: EntityId) -> bool {
        self.store::<T>()
            .map(|store| store.contains(entity_id))
            .unwrap_or(false)
    }

    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
    }

    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }

    /// Removes every component stored for `entity_id`, whatever its type.
    ///
    /// Returns how many values were dropped.
    pub fn purge(&mut self, entity_id: EntityId) -> usize {
        self.stores
            .values_mut()
            .map(|store| store.remove(entity_id))
            .filter(|removed| *removed)
            .count()
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Names of the registered component types, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stores.values().map(|store| store.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct A(i32);
    impl Component for A {}

    #[derive(Debug, Clone, PartialEq)]
    struct B(&'static str);
    impl Component for B {}

    #[test]
    fn test_update_retrieve_remove() {
        let mut registry = ComponentRegistry::new();
        registry.register_components::<(A,)>();

        registry.update_data(0, (A(3),));
        assert_eq!(registry.retrieve::<A>(0), Some(A(3)));

        registry.remove_data::<(A,)>(0);
        assert_eq!(registry.retrieve::<A>(0), None);
    }

    #[test]
    fn test_unregistered_types_are_skipped() {
        let mut registry = ComponentRegistry::new();
        registry.register::<A>();

        registry.update_data(1, (A(1), B("skipped")));
        assert!(!registry.registered::<B>());
        assert_eq!(registry.retrieve::<B>(1), None);
        assert_eq!(registry.retrieve::<A>(1), Some(A(1)));

        registry.remove_data::<(B,)>(1);
        assert_eq!(registry.retrieve::<A>(1), Some(A(1)));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        registry.register_components::<(A, B)>();
        registry.update(4, A(9));

        registry.register_components::<(A, B)>();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.retrieve::<A>(4), Some(A(9)));
    }

    #[test]
    fn test_unregister_drops_data() {
        let mut registry = ComponentRegistry::new();
        registry.register_components::<(A, B)>();
        registry.update_data(2, (A(5), B("x")));

        registry.unregister_components::<(A,)>();
        assert!(!registry.registered::<A>());
        assert_eq!(registry.retrieve::<A>(2), None);
        assert_eq!(registry.retrieve::<B>(2), Some(B("x")));

        registry.register::<A>();
        assert_eq!(registry.retrieve::<A>(2), None);
    }

    #[test]
    fn test_purge_clears_every_store() {
        let mut registry = ComponentRegistry::new();
        registry.register_components::<(A, B)>();
        registry.update_data(3, (A(1), B("y")));
        registry.update(4, A(2));

        assert_eq!(registry.purge(3), 2);
        assert!(!registry.has::<A>(3));
        assert!(!registry.has::<B>(3));
        assert!(registry.has::<A>(4));
        assert_eq!(registry.purge(3), 0);
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut registry = ComponentRegistry::new();
        registry.register::<A>();
        registry.update(0, A(1));

        if let Some(value) = registry.get_mut::<A>(0) {
            value.0 += 10;
        }
        assert_eq!(registry.get::<A>(0), Some(&A(11)));
    }
}
