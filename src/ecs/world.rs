//! World - central ECS container

use std::any::TypeId;
use std::collections::BTreeSet;

use super::set::{ComponentBundle, ComponentSet};
use super::system::SystemSet;
use super::{
    Component, ComponentRegistry, ComponentTypes, EntityId, EntityRegistry, System,
    SystemRegistry,
};
use crate::config::EcsConfig;
use crate::error::EcsError;

/// World holds all entities, components and systems.
///
/// The registries it owns are independent of one another; the world is
/// the place that keeps them in step. Despawning purges the entity's
/// component data, and inserting or removing components updates both
/// storage and the entity's signature.
pub struct World {
    types: ComponentTypes,
    entities: EntityRegistry,
    components: ComponentRegistry,
    systems: SystemRegistry,
}

impl World {
    pub fn new(config: &EcsConfig) -> Self {
        Self {
            types: ComponentTypes::new(config.max_components),
            entities: EntityRegistry::new(config.max_entities, config.entity_delta),
            components: ComponentRegistry::new(),
            systems: SystemRegistry::new(),
        }
    }

    pub fn types(&self) -> &ComponentTypes {
        &self.types
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Create a new entity
    pub fn spawn(&mut self) -> Option<EntityId> {
        self.entities.new_entity()
    }

    pub fn try_spawn(&mut self) -> Result<EntityId, EcsError> {
        self.spawn().ok_or(EcsError::EntityCapacity {
            max: self.entities.max_entities(),
        })
    }

    /// Destroy an entity and remove all its components
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.entities.remove_entity(id) {
            return false;
        }
        self.components.purge(id);
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.valid(id)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.count()
    }

    /// Attach component values to an entity, registering their stores.
    ///
    /// Nothing is written if the entity is dead or the types cannot all
    /// get a signature bit; in that case no new bit is handed out either.
    pub fn insert<B: ComponentBundle>(
        &mut self,
        id: EntityId,
        values: B,
    ) -> Result<(), EcsError> {
        if !self.entities.valid(id) {
            return Err(EcsError::InvalidEntity(id));
        }
        self.reserve_types::<B>()?;
        self.components.register_components::<B>();
        self.components.update_data(id, values);
        self.entities.add_components::<B>(&mut self.types, id);
        Ok(())
    }

    /// Detach the components in `S` from an entity.
    pub fn remove<S: ComponentSet>(&mut self, id: EntityId) -> bool {
        if !self.entities.valid(id) {
            return false;
        }
        self.components.remove_data::<S>(id);
        self.entities.remove_components::<S>(&self.types, id)
    }

    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.components.get(id)
    }

    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.components.get_mut(id)
    }

    pub fn retrieve<T: Component>(&self, id: EntityId) -> Option<T> {
        self.components.retrieve(id)
    }

    /// Like [`World::get`], but tells a dead entity and an unknown type
    /// apart from a live entity that simply lacks `T`.
    pub fn try_get<T: Component>(&self, id: EntityId) -> Result<Option<&T>, EcsError> {
        if !self.entities.valid(id) {
            return Err(EcsError::InvalidEntity(id));
        }
        let store = self
            .components
            .store::<T>()
            .ok_or(EcsError::UnregisteredComponent(std::any::type_name::<T>()))?;
        Ok(store.get(id))
    }

    /// Check if entity has a component
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        match (self.types.index_of::<T>(), self.entities.signature(id)) {
            (Some(bit), Some(signature)) => signature.test(bit),
            _ => false,
        }
    }

    pub fn query<S: ComponentSet>(&self, exact: bool) -> BTreeSet<EntityId> {
        self.entities.retrieve::<S>(&self.types, exact)
    }

    pub fn add_systems<S: SystemSet>(&mut self) {
        self.systems.emplace::<S>();
    }

    pub fn system<T: System>(&self) -> Option<&T> {
        self.systems.system::<T>()
    }

    pub fn system_mut<T: System>(&mut self) -> Option<&mut T> {
        self.systems.system_mut::<T>()
    }

    /// Add the components in `S` to the interest of system `T`.
    ///
    /// The interest is left unchanged if any type in `S` cannot get a bit.
    pub fn watch<T: System, S: ComponentSet>(&mut self) -> Result<(), EcsError> {
        if !self.systems.contains::<T>() {
            return Err(EcsError::UnregisteredSystem(std::any::type_name::<T>()));
        }
        self.reserve_types::<S>()?;
        self.systems.add_components::<T, S>(&mut self.types);
        Ok(())
    }

    pub fn unwatch<T: System, S: ComponentSet>(&mut self) -> bool {
        self.systems.remove_components::<T, S>(&self.types)
    }

    /// Hands system `T` the entities matching its interest.
    ///
    /// The id set is taken before `update` runs, so entities spawned or
    /// changed during the update are seen on the next call. Returns the
    /// number of entities handed over, or `None` if `T` is not registered.
    pub fn run_system<T: System>(&mut self) -> Option<usize> {
        let system = self.systems.get_dyn_mut(TypeId::of::<T>())?;
        let ids = self.entities.matching(system.signature(), false);
        system.update(&mut self.components, &ids);
        Some(ids.len())
    }

    fn reserve_types<S: ComponentSet>(&mut self) -> Result<(), EcsError> {
        self.types
            .assign_all(&S::component_types())
            .map_err(|ty| EcsError::ComponentCapacity {
                name: ty.name(),
                max: self.types.capacity(),
            })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&EcsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::ecs::Signature;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    #[derive(Default)]
    struct Drift {
        signature: Signature,
        seen: Vec<EntityId>,
    }

    impl System for Drift {
        fn signature(&self) -> &Signature {
            &self.signature
        }

        fn signature_mut(&mut self) -> &mut Signature {
            &mut self.signature
        }

        fn update(&mut self, components: &mut ComponentRegistry, entities: &BTreeSet<EntityId>) {
            for &id in entities {
                self.seen.push(id);
                let Some(velocity) = components.retrieve::<Velocity>(id) else {
                    continue;
                };
                if let Some(position) = components.get_mut::<Position>(id) {
                    position.x += velocity.dx;
                    position.y += velocity.dy;
                }
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_world_entity_lifecycle() {
        let mut world = World::default();

        let e1 = world.spawn().unwrap();
        let e2 = world.spawn().unwrap();

        assert!(world.is_alive(e1));
        assert!(world.is_alive(e2));
        assert_eq!(world.entity_count(), 2);

        assert!(world.despawn(e1));
        assert!(!world.is_alive(e1));
        assert!(world.is_alive(e2));
        assert_eq!(world.entity_count(), 1);
        assert!(!world.despawn(e1));
    }

    #[test]
    fn test_world_components() {
        let mut world = World::default();

        let entity = world.spawn().unwrap();
        world
            .insert(entity, (Position { x: 1.0, y: 2.0 }, Velocity { dx: 0.5, dy: 0.5 }))
            .unwrap();

        assert!(world.has::<Position>(entity));
        assert!(world.has::<Velocity>(entity));

        assert_eq!(world.get::<Position>(entity).unwrap().x, 1.0);

        if let Some(vel) = world.get_mut::<Velocity>(entity) {
            vel.dx = 1.0;
        }
        assert_eq!(world.retrieve::<Velocity>(entity).unwrap().dx, 1.0);

        assert!(world.remove::<(Velocity,)>(entity));
        assert!(!world.has::<Velocity>(entity));
        assert!(world.get::<Velocity>(entity).is_none());
    }

    #[test]
    fn test_despawn_purges_data() {
        let mut world = World::default();
        let entity = world.spawn().unwrap();
        world.insert(entity, (Position { x: 0.0, y: 0.0 },)).unwrap();

        world.despawn(entity);
        let reused = world.spawn().unwrap();
        assert_eq!(reused, entity);
        assert!(world.get::<Position>(reused).is_none());
        assert!(!world.has::<Position>(reused));
    }

    #[test]
    fn test_try_get_reports_why() {
        let mut world = World::default();
        let entity = world.spawn().unwrap();
        let other = world.spawn().unwrap();

        assert!(matches!(
            world.try_get::<Position>(entity),
            Err(EcsError::UnregisteredComponent(_))
        ));
        world.insert(entity, (Position { x: 2.0, y: 0.0 },)).unwrap();
        assert_eq!(
            world.try_get::<Position>(entity),
            Ok(Some(&Position { x: 2.0, y: 0.0 }))
        );
        assert_eq!(world.try_get::<Position>(other), Ok(None));
        assert_eq!(world.try_get::<Position>(99), Err(EcsError::InvalidEntity(99)));
    }

    #[test]
    fn test_insert_on_dead_entity() {
        let mut world = World::default();
        assert_eq!(
            world.insert(3, (Position { x: 0.0, y: 0.0 },)),
            Err(EcsError::InvalidEntity(3))
        );
        assert!(!world.components().registered::<Position>());
    }

    #[test]
    fn test_insert_past_component_capacity() {
        let config = EcsConfig {
            max_components: 1,
            ..EcsConfig::default()
        };
        let mut world = World::new(&config);
        let entity = world.spawn().unwrap();
        world.insert(entity, (Position { x: 0.0, y: 0.0 },)).unwrap();

        let err = world
            .insert(entity, (Velocity { dx: 1.0, dy: 1.0 },))
            .unwrap_err();
        assert!(matches!(err, EcsError::ComponentCapacity { max: 1, .. }));
        assert!(world.get::<Velocity>(entity).is_none());
    }

    #[test]
    fn test_failed_insert_hands_out_no_bits() {
        let config = EcsConfig {
            max_components: 1,
            ..EcsConfig::default()
        };
        let mut world = World::new(&config);
        let entity = world.spawn().unwrap();

        let err = world
            .insert(entity, (Position { x: 0.0, y: 0.0 }, Velocity { dx: 0.0, dy: 0.0 }))
            .unwrap_err();
        assert!(matches!(err, EcsError::ComponentCapacity { max: 1, .. }));
        assert!(world.types().is_empty());
        assert!(world.get::<Position>(entity).is_none());

        world.insert(entity, (Velocity { dx: 1.0, dy: 0.0 },)).unwrap();
        assert!(world.has::<Velocity>(entity));
    }

    #[test]
    fn test_failed_watch_keeps_interest() {
        let config = EcsConfig {
            max_components: 1,
            ..EcsConfig::default()
        };
        let mut world = World::new(&config);
        world.add_systems::<(Drift,)>();

        let err = world.watch::<Drift, (Position, Velocity)>().unwrap_err();
        assert!(matches!(err, EcsError::ComponentCapacity { max: 1, .. }));
        assert!(world.system::<Drift>().unwrap().signature().is_empty());

        let partial = world.spawn().unwrap();
        world.insert(partial, (Position { x: 0.0, y: 0.0 },)).unwrap();
        world.watch::<Drift, (Position,)>().unwrap();

        assert!(world.watch::<Drift, (Position, Velocity)>().is_err());
        let expected = Signature::of::<(Position,)>(world.types()).unwrap();
        assert_eq!(world.system::<Drift>().unwrap().signature(), &expected);
        assert_eq!(world.run_system::<Drift>(), Some(1));
    }

    #[test]
    fn test_run_system_sees_matching_entities() {
        let mut world = World::default();
        world.add_systems::<(Drift,)>();
        world.watch::<Drift, (Position, Velocity)>().unwrap();

        let mover = world.spawn().unwrap();
        world
            .insert(mover, (Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 2.0 }))
            .unwrap();
        let still = world.spawn().unwrap();
        world.insert(still, (Position { x: 5.0, y: 5.0 },)).unwrap();

        assert_eq!(world.run_system::<Drift>(), Some(1));
        assert_eq!(world.system::<Drift>().unwrap().seen, vec![mover]);
        assert_eq!(world.get::<Position>(mover), Some(&Position { x: 1.0, y: 2.0 }));
        assert_eq!(world.get::<Position>(still), Some(&Position { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn test_unknown_system() {
        let mut world = World::default();
        assert_eq!(world.run_system::<Drift>(), None);
        assert!(matches!(
            world.watch::<Drift, (Position,)>(),
            Err(EcsError::UnregisteredSystem(_))
        ));
    }
}
