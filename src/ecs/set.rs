//! Tuple impls that let one call name several component types at once,
//! e.g. `registry.register_components::<(Position, Velocity)>()`.

use super::registry::ComponentRegistry;
use super::signature::ComponentType;
use super::{Component, EntityId};

/// A list of component types, written as a tuple.
pub trait ComponentSet: 'static {
    fn component_types() -> Vec<ComponentType>;
    fn register_into(registry: &mut ComponentRegistry);
    fn unregister_from(registry: &mut ComponentRegistry);
    fn remove_from(registry: &mut ComponentRegistry, entity_id: EntityId);
}

/// A tuple of component values, one per type.
pub trait ComponentBundle: ComponentSet {
    fn update_into(self, registry: &mut ComponentRegistry, entity_id: EntityId);
}

macro_rules! impl_component_set {
    ($($name:ident),*) => {
        impl<$($name: Component),*> ComponentSet for ($($name,)*) {
            fn component_types() -> Vec<ComponentType> {
                vec![$(ComponentType::of::<$name>()),*]
            }

            #[allow(unused_variables)]
            fn register_into(registry: &mut ComponentRegistry) {
                $(registry.register::<$name>();)*
            }

            #[allow(unused_variables)]
            fn unregister_from(registry: &mut ComponentRegistry) {
                $(registry.unregister::<$name>();)*
            }

            #[allow(unused_variables)]
            fn remove_from(registry: &mut ComponentRegistry, entity_id: EntityId) {
                $(registry.remove::<$name>(entity_id);)*
            }
        }

        impl<$($name: Component),*> ComponentBundle for ($($name,)*) {
            #[allow(non_snake_case, unused_variables)]
            fn update_into(self, registry: &mut ComponentRegistry, entity_id: EntityId) {
                let ($($name,)*) = self;
                $(registry.update(entity_id, $name);)*
            }
        }
    };
}

impl_component_set!();
impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
