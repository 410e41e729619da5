//! Systems and the registry that owns them.

use std::any::{Any, TypeId};
use std::collections::BTreeSet;

use super::registry::ComponentRegistry;
use super::set::ComponentSet;
use super::signature::{ComponentTypes, Signature};
use super::EntityId;

/// A unit of behaviour with an interest signature.
///
/// The frame loop hands `update` the entities whose signature contains
/// [`System::signature`]; the system reads and writes their data through
/// the component registry.
pub trait System: Send + Sync + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn signature(&self) -> &Signature;

    fn signature_mut(&mut self) -> &mut Signature;

    fn update(&mut self, components: &mut ComponentRegistry, entities: &BTreeSet<EntityId>);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Interest mutation for any system, boxed or not.
pub trait SystemExt {
    fn add_components<S: ComponentSet>(&mut self, types: &mut ComponentTypes) -> bool;
    fn remove_components<S: ComponentSet>(&mut self, types: &ComponentTypes);
}

impl<T: System + ?Sized> SystemExt for T {
    fn add_components<S: ComponentSet>(&mut self, types: &mut ComponentTypes) -> bool {
        self.signature_mut().set::<S>(types)
    }

    fn remove_components<S: ComponentSet>(&mut self, types: &ComponentTypes) {
        self.signature_mut().unset::<S>(types);
    }
}

/// A list of system types, written as a tuple.
pub trait SystemSet: 'static {
    fn emplace_into(registry: &mut SystemRegistry);
    fn erase_from(registry: &mut SystemRegistry);
}

macro_rules! impl_system_set {
    ($($name:ident),*) => {
        impl<$($name: System + Default),*> SystemSet for ($($name,)*) {
            #[allow(unused_variables)]
            fn emplace_into(registry: &mut SystemRegistry) {
                $(registry.emplace_one::<$name>();)*
            }

            #[allow(unused_variables)]
            fn erase_from(registry: &mut SystemRegistry) {
                $(registry.erase_one::<$name>();)*
            }
        }
    };
}

impl_system_set!();
impl_system_set!(A);
impl_system_set!(A, B);
impl_system_set!(A, B, C);
impl_system_set!(A, B, C, D);
impl_system_set!(A, B, C, D, E);
impl_system_set!(A, B, C, D, E, F);
impl_system_set!(A, B, C, D, E, F, G);
impl_system_set!(A, B, C, D, E, F, G, H);

struct SystemEntry {
    type_id: TypeId,
    system: Box<dyn System>,
}

/// One instance per system type, kept in registration order.
#[derive(Default)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emplace<S: SystemSet>(&mut self) {
        S::emplace_into(self);
    }

    pub fn erase<S: SystemSet>(&mut self) {
        S::erase_from(self);
    }

    /// Constructs and stores a `T` unless one is already registered.
    pub fn emplace_one<T: System + Default>(&mut self) -> bool {
        if self.contains::<T>() {
            return false;
        }
        let system = T::default();
        tracing::debug!(system = system.name(), "emplaced system");
        self.entries.push(SystemEntry {
            type_id: TypeId::of::<T>(),
            system: Box::new(system),
        });
        true
    }

    pub fn erase_one<T: System>(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.type_id != TypeId::of::<T>());
        self.entries.len() != before
    }

    pub fn contains<T: System>(&self) -> bool {
        self.position::<T>().is_some()
    }

    pub fn system<T: System>(&self) -> Option<&T> {
        self.entries
            .iter()
            .find_map(|entry| entry.system.as_any().downcast_ref::<T>())
    }

    pub fn system_mut<T: System>(&mut self) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find_map(|entry| entry.system.as_any_mut().downcast_mut::<T>())
    }

    pub fn get_dyn_mut(&mut self, type_id: TypeId) -> Option<&mut (dyn System + 'static)> {
        self.entries
            .iter_mut()
            .find(|entry| entry.type_id == type_id)
            .map(|entry| &mut *entry.system)
    }

    /// Adds `S` to the interest of system `T`; `false` if `T` is absent.
    pub fn add_components<T: System, S: ComponentSet>(
        &mut self,
        types: &mut ComponentTypes,
    ) -> bool {
        match self.system_mut::<T>() {
            Some(system) => system.add_components::<S>(types),
            None => false,
        }
    }

    pub fn remove_components<T: System, S: ComponentSet>(
        &mut self,
        types: &ComponentTypes,
    ) -> bool {
        match self.system_mut::<T>() {
            Some(system) => {
                system.remove_components::<S>(types);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Systems in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn System> {
        self.entries.iter().map(|entry| &*entry.system)
    }

    fn position<T: System>(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.type_id == TypeId::of::<T>())
    }
}
