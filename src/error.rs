//! Error taxonomy for the checked `World` helpers.
//!
//! The registries themselves never return these: they degrade to a no-op
//! plus a query (`valid`, `registered`, `count`) that tells the caller why.

use thiserror::Error;

use crate::ecs::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("entity {0} is not live")]
    InvalidEntity(EntityId),

    #[error("component type `{0}` has no registered store")]
    UnregisteredComponent(&'static str),

    #[error("entity capacity exhausted ({max} live entities)")]
    EntityCapacity { max: u32 },

    #[error("component type table is full ({max} types); `{name}` has no signature bit")]
    ComponentCapacity { name: &'static str, max: usize },

    #[error("system `{0}` is not registered")]
    UnregisteredSystem(&'static str),
}
