//! Entity Component System (ECS) implementation
//!
//! Entities are plain ids, components live in one dense store per type,
//! and signatures record which types each entity carries.

pub mod component;
pub mod entity;
pub mod registry;
pub mod set;
pub mod signature;
pub mod system;
pub mod world;

pub use component::{Component, ComponentStorage, ComponentStore};
pub use entity::{EntityId, EntityRegistry};
pub use registry::ComponentRegistry;
pub use set::{ComponentBundle, ComponentSet};
pub use signature::{ComponentType, ComponentTypes, Signature};
pub use system::{System, SystemExt, SystemRegistry, SystemSet};
pub use world::World;
