pub mod components;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod rng;
pub mod systems;

pub use config::{EcsConfig, EngineConfig};
pub use ecs::{
    Component, ComponentRegistry, ComponentTypes, EntityId, EntityRegistry, Signature, System,
    SystemRegistry, World,
};
pub use engine::{Engine, RunSummary, TickSummary};
pub use error::EcsError;
