mod lifetime;
mod movement;

pub use lifetime::LifetimeSystem;
pub use movement::MovementSystem;
