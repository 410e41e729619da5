use std::any::Any;
use std::collections::BTreeSet;

use crate::components::{Position, Velocity};
use crate::ecs::{ComponentRegistry, EntityId, Signature, System};

/// Integrates `Position` by `Velocity` over a fixed step.
pub struct MovementSystem {
    signature: Signature,
    dt: f32,
}

impl MovementSystem {
    pub fn new() -> Self {
        Self {
            signature: Signature::empty(),
            dt: 1.0 / 60.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.dt = dt;
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn signature_mut(&mut self) -> &mut Signature {
        &mut self.signature
    }

    fn update(&mut self, components: &mut ComponentRegistry, entities: &BTreeSet<EntityId>) {
        for &id in entities {
            let Some(velocity) = components.retrieve::<Velocity>(id) else {
                continue;
            };
            if let Some(position) = components.get_mut::<Position>(id) {
                position.x += velocity.dx * self.dt;
                position.y += velocity.dy * self.dt;
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
