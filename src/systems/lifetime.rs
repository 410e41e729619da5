use std::any::Any;
use std::collections::BTreeSet;

use crate::components::Lifetime;
use crate::ecs::{ComponentRegistry, EntityId, Signature, System};

/// Counts `Lifetime` down by one tick and records the entities that ran out.
///
/// Systems only see component data, so despawning is left to the frame
/// loop via [`LifetimeSystem::take_expired`].
#[derive(Default)]
pub struct LifetimeSystem {
    signature: Signature,
    expired: Vec<EntityId>,
}

impl LifetimeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expired(&self) -> &[EntityId] {
        &self.expired
    }

    pub fn take_expired(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.expired)
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        "lifetime"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn signature_mut(&mut self) -> &mut Signature {
        &mut self.signature
    }

    fn update(&mut self, components: &mut ComponentRegistry, entities: &BTreeSet<EntityId>) {
        for &id in entities {
            let Some(lifetime) = components.get_mut::<Lifetime>(id) else {
                continue;
            };
            lifetime.remaining = lifetime.remaining.saturating_sub(1);
            if lifetime.remaining == 0 {
                self.expired.push(id);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_and_expires() {
        let mut components = ComponentRegistry::new();
        components.register::<Lifetime>();
        components.update(0, Lifetime::new(1));
        components.update(1, Lifetime::new(3));

        let mut system = LifetimeSystem::new();
        let ids: BTreeSet<EntityId> = [0, 1].into_iter().collect();
        system.update(&mut components, &ids);

        assert_eq!(system.expired(), &[0]);
        assert_eq!(components.retrieve::<Lifetime>(1), Some(Lifetime::new(2)));

        assert_eq!(system.take_expired(), vec![0]);
        assert!(system.expired().is_empty());
    }
}
