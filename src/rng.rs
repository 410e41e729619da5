use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Lifetime, Position, Velocity};
use crate::config::SpawnConfig;

/// Half-width of the square spawn area.
const SPAWN_EXTENT: f32 = 100.0;

/// Seeded source for the initial state of spawned entities.
pub struct SpawnRng {
    inner: ChaCha8Rng,
}

impl SpawnRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn position(&mut self) -> Position {
        Position::new(
            self.inner.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
            self.inner.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
        )
    }

    pub fn velocity(&mut self, max_speed: f32) -> Velocity {
        if max_speed <= 0.0 {
            return Velocity::default();
        }
        Velocity::new(
            self.inner.gen_range(-max_speed..=max_speed),
            self.inner.gen_range(-max_speed..=max_speed),
        )
    }

    pub fn lifetime(&mut self, spawn: &SpawnConfig) -> Lifetime {
        Lifetime::new(self.inner.gen_range(spawn.lifetime_min..=spawn.lifetime_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let mut a = SpawnRng::new(42);
        let mut b = SpawnRng::new(42);

        assert_eq!(a.position(), b.position());
        assert_eq!(a.velocity(3.0), b.velocity(3.0));
    }

    #[test]
    fn test_values_stay_in_range() {
        let spawn = SpawnConfig {
            lifetime_min: 5,
            lifetime_max: 9,
            ..SpawnConfig::default()
        };
        let mut rng = SpawnRng::new(1);
        for _ in 0..100 {
            let position = rng.position();
            assert!(position.x.abs() <= SPAWN_EXTENT && position.y.abs() <= SPAWN_EXTENT);
            let velocity = rng.velocity(0.5);
            assert!(velocity.dx.abs() <= 0.5 && velocity.dy.abs() <= 0.5);
            let lifetime = rng.lifetime(&spawn);
            assert!((5..=9).contains(&lifetime.remaining));
        }
        assert_eq!(rng.velocity(0.0), Velocity::default());
    }
}
