//! Reference frame loop driving a [`World`] with the demo systems.
//!
//! The ECS core never decides when systems run. This loop does: each tick
//! it spawns new entities, runs movement then lifetime, and despawns what
//! expired.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::components::{Lifetime, Position, Velocity};
use crate::config::{ConfigError, EngineConfig};
use crate::ecs::{EntityId, System, World};
use crate::error::EcsError;
use crate::rng::SpawnRng;
use crate::systems::{LifetimeSystem, MovementSystem};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ecs(#[from] EcsError),
}

#[derive(Clone, Debug, Serialize)]
pub struct SystemRunReport {
    pub name: String,
    pub entities: usize,
    pub duration_ms: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub spawned: u32,
    pub despawned: u32,
    pub live_entities: u32,
    pub system_reports: Vec<SystemRunReport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub ticks: u64,
    pub spawned: u64,
    pub despawned: u64,
    pub live_entities: u32,
    pub entity_capacity: u32,
    pub component_types: usize,
}

pub struct Engine {
    world: World,
    rng: SpawnRng,
    config: EngineConfig,
    tick: u64,
    spawned: u64,
    despawned: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut world = World::new(&config.ecs);
        world.add_systems::<(MovementSystem, LifetimeSystem)>();
        world.watch::<MovementSystem, (Position, Velocity)>()?;
        world.watch::<LifetimeSystem, (Lifetime,)>()?;
        if let Some(movement) = world.system_mut::<MovementSystem>() {
            movement.set_dt(config.dt);
        }

        let mut engine = Self {
            world,
            rng: SpawnRng::new(config.random_seed),
            config,
            tick: 0,
            spawned: 0,
            despawned: 0,
        };
        let initial = engine.config.spawn.initial;
        let created = engine.spawn_batch(initial)?;
        tracing::info!(
            run = %engine.config.name,
            requested = initial,
            created,
            "initial population spawned"
        );
        Ok(engine)
    }

    pub fn tick(&mut self) -> Result<TickSummary, EngineError> {
        self.tick += 1;
        let span = tracing::info_span!("tick", tick = self.tick);
        let _guard = span.enter();

        let spawned = self.spawn_batch(self.config.spawn.per_tick)?;
        let system_reports = vec![
            self.run_timed::<MovementSystem>(),
            self.run_timed::<LifetimeSystem>(),
        ];

        let expired = self
            .world
            .system_mut::<LifetimeSystem>()
            .map(LifetimeSystem::take_expired)
            .unwrap_or_default();
        let despawned = expired
            .into_iter()
            .filter(|id| self.world.despawn(*id))
            .count() as u32;
        self.despawned += u64::from(despawned);

        let summary = TickSummary {
            tick: self.tick,
            spawned,
            despawned,
            live_entities: self.world.entity_count(),
            system_reports,
        };
        tracing::debug!(
            spawned,
            despawned,
            live = summary.live_entities,
            "tick complete"
        );
        Ok(summary)
    }

    pub fn run(&mut self, ticks: u64) -> Result<RunSummary, EngineError> {
        self.run_with_hook(ticks, |_| {})
    }

    pub fn run_with_hook<F>(
        &mut self,
        ticks: u64,
        mut hook: F,
    ) -> Result<RunSummary, EngineError>
    where
        F: FnMut(&TickSummary),
    {
        for _ in 0..ticks {
            let summary = self.tick()?;
            hook(&summary);
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            name: self.config.name.clone(),
            ticks: self.tick,
            spawned: self.spawned,
            despawned: self.despawned,
            live_entities: self.world.entity_count(),
            entity_capacity: self.world.entities().capacity(),
            component_types: self.world.types().len(),
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spawns up to `count` entities; stops early at the entity cap.
    fn spawn_batch(&mut self, count: u32) -> Result<u32, EngineError> {
        let mut created = 0;
        for _ in 0..count {
            let Some(id) = self.world.spawn() else {
                break;
            };
            self.populate(id)?;
            created += 1;
        }
        self.spawned += u64::from(created);
        Ok(created)
    }

    fn populate(&mut self, id: EntityId) -> Result<(), EngineError> {
        let position = self.rng.position();
        let velocity = self.rng.velocity(self.config.spawn.max_speed);
        let lifetime = self.rng.lifetime(&self.config.spawn);
        self.world.insert(id, (position, velocity, lifetime))?;
        Ok(())
    }

    fn run_timed<T: System>(&mut self) -> SystemRunReport {
        let start = Instant::now();
        let entities = self.world.run_system::<T>().unwrap_or(0);
        let elapsed = start.elapsed();
        let name = self
            .world
            .systems()
            .system::<T>()
            .map(|system| system.name().to_string())
            .unwrap_or_else(|| std::any::type_name::<T>().to_string());
        SystemRunReport {
            name,
            entities,
            duration_ms: elapsed.as_secs_f64() * 1_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EcsConfig, SpawnConfig};

    fn small_config() -> EngineConfig {
        EngineConfig {
            name: "unit".into(),
            random_seed: 11,
            ticks: 10,
            dt: 0.5,
            spawn: SpawnConfig {
                initial: 8,
                per_tick: 2,
                max_speed: 1.0,
                lifetime_min: 3,
                lifetime_max: 3,
            },
            ecs: EcsConfig {
                max_entities: 64,
                entity_delta: 16,
                max_components: 8,
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_initial_population() {
        let engine = Engine::new(small_config()).unwrap();
        assert_eq!(engine.world().entity_count(), 8);
        assert_eq!(engine.summary().component_types, 3);
    }

    #[test]
    fn test_entities_expire_after_lifetime() {
        let mut engine = Engine::new(small_config()).unwrap();

        let first = engine.tick().unwrap();
        assert_eq!(first.spawned, 2);
        assert_eq!(first.despawned, 0);
        assert_eq!(first.live_entities, 10);
        assert_eq!(first.system_reports[0].name, "movement");
        assert_eq!(first.system_reports[0].entities, 10);

        engine.tick().unwrap();
        let third = engine.tick().unwrap();
        assert_eq!(third.despawned, 10);
        assert_eq!(third.live_entities, 4);
    }

    #[test]
    fn test_spawning_stops_at_capacity() {
        let mut config = small_config();
        config.ecs.max_entities = 9;
        config.spawn.lifetime_min = 100;
        config.spawn.lifetime_max = 100;
        let mut engine = Engine::new(config).unwrap();

        let summary = engine.tick().unwrap();
        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.live_entities, 9);
        assert_eq!(engine.tick().unwrap().spawned, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config();
        config.ecs.entity_delta = 0;
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }
}
