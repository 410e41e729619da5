//! Configuration for the ECS core and the reference frame loop.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::Signature;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Capacity limits of one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Hard cap on simultaneously live entities.
    pub max_entities: u32,
    /// Growth step of the entity id block.
    pub entity_delta: u32,
    /// Hard cap on distinct component types (signature width).
    pub max_components: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: 10_000,
            entity_delta: 100,
            max_components: 64,
        }
    }
}

impl EcsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entities == 0 {
            return Err(ConfigError::Validation(
                "max_entities must be greater than zero".into(),
            ));
        }
        if self.entity_delta == 0 {
            return Err(ConfigError::Validation(
                "entity_delta must be greater than zero".into(),
            ));
        }
        if self.max_components == 0 || self.max_components > Signature::BITS {
            return Err(ConfigError::Validation(format!(
                "max_components must be between 1 and {}, got {}",
                Signature::BITS,
                self.max_components
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Entities created before the first tick.
    pub initial: u32,
    /// Entities created at the start of every tick.
    pub per_tick: u32,
    /// Maximum speed along each axis, in units per second.
    pub max_speed: f32,
    pub lifetime_min: u32,
    pub lifetime_max: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            initial: 256,
            per_tick: 4,
            max_speed: 2.0,
            lifetime_min: 30,
            lifetime_max: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration for a run of the reference frame loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    pub random_seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Seconds simulated per tick.
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default)]
    pub ecs: EcsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_ticks() -> u64 {
    120
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "drift".to_string(),
            random_seed: 7,
            ticks: default_ticks(),
            dt: default_dt(),
            spawn: SpawnConfig::default(),
            ecs: EcsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ecs.validate()?;
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::Validation(format!(
                "dt must be a positive number of seconds, got {}",
                self.dt
            )));
        }
        if self.spawn.lifetime_min == 0 || self.spawn.lifetime_min > self.spawn.lifetime_max {
            return Err(ConfigError::Validation(format!(
                "lifetime range {}..={} is empty or starts at zero",
                self.spawn.lifetime_min, self.spawn.lifetime_max
            )));
        }
        if !(self.spawn.max_speed.is_finite() && self.spawn.max_speed >= 0.0) {
            return Err(ConfigError::Validation(
                "max_speed must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}
