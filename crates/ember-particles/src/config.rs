//! Particle system configuration loaded from TOML

use std::path::Path;

use ember_core::{EmberError, Result};
use serde::{Deserialize, Serialize};

use crate::pool::DEFAULT_BLOCK_SIZE;

/// Tuning for a [`ParticleSystem`](crate::ParticleSystem) and the players it creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "default_scale")]
    pub emission_rate_scale: f32,
    #[serde(default = "default_scale")]
    pub size_scale: f32,
    #[serde(default = "default_scale")]
    pub force_scale: f32,
    #[serde(default = "default_scale")]
    pub time_scale: f32,
    #[serde(default = "default_block_size")]
    pub pool_block_size: usize,
    /// Upper bound on live particles; unbounded when absent
    #[serde(default)]
    pub pool_max_records: Option<usize>,
    #[serde(default = "default_fixed_timestep_hz")]
    pub fixed_timestep_hz: f64,
    #[serde(default)]
    pub particle_interpolation: bool,
    /// Players farther than this from every camera stop simulating; zero disables
    #[serde(default)]
    pub camera_idle_distance: f32,
    /// Fixed seed for replayable variation; entropy-seeded when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_scale() -> f32 {
    1.0
}
fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}
fn default_fixed_timestep_hz() -> f64 {
    60.0
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            emission_rate_scale: default_scale(),
            size_scale: default_scale(),
            force_scale: default_scale(),
            time_scale: default_scale(),
            pool_block_size: default_block_size(),
            pool_max_records: None,
            fixed_timestep_hz: default_fixed_timestep_hz(),
            particle_interpolation: false,
            camera_idle_distance: 0.0,
            rng_seed: None,
        }
    }
}

impl ParticleConfig {
    /// Parse and validate a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ParticleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            EmberError::TomlParseError(msg) => {
                EmberError::TomlParseError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let scales = [
            ("emission_rate_scale", self.emission_rate_scale),
            ("size_scale", self.size_scale),
            ("force_scale", self.force_scale),
            ("time_scale", self.time_scale),
        ];
        for (name, value) in scales {
            if !value.is_finite() || value < 0.0 {
                return Err(EmberError::ConfigError(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.pool_block_size == 0 {
            return Err(EmberError::ConfigError(
                "pool_block_size must be at least 1".to_string(),
            ));
        }
        if self.pool_max_records == Some(0) {
            return Err(EmberError::ConfigError(
                "pool_max_records must be at least 1 when set".to_string(),
            ));
        }
        if !(self.fixed_timestep_hz > 0.0) {
            return Err(EmberError::ConfigError(format!(
                "fixed_timestep_hz must be positive, got {}",
                self.fixed_timestep_hz
            )));
        }
        if !self.camera_idle_distance.is_finite() || self.camera_idle_distance < 0.0 {
            return Err(EmberError::ConfigError(format!(
                "camera_idle_distance must be a non-negative number, got {}",
                self.camera_idle_distance
            )));
        }
        Ok(())
    }
}
