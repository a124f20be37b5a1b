//! Configuration types for the engine

use crate::error::{EngineError, Result};
use crate::physics::ResolutionMode;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Global simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Constant acceleration applied to every dynamic body
    pub gravity: Vec3,
    /// Multiplier applied to the frame delta before update and step
    pub time_scale: f32,
    /// Which side of a contact gets corrected
    pub resolution: ResolutionMode,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -1.0, 0.0),
            time_scale: 1.0,
            resolution: ResolutionMode::default(),
        }
    }
}

impl PhysicsConfig {
    /// Reject values the integrator cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "time_scale must be finite and >= 0, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    /// Overrides the default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading engine config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.physics.validate()
    }
}
