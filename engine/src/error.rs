//! Error types shared by the component store, physics and configuration

use crate::core::entity::EntityId;
use thiserror::Error;

/// Errors produced by the simulation core
#[derive(Debug, Error)]
pub enum EngineError {
    /// A body was constructed with a mass that integration cannot divide by
    #[error("invalid mass {mass}: must be finite and greater than zero")]
    InvalidMass { mass: f32 },

    /// Bounciness outside of [0, 1]
    #[error("invalid bounciness {value}: must be within [0, 1]")]
    InvalidBounciness { value: f32 },

    /// Collider shape with negative or non-finite dimensions
    #[error("invalid collider shape: {0}")]
    InvalidShape(String),

    /// A component could not resolve a sibling component it requires
    #[error("{component} on entity {owner} requires a {requires} component")]
    MissingDependency {
        owner: EntityId,
        component: &'static str,
        requires: &'static str,
    },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while parsing configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EngineError>;
