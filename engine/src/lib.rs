//! Scene engine simulation core
//!
//! This crate provides the component store, transform and scene components,
//! and a small rigid body physics world with sphere and box colliders.
//! Rendering and windowing are left to the caller.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod physics;

// Re-export commonly used types
pub mod prelude {
    // Entity system types
    pub use crate::core::entity::{
        closest_point_lights, Capabilities, Component, ComponentStore, EntityId, LightData,
        MeshId, PointLight, Render, Shared, StartContext, Transform,
    };

    // Math types
    pub use glam::{Mat4, Quat, Vec3};

    // Config types
    pub use crate::config::{EngineConfig, PhysicsConfig};

    // App types
    pub use crate::app::{Engine, FrameReport};

    // Error types
    pub use crate::error::{EngineError, Result};

    // Physics types
    pub use crate::physics::{
        Body, Collider, ColliderShape, CollisionEvent, CollisionStats, ContactRole,
        PhysicsWorld, ResolutionMode,
    };
}

/// Initialize logging for the engine
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging, using `default_filter` when `RUST_LOG` is unset.
///
/// Calling this more than once is harmless; only the first subscriber wins.
pub fn init_logging_with_default(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
