//! Frame orchestration for the engine
//!
//! [`Engine`] owns the component store and the physics world and drives
//! them in a fixed order once per frame. Windowing and rendering live
//! outside this crate and consume the [`FrameReport`] plus the store's
//! render views.

use crate::config::EngineConfig;
use crate::core::entity::{Component, ComponentStore, EntityId, Shared, StartFailure};
use crate::physics::{CollisionStats, PhysicsWorld};
use tracing::{debug, info, trace, warn};

/// What happened during one frame
#[derive(Debug)]
pub struct FrameReport {
    /// Zero-based frame counter
    pub frame: u64,
    /// Delta after time scaling, as seen by update and step
    pub dt: f32,
    /// Entities whose construction was aborted this frame
    pub start_failures: Vec<StartFailure>,
    pub collisions: CollisionStats,
}

/// Simulation core: component store plus physics world
pub struct Engine {
    /// All components of the scene
    pub store: ComponentStore,
    /// Body registry and collision sweep
    pub physics: PhysicsWorld,
    config: EngineConfig,
    frame: u64,
}

impl Engine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        info!("Creating engine");
        Self {
            store: ComponentStore::new(),
            physics: PhysicsWorld::from_config(&config.physics),
            config,
            frame: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Add a component. It starts at the beginning of the next frame.
    pub fn add<T: Component>(&mut self, component: T) -> Shared<T> {
        self.store.add(component)
    }

    /// Remove every component of an entity
    pub fn destroy(&mut self, owner: EntityId) -> usize {
        let removed = self.store.remove(owner, &mut self.physics);
        if removed == 0 {
            warn!(owner = %owner, "Destroy requested for unknown entity");
        } else {
            debug!(owner = %owner, removed, "Entity destroyed");
        }
        removed
    }

    /// Run one frame: pending starts, update, physics step, collision sweep
    pub fn frame(&mut self, delta: f32) -> FrameReport {
        let dt = delta * self.physics.time_scale();

        let start_failures = self.store.run_starts(&mut self.physics);
        self.store.update(dt);
        self.physics.step(dt);
        let collisions = self.physics.collision_handling();

        let report = FrameReport {
            frame: self.frame,
            dt,
            start_failures,
            collisions,
        };
        trace!(
            frame = report.frame,
            dt,
            contacts = collisions.contacts,
            failures = report.start_failures.len(),
            "Frame finished"
        );

        self.frame += 1;
        report
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
