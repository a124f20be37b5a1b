//! Entity-component functionality
//!
//! Entities are bare ids; the [`ComponentStore`] owns every component and
//! drives their deferred start and per-frame update.

pub mod component;
pub mod components;
mod id;
pub mod store;

// Re-export commonly used types
pub use component::{Capabilities, Component, Shared, StartContext, StopContext};
pub use components::{closest_point_lights, LightData, MeshId, PointLight, Render, Transform};
pub use id::EntityId;
pub use store::{ComponentEntry, ComponentStore, StartFailure};
