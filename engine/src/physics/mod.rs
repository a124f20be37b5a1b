//! Lightweight rigid body physics
//!
//! Bodies are integrated with semi-implicit Euler under a global gravity,
//! then an all-pairs sweep detects sphere and box contacts and bounces the
//! spheres out of them.

pub mod collision;
pub mod components;
pub mod solver;
pub mod world;

pub use collision::{CollisionRecord, NormalFacing, AABB};
pub use components::{
    Body, Collider, ColliderShape, ColliderState, CollisionEvent, ContactRole,
};
pub use world::{CollisionStats, PhysicsWorld, ResolutionMode};
