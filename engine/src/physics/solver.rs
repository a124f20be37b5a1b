//! Collision response
//!
//! Corrects a single body for a single contact. The record must have the
//! corrected body in slot `one`.

use super::collision::CollisionRecord;
use super::components::{Body, ColliderShape};
use glam::{Quat, Vec3};
use tracing::debug;

/// Scale applied to the post-bounce velocity to derive a spin
const SPIN_FACTOR: f32 = 100.0;

/// Resolve `record` for `body`, whose collider has `shape`.
///
/// Returns whether a correction was applied. Static bodies, box colliders
/// and contacts without a usable normal are left alone.
pub fn resolve(body: &mut Body, shape: &ColliderShape, record: &CollisionRecord) -> bool {
    if !is_correctable(body, shape) {
        return false;
    }

    if record.is_degenerate() {
        debug!(
            one = %record.one,
            two = %record.two,
            "Skipping contact without a usable normal"
        );
        return false;
    }

    body.translate(record.separation_direction() * record.penetration);
    body.velocity = reflect(body.velocity, record);
    body.rotation_speed = spin_from_velocity(body.velocity);

    true
}

/// Whether `resolve` would ever move this body
pub fn is_correctable(body: &Body, shape: &ColliderShape) -> bool {
    !body.is_static() && shape.is_sphere()
}

/// Rotate the velocity by the contact angle about the normal, then scale by
/// the negated restitution
fn reflect(velocity: Vec3, record: &CollisionRecord) -> Vec3 {
    let rotation = Quat::from_axis_angle(record.normal, record.angle.to_radians());
    (rotation * velocity) * -record.restitution
}

fn spin_from_velocity(velocity: Vec3) -> Vec3 {
    Vec3::new(velocity.z * SPIN_FACTOR, 0.0, -velocity.x * SPIN_FACTOR)
}
