//! Narrow phase collision detection
//!
//! Exact tests for each supported shape pair. Every routine returns `None`
//! when the shapes are apart.

use super::{CollisionRecord, NormalFacing, AABB, CONTACT_ANGLE_DEGREES};
use crate::physics::components::ColliderState;
use glam::Vec3;

fn record(
    one: &ColliderState,
    two: &ColliderState,
    normal: Vec3,
    penetration: f32,
) -> CollisionRecord {
    CollisionRecord {
        one: one.owner,
        two: two.owner,
        normal,
        facing: NormalFacing::TowardOne,
        penetration,
        restitution: one.bounciness * two.bounciness,
        angle: CONTACT_ANGLE_DEGREES,
        trigger: one.is_trigger || two.is_trigger,
    }
}

/// Sphere vs sphere. Touching spheres count as colliding.
pub fn sphere_sphere(
    a: &ColliderState,
    radius_a: f32,
    b: &ColliderState,
    radius_b: f32,
) -> Option<CollisionRecord> {
    let delta = a.position - b.position;
    let distance = delta.length();
    let radius_sum = radius_a + radius_b;

    if distance > radius_sum {
        return None;
    }

    Some(record(a, b, delta.normalize_or_zero(), radius_sum - distance))
}

/// Oriented box vs sphere.
///
/// The sphere centre is taken into the box frame, clamped onto the box, and
/// the normal points from the sphere centre toward that closest point,
/// rotated back into world space. The box always lands in slot one.
pub fn box_sphere(
    cuboid: &ColliderState,
    half_extents: Vec3,
    sphere: &ColliderState,
    radius: f32,
) -> Option<CollisionRecord> {
    let local_center =
        cuboid.rotation.inverse() * (sphere.position - cuboid.position) + cuboid.position;
    let aabb = AABB::from_center_half_extents(cuboid.position, half_extents);
    let closest = aabb.closest_point(local_center);

    let offset = closest - local_center;
    let distance = offset.length();
    if distance >= radius {
        return None;
    }

    let normal = (cuboid.rotation * offset).normalize_or_zero();
    Some(record(cuboid, sphere, normal, radius - distance))
}

/// Box vs box, as axis-aligned bounds. Rotation is ignored and no depth is
/// computed; the contact only reports the overlap.
pub fn box_box(
    a: &ColliderState,
    half_extents_a: Vec3,
    b: &ColliderState,
    half_extents_b: Vec3,
) -> Option<CollisionRecord> {
    let bounds_a = AABB::from_center_half_extents(a.position, half_extents_a);
    let bounds_b = AABB::from_center_half_extents(b.position, half_extents_b);

    if !bounds_a.overlaps(&bounds_b) {
        return None;
    }

    Some(record(a, b, (a.position - b.position).normalize_or_zero(), 0.0))
}
