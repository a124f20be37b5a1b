//! Collision detection subsystem

pub mod narrow_phase;

use crate::core::entity::EntityId;
use glam::Vec3;

/// Contact angle used for the velocity reflection, in degrees
pub const CONTACT_ANGLE_DEGREES: f32 = 180.0;

/// Which side of the record the contact normal points toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalFacing {
    /// Normal points from `two` toward `one`
    TowardOne,
    /// Normal points from `one` toward `two`
    TowardTwo,
}

impl NormalFacing {
    fn flipped(self) -> Self {
        match self {
            NormalFacing::TowardOne => NormalFacing::TowardTwo,
            NormalFacing::TowardTwo => NormalFacing::TowardOne,
        }
    }
}

/// One detected contact between two colliders.
///
/// Lives for a single detection/resolution cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRecord {
    /// Owner of the first collider
    pub one: EntityId,
    /// Owner of the second collider
    pub two: EntityId,
    /// Unit contact normal, or zero when the geometry gives no direction
    pub normal: Vec3,
    /// Which collider `normal` points toward
    pub facing: NormalFacing,
    /// Overlap depth along the normal (zero for box-box contacts)
    pub penetration: f32,
    /// Product of both bodies' bounciness
    pub restitution: f32,
    /// Contact angle in degrees
    pub angle: f32,
    /// Either collider is a trigger
    pub trigger: bool,
}

impl CollisionRecord {
    /// Exchange the `one` and `two` slots.
    ///
    /// The normal vector is left untouched; only the bookkeeping of which
    /// side it faces changes with the slots.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.one, &mut self.two);
        self.facing = self.facing.flipped();
    }

    /// Consuming variant of [`CollisionRecord::swap`]
    pub fn swapped(mut self) -> Self {
        self.swap();
        self
    }

    /// Direction that moves `one` out of `two`
    pub fn separation_direction(&self) -> Vec3 {
        match self.facing {
            NormalFacing::TowardOne => self.normal,
            NormalFacing::TowardTwo => -self.normal,
        }
    }

    /// True when no contact normal could be derived (coincident centres,
    /// sphere centre inside a box). Such contacts are reported but never
    /// resolved.
    pub fn is_degenerate(&self) -> bool {
        self.normal.length_squared() < f32::EPSILON
    }

    /// True when at least one side is a trigger collider
    pub fn is_trigger_collision(&self) -> bool {
        self.trigger
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a center point and half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Check if this AABB overlaps with another (touching counts)
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Clamp a point onto the box
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents of the AABB
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(facing: NormalFacing) -> CollisionRecord {
        CollisionRecord {
            one: EntityId::new(),
            two: EntityId::new(),
            normal: Vec3::X,
            facing,
            penetration: 0.25,
            restitution: 1.0,
            angle: CONTACT_ANGLE_DEGREES,
            trigger: false,
        }
    }

    #[test]
    fn test_aabb_overlap() {
        let aabb1 = AABB::new(Vec3::ZERO, Vec3::ONE);
        let aabb2 = AABB::new(Vec3::splat(0.5), Vec3::splat(1.5));
        let aabb3 = AABB::new(Vec3::splat(2.0), Vec3::splat(3.0));

        assert!(aabb1.overlaps(&aabb2));
        assert!(aabb2.overlaps(&aabb1));
        assert!(!aabb1.overlaps(&aabb3));
        assert!(!aabb3.overlaps(&aabb1));
    }

    #[test]
    fn test_aabb_closest_point() {
        let aabb = AABB::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.closest_point(Vec3::new(3.0, 0.5, -4.0)), Vec3::new(1.0, 0.5, -1.0));
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert_eq!(aabb.half_extents(), Vec3::ONE);
    }

    #[test]
    fn test_swap_exchanges_slots_and_keeps_normal() {
        let original = record(NormalFacing::TowardOne);
        let swapped = original.clone().swapped();

        assert_eq!(swapped.one, original.two);
        assert_eq!(swapped.two, original.one);
        assert_eq!(swapped.normal, original.normal);
        assert_eq!(swapped.facing, NormalFacing::TowardTwo);
        assert_eq!(swapped.separation_direction(), -original.separation_direction());
    }

    #[test]
    fn test_degenerate_normal() {
        let mut contact = record(NormalFacing::TowardOne);
        assert!(!contact.is_degenerate());
        contact.normal = Vec3::ZERO;
        assert!(contact.is_degenerate());
    }
}
