//! Physics components: bodies and colliders

use super::collision::{narrow_phase, CollisionRecord, AABB};
use crate::core::entity::components::require_transform;
use crate::core::entity::{Component, EntityId, Shared, StartContext, StopContext, Transform};
use crate::error::{EngineError, Result};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Per-entity dynamics state
#[derive(Debug, Clone)]
pub struct Body {
    /// Owning entity
    pub owner: EntityId,
    mass: f32,
    /// Linear velocity
    pub velocity: Vec3,
    /// Force accumulated since the last step
    pub force: Vec3,
    bounciness: f32,
    is_static: bool,
    /// Heuristic spin derived from the last bounce
    pub rotation_speed: Vec3,
    transform: Option<Shared<Transform>>,
    collider: Weak<RefCell<Collider>>,
}

impl Body {
    /// Create a dynamic body. Mass must be finite and strictly positive.
    pub fn new(owner: EntityId, mass: f32) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(EngineError::InvalidMass { mass });
        }

        Ok(Self {
            owner,
            mass,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            bounciness: 1.0,
            is_static: false,
            rotation_speed: Vec3::ZERO,
            transform: None,
            collider: Weak::new(),
        })
    }

    /// Set the bounciness, which must lie in `[0, 1]`
    pub fn with_bounciness(mut self, bounciness: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&bounciness) {
            return Err(EngineError::InvalidBounciness { value: bounciness });
        }
        self.bounciness = bounciness;
        Ok(self)
    }

    /// Mark the body as static. Static bodies are never integrated or
    /// corrected, and the flag cannot be changed once the body is live.
    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Accumulate a force for the next step
    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Transform resolved at start
    pub fn transform(&self) -> Option<&Shared<Transform>> {
        self.transform.as_ref()
    }

    /// Collider attached once the collider has started, until it is removed
    pub fn collider(&self) -> Option<Shared<Collider>> {
        self.collider.upgrade()
    }

    /// Current world position, once started
    pub fn position(&self) -> Option<Vec3> {
        self.transform.as_ref().map(|t| t.borrow().position)
    }

    /// Move the body's transform by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        if let Some(transform) = &self.transform {
            transform.borrow_mut().position += offset;
        }
    }

    pub(crate) fn attach_collider(&mut self, collider: &Shared<Collider>) {
        self.collider = Rc::downgrade(collider);
    }

    fn detach_collider(&mut self, collider: &Shared<Collider>) {
        if self.collider.ptr_eq(&Rc::downgrade(collider)) {
            self.collider = Weak::new();
        }
    }
}

impl Component for Body {
    fn owner(&self) -> EntityId {
        self.owner
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) -> Result<()> {
        self.transform = Some(require_transform(ctx, self.owner, "Body")?);
        if let Some(this) = ctx.this::<Body>() {
            ctx.register_body(this);
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut StopContext) {
        if let Some(this) = ctx.this::<Body>() {
            ctx.unregister_body(this);
        }
    }
}

/// Geometry of a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl ColliderShape {
    fn validate(&self) -> Result<()> {
        match *self {
            ColliderShape::Sphere { radius } if !radius.is_finite() || radius < 0.0 => Err(
                EngineError::InvalidShape(format!("sphere radius must be >= 0, got {radius}")),
            ),
            ColliderShape::Box { half_extents }
                if !half_extents.is_finite() || half_extents.min_element() < 0.0 =>
            {
                Err(EngineError::InvalidShape(format!(
                    "box half-extents must be >= 0, got {half_extents}"
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn is_sphere(&self) -> bool {
        matches!(self, ColliderShape::Sphere { .. })
    }
}

/// Which side of a contact a collider was on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRole {
    /// The collider that ran the check
    Initiator,
    /// The collider it was checked against
    Receiver,
}

/// Notification delivered to a collider for every contact it takes part in
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// Owner of the other collider
    pub other: EntityId,
    /// Contact normal as stored in the record
    pub normal: Vec3,
    pub penetration: f32,
    pub role: ContactRole,
    /// Whether a correction was applied to this collider's body
    pub resolved: bool,
}

/// Everything narrow phase needs to know about one collider, captured at
/// the moment of the check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderState {
    pub owner: EntityId,
    pub shape: ColliderShape,
    pub position: Vec3,
    pub rotation: Quat,
    pub bounciness: f32,
    pub is_trigger: bool,
}

impl ColliderState {
    /// Dispatch on the other collider's shape, then on our own
    pub fn check_collision(&self, other: &ColliderState) -> Option<CollisionRecord> {
        match other.shape {
            ColliderShape::Sphere { radius } => self.check_sphere(other, radius),
            ColliderShape::Box { half_extents } => self.check_box(other, half_extents),
        }
    }

    fn check_sphere(&self, sphere: &ColliderState, radius: f32) -> Option<CollisionRecord> {
        match self.shape {
            ColliderShape::Sphere { radius: own } => {
                narrow_phase::sphere_sphere(self, own, sphere, radius)
            }
            ColliderShape::Box { half_extents } => {
                narrow_phase::box_sphere(self, half_extents, sphere, radius)
            }
        }
    }

    fn check_box(&self, cuboid: &ColliderState, half_extents: Vec3) -> Option<CollisionRecord> {
        match self.shape {
            // Box-sphere is the only routine; swap so the sphere stays in slot one
            ColliderShape::Sphere { radius } => {
                narrow_phase::box_sphere(cuboid, half_extents, self, radius).map(|r| r.swapped())
            }
            ColliderShape::Box { half_extents: own } => {
                narrow_phase::box_box(self, own, cuboid, half_extents)
            }
        }
    }
}

/// Collision geometry attached to an entity that also owns a [`Body`]
#[derive(Debug, Clone)]
pub struct Collider {
    /// Owning entity
    pub owner: EntityId,
    pub shape: ColliderShape,
    /// Triggers report contacts but are never resolved
    pub is_trigger: bool,
    body: Weak<RefCell<Body>>,
    transform: Option<Shared<Transform>>,
    events: Vec<CollisionEvent>,
}

impl Collider {
    fn with_shape(owner: EntityId, shape: ColliderShape) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            owner,
            shape,
            is_trigger: false,
            body: Weak::new(),
            transform: None,
            events: Vec::new(),
        })
    }

    /// Create a sphere collider
    pub fn sphere(owner: EntityId, radius: f32) -> Result<Self> {
        Self::with_shape(owner, ColliderShape::Sphere { radius })
    }

    /// Create a box collider from half-extents
    pub fn cuboid(owner: EntityId, half_extents: Vec3) -> Result<Self> {
        Self::with_shape(owner, ColliderShape::Box { half_extents })
    }

    /// Create a box collider from its full size
    pub fn from_box_size(owner: EntityId, size: Vec3) -> Result<Self> {
        Self::cuboid(owner, size * 0.5)
    }

    /// Make this collider a trigger
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Body this collider belongs to, while it is alive
    pub fn body(&self) -> Option<Shared<Body>> {
        self.body.upgrade()
    }

    /// World-space bounds. Rotation is ignored.
    pub fn bounds(&self) -> Option<AABB> {
        let position = self.transform.as_ref()?.borrow().position;
        let half_extents = match self.shape {
            ColliderShape::Sphere { radius } => Vec3::splat(radius),
            ColliderShape::Box { half_extents } => half_extents,
        };
        Some(AABB::from_center_half_extents(position, half_extents))
    }

    /// Capture the current pose and material. `None` until started or once
    /// the body has been dropped.
    pub fn snapshot(&self) -> Option<ColliderState> {
        let transform = self.transform.as_ref()?.borrow();
        let body = self.body.upgrade()?;
        let bounciness = body.try_borrow().ok()?.bounciness();

        Some(ColliderState {
            owner: self.owner,
            shape: self.shape,
            position: transform.position,
            rotation: transform.rotation,
            bounciness,
            is_trigger: self.is_trigger,
        })
    }

    /// Narrow-phase test against another collider
    pub fn check_collision(&self, other: &Collider) -> Option<CollisionRecord> {
        self.snapshot()?.check_collision(&other.snapshot()?)
    }

    /// Notifications received since the last drain
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn notify(&mut self, event: CollisionEvent) {
        self.events.push(event);
    }
}

impl Component for Collider {
    fn owner(&self) -> EntityId {
        self.owner
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) -> Result<()> {
        let body = ctx
            .find::<Body>(self.owner)
            .ok_or(EngineError::MissingDependency {
                owner: self.owner,
                component: "Collider",
                requires: "Body",
            })?;
        self.transform = Some(require_transform(ctx, self.owner, "Collider")?);

        if let Some(this) = ctx.this::<Collider>() {
            body.borrow_mut().attach_collider(&this);
        }
        self.body = Rc::downgrade(&body);
        Ok(())
    }

    fn stop(&mut self, ctx: &mut StopContext) {
        let (Some(body), Some(this)) = (self.body.upgrade(), ctx.this::<Collider>()) else {
            return;
        };
        if let Ok(mut body) = body.try_borrow_mut() {
            body.detach_collider(&this);
        }
        self.body = Weak::new();
    }
}
