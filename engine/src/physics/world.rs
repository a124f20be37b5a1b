//! Physics world: body registry, integration and the collision sweep
//!
//! The world never owns bodies. It keeps non-owning references partitioned
//! into dynamic and static lists; a body whose owner has been destroyed
//! simply drops out on the next step or sweep.

use super::components::{Body, Collider, CollisionEvent, ContactRole};
use super::collision::CollisionRecord;
use super::solver;
use crate::config::PhysicsConfig;
use crate::core::entity::Shared;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace};

/// Which bodies of a contact get corrected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Only the collider that initiated the check is corrected
    InitiatorOnly,
    /// The receiving collider is corrected as well, from the swapped record
    #[default]
    Both,
}

/// Counters from one collision sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Pairs handed to the narrow phase
    pub pairs_tested: usize,
    /// Pairs that were in contact
    pub contacts: usize,
    /// Body corrections applied
    pub resolved: usize,
}

/// Registry of every live body plus the global simulation parameters
pub struct PhysicsWorld {
    dynamic_bodies: Vec<Weak<RefCell<Body>>>,
    static_bodies: Vec<Weak<RefCell<Body>>>,
    gravity: Vec3,
    time_scale: f32,
    resolution: ResolutionMode,
}

impl PhysicsWorld {
    /// Create a physics world with default settings
    pub fn new() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }

    /// Create a physics world from configuration
    pub fn from_config(config: &PhysicsConfig) -> Self {
        info!(
            gravity = ?config.gravity,
            time_scale = config.time_scale,
            resolution = ?config.resolution,
            "Initializing physics world"
        );

        Self {
            dynamic_bodies: Vec::new(),
            static_bodies: Vec::new(),
            gravity: config.gravity,
            time_scale: config.time_scale,
            resolution: config.resolution,
        }
    }

    /// Register a body. Its static flag decides the list it lives in.
    pub fn add_body(&mut self, body: Shared<Body>) {
        let (owner, is_static) = {
            let body = body.borrow();
            (body.owner, body.is_static())
        };
        debug!(owner = %owner, is_static, "Body registered");

        let list = if is_static {
            &mut self.static_bodies
        } else {
            &mut self.dynamic_bodies
        };
        list.push(Rc::downgrade(&body));
    }

    /// Unregister a body. Returns whether it was registered.
    pub fn remove_body(&mut self, body: &Shared<Body>) -> bool {
        let target = Rc::downgrade(body);
        let before = self.dynamic_bodies.len() + self.static_bodies.len();
        self.dynamic_bodies.retain(|b| !b.ptr_eq(&target));
        self.static_bodies.retain(|b| !b.ptr_eq(&target));

        let removed = before != self.dynamic_bodies.len() + self.static_bodies.len();
        if removed {
            match body.try_borrow() {
                Ok(body) => debug!(owner = %body.owner, "Body unregistered"),
                Err(_) => debug!("Body unregistered"),
            }
        }
        removed
    }

    fn prune(&mut self) {
        let before = self.dynamic_bodies.len() + self.static_bodies.len();
        self.dynamic_bodies.retain(|b| b.strong_count() > 0);
        self.static_bodies.retain(|b| b.strong_count() > 0);

        let pruned = before - (self.dynamic_bodies.len() + self.static_bodies.len());
        if pruned > 0 {
            debug!(pruned, "Dropped bodies of destroyed entities");
        }
    }

    /// Live bodies, dynamic first
    pub fn bodies(&self) -> Vec<Shared<Body>> {
        self.dynamic_bodies
            .iter()
            .chain(self.static_bodies.iter())
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub fn body_count(&self) -> usize {
        self.dynamic_count() + self.static_count()
    }

    pub fn dynamic_count(&self) -> usize {
        self.dynamic_bodies.iter().filter(|b| b.strong_count() > 0).count()
    }

    pub fn static_count(&self) -> usize {
        self.static_bodies.iter().filter(|b| b.strong_count() > 0).count()
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Multiplier the frame loop applies to the delta before stepping
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    pub fn resolution(&self) -> ResolutionMode {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: ResolutionMode) {
        self.resolution = resolution;
    }

    /// Semi-implicit Euler step of every dynamic body. `dt` is used as is;
    /// time scaling happens upstream.
    pub fn step(&mut self, dt: f32) {
        self.prune();

        for body in self.dynamic_bodies.iter().filter_map(Weak::upgrade) {
            let mut body = body.borrow_mut();

            let weight = body.mass() * self.gravity;
            body.apply_force(weight);

            let acceleration = body.force / body.mass();
            body.velocity += acceleration * dt;

            let displacement = body.velocity * dt;
            body.translate(displacement);

            body.force = Vec3::ZERO;
        }
    }

    /// All-pairs collision sweep over bodies that have a collider.
    ///
    /// Every unordered pair is tested once, except pairs of two static
    /// bodies. Each contact is resolved according to the resolution mode and
    /// reported to both colliders.
    pub fn collision_handling(&mut self) -> CollisionStats {
        self.prune();

        let candidates: Vec<(Shared<Body>, Shared<Collider>, bool)> = self
            .bodies()
            .into_iter()
            .filter_map(|body| {
                let (collider, is_static) = {
                    let b = body.borrow();
                    (b.collider()?, b.is_static())
                };
                Some((body, collider, is_static))
            })
            .collect();

        let mut stats = CollisionStats::default();

        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let (body_one, collider_one, static_one) = &candidates[i];
                let (body_two, collider_two, static_two) = &candidates[j];
                if *static_one && *static_two {
                    continue;
                }

                stats.pairs_tested += 1;
                let record = collider_one
                    .borrow()
                    .check_collision(&collider_two.borrow());

                if let Some(record) = record {
                    self.handle_contact(
                        record,
                        (body_one, collider_one),
                        (body_two, collider_two),
                        &mut stats,
                    );
                }
            }
        }

        trace!(
            pairs = stats.pairs_tested,
            contacts = stats.contacts,
            resolved = stats.resolved,
            "Collision sweep finished"
        );
        stats
    }

    fn handle_contact(
        &self,
        record: CollisionRecord,
        (body_one, collider_one): (&Shared<Body>, &Shared<Collider>),
        (body_two, collider_two): (&Shared<Body>, &Shared<Collider>),
        stats: &mut CollisionStats,
    ) {
        stats.contacts += 1;
        trace!(
            one = %record.one,
            two = %record.two,
            penetration = record.penetration,
            trigger = record.is_trigger_collision(),
            "Collision detected"
        );

        let (one_resolved, two_resolved) = if record.is_trigger_collision() {
            (false, false)
        } else {
            let shape_one = collider_one.borrow().shape;
            let shape_two = collider_two.borrow().shape;
            let mut record_one = record.clone();
            let mut record_two = record.clone().swapped();

            let correct_two = self.resolution == ResolutionMode::Both
                && solver::is_correctable(&body_two.borrow(), &shape_two);
            if correct_two && solver::is_correctable(&body_one.borrow(), &shape_one) {
                let share_one = inverse_mass_share(&body_one.borrow(), &body_two.borrow());
                record_one.penetration *= share_one;
                record_two.penetration *= 1.0 - share_one;
            }

            let one_resolved =
                solver::resolve(&mut body_one.borrow_mut(), &shape_one, &record_one);
            let two_resolved = correct_two
                && solver::resolve(&mut body_two.borrow_mut(), &shape_two, &record_two);
            (one_resolved, two_resolved)
        };

        stats.resolved += usize::from(one_resolved) + usize::from(two_resolved);

        collider_one.borrow_mut().notify(CollisionEvent {
            other: record.two,
            normal: record.normal,
            penetration: record.penetration,
            role: ContactRole::Initiator,
            resolved: one_resolved,
        });
        collider_two.borrow_mut().notify(CollisionEvent {
            other: record.one,
            normal: record.normal,
            penetration: record.penetration,
            role: ContactRole::Receiver,
            resolved: two_resolved,
        });
    }
}

/// Fraction of the push-out taken by `one` when both bodies move apart
fn inverse_mass_share(one: &Body, two: &Body) -> f32 {
    let inv_one = 1.0 / one.mass();
    let inv_two = 1.0 / two.mass();
    inv_one / (inv_one + inv_two)
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{ComponentStore, EntityId, Transform};

    struct Scene {
        store: ComponentStore,
        physics: PhysicsWorld,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                store: ComponentStore::new(),
                physics: PhysicsWorld::new(),
            }
        }

        fn spawn(
            &mut self,
            position: Vec3,
            body: Body,
            collider: Option<Collider>,
        ) -> Shared<Body> {
            let owner = body.owner;
            self.store.add(Transform::from_position(owner, position));
            let handle = self.store.add(body);
            if let Some(collider) = collider {
                self.store.add(collider);
            }
            assert!(self.store.run_starts(&mut self.physics).is_empty());
            handle
        }
    }

    #[test]
    fn test_single_step_integration() {
        let mut scene = Scene::new();
        scene.physics.set_gravity(Vec3::new(0.0, -9.81, 0.0));
        let owner = EntityId::new();
        let body = scene.spawn(Vec3::ZERO, Body::new(owner, 2.0).unwrap(), None);

        let dt = 0.1;
        scene.physics.step(dt);

        let body = body.borrow();
        let g = scene.physics.gravity();
        assert!((body.velocity - g * dt).length() < 1e-6);
        assert!((body.position().unwrap() - g * dt * dt).length() < 1e-6);
        assert_eq!(body.force, Vec3::ZERO);
    }

    #[test]
    fn test_applied_force_is_consumed_by_step() {
        let mut scene = Scene::new();
        scene.physics.set_gravity(Vec3::ZERO);
        let owner = EntityId::new();
        let body = scene.spawn(Vec3::ZERO, Body::new(owner, 2.0).unwrap(), None);

        body.borrow_mut().apply_force(Vec3::new(4.0, 0.0, 0.0));
        scene.physics.step(1.0);
        scene.physics.step(1.0);

        // a = F/m = 2 for the first step only
        assert!((body.borrow().velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_static_body_is_immune_to_step() {
        let mut scene = Scene::new();
        let owner = EntityId::new();
        let start = Vec3::new(1.0, 2.0, 3.0);
        let body = scene.spawn(start, Body::new(owner, 1.0).unwrap().static_body(), None);

        for _ in 0..100 {
            scene.physics.step(0.5);
        }

        assert_eq!(body.borrow().position(), Some(start));
        assert_eq!(body.borrow().velocity, Vec3::ZERO);
        assert_eq!(scene.physics.static_count(), 1);
        assert_eq!(scene.physics.dynamic_count(), 0);
    }

    #[test]
    fn test_destroyed_entity_leaves_world() {
        let mut scene = Scene::new();
        let owner = EntityId::new();
        scene.spawn(Vec3::ZERO, Body::new(owner, 1.0).unwrap(), None);
        assert_eq!(scene.physics.body_count(), 1);

        scene.store.remove(owner, &mut scene.physics);
        scene.physics.step(0.1);
        assert_eq!(scene.physics.body_count(), 0);
    }

    #[test]
    fn test_remove_body() {
        let mut scene = Scene::new();
        let body = scene.spawn(Vec3::ZERO, Body::new(EntityId::new(), 1.0).unwrap(), None);

        assert!(scene.physics.remove_body(&body));
        assert!(!scene.physics.remove_body(&body));
        assert_eq!(scene.physics.body_count(), 0);
    }

    #[test]
    fn test_static_pairs_are_not_tested() {
        let mut scene = Scene::new();
        for x in [0.0, 0.5] {
            let owner = EntityId::new();
            scene.spawn(
                Vec3::new(x, 0.0, 0.0),
                Body::new(owner, 1.0).unwrap().static_body(),
                Some(Collider::sphere(owner, 1.0).unwrap()),
            );
        }

        let stats = scene.physics.collision_handling();
        assert_eq!(stats.pairs_tested, 0);
        assert_eq!(stats.contacts, 0);
    }

    #[test]
    fn test_bodies_without_collider_are_skipped() {
        let mut scene = Scene::new();
        scene.spawn(Vec3::ZERO, Body::new(EntityId::new(), 1.0).unwrap(), None);
        let owner = EntityId::new();
        scene.spawn(
            Vec3::ZERO,
            Body::new(owner, 1.0).unwrap(),
            Some(Collider::sphere(owner, 1.0).unwrap()),
        );

        assert_eq!(scene.physics.collision_handling().pairs_tested, 0);
    }

    #[test]
    fn test_sweep_counts_each_pair_once() {
        let mut scene = Scene::new();
        for x in [0.0, 1.0, 2.0] {
            let owner = EntityId::new();
            scene.spawn(
                Vec3::new(x, 0.0, 0.0),
                Body::new(owner, 1.0).unwrap(),
                Some(Collider::sphere(owner, 0.6).unwrap()),
            );
        }

        let stats = scene.physics.collision_handling();
        assert_eq!(stats.pairs_tested, 3);
        // 0-1 and 1-2 overlap, 0-2 does not
        assert_eq!(stats.contacts, 2);
        assert_eq!(stats.resolved, 4);
    }

    #[test]
    fn test_push_out_is_split_by_inverse_mass() {
        let mut scene = Scene::new();
        let light = EntityId::new();
        let heavy = EntityId::new();
        let body_light = scene.spawn(
            Vec3::ZERO,
            Body::new(light, 1.0).unwrap(),
            Some(Collider::sphere(light, 1.0).unwrap()),
        );
        let body_heavy = scene.spawn(
            Vec3::new(1.5, 0.0, 0.0),
            Body::new(heavy, 3.0).unwrap(),
            Some(Collider::sphere(heavy, 1.0).unwrap()),
        );

        let stats = scene.physics.collision_handling();
        assert_eq!(stats.resolved, 2);

        // 0.5 overlap, 3/4 of it taken by the lighter body
        let light_x = body_light.borrow().position().unwrap().x;
        let heavy_x = body_heavy.borrow().position().unwrap().x;
        assert!((light_x - -0.375).abs() < 1e-5);
        assert!((heavy_x - 1.625).abs() < 1e-5);
        assert!((heavy_x - light_x - 2.0).abs() < 1e-5);

        // Events still carry the measured overlap
        let collider = scene.store.find::<Collider>(heavy).unwrap();
        let events = collider.borrow_mut().drain_events();
        assert!((events[0].penetration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_trigger_contact_is_reported_not_resolved() {
        let mut scene = Scene::new();
        let a = EntityId::new();
        let b = EntityId::new();
        let body_a = scene.spawn(
            Vec3::ZERO,
            Body::new(a, 1.0).unwrap().with_velocity(Vec3::X),
            Some(Collider::sphere(a, 1.0).unwrap()),
        );
        scene.spawn(
            Vec3::new(1.0, 0.0, 0.0),
            Body::new(b, 1.0).unwrap(),
            Some(Collider::sphere(b, 1.0).unwrap().as_trigger()),
        );

        let stats = scene.physics.collision_handling();
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.resolved, 0);
        assert_eq!(body_a.borrow().position(), Some(Vec3::ZERO));
        assert_eq!(body_a.borrow().velocity, Vec3::X);

        let collider_b = scene.store.find::<Collider>(b).unwrap();
        let events = collider_b.borrow_mut().drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].other, a);
        assert_eq!(events[0].role, ContactRole::Receiver);
        assert!(!events[0].resolved);
    }
}
