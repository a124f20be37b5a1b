//! Core components for the entity system

use super::component::{Capabilities, Component, Shared, StartContext};
use super::store::ComponentStore;
use super::EntityId;
use crate::error::{EngineError, Result};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform component representing position, rotation, and scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Owning entity
    pub owner: EntityId,
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a unit quaternion
    pub rotation: Quat,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform at the origin
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a new transform with the given position
    pub fn from_position(owner: EntityId, position: Vec3) -> Self {
        Self {
            position,
            ..Self::new(owner)
        }
    }

    /// Set the rotation of the transform
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale of the transform
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    /// Translation * Rotation * Scale, the usual model matrix
    pub fn trs(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        translation * self.rotation_matrix() * Mat4::from_scale(self.scale)
    }

    /// Rotation * Translation * Scale, used for view matrices
    pub fn rts(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        self.rotation_matrix() * translation * Mat4::from_scale(self.scale)
    }

    /// Rotation * Scale * Translation
    pub fn rst(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        self.rotation_matrix() * Mat4::from_scale(self.scale) * translation
    }

    /// Local +Z rotated into world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local -X rotated into world space
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::NEG_X
    }

    /// Local +Y rotated into world space
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Component for Transform {
    fn owner(&self) -> EntityId {
        self.owner
    }
}

/// Resolve the owner's transform or fail the start hook
pub(crate) fn require_transform(
    ctx: &StartContext<'_>,
    owner: EntityId,
    component: &'static str,
) -> Result<Shared<Transform>> {
    ctx.find::<Transform>(owner)
        .ok_or(EngineError::MissingDependency {
            owner,
            component,
            requires: "Transform",
        })
}

/// Opaque handle to GPU mesh data owned by the external render layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u64);

/// Marks an entity as drawable by the render pass
#[derive(Debug, Clone)]
pub struct Render {
    /// Owning entity
    pub owner: EntityId,
    /// Meshes drawn with the entity's model matrix
    pub meshes: Vec<MeshId>,
    transform: Option<Shared<Transform>>,
}

impl Render {
    /// Create a render component for the given meshes
    pub fn new(owner: EntityId, meshes: Vec<MeshId>) -> Self {
        Self {
            owner,
            meshes,
            transform: None,
        }
    }

    /// Transform resolved at start
    pub fn transform(&self) -> Option<&Shared<Transform>> {
        self.transform.as_ref()
    }

    /// Model matrix for this frame, rebuilt from the current transform
    pub fn model_matrix(&self) -> Option<Mat4> {
        self.transform.as_ref().map(|t| t.borrow().trs())
    }
}

impl Component for Render {
    fn owner(&self) -> EntityId {
        self.owner
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) -> Result<()> {
        self.transform = Some(require_transform(ctx, self.owner, "Render")?);
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDERABLE
    }
}

/// Colour and attenuation parameters of a point light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightData {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub diffuse_color: Vec3,
    pub diffuse_intensity: f32,
    pub specular_color: Vec3,
    pub specular_intensity: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.0,
            diffuse_color: Vec3::ONE,
            diffuse_intensity: 0.5,
            specular_color: Vec3::ONE,
            specular_intensity: 1.0,
            constant: 0.09,
            linear: 0.032,
            quadratic: 0.0,
        }
    }
}

/// Point light placed at its owner's transform
#[derive(Debug, Clone)]
pub struct PointLight {
    /// Owning entity
    pub owner: EntityId,
    /// Light parameters
    pub data: LightData,
    transform: Option<Shared<Transform>>,
}

impl PointLight {
    /// Create a light with the given parameters
    pub fn new(owner: EntityId, data: LightData) -> Self {
        Self {
            owner,
            data,
            transform: None,
        }
    }

    /// World position of the light, once started
    pub fn position(&self) -> Option<Vec3> {
        self.transform.as_ref().map(|t| t.borrow().position)
    }
}

impl Component for PointLight {
    fn owner(&self) -> EntityId {
        self.owner
    }

    fn start(&mut self, ctx: &mut StartContext<'_>) -> Result<()> {
        self.transform = Some(require_transform(ctx, self.owner, "PointLight")?);
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::POINT_LIGHT
    }
}

/// Up to `max` live point lights, nearest to `position` first
pub fn closest_point_lights(
    store: &ComponentStore,
    position: Vec3,
    max: usize,
) -> Vec<Shared<PointLight>> {
    let mut lights: Vec<(f32, Shared<PointLight>)> = store
        .point_lights()
        .iter()
        .filter_map(|entry| entry.get::<PointLight>())
        .filter_map(|light| {
            let distance = light.borrow().position()?.distance(position);
            Some((distance, light))
        })
        .collect();

    lights.sort_by(|a, b| a.0.total_cmp(&b.0));
    lights.truncate(max);
    lights.into_iter().map(|(_, light)| light).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsWorld;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_transform_default() {
        let transform = Transform::new(EntityId::new());
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_basis_vectors_follow_rotation() {
        let transform = Transform::new(EntityId::new());
        assert!(approx(transform.forward(), Vec3::Z));
        assert!(approx(transform.right(), Vec3::NEG_X));
        assert!(approx(transform.up(), Vec3::Y));

        let turned = transform.with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!(approx(turned.forward(), Vec3::X));
        assert!(approx(turned.up(), Vec3::Y));
    }

    #[test]
    fn test_trs_places_translation_last() {
        let transform = Transform::from_position(EntityId::new(), Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::splat(2.0));
        let matrix = transform.trs();
        assert_eq!(matrix.w_axis.truncate(), transform.position);
        assert!(approx(matrix.transform_point3(Vec3::X), Vec3::new(3.0, 2.0, 3.0)));
    }

    #[test]
    fn test_matrices_reflect_mutation() {
        let mut transform = Transform::new(EntityId::new());
        let before = transform.trs();
        transform.position = Vec3::new(0.0, 5.0, 0.0);
        assert_ne!(before, transform.trs());
        assert_eq!(transform.trs().w_axis.truncate(), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_rts_rotates_translation() {
        let transform = Transform::from_position(EntityId::new(), Vec3::X)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::PI));
        let matrix = transform.rts();
        assert!(approx(matrix.w_axis.truncate(), Vec3::NEG_X));
        assert!(approx(transform.rst().w_axis.truncate(), Vec3::NEG_X));
    }

    #[test]
    fn test_closest_point_lights() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsWorld::new();

        for x in [10.0, 1.0, 5.0] {
            let id = EntityId::new();
            store.add(Transform::from_position(id, Vec3::new(x, 0.0, 0.0)));
            store.add(PointLight::new(id, LightData::default()));
        }
        store.run_starts(&mut physics);

        let lights = closest_point_lights(&store, Vec3::ZERO, 2);
        let xs: Vec<f32> = lights
            .iter()
            .map(|l| l.borrow().position().unwrap().x)
            .collect();
        assert_eq!(xs, vec![1.0, 5.0]);
    }

    #[test]
    fn test_render_requires_transform() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsWorld::new();
        let id = EntityId::new();
        store.add(Render::new(id, vec![MeshId(7)]));

        let failures = store.run_starts(&mut physics);
        assert_eq!(failures.len(), 1);
        assert!(store.renderables().is_empty());
    }

    #[test]
    fn test_render_model_matrix() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsWorld::new();
        let id = EntityId::new();
        let transform = store.add(Transform::from_position(id, Vec3::Y));
        let render = store.add(Render::new(id, vec![MeshId(1)]));
        store.run_starts(&mut physics);

        assert_eq!(store.renderables().len(), 1);
        transform.borrow_mut().position = Vec3::Z;
        let model = render.borrow().model_matrix().unwrap();
        assert_eq!(model.w_axis.truncate(), Vec3::Z);
    }
}
