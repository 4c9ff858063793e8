//! Rigid body and static collider types

use crate::collision::CollisionFilter;
use crate::material::PhysicsMaterial;
use crate::shapes::{Collider, Sphere};
use throwball_math::{Quat, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Generational: once a body is removed, stale keys resolve to None
    /// even if the slot is reused.
    pub struct BodyKey;

    /// Key to a static collider in the physics world
    pub struct ColliderKey;
}

/// How the simulation treats a body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BodyMode {
    /// Integrated every step: gravity, forces, collision response
    #[default]
    Dynamic,
    /// Held in place; only moved by explicit transform writes
    Static,
}

/// A rigid sphere with position, orientation, velocity and accumulated force
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position in world space
    pub position: Vec3,
    /// Orientation in world space (not integrated; set by transform writes)
    pub rotation: Quat,
    /// Velocity (units per second)
    pub velocity: Vec3,
    /// Mass (kilograms)
    pub mass: f32,
    /// Surface properties
    pub material: PhysicsMaterial,
    /// Whether this body is affected by gravity while dynamic
    pub affected_by_gravity: bool,
    /// Layer filtering
    pub filter: CollisionFilter,
    /// Collision sphere, kept centered on `position`
    collider: Sphere,
    mode: BodyMode,
    /// Force accumulated since the last step
    force: Vec3,
}

impl RigidBody {
    /// Create a new dynamic body with a sphere collider
    pub fn new_sphere(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            mass: 1.0,
            material: PhysicsMaterial::default(),
            affected_by_gravity: true,
            filter: CollisionFilter::default(),
            collider: Sphere::new(position, radius),
            mode: BodyMode::Dynamic,
            force: Vec3::ZERO,
        }
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the mass of this body (clamped to a small positive minimum)
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(1e-6);
        self
    }

    /// Set the physics material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set whether this body is affected by gravity
    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected;
        self
    }

    /// Set the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the initial mode
    pub fn with_mode(mut self, mode: BodyMode) -> Self {
        self.set_mode(mode);
        self
    }

    /// Current mode
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    pub fn is_static(&self) -> bool {
        self.mode == BodyMode::Static
    }

    /// Switch mode
    ///
    /// Entering Static zeroes velocity and drops pending force, so a body
    /// released back to Dynamic starts at rest.
    pub fn set_mode(&mut self, mode: BodyMode) {
        if mode == BodyMode::Static {
            self.velocity = Vec3::ZERO;
            self.force = Vec3::ZERO;
        }
        self.mode = mode;
    }

    /// Collision sphere in world space
    pub fn collider(&self) -> &Sphere {
        &self.collider
    }

    /// Radius of the collision sphere
    pub fn radius(&self) -> f32 {
        self.collider.radius
    }

    /// Update the position and sync the collider
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.collider.center = position;
    }

    /// Teleport to a full pose
    pub fn set_transform(&mut self, position: Vec3, rotation: Quat) {
        self.set_position(position);
        self.rotation = rotation;
    }

    /// Apply a positional correction (e.g., from collision resolution)
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.set_position(self.position + correction);
    }

    /// Add a world-space force for the next step
    ///
    /// Static bodies do not respond to forces; returns false and drops it.
    pub fn apply_force(&mut self, force: Vec3) -> bool {
        if self.is_static() {
            return false;
        }
        self.force += force;
        true
    }

    /// Force accumulated since the last step
    pub fn accumulated_force(&self) -> Vec3 {
        self.force
    }

    pub(crate) fn clear_force(&mut self) {
        self.force = Vec3::ZERO;
    }
}

/// A static collider (floor plane, box, or reconstructed mesh)
#[derive(Clone, Debug)]
pub struct StaticCollider {
    /// The collision shape (world space)
    pub collider: Collider,
    /// Surface properties
    pub material: PhysicsMaterial,
    /// Layer filtering
    pub filter: CollisionFilter,
}

impl StaticCollider {
    /// Create a static collider with environment filtering
    pub fn new(collider: Collider, material: PhysicsMaterial) -> Self {
        Self {
            collider,
            material,
            filter: CollisionFilter::environment(),
        }
    }

    /// Horizontal floor plane at `y`
    pub fn floor(y: f32, material: PhysicsMaterial) -> Self {
        Self::new(Collider::Plane(crate::shapes::Plane::floor(y)), material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sphere_body() {
        let pos = Vec3::new(1.0, 2.0, 3.0);
        let body = RigidBody::new_sphere(pos, 0.05);

        assert_eq!(body.position, pos);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.mass, 1.0);
        assert_eq!(body.mode(), BodyMode::Dynamic);
        assert_eq!(body.collider().center, pos);
        assert_eq!(body.radius(), 0.05);
    }

    #[test]
    fn test_builder_methods() {
        let body = RigidBody::new_sphere(Vec3::ZERO, 1.0)
            .with_velocity(Vec3::new(1.0, 2.0, 0.0))
            .with_mass(5.0)
            .with_material(PhysicsMaterial::BALL)
            .with_gravity(false);

        assert_eq!(body.velocity, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(body.mass, 5.0);
        assert_eq!(body.material, PhysicsMaterial::BALL);
        assert!(!body.affected_by_gravity);
    }

    #[test]
    fn test_static_mode_drops_velocity_and_force() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.05).with_velocity(Vec3::X);
        assert!(body.apply_force(Vec3::Y));

        body.set_mode(BodyMode::Static);

        assert!(body.is_static());
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.accumulated_force(), Vec3::ZERO);
    }

    #[test]
    fn test_static_body_ignores_force() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.05).with_mode(BodyMode::Static);
        assert!(!body.apply_force(Vec3::new(300.0, 0.0, 0.0)));
        assert_eq!(body.accumulated_force(), Vec3::ZERO);
    }

    #[test]
    fn test_forces_accumulate() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.05);
        body.apply_force(Vec3::X);
        body.apply_force(Vec3::X * 3.0);
        assert_eq!(body.accumulated_force(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_set_transform_moves_collider() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.05);
        let rotation = Quat::from_axis_angle(Vec3::Y, 1.0);
        body.set_transform(Vec3::new(0.1, 1.2, -0.3), rotation);

        assert_eq!(body.collider().center, Vec3::new(0.1, 1.2, -0.3));
        assert_eq!(body.rotation, rotation);
    }

    #[test]
    fn test_apply_correction() {
        let mut body = RigidBody::new_sphere(Vec3::new(1.0, 0.0, 0.0), 1.0);
        body.apply_correction(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(body.position, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(body.collider().center, Vec3::new(1.0, 0.5, 0.0));
    }
}
