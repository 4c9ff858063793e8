//! Physics world and simulation

use crate::body::{BodyKey, BodyMode, ColliderKey, RigidBody, StaticCollider};
use crate::collision::{sphere_vs_aabb, sphere_vs_mesh, sphere_vs_plane, sphere_vs_sphere, Contact};
use crate::material::PhysicsMaterial;
use crate::shapes::{Collider, Sphere};
use throwball_math::{Quat, Vec3};
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Gravity acceleration (world space, m/s²)
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl PhysicsConfig {
    /// Create a config with downward gravity of the given (negative) magnitude
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: Vec3::new(0.0, gravity_y, 0.0),
        }
    }
}

/// The physics world containing all rigid bodies and static colliders
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    static_colliders: SlotMap<ColliderKey, StaticCollider>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            static_colliders: SlotMap::with_key(),
            config,
        }
    }

    /// Add a static collider to the world
    pub fn add_static_collider(&mut self, collider: StaticCollider) -> ColliderKey {
        self.static_colliders.insert(collider)
    }

    /// Remove a static collider
    pub fn remove_static_collider(&mut self, key: ColliderKey) -> Option<StaticCollider> {
        self.static_colliders.remove(key)
    }

    /// Swap the shape of an existing static collider; false if the key is stale
    pub fn replace_static_shape(&mut self, key: ColliderKey, collider: Collider) -> bool {
        match self.static_colliders.get_mut(key) {
            Some(existing) => {
                existing.collider = collider;
                true
            }
            None => false,
        }
    }

    /// Get a static collider by key
    pub fn get_static_collider(&self, key: ColliderKey) -> Option<&StaticCollider> {
        self.static_colliders.get(key)
    }

    /// Number of static colliders
    pub fn static_collider_count(&self) -> usize {
        self.static_colliders.len()
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Apply a world-space force to a body for the next step
    ///
    /// Returns false if the key is stale or the body is static.
    pub fn apply_force(&mut self, key: BodyKey, force: Vec3) -> bool {
        self.bodies
            .get_mut(key)
            .map(|body| body.apply_force(force))
            .unwrap_or(false)
    }

    /// Switch a body between dynamic and static
    pub fn set_body_mode(&mut self, key: BodyKey, mode: BodyMode) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                if body.mode() != mode {
                    log::trace!("body {:?} -> {:?}", key, mode);
                }
                body.set_mode(mode);
                true
            }
            None => false,
        }
    }

    /// Teleport a body
    pub fn set_body_transform(&mut self, key: BodyKey, position: Vec3, rotation: Quat) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.set_transform(position, rotation);
                true
            }
            None => false,
        }
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Gravity and accumulated force integration for dynamic bodies
    /// 2. Static collider collision detection and resolution
    /// 3. Body-body collision detection and resolution
    ///
    /// Accumulated forces are cleared on every body, static or not.
    pub fn step(&mut self, dt: f32) {
        for (_key, body) in &mut self.bodies {
            if body.mode() == BodyMode::Dynamic {
                let mut acceleration = body.accumulated_force() / body.mass;
                if body.affected_by_gravity {
                    acceleration += self.config.gravity;
                }
                body.velocity += acceleration * dt;

                let displacement = body.velocity * dt;
                body.set_position(body.position + displacement);
            }
            body.clear_force();
        }

        self.resolve_static_collisions();
        self.resolve_body_collisions();
    }

    /// Narrow-phase test between a body sphere and a static collider
    fn check_static_collision(sphere: &Sphere, collider: &Collider) -> Option<Contact> {
        match collider {
            Collider::Plane(plane) => sphere_vs_plane(sphere, plane),
            Collider::Aabb(aabb) => sphere_vs_aabb(sphere, aabb),
            Collider::Sphere(other) => sphere_vs_sphere(sphere, other),
            Collider::Mesh(mesh) => sphere_vs_mesh(sphere, mesh),
        }
    }

    /// Remove normal velocity (with bounce) and damp tangent velocity
    fn respond(velocity: Vec3, normal: Vec3, combined: &PhysicsMaterial) -> Vec3 {
        let velocity_along_normal = velocity.dot(normal);
        if velocity_along_normal >= 0.0 {
            return velocity;
        }

        let mut velocity = velocity - normal * velocity_along_normal * (1.0 + combined.restitution);

        let tangent_velocity = velocity - normal * velocity.dot(normal);
        if tangent_velocity.length() > 0.0001 {
            velocity = normal * velocity.dot(normal) + tangent_velocity * combined.tangent_retention();
        }
        velocity
    }

    /// Resolve collisions between dynamic bodies and static colliders
    fn resolve_static_collisions(&mut self) {
        for (_key, body) in &mut self.bodies {
            if body.is_static() {
                continue;
            }

            for (_ckey, static_col) in &self.static_colliders {
                if !body.filter.collides_with(&static_col.filter) {
                    continue;
                }

                let Some(contact) = Self::check_static_collision(body.collider(), &static_col.collider) else {
                    continue;
                };
                if !contact.is_colliding() {
                    continue;
                }

                body.apply_correction(contact.normal * contact.penetration);
                let combined = body.material.combine(&static_col.material);
                body.velocity = Self::respond(body.velocity, contact.normal, &combined);
            }
        }
    }

    /// Resolve collisions between pairs of bodies
    fn resolve_body_collisions(&mut self) {
        let keys: Vec<BodyKey> = self.bodies.keys().collect();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (key_a, key_b) = (keys[i], keys[j]);
                let (a, b) = (&self.bodies[key_a], &self.bodies[key_b]);

                if a.is_static() && b.is_static() {
                    continue;
                }
                if !a.filter.collides_with(&b.filter) {
                    continue;
                }

                // Normal points from B toward A
                let Some(contact) = sphere_vs_sphere(a.collider(), b.collider()) else {
                    continue;
                };
                if contact.is_colliding() {
                    self.resolve_body_pair(key_a, key_b, &contact);
                }
            }
        }
    }

    /// Push two overlapping bodies apart, splitting by mass
    fn resolve_body_pair(&mut self, key_a: BodyKey, key_b: BodyKey, contact: &Contact) {
        let (static_a, static_b) = (self.bodies[key_a].is_static(), self.bodies[key_b].is_static());
        let (mass_a, mass_b) = (self.bodies[key_a].mass, self.bodies[key_b].mass);

        let (share_a, share_b) = if static_a {
            (0.0, 1.0)
        } else if static_b {
            (1.0, 0.0)
        } else {
            let total = mass_a + mass_b;
            (mass_b / total, mass_a / total)
        };

        let push = contact.normal * contact.penetration;
        let combined = self.bodies[key_a].material.combine(&self.bodies[key_b].material);

        if !static_a {
            let a = &mut self.bodies[key_a];
            a.apply_correction(push * share_a);
            a.velocity = Self::respond(a.velocity, contact.normal, &combined);
        }
        if !static_b {
            let b = &mut self.bodies[key_b];
            b.apply_correction(-push * share_b);
            b.velocity = Self::respond(b.velocity, -contact.normal, &combined);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::TriangleMesh;
    use throwball_math::RigidTransform;

    /// Helper to create a world with a floor at the given Y position
    fn world_with_floor(gravity: f32, floor_y: f32, floor_material: PhysicsMaterial) -> PhysicsWorld {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(gravity));
        world.add_static_collider(StaticCollider::floor(floor_y, floor_material));
        world
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert!((config.gravity.y + 9.81).abs() < 1e-6);
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_sphere(Vec3::ZERO, 0.05));
        assert!(world.remove_body(key).is_some());
        assert!(world.get_body(key).is_none());

        let new_key = world.add_body(RigidBody::new_sphere(Vec3::X, 0.05));
        assert!(world.get_body(key).is_none());
        assert!(world.get_body(new_key).is_some());
    }

    #[test]
    fn test_gravity_application() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(-10.0));
        let key = world.add_body(RigidBody::new_sphere(Vec3::new(0.0, 10.0, 0.0), 0.05));

        world.step(0.1);

        let body = world.get_body(key).unwrap();
        assert!((body.velocity.y + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_force_integration_and_clear() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let key = world.add_body(RigidBody::new_sphere(Vec3::ZERO, 0.05).with_mass(2.0));

        assert!(world.apply_force(key, Vec3::new(4.0, 0.0, 0.0)));
        world.step(0.5);

        let body = world.get_body(key).unwrap();
        // a = 4 / 2 = 2, v = 2 * 0.5 = 1
        assert!((body.velocity.x - 1.0).abs() < 0.0001);
        assert_eq!(body.accumulated_force(), Vec3::ZERO);

        // No force next step: velocity holds
        world.step(0.5);
        assert!((world.get_body(key).unwrap().velocity.x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_sphere(Vec3::new(0.0, 1.0, 0.0), 0.05));
        world.set_body_mode(key, BodyMode::Static);

        assert!(!world.apply_force(key, Vec3::X * 300.0));
        world.step(1.0);

        let body = world.get_body(key).unwrap();
        assert_eq!(body.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_dynamic_again_after_static_falls() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_sphere(Vec3::new(0.0, 1.0, 0.0), 0.05));
        world.set_body_mode(key, BodyMode::Static);
        world.step(0.1);
        world.set_body_mode(key, BodyMode::Dynamic);
        world.step(0.1);

        assert!(world.get_body(key).unwrap().position.y < 1.0);
    }

    #[test]
    fn test_floor_collision() {
        let mut world = world_with_floor(-9.81, 0.0, PhysicsMaterial::ROOM_SURFACE);
        let key = world.add_body(RigidBody::new_sphere(Vec3::new(0.0, 0.03, 0.0), 0.05).with_gravity(false));

        world.step(0.016);

        let body = world.get_body(key).unwrap();
        assert!(body.position.y >= 0.05 - 0.001);
    }

    #[test]
    fn test_ball_comes_to_rest_on_floor() {
        let mut world = world_with_floor(-9.81, 0.0, PhysicsMaterial::ROOM_SURFACE);
        let key = world.add_body(
            RigidBody::new_sphere(Vec3::new(0.0, 1.0, 0.0), 0.05).with_material(PhysicsMaterial::BALL),
        );

        for _ in 0..300 {
            world.step(1.0 / 90.0);
        }

        let body = world.get_body(key).unwrap();
        assert!((body.position.y - 0.05).abs() < 0.01, "y = {}", body.position.y);
    }

    #[test]
    fn test_mesh_collider_stops_ball() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::default());
        let vertices = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        let table = RigidTransform::from_translation(Vec3::new(0.0, 0.7, 0.0));
        let mesh = TriangleMesh::generate_static(&vertices, &[[0, 2, 1], [0, 3, 2]], &table).unwrap();
        world.add_static_collider(StaticCollider::new(Collider::mesh(mesh), PhysicsMaterial::ROOM_SURFACE));

        let key = world.add_body(RigidBody::new_sphere(Vec3::new(0.2, 1.0, 0.1), 0.05));
        for _ in 0..200 {
            world.step(1.0 / 90.0);
        }

        let body = world.get_body(key).unwrap();
        assert!(body.position.y > 0.7, "ball fell through the table: y = {}", body.position.y);
    }

    #[test]
    fn test_static_collider_removal() {
        let mut world = PhysicsWorld::new();
        let key = world.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::default()));
        assert_eq!(world.static_collider_count(), 1);

        assert!(world.remove_static_collider(key).is_some());
        assert_eq!(world.static_collider_count(), 0);
        assert!(!world.replace_static_shape(key, Collider::Plane(crate::shapes::Plane::floor(1.0))));
    }

    #[test]
    fn test_two_balls_separate() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let a = world.add_body(RigidBody::new_sphere(Vec3::ZERO, 0.05));
        let b = world.add_body(
            RigidBody::new_sphere(Vec3::new(0.3, 0.0, 0.0), 0.05).with_velocity(Vec3::new(-2.0, 0.0, 0.0)),
        );

        for _ in 0..20 {
            world.step(0.016);
        }

        let distance = (world.get_body(b).unwrap().position - world.get_body(a).unwrap().position).length();
        assert!(distance >= 0.1 - 0.01);
    }
}
