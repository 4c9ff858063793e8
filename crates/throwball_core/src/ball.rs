//! The throwable ball
//!
//! A single sphere the user picks up and throws. It is created once per
//! session at the right index fingertip and lives as a named entity linked to
//! a dynamic physics body.

use serde::{Deserialize, Serialize};
use throwball_math::Vec3;
use throwball_physics::{CollisionFilter, PhysicsMaterial, RigidBody};

use crate::{Entity, EntityKey, Transform, World};

/// Entity name the ball is registered under
pub const BALL_NAME: &str = "ball";

/// Physical description of the ball
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSpec {
    pub radius: f32,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BallSpec {
    fn default() -> Self {
        Self {
            radius: 0.05,
            mass: 1.0,
            friction: PhysicsMaterial::BALL.friction,
            restitution: PhysicsMaterial::BALL.restitution,
        }
    }
}

impl BallSpec {
    pub fn material(&self) -> PhysicsMaterial {
        PhysicsMaterial::new(self.friction, self.restitution)
    }

    /// A dynamic body for this ball centered at `position`
    pub fn rigid_body(&self, position: Vec3) -> RigidBody {
        RigidBody::new_sphere(position, self.radius)
            .with_mass(self.mass)
            .with_material(self.material())
            .with_filter(CollisionFilter::ball())
    }

    /// Create the ball body and its entity
    pub fn spawn(&self, world: &mut World, position: Vec3) -> EntityKey {
        let body = world.physics_mut().add_body(self.rigid_body(position));
        let entity = Entity::new(Transform::from_position(position))
            .with_name(BALL_NAME)
            .with_tag("dynamic")
            .with_physics_body(body);
        log::info!("Spawned ball at ({:.3}, {:.3}, {:.3})", position.x, position.y, position.z);
        world.add_entity(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throwball_physics::BodyMode;

    #[test]
    fn test_default_spec() {
        let spec = BallSpec::default();
        assert_eq!(spec.radius, 0.05);
        assert_eq!(spec.mass, 1.0);
        assert_eq!(spec.material(), PhysicsMaterial::BALL);
    }

    #[test]
    fn test_spawn_creates_dynamic_named_ball() {
        let mut world = World::new();
        let position = Vec3::new(0.1, 1.2, -0.3);
        let key = BallSpec::default().spawn(&mut world, position);

        let (found, entity) = world.get_by_name(BALL_NAME).unwrap();
        assert_eq!(found, key);
        assert_eq!(entity.transform.position, position);

        let body = world.physics().get_body(entity.physics_body.unwrap()).unwrap();
        assert_eq!(body.mode(), BodyMode::Dynamic);
        assert_eq!(body.radius(), 0.05);
        assert_eq!(body.mass, 1.0);
        assert_eq!(body.position, position);
    }
}
