//! Core types for throwball
//!
//! This crate provides the scene the application mutates:
//!
//! - [`Transform`] - Position, rotation, and scale of an entity
//! - [`Entity`] - An object in the world, optionally linked to physics
//! - [`World`] - Container for all entities, owning the physics simulation
//! - [`EntityKey`] - Generational key to an entity in the world
//! - [`BallSpec`] - Size and surface of the throwable ball
//! - [`MeshAnchorRegistry`] - One static-collision entity per reconstructed mesh anchor

mod transform;
mod entity;
mod world;
pub mod ball;
pub mod reconstruction;

pub use transform::Transform;
pub use entity::{DirtyFlags, Entity};
pub use world::{EntityKey, World};
pub use ball::{BallSpec, BALL_NAME};
pub use reconstruction::{
    AnchorId, MeshAnchorRegistry, MeshAnchorUpdate, MeshChange, MeshGeometry, MeshOutcome, ENVIRONMENT_TAG,
};

// Re-export commonly used types for convenience
pub use throwball_math::{Quat, RigidTransform, Vec3};
pub use throwball_physics::{BodyKey, BodyMode, ColliderKey, PhysicsConfig, PhysicsWorld, RigidBody, StaticCollider};
