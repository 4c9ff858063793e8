//! Physics simulation for throwball
//!
//! This crate provides a small rigid-body simulation, including:
//! - Collision shapes (spheres, AABBs, planes, static triangle meshes)
//! - Collision detection and layer filtering
//! - Rigid bodies that switch between dynamic and static modes
//! - Force accumulation and gravity integration

pub mod body;
pub mod collision;
pub mod material;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, BodyMode, ColliderKey, RigidBody, StaticCollider};
pub use collision::{sphere_vs_aabb, sphere_vs_mesh, sphere_vs_plane, sphere_vs_sphere, sphere_vs_triangle, CollisionFilter, CollisionLayer, Contact};
pub use material::PhysicsMaterial;
pub use shapes::{Aabb, Collider, Plane, ShapeError, Sphere, Triangle, TriangleMesh};
pub use world::{PhysicsConfig, PhysicsWorld};
