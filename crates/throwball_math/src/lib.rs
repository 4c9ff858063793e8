//! 3D Mathematics Library
//!
//! Small value types shared by the physics, scene and hand-tracking crates.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Quat`] - Unit quaternion rotation
//! - [`RigidTransform`] - Rotation followed by translation, no scale

mod vec3;
mod quat;
mod rigid;

pub use vec3::Vec3;
pub use quat::Quat;
pub use rigid::RigidTransform;
