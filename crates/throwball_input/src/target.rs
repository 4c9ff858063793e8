//! The thing a hand can grab

use throwball_math::{RigidTransform, Vec3};
use throwball_physics::{BodyMode, RigidBody};

/// A physics-backed object the grip tracker can hold and push
///
/// Implemented for a bare [`RigidBody`] and, by the application, for the
/// ball entity in its world.
pub trait GrabTarget {
    /// Current position in origin space
    fn position(&self) -> Vec3;

    fn mode(&self) -> BodyMode;

    fn set_mode(&mut self, mode: BodyMode);

    /// Teleport to a pose in origin space
    fn set_transform(&mut self, transform: RigidTransform);

    /// Apply a world-space force for the next physics step
    ///
    /// Returns false if the target ignored it (static bodies do).
    fn apply_force(&mut self, force: Vec3) -> bool;
}

impl GrabTarget for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn mode(&self) -> BodyMode {
        RigidBody::mode(self)
    }

    fn set_mode(&mut self, mode: BodyMode) {
        RigidBody::set_mode(self, mode)
    }

    fn set_transform(&mut self, transform: RigidTransform) {
        RigidBody::set_transform(self, transform.translation, transform.rotation)
    }

    fn apply_force(&mut self, force: Vec3) -> bool {
        RigidBody::apply_force(self, force)
    }
}
