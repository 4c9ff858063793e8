//! Entity transform (position, rotation, scale)

use throwball_math::{Quat, RigidTransform, Vec3};
use serde::{Serialize, Deserialize};

/// A transform with position, rotation, and uniform scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in origin space
    pub position: Vec3,
    /// Orientation in origin space
    pub rotation: Quat,
    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Drop the scale, keeping rotation and translation
    pub fn to_rigid(&self) -> RigidTransform {
        RigidTransform::new(self.rotation, self.position)
    }

    /// Transform a point from local space to origin space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p * self.scale) + self.position
    }

    /// Transform a direction from local space to origin space
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate(d * self.scale)
    }
}

impl From<RigidTransform> for Transform {
    fn from(rigid: RigidTransform) -> Self {
        Self::from_position_rotation(rigid.translation, rigid.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(p), p);
    }

    #[test]
    fn test_transform_point_order() {
        let t = Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::from_axis_angle(Vec3::Y, FRAC_PI_2),
            scale: 2.0,
        };
        // X scaled to 2, rotated a quarter turn about Y to -Z, then lifted
        let p = t.transform_point(Vec3::X);
        assert!((p - Vec3::new(0.0, 1.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_direction_ignores_position() {
        let t = Transform::from_position(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(t.transform_direction(Vec3::Z), Vec3::Z);
    }

    #[test]
    fn test_from_rigid_round_trip() {
        let rigid = RigidTransform::new(Quat::from_axis_angle(Vec3::X, 0.3), Vec3::new(0.1, 1.4, -0.2));
        let t = Transform::from(rigid);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.to_rigid(), rigid);
    }
}
