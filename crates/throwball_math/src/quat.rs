//! Unit quaternion for representing rotations in 3D space
//!
//! Hand and anchor orientations are composed and applied as quaternions.

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};
use crate::Vec3;

/// Rotation quaternion `w + xi + yj + zk`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components (not normalized)
    #[inline]
    pub const fn from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis` (right-handed)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        let half = angle * 0.5;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Squared magnitude
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Magnitude
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Normalize to unit magnitude (identity if degenerate)
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            let inv = 1.0 / mag;
            Self {
                x: self.x * inv,
                y: self.y * inv,
                z: self.z * inv,
                w: self.w * inv,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Conjugate; the inverse rotation for unit quaternions
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Rotate a vector: v' = q v q*
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Compose two rotations: result = self * other
    /// The composed rotation applies `other` first, then `self`
    pub fn compose(&self, other: &Self) -> Self {
        let a = self;
        let b = other;
        Self {
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(Quat::IDENTITY.rotate(v), v));
    }

    #[test]
    fn test_axis_angle_about_z() {
        let q = Quat::from_axis_angle(Vec3::Z, PI / 2.0);
        let rotated = q.rotate(Vec3::X);
        assert!(vec_approx_eq(rotated, Vec3::Y), "Expected Y, got {:?}", rotated);
    }

    #[test]
    fn test_axis_angle_about_y() {
        // Right-handed: +Z rotates onto +X around +Y
        let q = Quat::from_axis_angle(Vec3::Y, PI / 2.0);
        let rotated = q.rotate(Vec3::Z);
        assert!(vec_approx_eq(rotated, Vec3::X), "Expected X, got {:?}", rotated);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, -0.5), 1.234);
        let v = Vec3::new(-3.0, 0.5, 2.0);
        assert!((q.rotate(v).length() - v.length()).abs() < EPSILON);
    }

    #[test]
    fn test_compose_applies_other_first() {
        let a = Quat::from_axis_angle(Vec3::Z, PI / 2.0);
        let b = Quat::from_axis_angle(Vec3::X, PI / 2.0);
        let composed = a.compose(&b);

        let v = Vec3::Y;
        let expected = a.rotate(b.rotate(v));
        assert!(vec_approx_eq(composed.rotate(v), expected));
    }

    #[test]
    fn test_conjugate_inverts() {
        let q = Quat::from_axis_angle(Vec3::new(0.3, 1.0, 0.2), 0.8);
        let v = Vec3::new(1.0, -2.0, 0.5);
        let back = q.conjugate().rotate(q.rotate(v));
        assert!(vec_approx_eq(back, v));
    }
}
