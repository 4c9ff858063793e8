//! Rigid transform (rotation + translation)

use serde::{Serialize, Deserialize};
use crate::{Quat, Vec3};

/// A rotation followed by a translation
///
/// This is the shape of every pose the tracking providers report:
/// origin-from-anchor for hands and mesh anchors, anchor-from-joint for
/// skeleton joints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default)]
    pub translation: Vec3,
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self { rotation, translation }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation,
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            translation: Vec3::ZERO,
        }
    }

    /// Transform a point from local space to parent space
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.translation
    }

    /// Transform a direction (translation is ignored)
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation.rotate(v)
    }

    /// Compose two transforms: result = self * other
    ///
    /// The composed transform applies `other` first, then `self`, so
    /// `origin_from_anchor.compose(&anchor_from_joint)` is origin-from-joint.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation.compose(&other.rotation).normalize(),
            translation: self.transform_point(other.translation),
        }
    }

    /// Inverse transform
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.conjugate();
        Self {
            rotation: inv_rotation,
            translation: inv_rotation.rotate(-self.translation),
        }
    }
}
