//! Push direction from hand orientation

use throwball_math::Vec3;

use crate::{Chirality, HandPose};

/// Anchor-space vector pointing out of the palm
///
/// Mirrored between hands so a push always goes away from the body.
pub fn palm_outward(chirality: Chirality) -> Vec3 {
    match chirality {
        Chirality::Left => Vec3::X,
        Chirality::Right => -Vec3::X,
    }
}

/// Unit push direction in origin space
///
/// The anchor rotation applied to [`palm_outward`]. Rotation preserves
/// length so the result is not renormalized.
pub fn force_direction(pose: &HandPose) -> Vec3 {
    pose.origin_from_anchor
        .rotation
        .rotate(palm_outward(pose.chirality))
}
