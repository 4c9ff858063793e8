//! Surface materials

use serde::{Deserialize, Serialize};

/// How a surface responds to contact
///
/// On every contact the tangential velocity keeps `1 - friction` of itself
/// and the normal velocity is reflected scaled by `restitution`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::new(0.5, 0.0)
    }
}

impl PhysicsMaterial {
    /// The ball: grippy and dead, so it settles where it lands
    pub const BALL: Self = Self {
        friction: 0.8,
        restitution: 0.0,
    };

    /// Reconstructed room geometry
    pub const ROOM_SURFACE: Self = Self {
        friction: 0.6,
        restitution: 0.1,
    };

    /// Both coefficients are clamped to [0, 1]
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Material used for a contact between two surfaces
    ///
    /// Friction is the geometric mean; the bouncier surface wins.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }

    /// Fraction of sliding velocity kept after a contact
    pub fn tangent_retention(&self) -> f32 {
        1.0 - self.friction
    }
}
