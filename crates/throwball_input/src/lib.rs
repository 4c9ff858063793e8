//! Hand Input Handling
//!
//! This crate turns tracked hand skeletons into ball interactions:
//! a fist near the ball holds it, opening the hand lets it go, and the
//! palm direction pushes it away.

mod hand;
mod force;
mod grip;
mod target;

pub use hand::{AnchorEvent, Chirality, HandPose, HandSkeleton, HandUpdate, JointId, LatestHands};
pub use force::{force_direction, palm_outward};
pub use grip::{ForceMode, GripConfig, GripDecision, GripEvaluation, GripTracker, HandFilter};
pub use target::GrabTarget;
