//! Tracked hand data
//!
//! Hand tracking reports one anchor per hand. The anchor sits in origin space
//! (`origin_from_anchor`); skeleton joints are reported relative to it
//! (`anchor_from_joint`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use throwball_math::RigidTransform;

/// Which hand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chirality {
    Left,
    Right,
}

/// Joints of the hand skeleton
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JointId {
    Wrist,
    ThumbKnuckle,
    ThumbIntermediateBase,
    ThumbIntermediateTip,
    ThumbTip,
    IndexFingerMetacarpal,
    IndexFingerKnuckle,
    IndexFingerIntermediateBase,
    IndexFingerIntermediateTip,
    IndexFingerTip,
    MiddleFingerMetacarpal,
    MiddleFingerKnuckle,
    MiddleFingerIntermediateBase,
    MiddleFingerIntermediateTip,
    MiddleFingerTip,
    RingFingerMetacarpal,
    RingFingerKnuckle,
    RingFingerIntermediateBase,
    RingFingerIntermediateTip,
    RingFingerTip,
    LittleFingerMetacarpal,
    LittleFingerKnuckle,
    LittleFingerIntermediateBase,
    LittleFingerIntermediateTip,
    LittleFingerTip,
    ForearmWrist,
    ForearmArm,
}

impl JointId {
    pub const ALL: [JointId; 27] = [
        JointId::Wrist,
        JointId::ThumbKnuckle,
        JointId::ThumbIntermediateBase,
        JointId::ThumbIntermediateTip,
        JointId::ThumbTip,
        JointId::IndexFingerMetacarpal,
        JointId::IndexFingerKnuckle,
        JointId::IndexFingerIntermediateBase,
        JointId::IndexFingerIntermediateTip,
        JointId::IndexFingerTip,
        JointId::MiddleFingerMetacarpal,
        JointId::MiddleFingerKnuckle,
        JointId::MiddleFingerIntermediateBase,
        JointId::MiddleFingerIntermediateTip,
        JointId::MiddleFingerTip,
        JointId::RingFingerMetacarpal,
        JointId::RingFingerKnuckle,
        JointId::RingFingerIntermediateBase,
        JointId::RingFingerIntermediateTip,
        JointId::RingFingerTip,
        JointId::LittleFingerMetacarpal,
        JointId::LittleFingerKnuckle,
        JointId::LittleFingerIntermediateBase,
        JointId::LittleFingerIntermediateTip,
        JointId::LittleFingerTip,
        JointId::ForearmWrist,
        JointId::ForearmArm,
    ];

    /// The four non-thumb fingertips
    pub const FINGERTIPS: [JointId; 4] = [
        JointId::IndexFingerTip,
        JointId::MiddleFingerTip,
        JointId::RingFingerTip,
        JointId::LittleFingerTip,
    ];
}

/// Anchor-from-joint transforms for the joints the provider could resolve
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandSkeleton {
    joints: BTreeMap<JointId, RigidTransform>,
}

impl HandSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_joint(mut self, id: JointId, anchor_from_joint: RigidTransform) -> Self {
        self.set_joint(id, anchor_from_joint);
        self
    }

    pub fn set_joint(&mut self, id: JointId, anchor_from_joint: RigidTransform) {
        self.joints.insert(id, anchor_from_joint);
    }

    pub fn remove_joint(&mut self, id: JointId) -> Option<RigidTransform> {
        self.joints.remove(&id)
    }

    pub fn joint(&self, id: JointId) -> Option<&RigidTransform> {
        self.joints.get(&id)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

/// One hand at one instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    pub chirality: Chirality,
    #[serde(default = "tracked_default")]
    pub tracked: bool,
    #[serde(default)]
    pub origin_from_anchor: RigidTransform,
    #[serde(default)]
    pub skeleton: Option<HandSkeleton>,
}

fn tracked_default() -> bool {
    true
}

impl HandPose {
    /// A tracked hand with no skeleton yet
    pub fn new(chirality: Chirality, origin_from_anchor: RigidTransform) -> Self {
        Self {
            chirality,
            tracked: true,
            origin_from_anchor,
            skeleton: None,
        }
    }

    pub fn with_skeleton(mut self, skeleton: HandSkeleton) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    pub fn untracked(mut self) -> Self {
        self.tracked = false;
        self
    }

    /// Joint transform in anchor (skeleton-local) space
    pub fn joint_local(&self, id: JointId) -> Option<RigidTransform> {
        self.skeleton.as_ref()?.joint(id).copied()
    }

    /// Joint transform in origin space
    pub fn joint_world(&self, id: JointId) -> Option<RigidTransform> {
        self.joint_local(id)
            .map(|anchor_from_joint| self.origin_from_anchor.compose(&anchor_from_joint))
    }
}

/// Lifecycle of a tracked anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorEvent {
    Added,
    Updated,
    Removed,
}

/// One event from the hand-tracking stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandUpdate {
    pub event: AnchorEvent,
    pub pose: HandPose,
}

impl HandUpdate {
    pub fn updated(pose: HandPose) -> Self {
        Self {
            event: AnchorEvent::Updated,
            pose,
        }
    }

    /// Only tracked updates drive grip detection
    pub fn is_actionable(&self) -> bool {
        self.event == AnchorEvent::Updated && self.pose.tracked
    }
}

/// Most recent tracked pose of each hand
#[derive(Clone, Debug, Default)]
pub struct LatestHands {
    pub left: Option<HandPose>,
    pub right: Option<HandPose>,
}

impl LatestHands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update, returning the stored pose if it was kept
    ///
    /// Non-update events and untracked poses are dropped and leave the
    /// previous pose in place.
    pub fn accept(&mut self, update: HandUpdate) -> Option<&HandPose> {
        if !update.is_actionable() {
            return None;
        }
        let slot = match update.pose.chirality {
            Chirality::Left => &mut self.left,
            Chirality::Right => &mut self.right,
        };
        let pose: &HandPose = slot.insert(update.pose);
        Some(pose)
    }

    pub fn get(&self, chirality: Chirality) -> Option<&HandPose> {
        match chirality {
            Chirality::Left => self.left.as_ref(),
            Chirality::Right => self.right.as_ref(),
        }
    }
}
