//! Grip detection
//!
//! Each frame the latest pose of the driving hand is checked against the
//! ball:
//!
//! - Too far from the ball: not gripping.
//! - Near the ball with an open hand: not gripping, ball falls freely.
//! - Near the ball with a fist: gripping, ball welded to the index fingertip.
//!
//! The ball is static exactly while the tracker reports gripping.

use serde::{Deserialize, Serialize};
use throwball_math::Vec3;
use throwball_physics::BodyMode;

use crate::{force_direction, Chirality, GrabTarget, HandPose, JointId};

/// When the palm push is applied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    /// Only on frames that detect a grip (a single strong throw)
    OnGrip,
    /// Every frame the hand is within reach of the ball (a gentle nudge)
    #[default]
    Continuous,
}

/// Which hand drives the tracker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandFilter {
    Either,
    Left,
    #[default]
    Right,
}

impl HandFilter {
    pub fn accepts(&self, chirality: Chirality) -> bool {
        match self {
            HandFilter::Either => true,
            HandFilter::Left => chirality == Chirality::Left,
            HandFilter::Right => chirality == Chirality::Right,
        }
    }
}

/// Grip thresholds and push strength
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GripConfig {
    /// Squared wrist-to-fingertip distance below which a finger counts as
    /// curled (skeleton-local units)
    pub curl_threshold: f32,
    /// Squared ball-to-index-tip distance beyond which the ball is out of
    /// reach (origin-space units)
    pub proximity_threshold: f32,
    /// Push force magnitude; zero disables the push
    pub force_magnitude: f32,
    pub force_mode: ForceMode,
    pub hand: HandFilter,
}

impl GripConfig {
    pub const CURL_THRESHOLD: f32 = 0.01;
    pub const PROXIMITY_THRESHOLD: f32 = 0.20;
    pub const CONTINUOUS_FORCE: f32 = 4.0;
    pub const THROW_FORCE: f32 = 300.0;

    /// Single strong push when a grip is detected
    pub fn throw() -> Self {
        Self {
            force_magnitude: Self::THROW_FORCE,
            force_mode: ForceMode::OnGrip,
            ..Self::default()
        }
    }
}

impl Default for GripConfig {
    fn default() -> Self {
        Self {
            curl_threshold: Self::CURL_THRESHOLD,
            proximity_threshold: Self::PROXIMITY_THRESHOLD,
            force_magnitude: Self::CONTINUOUS_FORCE,
            force_mode: ForceMode::Continuous,
            hand: HandFilter::Right,
        }
    }
}

/// Result of one evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GripDecision {
    /// A required joint was missing; nothing changed
    Deferred,
    /// The ball is too far from the fingertip
    OutOfReach,
    /// Within reach but the hand is open
    Released,
    /// Within reach with a closed hand; the ball is held
    Gripping,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GripEvaluation {
    pub decision: GripDecision,
    /// Force handed to the ball this frame, if any
    pub force: Option<Vec3>,
}

impl GripEvaluation {
    fn without_force(decision: GripDecision) -> Self {
        Self { decision, force: None }
    }
}

/// Per-session grip state machine
#[derive(Clone, Debug, Default)]
pub struct GripTracker {
    config: GripConfig,
    gripping: bool,
}

impl GripTracker {
    pub fn new(config: GripConfig) -> Self {
        Self {
            config,
            gripping: false,
        }
    }

    pub fn config(&self) -> &GripConfig {
        &self.config
    }

    pub fn is_gripping(&self) -> bool {
        self.gripping
    }

    /// Forget any grip, e.g. after the ball was removed
    pub fn reset(&mut self) {
        self.set_gripping(false);
    }

    /// Whether poses of this hand should be evaluated
    pub fn wants(&self, chirality: Chirality) -> bool {
        self.config.hand.accepts(chirality)
    }

    /// Decide grip state for one pose and drive the ball accordingly
    pub fn evaluate(&mut self, pose: &HandPose, ball: &mut dyn GrabTarget) -> GripEvaluation {
        let Some(curled) = self.is_curled(pose) else {
            return GripEvaluation::without_force(GripDecision::Deferred);
        };
        let Some(index_tip) = pose.joint_world(JointId::IndexFingerTip) else {
            return GripEvaluation::without_force(GripDecision::Deferred);
        };

        if ball.position().distance_squared(index_tip.translation) > self.config.proximity_threshold {
            if self.gripping {
                ball.set_mode(BodyMode::Dynamic);
            }
            self.set_gripping(false);
            return GripEvaluation::without_force(GripDecision::OutOfReach);
        }

        let decision = if curled {
            self.set_gripping(true);
            ball.set_mode(BodyMode::Static);
            ball.set_transform(index_tip);
            GripDecision::Gripping
        } else {
            self.set_gripping(false);
            ball.set_mode(BodyMode::Dynamic);
            GripDecision::Released
        };

        let push = match self.config.force_mode {
            ForceMode::Continuous => true,
            ForceMode::OnGrip => decision == GripDecision::Gripping,
        };
        let force = (push && self.config.force_magnitude != 0.0).then(|| {
            let force = force_direction(pose) * self.config.force_magnitude;
            ball.apply_force(force);
            force
        });

        GripEvaluation { decision, force }
    }

    /// All four fingertips close to the wrist, or None if a joint is missing
    fn is_curled(&self, pose: &HandPose) -> Option<bool> {
        let wrist = pose.joint_local(JointId::Wrist)?.translation;
        pose.joint_local(JointId::ThumbIntermediateTip)?;

        let mut curled = true;
        for tip in JointId::FINGERTIPS {
            let tip = pose.joint_local(tip)?.translation;
            curled &= wrist.distance_squared(tip) < self.config.curl_threshold;
        }
        Some(curled)
    }

    fn set_gripping(&mut self, gripping: bool) {
        if gripping != self.gripping {
            log::debug!("Grip {}", if gripping { "engaged" } else { "released" });
        }
        self.gripping = gripping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandSkeleton;
    use throwball_math::{Quat, RigidTransform};
    use throwball_physics::RigidBody;

    /// Skeleton whose four fingertips sit `reach` from the wrist along +Z
    fn skeleton(reach: [f32; 4]) -> HandSkeleton {
        let mut skeleton = HandSkeleton::new()
            .with_joint(JointId::Wrist, RigidTransform::IDENTITY)
            .with_joint(JointId::ThumbIntermediateTip, RigidTransform::from_translation(Vec3::new(0.02, 0.0, 0.03)));
        for (i, (tip, distance)) in JointId::FINGERTIPS.iter().zip(reach).enumerate() {
            let offset = Vec3::new(i as f32 * 0.001, 0.0, distance);
            skeleton.set_joint(*tip, RigidTransform::from_translation(offset));
        }
        skeleton
    }

    /// Squared distance `d` from the wrist for every fingertip
    fn hand(chirality: Chirality, anchor: Vec3, squared: f32) -> HandPose {
        HandPose::new(chirality, RigidTransform::from_translation(anchor))
            .with_skeleton(skeleton([squared.sqrt(); 4]))
    }

    fn ball_at(position: Vec3) -> RigidBody {
        RigidBody::new_sphere(position, 0.05)
    }

    fn index_tip(pose: &HandPose) -> Vec3 {
        pose.joint_world(JointId::IndexFingerTip).unwrap().translation
    }

    #[test]
    fn test_fist_near_ball_grips_and_welds() {
        let mut tracker = GripTracker::default();
        let pose = hand(Chirality::Right, Vec3::new(0.0, 1.0, 0.0), 0.005);
        let mut ball = ball_at(index_tip(&pose) + Vec3::new(0.0, 0.03, 0.0));

        let eval = tracker.evaluate(&pose, &mut ball);

        assert_eq!(eval.decision, GripDecision::Gripping);
        assert!(tracker.is_gripping());
        assert_eq!(ball.mode(), BodyMode::Static);
        assert_eq!(ball.position, index_tip(&pose));
    }

    #[test]
    fn test_open_hand_releases() {
        let mut tracker = GripTracker::default();
        let fist = hand(Chirality::Right, Vec3::new(0.0, 1.0, 0.0), 0.005);
        let mut ball = ball_at(index_tip(&fist));
        tracker.evaluate(&fist, &mut ball);
        assert_eq!(ball.mode(), BodyMode::Static);

        let open = hand(Chirality::Right, Vec3::new(0.0, 1.0, 0.0), 0.05);
        let before = ball.position;
        let eval = tracker.evaluate(&open, &mut ball);

        assert_eq!(eval.decision, GripDecision::Released);
        assert!(!tracker.is_gripping());
        assert_eq!(ball.mode(), BodyMode::Dynamic);
        assert_eq!(ball.position, before);
    }

    #[test]
    fn test_proximity_takes_precedence() {
        for squared in [0.0, 0.005, 0.009, 0.05, 1.0] {
            let mut tracker = GripTracker::default();
            let pose = hand(Chirality::Right, Vec3::ZERO, squared);
            // 0.5^2 = 0.25 > 0.20
            let mut ball = ball_at(index_tip(&pose) + Vec3::new(0.5, 0.0, 0.0));

            let eval = tracker.evaluate(&pose, &mut ball);

            assert_eq!(eval.decision, GripDecision::OutOfReach);
            assert!(!tracker.is_gripping());
            assert_eq!(ball.mode(), BodyMode::Dynamic);
            assert!(eval.force.is_none());
        }
    }

    #[test]
    fn test_moving_out_of_reach_restores_dynamic() {
        let mut tracker = GripTracker::default();
        let pose = hand(Chirality::Right, Vec3::ZERO, 0.005);
        let mut ball = ball_at(index_tip(&pose));
        tracker.evaluate(&pose, &mut ball);
        assert!(tracker.is_gripping());

        // Hand jumps a meter away while still closed
        let far = hand(Chirality::Right, Vec3::new(1.0, 0.0, 0.0), 0.005);
        let eval = tracker.evaluate(&far, &mut ball);

        assert_eq!(eval.decision, GripDecision::OutOfReach);
        assert!(!tracker.is_gripping());
        assert_eq!(ball.mode(), BodyMode::Dynamic);
    }

    /// Every fingertip exactly 0.0625 from the wrist, squared 0.00390625
    fn exact_fist() -> HandPose {
        let tip = RigidTransform::from_translation(Vec3::new(0.0, 0.0, 0.0625));
        let mut skeleton = HandSkeleton::new()
            .with_joint(JointId::Wrist, RigidTransform::IDENTITY)
            .with_joint(JointId::ThumbIntermediateTip, tip);
        for finger in JointId::FINGERTIPS {
            skeleton.set_joint(finger, tip);
        }
        HandPose::new(Chirality::Right, RigidTransform::IDENTITY).with_skeleton(skeleton)
    }

    #[test]
    fn test_fingertip_on_curl_threshold_is_open() {
        let pose = exact_fist();
        let config = GripConfig {
            curl_threshold: 0.00390625,
            ..GripConfig::default()
        };
        let mut tracker = GripTracker::new(config);
        let mut ball = ball_at(index_tip(&pose));
        assert_eq!(tracker.evaluate(&pose, &mut ball).decision, GripDecision::Released);

        let config = GripConfig {
            curl_threshold: 0.004,
            ..GripConfig::default()
        };
        let mut tracker = GripTracker::new(config);
        assert_eq!(tracker.evaluate(&pose, &mut ball).decision, GripDecision::Gripping);
    }

    #[test]
    fn test_ball_on_proximity_threshold_is_in_reach() {
        let pose = exact_fist();
        // Squared distance to the index tip is exactly 0.25
        let ball_position = index_tip(&pose) + Vec3::new(0.5, 0.0, 0.0);

        let config = GripConfig {
            proximity_threshold: 0.25,
            ..GripConfig::default()
        };
        let mut tracker = GripTracker::new(config);
        let mut ball = ball_at(ball_position);
        assert_eq!(tracker.evaluate(&pose, &mut ball).decision, GripDecision::Gripping);

        let config = GripConfig {
            proximity_threshold: 0.2499,
            ..GripConfig::default()
        };
        let mut tracker = GripTracker::new(config);
        let mut ball = ball_at(ball_position);
        assert_eq!(tracker.evaluate(&pose, &mut ball).decision, GripDecision::OutOfReach);
    }

    #[test]
    fn test_curl_requires_every_finger() {
        for open_finger in 0..4 {
            let mut reach = [0.005_f32.sqrt(); 4];
            reach[open_finger] = 0.01_f32.sqrt() + 1e-3;
            let pose = HandPose::new(Chirality::Right, RigidTransform::IDENTITY).with_skeleton(skeleton(reach));
            let mut tracker = GripTracker::default();
            let mut ball = ball_at(index_tip(&pose));

            let eval = tracker.evaluate(&pose, &mut ball);

            assert_eq!(eval.decision, GripDecision::Released, "finger {} open", open_finger);
            assert_eq!(ball.mode(), BodyMode::Dynamic);
        }
    }

    #[test]
    fn test_thumb_distance_is_irrelevant() {
        let mut skeleton = skeleton([0.005_f32.sqrt(); 4]);
        skeleton.set_joint(JointId::ThumbIntermediateTip, RigidTransform::from_translation(Vec3::new(0.5, 0.0, 0.0)));
        let pose = HandPose::new(Chirality::Right, RigidTransform::IDENTITY).with_skeleton(skeleton);
        let mut tracker = GripTracker::default();
        let mut ball = ball_at(index_tip(&pose));

        assert_eq!(tracker.evaluate(&pose, &mut ball).decision, GripDecision::Gripping);
    }

    #[test]
    fn test_missing_joint_defers_without_change() {
        let mut tracker = GripTracker::default();
        let fist = hand(Chirality::Right, Vec3::ZERO, 0.005);
        let mut ball = ball_at(index_tip(&fist));
        tracker.evaluate(&fist, &mut ball);
        let held_at = ball.position;

        for missing in [
            JointId::Wrist,
            JointId::ThumbIntermediateTip,
            JointId::IndexFingerTip,
            JointId::MiddleFingerTip,
            JointId::RingFingerTip,
            JointId::LittleFingerTip,
        ] {
            let mut skeleton = skeleton([0.05_f32.sqrt(); 4]);
            skeleton.remove_joint(missing);
            let pose = HandPose::new(Chirality::Right, RigidTransform::from_translation(Vec3::X))
                .with_skeleton(skeleton);

            let eval = tracker.evaluate(&pose, &mut ball);

            assert_eq!(eval.decision, GripDecision::Deferred);
            assert!(tracker.is_gripping());
            assert_eq!(ball.mode(), BodyMode::Static);
            assert_eq!(ball.position, held_at);
        }

        let no_skeleton = HandPose::new(Chirality::Right, RigidTransform::IDENTITY);
        assert_eq!(tracker.evaluate(&no_skeleton, &mut ball).decision, GripDecision::Deferred);
    }

    #[test]
    fn test_continuous_force_on_open_hand() {
        let mut tracker = GripTracker::default();
        let pose = hand(Chirality::Right, Vec3::ZERO, 0.05);
        let mut ball = ball_at(index_tip(&pose));

        let eval = tracker.evaluate(&pose, &mut ball);

        assert_eq!(eval.force, Some(Vec3::new(-4.0, 0.0, 0.0)));
        assert_eq!(ball.accumulated_force(), Vec3::new(-4.0, 0.0, 0.0));
    }

    #[test]
    fn test_force_ignored_while_held() {
        let mut tracker = GripTracker::default();
        let pose = hand(Chirality::Left, Vec3::ZERO, 0.005);
        let mut ball = ball_at(index_tip(&pose));

        let eval = tracker.evaluate(&pose, &mut ball);

        // Computed and handed over, but the ball is static by then
        assert_eq!(eval.force, Some(Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(ball.accumulated_force(), Vec3::ZERO);
    }

    #[test]
    fn test_on_grip_mode_only_pushes_on_grip() {
        let mut tracker = GripTracker::new(GripConfig::throw());
        let open = hand(Chirality::Right, Vec3::ZERO, 0.05);
        let mut ball = ball_at(index_tip(&open));
        assert!(tracker.evaluate(&open, &mut ball).force.is_none());

        let rotation = Quat::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        let fist = HandPose::new(Chirality::Right, RigidTransform::from_rotation(rotation))
            .with_skeleton(skeleton([0.005_f32.sqrt(); 4]));
        let force = tracker.evaluate(&fist, &mut ball).force.unwrap();
        assert!((force - Vec3::new(0.0, 0.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_zero_magnitude_disables_force() {
        let config = GripConfig {
            force_magnitude: 0.0,
            ..GripConfig::default()
        };
        let mut tracker = GripTracker::new(config);
        let pose = hand(Chirality::Right, Vec3::ZERO, 0.05);
        let mut ball = ball_at(index_tip(&pose));

        assert!(tracker.evaluate(&pose, &mut ball).force.is_none());
        assert_eq!(ball.accumulated_force(), Vec3::ZERO);
    }

    #[test]
    fn test_hand_filter() {
        assert!(HandFilter::Right.accepts(Chirality::Right));
        assert!(!HandFilter::Right.accepts(Chirality::Left));
        assert!(HandFilter::Either.accepts(Chirality::Left));
        assert!(!GripTracker::default().wants(Chirality::Left));
    }
}
