//! Frame simulation system
//!
//! Runs once per frame on the state-owning thread:
//! - Apply every message the listeners delivered, in arrival order
//! - Step physics with a capped delta time
//! - Report whether the scene changed

use throwball_input::GripDecision;

use crate::app::AppState;
use crate::systems::streams::AppMessage;

/// Result of a simulation update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationResult {
    /// Whether any entity moved or changed shape this frame
    pub scene_dirty: bool,
    /// Grip state after this frame
    pub gripping: bool,
    /// Most recent grip decision this frame, if the tracker ran
    pub last_decision: Option<GripDecision>,
}

/// Applies listener messages and steps the world
pub struct SimulationSystem {
    max_dt: f32,
}

impl SimulationSystem {
    /// Longest physics step taken in one frame
    pub const DEFAULT_MAX_DT: f32 = 0.25;

    pub fn new(max_dt: f32) -> Self {
        Self { max_dt }
    }

    /// Run one simulation frame
    pub fn update(
        &mut self,
        state: &mut AppState,
        messages: impl IntoIterator<Item = AppMessage>,
        dt: f32,
    ) -> SimulationResult {
        // 1. Apply listener output
        let mut last_decision = None;
        for message in messages {
            if let Some(decision) = Self::apply(state, message) {
                last_decision = Some(decision);
            }
        }

        // 2. Step world physics
        // Cap dt to prevent a huge step after a stall
        let dt = dt.max(0.0).min(self.max_dt.max(0.0));
        state.world_mut().update(dt);

        // 3. Consume dirty flags
        let world = state.world_mut();
        let scene_dirty = world.has_dirty_entities();
        world.clear_all_dirty();

        SimulationResult {
            scene_dirty,
            gripping: state.is_gripping(),
            last_decision,
        }
    }

    fn apply(state: &mut AppState, message: AppMessage) -> Option<GripDecision> {
        match message {
            AppMessage::Hand(update) => state.handle_hand_update(update).map(|eval| eval.decision),
            AppMessage::Mesh(change) => {
                let outcome = state.handle_mesh_change(change);
                log::trace!("Mesh change: {:?}", outcome);
                None
            }
            AppMessage::MeshSkipped { id, error } => {
                log::debug!("Skipping mesh anchor {}: {}", id, error);
                None
            }
            AppMessage::Session(event) => {
                state.handle_session_event(&event);
                None
            }
        }
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use throwball_core::{AnchorId, MeshAnchorUpdate, MeshGeometry, RigidTransform, Vec3};

    #[test]
    fn test_delta_time_capped() {
        let mut state = AppState::new(&AppConfig::default());
        let mut sim = SimulationSystem::default();

        // A body falling for one capped step moves by g * 0.25 * 0.25
        let body = state
            .world_mut()
            .physics_mut()
            .add_body(throwball_core::RigidBody::new_sphere(Vec3::new(0.0, 10.0, 0.0), 0.05));
        sim.update(&mut state, Vec::new(), 5.0);

        let y = state.world().physics().get_body(body).unwrap().position.y;
        assert!((y - (10.0 - 9.81 * 0.25 * 0.25)).abs() < 1e-4);
    }

    #[test]
    fn test_unusable_max_dt_freezes_instead_of_panicking() {
        for max_dt in [-1.0, f32::NAN] {
            let mut state = AppState::new(&AppConfig::default());
            let mut sim = SimulationSystem::new(max_dt);
            let body = state
                .world_mut()
                .physics_mut()
                .add_body(throwball_core::RigidBody::new_sphere(Vec3::new(0.0, 1.0, 0.0), 0.05));

            sim.update(&mut state, Vec::new(), 0.011);
            sim.update(&mut state, Vec::new(), f32::NAN);

            assert_eq!(state.world().physics().get_body(body).unwrap().position.y, 1.0);
        }
    }

    #[test]
    fn test_mesh_message_marks_scene_dirty() {
        let mut state = AppState::new(&AppConfig::default());
        let mut sim = SimulationSystem::default();

        let change = MeshAnchorUpdate::Added {
            id: AnchorId::new(),
            origin_from_anchor: RigidTransform::IDENTITY,
            geometry: MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Z], vec![[0, 2, 1]]),
        }
        .prepare()
        .unwrap();

        let result = sim.update(&mut state, vec![AppMessage::Mesh(change)], 0.011);
        assert!(result.scene_dirty);
        assert_eq!(state.meshes().len(), 1);

        // Nothing new: scene stays clean
        let result = sim.update(&mut state, Vec::new(), 0.011);
        assert!(!result.scene_dirty);
        assert!(!result.gripping);
    }

    #[test]
    fn test_session_error_keeps_running() {
        let mut state = AppState::new(&AppConfig::default());
        let mut sim = SimulationSystem::default();

        let denied = crate::session::SessionEvent::AuthorizationChanged {
            authorization: crate::session::AuthorizationType::HandTracking,
            status: crate::session::AuthorizationStatus::Denied,
        };
        sim.update(&mut state, vec![AppMessage::Session(denied)], 0.011);
        assert!(state.error_state());

        // Frames still run afterwards
        sim.update(&mut state, Vec::new(), 0.011);
    }
}
