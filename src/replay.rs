//! Headless replay of a recorded session
//!
//! The three recorded streams are fed through real listener threads, one
//! frame at a time. Each frame waits for exactly the messages it sent, so a
//! replay is deterministic even though the listeners run concurrently.

use std::sync::mpsc::{channel, Sender};
use std::time::Duration;

use throwball_core::{BodyMode, Vec3};
use throwball_input::GripDecision;

use crate::app::{AppState, SpawnOutcome};
use crate::config::AppConfig;
use crate::recording::{SessionRecording, Stamped};
use crate::session::ProviderSupport;
use crate::systems::{AppMessage, SimulationSystem, StreamHub};

/// How long a frame waits for its listener output
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// What happened during a replay
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayReport {
    /// False when the device could not run the experience; nothing was replayed
    pub started: bool,
    pub frames: u32,
    pub spawn: Option<SpawnOutcome>,
    /// Ball position and mode after the last frame
    pub ball: Option<(Vec3, BodyMode)>,
    pub gripping: bool,
    /// Number of Gripping -> Released/OutOfReach transitions
    pub releases: u32,
    pub last_decision: Option<GripDecision>,
    pub mesh_anchors: usize,
    pub skipped_meshes: usize,
    pub error_state: bool,
}

/// Sends one frame's worth of a stream, returning how many were sent
fn send_frame<T: Clone>(frame: u32, events: &[Stamped<T>], cursor: &mut usize, sender: &Sender<T>) -> usize {
    let mut sent = 0;
    while let Some(stamped) = events.get(*cursor).filter(|e| e.frame <= frame) {
        *cursor += 1;
        if sender.send(stamped.event.clone()).is_err() {
            log::warn!("Listener went away before frame {}", frame);
            continue;
        }
        sent += 1;
    }
    sent
}

/// Replay a recording against a fresh app state
///
/// `max_frames` limits how many frames run; by default the replay ends on
/// the recording's last frame.
pub fn replay(recording: &SessionRecording, config: &AppConfig, max_frames: Option<u32>) -> ReplayReport {
    let mut state = AppState::new(config);
    let mut report = ReplayReport::default();
    if !state.start_session(ProviderSupport::from_config(&config.session)) {
        return report;
    }
    report.started = true;

    let mut sim = SimulationSystem::new(config.physics.max_dt);
    let mut hub = StreamHub::new();
    let dt = config.physics.fixed_dt;

    let (hand_tx, hand_rx) = channel();
    let (mesh_tx, mesh_rx) = channel();
    let (session_tx, session_rx) = channel();
    hub.listen_hands(hand_rx);
    hub.listen_meshes(mesh_rx);
    hub.listen_session(session_rx);

    let mut frames = recording.last_frame().saturating_add(1);
    if let Some(max) = max_frames {
        frames = frames.min(max);
    }

    log::info!("Replaying '{}' for {} frames", recording.name, frames);

    let (mut hand_cursor, mut mesh_cursor, mut session_cursor) = (0, 0, 0);

    for frame in 0..frames {
        let expected = send_frame(frame, &recording.hand_updates, &mut hand_cursor, &hand_tx)
            + send_frame(frame, &recording.mesh_updates, &mut mesh_cursor, &mesh_tx)
            + send_frame(frame, &recording.session_events, &mut session_cursor, &session_tx);

        let messages = hub.collect(expected, FRAME_TIMEOUT);
        if messages.len() < expected {
            log::warn!("Frame {}: {} of {} messages arrived", frame, messages.len(), expected);
        }
        report.skipped_meshes += messages
            .iter()
            .filter(|m| matches!(m, AppMessage::MeshSkipped { .. }))
            .count();

        let was_gripping = state.is_gripping();
        let result = sim.update(&mut state, messages, dt);
        if was_gripping && !result.gripping {
            report.releases += 1;
        }
        if result.last_decision.is_some() {
            report.last_decision = result.last_decision;
        }

        if frame == 0 {
            state.immersive_space_appeared();
        }
        if recording.spawn_frame == Some(frame) {
            let outcome = state.spawn_ball();
            log::info!("Frame {}: spawn requested -> {:?}", frame, outcome);
            report.spawn = Some(outcome);
        }
    }

    drop((hand_tx, mesh_tx, session_tx));
    let leftover = hub.wait_finished(FRAME_TIMEOUT);
    if !leftover.is_empty() {
        log::debug!("Discarding {} messages past the last frame", leftover.len());
    }

    report.frames = frames;
    report.gripping = state.is_gripping();
    report.ball = state
        .ball_body()
        .and_then(|key| state.world().physics().get_body(key))
        .map(|body| (body.position, body.mode()));
    report.mesh_anchors = state.meshes().len();
    report.error_state = state.error_state();

    state.close_immersive_space();
    report
}
