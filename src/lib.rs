//! Throwball - grab and throw a ball in a reconstructed room
//!
//! The headset streams hand poses, room mesh anchors and session events.
//! Each stream is read on its own listener thread; a single frame loop owns
//! [`app::AppState`] and applies everything the listeners deliver.

pub mod app;
pub mod config;
pub mod recording;
pub mod replay;
pub mod session;
pub mod systems;

pub use app::{AppState, SpawnOutcome};
pub use config::AppConfig;
pub use recording::{RecordingError, SessionRecording, Stamped};
pub use replay::{replay, ReplayReport};
