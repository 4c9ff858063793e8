//! Session recordings
//!
//! A recording captures the three input streams of a session, each event
//! stamped with the frame it arrived on, so a session can be replayed
//! without a headset. Recordings are RON files.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use throwball_core::MeshAnchorUpdate;
use throwball_input::HandUpdate;

use crate::session::SessionEvent;

/// An event and the frame it is delivered on
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub frame: u32,
    pub event: T,
}

impl<T> Stamped<T> {
    pub fn new(frame: u32, event: T) -> Self {
        Self { frame, event }
    }
}

/// Everything a session fed into the app
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    pub name: String,
    /// Frame on which the user pressed "spawn ball"
    #[serde(default)]
    pub spawn_frame: Option<u32>,
    #[serde(default)]
    pub hand_updates: Vec<Stamped<HandUpdate>>,
    #[serde(default)]
    pub mesh_updates: Vec<Stamped<MeshAnchorUpdate>>,
    #[serde(default)]
    pub session_events: Vec<Stamped<SessionEvent>>,
}

impl SessionRecording {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a recording from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RecordingError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, RecordingError> {
        let mut recording: Self = ron::from_str(contents)?;
        recording.sort();
        Ok(recording)
    }

    /// Save a recording to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordingError> {
        let pretty = ron::ser::PrettyConfig::new().struct_names(true);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Stable-sort every stream by frame, keeping per-stream order within a frame
    pub fn sort(&mut self) {
        self.hand_updates.sort_by_key(|e| e.frame);
        self.mesh_updates.sort_by_key(|e| e.frame);
        self.session_events.sort_by_key(|e| e.frame);
    }

    /// Last frame on which anything happens
    pub fn last_frame(&self) -> u32 {
        let streams = [
            self.hand_updates.last().map(|e| e.frame),
            self.mesh_updates.last().map(|e| e.frame),
            self.session_events.last().map(|e| e.frame),
            self.spawn_frame,
        ];
        streams.into_iter().flatten().max().unwrap_or(0)
    }
}

/// Error loading or saving a recording
#[derive(Debug)]
pub enum RecordingError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax or shape)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for RecordingError {
    fn from(e: io::Error) -> Self {
        RecordingError::Io(e)
    }
}

impl From<ron::error::SpannedError> for RecordingError {
    fn from(e: ron::error::SpannedError) -> Self {
        RecordingError::Parse(e)
    }
}

impl From<ron::Error> for RecordingError {
    fn from(e: ron::Error) -> Self {
        RecordingError::Serialize(e)
    }
}

impl std::fmt::Display for RecordingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingError::Io(e) => write!(f, "IO error: {}", e),
            RecordingError::Parse(e) => write!(f, "Parse error: {}", e),
            RecordingError::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for RecordingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordingError::Io(e) => Some(e),
            RecordingError::Parse(e) => Some(e),
            RecordingError::Serialize(e) => Some(e),
        }
    }
}
