//! Application state and the ball spawner

mod state;

pub use state::{AppState, BallHandle, SpawnOutcome};
