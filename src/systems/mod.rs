//! Application systems
//!
//! Stream listeners run on their own threads; the simulation system runs on
//! the frame loop and is the only code that mutates [`crate::app::AppState`].

pub mod streams;
mod simulation;

pub use simulation::{SimulationResult, SimulationSystem};
pub use streams::{AppMessage, EventSource, Replay, StreamHub, StreamKind};
