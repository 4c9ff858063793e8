//! Throwball - headless session runner
//!
//! Replays a recorded session through the listener threads and frame loop.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use throwball::config::AppConfig;
use throwball::recording::SessionRecording;

#[derive(Parser, Debug)]
#[command(about = "Replay a recorded throwball session", version)]
struct Args {
    /// Recorded session (RON)
    recording: PathBuf,
    /// Directory holding default.toml and user.toml
    #[arg(long, default_value = "config")]
    config: PathBuf,
    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u32>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = AppConfig::load_from(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str())).init();
    log::info!("Starting Throwball");

    let recording = match SessionRecording::load(&args.recording) {
        Ok(recording) => recording,
        Err(e) => {
            log::error!("Failed to load recording {}: {}", args.recording.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let report = throwball::replay(&recording, &config, args.max_frames);
    if !report.started {
        return ExitCode::FAILURE;
    }
    log::info!("Replayed {} frames", report.frames);
    if let Some(spawn) = report.spawn {
        log::info!("Spawn: {:?}", spawn);
    }
    match report.ball {
        Some((position, mode)) => log::info!(
            "Ball at ({:.3}, {:.3}, {:.3}), {:?}",
            position.x,
            position.y,
            position.z,
            mode
        ),
        None => log::info!("No ball in the scene"),
    }
    log::info!(
        "Gripping: {}, releases: {}, last decision: {:?}",
        report.gripping,
        report.releases,
        report.last_decision
    );
    log::info!(
        "Room anchors: {}, skipped meshes: {}",
        report.mesh_anchors,
        report.skipped_meshes
    );

    if report.error_state {
        log::warn!("Session ended in an error state");
    }
    ExitCode::SUCCESS
}
