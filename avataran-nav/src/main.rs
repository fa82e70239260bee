//! AvataranNav - marker-guided precision landing daemon
//!
//! Runs the guidance loop against the configured marker source and the
//! autopilot serial link until the vehicle lands on the marker or a stop
//! signal arrives. Exit code is 0 on clean shutdown or landing, non-zero
//! when the link cannot be opened, guided mode cannot be entered or frame
//! acquisition fails beyond its budget.

use avataran_nav::{
    AvataranConfig, GuidancePipeline, MockMarkerSource, NavError, Result, SessionSummary,
};
use drishti_core::PixelPoint;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vyoma_link::{MonotonicClock, SerialTransport, Vehicle};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `avataran-nav <path>` (positional)
/// - `avataran-nav --config <path>` (flag-based)
/// - `avataran-nav -c <path>` (short flag)
///
/// Falls back to `avataran.toml` in the working directory when present.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    if Path::new("avataran.toml").exists() {
        return Some("avataran.toml".to_string());
    }

    None
}

fn run() -> Result<SessionSummary> {
    let config = match parse_config_path() {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            AvataranConfig::load(Path::new(&path))?
        }
        None => {
            log::info!("Using default configuration");
            AvataranConfig::default()
        }
    };

    log::info!("AvataranNav v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Frame {}x{} @ {} fps, marker {} cm, dead zone {} px",
        config.camera.width,
        config.camera.height,
        config.camera.fps,
        config.marker.width_cm,
        config.marker.center_threshold_px
    );

    // Shutdown flag, flipped by Ctrl-C and honored between actuator ticks
    let stop = Arc::new(AtomicBool::new(false));
    let r = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(true, Ordering::Relaxed);
    })
    .map_err(|e| NavError::Config(format!("failed to set signal handler: {}", e)))?;

    let source = match config.camera.detector.as_str() {
        "mock" => {
            log::info!("Using mock marker source (simulated detections)");
            MockMarkerSource::new(
                config.frame_geometry()?,
                PixelPoint::new(200.0, -120.0),
                60.0,
            )
        }
        other => {
            return Err(NavError::Config(format!(
                "unknown detector kind '{}' (supported: mock)",
                other
            )));
        }
    };

    log::info!("Connecting to {} at {} baud", config.link.port, config.link.baud);
    let transport = SerialTransport::open(&config.link.port, config.link.baud)?;
    let vehicle = Vehicle::new(transport);

    let mut pipeline = GuidancePipeline::new(
        source,
        vehicle,
        &config,
        Arc::clone(&stop),
        Box::new(MonotonicClock),
    )?;

    pipeline.run()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(summary) => {
            log::info!(
                "Session finished: {} frames, {} setpoints, landed: {}",
                summary.frames,
                summary.setpoints_sent,
                summary.landed
            );
        }
        Err(e) => {
            log::error!("Fatal: {}", e);
            std::process::exit(1);
        }
    }
}
