//! One-shot directive mover
//!
//! `nudge <left|right|up|down> <distance_cm> [config.toml]`
//!
//! Puts the vehicle into guided mode, translates the directive into a
//! distance-based velocity command and emits it open-loop for the full
//! transit duration. Useful for link checks and repositioning without the
//! vision pipeline.

use avataran_nav::{AvataranConfig, NavError, Result};
use drishti_core::{translate_distance, GuidanceAction};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vyoma_link::{
    FlightMode, LinkMessage, MonotonicClock, SerialTransport, Vehicle, VelocityActuator,
};

fn usage() -> ! {
    eprintln!("usage: nudge <left|right|up|down> <distance_cm> [config.toml]");
    std::process::exit(2);
}

fn parse_direction(arg: &str) -> Option<GuidanceAction> {
    match arg {
        "left" => Some(GuidanceAction::MoveLeft),
        "right" => Some(GuidanceAction::MoveRight),
        "up" => Some(GuidanceAction::MoveUp),
        "down" => Some(GuidanceAction::MoveDown),
        _ => None,
    }
}

fn run(action: GuidanceAction, distance_cm: f32, config: AvataranConfig) -> Result<()> {
    let cmd = translate_distance(action, distance_cm, config.guidance.speed_mps)?;
    let actuator = VelocityActuator::new(config.guidance.tick_hz)?;

    let stop = Arc::new(AtomicBool::new(false));
    let r = Arc::clone(&stop);
    ctrlc::set_handler(move || r.store(true, Ordering::Relaxed))
        .map_err(|e| NavError::Config(format!("failed to set signal handler: {}", e)))?;

    log::info!("Connecting to {} at {} baud", config.link.port, config.link.baud);
    let transport = SerialTransport::open(&config.link.port, config.link.baud)?;
    let mut vehicle = Vehicle::new(transport);

    let clock = MonotonicClock;
    vehicle.send(&LinkMessage::Heartbeat)?;
    vehicle.ensure_mode(
        FlightMode::Guided,
        Duration::from_millis(config.link.mode_settle_ms),
        &clock,
    )?;

    log::info!(
        "Moving {} {} cm at {} m/s ({:.1} s)",
        action.label(),
        distance_cm,
        config.guidance.speed_mps,
        cmd.duration_sec
    );
    let report = actuator.run(&mut vehicle, &cmd, &stop, &clock);

    // Bring the vehicle back to a hover before exiting
    vehicle.send_velocity(0.0, 0.0, 0.0)?;

    if report.cancelled {
        log::warn!("Move cancelled after {} setpoints", report.ticks_sent);
    } else {
        log::info!(
            "Move complete: {} setpoints sent, {} failed",
            report.ticks_sent,
            report.ticks_failed
        );
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
    }

    let Some(action) = parse_direction(&args[1]) else {
        usage();
    };
    let Ok(distance_cm) = args[2].parse::<f32>() else {
        usage();
    };

    let config = if let Some(path) = args.get(3) {
        match AvataranConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Fatal: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        AvataranConfig::default()
    };

    if let Err(e) = run(action, distance_cm, config) {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
