//! Per-frame guidance pipeline
//!
//! Runs the synchronous vision-to-motion loop: acquire observations,
//! select the primary marker, estimate its geometry, classify the
//! displacement, translate the decision and actuate it. Each frame runs
//! to completion (including the blocking emission) before the next frame
//! is considered, so exactly one velocity command is in flight at any
//! time. No state survives from one frame to the next beyond the
//! acquisition fault counter.

use crate::config::AvataranConfig;
use crate::detector::MarkerSource;
use crate::error::{NavError, Result};
use drishti_core::{
    classify, estimate, select_primary, translate, CameraCalibration, Displacement,
    FrameGeometry, GuidanceAction, GuidanceError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vyoma_link::{Clock, FlightMode, LinkMessage, TickReport, Vehicle, VelocityActuator};

/// What one frame produced
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// No marker visible; command emission suppressed for this frame
    NoMarker,
    /// Frame skipped: capture failed (within budget) or every detection
    /// was degenerate
    Skipped,
    /// A corrective nudge was emitted
    Corrected {
        action: GuidanceAction,
        displacement: Displacement,
        report: TickReport,
    },
    /// Marker centered: landing mode requested, session complete
    Landed { displacement: Displacement },
}

/// Counters for a finished guidance session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSummary {
    /// Frames processed (including empty and skipped ones)
    pub frames: u32,
    /// Velocity setpoints dispatched
    pub setpoints_sent: u32,
    /// Whether the session ended in a landing decision
    pub landed: bool,
}

/// The vision-to-motion guidance loop
pub struct GuidancePipeline<S: MarkerSource> {
    source: S,
    vehicle: Vehicle,
    actuator: VelocityActuator,
    frame: FrameGeometry,
    calib: CameraCalibration,
    threshold_px: f32,
    speed_mps: f32,
    mode_settle: Duration,
    frame_period: Duration,
    stop: Arc<AtomicBool>,
    clock: Box<dyn Clock>,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
}

impl<S: MarkerSource> GuidancePipeline<S> {
    /// Assemble a pipeline from its collaborators and configuration
    pub fn new(
        source: S,
        vehicle: Vehicle,
        config: &AvataranConfig,
        stop: Arc<AtomicBool>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        if config.camera.fps == 0 {
            return Err(NavError::Config("camera fps must be positive".into()));
        }

        Ok(Self {
            source,
            vehicle,
            actuator: VelocityActuator::new(config.guidance.tick_hz)?,
            frame: config.frame_geometry()?,
            calib: config.calibration()?,
            threshold_px: config.marker.center_threshold_px,
            speed_mps: config.guidance.speed_mps,
            mode_settle: Duration::from_millis(config.link.mode_settle_ms),
            frame_period: Duration::from_secs_f32(1.0 / config.camera.fps as f32),
            stop,
            clock,
            consecutive_failures: 0,
            max_consecutive_failures: config.acquisition.max_consecutive_failures,
        })
    }

    /// Run the guidance loop until a landing decision, a stop signal or a
    /// fatal error
    ///
    /// The vehicle must accept external setpoints before any command goes
    /// out, so the guided-mode precondition is established first; failing
    /// it aborts the session.
    pub fn run(&mut self) -> Result<SessionSummary> {
        // Announce ourselves before asserting mode control
        self.vehicle.send(&LinkMessage::Heartbeat)?;
        self.vehicle
            .ensure_mode(FlightMode::Guided, self.mode_settle, self.clock.as_ref())?;

        let mut summary = SessionSummary::default();

        while !self.stop.load(Ordering::Relaxed) {
            let outcome = self.step()?;
            summary.frames += 1;

            match outcome {
                FrameOutcome::Landed { displacement } => {
                    log::info!(
                        "landing at {:.1} cm (residual offset {:.1} cm, {:.1} cm)",
                        displacement.distance_cm,
                        displacement.move_x_cm,
                        displacement.move_y_cm
                    );
                    summary.landed = true;
                    break;
                }
                FrameOutcome::Corrected { report, .. } => {
                    summary.setpoints_sent += report.ticks_sent;
                }
                FrameOutcome::NoMarker | FrameOutcome::Skipped => {
                    // Idle frame: pace to the capture rate
                    self.clock.sleep(self.frame_period);
                }
            }
        }

        if !summary.landed {
            log::info!("guidance session stopped before landing");
        }
        Ok(summary)
    }

    /// Process exactly one frame
    pub fn step(&mut self) -> Result<FrameOutcome> {
        let observations = match self.source.next_frame() {
            Ok(observations) => {
                self.consecutive_failures = 0;
                observations
            }
            Err(e) => return self.register_acquisition_failure(e),
        };

        if observations.is_empty() {
            log::trace!("no marker this frame");
            return Ok(FrameOutcome::NoMarker);
        }

        let Some(primary) = select_primary(&observations) else {
            log::debug!(
                "all {} observations degenerate, skipping frame",
                observations.len()
            );
            return Ok(FrameOutcome::Skipped);
        };

        let geometry = match estimate(&primary.corners, &self.calib) {
            Ok(geometry) => geometry,
            Err(GuidanceError::DegenerateMarker { width_px }) => {
                log::debug!("degenerate marker ({:.4} px wide), skipping frame", width_px);
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        let (action, displacement) = classify(
            geometry.centroid,
            &self.frame,
            geometry.distance_cm,
            self.threshold_px,
        );
        log::debug!(
            "{} at {:.1} cm (dx {:+.0} px, dy {:+.0} px)",
            action.label(),
            displacement.distance_cm,
            displacement.delta_x_px,
            displacement.delta_y_px
        );

        if action == GuidanceAction::Land {
            // Stop lateral motion, then hand control to the landing mode
            self.vehicle.send_velocity(0.0, 0.0, 0.0)?;
            self.vehicle
                .ensure_mode(FlightMode::Land, self.mode_settle, self.clock.as_ref())?;
            return Ok(FrameOutcome::Landed { displacement });
        }

        let cmd = translate(action, self.speed_mps, self.actuator.tick_period_sec())?;
        let report = self
            .actuator
            .run(&mut self.vehicle, &cmd, &self.stop, self.clock.as_ref());

        Ok(FrameOutcome::Corrected {
            action,
            displacement,
            report,
        })
    }

    fn register_acquisition_failure(&mut self, e: NavError) -> Result<FrameOutcome> {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.max_consecutive_failures {
            log::error!(
                "{} consecutive capture failures, aborting: {}",
                self.consecutive_failures,
                e
            );
            return Err(NavError::Acquisition(format!(
                "{} consecutive capture failures (last: {})",
                self.consecutive_failures, e
            )));
        }
        log::debug!(
            "capture failed ({}/{}), skipping frame: {}",
            self.consecutive_failures,
            self.max_consecutive_failures,
            e
        );
        Ok(FrameOutcome::Skipped)
    }
}
