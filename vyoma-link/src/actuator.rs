//! Open-loop velocity actuation
//!
//! A guidance decision arrives as a bounded-duration [`VelocityCommand`];
//! the actuator expands it into `ceil(duration * tick_hz)` setpoint
//! emissions, one per tick, sleeping a tick period between them. The loop
//! is open-loop by design: no vehicle feedback is consulted mid-command,
//! only the stop flag checked before every tick can cut it short.

use crate::clock::Clock;
use crate::error::{LinkError, Result};
use crate::vehicle::Vehicle;
use drishti_core::VelocityCommand;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Outcome of one emission run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Setpoints dispatched successfully
    pub ticks_sent: u32,
    /// Ticks whose dispatch failed (logged, loop continued)
    pub ticks_failed: u32,
    /// Whether the stop flag ended the run before all ticks were emitted
    pub cancelled: bool,
}

impl TickReport {
    /// Whether the run emitted every scheduled tick
    pub fn completed(&self) -> bool {
        !self.cancelled
    }
}

/// Fixed-rate, fixed-duration velocity emitter
#[derive(Debug, Clone, Copy)]
pub struct VelocityActuator {
    tick_hz: f32,
}

impl VelocityActuator {
    /// Create an actuator emitting at `tick_hz` setpoints per second
    pub fn new(tick_hz: f32) -> Result<Self> {
        if tick_hz <= 0.0 {
            return Err(LinkError::InvalidParameter(format!(
                "tick rate must be positive, got {} Hz",
                tick_hz
            )));
        }
        Ok(Self { tick_hz })
    }

    /// One control-loop period
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_hz)
    }

    /// One control-loop period in seconds
    pub fn tick_period_sec(&self) -> f32 {
        1.0 / self.tick_hz
    }

    /// Number of emissions a command expands into
    pub fn ticks_for(&self, cmd: &VelocityCommand) -> u32 {
        (cmd.duration_sec * self.tick_hz).ceil() as u32
    }

    /// Emit the command's setpoint once per tick for its full duration
    ///
    /// Blocks the caller for the whole run. A failed dispatch is logged
    /// and counted, never retried within the run; the stop flag is
    /// checked before every tick so an external shutdown aborts promptly
    /// even during a long distance-based move.
    pub fn run(
        &self,
        vehicle: &mut Vehicle,
        cmd: &VelocityCommand,
        stop: &AtomicBool,
        clock: &dyn Clock,
    ) -> TickReport {
        let total_ticks = self.ticks_for(cmd);
        let period = self.tick_period();
        let mut report = TickReport::default();

        log::debug!(
            "emitting ({:.2}, {:.2}, {:.2}) m/s for {} ticks at {:.1} Hz",
            cmd.vx,
            cmd.vy,
            cmd.vz,
            total_ticks,
            self.tick_hz
        );

        for tick in 0..total_ticks {
            if stop.load(Ordering::Relaxed) {
                log::info!(
                    "emission cancelled with {} of {} ticks remaining",
                    total_ticks - tick,
                    total_ticks
                );
                report.cancelled = true;
                break;
            }

            match vehicle.send_velocity(cmd.vx, cmd.vy, cmd.vz) {
                Ok(()) => report.ticks_sent += 1,
                Err(e) => {
                    report.ticks_failed += 1;
                    let e = LinkError::Dispatch(e.to_string());
                    log::warn!("tick {}/{}: {}", tick + 1, total_ticks, e);
                }
            }

            clock.sleep(period);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::protocol::MIN_FRAME_SIZE;
    use crate::protocol::SET_POSITION_TARGET_PAYLOAD_LEN;
    use crate::transport::MockTransport;

    const FRAME_LEN: usize = MIN_FRAME_SIZE + SET_POSITION_TARGET_PAYLOAD_LEN;

    fn command(duration_sec: f32) -> VelocityCommand {
        VelocityCommand {
            vx: 0.0,
            vy: 1.0,
            vz: 0.0,
            duration_sec,
        }
    }

    #[test]
    fn test_emits_ceil_duration_times_rate() {
        let transport = MockTransport::new();
        let mut vehicle = Vehicle::new(transport.clone());
        let actuator = VelocityActuator::new(10.0).unwrap();
        let clock = MockClock::new();
        let stop = AtomicBool::new(false);

        // 0.55 s at 10 Hz: ceil(5.5) = 6 ticks
        let report = actuator.run(&mut vehicle, &command(0.55), &stop, &clock);

        assert_eq!(report.ticks_sent, 6);
        assert_eq!(report.ticks_failed, 0);
        assert!(report.completed());
        assert_eq!(transport.get_written().len(), 6 * FRAME_LEN);
        assert_eq!(clock.sleep_count(), 6);
    }

    #[test]
    fn test_sleeps_one_period_per_tick() {
        let transport = MockTransport::new();
        let mut vehicle = Vehicle::new(transport);
        let actuator = VelocityActuator::new(20.0).unwrap();
        let clock = MockClock::new();
        let stop = AtomicBool::new(false);

        actuator.run(&mut vehicle, &command(0.2), &stop, &clock);

        // 4 ticks of 50 ms each
        assert_eq!(clock.sleep_count(), 4);
        assert_eq!(clock.total_slept(), Duration::from_millis(200));
    }

    #[test]
    fn test_pre_set_stop_flag_emits_nothing() {
        let transport = MockTransport::new();
        let mut vehicle = Vehicle::new(transport.clone());
        let actuator = VelocityActuator::new(10.0).unwrap();
        let stop = AtomicBool::new(true);

        let report = actuator.run(&mut vehicle, &command(5.0), &stop, &MockClock::new());

        assert!(report.cancelled);
        assert_eq!(report.ticks_sent, 0);
        assert!(transport.get_written().is_empty());
    }

    #[test]
    fn test_mid_run_cancellation() {
        // Clock that raises the stop flag during the third sleep
        struct StoppingClock {
            stop: std::sync::Arc<AtomicBool>,
            sleeps: std::sync::Mutex<u32>,
        }
        impl Clock for StoppingClock {
            fn sleep(&self, _duration: Duration) {
                let mut sleeps = self.sleeps.lock().unwrap();
                *sleeps += 1;
                if *sleeps == 3 {
                    self.stop.store(true, Ordering::Relaxed);
                }
            }
        }

        let transport = MockTransport::new();
        let mut vehicle = Vehicle::new(transport.clone());
        let actuator = VelocityActuator::new(10.0).unwrap();
        let stop = std::sync::Arc::new(AtomicBool::new(false));
        let clock = StoppingClock {
            stop: std::sync::Arc::clone(&stop),
            sleeps: std::sync::Mutex::new(0),
        };

        // 2 s at 10 Hz would be 20 ticks; the flag stops it after 3
        let report = actuator.run(&mut vehicle, &command(2.0), &stop, &clock);

        assert!(report.cancelled);
        assert_eq!(report.ticks_sent, 3);
        assert_eq!(transport.get_written().len(), 3 * FRAME_LEN);
    }

    #[test]
    fn test_failed_dispatch_continues() {
        let transport = MockTransport::new();
        let mut vehicle = Vehicle::new(transport.clone());
        let actuator = VelocityActuator::new(10.0).unwrap();
        let stop = AtomicBool::new(false);

        transport.set_fail_writes(true);
        let report = actuator.run(&mut vehicle, &command(0.3), &stop, &MockClock::new());

        // Every tick failed but the loop ran to completion
        assert_eq!(report.ticks_failed, 3);
        assert_eq!(report.ticks_sent, 0);
        assert!(report.completed());
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(VelocityActuator::new(0.0).is_err());
        assert!(VelocityActuator::new(-5.0).is_err());
    }
}
