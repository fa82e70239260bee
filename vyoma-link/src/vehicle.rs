//! Vehicle handle: setpoint dispatch and flight-mode control

use crate::clock::Clock;
use crate::error::{LinkError, Result};
use crate::protocol::{FlightMode, FrameReader, Heartbeat, LinkMessage};
use crate::transport::Transport;
use std::time::Duration;

/// Poll interval while waiting for a mode-change confirmation
const MODE_POLL_INTERVAL_MS: u64 = 50;

/// Handle to the autopilot behind a [`Transport`]
///
/// Owns the transport exclusively: there is exactly one sender per link,
/// so sequence numbering and mode state need no synchronization.
pub struct Vehicle {
    transport: Box<dyn Transport>,
    reader: FrameReader,
    seq: u8,
    last_heartbeat: Option<Heartbeat>,
}

impl Vehicle {
    /// Create a vehicle handle over the given transport
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Box::new(transport),
            reader: FrameReader::new(),
            seq: 0,
            last_heartbeat: None,
        }
    }

    /// Encode and send one message, consuming a sequence number
    pub fn send(&mut self, msg: &LinkMessage) -> Result<()> {
        let frame = msg.encode(self.seq);
        self.seq = self.seq.wrapping_add(1);
        self.transport.write(&frame)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Send one velocity-only setpoint in the local NED frame (m/s)
    pub fn send_velocity(&mut self, vx: f32, vy: f32, vz: f32) -> Result<()> {
        log::trace!("velocity setpoint ({:.2}, {:.2}, {:.2}) m/s", vx, vy, vz);
        self.send(&LinkMessage::VelocityTarget { vx, vy, vz })
    }

    /// Request a flight mode change, without waiting for confirmation
    pub fn request_mode(&mut self, mode: FlightMode) -> Result<()> {
        log::info!("requesting {} mode", mode);
        self.send(&LinkMessage::SetMode(mode))
    }

    /// Drain inbound frames and return the mode reported by the most
    /// recent vehicle heartbeat, if any has arrived yet
    pub fn poll_mode(&mut self) -> Result<Option<FlightMode>> {
        while let Some(frame) = self.reader.read_frame(self.transport.as_mut())? {
            if let Some(hb) = frame.as_heartbeat() {
                self.last_heartbeat = Some(hb);
            }
        }
        Ok(self.current_mode())
    }

    /// Mode from the last seen heartbeat
    pub fn current_mode(&self) -> Option<FlightMode> {
        self.last_heartbeat
            .map(|hb| FlightMode::from_custom_mode(hb.custom_mode))
    }

    /// Put the vehicle into `mode`, waiting up to `settle` for a heartbeat
    /// to confirm the switch
    ///
    /// Failing to confirm within the window is a fatal precondition
    /// ([`LinkError::ModeChange`]); the request is never retried
    /// indefinitely.
    pub fn ensure_mode(
        &mut self,
        mode: FlightMode,
        settle: Duration,
        clock: &dyn Clock,
    ) -> Result<()> {
        if self.poll_mode()? == Some(mode) {
            log::debug!("vehicle already in {} mode", mode);
            return Ok(());
        }

        self.request_mode(mode)?;

        let attempts = (settle.as_millis() as u64 / MODE_POLL_INTERVAL_MS).max(1);
        for attempt in 1..=attempts {
            clock.sleep(Duration::from_millis(MODE_POLL_INTERVAL_MS));
            if self.poll_mode()? == Some(mode) {
                log::info!("vehicle entered {} mode (poll {}/{})", mode, attempt, attempts);
                return Ok(());
            }
        }

        Err(LinkError::ModeChange {
            requested: mode.to_string(),
            settle_ms: settle.as_millis() as u64,
        })
    }
}
