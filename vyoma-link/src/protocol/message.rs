//! Outbound message definitions and frame encoding

use super::*;

/// Flight modes of the target autopilot (ArduCopter custom mode numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightMode {
    /// Manual attitude control
    Stabilize,
    /// Hold position
    Loiter,
    /// Accept external velocity/position setpoints
    Guided,
    /// Return to launch point
    ReturnToLaunch,
    /// Autonomous descent and disarm
    Land,
    /// Any mode this stack does not name
    Other(u32),
}

impl FlightMode {
    /// The autopilot's custom_mode number for this mode
    pub fn custom_mode(&self) -> u32 {
        match self {
            Self::Stabilize => 0,
            Self::Guided => 4,
            Self::Loiter => 5,
            Self::ReturnToLaunch => 6,
            Self::Land => 9,
            Self::Other(mode) => *mode,
        }
    }

    /// Map a heartbeat's custom_mode number back to a flight mode
    pub fn from_custom_mode(mode: u32) -> Self {
        match mode {
            0 => Self::Stabilize,
            4 => Self::Guided,
            5 => Self::Loiter,
            6 => Self::ReturnToLaunch,
            9 => Self::Land,
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for FlightMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stabilize => write!(f, "STABILIZE"),
            Self::Guided => write!(f, "GUIDED"),
            Self::Loiter => write!(f, "LOITER"),
            Self::ReturnToLaunch => write!(f, "RTL"),
            Self::Land => write!(f, "LAND"),
            Self::Other(mode) => write!(f, "MODE({})", mode),
        }
    }
}

/// Messages this stack sends to the vehicle
#[derive(Debug, Clone)]
pub enum LinkMessage {
    /// Ground-station keep-alive heartbeat
    Heartbeat,
    /// Flight mode change request
    SetMode(FlightMode),
    /// Velocity-only setpoint in the local NED frame (m/s)
    VelocityTarget {
        /// Velocity along north/forward axis
        vx: f32,
        /// Velocity along east/right axis
        vy: f32,
        /// Velocity along down axis
        vz: f32,
    },
}

impl LinkMessage {
    /// Get message ID
    pub fn msg_id(&self) -> u8 {
        match self {
            Self::Heartbeat => MSG_ID_HEARTBEAT,
            Self::SetMode(_) => MSG_ID_SET_MODE,
            Self::VelocityTarget { .. } => MSG_ID_SET_POSITION_TARGET_LOCAL_NED,
        }
    }

    fn crc_extra(&self) -> u8 {
        match self {
            Self::Heartbeat => 50,
            Self::SetMode(_) => 89,
            Self::VelocityTarget { .. } => 143,
        }
    }

    /// Build payload in MAVLink v1 wire order (fields sorted by size)
    fn build_payload(&self) -> Vec<u8> {
        match self {
            Self::Heartbeat => {
                let mut payload = Vec::with_capacity(HEARTBEAT_PAYLOAD_LEN);
                payload.extend_from_slice(&0u32.to_le_bytes()); // custom_mode
                payload.push(MAV_TYPE_GCS);
                payload.push(MAV_AUTOPILOT_INVALID);
                payload.push(0); // base_mode
                payload.push(MAV_STATE_ACTIVE);
                payload.push(MAVLINK_STACK_VERSION);
                payload
            }
            Self::SetMode(mode) => {
                let mut payload = Vec::with_capacity(SET_MODE_PAYLOAD_LEN);
                payload.extend_from_slice(&mode.custom_mode().to_le_bytes());
                payload.push(TARGET_SYSTEM_ID);
                payload.push(MODE_FLAG_CUSTOM_MODE_ENABLED);
                payload
            }
            Self::VelocityTarget { vx, vy, vz } => {
                let mut payload = Vec::with_capacity(SET_POSITION_TARGET_PAYLOAD_LEN);
                payload.extend_from_slice(&0u32.to_le_bytes()); // time_boot_ms
                for _ in 0..3 {
                    payload.extend_from_slice(&0f32.to_le_bytes()); // x, y, z
                }
                payload.extend_from_slice(&vx.to_le_bytes());
                payload.extend_from_slice(&vy.to_le_bytes());
                payload.extend_from_slice(&vz.to_le_bytes());
                for _ in 0..3 {
                    payload.extend_from_slice(&0f32.to_le_bytes()); // afx, afy, afz
                }
                payload.extend_from_slice(&0f32.to_le_bytes()); // yaw
                payload.extend_from_slice(&0f32.to_le_bytes()); // yaw_rate
                payload.extend_from_slice(&TYPE_MASK_VELOCITY_ONLY.to_le_bytes());
                payload.push(TARGET_SYSTEM_ID);
                payload.push(TARGET_COMPONENT_ID);
                payload.push(MAV_FRAME_LOCAL_NED);
                payload
            }
        }
    }

    /// Encode the message into a complete frame with the given sequence
    /// number
    pub fn encode(&self, seq: u8) -> Vec<u8> {
        assemble_frame(
            self.msg_id(),
            self.crc_extra(),
            seq,
            GCS_SYSTEM_ID,
            GCS_COMPONENT_ID,
            &self.build_payload(),
        )
    }
}

/// Assemble one framed message: header, payload, CRC trailer
fn assemble_frame(
    msg_id: u8,
    crc_extra: u8,
    seq: u8,
    system_id: u8,
    component_id: u8,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = Vec::with_capacity(MIN_FRAME_SIZE + payload.len());
    frame.push(STX);
    frame.push(payload.len() as u8);
    frame.push(seq);
    frame.push(system_id);
    frame.push(component_id);
    frame.push(msg_id);
    frame.extend_from_slice(payload);

    let mut crc = CRC_INIT;
    for &b in &frame[1..] {
        crc = crc_accumulate(b, crc);
    }
    crc = crc_accumulate(crc_extra, crc);
    frame.push((crc & 0xFF) as u8);
    frame.push((crc >> 8) as u8);

    frame
}

/// Encode an autopilot-side heartbeat frame reporting `mode`
///
/// Simulation and test support: lets a mock transport stand in for the
/// vehicle's periodic heartbeat stream.
pub fn vehicle_heartbeat_frame(mode: FlightMode, seq: u8) -> Vec<u8> {
    let mut payload = Vec::with_capacity(HEARTBEAT_PAYLOAD_LEN);
    payload.extend_from_slice(&mode.custom_mode().to_le_bytes());
    payload.push(MAV_TYPE_QUADROTOR);
    payload.push(MAV_AUTOPILOT_ARDUPILOTMEGA);
    payload.push(MODE_FLAG_CUSTOM_MODE_ENABLED);
    payload.push(MAV_STATE_ACTIVE);
    payload.push(MAVLINK_STACK_VERSION);

    assemble_frame(
        MSG_ID_HEARTBEAT,
        50,
        seq,
        TARGET_SYSTEM_ID,
        TARGET_COMPONENT_ID,
        &payload,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heartbeat_frame_layout() {
        let frame = LinkMessage::Heartbeat.encode(7);

        assert_eq!(frame.len(), MIN_FRAME_SIZE + HEARTBEAT_PAYLOAD_LEN);
        assert_eq!(frame[0], STX);
        assert_eq!(frame[1], HEARTBEAT_PAYLOAD_LEN as u8);
        assert_eq!(frame[2], 7); // SEQ
        assert_eq!(frame[3], GCS_SYSTEM_ID);
        assert_eq!(frame[4], GCS_COMPONENT_ID);
        assert_eq!(frame[5], MSG_ID_HEARTBEAT);
    }

    #[test]
    fn test_set_mode_payload() {
        let frame = LinkMessage::SetMode(FlightMode::Guided).encode(0);
        let payload = &frame[6..6 + SET_MODE_PAYLOAD_LEN];

        assert_eq!(frame[5], MSG_ID_SET_MODE);
        assert_eq!(u32::from_le_bytes(payload[0..4].try_into().unwrap()), 4);
        assert_eq!(payload[4], TARGET_SYSTEM_ID);
        assert_eq!(payload[5], MODE_FLAG_CUSTOM_MODE_ENABLED);
    }

    #[test]
    fn test_velocity_target_payload() {
        let frame = LinkMessage::VelocityTarget {
            vx: 0.0,
            vy: -1.0,
            vz: 0.5,
        }
        .encode(0);
        let payload = &frame[6..6 + SET_POSITION_TARGET_PAYLOAD_LEN];

        assert_eq!(frame[5], MSG_ID_SET_POSITION_TARGET_LOCAL_NED);
        assert_eq!(payload.len(), 53);

        // Velocity floats sit after time_boot_ms(4) + position(12)
        let vx = f32::from_le_bytes(payload[16..20].try_into().unwrap());
        let vy = f32::from_le_bytes(payload[20..24].try_into().unwrap());
        let vz = f32::from_le_bytes(payload[24..28].try_into().unwrap());
        assert_relative_eq!(vx, 0.0);
        assert_relative_eq!(vy, -1.0);
        assert_relative_eq!(vz, 0.5);

        // Mask and addressing trailer
        let mask = u16::from_le_bytes(payload[48..50].try_into().unwrap());
        assert_eq!(mask, TYPE_MASK_VELOCITY_ONLY);
        assert_eq!(payload[50], TARGET_SYSTEM_ID);
        assert_eq!(payload[51], TARGET_COMPONENT_ID);
        assert_eq!(payload[52], MAV_FRAME_LOCAL_NED);
    }

    #[test]
    fn test_flight_mode_round_trip() {
        for mode in [
            FlightMode::Stabilize,
            FlightMode::Guided,
            FlightMode::Loiter,
            FlightMode::ReturnToLaunch,
            FlightMode::Land,
            FlightMode::Other(17),
        ] {
            assert_eq!(FlightMode::from_custom_mode(mode.custom_mode()), mode);
        }
    }
}
