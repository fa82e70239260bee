//! Inbound frame parsing with start-byte resynchronization

use super::*;
use crate::error::Result;
use crate::transport::Transport;

/// Maximum bytes buffered before the reader gives up on resync and drops
/// the oldest data
const MAX_BUFFER_SIZE: usize = 1024;

/// A validated inbound frame
#[derive(Debug, Clone)]
pub struct RxFrame {
    /// Message ID
    pub msg_id: u8,
    /// Sender system id
    pub system_id: u8,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

/// Decoded vehicle heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// Autopilot-specific flight mode number
    pub custom_mode: u32,
    /// MAV_MODE_FLAG bitfield
    pub base_mode: u8,
    /// MAV_STATE value
    pub system_status: u8,
}

impl RxFrame {
    /// Decode this frame as a vehicle heartbeat, if it is one
    pub fn as_heartbeat(&self) -> Option<Heartbeat> {
        if self.msg_id != MSG_ID_HEARTBEAT || self.payload.len() < HEARTBEAT_PAYLOAD_LEN {
            return None;
        }
        let custom_mode = u32::from_le_bytes(self.payload[0..4].try_into().ok()?);
        Some(Heartbeat {
            custom_mode,
            base_mode: self.payload[6],
            system_status: self.payload[7],
        })
    }
}

/// Streaming frame parser
///
/// Accumulates transport bytes and yields one validated frame per call,
/// resynchronizing on the start byte after garbage or a failed checksum.
pub struct FrameReader {
    buffer: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_BUFFER_SIZE),
        }
    }

    /// Read available bytes from the transport and parse the next frame
    ///
    /// Returns `Ok(None)` when no complete valid frame is buffered yet.
    pub fn read_frame(&mut self, transport: &mut dyn Transport) -> Result<Option<RxFrame>> {
        let mut temp = [0u8; 256];
        let n = transport.read(&mut temp)?;
        if n > 0 {
            self.buffer.extend_from_slice(&temp[..n]);
            if self.buffer.len() > MAX_BUFFER_SIZE {
                let excess = self.buffer.len() - MAX_BUFFER_SIZE;
                self.buffer.drain(..excess);
                log::warn!("frame buffer overflow, dropped {} bytes", excess);
            }
        }
        Ok(self.try_parse())
    }

    fn try_parse(&mut self) -> Option<RxFrame> {
        loop {
            // Resync: drop everything before the next start byte
            let stx_pos = self.buffer.iter().position(|&b| b == STX)?;
            if stx_pos > 0 {
                log::trace!("discarding {} bytes before start byte", stx_pos);
                self.buffer.drain(..stx_pos);
            }

            if self.buffer.len() < MIN_FRAME_SIZE {
                return None;
            }

            let payload_len = self.buffer[1] as usize;
            let frame_len = MIN_FRAME_SIZE + payload_len;
            if self.buffer.len() < frame_len {
                return None;
            }

            let msg_id = self.buffer[5];
            let Some(extra) = crc_extra_for(msg_id) else {
                // Unknown message: its CRC cannot be validated, skip past
                // this start byte and resync
                log::trace!("skipping unknown message id {}", msg_id);
                self.buffer.drain(..1);
                continue;
            };

            let mut crc = CRC_INIT;
            for &b in &self.buffer[1..frame_len - 2] {
                crc = crc_accumulate(b, crc);
            }
            crc = crc_accumulate(extra, crc);

            let received =
                u16::from_le_bytes([self.buffer[frame_len - 2], self.buffer[frame_len - 1]]);
            if crc != received {
                log::debug!(
                    "CRC mismatch on message {}: expected {:#06x}, got {:#06x}",
                    msg_id,
                    crc,
                    received
                );
                self.buffer.drain(..1);
                continue;
            }

            let frame = RxFrame {
                msg_id,
                system_id: self.buffer[3],
                payload: self.buffer[6..6 + payload_len].to_vec(),
            };
            self.buffer.drain(..frame_len);
            return Some(frame);
        }
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}
