//! VyomaLink - vehicle link for marker-guided flight
//!
//! This library owns everything between a guidance decision and the
//! autopilot's serial port:
//!
//! - [`transport`]: byte-level I/O abstraction with serial and mock
//!   implementations
//! - [`protocol`]: MAVLink v1 framing for the velocity-setpoint, mode and
//!   heartbeat messages
//! - [`vehicle`]: the vehicle handle - sending setpoints, requesting flight
//!   modes and waiting (bounded) for the autopilot to confirm them
//! - [`actuator`]: the open-loop "drive for N ticks" emission loop
//!
//! Exactly one command is ever in flight: the actuator blocks its caller
//! for the command's full duration and only a stop flag checked between
//! ticks can cut it short.

pub mod actuator;
pub mod clock;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod vehicle;

pub use actuator::{TickReport, VelocityActuator};
pub use clock::{Clock, MockClock, MonotonicClock};
pub use error::{LinkError, Result};
pub use protocol::{vehicle_heartbeat_frame, FlightMode, LinkMessage};
pub use transport::{MockTransport, SerialTransport, Transport};
pub use vehicle::Vehicle;
