//! AvataranNav - marker-guided precision landing controller
//!
//! Connects a marker detector collaborator to the vehicle link and runs
//! the per-frame guidance loop: estimate the marker's distance and offset,
//! classify the offset into a motion decision, translate the decision into
//! a bounded velocity command and emit it open-loop. The loop is
//! single-threaded and synchronous; each frame runs to completion
//! (including the blocking actuation) before the next one is considered.

pub mod config;
pub mod detector;
pub mod error;
pub mod pipeline;

pub use config::AvataranConfig;
pub use detector::{MarkerSource, MockMarkerSource, ScriptedFrame, ScriptedSource};
pub use error::{NavError, Result};
pub use pipeline::{FrameOutcome, GuidancePipeline, SessionSummary};
