//! Marker detector collaborator interface
//!
//! Corner detection itself lives outside this crate: a [`MarkerSource`]
//! hands the pipeline the quadrilaterals some upstream detector found in
//! each captured frame. Two implementations ship here, a scripted source
//! for tests and a deterministic simulator for hardware-free runs.

use crate::error::{NavError, Result};
use drishti_core::{FrameGeometry, MarkerCorners, MarkerObservation, PixelPoint};
use std::collections::VecDeque;

/// Produces marker observations, one batch per captured frame
pub trait MarkerSource {
    /// Acquire the next frame and return the markers detected in it
    ///
    /// An empty vector means the frame contained no marker; an error
    /// means the capture itself failed and counts against the session's
    /// acquisition fault budget.
    fn next_frame(&mut self) -> Result<Vec<MarkerObservation>>;
}

/// One scripted frame for [`ScriptedSource`]
#[derive(Debug, Clone)]
pub enum ScriptedFrame {
    /// Frame with the given detections
    Markers(Vec<MarkerObservation>),
    /// Frame with no marker visible
    Empty,
    /// Capture failure
    CaptureFailure,
}

/// Plays back a fixed frame sequence; frames after the script ends are
/// empty
pub struct ScriptedSource {
    frames: VecDeque<ScriptedFrame>,
}

impl ScriptedSource {
    /// Create a source that replays `frames` in order
    pub fn new(frames: Vec<ScriptedFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Frames remaining in the script
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl MarkerSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Vec<MarkerObservation>> {
        match self.frames.pop_front() {
            Some(ScriptedFrame::Markers(observations)) => Ok(observations),
            Some(ScriptedFrame::Empty) | None => Ok(Vec::new()),
            Some(ScriptedFrame::CaptureFailure) => {
                Err(NavError::Acquisition("scripted capture failure".into()))
            }
        }
    }
}

/// Deterministic marker simulator for hardware-free runs
///
/// Starts with the marker offset from the frame center and walks it a
/// fixed fraction of the remaining offset closer every frame, as if the
/// vehicle were answering each corrective nudge. The apparent size stays
/// constant; only the centroid moves.
pub struct MockMarkerSource {
    frame: FrameGeometry,
    /// Current marker center
    position: PixelPoint,
    /// Apparent side length in pixels
    side_px: f32,
    /// Fraction of the remaining offset closed per frame
    approach_rate: f32,
}

impl MockMarkerSource {
    /// Create a simulator starting `offset` pixels from the frame center
    pub fn new(frame: FrameGeometry, offset: PixelPoint, side_px: f32) -> Self {
        let center = frame.center();
        Self {
            frame,
            position: PixelPoint::new(center.x + offset.x, center.y + offset.y),
            side_px,
            approach_rate: 0.25,
        }
    }

    fn corners_at(&self) -> MarkerCorners {
        let half = self.side_px / 2.0;
        [
            PixelPoint::new(self.position.x - half, self.position.y - half),
            PixelPoint::new(self.position.x + half, self.position.y - half),
            PixelPoint::new(self.position.x + half, self.position.y + half),
            PixelPoint::new(self.position.x - half, self.position.y + half),
        ]
    }
}

impl MarkerSource for MockMarkerSource {
    fn next_frame(&mut self) -> Result<Vec<MarkerObservation>> {
        let observation = MarkerObservation::with_id(self.corners_at(), 0);

        // Walk toward the center for the next frame
        let center = self.frame.center();
        self.position.x += (center.x - self.position.x) * self.approach_rate;
        self.position.y += (center.y - self.position.y) * self.approach_rate;

        Ok(vec![observation])
    }
}
