//! Dead-zone classification of marker displacement.
//!
//! The marker centroid's offset from the frame center decides the next
//! motion: inside the dead zone on both axes the vehicle lands, otherwise
//! the dominant axis produces a directional nudge. The priority order is a
//! deliberate tie-break policy: X-axis deviations always win over Y-axis
//! deviations when both exceed the threshold in the same frame.

use crate::types::{FrameGeometry, PixelPoint};

/// Discrete guidance decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidanceAction {
    /// Marker centered within the dead zone: commit to landing
    Land,
    /// Marker left of center: move left (negative Y in the vehicle frame)
    MoveLeft,
    /// Marker right of center: move right (positive Y in the vehicle frame)
    MoveRight,
    /// Marker above center: move up (negative Z in the vehicle frame)
    MoveUp,
    /// Marker below center: move down (positive Z in the vehicle frame)
    MoveDown,
    /// No marker visible this frame; command emission is suppressed
    NoMarker,
}

impl GuidanceAction {
    /// Whether this action translates into a velocity command.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::NoMarker)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::NoMarker => "no_marker",
        }
    }
}

/// Pixel and estimated physical offsets of the marker from frame center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    /// Signed horizontal pixel offset (positive = marker right of center)
    pub delta_x_px: f32,
    /// Signed vertical pixel offset (positive = marker below center)
    pub delta_y_px: f32,
    /// Estimated camera-to-marker distance in centimeters
    pub distance_cm: f32,
    /// Estimated horizontal correction in centimeters
    pub move_x_cm: f32,
    /// Estimated vertical correction in centimeters
    pub move_y_cm: f32,
}

/// Classify a marker centroid into a guidance action.
///
/// The physical move estimates scale the pixel offsets by the estimated
/// distance, a flat-plane approximation rather than a projective inverse:
/// `move_x_cm = (delta_x / frame_width) * distance_cm`, same for Y.
///
/// Decision policy, first match wins:
/// 1. both |deltas| inside `threshold_px` -> [`GuidanceAction::Land`]
/// 2. `delta_x > threshold` -> [`GuidanceAction::MoveRight`]
/// 3. `delta_x < -threshold` -> [`GuidanceAction::MoveLeft`]
/// 4. `delta_y > threshold` -> [`GuidanceAction::MoveDown`]
/// 5. `delta_y < -threshold` -> [`GuidanceAction::MoveUp`]
pub fn classify(
    centroid: PixelPoint,
    frame: &FrameGeometry,
    distance_cm: f32,
    threshold_px: f32,
) -> (GuidanceAction, Displacement) {
    let center = frame.center();
    let delta_x = centroid.x - center.x;
    let delta_y = centroid.y - center.y;

    let displacement = Displacement {
        delta_x_px: delta_x,
        delta_y_px: delta_y,
        distance_cm,
        move_x_cm: (delta_x / frame.width as f32) * distance_cm,
        move_y_cm: (delta_y / frame.height as f32) * distance_cm,
    };

    let action = if delta_x.abs() < threshold_px && delta_y.abs() < threshold_px {
        GuidanceAction::Land
    } else if delta_x > threshold_px {
        GuidanceAction::MoveRight
    } else if delta_x < -threshold_px {
        GuidanceAction::MoveLeft
    } else if delta_y > threshold_px {
        GuidanceAction::MoveDown
    } else if delta_y < -threshold_px {
        GuidanceAction::MoveUp
    } else {
        // Only reachable when a delta sits exactly on the threshold;
        // the closed boundary folds into the dead zone
        GuidanceAction::Land
    };

    (action, displacement)
}
