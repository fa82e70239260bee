//! Pinhole distance estimation from marker pixel geometry.
//!
//! Given a marker of known physical width, the distance to the camera
//! follows from the apparent width of its top edge:
//!
//! ```text
//! distance_cm = marker_width_cm * focal_length_px / apparent_width_px
//! ```
//!
//! The focal length is assumed pre-calibrated for the capture resolution.

use crate::error::{GuidanceError, Result};
use crate::types::{CameraCalibration, MarkerCorners, MarkerObservation, PixelPoint};

/// Apparent widths below this are treated as degenerate detections.
const MIN_APPARENT_WIDTH_PX: f32 = 1e-3;

/// Distance and image position derived from one marker observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGeometry {
    /// Estimated camera-to-marker distance in centimeters
    pub distance_cm: f32,
    /// Pixel centroid of the marker quadrilateral
    pub centroid: PixelPoint,
}

/// Estimate distance and centroid for one set of marker corners.
///
/// Fails with [`GuidanceError::DegenerateMarker`] when the two reference
/// corners (nearly) coincide; the caller must skip that observation for
/// the frame rather than divide by zero.
pub fn estimate(corners: &MarkerCorners, calib: &CameraCalibration) -> Result<MarkerGeometry> {
    let apparent_width = corners[0].distance(&corners[1]);
    if apparent_width < MIN_APPARENT_WIDTH_PX {
        return Err(GuidanceError::DegenerateMarker {
            width_px: apparent_width,
        });
    }

    let distance_cm = calib.marker_width_cm * calib.focal_length_px / apparent_width;

    let sx: f32 = corners.iter().map(|c| c.x).sum();
    let sy: f32 = corners.iter().map(|c| c.y).sum();
    let centroid = PixelPoint::new(sx / 4.0, sy / 4.0);

    Ok(MarkerGeometry {
        distance_cm,
        centroid,
    })
}

/// Select the primary observation among all markers detected in one frame.
///
/// When several markers are visible the nearest one wins, i.e. the one with
/// the largest apparent top-edge width; ties resolve to the earliest
/// detector index. Degenerate observations never win the selection.
pub fn select_primary(observations: &[MarkerObservation]) -> Option<&MarkerObservation> {
    let mut best: Option<(&MarkerObservation, f32)> = None;
    for obs in observations {
        let width = obs.apparent_width();
        if width < MIN_APPARENT_WIDTH_PX {
            log::debug!("skipping degenerate observation (width {:.4} px)", width);
            continue;
        }
        match best {
            Some((_, best_width)) if width <= best_width => {}
            _ => best = Some((obs, width)),
        }
    }
    best.map(|(obs, _)| obs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn calib() -> CameraCalibration {
        CameraCalibration::new(17.0, 600.0).unwrap()
    }

    /// Axis-aligned square of side `s` with top-left corner at (x, y)
    fn square(x: f32, y: f32, s: f32) -> MarkerCorners {
        [
            PixelPoint::new(x, y),
            PixelPoint::new(x + s, y),
            PixelPoint::new(x + s, y + s),
            PixelPoint::new(x, y + s),
        ]
    }

    #[test]
    fn test_distance_from_square_side() {
        for s in [10.0, 60.0, 340.0] {
            let geom = estimate(&square(0.0, 0.0, s), &calib()).unwrap();
            assert_relative_eq!(geom.distance_cm, 17.0 * 600.0 / s, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_centroid_of_unit_square() {
        let geom = estimate(&square(0.0, 0.0, 10.0), &calib()).unwrap();
        assert_relative_eq!(geom.centroid.x, 5.0);
        assert_relative_eq!(geom.centroid.y, 5.0);
    }

    #[test]
    fn test_degenerate_marker_rejected() {
        // Reference corners coincide: apparent width is zero
        let corners = [
            PixelPoint::new(100.0, 100.0),
            PixelPoint::new(100.0, 100.0),
            PixelPoint::new(110.0, 110.0),
            PixelPoint::new(100.0, 110.0),
        ];
        let err = estimate(&corners, &calib()).unwrap_err();
        assert!(matches!(err, GuidanceError::DegenerateMarker { .. }));
    }

    #[test]
    fn test_select_primary_prefers_widest() {
        let far = MarkerObservation::with_id(square(0.0, 0.0, 20.0), 7);
        let near = MarkerObservation::with_id(square(300.0, 300.0, 80.0), 3);
        let picked = select_primary(&[far, near]).unwrap();
        assert_eq!(picked.id, Some(3));
    }

    #[test]
    fn test_select_primary_tie_breaks_to_first() {
        let a = MarkerObservation::with_id(square(0.0, 0.0, 50.0), 1);
        let b = MarkerObservation::with_id(square(500.0, 0.0, 50.0), 2);
        let picked = select_primary(&[a, b]).unwrap();
        assert_eq!(picked.id, Some(1));
    }

    #[test]
    fn test_select_primary_skips_degenerate() {
        let degenerate = MarkerObservation::new([PixelPoint::new(5.0, 5.0); 4]);
        let valid = MarkerObservation::with_id(square(0.0, 0.0, 30.0), 9);
        let picked = select_primary(&[degenerate.clone(), valid]).unwrap();
        assert_eq!(picked.id, Some(9));

        assert!(select_primary(&[degenerate]).is_none());
        assert!(select_primary(&[]).is_none());
    }
}
