//! Error types for the guidance core

use crate::classifier::GuidanceAction;

/// Result type alias
pub type Result<T> = std::result::Result<T, GuidanceError>;

/// Guidance core error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuidanceError {
    /// Marker corners collapse to a near-zero apparent width; the
    /// observation must be skipped instead of dividing by zero
    #[error("degenerate marker: apparent width {width_px:.3} px")]
    DegenerateMarker {
        /// Apparent top-edge width that failed validation
        width_px: f32,
    },

    /// Action has no velocity-command translation; callers must filter
    /// non-actionable classifications upstream
    #[error("action {0:?} cannot be translated into a velocity command")]
    InvalidAction(GuidanceAction),

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
