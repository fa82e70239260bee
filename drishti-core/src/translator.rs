//! Translation of guidance actions into velocity commands.
//!
//! Directional actions become a fixed-magnitude velocity along one axis of
//! the vehicle's local NED frame: left/right map to -Y/+Y, up/down to
//! -Z/+Z. Classifier-driven commands last one control-loop period since the
//! next frame re-evaluates the decision; explicit "move N centimeters"
//! directives get a duration derived from distance and transit speed.

use crate::classifier::GuidanceAction;
use crate::error::{GuidanceError, Result};

/// A bounded-duration velocity setpoint in the vehicle's local NED frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    /// Velocity along X (forward) in m/s
    pub vx: f32,
    /// Velocity along Y (right) in m/s
    pub vy: f32,
    /// Velocity along Z (down) in m/s
    pub vz: f32,
    /// How long the actuator keeps emitting this setpoint, in seconds
    pub duration_sec: f32,
}

impl VelocityCommand {
    /// Zero-velocity command held for `duration_sec`.
    pub fn stationary(duration_sec: f32) -> Self {
        Self {
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            duration_sec,
        }
    }

    /// Whether all velocity components are zero.
    pub fn is_stationary(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.vz == 0.0
    }
}

/// Unit direction for an actionable classification, or an error for
/// `NoMarker`. `Land` maps to the zero vector.
fn direction(action: GuidanceAction) -> Result<(f32, f32, f32)> {
    match action {
        GuidanceAction::Land => Ok((0.0, 0.0, 0.0)),
        GuidanceAction::MoveLeft => Ok((0.0, -1.0, 0.0)),
        GuidanceAction::MoveRight => Ok((0.0, 1.0, 0.0)),
        GuidanceAction::MoveUp => Ok((0.0, 0.0, -1.0)),
        GuidanceAction::MoveDown => Ok((0.0, 0.0, 1.0)),
        GuidanceAction::NoMarker => Err(GuidanceError::InvalidAction(action)),
    }
}

fn validate_speed(speed_mps: f32) -> Result<()> {
    if speed_mps <= 0.0 {
        return Err(GuidanceError::InvalidParameter(format!(
            "transit speed must be positive, got {} m/s",
            speed_mps
        )));
    }
    Ok(())
}

/// Translate a per-frame classification into a one-tick velocity command.
///
/// `tick_period_sec` is the control-loop period; the classifier runs again
/// on the next frame, so the command never outlives one evaluation. `Land`
/// yields a zero-velocity command: switching the vehicle into its landing
/// mode is the link layer's job, not a velocity to keep flying.
pub fn translate(
    action: GuidanceAction,
    speed_mps: f32,
    tick_period_sec: f32,
) -> Result<VelocityCommand> {
    validate_speed(speed_mps)?;
    let (dx, dy, dz) = direction(action)?;
    Ok(VelocityCommand {
        vx: dx * speed_mps,
        vy: dy * speed_mps,
        vz: dz * speed_mps,
        duration_sec: tick_period_sec,
    })
}

/// Translate an explicit "move N centimeters" directive.
///
/// Duration is `(distance_cm / 100) / speed_mps`, the time a constant
/// `speed_mps` transit needs to cover the distance. Only directional
/// actions are valid directives.
pub fn translate_distance(
    action: GuidanceAction,
    distance_cm: f32,
    speed_mps: f32,
) -> Result<VelocityCommand> {
    validate_speed(speed_mps)?;
    if distance_cm <= 0.0 {
        return Err(GuidanceError::InvalidParameter(format!(
            "move distance must be positive, got {} cm",
            distance_cm
        )));
    }
    if !matches!(
        action,
        GuidanceAction::MoveLeft
            | GuidanceAction::MoveRight
            | GuidanceAction::MoveUp
            | GuidanceAction::MoveDown
    ) {
        return Err(GuidanceError::InvalidAction(action));
    }

    let (dx, dy, dz) = direction(action)?;
    let duration_sec = (distance_cm / 100.0) / speed_mps;
    Ok(VelocityCommand {
        vx: dx * speed_mps,
        vy: dy * speed_mps,
        vz: dz * speed_mps,
        duration_sec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_left_right_are_exact_negations() {
        let left = translate_distance(GuidanceAction::MoveLeft, 500.0, 1.0).unwrap();
        let right = translate_distance(GuidanceAction::MoveRight, 500.0, 1.0).unwrap();
        assert_eq!(left.vx, -right.vx);
        assert_eq!(left.vy, -right.vy);
        assert_eq!(left.vz, -right.vz);
        assert_eq!(left.duration_sec, right.duration_sec);
    }

    #[test]
    fn test_distance_duration() {
        // 500 cm at 1 m/s: 5 seconds, moving along -Y
        let cmd = translate_distance(GuidanceAction::MoveLeft, 500.0, 1.0).unwrap();
        assert_relative_eq!(cmd.duration_sec, 5.0);
        assert_relative_eq!(cmd.vy, -1.0);
        assert_relative_eq!(cmd.vx, 0.0);
        assert_relative_eq!(cmd.vz, 0.0);

        // 50 cm at 2 m/s: 0.25 seconds
        let cmd = translate_distance(GuidanceAction::MoveRight, 50.0, 2.0).unwrap();
        assert_relative_eq!(cmd.duration_sec, 0.25);
        assert_relative_eq!(cmd.vy, 2.0);
    }

    #[test]
    fn test_vertical_axes() {
        let up = translate(GuidanceAction::MoveUp, 1.5, 0.1).unwrap();
        assert_relative_eq!(up.vz, -1.5);
        let down = translate(GuidanceAction::MoveDown, 1.5, 0.1).unwrap();
        assert_relative_eq!(down.vz, 1.5);
    }

    #[test]
    fn test_classifier_command_lasts_one_tick() {
        let cmd = translate(GuidanceAction::MoveRight, 1.0, 0.1).unwrap();
        assert_relative_eq!(cmd.duration_sec, 0.1);
    }

    #[test]
    fn test_land_is_stationary() {
        let cmd = translate(GuidanceAction::Land, 1.0, 0.1).unwrap();
        assert!(cmd.is_stationary());
    }

    #[test]
    fn test_no_marker_rejected() {
        let err = translate(GuidanceAction::NoMarker, 1.0, 0.1).unwrap_err();
        assert_eq!(err, GuidanceError::InvalidAction(GuidanceAction::NoMarker));
    }

    #[test]
    fn test_distance_directive_rejects_land() {
        assert!(translate_distance(GuidanceAction::Land, 100.0, 1.0).is_err());
        assert!(translate_distance(GuidanceAction::NoMarker, 100.0, 1.0).is_err());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(translate(GuidanceAction::MoveLeft, 0.0, 0.1).is_err());
        assert!(translate_distance(GuidanceAction::MoveLeft, -10.0, 1.0).is_err());
    }
}
