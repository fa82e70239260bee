//! Configuration loading for AvataranNav

use crate::error::{NavError, Result};
use drishti_core::{CameraCalibration, FrameGeometry};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct AvataranConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub marker: MarkerConfig,
    #[serde(default)]
    pub guidance: GuidanceConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

/// Capture device settings
#[derive(Clone, Debug, Deserialize)]
pub struct CameraConfig {
    /// Frame width in pixels (default: 1280)
    #[serde(default = "default_frame_width")]
    pub width: u32,

    /// Frame height in pixels (default: 720)
    #[serde(default = "default_frame_height")]
    pub height: u32,

    /// Requested capture rate in frames per second (default: 60)
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Detector kind: "mock" for the built-in simulator (default: mock)
    #[serde(default = "default_detector_kind")]
    pub detector: String,
}

/// Marker and camera calibration constants
#[derive(Clone, Debug, Deserialize)]
pub struct MarkerConfig {
    /// Real-world width of the printed marker in cm (default: 17.0)
    #[serde(default = "default_marker_width_cm")]
    pub width_cm: f32,

    /// Pre-calibrated focal length in pixels (default: 600.0)
    #[serde(default = "default_focal_length_px")]
    pub focal_length_px: f32,

    /// Dead-zone half-width around the frame center in pixels
    /// (default: 50.0)
    #[serde(default = "default_center_threshold_px")]
    pub center_threshold_px: f32,
}

/// Guidance loop parameters
#[derive(Clone, Debug, Deserialize)]
pub struct GuidanceConfig {
    /// Transit speed for corrective moves in m/s (default: 1.0)
    #[serde(default = "default_speed_mps")]
    pub speed_mps: f32,

    /// Setpoint emission rate in Hz (default: 10.0)
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f32,
}

/// Vehicle link settings
#[derive(Clone, Debug, Deserialize)]
pub struct LinkConfig {
    /// Autopilot serial port (default: /dev/serial0)
    #[serde(default = "default_link_port")]
    pub port: String,

    /// Baud rate (default: 57600)
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// How long to wait for a flight-mode change to be confirmed, in
    /// milliseconds (default: 2000)
    #[serde(default = "default_mode_settle_ms")]
    pub mode_settle_ms: u64,
}

/// Frame acquisition fault budget
#[derive(Clone, Debug, Deserialize)]
pub struct AcquisitionConfig {
    /// Consecutive capture failures tolerated before the session aborts
    /// (default: 30)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

// Default value functions
fn default_frame_width() -> u32 {
    1280
}
fn default_frame_height() -> u32 {
    720
}
fn default_fps() -> u32 {
    60
}
fn default_detector_kind() -> String {
    "mock".to_string()
}
fn default_marker_width_cm() -> f32 {
    17.0
}
fn default_focal_length_px() -> f32 {
    600.0
}
fn default_center_threshold_px() -> f32 {
    50.0
}
fn default_speed_mps() -> f32 {
    1.0
}
fn default_tick_hz() -> f32 {
    10.0
}
fn default_link_port() -> String {
    "/dev/serial0".to_string()
}
fn default_baud() -> u32 {
    57600
}
fn default_mode_settle_ms() -> u64 {
    2000
}
fn default_max_consecutive_failures() -> u32 {
    30
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: default_frame_width(),
            height: default_frame_height(),
            fps: default_fps(),
            detector: default_detector_kind(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            width_cm: default_marker_width_cm(),
            focal_length_px: default_focal_length_px(),
            center_threshold_px: default_center_threshold_px(),
        }
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            speed_mps: default_speed_mps(),
            tick_hz: default_tick_hz(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: default_link_port(),
            baud: default_baud(),
            mode_settle_ms: default_mode_settle_ms(),
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl Default for AvataranConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            marker: MarkerConfig::default(),
            guidance: GuidanceConfig::default(),
            link: LinkConfig::default(),
            acquisition: AcquisitionConfig::default(),
        }
    }
}

impl AvataranConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("failed to read config file: {}", e)))?;
        let config: AvataranConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Frame geometry derived from the camera section
    pub fn frame_geometry(&self) -> Result<FrameGeometry> {
        Ok(FrameGeometry::new(self.camera.width, self.camera.height)?)
    }

    /// Calibration constants derived from the marker section
    pub fn calibration(&self) -> Result<CameraCalibration> {
        Ok(CameraCalibration::new(
            self.marker.width_cm,
            self.marker.focal_length_px,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_field_camera() {
        let config = AvataranConfig::default();
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.camera.height, 720);
        assert_eq!(config.marker.width_cm, 17.0);
        assert_eq!(config.marker.focal_length_px, 600.0);
        assert_eq!(config.marker.center_threshold_px, 50.0);
        assert_eq!(config.guidance.speed_mps, 1.0);
        assert_eq!(config.link.port, "/dev/serial0");
        assert_eq!(config.link.baud, 57600);
        assert_eq!(config.link.mode_settle_ms, 2000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_content = r#"
[camera]
width = 640
height = 480

[guidance]
speed_mps = 0.5
"#;
        let config: AvataranConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.camera.fps, 60); // default
        assert_eq!(config.guidance.speed_mps, 0.5);
        assert_eq!(config.guidance.tick_hz, 10.0); // default
        assert_eq!(config.marker.width_cm, 17.0); // whole section defaulted
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[link]\nport = \"/dev/ttyUSB0\"\nbaud = 115200\n"
        )
        .unwrap();

        let config = AvataranConfig::load(file.path()).unwrap();
        assert_eq!(config.link.port, "/dev/ttyUSB0");
        assert_eq!(config.link.baud, 115200);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[camera\nwidth = ").unwrap();

        let err = AvataranConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, NavError::Config(_)));
    }

    #[test]
    fn test_derived_geometry() {
        let config = AvataranConfig::default();
        let frame = config.frame_geometry().unwrap();
        assert_eq!(frame.center(), drishti_core::PixelPoint::new(640.0, 360.0));
        assert!(config.calibration().is_ok());
    }
}
