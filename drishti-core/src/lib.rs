//! Drishti - vision-to-motion guidance core
//!
//! This library turns the image geometry of a detected fiducial marker into
//! discrete motion decisions for a camera-equipped vehicle:
//!
//! - [`geometry`]: distance-to-marker estimation from apparent pixel width
//!   (pinhole approximation) and marker centroid computation
//! - [`classifier`]: dead-zone classification of the centroid's displacement
//!   from the frame center into a [`GuidanceAction`]
//! - [`translator`]: mapping actions into bounded-duration velocity commands
//!
//! All operations are pure functions of their inputs and the immutable
//! [`CameraCalibration`] constants; no frame-to-frame state is retained.
//! Frame acquisition, marker corner detection and the vehicle link live in
//! separate crates.

pub mod classifier;
pub mod error;
pub mod geometry;
pub mod translator;
pub mod types;

pub use classifier::{classify, Displacement, GuidanceAction};
pub use error::{GuidanceError, Result};
pub use geometry::{estimate, select_primary, MarkerGeometry};
pub use translator::{translate, translate_distance, VelocityCommand};
pub use types::{CameraCalibration, FrameGeometry, MarkerCorners, MarkerObservation, PixelPoint};
