//! Error types for AvataranNav

use thiserror::Error;

/// AvataranNav error type
#[derive(Debug, Error)]
pub enum NavError {
    /// Guidance computation failed
    #[error("guidance error: {0}")]
    Guidance(#[from] drishti_core::GuidanceError),

    /// Vehicle link failed
    #[error("vehicle link error: {0}")]
    Link(#[from] vyoma_link::LinkError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Frame acquisition failed beyond the retry budget
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
