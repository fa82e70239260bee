//! Error types for VyomaLink

/// Result type alias
pub type Result<T> = std::result::Result<T, LinkError>;

/// Vehicle link error types
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Serial port error
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vehicle did not confirm the requested flight mode within the settle
    /// window; fatal precondition, the guidance session must abort
    #[error("vehicle did not enter {requested} mode within {settle_ms} ms")]
    ModeChange {
        /// Requested flight mode
        requested: String,
        /// Settle window that elapsed without confirmation
        settle_ms: u64,
    },

    /// A single command dispatch failed; the emission loop logs this and
    /// continues with the next tick
    #[error("command dispatch failed: {0}")]
    Dispatch(String),

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
