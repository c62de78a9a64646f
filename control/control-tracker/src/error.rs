//! Error types for control-tracker crate.

use thiserror::Error;

/// Errors surfaced by the tracker's configuration layer.
///
/// Frame processing itself never fails: detector failures are reported as
/// events and invalid numbers are clamped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed or serialized.
    #[error("configuration json: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
