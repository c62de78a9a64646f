//! Error types for control-element data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing or parsing control-element data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TypesError {
    /// Unknown element kind name.
    #[error("unknown element kind: {0}")]
    UnknownKind(String),

    /// Unknown element status name.
    #[error("unknown element status: {0}")]
    UnknownStatus(String),

    /// Invalid timestamp (negative or not finite).
    #[error("invalid timestamp: {0} seconds")]
    InvalidTimestamp(f64),
}

impl TypesError {
    /// Creates an unknown kind error.
    #[must_use]
    pub fn unknown_kind(name: impl Into<String>) -> Self {
        Self::UnknownKind(name.into())
    }

    /// Creates an unknown status error.
    #[must_use]
    pub fn unknown_status(name: impl Into<String>) -> Self {
        Self::UnknownStatus(name.into())
    }
}

/// A failure reported by the external perception collaborator for one frame.
///
/// The tracker never retries; the error is forwarded to the caller as a
/// [`TrackerEvent::DetectionError`](crate::TrackerEvent::DetectionError).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PerceptionError {
    /// The detector ran but failed on this frame.
    #[error("detector failed: {0}")]
    DetectorFailed(String),

    /// The frame could not be handed to the detector (e.g. no pixel buffer).
    #[error("frame unavailable: {0}")]
    FrameUnavailable(String),

    /// The detector model could not be loaded.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

impl PerceptionError {
    /// Creates a detector failure.
    #[must_use]
    pub fn detector_failed(reason: impl Into<String>) -> Self {
        Self::DetectorFailed(reason.into())
    }

    /// Creates a frame unavailable error.
    #[must_use]
    pub fn frame_unavailable(reason: impl Into<String>) -> Self {
        Self::FrameUnavailable(reason.into())
    }

    /// Creates a model unavailable error.
    #[must_use]
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable(reason.into())
    }
}

/// Result type for control-element data operations.
pub type Result<T> = std::result::Result<T, TypesError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_unknown_kind() {
        let err = TypesError::unknown_kind("dial");
        assert!(err.to_string().contains("unknown element kind"));
        assert!(err.to_string().contains("dial"));
    }

    #[test]
    fn error_invalid_timestamp() {
        let err = TypesError::InvalidTimestamp(-1.0);
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn perception_error_messages() {
        let err = PerceptionError::detector_failed("request cancelled");
        assert_eq!(err.to_string(), "detector failed: request cancelled");

        let err = PerceptionError::frame_unavailable("no pixel buffer");
        assert!(err.to_string().contains("frame unavailable"));

        let err = PerceptionError::model_unavailable("hand pose");
        assert!(err.to_string().contains("model unavailable"));
    }

    #[test]
    fn perception_error_serde() {
        let err = PerceptionError::detector_failed("timeout");
        let json = serde_json::to_string(&err).unwrap();
        let back: PerceptionError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
