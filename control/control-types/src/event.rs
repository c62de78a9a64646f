//! Outbound events emitted by the tracker.

use serde::{Deserialize, Serialize};

use crate::element::ControlElement;
use crate::error::PerceptionError;

/// Something the caller should react to.
///
/// Element payloads are snapshots; holding one does not keep the element alive
/// in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// A new element was registered.
    ElementDetected(ControlElement),
    /// An element reached its target within tolerance. Fired once per element.
    ElementAdjusted(ControlElement),
    /// Every tracked element is adjusted. Fired once per session.
    AllElementsAdjusted,
    /// The registry reached capacity; carries every registered element.
    RegistrationComplete(Vec<ControlElement>),
    /// The perception collaborator failed on a frame.
    DetectionError(PerceptionError),
}

impl TrackerEvent {
    /// Short event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ElementDetected(_) => "element_detected",
            Self::ElementAdjusted(_) => "element_adjusted",
            Self::AllElementsAdjusted => "all_elements_adjusted",
            Self::RegistrationComplete(_) => "registration_complete",
            Self::DetectionError(_) => "detection_error",
        }
    }

    /// Returns the element carried by per-element events.
    #[must_use]
    pub const fn element(&self) -> Option<&ControlElement> {
        match self {
            Self::ElementDetected(element) | Self::ElementAdjusted(element) => Some(element),
            _ => None,
        }
    }
}
