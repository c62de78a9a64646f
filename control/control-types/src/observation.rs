//! Inbound observations produced by the external perception collaborator.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::element::ElementKind;
use crate::error::PerceptionError;
use crate::time::Timestamp;

/// A possible control element seen in one frame.
///
/// `kind` is `None` when the detector does not classify elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateElement {
    /// Detector classification, if any.
    pub kind: Option<ElementKind>,
    /// World-space position.
    pub position: Point3<f64>,
}

impl CandidateElement {
    /// Creates an unclassified candidate.
    #[must_use]
    pub const fn unclassified(position: Point3<f64>) -> Self {
        Self {
            kind: None,
            position,
        }
    }

    /// Creates a candidate with a known kind.
    #[must_use]
    pub const fn classified(kind: ElementKind, position: Point3<f64>) -> Self {
        Self {
            kind: Some(kind),
            position,
        }
    }

    /// Returns `true` if every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

/// A fingertip or hand contact point seen in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCandidate {
    /// World-space contact point.
    pub point: Point3<f64>,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ContactCandidate {
    /// Creates a contact candidate.
    #[must_use]
    pub const fn new(point: Point3<f64>, confidence: f64) -> Self {
        Self { point, confidence }
    }

    /// Returns `true` if the point and confidence are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.confidence.is_finite() && self.point.iter().all(|c| c.is_finite())
    }
}

/// Everything a detector produced for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    /// Candidate control elements, in detector order.
    pub elements: Vec<CandidateElement>,
    /// Candidate contacts, in detector order.
    pub contacts: Vec<ContactCandidate>,
}

impl Detections {
    /// Creates an empty detection set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Adds a candidate element.
    #[must_use]
    pub fn with_element(mut self, candidate: CandidateElement) -> Self {
        self.elements.push(candidate);
        self
    }

    /// Adds a candidate contact.
    #[must_use]
    pub fn with_contact(mut self, contact: ContactCandidate) -> Self {
        self.contacts.push(contact);
        self
    }

    /// Returns `true` if the detector found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.contacts.is_empty()
    }
}

/// One frame as delivered by a host that runs perception itself.
///
/// # Example
///
/// ```
/// use control_types::{CandidateElement, Detections, FrameObservation, Timestamp};
/// use nalgebra::Point3;
///
/// let frame = FrameObservation::new(
///     Timestamp::from_secs_f64(0.5),
///     Detections::new().with_element(CandidateElement::unclassified(Point3::new(0.1, 0.0, 0.0))),
/// )
/// .with_reference_position(Point3::origin());
///
/// assert!(frame.detections.is_ok());
/// assert!(frame.reference_position.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Frame capture time.
    pub timestamp: Timestamp,
    /// Reference position supplied with this frame, if any.
    pub reference_position: Option<Point3<f64>>,
    /// Detector output, or the failure it reported.
    pub detections: Result<Detections, PerceptionError>,
}

impl FrameObservation {
    /// Creates a frame carrying successful detections.
    #[must_use]
    pub const fn new(timestamp: Timestamp, detections: Detections) -> Self {
        Self {
            timestamp,
            reference_position: None,
            detections: Ok(detections),
        }
    }

    /// Creates a frame on which the detector failed.
    #[must_use]
    pub const fn failed(timestamp: Timestamp, error: PerceptionError) -> Self {
        Self {
            timestamp,
            reference_position: None,
            detections: Err(error),
        }
    }

    /// Attaches a reference position.
    #[must_use]
    pub fn with_reference_position(mut self, reference: Point3<f64>) -> Self {
        self.reference_position = Some(reference);
        self
    }
}
