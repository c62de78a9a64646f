//! Hardware-agnostic control-element types.
//!
//! This crate provides the data model shared by perception hosts and the
//! `control-tracker` crate:
//!
//! # Element Types
//!
//! - [`ControlElement`] - One physical knob or fader with value and status
//! - [`ElementId`] - Identity assigned at first detection
//! - [`ElementKind`] - `Rotary` (potentiometer) or `Linear` (fader)
//! - [`ElementStatus`] - `Detected -> Adjusting -> Adjusted`
//!
//! # Observation Types
//!
//! - [`FrameObservation`] - One frame of detector output with a timestamp
//! - [`Detections`] - Candidate elements and contacts for a frame
//! - [`CandidateElement`] / [`ContactCandidate`] - Individual detections
//! - [`PerceptionError`] - Failure reported by the detector
//!
//! # Outbound Types
//!
//! - [`TrackerEvent`] - Events emitted to the caller
//! - [`SpatialAnchor`] - Tagged anchors for hosts that render the session
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero rendering or platform dependencies**.
//! It can be used in:
//! - AR hosts feeding camera frames
//! - Replay and labeling tools (all types are `serde`-serializable)
//! - Tests that script frames by hand
//!
//! # Coordinate Convention
//!
//! Positions are world-space `nalgebra::Point3<f64>` with **Y up**. The
//! horizontal plane is X/Z, which is where rotary contact angles are measured.
//!
//! # Example
//!
//! ```
//! use control_types::{ControlElement, ElementId, ElementKind, clamp_unit};
//! use nalgebra::Point3;
//!
//! let mut knob = ControlElement::new(
//!     ElementId::new(1),
//!     ElementKind::Rotary,
//!     Point3::new(0.05, 0.0, 0.0),
//!     0.5,
//! );
//!
//! knob.set_current_value(0.48);
//! assert!(knob.is_within(0.05));
//! assert_eq!(clamp_unit(4.0), 1.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod anchor;
mod element;
mod error;
mod event;
mod observation;
mod time;

pub use anchor::SpatialAnchor;
pub use element::{ControlElement, ElementId, ElementKind, ElementStatus, clamp_unit};
pub use error::{PerceptionError, Result, TypesError};
pub use event::TrackerEvent;
pub use observation::{CandidateElement, ContactCandidate, Detections, FrameObservation};
pub use time::{Duration, Timestamp};

// Re-export nalgebra point type for convenience
pub use nalgebra::Point3;
