//! Detection and adjustment tracking for physical control elements.
//!
//! This crate turns per-frame detector output into a stable set of knobs and
//! faders, follows how a user turns them, and reports when every element has
//! reached its target value.
//!
//! # Components
//!
//! - [`ElementRegistry`] - Deduplicated, capacity-bounded element store
//! - [`ValueSmoother`] - Moving average over recent raw values
//! - [`compute_value`] - Contact point to normalized value
//! - [`CompletionTracker`] - Once-only "adjusted" and "all adjusted" edges
//! - [`FrameThrottle`] - Frame skip and minimum interval gates
//! - [`DetectionSession`] - Shared, resettable state for one recording
//! - [`DetectionPipeline`] - Per-frame orchestration with an injected [`Detector`]
//!
//! # Data Flow
//!
//! ```text
//! frame -> Detector -> Detections -> DetectionPipeline
//!     -> ElementRegistry (register / dedupe)
//!     -> compute_value -> ValueSmoother (on contact)
//!     -> CompletionTracker -> EventSink
//! ```
//!
//! # Concurrency
//!
//! [`DetectionSession`] is `Send + Sync`. The pipeline runs on a worker
//! thread while other threads read snapshots or call
//! [`DetectionSession::reset`]. Work started before a reset carries a stale
//! [`SessionEpoch`] and is discarded instead of touching the new session.
//!
//! # Layer 0 Crate
//!
//! No rendering, UI, or platform dependencies. Hosts place visuals by matching
//! on [`control_types::SpatialAnchor`] and keep their own
//! `ElementId -> handle` maps.
//!
//! # Example
//!
//! ```
//! use control_tracker::{DetectionPipeline, EventLog, PassthroughDetector, TrackerConfig};
//! use control_types::{
//!     CandidateElement, ContactCandidate, Detections, FrameObservation, Timestamp, TrackerEvent,
//! };
//! use nalgebra::Point3;
//!
//! let config = TrackerConfig::default().unthrottled().with_max_element_count(4);
//! let mut pipeline = DetectionPipeline::new(config, PassthroughDetector, EventLog::new());
//!
//! // A knob and a fader near the reference (kinds alternate by index).
//! let detections = Detections::new()
//!     .with_element(CandidateElement::unclassified(Point3::new(0.0, 0.0, 0.1)))
//!     .with_element(CandidateElement::unclassified(Point3::new(0.0, 0.0, 0.2)));
//! let frame = FrameObservation::new(Timestamp::from_secs_f64(0.0), detections)
//!     .with_reference_position(Point3::origin());
//! pipeline.on_observation(&frame);
//!
//! // Touch the fader at its midpoint: value 0.5 equals the default target.
//! let touch = Detections::new().with_contact(ContactCandidate::new(Point3::new(0.0, 0.0, 0.2), 1.0));
//! pipeline.on_observation(&FrameObservation::new(Timestamp::from_secs_f64(0.1), touch));
//!
//! let adjusted = pipeline
//!     .sink()
//!     .events()
//!     .iter()
//!     .filter(|e| matches!(e, TrackerEvent::ElementAdjusted(_)))
//!     .count();
//! assert_eq!(adjusted, 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod completion;
mod config;
mod error;
mod mapping;
mod pipeline;
mod registry;
mod session;
mod sink;
mod smoother;
mod spatial;
mod throttle;

pub use completion::{CompletionTracker, Observation};
pub use config::{CapacityPolicy, TrackerConfig};
pub use error::{Result, TrackerError};
pub use mapping::{LINEAR_AXIS_LENGTH, compute_value};
pub use pipeline::{
    DetectionPipeline, Detector, FnDetector, FrameReport, PassthroughDetector, SkipReason,
    detector_fn,
};
pub use registry::{ElementRegistry, SessionEpoch, ValueUpdate};
pub use session::{DetectionSession, SessionStats};
pub use sink::{EventLog, EventSink};
pub use smoother::ValueSmoother;
pub use spatial::SpatialKey;
pub use throttle::{FrameThrottle, ThrottleGate};
