//! Per-frame orchestration of detection, registration, and interaction.

use std::marker::PhantomData;
use std::sync::Arc;

use control_types::{
    Detections, ElementKind, FrameObservation, PerceptionError, Timestamp, TrackerEvent,
};
use nalgebra::Point3;
use tracing::{debug, info, trace, warn};

use crate::config::{CapacityPolicy, TrackerConfig};
use crate::mapping::compute_value;
use crate::registry::SessionEpoch;
use crate::session::DetectionSession;
use crate::sink::EventSink;
use crate::throttle::{FrameThrottle, ThrottleGate};

/// External perception collaborator.
///
/// The pipeline calls [`detect`](Self::detect) only for frames that passed
/// the reference and throttle gates.
pub trait Detector {
    /// Raw frame data the detector consumes.
    type Input: ?Sized;

    /// Produces candidate elements and contacts for one frame.
    ///
    /// # Errors
    ///
    /// Returns a [`PerceptionError`] when the frame could not be analyzed.
    /// The pipeline reports it and does not retry.
    fn detect(&mut self, input: &Self::Input) -> Result<Detections, PerceptionError>;
}

/// Adapts a closure into a [`Detector`].
///
/// Built with [`detector_fn`].
pub struct FnDetector<I: ?Sized, F> {
    f: F,
    _input: PhantomData<fn(&I)>,
}

impl<I: ?Sized, F> std::fmt::Debug for FnDetector<I, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDetector").finish_non_exhaustive()
    }
}

/// Wraps `f` as a detector over `I`.
///
/// ```
/// use control_tracker::{Detector, detector_fn};
/// use control_types::{CandidateElement, Detections};
/// use nalgebra::Point3;
///
/// let mut detector = detector_fn(|points: &[Point3<f64>]| {
///     Ok(points
///         .iter()
///         .fold(Detections::new(), |d, p| d.with_element(CandidateElement::unclassified(*p))))
/// });
/// let detections = detector.detect(&[Point3::origin()][..]).unwrap();
/// assert_eq!(detections.elements.len(), 1);
/// ```
pub fn detector_fn<I, F>(f: F) -> FnDetector<I, F>
where
    I: ?Sized,
    F: FnMut(&I) -> Result<Detections, PerceptionError>,
{
    FnDetector {
        f,
        _input: PhantomData,
    }
}

impl<I, F> Detector for FnDetector<I, F>
where
    I: ?Sized,
    F: FnMut(&I) -> Result<Detections, PerceptionError>,
{
    type Input = I;

    fn detect(&mut self, input: &I) -> Result<Detections, PerceptionError> {
        (self.f)(input)
    }
}

/// Detector for hosts that run perception themselves.
///
/// Its input is the detector outcome, which it hands back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDetector;

impl Detector for PassthroughDetector {
    type Input = Result<Detections, PerceptionError>;

    fn detect(&mut self, input: &Self::Input) -> Result<Detections, PerceptionError> {
        input.clone()
    }
}

/// Why a frame was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No reference position has been set for the session.
    NoReference,
    /// A throttle gate rejected the frame.
    Throttled(ThrottleGate),
}

/// Outcome of one [`DetectionPipeline::on_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReport {
    /// The frame was dropped before the detector ran.
    Skipped(SkipReason),
    /// The detector reported an error; no state changed.
    Failed,
    /// The frame was processed.
    Processed {
        /// Elements newly registered from this frame.
        registered: usize,
        /// Contacts that moved an element's value.
        interactions: usize,
    },
}

impl FrameReport {
    /// Returns `true` if the detector ran and succeeded.
    #[must_use]
    pub const fn is_processed(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }
}

/// Drives a [`DetectionSession`] from a stream of frames.
///
/// Per admitted frame: run the detector, register candidates near the
/// reference, apply contacts to the nearest element, emit events, and handle
/// a full registry according to [`CapacityPolicy`].
///
/// # Example
///
/// ```
/// use control_tracker::{DetectionPipeline, EventLog, PassthroughDetector, TrackerConfig};
/// use control_types::{CandidateElement, Detections, FrameObservation, Timestamp};
/// use nalgebra::Point3;
///
/// let config = TrackerConfig::default().unthrottled();
/// let mut pipeline = DetectionPipeline::new(config, PassthroughDetector, EventLog::new());
///
/// let frame = FrameObservation::new(
///     Timestamp::from_secs_f64(0.0),
///     Detections::new().with_element(CandidateElement::unclassified(Point3::new(0.05, 0.0, 0.0))),
/// )
/// .with_reference_position(Point3::origin());
///
/// assert!(pipeline.on_observation(&frame).is_processed());
/// assert_eq!(pipeline.sink().count("element_detected"), 1);
/// ```
#[derive(Debug)]
pub struct DetectionPipeline<D, S> {
    session: Arc<DetectionSession>,
    detector: D,
    sink: S,
    throttle: FrameThrottle,
    announced: Option<SessionEpoch>,
}

impl<D: Detector, S: EventSink> DetectionPipeline<D, S> {
    /// Creates a pipeline with a fresh session.
    pub fn new(config: TrackerConfig, detector: D, sink: S) -> Self {
        Self::with_session(Arc::new(DetectionSession::new(config)), detector, sink)
    }

    /// Creates a pipeline over an existing, possibly shared, session.
    pub fn with_session(session: Arc<DetectionSession>, detector: D, sink: S) -> Self {
        let throttle = FrameThrottle::from_config(session.config());
        Self {
            session,
            detector,
            sink,
            throttle,
            announced: None,
        }
    }

    /// The session this pipeline drives.
    #[must_use]
    pub const fn session(&self) -> &Arc<DetectionSession> {
        &self.session
    }

    /// The event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the event sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Resets the session and the throttle.
    pub fn reset(&mut self) {
        self.session.reset();
        self.throttle.reset();
        self.announced = None;
    }

    /// Processes one frame.
    ///
    /// `reference`, when given, updates the session's reference position
    /// before anything else. Never fails: detector errors are emitted as
    /// [`TrackerEvent::DetectionError`] and reported as
    /// [`FrameReport::Failed`].
    pub fn on_frame(
        &mut self,
        timestamp: Timestamp,
        reference: Option<Point3<f64>>,
        input: &D::Input,
    ) -> FrameReport {
        let session = Arc::clone(&self.session);
        session.record_frame_seen();

        if let Some(reference) = reference {
            session.set_reference_position(reference);
        }
        let epoch = session.epoch();
        let Some(reference) = session.reference_position() else {
            trace!("Skipping frame without reference position");
            return FrameReport::Skipped(SkipReason::NoReference);
        };

        if let Err(gate) = self.throttle.admit(timestamp) {
            trace!(?gate, "Frame throttled");
            return FrameReport::Skipped(SkipReason::Throttled(gate));
        }

        let detections = match self.detector.detect(input) {
            Ok(detections) => detections,
            Err(error) => {
                session.record_detector_failure();
                warn!(%error, "Detector failed on frame");
                self.sink.emit(TrackerEvent::DetectionError(error));
                return FrameReport::Failed;
            }
        };
        session.record_frame_processed();

        let registered = self.register_candidates(&session, epoch, &reference, &detections);
        let interactions = self.apply_contacts(&session, epoch, &detections);
        self.check_capacity(&session, epoch);

        debug!(
            registered,
            interactions,
            elements = session.registry().len(),
            "Frame processed"
        );
        FrameReport::Processed {
            registered,
            interactions,
        }
    }

    fn register_candidates(
        &mut self,
        session: &DetectionSession,
        epoch: SessionEpoch,
        reference: &Point3<f64>,
        detections: &Detections,
    ) -> usize {
        let threshold = session.config().detection_threshold;
        let mut registered = 0;

        for (index, candidate) in detections.elements.iter().enumerate() {
            if !candidate.is_finite() {
                debug!(index, "Dropping non-finite candidate");
                continue;
            }
            let distance = nalgebra::distance(&candidate.position, reference);
            if distance > threshold {
                trace!(index, distance, "Candidate beyond detection threshold");
                continue;
            }

            let kind = candidate
                .kind
                .unwrap_or_else(|| ElementKind::from_ordinal(index));
            if let Some(element) = session.register(epoch, kind, candidate.position) {
                registered += 1;
                self.sink.emit(TrackerEvent::ElementDetected(element));
            }
        }
        registered
    }

    fn apply_contacts(
        &mut self,
        session: &DetectionSession,
        epoch: SessionEpoch,
        detections: &Detections,
    ) -> usize {
        let config = session.config();
        let mut interactions = 0;

        for contact in &detections.contacts {
            if !contact.is_finite() {
                debug!("Dropping non-finite contact");
                continue;
            }
            if contact.confidence < config.min_contact_confidence {
                continue;
            }
            let Some(element) = session
                .registry()
                .nearest_within(&contact.point, config.interaction_radius)
            else {
                continue;
            };

            let raw = compute_value(&element, &contact.point);
            let Some((update, observation)) = session.apply_value(epoch, element.id(), raw) else {
                continue;
            };
            interactions += 1;

            if observation.element_just_adjusted {
                info!(
                    id = update.element.id().as_u64(),
                    value = update.element.current_value(),
                    target = update.element.target_value(),
                    "Element adjusted"
                );
                self.sink.emit(TrackerEvent::ElementAdjusted(update.element));
            }
            if observation.all_just_completed {
                info!("All elements adjusted");
                self.sink.emit(TrackerEvent::AllElementsAdjusted);
            }
        }
        interactions
    }

    fn check_capacity(&mut self, session: &DetectionSession, epoch: SessionEpoch) {
        if session.epoch() != epoch
            || self.announced == Some(epoch)
            || !session.registry().is_full()
        {
            return;
        }

        let snapshot = session.snapshot();
        info!(count = snapshot.len(), "Registration complete");
        self.sink.emit(TrackerEvent::RegistrationComplete(snapshot));

        match session.config().capacity_policy {
            CapacityPolicy::ResetSession => session.reset(),
            CapacityPolicy::RetainElements => self.announced = Some(epoch),
        }
    }
}

impl<S: EventSink> DetectionPipeline<PassthroughDetector, S> {
    /// Processes a frame whose detections were produced by the host.
    pub fn on_observation(&mut self, frame: &FrameObservation) -> FrameReport {
        self.on_frame(frame.timestamp, frame.reference_position, &frame.detections)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use control_types::{CandidateElement, ContactCandidate, ElementStatus};

    use super::*;
    use crate::sink::EventLog;

    type Pipeline = DetectionPipeline<PassthroughDetector, EventLog>;

    fn pipeline(config: TrackerConfig) -> Pipeline {
        DetectionPipeline::new(config, PassthroughDetector, EventLog::new())
    }

    fn frame(secs: f64, detections: Detections) -> FrameObservation {
        FrameObservation::new(Timestamp::from_secs_f64(secs), detections)
            .with_reference_position(Point3::origin())
    }

    fn candidates(points: &[Point3<f64>]) -> Detections {
        points.iter().fold(Detections::new(), |d, p| {
            d.with_element(CandidateElement::unclassified(*p))
        })
    }

    #[test]
    fn no_reference_skips_frame() {
        let mut pipeline = pipeline(TrackerConfig::default().unthrottled());
        let observation = FrameObservation::new(
            Timestamp::zero(),
            candidates(&[Point3::new(0.05, 0.0, 0.0)]),
        );
        assert_eq!(
            pipeline.on_observation(&observation),
            FrameReport::Skipped(SkipReason::NoReference)
        );
        assert!(pipeline.sink().is_empty());
        assert!(pipeline.session().snapshot().is_empty());
    }

    #[test]
    fn kinds_alternate_by_ordinal_unless_classified() {
        let mut pipeline = pipeline(TrackerConfig::default().unthrottled());
        let detections = candidates(&[Point3::new(0.05, 0.0, 0.0), Point3::new(0.15, 0.0, 0.0)])
            .with_element(CandidateElement::classified(
                ElementKind::Linear,
                Point3::new(0.0, 0.0, 0.15),
            ));
        pipeline.on_observation(&frame(0.0, detections));

        let kinds: Vec<_> = pipeline
            .session()
            .snapshot()
            .iter()
            .map(control_types::ControlElement::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Rotary, ElementKind::Linear, ElementKind::Linear]
        );
    }

    #[test]
    fn candidates_beyond_threshold_are_ignored() {
        let mut pipeline = pipeline(TrackerConfig::default().unthrottled());
        let report = pipeline.on_observation(&frame(
            0.0,
            candidates(&[
                Point3::new(0.05, 0.0, 0.0),
                Point3::new(5.0, 5.0, 5.0),
                Point3::new(f64::NAN, 0.0, 0.0),
            ]),
        ));
        assert_eq!(
            report,
            FrameReport::Processed {
                registered: 1,
                interactions: 0
            }
        );
    }

    #[test]
    fn detector_failure_emits_error_and_changes_nothing() {
        let mut pipeline = pipeline(TrackerConfig::default().unthrottled());
        let observation = FrameObservation::failed(
            Timestamp::zero(),
            PerceptionError::detector_failed("no observations"),
        )
        .with_reference_position(Point3::origin());

        assert_eq!(pipeline.on_observation(&observation), FrameReport::Failed);
        assert_eq!(
            pipeline.sink().events(),
            &[TrackerEvent::DetectionError(PerceptionError::detector_failed(
                "no observations"
            ))]
        );
        assert!(pipeline.session().snapshot().is_empty());
        assert_eq!(pipeline.session().stats().detector_failures, 1);
    }

    #[test]
    fn detector_not_called_for_throttled_frames() {
        let mut calls = 0_u32;
        {
            let detector = detector_fn(|_: &()| {
                calls += 1;
                Ok(Detections::new())
            });
            let mut pipeline = DetectionPipeline::new(
                TrackerConfig::default(),
                detector,
                EventLog::new(),
            );
            for i in 0..60 {
                pipeline.on_frame(
                    Timestamp::from_secs_f64(f64::from(i) / 60.0),
                    Some(Point3::origin()),
                    &(),
                );
            }
            assert_eq!(pipeline.session().stats().frames_seen, 60);
        }
        // Calls 10, 30 and 50 pass both gates.
        assert_eq!(calls, 3);
    }

    #[test]
    fn contact_adjusts_nearest_element() {
        let config = TrackerConfig::default()
            .unthrottled()
            .with_max_element_count(3);
        let mut pipeline = pipeline(config);
        pipeline.on_observation(&frame(
            0.0,
            candidates(&[Point3::new(0.1, 0.0, 0.0), Point3::new(0.0, 0.0, 0.2)]),
        ));

        // Fader at (0.0, 0.0, 0.2): contact at the center maps to 0.5 = target.
        let touch = Detections::new().with_contact(ContactCandidate::new(
            Point3::new(0.0, 0.0, 0.21),
            1.0,
        ));
        let report = pipeline.on_observation(&frame(0.1, touch));
        assert_eq!(
            report,
            FrameReport::Processed {
                registered: 0,
                interactions: 1
            }
        );
        let fader = pipeline
            .session()
            .snapshot()
            .into_iter()
            .find(|e| e.kind() == ElementKind::Linear)
            .unwrap();
        assert_eq!(fader.status(), ElementStatus::Adjusted);
        assert_eq!(pipeline.sink().count("element_adjusted"), 1);
        assert_eq!(pipeline.sink().count("all_elements_adjusted"), 0);
    }

    #[test]
    fn low_confidence_contacts_are_ignored() {
        let mut config = TrackerConfig::default().unthrottled();
        config.min_contact_confidence = 0.5;
        let mut pipeline = pipeline(config);
        pipeline.on_observation(&frame(0.0, candidates(&[Point3::new(0.1, 0.0, 0.0)])));

        let touch = Detections::new().with_contact(ContactCandidate::new(
            Point3::new(0.1, 0.0, 0.0),
            0.2,
        ));
        let report = pipeline.on_observation(&frame(0.1, touch));
        assert_eq!(
            report,
            FrameReport::Processed {
                registered: 0,
                interactions: 0
            }
        );
    }

    #[test]
    fn full_registry_resets_by_default() {
        let config = TrackerConfig::default()
            .unthrottled()
            .with_max_element_count(2);
        let mut pipeline = pipeline(config);
        pipeline.on_observation(&frame(
            0.0,
            candidates(&[Point3::new(0.05, 0.0, 0.0), Point3::new(0.15, 0.0, 0.0)]),
        ));

        let events = pipeline.sink().events();
        assert_eq!(events.len(), 3);
        match &events[2] {
            TrackerEvent::RegistrationComplete(elements) => assert_eq!(elements.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(pipeline.session().snapshot().is_empty());
        assert_eq!(pipeline.session().reference_position(), None);
    }

    #[test]
    fn retain_policy_announces_once() {
        let config = TrackerConfig::default()
            .unthrottled()
            .with_max_element_count(1)
            .with_capacity_policy(CapacityPolicy::RetainElements);
        let mut pipeline = pipeline(config);
        for i in 0..5 {
            pipeline.on_observation(&frame(
                f64::from(i),
                candidates(&[Point3::new(0.05, 0.0, 0.0)]),
            ));
        }
        assert_eq!(pipeline.sink().count("registration_complete"), 1);
        assert_eq!(pipeline.session().snapshot().len(), 1);
    }

    #[test]
    fn sink_can_be_drained_between_frames() {
        let mut pipeline = pipeline(TrackerConfig::default().unthrottled());
        pipeline.on_observation(&frame(0.0, candidates(&[Point3::new(0.05, 0.0, 0.0)])));

        let drained = pipeline.sink_mut().drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].name(), "element_detected");
        assert!(pipeline.sink().is_empty());

        pipeline.on_observation(&frame(0.1, candidates(&[Point3::new(0.15, 0.0, 0.0)])));
        assert_eq!(pipeline.sink().len(), 1);
    }

    #[test]
    fn reset_rearms_throttle() {
        let mut pipeline = pipeline(TrackerConfig::default().with_throttle(10.0, 1));
        assert!(pipeline.on_observation(&frame(0.0, Detections::new())).is_processed());
        assert_eq!(
            pipeline.on_observation(&frame(1.0, Detections::new())),
            FrameReport::Skipped(SkipReason::Throttled(ThrottleGate::Interval))
        );
        pipeline.reset();
        assert!(pipeline.on_observation(&frame(2.0, Detections::new())).is_processed());
    }
}
