//! Detection session: the owner of all per-recording state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use control_types::{ControlElement, ElementId, ElementKind, SpatialAnchor};
use nalgebra::Point3;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::completion::{CompletionTracker, Observation};
use crate::config::TrackerConfig;
use crate::registry::{ElementRegistry, SessionEpoch, ValueUpdate};

/// Reference positions closer than this are treated as the same anchor.
const SAME_REFERENCE_EPSILON: f64 = 1e-9;

/// Frame and registration counters for one session object.
///
/// Counters survive [`DetectionSession::reset`]; they describe the lifetime
/// of the session object, not one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    /// Frames handed to the pipeline.
    pub frames_seen: u64,
    /// Frames that passed every gate and reached the detector successfully.
    pub frames_processed: u64,
    /// Frames on which the detector reported a failure.
    pub detector_failures: u64,
    /// Elements registered.
    pub registrations: u64,
    /// Number of resets.
    pub resets: u64,
}

/// Owns the registry, completion tracker, and counters for a recording.
///
/// The session is `Send + Sync` and is usually shared as an
/// `Arc<DetectionSession>`: the pipeline mutates it from a worker thread while
/// a UI thread reads snapshots or calls [`reset`](Self::reset).
///
/// Lock order is completion tracker, then registry.
#[derive(Debug)]
pub struct DetectionSession {
    config: TrackerConfig,
    registry: ElementRegistry,
    tracker: Mutex<CompletionTracker>,
    complete: AtomicBool,
    frames_seen: AtomicU64,
    frames_processed: AtomicU64,
    detector_failures: AtomicU64,
    resets: AtomicU64,
}

impl DetectionSession {
    /// Creates an empty session without a reference position.
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            registry: ElementRegistry::new(&config),
            config,
            tracker: Mutex::new(CompletionTracker::new()),
            complete: AtomicBool::new(false),
            frames_seen: AtomicU64::new(0),
            frames_processed: AtomicU64::new(0),
            detector_failures: AtomicU64::new(0),
            resets: AtomicU64::new(0),
        }
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The element registry. Reads return snapshots.
    #[must_use]
    pub const fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Current epoch; changes on every reset.
    #[must_use]
    pub fn epoch(&self) -> SessionEpoch {
        self.registry.epoch()
    }

    /// Current reference position.
    #[must_use]
    pub fn reference_position(&self) -> Option<Point3<f64>> {
        self.registry.reference_position()
    }

    /// Sets the reference position.
    ///
    /// Re-sending the current reference is a no-op. A different reference
    /// arriving after the session completed starts a fresh session. Non-finite
    /// positions are ignored.
    ///
    /// Returns `true` if the session was reset.
    pub fn set_reference_position(&self, reference: Point3<f64>) -> bool {
        if !reference.iter().all(|c| c.is_finite()) {
            debug!("Ignoring non-finite reference position");
            return false;
        }
        if let Some(current) = self.registry.reference_position()
            && nalgebra::distance(&current, &reference) <= SAME_REFERENCE_EPSILON
        {
            return false;
        }

        let reset = self.is_complete();
        if reset {
            self.reset();
        }
        self.registry.set_reference_position(reference);
        debug!(
            x = reference.x,
            y = reference.y,
            z = reference.z,
            reset,
            "Reference position set"
        );
        reset
    }

    /// Registers an element and starts tracking its completion.
    ///
    /// Returns a snapshot of the new element, or `None` if the registry
    /// declined (capacity, duplicate, no reference, stale epoch).
    pub fn register(
        &self,
        epoch: SessionEpoch,
        kind: ElementKind,
        position: Point3<f64>,
    ) -> Option<ControlElement> {
        let mut tracker = self.tracker.lock();
        let id = self.registry.register_in(epoch, kind, position)?;
        tracker.track(id);
        self.registry.get(id)
    }

    /// Feeds a raw value sample to an element and reports completion edges.
    pub fn apply_value(
        &self,
        epoch: SessionEpoch,
        id: ElementId,
        raw: f64,
    ) -> Option<(ValueUpdate, Observation)> {
        let mut tracker = self.tracker.lock();
        let update = self
            .registry
            .apply_raw_value(epoch, id, raw, self.config.tolerance)?;
        Some(self.observe_update(&mut tracker, update))
    }

    /// Changes an element's target and reports completion edges.
    pub fn set_target(
        &self,
        epoch: SessionEpoch,
        id: ElementId,
        target: f64,
    ) -> Option<(ValueUpdate, Observation)> {
        let mut tracker = self.tracker.lock();
        let update = self
            .registry
            .set_target(epoch, id, target, self.config.tolerance)?;
        Some(self.observe_update(&mut tracker, update))
    }

    // Elements registered straight through the registry are picked up here,
    // so completion always covers the full registry.
    fn observe_update(
        &self,
        tracker: &mut CompletionTracker,
        update: ValueUpdate,
    ) -> (ValueUpdate, Observation) {
        tracker.sync(&self.registry.all());
        let observation = tracker.observe(&update.element);
        if observation.all_just_completed {
            self.complete.store(true, Ordering::SeqCst);
        }
        (update, observation)
    }

    /// Snapshot of all elements.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ControlElement> {
        self.registry.all()
    }

    /// Anchors for a host to render: the reference first, then elements.
    #[must_use]
    pub fn anchors(&self) -> Vec<SpatialAnchor> {
        self.reference_position()
            .map(SpatialAnchor::Reference)
            .into_iter()
            .chain(self.registry.all().iter().map(SpatialAnchor::from))
            .collect()
    }

    /// Returns `true` once every element was adjusted in this session.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    /// Marks the session complete so the next new reference starts over.
    pub fn mark_complete(&self) {
        self.complete.store(true, Ordering::SeqCst);
    }

    /// Discards all elements, the reference position, and completion state.
    ///
    /// Element handles and epochs obtained earlier become stale. Safe to call
    /// from any thread at any time, and repeatedly.
    pub fn reset(&self) {
        let mut tracker = self.tracker.lock();
        let discarded = self.registry.len();
        self.registry.reset();
        tracker.reset();
        self.complete.store(false, Ordering::SeqCst);
        self.resets.fetch_add(1, Ordering::Relaxed);
        info!(discarded, "Detection session reset");
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames_seen: self.frames_seen.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            detector_failures: self.detector_failures.load(Ordering::Relaxed),
            registrations: self.registry.registration_count(),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_frame_seen(&self) {
        self.frames_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_detector_failure(&self) {
        self.detector_failures.fetch_add(1, Ordering::Relaxed);
    }
}
