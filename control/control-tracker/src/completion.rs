//! Edge-triggered completion tracking.

use control_types::{ControlElement, ElementId, ElementStatus};
use hashbrown::{HashMap, HashSet};

/// What a single [`CompletionTracker::observe`] call triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observation {
    /// The element transitioned into `Adjusted` on this call.
    pub element_just_adjusted: bool,
    /// Every tracked element is now adjusted and the session latch fired on this call.
    pub all_just_completed: bool,
}

/// Fires "element adjusted" once per element and "all adjusted" once per session.
///
/// The caller assigns the element's status before calling
/// [`observe`](Self::observe); the tracker only detects edges.
///
/// # Example
///
/// ```
/// use control_tracker::CompletionTracker;
/// use control_types::{ControlElement, ElementId, ElementKind, ElementStatus};
/// use nalgebra::Point3;
///
/// let mut knob = ControlElement::new(ElementId::new(1), ElementKind::Rotary, Point3::origin(), 0.5);
/// let mut tracker = CompletionTracker::new();
/// tracker.track(knob.id());
///
/// knob.set_current_value(0.5);
/// knob.advance_to(ElementStatus::Adjusted);
///
/// let first = tracker.observe(&knob);
/// assert!(first.element_just_adjusted);
/// assert!(first.all_just_completed);
///
/// let again = tracker.observe(&knob);
/// assert!(!again.element_just_adjusted);
/// assert!(!again.all_just_completed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    statuses: HashMap<ElementId, ElementStatus>,
    adjusted_fired: HashSet<ElementId>,
    all_fired: bool,
}

impl CompletionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an element in the `Detected` state.
    ///
    /// Tracking an already known element is a no-op.
    pub fn track(&mut self, id: ElementId) {
        self.statuses.entry(id).or_insert(ElementStatus::Detected);
    }

    /// Replaces tracked statuses with those of `elements`, tracking any
    /// element not seen before.
    ///
    /// Fires nothing; the next [`observe`](Self::observe) reports edges
    /// against the synced set.
    pub fn sync(&mut self, elements: &[ControlElement]) {
        for element in elements {
            self.statuses.insert(element.id(), element.status());
        }
    }

    /// Records the element's current status and reports any edges it caused.
    ///
    /// Unknown elements are tracked implicitly. Once the "all adjusted" latch
    /// has fired, observations still update per-element state but never fire
    /// the latch again until [`reset`](Self::reset).
    pub fn observe(&mut self, element: &ControlElement) -> Observation {
        let id = element.id();
        let status = element.status();
        self.statuses.insert(id, status);

        let element_just_adjusted = status.is_adjusted() && self.adjusted_fired.insert(id);

        let all_just_completed = !self.all_fired && self.all_adjusted();
        if all_just_completed {
            self.all_fired = true;
        }

        Observation {
            element_just_adjusted,
            all_just_completed,
        }
    }

    /// Returns `true` if at least one element is tracked and all are adjusted.
    #[must_use]
    pub fn all_adjusted(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.values().all(ElementStatus::is_adjusted)
    }

    /// Returns `true` once the "all adjusted" latch has fired this session.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.all_fired
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.statuses.len()
    }

    /// Number of elements that have fired their adjusted event.
    #[must_use]
    pub fn adjusted_count(&self) -> usize {
        self.adjusted_fired.len()
    }

    /// Forgets all elements and re-arms the latch.
    pub fn reset(&mut self) {
        self.statuses.clear();
        self.adjusted_fired.clear();
        self.all_fired = false;
    }
}
