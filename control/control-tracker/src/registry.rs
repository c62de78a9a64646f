//! Deduplicated, capacity-bounded store of detected control elements.

use control_types::{ControlElement, ElementId, ElementKind, ElementStatus};
use hashbrown::HashMap;
use nalgebra::Point3;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::TrackerConfig;
use crate::smoother::ValueSmoother;
use crate::spatial::SpatialKey;

/// Generation counter of a registry, bumped by every reset.
///
/// Work that started before a reset carries the old epoch; mutations made
/// with a stale epoch are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    /// Returns the underlying generation number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Result of changing an element's value or target.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueUpdate {
    /// Element after the change.
    pub element: ControlElement,
    /// Status before the change.
    pub previous_status: ElementStatus,
}

impl ValueUpdate {
    /// Returns `true` if this update moved the element into `Adjusted`.
    #[must_use]
    pub fn reached_target(&self) -> bool {
        !self.previous_status.is_adjusted() && self.element.status().is_adjusted()
    }
}

#[derive(Debug)]
struct Entry {
    element: ControlElement,
    smoother: ValueSmoother,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: Vec<Entry>,
    keys: HashMap<SpatialKey, ElementId>,
    reference: Option<Point3<f64>>,
    epoch: SessionEpoch,
    next_id: u64,
    registrations: u64,
}

impl RegistryState {
    fn entry_mut(&mut self, epoch: SessionEpoch, id: ElementId) -> Option<&mut Entry> {
        if epoch != self.epoch {
            return None;
        }
        self.entries.iter_mut().find(|e| e.element.id() == id)
    }
}

/// Thread-safe registry of control elements for one detection session.
///
/// All state sits behind a single mutex. Reads return owned snapshots, so
/// callers never iterate live state.
///
/// # Example
///
/// ```
/// use control_tracker::{ElementRegistry, TrackerConfig};
/// use control_types::ElementKind;
/// use nalgebra::Point3;
///
/// let registry = ElementRegistry::new(&TrackerConfig::default());
///
/// // Nothing registers until a reference position exists.
/// assert!(registry.register(ElementKind::Rotary, Point3::new(0.05, 0.0, 0.0)).is_none());
///
/// registry.set_reference_position(Point3::origin());
/// let id = registry.register(ElementKind::Rotary, Point3::new(0.05, 0.0, 0.0));
/// assert!(id.is_some());
///
/// // Same quantized cell: deduplicated.
/// assert!(registry.register(ElementKind::Linear, Point3::new(0.07, 0.0, 0.0)).is_none());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug)]
pub struct ElementRegistry {
    state: Mutex<RegistryState>,
    max_elements: usize,
    cell_size: f64,
    max_history: usize,
    default_target: f64,
}

impl ElementRegistry {
    /// Creates an empty registry using the capacity, dedupe, and smoothing
    /// parameters of `config`.
    #[must_use]
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_id: 1,
                ..RegistryState::default()
            }),
            max_elements: config.max_element_count.max(1),
            cell_size: config.dedupe_cell_size,
            max_history: config.max_history,
            default_target: config.default_target_value,
        }
    }

    /// Current epoch.
    #[must_use]
    pub fn epoch(&self) -> SessionEpoch {
        self.state.lock().epoch
    }

    /// Sets the reference position new elements are registered against.
    pub fn set_reference_position(&self, reference: Point3<f64>) {
        self.state.lock().reference = Some(reference);
    }

    /// Returns the reference position, if set.
    #[must_use]
    pub fn reference_position(&self) -> Option<Point3<f64>> {
        self.state.lock().reference
    }

    /// Registers a new element in the current epoch.
    ///
    /// See [`register_in`](Self::register_in).
    pub fn register(&self, kind: ElementKind, position: Point3<f64>) -> Option<ElementId> {
        let mut state = self.state.lock();
        let epoch = state.epoch;
        self.register_locked(&mut state, epoch, kind, position)
    }

    /// Registers a new element if the registry is below capacity, no element
    /// occupies the same quantized cell, a reference position is set, and
    /// `epoch` is current.
    ///
    /// Returns `None` (no-op) if any of those conditions fails.
    pub fn register_in(
        &self,
        epoch: SessionEpoch,
        kind: ElementKind,
        position: Point3<f64>,
    ) -> Option<ElementId> {
        let mut state = self.state.lock();
        self.register_locked(&mut state, epoch, kind, position)
    }

    fn register_locked(
        &self,
        state: &mut RegistryState,
        epoch: SessionEpoch,
        kind: ElementKind,
        position: Point3<f64>,
    ) -> Option<ElementId> {
        if epoch != state.epoch {
            return None;
        }
        let reference = state.reference?;
        if state.entries.len() >= self.max_elements {
            return None;
        }
        let key = SpatialKey::quantize(&position, self.cell_size);
        if state.keys.contains_key(&key) {
            return None;
        }

        let id = ElementId::new(state.next_id);
        state.next_id += 1;
        state.registrations += 1;

        let element = ControlElement::new(id, kind, position, self.default_target)
            .with_reference_position(reference);
        state.keys.insert(key, id);
        state.entries.push(Entry {
            element,
            smoother: ValueSmoother::new(self.max_history),
        });

        debug!(
            id = id.as_u64(),
            kind = kind.as_str(),
            x = position.x,
            y = position.y,
            z = position.z,
            count = state.entries.len(),
            "Registered control element"
        );
        Some(id)
    }

    /// Snapshot of one element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<ControlElement> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|e| e.element.id() == id)
            .map(|e| e.element.clone())
    }

    /// Snapshot of every element, in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<ControlElement> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|e| e.element.clone())
            .collect()
    }

    /// Nearest element strictly closer than `radius` to `point`.
    #[must_use]
    pub fn nearest_within(&self, point: &Point3<f64>, radius: f64) -> Option<ControlElement> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .map(|e| (nalgebra::distance(e.element.position(), point), e))
            .filter(|(d, _)| *d < radius)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, e)| e.element.clone())
    }

    /// Pushes a raw value sample through the element's smoother and updates
    /// its current value and status.
    ///
    /// The element becomes `Adjusted` when the smoothed value is strictly
    /// within `tolerance` of the target, otherwise `Adjusting`. Adjusted
    /// elements are frozen: the call returns `None` without touching them, as
    /// it does for unknown IDs and stale epochs.
    pub fn apply_raw_value(
        &self,
        epoch: SessionEpoch,
        id: ElementId,
        raw: f64,
        tolerance: f64,
    ) -> Option<ValueUpdate> {
        let mut state = self.state.lock();
        let entry = state.entry_mut(epoch, id)?;
        let previous_status = entry.element.status();
        if previous_status.is_adjusted() {
            return None;
        }

        let smoothed = entry.smoother.push(raw);
        entry.element.set_current_value(smoothed);
        let next = if entry.element.is_within(tolerance) {
            ElementStatus::Adjusted
        } else {
            ElementStatus::Adjusting
        };
        entry.element.advance_to(next);

        Some(ValueUpdate {
            element: entry.element.clone(),
            previous_status,
        })
    }

    /// Changes an element's target value (clamped to `[0, 1]`).
    ///
    /// An element already under interaction is re-evaluated against the new
    /// target and may become `Adjusted`. Returns `None` for adjusted
    /// elements, unknown IDs, and stale epochs.
    pub fn set_target(
        &self,
        epoch: SessionEpoch,
        id: ElementId,
        target: f64,
        tolerance: f64,
    ) -> Option<ValueUpdate> {
        let mut state = self.state.lock();
        let entry = state.entry_mut(epoch, id)?;
        let previous_status = entry.element.status();
        if previous_status.is_adjusted() {
            return None;
        }

        entry.element.set_target_value(target);
        if previous_status == ElementStatus::Adjusting && entry.element.is_within(tolerance) {
            entry.element.advance_to(ElementStatus::Adjusted);
        }

        Some(ValueUpdate {
            element: entry.element.clone(),
            previous_status,
        })
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` if no elements are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Returns `true` once the registry holds `max_element_count` elements.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.state.lock().entries.len() >= self.max_elements
    }

    /// Registry capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_elements
    }

    /// Total successful registrations since construction, across resets.
    #[must_use]
    pub fn registration_count(&self) -> u64 {
        self.state.lock().registrations
    }

    /// Clears all elements and the reference position, and advances the epoch.
    ///
    /// Element IDs keep increasing across resets. Calling this on an empty
    /// registry leaves it empty.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.keys.clear();
        state.reference = None;
        state.epoch = SessionEpoch(state.epoch.0 + 1);
    }
}
