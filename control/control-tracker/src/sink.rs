//! Event delivery to the caller.

use control_types::TrackerEvent;

/// Receives tracker events as they happen.
///
/// Implemented for any `FnMut(TrackerEvent)` closure, so a host can forward
/// events to a channel or UI queue without a wrapper type:
///
/// ```
/// use std::sync::mpsc;
///
/// use control_tracker::EventSink;
/// use control_types::TrackerEvent;
///
/// let (tx, rx) = mpsc::channel();
/// let mut sink = move |event: TrackerEvent| {
///     // Receiver gone means the host stopped listening.
///     let _ = tx.send(event);
/// };
/// sink.emit(TrackerEvent::AllElementsAdjusted);
/// assert_eq!(rx.recv().unwrap(), TrackerEvent::AllElementsAdjusted);
/// ```
pub trait EventSink {
    /// Delivers one event.
    fn emit(&mut self, event: TrackerEvent);
}

impl<F> EventSink for F
where
    F: FnMut(TrackerEvent),
{
    fn emit(&mut self, event: TrackerEvent) {
        self(event);
    }
}

/// Sink that keeps every event in arrival order, for hosts that poll.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<TrackerEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[TrackerEvent] {
        &self.events
    }

    /// Removes and returns all recorded events.
    pub fn drain(&mut self) -> Vec<TrackerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events with the given [`TrackerEvent::name`].
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: TrackerEvent) {
        self.events.push(event);
    }
}
