//! Frame-rate throttling for detector invocation.

use control_types::{Duration, Timestamp};

use crate::config::TrackerConfig;

/// Why a throttle rejected a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleGate {
    /// Not the n-th frame.
    FrameSkip,
    /// Too soon after the last processed frame.
    Interval,
}

/// Two-gate throttle: a frame is processed only if it is every n-th call
/// and at least `interval` has passed since the last processed frame.
///
/// Every call advances the skip counter, including rejected ones.
///
/// # Example
///
/// ```
/// use control_tracker::FrameThrottle;
/// use control_types::{Duration, Timestamp};
///
/// let mut throttle = FrameThrottle::new(Duration::from_millis(300), 2);
/// assert!(throttle.admit(Timestamp::from_secs_f64(0.0)).is_err()); // call 1
/// assert!(throttle.admit(Timestamp::from_secs_f64(0.1)).is_ok()); // call 2
/// assert!(throttle.admit(Timestamp::from_secs_f64(0.2)).is_err()); // call 3
/// assert!(throttle.admit(Timestamp::from_secs_f64(0.3)).is_err()); // call 4, only 0.2s later
/// assert!(throttle.admit(Timestamp::from_secs_f64(0.4)).is_err()); // call 5
/// assert!(throttle.admit(Timestamp::from_secs_f64(0.5)).is_ok()); // call 6
/// ```
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    skip: u32,
    counter: u32,
    last_processed: Option<Timestamp>,
}

impl FrameThrottle {
    /// Creates a throttle. A `skip` of 0 is treated as 1.
    #[must_use]
    pub fn new(interval: Duration, skip: u32) -> Self {
        Self {
            interval,
            skip: skip.max(1),
            counter: 0,
            last_processed: None,
        }
    }

    /// Creates a throttle from the config's interval and skip settings.
    #[must_use]
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.processing_interval(), config.frame_skip_interval)
    }

    /// Decides whether the frame at `timestamp` should be processed.
    ///
    /// # Errors
    ///
    /// Returns the gate that rejected the frame.
    pub fn admit(&mut self, timestamp: Timestamp) -> Result<(), ThrottleGate> {
        self.counter = (self.counter + 1) % self.skip;
        if self.counter != 0 {
            return Err(ThrottleGate::FrameSkip);
        }
        if let Some(last) = self.last_processed
            && timestamp.saturating_since(last) < self.interval
        {
            return Err(ThrottleGate::Interval);
        }
        self.last_processed = Some(timestamp);
        Ok(())
    }

    /// Timestamp of the last admitted frame.
    #[must_use]
    pub const fn last_processed(&self) -> Option<Timestamp> {
        self.last_processed
    }

    /// Forgets the frame count and last processed time.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.last_processed = None;
    }
}
