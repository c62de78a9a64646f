//! Moving-average smoothing for noisy value samples.

use control_types::clamp_unit;

/// Fixed-capacity circular buffer producing a simple moving average.
///
/// Each control element owns its own smoother; nothing is shared or carried
/// across session resets.
///
/// # Example
///
/// ```
/// use control_tracker::ValueSmoother;
///
/// let mut smoother = ValueSmoother::new(3);
/// smoother.push(0.2);
/// smoother.push(0.4);
/// let mean = smoother.push(0.6);
/// assert!((mean - 0.4).abs() < 1e-12);
///
/// // Oldest sample (0.2) is evicted.
/// let mean = smoother.push(0.8);
/// assert!((mean - 0.6).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct ValueSmoother {
    samples: Vec<f64>,
    capacity: usize,
    /// Slot the next sample overwrites once the buffer is full.
    head: usize,
}

impl ValueSmoother {
    /// Creates a smoother averaging the last `capacity` samples (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Adds a raw sample and returns the mean of the buffered samples.
    ///
    /// The sample is clamped into `[0, 1]` first (`NaN` becomes `0.0`).
    pub fn push(&mut self, raw: f64) -> f64 {
        let value = clamp_unit(raw);
        if self.samples.len() < self.capacity {
            self.samples.push(value);
        } else {
            self.samples[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
        self.mean().unwrap_or(value)
    }

    /// Mean of the buffered samples, or `None` if empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Buffered samples, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<f64> {
        let (newer, older) = self.samples.split_at(self.head);
        older.iter().chain(newer).copied().collect()
    }

    /// Number of buffered samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window length.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.head = 0;
    }
}
