//! Time types for frame observations.
//!
//! Provides nanosecond-precision timing so frame throttling does not drift
//! with floating point accumulation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};

/// Nanosecond-precision frame timestamp.
///
/// # Example
///
/// ```
/// use control_types::Timestamp;
///
/// let ts = Timestamp::from_secs_f64(1.5);
/// assert!((ts.as_secs_f64() - 1.5).abs() < 1e-9);
///
/// let ts_nanos = Timestamp::from_nanos(1_500_000_000);
/// assert_eq!(ts, ts_nanos);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp {
    /// Nanoseconds since the host clock's origin.
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a timestamp from seconds (floating point).
    ///
    /// Negative and `NaN` inputs saturate to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).max(0.0) as u64;
        Self { nanos }
    }

    /// Creates a timestamp from seconds, rejecting negative or non-finite input.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidTimestamp`] if `secs` is negative, `NaN`, or infinite.
    pub fn try_from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(TypesError::InvalidTimestamp(secs));
        }
        Ok(Self::from_secs_f64(secs))
    }

    /// Returns the timestamp as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the timestamp as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Returns the zero timestamp.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }

    /// Returns the time elapsed since `earlier`.
    ///
    /// Saturates to zero if `earlier` is actually later (out-of-order frames).
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }
}

/// A duration of time with nanosecond precision.
///
/// # Example
///
/// ```
/// use control_types::Duration;
///
/// let d = Duration::from_millis(300);
/// assert_eq!(d.as_nanos(), 300_000_000);
/// assert!((Duration::from_secs_f64(0.3).as_secs_f64() - 0.3).abs() < 1e-9);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Duration {
    /// Duration in nanoseconds.
    nanos: u64,
}

impl Duration {
    /// Creates a duration from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a duration from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis * 1_000_000,
        }
    }

    /// Creates a duration from seconds (floating point).
    ///
    /// Negative and `NaN` inputs saturate to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).round().max(0.0) as u64;
        Self { nanos }
    }

    /// Returns the duration as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the duration as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Returns the zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }
}
