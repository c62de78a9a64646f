//! Tracker configuration.

use control_types::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// What the pipeline does once the registry reaches `max_element_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Emit `RegistrationComplete` and reset the session for the next pass.
    #[default]
    ResetSession,
    /// Emit `RegistrationComplete` once and keep tracking adjustments.
    RetainElements,
}

/// Parameters for detection, smoothing, and completion tracking.
///
/// Every field has a default, so partial JSON documents are accepted.
///
/// # Example
///
/// ```
/// use control_tracker::TrackerConfig;
///
/// let config = TrackerConfig::from_json_str(r#"{ "max_element_count": 4 }"#).unwrap();
/// assert_eq!(config.max_element_count, 4);
/// assert_eq!(config.frame_skip_interval, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Registry capacity. Default: 6
    pub max_element_count: usize,

    /// Candidates farther than this from the reference position are ignored. Default: 0.3
    pub detection_threshold: f64,

    /// A contact must be strictly closer than this to move an element. Default: 0.05
    pub interaction_radius: f64,

    /// Maximum deviation from target for `Adjusted`. Default: 0.05
    pub tolerance: f64,

    /// Minimum seconds between processed frames. Default: 0.3
    pub processing_interval_secs: f64,

    /// Only every n-th frame is considered for processing. Default: 10
    pub frame_skip_interval: u32,

    /// Smoothing window length. Default: 5
    pub max_history: usize,

    /// Cell size used to quantize positions for deduplication. Default: 0.1
    pub dedupe_cell_size: f64,

    /// Target value assigned to newly registered elements. Default: 0.5
    pub default_target_value: f64,

    /// Contacts below this confidence are ignored. Default: 0.0
    pub min_contact_confidence: f64,

    /// Behavior when the registry fills up. Default: reset the session
    pub capacity_policy: CapacityPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_element_count: 6,
            detection_threshold: 0.3,
            interaction_radius: 0.05,
            tolerance: 0.05,
            processing_interval_secs: 0.3,
            frame_skip_interval: 10,
            max_history: 5,
            dedupe_cell_size: 0.1,
            default_target_value: 0.5,
            min_contact_confidence: 0.0,
            capacity_policy: CapacityPolicy::ResetSession,
        }
    }
}

impl TrackerConfig {
    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Json`] for malformed JSON and
    /// [`TrackerError::InvalidConfig`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.max_element_count == 0 {
            return Err(TrackerError::invalid_config(
                "max_element_count must be at least 1",
            ));
        }
        if self.max_history == 0 {
            return Err(TrackerError::invalid_config("max_history must be at least 1"));
        }
        if self.frame_skip_interval == 0 {
            return Err(TrackerError::invalid_config(
                "frame_skip_interval must be at least 1",
            ));
        }
        for (name, value) in [
            ("detection_threshold", self.detection_threshold),
            ("interaction_radius", self.interaction_radius),
            ("tolerance", self.tolerance),
            ("dedupe_cell_size", self.dedupe_cell_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackerError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !self.processing_interval_secs.is_finite() || self.processing_interval_secs < 0.0 {
            return Err(TrackerError::invalid_config(format!(
                "processing_interval_secs must be non-negative, got {}",
                self.processing_interval_secs
            )));
        }
        for (name, value) in [
            ("default_target_value", self.default_target_value),
            ("min_contact_confidence", self.min_contact_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackerError::invalid_config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Minimum time between processed frames.
    #[must_use]
    pub fn processing_interval(&self) -> Duration {
        Duration::from_secs_f64(self.processing_interval_secs)
    }

    /// Set registry capacity.
    #[must_use]
    pub const fn with_max_element_count(mut self, count: usize) -> Self {
        self.max_element_count = count;
        self
    }

    /// Set detection threshold around the reference position.
    #[must_use]
    pub const fn with_detection_threshold(mut self, threshold: f64) -> Self {
        self.detection_threshold = threshold;
        self
    }

    /// Set the contact interaction radius.
    #[must_use]
    pub const fn with_interaction_radius(mut self, radius: f64) -> Self {
        self.interaction_radius = radius;
        self
    }

    /// Set the adjustment tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set both throttle gates.
    #[must_use]
    pub const fn with_throttle(mut self, interval_secs: f64, skip: u32) -> Self {
        self.processing_interval_secs = interval_secs;
        self.frame_skip_interval = skip;
        self
    }

    /// Disable throttling (every frame is processed).
    #[must_use]
    pub const fn unthrottled(self) -> Self {
        self.with_throttle(0.0, 1)
    }

    /// Set smoothing window length.
    #[must_use]
    pub const fn with_max_history(mut self, history: usize) -> Self {
        self.max_history = history;
        self
    }

    /// Set the target assigned to new elements.
    #[must_use]
    pub const fn with_default_target_value(mut self, target: f64) -> Self {
        self.default_target_value = target;
        self
    }

    /// Set the capacity policy.
    #[must_use]
    pub const fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }
}
