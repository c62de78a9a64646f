//! Physical control elements: identity, kind, status, and value.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Clamps a value into the normalized range `[0, 1]`.
///
/// `NaN` maps to `0.0` so invalid inputs are absorbed rather than propagated.
///
/// # Example
///
/// ```
/// use control_types::clamp_unit;
///
/// assert_eq!(clamp_unit(0.25), 0.25);
/// assert_eq!(clamp_unit(1.5), 1.0);
/// assert_eq!(clamp_unit(-0.2), 0.0);
/// assert_eq!(clamp_unit(f64::NAN), 0.0);
/// ```
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A unique identifier for a detected control element.
///
/// IDs are assigned at first detection and are never reused within a
/// registry, even across session resets.
///
/// # Example
///
/// ```
/// use control_types::ElementId;
///
/// let id = ElementId::new(7);
/// assert_eq!(id.as_u64(), 7);
/// assert_eq!(id.to_string(), "Element(7)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    /// Creates a new element ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ElementId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ElementId> for u64 {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.0)
    }
}

/// The kind of physical control. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Potentiometer: value follows the contact angle around the element.
    Rotary,
    /// Fader: value follows the contact offset along the slide axis.
    Linear,
}

impl ElementKind {
    /// Stand-in classification for detectors that do not report a kind.
    ///
    /// Even ordinals are rotary, odd ordinals linear.
    ///
    /// # Example
    ///
    /// ```
    /// use control_types::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_ordinal(0), ElementKind::Rotary);
    /// assert_eq!(ElementKind::from_ordinal(3), ElementKind::Linear);
    /// ```
    #[must_use]
    pub const fn from_ordinal(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Rotary
        } else {
            Self::Linear
        }
    }

    /// String representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rotary => "rotary",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rotary" | "knob" | "potentiometer" => Ok(Self::Rotary),
            "linear" | "fader" | "slider" => Ok(Self::Linear),
            _ => Err(TypesError::unknown_kind(s)),
        }
    }
}

/// Adjustment status of a control element.
///
/// Status only moves forward: `Detected -> Adjusting -> Adjusted`.
/// `Adjusted` is terminal until the owning session resets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ElementStatus {
    /// Registered, no interaction yet.
    #[default]
    Detected,
    /// A live interaction is moving the value.
    Adjusting,
    /// The value reached the target within tolerance.
    Adjusted,
}

impl ElementStatus {
    /// Returns `true` for the terminal `Adjusted` state.
    #[must_use]
    pub const fn is_adjusted(&self) -> bool {
        matches!(self, Self::Adjusted)
    }

    /// String representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Adjusting => "adjusting",
            Self::Adjusted => "adjusted",
        }
    }
}

impl fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "detected" => Ok(Self::Detected),
            "adjusting" => Ok(Self::Adjusting),
            "adjusted" => Ok(Self::Adjusted),
            _ => Err(TypesError::unknown_status(s)),
        }
    }
}

/// One physical knob or fader being tracked.
///
/// Identity, kind, and position are fixed at creation. Values are always
/// kept in `[0, 1]`.
///
/// # Example
///
/// ```
/// use control_types::{ControlElement, ElementId, ElementKind, ElementStatus};
/// use nalgebra::Point3;
///
/// let element = ControlElement::new(
///     ElementId::new(1),
///     ElementKind::Rotary,
///     Point3::new(0.05, 0.0, 0.0),
///     0.75,
/// );
///
/// assert_eq!(element.status(), ElementStatus::Detected);
/// assert!((element.target_value() - 0.75).abs() < 1e-12);
/// assert!(!element.is_within(0.05));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlElement {
    id: ElementId,
    kind: ElementKind,
    position: Point3<f64>,
    current_value: f64,
    target_value: f64,
    status: ElementStatus,
    reference_position: Option<Point3<f64>>,
}

impl ControlElement {
    /// Creates a newly detected element with a current value of zero.
    #[must_use]
    pub fn new(
        id: ElementId,
        kind: ElementKind,
        position: Point3<f64>,
        target_value: f64,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            current_value: 0.0,
            target_value: clamp_unit(target_value),
            status: ElementStatus::Detected,
            reference_position: None,
        }
    }

    /// Attaches the spatial anchor the element was detected against.
    #[must_use]
    pub const fn with_reference_position(mut self, reference: Point3<f64>) -> Self {
        self.reference_position = Some(reference);
        self
    }

    /// Returns the element ID.
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the element position.
    #[must_use]
    pub const fn position(&self) -> &Point3<f64> {
        &self.position
    }

    /// Returns the current (smoothed) value.
    #[must_use]
    pub const fn current_value(&self) -> f64 {
        self.current_value
    }

    /// Returns the target value.
    #[must_use]
    pub const fn target_value(&self) -> f64 {
        self.target_value
    }

    /// Returns the adjustment status.
    #[must_use]
    pub const fn status(&self) -> ElementStatus {
        self.status
    }

    /// Returns the reference position, if one was attached.
    #[must_use]
    pub const fn reference_position(&self) -> Option<&Point3<f64>> {
        self.reference_position.as_ref()
    }

    /// Absolute distance between the current and target values.
    #[must_use]
    pub fn deviation(&self) -> f64 {
        (self.current_value - self.target_value).abs()
    }

    /// Returns `true` if the current value is strictly within `tolerance` of the target.
    #[must_use]
    pub fn is_within(&self, tolerance: f64) -> bool {
        self.deviation() < tolerance
    }

    /// Sets the current value, clamped to `[0, 1]`.
    pub fn set_current_value(&mut self, value: f64) {
        self.current_value = clamp_unit(value);
    }

    /// Sets the target value, clamped to `[0, 1]`.
    pub fn set_target_value(&mut self, value: f64) {
        self.target_value = clamp_unit(value);
    }

    /// Moves the status forward to `next`.
    ///
    /// Returns `false` and leaves the status unchanged if `next` would move
    /// backwards (e.g. `Adjusted -> Adjusting`).
    pub fn advance_to(&mut self, next: ElementStatus) -> bool {
        if next < self.status {
            return false;
        }
        self.status = next;
        true
    }
}
