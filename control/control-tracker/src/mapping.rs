//! Contact-point to value mapping.
//!
//! Pure functions: given an element and a plausible contact point, produce
//! the normalized value the contact implies. Proximity gating is the
//! caller's job.

use std::f64::consts::{PI, TAU};

use control_types::{ControlElement, ElementKind, clamp_unit};
use nalgebra::Point3;

/// Length of a fader's travel, centered on the element position.
pub const LINEAR_AXIS_LENGTH: f64 = 0.1;

/// Value implied by a contact at `contact` on `element`.
///
/// - `Rotary`: contact angle around the element in the horizontal (X/Z)
///   plane, `atan2(dz, dx)`, mapped from `[-π, π]` to `[0, 1]`.
/// - `Linear`: vertical (Y) offset along an axis of [`LINEAR_AXIS_LENGTH`]
///   centered on the element, mapped to `[0, 1]` and clamped.
///
/// The result is always in `[0, 1]`; non-finite input yields `0.0`.
///
/// # Example
///
/// ```
/// use control_tracker::compute_value;
/// use control_types::{ControlElement, ElementId, ElementKind};
/// use nalgebra::Point3;
///
/// let fader = ControlElement::new(ElementId::new(1), ElementKind::Linear, Point3::origin(), 0.5);
/// let top = compute_value(&fader, &Point3::new(0.0, 0.05, 0.0));
/// assert!((top - 1.0).abs() < 1e-12);
///
/// let knob = ControlElement::new(ElementId::new(2), ElementKind::Rotary, Point3::origin(), 0.5);
/// let east = compute_value(&knob, &Point3::new(0.01, 0.0, 0.0));
/// assert!((east - 0.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn compute_value(element: &ControlElement, contact: &Point3<f64>) -> f64 {
    let offset = contact - element.position();
    match element.kind() {
        ElementKind::Rotary => rotary_value(offset.x, offset.z),
        ElementKind::Linear => linear_value(offset.y),
    }
}

fn rotary_value(dx: f64, dz: f64) -> f64 {
    let angle = dz.atan2(dx);
    clamp_unit((angle + PI) / TAU)
}

fn linear_value(dy: f64) -> f64 {
    clamp_unit(dy / LINEAR_AXIS_LENGTH + 0.5)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;
    use control_types::ElementId;

    use super::*;

    fn element(kind: ElementKind) -> ControlElement {
        ControlElement::new(ElementId::new(1), kind, Point3::new(1.0, 2.0, 3.0), 0.5)
    }

    #[test]
    fn rotary_quadrants() {
        let knob = element(ElementKind::Rotary);
        let at = |dx: f64, dz: f64| compute_value(&knob, &Point3::new(1.0 + dx, 2.0, 3.0 + dz));

        assert_relative_eq!(at(0.02, 0.0), 0.5, epsilon = 1e-9);
        assert_relative_eq!(at(0.0, 0.02), 0.75, epsilon = 1e-9);
        assert_relative_eq!(at(0.0, -0.02), 0.25, epsilon = 1e-9);
        assert_relative_eq!(at(-0.02, 1e-12), 1.0, epsilon = 1e-9);
        assert_relative_eq!(at(-0.02, -1e-12), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rotary_ignores_height() {
        let knob = element(ElementKind::Rotary);
        let low = compute_value(&knob, &Point3::new(1.02, 1.0, 3.02));
        let high = compute_value(&knob, &Point3::new(1.02, 5.0, 3.02));
        assert_relative_eq!(low, high);
        assert_relative_eq!(low, 0.625, epsilon = 1e-9);
    }

    #[test]
    fn linear_maps_and_clamps() {
        let fader = element(ElementKind::Linear);
        let at = |dy: f64| compute_value(&fader, &Point3::new(1.0, 2.0 + dy, 3.0));

        assert_relative_eq!(at(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(at(0.025), 0.75, epsilon = 1e-9);
        assert_relative_eq!(at(-0.05), 0.0, epsilon = 1e-9);
        assert_eq!(at(0.3), 1.0);
        assert_eq!(at(-0.3), 0.0);
    }

    #[test]
    fn non_finite_contact_is_absorbed() {
        let fader = element(ElementKind::Linear);
        assert_eq!(compute_value(&fader, &Point3::new(1.0, f64::NAN, 3.0)), 0.0);
        let knob = element(ElementKind::Rotary);
        let value = compute_value(&knob, &Point3::new(f64::NAN, 2.0, 3.0));
        assert!((0.0..=1.0).contains(&value));
    }
}
