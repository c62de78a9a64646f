//! Spatial anchors a host places visuals on.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::element::{ControlElement, ElementId, ElementKind};

/// An anchor the host renders, tagged by category.
///
/// Hosts match on the variant instead of inspecting runtime types.
///
/// # Example
///
/// ```
/// use control_types::SpatialAnchor;
/// use nalgebra::Point3;
///
/// let anchor = SpatialAnchor::Reference(Point3::new(0.0, 1.0, 0.0));
/// let label = match &anchor {
///     SpatialAnchor::Reference(_) => "edge",
///     SpatialAnchor::Element { .. } => "control",
/// };
/// assert_eq!(label, "edge");
/// assert_eq!(anchor.position(), &Point3::new(0.0, 1.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpatialAnchor {
    /// The user-designated reference point (device edge).
    Reference(Point3<f64>),
    /// A registered control element.
    Element {
        /// Element identity.
        id: ElementId,
        /// Rotary or linear.
        kind: ElementKind,
        /// World-space position.
        position: Point3<f64>,
    },
}

impl SpatialAnchor {
    /// Returns the anchor's world-space position.
    #[must_use]
    pub const fn position(&self) -> &Point3<f64> {
        match self {
            Self::Reference(position) | Self::Element { position, .. } => position,
        }
    }

    /// Returns the element ID for element anchors.
    #[must_use]
    pub const fn element_id(&self) -> Option<ElementId> {
        match self {
            Self::Reference(_) => None,
            Self::Element { id, .. } => Some(*id),
        }
    }
}

impl From<&ControlElement> for SpatialAnchor {
    fn from(element: &ControlElement) -> Self {
        Self::Element {
            id: element.id(),
            kind: element.kind(),
            position: *element.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_anchor_from_element() {
        let element = ControlElement::new(
            ElementId::new(3),
            ElementKind::Linear,
            Point3::new(0.1, 0.0, 0.2),
            0.5,
        );
        let anchor = SpatialAnchor::from(&element);
        assert_eq!(anchor.element_id(), Some(ElementId::new(3)));
        assert_eq!(anchor.position(), element.position());
    }

    #[test]
    fn reference_anchor_has_no_id() {
        assert_eq!(SpatialAnchor::Reference(Point3::origin()).element_id(), None);
    }
}
