//! Quantized spatial keys for collapsing near-duplicate detections.

use nalgebra::Point3;

/// Integer cell coordinates of a quantized world position.
///
/// Coordinates are truncated toward zero at a fixed cell size, so with the
/// default 0.1 cell every position is keyed by its first decimal place.
///
/// # Example
///
/// ```
/// use control_tracker::SpatialKey;
/// use nalgebra::Point3;
///
/// let a = SpatialKey::quantize(&Point3::new(0.12, 0.0, -0.05), 0.1);
/// let b = SpatialKey::quantize(&Point3::new(0.19, 0.04, -0.09), 0.1);
/// assert_eq!(a, b);
/// assert_eq!(a, SpatialKey::new(1, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpatialKey {
    /// X cell.
    pub x: i32,
    /// Y cell.
    pub y: i32,
    /// Z cell.
    pub z: i32,
}

impl SpatialKey {
    /// Creates a key from cell coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Quantizes a world position.
    ///
    /// Non-finite coordinates map to cell 0; callers drop non-finite
    /// candidates before registration.
    #[must_use]
    pub fn quantize(point: &Point3<f64>, cell_size: f64) -> Self {
        Self {
            x: truncate_cell(point.x, cell_size),
            y: truncate_cell(point.y, cell_size),
            z: truncate_cell(point.z, cell_size),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_cell(value: f64, cell_size: f64) -> i32 {
    let scaled = (value / cell_size).trunc();
    if scaled.is_finite() {
        // `as` saturates at the i32 bounds.
        scaled as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(
            SpatialKey::quantize(&Point3::new(0.05, -0.05, 0.0), 0.1),
            SpatialKey::new(0, 0, 0)
        );
        assert_eq!(
            SpatialKey::quantize(&Point3::new(0.25, -0.25, 1.0), 0.1),
            SpatialKey::new(2, -2, 10)
        );
    }

    #[test]
    fn neighbouring_cells_differ() {
        let a = SpatialKey::quantize(&Point3::new(0.05, 0.0, 0.0), 0.1);
        let b = SpatialKey::quantize(&Point3::new(0.10, 0.0, 0.0), 0.1);
        assert_ne!(a, b);
    }

    #[test]
    fn non_finite_maps_to_zero() {
        assert_eq!(
            SpatialKey::quantize(&Point3::new(f64::NAN, f64::INFINITY, 0.31), 0.1),
            SpatialKey::new(0, 0, 3)
        );
    }

    #[test]
    fn huge_values_saturate() {
        let key = SpatialKey::quantize(&Point3::new(1e300, -1e300, 0.0), 0.1);
        assert_eq!(key.x, i32::MAX);
        assert_eq!(key.y, i32::MIN);
    }
}
