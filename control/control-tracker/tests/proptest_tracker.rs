//! Property-based tests for registry, smoothing, and value mapping.
//!
//! Run with: cargo test -p control-tracker -- proptest

use control_tracker::{ElementRegistry, SpatialKey, TrackerConfig, ValueSmoother, compute_value};
use control_types::{ControlElement, ElementId, ElementKind, ElementStatus};
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A position in a bounded room-sized box.
fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-2.0..2.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Any f64, including NaN and infinities.
fn arb_raw_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -10.0..10.0f64,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn arb_kind() -> impl Strategy<Value = ElementKind> {
    prop_oneof![Just(ElementKind::Rotary), Just(ElementKind::Linear)]
}

fn registry(max: usize) -> ElementRegistry {
    let config = TrackerConfig::default().with_max_element_count(max);
    let registry = ElementRegistry::new(&config);
    registry.set_reference_position(Point3::origin());
    registry
}

// =============================================================================
// Property Tests: Registry
// =============================================================================

proptest! {
    /// The registry never holds more than its capacity.
    #[test]
    fn registry_respects_capacity(
        max in 1usize..8,
        positions in prop::collection::vec(arb_position(), 0..40),
    ) {
        let registry = registry(max);
        for position in &positions {
            registry.register(ElementKind::Rotary, *position);
        }
        prop_assert!(registry.len() <= max);
        prop_assert!(registry.len() <= positions.len());
    }

    /// No two registered elements share a quantized cell.
    #[test]
    fn registry_keys_are_unique(positions in prop::collection::vec(arb_position(), 0..40)) {
        let registry = registry(64);
        for position in &positions {
            registry.register(ElementKind::Linear, *position);
        }
        let mut keys: Vec<SpatialKey> = registry
            .all()
            .iter()
            .map(|e| SpatialKey::quantize(e.position(), 0.1))
            .collect();
        let count = keys.len();
        keys.sort_by_key(|k| (k.x, k.y, k.z));
        keys.dedup();
        prop_assert_eq!(keys.len(), count);
    }

    /// Element IDs are unique and increasing in registration order.
    #[test]
    fn registry_ids_increase(positions in prop::collection::vec(arb_position(), 1..30)) {
        let registry = registry(64);
        for position in &positions {
            registry.register(ElementKind::Rotary, *position);
        }
        let ids: Vec<u64> = registry.all().iter().map(|e| e.id().as_u64()).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    /// Reset always leaves an empty registry without a reference.
    #[test]
    fn reset_always_empties(positions in prop::collection::vec(arb_position(), 0..20)) {
        let registry = registry(6);
        for position in &positions {
            registry.register(ElementKind::Rotary, *position);
        }
        registry.reset();
        prop_assert!(registry.all().is_empty());
        prop_assert!(registry.reference_position().is_none());
    }

    /// Status is Adjusted exactly when the last smoothed value is within tolerance.
    #[test]
    fn status_matches_tolerance(raws in prop::collection::vec(arb_raw_value(), 1..20)) {
        let registry = registry(6);
        let id = registry.register(ElementKind::Rotary, Point3::new(0.1, 0.0, 0.0)).unwrap();
        let epoch = registry.epoch();
        for raw in raws {
            if let Some(update) = registry.apply_raw_value(epoch, id, raw, 0.05) {
                let element = &update.element;
                prop_assert_eq!(element.is_within(0.05), element.status() == ElementStatus::Adjusted);
                prop_assert!((0.0..=1.0).contains(&element.current_value()));
            }
        }
    }
}

// =============================================================================
// Property Tests: Smoothing and Mapping
// =============================================================================

proptest! {
    /// The smoothed value is the mean of the last `capacity` clamped samples.
    #[test]
    fn smoother_is_windowed_mean(
        capacity in 1usize..10,
        raws in prop::collection::vec(arb_raw_value(), 1..40),
    ) {
        let mut smoother = ValueSmoother::new(capacity);
        let mut last = 0.0;
        for raw in &raws {
            last = smoother.push(*raw);
        }
        let clamped: Vec<f64> = raws
            .iter()
            .map(|r| if r.is_nan() { 0.0 } else { r.clamp(0.0, 1.0) })
            .collect();
        let window = &clamped[clamped.len().saturating_sub(capacity)..];
        #[allow(clippy::cast_precision_loss)]
        let expected = window.iter().sum::<f64>() / window.len() as f64;

        prop_assert!((last - expected).abs() < 1e-9);
        prop_assert!(smoother.len() <= capacity);
        prop_assert!((0.0..=1.0).contains(&last));
    }

    /// Mapped values always land in [0, 1].
    #[test]
    fn mapped_values_are_normalized(
        kind in arb_kind(),
        position in arb_position(),
        contact in arb_position(),
    ) {
        let element = ControlElement::new(ElementId::new(1), kind, position, 0.5);
        let value = compute_value(&element, &contact);
        prop_assert!((0.0..=1.0).contains(&value));
    }
}
