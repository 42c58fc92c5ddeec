//! Coordinates and the damped position interpolator used to move a
//! provider marker toward the customer.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Fraction of the remaining distance closed per step.
pub const DEFAULT_DAMPING: f64 = 0.08;

/// Per-axis tolerance (degrees) under which the provider counts as arrived.
pub const DEFAULT_ARRIVAL_EPSILON: f64 = 0.001;

/// Where a provider starts relative to the destination.
pub const DEFAULT_START_OFFSET: Coordinates = Coordinates {
    lat: 0.015,
    lng: 0.012,
};

/// Fallback customer location (Lagos) when the booking carries none.
pub const DEFAULT_DESTINATION: Coordinates = Coordinates {
    lat: 6.5244,
    lng: 3.3792,
};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by a `(lat, lng)` delta.
    pub fn offset_by(self, delta: Coordinates) -> Self {
        Self {
            lat: self.lat + delta.lat,
            lng: self.lng + delta.lng,
        }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Reject NaN or infinite components.
    pub fn validate(self, what: &str) -> Result<Self, CoreError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(CoreError::Configuration(format!(
                "{what} must have finite coordinates, got ({}, {})",
                self.lat, self.lng
            )))
        }
    }
}

/// Euclidean distance in degree space.
///
/// Only used to compare positions along the same path, so the
/// curvature of the earth is irrelevant here.
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    (b.lat - a.lat).hypot(b.lng - a.lng)
}

/// True when both axes are within `epsilon` of the destination.
pub fn has_arrived(current: Coordinates, destination: Coordinates, epsilon: f64) -> bool {
    (destination.lat - current.lat).abs() < epsilon
        && (destination.lng - current.lng).abs() < epsilon
}

/// Advance `current` toward `destination` by `damping` of the remaining gap.
///
/// Returns `current` unchanged once [`has_arrived`] holds. For a damping
/// factor in `(0, 1)` the result never overshoots the destination.
pub fn step(current: Coordinates, destination: Coordinates, damping: f64, epsilon: f64) -> Coordinates {
    if has_arrived(current, destination, epsilon) {
        return current;
    }

    Coordinates {
        lat: current.lat + (destination.lat - current.lat) * damping,
        lng: current.lng + (destination.lng - current.lng) * damping,
    }
}

/// Validate a damping factor lies strictly inside `(0, 1)`.
pub fn validate_damping(damping: f64) -> Result<f64, CoreError> {
    if damping.is_finite() && damping > 0.0 && damping < 1.0 {
        Ok(damping)
    } else {
        Err(CoreError::Configuration(format!(
            "Damping factor must be in (0, 1), got {damping}"
        )))
    }
}

/// Validate the arrival tolerance is a positive finite number.
pub fn validate_epsilon(epsilon: f64) -> Result<f64, CoreError> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(epsilon)
    } else {
        Err(CoreError::Configuration(format!(
            "Arrival epsilon must be positive, got {epsilon}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Coordinates {
        DEFAULT_DESTINATION.offset_by(DEFAULT_START_OFFSET)
    }

    #[test]
    fn step_closes_damping_fraction_of_gap() {
        let next = step(start(), DEFAULT_DESTINATION, 0.5, DEFAULT_ARRIVAL_EPSILON);
        assert!((next.lat - (DEFAULT_DESTINATION.lat + 0.0075)).abs() < 1e-12);
        assert!((next.lng - (DEFAULT_DESTINATION.lng + 0.006)).abs() < 1e-12);
    }

    #[test]
    fn step_holds_position_once_arrived() {
        let near = DEFAULT_DESTINATION.offset_by(Coordinates::new(0.0005, -0.0009));
        assert_eq!(
            step(near, DEFAULT_DESTINATION, DEFAULT_DAMPING, DEFAULT_ARRIVAL_EPSILON),
            near
        );
    }

    #[test]
    fn arrival_requires_both_axes() {
        let lng_far = DEFAULT_DESTINATION.offset_by(Coordinates::new(0.0, 0.002));
        assert!(!has_arrived(lng_far, DEFAULT_DESTINATION, DEFAULT_ARRIVAL_EPSILON));
        assert!(step(lng_far, DEFAULT_DESTINATION, DEFAULT_DAMPING, DEFAULT_ARRIVAL_EPSILON) != lng_far);
    }

    #[test]
    fn repeated_steps_converge_without_overshoot() {
        let mut current = start();
        let mut last = distance(current, DEFAULT_DESTINATION);
        let mut arrived_at = None;

        for n in 1..=60 {
            let next = step(current, DEFAULT_DESTINATION, DEFAULT_DAMPING, DEFAULT_ARRIVAL_EPSILON);
            let d = distance(next, DEFAULT_DESTINATION);

            if arrived_at.is_none() {
                if has_arrived(current, DEFAULT_DESTINATION, DEFAULT_ARRIVAL_EPSILON) {
                    arrived_at = Some(n);
                    assert_eq!(next, current);
                } else {
                    assert!(d < last, "distance must shrink at step {n}");
                    // Still on the same side of the destination.
                    assert!(next.lat > DEFAULT_DESTINATION.lat);
                    assert!(next.lng > DEFAULT_DESTINATION.lng);
                }
            } else {
                assert_eq!(next, current, "position must hold after arrival");
            }

            last = d;
            current = next;
        }

        let arrived_at = arrived_at.expect("should arrive within 60 steps");
        assert!(arrived_at <= 40, "arrived after {arrived_at} steps");
    }

    #[test]
    fn damping_bounds() {
        assert!(validate_damping(0.08).is_ok());
        assert!(validate_damping(0.0).is_err());
        assert!(validate_damping(1.0).is_err());
        assert!(validate_damping(f64::NAN).is_err());
    }

    #[test]
    fn epsilon_must_be_positive() {
        assert!(validate_epsilon(0.001).is_ok());
        assert!(validate_epsilon(0.0).is_err());
        assert!(validate_epsilon(-1.0).is_err());
    }

    #[test]
    fn non_finite_coordinates_rejected() {
        assert!(Coordinates::new(f64::INFINITY, 0.0).validate("destination").is_err());
        assert!(DEFAULT_DESTINATION.validate("destination").is_ok());
    }
}
