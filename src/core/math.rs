//! Angle utilities.
//!
//! All angles are in radians. Counter-clockwise positive rotation.

use std::f32::consts::PI;

/// Two times PI (full circle in radians).
pub const TWO_PI: f32 = 2.0 * PI;

/// Normalize angle to [-π, π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TWO_PI;
    if a >= PI {
        a -= TWO_PI;
    } else if a < -PI {
        a += TWO_PI;
    }
    a
}

/// Wrap angle to [0, 2π).
///
/// Used by pose differences, which report headings as positive offsets.
#[inline]
pub fn wrap_two_pi(angle: f32) -> f32 {
    let a = angle % TWO_PI;
    if a < 0.0 { a + TWO_PI } else { a }
}

/// Signed angular difference from `from` to `to`, in [-π, π).
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(FRAC_PI_2), FRAC_PI_2, epsilon = 1e-6);
        assert!(normalize_angle(3.0 * PI).abs() - PI < 1e-5);
        assert_relative_eq!(normalize_angle(TWO_PI), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_wrap_two_pi() {
        assert_relative_eq!(wrap_two_pi(-FRAC_PI_2), 1.5 * PI, epsilon = 1e-5);
        assert_relative_eq!(wrap_two_pi(FRAC_PI_2), FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(wrap_two_pi(TWO_PI + 0.5), 0.5, epsilon = 1e-5);
        assert!(wrap_two_pi(-1e-3) >= 0.0);
    }

    #[test]
    fn test_angle_diff() {
        assert_relative_eq!(angle_diff(0.0, FRAC_PI_2), FRAC_PI_2, epsilon = 1e-6);
        // Crossing the -π/π boundary takes the short way around
        let diff = angle_diff(-0.9 * PI, 0.9 * PI);
        assert!((diff - (-0.2 * PI)).abs() < 1e-5);
    }
}
