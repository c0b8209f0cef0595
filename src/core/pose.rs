//! 2D pose type for robot position and orientation.

use super::math::wrap_two_pi;

/// A 2D pose: position in meters plus heading in radians, CCW positive
/// from the X axis.
///
/// Poses compose with the `*` operator (rotate-then-translate, matching
/// the vendor odometry frame convention):
///
/// ```
/// use nao_nav::core::Pose2D;
///
/// let a = Pose2D::new(1.0, 0.0, std::f32::consts::FRAC_PI_2);
/// let b = Pose2D::new(1.0, 0.0, 0.0);
/// let c = a * b; // apply b in a's frame
/// assert!((c.y - 1.0).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose2D {
    /// X position in meters.
    pub x: f32,
    /// Y position in meters.
    pub y: f32,
    /// Heading angle in radians.
    pub theta: f32,
}

impl Pose2D {
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self { x, y, theta }
    }

    /// Identity pose (origin, facing forward).
    #[inline]
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Compose this pose with another: rotate `other`'s translation by
    /// `self.theta`, then translate, and add the headings.
    #[inline]
    pub fn compose(self, other: Pose2D) -> Self {
        let (sin, cos) = self.theta.sin_cos();
        Self {
            x: self.x + other.x * cos - other.y * sin,
            y: self.y + other.x * sin + other.y * cos,
            theta: self.theta + other.theta,
        }
    }

    /// Elementwise difference `self - other`, with the heading difference
    /// wrapped to [0, 2π).
    #[inline]
    pub fn diff(self, other: Pose2D) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            theta: wrap_two_pi(self.theta - other.theta),
        }
    }

    /// Euclidean distance between the positions of two poses.
    #[inline]
    pub fn distance_to(self, other: Pose2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Mul for Pose2D {
    type Output = Self;

    /// Compose two poses (same as `compose`).
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.compose(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_compose_rotate_then_translate() {
        // Facing +Y, one meter forward in the local frame lands at (0, 1)
        let pose = Pose2D::new(0.0, 0.0, FRAC_PI_2);
        let step = Pose2D::new(1.0, 0.0, 0.0);
        let out = pose.compose(step);
        assert_relative_eq!(out.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(out.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(out.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_mul_matches_compose() {
        let a = Pose2D::new(1.0, 2.0, 0.5);
        let b = Pose2D::new(0.3, -0.1, 0.2);
        assert_eq!(a.compose(b), a * b);
    }

    #[test]
    fn test_diff_wraps_heading() {
        let a = Pose2D::new(1.0, 1.0, 0.1);
        let b = Pose2D::new(0.5, 2.0, 0.4);
        let d = a.diff(b);
        assert_relative_eq!(d.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(d.y, -1.0, epsilon = 1e-6);
        // -0.3 wraps into [0, 2π)
        assert_relative_eq!(d.theta, 2.0 * PI - 0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_distance() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(3.0, 4.0, 1.0);
        assert_relative_eq!(a.distance_to(b), 5.0, epsilon = 1e-6);
    }
}
