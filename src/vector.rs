//! Two-dimensional displacement value.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Displacement in pixels.
///
/// Under backward compensation a vector `v` stored at target pixel `p` means
/// "`p` is predicted from reference pixel `p + v`".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionVector {
    /// Horizontal component (positive to the right).
    pub x: f64,
    /// Vertical component (positive downwards).
    pub y: f64,
}

impl MotionVector {
    /// The zero displacement.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean length.
    pub fn norm_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Linear interpolation `self + (other - self) * t`.
    ///
    /// Exact when both endpoints are equal.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(isize, isize)> for MotionVector {
    fn from((x, y): (isize, isize)) -> Self {
        Self::new(x as f64, y as f64)
    }
}

impl Add for MotionVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for MotionVector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for MotionVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for MotionVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<MotionVector> for f64 {
    type Output = MotionVector;

    fn mul(self, rhs: MotionVector) -> MotionVector {
        rhs * self
    }
}

impl Neg for MotionVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}
