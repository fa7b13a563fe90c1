use crate::math::Vector2;
use std::fmt;
use std::ops::{Mul, MulAssign};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A planar rotation stored as a unit complex number (cos, sin)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Rotation {
    /// Cosine of the rotation angle
    pub cos: f32,

    /// Sine of the rotation angle
    pub sin: f32,
}

impl Rotation {
    /// Creates the identity rotation
    #[inline]
    pub fn identity() -> Self {
        Self { cos: 1.0, sin: 0.0 }
    }

    /// Creates a rotation from an angle in radians
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self {
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    /// Returns the angle of the rotation in the range [-PI, PI]
    #[inline]
    pub fn angle(&self) -> f32 {
        self.sin.atan2(self.cos)
    }

    /// Rotates a vector
    #[inline]
    pub fn rotate_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(self.cos * v.x - self.sin * v.y, self.sin * v.x + self.cos * v.y)
    }

    /// Applies the inverse rotation to a vector
    #[inline]
    pub fn inverse_rotate_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(self.cos * v.x + self.sin * v.y, -self.sin * v.x + self.cos * v.y)
    }

    /// Returns the inverse rotation
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }

    /// Returns the rotation as a unit vector (the rotated x axis)
    #[inline]
    pub fn as_vector(&self) -> Vector2 {
        Vector2::new(self.cos, self.sin)
    }

    /// Renormalizes the rotation to unit length
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = (self.cos * self.cos + self.sin * self.sin).sqrt();
        if len > crate::math::EPSILON {
            Self {
                cos: self.cos / len,
                sin: self.sin / len,
            }
        } else {
            Self::identity()
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Rotation {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            cos: self.cos * rhs.cos - self.sin * rhs.sin,
            sin: self.sin * rhs.cos + self.cos * rhs.sin,
        }
    }
}

impl MulAssign for Rotation {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rotation({} rad)", self.angle())
    }
}
