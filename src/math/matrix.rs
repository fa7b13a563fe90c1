use nalgebra as na;
use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A 2x2 matrix, used as the effective-mass tensor of two-axis joints
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix2 {
    /// Row-major data
    pub data: [[f32; 2]; 2],
}

impl Matrix2 {
    /// Creates a new matrix from row-major entries
    #[inline]
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            data: [[a, b], [c, d]],
        }
    }

    /// Creates the identity matrix
    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    /// Creates a zero matrix
    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Returns the determinant of the matrix
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.data[0][0] * self.data[1][1] - self.data[0][1] * self.data[1][0]
    }

    /// Returns the inverse of the matrix, or `None` if it is singular
    pub fn inverse(&self) -> Option<Self> {
        self.to_nalgebra()
            .try_inverse()
            .map(|m| Self::from_nalgebra(&m))
    }

    /// Multiplies a vector by this matrix
    #[inline]
    pub fn transform(&self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.data[0][0] * v.x + self.data[0][1] * v.y,
            self.data[1][0] * v.x + self.data[1][1] * v.y,
        )
    }

    /// Convert to nalgebra Matrix2
    #[inline]
    pub fn to_nalgebra(&self) -> na::Matrix2<f32> {
        na::Matrix2::new(
            self.data[0][0], self.data[0][1],
            self.data[1][0], self.data[1][1],
        )
    }

    /// Convert from nalgebra Matrix2
    #[inline]
    pub fn from_nalgebra(m: &na::Matrix2<f32>) -> Self {
        Self::new(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)])
    }

    /// Builds the effective-mass tensor for a point constraint between two
    /// bodies with the given anchor offsets, inverse masses and inverse
    /// moments, and returns its inverse.
    pub fn k_tensor(
        r1: Vector2,
        r2: Vector2,
        m_sum: f32,
        i1_inv: f32,
        i2_inv: f32,
    ) -> Option<Self> {
        let k11 = m_sum + r1.y * r1.y * i1_inv + r2.y * r2.y * i2_inv;
        let k12 = -r1.x * r1.y * i1_inv - r2.x * r2.y * i2_inv;
        let k22 = m_sum + r1.x * r1.x * i1_inv + r2.x * r2.x * i2_inv;

        Self::new(k11, k12, k12, k22).inverse()
    }
}

impl Default for Matrix2 {
    fn default() -> Self {
        Self::identity()
    }
}
