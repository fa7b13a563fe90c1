use crate::math::{Rotation, Vector2};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A rigid 2D transformation (rotation followed by translation).
///
/// Stored as the 2x3 affine matrix `[a c tx; b d ty]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    /// Creates a new transform from its raw affine entries
    #[inline]
    pub fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Creates a new identity transform
    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Creates a new transform from just a position
    #[inline]
    pub fn from_position(position: Vector2) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, position.x, position.y)
    }

    /// Creates a new transform from a position and a rotation
    #[inline]
    pub fn from_position_rotation(position: Vector2, rotation: Rotation) -> Self {
        Self::new(
            rotation.cos,
            rotation.sin,
            -rotation.sin,
            rotation.cos,
            position.x,
            position.y,
        )
    }

    /// Creates a new transform from a position and an angle in radians
    #[inline]
    pub fn from_position_angle(position: Vector2, angle: f32) -> Self {
        Self::from_position_rotation(position, Rotation::from_angle(angle))
    }

    /// Returns the translation component
    #[inline]
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.tx, self.ty)
    }

    /// Returns the rotation component
    #[inline]
    pub fn rotation(&self) -> Rotation {
        Rotation {
            cos: self.a,
            sin: self.b,
        }
    }

    /// Transforms a point (rotation and translation)
    #[inline]
    pub fn transform_point(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Transforms a direction (rotation only)
    #[inline]
    pub fn transform_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// Returns the inverse transform
    pub fn inverse(&self) -> Self {
        let det = self.a * self.d - self.b * self.c;
        let inv_det = if det.abs() > crate::math::EPSILON { 1.0 / det } else { 0.0 };

        Self::new(
            self.d * inv_det,
            -self.b * inv_det,
            -self.c * inv_det,
            self.a * inv_det,
            (self.c * self.ty - self.d * self.tx) * inv_det,
            (self.b * self.tx - self.a * self.ty) * inv_det,
        )
    }

    /// Combines two transforms (`self` applied after `other`)
    pub fn combine(&self, other: &Self) -> Self {
        Self::new(
            self.a * other.a + self.c * other.b,
            self.b * other.a + self.d * other.b,
            self.a * other.c + self.c * other.d,
            self.b * other.c + self.d * other.d,
            self.a * other.tx + self.c * other.ty + self.tx,
            self.b * other.tx + self.d * other.ty + self.ty,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
