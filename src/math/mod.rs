mod vector;
mod matrix;
mod transform;
mod rotation;
mod bounding_box;

pub use vector::Vector2;
pub use matrix::Matrix2;
pub use transform::Transform;
pub use rotation::Rotation;
pub use bounding_box::BoundingBox;

/// Constant for a very small number, used for comparisons
pub const EPSILON: f32 = 1.0e-6;

/// Returns true if the value is approximately zero
#[inline]
pub fn approx_zero(a: f32) -> bool {
    a.abs() < EPSILON
}

/// Clamps a value between a minimum and maximum value
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Returns the closest point to `p` on the segment `a -> b`
#[inline]
pub fn closest_point_on_segment(p: Vector2, a: Vector2, b: Vector2) -> Vector2 {
    let delta = a - b;
    let len_sq = delta.length_squared();
    if len_sq < EPSILON {
        return a;
    }
    let t = clamp(delta.dot(&(p - b)) / len_sq, 0.0, 1.0);
    b + delta * t
}
