use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axis-aligned bounding box stored as (left, bottom, right, top)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl BoundingBox {
    /// Creates a new bounding box from its extents
    #[inline]
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self { left, bottom, right, top }
    }

    /// Creates a bounding box centered at a position with the given half extents
    #[inline]
    pub fn for_extents(center: Vector2, half_width: f32, half_height: f32) -> Self {
        Self::new(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }

    /// Creates the bounding box of a circle
    #[inline]
    pub fn for_circle(center: Vector2, radius: f32) -> Self {
        Self::for_extents(center, radius, radius)
    }

    /// Creates the bounding box of a segment with rounded ends
    #[inline]
    pub fn for_segment(a: Vector2, b: Vector2, radius: f32) -> Self {
        Self::new(
            a.x.min(b.x) - radius,
            a.y.min(b.y) - radius,
            a.x.max(b.x) + radius,
            a.y.max(b.y) + radius,
        )
    }

    /// Creates a bounding box from a set of points
    pub fn from_points(points: &[Vector2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bb = Self::new(first.x, first.y, first.x, first.y);

        for point in rest {
            bb = bb.expand_to_include(*point);
        }

        Some(bb)
    }

    /// Returns the center of the bounding box
    #[inline]
    pub fn center(&self) -> Vector2 {
        Vector2::new((self.left + self.right) * 0.5, (self.bottom + self.top) * 0.5)
    }

    /// Returns the width of the bounding box
    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Returns the height of the bounding box
    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Returns the area of the bounding box
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the area of the box that would contain both boxes
    #[inline]
    pub fn merged_area(&self, other: &Self) -> f32 {
        self.merge(other).area()
    }

    /// Checks if this bounding box intersects another (touching counts)
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    /// Checks if this bounding box fully contains another
    #[inline]
    pub fn contains_bb(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.bottom <= other.bottom
            && self.top >= other.top
    }

    /// Checks if this bounding box contains a point
    #[inline]
    pub fn contains_point(&self, point: Vector2) -> bool {
        self.left <= point.x && self.right >= point.x && self.bottom <= point.y && self.top >= point.y
    }

    /// Returns the smallest bounding box containing both boxes
    #[inline]
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(
            self.left.min(other.left),
            self.bottom.min(other.bottom),
            self.right.max(other.right),
            self.top.max(other.top),
        )
    }

    /// Returns a bounding box grown to include a point
    #[inline]
    pub fn expand_to_include(&self, point: Vector2) -> Self {
        Self::new(
            self.left.min(point.x),
            self.bottom.min(point.y),
            self.right.max(point.x),
            self.top.max(point.y),
        )
    }

    /// Returns a bounding box grown by a margin in all directions
    #[inline]
    pub fn grow(&self, margin: f32) -> Self {
        Self::new(
            self.left - margin,
            self.bottom - margin,
            self.right + margin,
            self.top + margin,
        )
    }

    /// Clamps a point to the inside of the bounding box
    #[inline]
    pub fn clamp_point(&self, point: Vector2) -> Vector2 {
        Vector2::new(
            point.x.clamp(self.left, self.right),
            point.y.clamp(self.bottom, self.top),
        )
    }

    /// Returns true if every extent is finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.bottom.is_finite() && self.right.is_finite() && self.top.is_finite()
    }

    /// Returns the fraction along the segment `a -> b` at which the segment
    /// enters the box, or `None` if it misses. A segment starting inside
    /// the box returns `Some(0.0)`.
    pub fn segment_query(&self, a: Vector2, b: Vector2) -> Option<f32> {
        let delta = b - a;
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;

        for (origin, dir, lo, hi) in [
            (a.x, delta.x, self.left, self.right),
            (a.y, delta.y, self.bottom, self.top),
        ] {
            if dir.abs() < crate::math::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
            } else {
                let inv = 1.0 / dir;
                let t1 = (lo - origin) * inv;
                let t2 = (hi - origin) * inv;
                t_min = t_min.max(t1.min(t2));
                t_max = t_max.min(t1.max(t2));
                if t_min > t_max {
                    return None;
                }
            }
        }

        Some(t_min)
    }
}
