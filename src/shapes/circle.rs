use crate::math::{BoundingBox, Transform, Vector2, EPSILON};
use crate::shapes::{PointQueryInfo, SegmentQueryInfo};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A circle collision shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Circle {
    /// Centre of the circle in body space
    offset: Vector2,

    /// The radius of the circle
    radius: f32,

    /// Centre of the circle in world space, refreshed by `update`
    pub(crate) center: Vector2,
}

impl Circle {
    /// Creates a new circle with the given radius and body-space offset
    pub fn new(radius: f32, offset: Vector2) -> Self {
        Self {
            offset,
            radius,
            center: offset,
        }
    }

    /// Returns the radius of the circle
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Returns the body-space offset of the centre
    pub fn get_offset(&self) -> Vector2 {
        self.offset
    }

    /// Returns the world-space centre as of the last update
    pub fn get_center(&self) -> Vector2 {
        self.center
    }

    pub(crate) fn update(&mut self, transform: &Transform) -> BoundingBox {
        self.center = transform.transform_point(self.offset);
        BoundingBox::for_circle(self.center, self.radius)
    }

    pub(crate) fn point_query(&self, point: Vector2) -> PointQueryInfo {
        let delta = point - self.center;
        let d = delta.length();
        let gradient = if d > EPSILON { delta / d } else { Vector2::unit_y() };

        PointQueryInfo {
            point: self.center + gradient * self.radius,
            distance: d - self.radius,
            gradient,
        }
    }

    pub(crate) fn segment_query(&self, a: Vector2, b: Vector2, radius: f32) -> Option<SegmentQueryInfo> {
        circle_segment_query(self.center, self.radius, a, b, radius)
    }
}

/// Sweeps a circle of radius `r2` from `a` to `b` against a circle at `center`
pub(crate) fn circle_segment_query(
    center: Vector2,
    r1: f32,
    a: Vector2,
    b: Vector2,
    r2: f32,
) -> Option<SegmentQueryInfo> {
    let da = a - center;
    let db = b - center;
    let rsum = r1 + r2;

    let qa = da.dot(&da) - 2.0 * da.dot(&db) + db.dot(&db);
    let qb = da.dot(&db) - da.dot(&da);
    let det = qb * qb - qa * (da.dot(&da) - rsum * rsum);

    if det < 0.0 || qa.abs() < EPSILON {
        return None;
    }

    let t = (-qb - det.sqrt()) / qa;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let normal = da.lerp(&db, t).normalize();
    Some(SegmentQueryInfo {
        point: a.lerp(&b, t) - normal * r2,
        normal,
        alpha: t,
    })
}
