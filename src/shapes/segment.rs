use crate::math::{closest_point_on_segment, BoundingBox, Transform, Vector2, EPSILON};
use crate::shapes::circle::circle_segment_query;
use crate::shapes::{PointQueryInfo, SegmentQueryInfo};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A line segment with rounded ends (a capsule when the radius is non-zero)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Segment {
    /// First endpoint in body space
    a: Vector2,

    /// Second endpoint in body space
    b: Vector2,

    /// Thickness radius
    radius: f32,

    /// World-space endpoints as of the last update
    pub(crate) world: [Vector2; 2],

    /// World-space face normals: `normals[0]` is the right-hand normal of `a -> b`
    pub(crate) normals: [Vector2; 2],
}

impl Segment {
    /// Creates a new segment between two body-space points
    pub fn new(a: Vector2, b: Vector2, radius: f32) -> Self {
        let n = (b - a).normalize().rperp();
        Self {
            a,
            b,
            radius,
            world: [a, b],
            normals: [n, -n],
        }
    }

    /// Returns the body-space endpoints
    pub fn get_endpoints(&self) -> (Vector2, Vector2) {
        (self.a, self.b)
    }

    /// Returns the world-space endpoints as of the last update
    pub fn get_world_endpoints(&self) -> (Vector2, Vector2) {
        (self.world[0], self.world[1])
    }

    /// Returns the thickness radius
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Returns the world-space normal
    pub fn get_normal(&self) -> Vector2 {
        self.normals[0]
    }

    pub(crate) fn update(&mut self, transform: &Transform) -> BoundingBox {
        let ta = transform.transform_point(self.a);
        let tb = transform.transform_point(self.b);
        let n = (tb - ta).normalize().rperp();

        self.world = [ta, tb];
        self.normals = [n, -n];

        BoundingBox::for_segment(ta, tb, self.radius)
    }

    pub(crate) fn point_query(&self, point: Vector2) -> PointQueryInfo {
        let [ta, tb] = self.world;
        let closest = closest_point_on_segment(point, ta, tb);

        let delta = point - closest;
        let d = delta.length();
        let gradient = if d > EPSILON { delta / d } else { self.normals[0] };

        PointQueryInfo {
            point: closest + gradient * self.radius,
            distance: d - self.radius,
            gradient,
        }
    }

    pub(crate) fn segment_query(&self, a: Vector2, b: Vector2, radius: f32) -> Option<SegmentQueryInfo> {
        let [ta, tb] = self.world;
        let n = self.normals[0];
        let d = (ta - a).dot(&n);
        let r = self.radius + radius;

        let flipped_n = if d > 0.0 { -n } else { n };
        let seg_offset = flipped_n * r - a;

        // Endpoints relative to `a`, pushed out by the combined radius.
        let seg_a = ta + seg_offset;
        let seg_b = tb + seg_offset;
        let delta = b - a;

        if delta.cross(&seg_a) * delta.cross(&seg_b) <= 0.0 {
            let d_offset = d + if d > 0.0 { -r } else { r };
            let ad = -d_offset;
            let bd = delta.dot(&n) - d_offset;

            if ad * bd < 0.0 {
                let t = ad / (ad - bd);
                return Some(SegmentQueryInfo {
                    point: a.lerp(&b, t) - flipped_n * radius,
                    normal: flipped_n,
                    alpha: t,
                });
            }
        } else if r != 0.0 {
            let hit_a = circle_segment_query(ta, self.radius, a, b, radius);
            let hit_b = circle_segment_query(tb, self.radius, a, b, radius);
            return match (hit_a, hit_b) {
                (Some(x), Some(y)) => Some(if x.alpha <= y.alpha { x } else { y }),
                (x, y) => x.or(y),
            };
        }

        None
    }
}
