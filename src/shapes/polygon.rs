use crate::error::PhysicsError;
use crate::math::{closest_point_on_segment, BoundingBox, Transform, Vector2, EPSILON};
use crate::shapes::circle::circle_segment_query;
use crate::shapes::convex_hull::convex_hull;
use crate::shapes::{PointQueryInfo, SegmentQueryInfo};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A convex polygon with an optional rounding radius.
///
/// Vertices are stored counter-clockwise. Edge `i` runs from vertex `i` to
/// vertex `i + 1` and `normals[i]` is its outward normal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Polygon {
    /// Vertices in body space
    vertices: Vec<Vector2>,

    /// Edge normals in body space
    local_normals: Vec<Vector2>,

    /// Rounding radius
    radius: f32,

    /// World-space vertices as of the last update
    pub(crate) world_vertices: Vec<Vector2>,

    /// World-space edge normals as of the last update
    pub(crate) world_normals: Vec<Vector2>,
}

impl Polygon {
    /// Creates a polygon from the convex hull of the given points
    pub fn new(points: &[Vector2], radius: f32) -> Result<Self> {
        Self::with_transform(points, &Transform::identity(), radius)
    }

    /// Creates a polygon from the convex hull of the points after applying `transform`
    pub fn with_transform(points: &[Vector2], transform: &Transform, radius: f32) -> Result<Self> {
        let transformed: Vec<Vector2> = points.iter().map(|p| transform.transform_point(*p)).collect();
        let vertices = convex_hull(&transformed, 0.0);

        if vertices.len() < 3 {
            return Err(PhysicsError::DegenerateGeometry(format!(
                "polygon needs at least 3 non-collinear vertices, got {}",
                vertices.len()
            )));
        }
        if !(radius >= 0.0) || !radius.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "polygon radius must be finite and non-negative, got {radius}"
            )));
        }

        let local_normals = edge_normals(&vertices);

        Ok(Self {
            world_vertices: vertices.clone(),
            world_normals: local_normals.clone(),
            vertices,
            local_normals,
            radius,
        })
    }

    /// Creates an axis-aligned box polygon centred on the body
    pub fn new_box(width: f32, height: f32, radius: f32) -> Result<Self> {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self::new_box_from_bb(BoundingBox::new(-hw, -hh, hw, hh), radius)
    }

    /// Creates an axis-aligned box polygon covering `bb` in body space
    pub fn new_box_from_bb(bb: BoundingBox, radius: f32) -> Result<Self> {
        let points = [
            Vector2::new(bb.right, bb.bottom),
            Vector2::new(bb.right, bb.top),
            Vector2::new(bb.left, bb.top),
            Vector2::new(bb.left, bb.bottom),
        ];
        Self::new(&points, radius)
    }

    /// Returns the body-space vertices
    pub fn get_vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    /// Returns the world-space vertices as of the last update
    pub fn get_world_vertices(&self) -> &[Vector2] {
        &self.world_vertices
    }

    /// Returns the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the rounding radius
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    pub(crate) fn update(&mut self, transform: &Transform) -> BoundingBox {
        let mut bb = BoundingBox::new(f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);

        for (i, (v, n)) in self.vertices.iter().zip(self.local_normals.iter()).enumerate() {
            let wv = transform.transform_point(*v);
            self.world_vertices[i] = wv;
            self.world_normals[i] = transform.transform_vector(*n);
            bb = bb.expand_to_include(wv);
        }

        bb.grow(self.radius)
    }

    pub(crate) fn point_query(&self, point: Vector2) -> PointQueryInfo {
        let count = self.world_vertices.len();
        let mut inside = true;
        let mut min_dist = f32::INFINITY;
        let mut closest = self.world_vertices[0];
        let mut closest_normal = self.world_normals[0];

        for i in 0..count {
            let a = self.world_vertices[i];
            let b = self.world_vertices[(i + 1) % count];
            let n = self.world_normals[i];

            if n.dot(&(point - a)) > 0.0 {
                inside = false;
            }

            let c = closest_point_on_segment(point, a, b);
            let d = point.distance(&c);
            if d < min_dist {
                min_dist = d;
                closest = c;
                closest_normal = n;
            }
        }

        let dist = if inside { -min_dist } else { min_dist };
        let gradient = if min_dist > EPSILON {
            (point - closest) * (dist.signum() / min_dist)
        } else {
            closest_normal
        };

        PointQueryInfo {
            point: closest + gradient * self.radius,
            distance: dist - self.radius,
            gradient,
        }
    }

    pub(crate) fn segment_query(&self, a: Vector2, b: Vector2, radius: f32) -> Option<SegmentQueryInfo> {
        let count = self.world_vertices.len();
        let rsum = self.radius + radius;
        let mut best: Option<SegmentQueryInfo> = None;

        for i in 0..count {
            let n = self.world_normals[i];
            let v0 = self.world_vertices[i];
            let v1 = self.world_vertices[(i + 1) % count];

            let an = a.dot(&n);
            let d = an - v0.dot(&n) - rsum;
            if d < 0.0 {
                continue;
            }

            let bn = b.dot(&n);
            let denom = an - bn;
            if denom.abs() < EPSILON {
                continue;
            }
            let t = d / denom;
            if !(0.0..=1.0).contains(&t) {
                continue;
            }

            let point = a.lerp(&b, t);
            let dt = n.cross(&point);
            let dt_min = n.cross(&v0);
            let dt_max = n.cross(&v1);

            if dt_min <= dt && dt <= dt_max && best.as_ref().map_or(true, |hit| t < hit.alpha) {
                best = Some(SegmentQueryInfo {
                    point: point - n * radius,
                    normal: n,
                    alpha: t,
                });
            }
        }

        // Rounded corners
        if rsum > 0.0 {
            for v in &self.world_vertices {
                if let Some(hit) = circle_segment_query(*v, self.radius, a, b, radius) {
                    if best.as_ref().map_or(true, |current| hit.alpha < current.alpha) {
                        best = Some(hit);
                    }
                }
            }
        }

        best
    }
}

fn edge_normals(vertices: &[Vector2]) -> Vec<Vector2> {
    let count = vertices.len();
    (0..count)
        .map(|i| (vertices[(i + 1) % count] - vertices[i]).normalize().rperp())
        .collect()
}
