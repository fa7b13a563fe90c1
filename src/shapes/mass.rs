//! Area, centroid and moment-of-inertia helpers for building dynamic bodies.

use crate::math::Vector2;
use std::f32::consts::PI;

/// Area of a hollow circle with inner radius `r1` and outer radius `r2`
pub fn area_for_circle(r1: f32, r2: f32) -> f32 {
    PI * (r1 * r1 - r2 * r2).abs()
}

/// Moment of inertia of a hollow circle, offset from the body's centre of gravity
pub fn moment_for_circle(mass: f32, r1: f32, r2: f32, offset: Vector2) -> f32 {
    mass * (0.5 * (r1 * r1 + r2 * r2) + offset.length_squared())
}

/// Area of a segment with rounded ends
pub fn area_for_segment(a: Vector2, b: Vector2, radius: f32) -> f32 {
    radius * (PI * radius + 2.0 * a.distance(&b))
}

/// Moment of inertia of a segment with rounded ends, approximated as a thin rod
pub fn moment_for_segment(mass: f32, a: Vector2, b: Vector2, radius: f32) -> f32 {
    let offset = a.lerp(&b, 0.5);
    let length = b.distance(&a) + 2.0 * radius;
    mass * ((length * length + 4.0 * radius * radius) / 12.0 + offset.length_squared())
}

/// Signed area of a polygon plus the area added by its rounding radius.
///
/// Counter-clockwise polygons have positive area.
pub fn area_for_polygon(vertices: &[Vector2], radius: f32) -> f32 {
    let count = vertices.len();
    let mut area = 0.0;
    let mut perimeter = 0.0;

    for i in 0..count {
        let v1 = vertices[i];
        let v2 = vertices[(i + 1) % count];
        area += v1.cross(&v2);
        perimeter += v1.distance(&v2);
    }

    radius * (PI * radius.abs() + perimeter) + area / 2.0
}

/// Centroid of a polygon
pub fn centroid_for_polygon(vertices: &[Vector2]) -> Vector2 {
    let count = vertices.len();
    let mut sum = 0.0;
    let mut centroid = Vector2::zero();

    for i in 0..count {
        let v1 = vertices[i];
        let v2 = vertices[(i + 1) % count];
        let cross = v1.cross(&v2);
        sum += cross;
        centroid += (v1 + v2) * cross;
    }

    if sum.abs() < crate::math::EPSILON {
        // Degenerate polygon: fall back to the vertex average
        let total = vertices.iter().fold(Vector2::zero(), |acc, v| acc + *v);
        return if count > 0 { total / count as f32 } else { total };
    }

    centroid / (3.0 * sum)
}

/// Moment of inertia of a solid polygon, with its vertices offset by `offset`
pub fn moment_for_polygon(mass: f32, vertices: &[Vector2], offset: Vector2, radius: f32) -> f32 {
    if vertices.len() == 2 {
        return moment_for_segment(mass, vertices[0] + offset, vertices[1] + offset, radius);
    }

    let count = vertices.len();
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;

    for i in 0..count {
        let v1 = vertices[i] + offset;
        let v2 = vertices[(i + 1) % count] + offset;

        let a = v2.cross(&v1);
        let b = v1.dot(&v1) + v1.dot(&v2) + v2.dot(&v2);

        sum1 += a * b;
        sum2 += a;
    }

    (mass * sum1) / (6.0 * sum2)
}

/// Moment of inertia of a solid box centred on the body
pub fn moment_for_box(mass: f32, width: f32, height: f32) -> f32 {
    mass * (width * width + height * height) / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_polygon_matches_box_formula() {
        let verts = [
            Vector2::new(-1.0, -0.5),
            Vector2::new(1.0, -0.5),
            Vector2::new(1.0, 0.5),
            Vector2::new(-1.0, 0.5),
        ];

        assert_relative_eq!(area_for_polygon(&verts, 0.0), 2.0);
        assert_relative_eq!(
            moment_for_polygon(3.0, &verts, Vector2::zero(), 0.0),
            moment_for_box(3.0, 2.0, 1.0),
            epsilon = 1e-5
        );
        assert_relative_eq!(centroid_for_polygon(&verts), Vector2::zero(), epsilon = 1e-6);
    }
}
