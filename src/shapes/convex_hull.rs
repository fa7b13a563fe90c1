use crate::math::Vector2;

/// Computes the convex hull of a point set using the monotone chain
/// algorithm.
///
/// The result winds counter-clockwise, starts at the lowest-leftmost point
/// and has no collinear or duplicate vertices. Points closer than
/// `tolerance` to a hull edge are treated as lying on it.
pub fn convex_hull(points: &[Vector2], tolerance: f32) -> Vec<Vector2> {
    let mut sorted: Vec<Vector2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup_by(|a, b| a.near(b, tolerance.max(f32::EPSILON)));

    if sorted.len() < 3 {
        return sorted;
    }

    // Twice the signed area of (o, a, b), scaled so that `tolerance` is a distance.
    let turns_left = |o: Vector2, a: Vector2, b: Vector2| {
        let edge = a - o;
        let len = edge.length();
        (edge.cross(&(b - o))) > tolerance * len
    };

    let mut lower: Vec<Vector2> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && !turns_left(lower[lower.len() - 2], lower[lower.len() - 1], p) {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Vector2> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && !turns_left(upper[upper.len() - 2], upper[upper.len() - 1], p) {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    // Start from the lowest, then leftmost vertex.
    if let Some(start) = lower
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        })
        .map(|(i, _)| i)
    {
        lower.rotate_left(start);
    }

    lower
}

/// Returns true if the vertices form a convex polygon wound counter-clockwise
pub fn is_convex_ccw(vertices: &[Vector2]) -> bool {
    let count = vertices.len();
    if count < 3 {
        return false;
    }

    (0..count).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % count];
        let c = vertices[(i + 2) % count];
        (b - a).cross(&(c - b)) > 0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_and_collinear_points_are_dropped() {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(2.0, 2.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 2.0),
        ];

        let hull = convex_hull(&points, 0.0);
        assert_eq!(hull.len(), 4);
        assert_eq!(hull[0], Vector2::new(0.0, 0.0));
        assert!(is_convex_ccw(&hull));
    }

    #[test]
    fn clockwise_input_is_rewound() {
        let points = [
            Vector2::new(-1.0, -1.0),
            Vector2::new(-1.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, -1.0),
        ];

        assert!(!is_convex_ccw(&points));
        assert!(is_convex_ccw(&convex_hull(&points, 0.0)));
    }
}
