use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::{closest_point_on_segment, Vector2, EPSILON};
use crate::shapes::{Circle, Polygon, Segment, Shape, ShapeKind};

/// Reference-face preference used to keep the chosen face stable between frames
const FACE_SELECTION_TOLERANCE: f32 = 0.0005;

/// Minimum alignment between the closest-feature axis and a face normal for
/// a rounded contact to be treated as face-to-face
const FACE_ALIGNMENT: f32 = 0.995;

/// A single contact point produced by the narrow phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// World-space contact position, halfway between the two surfaces
    pub position: Vector2,

    /// Signed separation along the normal (negative when penetrating)
    pub distance: f32,

    /// Identifier derived from the generating features, stable across frames
    pub id: u32,
}

/// Contact points between two shapes sharing one normal pointing from the
/// first shape to the second
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactSet {
    /// The contact normal
    pub normal: Vector2,

    /// Up to two contact points
    pub points: Vec<ContactPoint>,
}

impl ContactSet {
    fn none() -> Self {
        Self::default()
    }

    fn single(normal: Vector2, position: Vector2, distance: f32, id: u32) -> Self {
        Self {
            normal,
            points: vec![ContactPoint { position, distance, id }],
        }
    }

    /// Returns true if there are no contact points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of contact points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

type CollideFn = fn(&mut NarrowPhase, &Shape, &Shape) -> ContactSet;

/// Collision routines indexed by `[kind_a][kind_b]`.
///
/// Each unordered pair of kinds is implemented once; the mirrored entries
/// swap the arguments and negate the normal.
const DISPATCH: [[CollideFn; 3]; 3] = [
    [circle_to_circle, circle_to_segment, circle_to_polygon],
    [segment_to_circle, segment_to_segment, segment_to_polygon],
    [polygon_to_circle, polygon_to_segment, polygon_to_polygon],
];

/// Exact shape-vs-shape contact generation
#[derive(Debug, Clone)]
pub struct NarrowPhase {
    /// Contacts separated by more than this are discarded
    tolerance: f32,

    /// Used to pick a normal when two circle centres coincide
    rng: StdRng,
}

impl NarrowPhase {
    /// Creates a new narrow phase
    pub fn new(tolerance: f32, seed: u64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the contact tolerance
    pub fn get_tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Sets the contact tolerance
    pub fn set_tolerance(&mut self, tolerance: f32) {
        self.tolerance = tolerance.max(0.0);
    }

    /// Generates contacts between two shapes whose world geometry is up to date.
    ///
    /// The normal points from `a` towards `b`.
    pub fn collide(&mut self, a: &Shape, b: &Shape) -> ContactSet {
        let collide_fn = DISPATCH[a.get_kind().index()][b.get_kind().index()];
        let mut set = collide_fn(self, a, b);

        let tolerance = self.tolerance;
        set.points.retain(|p| p.distance <= tolerance && p.position.is_finite());
        if !set.normal.is_finite() {
            set.points.clear();
        }
        set
    }

    fn random_direction(&mut self) -> Vector2 {
        Vector2::for_angle(self.rng.gen_range(0.0..std::f32::consts::TAU))
    }
}

fn as_circle(shape: &Shape) -> &Circle {
    match shape.get_kind() {
        ShapeKind::Circle(circle) => circle,
        _ => unreachable!("dispatch table routed a non-circle shape to a circle routine"),
    }
}

fn as_segment(shape: &Shape) -> &Segment {
    match shape.get_kind() {
        ShapeKind::Segment(segment) => segment,
        _ => unreachable!("dispatch table routed a non-segment shape to a segment routine"),
    }
}

fn as_polygon(shape: &Shape) -> &Polygon {
    match shape.get_kind() {
        ShapeKind::Polygon(polygon) => polygon,
        _ => unreachable!("dispatch table routed a non-polygon shape to a polygon routine"),
    }
}

fn circle_to_circle(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    let (c1, c2) = (as_circle(a), as_circle(b));
    let (r1, r2) = (c1.get_radius(), c2.get_radius());

    let delta = c2.center - c1.center;
    let min_dist = r1 + r2 + np.tolerance;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return ContactSet::none();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON { delta / dist } else { np.random_direction() };

    let p1 = c1.center + normal * r1;
    let p2 = c2.center - normal * r2;
    ContactSet::single(normal, (p1 + p2) * 0.5, dist - r1 - r2, 0)
}

fn circle_to_segment(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    let (circle, segment) = (as_circle(a), as_segment(b));
    let [ta, tb] = segment.world;
    let (rc, rs) = (circle.get_radius(), segment.get_radius());

    let closest = closest_point_on_segment(circle.center, ta, tb);
    let delta = closest - circle.center;
    let dist = delta.length();
    if dist - rc - rs > np.tolerance {
        return ContactSet::none();
    }

    let normal = if dist > EPSILON {
        delta / dist
    } else {
        // Centre on the segment: push out along the face normal
        -segment.normals[0]
    };

    let p1 = circle.center + normal * rc;
    let p2 = closest - normal * rs;
    ContactSet::single(normal, (p1 + p2) * 0.5, dist - rc - rs, 0)
}

fn circle_to_polygon(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    let (circle, polygon) = (as_circle(a), as_polygon(b));
    let verts = &polygon.world_vertices;
    let normals = &polygon.world_normals;
    let count = verts.len();
    let (rc, rp) = (circle.get_radius(), polygon.get_radius());
    let center = circle.center;

    // Deepest face and closest boundary point
    let mut max_sep = f32::NEG_INFINITY;
    let mut face = 0;
    let mut min_dist = f32::INFINITY;
    let mut closest = verts[0];
    let mut closest_edge = 0;

    for i in 0..count {
        let sep = normals[i].dot(&(center - verts[i]));
        if sep > max_sep {
            max_sep = sep;
            face = i;
        }

        let c = closest_point_on_segment(center, verts[i], verts[(i + 1) % count]);
        let d = center.distance(&c);
        if d < min_dist {
            min_dist = d;
            closest = c;
            closest_edge = i;
        }
    }

    if max_sep <= 0.0 {
        // Centre inside the polygon core
        let n = normals[face];
        let surface = center - n * max_sep;
        let p1 = center - n * rc;
        let p2 = surface + n * rp;
        return ContactSet::single(-n, (p1 + p2) * 0.5, max_sep - rc - rp, face as u32);
    }

    if min_dist - rc - rp > np.tolerance {
        return ContactSet::none();
    }

    let normal = if min_dist > EPSILON {
        (closest - center) / min_dist
    } else {
        -normals[closest_edge]
    };
    let p1 = center + normal * rc;
    let p2 = closest - normal * rp;
    ContactSet::single(normal, (p1 + p2) * 0.5, min_dist - rc - rp, closest_edge as u32)
}

fn segment_to_circle(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    circle_to_segment(np, b, a).flipped()
}

fn polygon_to_circle(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    circle_to_polygon(np, b, a).flipped()
}

fn polygon_to_segment(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    segment_to_polygon(np, b, a).flipped()
}

fn segment_to_segment(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    let (s1, s2) = (as_segment(a), as_segment(b));
    hull_to_hull(np, &segment_hull(s1), &segment_hull(s2))
}

fn segment_to_polygon(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    let (segment, polygon) = (as_segment(a), as_polygon(b));
    hull_to_hull(np, &segment_hull(segment), &polygon_hull(polygon))
}

fn polygon_to_polygon(np: &mut NarrowPhase, a: &Shape, b: &Shape) -> ContactSet {
    let (p1, p2) = (as_polygon(a), as_polygon(b));
    hull_to_hull(np, &polygon_hull(p1), &polygon_hull(p2))
}

/// A convex core (polygon, or a segment seen as a two-sided polygon)
/// inflated by a radius
struct Hull<'a> {
    vertices: &'a [Vector2],
    normals: &'a [Vector2],
    radius: f32,
}

impl Hull<'_> {
    fn count(&self) -> usize {
        self.vertices.len()
    }

    fn edge(&self, i: usize) -> (Vector2, Vector2) {
        (self.vertices[i], self.vertices[(i + 1) % self.count()])
    }
}

fn segment_hull(segment: &Segment) -> Hull<'_> {
    Hull {
        vertices: &segment.world,
        normals: &segment.normals,
        radius: segment.get_radius(),
    }
}

fn polygon_hull(polygon: &Polygon) -> Hull<'_> {
    Hull {
        vertices: &polygon.world_vertices,
        normals: &polygon.world_normals,
        radius: polygon.get_radius(),
    }
}

/// Largest separation of `b`'s core from any face of `a`'s core
fn find_max_separation(a: &Hull, b: &Hull) -> (f32, usize) {
    let mut best = (f32::NEG_INFINITY, 0);

    for i in 0..a.count() {
        let n = a.normals[i];
        let v = a.vertices[i];
        let sep = b
            .vertices
            .iter()
            .map(|w| n.dot(&(*w - v)))
            .fold(f32::INFINITY, f32::min);

        if sep > best.0 {
            best = (sep, i);
        }
    }

    best
}

/// Separation of `b`'s core past the end caps of a two-vertex core.
///
/// A segment core has no faces along its own direction, so two collinear
/// segments look overlapping to `find_max_separation` even when their ends
/// are apart.
fn find_cap_separation(a: &Hull, b: &Hull) -> f32 {
    if a.count() != 2 {
        return f32::NEG_INFINITY;
    }

    let (v1, v2) = (a.vertices[0], a.vertices[1]);
    let tangent = (v2 - v1).normalize();
    let min_along = |axis: Vector2, origin: Vector2| {
        b.vertices
            .iter()
            .map(|w| axis.dot(&(*w - origin)))
            .fold(f32::INFINITY, f32::min)
    };

    min_along(tangent, v2).max(min_along(-tangent, v1))
}

/// Index of the edge of `hull` most anti-parallel to `normal`
fn find_incident_edge(hull: &Hull, normal: Vector2) -> usize {
    let mut best = (f32::INFINITY, 0);
    for (i, n) in hull.normals.iter().enumerate() {
        let d = n.dot(&normal);
        if d < best.0 {
            best = (d, i);
        }
    }
    best.1
}

#[derive(Clone, Copy)]
struct ClipVertex {
    point: Vector2,
    id: u32,
}

/// Keeps the part of the segment on the non-negative side of the plane `n·x >= offset`
fn clip_segment(input: [ClipVertex; 2], n: Vector2, offset: f32, clip_id: u32) -> Option<[ClipVertex; 2]> {
    let d0 = n.dot(&input[0].point) - offset;
    let d1 = n.dot(&input[1].point) - offset;

    let mut out = Vec::with_capacity(2);
    if d0 >= 0.0 {
        out.push(input[0]);
    }
    if d1 >= 0.0 {
        out.push(input[1]);
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out.push(ClipVertex {
            point: input[0].point.lerp(&input[1].point, t),
            id: clip_id,
        });
    }

    match out.as_slice() {
        [first, second, ..] => Some([*first, *second]),
        _ => None,
    }
}

fn feature_id(reference_edge: usize, feature: u32, flipped: bool) -> u32 {
    ((reference_edge as u32 & 0xFF) << 16) | ((feature & 0xFF) << 8) | flipped as u32
}

/// Clips the incident edge against the reference face and emits up to two
/// contacts. The normal of the result points from `a` to `b`.
fn clip_contacts(
    tolerance: f32,
    reference: &Hull,
    incident: &Hull,
    edge: usize,
    flipped: bool,
) -> ContactSet {
    let nr = reference.normals[edge];
    let (v1, v2) = reference.edge(edge);

    let inc = find_incident_edge(incident, nr);
    let (w1, w2) = incident.edge(inc);
    let next = ((inc + 1) % incident.count()) as u32;

    let tangent = (v2 - v1).normalize();
    let input = [
        ClipVertex { point: w1, id: feature_id(edge, inc as u32, flipped) },
        ClipVertex { point: w2, id: feature_id(edge, next, flipped) },
    ];

    let clipped = clip_segment(input, tangent, tangent.dot(&v1), feature_id(edge, 0x80, flipped))
        .and_then(|c| clip_segment(c, -tangent, -tangent.dot(&v2), feature_id(edge, 0x81, flipped)));

    let Some(clipped) = clipped else {
        return ContactSet::none();
    };

    let r_total = reference.radius + incident.radius;
    let normal = if flipped { -nr } else { nr };
    let points = clipped
        .iter()
        .filter_map(|cv| {
            let depth = nr.dot(&(cv.point - v1));
            let distance = depth - r_total;
            if distance > tolerance {
                return None;
            }
            let on_reference = cv.point - nr * depth + nr * reference.radius;
            let on_incident = cv.point - nr * incident.radius;
            Some(ContactPoint {
                position: (on_reference + on_incident) * 0.5,
                distance,
                id: cv.id,
            })
        })
        .collect();

    ContactSet { normal, points }
}

/// Contact generation between two rounded convex hulls.
///
/// Overlapping cores use the separating-axis test with face clipping.
/// Disjoint cores (touching only through their radii) use the exact
/// closest features, falling back to face clipping when the closest axis
/// is a face normal so that resting rounded shapes get two points.
fn hull_to_hull(np: &mut NarrowPhase, a: &Hull, b: &Hull) -> ContactSet {
    let tolerance = np.tolerance;
    let r_total = a.radius + b.radius;

    let (sep_a, edge_a) = find_max_separation(a, b);
    if sep_a - r_total > tolerance {
        return ContactSet::none();
    }
    let (sep_b, edge_b) = find_max_separation(b, a);
    if sep_b - r_total > tolerance {
        return ContactSet::none();
    }

    let cap = find_cap_separation(a, b).max(find_cap_separation(b, a));
    if cap - r_total > tolerance {
        return ContactSet::none();
    }

    if sep_a.max(sep_b).max(cap) <= 0.0 {
        return if sep_b > sep_a + FACE_SELECTION_TOLERANCE {
            clip_contacts(tolerance, b, a, edge_b, true)
        } else {
            clip_contacts(tolerance, a, b, edge_a, false)
        };
    }

    // Cores are disjoint: find the closest pair of features.
    let (dist, pa, pb, id) = closest_features(a, b);
    if dist - r_total > tolerance {
        return ContactSet::none();
    }
    if dist <= EPSILON {
        return clip_contacts(tolerance, a, b, edge_a, false);
    }

    let n = (pb - pa) / dist;

    let (align_a, face_a) = best_face(a, n);
    let (align_b, face_b) = best_face(b, -n);

    if align_a.max(align_b) >= FACE_ALIGNMENT {
        let set = if align_b > align_a + FACE_SELECTION_TOLERANCE {
            clip_contacts(tolerance, b, a, face_b, true)
        } else {
            clip_contacts(tolerance, a, b, face_a, false)
        };
        if !set.is_empty() {
            return set;
        }
    }

    let p1 = pa + n * a.radius;
    let p2 = pb - n * b.radius;
    ContactSet::single(n, (p1 + p2) * 0.5, dist - r_total, id)
}

/// Face of `hull` whose normal is most aligned with `axis`
fn best_face(hull: &Hull, axis: Vector2) -> (f32, usize) {
    hull.normals
        .iter()
        .enumerate()
        .map(|(i, m)| (m.dot(&axis), i))
        .fold((f32::NEG_INFINITY, 0), |best, cur| if cur.0 > best.0 { cur } else { best })
}

/// Closest points between two disjoint convex cores
fn closest_features(a: &Hull, b: &Hull) -> (f32, Vector2, Vector2, u32) {
    let mut best = (f32::INFINITY, a.vertices[0], b.vertices[0], 0u32);

    for (i, v) in a.vertices.iter().enumerate() {
        for j in 0..b.count() {
            let (w1, w2) = b.edge(j);
            let c = closest_point_on_segment(*v, w1, w2);
            let d = v.distance(&c);
            if d < best.0 {
                best = (d, *v, c, 0x0100_0000 | ((i as u32) << 8) | j as u32);
            }
        }
    }

    for (j, w) in b.vertices.iter().enumerate() {
        for i in 0..a.count() {
            let (v1, v2) = a.edge(i);
            let c = closest_point_on_segment(*w, v1, v2);
            let d = w.distance(&c);
            if d < best.0 {
                best = (d, c, *w, 0x0200_0000 | ((j as u32) << 8) | i as u32);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BodyHandle, Handle};
    use crate::math::Transform;
    use approx::assert_relative_eq;

    fn body() -> BodyHandle {
        BodyHandle::from_raw_parts(0, 0)
    }

    fn placed(mut shape: Shape, x: f32, y: f32) -> Shape {
        shape.update(&Transform::from_position(Vector2::new(x, y)));
        shape
    }

    #[test]
    fn overlapping_circles_produce_one_point() {
        let mut np = NarrowPhase::new(0.001, 1);
        let a = placed(Shape::circle(body(), 1.0, Vector2::zero()).unwrap(), 0.0, 0.0);
        let b = placed(Shape::circle(body(), 1.0, Vector2::zero()).unwrap(), 1.5, 0.0);

        let set = np.collide(&a, &b);
        assert_eq!(set.len(), 1);
        assert_relative_eq!(set.normal, Vector2::new(1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(set.points[0].distance, -0.5, epsilon = 1e-6);
        assert_relative_eq!(set.points[0].position, Vector2::new(0.75, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn reversed_dispatch_negates_normal() {
        let mut np = NarrowPhase::new(0.001, 1);
        let circle = placed(Shape::circle(body(), 0.5, Vector2::zero()).unwrap(), 0.0, 0.4);
        let floor = placed(
            Shape::segment(body(), Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0), 0.0).unwrap(),
            0.0,
            0.0,
        );

        let forward = np.collide(&circle, &floor);
        let backward = np.collide(&floor, &circle);
        assert_eq!(forward.len(), 1);
        assert_relative_eq!(forward.normal, Vector2::new(0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(backward.normal, -forward.normal, epsilon = 1e-6);
        assert_relative_eq!(forward.points[0].distance, backward.points[0].distance, epsilon = 1e-6);
    }

    #[test]
    fn box_resting_on_box_gets_two_points() {
        let mut np = NarrowPhase::new(0.001, 1);
        let ground = placed(Shape::box_shape(body(), 10.0, 1.0, 0.0).unwrap(), 0.0, 0.0);
        let crate_box = placed(Shape::box_shape(body(), 1.0, 1.0, 0.0).unwrap(), 0.0, 0.99);

        let set = np.collide(&ground, &crate_box);
        assert_eq!(set.len(), 2);
        assert_relative_eq!(set.normal, Vector2::new(0.0, 1.0), epsilon = 1e-6);
        for point in &set.points {
            assert_relative_eq!(point.distance, -0.01, epsilon = 1e-5);
        }
        assert_ne!(set.points[0].id, set.points[1].id);
    }

    #[test]
    fn separated_shapes_have_no_contacts() {
        let mut np = NarrowPhase::new(0.001, 1);
        let a = placed(Shape::box_shape(body(), 1.0, 1.0, 0.0).unwrap(), 0.0, 0.0);
        let b = placed(Shape::box_shape(body(), 1.0, 1.0, 0.0).unwrap(), 1.1, 0.0);
        let c = placed(Shape::circle(body(), 0.5, Vector2::zero()).unwrap(), 0.0, 1.2);

        assert!(np.collide(&a, &b).is_empty());
        assert!(np.collide(&a, &c).is_empty());
    }

    #[test]
    fn rounded_segments_touching_in_parallel_get_two_points() {
        let mut np = NarrowPhase::new(0.001, 1);
        let a = placed(
            Shape::segment(body(), Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0), 0.1).unwrap(),
            0.0,
            0.0,
        );
        let b = placed(
            Shape::segment(body(), Vector2::new(-0.5, 0.0), Vector2::new(0.5, 0.0), 0.1).unwrap(),
            0.0,
            0.15,
        );

        let set = np.collide(&a, &b);
        assert_eq!(set.len(), 2);
        assert_relative_eq!(set.normal, Vector2::new(0.0, 1.0), epsilon = 1e-5);
        for point in &set.points {
            assert_relative_eq!(point.distance, -0.05, epsilon = 1e-5);
        }
    }

    #[test]
    fn collinear_capsules_collide_end_to_end() {
        let mut np = NarrowPhase::new(0.001, 1);
        let a = placed(
            Shape::segment(body(), Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 0.3).unwrap(),
            0.0,
            0.0,
        );
        let b = placed(
            Shape::segment(body(), Vector2::new(1.5, 0.0), Vector2::new(2.5, 0.0), 0.3).unwrap(),
            0.0,
            0.0,
        );

        let set = np.collide(&a, &b);
        assert_eq!(set.len(), 1);
        assert_relative_eq!(set.normal, Vector2::new(1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(set.points[0].distance, -0.1, epsilon = 1e-5);
        assert_relative_eq!(set.points[0].position, Vector2::new(1.25, 0.0), epsilon = 1e-5);

        // Far enough apart that the rounded ends no longer touch.
        let c = placed(
            Shape::segment(body(), Vector2::new(1.7, 0.0), Vector2::new(2.7, 0.0), 0.3).unwrap(),
            0.0,
            0.0,
        );
        assert!(np.collide(&a, &c).is_empty());
    }
}
