use planar_phys::{
    core::{BodyHandle, Handle},
    error::PhysicsError,
    math::{BoundingBox, Transform, Vector2},
    shapes::{convex_hull, mass, Shape, ShapeKind},
};
use std::f32::consts::PI;
use approx::assert_relative_eq;

fn body() -> BodyHandle {
    BodyHandle::from_raw_parts(1, 0)
}

#[test]
fn test_circle_geometry() {
    let mut circle = Shape::circle(body(), 1.0, Vector2::new(1.0, 0.0)).unwrap();
    assert_eq!(circle.get_kind().name(), "circle");
    assert_relative_eq!(circle.area(), PI);

    // Moving the body moves the world-space centre
    let bb = circle.update(&Transform::from_position(Vector2::new(2.0, 0.0)));
    assert_eq!(bb, BoundingBox::new(2.0, -1.0, 4.0, 1.0));

    let info = circle.point_query(Vector2::new(6.0, 0.0));
    assert_relative_eq!(info.distance, 2.0, epsilon = 1e-6);
    assert_relative_eq!(info.point.x, 4.0, epsilon = 1e-6);
    assert_eq!(info.gradient, Vector2::unit_x());

    // Inside points have a negative distance
    let inside = circle.point_query(Vector2::new(3.5, 0.0));
    assert_relative_eq!(inside.distance, -0.5, epsilon = 1e-6);
}

#[test]
fn test_circle_segment_query() {
    let circle = Shape::circle(body(), 1.0, Vector2::zero()).unwrap();

    let hit = circle
        .segment_query(Vector2::new(-3.0, 0.0), Vector2::new(3.0, 0.0), 0.0)
        .unwrap();
    assert_relative_eq!(hit.alpha, 1.0 / 3.0, epsilon = 1e-5);
    assert_relative_eq!(hit.point.x, -1.0, epsilon = 1e-5);
    assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-5);

    // A fat query hits earlier
    let fat = circle
        .segment_query(Vector2::new(-3.0, 0.0), Vector2::new(3.0, 0.0), 0.5)
        .unwrap();
    assert!(fat.alpha < hit.alpha);

    assert!(circle
        .segment_query(Vector2::new(-3.0, 2.0), Vector2::new(3.0, 2.0), 0.0)
        .is_none());
}

#[test]
fn test_segment_geometry() {
    let segment = Shape::segment(body(), Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0), 0.0).unwrap();

    let info = segment.point_query(Vector2::new(0.0, 2.0));
    assert_relative_eq!(info.distance, 2.0, epsilon = 1e-6);
    assert_relative_eq!(info.point.y, 0.0, epsilon = 1e-6);

    let hit = segment
        .segment_query(Vector2::new(0.0, 2.0), Vector2::new(0.0, -2.0), 0.0)
        .unwrap();
    assert_relative_eq!(hit.alpha, 0.5, epsilon = 1e-5);
    assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-5);

    if let ShapeKind::Segment(inner) = segment.get_kind() {
        assert_eq!(inner.get_endpoints(), (Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)));
    } else {
        panic!("expected a segment");
    }
}

#[test]
fn test_box_geometry() {
    let mut shape = Shape::box_shape(body(), 2.0, 2.0, 0.0).unwrap();
    assert_relative_eq!(shape.area(), 4.0, epsilon = 1e-6);
    assert_relative_eq!(shape.moment_for_mass(1.0), mass::moment_for_box(1.0, 2.0, 2.0), epsilon = 1e-5);

    shape.update(&Transform::identity());

    let outside = shape.point_query(Vector2::new(3.0, 0.0));
    assert_relative_eq!(outside.distance, 2.0, epsilon = 1e-6);
    assert_relative_eq!(outside.gradient.x, 1.0, epsilon = 1e-6);

    let inside = shape.point_query(Vector2::new(0.5, 0.0));
    assert_relative_eq!(inside.distance, -0.5, epsilon = 1e-6);
    assert_relative_eq!(inside.gradient.x, 1.0, epsilon = 1e-6);

    let hit = shape
        .segment_query(Vector2::new(-3.0, 0.0), Vector2::new(3.0, 0.0), 0.0)
        .unwrap();
    assert_relative_eq!(hit.alpha, 1.0 / 3.0, epsilon = 1e-5);
    assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-5);
}

#[test]
fn test_polygon_uses_convex_hull() {
    let points = [
        Vector2::new(0.0, 1.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.5, 0.5),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 0.0),
    ];

    let hull = convex_hull(&points, 0.0);
    assert_eq!(
        hull,
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ]
    );

    let shape = Shape::polygon(body(), &points, 0.0).unwrap();
    match shape.get_kind() {
        ShapeKind::Polygon(polygon) => assert_eq!(polygon.vertex_count(), 4),
        _ => panic!("expected a polygon"),
    }
}

#[test]
fn test_invalid_geometry_is_rejected() {
    assert!(matches!(
        Shape::circle(body(), 0.0, Vector2::zero()),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        Shape::segment(body(), Vector2::zero(), Vector2::zero(), 0.1),
        Err(PhysicsError::DegenerateGeometry(_))
    ));

    let collinear = [Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), Vector2::new(2.0, 0.0)];
    assert!(matches!(
        Shape::polygon(body(), &collinear, 0.0),
        Err(PhysicsError::DegenerateGeometry(_))
    ));
    assert!(matches!(
        Shape::box_shape(body(), 1.0, 1.0, -1.0),
        Err(PhysicsError::InvalidParameter(_))
    ));
}

#[test]
fn test_mass_helpers() {
    assert_relative_eq!(mass::area_for_circle(0.0, 2.0), 4.0 * PI);
    assert_relative_eq!(mass::moment_for_circle(2.0, 0.0, 1.0, Vector2::zero()), 1.0);

    // Parallel axis theorem
    let offset = Vector2::new(3.0, 0.0);
    assert_relative_eq!(mass::moment_for_circle(2.0, 0.0, 1.0, offset), 1.0 + 2.0 * 9.0);

    let square = [
        Vector2::new(-1.0, -1.0),
        Vector2::new(1.0, -1.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(-1.0, 1.0),
    ];
    assert_relative_eq!(mass::area_for_polygon(&square, 0.0), 4.0);
    assert_eq!(mass::centroid_for_polygon(&square), Vector2::zero());
}

#[test]
fn test_shape_properties() {
    let shape = Shape::circle(body(), 1.0, Vector2::zero())
        .unwrap()
        .with_friction(0.3)
        .with_elasticity(0.8)
        .with_sensor(true)
        .with_collision_type(7);

    assert_eq!(shape.get_body(), body());
    assert_relative_eq!(shape.get_friction(), 0.3);
    assert_relative_eq!(shape.get_elasticity(), 0.8);
    assert!(shape.is_sensor());
    assert_eq!(shape.get_collision_type(), 7);
}
