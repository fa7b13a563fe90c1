use planar_phys::math::{closest_point_on_segment, BoundingBox, Matrix2, Rotation, Transform, Vector2};
use std::f32::consts::PI;
use approx::assert_relative_eq;

#[test]
fn test_vector2_operations() {
    let v1 = Vector2::new(1.0, 2.0);
    let v2 = Vector2::new(3.0, 4.0);

    // Arithmetic
    let sum = v1 + v2;
    assert_eq!(sum, Vector2::new(4.0, 6.0));
    assert_eq!(v2 - v1, Vector2::new(2.0, 2.0));
    assert_eq!(v1 * 2.0, Vector2::new(2.0, 4.0));
    assert_eq!(-v1, Vector2::new(-1.0, -2.0));

    // Products
    assert_eq!(v1.dot(&v2), 11.0);
    assert_eq!(v1.cross(&v2), 1.0 * 4.0 - 2.0 * 3.0);

    // Length
    assert_relative_eq!(v2.length(), 5.0);
    assert_relative_eq!(v2.normalize().length(), 1.0);
    assert!(Vector2::zero().normalize().is_zero());

    // Perpendiculars
    assert_eq!(Vector2::unit_x().perp(), Vector2::unit_y());
    assert_eq!(Vector2::unit_x().rperp(), -Vector2::unit_y());
}

#[test]
fn test_vector2_rotation_helpers() {
    let v = Vector2::new(2.0, 0.0);
    let quarter = Vector2::for_angle(PI / 2.0);

    let rotated = v.rotate(&quarter);
    assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(rotated.y, 2.0, epsilon = 1e-6);

    let back = rotated.unrotate(&quarter);
    assert_relative_eq!(back.x, 2.0, epsilon = 1e-6);
    assert_relative_eq!(back.y, 0.0, epsilon = 1e-6);

    // w x r
    let cross = Vector2::cross_scalar(2.0, &Vector2::new(1.0, 0.0));
    assert_eq!(cross, Vector2::new(0.0, 2.0));

    // Projection and clamping
    let projected = Vector2::new(3.0, 4.0).project(&Vector2::unit_x());
    assert_eq!(projected, Vector2::new(3.0, 0.0));
    assert_relative_eq!(Vector2::new(3.0, 4.0).clamp_length(1.0).length(), 1.0, epsilon = 1e-6);
    assert_eq!(Vector2::new(0.3, 0.4).clamp_length(1.0), Vector2::new(0.3, 0.4));
}

#[test]
fn test_rotation_operations() {
    let rotation = Rotation::from_angle(PI / 2.0);
    assert_relative_eq!(rotation.angle(), PI / 2.0, epsilon = 1e-6);

    let rotated = rotation.rotate_vector(Vector2::unit_x());
    assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-6);

    let restored = rotation.inverse_rotate_vector(rotated);
    assert_relative_eq!(restored.x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(restored.y, 0.0, epsilon = 1e-6);
}

#[test]
fn test_transform_operations() {
    let transform = Transform::from_position_angle(Vector2::new(1.0, 2.0), PI / 2.0);

    // Rotate (1, 0) to (0, 1), then translate
    let point = transform.transform_point(Vector2::new(1.0, 0.0));
    assert_relative_eq!(point.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(point.y, 3.0, epsilon = 1e-5);

    // Vectors ignore translation
    let vector = transform.transform_vector(Vector2::new(1.0, 0.0));
    assert_relative_eq!(vector.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(vector.y, 1.0, epsilon = 1e-5);

    let original = transform.inverse().transform_point(point);
    assert_relative_eq!(original.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(original.y, 0.0, epsilon = 1e-5);

    let shift = Transform::from_position(Vector2::new(5.0, 0.0));
    let combined = shift.combine(&transform);
    let moved = combined.transform_point(Vector2::new(1.0, 0.0));
    assert_relative_eq!(moved.x, 6.0, epsilon = 1e-5);
    assert_relative_eq!(moved.y, 3.0, epsilon = 1e-5);
}

#[test]
fn test_matrix2_operations() {
    let m = Matrix2::new(4.0, 7.0, 2.0, 6.0);
    assert_relative_eq!(m.determinant(), 10.0);

    let inverse = m.inverse().unwrap();
    let v = Vector2::new(1.0, 2.0);
    let round_trip = inverse.transform(m.transform(v));
    assert_relative_eq!(round_trip.x, v.x, epsilon = 1e-5);
    assert_relative_eq!(round_trip.y, v.y, epsilon = 1e-5);

    assert!(Matrix2::new(1.0, 2.0, 2.0, 4.0).inverse().is_none());
}

#[test]
fn test_k_tensor_for_centred_anchors() {
    // With anchors at the centres of mass only the masses contribute
    let k = Matrix2::k_tensor(Vector2::zero(), Vector2::zero(), 2.0, 1.0, 1.0).unwrap();
    assert_relative_eq!(k.data[0][0], 0.5);
    assert_relative_eq!(k.data[1][1], 0.5);
    assert_relative_eq!(k.data[0][1], 0.0);

    assert!(Matrix2::k_tensor(Vector2::zero(), Vector2::zero(), 0.0, 0.0, 0.0).is_none());
}

#[test]
fn test_bounding_box_operations() {
    let bb = BoundingBox::new(-1.0, -2.0, 1.0, 2.0);

    assert_eq!(bb.center(), Vector2::zero());
    assert_eq!(bb.width(), 2.0);
    assert_eq!(bb.height(), 4.0);
    assert_eq!(bb.area(), 8.0);

    assert!(bb.contains_point(Vector2::new(0.5, 1.0)));
    assert!(!bb.contains_point(Vector2::new(2.0, 0.0)));

    let other = BoundingBox::new(0.5, 0.5, 2.0, 3.0);
    assert!(bb.intersects(&other));
    assert!(!bb.intersects(&BoundingBox::new(2.0, 3.0, 3.0, 4.0)));

    let merged = bb.merge(&other);
    assert_eq!(merged, BoundingBox::new(-1.0, -2.0, 2.0, 3.0));
    assert!(merged.contains_bb(&bb));

    let grown = bb.grow(0.5);
    assert_eq!(grown, BoundingBox::new(-1.5, -2.5, 1.5, 2.5));

    assert_eq!(bb.clamp_point(Vector2::new(5.0, -5.0)), Vector2::new(1.0, -2.0));
}

#[test]
fn test_bounding_box_segment_query() {
    let bb = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);

    let t = bb.segment_query(Vector2::new(-3.0, 0.0), Vector2::new(3.0, 0.0)).unwrap();
    assert_relative_eq!(t, 1.0 / 3.0, epsilon = 1e-6);

    assert_eq!(bb.segment_query(Vector2::zero(), Vector2::new(3.0, 0.0)), Some(0.0));
    assert!(bb.segment_query(Vector2::new(-3.0, 2.0), Vector2::new(3.0, 2.0)).is_none());
}

#[test]
fn test_closest_point_on_segment() {
    let a = Vector2::new(0.0, 0.0);
    let b = Vector2::new(2.0, 0.0);

    assert_eq!(closest_point_on_segment(Vector2::new(1.0, 1.0), a, b), Vector2::new(1.0, 0.0));
    assert_eq!(closest_point_on_segment(Vector2::new(-1.0, 1.0), a, b), a);
    assert_eq!(closest_point_on_segment(Vector2::new(3.0, -1.0), a, b), b);
}
