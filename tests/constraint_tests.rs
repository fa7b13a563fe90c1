use planar_phys::{
    constraints::ConstraintKind,
    error::PhysicsError,
    Body, BodyHandle, Constraint, Shape, Space, SpaceConfig, Vector2,
};
use approx::assert_relative_eq;

const DT: f32 = 1.0 / 60.0;

fn weightless_space() -> Space {
    Space::with_config(SpaceConfig {
        gravity: Vector2::zero(),
        allow_sleeping: false,
        ..SpaceConfig::default()
    })
}

fn add_dynamic(space: &mut Space, position: Vector2) -> BodyHandle {
    space
        .add_body(Body::new_dynamic(1.0, 0.1).with_position(position))
        .unwrap()
}

#[test]
fn test_pin_joint_keeps_pendulum_length() {
    let mut space = Space::new();
    let ground = space.static_body();
    let bob = add_dynamic(&mut space, Vector2::new(2.0, 0.0));

    let handle = space
        .add_constraint(Constraint::pin(ground, bob, Vector2::zero(), Vector2::zero()))
        .unwrap();

    // The rest distance is measured when the joint is added
    match space.constraint(handle).unwrap().get_kind() {
        ConstraintKind::Pin(pin) => assert_relative_eq!(pin.get_distance().unwrap(), 2.0),
        _ => panic!("expected a pin joint"),
    }

    let mut lowest: f32 = 0.0;
    for _ in 0..300 {
        space.step(DT);
        let position = space.body(bob).unwrap().get_position();
        assert_relative_eq!(position.length(), 2.0, epsilon = 0.02);
        lowest = lowest.min(position.y);
    }

    // It actually swung
    assert!(lowest < -1.9);
}

#[test]
fn test_pivot_joint_holds_anchors_together() {
    let mut space = Space::new();
    let ground = space.static_body();
    let body = add_dynamic(&mut space, Vector2::new(1.0, 0.0));

    // Hinge the body's left end to the world origin
    space
        .add_constraint(Constraint::pivot(ground, body, Vector2::zero(), Vector2::new(-1.0, 0.0)))
        .unwrap();

    let mut fastest: f32 = 0.0;
    for _ in 0..120 {
        space.step(DT);
        let anchor = space.body(body).unwrap().local_to_world(Vector2::new(-1.0, 0.0));
        assert!(anchor.length() < 0.02, "pivot drifted to {anchor}");
        fastest = fastest.max(space.body(body).unwrap().get_angular_velocity().abs());
    }

    assert!(fastest > 1.0);
}

#[test]
fn test_slide_joint_limits_distance() {
    let mut space = Space::new();
    let ground = space.static_body();
    let body = add_dynamic(&mut space, Vector2::new(0.0, -0.5));

    space
        .add_constraint(Constraint::slide(ground, body, Vector2::zero(), Vector2::zero(), 0.0, 2.0))
        .unwrap();

    for _ in 0..120 {
        space.step(DT);
        assert!(space.body(body).unwrap().get_position().length() < 2.05);
    }

    // Hangs at the maximum length
    assert_relative_eq!(space.body(body).unwrap().get_position().y, -2.0, epsilon = 0.05);
}

#[test]
fn test_groove_joint_keeps_anchor_on_groove() {
    let mut space = Space::new();
    let ground = space.static_body();
    let body = space
        .add_body(Body::new_dynamic(1.0, 0.1).with_velocity(Vector2::new(1.0, 0.0)))
        .unwrap();

    space
        .add_constraint(Constraint::groove(
            ground,
            body,
            Vector2::new(-5.0, 0.0),
            Vector2::new(5.0, 0.0),
            Vector2::zero(),
        ))
        .unwrap();

    for _ in 0..120 {
        space.step(DT);
    }

    let position = space.body(body).unwrap().get_position();
    assert_relative_eq!(position.y, 0.0, epsilon = 0.02);
    assert_relative_eq!(position.x, 2.0, epsilon = 0.1);
}

#[test]
fn test_damped_spring_settles_at_rest_length() {
    let mut space = weightless_space();
    let ground = space.static_body();
    let body = add_dynamic(&mut space, Vector2::new(3.0, 0.0));

    space
        .add_constraint(Constraint::damped_spring(
            ground,
            body,
            Vector2::zero(),
            Vector2::zero(),
            1.0,
            20.0,
            4.0,
        ))
        .unwrap();

    // The stretched spring pulls the body in
    space.step(DT);
    assert!(space.body(body).unwrap().get_velocity().x < 0.0);

    for _ in 0..600 {
        space.step(DT);
    }
    assert_relative_eq!(space.body(body).unwrap().get_position().x, 1.0, epsilon = 0.05);
}

#[test]
fn test_damped_rotary_spring_returns_to_rest_angle() {
    let mut space = weightless_space();
    let ground = space.static_body();
    let body = space
        .add_body(Body::new_dynamic(1.0, 1.0).with_angle(1.0))
        .unwrap();

    space
        .add_constraint(Constraint::damped_rotary_spring(ground, body, 0.0, 20.0, 8.0))
        .unwrap();

    for _ in 0..600 {
        space.step(DT);
    }
    assert_relative_eq!(space.body(body).unwrap().get_angle(), 0.0, epsilon = 0.05);
}

#[test]
fn test_rotary_limit_stops_rotation() {
    let mut space = weightless_space();
    let ground = space.static_body();
    let body = space
        .add_body(Body::new_dynamic(1.0, 1.0).with_angular_velocity(5.0))
        .unwrap();

    space
        .add_constraint(Constraint::rotary_limit(ground, body, -0.5, 0.5))
        .unwrap();

    for _ in 0..120 {
        space.step(DT);
    }

    let angle = space.body(body).unwrap().get_angle();
    assert!(angle > 0.4 && angle < 0.6, "angle {angle} outside the limit");
}

#[test]
fn test_gear_joint_couples_angular_velocities() {
    let mut space = weightless_space();
    let a = space
        .add_body(Body::new_dynamic(1.0, 1.0).with_angular_velocity(2.0))
        .unwrap();
    let b = space
        .add_body(Body::new_dynamic(1.0, 1.0).with_position(Vector2::new(3.0, 0.0)))
        .unwrap();

    space.add_constraint(Constraint::gear(a, b, 0.0, 2.0)).unwrap();

    for _ in 0..30 {
        space.step(DT);
    }

    let wa = space.body(a).unwrap().get_angular_velocity();
    let wb = space.body(b).unwrap().get_angular_velocity();
    assert_relative_eq!(wb * 2.0, wa, epsilon = 1e-3);
    assert!(wa.abs() > 0.1);
}

#[test]
fn test_simple_motor_drives_relative_rate() {
    let mut space = weightless_space();
    let ground = space.static_body();
    let body = space.add_body(Body::new_dynamic(1.0, 1.0)).unwrap();

    space
        .add_constraint(Constraint::simple_motor(ground, body, 3.0))
        .unwrap();
    space.step(DT);

    // a.w - b.w == rate
    assert_relative_eq!(space.body(body).unwrap().get_angular_velocity(), -3.0, epsilon = 1e-3);
}

#[test]
fn test_max_force_limits_motor() {
    let mut space = weightless_space();
    let ground = space.static_body();
    let body = space.add_body(Body::new_dynamic(1.0, 1.0)).unwrap();

    space
        .add_constraint(Constraint::simple_motor(ground, body, 3.0).with_max_force(6.0))
        .unwrap();
    space.step(DT);

    // At most max_force * dt of angular impulse per step
    assert_relative_eq!(space.body(body).unwrap().get_angular_velocity(), -6.0 * DT, epsilon = 1e-4);
}

#[test]
fn test_ratchet_allows_one_direction() {
    let mut space = weightless_space();
    let ground = space.static_body();
    let forward = space
        .add_body(Body::new_dynamic(1.0, 1.0).with_angular_velocity(2.0))
        .unwrap();
    let backward = space
        .add_body(Body::new_dynamic(1.0, 1.0).with_angular_velocity(-2.0))
        .unwrap();

    space.add_constraint(Constraint::ratchet(ground, forward, 0.0, 0.25)).unwrap();
    space.add_constraint(Constraint::ratchet(ground, backward, 0.0, 0.25)).unwrap();

    for _ in 0..60 {
        space.step(DT);
    }

    assert!(space.body(forward).unwrap().get_angle() > 1.5);
    assert!(space.body(backward).unwrap().get_angle() > -0.5);
}

#[test]
fn test_collide_bodies_false_disables_contacts() {
    let mut space = weightless_space();
    let a = add_dynamic(&mut space, Vector2::zero());
    let b = add_dynamic(&mut space, Vector2::new(0.5, 0.0));
    space.add_shape(Shape::circle(a, 0.5, Vector2::zero()).unwrap()).unwrap();
    space.add_shape(Shape::circle(b, 0.5, Vector2::zero()).unwrap()).unwrap();

    space
        .add_constraint(
            Constraint::pivot(a, b, Vector2::new(0.25, 0.0), Vector2::new(-0.25, 0.0))
                .with_collide_bodies(false),
        )
        .unwrap();

    for _ in 0..10 {
        space.step(DT);
    }

    assert_eq!(space.arbiters().count(), 0);
    assert_relative_eq!(space.body(b).unwrap().get_position().x, 0.5, epsilon = 1e-3);
}

#[test]
fn test_invalid_constraints_are_rejected() {
    let mut space = Space::new();
    let ground = space.static_body();
    let body = add_dynamic(&mut space, Vector2::zero());

    assert!(matches!(
        space.add_constraint(Constraint::pivot(body, body, Vector2::zero(), Vector2::zero())),
        Err(PhysicsError::SameBody(_))
    ));
    assert!(matches!(
        space.add_constraint(Constraint::slide(ground, body, Vector2::zero(), Vector2::zero(), 2.0, 1.0)),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        space.add_constraint(Constraint::gear(ground, body, 0.0, 0.0)),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        space.add_constraint(Constraint::ratchet(ground, body, 0.0, 0.0)),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        space.add_constraint(Constraint::simple_motor(ground, body, 1.0).with_max_force(-1.0)),
        Err(PhysicsError::InvalidParameter(_))
    ));

    let removed = add_dynamic(&mut space, Vector2::zero());
    space.remove_body(removed).unwrap();
    assert!(matches!(
        space.add_constraint(Constraint::pin(ground, removed, Vector2::zero(), Vector2::zero())),
        Err(PhysicsError::BodyNotFound(_))
    ));

    assert_eq!(space.constraint_count(), 0);
}

#[test]
fn test_constraint_accessors() {
    let mut space = Space::new();
    let ground = space.static_body();
    let body = add_dynamic(&mut space, Vector2::new(1.0, 0.0));

    let handle = space
        .add_constraint(Constraint::pin(ground, body, Vector2::zero(), Vector2::zero()))
        .unwrap();
    let constraint = space.constraint_mut(handle).unwrap();

    assert_eq!(constraint.get_bodies(), (ground, body));
    assert!(constraint.involves_body(body));
    assert_eq!(constraint.get_max_force(), f32::INFINITY);

    constraint.set_max_force(10.0);
    constraint.set_collide_bodies(false);
    assert_eq!(constraint.get_max_force(), 10.0);
    assert!(!constraint.get_collide_bodies());
    assert_eq!(constraint.get_anchors(), Some((Vector2::zero(), Vector2::zero())));
}
