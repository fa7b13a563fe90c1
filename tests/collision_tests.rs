use planar_phys::{
    collision::{BruteForceIndex, PairKey, SpatialHash, SpatialIndex},
    core::{CollisionEventType, Handle},
    math::BoundingBox,
    shapes::mass,
    Body, Categories, Shape, ShapeFilter, ShapeHandle, Space, SpaceConfig, Vector2,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use approx::assert_relative_eq;

const DT: f32 = 1.0 / 60.0;

/// A space with a flat static floor along y = 0; returns the floor shape
fn space_with_floor() -> (Space, ShapeHandle) {
    let mut space = Space::new();
    let ground = space.static_body();
    let floor = space
        .add_shape(Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0).unwrap())
        .unwrap();
    (space, floor)
}

fn drop_ball(space: &mut Space, height: f32) -> ShapeHandle {
    let ball = space
        .add_body(Body::new_dynamic(1.0, 0.125).with_position(Vector2::new(0.0, height)))
        .unwrap();
    space.add_shape(Shape::circle(ball, 0.5, Vector2::zero()).unwrap()).unwrap()
}

#[test]
fn test_ball_comes_to_rest_on_floor() {
    let (mut space, _floor) = space_with_floor();
    let shape = drop_ball(&mut space, 2.0);
    let ball = space.shape(shape).unwrap().get_body();

    for _ in 0..180 {
        space.step(DT);
    }

    let body = space.body(ball).unwrap();
    assert_relative_eq!(body.get_position().y, 0.5, epsilon = 0.02);
    assert!(body.get_velocity().length() < 0.1);
    assert_eq!(space.arbiters().count(), 1);
}

#[test]
fn test_begin_and_separate_fire_once() {
    let (mut space, floor) = space_with_floor();
    let shape = drop_ball(&mut space, 1.0);
    let ball = space.shape(shape).unwrap().get_body();

    let begins = Rc::new(Cell::new(0));
    let separates = Rc::new(Cell::new(0));
    {
        let begins = begins.clone();
        let separates = separates.clone();
        space
            .default_collision_handler()
            .on_begin(move |_, _| {
                begins.set(begins.get() + 1);
                true
            })
            .on_separate(move |_, _| separates.set(separates.get() + 1));
    }

    for _ in 0..60 {
        space.step(DT);
    }
    assert_eq!(begins.get(), 1);
    assert_eq!(separates.get(), 0);

    // Launching the ball separates the pair
    space.body_mut(ball).unwrap().set_velocity(Vector2::new(0.0, 10.0));
    for _ in 0..10 {
        space.step(DT);
    }
    assert_eq!(begins.get(), 1);
    assert_eq!(separates.get(), 1);
    assert!(space.arbiters().all(|arbiter| !arbiter.get_key().contains(floor)));
}

#[test]
fn test_begin_veto_lets_shapes_pass_through() {
    let (mut space, _floor) = space_with_floor();
    let shape = drop_ball(&mut space, 1.0);
    let ball = space.shape(shape).unwrap().get_body();

    let pre_solves = Rc::new(Cell::new(0));
    {
        let pre_solves = pre_solves.clone();
        space
            .default_collision_handler()
            .on_begin(|_, _| false)
            .on_pre_solve(move |_, _| {
                pre_solves.set(pre_solves.get() + 1);
                true
            });
    }

    for _ in 0..90 {
        space.step(DT);
    }

    assert!(space.body(ball).unwrap().get_position().y < -1.0);
    // Ignored pairs skip pre-solve
    assert_eq!(pre_solves.get(), 0);
}

#[test]
fn test_pre_solve_rejection_is_per_step() {
    let (mut space, _floor) = space_with_floor();
    let shape = drop_ball(&mut space, 0.5);
    let ball = space.shape(shape).unwrap().get_body();

    let steps = Rc::new(Cell::new(0));
    {
        let steps = steps.clone();
        space.default_collision_handler().on_pre_solve(move |_, _| {
            steps.set(steps.get() + 1);
            steps.get() > 5
        });
    }

    for _ in 0..60 {
        space.step(DT);
    }

    // The ball sank for a few steps, then was pushed back out
    assert!(steps.get() > 5);
    assert!(space.body(ball).unwrap().get_position().y > 0.3);
}

#[test]
fn test_sensor_reports_but_does_not_collide() {
    let mut space = Space::new();
    let ground = space.static_body();
    space
        .add_shape(
            Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0)
                .unwrap()
                .with_sensor(true),
        )
        .unwrap();
    let shape = drop_ball(&mut space, 1.0);
    let ball = space.shape(shape).unwrap().get_body();

    let mut begins = 0;
    let mut separates = 0;
    for _ in 0..120 {
        space.step(DT);
        begins += space.events().get_collision_events_of_type(CollisionEventType::Begin).len();
        separates += space.events().get_collision_events_of_type(CollisionEventType::Separate).len();
    }

    assert!(space.body(ball).unwrap().get_position().y < -5.0);
    assert_eq!(begins, 1);
    assert_eq!(separates, 1);
}

#[test]
fn test_filter_groups_prevent_contact() {
    let mut space = Space::new();
    let ground = space.static_body();
    let filter = ShapeFilter::new(3, Categories::ALL, Categories::ALL);
    space
        .add_shape(
            Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0)
                .unwrap()
                .with_filter(filter),
        )
        .unwrap();

    let ball = space
        .add_body(Body::new_dynamic(1.0, 0.125).with_position(Vector2::new(0.0, 1.0)))
        .unwrap();
    space
        .add_shape(Shape::circle(ball, 0.5, Vector2::zero()).unwrap().with_filter(filter))
        .unwrap();

    for _ in 0..60 {
        space.step(DT);
    }

    assert!(space.body(ball).unwrap().get_position().y < 0.0);
    assert_eq!(space.arbiters().count(), 0);
}

#[test]
fn test_filter_masks() {
    let player = ShapeFilter::new(0, Categories::CHARACTER, Categories::ALL - Categories::DEBRIS);
    let debris = ShapeFilter::new(0, Categories::DEBRIS, Categories::ALL);
    let wall = ShapeFilter::new(0, Categories::STATIC, Categories::ALL);

    assert!(player.reject(&debris));
    assert!(debris.reject(&player));
    assert!(!player.reject(&wall));
    assert!(ShapeFilter::NONE.reject(&ShapeFilter::ALL));
}

#[test]
fn test_handler_sees_its_collision_types_in_order() {
    let mut space = Space::new();
    let ground = space.static_body();
    let floor = space
        .add_shape(
            Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0)
                .unwrap()
                .with_collision_type(2),
        )
        .unwrap();

    let ball = space
        .add_body(Body::new_dynamic(1.0, 0.125).with_position(Vector2::new(0.0, 0.6)))
        .unwrap();
    let ball_shape = space
        .add_shape(Shape::circle(ball, 0.5, Vector2::zero()).unwrap().with_collision_type(1))
        .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = seen.clone();
        space.on_collision(1, 2).on_begin(move |arbiter, _| {
            seen.borrow_mut().push(arbiter.get_shapes());
            // The normal points from the first shape to the second
            assert!(arbiter.get_normal().y < 0.0);
            true
        });
    }

    for _ in 0..10 {
        space.step(DT);
    }

    assert_eq!(*seen.borrow(), vec![(ball_shape, floor)]);
}

#[test]
fn test_post_solve_reports_impulse() {
    let (mut space, _floor) = space_with_floor();
    drop_ball(&mut space, 0.5);

    let impulse = Rc::new(Cell::new(Vector2::zero()));
    {
        let impulse = impulse.clone();
        space
            .default_collision_handler()
            .on_post_solve(move |arbiter, _| impulse.set(arbiter.total_impulse()));
    }

    for _ in 0..30 {
        space.step(DT);
    }

    // A resting unit mass needs roughly m * g * dt per step
    let magnitude = impulse.get().length();
    assert_relative_eq!(magnitude, 9.81 * DT, epsilon = 0.05);
}

#[test]
fn test_elasticity_bounces() {
    let mut space = Space::new();
    let ground = space.static_body();
    space
        .add_shape(
            Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0)
                .unwrap()
                .with_elasticity(1.0),
        )
        .unwrap();
    let ball = space
        .add_body(
            Body::new_dynamic(1.0, 0.125)
                .with_position(Vector2::new(0.0, 0.6))
                .with_velocity(Vector2::new(0.0, -5.0)),
        )
        .unwrap();
    space
        .add_shape(Shape::circle(ball, 0.5, Vector2::zero()).unwrap().with_elasticity(1.0))
        .unwrap();

    let mut max_upward: f32 = 0.0;
    for _ in 0..20 {
        space.step(DT);
        max_upward = max_upward.max(space.body(ball).unwrap().get_velocity().y);
    }

    assert!(max_upward > 4.0);
}

#[test]
fn test_elastic_circles_exchange_velocities() {
    let mut space = Space::with_config(SpaceConfig {
        gravity: Vector2::zero(),
        allow_sleeping: false,
        ..SpaceConfig::default()
    });

    let moving = space
        .add_body(
            Body::new_dynamic(1.0, 0.125)
                .with_position(Vector2::new(-1.0, 0.0))
                .with_velocity(Vector2::new(2.0, 0.0)),
        )
        .unwrap();
    let resting = space
        .add_body(Body::new_dynamic(1.0, 0.125).with_position(Vector2::new(0.2, 0.0)))
        .unwrap();
    for body in [moving, resting] {
        space
            .add_shape(Shape::circle(body, 0.5, Vector2::zero()).unwrap().with_elasticity(1.0))
            .unwrap();
    }

    for _ in 0..60 {
        space.step(DT);
    }

    assert_relative_eq!(space.body(moving).unwrap().get_velocity().x, 0.0, epsilon = 0.05);
    assert_relative_eq!(space.body(resting).unwrap().get_velocity().x, 2.0, epsilon = 0.05);
}

#[test]
fn test_collinear_capsules_do_not_pass_through() {
    let mut space = Space::with_config(SpaceConfig {
        gravity: Vector2::zero(),
        allow_sleeping: false,
        ..SpaceConfig::default()
    });
    let ground = space.static_body();
    space
        .add_shape(Shape::segment(ground, Vector2::new(-1.0, 0.0), Vector2::new(0.0, 0.0), 0.3).unwrap())
        .unwrap();

    let (a, b) = (Vector2::new(-0.5, 0.0), Vector2::new(0.5, 0.0));
    let capsule = space
        .add_body(
            Body::new_dynamic(1.0, mass::moment_for_segment(1.0, a, b, 0.3))
                .with_position(Vector2::new(2.0, 0.0))
                .with_velocity(Vector2::new(-2.0, 0.0)),
        )
        .unwrap();
    space.add_shape(Shape::segment(capsule, a, b, 0.3).unwrap()).unwrap();

    for _ in 0..120 {
        space.step(DT);
    }

    // Rounded ends meet when the body reaches x = 1.1.
    let body = space.body(capsule).unwrap();
    assert!(body.get_position().x > 1.0);
    assert!(body.get_velocity().x.abs() < 0.1);
}

#[test]
fn test_friction_holds_resting_box() {
    let mut space = Space::new();
    let ground = space.static_body();
    space
        .add_shape(
            Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0)
                .unwrap()
                .with_friction(1.0),
        )
        .unwrap();

    let body = space
        .add_body(Body::new_dynamic(1.0, mass::moment_for_box(1.0, 1.0, 1.0)).with_position(Vector2::new(0.0, 0.5)))
        .unwrap();
    space
        .add_shape(Shape::box_shape(body, 1.0, 1.0, 0.0).unwrap().with_friction(1.0))
        .unwrap();

    for _ in 0..1000 {
        space.step(DT);
        let body = space.body(body).unwrap();
        assert!(body.get_velocity().x.abs() < 1e-2);
    }

    let body = space.body(body).unwrap();
    assert_relative_eq!(body.get_position().x, 0.0, epsilon = 0.01);
    assert_relative_eq!(body.get_angle(), 0.0, epsilon = 0.01);
}

#[test]
fn test_re_adding_a_shape_reproduces_contacts() {
    let mut space = Space::with_config(SpaceConfig {
        gravity: Vector2::zero(),
        allow_sleeping: false,
        ..SpaceConfig::default()
    });
    let ground = space.static_body();
    space
        .add_shape(Shape::segment(ground, Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.0), 0.0).unwrap())
        .unwrap();

    // Exactly touching and at rest, so solving leaves the body in place
    let ball = space
        .add_body(Body::new_dynamic(1.0, 0.125).with_position(Vector2::new(0.0, 0.5)))
        .unwrap();

    let snapshot = |space: &mut Space| {
        let shape = space.add_shape(Shape::circle(ball, 0.5, Vector2::zero()).unwrap()).unwrap();
        space.step(DT);

        let arbiter = space.arbiters().next().unwrap();
        let sign = if arbiter.get_shapes().0 == shape { 1.0 } else { -1.0 };
        let contacts: Vec<_> = arbiter
            .get_contacts()
            .iter()
            .map(|c| (c.position, c.distance))
            .collect();
        let result = (arbiter.get_normal() * sign, contacts);

        space.remove_shape(shape).unwrap();
        result
    };

    let first = snapshot(&mut space);
    let second = snapshot(&mut space);

    assert_eq!(first.1.len(), 1);
    assert_eq!(first, second);
}

#[test]
fn test_spatial_indices_agree() {
    let handle = |i: u32| ShapeHandle::from_raw_parts(i, 0);
    let mut hash = SpatialHash::new(1.0);
    let mut brute = BruteForceIndex::new();

    for i in 0..20 {
        let x = i as f32 * 0.7;
        let bb = BoundingBox::new(x, 0.0, x + 0.5, 0.5);
        hash.insert(handle(i), bb);
        brute.insert(handle(i), bb);
    }

    let query = BoundingBox::new(3.0, 0.0, 6.0, 1.0);
    let mut from_hash: Vec<_> = hash.query(query).collect();
    let mut from_brute: Vec<_> = brute.query(query).collect();
    from_hash.sort();
    from_hash.dedup();
    from_brute.sort();

    assert_eq!(from_hash, from_brute);
    assert!(!from_hash.is_empty());

    hash.remove(handle(5));
    assert!(!hash.contains(handle(5)));
    assert_eq!(hash.len(), 19);
}

#[test]
fn test_pair_key_is_order_independent() {
    let a = ShapeHandle::from_raw_parts(1, 0);
    let b = ShapeHandle::from_raw_parts(2, 0);

    assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
    assert_eq!(PairKey::new(a, b).other(a), Some(b));
    assert!(PairKey::new(a, b).contains(b));
}
