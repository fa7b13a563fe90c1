use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use planar_phys::{collision::BroadPhaseKind, Body, Shape, ShapeFilter, Space, SpaceConfig, Vector2};

const DT: f32 = 1.0 / 60.0;

/// Builds a pyramid of `rows` rows of unit boxes resting on a static floor
fn build_pyramid(rows: usize, broad_phase: BroadPhaseKind) -> Space {
    let mut space = Space::with_config(SpaceConfig {
        broad_phase,
        ..SpaceConfig::default()
    });
    let ground = space.static_body();
    let floor = Shape::segment(ground, Vector2::new(-50.0, 0.0), Vector2::new(50.0, 0.0), 0.0)
        .expect("floor")
        .with_friction(0.8);
    space.add_shape(floor).expect("add floor");

    for row in 0..rows {
        let count = rows - row;
        let start = -(count as f32 - 1.0) * 0.5;
        for column in 0..count {
            let position = Vector2::new(start + column as f32, 0.5 + row as f32);
            let body = space
                .add_body(Body::new_dynamic(1.0, 1.0 / 6.0).with_position(position))
                .expect("add body");
            let shape = Shape::box_shape(body, 1.0, 1.0, 0.0)
                .expect("box")
                .with_friction(0.8);
            space.add_shape(shape).expect("add shape");
        }
    }

    space
}

fn bench_pyramid_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid_step");
    for &rows in &[5usize, 10, 20] {
        let bodies = rows * (rows + 1) / 2;
        group.throughput(Throughput::Elements(bodies as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter_batched(
                || build_pyramid(rows, BroadPhaseKind::SpatialHash),
                |mut space| {
                    for _ in 0..10 {
                        space.step(DT);
                    }
                    black_box(space.time())
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_broad_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase");
    for (name, kind) in [("spatial_hash", BroadPhaseKind::SpatialHash), ("brute_force", BroadPhaseKind::BruteForce)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || build_pyramid(10, kind),
                |mut space| {
                    space.step(DT);
                    black_box(space.arbiters().count())
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut space = build_pyramid(15, BroadPhaseKind::SpatialHash);
    for _ in 0..30 {
        space.step(DT);
    }

    c.bench_function("segment_query", |b| {
        b.iter(|| {
            space.segment_query(
                black_box(Vector2::new(-20.0, 5.0)),
                black_box(Vector2::new(20.0, 5.0)),
                0.0,
                ShapeFilter::ALL,
            )
        })
    });
    c.bench_function("point_query_nearest", |b| {
        b.iter(|| space.point_query_nearest(black_box(Vector2::new(0.0, 20.0)), 50.0, ShapeFilter::ALL))
    });
}

criterion_group!(benches, bench_pyramid_step, bench_broad_phases, bench_queries);
criterion_main!(benches);
