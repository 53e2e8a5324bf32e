use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use contact_solver::{
    BodyHandle, CollisionData, DistanceConstraint, DistanceConstraintConfig, PhysicsWorld, RigidBody,
    Vector3,
};

// --- Helper for feeding a row of resting cubes to the manifold table ---
fn run_cube_row_bench(world: &mut PhysicsWorld, ground: BodyHandle, cubes: &[BodyHandle]) {
    let dt = 1.0 / 60.0;
    let steps = 30;

    for _ in 0..steps {
        for &cube in cubes {
            let position = match world.get_body(cube) {
                Ok(body) => body.get_position(),
                Err(_) => continue,
            };
            let bottom = position.y - 0.5;
            if bottom >= 0.0 {
                continue;
            }

            for (dx, dz) in [(-0.5, -0.5), (-0.5, 0.5), (0.5, -0.5), (0.5, 0.5)] {
                let Some((ground_body, cube_body)) = world.bodies().get_pair(ground, cube) else {
                    continue;
                };
                let data = CollisionData::from_world_points(
                    ground_body,
                    cube_body,
                    Vector3::new(position.x + dx, 0.0, position.z + dz),
                    Vector3::new(position.x + dx, bottom, position.z + dz),
                    Vector3::unit_y(),
                );
                let _ = world.register_contact(ground, cube, data);
            }
        }

        world.step(black_box(dt));
    }
}

// Benchmark for cubes resting on a static ground
fn bench_resting_cubes(c: &mut Criterion) {
    let mut group = c.benchmark_group("resting_cubes");

    for num_cubes in [10, 100, 500].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_cubes), num_cubes, |b, &n| {
            b.iter(|| {
                let mut world = PhysicsWorld::new();
                world.set_velocity_iterations(4); // Fewer iterations for benchmark speed
                let ground = world.add_body(RigidBody::new_static(Vector3::new(0.0, -0.5, 0.0)));
                let cubes: Vec<BodyHandle> = (0..black_box(n))
                    .map(|i| world.add_body(RigidBody::new_dynamic(Vector3::new(i as f32 * 1.5, 0.49, 0.0), 1.0)))
                    .collect();
                run_cube_row_bench(&mut world, ground, &cubes);
            });
        });
    }
    group.finish();
}

// Benchmark for a chain of bodies linked by soft distance constraints
fn bench_distance_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_chain");

    for num_links in [10, 100, 500].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_links), num_links, |b, &n| {
            b.iter(|| {
                let mut world = PhysicsWorld::new();
                let link_length = 0.5;

                let mut last = world.add_body(RigidBody::new_static(Vector3::new(0.0, 5.0, 0.0)));
                for i in 0..black_box(n) {
                    let position = Vector3::new((i + 1) as f32 * link_length, 5.0, 0.0);
                    let current = world.add_body(RigidBody::new_dynamic(position, 1.0));
                    let config = DistanceConstraintConfig { length: Some(link_length), ..Default::default() };
                    let _ = world.add_constraint(Box::new(DistanceConstraint::new(last, current, config)));
                    last = current;
                }

                for _ in 0..30 {
                    world.step(black_box(1.0 / 60.0));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resting_cubes, bench_distance_chain);
criterion_main!(benches);
