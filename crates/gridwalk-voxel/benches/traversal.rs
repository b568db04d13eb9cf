use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;

use gridwalk_core::Ray;
use gridwalk_voxel::{traverse, traverse_flat, LevelConfig, TraversalConfig};
use gridwalk_world::{Floor, SdfShell, SdfVolume, VoxelOracle};

const VIEWPORT_SIZE: u32 = 64;

/// Rays of a small pinhole viewport looking at `target` from `origin`.
fn viewport_rays(origin: Vec3, target: Vec3) -> Vec<Ray> {
    let forward = (target - origin).normalize();
    let right = forward.cross(Vec3::Y).normalize();
    let up = right.cross(forward);
    let pixel_size = 2.0 / VIEWPORT_SIZE as f32;

    (0..VIEWPORT_SIZE)
        .flat_map(|y| (0..VIEWPORT_SIZE).map(move |x| (x, y)))
        .map(|(x, y)| {
            let u = (x as f32 + 0.5) * pixel_size - 1.0;
            let v = (y as f32 + 0.5) * pixel_size - 1.0;
            Ray::new(origin, forward * 1.5 + right * u + up * v)
        })
        .collect()
}

fn bench_scene(c: &mut Criterion, name: &str, oracle: &dyn VoxelOracle, rays: &[Ray]) {
    let hierarchical = TraversalConfig::default().build().unwrap();
    let mut group = c.benchmark_group(name);

    group.bench_function("hierarchical", |b| {
        b.iter(|| {
            for ray in rays {
                black_box(traverse(ray, &hierarchical, oracle));
            }
        });
    });

    // Same total budget as the default hierarchy, all spent at scale 1
    group.bench_function("flat", |b| {
        let level = LevelConfig::new(1, hierarchical.max_total_steps() as u32);
        b.iter(|| {
            for ray in rays {
                black_box(traverse_flat(ray, level, oracle));
            }
        });
    });

    group.finish();
}

fn criterion_benchmark(c: &mut Criterion) {
    let floor_rays = viewport_rays(Vec3::new(0.0, 24.0, 0.0), Vec3::new(40.0, 0.0, 40.0));
    bench_scene(c, "floor", &Floor::new(0), &floor_rays);

    let shell = SdfShell::default();
    let shell_rays = viewport_rays(shell.center + Vec3::new(90.0, 28.0, 90.0), shell.center);
    bench_scene(c, "sdf_shell", &SdfVolume(shell), &shell_rays);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
