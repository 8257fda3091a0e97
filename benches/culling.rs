use criterion::{criterion_group, criterion_main, Criterion, black_box};

use tallgrass::core::camera::{Camera, FrameCamera};
use tallgrass::cull::reference;
use tallgrass::cull::{DispatchSize, VisibilityTest};
use tallgrass::grass::{ChunkLayout, GrassConfig, GrassInstance, InstanceGenerator, MeshInfo, ScatterGenerator};

use glam::Vec3;

fn chunk_instances(per_dimension: u32) -> (GrassConfig, Vec<GrassInstance>) {
    let config = GrassConfig {
        chunk_dimension: 1,
        instances_per_chunk_dimension: per_dimension,
        field_size: 40.0,
        ..Default::default()
    };
    let layout = ChunkLayout::from_config(&config);
    let instances = ScatterGenerator::from_config(&config).generate(&layout.placement(0, 0));
    (config, instances)
}

fn frame_test(config: &GrassConfig) -> VisibilityTest {
    let camera = Camera::look_at(Vec3::new(-18.0, 4.0, -18.0), Vec3::ZERO);
    VisibilityTest::new(&FrameCamera::from_camera(&camera), config)
}

fn bench_generate_64(c: &mut Criterion) {
    let config = GrassConfig {
        chunk_dimension: 1,
        ..Default::default()
    };
    let layout = ChunkLayout::from_config(&config);
    let generator = ScatterGenerator::from_config(&config);
    let placement = layout.placement(0, 0);

    c.bench_function("generate_chunk_64x64", |b| {
        b.iter(|| generator.generate(black_box(&placement)));
    });
}

fn bench_vote(c: &mut Criterion) {
    let (config, instances) = chunk_instances(256);
    let test = frame_test(&config);

    c.bench_function("reference_vote_65536", |b| {
        b.iter(|| reference::vote(black_box(&instances), black_box(&test)));
    });
}

fn bench_full_cull(c: &mut Criterion) {
    let (config, instances) = chunk_instances(256);
    let test = frame_test(&config);
    let mesh = MeshInfo { index_count: 39, first_index: 0, base_vertex: 0 };

    c.bench_function("reference_cull_65536", |b| {
        b.iter(|| reference::cull(black_box(&instances), black_box(&test), mesh, Vec::new()));
    });
}

fn bench_dispatch_sizing(c: &mut Criterion) {
    c.bench_function("dispatch_size_sweep", |b| {
        b.iter(|| {
            let mut total = 0u64;
            for n in (0..1_000_000u32).step_by(997) {
                total += DispatchSize::for_instances(black_box(n)).scratch_len();
            }
            total
        });
    });
}

criterion_group!(
    benches,
    bench_generate_64,
    bench_vote,
    bench_full_cull,
    bench_dispatch_sizing,
);
criterion_main!(benches);
