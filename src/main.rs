//! Tallgrass driver: builds a grass field on a headless device, orbits a
//! camera over it and logs how many blades survive culling each frame.
//!
//! Usage: cargo run --release -- [--config grass.json] [--frames 8] [--save-config out.json] [--verbose]

use std::path::PathBuf;
use std::time::Instant;

use glam::Vec3;

use tallgrass::core::camera::{Camera, FrameCamera};
use tallgrass::core::logging;
use tallgrass::core::types::Result;
use tallgrass::field::GrassField;
use tallgrass::grass::{GrassConfig, LodMeshes, MeshInfo, ScatterGenerator};
use tallgrass::render::context::GpuContext;

/// Blade mesh sizes used by the driver; only the index counts reach the GPU.
const FULL_BLADE: MeshInfo = MeshInfo { index_count: 39, first_index: 0, base_vertex: 0 };
const REDUCED_BLADE: MeshInfo = MeshInfo { index_count: 9, first_index: 39, base_vertex: 15 };

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn run(args: &[String]) -> Result<()> {
    let config = match arg_value(args, "--config") {
        Some(path) => GrassConfig::load(&PathBuf::from(path))?,
        None => GrassConfig::default(),
    };
    if let Some(path) = arg_value(args, "--save-config") {
        config.save(&PathBuf::from(path))?;
        log::info!("Wrote config to {path}");
    }
    let frames: u32 = arg_value(args, "--frames")
        .and_then(|v| v.parse().ok())
        .unwrap_or(8);

    let ctx = pollster::block_on(GpuContext::new())?;

    let generator = ScatterGenerator::from_config(&config);
    let meshes = LodMeshes { full: FULL_BLADE, reduced: REDUCED_BLADE };

    let start = Instant::now();
    let mut field = GrassField::new();
    field.activate(&ctx, config.clone(), meshes, &generator)?;
    log::info!(
        "Activated {} chunks in {:.1} ms",
        field.chunk_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let radius = config.field_size * 0.35;
    for frame in 0..frames {
        let angle = frame as f32 / frames.max(1) as f32 * std::f32::consts::TAU;
        let eye = Vec3::new(angle.cos() * radius, 6.0, angle.sin() * radius);
        let camera = FrameCamera::from_camera(&Camera::look_at(eye, Vec3::ZERO));

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("grass_cull_frame"),
        });
        let drawn: Vec<_> = field
            .cull_frame(&ctx, &mut encoder, &camera)?
            .into_iter()
            .map(|draw| (draw.index, draw.lod))
            .collect();
        ctx.queue.submit(Some(encoder.finish()));

        let mut visible = 0u64;
        for (index, lod) in &drawn {
            visible += field.read_chunk_output(&ctx, *index, *lod)?.draw_args.instance_count as u64;
        }
        let stats = field.last_stats();
        log::info!(
            "Frame {frame}: {visible} blades in {} chunks ({} skipped, {} full, {} reduced)",
            drawn.len(),
            stats.skipped,
            stats.full_lod,
            stats.reduced_lod
        );
    }

    field.deactivate();
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verbose") {
        logging::init_with_default("tallgrass=debug,info");
    } else {
        logging::init();
    }
    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
