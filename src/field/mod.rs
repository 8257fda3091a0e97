//! Grass field orchestration: chunk lifecycle and the per-frame cull.
//!
//! A field is inactive until `activate` partitions the configured area,
//! generates every chunk's instances and allocates GPU buffers. Each frame,
//! `cull_frame` records every chunk's cull into the caller's encoder and
//! returns the chunks ready to draw.

pub mod chunk;
pub mod frame;

pub use chunk::{DrawArgSeeds, GrassChunk};
pub use frame::{cull_chunk, CullResources, CullStage};

use crate::core::camera::FrameCamera;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::cull::{CullPipeline, DispatchSize, ScratchBuffers, VisibilityTest};
use crate::grass::chunk::{ChunkLayout, ChunkPlacement};
use crate::grass::config::GrassConfig;
use crate::grass::draw_args::{DrawArgs, LodLevel, LodMeshes, MeshInfo, DRAW_ARGS_SIZE};
use crate::grass::generator::InstanceGenerator;
use crate::grass::instance::{GrassInstance, INSTANCE_STRIDE};
use crate::math::Aabb;
use crate::render::buffer::check_storage_size;
use crate::render::context::GpuContext;
use crate::render::readback::read_buffer;

/// One chunk the renderer should draw this frame: an indexed-instanced
/// indirect draw of `mesh` over `instances`, with arguments in `draw_args`.
pub struct ChunkDraw<'a> {
    pub index: usize,
    pub bound: Aabb,
    pub lod: LodLevel,
    pub mesh: MeshInfo,
    pub instances: &'a wgpu::Buffer,
    pub draw_args: &'a wgpu::Buffer,
}

/// Counters from the most recent `cull_frame`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub chunks: usize,
    /// Rejected by the chunk test; only their draw record was reset
    pub skipped: usize,
    pub full_lod: usize,
    pub reduced_lod: usize,
}

/// Host copy of one chunk's cull output.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkOutput {
    pub draw_args: DrawArgs,
    /// `culled[..draw_args.instance_count]`
    pub instances: Vec<GrassInstance>,
}

struct ActiveField {
    config: GrassConfig,
    meshes: LodMeshes,
    pipeline: CullPipeline,
    scratch: ScratchBuffers,
    seeds: DrawArgSeeds,
    chunks: Vec<GrassChunk>,
    stats: FrameStats,
}

impl ActiveField {
    fn destroy(&self) {
        for chunk in &self.chunks {
            chunk.destroy();
        }
        self.scratch.destroy();
        self.seeds.destroy();
    }
}

/// Chunked grass field with per-frame GPU culling.
#[derive(Default)]
pub struct GrassField {
    active: Option<ActiveField>,
}

impl GrassField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Build every chunk for `config`. An active field is torn down first;
    /// on error, including a device out-of-memory, the field is left
    /// inactive with nothing allocated.
    pub fn activate(
        &mut self,
        ctx: &GpuContext,
        config: GrassConfig,
        meshes: LodMeshes,
        generator: &dyn InstanceGenerator,
    ) -> Result<()> {
        self.deactivate();
        config.validate()?;
        meshes.validate()?;

        let device = &ctx.device;
        let layout = ChunkLayout::from_config(&config);
        let placements = layout.placements();

        let dispatch = DispatchSize::for_largest(placements.iter().map(|p| p.instance_count()));
        dispatch.check_limits(ctx.max_workgroups_per_dimension())?;
        // Fail before any allocation if a chunk can't be bound at all
        check_storage_size(
            device,
            "grass_instances",
            dispatch.instance_count as u64 * INSTANCE_STRIDE,
        )?;

        // Out-of-memory below the checked limits only surfaces through an
        // error scope; anything built is released before returning it
        let scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let built = build_field(device, config, meshes, generator, dispatch, &placements);
        let oom = pollster::block_on(scope.pop());
        let active = built?;
        if let Some(error) = oom {
            active.destroy();
            return Err(allocation_error(error, planned_bytes(&dispatch, placements.len())));
        }

        log::info!(
            "Grass field active: {} chunks x {} instances ({:.1} MB instance data)",
            active.chunks.len(),
            dispatch.instance_count,
            (active.chunks.len() as u64 * dispatch.instance_count as u64 * INSTANCE_STRIDE * 2) as f64
                / (1024.0 * 1024.0)
        );

        self.active = Some(active);
        Ok(())
    }

    /// Release every GPU buffer. No-op when already inactive.
    pub fn deactivate(&mut self) {
        if let Some(active) = self.active.take() {
            active.destroy();
            log::info!("Grass field released ({} chunks)", active.chunks.len());
        }
    }

    pub fn config(&self) -> Option<&GrassConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    pub fn chunk_count(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.chunks.len())
    }

    pub fn chunk(&self, index: usize) -> Option<&GrassChunk> {
        self.active.as_ref().and_then(|a| a.chunks.get(index))
    }

    pub fn chunk_bounds(&self) -> Vec<Aabb> {
        self.active
            .as_ref()
            .map(|a| a.chunks.iter().map(|c| c.bound).collect())
            .unwrap_or_default()
    }

    /// Scratch sizing shared by every chunk.
    pub fn dispatch_size(&self) -> Option<DispatchSize> {
        self.active.as_ref().map(|a| *a.scratch.dispatch())
    }

    pub fn last_stats(&self) -> FrameStats {
        self.active.as_ref().map(|a| a.stats).unwrap_or_default()
    }

    /// Record this frame's cull for every chunk into `encoder`.
    ///
    /// Returned draws are valid once `encoder` has been submitted. Chunks the
    /// chunk test rejects are left out, with their record for this frame's
    /// LOD reset to a zero instance count.
    pub fn cull_frame(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        camera: &FrameCamera,
    ) -> Result<Vec<ChunkDraw<'_>>> {
        let active = self.active.as_mut().ok_or(Error::FieldInactive)?;

        let test = VisibilityTest::new(camera, &active.config);
        let frustum = test.expanded_frustum();
        let resources = CullResources {
            pipeline: &active.pipeline,
            scratch: &active.scratch,
            seeds: &active.seeds,
        };

        let mut stats = FrameStats {
            chunks: active.chunks.len(),
            ..Default::default()
        };
        let mut draws = Vec::with_capacity(active.chunks.len());

        for chunk in &active.chunks {
            let lod = LodLevel::select(
                camera.position.distance(chunk.bound.center()),
                active.config.lod_distance,
            );
            if active.config.chunk_precull && !test.may_contain_visible(&frustum, &chunk.bound) {
                // Same record as an all-zero vote
                chunk.reset_args(encoder, &active.seeds, lod);
                stats.skipped += 1;
                continue;
            }

            let stage = cull_chunk(&resources, &ctx.queue, encoder, chunk, &test, lod)?;
            if stage != CullStage::ReadyForDraw {
                continue;
            }

            match lod {
                LodLevel::Full => stats.full_lod += 1,
                LodLevel::Reduced => stats.reduced_lod += 1,
            }
            draws.push(ChunkDraw {
                index: chunk.index,
                bound: chunk.bound,
                lod,
                mesh: active.meshes.get(lod),
                instances: chunk.culled_buffer(),
                draw_args: chunk.draw_args_buffer(lod),
            });
        }

        log::debug!(
            "Grass cull: {} chunks, {} skipped, {} full, {} reduced",
            stats.chunks, stats.skipped, stats.full_lod, stats.reduced_lod
        );
        active.stats = stats;
        Ok(draws)
    }

    /// Blocking readback of a chunk's draw record for `lod` and its visible
    /// instances. Submit the frame's encoder first.
    pub fn read_chunk_output(&self, ctx: &GpuContext, index: usize, lod: LodLevel) -> Result<ChunkOutput> {
        let active = self.active.as_ref().ok_or(Error::FieldInactive)?;
        let chunk = active.chunks.get(index).ok_or(Error::ChunkIndex(index))?;

        let draw_args = read_buffer::<DrawArgs>(&ctx.device, &ctx.queue, chunk.draw_args_buffer(lod), 1)?
            .first()
            .copied()
            .ok_or_else(|| Error::Gpu("Empty draw-args readback".into()))?;

        let visible = (draw_args.instance_count as usize).min(chunk.instance_count() as usize);
        let instances = read_buffer::<GrassInstance>(&ctx.device, &ctx.queue, chunk.culled_buffer(), visible)?;

        Ok(ChunkOutput { draw_args, instances })
    }
}

/// Allocate the shared resources and every chunk. On error, whatever was
/// already created is dropped.
fn build_field(
    device: &wgpu::Device,
    config: GrassConfig,
    meshes: LodMeshes,
    generator: &dyn InstanceGenerator,
    dispatch: DispatchSize,
    placements: &[ChunkPlacement],
) -> Result<ActiveField> {
    let pipeline = CullPipeline::new(device);
    let scratch = ScratchBuffers::new(device, dispatch)?;
    let seeds = DrawArgSeeds::new(device, &meshes);

    let mut chunks = Vec::with_capacity(placements.len());
    for placement in placements {
        let instances = generator.generate(placement);
        if instances.len() != placement.instance_count() as usize {
            return Err(Error::Config(format!(
                "Generator returned {} instances for chunk {}, expected {}",
                instances.len(),
                placement.index,
                placement.instance_count()
            )));
        }
        chunks.push(GrassChunk::new(
            device,
            &pipeline,
            &scratch,
            &seeds,
            placement.index,
            placement.bound,
            &instances,
        )?);
    }

    Ok(ActiveField {
        config,
        meshes,
        pipeline,
        scratch,
        seeds,
        chunks,
        stats: FrameStats::default(),
    })
}

/// Bytes of storage an activation allocates, counting every chunk at the
/// largest chunk's size.
fn planned_bytes(dispatch: &DispatchSize, chunks: usize) -> u64 {
    let per_chunk = dispatch.instance_count as u64 * INSTANCE_STRIDE * 2 + DRAW_ARGS_SIZE * 2;
    let scratch = (dispatch.scratch_len() * 2 + dispatch.scan_groups as u64 * 2) * 4;
    chunks as u64 * per_chunk + scratch
}

fn allocation_error(error: wgpu::Error, requested: u64) -> Error {
    match error {
        wgpu::Error::OutOfMemory { .. } => Error::DeviceOutOfMemory {
            label: "grass_field".to_string(),
            requested,
        },
        other => Error::Gpu(other.to_string()),
    }
}

impl Drop for GrassField {
    fn drop(&mut self) {
        self.deactivate();
    }
}
