//! GPU resources owned by one chunk, plus the draw-argument seed records
//! shared by all chunks.

use wgpu::util::DeviceExt;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::cull::{CullBindings, CullParams, CullPipeline, DispatchSize, ScratchBuffers, VisibilityTest};
use crate::grass::draw_args::{DrawArgs, LodLevel, LodMeshes, DRAW_ARGS_SIZE};
use crate::grass::instance::{GrassInstance, INSTANCE_STRIDE};
use crate::math::Aabb;
use crate::render::buffer::{check_storage_size, create_storage_buffer, create_storage_buffer_init};

/// Constant draw-argument records, one per LOD variant, copied over a chunk's
/// record at the start of every cull.
pub struct DrawArgSeeds {
    records: [DrawArgs; 2],
    buffers: [wgpu::Buffer; 2],
}

impl DrawArgSeeds {
    pub fn new(device: &wgpu::Device, meshes: &LodMeshes) -> Self {
        let records = LodLevel::ALL.map(|lod| DrawArgs::seeded(meshes.get(lod)));
        let buffers = LodLevel::ALL.map(|lod| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match lod {
                    LodLevel::Full => "grass_draw_args_seed_full",
                    LodLevel::Reduced => "grass_draw_args_seed_reduced",
                }),
                contents: bytemuck::bytes_of(&records[lod.index()]),
                usage: wgpu::BufferUsages::COPY_SRC,
            })
        });
        Self { records, buffers }
    }

    pub fn record(&self, lod: LodLevel) -> DrawArgs {
        self.records[lod.index()]
    }

    pub fn buffer(&self, lod: LodLevel) -> &wgpu::Buffer {
        &self.buffers[lod.index()]
    }

    pub fn destroy(&self) {
        for buffer in &self.buffers {
            buffer.destroy();
        }
    }
}

/// One chunk's dense instances, compacted output, cull uniform and
/// per-LOD draw-argument records.
pub struct GrassChunk {
    pub index: usize,
    pub bound: Aabb,
    dispatch: DispatchSize,
    instances: wgpu::Buffer,
    culled: wgpu::Buffer,
    params: wgpu::Buffer,
    draw_args: [wgpu::Buffer; 2],
    bind_groups: [wgpu::BindGroup; 2],
}

impl GrassChunk {
    /// Upload `instances` and build the chunk's bind groups against the
    /// shared `scratch` set.
    pub fn new(
        device: &wgpu::Device,
        pipeline: &CullPipeline,
        scratch: &ScratchBuffers,
        seeds: &DrawArgSeeds,
        index: usize,
        bound: Aabb,
        instances: &[GrassInstance],
    ) -> Result<Self> {
        let dispatch = DispatchSize::for_instances(instances.len() as u32);
        if !scratch.covers(&dispatch) {
            return Err(Error::Gpu(format!(
                "Scratch sized for {} groups cannot serve chunk {index} with {}",
                scratch.dispatch().scan_groups, dispatch.scan_groups
            )));
        }

        let byte_len = instances.len() as u64 * INSTANCE_STRIDE;
        check_storage_size(device, "grass_instances", byte_len)?;

        // Bindings of array<GrassInstance> must hold at least one element
        let instance_buffer = if instances.is_empty() {
            create_storage_buffer(device, "grass_instances", INSTANCE_STRIDE, wgpu::BufferUsages::COPY_SRC)?
        } else {
            create_storage_buffer_init(
                device,
                "grass_instances",
                bytemuck::cast_slice(instances),
                wgpu::BufferUsages::COPY_SRC,
            )?
        };
        // Same capacity as the dense buffer; compaction never grows the set
        let culled = create_storage_buffer(
            device,
            "grass_culled_instances",
            byte_len.max(INSTANCE_STRIDE),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        )?;

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass_cull_params"),
            size: std::mem::size_of::<CullParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let draw_args = LodLevel::ALL.map(|lod| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grass_draw_args"),
                contents: bytemuck::bytes_of(&seeds.record(lod)),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::INDIRECT
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            })
        });

        let bind_groups = LodLevel::ALL.map(|lod| {
            pipeline.create_bind_group(device, "grass_cull_bind_group", &CullBindings {
                params: &params,
                instances: &instance_buffer,
                scratch,
                culled: &culled,
                draw_args: &draw_args[lod.index()],
            })
        });

        Ok(Self {
            index,
            bound,
            dispatch,
            instances: instance_buffer,
            culled,
            params,
            draw_args,
            bind_groups,
        })
    }

    pub fn instance_count(&self) -> u32 {
        self.dispatch.instance_count
    }

    pub fn dispatch(&self) -> &DispatchSize {
        &self.dispatch
    }

    /// Compacted visible instances; `[..instance_count]` is meaningful after a cull.
    pub fn culled_buffer(&self) -> &wgpu::Buffer {
        &self.culled
    }

    pub fn draw_args_buffer(&self, lod: LodLevel) -> &wgpu::Buffer {
        &self.draw_args[lod.index()]
    }

    pub fn bind_group(&self, lod: LodLevel) -> &wgpu::BindGroup {
        &self.bind_groups[lod.index()]
    }

    /// Upload this frame's camera state and chunk sizes.
    pub fn write_params(&self, queue: &wgpu::Queue, test: &VisibilityTest) {
        let params = CullParams::new(test, &self.dispatch);
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(&params));
    }

    /// Re-seed the record for `lod` with a zero instance count. Recorded in
    /// the command stream so it lands before the compact pass.
    pub fn reset_args(&self, encoder: &mut wgpu::CommandEncoder, seeds: &DrawArgSeeds, lod: LodLevel) {
        encoder.copy_buffer_to_buffer(
            seeds.buffer(lod),
            0,
            &self.draw_args[lod.index()],
            0,
            DRAW_ARGS_SIZE,
        );
    }

    pub fn destroy(&self) {
        self.instances.destroy();
        self.culled.destroy();
        self.params.destroy();
        for buffer in &self.draw_args {
            buffer.destroy();
        }
    }
}
