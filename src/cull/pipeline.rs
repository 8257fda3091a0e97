//! Compute pipelines for the four cull stages.
//!
//! One shader module, one bind group layout, four entry points. Every stage is
//! recorded as its own compute pass so wgpu's usage tracking orders each
//! stage's writes before the next stage's reads.

use super::scratch::ScratchBuffers;
use super::sizing::DispatchSize;

/// Buffers bound for one chunk (and one draw-argument record).
pub struct CullBindings<'a> {
    pub params: &'a wgpu::Buffer,
    pub instances: &'a wgpu::Buffer,
    pub scratch: &'a ScratchBuffers,
    pub culled: &'a wgpu::Buffer,
    pub draw_args: &'a wgpu::Buffer,
}

pub struct CullPipeline {
    bind_group_layout: wgpu::BindGroupLayout,
    vote: wgpu::ComputePipeline,
    scan_instances: wgpu::ComputePipeline,
    scan_groups: wgpu::ComputePipeline,
    compact: wgpu::ComputePipeline,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl CullPipeline {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grass_cull_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/grass_cull.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass_cull_layout"),
            entries: &[
                // Cull params
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Dense instances
                storage_entry(1, true),
                // Votes
                storage_entry(2, false),
                // Local scan
                storage_entry(3, false),
                // Group sums
                storage_entry(4, false),
                // Scanned group sums
                storage_entry(5, false),
                // Culled instances
                storage_entry(6, false),
                // Draw args (atomic instance count)
                storage_entry(7, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_cull_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let make = |label: &str, entry_point: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Self {
            vote: make("grass_cull_vote", "cs_vote"),
            scan_instances: make("grass_cull_scan_instances", "cs_scan_instances"),
            scan_groups: make("grass_cull_scan_groups", "cs_scan_groups"),
            compact: make("grass_cull_compact", "cs_compact"),
            bind_group_layout,
        }
    }

    /// Bind group for one chunk and one of its draw-argument records.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        bindings: &CullBindings<'_>,
    ) -> wgpu::BindGroup {
        let scratch = bindings.scratch;
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: bindings.params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: bindings.instances.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: scratch.votes.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: scratch.scan.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: scratch.group_sums.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 5, resource: scratch.scanned_group_sums.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 6, resource: bindings.culled.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 7, resource: bindings.draw_args.as_entire_binding() },
            ],
        })
    }

    fn dispatch(
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        workgroups: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(workgroups, 1, 1);
    }

    /// One flag per instance.
    pub fn vote(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, size: &DispatchSize) {
        Self::dispatch(encoder, "grass_cull_vote_pass", &self.vote, bind_group, size.vote_groups);
    }

    /// Per-group exclusive scan and group totals.
    pub fn scan_local(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, size: &DispatchSize) {
        Self::dispatch(encoder, "grass_cull_scan_local_pass", &self.scan_instances, bind_group, size.scan_groups);
    }

    /// Exclusive scan of the group totals.
    pub fn scan_groups(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, size: &DispatchSize) {
        Self::dispatch(encoder, "grass_cull_scan_groups_pass", &self.scan_groups, bind_group, size.group_scan_groups);
    }

    /// Scatter voted instances and bump the instance count.
    pub fn compact(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, size: &DispatchSize) {
        Self::dispatch(encoder, "grass_cull_compact_pass", &self.compact, bind_group, size.vote_groups);
    }
}
