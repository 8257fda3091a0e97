//! Scratch buffers shared by every chunk's cull within a frame.
//!
//! Contents are write-before-read inside one chunk's vote→scan→compact run
//! and carry nothing across chunks or frames. One set serves chunks
//! recorded one after another; overlapping chunks each need their own set.

use crate::core::types::Result;
use crate::render::buffer::create_storage_buffer;

use super::sizing::DispatchSize;

const WORD: u64 = std::mem::size_of::<u32>() as u64;

pub struct ScratchBuffers {
    /// 0/1 per instance
    pub votes: wgpu::Buffer,
    /// Group-local exclusive offsets per instance
    pub scan: wgpu::Buffer,
    /// Total votes per group
    pub group_sums: wgpu::Buffer,
    /// Votes in all preceding groups
    pub scanned_group_sums: wgpu::Buffer,
    dispatch: DispatchSize,
}

impl ScratchBuffers {
    /// Allocate scratch large enough for `dispatch` (normally the largest chunk).
    pub fn new(device: &wgpu::Device, dispatch: DispatchSize) -> Result<Self> {
        let per_instance = dispatch.scratch_len() * WORD;
        let per_group = dispatch.scan_groups as u64 * WORD;
        // COPY_SRC for diagnostics readback
        let usage = wgpu::BufferUsages::COPY_SRC;

        let votes = create_storage_buffer(device, "grass_cull_votes", per_instance, usage)?;
        let scan = create_storage_buffer(device, "grass_cull_scan", per_instance, usage)?;
        let group_sums = create_storage_buffer(device, "grass_cull_group_sums", per_group, usage)?;
        let scanned_group_sums =
            create_storage_buffer(device, "grass_cull_scanned_group_sums", per_group, usage)?;

        log::debug!(
            "Cull scratch: {} instance slots, {} group slots ({} KB)",
            dispatch.scratch_len(),
            dispatch.scan_groups,
            (2 * per_instance + 2 * per_group) / 1024
        );

        Ok(Self {
            votes,
            scan,
            group_sums,
            scanned_group_sums,
            dispatch,
        })
    }

    pub fn dispatch(&self) -> &DispatchSize {
        &self.dispatch
    }

    /// Whether a chunk sized `dispatch` fits this scratch set.
    pub fn covers(&self, dispatch: &DispatchSize) -> bool {
        self.dispatch.covers(dispatch)
    }

    /// Release GPU memory now rather than at drop.
    pub fn destroy(&self) {
        self.votes.destroy();
        self.scan.destroy();
        self.group_sums.destroy();
        self.scanned_group_sums.destroy();
    }
}
