//! Per-chunk cull state machine.
//!
//! Every chunk walks `ResetArgs → Vote → ScanLocal → ScanGroups → Compact →
//! ReadyForDraw` every frame. The reset always comes first, so the compact
//! pass accumulates onto a zero instance count.

use crate::core::types::Result;
use crate::core::error::Error;
use crate::cull::{CullPipeline, ScratchBuffers, VisibilityTest};
use crate::grass::draw_args::LodLevel;

use super::chunk::{DrawArgSeeds, GrassChunk};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullStage {
    ResetArgs,
    Vote,
    ScanLocal,
    ScanGroups,
    Compact,
    ReadyForDraw,
}

impl CullStage {
    /// Following stage; `ReadyForDraw` is terminal.
    pub fn next(self) -> Self {
        match self {
            CullStage::ResetArgs => CullStage::Vote,
            CullStage::Vote => CullStage::ScanLocal,
            CullStage::ScanLocal => CullStage::ScanGroups,
            CullStage::ScanGroups => CullStage::Compact,
            CullStage::Compact => CullStage::ReadyForDraw,
            CullStage::ReadyForDraw => CullStage::ReadyForDraw,
        }
    }
}

/// Field-wide resources every chunk's cull runs against.
pub struct CullResources<'a> {
    pub pipeline: &'a CullPipeline,
    pub scratch: &'a ScratchBuffers,
    pub seeds: &'a DrawArgSeeds,
}

/// Write the chunk's params and record its full cull into `encoder`.
///
/// Chunks recorded into the same encoder run one after another against the
/// shared scratch set.
pub fn cull_chunk(
    resources: &CullResources<'_>,
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    chunk: &GrassChunk,
    test: &VisibilityTest,
    lod: LodLevel,
) -> Result<CullStage> {
    if !resources.scratch.covers(chunk.dispatch()) {
        return Err(Error::Gpu(format!("Scratch too small for chunk {}", chunk.index)));
    }

    chunk.write_params(queue, test);

    let bind_group = chunk.bind_group(lod);
    let size = chunk.dispatch();
    let mut stage = CullStage::ResetArgs;
    loop {
        log::trace!("chunk {} {:?}", chunk.index, stage);
        match stage {
            CullStage::ResetArgs => chunk.reset_args(encoder, resources.seeds, lod),
            CullStage::Vote => resources.pipeline.vote(encoder, bind_group, size),
            CullStage::ScanLocal => resources.pipeline.scan_local(encoder, bind_group, size),
            CullStage::ScanGroups => resources.pipeline.scan_groups(encoder, bind_group, size),
            CullStage::Compact => resources.pipeline.compact(encoder, bind_group, size),
            CullStage::ReadyForDraw => return Ok(stage),
        }
        stage = stage.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut stage = CullStage::ResetArgs;
        let mut seen = vec![stage];
        while stage != CullStage::ReadyForDraw {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(seen, vec![
            CullStage::ResetArgs,
            CullStage::Vote,
            CullStage::ScanLocal,
            CullStage::ScanGroups,
            CullStage::Compact,
            CullStage::ReadyForDraw,
        ]);
    }

    #[test]
    fn test_ready_is_terminal() {
        assert_eq!(CullStage::ReadyForDraw.next(), CullStage::ReadyForDraw);
    }
}
