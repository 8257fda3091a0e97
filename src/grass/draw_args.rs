//! Indirect draw-argument record and the mesh/LOD inputs that seed it.

use bytemuck::{Pod, Zeroable};

use crate::core::error::Error;
use crate::core::types::Result;

/// Index range of one mesh variant, supplied by the mesh collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshInfo {
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
}

/// Near/far mesh switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LodLevel {
    Full,
    Reduced,
}

impl LodLevel {
    pub const ALL: [LodLevel; 2] = [LodLevel::Full, LodLevel::Reduced];

    /// `Reduced` once the camera is strictly farther than `threshold`.
    pub fn select(distance: f32, threshold: f32) -> Self {
        if distance > threshold {
            LodLevel::Reduced
        } else {
            LodLevel::Full
        }
    }

    pub fn index(self) -> usize {
        match self {
            LodLevel::Full => 0,
            LodLevel::Reduced => 1,
        }
    }
}

/// Both mesh variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LodMeshes {
    pub full: MeshInfo,
    pub reduced: MeshInfo,
}

impl LodMeshes {
    /// Single mesh for both levels.
    pub fn uniform(mesh: MeshInfo) -> Self {
        Self { full: mesh, reduced: mesh }
    }

    pub fn get(&self, lod: LodLevel) -> MeshInfo {
        match lod {
            LodLevel::Full => self.full,
            LodLevel::Reduced => self.reduced,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for lod in LodLevel::ALL {
            if self.get(lod).index_count == 0 {
                return Err(Error::Config(format!("{lod:?} mesh has no indices")));
            }
        }
        Ok(())
    }
}

/// Indexed indirect draw arguments (20 bytes). Layout matches
/// `draw_indexed_indirect` and the `draw_args` binding in grass_cull.wgsl,
/// where `instance_count` (word 1) is the atomic accumulator.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

/// Byte size of the record on the GPU.
pub const DRAW_ARGS_SIZE: u64 = std::mem::size_of::<DrawArgs>() as u64;

impl DrawArgs {
    /// Record seeded from a mesh with a zero instance count.
    pub fn seeded(mesh: MeshInfo) -> Self {
        Self {
            index_count: mesh.index_count,
            instance_count: 0,
            first_index: mesh.first_index,
            base_vertex: mesh.base_vertex,
            first_instance: 0,
        }
    }
}
