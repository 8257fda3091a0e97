//! Chunk partitioner: splits the square field into a grid of chunks.

use glam::{Vec2, Vec3};

use crate::grass::config::GrassConfig;
use crate::math::Aabb;

/// World-space placement of one chunk, handed to the instance generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkPlacement {
    /// Flat index, `z + x * chunk_dimension`
    pub index: usize,
    /// Grid column along X
    pub x: u32,
    /// Grid row along Z
    pub z: u32,
    pub bound: Aabb,
    /// Side length in meters
    pub size: f32,
    /// Blades per side
    pub instance_dimension: u32,
    /// Minimum XZ corner of the whole field, for world UVs
    pub field_min: Vec2,
    pub field_size: f32,
}

impl ChunkPlacement {
    pub fn instance_count(&self) -> u32 {
        self.instance_dimension * self.instance_dimension
    }
}

/// Grid of chunks covering a field centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkLayout {
    pub chunk_dimension: u32,
    pub field_size: f32,
    pub bound_height: f32,
    pub instance_dimension: u32,
}

impl ChunkLayout {
    pub fn from_config(config: &GrassConfig) -> Self {
        Self {
            chunk_dimension: config.chunk_dimension,
            field_size: config.field_size,
            bound_height: config.bound_height,
            instance_dimension: config.per_dimension(),
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.field_size / self.chunk_dimension as f32
    }

    pub fn chunk_count(&self) -> usize {
        (self.chunk_dimension * self.chunk_dimension) as usize
    }

    /// Placement of the chunk at grid cell (x, z).
    pub fn placement(&self, x: u32, z: u32) -> ChunkPlacement {
        let chunk_size = self.chunk_size();
        let half_field = self.field_size * 0.5;

        let center = Vec3::new(
            -half_field + (x as f32 + 0.5) * chunk_size,
            0.0,
            -half_field + (z as f32 + 0.5) * chunk_size,
        );
        let half_extent = Vec3::new(chunk_size * 0.5, self.bound_height * 0.5, chunk_size * 0.5);

        ChunkPlacement {
            index: (z + x * self.chunk_dimension) as usize,
            x,
            z,
            bound: Aabb::from_center_half_extent(center, half_extent),
            size: chunk_size,
            instance_dimension: self.instance_dimension,
            field_min: Vec2::splat(-half_field),
            field_size: self.field_size,
        }
    }

    /// All placements, ordered by flat index.
    pub fn placements(&self) -> Vec<ChunkPlacement> {
        let mut out = Vec::with_capacity(self.chunk_count());
        for x in 0..self.chunk_dimension {
            for z in 0..self.chunk_dimension {
                out.push(self.placement(x, z));
            }
        }
        out
    }
}
