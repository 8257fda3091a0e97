//! Instance generators: fill a chunk's dense instance buffer once.
//!
//! The culling passes treat the generator as opaque. The only contract is
//! that `generate` returns exactly `placement.instance_count()` instances.

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};
use rayon::prelude::*;

use crate::grass::chunk::ChunkPlacement;
use crate::grass::config::GrassConfig;
use crate::grass::instance::GrassInstance;

/// Produces the candidate instances of one chunk.
pub trait InstanceGenerator: Send + Sync {
    fn generate(&self, placement: &ChunkPlacement) -> Vec<GrassInstance>;
}

/// Jittered grid scatter over an optional Perlin heightfield.
///
/// Jitter is hashed from the global blade coordinate, so neighbouring chunks
/// never produce the same pattern and results are stable for a seed.
pub struct ScatterGenerator {
    seed: u32,
    jitter: f32,
    height_amplitude: f32,
    height_frequency: f32,
    perlin: Perlin,
}

impl ScatterGenerator {
    pub fn new(seed: u32, jitter: f32, height_amplitude: f32, height_frequency: f32) -> Self {
        Self {
            seed,
            jitter: jitter.clamp(0.0, 1.0),
            height_amplitude,
            height_frequency,
            perlin: Perlin::new(seed),
        }
    }

    pub fn from_config(config: &GrassConfig) -> Self {
        Self::new(
            config.seed,
            config.jitter,
            config.height_amplitude,
            config.height_frequency,
        )
    }

    /// Integer hash producing a value in [0, 1].
    fn hash_2d(ix: u32, iz: u32, seed: u32) -> f32 {
        let mut h = ix.wrapping_mul(374761393)
            .wrapping_add(iz.wrapping_mul(668265263))
            .wrapping_add(seed.wrapping_mul(1274126177));
        h = (h ^ (h >> 13)).wrapping_mul(1103515245);
        h = h ^ (h >> 16);
        (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
    }

    /// Ground height at a world XZ position.
    pub fn ground_height(&self, x: f32, z: f32) -> f32 {
        if self.height_amplitude == 0.0 {
            return 0.0;
        }
        let sample = self.perlin.get([
            (x * self.height_frequency) as f64,
            (z * self.height_frequency) as f64,
        ]);
        sample as f32 * self.height_amplitude
    }
}

impl InstanceGenerator for ScatterGenerator {
    fn generate(&self, placement: &ChunkPlacement) -> Vec<GrassInstance> {
        let n = placement.instance_dimension;
        let spacing = placement.size / n as f32;
        let origin = Vec2::new(placement.bound.min.x, placement.bound.min.z);
        let (min_y, max_y) = (placement.bound.min.y, placement.bound.max.y);
        let global_x0 = placement.x * n;
        let global_z0 = placement.z * n;

        (0..n)
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..n).map(move |col| {
                    let gx = global_x0 + col;
                    let gz = global_z0 + row;
                    let offset = Vec2::new(
                        Self::hash_2d(gx, gz, self.seed) - 0.5,
                        Self::hash_2d(gz, gx, self.seed ^ 0x9E37_79B9) - 0.5,
                    ) * self.jitter * spacing;

                    let xz = origin + (Vec2::new(col as f32, row as f32) + 0.5) * spacing + offset;
                    let y = self.ground_height(xz.x, xz.y).clamp(min_y, max_y);

                    let uv = ((xz - placement.field_min) / placement.field_size)
                        .clamp(Vec2::ZERO, Vec2::ONE);
                    GrassInstance::new(Vec3::new(xz.x, y, xz.y), uv)
                })
            })
            .collect()
    }
}
