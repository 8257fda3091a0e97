//! Grass field data: configuration, instance records, chunk partitioning,
//! placement, and the draw-argument record the culling passes fill.

pub mod config;
pub mod instance;
pub mod chunk;
pub mod generator;
pub mod draw_args;

pub use config::GrassConfig;
pub use instance::{GrassInstance, INSTANCE_STRIDE};
pub use chunk::{ChunkLayout, ChunkPlacement};
pub use generator::{InstanceGenerator, ScatterGenerator};
pub use draw_args::{DrawArgs, LodLevel, LodMeshes, MeshInfo, DRAW_ARGS_SIZE};
