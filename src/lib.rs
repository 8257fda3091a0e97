//! Tallgrass - chunked grass fields with GPU instance culling

pub mod core;
pub mod math;
pub mod grass;
pub mod cull;
pub mod render;
pub mod field;
