//! GPU context, buffer allocation and readback

pub mod context;
pub mod buffer;
pub mod readback;

pub use context::GpuContext;
