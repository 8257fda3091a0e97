//! GPU stream compaction of grass instances: vote → scan → compact.
//!
//! `sizing` turns an instance count into dispatch dimensions, `pipeline`
//! records the four compute stages, and `reference` models the same stages
//! on the host for validation.

pub mod sizing;
pub mod params;
pub mod vote;
pub mod reference;
pub mod scratch;
pub mod pipeline;

pub use sizing::{DispatchSize, SCAN_GROUP_SIZE, GROUP_SCAN_BLOCK_SIZE};
pub use params::CullParams;
pub use vote::VisibilityTest;
pub use scratch::ScratchBuffers;
pub use pipeline::{CullBindings, CullPipeline};
