//! GPU instance record (32 bytes, 16-byte aligned).

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One grass blade. Must match `GrassInstance` in grass_cull.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GrassInstance {
    pub position: [f32; 3],
    pub _pad0: f32,
    // -- 16 bytes --
    /// UV across the whole field, 0..1
    pub uv: [f32; 2],
    pub _pad1: [f32; 2],
    // -- 16 bytes --
    // Total: 32 bytes
}

impl GrassInstance {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            _pad0: 0.0,
            uv: uv.to_array(),
            _pad1: [0.0; 2],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// Byte size of one instance on the GPU.
pub const INSTANCE_STRIDE: u64 = std::mem::size_of::<GrassInstance>() as u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_size() {
        assert_eq!(std::mem::size_of::<GrassInstance>(), 32);
        assert_eq!(INSTANCE_STRIDE, 32);
    }

    #[test]
    fn test_field_offsets() {
        let instance = GrassInstance::new(Vec3::new(1.0, 2.0, 3.0), Vec2::new(0.25, 0.75));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&instance));
        assert_eq!(&floats[0..3], &[1.0, 2.0, 3.0]);
        // uv sits at byte 16 to follow the vec3 alignment rule
        assert_eq!(&floats[4..6], &[0.25, 0.75]);
    }

    #[test]
    fn test_accessors() {
        let instance = GrassInstance::new(Vec3::new(-4.0, 0.5, 9.0), Vec2::new(0.1, 0.9));
        assert_eq!(instance.position(), Vec3::new(-4.0, 0.5, 9.0));
        assert_eq!(instance.uv(), Vec2::new(0.1, 0.9));
    }
}
