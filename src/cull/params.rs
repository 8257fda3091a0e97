//! GPU-ready cull uniform (112 bytes, 16-byte aligned).

use bytemuck::{Pod, Zeroable};

use super::sizing::DispatchSize;
use super::vote::VisibilityTest;

/// Per-chunk uniform for every cull entry point. Must match `CullParams` in grass_cull.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CullParams {
    pub view_proj: [[f32; 4]; 4],
    // -- 64 bytes --
    pub camera_position: [f32; 3],
    pub distance_cutoff: f32,
    // -- 16 bytes --
    pub camera_pitch: f32,
    pub blade_height: f32,
    pub frustum_margin: f32,
    pub pitch_margin: f32,
    // -- 16 bytes --
    pub num_instances: u32,
    /// Length of the group-sum arrays for this chunk (`scan_groups`)
    pub num_groups: u32,
    pub _pad: [u32; 2],
    // -- 16 bytes --
    // Total: 112 bytes
}

impl CullParams {
    pub fn new(test: &VisibilityTest, dispatch: &DispatchSize) -> Self {
        Self {
            view_proj: test.view_proj.to_cols_array_2d(),
            camera_position: test.camera_position.to_array(),
            distance_cutoff: test.distance_cutoff,
            camera_pitch: test.camera_pitch,
            blade_height: test.blade_height,
            frustum_margin: test.frustum_margin,
            pitch_margin: test.pitch_margin,
            num_instances: dispatch.instance_count,
            num_groups: dispatch.scan_groups,
            _pad: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn test_cull_params_size() {
        assert_eq!(std::mem::size_of::<CullParams>(), 112);
        assert_eq!(std::mem::size_of::<CullParams>() % 16, 0);
    }

    #[test]
    fn test_from_test_and_dispatch() {
        let test = VisibilityTest {
            view_proj: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            camera_position: Vec3::new(4.0, 5.0, 6.0),
            distance_cutoff: 50.0,
            camera_pitch: 0.25,
            blade_height: 1.5,
            frustum_margin: 0.1,
            pitch_margin: 0.2,
        };
        let dispatch = DispatchSize::for_instances(300);
        let params = CullParams::new(&test, &dispatch);

        let words: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&params));
        // Translation lives in column 3
        assert_eq!(&words[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(&words[16..20], &[4.0, 5.0, 6.0, 50.0]);
        assert_eq!(&words[20..24], &[0.25, 1.5, 0.1, 0.2]);
        assert_eq!(params.num_instances, 300);
        assert_eq!(params.num_groups, 4);
    }
}
