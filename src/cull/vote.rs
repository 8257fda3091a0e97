//! Visibility predicate evaluated by the vote pass.
//!
//! `VisibilityTest::is_visible` is the host-side twin of `cs_vote` in
//! grass_cull.wgsl. Keep the two in step.

use glam::{Mat4, Vec3, Vec4Swizzles};

use crate::core::camera::FrameCamera;
use crate::grass::config::GrassConfig;
use crate::math::{Aabb, Frustum};

/// Camera and cutoff state for one frame's vote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityTest {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub distance_cutoff: f32,
    /// Radians, positive when looking down
    pub camera_pitch: f32,
    pub blade_height: f32,
    pub frustum_margin: f32,
    pub pitch_margin: f32,
}

impl VisibilityTest {
    pub fn new(camera: &FrameCamera, config: &GrassConfig) -> Self {
        Self {
            view_proj: camera.view_proj,
            camera_position: camera.position,
            distance_cutoff: config.distance_cutoff,
            camera_pitch: camera.pitch,
            blade_height: config.blade_height,
            frustum_margin: config.frustum_margin,
            pitch_margin: config.pitch_margin,
        }
    }

    /// Vertical clip tolerance; grows as the camera tilts toward the ground
    /// so blades rooted just below the screen edge still count.
    pub fn vertical_margin(&self) -> f32 {
        self.frustum_margin + self.pitch_margin * self.camera_pitch.sin().abs()
    }

    /// Within the cutoff, and root or tip inside the expanded clip volume.
    pub fn is_visible(&self, position: Vec3) -> bool {
        if position.distance(self.camera_position) > self.distance_cutoff {
            return false;
        }
        let vertical_margin = self.vertical_margin();
        let tip = position + Vec3::new(0.0, self.blade_height, 0.0);
        self.in_clip(position, vertical_margin) || self.in_clip(tip, vertical_margin)
    }

    /// Frustum whose side planes sit on the margin-expanded clip edges, so a
    /// point passes its plane tests exactly when `in_clip` accepts it.
    pub fn expanded_frustum(&self) -> Frustum {
        let shrink = Mat4::from_scale(Vec3::new(
            1.0 / (1.0 + self.frustum_margin),
            1.0 / (1.0 + self.vertical_margin()),
            1.0,
        ));
        Frustum::from_view_projection(&(shrink * self.view_proj))
    }

    /// Conservative chunk test: false only when no instance inside `bound`
    /// can pass `is_visible`. `frustum` comes from `expanded_frustum`.
    pub fn may_contain_visible(&self, frustum: &Frustum, bound: &Aabb) -> bool {
        if bound.distance_to_point(self.camera_position) > self.distance_cutoff {
            return false;
        }
        // Tips can rise above the bound
        frustum.intersects_aabb(&bound.raised(self.blade_height))
    }

    fn in_clip(&self, point: Vec3, vertical_margin: f32) -> bool {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w <= 0.0 {
            return false;
        }
        let x_limit = clip.w * (1.0 + self.frustum_margin);
        let y_limit = clip.w * (1.0 + vertical_margin);
        let xy = clip.xy().abs();
        xy.x <= x_limit && xy.y <= y_limit && clip.z >= 0.0 && clip.z <= clip.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;

    fn test_for(camera: &Camera, cutoff: f32) -> VisibilityTest {
        let config = GrassConfig {
            distance_cutoff: cutoff,
            frustum_margin: 0.0,
            pitch_margin: 0.0,
            blade_height: 1.0,
            ..Default::default()
        };
        VisibilityTest::new(&FrameCamera::from_camera(camera), &config)
    }

    #[test]
    fn test_in_front_visible_behind_culled() {
        let camera = Camera::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -10.0));
        let test = test_for(&camera, 100.0);
        assert!(test.is_visible(Vec3::new(0.0, 0.5, -10.0)));
        assert!(!test.is_visible(Vec3::new(0.0, 0.5, 10.0)));
    }

    #[test]
    fn test_distance_cutoff() {
        let camera = Camera::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -10.0));
        let test = test_for(&camera, 20.0);
        assert!(test.is_visible(Vec3::new(0.0, 1.0, -19.0)));
        assert!(!test.is_visible(Vec3::new(0.0, 1.0, -21.0)));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let test = test_for(&camera, 10.0);
        assert!(test.is_visible(Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn test_tip_keeps_blade_visible() {
        // Root just below the bottom edge, tip above it
        let camera = Camera::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -10.0));
        let mut test = test_for(&camera, 100.0);
        let below = Vec3::new(0.0, 1.0 - camera.projection.half_extent_at(10.0).y - 0.3, -10.0);
        test.blade_height = 0.0;
        assert!(!test.is_visible(below));
        test.blade_height = 1.0;
        assert!(test.is_visible(below));
    }

    #[test]
    fn test_pitch_widens_vertical_margin() {
        let mut test = test_for(&Camera::default(), 100.0);
        test.frustum_margin = 0.1;
        test.pitch_margin = 0.5;
        test.camera_pitch = 0.0;
        assert!((test.vertical_margin() - 0.1).abs() < 1e-6);
        test.camera_pitch = std::f32::consts::FRAC_PI_2;
        assert!((test.vertical_margin() - 0.6).abs() < 1e-6);
        test.camera_pitch = -std::f32::consts::FRAC_PI_2;
        assert!((test.vertical_margin() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_margin_admits_just_outside() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut test = test_for(&camera, 100.0);
        test.blade_height = 0.0;
        let half_w = camera.projection.half_extent_at(10.0).x;
        let outside = Vec3::new(half_w * 1.05, 0.0, -10.0);
        assert!(!test.is_visible(outside));
        test.frustum_margin = 0.1;
        assert!(test.is_visible(outside));
    }

    #[test]
    fn test_chunk_behind_camera_rejected() {
        let camera = Camera::look_at(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, -10.0));
        let test = test_for(&camera, 100.0);
        let frustum = test.expanded_frustum();
        let ahead = Aabb::new(Vec3::new(-2.0, -1.0, -12.0), Vec3::new(2.0, 1.0, -8.0));
        let behind = Aabb::new(Vec3::new(-2.0, -1.0, 8.0), Vec3::new(2.0, 1.0, 12.0));
        assert!(test.may_contain_visible(&frustum, &ahead));
        assert!(!test.may_contain_visible(&frustum, &behind));
    }

    #[test]
    fn test_chunk_beyond_cutoff_rejected() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let test = test_for(&camera, 20.0);
        let frustum = test.expanded_frustum();
        let far = Aabb::new(Vec3::new(-1.0, -1.0, -30.0), Vec3::new(1.0, 1.0, -25.0));
        assert!(!test.may_contain_visible(&frustum, &far));
    }

    #[test]
    fn test_chunk_test_never_rejects_visible_instance() {
        // Sweep instances around the frustum edges; any chunk holding a
        // visible one must pass the chunk test.
        let camera = Camera::look_at(Vec3::new(0.0, 3.0, 0.0), Vec3::new(4.0, 0.0, -10.0));
        let mut test = test_for(&camera, 60.0);
        test.frustum_margin = 0.1;
        test.pitch_margin = 0.3;
        let frustum = test.expanded_frustum();

        for xi in -30..30 {
            for zi in -30..30 {
                let p = Vec3::new(xi as f32 * 1.7, 0.0, zi as f32 * 1.7);
                if test.is_visible(p) {
                    let bound = Aabb::from_center_half_extent(p + Vec3::new(0.4, 0.0, -0.3), Vec3::new(1.0, 0.5, 1.0));
                    assert!(test.may_contain_visible(&frustum, &bound), "chunk around {p} rejected");
                }
            }
        }
    }
}
