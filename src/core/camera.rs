//! Camera pose and projection, and the snapshot the culling passes read each frame

use crate::core::types::{Mat4, Quat, Vec2, Vec3};

/// Perspective projection with 0..1 clip depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Half width and half height of the view volume `depth` meters ahead.
    pub fn half_extent_at(&self, depth: f32) -> Vec2 {
        let half_height = depth * (self.fov_y * 0.5).tan();
        Vec2::new(half_height * self.aspect, half_height)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(60.0, 16.0 / 9.0)
    }
}

/// Roll-free camera: yaw about world Y, then pitch about the local X axis.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    pub projection: Projection,
}

impl Camera {
    /// Camera at `position` looking down -Z.
    pub fn new(position: Vec3, projection: Projection) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            projection,
        }
    }

    /// `yaw` turns left from -Z; `pitch_up` tilts the view above the horizon.
    pub fn from_yaw_pitch(position: Vec3, yaw: f32, pitch_up: f32, projection: Projection) -> Self {
        Self {
            position,
            orientation: Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch_up),
            projection,
        }
    }

    /// Camera at `position` facing `target`, with the default projection.
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let dir = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let yaw = (-dir.x).atan2(-dir.z);
        let pitch_up = dir.y.clamp(-1.0, 1.0).asin();
        Self::from_yaw_pitch(position, yaw, pitch_up, Projection::default())
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.orientation * Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.view_matrix()
    }

    /// Pitch in radians, positive when looking down toward the ground
    pub fn pitch(&self) -> f32 {
        (-self.forward().y).clamp(-1.0, 1.0).asin()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 5.0), Projection::default())
    }
}

/// Camera state computed once per frame and shared by every chunk's cull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCamera {
    pub position: Vec3,
    pub view_proj: Mat4,
    /// Radians, positive when looking down
    pub pitch: f32,
}

impl FrameCamera {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            position: camera.position,
            view_proj: camera.view_projection(),
            pitch: camera.pitch(),
        }
    }
}
