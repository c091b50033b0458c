use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::state::ViewMatrices;

/// Fixed look-at camera with a perspective projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 75.0, 100.0),
            target: Vec3::new(0.0, 0.0, 40.0),
            up: Vec3::Y,
            fov_degrees: 90.0,
            near: 20.0,
            far: 160.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    /// Matrices for a target of `width` x `height` pixels.
    pub fn matrices(&self, width: u32, height: u32) -> ViewMatrices {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        ViewMatrices {
            view: self.view_matrix(),
            projection: self.projection_matrix(aspect),
        }
    }
}
