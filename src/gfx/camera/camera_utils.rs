use cgmath::Vector3;

use crate::gfx::{
    math::{self, Mat4, Vec3},
    resources::UniformSet,
};

/// Projection parameters of a perspective camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.01,
            far: 2000.0,
            up: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Per-frame camera values shared by every material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUniform {
    /// World-to-camera matrix
    pub view: Mat4,
    pub projection: Mat4,
    /// Camera position in world space
    pub position: Vec3,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view: math::identity(),
            projection: math::identity(),
            position: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl CameraUniform {
    pub fn to_uniform_set(&self) -> UniformSet {
        UniformSet::new()
            .with("u_view_matrix", self.view)
            .with("u_proj_matrix", self.projection)
            .with("u_surfaceToView", self.position)
    }
}
