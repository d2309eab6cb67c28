use log::warn;

use crate::gfx::{
    camera::camera_utils::{CameraConfig, CameraUniform},
    math::{self, Mat4, Vec3},
    scene::transform::Transform,
};

/// Perspective camera placed in the world by its own [`Transform`].
///
/// The camera matrix is the camera's world placement; the view matrix pushed
/// to shaders is its inverse. Both matrices are recomputed eagerly on every
/// mutation.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    config: CameraConfig,
    camera_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            transform: Transform::default(),
            config,
            camera_matrix: math::identity(),
            projection_matrix: math::identity(),
        };
        camera.update_camera_matrix();
        camera.update_projection_matrix();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn translation(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn camera_matrix(&self) -> Mat4 {
        self.camera_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Inverse of the camera matrix; identity if the placement is singular.
    pub fn view_matrix(&self) -> Mat4 {
        math::inverse(self.camera_matrix).unwrap_or_else(|| {
            warn!("Camera matrix is singular, using identity view");
            math::identity()
        })
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view: self.view_matrix(),
            projection: self.projection_matrix,
            position: self.transform.translation,
        }
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.translation = translation;
        self.update_camera_matrix();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
        self.update_camera_matrix();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.update_camera_matrix();
    }

    /// Sets the X rotation angle (radians).
    pub fn rotate_x(&mut self, angle: f32) {
        self.transform.rotation.x = angle;
        self.update_camera_matrix();
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.transform.rotation.y = angle;
        self.update_camera_matrix();
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.transform.rotation.z = angle;
        self.update_camera_matrix();
    }

    /// Points the camera at `target` from its current translation.
    ///
    /// This overrides the transform-derived camera matrix until the next
    /// transform mutation.
    pub fn look_at(&mut self, target: Vec3) {
        self.camera_matrix = math::look_at(self.transform.translation, target, self.config.up);
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.config.fov = fov;
        self.update_projection_matrix();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.config.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn set_near(&mut self, near: f32) {
        self.config.near = near;
        self.update_projection_matrix();
    }

    pub fn set_far(&mut self, far: f32) {
        self.config.far = far;
        self.update_projection_matrix();
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.config.up = up;
    }

    /// Updates the aspect ratio for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height == 0 {
            warn!("Ignoring resize to zero height ({}x{})", width, height);
            return;
        }
        self.set_aspect(width as f32 / height as f32);
    }

    fn update_camera_matrix(&mut self) {
        self.camera_matrix = self.transform.matrix(Vec3::new(0.0, 0.0, 0.0));
    }

    fn update_projection_matrix(&mut self) {
        let CameraConfig {
            fov,
            aspect,
            near,
            far,
            ..
        } = self.config;
        self.projection_matrix = math::perspective(fov, aspect, near, far);
    }
}
