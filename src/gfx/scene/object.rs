use log::warn;

use crate::gfx::{
    math::{self, Mat4, Vec3},
    resources::{Drawable, MaterialId, UniformSet},
    scene::transform::Transform,
};

/// A drawable placed in the world with one material.
///
/// The drawable and material are shared handles into the owning scene; the
/// transform belongs to this node alone. The model matrix and its
/// inverse-transpose are recomputed on every transform mutation.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub visible: bool,
    drawable: Drawable,
    material: MaterialId,
    transform: Transform,
    offset: Vec3,
    model_matrix: Mat4,
    normal_matrix: Mat4,
}

impl SceneNode {
    /// `offset` is the drawable's re-centering translation, applied in model space.
    pub fn new(name: impl Into<String>, drawable: Drawable, material: MaterialId, offset: Vec3) -> Self {
        let mut node = Self {
            name: name.into(),
            visible: true,
            drawable,
            material,
            transform: Transform::default(),
            offset,
            model_matrix: math::identity(),
            normal_matrix: math::identity(),
        };
        node.update_matrix();
        node
    }

    pub fn drawable(&self) -> Drawable {
        self.drawable
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn translation(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn rotation(&self) -> Vec3 {
        self.transform.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    /// Inverse-transpose of the model matrix, for transforming normals
    pub fn normal_matrix(&self) -> Mat4 {
        self.normal_matrix
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.translation = translation;
        self.update_matrix();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
        self.update_matrix();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.update_matrix();
    }

    /// Sets the X rotation angle (radians).
    pub fn rotate_x(&mut self, angle: f32) {
        self.transform.rotation.x = angle;
        self.update_matrix();
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.transform.rotation.y = angle;
        self.update_matrix();
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.transform.rotation.z = angle;
        self.update_matrix();
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.update_matrix();
    }

    /// Per-node uniforms pushed before every draw of this node
    pub fn uniforms(&self) -> UniformSet {
        UniformSet::new()
            .with("u_model_matrix", self.model_matrix)
            .with("u_world_inversed_transposed", self.normal_matrix)
    }

    fn update_matrix(&mut self) {
        self.model_matrix = self.transform.matrix(self.offset);
        self.normal_matrix = math::inverse_transpose(self.model_matrix).unwrap_or_else(|| {
            warn!("Node '{}' has a singular model matrix", self.name);
            math::identity()
        });
    }
}
