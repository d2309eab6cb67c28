use cgmath::Vector3;

use crate::gfx::math::{self, Mat4, Vec3};

/// Translation, Euler rotation (radians, applied X then Y then Z) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Composes translate → rotate X → rotate Y → rotate Z → scale → translate(offset).
    ///
    /// `offset` is the geometry's own re-centering translation and is applied
    /// in model space, before anything else touches the vertex.
    pub fn matrix(&self, offset: Vec3) -> Mat4 {
        let matrix = math::translate(math::identity(), self.translation);
        let matrix = math::x_rotate(matrix, self.rotation.x);
        let matrix = math::y_rotate(matrix, self.rotation.y);
        let matrix = math::z_rotate(matrix, self.rotation.z);
        let matrix = math::scale(matrix, self.scale);
        math::translate(matrix, offset)
    }
}
