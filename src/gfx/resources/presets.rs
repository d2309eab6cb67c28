//! Ready-made material configurations
//!
//! Each preset pairs a bundled GLSL program with the uniforms it declares.
//! All presets declare the transform uniforms the renderer pushes every frame.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Zero};

use crate::{
    formats::mtl::MtlMaterial,
    gfx::resources::{
        material::MaterialConfig,
        uniform::{ImageHandle, UniformSet, UniformValue},
    },
};

pub const BASIC_VERTEX_SHADER: &str = include_str!("shaders/basic.vert");
pub const BASIC_FRAGMENT_SHADER: &str = include_str!("shaders/basic.frag");
pub const TEXTURE_VERTEX_SHADER: &str = include_str!("shaders/texture.vert");
pub const TEXTURE_FRAGMENT_SHADER: &str = include_str!("shaders/texture.frag");
pub const PHONG_VERTEX_SHADER: &str = include_str!("shaders/phong.vert");
pub const PHONG_FRAGMENT_SHADER: &str = include_str!("shaders/phong.frag");

/// Color and lighting parameters of the basic material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMaterialConfig {
    pub albedo: [f32; 4],
    pub ambient_light_color: [f32; 4],
    pub ambient_light_intensity: f32,
    pub light_direction: Vector3<f32>,
    pub directional_light_color: [f32; 4],
}

impl Default for BasicMaterialConfig {
    fn default() -> Self {
        Self {
            albedo: [1.0, 1.0, 1.0, 1.0],
            ambient_light_color: [0.3, 0.3, 0.3, 1.0],
            ambient_light_intensity: 0.5,
            light_direction: Vector3::new(0.5, 0.7, 1.0),
            directional_light_color: [0.3, 0.3, 0.3, 1.0],
        }
    }
}

impl BasicMaterialConfig {
    /// Builder pattern: set the albedo color
    pub fn with_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.albedo = [r, g, b, a];
        self
    }
}

fn transform_uniforms() -> UniformSet {
    let identity = Matrix4::<f32>::identity();
    UniformSet::new()
        .with("u_model_matrix", identity)
        .with("u_view_matrix", identity)
        .with("u_proj_matrix", identity)
}

/// Flat-lit material with a single albedo color
pub fn basic_material(config: &BasicMaterialConfig) -> MaterialConfig {
    let uniforms = transform_uniforms()
        .with("u_world_inversed_transposed", Matrix4::<f32>::identity())
        .with("u_albedo", UniformValue::Vec4(config.albedo))
        .with("u_ambient_light_color", UniformValue::Vec4(config.ambient_light_color))
        .with("u_ambient_light_intensity", config.ambient_light_intensity)
        .with(
            "u_reverse_directional_light_direction",
            config.light_direction.normalize(),
        )
        .with(
            "u_directional_light_color",
            UniformValue::Vec4(config.directional_light_color),
        );

    MaterialConfig {
        vertex: BASIC_VERTEX_SHADER.to_string(),
        fragment: BASIC_FRAGMENT_SHADER.to_string(),
        uniforms,
    }
}

/// Unlit material sampling one texture
pub fn texture_material(image: ImageHandle) -> MaterialConfig {
    MaterialConfig {
        vertex: TEXTURE_VERTEX_SHADER.to_string(),
        fragment: TEXTURE_FRAGMENT_SHADER.to_string(),
        uniforms: transform_uniforms().with("u_texture", image),
    }
}

/// Blinn-Phong material driven by MTL reflectance values.
///
/// The uniform names match [`MtlMaterial::to_uniforms`], so one compiled
/// phong material can render every batch of a multi-material model with
/// per-batch overrides.
pub fn phong_material(material: &MtlMaterial) -> MaterialConfig {
    let mut uniforms = transform_uniforms()
        .with("u_world_inversed_transposed", Matrix4::<f32>::identity())
        .with("u_surfaceToView", Vector3::<f32>::zero());
    uniforms.extend_from(&material.to_uniforms());

    MaterialConfig {
        vertex: PHONG_VERTEX_SHADER.to_string(),
        fragment: PHONG_FRAGMENT_SHADER.to_string(),
        uniforms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_material_declares_lighting() {
        let config = basic_material(&BasicMaterialConfig::default().with_color(1.0, 0.0, 0.0, 1.0));
        assert_eq!(
            config.uniforms.get("u_albedo"),
            Some(&UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]))
        );
        assert!(config.uniforms.contains("u_world_inversed_transposed"));
        assert!(config.vertex.contains("u_model_matrix"));
    }

    #[test]
    fn test_texture_material_carries_image_handle() {
        let config = texture_material(ImageHandle(42));
        assert_eq!(
            config.uniforms.get("u_texture"),
            Some(&UniformValue::Sampler2D(ImageHandle(42)))
        );
    }

    #[test]
    fn test_phong_material_uses_mtl_values() {
        let mut mtl = MtlMaterial::new("red");
        mtl.diffuse = [1.0, 0.0, 0.0];
        mtl.opacity = 0.5;

        let config = phong_material(&mtl);
        assert_eq!(
            config.uniforms.get("u_diffuse"),
            Some(&UniformValue::Vec3([1.0, 0.0, 0.0]))
        );
        assert_eq!(config.uniforms.get("u_opacity"), Some(&UniformValue::Float(0.5)));
        assert!(config.uniforms.contains("u_surfaceToView"));
    }
}
