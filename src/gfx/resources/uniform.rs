//! Shader uniform values and named uniform sets

use std::collections::BTreeMap;

use cgmath::{Matrix4, Vector2, Vector3, Vector4};

use crate::gfx::math;

/// Opaque reference to an already decoded image owned by the device layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

/// A typed uniform value. Matrices are stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    Sampler2D(ImageHandle),
}

impl UniformValue {
    /// GLSL type name, used in log messages
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Sampler2D(_) => "sampler2D",
        }
    }

    /// Raw float components, or `None` for samplers
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            UniformValue::Float(v) => Some(std::slice::from_ref(v)),
            UniformValue::Vec2(v) => Some(&v[..]),
            UniformValue::Vec3(v) => Some(&v[..]),
            UniformValue::Vec4(v) => Some(&v[..]),
            UniformValue::Mat2(v) => Some(&v[..]),
            UniformValue::Mat3(v) => Some(&v[..]),
            UniformValue::Mat4(v) => Some(&v[..]),
            UniformValue::Sampler2D(_) => None,
        }
    }

    /// Byte view for devices that upload uniforms into buffers
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.as_floats().map(bytemuck::cast_slice)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vector2<f32>> for UniformValue {
    fn from(value: Vector2<f32>) -> Self {
        UniformValue::Vec2(value.into())
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(value: Vector3<f32>) -> Self {
        UniformValue::Vec3(value.into())
    }
}

impl From<Vector4<f32>> for UniformValue {
    fn from(value: Vector4<f32>) -> Self {
        UniformValue::Vec4(value.into())
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(value: Matrix4<f32>) -> Self {
        UniformValue::Mat4(math::to_array(&value))
    }
}

impl From<ImageHandle> for UniformValue {
    fn from(value: ImageHandle) -> Self {
        UniformValue::Sampler2D(value)
    }
}

/// Named uniform values, iterated in name order so uploads are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    values: BTreeMap<String, UniformValue>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add or replace one value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies every value of `other` into `self`, replacing same-named entries.
    pub fn extend_from(&mut self, other: &UniformSet) {
        for (name, value) in other.iter() {
            self.values.insert(name.to_string(), value.clone());
        }
    }

    /// New set with `overrides` applied on top of `self`.
    pub fn merged_with(&self, overrides: &UniformSet) -> UniformSet {
        let mut merged = self.clone();
        merged.extend_from(overrides);
        merged
    }
}

impl<K: Into<String>> FromIterator<(K, UniformValue)> for UniformSet {
    fn from_iter<I: IntoIterator<Item = (K, UniformValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
