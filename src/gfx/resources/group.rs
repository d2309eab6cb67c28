//! Multi-geometry drawables
//!
//! A [`GeometryGroup`] renders several geometries as one logical object: the
//! owning node's transform and material apply to all children, and each child
//! brings its own uniform overrides (typically its MTL colors).

use cgmath::{Vector3, Zero};

use crate::{
    error::SceneError,
    gfx::resources::{uniform::UniformSet, GeometryId, GroupId},
};

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGroup {
    children: Vec<(GeometryId, UniformSet)>,
    offset: Vector3<f32>,
}

impl GeometryGroup {
    /// Pairs each geometry with the override set at the same position.
    ///
    /// Both lists must have the same length.
    pub fn new(geometries: Vec<GeometryId>, overrides: Vec<UniformSet>) -> Result<Self, SceneError> {
        if geometries.len() != overrides.len() {
            return Err(SceneError::InvalidArgument(format!(
                "group has {} geometries but {} uniform override sets",
                geometries.len(),
                overrides.len()
            )));
        }

        Ok(Self {
            children: geometries.into_iter().zip(overrides).collect(),
            offset: Vector3::zero(),
        })
    }

    /// Builder pattern: translation applied after the owning node's transform
    pub fn with_offset(mut self, offset: Vector3<f32>) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    pub fn children(&self) -> &[(GeometryId, UniformSet)] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Names overridden by at least one child
    pub fn overridden_names(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .children
            .iter()
            .flat_map(|(_, overrides)| overrides.names())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }
}

/// What a scene node draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawable {
    Geometry(GeometryId),
    Group(GroupId),
}
