// src/gfx/resources/mod.rs
//! Renderable resources
//!
//! Geometry, materials and geometry groups live in per-kind stores owned by
//! the [`Scene`](crate::gfx::scene::Scene). Nodes refer to them by id, so
//! one compiled resource can be shared by any number of nodes.

pub mod geometry;
pub mod group;
pub mod material;
pub mod presets;
pub mod store;
pub mod uniform;

pub use geometry::{AttributeData, Geometry, GeometryConfig, VertexAttribute};
pub use group::{Drawable, GeometryGroup};
pub use material::{Material, MaterialConfig};
pub use store::{GeometryKey, GroupKey, MaterialKey, ResourceId, ResourceStore};
pub use uniform::{ImageHandle, UniformSet, UniformValue};

pub type GeometryId = ResourceId<GeometryKey>;
pub type MaterialId = ResourceId<MaterialKey>;
pub type GroupId = ResourceId<GroupKey>;
