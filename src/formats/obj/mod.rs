//! Wavefront OBJ geometry
//!
//! Parsing is split in two stages: [`lexer`] turns text into typed line
//! records and [`assembler`] resolves indices, triangulates faces and groups
//! the output into [`GeometryBatch`]es.

pub mod assembler;
pub mod lexer;

use std::{fmt, path::PathBuf};

use cgmath::Vector3;
use thiserror::Error;

use crate::gfx::{
    math::Aabb,
    resources::{GeometryConfig, VertexAttribute},
};

pub use assembler::{parse_obj, resolve_index, ObjAssembler};
pub use lexer::{lex_line, FaceVertex, ObjLexer, ObjLine};

/// Vertex pool a face index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pool::Position => "position",
            Pool::TexCoord => "texture coordinate",
            Pool::Normal => "normal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: {pool} index {index} is out of range ({available} defined)")]
    IndexOutOfRange {
        line: usize,
        pool: Pool,
        index: i64,
        available: usize,
    },
}

/// De-indexed triangle data sharing one object, group set and material
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBatch {
    pub object: String,
    pub groups: Vec<String>,
    pub material: String,
    /// 3 floats per vertex
    pub positions: Vec<f32>,
    /// 2 floats per vertex
    pub texcoords: Vec<f32>,
    /// 3 floats per vertex
    pub normals: Vec<f32>,
}

impl GeometryBatch {
    pub fn new(object: String, groups: Vec<String>, material: String) -> Self {
        Self {
            object,
            groups,
            material,
            positions: Vec::new(),
            texcoords: Vec::new(),
            normals: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Attribute layout consumed by the bundled shaders.
    pub fn to_geometry_config(&self) -> GeometryConfig {
        GeometryConfig::new()
            .with_attribute("a_position", VertexAttribute::float32(3, self.positions.clone()))
            .with_attribute("a_texCoord", VertexAttribute::float32(2, self.texcoords.clone()))
            .with_attribute("a_normal", VertexAttribute::float32(3, self.normals.clone()))
    }
}

/// A parsed OBJ file
#[derive(Debug, Clone, PartialEq)]
pub struct ObjFile {
    /// File stem of the source path
    pub name: String,
    /// Translation that moves the bounds center to the origin
    pub offset: Vector3<f32>,
    pub bounds: Aabb,
    pub batches: Vec<GeometryBatch>,
    /// `mtllib` references, resolved against the OBJ directory
    pub material_libs: Vec<PathBuf>,
    /// Material names in first-use order, without duplicates
    pub materials: Vec<String>,
}

impl ObjFile {
    pub fn triangle_count(&self) -> usize {
        self.batches.iter().map(GeometryBatch::triangle_count).sum()
    }
}
