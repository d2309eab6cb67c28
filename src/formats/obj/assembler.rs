//! Stateful assembly of lexed OBJ records into geometry batches
//!
//! The [`ObjAssembler`] keeps the vertex pools and the current
//! object/group/material state and turns every face into fan-triangulated,
//! de-indexed vertex streams. Output is split into one [`GeometryBatch`] per
//! run of faces sharing the same object, group set and material.

use std::path::{Path, PathBuf};

use cgmath::{Vector3, Zero};
use log::debug;

use crate::{
    formats::obj::{
        lexer::{FaceVertex, ObjLine},
        GeometryBatch, ObjError, ObjFile, Pool,
    },
    gfx::math::Aabb,
};

pub const DEFAULT_NAME: &str = "default";

/// Resolves a 1-based or negative OBJ index against a pool of `len` entries
/// (sentinel included).
///
/// Returns `None` for index 0 and for anything outside `1..len`.
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        len as i64 + index
    } else {
        index
    };

    (resolved >= 1 && resolved < len as i64).then_some(resolved as usize)
}

/// Parser state threaded through every record of one OBJ file
pub struct ObjAssembler {
    base_dir: PathBuf,
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    object: String,
    groups: Vec<String>,
    material: String,
    batches: Vec<GeometryBatch>,
    current: Option<usize>,
    material_libs: Vec<PathBuf>,
    materials: Vec<String>,
}

impl ObjAssembler {
    /// `base_dir` is the directory `mtllib` references are resolved against.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            // Index 0 is a zero-filled sentinel so file indices map directly.
            positions: vec![[0.0; 3]],
            texcoords: vec![[0.0; 2]],
            normals: vec![[0.0; 3]],
            object: DEFAULT_NAME.to_string(),
            groups: vec![DEFAULT_NAME.to_string()],
            material: DEFAULT_NAME.to_string(),
            batches: Vec::new(),
            current: None,
            material_libs: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Applies one record. `line` is only used for error reporting.
    pub fn process(&mut self, line: usize, record: ObjLine) -> Result<(), ObjError> {
        match record {
            ObjLine::Vertex(v) => self.positions.push(v),
            ObjLine::Normal(n) => self.normals.push(n),
            ObjLine::TexCoord(t) => self.texcoords.push(t),
            ObjLine::Face(vertices) => self.add_face(line, &vertices)?,
            ObjLine::Object(name) => {
                self.object = name;
                self.start_batch();
            }
            ObjLine::Groups(names) => {
                self.groups = if names.is_empty() {
                    vec![DEFAULT_NAME.to_string()]
                } else {
                    names
                };
                self.start_batch();
            }
            ObjLine::UseMaterial(name) => {
                if !self.materials.contains(&name) {
                    self.materials.push(name.clone());
                }
                self.material = name;
                self.start_batch();
            }
            ObjLine::MaterialLibrary(file) => {
                self.material_libs.push(self.base_dir.join(file));
            }
            ObjLine::Comment(_) | ObjLine::Empty => {}
        }

        Ok(())
    }

    /// Closes the current batch if it holds data; an empty one is re-keyed in place.
    fn start_batch(&mut self) {
        let Some(index) = self.current else {
            return;
        };

        let batch = &mut self.batches[index];
        if batch.is_empty() {
            batch.object = self.object.clone();
            batch.groups = self.groups.clone();
            batch.material = self.material.clone();
        } else {
            self.current = None;
        }
    }

    fn current_batch(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => {
                self.batches.push(GeometryBatch::new(
                    self.object.clone(),
                    self.groups.clone(),
                    self.material.clone(),
                ));
                let index = self.batches.len() - 1;
                self.current = Some(index);
                index
            }
        }
    }

    fn add_face(&mut self, line: usize, vertices: &[FaceVertex]) -> Result<(), ObjError> {
        if vertices.len() < 3 {
            return Ok(());
        }

        // Resolve every corner before touching the batch so a bad index leaves no partial face.
        let corners = vertices
            .iter()
            .map(|v| self.resolve(line, v))
            .collect::<Result<Vec<_>, _>>()?;

        let index = self.current_batch();
        for i in 0..corners.len() - 2 {
            for (p, t, n) in [corners[0], corners[i + 1], corners[i + 2]] {
                let batch = &mut self.batches[index];
                batch.positions.extend_from_slice(&self.positions[p]);
                batch.texcoords.extend_from_slice(&self.texcoords[t]);
                batch.normals.extend_from_slice(&self.normals[n]);
            }
        }

        Ok(())
    }

    fn resolve(&self, line: usize, vertex: &FaceVertex) -> Result<(usize, usize, usize), ObjError> {
        let lookup = |pool: Pool, index: Option<i64>, len: usize| -> Result<usize, ObjError> {
            match index {
                // Absent components read the zero sentinel.
                None => Ok(0),
                Some(index) => resolve_index(index, len).ok_or(ObjError::IndexOutOfRange {
                    line,
                    pool,
                    index,
                    available: len - 1,
                }),
            }
        };

        Ok((
            lookup(Pool::Position, Some(vertex.position), self.positions.len())?,
            lookup(Pool::TexCoord, vertex.texcoord, self.texcoords.len())?,
            lookup(Pool::Normal, vertex.normal, self.normals.len())?,
        ))
    }

    /// Consumes the state and computes bounds and the centering offset.
    pub fn finish(self, name: impl Into<String>) -> ObjFile {
        let batches: Vec<GeometryBatch> = self
            .batches
            .into_iter()
            .filter(|batch| !batch.is_empty())
            .collect();

        let emitted = batches
            .iter()
            .filter_map(|batch| Aabb::from_flat_positions(&batch.positions))
            .reduce(|a, b| a.union(&b));

        let (bounds, offset) = match emitted {
            Some(bounds) => (bounds, -bounds.center()),
            None => {
                let first = self
                    .positions
                    .get(1)
                    .map_or(Vector3::zero(), |p| Vector3::new(p[0], p[1], p[2]));
                (Aabb::point(first), Vector3::zero())
            }
        };

        let file = ObjFile {
            name: name.into(),
            offset,
            bounds,
            batches,
            material_libs: self.material_libs,
            materials: self.materials,
        };

        debug!(
            "Assembled OBJ '{}': {} batches, {} triangles, {} material libraries",
            file.name,
            file.batches.len(),
            file.triangle_count(),
            file.material_libs.len()
        );
        file
    }
}

/// Runs the lexer over `text` and assembles the result.
///
/// `source` names the file the text came from: its stem becomes the model
/// name and its directory resolves `mtllib` references.
pub fn parse_obj(text: &str, source: &Path) -> Result<ObjFile, ObjError> {
    let base_dir = source.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut assembler = ObjAssembler::new(base_dir);
    for (line, record) in super::lexer::ObjLexer::new(text) {
        assembler.process(line, record)?;
    }

    Ok(assembler.finish(name))
}
