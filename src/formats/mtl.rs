//! Wavefront MTL material libraries
//!
//! Only the reflectance subset used by the phong preset is interpreted:
//! colors, shininess, opacity, optical density, the illumination model and
//! the names of the diffuse, specular and bump maps.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::gfx::resources::{UniformSet, UniformValue};

/// One lexed MTL line
#[derive(Debug, Clone, PartialEq)]
pub enum MtlLine {
    Empty,
    Comment(String),
    NewMaterial(String),
    Ambient([f32; 3]),
    Diffuse([f32; 3]),
    Specular([f32; 3]),
    Emissive([f32; 3]),
    Shininess(f32),
    OpticalDensity(f32),
    Dissolve(f32),
    Transparency(f32),
    /// `None` when the value is not a non-negative integer
    Illumination(Option<u32>),
    DiffuseMap(String),
    SpecularMap(String),
    BumpMap(String),
}

pub fn lex_mtl_line(line: &str) -> MtlLine {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword {
        "" => MtlLine::Empty,
        k if k.starts_with('#') => MtlLine::Comment(line[1..].trim().to_string()),
        "newmtl" => MtlLine::NewMaterial(rest.to_string()),
        "Ka" => MtlLine::Ambient(parse_color(rest)),
        "Kd" => MtlLine::Diffuse(parse_color(rest)),
        "Ks" => MtlLine::Specular(parse_color(rest)),
        "Ke" => MtlLine::Emissive(parse_color(rest)),
        "Ns" => MtlLine::Shininess(parse_float(rest)),
        "Ni" => MtlLine::OpticalDensity(parse_float(rest)),
        "d" => MtlLine::Dissolve(parse_float(rest)),
        "Tr" => MtlLine::Transparency(parse_float(rest)),
        "illum" => MtlLine::Illumination(rest.parse().ok()),
        "map_Kd" => MtlLine::DiffuseMap(rest.to_string()),
        "map_Ks" => MtlLine::SpecularMap(rest.to_string()),
        "map_Bump" | "map_bump" | "bump" => MtlLine::BumpMap(rest.to_string()),
        _ => MtlLine::Empty,
    }
}

fn parse_float(text: &str) -> f32 {
    text.split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .unwrap_or(f32::NAN)
}

/// Exactly three components; junk or missing ones are NaN.
fn parse_color(text: &str) -> [f32; 3] {
    let mut tokens = text.split_whitespace();
    std::array::from_fn(|_| {
        tokens
            .next()
            .and_then(|token| token.parse().ok())
            .unwrap_or(f32::NAN)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
    pub opacity: f32,
    pub optical_density: f32,
    pub illum: u32,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub bump_map: Option<String>,
    /// Directory of the library this record was loaded from
    pub source_dir: Option<PathBuf>,
}

impl MtlMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.0; 3],
            diffuse: [0.0; 3],
            specular: [0.0; 3],
            emissive: [0.0; 3],
            shininess: 0.0,
            opacity: 1.0,
            optical_density: 1.0,
            illum: 1,
            diffuse_map: None,
            specular_map: None,
            bump_map: None,
            source_dir: None,
        }
    }

    /// Uniform overrides understood by the phong preset
    pub fn to_uniforms(&self) -> UniformSet {
        UniformSet::new()
            .with("u_shininess", self.shininess)
            .with("u_ambient", UniformValue::Vec3(self.ambient))
            .with("u_diffuse", UniformValue::Vec3(self.diffuse))
            .with("u_specular", UniformValue::Vec3(self.specular))
            .with("u_emissive", UniformValue::Vec3(self.emissive))
            .with("u_opacity", self.opacity)
    }

    /// Resolves a map filename against the library directory.
    pub fn map_path(&self, map: &str) -> PathBuf {
        match &self.source_dir {
            Some(dir) => dir.join(map),
            None => PathBuf::from(map),
        }
    }

    fn apply(&mut self, line: MtlLine) {
        match line {
            MtlLine::Ambient(c) => self.ambient = c,
            MtlLine::Diffuse(c) => self.diffuse = c,
            MtlLine::Specular(c) => self.specular = c,
            MtlLine::Emissive(c) => self.emissive = c,
            MtlLine::Shininess(v) => self.shininess = v,
            MtlLine::OpticalDensity(v) => self.optical_density = v,
            MtlLine::Dissolve(v) => self.opacity = v,
            MtlLine::Transparency(v) => self.opacity = 1.0 - v,
            MtlLine::Illumination(Some(model)) => self.illum = model,
            MtlLine::Illumination(None) => {
                warn!("Material '{}': ignoring invalid illum value", self.name);
            }
            MtlLine::DiffuseMap(file) => self.diffuse_map = Some(file),
            MtlLine::SpecularMap(file) => self.specular_map = Some(file),
            MtlLine::BumpMap(file) => self.bump_map = Some(file),
            MtlLine::Empty | MtlLine::Comment(_) | MtlLine::NewMaterial(_) => {}
        }
    }
}

/// Materials of one or more MTL files, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, MtlMaterial>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MtlMaterial> {
        self.materials.get(name)
    }

    pub fn insert(&mut self, material: MtlMaterial) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Adds every record of `other`, replacing records of the same name.
    pub fn merge(&mut self, other: MaterialLibrary) {
        self.materials.extend(other.materials);
    }

    /// Sets the directory map paths resolve against on every record.
    pub fn set_source_dir(&mut self, dir: &Path) {
        for material in self.materials.values_mut() {
            material.source_dir = Some(dir.to_path_buf());
        }
    }

    /// Override set for `name`; unknown materials yield an empty set.
    pub fn uniforms_for(&self, name: &str) -> UniformSet {
        self.get(name)
            .map(MtlMaterial::to_uniforms)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MtlMaterial> {
        self.materials.values()
    }
}

pub fn parse_mtl(text: &str) -> MaterialLibrary {
    let mut library = MaterialLibrary::new();
    let mut current: Option<MtlMaterial> = None;

    for line in text.lines().map(lex_mtl_line) {
        match line {
            MtlLine::NewMaterial(name) => {
                if let Some(done) = current.replace(MtlMaterial::new(name)) {
                    library.insert(done);
                }
            }
            other => {
                // Properties before the first `newmtl` have no record to land in.
                if let Some(material) = current.as_mut() {
                    material.apply(other);
                }
            }
        }
    }
    if let Some(done) = current {
        library.insert(done);
    }

    debug!("Parsed material library with {} materials", library.len());
    library
}
