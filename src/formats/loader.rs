//! Asynchronous model loading
//!
//! Text is fetched through an [`AssetSource`], so the same loading code runs
//! against the file system, an in-memory bundle or a network fetcher. Material
//! libraries referenced by one model are fetched concurrently and merged in
//! reference order.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use futures::future::{join_all, BoxFuture, FutureExt};
use log::{debug, warn};
use thiserror::Error;

use crate::formats::{
    mtl::{parse_mtl, MaterialLibrary},
    obj::{parse_obj, ObjError, ObjFile},
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ObjError,
    },
}

/// Where model and material text comes from.
pub trait AssetSource: Send + Sync {
    fn load_text<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, LoadError>>;
}

/// Reads assets from the local file system
///
/// The read is synchronous and completes on the first poll, so the returned
/// future blocks whichever thread polls it. That suits [`load_model_blocking`];
/// callers on a shared async executor should hand it a blocking task or use
/// their own [`AssetSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl AssetSource for FileSource {
    fn load_text<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, LoadError>> {
        async move {
            std::fs::read_to_string(path).map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => LoadError::ResourceNotFound(path.to_path_buf()),
                _ => LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            })
        }
        .boxed()
    }
}

/// Serves assets from a path → text map
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: register a file
    pub fn with(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }
}

impl AssetSource for MemorySource {
    fn load_text<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, LoadError>> {
        let result = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::ResourceNotFound(path.to_path_buf()));
        futures::future::ready(result).boxed()
    }
}

pub async fn load_obj(source: &dyn AssetSource, path: &Path) -> Result<ObjFile, LoadError> {
    let text = source.load_text(path).await?;
    parse_obj(&text, path).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads one MTL file; its records resolve map paths against its directory.
pub async fn load_material_library(
    source: &dyn AssetSource,
    path: &Path,
) -> Result<MaterialLibrary, LoadError> {
    let text = source.load_text(path).await?;
    let mut library = parse_mtl(&text);
    if let Some(dir) = path.parent() {
        library.set_source_dir(dir);
    }
    Ok(library)
}

/// Fetches every library concurrently and merges them in the given order.
///
/// A library that fails to load is reported and skipped.
pub async fn load_material_libraries(
    source: &dyn AssetSource,
    paths: &[PathBuf],
) -> (MaterialLibrary, Vec<LoadError>) {
    let results = join_all(
        paths
            .iter()
            .map(|path| load_material_library(source, path)),
    )
    .await;

    let mut merged = MaterialLibrary::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(library) => merged.merge(library),
            Err(error) => {
                warn!("Skipping material library: {}", error);
                errors.push(error);
            }
        }
    }

    (merged, errors)
}

/// An OBJ file together with the materials it references
#[derive(Debug)]
pub struct LoadedModel {
    pub obj: ObjFile,
    pub materials: MaterialLibrary,
    /// Libraries that could not be loaded; the geometry is still usable
    pub material_errors: Vec<LoadError>,
}

pub async fn load_model(source: &dyn AssetSource, path: &Path) -> Result<LoadedModel, LoadError> {
    let obj = load_obj(source, path).await?;
    let (materials, material_errors) = load_material_libraries(source, &obj.material_libs).await;

    debug!(
        "Loaded model '{}' with {} materials ({} libraries failed)",
        obj.name,
        materials.len(),
        material_errors.len()
    );

    Ok(LoadedModel {
        obj,
        materials,
        material_errors,
    })
}

/// Blocking wrapper around [`load_model`] for synchronous callers.
pub fn load_model_blocking(source: &dyn AssetSource, path: &Path) -> Result<LoadedModel, LoadError> {
    pollster::block_on(load_model(source, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "mtllib a.mtl\nmtllib b.mtl\nv 0 0 0\nv 1 0 0\nv 1 1 0\nusemtl shared\nf 1 2 3\n";

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_libraries_merge_in_reference_order() {
        init();
        let source = MemorySource::new()
            .with("models/tri.obj", TRIANGLE)
            .with("models/a.mtl", "newmtl shared\nKd 1 0 0\nnewmtl only_a\n")
            .with("models/b.mtl", "newmtl shared\nKd 0 1 0\n");

        let model = load_model_blocking(&source, Path::new("models/tri.obj")).unwrap();
        assert!(model.material_errors.is_empty());
        assert_eq!(model.materials.len(), 2);
        assert_eq!(model.materials.get("shared").unwrap().diffuse, [0.0, 1.0, 0.0]);
        assert_eq!(
            model.materials.get("only_a").unwrap().source_dir,
            Some(PathBuf::from("models"))
        );
    }

    #[test]
    fn test_missing_library_keeps_geometry() {
        init();
        let source = MemorySource::new()
            .with("models/tri.obj", TRIANGLE)
            .with("models/b.mtl", "newmtl shared\n");

        let model = load_model_blocking(&source, Path::new("models/tri.obj")).unwrap();
        assert_eq!(model.obj.triangle_count(), 1);
        assert_eq!(model.materials.len(), 1);
        assert!(matches!(
            model.material_errors.as_slice(),
            [LoadError::ResourceNotFound(path)] if path == Path::new("models/a.mtl")
        ));
    }

    #[test]
    fn test_missing_obj_is_not_found() {
        let result = load_model_blocking(&MemorySource::new(), Path::new("nope.obj"));
        assert!(matches!(result, Err(LoadError::ResourceNotFound(_))));
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let source = MemorySource::new().with("bad.obj", "f 1 2 3");
        let err = load_model_blocking(&source, Path::new("bad.obj")).unwrap_err();
        match err {
            LoadError::Parse { path, source } => {
                assert_eq!(path, PathBuf::from("bad.obj"));
                assert!(matches!(source, ObjError::IndexOutOfRange { line: 1, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_file_source_reads_on_first_poll() {
        let path = std::env::temp_dir().join(format!("objscene-{}.obj", std::process::id()));
        std::fs::write(&path, "v 0 0 0\n").unwrap();

        let text = FileSource
            .load_text(&path)
            .now_or_never()
            .expect("file reads complete without yielding");
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text.unwrap(), "v 0 0 0\n");
    }

    #[test]
    fn test_file_source_reports_missing_files() {
        let result = pollster::block_on(
            FileSource.load_text(Path::new("/definitely/not/here/model.obj")),
        );
        assert!(matches!(result, Err(LoadError::ResourceNotFound(_))));
    }
}
