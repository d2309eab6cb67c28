//! Model file formats and asset loading

pub mod loader;
pub mod mtl;
pub mod obj;

pub use loader::{
    load_model, load_model_blocking, AssetSource, FileSource, LoadError, LoadedModel, MemorySource,
};
pub use mtl::{parse_mtl, MaterialLibrary, MtlMaterial};
pub use obj::{parse_obj, GeometryBatch, ObjError, ObjFile};
