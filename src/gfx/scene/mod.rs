//! # Scene Management Module
//!
//! Scene graph of the renderer: shared resources stored per kind, nodes
//! placing a drawable in the world, and the camera.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns the resource stores, the node list and the camera
//! - [`SceneNode`] - One drawable with one material and its own transform
//! - [`Transform`] - Translation, Euler rotation and scale
//!
//! ## Usage
//!
//! ```no_run
//! use objscene::gfx::{
//!     device::RecordingDevice,
//!     resources::presets::{basic_material, BasicMaterialConfig},
//!     scene::Scene,
//! };
//! use objscene::formats::{load_model_blocking, FileSource};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut device = RecordingDevice::new();
//! let mut scene = Scene::default();
//! let material = scene.create_material(basic_material(&BasicMaterialConfig::default()), &mut device)?;
//!
//! let model = load_model_blocking(&FileSource, Path::new("chair.obj"))?;
//! scene.add_model(&model.obj, &model.materials, material, &mut device)?;
//! # Ok(())
//! # }
//! ```

pub mod object;
pub mod scene;
pub mod transform;

// Re-export main types
pub use object::SceneNode;
pub use scene::{Scene, SceneStatistics};
pub use transform::Transform;
