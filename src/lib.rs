// src/lib.rs
//! objscene
//!
//! Wavefront OBJ/MTL loading and a small scene-graph renderer core that
//! draws the loaded models through a pluggable GL-style device.

pub mod error;
pub mod formats;
pub mod gfx;

// Re-export main types for convenience
pub use error::SceneError;
pub use formats::{load_model, load_model_blocking, LoadError, LoadedModel, ObjError};
pub use gfx::{RenderConfig, RenderEngine, Scene};
