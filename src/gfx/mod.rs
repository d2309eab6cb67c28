//! # Graphics Module
//!
//! Scene graph and renderer core, written against the [`RenderDevice`]
//! trait so any GL-style backend (or the headless [`RecordingDevice`]) can
//! drive it.
//!
//! ## Architecture Overview
//!
//! - **Camera** ([`camera`]) - Perspective camera placed by a transform
//! - **Rendering** ([`rendering`]) - Per-frame traversal with bind change detection
//! - **Scene Management** ([`scene`]) - Nodes, transforms and resource stores
//! - **Resources** ([`resources`]) - Geometry, materials, groups and uniforms
//!
//! [`RenderDevice`]: device::RenderDevice
//! [`RecordingDevice`]: device::RecordingDevice

pub mod camera;
pub mod device;
pub mod math;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::Camera;
pub use device::{RecordingDevice, RenderDevice};
pub use rendering::{RenderConfig, RenderEngine};
pub use scene::{Scene, SceneNode};
