// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Drives the per-frame traversal of a [`Scene`](crate::gfx::scene::Scene)
//! against a [`RenderDevice`](crate::gfx::device::RenderDevice).

pub mod frame_clock;
pub mod render_engine;

// Re-export main types
pub use frame_clock::FrameClock;
pub use render_engine::{FrameStats, RenderEngine};

/// Fixed-function state applied at the start of every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub depth_test: bool,
    pub cull_face: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [1.0, 1.0, 1.0, 1.0],
            depth_test: true,
            cull_face: true,
        }
    }
}
