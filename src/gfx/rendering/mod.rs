// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Owns the wgpu surface, the single render pipeline, and frame encoding.

pub mod render_engine;

// Re-export main types
pub use render_engine::RenderEngine;
