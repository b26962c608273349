// src/lib.rs
//! Clachan
//!
//! A keyboard-driven 3D street-scene viewer built on wgpu and winit, with
//! its own OBJ/MTL loader and a hierarchical transform system.

pub mod app;
pub mod demo;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ClachanApp;

/// Creates a default application instance with an empty scene
pub fn default() -> ClachanApp {
    ClachanApp::new()
}
