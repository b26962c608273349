// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, buffers, bind group layouts, and asset loading.

pub mod global_bindings;
pub mod loader;
pub mod object_bindings;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{planar_shadow_matrix, GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use object_bindings::{CubeMapBindings, ObjectBindings, TextureBindings};
pub use texture_resource::TextureResource;
