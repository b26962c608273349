//! # Graphics Module
//!
//! Everything between the parsed scene description and the screen:
//!
//! - **Wavefront parsing** ([`wavefront`]) - session-scoped OBJ/MTL loading
//! - **Scene Management** ([`scene`]) - object hierarchy and transforms
//! - **Camera System** ([`camera`]) - free and object-locked cameras
//! - **Rendering** ([`rendering`]) - single-pass wgpu render engine
//! - **Resource Management** ([`resources`]) - textures, uniforms, loaders
//! - **Geometry** ([`geometry`]) - procedural environment-cube faces

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod wavefront;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;
pub use scene::Scene;
