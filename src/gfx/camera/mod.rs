#[allow(clippy::module_inception)]
pub mod camera;

// Re-export main types
pub use camera::{projection_matrix, Camera, OPENGL_TO_WGPU_MATRIX};
