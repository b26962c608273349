//! # Scene Management Module
//!
//! Object hierarchies, transforms, and vertex data for the viewer.
//!
//! ## Key Components
//!
//! - [`Scene`] - arena of objects plus cameras, light, and render toggles
//! - [`Object`] - one mesh with a decomposed local transform and a parent link
//! - [`Vertex3D`] - interleaved GPU vertex format
//!
//! World transforms are derived on demand by walking parent links; nothing
//! in the graph caches a world matrix.

pub mod object;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, Object};
pub use scene::{ObjectId, RenderFlags, Scene, SceneError};
pub use vertex::Vertex3D;
