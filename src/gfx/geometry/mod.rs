//! # Procedural Geometry Generation
//!
//! Generates the handful of shapes the viewer does not load from disk.
//! Today that is the six textured faces of the environment cube; meshes
//! come out as the same [`MeshData`] the OBJ parser produces, so they go
//! through the identical upload path.
//!
//! [`MeshData`]: crate::gfx::wavefront::MeshData

pub mod primitives;

pub use primitives::{cube_face, CubeFace};
