//! # Wavefront OBJ/MTL Loading
//!
//! Hand-rolled parsers for the two text formats the viewer consumes:
//!
//! - [`mtl::MaterialLibrary`] - material name to diffuse/specular color
//!   mappings parsed from MTL text
//! - [`obj::WavefrontSession`] - a single-mesh parse session that turns OBJ
//!   text into flat, fan-triangulated vertex attribute buffers
//!
//! All parse state is scoped to one session. A caller loads a mesh by
//! creating a fresh session, feeding it the MTL text (if any) and then the
//! OBJ text, and finishing with [`obj::WavefrontSession::into_mesh`]. Two
//! sessions never share pools, so loading unrelated meshes cannot mix
//! vertex data.
//!
//! Parsing is permissive: unrecognized record types and records with
//! missing numeric fields are skipped without comment. The one fatal
//! condition is a face reference that points outside the accumulated
//! vertex pools, which surfaces as [`WavefrontError`] so callers can tell
//! a broken file apart from a missing one.

pub mod mtl;
pub mod obj;

pub use mtl::MaterialLibrary;
pub use obj::{MeshData, WavefrontSession};

use thiserror::Error;

/// Errors raised while parsing OBJ geometry.
///
/// I/O problems are deliberately not part of this type; fetching the file
/// is the caller's concern and fails through `anyhow` at the load boundary.
#[derive(Debug, Error)]
pub enum WavefrontError {
    /// A face referenced a vertex/normal/UV that was never declared.
    #[error("face on line {line}: {pool} index {index} out of range (pool holds {len})")]
    IndexOutOfRange {
        line: usize,
        pool: &'static str,
        index: usize,
        len: usize,
    },

    /// A face vertex reference could not be read as an index triplet.
    #[error("face on line {line}: malformed vertex reference `{reference}`")]
    MalformedFace { line: usize, reference: String },
}
