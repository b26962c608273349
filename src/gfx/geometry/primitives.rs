//! # Primitive Shape Generation
//!
//! Unit-cube faces for the environment cube. Each face is a standalone
//! quad so it can carry its own texture; the demo scales the cube
//! negative to turn the faces inward around the viewer.

use crate::gfx::wavefront::MeshData;

/// One face of the unit cube centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Front,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Right,
        CubeFace::Top,
        CubeFace::Bottom,
    ];

    /// Corner indices into [`CUBE_CORNERS`], counter-clockwise from the
    /// outside.
    fn corners(self) -> [usize; 4] {
        match self {
            CubeFace::Front => [1, 0, 3, 2],
            CubeFace::Right => [2, 3, 7, 6],
            CubeFace::Bottom => [3, 0, 4, 7],
            CubeFace::Top => [6, 5, 1, 2],
            CubeFace::Back => [4, 5, 6, 7],
            CubeFace::Left => [5, 4, 0, 1],
        }
    }
}

/// The eight corners of the unit cube, -0.5 to 0.5 on every axis.
const CUBE_CORNERS: [[f32; 4]; 8] = [
    [-0.5, -0.5, 0.5, 1.0],
    [-0.5, 0.5, 0.5, 1.0],
    [0.5, 0.5, 0.5, 1.0],
    [0.5, -0.5, 0.5, 1.0],
    [-0.5, -0.5, -0.5, 1.0],
    [-0.5, 0.5, -0.5, 1.0],
    [0.5, 0.5, -0.5, 1.0],
    [0.5, -0.5, -0.5, 1.0],
];

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

/// Generates one textured cube-face quad as two triangles.
///
/// Colors are white so the face's texture comes through unmodified, and
/// normals are zero because the environment is drawn unlit.
pub fn cube_face(face: CubeFace) -> MeshData {
    let corners = face.corners();
    let mut positions = Vec::with_capacity(6);
    let mut uvs = Vec::with_capacity(6);

    // Two triangles: (0,1,2) and (0,2,3) of the quad.
    for &i in &[0usize, 1, 2, 0, 2, 3] {
        positions.push(CUBE_CORNERS[corners[i]]);
        uvs.push(QUAD_UVS[i]);
    }

    let count = positions.len();
    MeshData::from_attributes(
        positions,
        vec![[0.0; 4]; count],
        Some(uvs),
        vec![[1.0, 1.0, 1.0, 1.0]; count],
        vec![[1.0, 1.0, 1.0, 1.0]; count],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_face_is_two_triangles() {
        for face in CubeFace::ALL {
            let mesh = cube_face(face);
            assert_eq!(mesh.triangle_count(), 2);
            assert_eq!(mesh.vertex_count(), 6);
            assert!(mesh.uvs().is_some());
        }
    }

    #[test]
    fn front_face_lies_on_positive_z() {
        let mesh = cube_face(CubeFace::Front);
        assert!(mesh.positions.iter().all(|p| p[2] == 0.5));
    }

    #[test]
    fn top_face_lies_on_positive_y() {
        let mesh = cube_face(CubeFace::Top);
        assert!(mesh.positions.iter().all(|p| p[1] == 0.5));
    }

    #[test]
    fn faces_cover_the_full_uv_square() {
        let mesh = cube_face(CubeFace::Left);
        let uvs = mesh.uvs().unwrap();
        assert!(uvs.contains(&[0.0, 0.0]));
        assert!(uvs.contains(&[1.0, 1.0]));
    }
}
