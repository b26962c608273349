//! OBJ geometry parsing
//!
//! [`WavefrontSession`] consumes OBJ text (plus an optional MTL library
//! parsed beforehand) and produces [`MeshData`]: flat per-vertex attribute
//! buffers with every polygon already fan-triangulated. Face references
//! are resolved against the vertex pools the moment they are read, so the
//! output carries no indices at all.

use super::mtl::MaterialLibrary;
use super::WavefrontError;

/// How the vertex references of a face are laid out.
///
/// Detected per face from the slash count of its first reference. A
/// single-slash reference is `v/vt`; two slashes are `v/vt/vn` unless the
/// slashes are adjacent (`v//vn`), which marks a face with normals but no
/// texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaceFormat {
    Position,
    PositionUv,
    PositionNormal,
    PositionUvNormal,
}

impl FaceFormat {
    fn detect(reference: &str) -> Self {
        match reference.matches('/').count() {
            0 => FaceFormat::Position,
            1 => FaceFormat::PositionUv,
            _ if reference.contains("//") => FaceFormat::PositionNormal,
            _ => FaceFormat::PositionUvNormal,
        }
    }

    fn has_uvs(self) -> bool {
        matches!(self, FaceFormat::PositionUv | FaceFormat::PositionUvNormal)
    }
}

/// Flat, triangulated vertex attributes ready for interleaving.
///
/// All vectors are the same length. Normals are zero vectors for faces
/// that declared none; UV entries are placeholders unless [`MeshData::uvs`]
/// returns `Some`.
#[derive(Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 4]>,
    pub diffuse: Vec<[f32; 4]>,
    pub specular: Vec<[f32; 4]>,
    uvs: Vec<[f32; 2]>,
    has_uvs: bool,
}

impl MeshData {
    /// Assembles mesh data directly, for procedurally built geometry.
    ///
    /// All attribute vectors must be the same length.
    pub fn from_attributes(
        positions: Vec<[f32; 4]>,
        normals: Vec<[f32; 4]>,
        uvs: Option<Vec<[f32; 2]>>,
        diffuse: Vec<[f32; 4]>,
        specular: Vec<[f32; 4]>,
    ) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        debug_assert_eq!(positions.len(), diffuse.len());
        debug_assert_eq!(positions.len(), specular.len());
        let has_uvs = uvs.is_some();
        let uvs = uvs.unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
        debug_assert_eq!(positions.len(), uvs.len());
        Self {
            positions,
            normals,
            diffuse,
            specular,
            uvs,
            has_uvs,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Texture coordinates, present only if the source declared any.
    pub fn uvs(&self) -> Option<&[[f32; 2]]> {
        if self.has_uvs {
            Some(&self.uvs)
        } else {
            None
        }
    }
}

/// One mesh's worth of parse state.
///
/// The vertex pools, the material library, and the active material name
/// all live here, so parsing two files through two sessions can never
/// bleed indices or colors between meshes. Feed [`parse_mtl`] first if
/// the mesh has a material file, then [`parse_obj`], then take the result
/// with [`into_mesh`].
///
/// [`parse_mtl`]: WavefrontSession::parse_mtl
/// [`parse_obj`]: WavefrontSession::parse_obj
/// [`into_mesh`]: WavefrontSession::into_mesh
#[derive(Debug, Default)]
pub struct WavefrontSession {
    positions: Vec<[f32; 4]>,
    normals: Vec<[f32; 4]>,
    uvs: Vec<[f32; 2]>,
    materials: MaterialLibrary,
    current_material: Option<String>,
    mesh: MeshData,
}

impl WavefrontSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses MTL text into the session's material library.
    ///
    /// The last `newmtl` seen becomes the active material, so an OBJ file
    /// that never issues `usemtl` still picks up the colors of a
    /// single-material library.
    pub fn parse_mtl(&mut self, source: &str) {
        self.current_material = self
            .materials
            .parse(source, self.current_material.take());
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Parses OBJ text, appending triangulated geometry to the session's
    /// mesh. Fails only when a face references an index outside the pools
    /// accumulated so far, or a reference that is not a positive integer.
    pub fn parse_obj(&mut self, source: &str) -> Result<(), WavefrontError> {
        for (line_no, line) in source.lines().enumerate() {
            let line_no = line_no + 1;
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("v") => {
                    if let Some([x, y, z]) = parse_vec3(fields) {
                        self.positions.push([x, y, z, 1.0]);
                    }
                }
                Some("vn") => {
                    // Directions get w = 0 so model transforms never
                    // translate them.
                    if let Some([x, y, z]) = parse_vec3(fields) {
                        self.normals.push([x, y, z, 0.0]);
                    }
                }
                Some("vt") => {
                    let values: Vec<f32> =
                        fields.filter_map(|f| f.parse().ok()).collect();
                    if values.len() >= 2 {
                        // Flip v: image rows grow downward, vt grows upward.
                        self.uvs.push([values[0], 1.0 - values[1]]);
                    }
                }
                Some("usemtl") => {
                    if let Some(name) = fields.next() {
                        self.current_material = Some(name.to_string());
                    }
                }
                Some("f") => self.parse_face(fields, line_no)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Resolves one face and fans it into triangles (0,i,i+1).
    fn parse_face<'a>(
        &mut self,
        references: impl Iterator<Item = &'a str>,
        line_no: usize,
    ) -> Result<(), WavefrontError> {
        let mut format = None;
        let mut corners: Vec<Corner> = Vec::new();

        for reference in references {
            let format = *format.get_or_insert_with(|| FaceFormat::detect(reference));
            corners.push(self.resolve(reference, format, line_no)?);
        }

        if corners.len() < 3 {
            return Ok(());
        }
        let format = format.unwrap_or(FaceFormat::Position);

        for i in 1..corners.len() - 1 {
            for corner in [&corners[0], &corners[i], &corners[i + 1]] {
                self.mesh.positions.push(corner.position);
                self.mesh.normals.push(corner.normal);
                self.mesh.uvs.push(corner.uv);
                self.mesh
                    .diffuse
                    .push(self.materials.diffuse(self.current_material.as_deref()));
                self.mesh
                    .specular
                    .push(self.materials.specular(self.current_material.as_deref()));
            }
        }
        self.mesh.has_uvs |= format.has_uvs();
        Ok(())
    }

    fn resolve(
        &self,
        reference: &str,
        format: FaceFormat,
        line_no: usize,
    ) -> Result<Corner, WavefrontError> {
        let mut parts = reference.split('/');
        let position_index = parts.next();
        let (uv_index, normal_index) = match format {
            FaceFormat::Position => (None, None),
            FaceFormat::PositionUv => (parts.next(), None),
            FaceFormat::PositionNormal => {
                parts.next();
                (None, parts.next())
            }
            FaceFormat::PositionUvNormal => (parts.next(), parts.next()),
        };

        let position = self.fetch(
            &self.positions,
            "position",
            position_index,
            reference,
            line_no,
        )?;
        let normal = match normal_index {
            Some(idx) => self.fetch(&self.normals, "normal", Some(idx), reference, line_no)?,
            None => [0.0; 4],
        };
        let uv = match uv_index {
            Some(idx) => self.fetch(&self.uvs, "uv", Some(idx), reference, line_no)?,
            None => [0.0; 2],
        };

        Ok(Corner {
            position,
            normal,
            uv,
        })
    }

    /// One-based pool lookup with the errors callers can act on.
    fn fetch<T: Copy>(
        &self,
        pool: &[T],
        pool_name: &'static str,
        index: Option<&str>,
        reference: &str,
        line_no: usize,
    ) -> Result<T, WavefrontError> {
        let index: usize = index
            .and_then(|i| i.parse().ok())
            .filter(|&i| i > 0)
            .ok_or_else(|| WavefrontError::MalformedFace {
                line: line_no,
                reference: reference.to_string(),
            })?;
        pool.get(index - 1)
            .copied()
            .ok_or(WavefrontError::IndexOutOfRange {
                line: line_no,
                pool: pool_name,
                index,
                len: pool.len(),
            })
    }

    /// Finishes the session, yielding the triangulated mesh.
    pub fn into_mesh(self) -> MeshData {
        self.mesh
    }
}

struct Corner {
    position: [f32; 4],
    normal: [f32; 4],
    uv: [f32; 2],
}

fn parse_vec3<'a>(fields: impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    let values: Vec<f32> = fields.filter_map(|f| f.parse().ok()).collect();
    if values.len() >= 3 {
        Some([values[0], values[1], values[2]])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::mtl::FALLBACK_CHANNEL;
    use super::*;

    const RED_MTL: &str = "newmtl body\nKd 1 0 0\n";

    const QUAD_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
usemtl body
f 1 2 3 4
";

    #[test]
    fn quad_fans_into_two_triangles() {
        let mut session = WavefrontSession::new();
        session.parse_mtl(RED_MTL);
        session.parse_obj(QUAD_OBJ).unwrap();
        let mesh = session.into_mesh();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        // Fan order: (1,2,3) then (1,3,4).
        assert_eq!(mesh.positions[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.positions[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.positions[5], [0.0, 1.0, 0.0, 1.0]);
        // Every vertex stamped with the face's material, specular gray.
        assert!(mesh.diffuse.iter().all(|&c| c == [1.0, 0.0, 0.0, 1.0]));
        assert!(mesh.specular.iter().all(|&c| c == FALLBACK_CHANNEL));
        assert!(mesh.uvs().is_none());
    }

    #[test]
    fn pentagon_fans_into_three_triangles() {
        let mut session = WavefrontSession::new();
        session
            .parse_obj("v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n")
            .unwrap();
        let mesh = session.into_mesh();
        assert_eq!(mesh.triangle_count(), 3);
        // Triangle fan shares the first corner.
        assert_eq!(mesh.positions[0], mesh.positions[3]);
        assert_eq!(mesh.positions[3], mesh.positions[6]);
    }

    #[test]
    fn texture_coordinates_are_v_flipped() {
        let mut session = WavefrontSession::new();
        session
            .parse_obj(
                "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0.25\nvt 0 1\nf 1/1 2/2 3/3\n",
            )
            .unwrap();
        let mesh = session.into_mesh();
        let uvs = mesh.uvs().unwrap();
        assert_eq!(uvs[0], [0.0, 1.0]);
        assert_eq!(uvs[1], [1.0, 0.75]);
        assert_eq!(uvs[2], [0.0, 0.0]);
    }

    #[test]
    fn double_slash_means_normals_without_uvs() {
        let mut session = WavefrontSession::new();
        session
            .parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n")
            .unwrap();
        let mesh = session.into_mesh();
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0, 0.0]);
        assert!(mesh.uvs().is_none());
    }

    #[test]
    fn full_triplet_resolves_all_three_pools() {
        let mut session = WavefrontSession::new();
        session
            .parse_obj(
                "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 1 0\nf 1/1/1 2/1/1 3/1/1\n",
            )
            .unwrap();
        let mesh = session.into_mesh();
        assert_eq!(mesh.normals[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(mesh.uvs().unwrap()[0], [0.0, 1.0]);
    }

    #[test]
    fn missing_normals_resolve_to_zero_direction() {
        let mut session = WavefrontSession::new();
        session
            .parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        let mesh = session.into_mesh();
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert!(mesh.normals.iter().all(|&n| n == [0.0; 4]));
    }

    #[test]
    fn out_of_range_index_is_fatal() {
        let mut session = WavefrontSession::new();
        let err = session
            .parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 9\n")
            .unwrap_err();
        match err {
            WavefrontError::IndexOutOfRange {
                line, index, len, ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(index, 9);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_reference_is_fatal() {
        let mut session = WavefrontSession::new();
        let err = session.parse_obj("v 0 0 0\nf 1 abc 1\n").unwrap_err();
        assert!(matches!(err, WavefrontError::MalformedFace { line: 2, .. }));
    }

    #[test]
    fn usemtl_switches_colors_mid_file() {
        let mut session = WavefrontSession::new();
        session.parse_mtl("newmtl a\nKd 1 0 0\nnewmtl b\nKd 0 0 1\n");
        session
            .parse_obj(
                "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl a\nf 1 2 3\nusemtl b\nf 1 2 3\n",
            )
            .unwrap();
        let mesh = session.into_mesh();
        assert_eq!(mesh.diffuse[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.diffuse[3], [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn last_mtl_material_applies_without_usemtl() {
        // Single-material libraries color the whole mesh even when the
        // OBJ file never issues usemtl.
        let mut session = WavefrontSession::new();
        session.parse_mtl("newmtl only\nKd 0 1 0\n");
        session
            .parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        let mesh = session.into_mesh();
        assert!(mesh.diffuse.iter().all(|&c| c == [0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn unknown_records_are_ignored() {
        let mut session = WavefrontSession::new();
        session
            .parse_obj("# header\no car\ns off\ng wheels\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        assert_eq!(session.into_mesh().triangle_count(), 1);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut first = WavefrontSession::new();
        first.parse_mtl(RED_MTL);
        first.parse_obj(QUAD_OBJ).unwrap();

        // A fresh session sees none of the first one's pools or materials.
        let mut second = WavefrontSession::new();
        let err = second.parse_obj("f 1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            WavefrontError::IndexOutOfRange { len: 0, .. }
        ));
    }
}
