//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by every draw in the viewer.
//! Material colors are baked into the mesh at parse time, so they travel
//! with the vertex instead of a per-draw uniform.

/// A single vertex with position, normal, baked material colors, and
/// texture coordinates.
///
/// Positions carry `w = 1` and normals `w = 0`, so the shader multiplies
/// both by the model matrix without branching: points translate,
/// directions do not.
///
/// The `#[repr(C)]` attribute ensures a C-compatible memory layout,
/// which is required for GPU buffer uploads via bytemuck.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// Homogeneous position [x, y, z, 1]
    pub position: [f32; 4],
    /// Surface direction [nx, ny, nz, 0], zero when the mesh has none
    pub normal: [f32; 4],
    /// Diffuse material color stamped per face
    pub diffuse: [f32; 4],
    /// Specular material color stamped per face
    pub specular: [f32; 4],
    /// Texture coordinates with v already flipped for image-space sampling
    pub uv: [f32; 2],
}

impl Vertex3D {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// Attributes land at shader locations 0-4 in field order: position,
    /// normal, diffuse, specular, uv.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        const VEC4: u64 = mem::size_of::<[f32; 4]>() as u64;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: VEC4,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 2 * VEC4,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 3 * VEC4,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 4 * VEC4,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        // Four vec4 attributes plus one vec2.
        assert_eq!(std::mem::size_of::<Vertex3D>(), 18 * 4);
    }

    #[test]
    fn layout_covers_every_field() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.attributes.len(), 5);
        assert_eq!(
            layout.array_stride,
            std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress
        );
    }
}
