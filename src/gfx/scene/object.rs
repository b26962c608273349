//! # Scene Objects
//!
//! An [`Object`] owns a triangulated [`Mesh`], a decomposed local transform
//! (separate scale, rotation, and translation matrices), and its GPU
//! residency once uploaded. World placement is the scene graph's business;
//! an object only ever knows its local matrix and who its parent is.

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use super::scene::ObjectId;
use super::vertex::Vertex3D;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::wavefront::MeshData;
use crate::wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer};

/// Per-draw uniform content: the world matrix plus draw flags.
///
/// `flags[0]` is 1.0 when the draw samples a diffuse texture, `flags[1]`
/// is 1.0 when the draw is the flattened shadow of the mesh rather than
/// the mesh itself. Both live in the same struct so an object can keep
/// two pre-built uniform buffers and switch between them mid-pass with a
/// bind group swap, which is the only way to vary uniforms inside one
/// render pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub flags: [f32; 4],
}

/// Uniform buffers and bind groups created when the object is uploaded.
pub struct ObjectGpuResources {
    main_ubo: UniformBuffer<ObjectUniform>,
    shadow_ubo: UniformBuffer<ObjectUniform>,
    pub main_bind_group: wgpu::BindGroup,
    pub shadow_bind_group: wgpu::BindGroup,
    pub texture: Option<(TextureResource, wgpu::BindGroup)>,
}

/// Triangulated vertex data, interleaved and ready for upload.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl Mesh {
    /// Interleaves flat parse output into GPU vertices.
    ///
    /// Missing texture coordinates become zeros; the draw flags decide
    /// whether the shader ever samples with them.
    pub fn new(data: MeshData) -> Self {
        let uvs = data.uvs().map(|uvs| uvs.to_vec());
        let mut vertices = Vec::with_capacity(data.vertex_count());
        for i in 0..data.vertex_count() {
            vertices.push(Vertex3D {
                position: data.positions[i],
                normal: data.normals[i],
                diffuse: data.diffuse[i],
                specular: data.specular[i],
                uv: uvs.as_ref().map_or([0.0, 0.0], |uvs| uvs[i]),
            });
        }
        let vertex_count = vertices.len() as u32;
        Self {
            vertices,
            vertex_buffer: None,
            vertex_count,
        }
    }

    /// A mesh with no geometry, for pivot objects that only contribute a
    /// transform to the hierarchy.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            vertex_buffer: None,
            vertex_count: 0,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    fn init_gpu_resources(&mut self, device: &wgpu::Device, label: &str) {
        if self.vertices.is_empty() {
            return;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Vertex Buffer: {label}")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.vertex_buffer = Some(vertex_buffer);
    }
}

pub struct Object {
    pub name: String,
    pub mesh: Mesh,
    pub(crate) parent: Option<ObjectId>,
    scale: Matrix4<f32>,
    rotation: Matrix4<f32>,
    translation: Matrix4<f32>,
    local: Matrix4<f32>,
    position: Vector3<f32>,
    /// Whether the renderer draws a flattened copy of this mesh onto the
    /// ground plane when shadows are enabled.
    pub casts_shadow: bool,
    /// Background geometry, drawn without lighting and only when the
    /// environment toggle is on.
    pub is_background: bool,
    /// Per-frame animation toggle, consulted by the application loop.
    pub animated: bool,
    texture_image: Option<image::RgbaImage>,
    pub gpu_resources: Option<ObjectGpuResources>,
}

impl Object {
    /// Creates an object at the origin with an identity transform.
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            parent: None,
            scale: Matrix4::identity(),
            rotation: Matrix4::identity(),
            translation: Matrix4::identity(),
            local: Matrix4::identity(),
            position: Vector3::new(0.0, 0.0, 0.0),
            casts_shadow: false,
            is_background: false,
            animated: false,
            texture_image: None,
            gpu_resources: None,
        }
    }

    /// Attaches a diffuse texture image, uploaded on GPU init.
    pub fn with_texture(mut self, image: image::RgbaImage) -> Self {
        self.texture_image = Some(image);
        self
    }

    /// Replaces the scale component.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Matrix4::from_nonuniform_scale(x, y, z);
        self.rebuild_local();
    }

    /// Multiplies the current scale component.
    pub fn scale_by(&mut self, x: f32, y: f32, z: f32) {
        self.scale = self.scale * Matrix4::from_nonuniform_scale(x, y, z);
        self.rebuild_local();
    }

    /// Moves the object to an absolute local position.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
        self.translation = Matrix4::from_translation(self.position);
        self.rebuild_local();
    }

    /// Offsets the object from where it currently is.
    pub fn translate_by(&mut self, x: f32, y: f32, z: f32) {
        self.position += Vector3::new(x, y, z);
        self.translation = Matrix4::from_translation(self.position);
        self.rebuild_local();
    }

    /// Accumulates a rotation around the local X axis.
    pub fn rotate_x(&mut self, angle: Deg<f32>) {
        self.rotation = self.rotation * Matrix4::from_angle_x(angle);
        self.rebuild_local();
    }

    /// Accumulates a rotation around the local Y axis.
    pub fn rotate_y(&mut self, angle: Deg<f32>) {
        self.rotation = self.rotation * Matrix4::from_angle_y(angle);
        self.rebuild_local();
    }

    /// Accumulates a rotation around the local Z axis.
    pub fn rotate_z(&mut self, angle: Deg<f32>) {
        self.rotation = self.rotation * Matrix4::from_angle_z(angle);
        self.rebuild_local();
    }

    /// Drops all accumulated rotation.
    pub fn reset_rotation(&mut self) {
        self.rotation = Matrix4::identity();
        self.rebuild_local();
    }

    /// Local position relative to the parent, tracked as a running sum so
    /// it never drifts from the translation matrix.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Local transform, rebuilt eagerly on every mutation.
    ///
    /// Composition order is translation * rotation * scale: scale happens
    /// in the object's own frame, rotation spins the scaled object, and
    /// translation places the result.
    pub fn local_matrix(&self) -> Matrix4<f32> {
        self.local
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn has_texture(&self) -> bool {
        self.texture_image.is_some()
            || self
                .gpu_resources
                .as_ref()
                .is_some_and(|gpu| gpu.texture.is_some())
    }

    fn rebuild_local(&mut self) {
        self.local = self.translation * (self.rotation * self.scale);
    }

    /// Uploads the mesh and builds the object's two uniform buffers and
    /// bind groups (regular draw and shadow draw), plus the texture bind
    /// group when an image is attached.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        object_layout: &BindGroupLayoutWithDesc,
        texture_layout: &BindGroupLayoutWithDesc,
    ) {
        self.mesh.init_gpu_resources(device, &self.name);

        let has_texture = if self.texture_image.is_some() { 1.0 } else { 0.0 };
        let model: [[f32; 4]; 4] = self.local.into();
        let main_ubo = UniformBuffer::new_with_data(
            device,
            &ObjectUniform {
                model,
                flags: [has_texture, 0.0, 0.0, 0.0],
            },
        );
        let shadow_ubo = UniformBuffer::new_with_data(
            device,
            &ObjectUniform {
                model,
                flags: [0.0, 1.0, 0.0, 0.0],
            },
        );

        let main_bind_group = BindGroupBuilder::new(object_layout)
            .resource(main_ubo.binding_resource())
            .create(device, &format!("Object Bind Group: {}", self.name));
        let shadow_bind_group = BindGroupBuilder::new(object_layout)
            .resource(shadow_ubo.binding_resource())
            .create(device, &format!("Shadow Bind Group: {}", self.name));

        let texture = self.texture_image.take().map(|image| {
            let resource = TextureResource::from_image(device, queue, &image, &self.name);
            let bind_group = BindGroupBuilder::new(texture_layout)
                .texture(&resource.view)
                .sampler(&resource.sampler)
                .create(device, &format!("Texture Bind Group: {}", self.name));
            (resource, bind_group)
        });

        self.gpu_resources = Some(ObjectGpuResources {
            main_ubo,
            shadow_ubo,
            main_bind_group,
            shadow_bind_group,
            texture,
        });
    }

    /// Pushes this frame's world matrix into both uniform buffers.
    pub fn write_world_matrix(&mut self, queue: &wgpu::Queue, world: Matrix4<f32>) {
        let Some(gpu) = &mut self.gpu_resources else {
            return;
        };
        let model: [[f32; 4]; 4] = world.into();
        let has_texture = if gpu.texture.is_some() { 1.0 } else { 0.0 };
        gpu.main_ubo.update_content(
            queue,
            ObjectUniform {
                model,
                flags: [has_texture, 0.0, 0.0, 0.0],
            },
        );
        gpu.shadow_ubo.update_content(
            queue,
            ObjectUniform {
                model,
                flags: [0.0, 1.0, 0.0, 0.0],
            },
        );
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.mesh.vertex_buffer.as_ref()
    }
}

/// Draws a mesh if its vertex buffer has been uploaded.
pub trait DrawObject<'a> {
    fn draw_object(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_object(&mut self, object: &'b Object) {
        let Some(vertex_buffer) = object.vertex_buffer() else {
            return;
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.draw(0..object.mesh.vertex_count(), 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn approx_vec(v: Vector4<f32>, expected: [f32; 3]) -> bool {
        approx(v.x, expected[0]) && approx(v.y, expected[1]) && approx(v.z, expected[2])
    }

    fn triangle_mesh() -> Mesh {
        let mut session = crate::gfx::wavefront::WavefrontSession::new();
        session
            .parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        Mesh::new(session.into_mesh())
    }

    #[test]
    fn local_matrix_applies_scale_then_rotation_then_translation() {
        let mut object = Object::new("test", triangle_mesh());
        object.set_scale(2.0, 1.0, 1.0);
        object.rotate_y(Deg(90.0));
        object.set_position(5.0, 0.0, 0.0);

        let local = object.local_matrix();
        // The origin only picks up the translation.
        assert!(approx_vec(
            local * Vector4::new(0.0, 0.0, 0.0, 1.0),
            [5.0, 0.0, 0.0]
        ));
        // (1,0,0) scales to (2,0,0), rotates to (0,0,-2), then translates.
        assert!(approx_vec(
            local * Vector4::new(1.0, 0.0, 0.0, 1.0),
            [5.0, 0.0, -2.0]
        ));
    }

    #[test]
    fn rotations_accumulate_until_reset() {
        let mut object = Object::new("test", triangle_mesh());
        object.rotate_y(Deg(45.0));
        object.rotate_y(Deg(45.0));

        let spun = object.local_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx_vec(spun, [0.0, 0.0, -1.0]));

        object.reset_rotation();
        let reset = object.local_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx_vec(reset, [1.0, 0.0, 0.0]));
    }

    #[test]
    fn position_tracks_relative_moves() {
        let mut object = Object::new("test", triangle_mesh());
        object.set_position(1.0, 2.0, 3.0);
        object.translate_by(0.5, -2.0, 0.0);
        assert_eq!(object.position(), Vector3::new(1.5, 0.0, 3.0));
    }

    #[test]
    fn mesh_interleaves_parse_output() {
        let mesh = triangle_mesh();
        assert_eq!(mesh.vertex_count(), 3);
        let first = &mesh.vertices()[0];
        assert_eq!(first.position, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(first.normal, [0.0; 4]);
        // No vt records in the source, so UVs are placeholder zeros.
        assert_eq!(first.uv, [0.0, 0.0]);
    }
}
