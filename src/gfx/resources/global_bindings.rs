//! Global uniform bindings for camera, light, and feature flags
//!
//! One uniform buffer shared by every draw in the frame: the combined
//! view-projection matrix, the camera's world position, the point light,
//! the planar shadow matrix derived from it, and the feature toggle
//! flags. Bound to slot 0 in the render pipeline.

use cgmath::{Matrix4, Point3};

use crate::gfx::scene::RenderFlags;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Global uniform buffer content.
///
/// MUST match the `Globals` struct in the shader exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],      // Camera world position
    view_proj: [[f32; 4]; 4],     // Combined view-projection matrix
    shadow_matrix: [[f32; 4]; 4], // Flattens geometry onto the ground plane
    light_position: [f32; 4],     // Point light world position
    flags: [f32; 4],              // lighting, reflections, refractions, unused
}

unsafe impl bytemuck::Pod for GlobalUBOContent {}
unsafe impl bytemuck::Zeroable for GlobalUBOContent {}

impl GlobalUBOContent {
    pub fn new(
        eye: Point3<f32>,
        view_proj: Matrix4<f32>,
        light: Point3<f32>,
        flags: RenderFlags,
    ) -> Self {
        let as_flag = |on: bool| if on { 1.0 } else { 0.0 };
        Self {
            view_position: [eye.x, eye.y, eye.z, 1.0],
            view_proj: view_proj.into(),
            shadow_matrix: planar_shadow_matrix(light).into(),
            light_position: [light.x, light.y, light.z, 1.0],
            flags: [
                as_flag(flags.lighting),
                as_flag(flags.reflections),
                as_flag(flags.refractions),
                0.0,
            ],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Projects geometry onto the y = 0 plane away from a point light.
///
/// Built as T(light) * S * T(-light), where S divides by the light-relative
/// height. The resulting w varies per vertex, so the perspective divide
/// does the actual flattening.
pub fn planar_shadow_matrix(light: Point3<f32>) -> Matrix4<f32> {
    // Degenerate when the light sits on the ground plane itself.
    let ly = if light.y.abs() < 1e-3 { 1e-3 } else { light.y };

    #[rustfmt::skip]
    let squash = Matrix4::new(
        1.0, 0.0, 0.0,  0.0,
        0.0, 1.0, 0.0, -1.0 / ly,
        0.0, 0.0, 1.0,  0.0,
        0.0, 0.0, 0.0,  0.0,
    );

    let light_offset = cgmath::Vector3::new(light.x, light.y, light.z);
    Matrix4::from_translation(light_offset) * squash * Matrix4::from_translation(-light_offset)
}

/// Manages the bind group layout and bind group for global uniforms.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group once the uniform buffer exists. Must run
    /// before the first frame.
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn layout(&self) -> &BindGroupLayoutWithDesc {
        &self.bind_group_layout
    }

    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn shadow_projects_toward_the_ground_plane() {
        let m = planar_shadow_matrix(Point3::new(0.0, 3.0, 0.0));
        let shadowed = m * Vector4::new(1.0, 1.0, 0.0, 1.0);
        let (x, y, z) = (
            shadowed.x / shadowed.w,
            shadowed.y / shadowed.w,
            shadowed.z / shadowed.w,
        );
        // The light at (0,3,0) through (1,1,0) hits the ground at (1.5,0,0).
        assert!((x - 1.5).abs() < 1e-4);
        assert!(y.abs() < 1e-4);
        assert!(z.abs() < 1e-4);
    }

    #[test]
    fn shadow_under_the_light_stays_put_laterally() {
        let m = planar_shadow_matrix(Point3::new(2.0, 4.0, 0.0));
        let shadowed = m * Vector4::new(2.0, 2.0, 0.0, 1.0);
        assert!((shadowed.x / shadowed.w - 2.0).abs() < 1e-4);
        assert!((shadowed.y / shadowed.w).abs() < 1e-4);
    }

    #[test]
    fn ground_level_light_stays_finite() {
        let m = planar_shadow_matrix(Point3::new(0.0, 0.0, 0.0));
        let shadowed = m * Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert!(shadowed.x.is_finite() && shadowed.w.is_finite());
    }
}
