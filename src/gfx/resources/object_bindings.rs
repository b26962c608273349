//! Per-object and texture bind group layouts
//!
//! The layouts every object's bind groups are created against. The render
//! pipeline and the objects must agree on these, so one instance of each
//! lives in the render engine and is handed to the scene during GPU init.

use crate::wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

/// Layout for the per-draw uniform (world matrix + draw flags), slot 1.
pub struct ObjectBindings {
    layout: BindGroupLayoutWithDesc,
}

impl ObjectBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Object Bind Group Layout");
        Self { layout }
    }

    pub fn layout(&self) -> &BindGroupLayoutWithDesc {
        &self.layout
    }
}

/// Layout for the diffuse texture and its sampler, slot 2.
pub struct TextureBindings {
    layout: BindGroupLayoutWithDesc,
}

impl TextureBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Texture Bind Group Layout");
        Self { layout }
    }

    pub fn layout(&self) -> &BindGroupLayoutWithDesc {
        &self.layout
    }
}

/// Layout for the environment cube map, slot 3.
pub struct CubeMapBindings {
    layout: BindGroupLayoutWithDesc,
}

impl CubeMapBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Cube Map Bind Group Layout");
        Self { layout }
    }

    pub fn layout(&self) -> &BindGroupLayoutWithDesc {
        &self.layout
    }
}
