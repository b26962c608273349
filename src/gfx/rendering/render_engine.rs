//! WGPU-based render engine for the street-scene viewer
//!
//! One surface, one depth buffer, one pipeline. Every draw variant
//! (shadow, textured, environment face) is selected through uniforms and
//! bind group swaps rather than extra pipelines, so a frame is a single
//! render pass over the scene.

use std::{iter, sync::Arc};

use wgpu::{DepthStencilState, RenderPipeline, TextureFormat};

use crate::gfx::camera::projection_matrix;
use crate::gfx::resources::{
    CubeMapBindings, GlobalBindings, GlobalUBO, GlobalUBOContent, ObjectBindings, TextureBindings,
    TextureResource,
};
use crate::gfx::scene::{DrawObject, Object, Scene, Vertex3D};
use crate::wgpu_utils::BindGroupBuilder;

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,

    pipeline: RenderPipeline,

    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_bindings: ObjectBindings,
    texture_bindings: TextureBindings,
    cube_bindings: CubeMapBindings,

    // Bound in the texture slot of untextured draws.
    fallback_texture_bind_group: wgpu::BindGroup,
    environment_bind_group: wgpu::BindGroup,
}

impl RenderEngine {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 4096,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: surface_capabilities.present_modes[0],
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let object_bindings = ObjectBindings::new(&device);
        let texture_bindings = TextureBindings::new(&device);
        let cube_bindings = CubeMapBindings::new(&device);

        let white = TextureResource::white_pixel(&device, &queue);
        let fallback_texture_bind_group = BindGroupBuilder::new(texture_bindings.layout())
            .texture(&white.view)
            .sampler(&white.sampler)
            .create(&device, "Fallback Texture Bind Group");

        // Placeholder environment until the scene supplies real faces.
        let blank_face = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let blank_environment = TextureResource::create_cube_map(
            &device,
            &queue,
            &std::array::from_fn(|_| blank_face.clone()),
            "Blank Environment",
        );
        let environment_bind_group = BindGroupBuilder::new(cube_bindings.layout())
            .texture(&blank_environment.view)
            .sampler(&blank_environment.sampler)
            .create(&device, "Environment Bind Group");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[
                &global_bindings.layout().layout,
                &object_bindings.layout().layout,
                &texture_bindings.layout().layout,
                &cube_bindings.layout().layout,
            ],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: None,
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: depth_texture.texture.format(),
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        RenderEngine {
            device: device.into(),
            config,
            format,
            surface,
            queue: queue.into(),
            pipeline,
            depth_texture,

            global_bindings,
            global_ubo,
            object_bindings,
            texture_bindings,
            cube_bindings,
            fallback_texture_bind_group,
            environment_bind_group,
        }
    }

    /// Replaces the placeholder environment cube map with real faces.
    pub fn set_environment(&mut self, faces: &[image::RgbaImage; 6]) {
        let cube_map =
            TextureResource::create_cube_map(&self.device, &self.queue, faces, "Environment");
        self.environment_bind_group = BindGroupBuilder::new(self.cube_bindings.layout())
            .texture(&cube_map.view)
            .sampler(&cube_map.sampler)
            .create(&self.device, "Environment Bind Group");
    }

    /// Refreshes the global uniform buffer from the scene's active camera,
    /// light, and feature toggles.
    pub fn update(&mut self, scene: &Scene) {
        let camera = scene.active_camera();
        let parent_world = camera.parent().map(|id| scene.world_matrix(id));
        let eye = camera.effective_eye(parent_world);

        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        let view_proj = projection_matrix(aspect) * camera.view_matrix();

        let light = cgmath::Point3::new(
            scene.light_position.x,
            scene.light_position.y,
            scene.light_position.z,
        );
        let content = GlobalUBOContent::new(eye, view_proj, light, scene.flags);
        self.global_ubo.update_content(&self.queue, content);
    }

    pub fn render_frame(&self, scene: &Scene) {
        let surface_texture = self
            .surface
            .get_current_texture()
            .expect("Failed to get surface texture!");

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    format: Some(self.format),
                    ..Default::default()
                });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
            render_pass.set_bind_group(3, &self.environment_bind_group, &[]);

            for object in scene.objects() {
                if object.is_background {
                    continue;
                }
                self.draw_with_bindings(&mut render_pass, object, scene);
            }

            if scene.flags.background {
                for object in scene.objects().iter().filter(|o| o.is_background) {
                    self.draw_with_bindings(&mut render_pass, object, scene);
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Binds the object's texture and uniform groups, draws its shadow
    /// sub-draw first when enabled, then the object itself.
    fn draw_with_bindings<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        object: &'a Object,
        scene: &Scene,
    ) {
        let Some(gpu) = &object.gpu_resources else {
            return;
        };

        let texture_bind_group = gpu
            .texture
            .as_ref()
            .map(|(_, bind_group)| bind_group)
            .unwrap_or(&self.fallback_texture_bind_group);
        render_pass.set_bind_group(2, texture_bind_group, &[]);

        if scene.flags.shadows && scene.flags.lighting && object.casts_shadow {
            render_pass.set_bind_group(1, &gpu.shadow_bind_group, &[]);
            render_pass.draw_object(object);
        }

        render_pass.set_bind_group(1, &gpu.main_bind_group, &[]);
        render_pass.draw_object(object);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn object_bindings(&self) -> &ObjectBindings {
        &self.object_bindings
    }

    pub fn texture_bindings(&self) -> &TextureBindings {
        &self.texture_bindings
    }
}
