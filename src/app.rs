use std::sync::Arc;

use cgmath::Deg;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::KeyCode,
    window::{Window, WindowAttributes},
};

use crate::demo::SceneHandles;
use crate::gfx::{rendering::RenderEngine, scene::Scene};

/// How far one key press moves the camera or the light.
const CAMERA_STEP: f32 = 0.2;
const LIGHT_STEP: f32 = 0.2;

/// Degrees of spin applied per frame to the animated pivots.
const CAR_SPIN_STEP: Deg<f32> = Deg(-0.5);
const RIG_SPIN_STEP: Deg<f32> = Deg(0.3);

pub struct ClachanApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    handles: Option<SceneHandles>,
    environment: Option<Box<[image::RgbaImage; 6]>>,
    frame: u32,
}

impl ClachanApp {
    /// Creates the application with an empty scene. Populate the scene
    /// before calling [`run`](ClachanApp::run); GPU upload happens when
    /// the window first resumes.
    pub fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene: Scene::new(),
                handles: None,
                environment: None,
                frame: 0,
            },
        }
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.app_state.scene
    }

    /// Registers the demo's animated pivots so the frame loop can drive
    /// them.
    pub fn set_handles(&mut self, handles: SceneHandles) {
        self.app_state.handles = Some(handles);
    }

    /// Face images for the environment cube map, uploaded on resume.
    pub fn set_environment(&mut self, faces: Box<[image::RgbaImage; 6]>) {
        self.app_state.environment = Some(faces);
    }

    /// Runs the application (consumes self and starts the event loop).
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl Default for ClachanApp {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    fn advance_animations(&mut self) {
        let Some(handles) = &self.handles else {
            return;
        };

        if self.scene.object(handles.car_pivot).animated {
            self.scene
                .object_mut(handles.car_pivot)
                .rotate_y(CAR_SPIN_STEP);
        }

        if self.scene.object(handles.camera_rig).animated {
            self.scene
                .object_mut(handles.camera_rig)
                .rotate_y(RIG_SPIN_STEP);
            // Gentle vertical bob for the camera riding the rig.
            let bob = 0.015 * (self.frame as f32 / 70.0).cos();
            if let Some(camera) = self.scene.cameras.first_mut() {
                camera.translate_by(0.0, bob, 0.0);
            }
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode, repeat: bool) {
        let scene = &mut self.scene;
        match key_code {
            KeyCode::Escape => event_loop.exit(),

            // Active camera rides up and down.
            KeyCode::Space => scene.active_camera_mut().translate_by(0.0, CAMERA_STEP, 0.0),
            KeyCode::ControlLeft => {
                scene.active_camera_mut().translate_by(0.0, -CAMERA_STEP, 0.0)
            }

            // Light moves on all three axes.
            KeyCode::ArrowLeft => scene.move_light(-LIGHT_STEP, 0.0, 0.0),
            KeyCode::ArrowRight => scene.move_light(LIGHT_STEP, 0.0, 0.0),
            KeyCode::ArrowUp => scene.move_light(0.0, 0.0, -LIGHT_STEP),
            KeyCode::ArrowDown => scene.move_light(0.0, 0.0, LIGHT_STEP),
            KeyCode::Comma => scene.move_light(0.0, -LIGHT_STEP, 0.0),
            KeyCode::Period => scene.move_light(0.0, LIGHT_STEP, 0.0),

            // Feature toggles ignore key repeat.
            _ if repeat => {}
            KeyCode::KeyL => scene.flags.lighting = !scene.flags.lighting,
            KeyCode::KeyS => scene.flags.shadows = !scene.flags.shadows,
            KeyCode::KeyR => scene.flags.reflections = !scene.flags.reflections,
            KeyCode::KeyF => scene.flags.refractions = !scene.flags.refractions,
            KeyCode::KeyE => scene.flags.background = !scene.flags.background,
            KeyCode::KeyD => scene.next_camera(),
            KeyCode::KeyM => {
                if let Some(handles) = &self.handles {
                    let pivot = scene.object_mut(handles.car_pivot);
                    pivot.animated = !pivot.animated;
                }
            }
            KeyCode::KeyC => {
                if let Some(handles) = &self.handles {
                    let rig = scene.object_mut(handles.camera_rig);
                    rig.animated = !rig.animated;
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default().with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();

            let window_clone = window_handle.clone();
            let mut renderer =
                pollster::block_on(
                    async move { RenderEngine::new(window_clone, width, height).await },
                );

            if let Some(faces) = self.environment.take() {
                renderer.set_environment(&faces);
            }

            self.scene.init_gpu_resources(
                renderer.device(),
                renderer.queue(),
                renderer.object_bindings().layout(),
                renderer.texture_bindings().layout(),
            );

            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.render_engine.is_none() || self.window.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        state: winit::event::ElementState::Pressed,
                        repeat,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code, repeat),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.frame = self.frame.wrapping_add(1);
                self.advance_animations();

                let Some(render_engine) = self.render_engine.as_mut() else {
                    return;
                };
                self.scene.update(render_engine.queue());
                render_engine.update(&self.scene);
                render_engine.render_frame(&self.scene);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
