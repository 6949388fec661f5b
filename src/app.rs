//! Application shell
//!
//! Owns the winit event loop and the application state struct that holds
//! every long-lived piece of the viewer: renderer, camera, navigation,
//! scene, settings, and the asset loader. Initialization order is renderer,
//! then camera aspect, then controllers, then asset loads, then the loop.
//! The loop runs for the lifetime of the process; there is no teardown
//! beyond exit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use cgmath::{Vector3, Zero};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::assets::{AssetEvent, AssetLoader, AssetStage, AssetStatusBoard, StageStatus};
use crate::gfx::{camera::Camera, Navigator, RenderEngine, Scene};
use crate::settings::ViewerSettings;
use crate::ui::{self, UiManager};

/// Initial eye position, matching the first-person vantage so the first
/// mode switch is seamless.
const STARTUP_EYE: Vector3<f32> = Vector3::new(10.0, 3.0, 1.5);

/// Paths of the two startup assets.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub environment_path: PathBuf,
    pub model_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            environment_path: PathBuf::from("assets/textures/autumn_park_1k.hdr"),
            model_path: PathBuf::from("assets/models/scene.gltf"),
        }
    }
}

pub struct BothyApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    camera: Camera,
    navigator: Navigator,
    settings: ViewerSettings,
    asset_loader: Option<AssetLoader>,
    asset_status: AssetStatusBoard,
    last_frame: Instant,
}

impl BothyApp {
    /// Create a new viewer application
    pub async fn new(config: ViewerConfig) -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let mut camera = Camera::new(STARTUP_EYE, Vector3::zero(), 1.0);
        let navigator = Navigator::new(&mut camera, Vector3::zero());

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene: Scene::new(),
                camera,
                navigator,
                settings: ViewerSettings::default(),
                asset_loader: None,
                asset_status: AssetStatusBoard::new(),
                last_frame: Instant::now(),
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("bothy")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();

            let window_clone = window_handle.clone();
            let renderer =
                pollster::block_on(
                    async move { RenderEngine::new(window_clone, width, height).await },
                );

            self.camera.resize_projection(width, height);
            self.scene.init_gpu_resources(renderer.device(), renderer.queue());

            let ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
            );

            self.ui_manager = Some(ui_manager);
            self.render_engine = Some(renderer);

            // Renderer is up; start the two-stage asset pipeline.
            self.asset_loader = Some(AssetLoader::spawn(
                self.config.environment_path.clone(),
                self.config.model_path.clone(),
            ));
            self.last_frame = Instant::now();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        if self.render_engine.is_none() {
            return;
        }

        let Some(window) = self.window.clone() else {
            return;
        };

        // UI gets first claim on input
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if matches!(
                    key_event.physical_key,
                    winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                ) {
                    event_loop.exit();
                    return;
                }
                self.navigator.process_keyboard_event(&key_event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.camera.resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(&window);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        // Don't feed the controllers while a panel owns the pointer
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_input() {
                return;
            }
        }

        self.navigator.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

impl AppState {
    /// One render tick: integrate finished asset loads, run the UI frame,
    /// apply any settings change synchronously, advance the active
    /// controller, then draw. Controller update always precedes the draw.
    fn redraw(&mut self, window: &Window) {
        self.drain_asset_events();

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let mut settings_changed = false;
        {
            let Some(ui_manager) = self.ui_manager.as_mut() else {
                return;
            };
            let settings = &mut self.settings;
            let status = &self.asset_status;
            ui_manager.update_logic(window, |frame| {
                settings_changed |= ui::navigation_panel(frame, settings);
                ui::status_panel(frame, status);
            });
        }

        if settings_changed {
            self.navigator.apply_settings(&self.settings, &mut self.camera);
        }

        self.navigator
            .update(dt, &mut self.camera, self.scene.collision());
        self.camera.update_view_proj();

        let (Some(render_engine), Some(ui_manager)) =
            (self.render_engine.as_mut(), self.ui_manager.as_mut())
        else {
            return;
        };

        render_engine.update(self.camera.uniform);
        render_engine.render_frame(
            &self.scene,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 color_attachment: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, color_attachment);
                },
            ),
        );
    }

    /// Applies finished loader stages to the renderer and scene. Events
    /// arrive in stage order, so the environment is always installed before
    /// model meshes are integrated.
    fn drain_asset_events(&mut self) {
        let events = match self.asset_loader.as_ref() {
            Some(loader) => loader.poll(),
            None => return,
        };

        for event in events {
            match event {
                AssetEvent::EnvironmentLoaded(image) => {
                    if let Some(render_engine) = self.render_engine.as_mut() {
                        render_engine.set_environment(&image);
                    }
                    self.asset_status
                        .set(AssetStage::Environment, StageStatus::Ready);
                }
                AssetEvent::ModelLoaded(model) => {
                    self.scene.add_model(model);
                    if let Some(render_engine) = self.render_engine.as_ref() {
                        self.scene
                            .init_gpu_resources(render_engine.device(), render_engine.queue());
                    }
                    self.asset_status.set(AssetStage::Model, StageStatus::Ready);
                }
                AssetEvent::LoadFailed { stage, error } => {
                    // Keep rendering whatever did load; the panel shows why
                    // the rest never appeared.
                    self.asset_status
                        .set(stage, StageStatus::Failed(error.to_string()));
                }
            }
        }
    }
}
