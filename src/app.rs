use std::sync::Arc;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::color::Color;
use crate::geometry::{GeometryError, RawGeometry};
use crate::gpu::{GpuContext, GpuError};
use crate::input::PointerInput;
use crate::mesh_pass::MeshPass;
use crate::mesh_queue::{MeshId, MeshQueue};
use crate::orbit::OrbitController;
use crate::scene::{FACE_DISK, FrameState, StaticMeshes, compose_scene};
use crate::time::TimeSource;

/// Configuration for the app window.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "3D Pendulum Clock".to_string(),
            width: 800,
            height: 800,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Errors that stop the app before or while it runs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("failed to build clock geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// Open the clock window with default settings and run until it is closed.
pub fn run() -> Result<(), AppError> {
    run_with_config(AppConfig::default())
}

/// Open the clock window with a custom title or size.
///
/// # Example
/// ```no_run
/// use pendulum_clock::AppConfig;
///
/// pendulum_clock::run_with_config(AppConfig::new().title("Clock").size(1024, 1024))?;
/// # Ok::<(), pendulum_clock::AppError>(())
/// ```
pub fn run_with_config(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ClockApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ClockApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum ClockApp {
    Pending { config: AppConfig },
    Running(Box<Running>),
    Failed(AppError),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    /// `None` when the shader failed to build; frames are then cleared but empty.
    mesh_pass: Option<MeshPass>,
    mesh_queue: MeshQueue,
    meshes: StaticMeshes,
    camera: Camera,
    orbit: OrbitController,
    pointer: PointerInput,
    clock: TimeSource,
}

impl ApplicationHandler for ClockApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ClockApp::Pending { config } = self else {
            return;
        };

        match Running::start(event_loop, config) {
            Ok(running) => *self = ClockApp::Running(Box::new(running)),
            Err(err) => {
                *self = ClockApp::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ClockApp::Running(app) = self else {
            return;
        };

        if let Some(pointer_event) = app.pointer.translate(&event) {
            app.orbit.apply(pointer_event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized to {}x{}", size.width, size.height);
                app.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                app.render();
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let mesh_pass = match MeshPass::new(&gpu) {
            Ok(pass) => Some(pass),
            Err(err) => {
                log::error!("{err}; continuing without the mesh pipeline");
                None
            }
        };

        let mut mesh_queue = MeshQueue::new();
        let meshes = upload_clock_meshes(&gpu, &mut mesh_queue)?;

        window.request_redraw();

        Ok(Self {
            window,
            gpu,
            mesh_pass,
            mesh_queue,
            meshes,
            camera: Camera::new(),
            orbit: OrbitController::new(),
            pointer: PointerInput::new(),
            clock: TimeSource::start(),
        })
    }

    fn render(&mut self) {
        let time = self.clock.elapsed_seconds();
        let commands = compose_scene(FrameState::new(&self.orbit, time), &self.meshes);

        self.mesh_queue.clear_queue();
        self.mesh_queue.draw_scene(&commands);

        let gpu = &self.gpu;
        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(err) => {
                log::warn!("Skipping frame: {err}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draw_calls = self.mesh_queue.draw_calls();
        if let Some(pass) = self.mesh_pass.as_mut() {
            pass.ensure_depth_size(gpu);
            pass.prepare(gpu, &self.camera, &draw_calls);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clock Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clock Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Color::BACKGROUND.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: self.mesh_pass.as_ref().map(MeshPass::depth_attachment),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(pass) = &self.mesh_pass {
                pass.draw(&mut render_pass, &draw_calls);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

/// Generates, checks and uploads the three meshes every part of the clock is drawn with.
fn upload_clock_meshes(
    gpu: &GpuContext,
    queue: &mut MeshQueue,
) -> Result<StaticMeshes, GeometryError> {
    let mut upload = |name: &str, geometry: RawGeometry| -> Result<MeshId, GeometryError> {
        geometry.validate()?;
        log::debug!(
            "Generated {name} mesh: {} vertices, {} triangles",
            geometry.vertices.len(),
            geometry.triangle_count()
        );
        Ok(queue.add_mesh(geometry.upload(gpu)))
    };

    Ok(StaticMeshes {
        body: upload("body", RawGeometry::clock_box())?,
        rect: upload("rect", RawGeometry::rect())?,
        disk: upload("disk", RawGeometry::disk(FACE_DISK)?)?,
    })
}
