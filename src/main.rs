//! Particle Box Simulation
//!
//! Point particles under pairwise gravity bouncing inside a 2D box,
//! stepped once per frame on the GPU or the CPU.

mod config;
mod error;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use config::SimConfig;
use error::{FrameError, InitError};
use particle_physics::{spawn_non_overlapping, BoxBounds, CpuEngine, PhysicsEngine};
use particle_renderer::{BoxView, PointRenderer};
use particle_simulation::{GpuEngine, GpuError};

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    engine: Box<dyn PhysicsEngine>,
    renderer: PointRenderer,

    // Frame timing
    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, sim_config: SimConfig) -> Result<Self, InitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(GpuError::from)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(GpuError::from)?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(GpuError::from)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bounds = BoxBounds::new(sim_config.box_width, sim_config.box_height);
        let mut rng = rand::rng();
        let system = spawn_non_overlapping(&mut rng, sim_config.particle_count, bounds)?;
        log::info!("✓ Spawned {} particles", system.len());

        let engine: Box<dyn PhysicsEngine> = if sim_config.use_gpu {
            let engine = GpuEngine::new(device.clone(), queue.clone(), system, sim_config.damping)?;
            log::info!("✓ GPU engine ready");
            Box::new(engine)
        } else {
            log::info!("✓ CPU engine ready");
            Box::new(CpuEngine::new(system, sim_config.damping))
        };

        let view = BoxView::new(sim_config.box_width, sim_config.box_height);
        let renderer = PointRenderer::new(&device, &config, engine.particle_count(), &view);
        log::info!("✓ Renderer initialized");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            engine,
            renderer,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(&mut self) -> Result<(f32, f32), FrameError> {
        // Frame delta in milliseconds; the physics step consumes it directly.
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time;

        self.engine.step(frame_time)?;

        self.renderer
            .write_positions(&self.queue, self.engine.positions());

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render(&self.device, &self.queue, &view, self.engine.particle_count());

        output.present();

        Ok((fps, avg_frame_time))
    }
}

struct App {
    sim_config: SimConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Particles")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.sim_config.box_width as f64,
                    self.sim_config.box_height as f64,
                ));

            let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
            self.window = Some(window.clone());

            match pollster::block_on(GpuState::new(window, self.sim_config)) {
                Ok(gpu_state) => self.gpu_state = Some(gpu_state),
                Err(e) => {
                    log::error!("Failed to start the simulation: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render() {
                        Ok((fps, frame_time)) => {
                            window.set_title(&format!(
                                "Particles - {:.0} FPS ({:.2}ms) - {} particles",
                                fps,
                                frame_time,
                                gpu_state.engine.particle_count()
                            ));
                        }
                        Err(FrameError::Surface(wgpu::SurfaceError::Lost)) => {
                            gpu_state.resize(window.inner_size());
                        }
                        Err(FrameError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                            log::error!("Out of memory");
                            event_loop.exit();
                        }
                        Err(FrameError::Step(e)) => {
                            log::error!("Simulation step failed: {}", e);
                            event_loop.exit();
                        }
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let sim_config = SimConfig::from_args();
    log::info!(
        "Starting particle box: {} particles in a {}x{} box on the {}",
        sim_config.particle_count,
        sim_config.box_width,
        sim_config.box_height,
        if sim_config.use_gpu { "GPU" } else { "CPU" }
    );

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        sim_config,
        window: None,
        gpu_state: None,
    };

    event_loop.run_app(&mut app).unwrap();
}
