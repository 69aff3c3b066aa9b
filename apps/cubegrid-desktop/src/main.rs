use anyhow::{Context, Result};
use clap::Parser;
use cubegrid_common::TurnDirection;
use cubegrid_input::{Action, CameraScheme, Key, Keymap};
use cubegrid_kernel::{Cube, RotationPhase};
use cubegrid_render::{ActiveCamera, Camera, CubeScene, Projection, RenderView};
use cubegrid_render_wgpu::{CUBE_PROGRAM, WgpuBackend};
use egui::Context as EguiContext;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubegrid-desktop", about = "Interactive 3x3x3 cube demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Camera scheme: orbit or free
    #[arg(short, long, default_value = "orbit")]
    camera: CameraScheme,

    /// Fixed update rate in ticks per second
    #[arg(long, default_value = "60")]
    tick_rate: f64,

    /// Initial window width; also fixes the projection aspect ratio
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "768")]
    height: u32,
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::Space => Key::Space,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::F1 => Key::F1,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Application state.
struct AppState {
    camera: ActiveCamera,
    cube: Cube,
    keymap: Keymap,
    projection: Projection,
    show_hud: bool,
    quit_requested: bool,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(scheme: CameraScheme, ticks_per_second: f64, width: u32, height: u32) -> Self {
        let ticks_per_second = if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            tracing::warn!(ticks_per_second, "invalid tick rate, using 60");
            60.0
        };
        Self {
            camera: ActiveCamera::new(scheme),
            cube: Cube::new(),
            keymap: Keymap::for_scheme(scheme),
            projection: Projection::for_size(width, height),
            show_hud: true,
            quit_requested: false,
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate: 1.0 / ticks_per_second,
        }
    }

    fn update(&mut self, dt: f32) {
        self.tick_accumulator += dt as f64;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            self.cube.step();
        }
        for event in self.cube.drain_events() {
            tracing::trace!(?event, "cube event");
        }
    }

    fn handle_key(&mut self, key: Key) {
        let Some(action) = self.keymap.action(key) else {
            return;
        };
        match action {
            Action::Camera(camera_action) => {
                self.camera.apply(camera_action);
            }
            Action::RotateFront(direction) => {
                self.cube.rotate_front(direction);
            }
            Action::ToggleHud => {
                self.show_hud = !self.show_hud;
            }
            Action::Quit => {
                self.quit_requested = true;
            }
        }
    }

    fn render_view(&self) -> RenderView {
        RenderView::from_camera(&self.camera, self.projection)
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        egui::SidePanel::left("hud")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Cube");
                ui.separator();
                ui.label(format!(
                    "Tick: {}  Turns: {}",
                    self.cube.tick(),
                    self.cube.turns_completed()
                ));
                ui.label(format!("Solved: {}", self.cube.is_solved()));
                let rotation = self.cube.rotation();
                match rotation.phase() {
                    RotationPhase::Idle => ui.label("Front layer: idle"),
                    RotationPhase::Rotating => ui.label(format!(
                        "Front layer: {:?} {:.0}°",
                        rotation.direction(),
                        rotation.current_angle().to_degrees()
                    )),
                };
                ui.horizontal(|ui| {
                    if ui.button("Clockwise (F)").clicked() {
                        self.cube.rotate_front(TurnDirection::Clockwise);
                    }
                    if ui.button("Counter-clockwise (G)").clicked() {
                        self.cube.rotate_front(TurnDirection::CounterClockwise);
                    }
                });

                ui.separator();
                ui.heading("Camera");
                ui.label(format!("Scheme: {}", self.camera.scheme()));
                let eye = self.camera.position();
                let target = self.camera.target();
                let up = self.camera.up();
                ui.label(format!("Eye: ({:.2}, {:.2}, {:.2})", eye.x, eye.y, eye.z));
                ui.label(format!(
                    "Target: ({:.2}, {:.2}, {:.2})",
                    target.x, target.y, target.z
                ));
                ui.label(format!("Up: ({:.2}, {:.2}, {:.2})", up.x, up.y, up.z));
                if let ActiveCamera::Orbit(orbit) = &self.camera {
                    ui.label(format!(
                        "Distance: {:.2}  ZY: {:.0}°  ZX: {:.0}°",
                        orbit.distance(),
                        orbit.angle_zy().to_degrees(),
                        orbit.angle_zx().to_degrees()
                    ));
                }

                ui.separator();
                ui.heading("Keys");
                for (key, action) in self.keymap.bindings() {
                    ui.small(format!("{key}: {action:?}"));
                }
            });
    }
}

struct GpuApp {
    state: AppState,
    window_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    backend: Option<WgpuBackend>,
    scene: Option<CubeScene>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState, window_size: PhysicalSize<u32>) -> Self {
        Self {
            state,
            window_size,
            window: None,
            surface: None,
            config: None,
            backend: None,
            scene: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Cube Grid")
            .with_inner_size(self.window_size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubegrid_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);
        let mut backend =
            WgpuBackend::new(device, queue, surface_format, config.width, config.height);
        let scene = CubeScene::new(&mut backend, &CUBE_PROGRAM, self.state.cube.grid())
            .context("build cube scene")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.config = Some(config);
        self.backend = Some(backend);
        self.scene = Some(scene);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    /// Draw the cube and the HUD into the next surface texture.
    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let (Some(window), Some(surface), Some(config), Some(backend), Some(scene)) = (
            &self.window,
            &self.surface,
            &self.config,
            &mut self.backend,
            &self.scene,
        ) else {
            return Ok(());
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(backend.device(), config);
                return Ok(());
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return Ok(());
            }
        };

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        scene.draw(&mut *backend, &self.state.render_view(), &self.state.cube)?;
        backend.render_to(&target);

        let (Some(egui_winit), Some(egui_renderer)) =
            (&mut self.egui_winit, &mut self.egui_renderer)
        else {
            output.present();
            return Ok(());
        };

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = backend.device();
        let queue = backend.queue();
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(backend), Some(config)) =
                    (&self.surface, &mut self.backend, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(backend.device(), config);
                    backend.resize(config.width, config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.state.handle_key(key);
                }
                if self.state.quit_requested {
                    tracing::info!("quit requested");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    tracing::error!("render failed: {e:#}");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(camera = %cli.camera, "cubegrid-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let state = AppState::new(cli.camera, cli.tick_rate, cli.width, cli.height);
    let mut app = GpuApp::new(state, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    Ok(())
}
