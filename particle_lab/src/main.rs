//! Interactive 2D particle playground
//!
//! Particles drift toward the canvas center, bounce off the walls and leave
//! fading trails. Experiment presets swap in a vortex, a burst, an attractor
//! field or a wave grid.
//!
//! Usage: `particle_lab [config.json]`
//!
//! Controls:
//! - Click: Inject a particle at the cursor
//! - Space: Pause / resume
//! - R: Reset the default population
//! - 1-4: Vortex, explosion, attractor, wave presets
//! - G / T / L: Toggle grid, trails, proximity lines
//! - C: Cycle color mode
//! - F: Toggle fullscreen

mod controls_ui;
mod renderer;

use std::time::Instant;

use common::{Camera2D, GraphicsContext};
use controls_ui::ControlPanel;
use glam::Vec2;
use particle_lab::{compose_scene, ConfigChange, Intent, Preset, SceneConfig, SimEvent, Simulation};
use renderer::Renderer;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
    window::Fullscreen,
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: Renderer,
    camera: Camera2D,
    simulation: Simulation,
    panel: ControlPanel,
    cursor: Vec2,
    started: Instant,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, config: SceneConfig) -> Self {
        let renderer = Renderer::new(&ctx);
        let extent = Vec2::new(ctx.size.width as f32, ctx.size.height as f32);
        let camera = Camera2D::new(extent.x, extent.y);
        let simulation = Simulation::new(config, extent);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            renderer,
            camera,
            simulation,
            panel: ControlPanel::new(),
            cursor: Vec2::ZERO,
            started: Instant::now(),
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.resize(new_size.width as f32, new_size.height as f32);
        self.renderer.resize(&self.ctx.device, new_size.width, new_size.height);
        self.simulation
            .push_intent(Intent::Resize(Vec2::new(new_size.width as f32, new_size.height as f32)));
    }

    /// Seconds since startup; the simulation's frame clock
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn update(&mut self) {
        let now = self.now();
        let report = self.simulation.frame(now);

        if let Some(snapshot) = report.telemetry {
            log::debug!(
                "{:.0} fps, {} particles, energy {:.0}%",
                snapshot.fps,
                snapshot.particles,
                snapshot.energy_level
            );
        }

        for event in self.simulation.drain_events() {
            match event {
                SimEvent::PresetActivated(preset) => self.panel.notify(preset.message(), now),
                SimEvent::Reset { particles } => log::debug!("Reset produced {} particles", particles),
                SimEvent::Paused | SimEvent::Resumed => {}
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);
        let scene = compose_scene(&self.simulation);
        let draw = self
            .renderer
            .update_scene(&self.ctx.device, &self.ctx.queue, &scene);

        // Build egui UI
        let now = self.now();
        let mut intents = Vec::new();
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            intents = self.panel.show(ctx, &self.simulation, now);
        });
        for intent in intents {
            self.simulation.push_intent(intent);
        }

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.config.width, self.ctx.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, draw);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        let config = self.simulation.config();
        let intent = match key {
            KeyCode::Space => Intent::TogglePause,
            KeyCode::KeyR => Intent::Reset,
            KeyCode::Digit1 => Intent::LoadPreset(Preset::Vortex),
            KeyCode::Digit2 => Intent::LoadPreset(Preset::Explosion),
            KeyCode::Digit3 => Intent::LoadPreset(Preset::Attractor),
            KeyCode::Digit4 => Intent::LoadPreset(Preset::Wave),
            KeyCode::KeyG => Intent::SetConfig(ConfigChange::ShowGrid(!config.show_grid)),
            KeyCode::KeyT => Intent::SetConfig(ConfigChange::ShowTrails(!config.show_trails)),
            KeyCode::KeyL => Intent::SetConfig(ConfigChange::ShowLines(!config.show_lines)),
            KeyCode::KeyC => Intent::SetConfig(ConfigChange::ColorMode(config.color_mode.next())),
            KeyCode::KeyF => {
                self.toggle_fullscreen();
                return;
            }
            _ => return,
        };
        self.simulation.push_intent(intent);
    }

    fn toggle_fullscreen(&self) {
        let window = &self.ctx.window;
        if window.fullscreen().is_some() {
            window.set_fullscreen(None);
        } else if window.current_monitor().is_some() {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        } else {
            log::warn!("Fullscreen unavailable: no monitor for this window");
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn load_config() -> SceneConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SceneConfig::default();
    };

    match SceneConfig::load(&path) {
        Ok(config) => {
            log::info!("Loaded scene config from {}", path);
            config
        }
        Err(e) => {
            log::warn!("Could not load {}: {}; using defaults", path, e);
            SceneConfig::default()
        }
    }
}

fn main() {
    let (ctx, event_loop) = match pollster::block_on(GraphicsContext::new("Particle Lab", 1280, 720)) {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("Graphics setup failed: {}", e);
            std::process::exit(1);
        }
    };

    let config = load_config();
    let mut app = App::new(ctx, config);

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, .. } => {
                    let consumed = app.handle_window_event(event);

                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::RedrawRequested => {
                            app.update();
                            if !app.ctx.is_drawable() {
                                return;
                            }
                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    app.resize(app.ctx.size)
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => log::error!("Render error: {:?}", e),
                            }
                        }
                        // A drag that ends over the panel must still release the pointer
                        WindowEvent::MouseInput {
                            state: ElementState::Released,
                            button: MouseButton::Left,
                            ..
                        } => app.simulation.push_intent(Intent::PointerUp),
                        _ if consumed => {}
                        WindowEvent::CursorMoved { position, .. } => {
                            app.cursor = Vec2::new(position.x as f32, position.y as f32);
                            app.simulation.push_intent(Intent::PointerMove(app.cursor));
                        }
                        WindowEvent::MouseInput {
                            state: ElementState::Pressed,
                            button: MouseButton::Left,
                            ..
                        } => app.simulation.push_intent(Intent::PointerDown(app.cursor)),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    ..
                                },
                            ..
                        } => app.handle_key(*key, *state),
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
