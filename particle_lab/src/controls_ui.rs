//! Control panel UI for the particle playground
//!
//! The panel never edits the simulation directly: every widget change becomes
//! an [`Intent`] that the caller queues for the next frame.

use egui::{Color32, Context, RichText};

use particle_lab::config::{
    ConfigChange, DAMPING_RANGE, GRAVITY_RANGE, LINK_DISTANCE_RANGE, MAX_TRAIL_LENGTH, MAX_WARMUP_FRAMES,
    PARTICLE_CAP_LIMIT, PARTICLE_SIZE_RANGE, RESTITUTION_RANGE, SPEED_RANGE,
};
use particle_lab::telemetry::format_uptime;
use particle_lab::{ColorMode, Intent, Preset, Simulation};

/// How long a notification stays up, in seconds
const TOAST_LIFETIME: f64 = 3.0;
/// The toast starts fading after this many seconds
const TOAST_FADE_START: f64 = 1.0;

const ACCENT: Color32 = Color32::from_rgb(96, 165, 250);

struct Toast {
    message: String,
    shown_at: f64,
}

#[derive(Default)]
pub struct ControlPanel {
    toast: Option<Toast>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a transient centered message
    pub fn notify(&mut self, message: impl Into<String>, now: f64) {
        self.toast = Some(Toast {
            message: message.into(),
            shown_at: now,
        });
    }

    /// Draw the panel and return the intents produced by this frame's input
    pub fn show(&mut self, ctx: &Context, sim: &Simulation, now: f64) -> Vec<Intent> {
        let mut intents = Vec::new();

        egui::SidePanel::right("controls_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading(RichText::new("Particle Lab").color(Color32::LIGHT_BLUE));
                ui.separator();

                egui::ScrollArea::vertical().show(ui, |ui| {
                    draw_run_controls(ui, sim, &mut intents);
                    ui.add_space(8.0);
                    draw_presets(ui, sim, &mut intents);
                    ui.add_space(8.0);
                    draw_settings(ui, sim, &mut intents);
                    ui.add_space(8.0);
                    draw_telemetry(ui, sim);
                });
            });

        self.draw_toast(ctx, now);
        intents
    }

    fn draw_toast(&mut self, ctx: &Context, now: f64) {
        let Some(toast) = &self.toast else {
            return;
        };

        let age = now - toast.shown_at;
        if !(0.0..TOAST_LIFETIME).contains(&age) {
            self.toast = None;
            return;
        }

        let opacity = if age < TOAST_FADE_START {
            1.0
        } else {
            (1.0 - (age - TOAST_FADE_START) / (TOAST_LIFETIME - TOAST_FADE_START)) as f32
        };

        egui::Area::new(egui::Id::new("preset_toast"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(Color32::from_rgba_unmultiplied(30, 41, 59, 230).gamma_multiply(opacity))
                    .rounding(12.0)
                    .inner_margin(egui::Margin::symmetric(32.0, 16.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(&toast.message)
                                .size(20.0)
                                .color(ACCENT.gamma_multiply(opacity)),
                        );
                    });
            });
    }
}

fn draw_run_controls(ui: &mut egui::Ui, sim: &Simulation, intents: &mut Vec<Intent>) {
    ui.horizontal(|ui| {
        let label = if sim.is_running() { "⏸ Pause" } else { "▶ Resume" };
        if ui.button(label).clicked() {
            intents.push(Intent::TogglePause);
        }
        if ui.button("⟲ Reset").clicked() {
            intents.push(Intent::Reset);
        }
        if !sim.is_running() {
            ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
        }
    });
}

fn draw_presets(ui: &mut egui::Ui, sim: &Simulation, intents: &mut Vec<Intent>) {
    ui.collapsing(RichText::new("🧪 Experiments").strong(), |ui| {
        ui.horizontal_wrapped(|ui| {
            for preset in Preset::ALL {
                let active = sim.active_preset() == Some(preset);
                if ui.selectable_label(active, preset.name()).clicked() {
                    intents.push(Intent::LoadPreset(preset));
                }
            }
        });
    });
}

fn draw_settings(ui: &mut egui::Ui, sim: &Simulation, intents: &mut Vec<Intent>) {
    let config = sim.config();

    ui.collapsing(RichText::new("⚙ Settings").strong(), |ui| {
        let mut gravity = config.gravity;
        if ui
            .add(egui::Slider::new(&mut gravity, GRAVITY_RANGE.0..=GRAVITY_RANGE.1).text("Gravity"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::Gravity(gravity)));
        }

        let mut damping = config.damping;
        if ui
            .add(egui::Slider::new(&mut damping, DAMPING_RANGE.0..=DAMPING_RANGE.1).text("Damping"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::Damping(damping)));
        }

        let mut speed = config.speed;
        if ui
            .add(egui::Slider::new(&mut speed, SPEED_RANGE.0..=SPEED_RANGE.1).text("Speed"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::Speed(speed)));
        }

        let mut restitution = config.restitution;
        if ui
            .add(egui::Slider::new(&mut restitution, RESTITUTION_RANGE.0..=RESTITUTION_RANGE.1).text("Bounce"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::Restitution(restitution)));
        }

        let mut size = config.particle_size;
        if ui
            .add(egui::Slider::new(&mut size, PARTICLE_SIZE_RANGE.0..=PARTICLE_SIZE_RANGE.1).text("Particle size"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::ParticleSize(size)));
        }

        let mut count = config.particle_count;
        if ui
            .add(egui::Slider::new(&mut count, 0..=config.max_particles).text("Particles"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::ParticleCount(count as i64)));
        }

        let mut cap = config.max_particles;
        if ui
            .add(egui::Slider::new(&mut cap, 1..=PARTICLE_CAP_LIMIT).text("Max particles"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::MaxParticles(cap as i64)));
        }

        let mut trail = config.trail_length;
        if ui
            .add(egui::Slider::new(&mut trail, 0..=MAX_TRAIL_LENGTH).text("Trail length"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::TrailLength(trail as i64)));
        }

        let mut link = config.link_distance;
        if ui
            .add(egui::Slider::new(&mut link, LINK_DISTANCE_RANGE.0..=LINK_DISTANCE_RANGE.1).text("Link distance"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::LinkDistance(link)));
        }

        let mut warmup = config.warmup_frames;
        if ui
            .add(egui::Slider::new(&mut warmup, 0..=MAX_WARMUP_FRAMES).text("Warmup frames"))
            .changed()
        {
            intents.push(Intent::SetConfig(ConfigChange::WarmupFrames(i64::from(warmup))));
        }

        ui.separator();

        let mut show_trails = config.show_trails;
        if ui.checkbox(&mut show_trails, "Trails").changed() {
            intents.push(Intent::SetConfig(ConfigChange::ShowTrails(show_trails)));
        }
        let mut show_lines = config.show_lines;
        if ui.checkbox(&mut show_lines, "Proximity lines").changed() {
            intents.push(Intent::SetConfig(ConfigChange::ShowLines(show_lines)));
        }
        let mut show_grid = config.show_grid;
        if ui.checkbox(&mut show_grid, "Grid").changed() {
            intents.push(Intent::SetConfig(ConfigChange::ShowGrid(show_grid)));
        }

        let mut color_mode = config.color_mode;
        egui::ComboBox::from_label("Colors")
            .selected_text(color_mode.name())
            .show_ui(ui, |ui| {
                for mode in ColorMode::ALL {
                    ui.selectable_value(&mut color_mode, mode, mode.name());
                }
            });
        if color_mode != config.color_mode {
            intents.push(Intent::SetConfig(ConfigChange::ColorMode(color_mode)));
        }
    });
}

fn draw_telemetry(ui: &mut egui::Ui, sim: &Simulation) {
    ui.collapsing(RichText::new("📊 Telemetry").strong(), |ui| {
        let Some(snapshot) = sim.telemetry() else {
            ui.label(RichText::new("Collecting…").italics());
            return;
        };

        egui::Grid::new("telemetry_grid")
            .num_columns(2)
            .spacing([10.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("FPS").monospace().color(Color32::LIGHT_GREEN));
                ui.label(format!("{:.0}", snapshot.fps));
                ui.end_row();

                ui.label(RichText::new("Particles").monospace().color(Color32::LIGHT_GREEN));
                ui.label(format!("{}", snapshot.particles));
                ui.end_row();

                ui.label(RichText::new("Kinetic").monospace().color(Color32::LIGHT_GREEN));
                ui.label(format!("{:.0}", snapshot.kinetic_energy));
                ui.end_row();

                ui.label(RichText::new("Uptime").monospace().color(Color32::LIGHT_GREEN));
                ui.label(format_uptime(snapshot.uptime));
                ui.end_row();
            });

        ui.add(
            egui::ProgressBar::new(snapshot.energy_level / 100.0)
                .text(format!("Energy {:.0}%", snapshot.energy_level)),
        );
    });
}
