//! The simulation context: all state for one independent particle scene
//!
//! The host calls [`Simulation::frame`] once per display refresh. Each frame
//! first applies queued intents, then integrates physics, rebuilds the
//! proximity mesh and updates telemetry. Rendering reads the result through
//! [`crate::scene::compose_scene`] and never mutates it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SceneConfig;
use crate::intent::{Intent, Pointer, SimEvent};
use crate::mesh::{Link, MeshBuilder};
use crate::particle::{random_population, Particle};
use crate::physics::{self, Attractor, StepReport};
use crate::presets::Preset;
use crate::store::ParticleStore;
use crate::telemetry::{Telemetry, TelemetrySnapshot};

/// What a single call to [`Simulation::frame`] did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Seconds integrated this frame (0 while paused)
    pub dt: f32,
    pub step: StepReport,
    pub telemetry: Option<TelemetrySnapshot>,
}

pub struct Simulation {
    config: SceneConfig,
    extent: Vec2,
    store: ParticleStore,
    attractors: Vec<Attractor>,
    pointer: Pointer,
    intents: VecDeque<Intent>,
    events: Vec<SimEvent>,
    rng: StdRng,
    mesh: MeshBuilder,
    telemetry: Telemetry,
    running: bool,
    last_timestamp: Option<f64>,
    frame_count: u64,
    clock: f32,
    active_preset: Option<Preset>,
}

impl Simulation {
    /// Create a scene on a canvas of `extent` pixels and seed the default
    /// population. On a zero-sized canvas the seeding waits for the first
    /// frame with a usable extent.
    pub fn new(config: SceneConfig, extent: Vec2) -> Self {
        let config = config.sanitized();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut sim = Self {
            config,
            extent,
            store: ParticleStore::new(),
            attractors: Vec::new(),
            pointer: Pointer::default(),
            intents: VecDeque::new(),
            events: Vec::new(),
            rng,
            mesh: MeshBuilder::new(),
            telemetry: Telemetry::new(),
            running: true,
            last_timestamp: None,
            frame_count: 0,
            clock: 0.0,
            active_preset: None,
        };

        if physics::is_degenerate(extent) {
            sim.intents.push_back(Intent::Reset);
        } else {
            sim.reseed();
        }
        sim
    }

    /// Queue a request; it takes effect at the start of the next frame
    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push_back(intent);
    }

    /// Run one frame at host timestamp `now` (seconds, monotonic)
    pub fn frame(&mut self, now: f64) -> FrameReport {
        self.apply_intents(now);

        let elapsed = match self.last_timestamp {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last_timestamp = Some(now);

        let mut report = FrameReport::default();
        if self.running {
            report.dt = physics::clamp_delta(elapsed);
            report.step = physics::step(&mut self.store, self.extent, &self.attractors, &self.config, report.dt);
            self.clock += report.dt;
        }

        self.frame_count += 1;
        // Warmup frames never draw the mesh, so skip the pairwise scan
        if self.config.show_lines && !self.in_warmup() {
            let positions = self.store.positions();
            self.mesh.rebuild(&positions, self.config.link_distance);
        } else {
            self.mesh.clear();
        }

        report.telemetry = self
            .telemetry
            .record_frame(elapsed, self.store.len(), self.store.kinetic_energy());
        report
    }

    fn apply_intents(&mut self, now: f64) {
        let pending = std::mem::take(&mut self.intents);
        let mut deferred = VecDeque::new();
        for intent in pending {
            if intent.needs_canvas() && physics::is_degenerate(self.extent) {
                deferred.push_back(intent);
            } else {
                self.apply(intent, now);
            }
        }

        // A resize later in the queue may have made the canvas usable
        if !deferred.is_empty() && !physics::is_degenerate(self.extent) {
            for intent in deferred.drain(..) {
                self.apply(intent, now);
            }
        }
        self.intents = deferred;
    }

    fn apply(&mut self, intent: Intent, now: f64) {
        match intent {
            Intent::PointerMove(position) => self.pointer.position = position,
            Intent::PointerDown(position) => {
                self.pointer = Pointer { position, held: true };
                let particle = Particle::at_pointer(&mut self.rng, position, &self.config);
                // At the cap the press still moves the pointer, it just adds nothing
                self.store.insert(particle, self.config.max_particles);
            }
            Intent::PointerUp => self.pointer.held = false,
            Intent::TogglePause => self.toggle_pause(now),
            Intent::Reset => {
                if !self.running {
                    self.toggle_pause(now);
                }
                self.reseed();
            }
            Intent::LoadPreset(preset) => self.load_preset(preset),
            Intent::SetConfig(change) => {
                self.config.apply(change);
                self.store.truncate(self.config.max_particles);
            }
            Intent::Resize(extent) => {
                log::debug!("Canvas resized to {}x{}", extent.x, extent.y);
                self.extent = extent;
            }
        }
    }

    fn toggle_pause(&mut self, now: f64) {
        self.running = !self.running;
        if self.running {
            // Restart the clock so the pause does not show up as one huge step
            self.last_timestamp = Some(now);
            self.events.push(SimEvent::Resumed);
        } else {
            self.events.push(SimEvent::Paused);
        }
        log::info!("Simulation {}", if self.running { "resumed" } else { "paused" });
    }

    fn reseed(&mut self) {
        let particles = random_population(&mut self.rng, self.extent, self.config.particle_count, &self.config);
        self.store.replace(particles, self.config.max_particles);
        self.attractors.clear();
        self.mesh.clear();
        self.active_preset = None;

        log::info!("Scene reset with {} particles", self.store.len());
        self.events.push(SimEvent::Reset {
            particles: self.store.len(),
        });
    }

    fn load_preset(&mut self, preset: Preset) {
        let population = preset.build(&mut self.rng, self.extent, &self.config);
        self.store.replace(population.particles, self.config.max_particles);
        self.attractors = population.attractors;
        self.mesh.clear();
        self.active_preset = Some(preset);

        log::info!("Preset '{}' activated with {} particles", preset, self.store.len());
        self.events.push(SimEvent::PresetActivated(preset));
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Proximity mesh from the last frame (empty when lines are off)
    pub fn links(&self) -> &[Link] {
        self.mesh.links()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Simulated seconds, advancing only while running
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// The first few frames skip the optional visual layers
    pub fn in_warmup(&self) -> bool {
        self.frame_count < u64::from(self.config.warmup_frames)
    }

    pub fn active_preset(&self) -> Option<Preset> {
        self.active_preset
    }

    pub fn telemetry(&self) -> Option<TelemetrySnapshot> {
        self.telemetry.latest()
    }

    pub fn pending_intents(&self) -> usize {
        self.intents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigChange;

    fn seeded(seed: u64) -> SceneConfig {
        SceneConfig {
            seed: Some(seed),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn new_scene_seeds_default_population() {
        let sim = Simulation::new(seeded(1), Vec2::new(800.0, 600.0));
        assert_eq!(sim.particles().len(), SceneConfig::default().particle_count);
        assert!(sim.particles().iter().all(|p| p.life == 1.0 && p.trail.is_empty()));
    }

    #[test]
    fn intents_wait_for_next_frame() {
        let mut sim = Simulation::new(seeded(2), Vec2::new(800.0, 600.0));
        assert_eq!(sim.drain_events(), vec![SimEvent::Reset { particles: 500 }]);
        sim.push_intent(Intent::LoadPreset(Preset::Explosion));
        assert_eq!(sim.particles().len(), 500);

        sim.frame(0.0);
        assert_eq!(sim.particles().len(), 100);
        assert_eq!(sim.drain_events(), vec![SimEvent::PresetActivated(Preset::Explosion)]);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn pointer_press_injects_until_cap() {
        let config = SceneConfig {
            max_particles: 3,
            particle_count: 1,
            ..seeded(3)
        };
        let mut sim = Simulation::new(config, Vec2::new(400.0, 400.0));
        for _ in 0..5 {
            sim.push_intent(Intent::PointerDown(Vec2::new(100.0, 100.0)));
        }
        sim.frame(0.0);
        assert_eq!(sim.particles().len(), 3);
        assert!(sim.pointer().held);

        sim.push_intent(Intent::PointerUp);
        sim.frame(0.016);
        assert!(!sim.pointer().held);
    }

    #[test]
    fn zero_canvas_defers_population_until_resized() {
        let mut sim = Simulation::new(seeded(4), Vec2::ZERO);
        sim.push_intent(Intent::LoadPreset(Preset::Vortex));
        sim.frame(0.0);
        assert!(sim.particles().is_empty());
        assert_eq!(sim.pending_intents(), 2);

        sim.push_intent(Intent::Resize(Vec2::new(1000.0, 800.0)));
        sim.frame(0.016);
        assert_eq!(sim.pending_intents(), 0);
        assert_eq!(sim.active_preset(), Some(Preset::Vortex));
        assert_eq!(sim.particles().len(), crate::presets::VORTEX_COUNT);
    }

    #[test]
    fn lowering_the_cap_trims_population() {
        let mut sim = Simulation::new(seeded(5), Vec2::new(800.0, 600.0));
        sim.push_intent(Intent::SetConfig(ConfigChange::MaxParticles(120)));
        sim.frame(0.0);
        assert_eq!(sim.particles().len(), 120);
    }

    #[test]
    fn mesh_only_built_when_lines_enabled() {
        let config = SceneConfig {
            warmup_frames: 0,
            ..seeded(6)
        };
        let mut sim = Simulation::new(config, Vec2::new(300.0, 300.0));
        sim.frame(0.0);
        assert!(sim.links().is_empty());

        sim.push_intent(Intent::SetConfig(ConfigChange::ShowLines(true)));
        sim.frame(0.016);
        assert!(!sim.links().is_empty());
    }

    #[test]
    fn warmup_ends_after_configured_frames() {
        let config = SceneConfig {
            warmup_frames: 3,
            ..seeded(7)
        };
        let mut sim = Simulation::new(config, Vec2::new(300.0, 300.0));
        assert!(sim.in_warmup());
        for i in 0..3 {
            sim.frame(i as f64 * 0.016);
        }
        assert!(!sim.in_warmup());
    }

    #[test]
    fn mesh_waits_for_warmup_to_finish() {
        let config = SceneConfig {
            warmup_frames: 2,
            show_lines: true,
            ..seeded(11)
        };
        let mut sim = Simulation::new(config, Vec2::new(300.0, 300.0));
        sim.frame(0.0);
        assert!(sim.in_warmup());
        assert!(sim.links().is_empty());

        sim.frame(0.016);
        assert!(!sim.in_warmup());
        assert!(!sim.links().is_empty());
    }

    #[test]
    fn reset_while_paused_resumes_and_says_so() {
        let mut sim = Simulation::new(seeded(12), Vec2::new(300.0, 300.0));
        sim.frame(0.0);
        sim.push_intent(Intent::TogglePause);
        sim.frame(0.016);
        sim.drain_events();

        sim.push_intent(Intent::Reset);
        let report = sim.frame(10.0);
        assert!(sim.is_running());
        assert!(report.dt < 0.001);

        let events = sim.drain_events();
        assert_eq!(events.first(), Some(&SimEvent::Resumed));
        assert!(matches!(events.get(1), Some(SimEvent::Reset { .. })));
    }

    #[test]
    fn reset_while_running_emits_no_resume() {
        let mut sim = Simulation::new(seeded(13), Vec2::new(300.0, 300.0));
        sim.drain_events();
        sim.push_intent(Intent::Reset);
        sim.frame(0.0);
        assert!(!sim.drain_events().contains(&SimEvent::Resumed));
    }

    #[test]
    fn preset_clears_previous_attractors() {
        let mut sim = Simulation::new(seeded(8), Vec2::new(800.0, 600.0));
        sim.push_intent(Intent::LoadPreset(Preset::Attractor));
        sim.frame(0.0);
        assert_eq!(sim.attractors().len(), 1);

        sim.push_intent(Intent::LoadPreset(Preset::Wave));
        sim.frame(0.016);
        assert!(sim.attractors().is_empty());
    }
}
