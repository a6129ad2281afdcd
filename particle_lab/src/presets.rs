//! Experiment presets: one-shot transforms that replace the whole population
//! with a geometric pattern
//!
//! Each builder is a pure function of the canvas extent, the particle count,
//! the palette and the random source. None of them look at the previous
//! population.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::Rng;

use crate::config::SceneConfig;
use crate::error::SimError;
use crate::palette::ColorMode;
use crate::particle::{random_population, Particle, VELOCITY_UNIT};
use crate::physics::{confine, is_degenerate, Attractor};

pub const VORTEX_COUNT: usize = 300;
pub const VORTEX_RADIUS: (f32, f32) = (100.0, 300.0);
/// Tangential speed in frame units
pub const VORTEX_SPEED: f32 = 2.0;

pub const BURST_COUNT: usize = 100;
/// Speed range in frame units
pub const BURST_SPEED: (f32, f32) = (5.0, 15.0);
pub const BURST_RADIUS: (f32, f32) = (2.0, 6.0);
pub const BURST_DECAY: f32 = 0.002;

pub const ATTRACTOR_STRENGTH: f32 = 0.5;

pub const WAVE_SPACING: f32 = 20.0;
/// Spatial frequency of the vertical velocity profile, per canvas unit
pub const WAVE_FREQUENCY: f32 = 0.05;
/// Peak vertical speed in frame units
pub const WAVE_AMPLITUDE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Vortex,
    Explosion,
    Attractor,
    Wave,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Vortex, Preset::Explosion, Preset::Attractor, Preset::Wave];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Vortex => "vortex",
            Preset::Explosion => "explosion",
            Preset::Attractor => "attractor",
            Preset::Wave => "wave",
        }
    }

    /// Short line shown by the host when the preset fires
    pub fn message(&self) -> &'static str {
        match self {
            Preset::Vortex => "Vortex field active: particles circle the center",
            Preset::Explosion => "Burst triggered: watch the energy disperse",
            Preset::Attractor => "Attractor placed: particles are drawn in",
            Preset::Wave => "Wave field generated: watch it propagate",
        }
    }

    /// How many particles this preset asks for before the hard cap applies
    pub fn requested_count(&self, config: &SceneConfig) -> usize {
        match self {
            Preset::Vortex => VORTEX_COUNT,
            Preset::Explosion => BURST_COUNT,
            Preset::Attractor => config.particle_count,
            Preset::Wave => config.max_particles,
        }
    }

    /// Build the replacement population (and attractors) for this preset
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R, extent: Vec2, config: &SceneConfig) -> Population {
        let count = self.requested_count(config).min(config.max_particles);
        let palette = config.color_mode;

        match self {
            Preset::Vortex => Population::particles(vortex(rng, extent, count, palette)),
            Preset::Explosion => Population::particles(radial_burst(rng, extent, count, palette, BURST_SPEED)),
            Preset::Attractor => {
                if is_degenerate(extent) {
                    return Population::default();
                }
                Population {
                    particles: random_population(rng, extent, count, config),
                    attractors: vec![Attractor::new(extent * 0.5, ATTRACTOR_STRENGTH)],
                }
            }
            Preset::Wave => Population::particles(grid_wave(rng, extent, count, palette)),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vortex" => Ok(Preset::Vortex),
            "explosion" => Ok(Preset::Explosion),
            "attractor" => Ok(Preset::Attractor),
            "wave" => Ok(Preset::Wave),
            _ => Err(SimError::UnknownPreset { name: s.to_string() }),
        }
    }
}

/// Output of a preset
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub particles: Vec<Particle>,
    pub attractors: Vec<Attractor>,
}

impl Population {
    fn particles(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            attractors: Vec::new(),
        }
    }
}

/// Ring of particles around the center with tangential velocity
pub fn vortex<R: Rng + ?Sized>(rng: &mut R, extent: Vec2, count: usize, palette: ColorMode) -> Vec<Particle> {
    if is_degenerate(extent) {
        return Vec::new();
    }

    let center = extent * 0.5;
    let (min_radius, max_radius) = VORTEX_RADIUS;

    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            let ring = min_radius + rng.gen::<f32>() * (max_radius - min_radius);
            let direction = Vec2::new(angle.cos(), angle.sin());
            let tangent = direction.perp();

            let mut particle = Particle::new(
                center + direction * ring,
                tangent * VORTEX_SPEED * VELOCITY_UNIT,
                3.0,
                palette.pick(rng),
                30,
                0.0001,
            );
            confine(&mut particle, extent, 1.0);
            particle
        })
        .collect()
}

/// Every particle starts at the center and flies outward in a random
/// direction with a speed drawn from `speed` (frame units)
pub fn radial_burst<R: Rng + ?Sized>(
    rng: &mut R,
    extent: Vec2,
    count: usize,
    palette: ColorMode,
    speed: (f32, f32),
) -> Vec<Particle> {
    if is_degenerate(extent) {
        return Vec::new();
    }

    let center = extent * 0.5;
    let (min_speed, max_speed) = if speed.0 <= speed.1 { speed } else { (speed.1, speed.0) };
    let (min_radius, max_radius) = BURST_RADIUS;

    (0..count)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            let magnitude = min_speed + rng.gen::<f32>() * (max_speed - min_speed);
            let radius = min_radius + rng.gen::<f32>() * (max_radius - min_radius);

            let mut particle = Particle::new(
                center,
                Vec2::from_angle(angle) * magnitude * VELOCITY_UNIT,
                radius,
                palette.pick(rng),
                20,
                BURST_DECAY,
            );
            confine(&mut particle, extent, 1.0);
            particle
        })
        .collect()
}

/// Fixed-spacing grid with a sinusoidal vertical velocity profile.
///
/// The spacing widens when the canvas would need more than `count` cells.
pub fn grid_wave<R: Rng + ?Sized>(rng: &mut R, extent: Vec2, count: usize, palette: ColorMode) -> Vec<Particle> {
    if is_degenerate(extent) || count == 0 {
        return Vec::new();
    }

    let spacing = WAVE_SPACING.max((extent.x * extent.y / count as f32).sqrt());
    let mut particles = Vec::with_capacity(count);

    let mut x = spacing * 0.5;
    'columns: while x < extent.x {
        let mut y = spacing * 0.5;
        while y < extent.y {
            if particles.len() == count {
                break 'columns;
            }

            let velocity = Vec2::new(0.0, (x * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE * VELOCITY_UNIT);
            let mut particle = Particle::new(Vec2::new(x, y), velocity, 2.0, palette.pick(rng), 10, 0.00005);
            confine(&mut particle, extent, 1.0);
            particles.push(particle);

            y += spacing;
        }
        x += spacing;
    }

    particles
}
