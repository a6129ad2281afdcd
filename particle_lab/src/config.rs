//! Scene configuration: the process-wide tunables read every frame
//!
//! Values coming from collaborators (sliders, config files, text commands)
//! are clamped to their valid range rather than rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::palette::ColorMode;

/// Absolute ceiling for the particle hard cap
pub const PARTICLE_CAP_LIMIT: usize = 2000;
/// Longest trail history a particle may keep
pub const MAX_TRAIL_LENGTH: usize = 100;

pub const GRAVITY_RANGE: (f32, f32) = (0.0, 5.0);
pub const DAMPING_RANGE: (f32, f32) = (0.0, 1.0);
pub const SPEED_RANGE: (f32, f32) = (0.1, 5.0);
pub const PARTICLE_SIZE_RANGE: (f32, f32) = (0.5, 20.0);
pub const RESTITUTION_RANGE: (f32, f32) = (0.0, 1.0);
pub const LINK_DISTANCE_RANGE: (f32, f32) = (0.0, 500.0);
pub const MAX_WARMUP_FRAMES: u32 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Strength of the pull toward the canvas center
    pub gravity: f32,
    /// Per-step velocity multiplier
    pub damping: f32,
    /// Scale applied to the initial velocity of spawned particles
    pub speed: f32,
    pub trail_length: usize,
    /// Size of the default population seeded on reset
    pub particle_count: usize,
    pub particle_size: f32,
    /// Hard cap on the live population
    pub max_particles: usize,
    /// Fraction of speed kept after bouncing off a wall
    pub restitution: f32,
    /// Distance under which two particles are linked by a line
    pub link_distance: f32,
    pub show_trails: bool,
    pub show_lines: bool,
    pub show_grid: bool,
    pub color_mode: ColorMode,
    /// Frames drawn without the optional layers after startup
    pub warmup_frames: u32,
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            damping: 0.99,
            speed: 1.0,
            trail_length: 20,
            particle_count: 500,
            particle_size: 3.0,
            max_particles: PARTICLE_CAP_LIMIT,
            restitution: 0.8,
            link_distance: 100.0,
            show_trails: true,
            show_lines: false,
            show_grid: true,
            color_mode: ColorMode::Rainbow,
            warmup_frames: 10,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Copy of this config with every field inside its valid range
    pub fn sanitized(mut self) -> Self {
        self.gravity = clamp_f32(self.gravity, GRAVITY_RANGE, 0.5);
        self.damping = clamp_f32(self.damping, DAMPING_RANGE, 0.99);
        self.speed = clamp_f32(self.speed, SPEED_RANGE, 1.0);
        self.particle_size = clamp_f32(self.particle_size, PARTICLE_SIZE_RANGE, 3.0);
        self.restitution = clamp_f32(self.restitution, RESTITUTION_RANGE, 0.8);
        self.link_distance = clamp_f32(self.link_distance, LINK_DISTANCE_RANGE, 100.0);
        self.trail_length = self.trail_length.min(MAX_TRAIL_LENGTH);
        self.max_particles = self.max_particles.clamp(1, PARTICLE_CAP_LIMIT);
        self.particle_count = self.particle_count.min(self.max_particles);
        self.warmup_frames = self.warmup_frames.min(MAX_WARMUP_FRAMES);
        self
    }

    /// Apply a single change, clamping it into range. Returns `true` when
    /// the requested value had to be adjusted.
    pub fn apply(&mut self, change: ConfigChange) -> bool {
        let before = self.clone();
        match change {
            ConfigChange::Gravity(v) => self.gravity = v,
            ConfigChange::Damping(v) => self.damping = v,
            ConfigChange::Speed(v) => self.speed = v,
            ConfigChange::TrailLength(v) => self.trail_length = clamp_count(v, MAX_TRAIL_LENGTH) as usize,
            ConfigChange::ParticleCount(v) => self.particle_count = clamp_count(v, PARTICLE_CAP_LIMIT) as usize,
            ConfigChange::ParticleSize(v) => self.particle_size = v,
            ConfigChange::MaxParticles(v) => self.max_particles = clamp_count(v, PARTICLE_CAP_LIMIT) as usize,
            ConfigChange::Restitution(v) => self.restitution = v,
            ConfigChange::LinkDistance(v) => self.link_distance = v,
            ConfigChange::ShowTrails(v) => self.show_trails = v,
            ConfigChange::ShowLines(v) => self.show_lines = v,
            ConfigChange::ShowGrid(v) => self.show_grid = v,
            ConfigChange::ColorMode(v) => self.color_mode = v,
            ConfigChange::WarmupFrames(v) => self.warmup_frames = clamp_count(v, MAX_WARMUP_FRAMES as usize) as u32,
        }
        let requested = self.clone();
        *self = requested.clone().sanitized();

        let clamped = *self != requested || change.count_out_of_range();
        if clamped {
            log::warn!("Config value {:?} clamped into range", change);
        } else if *self != before {
            log::debug!("Config updated: {:?}", change);
        }
        clamped
    }
}

/// Clamp a requested count in `i64` before narrowing it
fn clamp_count(value: i64, max: usize) -> i64 {
    value.clamp(0, max as i64)
}

fn clamp_f32(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// One `setConfig(option, value)` request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    Gravity(f32),
    Damping(f32),
    Speed(f32),
    TrailLength(i64),
    ParticleCount(i64),
    ParticleSize(f32),
    MaxParticles(i64),
    Restitution(f32),
    LinkDistance(f32),
    ShowTrails(bool),
    ShowLines(bool),
    ShowGrid(bool),
    ColorMode(ColorMode),
    WarmupFrames(i64),
}

impl ConfigChange {
    /// Parse a textual option/value pair, e.g. `("trailLength", "30")`.
    /// Option names accept camelCase, snake_case and kebab-case.
    pub fn parse(option: &str, value: &str) -> Result<Self, SimError> {
        let key: String = option
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        let invalid = || SimError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
        };
        let float = || value.trim().parse::<f32>().map_err(|_| invalid());
        let int = || value.trim().parse::<i64>().map_err(|_| invalid());
        let flag = || match value.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Ok(true),
            "false" | "off" | "0" | "no" => Ok(false),
            _ => Err(invalid()),
        };

        let change = match key.as_str() {
            "gravity" => ConfigChange::Gravity(float()?),
            "damping" => ConfigChange::Damping(float()?),
            "speed" | "particlespeed" => ConfigChange::Speed(float()?),
            "traillength" => ConfigChange::TrailLength(int()?),
            "particlecount" => ConfigChange::ParticleCount(int()?),
            "particlesize" => ConfigChange::ParticleSize(float()?),
            "maxparticles" => ConfigChange::MaxParticles(int()?),
            "restitution" | "bounce" => ConfigChange::Restitution(float()?),
            "linkdistance" => ConfigChange::LinkDistance(float()?),
            "showtrails" => ConfigChange::ShowTrails(flag()?),
            "showlines" => ConfigChange::ShowLines(flag()?),
            "showgrid" => ConfigChange::ShowGrid(flag()?),
            "colormode" => ConfigChange::ColorMode(value.parse()?),
            "warmupframes" => ConfigChange::WarmupFrames(int()?),
            _ => {
                return Err(SimError::UnknownOption {
                    option: option.to_string(),
                })
            }
        };
        Ok(change)
    }

    fn count_out_of_range(&self) -> bool {
        let (value, max) = match *self {
            ConfigChange::TrailLength(v) => (v, MAX_TRAIL_LENGTH),
            ConfigChange::ParticleCount(v) | ConfigChange::MaxParticles(v) => (v, PARTICLE_CAP_LIMIT),
            ConfigChange::WarmupFrames(v) => (v, MAX_WARMUP_FRAMES as usize),
            _ => return false,
        };
        clamp_count(value, max) != value
    }
}
