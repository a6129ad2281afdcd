//! Particle record and the factories that spawn free-roaming particles

use glam::Vec2;
use rand::Rng;

use crate::config::SceneConfig;
use crate::palette::Rgba;
use crate::trail::Trail;

/// Canvas units per second that correspond to one unit of "per-frame" speed.
/// Preset and spawn speeds are tuned in frame units.
pub const VELOCITY_UNIT: f32 = 16.0;

/// Decay rate range for default-population particles
pub const RANDOM_DECAY_RANGE: (f32, f32) = (0.0001, 0.0006);
/// Decay rate of particles injected at the pointer
pub const POINTER_DECAY: f32 = 0.0002;
/// Per-axis velocity spread of pointer-injected particles, in frame units
pub const POINTER_SPEED: f32 = 2.0;

/// A point mass with visual state
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    /// Canvas units per second
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Rgba,
    pub trail: Trail,
    /// Remaining life in (0, 1]
    pub life: f32,
    /// Life lost per update step
    pub decay: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Rgba, max_trail: usize, decay: f32) -> Self {
        Self {
            position,
            velocity,
            radius: radius.max(f32::EPSILON),
            color,
            trail: Trail::new(max_trail),
            life: 1.0,
            decay: decay.max(f32::EPSILON),
        }
    }

    /// Default-population particle: anywhere on the canvas, drifting slowly
    pub fn random<R: Rng + ?Sized>(rng: &mut R, extent: Vec2, config: &SceneConfig) -> Self {
        let position = Vec2::new(rng.gen::<f32>() * extent.x, rng.gen::<f32>() * extent.y);
        let spread = config.speed * VELOCITY_UNIT;
        let velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * 2.0 * spread,
            (rng.gen::<f32>() - 0.5) * 2.0 * spread,
        );
        let (min_decay, max_decay) = RANDOM_DECAY_RANGE;
        let decay = min_decay + rng.gen::<f32>() * (max_decay - min_decay);

        Self::new(
            position,
            velocity,
            config.particle_size,
            config.color_mode.pick(rng),
            config.trail_length,
            decay,
        )
    }

    /// Particle injected by a pointer press
    pub fn at_pointer<R: Rng + ?Sized>(rng: &mut R, position: Vec2, config: &SceneConfig) -> Self {
        let spread = POINTER_SPEED * VELOCITY_UNIT;
        let velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * 2.0 * spread,
            (rng.gen::<f32>() - 0.5) * 2.0 * spread,
        );

        Self::new(
            position,
            velocity,
            config.particle_size,
            config.color_mode.pick(rng),
            config.trail_length,
            POINTER_DECAY,
        )
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.velocity.length_squared()
    }
}

/// Spawn `count` default-population particles
pub fn random_population<R: Rng + ?Sized>(
    rng: &mut R,
    extent: Vec2,
    count: usize,
    config: &SceneConfig,
) -> Vec<Particle> {
    (0..count).map(|_| Particle::random(rng, extent, config)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_particle_starts_fresh_inside_canvas() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = SceneConfig::default();
        let extent = Vec2::new(640.0, 480.0);

        for _ in 0..200 {
            let p = Particle::random(&mut rng, extent, &config);
            assert_eq!(p.life, 1.0);
            assert!(p.trail.is_empty());
            assert!(p.position.x >= 0.0 && p.position.x <= extent.x);
            assert!(p.position.y >= 0.0 && p.position.y <= extent.y);
            assert!(p.velocity.x.abs() <= config.speed * VELOCITY_UNIT);
            assert!(p.decay >= RANDOM_DECAY_RANGE.0 && p.decay <= RANDOM_DECAY_RANGE.1);
            assert_eq!(p.trail.capacity(), config.trail_length);
        }
    }

    #[test]
    fn pointer_particle_spawns_at_pointer() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = SceneConfig::default();
        let p = Particle::at_pointer(&mut rng, Vec2::new(12.0, 34.0), &config);
        assert_eq!(p.position, Vec2::new(12.0, 34.0));
        assert_eq!(p.decay, POINTER_DECAY);
        assert!(p.velocity.abs().max_element() <= POINTER_SPEED * VELOCITY_UNIT);
    }

    #[test]
    fn radius_and_decay_stay_positive() {
        let p = Particle::new(Vec2::ZERO, Vec2::ZERO, 0.0, [1.0; 4], 5, -1.0);
        assert!(p.radius > 0.0);
        assert!(p.decay > 0.0);
    }
}
