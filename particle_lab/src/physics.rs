//! Particle integrator: life decay, trail sampling, central pull, damping
//! and elastic wall collisions
//!
//! The pull has constant magnitude (no inverse-square falloff), and the
//! integrator does not conserve energy.

use glam::Vec2;

use crate::config::SceneConfig;
use crate::particle::{Particle, VELOCITY_UNIT};
use crate::store::ParticleStore;

/// Longest time step integrated in one frame; longer gaps (a hidden window,
/// a debugger pause) are cut down to this.
pub const MAX_FRAME_DELTA: f32 = 1.0 / 15.0;

/// Velocity change per step for a pull of unit strength
pub const CENTRAL_FORCE: f32 = 0.01 * VELOCITY_UNIT;

/// A point that pulls every particle toward itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    pub position: Vec2,
    pub strength: f32,
}

impl Attractor {
    pub fn new(position: Vec2, strength: f32) -> Self {
        Self { position, strength }
    }
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles whose life ran out and were removed
    pub expired: usize,
    /// Wall contacts resolved this step
    pub bounces: usize,
}

/// Clamp a raw frame delta into `[0, MAX_FRAME_DELTA]`
pub fn clamp_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_FRAME_DELTA)
    } else {
        0.0
    }
}

pub fn is_degenerate(extent: Vec2) -> bool {
    !(extent.x > 0.0 && extent.y > 0.0 && extent.is_finite())
}

/// Advance every particle by `dt` seconds in place and drop the ones that died.
///
/// Does nothing while the canvas has no area.
pub fn step(
    store: &mut ParticleStore,
    extent: Vec2,
    attractors: &[Attractor],
    config: &SceneConfig,
    dt: f32,
) -> StepReport {
    let mut report = StepReport::default();
    if is_degenerate(extent) {
        return report;
    }

    let dt = clamp_delta(dt);
    let center = extent * 0.5;
    let pull = config.gravity * CENTRAL_FORCE;

    for particle in store.iter_mut() {
        particle.life -= particle.decay;
        if particle.life <= 0.0 {
            continue;
        }

        particle.trail.record(particle.position, particle.life, config.trail_length);

        particle.velocity += pull_toward(particle.position, center, pull);
        for attractor in attractors {
            particle.velocity +=
                pull_toward(particle.position, attractor.position, attractor.strength * CENTRAL_FORCE);
        }

        particle.velocity *= config.damping;
        particle.position += particle.velocity * dt;

        if confine(particle, extent, config.restitution) {
            report.bounces += 1;
        }
    }

    report.expired = store.remove_dead();
    report
}

/// Constant-magnitude pull from `from` toward `target`; zero when the two coincide
fn pull_toward(from: Vec2, target: Vec2, magnitude: f32) -> Vec2 {
    let offset = target - from;
    let distance = offset.length();
    if distance > 0.0 {
        offset / distance * magnitude
    } else {
        Vec2::ZERO
    }
}

/// Keep a particle inside `[radius, extent - radius]` on both axes, reflecting
/// the velocity component that hit a wall and scaling it by `restitution`.
/// Returns whether any wall was touched.
pub fn confine(particle: &mut Particle, extent: Vec2, restitution: f32) -> bool {
    let radius = particle.radius;
    let hit_x = reflect_axis(&mut particle.position.x, &mut particle.velocity.x, radius, extent.x, restitution);
    let hit_y = reflect_axis(&mut particle.position.y, &mut particle.velocity.y, radius, extent.y, restitution);
    hit_x || hit_y
}

fn reflect_axis(position: &mut f32, velocity: &mut f32, radius: f32, extent: f32, restitution: f32) -> bool {
    let low = radius;
    let high = extent - radius;

    // Particle wider than the canvas: park it in the middle
    if low > high {
        *position = extent * 0.5;
        *velocity = 0.0;
        return true;
    }

    if *position < low {
        *position = low;
        *velocity = velocity.abs() * restitution;
        true
    } else if *position > high {
        *position = high;
        *velocity = -velocity.abs() * restitution;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::random_population;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn particle(position: Vec2, velocity: Vec2) -> Particle {
        Particle::new(position, velocity, 3.0, [1.0; 4], 10, 0.001)
    }

    fn store_of(particles: Vec<Particle>) -> ParticleStore {
        let mut store = ParticleStore::new();
        store.replace(particles, usize::MAX);
        store
    }

    #[test]
    fn positions_stay_inside_walls() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = SceneConfig {
            gravity: 2.0,
            speed: 5.0,
            ..SceneConfig::default()
        };
        let extent = Vec2::new(320.0, 200.0);
        let mut population = random_population(&mut rng, extent, 300, &config);
        for p in &mut population {
            p.velocity *= 40.0;
            p.decay = 0.0001;
        }
        let mut store = store_of(population);

        for _ in 0..500 {
            let dt = rng.gen_range(0.0..0.2);
            step(&mut store, extent, &[], &config, dt);
            for p in store.iter() {
                assert!(p.position.x >= p.radius && p.position.x <= extent.x - p.radius);
                assert!(p.position.y >= p.radius && p.position.y <= extent.y - p.radius);
            }
        }
    }

    #[test]
    fn life_drops_by_decay_each_step_until_removed() {
        let mut p = particle(Vec2::new(50.0, 50.0), Vec2::ZERO);
        p.decay = 0.3;
        let mut store = store_of(vec![p]);
        let config = SceneConfig::default();
        let extent = Vec2::new(100.0, 100.0);

        let mut expected = 1.0_f32;
        for _ in 0..3 {
            step(&mut store, extent, &[], &config, 0.016);
            expected -= 0.3;
            assert_eq!(store.get(0).unwrap().life, expected);
        }

        let report = step(&mut store, extent, &[], &config, 0.016);
        assert_eq!(report.expired, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn trail_never_exceeds_configured_length() {
        let config = SceneConfig {
            trail_length: 6,
            ..SceneConfig::default()
        };
        let mut store = store_of(vec![particle(Vec2::new(40.0, 40.0), Vec2::new(30.0, 10.0))]);
        for i in 0..40 {
            step(&mut store, Vec2::new(100.0, 100.0), &[], &config, 0.016);
            let len = store.get(0).unwrap().trail.len();
            assert!(len <= 6);
            assert_eq!(len, (i + 1).min(6));
        }
    }

    #[test]
    fn particle_at_center_feels_no_pull() {
        let config = SceneConfig {
            damping: 1.0,
            ..SceneConfig::default()
        };
        let mut store = store_of(vec![particle(Vec2::new(50.0, 50.0), Vec2::ZERO)]);
        step(&mut store, Vec2::new(100.0, 100.0), &[], &config, 0.016);
        let p = store.get(0).unwrap();
        assert_eq!(p.velocity, Vec2::ZERO);
        assert!(p.velocity.is_finite());
    }

    #[test]
    fn pull_points_toward_center() {
        let config = SceneConfig {
            damping: 1.0,
            ..SceneConfig::default()
        };
        let mut store = store_of(vec![particle(Vec2::new(10.0, 50.0), Vec2::ZERO)]);
        step(&mut store, Vec2::new(100.0, 100.0), &[], &config, 0.0);
        let v = store.get(0).unwrap().velocity;
        assert!((v.x - config.gravity * CENTRAL_FORCE).abs() < 1e-6);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn attractors_add_independent_terms() {
        let config = SceneConfig {
            gravity: 0.0,
            damping: 1.0,
            ..SceneConfig::default()
        };
        let attractors = [
            Attractor::new(Vec2::new(90.0, 50.0), 1.0),
            Attractor::new(Vec2::new(50.0, 90.0), 2.0),
        ];
        let mut store = store_of(vec![particle(Vec2::new(50.0, 50.0), Vec2::ZERO)]);
        step(&mut store, Vec2::new(100.0, 100.0), &attractors, &config, 0.0);
        let v = store.get(0).unwrap().velocity;
        assert!((v.x - CENTRAL_FORCE).abs() < 1e-6);
        assert!((v.y - 2.0 * CENTRAL_FORCE).abs() < 1e-6);
    }

    #[test]
    fn damping_scales_velocity() {
        let config = SceneConfig {
            gravity: 0.0,
            damping: 0.5,
            ..SceneConfig::default()
        };
        let mut store = store_of(vec![particle(Vec2::new(50.0, 50.0), Vec2::new(8.0, -4.0))]);
        step(&mut store, Vec2::new(100.0, 100.0), &[], &config, 0.0);
        assert_eq!(store.get(0).unwrap().velocity, Vec2::new(4.0, -2.0));
    }

    #[test]
    fn wall_hit_reflects_with_restitution() {
        let mut p = particle(Vec2::new(1.0, 50.0), Vec2::new(-10.0, 0.0));
        assert!(confine(&mut p, Vec2::new(100.0, 100.0), 0.8));
        assert_eq!(p.position.x, 3.0);
        assert_eq!(p.velocity.x, 8.0);

        let mut p = particle(Vec2::new(50.0, 99.0), Vec2::new(0.0, 10.0));
        confine(&mut p, Vec2::new(100.0, 100.0), 0.8);
        assert_eq!(p.position.y, 97.0);
        assert_eq!(p.velocity.y, -8.0);
    }

    #[test]
    fn oversized_particle_parks_at_midpoint() {
        let mut p = particle(Vec2::new(2.0, 2.0), Vec2::new(5.0, 5.0));
        p.radius = 40.0;
        confine(&mut p, Vec2::new(60.0, 200.0), 0.8);
        assert_eq!(p.position.x, 30.0);
        assert_eq!(p.position.y, 40.0);
    }

    #[test]
    fn long_pause_is_clamped() {
        assert_eq!(clamp_delta(5.0), MAX_FRAME_DELTA);
        assert_eq!(clamp_delta(-1.0), 0.0);
        assert_eq!(clamp_delta(f32::NAN), 0.0);
        assert_eq!(clamp_delta(0.01), 0.01);
    }

    #[test]
    fn degenerate_canvas_is_a_no_op() {
        let config = SceneConfig::default();
        let mut store = store_of(vec![particle(Vec2::new(5.0, 5.0), Vec2::new(1.0, 1.0))]);
        let report = step(&mut store, Vec2::new(0.0, 300.0), &[], &config, 0.016);
        assert_eq!(report, StepReport::default());
        let p = store.get(0).unwrap();
        assert_eq!(p.life, 1.0);
        assert_eq!(p.position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn shrinking_canvas_clamps_on_next_step() {
        let config = SceneConfig::default();
        let mut store = store_of(vec![particle(Vec2::new(190.0, 190.0), Vec2::ZERO)]);
        step(&mut store, Vec2::new(100.0, 100.0), &[], &config, 0.016);
        let p = store.get(0).unwrap();
        assert_eq!(p.position, Vec2::new(97.0, 97.0));
    }
}
