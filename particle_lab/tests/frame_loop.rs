use glam::Vec2;
use particle_lab::mesh::pairs_within;
use particle_lab::{ConfigChange, Intent, Preset, SceneConfig, SimEvent, Simulation};

const EXTENT: Vec2 = Vec2::new(960.0, 540.0);
const FRAME: f64 = 1.0 / 60.0;

fn seeded(seed: u64) -> SceneConfig {
    SceneConfig {
        seed: Some(seed),
        ..SceneConfig::default()
    }
}

fn run(sim: &mut Simulation, start: usize, frames: usize) {
    for i in start..start + frames {
        sim.frame(i as f64 * FRAME);
    }
}

#[test]
fn every_preset_keeps_particles_inside_the_canvas() {
    let mut sim = Simulation::new(seeded(10), EXTENT);
    let mut t = 0;
    for preset in Preset::ALL {
        sim.push_intent(Intent::LoadPreset(preset));
        for _ in 0..240 {
            sim.frame(t as f64 * FRAME);
            t += 1;
            for p in sim.particles() {
                assert!(p.position.x >= p.radius && p.position.x <= EXTENT.x - p.radius, "{preset}");
                assert!(p.position.y >= p.radius && p.position.y <= EXTENT.y - p.radius, "{preset}");
                assert!(p.life > 0.0 && p.life <= 1.0);
                assert!(p.trail.len() <= sim.config().trail_length);
            }
        }
    }
}

#[test]
fn reset_with_fixed_seed_is_reproducible() {
    let config = SceneConfig {
        particle_count: 250,
        ..seeded(99)
    };
    let mut a = Simulation::new(config.clone(), EXTENT);
    let mut b = Simulation::new(config, EXTENT);

    run(&mut a, 0, 30);
    run(&mut b, 0, 30);
    a.push_intent(Intent::Reset);
    b.push_intent(Intent::Reset);
    a.frame(1.0);
    b.frame(1.0);

    assert_eq!(a.particles().len(), 250);
    let positions_a: Vec<Vec2> = a.particles().iter().map(|p| p.position).collect();
    let positions_b: Vec<Vec2> = b.particles().iter().map(|p| p.position).collect();
    assert_eq!(positions_a, positions_b);
}

#[test]
fn reset_population_is_fresh() {
    let mut sim = Simulation::new(
        SceneConfig {
            particle_count: 64,
            ..seeded(5)
        },
        EXTENT,
    );
    run(&mut sim, 0, 20);
    sim.push_intent(Intent::Reset);
    // A paused scene so the reset population is observed before any step
    sim.push_intent(Intent::TogglePause);
    sim.frame(1.0);

    assert_eq!(sim.particles().len(), 64);
    assert!(sim.particles().iter().all(|p| p.life == 1.0 && p.trail.is_empty()));
}

#[test]
fn double_pause_toggle_resumes_without_a_jump() {
    let config = SceneConfig {
        gravity: 0.0,
        ..seeded(12)
    };
    let mut sim = Simulation::new(config, EXTENT);
    run(&mut sim, 0, 10);
    let before: Vec<Vec2> = sim.particles().iter().map(|p| p.position).collect();

    sim.push_intent(Intent::TogglePause);
    sim.push_intent(Intent::TogglePause);
    // Ten seconds later: the first frame after resuming integrates nothing
    let report = sim.frame(10.0);
    assert!(sim.is_running());
    assert_eq!(report.dt, 0.0);

    let after: Vec<Vec2> = sim.particles().iter().map(|p| p.position).collect();
    assert_eq!(before, after);

    let events = sim.drain_events();
    assert!(events.ends_with(&[SimEvent::Paused, SimEvent::Resumed]));
}

#[test]
fn paused_scene_holds_still_and_resumes_smoothly() {
    let mut sim = Simulation::new(seeded(13), EXTENT);
    run(&mut sim, 0, 5);

    sim.push_intent(Intent::TogglePause);
    sim.frame(5.0 * FRAME);
    let frozen: Vec<Vec2> = sim.particles().iter().map(|p| p.position).collect();
    sim.frame(100.0);
    let still: Vec<Vec2> = sim.particles().iter().map(|p| p.position).collect();
    assert_eq!(frozen, still);

    sim.push_intent(Intent::TogglePause);
    assert_eq!(sim.frame(400.0).dt, 0.0);
    let next = sim.frame(400.0 + FRAME);
    assert!((next.dt - FRAME as f32).abs() < 1e-4);
}

#[test]
fn dying_particles_leave_the_store() {
    let mut sim = Simulation::new(seeded(14), EXTENT);
    sim.push_intent(Intent::LoadPreset(Preset::Explosion));
    // Burst particles lose 0.002 life per step: gone after 500 steps
    run(&mut sim, 0, 499);
    assert_eq!(sim.particles().len(), 100);
    run(&mut sim, 499, 2);
    assert!(sim.particles().is_empty());
}

#[test]
fn long_stall_is_clamped_to_max_delta() {
    let mut sim = Simulation::new(seeded(15), EXTENT);
    sim.frame(0.0);
    let report = sim.frame(30.0);
    assert_eq!(report.dt, particle_lab::physics::MAX_FRAME_DELTA);
}

#[test]
fn resize_clamps_against_new_extent_without_rescaling() {
    let mut sim = Simulation::new(seeded(16), EXTENT);
    sim.frame(0.0);
    let inside: Vec<Vec2> = sim
        .particles()
        .iter()
        .filter(|p| p.position.x < 200.0 && p.position.y < 200.0)
        .map(|p| p.position)
        .collect();
    assert!(!inside.is_empty());

    let small = Vec2::new(300.0, 300.0);
    sim.push_intent(Intent::Resize(small));
    sim.frame(FRAME);
    assert_eq!(sim.extent(), small);
    for p in sim.particles() {
        assert!(p.position.x <= small.x - p.radius);
        assert!(p.position.y <= small.y - p.radius);
    }
}

#[test]
fn proximity_mesh_matches_reference_layout() {
    let positions = [Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0), Vec2::new(500.0, 500.0)];
    let pairs: Vec<(usize, usize)> = pairs_within(&positions, 100.0).iter().map(|l| (l.a, l.b)).collect();
    assert_eq!(pairs, vec![(0, 1)]);
}

#[test]
fn mesh_follows_link_distance_setting() {
    let config = SceneConfig {
        warmup_frames: 0,
        ..seeded(17)
    };
    let mut sim = Simulation::new(config, EXTENT);
    sim.push_intent(Intent::SetConfig(ConfigChange::ShowLines(true)));
    sim.push_intent(Intent::SetConfig(ConfigChange::LinkDistance(40.0)));
    sim.frame(0.0);

    let positions = sim.particles().positions();
    let expected = pairs_within(&positions, 40.0);
    assert_eq!(sim.links(), expected.as_slice());
}

#[test]
fn tiny_link_distance_on_a_crowded_canvas_keeps_running() {
    let config = SceneConfig {
        warmup_frames: 0,
        ..seeded(19)
    };
    let mut sim = Simulation::new(config, EXTENT);
    sim.push_intent(Intent::SetConfig(ConfigChange::ShowLines(true)));
    sim.push_intent(Intent::SetConfig(ConfigChange::LinkDistance(1e-7)));
    run(&mut sim, 0, 3);

    assert!(sim.particles().len() > particle_lab::mesh::BINNING_THRESHOLD);
    assert!(sim.links().is_empty());
}

#[test]
fn telemetry_reports_live_population() {
    let mut sim = Simulation::new(seeded(18), EXTENT);
    run(&mut sim, 0, 75);
    let snapshot = sim.telemetry().expect("one second of frames elapsed");
    assert!(snapshot.particles > 0 && snapshot.particles <= 500);
    assert!(snapshot.fps > 50.0 && snapshot.fps < 70.0);
    assert!(snapshot.kinetic_energy > 0.0);
}
