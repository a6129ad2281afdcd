//! Frame composition: turns simulation state into ordered draw layers
//!
//! This is the CPU half of the renderer. It reads the particle store, trails
//! and proximity mesh and produces plain geometry that the GPU renderer
//! uploads as-is. Layers are listed in paint order: fade, grid, trails, links,
//! glyphs, pointer ring.

use glam::Vec2;

use crate::palette::{rgba8, with_alpha, Rgba};
use crate::simulation::Simulation;

pub const GRID_SPACING: f32 = 50.0;
/// Grid scroll speed in canvas units per simulated second
pub const GRID_SCROLL_SPEED: f32 = 10.0;
pub const FADE_ALPHA: f32 = 0.1;
/// Stronger fade while warming up, when no trails are drawn
pub const WARMUP_FADE_ALPHA: f32 = 0.2;
pub const TRAIL_ALPHA_SCALE: f32 = 0.5;
pub const LINK_ALPHA_SCALE: f32 = 0.2;
pub const POINTER_RING_RADIUS: f32 = 30.0;
pub const POINTER_DOT_RADIUS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Rgba,
}

/// A particle disc; `glow` adds the radial gradient and halo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub position: Vec2,
    pub radius: f32,
    pub color: Rgba,
    pub glow: bool,
}

/// Feedback ring drawn under a held pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRing {
    pub position: Vec2,
    pub radius: f32,
    pub dot_radius: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Default)]
pub struct FrameScene {
    pub extent: Vec2,
    /// Translucent overlay painted over the previous frame
    pub fade: Rgba,
    pub grid: Vec<LineSegment>,
    pub trails: Vec<LineSegment>,
    pub links: Vec<LineSegment>,
    pub glyphs: Vec<Glyph>,
    pub pointer: Option<PointerRing>,
}

impl FrameScene {
    /// Line layers in paint order
    pub fn line_layers(&self) -> [&[LineSegment]; 3] {
        [&self.grid, &self.trails, &self.links]
    }

    pub fn line_count(&self) -> usize {
        self.grid.len() + self.trails.len() + self.links.len()
    }
}

pub fn background_fade(warmup: bool) -> Rgba {
    rgba8(10, 14, 23, if warmup { WARMUP_FADE_ALPHA } else { FADE_ALPHA })
}

/// Build this frame's draw layers from the simulation
pub fn compose_scene(sim: &Simulation) -> FrameScene {
    let config = sim.config();
    let extent = sim.extent();
    let warmup = sim.in_warmup();
    let particles = sim.particles();

    let mut scene = FrameScene {
        extent,
        fade: background_fade(warmup),
        ..FrameScene::default()
    };

    if !warmup {
        if config.show_grid {
            scene.grid = grid_lines(extent, sim.clock());
        }

        if config.show_trails {
            for particle in particles {
                scene.trails.extend(particle.trail.segments().map(|(from, to)| LineSegment {
                    from: from.position,
                    to: to.position,
                    color: with_alpha(particle.color, to.alpha * TRAIL_ALPHA_SCALE),
                }));
            }
        }

        if config.show_lines {
            let store = particles.as_slice();
            scene.links = sim
                .links()
                .iter()
                .filter(|link| link.b < store.len())
                .map(|link| LineSegment {
                    from: store[link.a].position,
                    to: store[link.b].position,
                    color: rgba8(59, 130, 246, link.weight * LINK_ALPHA_SCALE),
                })
                .collect();
        }
    }

    scene.glyphs = particles
        .iter()
        .map(|p| Glyph {
            position: p.position,
            radius: p.radius,
            color: p.color,
            glow: !warmup,
        })
        .collect();

    let pointer = sim.pointer();
    if pointer.held {
        scene.pointer = Some(PointerRing {
            position: pointer.position,
            radius: POINTER_RING_RADIUS,
            dot_radius: POINTER_DOT_RADIUS,
            color: rgba8(59, 130, 246, 0.3),
        });
    }

    scene
}

/// Scrolling background grid; the offset wraps every `GRID_SPACING` units
pub fn grid_lines(extent: Vec2, time: f32) -> Vec<LineSegment> {
    let mut lines = Vec::new();
    if !(extent.x > 0.0 && extent.y > 0.0) {
        return lines;
    }

    let color = rgba8(148, 163, 184, 0.1);
    let offset = (time * GRID_SCROLL_SPEED).rem_euclid(GRID_SPACING);

    let mut x = offset;
    while x < extent.x {
        lines.push(LineSegment {
            from: Vec2::new(x, 0.0),
            to: Vec2::new(x, extent.y),
            color,
        });
        x += GRID_SPACING;
    }

    let mut y = offset;
    while y < extent.y {
        lines.push(LineSegment {
            from: Vec2::new(0.0, y),
            to: Vec2::new(extent.x, y),
            color,
        });
        y += GRID_SPACING;
    }

    lines
}
