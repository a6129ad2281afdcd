//! Proximity mesh: every particle pair closer than the link distance
//!
//! Small populations use the plain O(n²) pairwise scan. Above
//! [`BINNING_THRESHOLD`] particles the scan switches to a uniform grid with
//! cells as wide as the threshold, so only neighbouring cells are compared.
//! Both paths return the same pairs in the same order.

use std::collections::HashMap;

use glam::Vec2;

/// Population size above which the spatial grid is used
pub const BINNING_THRESHOLD: usize = 300;

/// A pair `(a, b)` with `a < b` and its line weight `1 - distance / threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub weight: f32,
}

/// Brute-force pairwise scan
pub fn pairs_within(positions: &[Vec2], threshold: f32) -> Vec<Link> {
    let mut links = Vec::new();
    if !valid_threshold(threshold) {
        return links;
    }

    let threshold_sq = threshold * threshold;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if let Some(link) = link_between(positions, i, j, threshold, threshold_sq) {
                links.push(link);
            }
        }
    }
    links
}

fn valid_threshold(threshold: f32) -> bool {
    threshold.is_finite() && threshold > 0.0
}

fn link_between(positions: &[Vec2], a: usize, b: usize, threshold: f32, threshold_sq: f32) -> Option<Link> {
    let distance_sq = positions[a].distance_squared(positions[b]);
    if distance_sq < threshold_sq {
        Some(Link {
            a,
            b,
            weight: 1.0 - distance_sq.sqrt() / threshold,
        })
    } else {
        None
    }
}

/// Narrowest grid cell; a cell wider than the threshold still finds every pair
const MIN_CELL_SIZE: f32 = 1.0;

type Cell = (i64, i64);

fn cell_of(position: Vec2, cell_size: f32) -> Cell {
    (
        (position.x / cell_size).floor() as i64,
        (position.y / cell_size).floor() as i64,
    )
}

/// Reusable mesh builder; keeps its buffers between frames
#[derive(Debug, Default)]
pub struct MeshBuilder {
    links: Vec<Link>,
    cells: HashMap<Cell, Vec<usize>>,
    candidates: Vec<usize>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the mesh for `positions` and return it
    pub fn rebuild(&mut self, positions: &[Vec2], threshold: f32) -> &[Link] {
        self.links.clear();
        if positions.len() < 2 || !valid_threshold(threshold) {
            return &self.links;
        }

        if positions.len() <= BINNING_THRESHOLD {
            self.links = pairs_within(positions, threshold);
        } else {
            self.rebuild_binned(positions, threshold);
        }
        &self.links
    }

    fn rebuild_binned(&mut self, positions: &[Vec2], threshold: f32) {
        let threshold_sq = threshold * threshold;
        let cell_size = threshold.max(MIN_CELL_SIZE);

        self.cells.clear();
        for (index, &position) in positions.iter().enumerate() {
            self.cells.entry(cell_of(position, cell_size)).or_default().push(index);
        }

        for (i, &position) in positions.iter().enumerate() {
            let (cx, cy) = cell_of(position, cell_size);

            self.candidates.clear();
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if let Some(bucket) = self.cells.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) {
                        self.candidates.extend(bucket.iter().copied().filter(|&j| j > i));
                    }
                }
            }
            self.candidates.sort_unstable();

            for &j in &self.candidates {
                if let Some(link) = link_between(positions, i, j, threshold, threshold_sq) {
                    self.links.push(link);
                }
            }
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }
}
