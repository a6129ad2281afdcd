//! Bounded per-particle position history used for fading trail strokes

use std::collections::VecDeque;

use glam::Vec2;

/// One recorded sample: where the particle was and how alive it was
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub alpha: f32,
}

/// Ring buffer of recent positions, oldest first.
///
/// The trail is owned by its particle, so it is dropped together with it.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(crate::config::MAX_TRAIL_LENGTH) + 1),
            capacity,
        }
    }

    /// Append the newest sample and evict the oldest ones beyond `limit`
    /// (the smaller of the particle's own capacity and the scene setting).
    pub fn record(&mut self, position: Vec2, life: f32, limit: usize) {
        let cap = self.capacity.min(limit);
        if cap == 0 {
            self.points.clear();
            return;
        }

        self.points.push_back(TrailPoint {
            position,
            alpha: life,
        });
        while self.points.len() > cap {
            self.points.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> + '_ {
        self.points.iter()
    }

    /// Consecutive sample pairs, oldest first; the renderer strokes each one
    pub fn segments(&self) -> impl Iterator<Item = (&TrailPoint, &TrailPoint)> + '_ {
        self.points.iter().zip(self.points.iter().skip(1))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_first() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.record(Vec2::new(i as f32, 0.0), 1.0, 100);
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f32> = trail.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn scene_limit_tightens_particle_capacity() {
        let mut trail = Trail::new(30);
        for i in 0..30 {
            trail.record(Vec2::splat(i as f32), 1.0, 30);
        }
        assert_eq!(trail.len(), 30);

        trail.record(Vec2::ZERO, 1.0, 5);
        assert_eq!(trail.len(), 5);
        assert_eq!(trail.iter().last().unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn zero_limit_keeps_no_history() {
        let mut trail = Trail::new(10);
        trail.record(Vec2::ONE, 1.0, 10);
        trail.record(Vec2::ONE, 1.0, 0);
        assert!(trail.is_empty());
    }

    #[test]
    fn samples_carry_life_as_alpha() {
        let mut trail = Trail::new(4);
        trail.record(Vec2::ZERO, 0.75, 4);
        trail.record(Vec2::X, 0.5, 4);
        let alphas: Vec<f32> = trail.iter().map(|p| p.alpha).collect();
        assert_eq!(alphas, vec![0.75, 0.5]);
        assert_eq!(trail.segments().count(), 1);
    }
}
