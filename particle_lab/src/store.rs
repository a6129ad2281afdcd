//! Contiguous storage for the live particle population

use glam::Vec2;

use crate::particle::Particle;

/// Owns every live particle. Identity is the index into the backing `Vec`;
/// removal keeps the relative order of survivors.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the population already reached `cap`.
    /// Hitting the cap is routine, so the caller just gets `false`.
    pub fn insert(&mut self, particle: Particle, cap: usize) -> bool {
        if self.particles.len() >= cap {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Swap in a whole new population, truncated to `cap`
    pub fn replace(&mut self, mut particles: Vec<Particle>, cap: usize) {
        particles.truncate(cap);
        self.particles = particles;
    }

    /// Shrink the population to at most `cap`, dropping the newest particles
    pub fn truncate(&mut self, cap: usize) {
        self.particles.truncate(cap);
    }

    /// Drop every particle whose life ran out; returns how many were removed
    pub fn remove_dead(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(Particle::is_alive);
        before - self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Positions in store order, for the pairwise proximity scan
    pub fn positions(&self) -> Vec<Vec2> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Sum of ½|v|² over the population (unit mass)
    pub fn kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}

impl<'a> IntoIterator for &'a ParticleStore {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(x: f32) -> Particle {
        Particle::new(Vec2::new(x, 0.0), Vec2::ZERO, 1.0, [1.0; 4], 4, 0.1)
    }

    #[test]
    fn insert_respects_hard_cap() {
        let mut store = ParticleStore::new();
        assert!(store.insert(particle_at(0.0), 2));
        assert!(store.insert(particle_at(1.0), 2));
        assert!(!store.insert(particle_at(2.0), 2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_dead_preserves_survivor_order() {
        let mut store = ParticleStore::new();
        for i in 0..5 {
            store.insert(particle_at(i as f32), 10);
        }
        for (i, p) in store.iter_mut().enumerate() {
            if i % 2 == 1 {
                p.life = 0.0;
            }
        }

        assert_eq!(store.remove_dead(), 2);
        let xs: Vec<f32> = store.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn replace_truncates_to_cap() {
        let mut store = ParticleStore::new();
        store.replace((0..10).map(|i| particle_at(i as f32)).collect(), 4);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn kinetic_energy_sums_half_speed_squared() {
        let mut store = ParticleStore::new();
        let mut p = particle_at(0.0);
        p.velocity = Vec2::new(3.0, 4.0);
        store.insert(p.clone(), 10);
        store.insert(p, 10);
        assert_eq!(store.kinetic_energy(), 25.0);
    }
}
