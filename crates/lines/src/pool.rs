//! The live particle set: spawning, retirement and population top-up.

use crate::config::{FlowLinesParams, MAX_LINE_COUNT, MAX_TRAIL_COUNT};
use crate::particle::Particle;
use flowtrail_core::color::BLACK;
use flowtrail_core::field::{DOMAIN_HALF_HEIGHT, DOMAIN_HALF_WIDTH};
use flowtrail_core::prng::Xorshift64;
use glam::DVec2;

/// Added to the uniform draw so no particle spawns completely still.
const SPEED_FLOOR: f64 = 0.3;
/// Shortest possible lifetime.
const LIFE_MIN: f64 = 100.0;
/// Spread added on top of [`LIFE_MIN`].
const LIFE_SPREAD: f64 = 200.0;

/// Owns the live particles and the PRNG that spawns them.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    rng: Xorshift64,
    spawned: u64,
}

impl ParticlePool {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: Xorshift64::new(seed),
            spawned: 0,
        }
    }

    /// Restarts the spawn sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Xorshift64::new(seed);
    }

    /// Drops every live particle.
    pub fn reset(&mut self) {
        self.particles.clear();
    }

    /// Spawns one particle with randomized state.
    ///
    /// Position is uniform over the domain, velocity zero,
    /// `speed = (u + 0.3) * params.speed`, `life = 100 + 200u`, and the trail
    /// holds `1 + floor(u * trail_count)` pairs stacked on the spawn point.
    pub fn create_one(&mut self, params: &FlowLinesParams) {
        let x = self
            .rng
            .next_range(-DOMAIN_HALF_WIDTH, DOMAIN_HALF_WIDTH);
        let y = self
            .rng
            .next_range(-DOMAIN_HALF_HEIGHT, DOMAIN_HALF_HEIGHT);
        let trail_count = params.trail_count.min(MAX_TRAIL_COUNT);
        let pairs = 1 + (self.rng.next_f64() * trail_count as f64).floor() as usize;
        let speed = (self.rng.next_f64() + SPEED_FLOOR) * params.speed;
        let life = LIFE_MIN + self.rng.next_f64() * LIFE_SPREAD;

        self.particles
            .push(Particle::new(DVec2::new(x, y), speed, life, pairs, BLACK));
        self.spawned += 1;
    }

    /// Spawns until the population reaches `params.line_count`, capped at
    /// [`MAX_LINE_COUNT`]. Returns the number created.
    pub fn top_up(&mut self, params: &FlowLinesParams) -> usize {
        let target = params.line_count.min(MAX_LINE_COUNT);
        let missing = target.saturating_sub(self.particles.len());
        for _ in 0..missing {
            self.create_one(params);
        }
        missing
    }

    /// Removes expired particles, preserving the order of survivors.
    /// Returns the number removed.
    pub fn remove_expired(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !p.is_expired());
        before - self.particles.len()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total particles ever spawned by this pool.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}
