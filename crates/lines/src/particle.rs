//! A single drifting line and its trail history.
//!
//! Trail points always come in pairs: a true point and a "smoothing
//! partner". [`Trail`] only exposes pairwise edits, so an odd-length trail
//! cannot be constructed.

use flowtrail_core::color::{color_from_rgb, Rgba, BLACK, CHANNEL_MAX};
use flowtrail_core::field::{in_domain, VectorField};
use glam::DVec2;
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// Velocity gained per time unit along the sampled heading.
pub const STEERING_ACCEL: f64 = 0.0001;
/// Per-time-unit velocity retention; applied as `DAMPING.powf(dt)`.
pub const DAMPING: f64 = 0.99;

/// One recorded trail vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub color: Rgba,
}

impl TrailPoint {
    pub fn new(position: DVec2, color: Rgba) -> Self {
        Self {
            x: position.x,
            y: position.y,
            color,
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Newest-first trail history. Index 0 is the head.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
}

impl Trail {
    /// A trail of `pairs` pairs, every point a copy of `point`.
    pub fn filled(point: TrailPoint, pairs: usize) -> Self {
        Self {
            points: std::iter::repeat(point)
                .take(pairs.saturating_mul(2))
                .collect(),
        }
    }

    /// Inserts `point` as the new head with `partner` right behind it.
    pub fn push_pair(&mut self, point: TrailPoint, partner: TrailPoint) {
        self.points.push_front(partner);
        self.points.push_front(point);
    }

    /// Removes the two oldest points. Returns `false` if the trail was empty.
    pub fn pop_pair(&mut self) -> bool {
        if self.points.is_empty() {
            return false;
        }
        self.points.pop_back();
        self.points.pop_back();
        true
    }

    /// Moves the head point to `position`, keeping its color. No-op when empty.
    pub fn set_head_position(&mut self, position: DVec2) {
        if let Some(head) = self.points.front_mut() {
            head.x = position.x;
            head.y = position.y;
        }
    }

    pub fn head(&self) -> Option<&TrailPoint> {
        self.points.front()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points from newest to oldest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

/// A particle steered by the vector field.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Fixed per-particle multiplier on velocity.
    pub speed: f64,
    /// Remaining lifetime; once negative the trail starts shedding.
    pub life: f64,
    pub color: Rgba,
    max_trail_length: usize,
    trail: Trail,
}

impl Particle {
    /// A resting particle at `position` with `pairs` trail pairs stacked on it.
    pub fn new(position: DVec2, speed: f64, life: f64, pairs: usize, color: Rgba) -> Self {
        let trail = Trail::filled(TrailPoint::new(position, color), pairs);
        Self::with_trail(position, speed, life, trail)
    }

    /// A resting particle that starts from an existing trail; the trail
    /// cap is the trail's length.
    pub fn with_trail(position: DVec2, speed: f64, life: f64, trail: Trail) -> Self {
        let color = trail.head().map_or(BLACK, |p| p.color);
        Self {
            position,
            velocity: DVec2::ZERO,
            speed,
            life,
            color,
            max_trail_length: trail.len(),
            trail,
        }
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Current cap on trail length. Never increases.
    pub fn max_trail_length(&self) -> usize {
        self.max_trail_length
    }

    /// `true` once the trail cap has shrunk to zero.
    pub fn is_expired(&self) -> bool {
        self.max_trail_length == 0
    }

    /// Counts down the remaining lifetime.
    pub fn decay(&mut self, dt: f64) {
        self.life -= dt;
    }

    /// Drops one trail slot if the particle is dead. Runs on gated ticks only.
    ///
    /// Removes the two oldest points but lowers the cap by one, so a trail
    /// retracts gradually over several gated ticks.
    pub fn shed(&mut self) {
        if self.life < 0.0 {
            self.max_trail_length = self.max_trail_length.saturating_sub(1);
            self.trail.pop_pair();
        }
    }

    /// Moves the particle and steers it by the field sample at its new position.
    ///
    /// Leaving the domain rectangle sets `life` to exactly 0; the particle
    /// is neither clamped nor wrapped.
    pub fn advance(&mut self, field: &VectorField, dt: f64) {
        self.position += self.velocity * self.speed * dt;

        let [r, g, b] = field.sample(self.position.x, self.position.y);
        let angle = (r + g + b) / (3.0 * CHANNEL_MAX) * TAU;
        self.velocity += DVec2::new(angle.sin(), angle.cos()) * STEERING_ACCEL * dt;
        self.velocity *= DAMPING.powf(dt);

        self.color = color_from_rgb(r, g, b);

        if !in_domain(self.position.x, self.position.y) {
            self.life = 0.0;
        }
    }

    /// Glues the head to the live position and, when `insert` is set,
    /// pushes a new pair at the front, trimming the oldest pair on overflow.
    pub fn record(&mut self, insert: bool) {
        self.trail.set_head_position(self.position);
        if !insert {
            return;
        }
        let partner = self
            .trail
            .head()
            .map_or(self.position, TrailPoint::position);
        self.trail.push_pair(
            TrailPoint::new(self.position, self.color),
            TrailPoint::new(partner, self.color),
        );
        if self.trail.len() > self.max_trail_length {
            self.trail.pop_pair();
        }
    }
}
