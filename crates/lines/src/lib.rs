#![deny(unsafe_code)]
//! Flow-lines engine.
//!
//! A swarm of particles drifts through a discretized vector field. Each
//! field cell holds a channel triple whose mean encodes a heading; particles
//! accelerate along that heading, are damped every tick, take their color
//! from the cell they sit on, and drag a trail of past positions behind
//! them. Trail topology changes (insertions, retraction of dead particles)
//! happen only once every `interval_length` ticks; between those the tail
//! tip is interpolated so trails still move smoothly.
//!
//! The output of every tick is a [`Frame`]: flat position and color buffers
//! ready for a line-strip renderer.

pub mod config;
pub mod packer;
pub mod particle;
pub mod pool;

pub use config::FlowLinesParams;
pub use particle::{Particle, Trail, TrailPoint};
pub use pool::ParticlePool;

use flowtrail_core::error::EngineError;
use flowtrail_core::field::VectorField;
use flowtrail_core::frame::Frame;
use flowtrail_core::Engine;
use log::{debug, trace, warn};
use serde::Deserialize;
use serde_json::Value;

/// Seed used when the host never supplies one.
pub const DEFAULT_SEED: u64 = 0x00F1_0A71_5EED;

/// The flow-lines simulation: field, particle pool and interval gate.
pub struct FlowLines {
    field: Option<VectorField>,
    params: FlowLinesParams,
    pool: ParticlePool,
    /// Gate phase for the next tick, in `0..interval_length`.
    interval: usize,
    /// Tip weight of the most recent tick.
    tip_weight: f64,
}

impl FlowLines {
    /// Creates an engine with no field yet. Ticks fail until one is set.
    pub fn new(seed: u64, params: FlowLinesParams) -> Self {
        Self {
            field: None,
            params,
            pool: ParticlePool::new(seed),
            interval: 0,
            tip_weight: 1.0,
        }
    }

    /// Creates an engine that is ready to tick.
    pub fn with_field(seed: u64, params: FlowLinesParams, field: VectorField) -> Self {
        let mut engine = Self::new(seed, params);
        engine.field = Some(field);
        engine
    }

    /// Replaces the vector field and clears all particles.
    pub fn set_field(&mut self, field: VectorField) {
        self.field = Some(field);
        self.restart();
    }

    pub fn field(&self) -> Option<&VectorField> {
        self.field.as_ref()
    }

    pub fn config(&self) -> &FlowLinesParams {
        &self.params
    }

    pub fn particles(&self) -> &[Particle] {
        self.pool.particles()
    }

    pub fn particle_count(&self) -> usize {
        self.pool.len()
    }

    /// Total particles spawned since construction.
    pub fn spawned(&self) -> u64 {
        self.pool.spawned()
    }

    /// Gate phase the next tick will run with.
    pub fn interval(&self) -> usize {
        self.interval
    }

    fn restart(&mut self) {
        self.pool.reset();
        self.interval = 0;
        self.tip_weight = 1.0;
    }
}

impl Default for FlowLines {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, FlowLinesParams::default())
    }
}

impl Engine for FlowLines {
    fn reconfigure(&mut self, update: &Value) {
        if let Some(raw) = update.get("flow_field").filter(|v| !v.is_null()) {
            match VectorField::deserialize(raw) {
                Ok(field) => {
                    debug!(
                        "flow field replaced: {}x{} cells",
                        field.width(),
                        field.height()
                    );
                    self.field = Some(field);
                }
                Err(e) => warn!("ignoring malformed flow_field: {e}"),
            }
        }
        self.params = self.params.merged(update);
        if let Some(seed) = update.get("seed").and_then(Value::as_u64) {
            self.pool.reseed(seed);
        }
        self.restart();
        debug!("reconfigured: {:?}", self.params);
    }

    fn step(&mut self, dt: f64) -> Result<(), EngineError> {
        let field = self.field.as_ref().ok_or(EngineError::MissingField)?;
        let phase = self.interval;
        let gate_open = phase == 0;

        for particle in self.pool.particles_mut() {
            particle.decay(dt);
            if gate_open {
                particle.shed();
            }
        }
        let removed = self.pool.remove_expired();
        let created = self.pool.top_up(&self.params);

        for particle in self.pool.particles_mut() {
            particle.advance(field, dt);
            particle.record(gate_open);
        }

        self.tip_weight = packer::tip_weight(phase, self.params.interval_length);
        self.interval = (phase + 1) % self.params.interval_length;
        trace!(
            "tick dt={dt} phase={phase} removed={removed} created={created} live={}",
            self.pool.len()
        );
        Ok(())
    }

    fn emit(&self) -> Frame {
        packer::pack(self.pool.particles(), self.tip_weight)
    }

    fn params(&self) -> Value {
        self.params.to_json()
    }

    fn param_schema(&self) -> Value {
        FlowLinesParams::schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(line_count: usize, trail_count: usize, speed: f64) -> FlowLinesParams {
        FlowLinesParams {
            line_count,
            trail_count,
            speed,
            ..FlowLinesParams::default()
        }
    }

    fn uniform(channel: f64) -> VectorField {
        VectorField::uniform(16, 8, [channel; 3]).unwrap()
    }

    fn engine(p: FlowLinesParams) -> FlowLines {
        FlowLines::with_field(42, p, uniform(100.0))
    }

    // ---- Construction ----

    #[test]
    fn step_without_field_is_an_error() {
        let mut e = FlowLines::default();
        assert!(matches!(e.step(1.0), Err(EngineError::MissingField)));
        assert_eq!(e.particle_count(), 0);
    }

    #[test]
    fn first_tick_tops_up_to_line_count() {
        let mut e = engine(FlowLinesParams::default());
        e.step(1.0).unwrap();
        assert_eq!(e.particle_count(), 50);
    }

    // ---- Population convergence ----

    #[test]
    fn population_matches_line_count_every_tick() {
        let mut e = FlowLines::with_field(7, params(30, 3, 1.0), uniform(200.0));
        for _ in 0..2000 {
            e.step(1.0).unwrap();
            assert_eq!(e.particle_count(), 30);
        }
        assert!(e.spawned() > 30, "expected particles to be recycled");
    }

    // ---- Trail parity ----

    #[test]
    fn trails_stay_even_and_within_cap() {
        let mut e = FlowLines::with_field(3, params(40, 6, 3.0), uniform(30.0));
        for _ in 0..1500 {
            e.step(1.0).unwrap();
            for p in e.particles() {
                assert_eq!(p.trail().len() % 2, 0);
                assert!(p.trail().len() <= p.max_trail_length());
            }
        }
    }

    // ---- Monotonic shrink ----

    #[test]
    fn dead_particles_shrink_every_gate() {
        let mut e = FlowLines::with_field(5, params(1, 8, 0.0), uniform(0.0));
        e.step(1.0).unwrap();
        let start_life = e.particles()[0].life;
        let ticks_to_death = start_life.ceil() as usize + 1;
        for _ in 0..ticks_to_death {
            e.step(1.0).unwrap();
        }
        assert!(e.particles()[0].life < 0.0);
        let spawned = e.spawned();

        let mut last_cap = e.particles()[0].max_trail_length();
        let mut ticks_since_drop = 0;
        while e.spawned() == spawned {
            e.step(1.0).unwrap();
            if e.spawned() != spawned {
                break;
            }
            let cap = e.particles()[0].max_trail_length();
            assert!(cap <= last_cap, "cap grew from {last_cap} to {cap}");
            if cap < last_cap {
                ticks_since_drop = 0;
            } else {
                ticks_since_drop += 1;
                assert!(ticks_since_drop < 10, "cap stalled for a full interval");
            }
            last_cap = cap;
        }
    }

    // ---- Boundary death ----

    #[test]
    fn leaving_domain_sets_life_to_zero_that_tick() {
        let mut e = FlowLines::with_field(9, params(1, 2, 1.0), uniform(0.0));
        e.step(1.0).unwrap();
        // shove the particle out of the domain through its velocity
        e.pool.particles_mut()[0].velocity = glam::DVec2::new(100.0, 0.0);
        e.step(1.0).unwrap();
        let p = &e.particles()[0];
        assert!(p.position.x.abs() > 2.0);
        assert_eq!(p.life, 0.0);
    }

    #[test]
    fn leaving_through_top_or_bottom_also_kills() {
        for vy in [100.0, -100.0] {
            let mut e = FlowLines::with_field(9, params(1, 2, 1.0), uniform(0.0));
            e.step(1.0).unwrap();
            e.pool.particles_mut()[0].velocity = glam::DVec2::new(0.0, vy);
            e.step(1.0).unwrap();
            let p = &e.particles()[0];
            assert!(p.position.x.abs() <= 2.0);
            assert!(p.position.y.abs() > 1.0);
            assert_eq!(p.life, 0.0);
        }
    }

    // ---- Buffer parity ----

    #[test]
    fn frame_buffers_stay_parallel() {
        let mut e = FlowLines::with_field(1, params(25, 10, 2.0), uniform(180.0));
        for _ in 0..300 {
            e.step(0.5).unwrap();
            let frame = e.emit();
            let points: usize = e.particles().iter().map(|p| p.trail().len()).sum();
            assert_eq!(frame.positions.len(), 2 * points);
            assert_eq!(frame.colors.len(), 4 * points);
        }
    }

    // ---- Reset on update ----

    #[test]
    fn update_clears_particles_immediately() {
        let mut e = engine(FlowLinesParams::default());
        for _ in 0..5 {
            e.step(1.0).unwrap();
        }
        e.reconfigure(&json!({"line_count": 12}));
        assert_eq!(e.particle_count(), 0);
        assert_eq!(e.interval(), 0);
        e.step(1.0).unwrap();
        assert_eq!(e.particle_count(), 12);
    }

    #[test]
    fn empty_update_still_clears_particles() {
        let mut e = engine(FlowLinesParams::default());
        e.step(1.0).unwrap();
        e.reconfigure(&json!({}));
        assert_eq!(e.particle_count(), 0);
        assert_eq!(*e.config(), FlowLinesParams::default());
    }

    #[test]
    fn update_replaces_field() {
        let mut e = FlowLines::default();
        e.reconfigure(&json!({
            "flow_field": {"array": [[[1, 2, 3]], [[4, 5, 6]]], "width": 2, "height": 1}
        }));
        let field = e.field().unwrap();
        assert_eq!(field.width(), 2);
        assert_eq!(field.sample(1.0, 0.0), [4.0, 5.0, 6.0]);
        assert!(e.step(1.0).is_ok());
    }

    #[test]
    fn malformed_field_keeps_previous_field() {
        let mut e = engine(FlowLinesParams::default());
        e.reconfigure(&json!({"flow_field": {"array": [], "width": 0, "height": 0}, "speed": 2}));
        assert_eq!(e.field().unwrap().width(), 16);
        assert_eq!(e.config().speed, 2.0);
    }

    #[test]
    fn out_of_range_update_keeps_previous_tunables_and_ticks() {
        let mut e = engine(params(4, 3, 1.0));
        e.reconfigure(&json!({"trail_count": u64::MAX, "line_count": 1}));
        assert_eq!(e.config().trail_count, 3);
        assert_eq!(e.config().line_count, 1);
        e.step(1.0).unwrap();
        assert_eq!(e.particle_count(), 1);

        e.reconfigure(&json!({"line_count": u64::MAX}));
        assert_eq!(e.config().line_count, 1);
        e.step(1.0).unwrap();
        assert_eq!(e.particle_count(), 1);
    }

    #[test]
    fn set_field_clears_particles() {
        let mut e = engine(FlowLinesParams::default());
        e.step(1.0).unwrap();
        e.set_field(uniform(3.0));
        assert_eq!(e.particle_count(), 0);
    }

    // ---- Interval gate ----

    #[test]
    fn interval_cycles_through_interval_length() {
        let p = FlowLinesParams {
            interval_length: 4,
            ..params(3, 2, 1.0)
        };
        let mut e = FlowLines::with_field(2, p, uniform(0.0));
        let phases: Vec<usize> = (0..9)
            .map(|_| {
                let phase = e.interval();
                e.step(1.0).unwrap();
                phase
            })
            .collect();
        assert_eq!(phases, vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn only_the_head_moves_between_gates() {
        let mut e = FlowLines::with_field(4, params(1, 6, 1.0), uniform(0.0));
        e.step(1.0).unwrap();
        let tail: Vec<TrailPoint> = e.particles()[0].trail().iter().skip(1).copied().collect();
        for _ in 0..9 {
            e.step(1.0).unwrap();
            let p = &e.particles()[0];
            let head = p.trail().head().unwrap();
            assert_eq!((head.x, head.y), (p.position.x, p.position.y));
            let now: Vec<TrailPoint> = p.trail().iter().skip(1).copied().collect();
            assert_eq!(now, tail);
        }
        // the next gated tick pushes a fresh pair in front
        e.step(1.0).unwrap();
        let p = &e.particles()[0];
        let second = p.trail().iter().nth(1).unwrap();
        assert_eq!((second.x, second.y), (p.position.x, p.position.y));
    }

    #[test]
    fn tip_retracts_between_gates() {
        let mut e = FlowLines::with_field(6, params(1, 3, 1.0), uniform(64.0));
        // let the particle build some velocity so consecutive points differ
        for _ in 0..40 {
            e.step(1.0).unwrap();
        }
        let p = &e.particles()[0];
        let n = p.trail().len();
        assert!(n >= 2);
        let frame = e.emit();
        let pts: Vec<&TrailPoint> = p.trail().iter().collect();
        let a = packer::tip_weight(9, 10);
        let expected = a * pts[n - 1].x + (1.0 - a) * pts[n - 2].x;
        let emitted = frame.positions[2 * (n - 1)] as f64;
        assert!((emitted - expected).abs() < 1e-6);
    }

    // ---- Scenarios ----

    #[test]
    fn single_frozen_particle_dies_and_is_replaced() {
        let mut e = FlowLines::with_field(11, params(1, 1, 0.0), uniform(90.0));
        e.step(1.0).unwrap();
        let p = &e.particles()[0];
        let spawn = p.position;
        assert_eq!(p.trail().len(), 2);
        assert_eq!(p.max_trail_length(), 2);

        let mut last_life = p.life;
        let mut ticks = 1;
        while e.particles()[0].life >= 0.0 {
            e.step(1.0).unwrap();
            ticks += 1;
            let p = &e.particles()[0];
            assert_eq!(p.position, spawn, "zero speed must freeze the particle");
            assert!(p.life < last_life);
            last_life = p.life;
            assert!(ticks < 1000);
        }
        assert_eq!(e.spawned(), 1);
        // max_trail_length 2 -> removal within ceil(2 / 1) * 10 ticks
        for _ in 0..20 {
            e.step(1.0).unwrap();
        }
        assert_eq!(e.spawned(), 2);
        assert_eq!(e.particle_count(), 1);
    }

    #[test]
    fn mid_channel_field_pushes_particles_down() {
        let mut e = FlowLines::with_field(13, params(10, 2, 1.0), uniform(127.5));
        e.step(1.0).unwrap();
        for p in e.particles() {
            assert!(p.velocity.x.abs() < 1e-18);
            assert!(p.velocity.y < 0.0);
        }
    }

    // ---- Determinism ----

    #[test]
    fn same_seed_same_frames() {
        let mut a = FlowLines::with_field(99, params(20, 5, 1.5), uniform(40.0));
        let mut b = FlowLines::with_field(99, params(20, 5, 1.5), uniform(40.0));
        for _ in 0..200 {
            a.step(1.0).unwrap();
            b.step(1.0).unwrap();
        }
        assert_eq!(a.emit(), b.emit());
    }

    #[test]
    fn update_seed_restarts_sequence() {
        let mut a = engine(params(5, 3, 1.0));
        a.reconfigure(&json!({"seed": 123}));
        a.step(1.0).unwrap();
        let mut b = engine(params(5, 3, 1.0));
        b.step(1.0).unwrap();
        b.reconfigure(&json!({"seed": 123}));
        b.step(1.0).unwrap();
        assert_eq!(a.emit(), b.emit());
    }

    // ---- Engine trait ----

    #[test]
    fn params_and_schema_describe_tunables() {
        let e = engine(params(8, 2, 0.5));
        let values = e.params();
        assert_eq!(values["line_count"], 8);
        assert_eq!(values["speed"], 0.5);
        assert!(e.param_schema().get("interval_length").is_some());
    }

    #[test]
    fn object_safety() {
        let mut boxed: Box<dyn Engine> = Box::new(engine(params(3, 1, 1.0)));
        boxed.step(1.0).unwrap();
        assert!(boxed.emit().is_consistent());
    }
}
