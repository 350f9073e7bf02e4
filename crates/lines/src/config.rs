//! Tunables for the flow-lines engine.

use flowtrail_core::params::{param_f64, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default target particle population.
pub const DEFAULT_LINE_COUNT: usize = 50;
/// Default upper bound for the randomized initial trail length (in pairs).
pub const DEFAULT_TRAIL_COUNT: usize = 10;
/// Default number of ticks between trail topology updates.
pub const DEFAULT_INTERVAL_LENGTH: usize = 10;
/// Default global speed multiplier.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Largest accepted `line_count`.
pub const MAX_LINE_COUNT: usize = 10_000;
/// Largest accepted `trail_count`.
pub const MAX_TRAIL_COUNT: usize = 200;
/// Largest accepted `interval_length`.
pub const MAX_INTERVAL_LENGTH: usize = 120;
/// Largest accepted `speed`.
pub const MAX_SPEED: f64 = 10.0;

/// `candidate` if it lies in `min..=max`, otherwise `previous`.
fn bounded<T: PartialOrd>(candidate: T, min: T, max: T, previous: T) -> T {
    if candidate >= min && candidate <= max {
        candidate
    } else {
        previous
    }
}

/// Simulation configuration, replaced wholesale on every `update`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowLinesParams {
    /// Target live particle count.
    pub line_count: usize,
    /// New particles get `1 + floor(u * trail_count)` trail pairs.
    pub trail_count: usize,
    /// Trails gain/lose points only every `interval_length` ticks. Never 0.
    pub interval_length: usize,
    /// Global multiplier folded into each particle's speed at spawn.
    pub speed: f64,
}

impl Default for FlowLinesParams {
    fn default() -> Self {
        Self {
            line_count: DEFAULT_LINE_COUNT,
            trail_count: DEFAULT_TRAIL_COUNT,
            interval_length: DEFAULT_INTERVAL_LENGTH,
            speed: DEFAULT_SPEED,
        }
    }
}

impl FlowLinesParams {
    /// Applies an `update` payload on top of `self`.
    ///
    /// Missing or wrong-typed keys keep the current value (not the default),
    /// and so do values outside the ranges advertised by [`schema`](Self::schema).
    /// In particular an `interval_length` of 0 is ignored.
    pub fn merged(&self, update: &Value) -> Self {
        let line_count = param_usize(update, "line_count", self.line_count);
        let trail_count = param_usize(update, "trail_count", self.trail_count);
        let interval_length = param_usize(update, "interval_length", self.interval_length);
        let speed = param_f64(update, "speed", self.speed);
        Self {
            line_count: bounded(line_count, 0, MAX_LINE_COUNT, self.line_count),
            trail_count: bounded(trail_count, 0, MAX_TRAIL_COUNT, self.trail_count),
            interval_length: bounded(
                interval_length,
                1,
                MAX_INTERVAL_LENGTH,
                self.interval_length,
            ),
            speed: bounded(speed, 0.0, MAX_SPEED, self.speed),
        }
    }

    /// Current values as a JSON object.
    pub fn to_json(&self) -> Value {
        json!({
            "line_count": self.line_count,
            "trail_count": self.trail_count,
            "interval_length": self.interval_length,
            "speed": self.speed,
        })
    }

    /// Type, range, default and description of every tunable.
    pub fn schema() -> Value {
        json!({
            "line_count": {
                "type": "integer",
                "default": DEFAULT_LINE_COUNT,
                "min": 0,
                "max": MAX_LINE_COUNT,
                "description": "Target number of live particles"
            },
            "trail_count": {
                "type": "integer",
                "default": DEFAULT_TRAIL_COUNT,
                "min": 0,
                "max": MAX_TRAIL_COUNT,
                "description": "Upper bound on the random initial trail length, in point pairs"
            },
            "interval_length": {
                "type": "integer",
                "default": DEFAULT_INTERVAL_LENGTH,
                "min": 1,
                "max": MAX_INTERVAL_LENGTH,
                "description": "Ticks between trail insertions and removals"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": MAX_SPEED,
                "description": "Global multiplier on particle speed"
            }
        })
    }
}
