//! Reproducible description of a headless run.
//!
//! A [`RunSpec`] captures everything needed to replay a session: which
//! procedural field to bake, at what resolution, the tunables sent in the
//! `update` message, the PRNG seed, and the tick schedule.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Replayable run: same spec, same binary, bit-identical frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    /// Procedural field source name (e.g. `"curl"`).
    pub source: String,
    /// Field width in cells.
    pub width: usize,
    /// Field height in cells.
    pub height: usize,
    /// Tunables applied as an `update` payload.
    pub params: serde_json::Value,
    pub seed: u64,
    /// Number of ticks to run.
    pub ticks: usize,
    /// Elapsed time per tick.
    pub dt: f64,
}

impl RunSpec {
    /// Creates a spec with empty params, zero ticks and `dt = 1`.
    pub fn new(source: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            source: source.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            ticks: 0,
            dt: 1.0,
        }
    }

    /// Validates field dimensions and the tick length.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(EngineError::ParamTypeMismatch {
                name: "dt".into(),
                expected: "finite non-negative number".into(),
                got: self.dt.to_string(),
            });
        }
        Ok(())
    }
}
