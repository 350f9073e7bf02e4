//! The `Engine` trait implemented by every tick-driven simulation.
//!
//! The trait is object-safe so hosts and the CLI can drive an engine as
//! `dyn Engine` without knowing its concrete type.

use crate::error::EngineError;
use crate::frame::Frame;
use serde_json::Value;

/// A message-driven simulation that turns elapsed time into vertex buffers.
///
/// Hosts call [`reconfigure`](Engine::reconfigure) for `update` messages and
/// [`step`](Engine::step) followed by [`emit`](Engine::emit) for ticks.
pub trait Engine {
    /// Applies a configuration payload.
    ///
    /// Keys that are missing or of the wrong type keep their current value.
    /// Implementations discard live simulation state so the next tick starts
    /// from the new configuration.
    fn reconfigure(&mut self, update: &Value);

    /// Advances the simulation by `dt` time units.
    fn step(&mut self, dt: f64) -> Result<(), EngineError>;

    /// Packs the current state into freshly allocated buffers.
    fn emit(&self) -> Frame;

    /// Current tunable values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing every tunable: type, range, default, description.
    fn param_schema(&self) -> Value;
}
