//! WASM bindings for running the flowtrail worker inside a browser web worker.
//!
//! The page posts `update` payloads as JSON strings and calls
//! [`FlowWorker::tick`] once per animation frame. Each tick hands back an
//! [`IterateFrame`] whose buffers are moved to JS as `Float32Array`s.

use flowtrail_core::error::EngineError;
use flowtrail_core::frame::Frame;
use flowtrail_host::{Inbound, Worker};
use flowtrail_lines::{FlowLines, FlowLinesParams};
use wasm_bindgen::prelude::*;

/// A flow-lines worker owned by JS.
#[wasm_bindgen]
pub struct FlowWorker {
    worker: Worker,
}

/// Buffers produced by one tick. Each buffer can be taken exactly once.
#[wasm_bindgen]
pub struct IterateFrame {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

#[wasm_bindgen]
impl FlowWorker {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> FlowWorker {
        FlowWorker {
            worker: Worker::new(FlowLines::new(seed, FlowLinesParams::default())),
        }
    }

    /// Applies an `update` payload given as a JSON object string.
    pub fn update(&mut self, payload: &str) -> Result<(), JsError> {
        Ok(self.apply_update(payload)?)
    }

    /// Advances the simulation and returns the packed buffers.
    pub fn tick(&mut self, delta_time: f64) -> Result<IterateFrame, JsError> {
        Ok(self.advance(delta_time)?.into())
    }

    /// Processes a full `{"type", "data"}` envelope, returning the JSON reply
    /// for ticks.
    pub fn handle(&mut self, message: &str) -> Result<Option<String>, JsError> {
        Ok(self.worker.handle_json(message)?)
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> usize {
        self.worker.engine().particle_count()
    }
}

impl FlowWorker {
    fn apply_update(&mut self, payload: &str) -> Result<(), EngineError> {
        let data: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| EngineError::InvalidMessage(e.to_string()))?;
        if !data.is_object() {
            return Err(EngineError::InvalidMessage(
                "update payload must be a JSON object".into(),
            ));
        }
        self.worker.handle(Inbound::Update(data))?;
        Ok(())
    }

    fn advance(&mut self, delta_time: f64) -> Result<Frame, EngineError> {
        let reply = self.worker.handle(Inbound::tick(delta_time))?;
        Ok(reply.map(|r| r.into_frame()).unwrap_or_default())
    }
}

#[wasm_bindgen]
impl IterateFrame {
    /// Moves the interleaved `(x, y)` buffer out, leaving it empty.
    pub fn take_positions(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.positions)
    }

    /// Moves the interleaved `(r, g, b, a)` buffer out, leaving it empty.
    pub fn take_colors(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.colors)
    }

    #[wasm_bindgen(getter)]
    pub fn point_count(&self) -> usize {
        self.positions.len() / 2
    }
}

impl From<Frame> for IterateFrame {
    fn from(frame: Frame) -> Self {
        Self {
            positions: frame.positions,
            colors: frame.colors,
        }
    }
}
