//! Wire messages exchanged between the host page and the simulation worker.
//!
//! Every inbound message is an envelope `{"type": ..., "data": {...}}`.
//! `"update"` carries configuration; any other type is treated as a tick
//! whose payload must hold a numeric `delta_time`. The only outbound message
//! is `"iterate"`, carrying the freshly packed frame buffers.

use flowtrail_core::error::EngineError;
use flowtrail_core::field::VectorField;
use flowtrail_core::frame::Frame;
use flowtrail_core::params::require_f64;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Message type that reconfigures the simulation.
pub const UPDATE: &str = "update";
/// Message type conventionally used for ticks.
pub const TICK: &str = "tick";

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Configuration payload, always a JSON object.
    Update(Value),
    /// Advance the simulation by `delta_time`.
    Tick { delta_time: f64 },
}

impl Inbound {
    /// Decodes an envelope.
    ///
    /// A non-object envelope is `EngineError::InvalidMessage`. An update whose
    /// `data` is missing or not an object decodes as an empty update. A tick
    /// without a numeric `delta_time` fails the same way [`require_f64`] does.
    pub fn from_value(message: &Value) -> Result<Self, EngineError> {
        let envelope = message.as_object().ok_or_else(|| {
            EngineError::InvalidMessage(format!("expected an object envelope, got {message}"))
        })?;
        let data = envelope.get("data").unwrap_or(&Value::Null);

        match envelope.get("type").and_then(Value::as_str) {
            Some(UPDATE) => {
                let payload = match data {
                    Value::Object(_) => data.clone(),
                    _ => Value::Object(Map::new()),
                };
                Ok(Self::Update(payload))
            }
            _ => Ok(Self::Tick {
                delta_time: require_f64(data, "delta_time")?,
            }),
        }
    }

    /// Parses and decodes a JSON envelope.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let message: Value =
            serde_json::from_str(text).map_err(|e| EngineError::InvalidMessage(e.to_string()))?;
        Self::from_value(&message)
    }

    /// Builds a typed update message.
    pub fn update(update: &Update) -> Self {
        // field channels are finite, and a non-finite speed becomes null
        let payload = serde_json::to_value(update).unwrap_or_else(|_| Value::Object(Map::new()));
        Self::Update(payload)
    }

    pub fn tick(delta_time: f64) -> Self {
        Self::Tick { delta_time }
    }

    /// Encodes back into the envelope form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Update(data) => json!({"type": UPDATE, "data": data}),
            Self::Tick { delta_time } => json!({"type": TICK, "data": {"delta_time": delta_time}}),
        }
    }
}

/// Typed form of an `update` payload. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_field: Option<VectorField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Update {
    /// An update that replaces only the field.
    pub fn with_field(field: VectorField) -> Self {
        Self {
            flow_field: Some(field),
            ..Self::default()
        }
    }
}

/// A message sent back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Outbound {
    /// Packed buffers for the tick that was just processed.
    Iterate(Frame),
}

impl Outbound {
    /// Moves the frame out of the message.
    pub fn into_frame(self) -> Frame {
        match self {
            Self::Iterate(frame) => frame,
        }
    }
}
