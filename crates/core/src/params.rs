//! Helpers for pulling typed tunables out of a `serde_json::Value` payload.
//!
//! The `param_*` helpers never fail: a missing key, a `null`, or a value of
//! the wrong type yields the supplied fallback. Host `update` messages pass
//! the currently active value as the fallback, so an omitted field leaves
//! the tunable unchanged.

use crate::error::EngineError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `fallback` if missing or wrong type.
///
/// Accepts both JSON floats and integers.
pub fn param_f64(params: &Value, name: &str, fallback: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(fallback)
}

/// Extracts a `usize` from `params[name]`, returning `fallback` if missing or wrong type.
///
/// Only non-negative integers are accepted; floats and negatives fall back.
pub fn param_usize(params: &Value, name: &str, fallback: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(fallback)
}

/// Extracts a mandatory `f64` from `params[name]`.
///
/// Returns `EngineError::ParamNotFound` if the key is absent (or `null`) and
/// `EngineError::ParamTypeMismatch` if it holds something other than a number.
pub fn require_f64(params: &Value, name: &str) -> Result<f64, EngineError> {
    match params.get(name) {
        None | Some(Value::Null) => Err(EngineError::ParamNotFound(name.to_owned())),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| EngineError::ParamTypeMismatch {
                name: name.to_owned(),
                expected: "number".to_owned(),
                got: json_type_name(value).to_owned(),
            }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
