//! Error types for flowtrail.

use thiserror::Error;

/// Errors produced by field construction, engine steps and host messages.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero when creating a vector field.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Cell data did not match the declared field dimensions.
    #[error("dimension mismatch: declared ({width}, {height}), got {cells} cells")]
    DimensionMismatch {
        width: usize,
        height: usize,
        cells: usize,
    },

    /// No procedural field source is registered under this name.
    #[error("unknown field source: {0}")]
    UnknownSource(String),

    /// A required message field was absent.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A message field existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// The engine was ticked before any vector field was configured.
    #[error("no vector field configured")]
    MissingField,

    /// An inbound message could not be decoded.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),
}
