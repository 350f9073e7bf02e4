#![deny(unsafe_code)]
//! Core types for the flowtrail particle-trail simulator.
//!
//! Provides the `Engine` trait, the `VectorField` grid and its nearest-cell
//! sampler, packed `Frame` buffers, field-to-display color conversion, the
//! `Xorshift64` PRNG, JSON parameter helpers, procedural field sources, and
//! the replayable `RunSpec`.

pub mod color;
pub mod engine;
pub mod error;
pub mod field;
pub mod field_source;
pub mod frame;
pub mod params;
pub mod prng;
pub mod run_spec;

pub use color::{color_from_rgb, Rgba, Srgb};
pub use engine::Engine;
pub use error::EngineError;
pub use field::VectorField;
pub use frame::Frame;
pub use prng::Xorshift64;
pub use run_spec::RunSpec;
