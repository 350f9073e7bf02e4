//! Registry of procedural field sources for headless runs.
//!
//! Maps source names to [`FieldSource`] implementations so the CLI and
//! replay files can bake a [`VectorField`] without a browser host.

use flowtrail_core::error::EngineError;
use flowtrail_core::field::VectorField;
use flowtrail_core::field_source::{
    rasterize, CompositeField, CurlField, FieldSource, PerlinField, Vortex,
};
use flowtrail_core::params::param_f64;
use serde_json::Value;

/// All available source names.
const SOURCE_NAMES: &[&str] = &["curl", "perlin", "vortex", "uniform"];

const DEFAULT_SCALE: f64 = 1.5;
const DEFAULT_STRENGTH: f64 = 1.0;
const DEFAULT_RADIUS: f64 = 0.6;

/// The procedural sources the CLI can bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Curl of Perlin noise.
    Curl,
    /// Raw Perlin noise direction.
    Perlin,
    /// Two counter-rotating vortices, one in each half of the domain.
    Vortex,
    /// The same heading everywhere.
    Uniform,
}

/// Constant direction `(sin angle, cos angle)`.
struct Heading {
    dx: f64,
    dy: f64,
}

impl FieldSource for Heading {
    fn sample(&self, _x: f64, _y: f64) -> (f64, f64) {
        (self.dx, self.dy)
    }
}

impl FieldKind {
    /// Looks a source up by name.
    ///
    /// Returns `EngineError::UnknownSource` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "curl" => Ok(Self::Curl),
            "perlin" => Ok(Self::Perlin),
            "vortex" => Ok(Self::Vortex),
            "uniform" => Ok(Self::Uniform),
            _ => Err(EngineError::UnknownSource(name.to_string())),
        }
    }

    /// Returns a slice of all recognized source names.
    pub fn list_names() -> &'static [&'static str] {
        SOURCE_NAMES
    }

    /// Source knobs read from the params object, as `(name, default)`.
    pub fn knobs(self) -> &'static [(&'static str, f64)] {
        match self {
            Self::Curl | Self::Perlin => &[("scale", DEFAULT_SCALE)],
            Self::Vortex => &[("strength", DEFAULT_STRENGTH), ("radius", DEFAULT_RADIUS)],
            Self::Uniform => &[("angle", 0.0)],
        }
    }

    /// Builds the continuous source. Noise sources are seeded from `seed`.
    pub fn build(self, seed: u64, params: &Value) -> Box<dyn FieldSource> {
        let noise_seed = (seed ^ (seed >> 32)) as u32;
        match self {
            Self::Curl => Box::new(CurlField::new(
                param_f64(params, "scale", DEFAULT_SCALE),
                noise_seed,
            )),
            Self::Perlin => Box::new(PerlinField::new(
                param_f64(params, "scale", DEFAULT_SCALE),
                noise_seed,
            )),
            Self::Vortex => {
                let strength = param_f64(params, "strength", DEFAULT_STRENGTH);
                let radius = param_f64(params, "radius", DEFAULT_RADIUS);
                let vortex = |x: f64, strength: f64| Vortex {
                    x,
                    y: 0.0,
                    strength,
                    radius,
                };
                Box::new(
                    CompositeField::new()
                        .add(Box::new(vortex(-1.0, strength)))
                        .add(Box::new(vortex(1.0, -strength))),
                )
            }
            Self::Uniform => {
                let angle = param_f64(params, "angle", 0.0);
                Box::new(Heading {
                    dx: angle.sin(),
                    dy: angle.cos(),
                })
            }
        }
    }

    /// Bakes the source into a `width * height` field.
    pub fn bake(
        self,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<VectorField, EngineError> {
        rasterize(self.build(seed, params).as_ref(), width, height)
    }
}
