//! Conversion from sampled field channels to renderer colors.
//!
//! Field cells carry sRGB channels in `0..=255`. Renderers consume the
//! GL-style float form: each channel normalized to `[0, 1]` with an
//! explicit alpha.

use serde::{Deserialize, Serialize};

/// Largest value a field channel can hold.
pub const CHANNEL_MAX: f64 = 255.0;

/// An RGBA color in GL float form, every component in [0, 1].
pub type Rgba = [f64; 4];

/// Opaque black, the color of freshly spawned trail points.
pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// sRGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    /// Builds a color from 8-bit style channels, clamping each to `0..=255`.
    ///
    /// NaN channels are treated as 0.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: normalize_channel(r),
            g: normalize_channel(g),
            b: normalize_channel(b),
        }
    }

    /// GL float form with full opacity.
    pub fn to_gl(self) -> Rgba {
        [self.r, self.g, self.b, 1.0]
    }
}

fn normalize_channel(c: f64) -> f64 {
    if c.is_nan() {
        return 0.0;
    }
    c.clamp(0.0, CHANNEL_MAX) / CHANNEL_MAX
}

/// Display color for a sampled channel triple.
pub fn color_from_rgb(r: f64, g: f64, b: f64) -> Rgba {
    Srgb::from_channels(r, g, b).to_gl()
}
