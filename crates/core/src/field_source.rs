//! Procedural vector sources and their rasterization into a [`VectorField`].
//!
//! Hosts normally ship a precomputed field, but headless runs (the CLI,
//! tests, replay files) need to build one locally. A [`FieldSource`]
//! yields a continuous (dx, dy) direction at any domain point;
//! [`rasterize`] bakes it into channel triples that steer particles along
//! that direction.

use crate::color::CHANNEL_MAX;
use crate::error::EngineError;
use crate::field::{
    checked_len, Channels, VectorField, DOMAIN_HALF_HEIGHT, DOMAIN_HALF_WIDTH,
};
use noise::{NoiseFn, Perlin};
use std::f64::consts::TAU;

/// A continuous 2D direction field. Must be deterministic.
pub trait FieldSource: Send + Sync {
    /// Direction vector at domain coordinate (x, y).
    fn sample(&self, x: f64, y: f64) -> (f64, f64);
}

/// Perlin noise field: two decorrelated noise samples give (dx, dy).
pub struct PerlinField {
    noise: Perlin,
    scale: f64,
}

/// Curl of a scalar Perlin potential, approximately divergence-free.
pub struct CurlField {
    noise: Perlin,
    scale: f64,
    eps: f64,
}

/// Rotational vortex with Gaussian falloff around a center.
pub struct Vortex {
    pub x: f64,
    pub y: f64,
    pub strength: f64,
    pub radius: f64,
}

/// Sums several sources.
#[derive(Default)]
pub struct CompositeField {
    sources: Vec<Box<dyn FieldSource>>,
}

const SINGULARITY_EPS: f64 = 1e-10;

impl PerlinField {
    pub fn new(scale: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
        }
    }
}

impl CurlField {
    pub fn new(scale: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            eps: 1e-4,
        }
    }
}

impl CompositeField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source (builder style).
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, source: Box<dyn FieldSource>) -> Self {
        self.sources.push(source);
        self
    }
}

impl FieldSource for PerlinField {
    fn sample(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = x * self.scale;
        let sy = y * self.scale;
        (
            self.noise.get([sx, sy, 0.5]),
            self.noise.get([sx + 100.0, sy + 100.0, 0.5]),
        )
    }
}

impl FieldSource for CurlField {
    fn sample(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = x * self.scale;
        let sy = y * self.scale;
        let eps = self.eps;
        // curl of scalar F: (dF/dy, -dF/dx)
        let df_dy =
            (self.noise.get([sx, sy + eps, 0.5]) - self.noise.get([sx, sy - eps, 0.5])) / (2.0 * eps);
        let df_dx =
            (self.noise.get([sx + eps, sy, 0.5]) - self.noise.get([sx - eps, sy, 0.5])) / (2.0 * eps);
        (df_dy, -df_dx)
    }
}

impl FieldSource for Vortex {
    fn sample(&self, x: f64, y: f64) -> (f64, f64) {
        let rx = x - self.x;
        let ry = y - self.y;
        let dist_sq = rx * rx + ry * ry;
        let dist = dist_sq.sqrt();
        if dist < SINGULARITY_EPS || self.radius.abs() < SINGULARITY_EPS {
            return (0.0, 0.0);
        }
        let falloff = (-dist_sq / (2.0 * self.radius * self.radius)).exp();
        (
            -ry / dist * self.strength * falloff,
            rx / dist * self.strength * falloff,
        )
    }
}

impl FieldSource for CompositeField {
    fn sample(&self, x: f64, y: f64) -> (f64, f64) {
        self.sources.iter().fold((0.0, 0.0), |(ax, ay), source| {
            let (sx, sy) = source.sample(x, y);
            (ax + sx, ay + sy)
        })
    }
}

/// Encodes a direction as a channel triple.
///
/// The stepper turns a triple into the heading
/// `angle = (c0 + c1 + c2) / (3 * 255) * 2π` and pushes along
/// `(sin angle, cos angle)`, so the heading here is `atan2(dx, dy)` spread
/// evenly over all three channels. A zero vector encodes heading 0.
pub fn encode_direction(dx: f64, dy: f64) -> Channels {
    let angle = if dx.abs() < SINGULARITY_EPS && dy.abs() < SINGULARITY_EPS {
        0.0
    } else {
        dx.atan2(dy).rem_euclid(TAU)
    };
    let c = angle / TAU * CHANNEL_MAX;
    [c, c, c]
}

/// Samples `source` at every cell center and bakes the directions into a field.
pub fn rasterize(
    source: &dyn FieldSource,
    width: usize,
    height: usize,
) -> Result<VectorField, EngineError> {
    checked_len(width, height)?;
    let cell_w = 2.0 * DOMAIN_HALF_WIDTH / width as f64;
    let cell_h = 2.0 * DOMAIN_HALF_HEIGHT / height as f64;
    let cells = (0..width)
        .flat_map(|cx| {
            let x = -DOMAIN_HALF_WIDTH + (cx as f64 + 0.5) * cell_w;
            (0..height).map(move |cy| {
                let y = -DOMAIN_HALF_HEIGHT + (cy as f64 + 0.5) * cell_h;
                let (dx, dy) = source.sample(x, y);
                encode_direction(dx, dy)
            })
        })
        .collect();
    VectorField::from_cells(width, height, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(c: Channels) -> f64 {
        (c[0] + c[1] + c[2]) / (3.0 * CHANNEL_MAX) * TAU
    }

    #[test]
    fn encode_direction_round_trips_through_heading() {
        for (dx, dy) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.3, -0.8)] {
            let a = heading(encode_direction(dx, dy));
            let len = f64::hypot(dx, dy);
            assert!((a.sin() - dx / len).abs() < 1e-9, "sin mismatch for ({dx}, {dy})");
            assert!((a.cos() - dy / len).abs() < 1e-9, "cos mismatch for ({dx}, {dy})");
        }
    }

    #[test]
    fn encode_direction_channels_stay_in_range() {
        for i in 0..360 {
            let a = (i as f64).to_radians();
            let c = encode_direction(a.cos(), a.sin());
            assert!(c.iter().all(|v| (0.0..=CHANNEL_MAX).contains(v)), "{c:?}");
        }
    }

    #[test]
    fn zero_vector_encodes_heading_zero() {
        assert_eq!(encode_direction(0.0, 0.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn vortex_circulates_counter_clockwise() {
        let v = Vortex {
            x: 0.0,
            y: 0.0,
            strength: 1.0,
            radius: 1.0,
        };
        // right of center -> pushed up
        let (dx, dy) = v.sample(0.5, 0.0);
        assert!(dx.abs() < 1e-12);
        assert!(dy > 0.0);
    }

    #[test]
    fn vortex_zero_radius_returns_zero() {
        let v = Vortex {
            x: 0.0,
            y: 0.0,
            strength: 1.0,
            radius: 0.0,
        };
        assert_eq!(v.sample(1.0, 0.0), (0.0, 0.0));
    }

    fn unit_vortex() -> Vortex {
        Vortex {
            x: 0.0,
            y: 0.0,
            strength: 1.0,
            radius: 1.0,
        }
    }

    #[test]
    fn composite_sums_sources() {
        let expected = unit_vortex().sample(0.4, 0.2);
        let composite = CompositeField::new()
            .add(Box::new(unit_vortex()))
            .add(Box::new(unit_vortex()));
        let (dx, dy) = composite.sample(0.4, 0.2);
        assert!((dx - 2.0 * expected.0).abs() < 1e-12);
        assert!((dy - 2.0 * expected.1).abs() < 1e-12);
    }

    #[test]
    fn noise_sources_are_finite_and_deterministic() {
        let curl = CurlField::new(1.5, 7);
        let perlin = PerlinField::new(1.5, 7);
        for i in 0..50 {
            let x = -2.0 + i as f64 * 0.08;
            let y = -1.0 + i as f64 * 0.04;
            let a = curl.sample(x, y);
            assert!(a.0.is_finite() && a.1.is_finite());
            assert_eq!(a, CurlField::new(1.5, 7).sample(x, y));
            let b = perlin.sample(x, y);
            assert!(b.0.is_finite() && b.1.is_finite());
        }
    }

    #[test]
    fn rasterize_produces_requested_dimensions() {
        let field = rasterize(&CurlField::new(2.0, 1), 40, 20).unwrap();
        assert_eq!(field.width(), 40);
        assert_eq!(field.height(), 20);
    }

    #[test]
    fn rasterize_rejects_empty_grid() {
        assert!(rasterize(&PerlinField::new(1.0, 1), 0, 10).is_err());
    }

    #[test]
    fn rasterize_rejects_overflowing_grid() {
        assert!(matches!(
            rasterize(&CurlField::new(1.0, 1), usize::MAX, 2),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn rasterized_vortex_steers_along_source_direction() {
        let vortex = Vortex {
            x: 0.0,
            y: 0.0,
            strength: 1.0,
            radius: 1.0,
        };
        let field = rasterize(&vortex, 64, 32).unwrap();
        // sample right of the center: direction should be mostly +y
        let a = heading(field.sample(0.5, 0.0));
        assert!(a.cos() > 0.9, "expected upward heading, got cos = {}", a.cos());
    }
}
