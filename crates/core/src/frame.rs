//! Packed per-frame vertex buffers handed to the renderer.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Two parallel flat `f32` buffers: interleaved `(x, y)` positions and
/// interleaved `(r, g, b, a)` colors, one entry per emitted trail point.
///
/// A `Frame` is built fresh every tick and moved to the consumer; nothing
/// keeps a reference to a frame once it has been emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "positions_buffer")]
    pub positions: Vec<f32>,
    #[serde(rename = "colors_buffer")]
    pub colors: Vec<f32>,
}

impl Frame {
    /// Empty frame with room for `points` vertices.
    pub fn with_capacity(points: usize) -> Self {
        Self {
            positions: Vec::with_capacity(points * 2),
            colors: Vec::with_capacity(points * 4),
        }
    }

    /// Appends one vertex to both buffers.
    pub fn push_point(&mut self, x: f64, y: f64, color: Rgba) {
        self.positions.extend([x as f32, y as f32]);
        self.colors.extend(color.map(|c| c as f32));
    }

    /// Number of vertices in the frame.
    pub fn point_count(&self) -> usize {
        self.positions.len() / 2
    }

    /// `true` when the buffers describe the same number of whole vertices.
    pub fn is_consistent(&self) -> bool {
        self.positions.len() % 2 == 0 && self.colors.len() == self.positions.len() * 2
    }

    /// Axis-aligned bounds of all positions as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut points = self.positions.chunks_exact(2);
        let first = points.next()?;
        let init = (first[0], first[1], first[0], first[1]);
        Some(points.fold(init, |(x0, y0, x1, y1), p| {
            (x0.min(p[0]), y0.min(p[1]), x1.max(p[0]), y1.max(p[1]))
        }))
    }
}
