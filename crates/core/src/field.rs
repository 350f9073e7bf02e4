//! Discretized vector field covering the simulation domain.
//!
//! A `VectorField` is a `width × height` grid of channel triples laid over
//! the logical rectangle `x ∈ [-2, 2]`, `y ∈ [-1, 1]`. Cells are addressed
//! `[cell_x][cell_y]` (column-major, matching the host's nested array
//! form). Sampling is nearest-cell with border clamping, so any coordinate,
//! inside the domain or not, resolves to a valid cell.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Half extent of the domain along x.
pub const DOMAIN_HALF_WIDTH: f64 = 2.0;
/// Half extent of the domain along y.
pub const DOMAIN_HALF_HEIGHT: f64 = 1.0;

/// One cell's channel triple, each nominally in `0..=255`.
pub type Channels = [f64; 3];

/// Returns `true` if `(x, y)` lies inside the closed domain rectangle.
pub fn in_domain(x: f64, y: f64) -> bool {
    x.abs() <= DOMAIN_HALF_WIDTH && y.abs() <= DOMAIN_HALF_HEIGHT
}

/// A read-only grid of channel triples sampled by particle position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldPayload", into = "FieldPayload")]
pub struct VectorField {
    width: usize,
    height: usize,
    /// Column-major: index is `cell_x * height + cell_y`.
    cells: Vec<Channels>,
}

impl VectorField {
    /// Creates a field where every cell holds `channels`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or `width * height` overflows, and `InvalidMessage` if a channel is
    /// not finite.
    pub fn uniform(width: usize, height: usize, channels: Channels) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        check_finite(0, 0, &channels)?;
        Ok(Self {
            width,
            height,
            cells: vec![channels; len],
        })
    }

    /// Creates a field from column-major cells (`cell_x * height + cell_y`).
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<Channels>,
    ) -> Result<Self, EngineError> {
        let expected = checked_len(width, height)?;
        if cells.len() != expected {
            return Err(EngineError::DimensionMismatch {
                width,
                height,
                cells: cells.len(),
            });
        }
        for (i, channels) in cells.iter().enumerate() {
            check_finite(i / height, i % height, channels)?;
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Field width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channel triple stored at a cell. Indices are clamped to the grid.
    pub fn cell(&self, cell_x: usize, cell_y: usize) -> Channels {
        let cx = cell_x.min(self.width - 1);
        let cy = cell_y.min(self.height - 1);
        self.cells[cx * self.height + cy]
    }

    /// Maps a domain coordinate to the cell that covers it.
    ///
    /// Coordinates outside the domain clamp to the border row/column; NaN
    /// maps to cell 0.
    pub fn cell_index(&self, x: f64, y: f64) -> (usize, usize) {
        let tx = (x + DOMAIN_HALF_WIDTH) / (2.0 * DOMAIN_HALF_WIDTH);
        let ty = (y + DOMAIN_HALF_HEIGHT) / (2.0 * DOMAIN_HALF_HEIGHT);
        (axis_cell(tx, self.width), axis_cell(ty, self.height))
    }

    /// Nearest-cell lookup of the channel triple at a domain coordinate.
    pub fn sample(&self, x: f64, y: f64) -> Channels {
        let (cx, cy) = self.cell_index(x, y);
        self.cells[cx * self.height + cy]
    }
}

pub(crate) fn checked_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)
}

fn check_finite(x: usize, y: usize, channels: &Channels) -> Result<(), EngineError> {
    if channels.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(EngineError::InvalidMessage(format!(
            "cell ({x}, {y}) has a non-finite channel"
        )))
    }
}

/// Floors `t * cells` and clamps into `[0, cells - 1]`.
fn axis_cell(t: f64, cells: usize) -> usize {
    let scaled = (t * cells as f64).floor();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(cells - 1)
    }
}

/// Wire form of a field as sent by the host: `array[cell_x][cell_y]` is a
/// channel list of at least three numbers (extra channels are ignored).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPayload {
    pub array: Vec<Vec<Vec<f64>>>,
    pub width: usize,
    pub height: usize,
}

impl TryFrom<FieldPayload> for VectorField {
    type Error = EngineError;

    fn try_from(payload: FieldPayload) -> Result<Self, Self::Error> {
        let FieldPayload {
            array,
            width,
            height,
        } = payload;
        let expected = checked_len(width, height)?;
        let mismatch = |cells| EngineError::DimensionMismatch {
            width,
            height,
            cells,
        };
        if array.len() != width {
            let cells = array.iter().map(Vec::len).sum();
            return Err(mismatch(cells));
        }
        let mut cells = Vec::with_capacity(expected);
        for (x, column) in array.into_iter().enumerate() {
            if column.len() != height {
                return Err(mismatch(x * height + column.len()));
            }
            for (y, cell) in column.into_iter().enumerate() {
                match cell.as_slice() {
                    [c0, c1, c2, ..] => {
                        let channels = [*c0, *c1, *c2];
                        check_finite(x, y, &channels)?;
                        cells.push(channels);
                    }
                    short => {
                        return Err(EngineError::InvalidMessage(format!(
                            "cell ({x}, {y}) has {} channels, expected 3",
                            short.len()
                        )))
                    }
                }
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

impl From<VectorField> for FieldPayload {
    fn from(field: VectorField) -> Self {
        let array = field
            .cells
            .chunks(field.height)
            .map(|column| column.iter().map(|c| c.to_vec()).collect())
            .collect();
        Self {
            array,
            width: field.width,
            height: field.height,
        }
    }
}
