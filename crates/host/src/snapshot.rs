//! PNG snapshots of a [`Frame`], behind the `png` feature (default on).
//!
//! The WASM crate disables the feature and never links `image`.

use flowtrail_core::error::EngineError;
use flowtrail_core::frame::Frame;
use log::debug;
use std::path::Path;

use crate::pixel::{frame_to_rgba, Rgba8};

/// Writes the frame's points as a `width * height` PNG over `background`.
///
/// Returns `EngineError::InvalidDimensions` if a dimension is zero or
/// overflows `u32`, or `EngineError::Io` on write failure.
pub fn write_png(
    frame: &Frame,
    width: usize,
    height: usize,
    background: Rgba8,
    path: &Path,
) -> Result<(), EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let w = u32::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
    let rgba = frame_to_rgba(frame, width, height, background);
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    debug!("wrote {}x{} snapshot to {}", width, height, path.display());
    Ok(())
}
