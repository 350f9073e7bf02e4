//! Rasterizes frame points into an RGBA8 buffer.
//!
//! Free of the `image` crate, so builds without the `png` feature still
//! have it.

use flowtrail_core::field::{DOMAIN_HALF_HEIGHT, DOMAIN_HALF_WIDTH};
use flowtrail_core::frame::Frame;

/// Opaque RGBA8 color.
pub type Rgba8 = [u8; 4];

/// Maps a domain coordinate to a pixel, with `y` pointing up.
///
/// Returns `None` for points outside the domain rectangle.
pub fn to_pixel(x: f32, y: f32, width: usize, height: usize) -> Option<(usize, usize)> {
    let u = (f64::from(x) + DOMAIN_HALF_WIDTH) / (2.0 * DOMAIN_HALF_WIDTH);
    let v = (DOMAIN_HALF_HEIGHT - f64::from(y)) / (2.0 * DOMAIN_HALF_HEIGHT);
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return None;
    }
    let px = ((u * width as f64) as usize).min(width.saturating_sub(1));
    let py = ((v * height as f64) as usize).min(height.saturating_sub(1));
    Some((px, py))
}

/// Splats every frame point onto a `width * height` RGBA8 buffer filled
/// with `background`, alpha-blending each point's color over what is there.
///
/// The buffer length is `width * height * 4`.
pub fn frame_to_rgba(frame: &Frame, width: usize, height: usize, background: Rgba8) -> Vec<u8> {
    let mut buf: Vec<u8> = background
        .iter()
        .copied()
        .cycle()
        .take(width * height * 4)
        .collect();
    if width == 0 || height == 0 {
        return buf;
    }

    for (pos, color) in frame
        .positions
        .chunks_exact(2)
        .zip(frame.colors.chunks_exact(4))
    {
        let Some((px, py)) = to_pixel(pos[0], pos[1], width, height) else {
            continue;
        };
        let offset = (py * width + px) * 4;
        let alpha = color[3].clamp(0.0, 1.0);
        for c in 0..3 {
            let src = color[c].clamp(0.0, 1.0) * 255.0;
            let dst = f32::from(buf[offset + c]);
            buf[offset + c] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
        buf[offset + 3] = 255;
    }
    buf
}
