//! Flattens particle trails into renderer buffers.

use crate::particle::Particle;
use flowtrail_core::frame::Frame;

/// Weight of the oldest trail point at gate phase `interval`.
///
/// Goes from 1 right after an insertion down towards 0 just before the next
/// one, so the tail tip retracts smoothly between topology updates.
pub fn tip_weight(interval: usize, interval_length: usize) -> f64 {
    1.0 - interval as f64 / interval_length.max(1) as f64
}

/// Packs every trail point of every particle, in particle order then
/// newest-to-oldest.
///
/// The oldest point of each trail is emitted at
/// `a * oldest + (1 - a) * second_oldest` (keeping the oldest point's color),
/// where `a` is the [`tip_weight`].
pub fn pack(particles: &[Particle], tip_weight: f64) -> Frame {
    let total = particles.iter().map(|p| p.trail().len()).sum();
    let mut frame = Frame::with_capacity(total);

    for particle in particles {
        let trail = particle.trail();
        let n = trail.len();
        let mut previous = None;
        for (k, point) in trail.iter().enumerate() {
            match previous {
                Some((px, py)) if k + 1 == n => {
                    let x = tip_weight * point.x + (1.0 - tip_weight) * px;
                    let y = tip_weight * point.y + (1.0 - tip_weight) * py;
                    frame.push_point(x, y, point.color);
                }
                _ => frame.push_point(point.x, point.y, point.color),
            }
            previous = Some((point.x, point.y));
        }
    }

    frame
}
