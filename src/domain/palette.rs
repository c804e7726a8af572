//! Dominant color extraction from decoded RGBA bitmaps.

use std::collections::HashMap;

use crate::domain::entities::color::Color;

pub const DEFAULT_STRIDE: usize = 4;
pub const ALPHA_THRESHOLD: u8 = 128;
pub const PALETTE_SIZE: usize = 3;

const BYTES_PER_PIXEL: usize = 4;

/// Samples every `stride`-th pixel of a tightly packed RGBA buffer, skips pixels whose alpha is
/// below [`ALPHA_THRESHOLD`] and returns up to [`PALETTE_SIZE`] exact colors by frequency.
///
/// Buckets with equal counts keep scan order, so the result only depends on the buffer and stride.
/// A trailing partial pixel is ignored.
pub fn dominant_colors(rgba: &[u8], stride: usize) -> Vec<Color> {
    // value: (count, first seen position)
    let mut buckets: HashMap<[u8; 3], (usize, usize)> = HashMap::new();

    for (position, pixel) in rgba.chunks_exact(BYTES_PER_PIXEL).step_by(stride.max(1)).enumerate() {
        if pixel[3] < ALPHA_THRESHOLD {
            continue;
        }
        let entry = buckets.entry([pixel[0], pixel[1], pixel[2]]).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<([u8; 3], (usize, usize))> = buckets.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });

    ranked
        .into_iter()
        .take(PALETTE_SIZE)
        .map(|([r, g, b], _)| Color::from_rgb(r, g, b))
        .collect()
}
