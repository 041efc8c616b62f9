//! Pairs-of-values chi-square test.
//!
//! LSB replacement equalizes the frequencies of the values `2i` and
//! `2i + 1`. For each tile a 256-bin histogram of gray samples is built and
//! every pair contributes `(o - e)^2 / e` for both of its members, with
//! `e` the pair mean. Pairs that never occur are ignored. The statistic is
//! the average over all tiles, so lower values point at embedding.
use image::RgbImage;

use super::tiles;

/// Average per-tile chi-square statistic of `image`.
///
/// Returns `0.0` for an empty image or a zero block size.
#[must_use]
pub fn chi_square(image: &RgbImage, block_size: u32) -> f64
{
    let (sum, tile_count) = tiles(image, block_size)
        .filter(|samples| !samples.is_empty())
        .fold((0.0, 0usize), |(sum, count), samples| {
            (sum + tile_statistic(&samples), count + 1)
        });

    if tile_count == 0 { 0.0 } else { sum / tile_count as f64 }
}

fn tile_statistic(samples: &[u8]) -> f64
{
    let mut histogram = [0u32; 256];
    for &sample in samples
    {
        histogram[usize::from(sample)] += 1;
    }

    histogram
        .chunks_exact(2)
        .map(|pair| {
            let (even, odd) = (f64::from(pair[0]), f64::from(pair[1]));
            let expected = (even + odd) / 2.0;
            if expected > 0.0
            {
                ((even - expected).powi(2) + (odd - expected).powi(2))
                    / expected
            }
            else
            {
                0.0
            }
        })
        .sum()
}
