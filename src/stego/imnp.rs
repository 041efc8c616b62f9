//! Variable-depth embedding by min/max neighbourhood prediction (IMNP).
//!
//! The image is split into 2x2 blocks at even coordinates. The top-left
//! pixel of a block and the top-left pixels of its right, lower and
//! diagonal neighbours are the corners `c00`, `c02`, `c20`, `c22`. Corners
//! fall back to `c00` past the image border and are never modified.
//!
//! From the corners a block predicts its three remaining pixels:
//!
//! ```text
//! c01 = (Omax + (c00 + c02) / 2) / 2
//! c10 = (Omax + (c00 + c20) / 2) / 2
//! c11 = (c10 + c01) / 2
//! ```
//!
//! and each predicted pixel `c` may carry `floor(log2(c - Omin))` bits. The
//! bits are stored as an offset `R` below `Omax` (for `c01` and `c10`) or
//! above `Omin` (for `c11`). Extraction recomputes the same depths from the
//! untouched corners, so both sides go through [`predict`].
use image::RgbImage;
use tracing::debug;

use super::{StegoError, ensure_capacity};
use crate::bitstream;
use crate::pixels::{self, gray};

/// Prediction for one 2x2 block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPrediction
{
    /// Smallest corner sample
    pub low: i32,
    /// Largest corner sample
    pub high: i32,
    /// Bits carried by `c01`, `c10` and `c11`
    pub depths: [u32; 3],
}

/// Reference a slot offset is measured from
#[derive(Clone, Copy)]
enum Reference
{
    High,
    Low,
}

/// Predicted pixels of a block as `(dx, dy, reference)`, in embedding order
const SLOTS: [(u32, u32, Reference); 3] = [
    (1, 0, Reference::High),
    (0, 1, Reference::High),
    (1, 1, Reference::Low),
];

/// Hides `message` in the predicted pixels of a copy of `cover`.
///
/// # Errors
///
/// Returns [`StegoError::CapacityExceeded`] when the marked payload has more
/// bits than the summed block depths.
pub fn embed(cover: &RgbImage, message: &str) -> Result<RgbImage, StegoError>
{
    let bits = bitstream::encode(message);
    ensure_capacity(bits.len(), capacity_bits(cover))?;
    debug!(bits = bits.len(), "imnp embed");

    let mut stego = cover.clone();
    let mut remaining = bits.as_slice();
    for (x, y) in block_origins(cover)
    {
        let prediction = predict(cover, x, y);
        let slots = SLOTS.into_iter().zip(prediction.depths);
        for ((dx, dy, reference), depth) in slots
        {
            if remaining.is_empty()
            {
                return Ok(stego);
            }
            if depth == 0
            {
                continue;
            }

            let (group, rest) =
                remaining.split_at(remaining.len().min(depth as usize));
            remaining = rest;
            // a short final group is left-aligned
            let offset = group
                .iter()
                .fold(0i32, |acc, &bit| (acc << 1) | i32::from(bit))
                << (depth as usize - group.len());

            let value = match reference
            {
                Reference::High => prediction.high - offset,
                Reference::Low => prediction.low + offset,
            };
            // offsets stay below the predicted distance, so 0..=255 holds
            pixels::set_gray(&mut stego, x + dx, y + dy, value as u8);
        }
    }

    Ok(stego)
}

/// Reads the message hidden by [`embed`].
#[must_use]
pub fn extract(stego: &RgbImage) -> String
{
    let mut bits = Vec::new();
    for (x, y) in block_origins(stego)
    {
        let prediction = predict(stego, x, y);
        let slots = SLOTS.into_iter().zip(prediction.depths);
        for ((dx, dy, reference), depth) in slots
        {
            let sample = i32::from(gray(stego, x + dx, y + dy));
            let offset = match reference
            {
                Reference::High => prediction.high - sample,
                Reference::Low => sample - prediction.low,
            };
            bits.extend(
                (0..depth).rev().map(|shift| ((offset >> shift) & 1) as u8),
            );
        }
    }

    bitstream::decode(&bits)
}

/// Sum of the block depths of `cover`.
#[must_use]
pub fn capacity_bits(cover: &RgbImage) -> usize
{
    block_origins(cover)
        .map(|(x, y)| {
            predict(cover, x, y)
                .depths
                .iter()
                .map(|&depth| depth as usize)
                .sum::<usize>()
        })
        .sum()
}

/// Predicts the block whose top-left pixel is `(x, y)` from its corners.
///
/// Embedding and extraction both call this, the corners it reads are never
/// written.
#[must_use]
pub fn predict(image: &RgbImage, x: u32, y: u32) -> BlockPrediction
{
    let (width, height) = image.dimensions();
    let sample = |x: u32, y: u32| i32::from(gray(image, x, y));

    let c00 = sample(x, y);
    let right = x + 2 < width;
    let below = y + 2 < height;
    let c02 = if right { sample(x + 2, y) } else { c00 };
    let c20 = if below { sample(x, y + 2) } else { c00 };
    let c22 = if right && below { sample(x + 2, y + 2) } else { c00 };

    let low = c00.min(c02).min(c20).min(c22);
    let high = c00.max(c02).max(c20).max(c22);

    let c01 = (high + (c00 + c02) / 2) / 2;
    let c10 = (high + (c00 + c20) / 2) / 2;
    let c11 = (c10 + c01) / 2;

    BlockPrediction {
        low,
        high,
        depths: [c01, c10, c11]
            .map(|predicted| embedding_depth(predicted - low)),
    }
}

/// `floor(log2(distance))`, zero when the distance is below two.
#[must_use]
pub const fn embedding_depth(distance: i32) -> u32
{
    if distance < 2 { 0 } else { distance.ilog2() }
}

/// Top-left corners of the complete 2x2 blocks, row by row.
fn block_origins(image: &RgbImage) -> impl Iterator<Item = (u32, u32)>
{
    let blocks_wide = image.width() / 2;
    let blocks_tall = image.height() / 2;
    (0..blocks_tall)
        .flat_map(move |by| (0..blocks_wide).map(move |bx| (bx * 2, by * 2)))
}
