//! Brightness-threshold embedding in the blue channel (Kutter-Jordan-Bossen).
//!
//! A bit is written by pushing the blue channel of one pixel above (`1`) or
//! below (`0`) the pixel brightness `Y = 0.299R + 0.587G + 0.114B`. The
//! pixels are visited along a pseudorandom path derived from the seed.
//!
//! # Path
//!
//! The path is a Fisher-Yates shuffle of all linear pixel indices driven by
//! `ChaCha20Rng::seed_from_u64(seed)`, walking `i` from `n - 1` down to `1`
//! and swapping with `random_range(0..=i)` drawn as `u32`. It depends only
//! on the seed and the pixel count, never on the payload length, and is part
//! of the stego format.
//!
//! Pixels with `R = G = 0` have `Y <= B` for every blue value and cannot hold
//! a `0` bit. They are dropped from the path on both sides, which is stable
//! because red and green are never modified.
use image::RgbImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use super::{StegoError, ensure_capacity};
use crate::bitstream;
use crate::pixels::{self, luma};

/// Embedding strength used when none is given
pub const DEFAULT_LAMBDA: f64 = 0.5;

/// Path seed used when none is given
pub const DEFAULT_SEED: u64 = 1;

/// Parameters of the KJB method
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KjbParams
{
    /// Embedding strength, the blue channel moves by `lambda * Y`
    pub lambda: f64,
    /// Seed of the pixel path
    pub seed: u64,
}

impl Default for KjbParams
{
    fn default() -> Self
    {
        Self {
            lambda: DEFAULT_LAMBDA,
            seed: DEFAULT_SEED,
        }
    }
}

/// Hides `message` in the blue channel of a copy of `cover`.
///
/// # Errors
///
/// Returns [`StegoError::CapacityExceeded`] when the marked payload has more
/// bits than the cover has usable pixels.
pub fn embed(
    cover: &RgbImage,
    message: &str,
    params: &KjbParams,
) -> Result<RgbImage, StegoError>
{
    let bits = bitstream::encode(message);
    let path = embedding_path(cover, params.seed);
    ensure_capacity(bits.len(), path.len())?;

    debug!(
        bits = bits.len(),
        usable = path.len(),
        lambda = params.lambda,
        "kjb embed"
    );

    let mut stego = cover.clone();
    let width = cover.width();
    for (&index, &bit) in path.iter().zip(&bits)
    {
        let (x, y) = (index % width, index / width);
        let [red, green, blue] = stego.get_pixel(x, y).0;
        let blue = modulate_blue([red, green, blue], bit, params.lambda);
        pixels::set_rgb(&mut stego, x, y, [red, green, blue]);
    }

    Ok(stego)
}

/// Reads the message hidden by [`embed`] with the same parameters.
#[must_use]
pub fn extract(stego: &RgbImage, params: &KjbParams) -> String
{
    let width = stego.width();
    let bits: Vec<u8> = embedding_path(stego, params.seed)
        .into_iter()
        .map(|index| read_bit(stego.get_pixel(index % width, index / width).0))
        .collect();

    bitstream::decode(&bits)
}

/// Number of pixels able to carry a bit.
#[must_use]
pub fn capacity_bits(cover: &RgbImage) -> usize
{
    cover.pixels().filter(|pixel| is_usable(pixel.0)).count()
}

/// Seeded permutation of all linear pixel indices.
#[must_use]
pub fn permutation(pixel_count: usize, seed: u64) -> Vec<u32>
{
    let mut indices: Vec<u32> = (0..pixel_count)
        .map(|index| index as u32)
        .collect();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    for i in (1..indices.len()).rev()
    {
        let j = rng.random_range(0..=(i as u32)) as usize;
        indices.swap(i, j);
    }
    indices
}

/// Usable pixels of `image` in path order.
fn embedding_path(image: &RgbImage, seed: u64) -> Vec<u32>
{
    let width = image.width();
    let pixel_count = image.width() as usize * image.height() as usize;
    permutation(pixel_count, seed)
        .into_iter()
        .filter(|&index| {
            is_usable(image.get_pixel(index % width, index / width).0)
        })
        .collect()
}

/// A pixel can hold both bit values unless red and green are both zero.
fn is_usable([red, green, _]: [u8; 3]) -> bool
{
    red != 0 || green != 0
}

/// Extraction rule `B >= Y`, evaluated exactly as
/// `886 B >= 299 R + 587 G`.
fn read_bit([red, green, blue]: [u8; 3]) -> u8
{
    u8::from(886 * u32::from(blue) >= red_green_term(red, green))
}

fn red_green_term(red: u8, green: u8) -> u32
{
    299 * u32::from(red) + 587 * u32::from(green)
}

/// Shifts blue by `lambda * Y` towards the bit and then, if rounding or
/// clamping left it on the wrong side of `Y`, onto the nearest value that
/// reads back as `bit`.
fn modulate_blue(rgb: [u8; 3], bit: u8, lambda: f64) -> u8
{
    let [red, green, blue] = rgb;
    let delta = lambda * luma(rgb);
    let shifted = if bit == 1
    {
        f64::from(blue) + delta
    }
    else
    {
        f64::from(blue) - delta
    };
    // clamped to the channel range before the cast
    let blue = shifted.round().clamp(0.0, 255.0) as u8;

    // smallest blue value that reads as 1, at most 255
    let threshold = red_green_term(red, green).div_ceil(886) as u8;
    if bit == 1
    {
        blue.max(threshold)
    }
    else
    {
        // usable pixels have a threshold of at least 1
        blue.min(threshold.saturating_sub(1))
    }
}
