//! Interpolation-based embedding on a multi-resolution grid (INMI).
//!
//! The cover is reduced to half resolution by averaging each 2x2 block of
//! gray samples, then scaled back to its original size with nearest
//! neighbour interpolation. The payload is written into that interpolated
//! image, not into the cover.
//!
//! Pixels whose coordinates are both even are anchor pixels: they carry the
//! downscaled samples and are never written. Every other pixel takes one
//! payload bit in its LSB, row-major. The stego image is grayscale.
use image::RgbImage;
use tracing::debug;

use super::{StegoError, ensure_capacity};
use crate::bitstream;
use crate::pixels::{self, gray};

/// Hides `message` in the interpolated pixels of the rescaled cover.
///
/// # Errors
///
/// Returns [`StegoError::CapacityExceeded`] when the marked payload has more
/// bits than the image has non-anchor pixels.
pub fn embed(cover: &RgbImage, message: &str) -> Result<RgbImage, StegoError>
{
    let bits = bitstream::encode(message);
    ensure_capacity(bits.len(), capacity_bits(cover))?;

    let (width, height) = cover.dimensions();
    let mut stego = interpolation_base(cover);
    debug!(bits = bits.len(), width, height, "inmi embed");

    let mut bits = bits.into_iter();
    for y in 0..height
    {
        for x in 0..width
        {
            if is_anchor(x, y)
            {
                continue;
            }
            let Some(bit) = bits.next()
            else
            {
                return Ok(stego);
            };
            let value = gray(&stego, x, y);
            pixels::set_gray(&mut stego, x, y, (value & 0xFE) | bit);
        }
    }

    Ok(stego)
}

/// Reads the message hidden by [`embed`].
#[must_use]
pub fn extract(stego: &RgbImage) -> String
{
    let (width, height) = stego.dimensions();
    let bits: Vec<u8> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| !is_anchor(x, y))
        .map(|(x, y)| gray(stego, x, y) & 1)
        .collect();

    bitstream::decode(&bits)
}

/// Approximates the half-resolution content of the original cover.
///
/// Averages each 2x2 block of `stego` again. This is lossy, the LSB changes
/// and the interpolation survive in the result.
#[must_use]
pub fn recover_original(stego: &RgbImage) -> RgbImage
{
    downscale(stego)
}

/// Number of non-anchor pixels.
#[must_use]
pub fn capacity_bits(cover: &RgbImage) -> usize
{
    let (width, height) = cover.dimensions();
    let anchors = width.div_ceil(2) as usize * height.div_ceil(2) as usize;
    width as usize * height as usize - anchors
}

/// Anchor pixels sit on even rows and even columns.
#[must_use]
pub const fn is_anchor(x: u32, y: u32) -> bool
{
    x % 2 == 0 && y % 2 == 0
}

/// Downscaled and re-interpolated cover, the image the payload goes into.
fn interpolation_base(cover: &RgbImage) -> RgbImage
{
    let (width, height) = cover.dimensions();
    let reduced = downscale(cover);
    if reduced.width() == 0 || reduced.height() == 0
    {
        // nothing to interpolate from, keep the gray samples as they are
        return pixels::gray_from_fn(width, height, |x, y| gray(cover, x, y));
    }
    upscale_nearest(&reduced, width, height)
}

/// Averages each 2x2 block of gray samples into one pixel.
fn downscale(image: &RgbImage) -> RgbImage
{
    let width = image.width() / 2;
    let height = image.height() / 2;
    pixels::gray_from_fn(width, height, |x, y| {
        let sum: u32 = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .iter()
            .map(|&(dx, dy)| u32::from(gray(image, x * 2 + dx, y * 2 + dy)))
            .sum();
        // mean of four bytes fits in a byte
        (sum / 4) as u8
    })
}

/// Nearest neighbour scaling to `width` x `height`.
fn upscale_nearest(image: &RgbImage, width: u32, height: u32) -> RgbImage
{
    let x_ratio = image.width() as f32 / width as f32;
    let y_ratio = image.height() as f32 / height as f32;
    pixels::gray_from_fn(width, height, |x, y| {
        let src_x = ((x as f32 * x_ratio) as u32).min(image.width() - 1);
        let src_y = ((y as f32 * y_ratio) as u32).min(image.height() - 1);
        gray(image, src_x, src_y)
    })
}
