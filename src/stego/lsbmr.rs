//! LSB matching over the red, green and blue channels.
//!
//! # Format
//!
//! - Marked payload bits (see [`crate::bitstream`])
//! - Pixels are visited left-to-right, top-to-bottom, and each pixel takes
//!   three bits in R, G, B order
//! - A channel whose LSB already equals the bit is left alone, otherwise it
//!   is incremented, or decremented when it is 255
use image::RgbImage;
use tracing::debug;

use super::{StegoError, ensure_capacity};
use crate::bitstream;

/// Hides `message` in the channel LSBs of a copy of `cover`.
///
/// # Errors
///
/// Returns [`StegoError::CapacityExceeded`] when the marked payload needs
/// more than three bits per pixel.
pub fn embed(cover: &RgbImage, message: &str) -> Result<RgbImage, StegoError>
{
    let bits = bitstream::encode(message);
    ensure_capacity(bits.len(), capacity_bits(cover))?;
    debug!(bits = bits.len(), "lsbmr embed");

    let mut stego = cover.clone();
    let channels = stego.pixels_mut().flat_map(|pixel| pixel.0.iter_mut());
    for (channel, bit) in channels.zip(bits)
    {
        *channel = match_bit(*channel, bit);
    }

    Ok(stego)
}

/// Reads the message hidden by [`embed`].
#[must_use]
pub fn extract(stego: &RgbImage) -> String
{
    let bits: Vec<u8> = stego
        .pixels()
        .flat_map(|pixel| pixel.0.iter())
        // just the lsb
        .map(|channel| channel & 1)
        .collect();

    bitstream::decode(&bits)
}

/// Three bits per pixel.
#[must_use]
pub fn capacity_bits(cover: &RgbImage) -> usize
{
    cover.width() as usize * cover.height() as usize * 3
}

/// Moves `value` by one so its LSB equals `bit`, never past the channel
/// range.
fn match_bit(value: u8, bit: u8) -> u8
{
    if value & 1 == bit
    {
        value
    }
    else if value == u8::MAX
    {
        value - 1
    }
    else
    {
        value + 1
    }
}
