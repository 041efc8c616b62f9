//! Fidelity metrics between a cover and its stego image.
use image::{Rgb, RgbImage};
use serde::Serialize;

use super::{AnalysisError, ensure_same_dimensions};
use crate::pixels::Channel;

/// Peak value of an 8-bit sample
const PEAK: f64 = 255.0;

/// Amplification of the visual attack difference
const VISUAL_GAIN: u32 = 10;

/// PSNR of every colour channel
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChannelPsnr
{
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    /// PSNR of the mean of the three channel MSEs
    pub average: f64,
}

/// Capacity estimate of `cover` in bits, three bits per four pixels.
#[must_use]
pub fn capacity(cover: &RgbImage) -> usize
{
    cover.width() as usize * cover.height() as usize / 4 * 3
}

/// `10 log10(255^2 / MSE)` over the gray samples.
///
/// Infinite when the images are identical. Symmetric in its arguments.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] on differing sizes.
pub fn psnr(cover: &RgbImage, stego: &RgbImage) -> Result<f64, AnalysisError>
{
    ensure_same_dimensions(cover, stego)?;
    Ok(psnr_from_mse(mean_squared_error(cover, stego, Channel::Red)))
}

/// PSNR of the red, green and blue channels separately.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] on differing sizes.
pub fn psnr_channels(
    cover: &RgbImage,
    stego: &RgbImage,
) -> Result<ChannelPsnr, AnalysisError>
{
    ensure_same_dimensions(cover, stego)?;
    let [red, green, blue] =
        Channel::ALL.map(|channel| mean_squared_error(cover, stego, channel));

    Ok(ChannelPsnr {
        red: psnr_from_mse(red),
        green: psnr_from_mse(green),
        blue: psnr_from_mse(blue),
        average: psnr_from_mse((red + green + blue) / 3.0),
    })
}

/// Root mean square difference of the gray samples.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] on differing sizes.
pub fn compression(
    cover: &RgbImage,
    stego: &RgbImage,
) -> Result<f64, AnalysisError>
{
    ensure_same_dimensions(cover, stego)?;
    Ok(mean_squared_error(cover, stego, Channel::Red).sqrt())
}

/// Gray difference image amplified ten times and saturated at 255.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] on differing sizes.
pub fn visual_attack(
    cover: &RgbImage,
    stego: &RgbImage,
) -> Result<RgbImage, AnalysisError>
{
    ensure_same_dimensions(cover, stego)?;
    let channel = Channel::Red.index();

    Ok(RgbImage::from_fn(cover.width(), cover.height(), |x, y| {
        let difference = cover.get_pixel(x, y).0[channel]
            .abs_diff(stego.get_pixel(x, y).0[channel]);
        let amplified = (u32::from(difference) * VISUAL_GAIN).min(255) as u8;
        Rgb([amplified; 3])
    }))
}

/// Mean squared difference of one channel, zero for empty images.
fn mean_squared_error(
    cover: &RgbImage,
    stego: &RgbImage,
    channel: Channel,
) -> f64
{
    let index = channel.index();
    let pixel_count = cover.width() as usize * cover.height() as usize;
    if pixel_count == 0
    {
        return 0.0;
    }

    let sum: f64 = cover
        .pixels()
        .zip(stego.pixels())
        .map(|(a, b)| {
            let diff = f64::from(a.0[index]) - f64::from(b.0[index]);
            diff * diff
        })
        .sum();
    sum / pixel_count as f64
}

fn psnr_from_mse(mse: f64) -> f64
{
    if mse == 0.0
    {
        f64::INFINITY
    }
    else
    {
        10.0 * (PEAK * PEAK / mse).log10()
    }
}
