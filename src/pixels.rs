//! Channel access over RGB pixel buffers.
//!
//! Grayscale carriers are stored as RGB images with equal channels, the gray
//! sample of a pixel is its red channel. Coordinates must be inside the
//! image, out-of-range access panics.
use image::{Rgb, RgbImage};
use serde::Serialize;

/// Colour channel of an RGB pixel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel
{
    /// Red channel, also the gray sample of grayscale images
    #[default]
    Red,
    Green,
    Blue,
}

impl Channel
{
    /// All channels in storage order
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Index of the channel inside an [`Rgb`] pixel
    #[must_use]
    pub const fn index(self) -> usize
    {
        match self
        {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Returns the value of `channel` at `(x, y)`.
#[must_use]
pub fn channel(image: &RgbImage, x: u32, y: u32, channel: Channel) -> u8
{
    image.get_pixel(x, y).0[channel.index()]
}

/// Returns the gray sample at `(x, y)`.
#[must_use]
pub fn gray(image: &RgbImage, x: u32, y: u32) -> u8
{
    channel(image, x, y, Channel::Red)
}

/// Writes `value` into all three channels at `(x, y)`.
pub fn set_gray(image: &mut RgbImage, x: u32, y: u32, value: u8)
{
    image.put_pixel(x, y, Rgb([value; 3]));
}

/// Writes an RGB triple at `(x, y)`.
pub fn set_rgb(image: &mut RgbImage, x: u32, y: u32, rgb: [u8; 3])
{
    image.put_pixel(x, y, Rgb(rgb));
}

/// Perceived brightness `Y = 0.299R + 0.587G + 0.114B`.
#[must_use]
pub fn luma(rgb: [u8; 3]) -> f64
{
    let [r, g, b] = rgb.map(f64::from);
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Builds a grayscale carrier with `R = G = B` from a sample function.
#[must_use]
pub fn gray_from_fn(
    width: u32,
    height: u32,
    mut sample: impl FnMut(u32, u32) -> u8,
) -> RgbImage
{
    RgbImage::from_fn(width, height, |x, y| Rgb([sample(x, y); 3]))
}
