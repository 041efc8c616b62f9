//! Image steganography methods.
//!
//! Every method hides a marked payload (see [`crate::bitstream`]) inside a
//! copy of the cover image and reads it back from the stego image:
//!
//! - [`kjb`]: blue channel modulation proportional to brightness, along a
//!   seeded pseudorandom pixel path
//! - [`lsbmr`]: LSB matching over the R, G and B channels, row-major
//! - [`inmi`]: LSB replacement in the interpolated pixels of a
//!   downscaled-then-upscaled grayscale image
//! - [`imnp`]: variable-depth embedding driven by min/max neighbourhood
//!   prediction
//!
//! [`ImageMethod`] selects one of them at runtime.
//!
//! # Errors
//!
//! Returns [`StegoError`] when the payload does not fit in the carrier.
use image::RgbImage;
use thiserror::Error;

pub mod imnp;
pub mod inmi;
pub mod kjb;
pub mod lsbmr;

pub use kjb::KjbParams;

/// Errors that can be emitted while embedding a payload
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StegoError
{
    /// The payload needs more embedding slots than the carrier provides
    #[error(
        "payload needs {required_bits} bits but the carrier only holds \
         {available_bits} bits"
    )]
    CapacityExceeded
    {
        /// Bits required by the payload, including any framing
        required_bits: usize,
        /// Embedding slots offered by the carrier
        available_bits: usize,
    },
}

/// Returns an error when `required_bits` exceeds `available_bits`.
pub(crate) fn ensure_capacity(
    required_bits: usize,
    available_bits: usize,
) -> Result<(), StegoError>
{
    if required_bits > available_bits
    {
        tracing::warn!(required_bits, available_bits, "payload refused");
        return Err(StegoError::CapacityExceeded {
            required_bits,
            available_bits,
        });
    }
    Ok(())
}

/// Image embedding method together with its parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageMethod
{
    Kjb(KjbParams),
    Lsbmr,
    Inmi,
    Imnp,
}

impl ImageMethod
{
    /// Short lowercase name of the method
    #[must_use]
    pub const fn name(&self) -> &'static str
    {
        match self
        {
            Self::Kjb(_) => "kjb",
            Self::Lsbmr => "lsbmr",
            Self::Inmi => "inmi",
            Self::Imnp => "imnp",
        }
    }

    /// Hides `message` in a copy of `cover`.
    ///
    /// # Errors
    ///
    /// Returns [`StegoError::CapacityExceeded`] when the marked payload does
    /// not fit.
    pub fn embed(
        &self,
        cover: &RgbImage,
        message: &str,
    ) -> Result<RgbImage, StegoError>
    {
        match self
        {
            Self::Kjb(params) => kjb::embed(cover, message, params),
            Self::Lsbmr => lsbmr::embed(cover, message),
            Self::Inmi => inmi::embed(cover, message),
            Self::Imnp => imnp::embed(cover, message),
        }
    }

    /// Reads the message hidden in `stego`.
    ///
    /// Returns an empty string when no payload is found.
    #[must_use]
    pub fn extract(&self, stego: &RgbImage) -> String
    {
        match self
        {
            Self::Kjb(params) => kjb::extract(stego, params),
            Self::Lsbmr => lsbmr::extract(stego),
            Self::Inmi => inmi::extract(stego),
            Self::Imnp => imnp::extract(stego),
        }
    }

    /// Number of payload bits, end marker included, `cover` can carry.
    #[must_use]
    pub fn capacity_bits(&self, cover: &RgbImage) -> usize
    {
        match self
        {
            Self::Kjb(_) => kjb::capacity_bits(cover),
            Self::Lsbmr => lsbmr::capacity_bits(cover),
            Self::Inmi => inmi::capacity_bits(cover),
            Self::Imnp => imnp::capacity_bits(cover),
        }
    }

    /// Longest message in bytes that fits in `cover`.
    #[must_use]
    pub fn max_message_size(&self, cover: &RgbImage) -> usize
    {
        self.capacity_bits(cover)
            .saturating_sub(crate::bitstream::MARKER_BITS)
            / 8
    }
}
