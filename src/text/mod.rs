//! Text steganography methods.
//!
//! - [`whitespace`]: one bit per line as a trailing space or tab
//! - [`zero_width`]: invisible U+200B / U+200C characters appended to the
//!   cover
//! - [`homoglyph`]: Latin letters swapped for identical-looking Cyrillic ones
//!
//! Capacity failures reuse [`StegoError`].
use crate::stego::StegoError;

pub mod homoglyph;
pub mod whitespace;
pub mod zero_width;

/// Text embedding method
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMethod
{
    Whitespace,
    ZeroWidth,
    Homoglyph,
}

impl TextMethod
{
    /// Short lowercase name of the method
    #[must_use]
    pub const fn name(&self) -> &'static str
    {
        match self
        {
            Self::Whitespace => "whitespace",
            Self::ZeroWidth => "zero-width",
            Self::Homoglyph => "homoglyph",
        }
    }

    /// Hides `message` in a copy of `cover`.
    ///
    /// # Errors
    ///
    /// Returns [`StegoError::CapacityExceeded`] when the cover offers too few
    /// positions. Zero-width embedding never fails.
    pub fn embed(
        &self,
        message: &str,
        cover: &str,
    ) -> Result<String, StegoError>
    {
        match self
        {
            Self::Whitespace => whitespace::embed(message, cover),
            Self::ZeroWidth => Ok(zero_width::embed(message, cover)),
            Self::Homoglyph => homoglyph::embed(message, cover),
        }
    }

    /// Reads the message hidden in `stego`.
    #[must_use]
    pub fn extract(&self, stego: &str) -> String
    {
        match self
        {
            Self::Whitespace => whitespace::extract(stego),
            Self::ZeroWidth => zero_width::extract(stego),
            Self::Homoglyph => homoglyph::extract(stego),
        }
    }

    /// Number of bits `cover` can carry, `None` when unbounded.
    #[must_use]
    pub fn capacity_bits(&self, cover: &str) -> Option<usize>
    {
        match self
        {
            Self::Whitespace => Some(whitespace::capacity_bits(cover)),
            Self::ZeroWidth => None,
            Self::Homoglyph => Some(homoglyph::capacity_bits(cover)),
        }
    }
}
