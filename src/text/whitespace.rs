//! One payload bit per line, stored as a trailing space (`0`) or tab (`1`).
//!
//! Lines are split on `'\n'`. Existing trailing spaces and tabs are removed
//! from every line before embedding. The payload is the raw UTF-8 bits of
//! the message without an end marker, extraction reads one bit from every
//! line that ends in a space or a tab.
use tracing::debug;

use crate::bitstream;
use crate::stego::{StegoError, ensure_capacity};

const ZERO: char = ' ';
const ONE: char = '\t';

/// Appends one space or tab per message bit to the lines of `cover`.
///
/// # Errors
///
/// Returns [`StegoError::CapacityExceeded`] when the cover has fewer lines
/// than the message has bits.
pub fn embed(message: &str, cover: &str) -> Result<String, StegoError>
{
    let bits = bitstream::encode_raw(message.as_bytes());
    ensure_capacity(bits.len(), capacity_bits(cover))?;
    debug!(bits = bits.len(), "whitespace embed");

    let mut bits = bits.into_iter();
    let lines: Vec<String> = cover
        .split('\n')
        .map(|line| {
            let mut line = line.trim_end_matches([ZERO, ONE]).to_owned();
            if let Some(bit) = bits.next()
            {
                line.push(if bit == 1 { ONE } else { ZERO });
            }
            line
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Reads the bits left by [`embed`].
#[must_use]
pub fn extract(stego: &str) -> String
{
    let bits: Vec<u8> = stego
        .split('\n')
        .filter_map(|line| match line.chars().last()
        {
            Some(ZERO) => Some(0),
            Some(ONE) => Some(1),
            _ => None,
        })
        .collect();

    String::from_utf8_lossy(&bitstream::pack(&bits)).into_owned()
}

/// One bit per line.
#[must_use]
pub fn capacity_bits(cover: &str) -> usize
{
    cover.split('\n').count()
}
