//! Invisible payload appended to the end of the cover text.
//!
//! Each bit of the UTF-8 message becomes U+200B ZERO WIDTH SPACE (`0`) or
//! U+200C ZERO WIDTH NON-JOINER (`1`). No end marker is written; the payload
//! is the trailing run of zero-width characters. Whitespace mixed into that
//! run, such as a newline added by an editor, is skipped.
use tracing::debug;

use crate::bitstream;

const ZERO: char = '\u{200B}';
const ONE: char = '\u{200C}';

/// Appends `message` to `cover` as zero-width characters.
///
/// Zero-width characters anywhere in the trailing run that [`extract`] reads
/// are removed first, the whitespace of that run is kept.
#[must_use]
pub fn embed(message: &str, cover: &str) -> String
{
    let bits = bitstream::encode_raw(message.as_bytes());
    debug!(bits = bits.len(), "zero-width embed");

    let (body, tail) = cover.split_at(trailing_run_start(cover));
    let mut stego = body.to_owned();
    stego.extend(tail.chars().filter(|&c| !is_zero_width(c)));
    stego.extend(bits.iter().map(|&bit| if bit == 1 { ONE } else { ZERO }));
    stego
}

/// Reads the trailing zero-width run of `stego`.
#[must_use]
pub fn extract(stego: &str) -> String
{
    let (_, tail) = stego.split_at(trailing_run_start(stego));
    let bits: Vec<u8> = tail
        .chars()
        .filter_map(|c| match c
        {
            ZERO => Some(0),
            ONE => Some(1),
            _ => None,
        })
        .collect();

    String::from_utf8_lossy(&bitstream::pack(&bits)).into_owned()
}

fn is_zero_width(c: char) -> bool
{
    c == ZERO || c == ONE
}

/// Byte offset where the trailing run of zero-width and whitespace
/// characters begins.
fn trailing_run_start(text: &str) -> usize
{
    text.char_indices()
        .rev()
        .take_while(|&(_, c)| is_zero_width(c) || c.is_whitespace())
        .last()
        .map_or(text.len(), |(index, _)| index)
}
