//! Latin letters swapped for their Cyrillic look-alikes.
//!
//! Each eligible letter carries one bit of the marked payload (see
//! [`crate::bitstream`]): the Latin form is `0`, the Cyrillic form is `1`.
//! Letters are visited left to right, letters after the payload are left as
//! they are.
use tracing::debug;

use crate::bitstream;
use crate::stego::{StegoError, ensure_capacity};

/// Latin letters and their Cyrillic twins
const PAIRS: [(char, char); 18] = [
    ('A', '\u{0410}'),
    ('B', '\u{0412}'),
    ('E', '\u{0415}'),
    ('K', '\u{041A}'),
    ('M', '\u{041C}'),
    ('H', '\u{041D}'),
    ('O', '\u{041E}'),
    ('P', '\u{0420}'),
    ('C', '\u{0421}'),
    ('T', '\u{0422}'),
    ('X', '\u{0425}'),
    ('a', '\u{0430}'),
    ('c', '\u{0441}'),
    ('e', '\u{0435}'),
    ('o', '\u{043E}'),
    ('p', '\u{0440}'),
    ('x', '\u{0445}'),
    ('y', '\u{0443}'),
];

/// Encodes `message` into the eligible letters of `cover`.
///
/// # Errors
///
/// Returns [`StegoError::CapacityExceeded`] when `cover` has fewer eligible
/// letters than the marked payload has bits.
pub fn embed(message: &str, cover: &str) -> Result<String, StegoError>
{
    let bits = bitstream::encode(message);
    ensure_capacity(bits.len(), capacity_bits(cover))?;
    debug!(bits = bits.len(), "homoglyph embed");

    let mut bits = bits.into_iter();
    Ok(cover
        .chars()
        .map(|c| match pair_of(c)
        {
            Some((latin, cyrillic)) => match bits.next()
            {
                Some(1) => cyrillic,
                Some(_) => latin,
                None => c,
            },
            None => c,
        })
        .collect())
}

/// Reads the payload hidden by [`embed`].
#[must_use]
pub fn extract(stego: &str) -> String
{
    let bits: Vec<u8> = stego
        .chars()
        .filter_map(|c| pair_of(c).map(|(latin, _)| u8::from(c != latin)))
        .collect();

    bitstream::decode(&bits)
}

/// Number of eligible letters in `cover`.
#[must_use]
pub fn capacity_bits(cover: &str) -> usize
{
    cover.chars().filter(|&c| pair_of(c).is_some()).count()
}

/// Returns the `(latin, cyrillic)` pair `c` belongs to.
fn pair_of(c: char) -> Option<(char, char)>
{
    PAIRS
        .into_iter()
        .find(|&(latin, cyrillic)| c == latin || c == cyrillic)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn round_trip()
    {
        let cover = "Copy each paper cop to the Mayor's office. ".repeat(4);
        let stego = embed("hey", &cover).expect("failed to embed");
        assert_eq!(extract(&stego), "hey");
        assert_eq!(stego.chars().count(), cover.chars().count());
        assert_ne!(stego, cover);
    }

    #[test]
    fn only_eligible_letters_change()
    {
        let cover = "bdfg Oooo xxxx ".repeat(20);
        let stego = embed("", &cover).expect("failed to embed");
        for (before, after) in cover.chars().zip(stego.chars())
        {
            if before != after
            {
                assert!(pair_of(before).is_some());
                assert_eq!(pair_of(before), pair_of(after));
            }
        }
    }

    #[test]
    fn capacity_boundary()
    {
        // "a" needs 8 + 32 bits
        let cover = "o".repeat(40);
        let stego = embed("a", &cover).expect("exact fit must embed");
        assert_eq!(extract(&stego), "a");

        assert_eq!(
            embed("a", &"o".repeat(39)),
            Err(StegoError::CapacityExceeded {
                required_bits: 40,
                available_bits: 39,
            })
        );
    }

    #[test]
    fn cyrillic_cover_letters_are_eligible()
    {
        let cover = "\u{043E}".repeat(48);
        assert_eq!(capacity_bits(&cover), 48);
        let stego = embed("Q", &cover).expect("failed to embed");
        assert_eq!(extract(&stego), "Q");
    }

    #[test]
    fn plain_latin_text_has_no_payload()
    {
        assert_eq!(extract("A perfectly ordinary sentence."), "");
    }
}
