//! Conversion between text payloads and ordered bit sequences.
//!
//! Every image method and the homoglyph text channel share the same framing:
//!
//! - payload bytes are the UTF-8 encoding of the message
//! - the 4-byte [`END_MARKER`] is appended after the payload
//! - each byte is expanded MSB-first (bit 7 to bit 0)
//!
//! A payload that itself contains the marker bytes decodes truncated at the
//! first occurrence. There is no escaping.
use tracing::debug;

/// Byte sequence terminating every marked payload
pub const END_MARKER: [u8; 4] = [0xFE, 0x00, 0xFF, 0xFA];

/// Number of bits occupied by the end marker
pub const MARKER_BITS: usize = END_MARKER.len() * 8;

/// Expands `message` into its UTF-8 bits followed by the end marker bits.
#[must_use]
pub fn encode(message: &str) -> Vec<u8>
{
    let mut bits = Vec::with_capacity(marked_len(message));
    bits.extend(PayloadBits::new(message.as_bytes()));
    bits.extend(PayloadBits::new(&END_MARKER));
    bits
}

/// Expands raw bytes into bits without appending the end marker.
#[must_use]
pub fn encode_raw(payload: &[u8]) -> Vec<u8>
{
    PayloadBits::new(payload).collect()
}

/// Number of bits [`encode`] produces for `message`.
#[must_use]
pub fn marked_len(message: &str) -> usize
{
    message.len() * 8 + MARKER_BITS
}

/// Packs bits into bytes, MSB-first. A trailing partial byte is dropped.
#[must_use]
pub fn pack(bits: &[u8]) -> Vec<u8>
{
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, bit| (acc << 1) | (bit & 1)))
        .collect()
}

/// Recovers the message from a marked bit sequence.
///
/// Bytes strictly before the first end marker are decoded as UTF-8, invalid
/// sequences are replaced. Returns an empty string when no marker is present,
/// which callers treat as "no payload".
#[must_use]
pub fn decode(bits: &[u8]) -> String
{
    let bytes = pack(bits);
    match find_marker(&bytes)
    {
        Some(end) => String::from_utf8_lossy(&bytes[..end]).into_owned(),
        None =>
        {
            debug!(bytes = bytes.len(), "end marker not found");
            String::new()
        },
    }
}

/// Returns the index of the first end marker in `bytes`.
fn find_marker(bytes: &[u8]) -> Option<usize>
{
    bytes
        .windows(END_MARKER.len())
        .position(|window| window == END_MARKER)
}

/// Iterator over the bits of a byte slice, most significant bit first
struct PayloadBits<'payload>
{
    /// The bytes to expand
    payload: &'payload [u8],
    /// The index of the next byte
    byte_index: usize,
    /// The index of the next bit in the current byte
    bit_index: u8,
}

impl<'payload> PayloadBits<'payload>
{
    fn new(payload: &'payload [u8]) -> Self
    {
        Self {
            payload,
            byte_index: 0,
            bit_index: 0,
        }
    }
}

impl Iterator for PayloadBits<'_>
{
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item>
    {
        let byte = *self.payload.get(self.byte_index)?;
        let shift = 7 - self.bit_index;
        let bit = (byte >> shift) & 1;

        self.bit_index += 1;
        if self.bit_index == 8
        {
            // move on to the next byte
            self.bit_index = 0;
            self.byte_index += 1;
        }

        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        let remaining = (self.payload.len() - self.byte_index) * 8
            - usize::from(self.bit_index);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn bits_are_msb_first_and_marker_terminated()
    {
        let bits = encode("A");
        assert_eq!(bits.len(), 8 + MARKER_BITS);
        // 'A' = 0x41
        assert_eq!(&bits[..8], &[0, 1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(pack(&bits[8..]), END_MARKER);
    }

    #[test]
    fn decode_recovers_unicode()
    {
        let message = "Привет, 世界 🦀";
        assert_eq!(decode(&encode(message)), message);
    }

    #[test]
    fn decode_ignores_trailing_noise()
    {
        let mut bits = encode("hidden");
        bits.extend([1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1]);
        assert_eq!(decode(&bits), "hidden");
    }

    #[test]
    fn missing_marker_yields_empty_string()
    {
        let bits = encode_raw(b"no marker here");
        assert_eq!(decode(&bits), "");
        assert_eq!(decode(&[]), "");
    }

    #[test]
    fn partial_trailing_byte_is_dropped()
    {
        assert_eq!(pack(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1]), vec![0xFF]);
    }

    #[test]
    fn marker_inside_payload_truncates()
    {
        let mut payload = b"ab".to_vec();
        payload.extend_from_slice(&END_MARKER);
        payload.extend_from_slice(b"cd");
        let mut bits = encode_raw(&payload);
        bits.extend(encode_raw(&END_MARKER));
        assert_eq!(decode(&bits), "ab");
    }

    #[test]
    fn empty_message_is_marker_only()
    {
        let bits = encode("");
        assert_eq!(bits.len(), MARKER_BITS);
        assert_eq!(decode(&bits), "");
        assert_eq!(marked_len(""), MARKER_BITS);
    }
}
