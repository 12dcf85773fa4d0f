//! Compact-u16 length prefixes.
//!
//! Every array in the wire format is preceded by its length in a compact
//! variable-width encoding: 7 low-order bits per byte, least-significant
//! group first, high bit set on every byte except the last. Lengths seen in
//! practice never need more than 3 bytes.

use crate::error::SolError;

/// Encode a length in the compact-u16 format.
///
/// - Values 0..=0x7f       -> 1 byte
/// - Values 0x80..=0x3fff  -> 2 bytes
/// - Values 0x4000..       -> 3 bytes
pub fn encode_length(len: usize) -> Vec<u8> {
    let mut rem = len;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if rem == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 length prefix.
///
/// Returns the decoded length and the remainder of the buffer after the
/// prefix.
pub fn decode_length(data: &[u8]) -> Result<(usize, &[u8]), SolError> {
    let mut len = 0usize;
    let mut shift = 0u32;

    for (consumed, &byte) in data.iter().enumerate() {
        len |= ((byte & 0x7f) as usize) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok((len, &data[consumed + 1..]));
        }
    }

    Err(SolError::Decode(
        "unexpected end of data while decoding length".into(),
    ))
}
