//! Primitive EBML decoders.
//!
//! These functions only understand the binary encoding. They know nothing
//! about WebM and return `None` whenever the bytes at `pos` cannot be decoded.

/// Counts the leading-marker length of a vint-style first byte.
///
/// Returns 1 for `1xxxxxxx`, 2 for `01xxxxxx` and so on, or `None` for 0.
fn marker_length(first: u8) -> Option<usize> {
    if first == 0 {
        return None;
    }
    Some(first.leading_zeros() as usize + 1)
}

/// Reads an element ID at `pos`.
///
/// Returns `(id, length)`. The marker bits are kept in the ID value, so
/// IDs compare directly against the constants in [`super::ids`].
pub fn read_element_id(buf: &[u8], pos: usize) -> Option<(u32, usize)> {
    let first = *buf.get(pos)?;
    let len = marker_length(first)?;
    if len > 4 {
        return None;
    }
    let bytes = buf.get(pos..pos + len)?;
    let id = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
    Some((id, len))
}

/// Reads a variable-length integer at `pos`.
///
/// Returns `(value, length)` with the marker bit stripped. Up to 8 bytes
/// (56 value bits) are accumulated in a `u64`, so unknown-size sentinels
/// of long vints survive intact.
pub fn read_vint(buf: &[u8], pos: usize) -> Option<(u64, usize)> {
    let first = *buf.get(pos)?;
    let len = marker_length(first)?;
    if len > 8 {
        return None;
    }
    let bytes = buf.get(pos..pos + len)?;
    let mask = if len == 8 { 0 } else { 0xFFu8 >> len };
    let value = bytes[1..]
        .iter()
        .fold((first & mask) as u64, |acc, &b| (acc << 8) | b as u64);
    Some((value, len))
}

/// Returns true if `size` is the reserved "unknown size" value for a vint
/// of `len` bytes (all value bits set).
pub fn is_unknown_size(size: u64, len: usize) -> bool {
    (1..=8).contains(&len) && size == (1u64 << (7 * len)) - 1
}

/// Decodes a big-endian unsigned integer payload.
///
/// Payloads longer than 8 bytes keep only the low 64 bits.
pub fn read_uint(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Decodes a big-endian IEEE-754 float payload of 4 or 8 bytes.
pub fn read_float(data: &[u8]) -> Option<f64> {
    match data.len() {
        4 => {
            let bytes: [u8; 4] = data.try_into().ok()?;
            Some(f32::from_be_bytes(bytes) as f64)
        }
        8 => {
            let bytes: [u8; 8] = data.try_into().ok()?;
            Some(f64::from_be_bytes(bytes))
        }
        _ => None,
    }
}
