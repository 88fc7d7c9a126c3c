//! Ogg page writer.

use super::crc::crc32;
use super::page::{push_lacing, MAX_SEGMENTS, OGG_MAGIC, PAGE_HEADER_SIZE};

/// Builds one self-contained Ogg page holding `packets`.
///
/// Every packet is terminated within the page, so no continuation flag is
/// ever needed. Callers keep the lacing values of a page at or below 255.
pub fn create_ogg_page<P: AsRef<[u8]>>(
    header_type: u8,
    granule_position: u64,
    serial: u32,
    sequence: u32,
    packets: &[P],
) -> Vec<u8> {
    let mut segment_table = Vec::new();
    for packet in packets {
        push_lacing(&mut segment_table, packet.as_ref().len());
    }
    encode_page(
        header_type,
        granule_position,
        serial,
        sequence,
        &segment_table,
        packets.iter().map(|p| p.as_ref()),
    )
}

/// Serializes a page from its parts and fills in the CRC.
pub(crate) fn encode_page<'a>(
    header_type: u8,
    granule_position: u64,
    serial: u32,
    sequence: u32,
    segment_table: &[u8],
    body: impl Iterator<Item = &'a [u8]> + Clone,
) -> Vec<u8> {
    debug_assert!(segment_table.len() <= MAX_SEGMENTS);

    let body_len: usize = body.clone().map(<[u8]>::len).sum();
    let mut page = Vec::with_capacity(PAGE_HEADER_SIZE + segment_table.len() + body_len);

    // Capture pattern "OggS"
    page.extend_from_slice(OGG_MAGIC);
    // Version
    page.push(0);
    page.push(header_type);
    page.extend_from_slice(&granule_position.to_le_bytes());
    page.extend_from_slice(&serial.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    // CRC placeholder
    page.extend_from_slice(&[0u8; 4]);
    page.push(segment_table.len() as u8);
    page.extend_from_slice(segment_table);
    for chunk in body {
        page.extend_from_slice(chunk);
    }

    let crc = crc32(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}
