//! Ogg page structures.

use super::writer::encode_page;

/// Size of the fixed part of a page header.
pub const PAGE_HEADER_SIZE: usize = 27;
/// Capture pattern at the start of every page.
pub const OGG_MAGIC: &[u8; 4] = b"OggS";
/// Maximum number of lacing values in one page.
pub const MAX_SEGMENTS: usize = 255;

/// Header type flags.
pub mod flags {
    /// Normal page.
    pub const NONE: u8 = 0x00;
    /// Continuation of previous packet.
    pub const CONTINUATION: u8 = 0x01;
    /// Beginning of stream.
    pub const BOS: u8 = 0x02;
    /// End of stream.
    pub const EOS: u8 = 0x04;
}

/// Number of lacing values a packet of `len` bytes occupies.
pub fn lacing_count(len: usize) -> usize {
    len / 255 + 1
}

/// Appends the lacing values of a packet of `len` bytes.
///
/// A packet whose length is a multiple of 255 ends with an explicit 0.
pub fn push_lacing(table: &mut Vec<u8>, len: usize) {
    table.extend(std::iter::repeat_n(255u8, len / 255));
    table.push((len % 255) as u8);
}

/// A decoded Ogg page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Version (always 0)
    pub version: u8,
    /// Header type flags
    pub header_type: u8,
    /// Absolute granule position
    pub granule_position: u64,
    /// Stream serial number
    pub serial: u32,
    /// Page sequence number
    pub sequence: u32,
    /// CRC checksum as stored in the page
    pub checksum: u32,
    /// Segment table
    pub segment_table: Vec<u8>,
    /// Page body data
    pub body: Vec<u8>,
}

impl Page {
    /// Returns true if this is a beginning-of-stream page.
    pub fn is_bos(&self) -> bool {
        (self.header_type & flags::BOS) != 0
    }

    /// Returns true if this is an end-of-stream page.
    pub fn is_eos(&self) -> bool {
        (self.header_type & flags::EOS) != 0
    }

    /// Returns true if this is a continuation page.
    pub fn is_continuation(&self) -> bool {
        (self.header_type & flags::CONTINUATION) != 0
    }

    /// Returns the total encoded size of the page.
    pub fn len(&self) -> usize {
        PAGE_HEADER_SIZE + self.segment_table.len() + self.body.len()
    }

    /// Returns true if the page carries no body bytes.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Splits the body back into packets using the segment table.
    ///
    /// A trailing packet without a terminating lacing value (< 255) is
    /// returned as well; it continues on the next page.
    pub fn packets(&self) -> Vec<&[u8]> {
        let mut packets = Vec::new();
        let mut start = 0;
        let mut pos = 0;
        for &lace in &self.segment_table {
            pos += lace as usize;
            if lace < 255 {
                packets.push(&self.body[start..pos]);
                start = pos;
            }
        }
        if start < pos {
            packets.push(&self.body[start..pos]);
        }
        packets
    }

    /// Recomputes the CRC with the checksum field zeroed and compares it
    /// with the stored one.
    pub fn verify_crc(&self) -> bool {
        let encoded = encode_page(
            self.header_type,
            self.granule_position,
            self.serial,
            self.sequence,
            &self.segment_table,
            std::iter::once(self.body.as_slice()),
        );
        encoded[22..26] == self.checksum.to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(segment_table: Vec<u8>, body: Vec<u8>) -> Page {
        Page {
            version: 0,
            header_type: flags::NONE,
            granule_position: 0,
            serial: 0xDEADBEEF,
            sequence: 0,
            checksum: 0,
            segment_table,
            body,
        }
    }

    #[test]
    fn test_lacing_values() {
        let mut table = Vec::new();
        push_lacing(&mut table, 100);
        assert_eq!(table, vec![100]);

        table.clear();
        push_lacing(&mut table, 255);
        assert_eq!(table, vec![255, 0]);

        table.clear();
        push_lacing(&mut table, 600);
        assert_eq!(table, vec![255, 255, 90]);

        table.clear();
        push_lacing(&mut table, 0);
        assert_eq!(table, vec![0]);
    }

    #[test]
    fn test_lacing_count_matches_push() {
        for len in [0, 1, 254, 255, 256, 509, 510, 511, 7650] {
            let mut table = Vec::new();
            push_lacing(&mut table, len);
            assert_eq!(table.len(), lacing_count(len), "len {}", len);
            assert_eq!(table.iter().map(|&v| v as usize).sum::<usize>(), len);
        }
    }

    #[test]
    fn test_page_flags() {
        let mut p = page(vec![], vec![]);
        assert!(!p.is_bos() && !p.is_eos() && !p.is_continuation());

        p.header_type = flags::BOS | flags::EOS;
        assert!(p.is_bos());
        assert!(p.is_eos());
        assert!(!p.is_continuation());

        p.header_type = flags::CONTINUATION;
        assert!(p.is_continuation());
    }

    #[test]
    fn test_flags_constants() {
        assert_eq!(flags::CONTINUATION, 0x01);
        assert_eq!(flags::BOS, 0x02);
        assert_eq!(flags::EOS, 0x04);
    }

    #[test]
    fn test_packets_split() {
        let p = page(vec![3, 255, 0, 2], {
            let mut body = vec![1, 2, 3];
            body.extend(vec![9; 255]);
            body.extend([7, 8]);
            body
        });
        let packets = p.packets();
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0], &[1u8, 2, 3]);
        assert_eq!(packets[1].len(), 255);
        assert_eq!(packets[2], &[7u8, 8]);
        assert_eq!(p.len(), PAGE_HEADER_SIZE + 4 + 260);
    }

    #[test]
    fn test_packets_unterminated() {
        let p = page(vec![255], vec![0; 255]);
        assert_eq!(p.packets().len(), 1);
    }

    #[test]
    fn test_verify_crc() {
        let mut p = page(vec![2], vec![0xAB, 0xCD]);
        assert!(!p.verify_crc());

        let encoded = encode_page(
            p.header_type,
            p.granule_position,
            p.serial,
            p.sequence,
            &p.segment_table,
            std::iter::once(p.body.as_slice()),
        );
        p.checksum = u32::from_le_bytes([encoded[22], encoded[23], encoded[24], encoded[25]]);
        assert!(p.verify_crc());

        p.body[0] ^= 0x01;
        assert!(!p.verify_crc());
    }
}
