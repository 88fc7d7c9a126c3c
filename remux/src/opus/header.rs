//! OpusHead and OpusTags packets (RFC 7845 Section 5).

/// Magic signature of the identification header.
pub const OPUS_HEAD_MAGIC: &[u8; 8] = b"OpusHead";
/// Magic signature of the comment header.
pub const OPUS_TAGS_MAGIC: &[u8; 8] = b"OpusTags";
/// Size of an OpusHead with channel mapping family 0.
pub const OPUS_HEAD_SIZE: usize = 19;
/// Vendor string written into OpusTags.
pub const DEFAULT_VENDOR: &str = "giztoy-remux";

/// Builds the 19-byte identification header.
pub fn build_opus_head(channels: u8, sample_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = vec![0u8; OPUS_HEAD_SIZE];
    head[..8].copy_from_slice(OPUS_HEAD_MAGIC);
    head[8] = 1; // Version
    head[9] = channels;
    head[10..12].copy_from_slice(&pre_skip.to_le_bytes());
    head[12..16].copy_from_slice(&sample_rate.to_le_bytes());
    head[16..18].copy_from_slice(&0i16.to_le_bytes()); // Output gain
    head[18] = 0; // Channel mapping family
    head
}

/// Builds a comment header with the given vendor and no user comments.
pub fn build_opus_tags(vendor: &str) -> Vec<u8> {
    let vendor = vendor.as_bytes();
    let mut tags = Vec::with_capacity(16 + vendor.len());
    tags.extend_from_slice(OPUS_TAGS_MAGIC);
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes()); // No comments
    tags
}

/// Reads the pre-skip from a WebM CodecPrivate blob.
///
/// Returns `None` unless the blob starts with "OpusHead" and is long
/// enough to hold the pre-skip field.
pub fn codec_private_pre_skip(private: &[u8]) -> Option<u16> {
    if private.len() < 12 || &private[..8] != OPUS_HEAD_MAGIC {
        return None;
    }
    Some(u16::from_le_bytes([private[10], private[11]]))
}

/// Parsed identification header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusHead {
    pub version: u8,
    pub channels: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: i16,
    pub mapping_family: u8,
}

impl OpusHead {
    /// Parses an OpusHead packet.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < OPUS_HEAD_SIZE || &data[..8] != OPUS_HEAD_MAGIC {
            return None;
        }
        Some(Self {
            version: data[8],
            channels: data[9],
            pre_skip: u16::from_le_bytes([data[10], data[11]]),
            input_sample_rate: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            output_gain: i16::from_le_bytes([data[16], data[17]]),
            mapping_family: data[18],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_opus_head_layout() {
        let head = build_opus_head(2, 48000, 312);
        assert_eq!(
            head,
            vec![
                b'O', b'p', b'u', b's', b'H', b'e', b'a', b'd', // magic
                0x01, // version
                0x02, // channels
                0x38, 0x01, // pre-skip 312
                0x80, 0xBB, 0x00, 0x00, // 48000
                0x00, 0x00, // gain
                0x00, // mapping family
            ]
        );
    }

    #[test]
    fn test_opus_head_parse() {
        let head = OpusHead::parse(&build_opus_head(1, 16000, 3840)).unwrap();
        assert_eq!(head.version, 1);
        assert_eq!(head.channels, 1);
        assert_eq!(head.pre_skip, 3840);
        assert_eq!(head.input_sample_rate, 16000);
        assert_eq!(head.output_gain, 0);
        assert_eq!(head.mapping_family, 0);

        assert!(OpusHead::parse(b"OpusHead").is_none());
        assert!(OpusHead::parse(&build_opus_tags("x")).is_none());
    }

    #[test]
    fn test_build_opus_tags_layout() {
        let tags = build_opus_tags("giztoy");
        assert_eq!(&tags[..8], b"OpusTags");
        assert_eq!(&tags[8..12], &6u32.to_le_bytes());
        assert_eq!(&tags[12..18], b"giztoy");
        assert_eq!(&tags[18..22], &0u32.to_le_bytes());
        assert_eq!(tags.len(), 22);
    }

    #[test]
    fn test_build_opus_tags_empty_vendor() {
        let tags = build_opus_tags("");
        assert_eq!(tags.len(), 16);
        assert_eq!(&tags[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_codec_private_pre_skip() {
        let head = build_opus_head(1, 48000, 3840);
        assert_eq!(codec_private_pre_skip(&head), Some(3840));
        // Only the first 12 bytes are needed
        assert_eq!(codec_private_pre_skip(&head[..12]), Some(3840));
        assert_eq!(codec_private_pre_skip(&head[..11]), None);
        assert_eq!(codec_private_pre_skip(b"NotOpusHead\x00\x00"), None);
        assert_eq!(codec_private_pre_skip(&[]), None);
    }
}
