//! Matroska element IDs used by the walker.
//!
//! IDs keep their leading marker bits, so `0x1A45DFA3` is the 4-byte
//! EBML header ID exactly as it appears on the wire.

/// EBML header.
pub const EBML: u32 = 0x1A45_DFA3;
/// Segment, the root of all Matroska content.
pub const SEGMENT: u32 = 0x1853_8067;
/// Segment information.
pub const INFO: u32 = 0x1549_A966;
/// Track list.
pub const TRACKS: u32 = 0x1654_AE6B;
/// A single track description.
pub const TRACK_ENTRY: u32 = 0xAE;
/// Track number referenced by blocks.
pub const TRACK_NUMBER: u32 = 0xD7;
/// Track type (1 = video, 2 = audio).
pub const TRACK_TYPE: u32 = 0x83;
/// Codec identifier string, e.g. `A_OPUS`.
pub const CODEC_ID: u32 = 0x86;
/// Codec private data. For Opus this is an OpusHead structure.
pub const CODEC_PRIVATE: u32 = 0x63A2;
/// Audio settings of a track.
pub const AUDIO: u32 = 0xE1;
/// Sampling frequency in Hz, stored as a float.
pub const SAMPLING_FREQUENCY: u32 = 0xB5;
/// Channel count.
pub const CHANNELS: u32 = 0x9F;
/// Cluster of blocks.
pub const CLUSTER: u32 = 0x1F43_B675;
/// Cluster timecode.
pub const TIMECODE: u32 = 0xE7;
/// Block without a surrounding group.
pub const SIMPLE_BLOCK: u32 = 0xA3;
/// Group holding a Block and its metadata.
pub const BLOCK_GROUP: u32 = 0xA0;
/// Block inside a BlockGroup.
pub const BLOCK: u32 = 0xA1;

/// Track type value for video tracks.
pub const TRACK_TYPE_VIDEO: u64 = 1;
/// Track type value for audio tracks.
pub const TRACK_TYPE_AUDIO: u64 = 2;

/// Codec ID of Opus audio tracks.
pub const CODEC_ID_OPUS: &str = "A_OPUS";

/// Returns true if the element is a container the walker descends into.
pub fn is_master(id: u32) -> bool {
    matches!(
        id,
        EBML | SEGMENT | INFO | TRACKS | TRACK_ENTRY | AUDIO | CLUSTER | BLOCK_GROUP
    )
}

/// Returns a human readable name for known IDs.
pub fn name(id: u32) -> &'static str {
    match id {
        EBML => "EBML",
        SEGMENT => "Segment",
        INFO => "Info",
        TRACKS => "Tracks",
        TRACK_ENTRY => "TrackEntry",
        TRACK_NUMBER => "TrackNumber",
        TRACK_TYPE => "TrackType",
        CODEC_ID => "CodecID",
        CODEC_PRIVATE => "CodecPrivate",
        AUDIO => "Audio",
        SAMPLING_FREQUENCY => "SamplingFrequency",
        CHANNELS => "Channels",
        CLUSTER => "Cluster",
        TIMECODE => "Timecode",
        SIMPLE_BLOCK => "SimpleBlock",
        BLOCK_GROUP => "BlockGroup",
        BLOCK => "Block",
        _ => "Unknown",
    }
}
