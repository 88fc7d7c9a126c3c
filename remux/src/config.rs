//! Remux options.

use serde::{Deserialize, Serialize};

use crate::ogg::MAX_SEGMENTS;
use crate::opus::DEFAULT_VENDOR;

/// Pre-skip used when the input carries no OpusHead.
pub const DEFAULT_PRE_SKIP: u16 = 312;
/// Packets per audio page. At 20 ms per packet this is about one second.
pub const DEFAULT_MAX_PACKETS_PER_PAGE: usize = 50;

/// What to do when the EBML walk stopped a span early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Keep whatever frames were found.
    #[default]
    Lenient,
    /// Fail on the first undecodable element.
    Strict,
}

/// Options controlling a remux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemuxOptions {
    pub max_packets_per_page: usize,
    pub max_segments_per_page: usize,
    pub default_pre_skip: u16,
    pub vendor: String,
    /// Fixed stream serial. A random one is drawn when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<u32>,
    pub parse_policy: ParsePolicy,
    pub filter_audio_track: bool,
}

impl Default for RemuxOptions {
    fn default() -> Self {
        Self {
            max_packets_per_page: DEFAULT_MAX_PACKETS_PER_PAGE,
            max_segments_per_page: MAX_SEGMENTS,
            default_pre_skip: DEFAULT_PRE_SKIP,
            vendor: DEFAULT_VENDOR.to_string(),
            serial: None,
            parse_policy: ParsePolicy::Lenient,
            filter_audio_track: true,
        }
    }
}

impl RemuxOptions {
    /// Packet limit per page, at least 1.
    pub fn packet_limit(&self) -> usize {
        self.max_packets_per_page.max(1)
    }

    /// Segment limit per page, within 1..=255.
    ///
    /// A packet needing more lacing values than this still fits on a page
    /// alone, up to 255.
    pub fn segment_limit(&self) -> usize {
        self.max_segments_per_page.clamp(1, MAX_SEGMENTS)
    }
}
